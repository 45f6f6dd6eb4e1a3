use chrono::Utc;
use uuid::Uuid;

use crate::db::models::announcement::Announcement;
use crate::db::models::notification::Notification;
use crate::db::models::user::Role;
use crate::db::{profiles, DbPool};

pub async fn insert(
    db: &DbPool,
    user_id: &str,
    title: &str,
    message: &str,
) -> Result<Notification, sqlx::Error> {
    let notification = Notification {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        is_read: false,
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO notifications (id, user_id, title, message, is_read, created_at)
         VALUES (?, ?, ?, ?, 0, ?)"
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.created_at)
    .execute(db)
    .await?;

    Ok(notification)
}

/// Notify every user an announcement targets, except its issuer.
/// Returns the number of notifications written.
pub async fn create_announcement_notifications(
    db: &DbPool,
    announcement: &Announcement,
) -> Result<usize, sqlx::Error> {
    let recipients: Vec<(String, String)> = if announcement.is_global {
        sqlx::query_as("SELECT profile_id, role FROM users WHERE profile_id != ?")
            .bind(&announcement.issuer)
            .fetch_all(db)
            .await?
    } else {
        sqlx::query_as("SELECT profile_id, role FROM users WHERE role = ? AND profile_id != ?")
            .bind(&announcement.role)
            .bind(&announcement.issuer)
            .fetch_all(db)
            .await?
    };

    let mut sent = 0;
    for (profile_id, role) in recipients {
        if !announcement.is_global && announcement.filter_entries().is_some() {
            let Some(role) = Role::parse(&role) else { continue };
            let fields = profiles::profile_fields(db, role, &profile_id).await?;
            if !announcement.targets(role.as_str(), fields.as_ref()) {
                continue;
            }
        }
        insert(db, &profile_id, "New announcement", &announcement.title).await?;
        sent += 1;
    }

    Ok(sent)
}

/// Fire-and-forget: fan an announcement out to its audience.
/// Failures are logged and never reach the request that created it.
pub fn spawn_announcement_notifications(db: DbPool, announcement: Announcement) {
    tokio::spawn(async move {
        match create_announcement_notifications(&db, &announcement).await {
            Ok(sent) => tracing::debug!("Announcement {} notified {} users", announcement.id, sent),
            Err(e) => tracing::warn!("Announcement {} notification fan-out failed: {}", announcement.id, e),
        }
    });
}

/// Fire-and-forget single notification.
pub fn spawn_notify(db: DbPool, user_id: String, title: impl Into<String>, message: impl Into<String>) {
    let title = title.into();
    let message = message.into();

    tokio::spawn(async move {
        if let Err(e) = insert(&db, &user_id, &title, &message).await {
            tracing::warn!("Failed to notify user {}: {}", user_id, e);
        }
    });
}
