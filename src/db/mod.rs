use anyhow::Result;
use sqlx::SqlitePool;
use crate::config::Config;
use crate::db::models::user::{Role, User};
use std::str::FromStr;

pub mod models;
pub mod notifications;
pub mod profiles;

pub type DbPool = SqlitePool;

const DEFAULT_ADMIN_EMAIL: &str = "admin@campus.local";

pub async fn init(cfg: &Config) -> Result<DbPool> {
    let db_url = format!("sqlite://{}?mode=rwc", cfg.database.path);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::from_str(&db_url)?
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal),
        )
        .await?;

    migrate(&pool).await?;

    tracing::info!("Database connected: {}", cfg.database.path);
    Ok(pool)
}

pub async fn migrate(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./src/db/migrations").run(pool).await?;
    Ok(())
}

/// Create a default ADMIN login if the users table is empty.
pub async fn seed_admin(pool: &DbPool) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if count.0 == 0 {
        let password = crate::auth::password::hash("admin")?;
        let mut admin = User::new(
            String::new(),
            "Administrator".to_string(),
            DEFAULT_ADMIN_EMAIL.to_string(),
            password,
            Role::Admin,
        );
        // Admins have no student/staff row; their own id stands in as profile id.
        admin.profile_id = admin.id.clone();
        insert_user(pool, &admin).await?;

        tracing::warn!(
            "Created default admin user (email: {}, password: admin). \
             Change immediately in production!",
            DEFAULT_ADMIN_EMAIL
        );
    }

    Ok(())
}

pub async fn insert_user(pool: &DbPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, profile_id, name, email, password, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&user.id)
    .bind(&user.profile_id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.role)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
