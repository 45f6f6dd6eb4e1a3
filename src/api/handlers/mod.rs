pub mod announcements;
pub mod auth;
pub mod departments;
pub mod health;
pub mod notifications;
pub mod student_profile;
