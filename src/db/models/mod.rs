pub mod announcement;
pub mod department;
pub mod notification;
pub mod staff;
pub mod student;
pub mod user;
