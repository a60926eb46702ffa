pub mod auth;
pub mod courses;
pub mod enrolments;
pub mod health;
pub mod homework;
pub mod lessons;
pub mod users;
