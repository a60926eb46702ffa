//! Concrete entities for the e-learning domain: users, courses, lessons,
//! enrolments, and homework submissions, each implementing [`logdb::Entity`]
//! so they can be stored, loaded, indexed, and queried through a
//! [`logdb::Store`].

mod course;
mod enrolment;
mod homework;
mod ids;
mod lesson;
mod user;

pub use course::Course;
pub use enrolment::Enrolment;
pub use homework::Homework;
pub use ids::new_id;
pub use lesson::Lesson;
pub use user::User;
