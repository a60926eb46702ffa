use std::sync::Arc;

use domain::{Course, Enrolment, Homework, Lesson, User};
use logdb::Id;

use crate::error::ApiError;

/// Either storage backend a handler might be pointed at, selected once at
/// startup via `--backend`. Handlers call through this instead of touching
/// `logdb::Store` or `sqlstore::SqlStore` directly, so they don't care which
/// one is live.
#[derive(Clone)]
pub enum Backend {
    Log(Arc<logdb::Store>),
    Sql(Arc<sqlstore::SqlStore>),
}

impl Backend {
    pub fn store_user(&self, user: &User) -> Result<(), ApiError> {
        match self {
            Backend::Log(store) => Ok(store.store(user)?),
            Backend::Sql(store) => Ok(store.store_user(user)?),
        }
    }

    pub fn load_user(&self, id: &str) -> Result<User, ApiError> {
        match self {
            Backend::Log(store) => Ok(store.load(&Id::new(id))?),
            Backend::Sql(store) => Ok(store.load_user(id)?),
        }
    }

    pub fn load_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<User>("by_email", &Id::new(email), &mut out)?;
                Ok(out.into_iter().next())
            }
            Backend::Sql(store) => Ok(store.load_user_by_email(email)?),
        }
    }

    pub fn store_course(&self, course: &Course) -> Result<(), ApiError> {
        match self {
            Backend::Log(store) => Ok(store.store(course)?),
            Backend::Sql(store) => Ok(store.store_course(course)?),
        }
    }

    pub fn load_course(&self, id: &str) -> Result<Course, ApiError> {
        match self {
            Backend::Log(store) => Ok(store.load(&Id::new(id))?),
            Backend::Sql(store) => Ok(store.load_course(id)?),
        }
    }

    pub fn query_courses_by_owner(&self, owner_id: &str) -> Result<Vec<Course>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<Course>("by_owner", &Id::new(owner_id), &mut out)?;
                Ok(out)
            }
            Backend::Sql(store) => Ok(store.query_courses_by_owner(owner_id)?),
        }
    }

    pub fn store_lesson(&self, lesson: &Lesson) -> Result<(), ApiError> {
        match self {
            Backend::Log(store) => Ok(store.store(lesson)?),
            Backend::Sql(store) => Ok(store.store_lesson(lesson)?),
        }
    }

    pub fn query_lessons_by_course(&self, course_id: &str) -> Result<Vec<Lesson>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<Lesson>("by_course", &Id::new(course_id), &mut out)?;
                Ok(out)
            }
            Backend::Sql(store) => Ok(store.query_lessons_by_course(course_id)?),
        }
    }

    pub fn store_enrolment(&self, enrolment: &Enrolment) -> Result<(), ApiError> {
        match self {
            Backend::Log(store) => Ok(store.store(enrolment)?),
            Backend::Sql(store) => Ok(store.store_enrolment(enrolment)?),
        }
    }

    pub fn query_enrolments_by_course(&self, course_id: &str) -> Result<Vec<Enrolment>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<Enrolment>("by_course", &Id::new(course_id), &mut out)?;
                Ok(out)
            }
            Backend::Sql(store) => Ok(store.query_enrolments_by_course(course_id)?),
        }
    }

    pub fn query_enrolments_by_user(&self, user_id: &str) -> Result<Vec<Enrolment>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<Enrolment>("by_user", &Id::new(user_id), &mut out)?;
                Ok(out)
            }
            Backend::Sql(store) => Ok(store.query_enrolments_by_user(user_id)?),
        }
    }

    pub fn store_homework(&self, homework: &Homework) -> Result<(), ApiError> {
        match self {
            Backend::Log(store) => Ok(store.store(homework)?),
            Backend::Sql(store) => Ok(store.store_homework(homework)?),
        }
    }

    pub fn query_homework_by_learner(&self, learner_id: &str) -> Result<Vec<Homework>, ApiError> {
        match self {
            Backend::Log(store) => {
                let mut out = Vec::new();
                store.query::<Homework>("by_learner", &Id::new(learner_id), &mut out)?;
                Ok(out)
            }
            Backend::Sql(store) => Ok(store.query_homework_by_learner(learner_id)?),
        }
    }
}
