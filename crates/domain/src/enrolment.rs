use chrono::{DateTime, Utc};
use logdb::{Entity, Error, Id};
use serde::{Deserialize, Serialize};

/// A learner's membership in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrolment {
    #[serde(skip)]
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Enrolment {
    pub fn new(course_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Enrolment { id: crate::new_id("enrolment"), course_id: course_id.into(), user_id: user_id.into(), created_at: Utc::now() }
    }
}

impl Entity for Enrolment {
    fn species_id() -> Id {
        Id::new("enrolment")
    }

    fn id(&self) -> Id {
        Id::new(&self.id)
    }

    fn set_id(&mut self, id: Id) {
        self.id = id.as_str().to_string();
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::ContractViolation(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::corrupt(None, e))
    }
}
