use chrono::{DateTime, Utc};
use logdb::{Entity, Error, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(skip)]
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(course_id: impl Into<String>, name: impl Into<String>) -> Self {
        Lesson { id: crate::new_id("lesson"), course_id: course_id.into(), name: name.into(), created_at: Utc::now() }
    }
}

impl Entity for Lesson {
    fn species_id() -> Id {
        Id::new("lesson")
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
