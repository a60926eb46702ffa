use chrono::{DateTime, Utc};
use logdb::{Entity, Error, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Homework {
    #[serde(skip)]
    pub id: String,
    pub learner_id: String,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

impl Homework {
    pub fn new(learner_id: impl Into<String>, text: impl Into<String>) -> Self {
        Homework { id: crate::new_id("homework"), learner_id: learner_id.into(), text: text.into(), submitted_at: Utc::now() }
    }
}

impl Entity for Homework {
    fn species_id() -> Id {
        Id::new("homework")
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
