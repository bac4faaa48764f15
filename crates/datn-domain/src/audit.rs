//! Audit fields assigned explicitly by the store layer at write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a record and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub at: DateTime<Utc>,
    /// Actor identifier (the session email). Empty for anonymous writes.
    pub by: String,
}

impl AuditStamp {
    pub fn now(actor: &str) -> Self {
        Self {
            at: Utc::now(),
            by: actor.to_owned(),
        }
    }
}

/// Creation stamp plus the latest update stamp, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created: AuditStamp,
    pub updated: Option<AuditStamp>,
}

impl Audit {
    /// Audit for a record being inserted now by `actor`.
    pub fn created_by(actor: &str) -> Self {
        Self {
            created: AuditStamp::now(actor),
            updated: None,
        }
    }

    /// Record an update by `actor` and return the new stamp. The creation
    /// stamp is never changed.
    pub fn touch(&mut self, actor: &str) -> &AuditStamp {
        self.updated.insert(AuditStamp::now(actor))
    }
}
