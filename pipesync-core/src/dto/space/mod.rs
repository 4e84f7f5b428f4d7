//! Space DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create a new space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpace {
    pub name: String,
}

/// Space as returned by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
