//! Department entity - an organisational unit within a site

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A department entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier
    pub id: EntityId,

    /// Department name
    pub name: String,

    /// Owning site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<EntityId>,

    /// Active or inactive
    #[serde(default)]
    pub status: Status,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl Entity for Department {
    const PREFIX: EntityPrefix = EntityPrefix::Dept;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn status(&self) -> String {
        self.status.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Department {
    pub fn new(name: impl Into<String>, site: Option<EntityId>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Dept),
            name: name.into().trim().to_string(),
            site,
            status: Status::default(),
            created: Utc::now(),
            author: author.into(),
        }
    }
}
