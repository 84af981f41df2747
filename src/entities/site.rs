//! Site entity - a manufacturing or test location

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A site entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Unique identifier
    pub id: EntityId,

    /// Short site code (e.g. "LKC")
    pub site_code: String,

    /// Full site name
    pub site_name: String,

    /// Active or inactive
    #[serde(default)]
    pub status: Status,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this site)
    pub author: String,
}

impl Entity for Site {
    const PREFIX: EntityPrefix = EntityPrefix::Site;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        format!("{} - {}", self.site_code, self.site_name)
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

impl Site {
    /// Create a new site
    pub fn new(
        site_code: impl Into<String>,
        site_name: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Site),
            site_code: site_code.into().trim().to_string(),
            site_name: site_name.into().trim().to_string(),
            status: Status::default(),
            created: Utc::now(),
            author: author.into(),
        }
    }
}
