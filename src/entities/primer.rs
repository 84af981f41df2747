//! Primer entity - a primer type and its drop test specification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// Sample size for military and certified primers
pub const MIL_CERT_SAMPLE_SIZE: u32 = 50;

/// Sample size for commercial primers
pub const COMMERCIAL_SAMPLE_SIZE: u32 = 25;

/// Certification category (Comm/Mil/Cert)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertCategory {
    #[default]
    Commercial,
    Military,
    Certified,
}

impl CertCategory {
    /// Units fired per drop height level
    pub fn sample_size(&self) -> u32 {
        match self {
            CertCategory::Military | CertCategory::Certified => MIL_CERT_SAMPLE_SIZE,
            CertCategory::Commercial => COMMERCIAL_SAMPLE_SIZE,
        }
    }
}

impl std::fmt::Display for CertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertCategory::Commercial => write!(f, "Commercial"),
            CertCategory::Military => write!(f, "Military"),
            CertCategory::Certified => write!(f, "Certified"),
        }
    }
}

/// A primer type with its test spec values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primer {
    /// Unique identifier
    pub id: EntityId,

    /// Primer type designation
    pub primer_type: String,

    /// Certification category, determines sample size
    #[serde(default)]
    pub cert: CertCategory,

    /// H+ multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_plus_type: Option<f64>,

    /// H- multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_minus_type: Option<f64>,

    /// H+ spec for a regular run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_h_plus: Option<f64>,

    /// H- spec for a regular run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_h_minus: Option<f64>,

    /// H+ spec for a retest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retest_h_plus: Option<f64>,

    /// H- spec for a retest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retest_h_minus: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_diameter: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_space: Option<f64>,

    /// Minimum firing pin protrusion (0 or empty disables the check)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_pin_min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_pin_max: Option<f64>,

    /// Highest drop height used for this primer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_drop_test: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_fire_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_fire_value: Option<f64>,

    /// Owning department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<EntityId>,

    #[serde(default)]
    pub status: Status,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl Entity for Primer {
    const PREFIX: EntityPrefix = EntityPrefix::Prmr;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        self.primer_type.clone()
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

impl Primer {
    /// Create a new primer with no spec values set
    pub fn new(primer_type: impl Into<String>, cert: CertCategory, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prmr),
            primer_type: primer_type.into().trim().to_string(),
            cert,
            h_plus_type: None,
            h_minus_type: None,
            test_h_plus: None,
            test_h_minus: None,
            retest_h_plus: None,
            retest_h_minus: None,
            ball_weight: None,
            ball_diameter: None,
            head_space: None,
            firing_pin_min: None,
            firing_pin_max: None,
            high_drop_test: None,
            all_fire_value: None,
            no_fire_value: None,
            department: None,
            status: Status::default(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Sample size implied by the certification category
    pub fn sample_size(&self) -> u32 {
        self.cert.sample_size()
    }

    /// Whether a firing pin measurement is required for tests of this primer
    pub fn requires_firing_pin(&self) -> bool {
        self.firing_pin_min.is_some_and(|min| min > 0.0)
    }
}
