//! Schema validation of entity YAML files

use std::collections::HashMap;
use thiserror::Error;

use crate::core::EntityPrefix;
use crate::schema::registry::SchemaRegistry;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No schema registered for {0}")]
    Missing(EntityPrefix),

    #[error("Schema for {prefix} is invalid: {message}")]
    Invalid { prefix: EntityPrefix, message: String },

    #[error("Not a YAML document: {0}")]
    Parse(String),
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer into the document ("" for the root)
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Compiled validators for every entity type
pub struct Validator {
    validators: HashMap<EntityPrefix, jsonschema::Validator>,
}

impl Validator {
    /// Compile all embedded schemas
    pub fn new() -> Result<Self, SchemaError> {
        let registry = SchemaRegistry::new();
        let mut validators = HashMap::new();

        for prefix in EntityPrefix::all() {
            let source = registry.get(*prefix).ok_or(SchemaError::Missing(*prefix))?;
            let schema: serde_json::Value =
                serde_json::from_str(source).map_err(|e| SchemaError::Invalid {
                    prefix: *prefix,
                    message: e.to_string(),
                })?;
            let validator =
                jsonschema::validator_for(&schema).map_err(|e| SchemaError::Invalid {
                    prefix: *prefix,
                    message: e.to_string(),
                })?;
            validators.insert(*prefix, validator);
        }

        Ok(Self { validators })
    }

    /// Validate YAML text against the schema for `prefix`
    pub fn validate_yaml(
        &self,
        prefix: EntityPrefix,
        content: &str,
    ) -> Result<Vec<SchemaViolation>, SchemaError> {
        let instance: serde_json::Value =
            serde_yml::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))?;
        self.validate_value(prefix, &instance)
    }

    /// Validate a JSON value against the schema for `prefix`
    pub fn validate_value(
        &self,
        prefix: EntityPrefix,
        instance: &serde_json::Value,
    ) -> Result<Vec<SchemaViolation>, SchemaError> {
        let validator = self
            .validators
            .get(&prefix)
            .ok_or(SchemaError::Missing(prefix))?;

        Ok(validator
            .iter_errors(instance)
            .map(|e| SchemaViolation {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluator::{Disposition, TestType};
    use crate::entities::primer::{CertCategory, Primer};
    use crate::entities::{DropTest, Site};

    #[test]
    fn test_new_entities_pass_schema() {
        let validator = Validator::new().unwrap();

        let site = Site::new("LKC", "Lake City", "test");
        let yaml = serde_yml::to_string(&site).unwrap();
        assert!(validator.validate_yaml(EntityPrefix::Site, &yaml).unwrap().is_empty());

        let mut primer = Primer::new("SR41", CertCategory::Military, "test");
        primer.h_plus_type = Some(5.0);
        let yaml = serde_yml::to_string(&primer).unwrap();
        assert!(validator.validate_yaml(EntityPrefix::Prmr, &yaml).unwrap().is_empty());

        let mut test = DropTest::from_primer(&primer, TestType::Retest, "test");
        test.set_misfires(4, Some(50)).unwrap();
        test.calculate().unwrap();
        let yaml = serde_yml::to_string(&test).unwrap();
        let violations = validator.validate_yaml(EntityPrefix::Drop, &yaml).unwrap();
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_short_misfire_list_is_rejected() {
        let validator = Validator::new().unwrap();
        let primer = Primer::new("SR41", CertCategory::Commercial, "test");
        let test = DropTest::from_primer(&primer, TestType::RegularRun, "test");

        let mut value = serde_json::to_value(&test).unwrap();
        value["misfires"] = serde_json::json!([0, 0, 25]);

        let violations = validator.validate_value(EntityPrefix::Drop, &value).unwrap();
        assert!(violations.iter().any(|v| v.path == "/misfires"));
    }

    #[test]
    fn test_rejected_finalized_test_passes_schema() {
        let validator = Validator::new().unwrap();
        let primer = Primer::new("SR41", CertCategory::Commercial, "test");
        let mut test = DropTest::from_primer(&primer, TestType::RegularRun, "test");
        test.set_misfires(4, Some(25)).unwrap();
        test.calculate().unwrap();
        test.override_disposition(Disposition::Reject).unwrap();
        test.finalize().unwrap();

        let yaml = serde_yml::to_string(&test).unwrap();
        let violations = validator.validate_yaml(EntityPrefix::Drop, &yaml).unwrap();
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_negative_misfire_count_is_rejected() {
        let validator = Validator::new().unwrap();
        let primer = Primer::new("SR41", CertCategory::Commercial, "test");
        let test = DropTest::from_primer(&primer, TestType::RegularRun, "test");

        let mut value = serde_json::to_value(&test).unwrap();
        value["misfires"][3] = serde_json::json!(-2);

        let violations = validator.validate_value(EntityPrefix::Drop, &value).unwrap();
        assert!(violations.iter().any(|v| v.path == "/misfires/3"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let validator = Validator::new().unwrap();
        let site = Site::new("LKC", "Lake City", "test");
        let mut value = serde_json::to_value(&site).unwrap();
        value["colour"] = serde_json::json!("red");

        assert!(!validator.validate_value(EntityPrefix::Site, &value).unwrap().is_empty());
    }
}
