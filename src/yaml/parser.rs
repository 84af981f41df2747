//! YAML parsing with error handling

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}

/// Serialize a value and write it to `path`
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let content = serde_yml::to_string(value).map_err(|e| {
        YamlError::Io(std::io::Error::other(format!(
            "failed to serialize {}: {}",
            path.display(),
            e
        )))
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Sample {
        name: String,
        misfires: Vec<Option<u32>>,
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = "name: lot 7\nmisfires: [~, 25, 3]";
        let result: Sample = parse_yaml(yaml, "test.yaml").unwrap();
        assert_eq!(result.name, "lot 7");
        assert_eq!(result.misfires, vec![None, Some(25), Some(3)]);
    }

    #[test]
    fn test_parse_invalid_yaml_reports_line() {
        let yaml = "name: test\nmisfires: [1, 2\n";
        let result: Result<Sample, _> = parse_yaml(yaml, "test.yaml");
        match result {
            Err(YamlError::Syntax(e)) => {
                assert_eq!(e.filename, "test.yaml");
                assert!(e.line.is_some());
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("sample.yaml");
        let sample = Sample {
            name: "x".to_string(),
            misfires: vec![Some(1), None],
        };

        write_yaml_file(&path, &sample).unwrap();
        let parsed: Sample = parse_yaml_file(&path).unwrap();
        assert_eq!(parsed, sample);
    }
}
