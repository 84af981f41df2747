//! YAML error types with source-annotated diagnostics

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while reading entity YAML
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    #[diagnostic(code(pdt::yaml::io))]
    Io(#[from] std::io::Error),
}

/// A YAML parse or shape error pointing into the offending file
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(pdt::yaml::syntax), help("Fix the file by hand or recreate it with the matching 'new' command"))]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    /// 1-based line of the error, when known
    pub line: Option<usize>,
}

impl YamlSyntaxError {
    /// Build a diagnostic from a serde_yml error and the source it came from
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let location = err.location();

        Self {
            filename: filename.to_string(),
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span: location.as_ref().map(|loc| line_col_to_span(content, loc.line(), loc.column())),
            line: location.as_ref().map(|loc| loc.line()),
        }
    }
}

/// Convert a 1-based line/column into a one-character byte span
fn line_col_to_span(content: &str, line: usize, column: usize) -> SourceSpan {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    let rest = &content[line_start.min(content.len())..];
    let offset = rest
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| line_start + i)
        .unwrap_or(content.len());

    SourceSpan::from((offset, 0))
}
