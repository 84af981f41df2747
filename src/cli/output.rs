//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::core::evaluator::Disposition;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

/// Print any serializable value as YAML
pub fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let yaml = serde_yml::to_string(value).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

/// Disposition with its colour treatment
pub fn styled_disposition(disposition: Disposition) -> String {
    match disposition {
        Disposition::Accept => style(disposition).green().bold().to_string(),
        Disposition::Retest => style(disposition).red().bold().to_string(),
        Disposition::Reject => style(disposition).magenta().bold().to_string(),
        Disposition::InProgress => style(disposition).yellow().to_string(),
    }
}

/// Format an optional number with fixed decimals, "-" when absent
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

/// Format an optional displayable value, "-" when absent
pub fn fmt_opt_display<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
