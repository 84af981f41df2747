//! PDT: Primer Drop Test toolkit
//!
//! Records primer drop tests and their Site / Department / Primer reference
//! data as plain-text YAML files, and evaluates each test's misfire counts
//! into H-bar, standard deviation, H+/H- bounds and a disposition.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod yaml;
