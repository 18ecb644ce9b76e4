// ABOUTME: Error types for plan ingestion and validation
// ABOUTME: Defines specific error types for the plan module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read plan file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML plan: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON plan: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty plan: no tasks defined")]
    EmptyPlan,

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
