//! Error types for Turtle / JSON-LD conversion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to parse Turtle: {0}")]
    Parse(String),

    #[error("Invalid JSON input: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to process @context: {0}")]
    Context(String),

    #[error("Failed to compact RDF dataset: {0}")]
    Compaction(String),

    #[error("Failed to expand JSON-LD document: {0}")]
    Expansion(String),

    #[error("Failed to serialize Turtle: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
