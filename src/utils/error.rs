// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application.
// Absent sections/tables and unparseable tokens are NOT errors: they come
// back as Option::None or skipped rows so fallback paths stay visible in
// the signatures instead of hiding in catch blocks.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Filing document is empty or whitespace-only")]
    EmptyDocument,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
