//! Error types for document store operations.

use thiserror::Error;

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified error type for document store operations
#[derive(Debug, Error)]
pub enum StoreError {
	/// Connection error
	#[error("Connection error: {0}")]
	Connection(String),

	/// Query/operation execution error
	#[error("Execution error: {0}")]
	Execution(String),

	/// Document not found
	#[error("Not found: {0}")]
	NotFound(String),

	/// Serialization/deserialization error
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Malformed filter or update document
	#[error("Invalid filter: {0}")]
	InvalidFilter(String),

	/// Operator or feature not supported by this backend
	#[error("Unsupported operation: {0}")]
	Unsupported(String),

	/// Backend-specific error (contains the original error message)
	#[error("Database error: {0}")]
	Database(String),
}

impl From<serde_json::Error> for StoreError {
	fn from(err: serde_json::Error) -> Self {
		StoreError::Serialization(err.to_string())
	}
}

impl From<bson::error::Error> for StoreError {
	fn from(err: bson::error::Error) -> Self {
		StoreError::Serialization(err.to_string())
	}
}

impl From<regex::Error> for StoreError {
	fn from(err: regex::Error) -> Self {
		StoreError::InvalidFilter(err.to_string())
	}
}
