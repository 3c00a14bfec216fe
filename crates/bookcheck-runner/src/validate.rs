//! Response shape validation against the fixed booking schema

use std::path::Path;

/// The schema shipped with the crate: shape of a `POST /booking` response.
pub const BUNDLED_SCHEMA: &str = include_str!("../schemas/booking-schema.json");

/// At most this many violations are reported per body.
const MAX_VIOLATIONS: usize = 10;

/// Compiled schema. Stateless after construction and shareable across workers.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compile the bundled schema.
    ///
    /// # Errors
    ///
    /// Returns error if the bundled document does not compile.
    pub fn bundled() -> Result<Self, SchemaError> {
        let schema: serde_json::Value =
            serde_json::from_str(BUNDLED_SCHEMA).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_value(&schema)
    }

    /// Load and compile a schema file.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {e}", path.display())))?;
        let schema: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_value(&schema)
    }

    pub fn from_value(schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Check `body` against the schema.
    ///
    /// # Errors
    ///
    /// Returns each violated constraint as a message.
    pub fn validate(&self, body: &serde_json::Value) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(body)
            .take(MAX_VIOLATIONS)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Cannot read schema {0}")]
    Io(String),
    #[error("Schema is not valid JSON: {0}")]
    Parse(String),
    #[error("Schema does not compile: {0}")]
    Compile(String),
}
