/// Input validation module for security and data integrity
/// Checks applied at the edges: CLI arguments and configuration
use tracing::warn;
use url::Url;

/// Longest ticker symbol accepted
pub const MAX_SYMBOL_LENGTH: usize = 10;

/// Longest address input accepted before it is passed to the node
pub const MAX_ADDRESS_INPUT_LENGTH: usize = 128;

/// Validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field format: {field} - {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field value out of range: {field} - {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Security validation failed: {reason}")]
    SecurityViolation { reason: String },
}

/// Input validation utilities
pub struct Validator;

impl Validator {
    /// Validate a currency symbol and normalize it to upper case
    pub fn validate_symbol(field: &str, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField {
                field: field.to_string(),
            });
        }

        if trimmed.len() > MAX_SYMBOL_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                reason: format!(
                    "Symbol length {} exceeds maximum {}",
                    trimmed.len(),
                    MAX_SYMBOL_LENGTH
                ),
            });
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "Symbol must be ASCII letters and digits".to_string(),
            });
        }

        Ok(trimmed.to_ascii_uppercase())
    }

    /// Reject empty or hostile address input. The address format itself is left to the node.
    pub fn validate_address_input(input: &str) -> Result<String, ValidationError> {
        // Check for suspicious patterns
        if input.contains('\0') || input.contains('\n') || input.contains('\r') {
            return Err(ValidationError::SecurityViolation {
                reason: "Address contains null bytes or control characters".to_string(),
            });
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField {
                field: "address".to_string(),
            });
        }

        Self::sanitize_string(trimmed, MAX_ADDRESS_INPUT_LENGTH)
    }

    /// Validate an endpoint URL: must parse and use http or https
    pub fn validate_endpoint_url(field: &str, input: &str) -> Result<Url, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: field.to_string(),
            });
        }

        let url = Url::parse(input).map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("Failed to parse URL: {}", e),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("URL scheme must be http or https, got {}", other),
            }),
        }
    }

    /// Sanitize string input to prevent injection attacks
    pub fn sanitize_string(input: &str, max_length: usize) -> Result<String, ValidationError> {
        if input.len() > max_length {
            return Err(ValidationError::OutOfRange {
                field: "string_input".to_string(),
                reason: format!("Length {} exceeds maximum {}", input.len(), max_length),
            });
        }

        // Remove control characters and null bytes
        let sanitized: String = input
            .chars()
            .filter(|c| !c.is_control() && *c != '\0')
            .collect();

        if sanitized != input {
            warn!("Input sanitized: removed control characters");
        }

        Ok(sanitized)
    }
}
