//! Session limit configuration

use serde::Deserialize;

use crate::domain::reflection::SessionLimits;

use super::error::ValidationError;

/// Session limit configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Maximum probing rounds before summarization is forced
    #[serde(default = "default_max_probes")]
    pub max_probes: u32,

    /// Maximum correction retries for the summary
    #[serde(default = "default_max_correction_attempts")]
    pub max_correction_attempts: u32,
}

impl SessionConfig {
    /// Convert to the domain limits type
    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            max_probes: self.max_probes,
            max_correction_attempts: self.max_correction_attempts,
        }
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_probes == 0 || self.max_probes > 20 {
            return Err(ValidationError::InvalidProbeLimit);
        }
        if self.max_correction_attempts > 10 {
            return Err(ValidationError::InvalidCorrectionLimit);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_probes: default_max_probes(),
            max_correction_attempts: default_max_correction_attempts(),
        }
    }
}

fn default_max_probes() -> u32 {
    4
}

fn default_max_correction_attempts() -> u32 {
    2
}
