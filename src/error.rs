// Error types for configuration and simulation setup

use crate::game::characters::EntityId;

/// Invalid tuning values in one of the configuration structs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{smaller} ({smaller_value}) must not exceed {larger} ({larger_value})")]
    Ordering {
        smaller: &'static str,
        smaller_value: f32,
        larger: &'static str,
        larger_value: f32,
    },
}

impl ConfigError {
    /// Check that `value` is strictly positive
    pub fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field, value })
        }
    }

    /// Check that `value` lies in `[min, max]`
    pub fn require_range(
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    ) -> Result<(), ConfigError> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }

    /// Check that `smaller_value <= larger_value`
    pub fn require_ordered(
        smaller: &'static str,
        smaller_value: f32,
        larger: &'static str,
        larger_value: f32,
    ) -> Result<(), ConfigError> {
        if smaller_value <= larger_value {
            Ok(())
        } else {
            Err(ConfigError::Ordering {
                smaller,
                smaller_value,
                larger,
                larger_value,
            })
        }
    }
}

/// Errors returned by simulation setup operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("no enemy template configured")]
    MissingEnemyTemplate,
}
