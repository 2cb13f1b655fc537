/// Configuration errors. Fatal at startup, never tolerated at query time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    #[error("experiment '{experiment}' splits sum to {sum}, expected 100")]
    UnbalancedSplits { experiment: String, sum: u32 },

    #[error("no collection mapping registered for category {category}")]
    MissingCategoryMapping { category: String },

    #[error("invalid threshold {name} = {value}: {reason}")]
    InvalidThreshold {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: String, reason: String },
}
