//! Error types for configuration loading and content lookups.

/// Raised when game content (phases, enemy/boss/power-up names) is invalid.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown boss type: {0}")]
    UnknownBossType(String),

    #[error("Unknown enemy type: {0}")]
    UnknownEnemyType(String),

    /// Arena must fit the player ship inside its boundary margin.
    #[error("Arena {width}x{height} is too small or not finite")]
    InvalidArena { width: f32, height: f32 },

    /// Spawn rate of zero would make `frame % spawn_rate` undefined.
    #[error("Phase {phase}: spawn rate must be positive")]
    InvalidSpawnRate { phase: u32 },

    #[error("Phase list is empty")]
    EmptyPhaseList,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
