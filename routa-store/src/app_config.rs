use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub redis: RedisConfig,
    pub identity: IdentityConfig,
    pub booking_rules: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// "memory" or "redis".
    pub backend: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// Admin identities granted at process start; mutable afterwards only
    /// through the directory service.
    #[serde(default)]
    pub seed_admins: Vec<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_max_seats")]
    pub max_seats_per_booking: u32,
}

fn default_max_seats() -> u32 {
    9
}

impl Default for BookingRules {
    fn default() -> Self {
        Self { max_seats_per_booking: default_max_seats() }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of ROUTA)
            .add_source(config::Environment::with_prefix("ROUTA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
