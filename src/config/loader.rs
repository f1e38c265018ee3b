use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

use super::AppConfig;

pub const ENV_PREFIX: &str = "DASHBOARD";

impl AppConfig {
    /// Layer the TOML file (if present) and `DASHBOARD__*` variables over the
    /// built-in defaults.
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        // A missing .env is fine; the variables may come from the shell.
        let _ = dotenvy::dotenv();

        Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
