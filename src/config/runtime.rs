use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub universe: UniverseSettings,
    pub sessions: SessionSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Server validation
        if self.server.port == 0 {
            errors.push("server.port must be > 0".to_string());
        }
        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }

        // Universe validation
        match &self.universe.source {
            UniverseSource::Csv { path } if path.as_os_str().is_empty() => {
                errors.push("universe.source.path must not be empty".to_string());
            }
            UniverseSource::Http { url } if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(format!("universe.source.url must be an http(s) URL, got '{}'", url));
            }
            _ => {}
        }
        if self.universe.timeout_secs == 0 {
            errors.push("universe.timeout_secs must be > 0".to_string());
        }

        // Session validation
        if self.sessions.ttl_secs == 0 {
            errors.push("sessions.ttl_secs must be > 0".to_string());
        }
        if self.sessions.sweep_interval_secs == 0 {
            errors.push("sessions.sweep_interval_secs must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSettings {
    pub timeout_secs: u64,
    pub source: UniverseSource,
}

impl UniverseSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            source: UniverseSource::Builtin,
        }
    }
}

/// Where the tradable universe is read from at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UniverseSource {
    #[default]
    Builtin,
    Csv { path: PathBuf },
    Http { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub json: bool,
}
