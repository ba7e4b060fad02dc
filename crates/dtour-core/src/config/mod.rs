//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// dtour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub progress: ProgressConfig,
}

/// Remote endpoints and the origins used to build links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the tour's execution API
    pub api_base: String,
    /// Base URL of the paste-hosting API used for gists
    pub gist_api: String,
    /// Origin of this application, used for replay-from-gist links
    pub app_origin: String,
    /// Origin of the hosted standalone editor
    pub standalone_origin: String,
    /// Hosts treated as local development (standalone links stay local)
    pub local_hosts: Vec<String>,
    /// HTTP timeout; 0 disables the client-side timeout
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub default_compiler: String,
    pub github_repo: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub tick_ms: u64,
    pub step: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                api_base: "https://tour.dlang.org".to_string(),
                gist_api: "https://api.github.com".to_string(),
                app_origin: "https://tour.dlang.org".to_string(),
                standalone_origin: "https://run.dlang.io".to_string(),
                local_hosts: vec![
                    "localhost".to_string(),
                    "127.0.0.1".to_string(),
                    "0.0.0.0".to_string(),
                ],
                timeout_secs: 0,
            },
            session: SessionConfig {
                default_compiler: "dmd".to_string(),
                github_repo: "dlang-tour/english".to_string(),
                language: "en".to_string(),
            },
            progress: ProgressConfig {
                tick_ms: 100,
                step: 5,
            },
        }
    }
}

impl ServiceConfig {
    /// API base with the `DTOUR_API_BASE` environment override applied
    pub fn resolved_api_base(&self) -> String {
        env::var("DTOUR_API_BASE").unwrap_or_else(|_| self.api_base.clone())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("DTOUR_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("dtour")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path of the JSON file holding persisted snippet slots
    pub fn storage_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("sessions.json"))
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("service.api_base", &self.service.api_base),
            ("service.gist_api", &self.service.gist_api),
            ("service.app_origin", &self.service.app_origin),
            ("service.standalone_origin", &self.service.standalone_origin),
        ] {
            url::Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
        }
        if self.session.default_compiler.trim().is_empty() {
            return Err(anyhow!("session.default_compiler must not be empty"));
        }
        if self.progress.tick_ms == 0 {
            return Err(anyhow!("progress.tick_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "service.api_base" => Ok(self.service.api_base.clone()),
            "service.gist_api" => Ok(self.service.gist_api.clone()),
            "service.app_origin" => Ok(self.service.app_origin.clone()),
            "service.standalone_origin" => Ok(self.service.standalone_origin.clone()),
            "service.local_hosts" => Ok(self.service.local_hosts.join(", ")),
            "service.timeout_secs" => Ok(self.service.timeout_secs.to_string()),

            "session.default_compiler" => Ok(self.session.default_compiler.clone()),
            "session.github_repo" => Ok(self.session.github_repo.clone()),
            "session.language" => Ok(self.session.language.clone()),

            "progress.tick_ms" => Ok(self.progress.tick_ms.to_string()),
            "progress.step" => Ok(self.progress.step.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `dtour config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "service.api_base" | "service.gist_api" | "service.app_origin"
            | "service.standalone_origin" => {
                url::Url::parse(value).with_context(|| format!("Invalid URL for {}: {}", key, value))?;
                let value = value.trim_end_matches('/').to_string();
                match key {
                    "service.api_base" => self.service.api_base = value,
                    "service.gist_api" => self.service.gist_api = value,
                    "service.app_origin" => self.service.app_origin = value,
                    _ => self.service.standalone_origin = value,
                }
            }
            "service.local_hosts" => {
                self.service.local_hosts = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "service.timeout_secs" => {
                self.service.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "session.default_compiler" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Default compiler must not be empty"));
                }
                self.session.default_compiler = value.trim().to_string();
            }
            "session.github_repo" => {
                if value.split('/').filter(|part| !part.is_empty()).count() != 2 {
                    return Err(anyhow!(
                        "Invalid GitHub repository: {}. Expected <owner>/<name>",
                        value
                    ));
                }
                self.session.github_repo = value.to_string();
            }
            "session.language" => {
                self.session.language = value.to_string();
            }

            "progress.tick_ms" => {
                let tick: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid tick_ms value: {}", value))?;
                if tick == 0 {
                    return Err(anyhow!("Progress tick must be greater than zero"));
                }
                self.progress.tick_ms = tick;
            }
            "progress.step" => {
                let step: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid step value: {}", value))?;
                if !(1..=100).contains(&step) {
                    return Err(anyhow!("Progress step must be between 1 and 100"));
                }
                self.progress.step = step;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `dtour config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "service.api_base",
            "service.gist_api",
            "service.app_origin",
            "service.standalone_origin",
            "service.local_hosts",
            "service.timeout_secs",
            "session.default_compiler",
            "session.github_repo",
            "session.language",
            "progress.tick_ms",
            "progress.step",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
