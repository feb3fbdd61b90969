//! Configuration management for the Jira tools server
//!
//! Handles loading configuration from environment variables and TOML files,
//! with sensible defaults for everything except the Jira URL and credentials.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info, warn};

/// Upper bound Jira accepts for `maxResults` on search and listing endpoints
pub const MAX_RESULTS_CAP: u32 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Jira instance URL (required), without trailing slash
    pub jira_url: String,

    /// Authentication configuration (required)
    pub auth: AuthConfig,

    /// Cache TTL in seconds (default: 300 = 5 minutes)
    pub cache_ttl_seconds: u64,

    /// Default page size for searches and listings (default: 50, max: 100)
    pub max_search_results: u32,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthConfig {
    /// Personal Access Token (Server / Data Center)
    PersonalAccessToken(String),

    /// Basic authentication; on Jira Cloud the password is an API token
    Basic { username: String, password: String },

    /// Bearer token
    Bearer(String),

    /// Anonymous access (limited functionality)
    Anonymous,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            jira_url: String::new(),
            auth: AuthConfig::Anonymous,
            cache_ttl_seconds: 300,
            max_search_results: 50,
            request_timeout_seconds: 30,
        }
    }
}

impl JiraConfig {
    /// Load configuration from environment variables, TOML file, and defaults
    /// Priority: env vars > TOML file > defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(file_config) = Self::load_from_file("config/jira-mcp-config.toml") {
            info!("Loaded configuration from config/jira-mcp-config.toml");
            config = file_config;
        } else if let Ok(file_config) = Self::load_from_file("jira-mcp-config.toml") {
            info!("Loaded configuration from jira-mcp-config.toml");
            config = file_config;
        } else {
            debug!("No TOML configuration file found, using defaults and environment variables");
        }

        config.load_from_env()?;
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn load_from_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("JIRA_URL") {
            self.jira_url = url;
            debug!("Loaded JIRA_URL from environment");
        }

        if let Ok(auth_type) = env::var("JIRA_AUTH_TYPE") {
            match auth_type.to_lowercase().as_str() {
                "pat" | "personal_access_token" => {
                    if let Ok(token) = env::var("JIRA_TOKEN") {
                        self.auth = AuthConfig::PersonalAccessToken(token);
                        debug!("Configured Personal Access Token authentication from environment");
                    }
                }
                "basic" => {
                    let username = env::var("JIRA_USERNAME")
                        .or_else(|_| env::var("JIRA_EMAIL"))
                        .context("JIRA_USERNAME or JIRA_EMAIL required for basic authentication")?;
                    let password = env::var("JIRA_PASSWORD")
                        .or_else(|_| env::var("JIRA_API_TOKEN"))
                        .context(
                            "JIRA_PASSWORD or JIRA_API_TOKEN required for basic authentication",
                        )?;
                    self.auth = AuthConfig::Basic { username, password };
                    debug!("Configured basic authentication from environment");
                }
                "bearer" => {
                    if let Ok(token) = env::var("JIRA_TOKEN") {
                        self.auth = AuthConfig::Bearer(token);
                        debug!("Configured bearer token authentication from environment");
                    }
                }
                "anonymous" => {
                    self.auth = AuthConfig::Anonymous;
                    debug!("Configured anonymous authentication from environment");
                }
                _ => {
                    warn!("Unknown JIRA_AUTH_TYPE: {}, using default", auth_type);
                }
            }
        }

        if let Ok(ttl) = env::var("JIRA_CACHE_TTL") {
            if let Ok(ttl_seconds) = ttl.parse::<u64>() {
                self.cache_ttl_seconds = ttl_seconds;
                debug!("Set cache TTL to {} seconds from environment", ttl_seconds);
            }
        }

        if let Ok(max_results) = env::var("JIRA_MAX_RESULTS") {
            if let Ok(max) = max_results.parse::<u32>() {
                self.max_search_results = max.min(MAX_RESULTS_CAP);
                debug!(
                    "Set max search results to {} from environment",
                    self.max_search_results
                );
            }
        }

        if let Ok(timeout) = env::var("JIRA_REQUEST_TIMEOUT") {
            if let Ok(timeout_seconds) = timeout.parse::<u64>() {
                self.request_timeout_seconds = timeout_seconds;
                debug!(
                    "Set request timeout to {} seconds from environment",
                    timeout_seconds
                );
            }
        }

        Ok(())
    }

    /// Strip trailing slashes so endpoint paths can be appended directly
    fn normalize(&mut self) {
        let trimmed = self.jira_url.trim().trim_end_matches('/');
        if trimmed.len() != self.jira_url.len() {
            self.jira_url = trimmed.to_string();
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.jira_url.is_empty() {
            return Err(anyhow::anyhow!(
                "JIRA URL is required. Set JIRA_URL environment variable or configure in TOML file."
            ));
        }

        if !self.jira_url.starts_with("http://") && !self.jira_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "JIRA URL must start with http:// or https://. Got: {}",
                self.jira_url
            ));
        }

        match &self.auth {
            AuthConfig::PersonalAccessToken(token) | AuthConfig::Bearer(token) => {
                if token.is_empty() {
                    return Err(anyhow::anyhow!("Access token cannot be empty"));
                }
            }
            AuthConfig::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Username and password cannot be empty for basic auth"
                    ));
                }
            }
            AuthConfig::Anonymous => {
                info!("Using anonymous authentication - functionality may be limited");
            }
        }

        if self.max_search_results == 0 || self.max_search_results > MAX_RESULTS_CAP {
            return Err(anyhow::anyhow!(
                "max_search_results must be between 1 and {}",
                MAX_RESULTS_CAP
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("request_timeout_seconds must be positive"));
        }

        if self.cache_ttl_seconds > 3600 {
            warn!("Cache TTL is set to more than 1 hour, this may cause stale data");
        }

        info!("Configuration validation successful");
        Ok(())
    }

    /// gouqi credentials for the configured authentication
    pub fn to_gouqi_credentials(&self) -> gouqi::Credentials {
        match &self.auth {
            AuthConfig::PersonalAccessToken(token) => gouqi::Credentials::Bearer(token.clone()),
            AuthConfig::Basic { username, password } => {
                gouqi::Credentials::Basic(username.clone(), password.clone())
            }
            AuthConfig::Bearer(token) => gouqi::Credentials::Bearer(token.clone()),
            AuthConfig::Anonymous => gouqi::Credentials::Anonymous,
        }
    }
}
