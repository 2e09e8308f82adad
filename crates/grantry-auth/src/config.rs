//! Grant core configuration.
//!
//! Lifetimes are plain `std::time::Duration` values read with
//! `humantime_serde`, so they can be written as `"10m"` or `"30s"`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Markup tags kept by the description sanitizer unless configured otherwise.
pub const DEFAULT_DESCRIPTION_TAGS: [&str; 11] = [
    "b", "i", "em", "strong", "p", "ol", "ul", "li", "br", "pre", "code",
];

/// Root configuration for the grant core.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.oauth]
/// authorization_code_lifetime = "10m"
/// access_token_lifetime = "3m"
///
/// [auth.registration]
/// allowed_description_tags = ["b", "i", "p"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token and code lifetimes.
    pub oauth: OAuthConfig,

    /// Client registration options.
    pub registration: RegistrationConfig,
}

/// OAuth 2.0 lifetimes and housekeeping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// How often the background reaper purges expired codes and tokens.
    #[serde(with = "humantime_serde")]
    pub reap_interval: Duration,

    /// Treat the client's registering user as the approving resource owner
    /// when the authorization request carries no authenticated user.
    ///
    /// Only meant for local development without a login layer.
    pub implicit_owner_approval: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(180),       // 3 minutes
            reap_interval: Duration::from_secs(30),
            implicit_owner_approval: false,
        }
    }
}

impl OAuthConfig {
    /// Authorization code lifetime as a `time::Duration`.
    #[must_use]
    pub fn code_lifetime(&self) -> time::Duration {
        to_time_duration(self.authorization_code_lifetime)
    }

    /// Access token lifetime as a `time::Duration`.
    #[must_use]
    pub fn access_lifetime(&self) -> time::Duration {
        to_time_duration(self.access_token_lifetime)
    }
}

fn to_time_duration(duration: Duration) -> time::Duration {
    time::Duration::try_from(duration).unwrap_or(time::Duration::MAX)
}

/// Client registration options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Markup tags kept in client descriptions. Attributes are always
    /// stripped.
    pub allowed_description_tags: Vec<String>,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            allowed_description_tags: DEFAULT_DESCRIPTION_TAGS
                .iter()
                .map(|tag| (*tag).to_string())
                .collect(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A lifetime or the reap interval is zero
    /// - A description tag is not a plain lowercase tag name
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oauth.authorization_code_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code_lifetime must be > 0".to_string(),
            ));
        }

        if self.oauth.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.oauth.reap_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "reap_interval must be > 0".to_string(),
            ));
        }

        for tag in &self.registration.allowed_description_tags {
            let plain = !tag.is_empty()
                && tag
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
            if !plain {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid description tag: '{}'. Tags must be lowercase names like 'p' or 'h1'",
                    tag
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
        assert_eq!(config.oauth.access_token_lifetime, Duration::from_secs(180));
        assert_eq!(config.oauth.code_lifetime(), time::Duration::minutes(10));
        assert_eq!(config.oauth.access_lifetime(), time::Duration::minutes(3));
        assert!(!config.oauth.implicit_owner_approval);
        assert_eq!(config.registration.allowed_description_tags.len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_deserialization() {
        let json = r#"{
            "oauth": {
                "authorization_code_lifetime": "5m",
                "access_token_lifetime": "90s"
            }
        }"#;
        let config: AuthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(300)
        );
        assert_eq!(config.oauth.access_token_lifetime, Duration::from_secs(90));
        assert_eq!(config.oauth.reap_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_lifetimes() {
        let mut config = AuthConfig::default();
        config.oauth.access_token_lifetime = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut config = AuthConfig::default();
        config.oauth.reap_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tags() {
        let mut config = AuthConfig::default();
        config.registration.allowed_description_tags = vec!["script onload".to_string()];
        assert!(config.validate().is_err());

        config.registration.allowed_description_tags = vec!["h1".to_string()];
        assert!(config.validate().is_ok());
    }
}
