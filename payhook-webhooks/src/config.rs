//! Configuration for webhook receiving

use crate::signature::headers;
use crate::{Result, WebhookError};
use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;

/// Environment variable holding the shared signing secret
pub const ENV_SECRET: &str = "PAYHOOK_WEBHOOK_SECRET";
/// Environment variable selecting the signing algorithm (`sha256` or `sha512`)
pub const ENV_ALGORITHM: &str = "PAYHOOK_WEBHOOK_ALGORITHM";
/// Environment variable overriding the signature header name
pub const ENV_SIGNATURE_HEADER: &str = "PAYHOOK_WEBHOOK_SIGNATURE_HEADER";

/// Configuration for the webhook processor
#[derive(Debug)]
pub struct WebhookConfig {
    /// Shared secret used to verify signatures
    pub secret: SecretString,

    /// Signing algorithm
    pub signing_algorithm: SigningAlgorithm,

    /// Header the provider puts the signature in
    pub signature_header: String,
}

impl WebhookConfig {
    /// Create a configuration with defaults for everything but the secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into().into()),
            signing_algorithm: SigningAlgorithm::default(),
            signature_header: headers::SIGNATURE.to_string(),
        }
    }

    /// Create a builder for custom configuration
    pub fn builder() -> WebhookConfigBuilder {
        WebhookConfigBuilder::new()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SECRET)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| WebhookError::ConfigError(format!("{} is not set", ENV_SECRET)))?;

        let mut builder = Self::builder().secret(secret);

        if let Some(value) = lookup(ENV_ALGORITHM) {
            let algorithm = value.parse::<SigningAlgorithm>().map_err(|_| {
                WebhookError::ConfigError(format!(
                    "unsupported signing algorithm in {}: {}",
                    ENV_ALGORITHM, value
                ))
            })?;
            builder = builder.signing_algorithm(algorithm);
        }

        if let Some(header) = lookup(ENV_SIGNATURE_HEADER).filter(|h| !h.trim().is_empty()) {
            builder = builder.signature_header(header.trim());
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.secret.expose_secret().trim().is_empty() {
            return Err(WebhookError::ConfigError(
                "webhook secret must not be empty".to_string(),
            ));
        }
        if self.signature_header.trim().is_empty() {
            return Err(WebhookError::ConfigError(
                "signature header name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for WebhookConfig
#[derive(Debug, Default)]
pub struct WebhookConfigBuilder {
    secret: Option<String>,
    signing_algorithm: SigningAlgorithm,
    signature_header: Option<String>,
}

impl WebhookConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signing secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the signing algorithm
    pub fn signing_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.signing_algorithm = algorithm;
        self
    }

    /// Set the signature header name
    pub fn signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = Some(header.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<WebhookConfig> {
        let secret = self
            .secret
            .ok_or_else(|| WebhookError::ConfigError("webhook secret is required".to_string()))?;

        let config = WebhookConfig {
            secret: SecretString::new(secret.into()),
            signing_algorithm: self.signing_algorithm,
            signature_header: self
                .signature_header
                .unwrap_or_else(|| headers::SIGNATURE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Supported signing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    /// HMAC-SHA256 (default, most common)
    #[default]
    HmacSha256,

    /// HMAC-SHA512
    HmacSha512,
}

impl FromStr for SigningAlgorithm {
    type Err = WebhookError;

    /// Parse from a config value such as `sha256` or `hmac-sha512`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sha256" | "hmac-sha256" | "hmacsha256" => Ok(Self::HmacSha256),
            "sha512" | "hmac-sha512" | "hmacsha512" => Ok(Self::HmacSha512),
            other => Err(WebhookError::ConfigError(format!(
                "unsupported signing algorithm: {}",
                other
            ))),
        }
    }
}

impl SigningAlgorithm {
    /// Get the algorithm name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha256 => "sha256",
            Self::HmacSha512 => "sha512",
        }
    }
}
