//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_bytes must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.upload.field_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.field_name must not be empty".into(),
            ));
        }

        let prefix = &self.server.route_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(ConfigError::ValidationError(format!(
                "server.route_prefix must be empty or start with '/' and not end with '/': {prefix:?}"
            )));
        }

        let url = url::Url::parse(&self.server.external_url).map_err(|e| {
            ConfigError::ValidationError(format!("server.external_url is not a valid URL: {e}"))
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::ValidationError(
                "server.external_url must be an absolute http(s) URL".into(),
            ));
        }
        Ok(())
    }
}
