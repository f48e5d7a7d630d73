//! Configuration model loaded from external sources.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::media::MediaPolicy;
use crate::media::compression::CompressionOptions;
use crate::services::business_form::FormSettings;

const MB: u64 = 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
/// Settings of the marketplace client.
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_preview_origin")]
    pub preview_origin: String,
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    #[serde(default = "default_redirect_delay_ms")]
    pub success_redirect_delay_ms: u64,
    #[serde(default = "default_require_csrf")]
    pub require_csrf: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Limits applied to photos and videos.
pub struct MediaConfig {
    pub photo_max_mb: u64,
    pub video_max_mb: u64,
    pub video_mime: Vec<String>,
    pub image_max_dimension: u32,
    pub image_target_kb: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let photos = MediaPolicy::photos();
        let videos = MediaPolicy::videos();
        let compression = CompressionOptions::default();
        Self {
            photo_max_mb: photos.max_megabytes(),
            video_max_mb: videos.max_megabytes(),
            video_mime: videos.accepted_mime,
            image_max_dimension: compression.max_dimension,
            image_target_kb: compression.target_bytes / 1024,
        }
    }
}

fn default_preview_origin() -> String {
    "http://localhost".to_string()
}

fn default_listing_path() -> String {
    FormSettings::default().listing_path
}

fn default_redirect_delay_ms() -> u64 {
    1500
}

fn default_require_csrf() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl ClientConfig {
    /// Reads `default` and the optional `app_env` profile from `config_dir`,
    /// then applies `APP_`-prefixed environment variables. Nested keys use a
    /// double underscore, e.g. `APP_MEDIA__VIDEO_MAX_MB`.
    pub fn load(config_dir: &Path, app_env: &str) -> Result<Self, ConfigError> {
        Self::load_with(config_dir, app_env, environment())
    }

    fn load_with(config_dir: &Path, app_env: &str, env: Environment) -> Result<Self, ConfigError> {
        let default = config_dir.join("default");
        let profile = config_dir.join(app_env);

        Config::builder()
            .add_source(File::with_name(&default.to_string_lossy()))
            .add_source(File::with_name(&profile.to_string_lossy()).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn photo_policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_bytes: self.media.photo_max_mb * MB,
            ..MediaPolicy::photos()
        }
    }

    pub fn video_policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_bytes: self.media.video_max_mb * MB,
            accepted_mime: self.media.video_mime.clone(),
            ..MediaPolicy::videos()
        }
    }

    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            max_dimension: self.media.image_max_dimension,
            target_bytes: self.media.image_target_kb * 1024,
            ..CompressionOptions::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            listing_path: self.listing_path.clone(),
            success_redirect_delay: Duration::from_millis(self.success_redirect_delay_ms),
            require_csrf: self.require_csrf,
            photo_policy: self.photo_policy(),
            video_policy: self.video_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn profile_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.yaml"),
            "api_base_url: https://market.example.com\nmedia:\n  video_max_mb: 80\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.yaml"),
            "listing_path: /dashboard\nrequire_csrf: false\n",
        )
        .unwrap();

        let config = ClientConfig::load(dir.path(), "staging").unwrap();

        assert_eq!(config.api_base_url, "https://market.example.com");
        assert_eq!(config.listing_path, "/dashboard");
        assert!(!config.require_csrf);
        assert_eq!(config.video_policy().max_megabytes(), 80);
        assert_eq!(config.photo_policy().max_megabytes(), 5);
        assert_eq!(config.compression_options().max_dimension, 1920);
    }

    #[test]
    fn missing_profile_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.yaml"),
            "api_base_url: http://localhost:8000\n",
        )
        .unwrap();

        let config = ClientConfig::load(dir.path(), "local").unwrap();
        let settings = config.form_settings();

        assert_eq!(settings.listing_path, "/my-businesses");
        assert_eq!(settings.success_redirect_delay, Duration::from_millis(1500));
        assert!(settings.require_csrf);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_nested_media_limits() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.yaml"),
            "api_base_url: https://market.example.com\nmedia:\n  video_max_mb: 80\n",
        )
        .unwrap();
        let vars = config::Map::from([
            ("APP_MEDIA__VIDEO_MAX_MB".to_string(), "120".to_string()),
            ("APP_REQUIRE_CSRF".to_string(), "false".to_string()),
        ]);

        let config =
            ClientConfig::load_with(dir.path(), "local", environment().source(Some(vars))).unwrap();

        assert_eq!(config.video_policy().max_megabytes(), 120);
        assert_eq!(config.photo_policy().max_megabytes(), 5);
        assert!(!config.require_csrf);
    }

    #[test]
    fn missing_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load(dir.path(), "local").is_err());
    }
}
