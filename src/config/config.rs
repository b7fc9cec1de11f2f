use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable that overrides the configured service address
pub const BASE_URL_ENV: &str = "STYLE_SEARCH_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base address of the recommendation service
    pub base_url: String,

    /// Give up on a request after this many seconds (unset = wait forever)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for status icons
    pub use_glyphs: bool,

    /// Decimal places shown for scores
    pub score_precision: usize,

    /// Show the image reference under each result
    pub show_image_urls: bool,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub search: String,
    pub busy: String,
    pub error: String,
    pub success: String,
    pub image: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            score_precision: 3,
            show_image_urls: true,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            search: "🔎".to_string(),
            busy: "⏳".to_string(),
            error: "❌".to_string(),
            success: "✅".to_string(),
            image: "🖼".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            search: ">".to_string(),
            busy: "[..]".to_string(),
            error: "[X]".to_string(),
            success: "[OK]".to_string(),
            image: "[img]".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("style-search").join("config.toml"))
    }

    /// Pick the service address: command line, then environment, then config file
    pub fn resolve_base_url(&self, cli_url: Option<&str>, env_url: Option<&str>) -> String {
        let given = |url: &&str| !url.trim().is_empty();
        cli_url
            .filter(given)
            .or(env_url.filter(given))
            .unwrap_or(self.service.base_url.as_str())
            .trim_end_matches('/')
            .to_string()
    }

    /// A default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# style-search configuration
# Location: ~/.config/style-search/config.toml (Linux)
#           ~/Library/Application Support/style-search/config.toml (macOS)
#           %APPDATA%\style-search\config.toml (Windows)

[service]
# Base address of the recommendation service (POST <base_url>/recommend)
# Overridden by --url or the STYLE_SEARCH_API_URL environment variable
base_url = "http://127.0.0.1:8000"

# Abort a request after this many seconds. Leave commented to wait indefinitely.
# request_timeout_secs = 30

[display]
# Use Unicode glyphs for status icons; false switches to ASCII
use_glyphs = true

# Decimal places shown for relevance scores
score_precision = 3

# Show the image reference of each outfit
show_image_urls = true
"#
        .to_string()
    }
}
