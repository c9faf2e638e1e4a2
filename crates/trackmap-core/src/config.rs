use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ColumnMapping;
use crate::error::ConfigError;
use crate::render::{RenderOptions, DEFAULT_STARTUP_DELAY_MS, DEFAULT_ZOOM};

pub const DEFAULT_CONFIG_FILE: &str = "trackmap.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "track_map.html";
pub const MAP_API_KEY_ENV: &str = "TRACKMAP_MAP_API_KEY";

const MAX_ZOOM: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_file: PathBuf,
    pub map_api_key: Option<String>,
    pub startup_delay_ms: u32,
    pub zoom: u8,
    pub columns: ColumnMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            map_api_key: None,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            zoom: DEFAULT_ZOOM,
            columns: ColumnMapping::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    /// An explicit path must exist. Without one, `trackmap.toml` in the working directory is
    /// used when present, otherwise the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            startup_delay_ms: self.startup_delay_ms,
            zoom: self.zoom,
        }
    }

    /// Precedence: command line, then `TRACKMAP_MAP_API_KEY`, then the config file, else empty.
    pub fn resolve_api_key(&self, from_cli: Option<&str>) -> String {
        let from_env = std::env::var(MAP_API_KEY_ENV).ok();
        self.resolve_api_key_with(from_cli, from_env.as_deref())
    }

    pub(crate) fn resolve_api_key_with(
        &self,
        from_cli: Option<&str>,
        from_env: Option<&str>,
    ) -> String {
        from_cli
            .or(from_env)
            .or(self.map_api_key.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom == 0 || self.zoom > MAX_ZOOM {
            return Err(ConfigError::Invalid(format!(
                "zoom must be between 1 and {MAX_ZOOM}, got {}",
                self.zoom
            )));
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_file must not be empty".into()));
        }
        let columns = &self.columns;
        for (field, name) in [
            ("start_time", &columns.start_time),
            ("longitude", &columns.longitude),
            ("latitude", &columns.latitude),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "columns.{field} must name a column"
                )));
            }
        }
        Ok(())
    }
}
