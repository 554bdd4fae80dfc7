use anyhow::{Context, Result, bail};
use label_core::{Captions, ColumnNames, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const LOCAL_CONFIG: &str = "labelsheet.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub logo: PathBuf,
    pub pictogram_dir: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        AssetPaths {
            logo: PathBuf::from("UNIL-LOGOTYPE-BLUE-RGB.png"),
            pictogram_dir: PathBuf::from("pictos"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub px_per_mm: f64,
    /// Extra font registered as the `sans-serif` family.
    pub font_file: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            px_per_mm: 4.0,
            font_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product table (CSV).
    pub catalog: PathBuf,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub columns: ColumnNames,
    pub assets: AssetPaths,
    pub captions: Captions,
    pub logging: LoggingConfig,
    pub preview: PreviewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog: PathBuf::from("produits.csv"),
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_PREFIX.to_string(),
            columns: ColumnNames::default(),
            assets: AssetPaths::default(),
            captions: Captions::default(),
            logging: LoggingConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl Config {
    /// Per-user configuration file, e.g. `~/.config/labelsheet/config.toml` on Linux.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("labelsheet").join("config.toml"))
    }

    /// Load the first configuration found: `explicit`, then
    /// `./labelsheet.toml`, then the per-user file. Falls back to defaults.
    ///
    /// Returns the file actually used, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        let candidates = [Some(PathBuf::from(LOCAL_CONFIG)), Self::user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                let config = Self::from_file(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&content, base)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse TOML and resolve relative paths against `base`.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.catalog);
        join(&mut self.output_dir);
        join(&mut self.assets.logo);
        join(&mut self.assets.pictogram_dir);
        if let Some(font) = self.preview.font_file.as_mut() {
            join(font);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.trim().is_empty() {
            bail!("file_prefix must not be empty");
        }
        if self.file_prefix.contains(['/', '\\']) {
            bail!("file_prefix must not contain path separators");
        }
        if !(self.preview.px_per_mm.is_finite() && self.preview.px_per_mm > 0.0) {
            bail!("preview.px_per_mm must be a positive number");
        }
        Ok(())
    }
}
