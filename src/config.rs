use crate::parser::text::SECTION_WIDTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// arcconf binary: a name looked up on PATH, or a full path
    pub binary: String,
    /// Prefix of the trailing confirmation line stripped from every report
    pub terminator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Minimum number of dashes that make a section separator line
    pub section_width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter ("warn", "info", "arcscan=debug"…). RUST_LOG wins.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { binary: "arcconf".into(), terminator: "Command ".into() }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { section_width: SECTION_WIDTH }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".into() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Load the user config, falling back to defaults (and writing them on
    /// first run) when it is missing or unreadable.
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    /// Load an explicit config file; errors are returned, not masked.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("arcscan").join("arcscan.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    Config::load_from(&path)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if path.exists() {
        return Ok(());
    }
    write_defaults(&path)
}

fn write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# arcscan configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
