use anyhow::{Context, Result};
use billtract_expenses::TemplateRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::state::{billtract_home, ensure_billtract_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub extract: ExtractSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractSection {
    /// Template used when `--template` is not given
    pub default_template: String,
    /// Optional JSON template file replacing the bundled templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract: ExtractSection {
                default_template: "bancolombia_v1".to_string(),
                templates_file: None,
            },
        }
    }
}

impl Config {
    /// `--template` wins over the configured default.
    pub fn template_name(&self, flag: Option<String>) -> String {
        flag.unwrap_or_else(|| self.extract.default_template.clone())
    }

    /// Load templates from `--templates`, then the configured file, then the
    /// bundled set.
    pub fn registry(&self, flag: Option<&Path>) -> Result<TemplateRegistry> {
        match flag.or(self.extract.templates_file.as_deref()) {
            Some(p) => TemplateRegistry::from_path(p)
                .with_context(|| format!("loading templates from {}", p.display())),
            None => TemplateRegistry::builtin().context("loading bundled templates"),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(billtract_home()?.join("config.toml"))
}

/// Read `~/.billtract/config.toml`. Never creates anything; without a home
/// directory or a config file the defaults apply.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Ok(p) => load_config_at(&p),
        Err(e) => {
            debug!(error = %e, "no home directory; using default config");
            Ok(Config::default())
        }
    }
}

fn load_config_at(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).context("parse config.toml")
}

fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn init_config() -> Result<()> {
    let p = ensure_billtract_home()?.join("config.toml");
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}
