use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::mode::PanelMode;

pub const DEFAULT_OPTIONS_FILE: &str = "panel.toml";

/// Options the host hands to the panel. `api`, `api_key` and `device` are
/// templates and go through the variable resolver before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelOptions {
    pub title: String,
    pub api: String,
    pub api_key: String,
    pub device: String,
    pub mode: i64,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            title: "Dettagli Bilancia".into(),
            api: "http://localhost:8888".into(),
            api_key: String::new(),
            device: String::new(),
            mode: 0,
        }
    }
}

impl PanelOptions {
    pub fn mode(&self) -> PanelMode {
        PanelMode::from_index(self.mode)
    }

    fn normalize(&mut self) {
        if !(0..=3).contains(&self.mode) {
            warn!(mode = self.mode, "panel mode out of range, using 0");
            self.mode = 0;
        }
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit `path` must exist; without one, `panel.toml` in the working
/// directory is read when present.
pub fn load_options(path: Option<&Path>) -> anyhow::Result<PanelOptions> {
    let mut options = match path {
        Some(path) => read_options_file(path)?,
        None if Path::new(DEFAULT_OPTIONS_FILE).exists() => {
            read_options_file(Path::new(DEFAULT_OPTIONS_FILE))?
        }
        None => PanelOptions::default(),
    };

    apply_env_overrides(&mut options, |key| std::env::var(key).ok());
    options.normalize();
    Ok(options)
}

pub fn read_options_file(path: &Path) -> anyhow::Result<PanelOptions> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read panel options '{}'", path.display()))?;
    parse_options(&raw)
        .with_context(|| format!("failed to parse panel options '{}'", path.display()))
}

pub fn parse_options(raw: &str) -> anyhow::Result<PanelOptions> {
    let mut options: PanelOptions = toml::from_str(raw)?;
    options.normalize();
    Ok(options)
}

/// Applies `HIVE_PANEL_*` then `APP__*` variables; the latter win.
pub fn apply_env_overrides(options: &mut PanelOptions, lookup: impl Fn(&str) -> Option<String>) {
    for prefix in ["HIVE_PANEL_", "APP__"] {
        if let Some(v) = lookup(&format!("{prefix}TITLE")) {
            options.title = v;
        }
        if let Some(v) = lookup(&format!("{prefix}API")) {
            options.api = v;
        }
        if let Some(v) = lookup(&format!("{prefix}API_KEY")) {
            options.api_key = v;
        }
        if let Some(v) = lookup(&format!("{prefix}DEVICE")) {
            options.device = v;
        }
        if let Some(v) = lookup(&format!("{prefix}MODE")) {
            match v.trim().parse::<i64>() {
                Ok(parsed) => options.mode = parsed,
                Err(_) => warn!(value = %v, "ignoring non-numeric {prefix}MODE"),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
