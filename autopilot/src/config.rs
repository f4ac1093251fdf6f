use crate::util::hash_json;
use anyhow::{anyhow, Context, Result};
use reflex_core::config::PRESET_NAMES;
use reflex_core::AgentConfig;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize)]
pub struct PresetManifestEntry {
    pub preset: String,
    pub id: String,
    pub description: String,
    pub config_hash: String,
    pub config: serde_json::Value,
}

pub fn preset_names() -> &'static [&'static str] {
    &PRESET_NAMES
}

pub fn preset_config(name: &str) -> Result<AgentConfig> {
    AgentConfig::preset(name).ok_or_else(|| {
        let available = PRESET_NAMES.join(", ");
        anyhow!("unknown preset '{name}'. available: {available}")
    })
}

/// Reads a JSON config; absent fields take the default profile's values.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading config {}", path.display()))?;
    let cfg: AgentConfig = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing config {}", path.display()))?;
    cfg.validate()
        .map_err(|err| anyhow!("invalid config {}: {err}", path.display()))?;
    Ok(cfg)
}

/// A config file wins over a preset name; neither means the default preset.
pub fn resolve_config(preset: Option<&str>, config_path: Option<&Path>) -> Result<AgentConfig> {
    match (config_path, preset) {
        (Some(path), _) => load_config(path),
        (None, Some(name)) => preset_config(name),
        (None, None) => Ok(AgentConfig::default()),
    }
}

pub fn config_fingerprint(cfg: &AgentConfig) -> Result<String> {
    let value = serde_json::to_value(cfg).context("failed to serialize agent config")?;
    hash_json(&value)
}

pub fn preset_manifest() -> Result<Vec<PresetManifestEntry>> {
    let mut out = Vec::with_capacity(PRESET_NAMES.len());
    for name in PRESET_NAMES {
        let cfg = preset_config(name)?;
        let config = serde_json::to_value(&cfg).context("failed to serialize preset config")?;
        out.push(PresetManifestEntry {
            preset: name.to_string(),
            id: cfg.id.clone(),
            description: cfg.description.clone(),
            config_hash: hash_json(&config)?,
            config,
        });
    }
    Ok(out)
}

pub fn resolve_presets(input: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = input else {
        return Ok(PRESET_NAMES.iter().map(|name| name.to_string()).collect());
    };
    let mut presets = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        preset_config(token)?;
        presets.push(token.to_string());
    }
    if presets.is_empty() {
        return Err(anyhow!("--presets resolved to empty list"));
    }
    Ok(presets)
}
