use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::routing::types::RoutingOptions;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "cablepath";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Distance within which two connection points are the same joint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_tolerance: Option<f64>,

    /// Stitch gaps longer than this are rendered as `>>` breaks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_split_distance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_code_len: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansion_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Multiplier applied to lengths when they are displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_scale: Option<f64>,
}

const KEYS: &str = "routing.connection_tolerance, routing.jump_split_distance, \
    routing.branch_code_len, routing.max_expansion_depth, report.length_scale";

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `cablepath config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// The user config, or defaults when there is none. A config that exists
    /// but cannot be used is reported and ignored.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                if Self::path().is_ok_and(|p| p.exists()) {
                    warn!("Ignoring config: {e:#}");
                }
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# cablepath configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Set one key. The config is left unchanged if the value is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match key {
            "routing.connection_tolerance" => {
                next.routing_mut().connection_tolerance = Some(parse_number(key, value)?);
            }
            "routing.jump_split_distance" => {
                next.routing_mut().jump_split_distance = Some(parse_number(key, value)?);
            }
            "routing.branch_code_len" => {
                let v = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid {key}: {value}. Must be a whole number.")
                })?;
                next.routing_mut().branch_code_len = Some(v);
            }
            "routing.max_expansion_depth" => {
                next.routing_mut().max_expansion_depth = match value {
                    "none" | "unlimited" => None,
                    _ => Some(value.parse().map_err(|_| {
                        anyhow::anyhow!(
                            "Invalid {key}: {value}. Must be a whole number or 'none'."
                        )
                    })?),
                };
            }
            "report.length_scale" => {
                next.report
                    .get_or_insert_with(ReportConfig::default)
                    .length_scale = Some(parse_number(key, value)?);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {KEYS}"),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check every value that is set, whether it came from a file or from `set`.
    pub fn validate(&self) -> Result<()> {
        if let Some(routing) = &self.routing {
            if let Some(v) = routing.connection_tolerance {
                require_positive("routing.connection_tolerance", v)?;
            }
            if let Some(v) = routing.jump_split_distance {
                if !(v.is_finite() && v >= 0.0) {
                    anyhow::bail!(
                        "Invalid routing.jump_split_distance: {v}. Must be a non-negative number."
                    );
                }
            }
            if routing.branch_code_len == Some(0) {
                anyhow::bail!("Invalid routing.branch_code_len: 0. Must be at least 1.");
            }
        }
        if let Some(v) = self.report.as_ref().and_then(|r| r.length_scale) {
            require_positive("report.length_scale", v)?;
        }
        Ok(())
    }

    fn routing_mut(&mut self) -> &mut RoutingConfig {
        self.routing.get_or_insert_with(RoutingConfig::default)
    }

    /// Engine options with unset keys taken from the defaults.
    pub fn routing_options(&self) -> RoutingOptions {
        let defaults = RoutingOptions::default();
        let Some(routing) = &self.routing else {
            return defaults;
        };
        RoutingOptions {
            connection_tolerance: routing
                .connection_tolerance
                .unwrap_or(defaults.connection_tolerance),
            jump_split_distance: routing
                .jump_split_distance
                .unwrap_or(defaults.jump_split_distance),
            branch_code_len: routing.branch_code_len.unwrap_or(defaults.branch_code_len),
            max_expansion_depth: routing.max_expansion_depth.or(defaults.max_expansion_depth),
        }
    }

    pub fn length_scale(&self) -> f64 {
        self.report
            .as_ref()
            .and_then(|r| r.length_scale)
            .unwrap_or(1.0)
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be a number."))
}

fn require_positive(key: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        anyhow::bail!("Invalid {key}: {v}. Must be greater than zero.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_engine_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.routing_options(), RoutingOptions::default());
        assert_eq!(config.length_scale(), 1.0);
    }

    #[test]
    fn partial_routing_section_overrides_only_given_keys() {
        let yaml = "routing:\n  jump_split_distance: 2.5\n  max_expansion_depth: 3\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let options = config.routing_options();
        assert_eq!(options.jump_split_distance, 2.5);
        assert_eq!(options.max_expansion_depth, Some(3));
        assert_eq!(options.branch_code_len, 4);
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        config.set("routing.branch_code_len", "6").unwrap();
        config.set("report.length_scale", "0.3048").unwrap();
        config.set("routing.max_expansion_depth", "none").unwrap();
        assert_eq!(config.routing_options().branch_code_len, 6);
        assert_eq!(config.length_scale(), 0.3048);
        assert_eq!(config.routing_options().max_expansion_depth, None);

        assert!(config.set("routing.branch_code_len", "0").is_err());
        assert!(config.set("routing.connection_tolerance", "-1").is_err());
        assert!(config.set("routing.connection_tolerance", "0").is_err());
        assert!(config.set("routing.jump_split_distance", "far").is_err());
        assert!(config.set("report.length_scale", "0").is_err());
        assert!(config.set("defaults.theme", "dark").is_err());
    }

    #[test]
    fn file_values_are_validated() {
        for yaml in [
            "routing:\n  connection_tolerance: 0\n",
            "routing:\n  connection_tolerance: -0.5\n",
            "routing:\n  jump_split_distance: -1\n",
            "routing:\n  branch_code_len: 0\n",
            "report:\n  length_scale: 0\n",
        ] {
            let config: Config = serde_yaml::from_str(yaml).unwrap();
            assert!(config.validate().is_err(), "accepted {yaml:?}");
        }

        let ok: Config = serde_yaml::from_str("routing:\n  jump_split_distance: 0\n").unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("cablepath-{}-bad.yaml", std::process::id()));
        std::fs::write(&path, "routing:\n  connection_tolerance: 0\n").unwrap();
        let result = Config::load_from(&path);
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("routing.connection_tolerance"));
    }

    #[test]
    fn rejected_set_leaves_config_unchanged() {
        let mut config = Config::default();
        config.set("routing.branch_code_len", "6").unwrap();
        assert!(config.set("routing.branch_code_len", "0").is_err());
        assert_eq!(config.routing_options().branch_code_len, 6);
    }

    #[test]
    fn round_trips_through_yaml() {
        let mut config = Config::default();
        config.set("routing.connection_tolerance", "0.5").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
