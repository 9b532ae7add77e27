use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::controller::{DEFAULT_BOUNDARY_TOLERANCE, DEFAULT_LOCK, DEFAULT_THRESHOLD, Tuning};
use crate::section::SectionList;

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub sections: Option<Vec<String>>,
    #[serde(default)]
    pub paging: PagingConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct PagingConfigFile {
    pub threshold: Option<f64>,
    pub lock_ms: Option<u64>,
    pub boundary_tolerance: Option<f64>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    /// Page layout for traces that list no `[[section]]` tables.
    pub sections: SectionList,
    pub tuning: Tuning,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(
        &mut self,
        threshold: Option<f64>,
        lock_ms: Option<u64>,
        boundary_tolerance: Option<f64>,
    ) {
        if let Some(v) = threshold {
            debug!("config: CLI override threshold={v}");
            self.paging.threshold = threshold;
        }
        if let Some(v) = lock_ms {
            debug!("config: CLI override lock_ms={v}");
            self.paging.lock_ms = lock_ms;
        }
        if let Some(v) = boundary_tolerance {
            debug!("config: CLI override boundary_tolerance={v}");
            self.paging.boundary_tolerance = boundary_tolerance;
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    ///
    /// Fails if the section list is empty or has duplicates, or a paging
    /// constant is negative.
    pub fn resolve(self) -> anyhow::Result<Config> {
        let sections = match self.sections {
            Some(ids) => SectionList::new(ids)?,
            None => SectionList::default(),
        };
        let tuning = Tuning {
            threshold: self.paging.threshold.unwrap_or(DEFAULT_THRESHOLD),
            lock: self
                .paging
                .lock_ms
                .map_or(DEFAULT_LOCK, Duration::from_millis),
            boundary_tolerance: self
                .paging
                .boundary_tolerance
                .unwrap_or(DEFAULT_BOUNDARY_TOLERANCE),
        };
        let threshold_ok = tuning.threshold.is_finite() && tuning.threshold > 0.0;
        if !threshold_ok {
            anyhow::bail!("paging.threshold must be positive, got {}", tuning.threshold);
        }
        let tolerance_ok =
            tuning.boundary_tolerance.is_finite() && tuning.boundary_tolerance >= 0.0;
        if !tolerance_ok {
            anyhow::bail!(
                "paging.boundary_tolerance must be non-negative, got {}",
                tuning.boundary_tolerance
            );
        }
        info!(
            "config: resolved sections=[{}], threshold={}, lock={}ms, boundary_tolerance={}",
            sections.iter().collect::<Vec<_>>().join(", "),
            tuning.threshold,
            tuning.lock.as_millis(),
            tuning.boundary_tolerance,
        );
        Ok(Config { sections, tuning })
    }
}

/// Resolve the XDG config path for slidenav.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("slidenav").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.sections, SectionList::default());
        assert_eq!(resolved.tuning, Tuning::default());
        assert_eq!(resolved.tuning.lock, Duration::from_millis(800));
    }

    #[test]
    fn partial_toml() {
        let text = r#"
            sections = ["intro", "work"]
            [paging]
            lock_ms = 600
        "#;
        let cfg: ConfigFile = toml::from_str(text).unwrap();
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.sections.len(), 2);
        assert_eq!(resolved.sections.id(1), Some("work"));
        assert_eq!(resolved.tuning.lock, Duration::from_millis(600));
        // Defaults for unspecified fields
        assert_eq!(resolved.tuning.threshold, 80.0);
        assert_eq!(resolved.tuning.boundary_tolerance, 15.0);
    }

    #[test]
    fn invalid_toml() {
        let text = "this is not valid toml [[[";
        let result = toml::from_str::<ConfigFile>(text);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_sections_rejected() {
        let cfg: ConfigFile = toml::from_str(r#"sections = ["a", "a"]"#).unwrap();
        assert!(cfg.resolve().is_err());
    }

    #[test]
    fn non_positive_threshold_rejected() {
        let cfg: ConfigFile = toml::from_str("[paging]\nthreshold = 0.0").unwrap();
        assert!(cfg.resolve().is_err());
    }

    #[test]
    fn cli_overrides() {
        let mut cfg: ConfigFile = toml::from_str("[paging]\nthreshold = 120.0").unwrap();
        cfg.merge_cli(Some(60.0), None, Some(4.0));
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.tuning.threshold, 60.0); // CLI wins
        assert_eq!(resolved.tuning.boundary_tolerance, 4.0);
        assert_eq!(resolved.tuning.lock, Duration::from_millis(800)); // default
    }
}
