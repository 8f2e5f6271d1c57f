//! Capability probes: installed Composer packages and PHP runtime state.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::repository::ConfigValue;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid composer metadata in {path}: {source}")]
    Composer {
        path: String,
        source: serde_json::Error,
    },
    #[error("`php -i` could not be run: {0}")]
    Php(String),
}

/// Answers whether an optional dependency is available to the project.
pub trait CapabilityDetector: Send + Sync {
    fn is_installed(&self, package: &str) -> bool;
}

#[derive(Deserialize)]
struct ComposerPackage {
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InstalledJson {
    /// Composer 2: `{"packages": [...], "dev": true}`
    V2 { packages: Vec<ComposerPackage> },
    /// Composer 1: a bare array
    V1(Vec<ComposerPackage>),
}

/// Installed packages as recorded in `vendor/composer/installed.json`.
#[derive(Debug, Clone, Default)]
pub struct ComposerPackages {
    names: HashSet<String>,
}

impl ComposerPackages {
    pub const INSTALLED_JSON: &'static str = "vendor/composer/installed.json";

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|n| n.into().to_lowercase()).collect(),
        }
    }

    pub fn parse(source: &str, path: &str) -> Result<Self, ProbeError> {
        let installed: InstalledJson =
            serde_json::from_str(source).map_err(|source| ProbeError::Composer {
                path: path.to_string(),
                source,
            })?;
        let packages = match installed {
            InstalledJson::V2 { packages } => packages,
            InstalledJson::V1(packages) => packages,
        };
        Ok(Self::from_names(packages.into_iter().map(|p| p.name)))
    }

    /// Load the installed package list of the project at `base_path`.
    /// A project without `vendor/` has no packages installed.
    pub fn load(base_path: &Path) -> Result<Self, ProbeError> {
        let path = base_path.join(Self::INSTALLED_JSON);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no installed.json, assuming no packages");
            return Ok(Self::default());
        }
        let display = path.display().to_string();
        let content = std::fs::read_to_string(&path).map_err(|source| ProbeError::Io {
            path: display.clone(),
            source,
        })?;
        Self::parse(&content, &display)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CapabilityDetector for ComposerPackages {
    fn is_installed(&self, package: &str) -> bool {
        self.names.contains(&package.to_lowercase())
    }
}

static DIRECTIVE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+\.[A-Za-z0-9_.]+)\s*=>\s*(.*?)(?:\s*=>\s*(.*))?$")
        .expect("valid directive regex")
});

/// Snapshot of the PHP runtime relevant to opcode caching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhpRuntime {
    pub opcache_loaded: bool,
    pub directives: BTreeMap<String, ConfigValue>,
}

impl PhpRuntime {
    pub fn new(opcache_loaded: bool, directives: BTreeMap<String, ConfigValue>) -> Self {
        Self {
            opcache_loaded,
            directives,
        }
    }

    /// Parse the text output of `php -i`. The local value column wins.
    pub fn from_phpinfo(output: &str) -> Self {
        let mut runtime = Self::default();
        for line in output.lines() {
            let line = line.trim();
            if line == "Zend OPcache" || line.contains("with Zend OPcache") {
                runtime.opcache_loaded = true;
                continue;
            }
            let Some(caps) = DIRECTIVE_LINE.captures(line) else {
                continue;
            };
            let value = caps.get(2).map_or("", |m| m.as_str());
            let value = if value == "no value" {
                ConfigValue::Null
            } else {
                ConfigValue::String(value.to_string())
            };
            runtime.directives.insert(caps[1].to_string(), value);
        }
        runtime
    }

    /// Run `php -i` on the host and parse its output.
    pub fn detect() -> Result<Self, ProbeError> {
        let output = Command::new("php")
            .arg("-i")
            .output()
            .map_err(|e| ProbeError::Php(e.to_string()))?;
        if !output.status.success() {
            return Err(ProbeError::Php(format!("exited with {}", output.status)));
        }
        Ok(Self::from_phpinfo(&String::from_utf8_lossy(&output.stdout)))
    }

    pub fn directive(&self, name: &str) -> Option<&ConfigValue> {
        self.directives.get(name)
    }
}
