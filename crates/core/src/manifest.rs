//! Build manifests written by the frontend toolchains.
//!
//! Laravel Mix writes a flat `public/mix-manifest.json` mapping source paths
//! to versioned paths (`"/js/app.js": "/js/app.js?id=8f3a"`). Vite writes a
//! nested `public/build/manifest.json` where each entry is an object holding
//! the emitted `file` and any extracted `css`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid {kind} manifest {path}: {source}")]
    Parse {
        kind: ManifestKind,
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Mix,
    Vite,
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestKind::Mix => write!(f, "Mix"),
            ManifestKind::Vite => write!(f, "Vite"),
        }
    }
}

impl ManifestKind {
    /// Manifest location relative to the project root
    pub fn path(&self) -> &'static str {
        match self {
            ManifestKind::Mix => "public/mix-manifest.json",
            ManifestKind::Vite => "public/build/manifest.json",
        }
    }

    /// Directory the manifest's file paths are relative to
    fn asset_root(&self) -> &'static str {
        match self {
            ManifestKind::Mix => "public",
            ManifestKind::Vite => "public/build",
        }
    }
}

#[derive(Deserialize)]
struct ViteChunk {
    file: String,
    #[serde(default)]
    css: Vec<String>,
}

/// Compiled files listed by a build manifest, relative to the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildManifest {
    pub kind: ManifestKind,
    pub files: BTreeSet<PathBuf>,
}

impl BuildManifest {
    pub fn parse(kind: ManifestKind, source: &str) -> Result<Self, ManifestError> {
        let parse_err = |source| ManifestError::Parse {
            kind,
            path: kind.path().to_string(),
            source,
        };
        let root = Path::new(kind.asset_root());
        let files = match kind {
            ManifestKind::Mix => {
                let entries: BTreeMap<String, String> =
                    serde_json::from_str(source).map_err(parse_err)?;
                entries
                    .values()
                    .map(|versioned| root.join(strip_version(versioned)))
                    .collect()
            }
            ManifestKind::Vite => {
                let entries: BTreeMap<String, ViteChunk> =
                    serde_json::from_str(source).map_err(parse_err)?;
                entries
                    .values()
                    .flat_map(|chunk| std::iter::once(&chunk.file).chain(chunk.css.iter()))
                    .map(|file| root.join(file.trim_start_matches('/')))
                    .collect()
            }
        };
        Ok(Self { kind, files })
    }

    /// Find and parse the project's manifest. Vite takes precedence over Mix.
    pub fn discover(base_path: &Path) -> Result<Option<Self>, ManifestError> {
        for kind in [ManifestKind::Vite, ManifestKind::Mix] {
            let path = base_path.join(kind.path());
            if !path.exists() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
                path: path.display().to_string(),
                source,
            })?;
            return Self::parse(kind, &source).map(Some);
        }
        Ok(None)
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.files.contains(relative)
    }
}

/// "/js/app.js?id=8f3a" -> "js/app.js"
fn strip_version(versioned: &str) -> &str {
    let path = versioned.split('?').next().unwrap_or(versioned);
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mix_manifest() {
        let source = r#"{"/js/app.js": "/js/app.js?id=8f3a1c", "/css/app.css": "/css/app.css"}"#;
        let manifest = BuildManifest::parse(ManifestKind::Mix, source).unwrap();
        assert!(manifest.contains(Path::new("public/js/app.js")));
        assert!(manifest.contains(Path::new("public/css/app.css")));
        assert_eq!(manifest.files.len(), 2);
    }

    #[test]
    fn test_parse_vite_manifest() {
        let source = r#"{
            "resources/js/app.js": {"file": "assets/app-4ed993c7.js", "isEntry": true, "css": ["assets/app-1b2c.css"]},
            "resources/css/admin.css": {"file": "assets/admin-99aa.css", "src": "resources/css/admin.css"}
        }"#;
        let manifest = BuildManifest::parse(ManifestKind::Vite, source).unwrap();
        assert_eq!(manifest.kind, ManifestKind::Vite);
        assert!(manifest.contains(Path::new("public/build/assets/app-4ed993c7.js")));
        assert!(manifest.contains(Path::new("public/build/assets/app-1b2c.css")));
        assert!(manifest.contains(Path::new("public/build/assets/admin-99aa.css")));
    }

    #[test]
    fn test_vite_entries_without_file_are_rejected() {
        let err = BuildManifest::parse(ManifestKind::Vite, r#"{"a.js": "assets/a.js"}"#).unwrap_err();
        assert!(err.to_string().contains("Vite"));
    }

    #[test]
    fn test_discover_prefers_vite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public/build")).unwrap();
        std::fs::write(
            dir.path().join("public/mix-manifest.json"),
            r#"{"/js/app.js": "/js/app.js"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("public/build/manifest.json"),
            r#"{"resources/js/app.js": {"file": "assets/app.js"}}"#,
        )
        .unwrap();

        let manifest = BuildManifest::discover(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.kind, ManifestKind::Vite);
    }

    #[test]
    fn test_discover_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BuildManifest::discover(dir.path()).unwrap().is_none());
    }
}
