//! Repository configuration.
//!
//! A repository is rooted at the nearest ancestor directory containing
//! `repo.json`. Missing keys (or a missing/broken file) fall back to the
//! conventional layout.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::fs::FileSystem;

/// Marker file that defines the repository root.
pub const REPO_MARKER: &str = "repo.json";

/// Required file name of the element class model.
pub const SKIN_ELEMENTS_FILE: &str = "Skin Elements.classModel";

/// Required file name of the visual styles class model.
pub const VISUAL_STYLES_FILE: &str = "Visual Styles.classModel";

/// Parsed `repo.json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    pub skins: Vec<String>,
    pub classmodels: Vec<String>,
    pub translations: Vec<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            skins: vec!["skins/".to_string()],
            classmodels: vec!["classmodels/".to_string()],
            translations: vec!["translations/".to_string()],
        }
    }
}

impl RepoConfig {
    /// Directories that may contain skin packs, absolute.
    pub fn skins_locations(&self, root: &Path) -> Vec<PathBuf> {
        self.skins.iter().map(|s| root.join(s)).collect()
    }

    /// First existing "Skin Elements" and "Visual Styles" model paths.
    pub fn class_model_paths(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> (Option<PathBuf>, Option<PathBuf>) {
        let find = |file: &str| {
            self.classmodels
                .iter()
                .map(|dir| root.join(dir).join(file))
                .find(|p| fs.exists(p))
        };
        (find(SKIN_ELEMENTS_FILE), find(VISUAL_STYLES_FILE))
    }
}

/// Walk up from `start` until a directory containing `repo.json` is found.
pub fn find_repo_root(fs: &dyn FileSystem, start: &Path) -> Option<PathBuf> {
    let mut current = if fs.is_dir(start) {
        Some(start)
    } else {
        start.parent()
    };
    while let Some(dir) = current {
        if fs.exists(&dir.join(REPO_MARKER)) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Load `repo.json` from the root, falling back to defaults on any error.
pub fn load_repo_config(fs: &dyn FileSystem, root: &Path) -> RepoConfig {
    let path = root.join(REPO_MARKER);
    match fs.read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("bad {}: {e}", path.display());
                RepoConfig::default()
            }
        },
        Err(e) => {
            tracing::debug!("no {}: {e}", path.display());
            RepoConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_to_missing_keys() {
        let config: RepoConfig = serde_json::from_str(r#"{ "skins": ["ui/skins/"] }"#).unwrap();
        assert_eq!(config.skins, vec!["ui/skins/"]);
        assert_eq!(config.classmodels, vec!["classmodels/"]);
        assert_eq!(config.translations, vec!["translations/"]);
    }

    #[test]
    fn test_skins_locations_are_rooted() {
        let config = RepoConfig::default();
        let locations = config.skins_locations(Path::new("/repo"));
        assert_eq!(locations, vec![PathBuf::from("/repo/skins/")]);
    }
}
