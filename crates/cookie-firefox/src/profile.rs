//! Firefox profile discovery
//!
//! Profiles are registered in `profiles.ini` under the Firefox root
//! directory (`~/.mozilla/firefox` on Linux). Only the `[ProfileN]`
//! sections matter here; installer bookkeeping sections are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One registered Firefox profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirefoxProfile {
    /// Profile name from the registry (`Name=`).
    pub name: String,
    /// Absolute profile directory.
    pub path: PathBuf,
    /// Whether the registry marks this profile as the default.
    pub is_default: bool,
}

/// The platform's Firefox root directory.
pub fn default_root() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".mozilla").join("firefox"))
        .ok_or(Error::NoHomeDirectory)
}

/// Read the profile registry under `root`.
pub fn discover(root: &Path) -> Result<Vec<FirefoxProfile>> {
    let ini_path = root.join("profiles.ini");
    if !ini_path.exists() {
        return Err(Error::ProfilesIniNotFound { path: ini_path });
    }
    let text = fs::read_to_string(&ini_path).map_err(|e| Error::io(&ini_path, e))?;
    let profiles = parse_profiles(&text, root)?;
    tracing::debug!("Found {} profiles in {}", profiles.len(), ini_path.display());
    Ok(profiles)
}

/// Pick the profile to operate on.
///
/// Precedence: an explicit directory is used as-is, an explicit name is
/// looked up in the registry, and otherwise the single profile marked
/// `Default=1` wins. No default or more than one default is an error.
pub fn select(root: &Path, name: Option<&str>, path: Option<&Path>) -> Result<FirefoxProfile> {
    if let Some(dir) = path {
        if !dir.is_dir() {
            return Err(Error::ProfileDirNotFound {
                path: dir.to_path_buf(),
            });
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        return Ok(FirefoxProfile {
            name,
            path: dir.to_path_buf(),
            is_default: false,
        });
    }

    let profiles = discover(root)?;
    if let Some(wanted) = name {
        return profiles
            .into_iter()
            .find(|p| p.name == wanted)
            .ok_or_else(|| Error::ProfileNotFound {
                name: wanted.to_string(),
            });
    }

    let mut defaults: Vec<FirefoxProfile> =
        profiles.into_iter().filter(|p| p.is_default).collect();
    match defaults.len() {
        0 => Err(Error::NoDefaultProfile),
        1 => Ok(defaults.remove(0)),
        _ => Err(Error::AmbiguousDefaultProfile),
    }
}

/// Parse `[ProfileN]` sections out of the registry text.
///
/// `Name` and `Path` are required per section; `IsRelative` defaults to
/// relative, matching what Firefox writes.
fn parse_profiles(text: &str, root: &Path) -> Result<Vec<FirefoxProfile>> {
    let mut profiles = Vec::new();
    let mut section: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some(done) = section.take() {
                profiles.push(done.finish(root)?);
            }
            if header.starts_with("Profile") {
                section = Some(Section::new(header));
            }
            continue;
        }
        if let (Some(section), Some((key, value))) = (section.as_mut(), line.split_once('=')) {
            section.set(key.trim(), value.trim());
        }
    }
    if let Some(done) = section.take() {
        profiles.push(done.finish(root)?);
    }
    Ok(profiles)
}

struct Section {
    header: String,
    name: Option<String>,
    path: Option<String>,
    is_relative: bool,
    is_default: bool,
}

impl Section {
    fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            name: None,
            path: None,
            is_relative: true,
            is_default: false,
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match key {
            "Name" => self.name = Some(value.to_string()),
            "Path" => self.path = Some(value.to_string()),
            "IsRelative" => self.is_relative = value != "0",
            "Default" => self.is_default = value == "1",
            _ => {}
        }
    }

    fn finish(self, root: &Path) -> Result<FirefoxProfile> {
        let missing = |key: &str| Error::MalformedProfile {
            section: self.header.clone(),
            key: key.to_string(),
        };
        let name = self.name.clone().ok_or_else(|| missing("Name"))?;
        let raw_path = self.path.clone().ok_or_else(|| missing("Path"))?;
        let path = if self.is_relative {
            root.join(raw_path)
        } else {
            PathBuf::from(raw_path)
        };
        Ok(FirefoxProfile {
            name,
            path,
            is_default: self.is_default,
        })
    }
}
