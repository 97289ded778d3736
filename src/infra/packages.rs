//! Toolchain package resolution
//!
//! Locates installed toolchain packages (GNU Arm Embedded, nRF Connect SDK,
//! make). Packages are installed by an external package manager into a
//! shared root, either as `<root>/<name>` or as `<root>/<name>-<version>`.
//! Explicit paths from the settings file take precedence.

use semver::Version;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::settings::PackageOverride;
use crate::error::PackageError;

/// Name of the Windows toolchain directory inside an nRF Connect SDK install
const WINDOWS_TOOLCHAIN_DIR: &str = "toolchain";

/// An installed toolchain package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Package identifier
    pub name: String,
    /// Install path
    pub install_path: PathBuf,
    /// Version parsed from the install directory name, if any
    pub version: Option<Version>,
    /// Windows toolchain directory, if one is known
    pub windows_toolchain_path: Option<PathBuf>,
}

impl PackageDescriptor {
    /// Windows toolchain directory, or an error when none exists
    pub fn windows_toolchain(&self) -> Result<&Path, PackageError> {
        self.windows_toolchain_path
            .as_deref()
            .ok_or_else(|| PackageError::MissingToolchain {
                name: self.name.clone(),
                path: self.install_path.join(WINDOWS_TOOLCHAIN_DIR),
            })
    }
}

/// Resolves named toolchain packages to their install locations
pub trait PackageResolver {
    /// Resolve every named package, failing on the first one that is missing
    fn load(&self, names: &[&str]) -> Result<HashMap<String, PackageDescriptor>, PackageError>;
}

/// Resolver backed by a local packages directory
#[derive(Debug, Clone)]
pub struct LocalPackageResolver {
    root: PathBuf,
    overrides: BTreeMap<String, PackageOverride>,
}

impl LocalPackageResolver {
    /// Create a resolver over `root` with explicit per-package overrides
    pub fn new(root: PathBuf, overrides: BTreeMap<String, PackageOverride>) -> Self {
        Self { root, overrides }
    }

    /// Packages root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a single package
    pub fn resolve(&self, name: &str) -> Result<PackageDescriptor, PackageError> {
        let override_entry = self.overrides.get(name);

        let (install_path, version) =
            match override_entry.and_then(|o| o.path.clone()) {
                Some(path) if path.is_dir() => (path, None),
                Some(path) => {
                    tracing::warn!(
                        "Configured path for package '{}' does not exist: {}",
                        name,
                        path.display()
                    );
                    return Err(PackageError::NotFound {
                        name: name.to_string(),
                        root: path,
                    });
                }
                None => self.find_installed(name)?,
            };

        let windows_toolchain_path = override_entry
            .and_then(|o| o.windows_toolchain_path.clone())
            .or_else(|| {
                let candidate = install_path.join(WINDOWS_TOOLCHAIN_DIR);
                candidate.is_dir().then_some(candidate)
            });

        tracing::debug!("Resolved package '{}' at {}", name, install_path.display());

        Ok(PackageDescriptor {
            name: name.to_string(),
            install_path,
            version,
            windows_toolchain_path,
        })
    }

    /// Find `<root>/<name>` or the highest `<root>/<name>-<version>`
    fn find_installed(&self, name: &str) -> Result<(PathBuf, Option<Version>), PackageError> {
        let exact = self.root.join(name);
        if exact.is_dir() {
            return Ok((exact, None));
        }

        let prefix = format!("{name}-");
        let mut candidates: Vec<(PathBuf, Option<Version>, String)> = fs::read_dir(&self.root)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let dir_name = entry.file_name().to_string_lossy().to_string();
                let suffix = dir_name.strip_prefix(&prefix)?.to_string();
                let version = parse_version(&suffix);
                Some((entry.path(), version, dir_name))
            })
            .collect();

        // Highest semver first; unparsable versions sort lexically after them
        candidates.sort_by(|a, b| match (&a.1, &b.1) {
            (Some(va), Some(vb)) => vb.cmp(va),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.2.cmp(&a.2),
        });

        candidates
            .into_iter()
            .next()
            .map(|(path, version, _)| (path, version))
            .ok_or_else(|| PackageError::NotFound {
                name: name.to_string(),
                root: self.root.clone(),
            })
    }
}

impl PackageResolver for LocalPackageResolver {
    fn load(&self, names: &[&str]) -> Result<HashMap<String, PackageDescriptor>, PackageError> {
        names
            .iter()
            .map(|name| self.resolve(name).map(|pkg| ((*name).to_string(), pkg)))
            .collect()
    }
}

/// Parse a directory version suffix such as `v2.5.0` or `13.2.rel1`
fn parse_version(suffix: &str) -> Option<Version> {
    let trimmed = suffix.trim_start_matches('v');
    Version::parse(trimmed).ok().or_else(|| {
        // Accept two-part versions like "10.3"
        let mut parts = trimmed.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        parts.next().is_none().then(|| Version::new(major, minor, 0))
    })
}
