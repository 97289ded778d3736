//! Clean logic
//!
//! Removes the build output directory of a single output name.

use std::path::{Path, PathBuf};

use crate::core::build::output_dir;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Result of clean operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanResult {
    /// The directory existed and was removed
    Removed(PathBuf),
    /// There was no directory to remove
    NothingToClean(PathBuf),
}

/// Remove `<build_dir>/<output_name>` if it is a directory
///
/// Cleaning something that does not exist is not an error.
pub fn clean_output(build_dir: &Path, output_name: &str) -> Result<CleanResult, FilesystemError> {
    let dir = output_dir(build_dir, output_name);

    if filesystem::remove_dir_all(&dir)? {
        tracing::info!("Removed {}", dir.display());
        Ok(CleanResult::Removed(dir))
    } else {
        tracing::debug!("Nothing to clean at {}", dir.display());
        Ok(CleanResult::NothingToClean(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_output_directory() {
        let project = TempDir::new().unwrap();
        let out = project.path().join("_build").join("runner");
        std::fs::create_dir_all(out.join("zephyr")).unwrap();
        std::fs::write(out.join("zephyr").join("zephyr.hex"), "hex").unwrap();

        let result = clean_output(&project.path().join("_build"), "runner").unwrap();

        assert_eq!(result, CleanResult::Removed(out.clone()));
        assert!(!out.exists());
    }

    #[test]
    fn test_clean_keeps_sibling_outputs() {
        let project = TempDir::new().unwrap();
        let build = project.path().join("_build");
        std::fs::create_dir_all(build.join("a")).unwrap();
        std::fs::create_dir_all(build.join("b")).unwrap();

        clean_output(&build, "a").unwrap();

        assert!(!build.join("a").exists());
        assert!(build.join("b").exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let project = TempDir::new().unwrap();
        let build = project.path().join("_build");
        std::fs::create_dir_all(build.join("runner")).unwrap();

        assert!(matches!(
            clean_output(&build, "runner").unwrap(),
            CleanResult::Removed(_)
        ));
        assert!(matches!(
            clean_output(&build, "runner").unwrap(),
            CleanResult::NothingToClean(_)
        ));
    }

    #[test]
    fn test_clean_leaves_plain_file_alone() {
        let project = TempDir::new().unwrap();
        let build = project.path().join("_build");
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("runner"), "not a directory").unwrap();

        assert!(matches!(
            clean_output(&build, "runner").unwrap(),
            CleanResult::NothingToClean(_)
        ));
        assert!(build.join("runner").exists());
    }
}
