//! u_flags handling
//!
//! Turns ubxlib `u_flags` (preprocessor definitions such as
//! `U_CFG_TEST_FILTER=foo`) into compiler flags for the `U_FLAGS`
//! environment variable, and decides whether a pristine rebuild is needed.
//!
//! Flags given on the command line are used as-is. Otherwise the flags are
//! read from `u_flags.toml` in the flags directory:
//!
//! ```toml
//! [nrfconnect]
//! runner_nrf5340dk_nrf5340_cpuapp = "U_CFG_TEST_FILTER=port U_CFG_APP_PIN_A=1"
//! my_other_output = ["U_CFG_FOO", "U_CFG_BAR=2"]
//! ```
//!
//! A digest of the last used flags is kept per subsystem and output name so
//! a change forces `west build -p always`.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::context::RunContext;
use crate::error::FlagsError;
use crate::infra::filesystem;

/// Compiler flags environment variable
pub const ENV_U_FLAGS: &str = "U_FLAGS";

/// Name of the persisted flags file
pub const FLAGS_FILE: &str = "u_flags.toml";

/// Directory holding recorded flag digests
const STATE_DIR: &str = ".u_flags";

/// West pristine mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pristine {
    /// Let the build system decide based on staleness
    #[default]
    Auto,
    /// Always wipe the build directory
    Always,
}

impl fmt::Display for Pristine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Compiler flags plus whether they changed since the last recorded build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagState {
    /// Compiler flags derived from the u_flags
    pub cflags: String,
    /// Whether the flags differ from the last recorded ones
    pub modified: bool,
}

/// Source of persisted u_flags
pub trait FlagSource {
    /// Load the flags for `output_name` of `subsystem`
    fn load(&self, subsystem: &str, output_name: &str) -> Result<FlagState, FlagsError>;
}

/// Effective flags for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagResolution {
    /// Value for `U_FLAGS`
    pub cflags: String,
    /// Pristine mode for `west build`
    pub pristine: Pristine,
}

impl FlagResolution {
    /// Export the flags to the run context
    pub fn apply(&self, context: &mut RunContext) {
        context.set_env(ENV_U_FLAGS, self.cflags.clone());
    }
}

/// Resolve the flags for a build
///
/// Directly supplied flags win and never trigger a pristine build. Without
/// them the persisted flags are loaded and a change forces `always`.
pub fn resolve_flags(
    u_flags: Option<&str>,
    source: &impl FlagSource,
    subsystem: &str,
    output_name: &str,
) -> Result<FlagResolution, FlagsError> {
    if let Some(flags) = u_flags.filter(|f| !f.trim().is_empty()) {
        tracing::debug!("Using u_flags from the command line: {flags}");
        return Ok(FlagResolution {
            cflags: u_flags_to_cflags(flags),
            pristine: Pristine::Auto,
        });
    }

    let state = source.load(subsystem, output_name)?;
    let pristine = if state.modified {
        tracing::info!("u_flags changed for {subsystem}/{output_name}, forcing a pristine build");
        Pristine::Always
    } else {
        Pristine::Auto
    };

    Ok(FlagResolution {
        cflags: state.cflags,
        pristine,
    })
}

/// Convert u_flags to compiler flags
///
/// Every definition becomes `-D<definition>`; tokens that already are
/// compiler options (leading `-`) pass through unchanged.
pub fn u_flags_to_cflags(u_flags: &str) -> String {
    u_flags
        .split_whitespace()
        .map(|token| {
            if token.starts_with('-') {
                token.to_string()
            } else {
                if !definition_regex().is_match(token) {
                    tracing::warn!("u_flag '{token}' does not look like a preprocessor definition");
                }
                format!("-D{token}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn definition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(=.*)?$").expect("Invalid definition pattern")
    })
}

/// Flags persisted in `u_flags.toml`
#[derive(Debug, Clone)]
pub struct FileFlagSource {
    dir: PathBuf,
    record: bool,
}

impl FileFlagSource {
    /// Create a source reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            record: true,
        }
    }

    /// Detect changes without recording the new digest
    pub fn read_only(mut self) -> Self {
        self.record = false;
        self
    }

    /// Path of the flags file
    pub fn flags_path(&self) -> PathBuf {
        self.dir.join(FLAGS_FILE)
    }

    /// Path of the recorded digest for an output
    pub fn state_path(&self, subsystem: &str, output_name: &str) -> PathBuf {
        self.dir
            .join(STATE_DIR)
            .join(format!("{subsystem}.{output_name}.sha256"))
    }

    fn read_u_flags(&self, subsystem: &str, output_name: &str) -> Result<String, FlagsError> {
        let path = self.flags_path();
        let Some(content) = filesystem::read_optional(&path)? else {
            tracing::debug!("No {} found, using empty u_flags", path.display());
            return Ok(String::new());
        };

        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| FlagsError::Parse {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let invalid = || FlagsError::InvalidEntry {
            subsystem: subsystem.to_string(),
            output_name: output_name.to_string(),
        };

        let entry = table
            .get(subsystem)
            .and_then(toml::Value::as_table)
            .and_then(|t| t.get(output_name));

        match entry {
            None => Ok(String::new()),
            Some(toml::Value::String(flags)) => Ok(flags.clone()),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()
                .map(|flags| flags.join(" ")),
            Some(_) => Err(invalid()),
        }
    }
}

impl FlagSource for FileFlagSource {
    fn load(&self, subsystem: &str, output_name: &str) -> Result<FlagState, FlagsError> {
        let u_flags = self.read_u_flags(subsystem, output_name)?;
        let cflags = u_flags_to_cflags(&u_flags);
        let digest = digest(&cflags);

        let state_path = self.state_path(subsystem, output_name);
        let previous = filesystem::read_optional(&state_path)?;
        let modified = previous.as_deref().map(str::trim) != Some(digest.as_str());

        if modified && self.record {
            record(&state_path, &digest)?;
        }

        Ok(FlagState { cflags, modified })
    }
}

fn digest(cflags: &str) -> String {
    hex::encode(Sha256::digest(cflags.as_bytes()))
}

fn record(path: &Path, digest: &str) -> Result<(), FlagsError> {
    filesystem::write_file(path, &format!("{digest}\n"))?;
    Ok(())
}
