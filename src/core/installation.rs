//! Toolchain installation check
//!
//! Resolves the required toolchain packages and derives the run context
//! every other task needs. On POSIX hosts the Zephyr build environment is
//! passed through environment variables. On Windows the nRF Connect SDK
//! toolchain ships its own `cmd/env.cmd` which is run in front of each
//! command instead.

use std::collections::HashMap;

use crate::config::defaults::{GCC_PACKAGE, NCS_PACKAGE, REQUIRED_PACKAGES};
use crate::core::build::path_arg;
use crate::core::context::{quote_arg, HostOs, RunContext};
use crate::error::PackageError;
use crate::infra::packages::{PackageDescriptor, PackageResolver};

/// Zephyr base directory variable
pub const ENV_ZEPHYR_BASE: &str = "ZEPHYR_BASE";

/// Zephyr toolchain variant variable
pub const ENV_TOOLCHAIN_VARIANT: &str = "ZEPHYR_TOOLCHAIN_VARIANT";

/// GNU Arm Embedded install path variable
pub const ENV_GNUARMEMB_PATH: &str = "GNUARMEMB_TOOLCHAIN_PATH";

/// Toolchain variant used with the GNU Arm Embedded compiler
pub const TOOLCHAIN_VARIANT: &str = "gnuarmemb";

/// Result of a successful installation check
#[derive(Debug, Clone)]
pub struct Installation {
    /// Resolved packages keyed by name
    pub packages: HashMap<String, PackageDescriptor>,
    /// Context for subsequent commands
    pub context: RunContext,
}

/// Check that the nRF Connect SDK toolchain is installed
///
/// Fails when any required package cannot be resolved.
pub fn check_installation(
    resolver: &impl PackageResolver,
    host: HostOs,
) -> Result<Installation, PackageError> {
    let packages = resolver.load(&REQUIRED_PACKAGES)?;
    let context = configure(&packages, RunContext::new(host))?;
    Ok(Installation { packages, context })
}

/// Fill `context` from resolved packages
pub fn configure(
    packages: &HashMap<String, PackageDescriptor>,
    mut context: RunContext,
) -> Result<RunContext, PackageError> {
    let ncs = package(packages, NCS_PACKAGE)?;

    match context.host {
        HostOs::Windows => {
            let toolchain = ncs.windows_toolchain()?;
            let env_cmd = format!("{}/cmd/env.cmd", path_arg(toolchain));
            context.pre_command = format!("{} & ", quote_arg(&env_cmd));
            tracing::debug!("Windows pre-command: {}", context.pre_command);
        }
        HostOs::Posix => {
            let gcc = package(packages, GCC_PACKAGE)?;
            context.pre_command.clear();
            context.set_env(
                ENV_ZEPHYR_BASE,
                ncs.install_path.join("zephyr").display().to_string(),
            );
            context.set_env(ENV_TOOLCHAIN_VARIANT, TOOLCHAIN_VARIANT);
            context.set_env(ENV_GNUARMEMB_PATH, gcc.install_path.display().to_string());
            tracing::debug!("Zephyr environment: {:?}", context.env);
        }
    }

    Ok(context)
}

fn package<'a>(
    packages: &'a HashMap<String, PackageDescriptor>,
    name: &str,
) -> Result<&'a PackageDescriptor, PackageError> {
    packages.get(name).ok_or_else(|| PackageError::NotFound {
        name: name.to_string(),
        root: std::path::PathBuf::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Resolver returning fixed descriptors
    struct FakeResolver {
        toolchain: Option<PathBuf>,
        missing: Option<&'static str>,
    }

    impl PackageResolver for FakeResolver {
        fn load(
            &self,
            names: &[&str],
        ) -> Result<HashMap<String, PackageDescriptor>, PackageError> {
            names
                .iter()
                .map(|name| {
                    if Some(*name) == self.missing {
                        return Err(PackageError::NotFound {
                            name: (*name).to_string(),
                            root: PathBuf::from("/pkgs"),
                        });
                    }
                    Ok((
                        (*name).to_string(),
                        PackageDescriptor {
                            name: (*name).to_string(),
                            install_path: PathBuf::from("/pkgs").join(name),
                            version: None,
                            windows_toolchain_path: self.toolchain.clone(),
                        },
                    ))
                })
                .collect()
        }
    }

    fn resolver() -> FakeResolver {
        FakeResolver {
            toolchain: Some(PathBuf::from("C:/ncs/toolchain")),
            missing: None,
        }
    }

    #[test]
    fn test_posix_sets_zephyr_environment() {
        let install = check_installation(&resolver(), HostOs::Posix).unwrap();
        let ctx = install.context;

        assert!(ctx.pre_command.is_empty());
        assert_eq!(ctx.env[ENV_ZEPHYR_BASE], "/pkgs/nrfconnectsdk/zephyr");
        assert_eq!(ctx.env[ENV_TOOLCHAIN_VARIANT], "gnuarmemb");
        assert_eq!(ctx.env[ENV_GNUARMEMB_PATH], "/pkgs/arm_embedded_gcc");
        assert_eq!(install.packages.len(), 3);
    }

    #[test]
    fn test_windows_sets_pre_command_only() {
        let ctx = check_installation(&resolver(), HostOs::Windows)
            .unwrap()
            .context;

        assert_eq!(ctx.pre_command, "C:/ncs/toolchain/cmd/env.cmd & ");
        assert!(ctx.env.is_empty());
    }

    #[test]
    fn test_exactly_one_configuration_branch_applies() {
        for host in [HostOs::Posix, HostOs::Windows] {
            let ctx = check_installation(&resolver(), host).unwrap().context;
            let has_env = [ENV_ZEPHYR_BASE, ENV_TOOLCHAIN_VARIANT, ENV_GNUARMEMB_PATH]
                .iter()
                .all(|k| ctx.env.contains_key(*k));
            let has_prefix = !ctx.pre_command.is_empty();
            assert!(has_env ^ has_prefix, "host {host}: env={has_env} prefix={has_prefix}");
        }
    }

    #[test]
    fn test_missing_package_is_fatal() {
        let resolver = FakeResolver {
            toolchain: None,
            missing: Some("make"),
        };
        let err = check_installation(&resolver, HostOs::Posix).unwrap_err();
        assert!(matches!(err, PackageError::NotFound { ref name, .. } if name == "make"));
    }

    #[test]
    fn test_windows_pre_command_quotes_paths_with_spaces() {
        let resolver = FakeResolver {
            toolchain: Some(PathBuf::from("C:\\Program Files\\ncs\\toolchain")),
            missing: None,
        };
        let ctx = check_installation(&resolver, HostOs::Windows)
            .unwrap()
            .context;

        assert_eq!(
            ctx.pre_command,
            "\"C:/Program Files/ncs/toolchain/cmd/env.cmd\" & "
        );
    }

    #[test]
    fn test_windows_without_toolchain_is_fatal() {
        let resolver = FakeResolver {
            toolchain: None,
            missing: None,
        };
        assert!(matches!(
            check_installation(&resolver, HostOs::Windows),
            Err(PackageError::MissingToolchain { .. })
        ));
    }
}
