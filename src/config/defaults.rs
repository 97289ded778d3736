//! Default configuration values

/// Subsystem name used to key the persisted u_flags
pub const SUBSYSTEM: &str = "nrfconnect";

/// Default Zephyr board name
pub const DEFAULT_BOARD_NAME: &str = "nrf5340dk_nrf5340_cpuapp";

/// Default output name (build sub folder)
pub const DEFAULT_OUTPUT_NAME: &str = "runner_nrf5340dk_nrf5340_cpuapp";

/// Default output build directory
pub const DEFAULT_BUILD_DIR: &str = "_build/nrfconnect";

/// Default CMake project directory, relative to the ubxlib root
pub const DEFAULT_CMAKE_SUBDIR: &str = "port/platform/zephyr/runner";

/// Default directory holding `u_flags.toml`, relative to the ubxlib root
pub const DEFAULT_FLAGS_SUBDIR: &str = ".vscode";

/// Default target MCU for RTT logging
pub const DEFAULT_MCU: &str = "NRF5340_XXAA_APP";

/// Toolchain packages required by every task
pub const REQUIRED_PACKAGES: [&str; 3] = ["arm_embedded_gcc", "nrfconnectsdk", "make"];

/// Package holding the GNU Arm Embedded compiler
pub const GCC_PACKAGE: &str = "arm_embedded_gcc";

/// Package holding the nRF Connect SDK
pub const NCS_PACKAGE: &str = "nrfconnectsdk";

/// Default J-Link commander executable
#[cfg(windows)]
pub const DEFAULT_JLINK_EXE: &str = "JLink.exe";

/// Default J-Link commander executable
#[cfg(not(windows))]
pub const DEFAULT_JLINK_EXE: &str = "JLinkExe";

/// Default J-Link RTT telnet port
pub const DEFAULT_RTT_TELNET_PORT: u16 = 19021;

/// Default J-Link interface speed in kHz
pub const DEFAULT_JLINK_SPEED_KHZ: u32 = 4000;

/// Default J-Link target interface
pub const DEFAULT_JLINK_INTERFACE: &str = "SWD";

/// Size of a single RTT read
pub const RTT_CHUNK_SIZE: usize = 1024;

/// How long a single RTT read waits before reporting an empty chunk (ms)
pub const RTT_POLL_INTERVAL_MS: u64 = 100;

/// How long to keep retrying the RTT telnet connection (seconds)
pub const RTT_CONNECT_TIMEOUT_SECS: u64 = 10;
