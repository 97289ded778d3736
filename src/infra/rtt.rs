//! J-Link RTT reader
//!
//! Starts the J-Link commander connected to the target MCU, which exposes
//! the RTT up-buffer on a local telnet port, and reads raw bytes from that
//! port. The commander process belongs to the reader: dropping the reader
//! kills it and releases the probe. It runs in its own process group so a
//! Ctrl-C at the terminal reaches only this program.

use backoff::ExponentialBackoffBuilder;
use std::cell::RefCell;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::defaults::{RTT_CHUNK_SIZE, RTT_CONNECT_TIMEOUT_SECS, RTT_POLL_INTERVAL_MS};
use crate::error::RttError;

/// First bytes of the banner the RTT telnet server sends on connect
const GREETING_PREFIX: &[u8] = b"SEGGER J-Link";

/// Last banner line
const GREETING_LAST_LINE: &[u8] = b"Process:";

/// Give up looking for the end of the banner after this many bytes
const GREETING_MAX_LEN: usize = 1024;

/// Bytes of J-Link stderr kept for error reports
const STDERR_TAIL_LEN: usize = 2048;

/// A stream of raw RTT bytes
pub trait RttSource {
    /// Read the next chunk
    ///
    /// An empty chunk means nothing arrived within the poll interval.
    fn read(&mut self) -> impl Future<Output = Result<Vec<u8>, RttError>>;
}

/// How to start the J-Link commander
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RttOptions {
    /// J-Link commander executable
    pub jlink_exe: String,
    /// Target MCU identifier as known to J-Link
    pub mcu: String,
    /// Probe serial number
    pub serial: Option<String>,
    /// Target interface
    pub interface: String,
    /// Interface speed in kHz
    pub speed_khz: u32,
    /// Local RTT telnet port
    pub telnet_port: u16,
}

impl RttOptions {
    /// Command line arguments for the J-Link commander
    pub fn jlink_args(&self) -> Vec<String> {
        let mut args = vec![
            "-NoGui".to_string(),
            "1".to_string(),
            "-device".to_string(),
            self.mcu.clone(),
            "-if".to_string(),
            self.interface.clone(),
            "-speed".to_string(),
            self.speed_khz.to_string(),
            "-autoconnect".to_string(),
            "1".to_string(),
            "-RTTTelnetPort".to_string(),
            self.telnet_port.to_string(),
        ];
        if let Some(serial) = &self.serial {
            args.push("-SelectEmuBySN".to_string());
            args.push(serial.clone());
        }
        args
    }

    /// Local address of the RTT telnet server
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.telnet_port)
    }
}

/// RTT reader backed by a J-Link commander process
#[derive(Debug)]
pub struct JLinkRttReader {
    child: Child,
    stream: TcpStream,
    buf: Vec<u8>,
    poll: Duration,
    greeting: GreetingFilter,
}

impl JLinkRttReader {
    /// Start J-Link and connect to its RTT telnet server
    ///
    /// Fails when the port is already taken, so the stream always comes
    /// from the commander started here.
    pub async fn open(options: &RttOptions) -> Result<Self, RttError> {
        let address = options.address();
        ensure_port_free(&address)?;

        tracing::debug!("Starting {} {:?}", options.jlink_exe, options.jlink_args());

        // stdin stays open so the commander keeps the session alive
        let mut command = Command::new(&options.jlink_exe);
        command
            .args(options.jlink_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        detach_from_terminal(&mut command);

        let mut child = command.spawn().map_err(|e| RttError::Spawn {
            program: options.jlink_exe.clone(),
            error: e.to_string(),
        })?;
        let stderr = capture_tail(child.stderr.take());

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_max_elapsed_time(Some(Duration::from_secs(RTT_CONNECT_TIMEOUT_SECS)))
            .build();

        let child = RefCell::new(child);
        let child_ref = &child;
        let addr: &str = &address;
        let connected = backoff::future::retry(policy, move || async move {
            let exited = child_ref.borrow_mut().try_wait();
            match exited {
                Ok(None) => {}
                Ok(Some(status)) => {
                    return Err(backoff::Error::permanent(RttError::Exited {
                        status: status.to_string(),
                        output: String::new(),
                    }))
                }
                Err(e) => return Err(backoff::Error::permanent(RttError::Io(e))),
            }
            TcpStream::connect(addr).await.map_err(|e| {
                backoff::Error::transient(RttError::Connect {
                    address: addr.to_string(),
                    error: e.to_string(),
                })
            })
        })
        .await;
        let child = child.into_inner();

        let stream = match connected {
            Ok(stream) => stream,
            Err(RttError::Exited { status, .. }) => {
                let output = tokio::time::timeout(Duration::from_secs(1), stderr)
                    .await
                    .ok()
                    .and_then(Result::ok)
                    .unwrap_or_default();
                return Err(RttError::Exited { status, output });
            }
            Err(e) => return Err(e),
        };

        tracing::info!("Connected to RTT on {address}");

        Ok(Self {
            child,
            stream,
            buf: vec![0; RTT_CHUNK_SIZE],
            poll: Duration::from_millis(RTT_POLL_INTERVAL_MS),
            greeting: GreetingFilter::default(),
        })
    }

    /// Stop J-Link and wait for it to exit
    pub async fn close(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to stop J-Link: {e}");
        }
    }
}

impl RttSource for JLinkRttReader {
    async fn read(&mut self) -> Result<Vec<u8>, RttError> {
        match tokio::time::timeout(self.poll, self.stream.read(&mut self.buf)).await {
            Err(_) => Ok(self.greeting.idle()),
            Ok(Ok(0)) => Err(RttError::Closed),
            Ok(Ok(n)) => Ok(self.greeting.filter(&self.buf[..n])),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

fn ensure_port_free(address: &str) -> Result<(), RttError> {
    match std::net::TcpListener::bind(address) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => Err(RttError::PortInUse {
            address: address.to_string(),
        }),
        Err(e) => Err(RttError::Io(e)),
    }
}

#[cfg(unix)]
fn detach_from_terminal(command: &mut Command) {
    command.process_group(0);
}

#[cfg(windows)]
fn detach_from_terminal(command: &mut Command) {
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach_from_terminal(_command: &mut Command) {}

/// Drain a pipe in the background, keeping its last bytes
fn capture_tail<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut tail = Vec::new();
        if let Some(mut pipe) = pipe {
            let mut chunk = [0u8; 512];
            while let Ok(n) = pipe.read(&mut chunk).await {
                if n == 0 {
                    break;
                }
                tail.extend_from_slice(&chunk[..n]);
                if tail.len() > STDERR_TAIL_LEN {
                    tail.drain(..tail.len() - STDERR_TAIL_LEN);
                }
            }
        }
        String::from_utf8_lossy(&tail).trim().to_string()
    })
}

/// Drops the banner the RTT telnet server sends before any target bytes
#[derive(Debug, Default)]
struct GreetingFilter {
    pending: Vec<u8>,
    done: bool,
}

impl GreetingFilter {
    /// Pass a chunk through, holding back anything that may be banner
    fn filter(&mut self, chunk: &[u8]) -> Vec<u8> {
        if self.done {
            return chunk.to_vec();
        }
        self.pending.extend_from_slice(chunk);

        let n = self.pending.len().min(GREETING_PREFIX.len());
        if self.pending[..n] != GREETING_PREFIX[..n] {
            return self.pass_pending();
        }

        if let Some(end) = greeting_end(&self.pending) {
            self.done = true;
            let rest = self.pending.split_off(end);
            tracing::debug!(
                "Dropped RTT greeting: {}",
                String::from_utf8_lossy(&self.pending).trim()
            );
            self.pending.clear();
            return rest;
        }

        if self.pending.len() > GREETING_MAX_LEN {
            return self.pass_pending();
        }
        Vec::new()
    }

    /// Nothing arrived for a poll interval
    ///
    /// A banner without the final line is complete by now; its full lines
    /// are dropped.
    fn idle(&mut self) -> Vec<u8> {
        if self.done || self.pending.is_empty() {
            return Vec::new();
        }
        self.done = true;
        let end = self
            .pending
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        self.pending.split_off(end)
    }

    fn pass_pending(&mut self) -> Vec<u8> {
        self.done = true;
        std::mem::take(&mut self.pending)
    }
}

/// Offset just past the banner's last line
fn greeting_end(data: &[u8]) -> Option<usize> {
    let start = data
        .windows(GREETING_LAST_LINE.len())
        .position(|w| w == GREETING_LAST_LINE)?;
    let newline = data[start..].iter().position(|&b| b == b'\n')?;
    Some(start + newline + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const GREETING: &[u8] = b"SEGGER J-Link V7.94e - Real time terminal output\r\n\
        J-Link OB-nRF5340-NordicSemi compiled Jan  1 2024 V1.0, SN=1050000000\r\n\
        Process: JLinkExe\r\n";

    fn options(serial: Option<&str>) -> RttOptions {
        RttOptions {
            jlink_exe: "JLinkExe".to_string(),
            mcu: "NRF5340_XXAA_APP".to_string(),
            serial: serial.map(str::to_string),
            interface: "SWD".to_string(),
            speed_khz: 4000,
            telnet_port: 19021,
        }
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    /// Reader over a local server, with a long-running stand-in for J-Link
    #[cfg(unix)]
    async fn reader_for(port: u16) -> JLinkRttReader {
        let child = Command::new("sleep")
            .arg("5")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        JLinkRttReader {
            child,
            stream,
            buf: vec![0; RTT_CHUNK_SIZE],
            poll: Duration::from_millis(50),
            greeting: GreetingFilter::default(),
        }
    }

    #[test]
    fn test_jlink_args_without_serial() {
        let args = options(None).jlink_args();
        assert!(args.windows(2).any(|w| w == ["-device", "NRF5340_XXAA_APP"]));
        assert!(args.windows(2).any(|w| w == ["-RTTTelnetPort", "19021"]));
        assert!(!args.iter().any(|a| a == "-SelectEmuBySN"));
    }

    #[test]
    fn test_jlink_args_with_serial() {
        let args = options(Some("683000000")).jlink_args();
        assert!(args.windows(2).any(|w| w == ["-SelectEmuBySN", "683000000"]));
    }

    #[test]
    fn test_greeting_is_dropped() {
        let mut filter = GreetingFilter::default();
        let mut data = GREETING.to_vec();
        data.extend_from_slice(b"boot\n");

        assert_eq!(filter.filter(&data), b"boot\n");
        assert_eq!(filter.filter(b"SEGGER J-Link from target\n"), b"SEGGER J-Link from target\n");
    }

    #[test]
    fn test_greeting_split_across_chunks() {
        let mut filter = GreetingFilter::default();
        let (head, tail) = GREETING.split_at(20);

        assert!(filter.filter(head).is_empty());
        assert!(filter.filter(tail).is_empty());
        assert_eq!(filter.filter(b"ready\n"), b"ready\n");
    }

    #[test]
    fn test_output_without_greeting_passes_through() {
        let mut filter = GreetingFilter::default();
        assert_eq!(filter.filter(b"hello\n"), b"hello\n");
        assert!(filter.idle().is_empty());
    }

    #[test]
    fn test_idle_drops_banner_lines_without_last_line() {
        let mut filter = GreetingFilter::default();
        assert!(filter
            .filter(b"SEGGER J-Link V6.30 - Real time terminal output\r\npartial")
            .is_empty());
        assert_eq!(filter.idle(), b"partial");
        assert_eq!(filter.filter(b"next\n"), b"next\n");
    }

    #[tokio::test]
    async fn test_open_missing_executable_fails() {
        let mut opts = options(None);
        opts.jlink_exe = "/nonexistent/JLinkExe".to_string();
        opts.telnet_port = free_port();

        assert!(matches!(
            JLinkRttReader::open(&opts).await,
            Err(RttError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_refuses_port_in_use() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut opts = options(None);
        opts.telnet_port = listener.local_addr().unwrap().port();

        assert!(matches!(
            JLinkRttReader::open(&opts).await,
            Err(RttError::PortInUse { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_reports_exited_commander() {
        let mut opts = options(None);
        opts.jlink_exe = "false".to_string();
        opts.telnet_port = free_port();

        let started = std::time::Instant::now();
        let result = JLinkRttReader::open(&opts).await;

        assert!(matches!(result, Err(RttError::Exited { .. })));
        assert!(started.elapsed() < Duration::from_secs(RTT_CONNECT_TIMEOUT_SECS / 2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_keeps_commander_stderr() {
        // sh rejects the J-Link options and complains on stderr
        let mut opts = options(None);
        opts.jlink_exe = "sh".to_string();
        opts.telnet_port = free_port();

        match JLinkRttReader::open(&opts).await {
            Err(RttError::Exited { output, .. }) => assert!(!output.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_reports_empty_chunk_then_data() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            socket.write_all(b"boot\n").await.unwrap();
        });

        let mut reader = reader_for(port).await;

        assert!(reader.read().await.unwrap().is_empty());
        let mut data = Vec::new();
        while data.is_empty() {
            data = reader.read().await.unwrap();
        }
        assert_eq!(data, b"boot\n");

        server.await.unwrap();
        assert!(matches!(reader.read().await, Err(RttError::Closed)));
        reader.close().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_skips_server_greeting() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(GREETING).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            socket.write_all(b"<info> app: started\n").await.unwrap();
        });

        let mut reader = reader_for(port).await;
        let mut data = Vec::new();
        while data.is_empty() {
            data = reader.read().await.unwrap();
        }

        assert_eq!(data, b"<info> app: started\n");
        server.await.unwrap();
        reader.close().await;
    }
}
