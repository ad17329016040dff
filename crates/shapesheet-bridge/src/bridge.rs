//! Subprocess management and JSON IPC for the bridge process.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use shapesheet_protocol::{Command as BridgeCommand, Request, Response, ResponseData, ResponseResult};

use crate::document::Document;

const BRIDGE_EXE: &str = "shapesheet-bridge-host.exe";

/// Errors from the host bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to spawn bridge process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Bridge process not running")]
    NotRunning,

    #[error("Failed to send command to bridge: {0}")]
    SendFailed(String),

    #[error("Failed to read response from bridge: {0}")]
    ReadFailed(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Bridge returned error: {0}")]
    BridgeError(String),

    #[error("Response {got} does not answer request {expected}")]
    IdMismatch { expected: u64, got: u64 },

    #[error("Unexpected response data for {0}")]
    UnexpectedResponse(&'static str),

    #[error("WINE not found. Install WINE and ensure 'wine' is in PATH.")]
    WineNotFound,

    #[error("Bridge executable not found at: {0}")]
    BridgeExeNotFound(String),
}

impl From<BridgeError> for shapesheet_core::Error {
    fn from(err: BridgeError) -> Self {
        shapesheet_core::Error::host(err)
    }
}

/// Configuration for the host bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Path to the bridge Windows executable.
    /// If None, will search in common locations relative to the current binary.
    pub bridge_exe_path: Option<PathBuf>,

    /// Path to the WINE executable. Defaults to "wine".
    pub wine_path: PathBuf,

    /// Optional WINEPREFIX to use (for isolating the WINE environment).
    pub wine_prefix: Option<PathBuf>,

    /// Launch the executable through WINE. Off on Windows.
    pub use_wine: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_exe_path: None,
            wine_path: PathBuf::from("wine"),
            wine_prefix: None,
            use_wine: !cfg!(windows),
        }
    }
}

/// The main handle for communicating with the host bridge.
///
/// Owns the bridge subprocess and serializes requests over its stdio. Every
/// batched ShapeSheet call made through a [`Document`] is one request/response
/// pair here.
pub struct ShapeSheetBridge {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Box<dyn Write + Send>>,
    stdout: Mutex<Box<dyn BufRead + Send>>,
    next_id: AtomicU64,
}

impl ShapeSheetBridge {
    /// Start the bridge process and initialize the host application.
    pub fn start(config: BridgeConfig) -> Result<Self, BridgeError> {
        let exe_path = config.bridge_exe_path.unwrap_or_else(find_bridge_exe);

        if !exe_path.exists() {
            return Err(BridgeError::BridgeExeNotFound(
                exe_path.display().to_string(),
            ));
        }

        let mut cmd = if config.use_wine {
            let mut cmd = std::process::Command::new(&config.wine_path);
            if let Some(prefix) = &config.wine_prefix {
                cmd.env("WINEPREFIX", prefix);
            }
            cmd.arg(&exe_path);
            cmd
        } else {
            std::process::Command::new(&exe_path)
        };

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit()); // Bridge diagnostics go to our stderr

        let mut child = cmd.spawn().map_err(|e| {
            if config.use_wine && e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::WineNotFound
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;
        tracing::info!(exe = %exe_path.display(), wine = config.use_wine, "started bridge process");

        let stdin = child.stdin.take().ok_or(BridgeError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(BridgeError::NotRunning)?;

        let bridge = Self::with_transport(BufReader::new(stdout), stdin, Some(child));

        // Initialize COM and the host application
        bridge.send_command(BridgeCommand::Init)?;

        Ok(bridge)
    }

    pub(crate) fn with_transport(
        reader: impl BufRead + Send + 'static,
        writer: impl Write + Send + 'static,
        child: Option<Child>,
    ) -> Self {
        Self {
            child: Mutex::new(child),
            stdin: Mutex::new(Box::new(writer)),
            stdout: Mutex::new(Box::new(reader)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Send a command to the bridge and wait for the response.
    pub(crate) fn send_command(
        &self,
        command: BridgeCommand,
    ) -> Result<Option<ResponseData>, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let request = Request { id, command };
        let json = serde_json::to_string(&request)?;
        tracing::trace!(id, bytes = json.len(), "bridge request");

        // Send the request
        {
            let mut stdin = self.stdin.lock().map_err(|_| BridgeError::NotRunning)?;
            writeln!(stdin, "{json}").map_err(|e| BridgeError::SendFailed(e.to_string()))?;
            stdin
                .flush()
                .map_err(|e| BridgeError::SendFailed(e.to_string()))?;
        }

        // Read the response
        let response: Response = {
            let mut stdout = self.stdout.lock().map_err(|_| BridgeError::NotRunning)?;
            let mut line = String::new();
            stdout
                .read_line(&mut line)
                .map_err(|e| BridgeError::ReadFailed(e.to_string()))?;

            if line.is_empty() {
                return Err(BridgeError::NotRunning);
            }

            serde_json::from_str(&line)?
        };

        if response.id != id {
            return Err(BridgeError::IdMismatch {
                expected: id,
                got: response.id,
            });
        }

        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => {
                tracing::debug!(id, %message, "bridge reported error");
                Err(BridgeError::BridgeError(message))
            }
        }
    }

    /// Open an existing drawing from a file path.
    ///
    /// The path should be a Windows-style path as seen by the bridge.
    /// Use [`linux_to_wine_path`] to convert if needed.
    pub fn open_document(&self, path: &str) -> Result<Document<'_>, BridgeError> {
        let data = self.send_command(BridgeCommand::OpenDocument {
            path: path.to_string(),
        })?;
        match data {
            Some(ResponseData::DocumentHandle { document }) => Ok(Document::new(self, document)),
            _ => Err(BridgeError::UnexpectedResponse("OpenDocument")),
        }
    }

    /// Shut down the bridge: close all documents, release the host, and terminate the process.
    pub fn shutdown(self) -> Result<(), BridgeError> {
        if let Err(err) = self.send_command(BridgeCommand::Shutdown) {
            tracing::debug!(%err, "shutdown command failed");
        }

        // Wait for the child process to exit
        let mut child = self.child.lock().map_err(|_| BridgeError::NotRunning)?;
        if let Some(child) = child.as_mut() {
            let _ = child.wait();
        }

        Ok(())
    }

    pub(crate) fn close_document(&self, document: u64) -> Result<(), BridgeError> {
        self.send_command(BridgeCommand::CloseDocument { document })?;
        Ok(())
    }
}

/// Convert a Linux filesystem path to a WINE (Windows) path.
///
/// WINE maps `/` to `Z:\`, so `/home/user/plan.vsdx` becomes `Z:\home\user\plan.vsdx`.
pub fn linux_to_wine_path(linux_path: &Path) -> String {
    let abs = if linux_path.is_absolute() {
        linux_path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(linux_path)
    };

    // WINE maps the root filesystem to Z:
    format!("Z:{}", abs.display()).replace('/', "\\")
}

/// Attempt to locate the bridge exe relative to the current executable or in common paths.
fn find_bridge_exe() -> PathBuf {
    // Check next to the current executable
    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join(BRIDGE_EXE);
        if candidate.exists() {
            return candidate;
        }
    }

    // Check in the target directory (for development)
    for profile in ["release", "debug"] {
        let target_path = PathBuf::from(format!("target/x86_64-pc-windows-gnu/{profile}"))
            .join(BRIDGE_EXE);
        if target_path.exists() {
            return target_path;
        }
    }

    // Default: assume it's in the current directory
    PathBuf::from(BRIDGE_EXE)
}
