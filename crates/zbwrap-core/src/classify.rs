use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::platform::process::{describe_status, read_prefix, KillOnDrop};
use crate::sidecar::MIME_UNKNOWN;
use crate::sniff::SNIFF_BUDGET;

/// Classification used whenever the classifier cannot give an answer.
pub const MIME_FALLBACK: &str = "application/octet-stream";

/// Runs an external content-type classifier (by default `file`) over a
/// byte buffer fed through stdin.
///
/// Classification is advisory: failures are logged and mapped to
/// [`MIME_FALLBACK`], never returned as errors.
#[derive(Debug, Clone)]
pub struct Classifier {
    program: OsString,
    args: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new("file", vec!["--brief".into(), "--mime-type".into(), "-".into()])
    }
}

impl Classifier {
    pub fn new(program: impl Into<OsString>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Classify `buf`, returning the classifier's trimmed output.
    pub fn classify(&self, buf: &[u8]) -> String {
        match self.run(buf) {
            Ok(mime) => mime,
            Err(reason) => {
                warn!(
                    classifier = %self.program.to_string_lossy(),
                    "content classification failed, using {MIME_FALLBACK}: {reason}"
                );
                MIME_FALLBACK.to_string()
            }
        }
    }

    fn run(&self, buf: &[u8]) -> Result<String, String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("cannot start classifier: {e}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The classifier may stop reading once it has seen enough.
            match stdin.write_all(buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(format!("cannot feed classifier: {e}"));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("cannot wait for classifier: {e}"))?;
        if !output.status.success() {
            return Err(format!("classifier {}", describe_status(output.status)));
        }

        let mime = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if mime.is_empty() {
            return Err("classifier produced no output".to_string());
        }
        Ok(mime)
    }

    /// Classify an artifact from the first bytes of its restore stream.
    ///
    /// `restore` is spawned with stdout captured. The first chunk it writes
    /// (at most [`SNIFF_BUDGET`] bytes) is taken, then the process is killed
    /// and reaped regardless of how the read went. An empty prefix yields [`MIME_UNKNOWN`].
    pub fn classify_partial_restore(&self, mut restore: Command) -> String {
        restore
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let child = match restore.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    program = %restore.get_program().to_string_lossy(),
                    "cannot start restore for classification: {e}"
                );
                return MIME_UNKNOWN.to_string();
            }
        };

        let head = {
            let mut child = KillOnDrop::new(child);
            let Some(stdout) = child.stdout.take() else {
                return MIME_UNKNOWN.to_string();
            };
            let (head, err) = read_prefix(stdout, SNIFF_BUDGET);
            if let Some(e) = err {
                debug!(bytes = head.len(), "restore stream read failed: {e}");
            }
            head
        };

        if head.is_empty() {
            return MIME_UNKNOWN.to_string();
        }
        self.classify(&head)
    }
}
