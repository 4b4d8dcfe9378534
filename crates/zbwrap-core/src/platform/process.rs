use std::io::{self, Read};
use std::ops::{Deref, DerefMut};
use std::process::{Child, ExitStatus};

/// Owns a child process and kills + reaps it when dropped.
///
/// Used for subprocesses that are deliberately cut off before they finish,
/// so that no early return can leak a running process. Kill and wait errors
/// are ignored: the child may already have exited.
#[derive(Debug)]
pub struct KillOnDrop(Child);

impl KillOnDrop {
    pub fn new(child: Child) -> Self {
        Self(child)
    }
}

impl Deref for KillOnDrop {
    type Target = Child;

    fn deref(&self) -> &Child {
        &self.0
    }
}

impl DerefMut for KillOnDrop {
    fn deref_mut(&mut self) -> &mut Child {
        &mut self.0
    }
}

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        // Close our end of the pipes first so a blocked writer sees EPIPE.
        drop(self.0.stdin.take());
        drop(self.0.stdout.take());
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Take the first chunk `reader` produces, at most `limit` bytes.
///
/// Returns after a single successful read, so a producer that writes a short
/// prefix and then stalls cannot hold the caller. Only `Interrupted` is
/// retried. An empty buffer means end-of-stream or an error.
pub fn read_prefix<R: Read>(mut reader: R, limit: usize) -> (Vec<u8>, Option<io::Error>) {
    let mut buf = vec![0u8; limit];
    loop {
        match reader.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                return (buf, None);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (Vec::new(), Some(e)),
        }
    }
}

/// Short description of an exit status for error messages.
pub fn describe_status(status: ExitStatus) -> String {
    status
        .code()
        .map(|c| format!("exit code {c}"))
        .unwrap_or_else(|| "terminated by signal".to_string())
}
