use std::path::{Path, PathBuf};

use crate::classify::Classifier;
use crate::engine::{EncryptionMode, Engine};

/// Write an executable `sh` script and return its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Engine that stores stdin as the artifact (its last argument) and records
/// its arguments in `args.txt` next to the script.
#[cfg(unix)]
pub fn capturing_engine(dir: &Path) -> Engine {
    let script = write_script(
        dir,
        "zbackup-capture",
        r#"for last; do :; done
echo "$@" > "$(dirname "$0")/args.txt"
cat > "$last""#,
    );
    Engine::new(script, EncryptionMode::None)
}

/// Engine that drains stdin and fails. Exit code 3 means the sidecar was
/// missing while it ran.
#[cfg(unix)]
pub fn failing_engine(dir: &Path) -> Engine {
    let script = write_script(
        dir,
        "zbackup-fail",
        r#"for last; do :; done
cat > /dev/null
[ -f "$last.meta" ] || exit 3
echo "zbackup: simulated failure" >&2
exit 1"#,
    );
    Engine::new(script, EncryptionMode::None)
}

/// Classifier that recognises tar headers and printable text, mimicking the
/// subset of `file --mime-type` the tests rely on.
#[cfg(unix)]
pub fn mock_classifier(dir: &Path) -> Classifier {
    let script = write_script(
        dir,
        "classify",
        r#"tmp="$(mktemp)"
cat > "$tmp"
magic="$(dd if="$tmp" bs=1 skip=257 count=5 2>/dev/null)"
binary="$(tr -d '[:print:][:space:]' < "$tmp" | wc -c | tr -d ' ')"
if [ "$magic" = "ustar" ]; then
  echo "application/x-tar"
elif [ ! -s "$tmp" ]; then
  echo "application/x-empty"
elif [ "$binary" = "0" ]; then
  echo "text/plain"
else
  echo "application/octet-stream"
fi
rm -f "$tmp""#,
    );
    Classifier::new(script, Vec::new())
}

/// A single-file ustar archive.
pub fn minimal_tar(name: &str, content: &[u8]) -> Vec<u8> {
    fn put(header: &mut [u8], offset: usize, value: &[u8]) {
        header[offset..offset + value.len()].copy_from_slice(value);
    }

    let mut header = [0u8; 512];
    put(&mut header, 0, name.as_bytes());
    put(&mut header, 100, b"0000644\0");
    put(&mut header, 108, b"0000000\0");
    put(&mut header, 116, b"0000000\0");
    put(&mut header, 124, format!("{:011o}\0", content.len()).as_bytes());
    put(&mut header, 136, b"00000000000\0");
    put(&mut header, 148, b"        ");
    header[156] = b'0';
    put(&mut header, 257, b"ustar\0");
    put(&mut header, 263, b"00");
    let checksum: u32 = header.iter().map(|&b| b as u32).sum();
    put(&mut header, 148, format!("{checksum:06o}\0 ").as_bytes());

    let mut out = header.to_vec();
    out.extend_from_slice(content);
    let padding = (512 - content.len() % 512) % 512;
    out.resize(out.len() + padding, 0);
    out.resize(out.len() + 1024, 0);
    out
}

/// Create `<root>/backups/<name>` with `content`.
pub fn put_artifact(repo: &Path, name: &str, content: &[u8]) -> PathBuf {
    let dir = repo.join("backups");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
