use std::process::Command;
use std::time::{Duration, Instant};

use crate::classify::{Classifier, MIME_FALLBACK};
use crate::sidecar::MIME_UNKNOWN;
use crate::testutil::{minimal_tar, mock_classifier, write_script};

fn file_available() -> bool {
    Command::new("file")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

#[test]
fn classify_returns_trimmed_output() {
    let tmp = tempfile::tempdir().unwrap();
    let script = write_script(tmp.path(), "c", "cat > /dev/null\nprintf '  image/png \\n\\n'");
    let classifier = Classifier::new(script, Vec::new());
    assert_eq!(classifier.classify(b"\x89PNG"), "image/png");
}

#[test]
fn classify_nonzero_exit_falls_back() {
    let tmp = tempfile::tempdir().unwrap();
    let script = write_script(tmp.path(), "c", "echo text/plain\nexit 2");
    let classifier = Classifier::new(script, Vec::new());
    assert_eq!(classifier.classify(b"hello"), MIME_FALLBACK);
}

#[test]
fn classify_empty_output_falls_back() {
    let tmp = tempfile::tempdir().unwrap();
    let script = write_script(tmp.path(), "c", "cat > /dev/null");
    let classifier = Classifier::new(script, Vec::new());
    assert_eq!(classifier.classify(b"hello"), MIME_FALLBACK);
}

#[test]
fn classifier_that_ignores_stdin_still_works() {
    let tmp = tempfile::tempdir().unwrap();
    let script = write_script(tmp.path(), "c", "echo text/x-ignored");
    let classifier = Classifier::new(script, Vec::new());
    assert_eq!(classifier.classify(&[b'a'; 512]), "text/x-ignored");
}

#[test]
fn mock_classifier_recognises_tar_and_text() {
    let tmp = tempfile::tempdir().unwrap();
    let classifier = mock_classifier(tmp.path());
    let tar = minimal_tar("test.txt", b"hello world");
    assert_eq!(classifier.classify(&tar[..512]), "application/x-tar");
    assert_eq!(classifier.classify(b"plain words\n"), "text/plain");
}

#[test]
fn default_classifier_detects_tar_when_file_is_installed() {
    if !file_available() {
        eprintln!("skipping: `file` not installed");
        return;
    }
    let tar = minimal_tar("test.txt", b"hello world");
    let mime = Classifier::default().classify(&tar[..512]);
    assert!(mime.contains("application/x-tar"), "got {mime}");
}

#[test]
fn partial_restore_reads_text_prefix() {
    let tmp = tempfile::tempdir().unwrap();
    let restore = write_script(
        tmp.path(),
        "restore",
        "echo 'This is some mock content that should be detected as text/plain.'",
    );
    let classifier = mock_classifier(tmp.path());
    let mime = classifier.classify_partial_restore(Command::new(restore));
    assert!(mime.contains("text/plain"), "got {mime}");
}

#[test]
fn partial_restore_with_no_output_is_unknown() {
    let tmp = tempfile::tempdir().unwrap();
    let restore = write_script(tmp.path(), "restore", "exit 0");
    let classifier = mock_classifier(tmp.path());
    assert_eq!(
        classifier.classify_partial_restore(Command::new(restore)),
        MIME_UNKNOWN
    );
}

#[test]
fn partial_restore_failing_process_with_output_still_classifies() {
    let tmp = tempfile::tempdir().unwrap();
    let restore = write_script(tmp.path(), "restore", "echo partial text\nexit 1");
    let classifier = mock_classifier(tmp.path());
    assert_eq!(
        classifier.classify_partial_restore(Command::new(restore)),
        "text/plain"
    );
}

#[test]
fn partial_restore_of_endless_stream_returns_and_kills_process() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_file = tmp.path().join("restore.pid");
    let restore = write_script(
        tmp.path(),
        "restore",
        &format!(
            "echo $$ > '{}'\nexec yes 'endless restore output'",
            pid_file.display()
        ),
    );
    let classifier = mock_classifier(tmp.path());

    let start = Instant::now();
    let mime = classifier.classify_partial_restore(Command::new(restore));
    assert!(start.elapsed() < Duration::from_secs(20));
    assert_eq!(mime, "text/plain");

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = Command::new("kill")
        .arg("-0")
        .arg(pid.trim())
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!alive.success(), "restore process {} still running", pid.trim());
}

#[test]
fn partial_restore_does_not_wait_for_a_stalled_producer() {
    let tmp = tempfile::tempdir().unwrap();
    let restore = write_script(
        tmp.path(),
        "restore",
        "printf 'short header'\nexec sleep 30",
    );
    let classifier = mock_classifier(tmp.path());

    let start = Instant::now();
    let mime = classifier.classify_partial_restore(Command::new(restore));
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(mime, "text/plain");
}
