use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

const MODE_PASSWORD_FILE: &str = "password-file";

/// How zbackup should treat repository encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionMode {
    /// Pass `--non-encrypted`.
    None,
    /// Pass `--password-file <path>`.
    PasswordFile(PathBuf),
}

impl EncryptionMode {
    /// Derive the mode from registry settings.
    ///
    /// Only `password-file` with a non-empty credentials path selects
    /// encryption. Empty, `none` and unrecognized modes are all non-encrypted.
    pub fn from_config(kind: &str, credentials_path: Option<&str>) -> Self {
        match (kind, credentials_path) {
            (MODE_PASSWORD_FILE, Some(path)) if !path.is_empty() => {
                EncryptionMode::PasswordFile(PathBuf::from(path))
            }
            _ => EncryptionMode::None,
        }
    }

    fn push_args(&self, args: &mut Vec<OsString>) {
        match self {
            EncryptionMode::PasswordFile(path) => {
                args.push("--password-file".into());
                args.push(path.clone().into_os_string());
            }
            EncryptionMode::None => args.push("--non-encrypted".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Backup,
    Restore,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Backup => "backup",
            Operation::Restore => "restore",
        }
    }
}

/// Invocation settings for the external zbackup binary.
#[derive(Debug, Clone)]
pub struct Engine {
    program: PathBuf,
    encryption: EncryptionMode,
}

impl Engine {
    pub const DEFAULT_PROGRAM: &'static str = "zbackup";

    pub fn new(program: impl Into<PathBuf>, encryption: EncryptionMode) -> Self {
        Self {
            program: program.into(),
            encryption,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<op> <encryption args> <artifact>`.
    pub fn args_for(&self, op: Operation, artifact: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from(op.as_str())];
        self.encryption.push_args(&mut args);
        args.push(artifact.as_os_str().to_owned());
        args
    }

    /// Command that stores stdin as `artifact`. Stdio is left to the caller.
    pub fn backup_command(&self, artifact: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(Operation::Backup, artifact));
        cmd
    }

    /// Command that streams the contents of `artifact` to stdout.
    pub fn restore_command(&self, artifact: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(Operation::Restore, artifact));
        cmd
    }
}
