use std::path::PathBuf;

pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Base directory for per-user configuration.
///
/// On Linux and other XDG platforms an absolute `$XDG_CONFIG_HOME` wins,
/// then `~/.config`.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| home_dir().map(|h| h.join(".config")))
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir()
}
