#[cfg(unix)]
mod classify;
