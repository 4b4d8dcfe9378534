pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod platform;
pub mod reconcile;
pub mod sidecar;
pub mod sniff;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;
