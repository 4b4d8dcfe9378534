pub mod paths;
pub mod process;
