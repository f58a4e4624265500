// src/config/mod.rs
// Configuration for the sudoscan CLI

pub mod env;
pub mod file;

pub use env::EnvOverrides;
pub use file::ScanConfig;
