// src/lib.rs
// sudoscan - structured extraction of sudoers configuration

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod sudoers;

pub use error::{Result, SudoersError};
pub use sudoers::{
    ScanOptions, Scanner, SudoersCorpus, SudoersDocument, parse_content, parse_document, scan,
};
