//! Core types for the index janitor
//!
//! This crate provides the foundational pieces shared by the storage adapter
//! and the janitor binary:
//!
//! - **Configuration**: layered loading of database and janitor settings
//! - **Error handling**: unified error types

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::{Config, JanitorConfig, MongoConfig};
pub use error::{Error, Result};
