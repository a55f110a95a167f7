// src/lib.rs
pub mod config;
pub mod enrich;
pub mod error;
pub mod process;
pub mod table;

pub use error::{Error, Result};
