#![forbid(unsafe_code)]

pub mod checksums;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod graph;
pub mod util;
