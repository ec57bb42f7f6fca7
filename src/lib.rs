#![forbid(unsafe_code)]

pub mod cli;
pub mod clients;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod jsonc;
pub mod prompt;
pub mod utils;
pub mod verify;
