#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod panel;
pub mod platform;
pub mod prompt;
pub mod security;
pub mod service;

pub use config::Config;
pub use error::{CraftError, Result};
