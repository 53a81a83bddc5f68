//! Command line back office for the pizza-ordering service
//!
//! Each command mounts the page the web back office would show for the same
//! action, drives it through the view layer and prints its render model as
//! tables. `--mock` swaps the REST API for an in-memory store seeded with
//! demo data.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod backend;
pub mod cli;
pub mod commands;
pub mod output;

pub use backend::Backend;
pub use cli::{Cli, Commands};
pub use commands::{Session, execute, run};
