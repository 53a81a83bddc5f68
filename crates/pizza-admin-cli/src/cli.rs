//! Command line definitions

use clap::{Parser, Subcommand};
use pizza_admin_core::EntityKind;
use std::path::PathBuf;

/// Back office for the pizza-ordering service
#[derive(Parser, Debug)]
#[command(name = "pizza-admin", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use an in-memory store seeded with demo data instead of the API
    #[arg(long, global = true)]
    pub mock: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the records of an entity type
    List {
        /// Entity type, e.g. `menu-items`
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
    },

    /// Show one record with its relations and child tables
    Show {
        /// Entity type
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Record id
        id: String,
    },

    /// Create a record
    Create {
        /// Entity type
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Field assignments
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Update a record
    Update {
        /// Entity type
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Record id
        id: String,
        /// Field assignments
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Delete a record
    Delete {
        /// Entity type
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        /// Record id
        id: String,
    },

    /// Configuration management
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

fn parse_entity(raw: &str) -> Result<EntityKind, String> {
    raw.parse().map_err(|_| {
        let known: Vec<&str> = EntityKind::ALL.iter().map(|kind| kind.path()).collect();
        format!("unknown entity '{raw}', expected one of: {}", known.join(", "))
    })
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((field.to_string(), value.to_string()))
}
