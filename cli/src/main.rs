//! trellis — query a TOML ACL file from the command line.
//!
//! Usage:
//!   trellis --config acl/example.toml check alice read wiki
//!   trellis --config acl/example.toml describe alice
//!   trellis --config acl/example.toml list

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use trellis_contracts::{AclError, AclResult};
use trellis_policy::Acl;

// ── CLI definition ────────────────────────────────────────────────────────────

/// trellis — role/entity-based access control queries.
#[derive(Parser)]
#[command(
    name = "trellis",
    about = "Query a trellis ACL file",
    long_about = "Loads entities, permissions and parent links from a TOML ACL file\n\
                  and answers authorization queries against it."
)]
struct Cli {
    /// Path to the TOML ACL file.
    #[arg(short, long, default_value = "acl/example.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print ALLOW or DENY for an entity performing an action on a resource.
    Check {
        entity: String,
        action: String,
        resource: String,
    },
    /// Show an entity's parents, own permissions and inherited permissions.
    Describe { entity: String },
    /// List every registered entity ID.
    List,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for resolution traces.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AclResult<()> {
    let mut acl = Acl::from_file(&cli.config)?;
    debug!(config = %cli.config.display(), "ACL ready");

    match cli.command {
        Command::Check {
            entity,
            action,
            resource,
        } => {
            let allowed = acl.is_allowed(&entity, &action, &resource, None, &[]);
            println!("{}", if allowed { "ALLOW" } else { "DENY" });
        }
        Command::Describe { entity } => {
            let text = acl
                .describe_entity(&entity)
                .ok_or(AclError::EntityNotFound { id: entity })?;
            print!("{}", text);
        }
        Command::List => {
            let mut entities = acl.entities().clone();
            entities.sort();
            for id in entities.ids() {
                println!("{}", id);
            }
        }
    }
    Ok(())
}
