//! Pool commands.
//!
//! A pool is a shared counter several buckets draw from; attaching a
//! bucket moves its counting onto the pool.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::{BucketId, PoolId};
use clap::{Args, Subcommand};

/// Create pools and attach buckets to them.
#[derive(Subcommand)]
pub enum PoolCommand {
    /// Create a shared inventory pool
    Create(PoolCreateArgs),

    /// Make a bucket count against a pool
    Attach(PoolAttachArgs),
}

/// Arguments for `pool create`.
#[derive(Args)]
pub struct PoolCreateArgs {
    /// Pool name, unique within the organization
    pub name: String,

    /// Shared quantity
    #[arg(long)]
    pub quantity: u32,

    /// Allow selling this many units beyond the quantity
    #[arg(long, value_name = "UNITS")]
    pub overbooking_limit: Option<u32>,
}

/// Arguments for `pool attach`.
#[derive(Args)]
pub struct PoolAttachArgs {
    /// Bucket id
    #[arg(long)]
    pub bucket: BucketId,

    /// Pool id
    #[arg(long)]
    pub pool: PoolId,
}

impl PoolCommand {
    /// Execute the pool command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        match self {
            PoolCommand::Create(args) => {
                let pool =
                    db.create_pool(&org, &args.name, args.quantity, args.overbooking_limit)?;
                println!("{}", pool.id.value());
                if !global.quiet {
                    eprintln!("Created pool '{}' with {} units", pool.name, args.quantity);
                }
            }
            PoolCommand::Attach(args) => {
                let bucket = db.attach_to_pool(&org, args.bucket, args.pool)?;
                if !global.quiet {
                    eprintln!("Attached {} to {}", bucket.id, args.pool);
                }
            }
        }

        Ok(())
    }
}
