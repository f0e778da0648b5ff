//! Rate plan commands.
//!
//! Plans are loaded from YAML documents with a top-level `plans` list.
//! Every plan in a document is validated before any is written.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::rates::{RateKind, RatePlanDocument, RateRegistry};
use allot::{Database, VariantId};
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

/// Load and list rate plans.
#[derive(Subcommand)]
pub enum RatePlanCommand {
    /// Load rate plans from a YAML file
    Load(RatePlanLoadArgs),

    /// List the rate plans of a variant
    List(RatePlanListArgs),
}

/// Arguments for `rate-plan load`.
#[derive(Args)]
pub struct RatePlanLoadArgs {
    /// YAML file with a `plans` list
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for `rate-plan list`.
#[derive(Args)]
pub struct RatePlanListArgs {
    /// Variant whose plans to list
    #[arg(long)]
    pub variant: VariantId,
}

impl RatePlanCommand {
    /// Execute the rate-plan command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;

        match self {
            RatePlanCommand::Load(args) => {
                let yaml = fs::read_to_string(&args.file)?;
                let document = RatePlanDocument::from_yaml(&yaml)?;

                let mut db = open_database(global, &config)?;
                let plans = RateRegistry::register_document(&mut db, &org, &document)?;

                for plan in &plans {
                    println!("{}", plan.id.value());
                }
                if !global.quiet {
                    eprintln!(
                        "Loaded {} rate plan(s) from {}",
                        plans.len(),
                        args.file.display()
                    );
                }
            }
            RatePlanCommand::List(args) => {
                let db = open_database(global, &config)?;
                let plans = Database::list_rate_plans(db.connection(), &org, &args.variant)?;

                println!("ID\tKIND\tSUPPLIER\tCURRENCY\tVALID_FROM\tVALID_TO\tPRIORITY");
                for plan in plans {
                    let (kind, supplier) = match plan.spec.kind {
                        RateKind::Master => ("master", String::from("-")),
                        RateKind::Supplier { supplier_id, .. } => {
                            ("supplier", supplier_id.value().to_string())
                        }
                    };
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                        plan.id.value(),
                        kind,
                        supplier,
                        plan.spec.currency,
                        plan.spec.validity.start(),
                        plan.spec.validity.end(),
                        plan.priority
                    );
                }
            }
        }

        Ok(())
    }
}
