//! Supplier commands.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::Database;
use clap::{Args, Subcommand};

/// Register and list suppliers.
#[derive(Subcommand)]
pub enum SupplierCommand {
    /// Register a supplier
    Add(SupplierAddArgs),

    /// List the suppliers of the organization
    List,
}

/// Arguments for `supplier add`.
#[derive(Args)]
pub struct SupplierAddArgs {
    /// Supplier name, unique within the organization
    pub name: String,

    /// Default waterfall priority (higher is tried first)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub priority: i32,
}

impl SupplierCommand {
    /// Execute the supplier command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        match self {
            SupplierCommand::Add(args) => {
                let supplier = db.register_supplier(&org, &args.name, args.priority)?;
                // The raw id on stdout keeps the command scriptable
                println!("{}", supplier.id.value());
                if !global.quiet {
                    eprintln!(
                        "Registered supplier '{}' with priority {}",
                        supplier.name, supplier.default_priority
                    );
                }
            }
            SupplierCommand::List => {
                let suppliers = Database::list_suppliers(db.connection(), &org)?;
                println!("ID\tNAME\tPRIORITY");
                for supplier in suppliers {
                    println!(
                        "{}\t{}\t{}",
                        supplier.id.value(),
                        supplier.name,
                        supplier.default_priority
                    );
                }
            }
        }

        Ok(())
    }
}
