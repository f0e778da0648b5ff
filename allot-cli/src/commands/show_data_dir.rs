//! Command to show where allot keeps its state.

use crate::error::CliError;
use crate::utils::{resolve_data_dir, GlobalOptions};
use allot::database::DATABASE_FILE_NAME;
use clap::Args;

/// Show the resolved data directory path.
#[derive(Args)]
pub struct ShowDataDirCommand {
    /// Print the database file inside the data directory instead
    #[arg(long)]
    pub database: bool,
}

impl ShowDataDirCommand {
    /// Execute the show-data-dir command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let data_dir = resolve_data_dir(global)?;
        let shown = if self.database {
            data_dir.join(DATABASE_FILE_NAME)
        } else {
            data_dir
        };

        println!("{}", shown.display());
        Ok(())
    }
}
