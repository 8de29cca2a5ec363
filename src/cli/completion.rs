//! Shell completion generation for orgusers

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

use crate::cli::CliArgs;
use crate::error::Result;

/// Write the completion script for `shell` to `out`
pub fn generate_completion(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, "orgusers", out);
    out.flush()?;
    Ok(())
}
