//! `coh completions`: shell completion scripts for `coh`.

use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `coh completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish, ...).
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print a completion script covering `analyze`, `bin` and their flags.
///
/// The script goes to stdout so it can be redirected into the shell's
/// completion directory.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the handler signature uniform with
/// the other subcommands.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let mut out = std::io::stdout();
    generate(shell, command, "coh", &mut out);
    Ok(())
}
