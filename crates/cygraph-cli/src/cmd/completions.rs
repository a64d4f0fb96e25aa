use std::io::Write;

use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Binary name baked into generated completion scripts.
const BIN_NAME: &str = "cygraph";

/// Arguments for `cygraph completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate a completion script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    generate(shell, command, BIN_NAME, out);
}

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write_completions(shell, command, &mut out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    #[test]
    fn script_names_the_binary_and_subcommands() {
        let mut command = Command::new(BIN_NAME)
            .subcommand(Command::new("metrics").arg(Arg::new("suite")))
            .subcommand(Command::new("bounds"));
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut command, &mut buf);
        let script = String::from_utf8(buf).expect("utf8");
        assert!(script.contains(BIN_NAME));
        assert!(script.contains("metrics"));
        assert!(script.contains("bounds"));
    }
}
