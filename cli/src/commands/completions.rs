//! `completions`: shell completion scripts for `verifymc`.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::output::Output;

/// Where each shell expects the script, printed as a hint on stderr.
fn install_hint(shell: Shell) -> Option<&'static str> {
    match shell {
        Shell::Bash => Some("verifymc completions bash > ~/.local/share/bash-completion/completions/verifymc"),
        Shell::Zsh => Some("verifymc completions zsh > ~/.zfunc/_verifymc"),
        Shell::Fish => Some("verifymc completions fish > ~/.config/fish/completions/verifymc.fish"),
        _ => None,
    }
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
    out.flush().context("Failed to write completions")
}

pub fn generate_completions(shell: Shell) -> Result<()> {
    let stdout = io::stdout();
    write_completions(shell, &mut stdout.lock())?;
    if let Some(hint) = install_hint(shell) {
        Output::stderr().dim(format!("Install with: {hint}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_names_the_binary_and_commands() {
        let mut script = Vec::new();
        write_completions(Shell::Bash, &mut script).expect("Should write completions");
        let script = String::from_utf8(script).expect("Should be UTF-8");

        assert!(script.contains("verifymc"));
        assert!(script.contains("server-status"));
        assert!(script.contains("--api-url"));
    }

    #[test]
    fn test_install_hint_per_shell() {
        assert!(install_hint(Shell::Fish).is_some_and(|hint| hint.ends_with("verifymc.fish")));
        assert!(install_hint(Shell::PowerShell).is_none());
    }
}
