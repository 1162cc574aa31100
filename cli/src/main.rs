//! `verifymc`: terminal admin console for a VerifyMC whitelist portal.

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod terminal;
mod timing;

use anyhow::Result;
use clap::Parser as _;
use verifymc_business::AdminUserAction;

use crate::cli::{Cli, Commands};
use crate::context::{AppContext, Overrides};

/// Admin page each command stands in for, used as the post-login redirect.
fn location(command: &Commands) -> &'static str {
    match command {
        Commands::Login => "/login",
        Commands::Users { .. }
        | Commands::Approve { .. }
        | Commands::Reject { .. }
        | Commands::Ban { .. }
        | Commands::Unban { .. }
        | Commands::Delete { .. }
        | Commands::Passwd { .. } => "/admin/users",
        Commands::Audits => "/admin/audits",
        Commands::ServerStatus => "/admin/server-status",
        Commands::Logout
        | Commands::Whoami
        | Commands::Watch { .. }
        | Commands::Version
        | Commands::Completions { .. } => "/admin",
    }
}

fn needs_admin(command: &Commands) -> bool {
    location(command) == "/admin/users" || matches!(command, Commands::Audits)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    if let Commands::Completions { shell } = cli.command {
        return commands::generate_completions(shell);
    }

    let overrides = Overrides {
        api_url: cli.api_url,
        locale: cli.locale,
    };
    let ctx = AppContext::open(&overrides, location(&cli.command))?;
    if needs_admin(&cli.command) {
        commands::ensure_authenticated(&ctx).await?;
    }

    match cli.command {
        Commands::Login => commands::run_login(&ctx).await,
        Commands::Logout => {
            commands::run_logout(&ctx);
            Ok(())
        }
        Commands::Whoami => commands::run_whoami(&ctx).await,
        Commands::Users { page, size, search } => {
            commands::run_users(&ctx, page, size, search).await
        }
        Commands::Approve { username } => {
            commands::run_action(&ctx, &username, AdminUserAction::Approve).await
        }
        Commands::Reject { username, reason } => {
            commands::run_action(&ctx, &username, AdminUserAction::Reject { reason }).await
        }
        Commands::Ban { username } => {
            commands::run_action(&ctx, &username, AdminUserAction::Ban).await
        }
        Commands::Unban { username } => {
            commands::run_action(&ctx, &username, AdminUserAction::Unban).await
        }
        Commands::Delete { username } => {
            commands::run_action(&ctx, &username, AdminUserAction::Delete).await
        }
        Commands::Passwd { username } => commands::run_passwd(&ctx, &username).await,
        Commands::ServerStatus => commands::run_server_status(&ctx).await,
        Commands::Audits => commands::run_audits(&ctx).await,
        Commands::Watch { url } => commands::run_watch(&ctx, &url).await,
        Commands::Version => commands::run_version(&ctx).await,
        // Handled before the context is opened.
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_commands_need_a_session() {
        let cli = Cli::parse_from(["verifymc", "reject", "steve", "--reason", "spam"]);
        assert!(needs_admin(&cli.command));
        assert_eq!(location(&cli.command), "/admin/users");

        let cli = Cli::parse_from(["verifymc", "server-status"]);
        assert!(!needs_admin(&cli.command));

        let cli = Cli::parse_from(["verifymc", "users", "-p", "2", "-q", "steve"]);
        match cli.command {
            Commands::Users { page, size, search } => {
                assert_eq!(page, 2);
                assert_eq!(size, 10);
                assert_eq!(search.as_deref(), Some("steve"));
            }
            _ => panic!("expected the users command"),
        }
    }
}
