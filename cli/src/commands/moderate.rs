//! Review and moderation commands: approve, reject, ban, unban, delete, passwd.

use anyhow::{Context as _, Result, bail};
use tracing::instrument;
use verifymc_business::AdminUserAction;

use crate::context::AppContext;

#[instrument(skip_all, name = "moderate", fields(action = action.name(), %username))]
pub async fn run_action(ctx: &AppContext, username: &str, action: AdminUserAction) -> Result<()> {
    ctx.require_session()?;
    if username.trim().is_empty() {
        bail!("Username cannot be empty");
    }

    // The outcome is printed by the terminal notification sink.
    if !ctx.actions().perform(username, &action).await {
        bail!("{} {username} failed", action.name());
    }
    Ok(())
}

/// `passwd`: prompt twice, then change the password.
pub async fn run_passwd(ctx: &AppContext, username: &str) -> Result<()> {
    ctx.require_session()?;
    let password = rpassword::prompt_password(format!("New password for {username}: "))
        .context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Repeat password: ").context("Failed to read password")?;
    let password = confirmed_password(password, &confirm)?;

    run_action(ctx, username, AdminUserAction::ChangePassword { password }).await
}

fn confirmed_password(password: String, confirm: &str) -> Result<String> {
    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}
