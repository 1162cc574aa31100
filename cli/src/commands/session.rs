//! `login`, `logout` and `whoami`.

use std::io::IsTerminal as _;

use anyhow::{Context as _, Result, bail};
use tracing::{info, instrument};
use verifymc_business::layout::DashboardLayout;

use crate::context::AppContext;
use crate::output::Output;

#[instrument(skip_all, name = "login")]
pub async fn run_login(ctx: &AppContext) -> Result<()> {
    let out = Output::new();
    out.header("Sign in to VerifyMC");

    let password =
        rpassword::prompt_password("Admin password: ").context("Failed to read password")?;
    login_with_password(ctx, &password).await?;

    out.success("Signed in as admin");
    if let Some(expires_at) = ctx.session.expires_at() {
        out.labeled_indent("Session expires", expires_at.format("%Y-%m-%d %H:%M UTC"), 2);
    }
    out.labeled_indent("Saved to", ctx.config_path().display(), 2);
    Ok(())
}

/// Prompt for the admin password when there is no session and stdin is a
/// terminal.
#[instrument(skip_all, name = "ensure_authenticated")]
pub async fn ensure_authenticated(ctx: &AppContext) -> Result<()> {
    if ctx.session.is_authenticated() {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        bail!("Not signed in and stdin is not a terminal. Run `verifymc login` first.");
    }

    Output::stderr().warning("Session expired or not signed in. Please sign in to continue.");
    run_login(ctx).await
}

pub(crate) async fn login_with_password(ctx: &AppContext, password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let response = ctx.api.admin_login(password, ctx.locale()).await?;
    if !response.success || response.token.is_none() {
        let message = response.message.unwrap_or_else(|| "Login failed".to_owned());
        bail!("{message}");
    }
    info!("admin login succeeded");
    Ok(())
}

pub fn run_logout(ctx: &AppContext) {
    let out = Output::new();
    if !ctx.session.is_authenticated() {
        out.dim("Not currently signed in.");
        return;
    }
    ctx.api.logout();
    out.success("Signed out");
}

#[instrument(skip_all, name = "whoami")]
pub async fn run_whoami(ctx: &AppContext) -> Result<()> {
    let out = Output::new();
    if !ctx.session.is_authenticated() {
        out.dim("Not signed in.");
        out.dim("Use 'verifymc login' to sign in.");
        return Ok(());
    }

    let ack = ctx.api.verify_admin_token(ctx.locale()).await?;
    if ack.success {
        out.success("Signed in as admin");
    } else {
        out.warning(ack.message().unwrap_or("Token was not accepted"));
    }
    if let Some(expires_at) = ctx.session.expires_at() {
        out.labeled_indent("Session expires", expires_at.format("%Y-%m-%d %H:%M UTC"), 2);
    }

    let layout = DashboardLayout::for_user(ctx.translator.as_ref(), ctx.session.is_admin());
    let sections: Vec<_> = layout.menu_items().map(|item| item.label.as_str()).collect();
    out.labeled_indent("Sections", sections.join(", "), 2);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::CliTestContext;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_login_persists_session() {
        let ctx = CliTestContext::new("/login").await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .and(body_json(serde_json::json!({"password": "hunter2", "language": "en"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "token": "jwt-token",
            })))
            .mount(&ctx.mock_server)
            .await;

        login_with_password(&ctx.app, "hunter2").await.expect("Should log in");

        assert!(ctx.app.session.is_admin());
        let content = std::fs::read_to_string(ctx.app.config_path()).expect("Should read file");
        assert!(content.contains("jwt-token"));
    }

    #[tokio::test]
    async fn test_login_failure_carries_server_message() {
        let ctx = CliTestContext::new("/login").await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "Invalid password",
            })))
            .mount(&ctx.mock_server)
            .await;

        let err = login_with_password(&ctx.app, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid password");
        assert!(!ctx.app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_empty_password_is_rejected_locally() {
        let ctx = CliTestContext::new("/login").await;
        assert!(login_with_password(&ctx.app, "").await.is_err());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let ctx = CliTestContext::new("/admin").await;
        ctx.set_authenticated("abc");
        run_logout(&ctx.app);
        assert!(!ctx.app.session.is_authenticated());
    }
}
