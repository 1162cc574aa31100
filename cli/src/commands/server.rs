//! Read-only portal views: `server-status`, `audits` and `version`.

use anyhow::{Result, bail};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;
use verifymc_business::api::{AuditRecord, MemoryUsage};

use crate::context::AppContext;
use crate::output::Output;

fn format_memory(memory: MemoryUsage) -> String {
    let percent = if memory.max == 0 {
        0.0
    } else {
        memory.used as f64 / memory.max as f64 * 100.0
    };
    format!("{} / {} MB ({percent:.0}%)", memory.used, memory.max)
}

#[instrument(skip_all, name = "server_status")]
pub async fn run_server_status(ctx: &AppContext) -> Result<()> {
    let out = Output::new();
    let response = ctx.api.server_status().await?;
    let Some(status) = response.data.filter(|_| response.success) else {
        bail!(
            "{}",
            response.msg.as_deref().unwrap_or("Server status unavailable")
        );
    };

    if status.online {
        out.success("Server is online");
    } else {
        out.warning("Server is offline");
    }
    if let Some(version) = &status.version {
        out.labeled_indent("Version", version, 2);
    }
    if let Some(motd) = &status.motd {
        out.labeled_indent("MOTD", motd, 2);
    }
    if let Some(players) = &status.players {
        out.labeled_indent("Players", format!("{}/{}", players.online, players.max), 2);
        for player in &players.list {
            out.dim(format!("    {}", player.name));
        }
    }
    if let Some(tps) = status.tps {
        out.labeled_indent("TPS", format!("{tps:.1}"), 2);
    }
    if let Some(memory) = status.memory {
        out.labeled_indent("Memory", format_memory(memory), 2);
    }
    Ok(())
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&AuditRecord> for AuditRow {
    fn from(record: &AuditRecord) -> Self {
        Self {
            time: chrono::DateTime::from_timestamp_millis(record.timestamp)
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            action: record.action.clone(),
            operator: record.operator.clone(),
            target: record.target.clone(),
            detail: record.detail.clone(),
        }
    }
}

#[instrument(skip_all, name = "audits")]
pub async fn run_audits(ctx: &AppContext) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();
    let response = ctx.api.audit_log().await?;
    if response.audits.is_empty() {
        out.dim("No audit records.");
        return Ok(());
    }

    let rows: Vec<AuditRow> = response.audits.iter().map(AuditRow::from).collect();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    out.print(table);
    Ok(())
}

#[instrument(skip_all, name = "version")]
pub async fn run_version(ctx: &AppContext) -> Result<()> {
    let out = Output::new();
    out.labeled_indent("CLI", env!("CARGO_PKG_VERSION"), 0);

    let version = ctx.api.version().await?;
    if let Some(current) = &version.current_version {
        out.labeled_indent("Plugin", current, 0);
    }
    if let Some(error) = &version.error {
        out.warning(format!("Update check failed: {error}"));
    } else if version.update_available == Some(true) {
        out.info(format!(
            "Update available: {}",
            version.latest_version.as_deref().unwrap_or("unknown")
        ));
        if let Some(url) = &version.releases_url {
            out.labeled_indent("Releases", url, 2);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::CliTestContext;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory(MemoryUsage { used: 512, max: 2048 }), "512 / 2048 MB (25%)");
        assert_eq!(format_memory(MemoryUsage { used: 0, max: 0 }), "0 / 0 MB (0%)");
    }

    #[test]
    fn test_audit_row_formats_timestamp() {
        let record = AuditRecord {
            action: "ban".to_owned(),
            timestamp: 0,
            ..AuditRecord::default()
        };
        assert_eq!(AuditRow::from(&record).time, "1970-01-01 00:00");
    }

    #[tokio::test]
    async fn test_server_status_failure_is_an_error() {
        let ctx = CliTestContext::new("/admin/server").await;
        Mock::given(method("GET"))
            .and(path("/api/server/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "msg": "Server unreachable",
            })))
            .mount(&ctx.mock_server)
            .await;

        let err = run_server_status(&ctx.app).await.unwrap_err();
        assert_eq!(err.to_string(), "Server unreachable");
    }

    #[tokio::test]
    async fn test_audits_require_session() {
        let ctx = CliTestContext::new("/admin/audits").await;
        assert!(run_audits(&ctx.app).await.is_err());
    }
}
