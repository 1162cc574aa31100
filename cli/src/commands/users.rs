//! `users`: one page of the admin user list.

use anyhow::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;
use verifymc_business::api::UserRecord;
use verifymc_business::{AdminUsersState, PaginationState};

use crate::context::AppContext;
use crate::output::Output;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Registered")]
    registered: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            status: user.status.to_string(),
            registered: user
                .registration_time
                .as_ref()
                .map(|time| time.display())
                .unwrap_or_default(),
            score: user
                .questionnaire_score
                .map(|score| format!("{score:.0}"))
                .unwrap_or_default(),
        }
    }
}

/// Load the requested page through the tiered loader.
pub(crate) async fn load_page(
    ctx: &AppContext,
    page: u32,
    size: u32,
    search: Option<String>,
) -> AdminUsersState {
    let state = AdminUsersState {
        page_size: size.max(1),
        search_query: search.unwrap_or_default(),
        pagination: PaginationState {
            current_page: page.max(1),
            ..PaginationState::default()
        },
        locale: ctx.locale().to_owned(),
        ..AdminUsersState::default()
    };
    let users = ctx.admin_users(state);
    users.load_all_users().await;
    users.snapshot()
}

#[instrument(skip_all, name = "users", fields(page = page, size = size))]
pub async fn run_users(
    ctx: &AppContext,
    page: u32,
    size: u32,
    search: Option<String>,
) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();

    let state = load_page(ctx, page, size, search).await;
    if state.users.is_empty() {
        out.dim("No users found.");
        return Ok(());
    }

    let rows: Vec<UserRow> = state.users.iter().map(UserRow::from).collect();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    out.print(table);
    out.page_footer(
        state.pagination.current_page,
        state.pagination.total_pages,
        state.pagination.total_count,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::CliTestContext;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_user_row_formats_optional_fields() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "username": "steve",
            "email": "s@a.com",
            "status": "approved",
            "regTime": 0,
            "questionnaire_score": 87.6,
        }))
        .expect("Should parse");
        let row = UserRow::from(&user);
        assert_eq!(row.status, "approved");
        assert_eq!(row.registered, "1970-01-01 00:00");
        assert_eq!(row.score, "88");
    }

    #[tokio::test]
    async fn test_load_page_uses_server_pagination() {
        let ctx = CliTestContext::new("/admin/users").await;
        ctx.set_authenticated("abc");
        Mock::given(method("POST"))
            .and(path("/api/admin/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .mount(&ctx.mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .and(query_param("page", "3"))
            .and(query_param("size", "5"))
            .and(query_param("search", "ste"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "users": [{"username": "steve", "email": "s@a.com", "status": "pending"}],
                "pagination": {"currentPage": 3, "totalCount": 11, "totalPages": 3,
                               "hasNext": false, "hasPrev": true},
            })))
            .expect(1)
            .mount(&ctx.mock_server)
            .await;

        let state = load_page(&ctx.app, 3, 5, Some("ste".to_owned())).await;

        assert_eq!(state.users.len(), 1);
        assert_eq!(state.pagination.current_page, 3);
        assert_eq!(state.pagination.total_count, 11);
        assert!(!state.loading);
    }
}
