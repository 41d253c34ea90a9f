//! Command handlers and shared plumbing for entity subcommands.

pub mod colleges;
pub mod completions;
pub mod login;
pub mod programs;
pub mod students;
pub mod ui;

use std::io::{IsTerminal, Write};

use clap::Args;
use serde::de::DeserializeOwned;

use regis_client::api::{ApiError, EntityGateway, RestGateway};
use regis_client::controller::{FetchOutcome, ListController};
use regis_client::session::Session;
use regis_core::model::Record;
use regis_core::view::{PageView, SortOrder, ViewState};

use crate::output::{CliError, OutputMode, report};

/// List parameters shared by all entity `list` subcommands.
#[derive(Args, Debug)]
pub struct ListFlags {
    /// Free-text search query.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Field to sort by (snake_case field name).
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction.
    #[arg(long, value_parser = parse_order, default_value = "asc")]
    pub order: SortOrder,

    /// Page to show (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Records per page.
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Exact-match field filter, `field=value`. Repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

impl ListFlags {
    pub fn view_state(&self) -> ViewState {
        let mut view = ViewState::new(self.page_size);
        view.set_search(self.search.clone());
        view.set_sort(self.sort_by.clone());
        view.set_order(self.order);
        for (field, value) in &self.filters {
            view.set_filter(field.clone(), value.clone());
        }
        // Setters reset the page; the explicit flag wins.
        view.page = self.page.max(1);
        view
    }
}

fn parse_order(s: &str) -> Result<SortOrder, String> {
    match s.to_lowercase().as_str() {
        "asc" | "ascending" => Ok(SortOrder::Ascending),
        "desc" | "descending" => Ok(SortOrder::Descending),
        other => Err(format!("unknown sort order '{other}' (use asc or desc)")),
    }
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("filter '{s}' is not in field=value form"))
}

/// Error raised (and already rendered) when no session token is present.
pub fn not_logged_in(output: OutputMode) -> anyhow::Error {
    report(
        output,
        CliError::with_details("not logged in", "Run 'regis login' first", "not_logged_in"),
    )
}

/// Clear the dead session and raise an already-rendered error.
pub fn session_expired(session: &mut Session, output: OutputMode) -> anyhow::Error {
    if let Err(e) = session.force_logout() {
        tracing::warn!(error = %e, "failed to clear expired session");
    }
    report(
        output,
        CliError::with_details(
            "session expired",
            "Run 'regis login' to sign in again",
            "session_expired",
        ),
    )
}

/// Fetch one entity collection and project it through the list flags.
///
/// A non-auth fetch failure comes back as an empty page, mirroring how the
/// interactive console shows an empty table and logs the cause.
pub fn load_page<R>(
    session: &mut Session,
    flags: &ListFlags,
    output: OutputMode,
) -> anyhow::Result<PageView<R>>
where
    R: Record + DeserializeOwned,
{
    let client = session.client();
    let mut controller = ListController::new(RestGateway::<R>::new(&client));
    controller.view = flags.view_state();

    match controller.fetch() {
        FetchOutcome::NotAuthenticated => Err(not_logged_in(output)),
        FetchOutcome::SessionExpired => Err(session_expired(session, output)),
        // fetch clamps an out-of-range page, so the projection is never
        // stranded past the last page.
        FetchOutcome::Loaded(_) | FetchOutcome::Failed => Ok(controller.page()),
    }
}

/// Map a write-path error: 401 clears the session, everything else surfaces
/// the server message.
pub fn write_failed(
    error: &ApiError,
    session: &mut Session,
    output: OutputMode,
) -> anyhow::Error {
    match error {
        ApiError::Unauthorized => session_expired(session, output),
        other => report(output, CliError::new(other.to_string())),
    }
}

/// Interactive `[y/N]` confirmation. Auto-confirms when not attached to a
/// terminal so scripted use behaves like `--force`.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Build the delete-side controller and run the confirm-gated delete.
pub fn run_delete<R>(
    session: &mut Session,
    key: &str,
    label: &str,
    force: bool,
    output: OutputMode,
) -> anyhow::Result<String>
where
    R: Record + DeserializeOwned,
{
    let client = session.client();
    if !client.has_token() {
        return Err(not_logged_in(output));
    }
    let mut controller = ListController::new(RestGateway::<R>::new(&client));

    let gate = || force || confirm(&format!("Delete {label} '{key}'?")).unwrap_or(false);
    match controller.delete(key, gate) {
        regis_client::controller::DeleteOutcome::Deleted(message) => Ok(message),
        regis_client::controller::DeleteOutcome::Cancelled => {
            anyhow::bail!("deletion of '{key}' cancelled")
        }
        regis_client::controller::DeleteOutcome::SessionExpired => {
            Err(session_expired(session, output))
        }
        regis_client::controller::DeleteOutcome::Rejected(message) => {
            Err(report(output, CliError::new(message)))
        }
    }
}

/// Issue a create through the controller, mapping errors the standard way.
pub fn run_create<G: EntityGateway>(
    controller: &mut ListController<G>,
    payload: &serde_json::Value,
    session: &mut Session,
    output: OutputMode,
) -> anyhow::Result<String> {
    controller
        .create(payload)
        .map_err(|e| write_failed(&e, session, output))
}

/// Issue an update through the controller, mapping errors the standard way.
pub fn run_update<G: EntityGateway>(
    controller: &mut ListController<G>,
    key: &str,
    payload: &serde_json::Value,
    session: &mut Session,
    output: OutputMode,
) -> anyhow::Result<String> {
    controller
        .update(key, payload)
        .map_err(|e| write_failed(&e, session, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flag_parses_field_value() {
        assert_eq!(
            parse_filter("gender=Female").unwrap(),
            ("gender".to_string(), "Female".to_string())
        );
        assert!(parse_filter("gender").is_err());
    }

    #[test]
    fn order_flag_accepts_both_spellings() {
        assert_eq!(parse_order("asc").unwrap(), SortOrder::Ascending);
        assert_eq!(parse_order("DESC").unwrap(), SortOrder::Descending);
        assert!(parse_order("sideways").is_err());
    }

    #[test]
    fn list_flags_build_the_view() {
        let flags = ListFlags {
            search: "ana".into(),
            sort_by: Some("last_name".into()),
            order: SortOrder::Descending,
            page: 3,
            page_size: 25,
            filters: vec![("gender".into(), "Female".into())],
        };
        let view = flags.view_state();
        assert_eq!(view.search, "ana");
        assert_eq!(view.sort_by.as_deref(), Some("last_name"));
        assert_eq!(view.order, SortOrder::Descending);
        assert_eq!(view.page, 3);
        assert_eq!(view.page_size, 25);
        assert_eq!(view.filters.get("gender").map(String::as_str), Some("Female"));
    }
}
