use anyhow::Result;

use regis_client::session::Session;

use crate::output::OutputMode;
use crate::tui;

/// Launch the interactive console.
///
/// # Errors
///
/// Returns an error when no session token is present or the terminal loop
/// fails.
pub fn run_ui(output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;
    if !session.is_authenticated() {
        return Err(super::not_logged_in(output));
    }
    tui::run(&mut session)
}
