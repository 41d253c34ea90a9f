//! `regis login` / `regis logout` — session lifecycle.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use serde::Serialize;

use regis_client::session::Session;

use crate::output::{CliError, OutputMode, render, render_success, report};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Admin username.
    pub username: String,

    /// Password. Prompted for (hidden) when omitted.
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginOutput {
    ok: bool,
    message: String,
    username: String,
}

pub fn run_login(args: &LoginArgs, output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;

    let password = match &args.password {
        Some(p) => p.clone(),
        None => read_password("Password: ")?,
    };

    match session.login(&args.username, &password) {
        Ok(message) => {
            let payload = LoginOutput {
                ok: true,
                message: if message.is_empty() {
                    "Login successful".to_string()
                } else {
                    message
                },
                username: args.username.clone(),
            };
            render(output, &payload, |p, w| {
                writeln!(w, "✓ {} (signed in as {})", p.message, p.username)
            })
        }
        Err(e) => Err(report(
            output,
            CliError::with_details(
                format!("{e:#}"),
                "Check the username and password, and that the backend is reachable",
                "login_failed",
            ),
        )),
    }
}

pub fn run_logout(output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;
    if !session.is_authenticated() {
        render_success(output, "already logged out")?;
        return Ok(());
    }
    session.logout()?;
    render_success(output, "logged out")
}

/// Read a line from the terminal without echoing it.
///
/// Falls back to a plain (echoed) read when stdin is not a terminal, so
/// piped input still works.
fn read_password(prompt: &str) -> Result<String> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    eprint!("{prompt}");
    std::io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_password_keys();
    terminal::disable_raw_mode()?;
    eprintln!();
    result
}

fn read_password_keys() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Esc => {
                    password.clear();
                    break;
                }
                KeyCode::Char(c) => password.push(c),
                _ => {}
            }
        }
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LoginArgs,
    }

    #[test]
    fn login_args_parse() {
        let w = Wrapper::parse_from(["regis", "admin", "--password", "hunter2"]);
        assert_eq!(w.args.username, "admin");
        assert_eq!(w.args.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn login_password_is_optional() {
        let w = Wrapper::parse_from(["regis", "admin"]);
        assert!(w.args.password.is_none());
    }
}
