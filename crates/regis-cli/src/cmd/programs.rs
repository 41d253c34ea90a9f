//! `regis programs` — manage degree program records.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use regis_client::api::RestGateway;
use regis_client::controller::ListController;
use regis_client::session::Session;
use regis_core::model::Program;
use regis_core::validate::validate_required;

use crate::cmd::{self, ListFlags};
use crate::output::{CliError, OutputMode, Renderable, render, render_rows, render_success, report};

#[derive(Subcommand, Debug)]
pub enum ProgramCommand {
    /// List programs with search, sort, and pagination.
    List(ProgramListArgs),
    /// Add a program under a college.
    Add(ProgramAddArgs),
    /// Update a program by ID.
    Update(ProgramUpdateArgs),
    /// Delete a program by ID.
    Delete(ProgramDeleteArgs),
}

#[derive(Args, Debug)]
pub struct ProgramListArgs {
    #[command(flatten)]
    pub flags: ListFlags,
}

#[derive(Args, Debug)]
pub struct ProgramAddArgs {
    /// Short program code, e.g. BSCS.
    #[arg(long)]
    pub code: String,

    /// Full program name.
    #[arg(long)]
    pub name: String,

    /// ID of the college this program belongs to.
    #[arg(long)]
    pub college: i64,
}

#[derive(Args, Debug)]
pub struct ProgramUpdateArgs {
    /// Program ID.
    pub id: i64,

    /// New program code.
    #[arg(long)]
    pub code: String,

    /// New program name.
    #[arg(long)]
    pub name: String,

    /// New owning college ID.
    #[arg(long)]
    pub college: i64,
}

#[derive(Args, Debug)]
pub struct ProgramDeleteArgs {
    /// Program ID.
    pub id: i64,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

impl Renderable for Program {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:<6} {:<10} {:<40} {:<30} {:>8}",
            self.id, self.program_code, self.program_name, self.college_name, self.num_students
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id, self.program_code, self.program_name, self.college_name, self.num_students
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "CODE", "NAME", "COLLEGE", "STUDENTS"]
    }
}

#[derive(Debug, Serialize)]
struct ProgramPage {
    programs: Vec<Program>,
    page: usize,
    total_pages: usize,
    total: usize,
}

pub fn run(command: &ProgramCommand, output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;
    match command {
        ProgramCommand::List(args) => run_list(args, &mut session, output),
        ProgramCommand::Add(args) => run_add(args, &mut session, output),
        ProgramCommand::Update(args) => run_update(args, &mut session, output),
        ProgramCommand::Delete(args) => {
            let message = cmd::run_delete::<Program>(
                &mut session,
                &args.id.to_string(),
                "program",
                args.force,
                output,
            )?;
            render_success(output, &message)
        }
    }
}

fn run_list(args: &ProgramListArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    let page = cmd::load_page::<Program>(session, &args.flags, output)?;
    let payload = ProgramPage {
        programs: page.records,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total_filtered,
    };
    if output == OutputMode::Text {
        return render_rows(&payload.programs);
    }
    render(output, &payload, |p, w| {
        writeln!(
            w,
            "{:<6} {:<10} {:<40} {:<30} {:>8}",
            "ID", "CODE", "NAME", "COLLEGE", "STUDENTS"
        )?;
        writeln!(w, "{:-<98}", "")?;
        for program in &p.programs {
            program.render_human(w)?;
        }
        writeln!(
            w,
            "page {} of {} ({} program(s))",
            p.page, p.total_pages, p.total
        )
    })
}

fn validate_input(code: &str, name: &str, output: OutputMode) -> Result<()> {
    for check in [
        validate_required("program_code", code),
        validate_required("program_name", name),
    ] {
        if let Err(e) = check {
            return Err(report(output, CliError::new(e.to_string())));
        }
    }
    Ok(())
}

fn run_add(args: &ProgramAddArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.code, &args.name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let mut controller = ListController::new(RestGateway::<Program>::new(&client));
    let payload = serde_json::json!({
        "program_code": args.code,
        "program_name": args.name,
        "college_id": args.college,
    });
    let message = cmd::run_create(&mut controller, &payload, session, output)?;
    render_success(output, &message)
}

fn run_update(args: &ProgramUpdateArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.code, &args.name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let mut controller = ListController::new(RestGateway::<Program>::new(&client));
    let payload = serde_json::json!({
        "program_code": args.code,
        "program_name": args.name,
        "college_id": args.college,
    });
    let message = cmd::run_update(
        &mut controller,
        &args.id.to_string(),
        &payload,
        session,
        output,
    )?;
    render_success(output, &message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: ProgramCommand,
    }

    #[test]
    fn add_args_require_college() {
        let result = Wrapper::try_parse_from(["regis", "add", "--code", "BSCS", "--name", "CS"]);
        assert!(result.is_err());

        let w = Wrapper::parse_from([
            "regis", "add", "--code", "BSCS", "--name", "CS", "--college", "3",
        ]);
        let ProgramCommand::Add(args) = w.command else {
            panic!("expected add");
        };
        assert_eq!(args.college, 3);
    }

    #[test]
    fn update_args_parse() {
        let w = Wrapper::parse_from([
            "regis", "update", "9", "--code", "BSIT", "--name", "Info Tech", "--college", "2",
        ]);
        let ProgramCommand::Update(args) = w.command else {
            panic!("expected update");
        };
        assert_eq!(args.id, 9);
        assert_eq!(args.code, "BSIT");
    }

    #[test]
    fn program_filter_flag_reaches_view_state() {
        let w = Wrapper::parse_from(["regis", "list", "--filter", "college_id=2"]);
        let ProgramCommand::List(args) = w.command else {
            panic!("expected list");
        };
        let view = args.flags.view_state();
        assert_eq!(view.filters.get("college_id").map(String::as_str), Some("2"));
    }
}
