//! `regis colleges` — manage college records.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use regis_client::api::RestGateway;
use regis_client::controller::ListController;
use regis_client::session::Session;
use regis_core::model::College;
use regis_core::validate::validate_required;

use crate::cmd::{self, ListFlags};
use crate::output::{CliError, OutputMode, Renderable, render, render_rows, render_success, report};

#[derive(Subcommand, Debug)]
pub enum CollegeCommand {
    /// List colleges with search, sort, and pagination.
    List(CollegeListArgs),
    /// Add a college.
    Add(CollegeAddArgs),
    /// Update a college by ID.
    Update(CollegeUpdateArgs),
    /// Delete a college by ID.
    Delete(CollegeDeleteArgs),
}

#[derive(Args, Debug)]
pub struct CollegeListArgs {
    #[command(flatten)]
    pub flags: ListFlags,
}

#[derive(Args, Debug)]
pub struct CollegeAddArgs {
    /// Short college code, e.g. CCS.
    #[arg(long)]
    pub code: String,

    /// Full college name.
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CollegeUpdateArgs {
    /// College ID.
    pub id: i64,

    /// New college code.
    #[arg(long)]
    pub code: String,

    /// New college name.
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CollegeDeleteArgs {
    /// College ID.
    pub id: i64,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

impl Renderable for College {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:<6} {:<10} {:<40} {:>8} {:>8}",
            self.id, self.college_code, self.college_name, self.num_programs, self.num_students
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id, self.college_code, self.college_name, self.num_programs, self.num_students
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "CODE", "NAME", "PROGRAMS", "STUDENTS"]
    }
}

#[derive(Debug, Serialize)]
struct CollegePage {
    colleges: Vec<College>,
    page: usize,
    total_pages: usize,
    total: usize,
}

pub fn run(command: &CollegeCommand, output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;
    match command {
        CollegeCommand::List(args) => run_list(args, &mut session, output),
        CollegeCommand::Add(args) => run_add(args, &mut session, output),
        CollegeCommand::Update(args) => run_update(args, &mut session, output),
        CollegeCommand::Delete(args) => {
            let message = cmd::run_delete::<College>(
                &mut session,
                &args.id.to_string(),
                "college",
                args.force,
                output,
            )?;
            render_success(output, &message)
        }
    }
}

fn run_list(args: &CollegeListArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    let page = cmd::load_page::<College>(session, &args.flags, output)?;
    let payload = CollegePage {
        colleges: page.records,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total_filtered,
    };
    if output == OutputMode::Text {
        return render_rows(&payload.colleges);
    }
    render(output, &payload, |p, w| {
        writeln!(
            w,
            "{:<6} {:<10} {:<40} {:>8} {:>8}",
            "ID", "CODE", "NAME", "PROGRAMS", "STUDENTS"
        )?;
        writeln!(w, "{:-<76}", "")?;
        for college in &p.colleges {
            college.render_human(w)?;
        }
        writeln!(
            w,
            "page {} of {} ({} college(s))",
            p.page, p.total_pages, p.total
        )
    })
}

fn validate_input(code: &str, name: &str, output: OutputMode) -> Result<()> {
    for check in [
        validate_required("college_code", code),
        validate_required("college_name", name),
    ] {
        if let Err(e) = check {
            return Err(report(output, CliError::new(e.to_string())));
        }
    }
    Ok(())
}

fn run_add(args: &CollegeAddArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.code, &args.name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let mut controller = ListController::new(RestGateway::<College>::new(&client));
    let payload = serde_json::json!({
        "college_code": args.code,
        "college_name": args.name,
    });
    let message = cmd::run_create(&mut controller, &payload, session, output)?;
    render_success(output, &message)
}

fn run_update(args: &CollegeUpdateArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.code, &args.name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let mut controller = ListController::new(RestGateway::<College>::new(&client));
    let payload = serde_json::json!({
        "college_code": args.code,
        "college_name": args.name,
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
        command: CollegeCommand,
    }

    #[test]
    fn list_args_parse_with_view_flags() {
        let w = Wrapper::parse_from([
            "regis",
            "list",
            "--search",
            "engineering",
            "--sort-by",
            "college_name",
            "--order",
            "desc",
            "--page",
            "2",
            "--page-size",
            "5",
        ]);
        let CollegeCommand::List(args) = w.command else {
            panic!("expected list");
        };
        let view = args.flags.view_state();
        assert_eq!(view.search, "engineering");
        assert_eq!(view.page, 2);
        assert_eq!(view.page_size, 5);
    }

    #[test]
    fn add_args_parse() {
        let w = Wrapper::parse_from(["regis", "add", "--code", "CCS", "--name", "Computer Studies"]);
        let CollegeCommand::Add(args) = w.command else {
            panic!("expected add");
        };
        assert_eq!(args.code, "CCS");
        assert_eq!(args.name, "Computer Studies");
    }

    #[test]
    fn delete_args_parse_with_force() {
        let w = Wrapper::parse_from(["regis", "delete", "7", "--force"]);
        let CollegeCommand::Delete(args) = w.command else {
            panic!("expected delete");
        };
        assert_eq!(args.id, 7);
        assert!(args.force);
    }

    #[test]
    fn college_renders_as_table_row() {
        let college = College {
            id: 1,
            college_code: "CCS".into(),
            college_name: "Computer Studies".into(),
            num_programs: 4,
            num_students: 120,
        };
        let mut buf = Vec::new();
        college.render_table(&mut buf).unwrap();
        let row = String::from_utf8(buf).unwrap();
        assert_eq!(row.trim_end(), "1\tCCS\tComputer Studies\t4\t120");
    }
}
