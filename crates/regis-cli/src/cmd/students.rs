//! `regis students` — manage student records, including photos.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use regis_client::api::{EntityGateway, RestGateway};
use regis_client::controller::ListController;
use regis_client::session::Session;
use regis_client::storage::PhotoStore;
use regis_core::model::{Gender, Record, Student, YearLevel};
use regis_core::validate::{validate_id_number, validate_name};

use crate::cmd::{self, ListFlags};
use crate::output::{CliError, OutputMode, Renderable, render, render_rows, render_success, report};

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    /// List students with search, sort, filters, and pagination.
    List(StudentListArgs),
    /// Enroll a student.
    Add(StudentAddArgs),
    /// Update a student by ID number.
    Update(StudentUpdateArgs),
    /// Delete a student by ID number.
    Delete(StudentDeleteArgs),
    /// Manage a student's photo.
    Photo {
        #[command(subcommand)]
        command: PhotoCommand,
    },
    /// Show the distinct year levels present in the student table.
    YearLevels,
    /// Show the distinct genders present in the student table.
    Genders,
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Upload (or replace) a student's photo from a local file.
    Set(PhotoSetArgs),
    /// Remove a student's photo.
    Rm(PhotoRmArgs),
}

#[derive(Args, Debug)]
pub struct StudentListArgs {
    #[command(flatten)]
    pub flags: ListFlags,
}

#[derive(Args, Debug)]
pub struct StudentAddArgs {
    /// Student ID number, format XXXX-XXXX.
    pub id_number: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// male or female.
    #[arg(long)]
    pub gender: Gender,

    /// Year level: 1-4 or a synonym like "2nd" or "second".
    #[arg(long, value_parser = parse_year)]
    pub year: YearLevel,

    /// Owning college ID.
    #[arg(long)]
    pub college: i64,

    /// Enrolled program ID (must belong to the college).
    #[arg(long)]
    pub program: i64,

    /// Optional photo file to upload before creating the record.
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StudentUpdateArgs {
    /// Student ID number.
    pub id_number: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub gender: Gender,

    #[arg(long, value_parser = parse_year)]
    pub year: YearLevel,

    #[arg(long)]
    pub college: i64,

    #[arg(long)]
    pub program: i64,
}

#[derive(Args, Debug)]
pub struct StudentDeleteArgs {
    /// Student ID number.
    pub id_number: String,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct PhotoSetArgs {
    /// Student ID number.
    pub id_number: String,

    /// Path to a JPEG, PNG, or WebP file (5 MB max).
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PhotoRmArgs {
    /// Student ID number.
    pub id_number: String,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

fn parse_year(s: &str) -> Result<YearLevel, String> {
    YearLevel::parse_synonym(s).ok_or_else(|| format!("unknown year level '{s}' (use 1-4)"))
}

impl Renderable for Student {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:<11} {:<16} {:<16} {:<7} {:<9} {:<24} {}",
            self.id_number,
            self.last_name,
            self.first_name,
            self.gender,
            self.year_level,
            self.program.as_deref().unwrap_or("-"),
            if self.photo_url.is_some() { "📷" } else { "" }
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.id_number,
            self.last_name,
            self.first_name,
            self.gender,
            self.year_level.number(),
            self.program.as_deref().unwrap_or("-")
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID_NUMBER", "LAST", "FIRST", "GENDER", "YEAR", "PROGRAM"]
    }
}

#[derive(Debug, Serialize)]
struct StudentPage {
    students: Vec<Student>,
    page: usize,
    total_pages: usize,
    total: usize,
}

pub fn run(command: &StudentCommand, output: OutputMode) -> Result<()> {
    let mut session = Session::load()?;
    match command {
        StudentCommand::List(args) => run_list(args, &mut session, output),
        StudentCommand::Add(args) => run_add(args, &mut session, output),
        StudentCommand::Update(args) => run_update(args, &mut session, output),
        StudentCommand::Delete(args) => {
            let message = cmd::run_delete::<Student>(
                &mut session,
                &args.id_number,
                "student",
                args.force,
                output,
            )?;
            render_success(output, &message)
        }
        StudentCommand::Photo { command } => match command {
            PhotoCommand::Set(args) => run_photo_set(args, &mut session, output),
            PhotoCommand::Rm(args) => run_photo_rm(args, &mut session, output),
        },
        StudentCommand::YearLevels => run_year_levels(&mut session, output),
        StudentCommand::Genders => run_genders(&mut session, output),
    }
}

fn run_list(args: &StudentListArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    let page = cmd::load_page::<Student>(session, &args.flags, output)?;
    let payload = StudentPage {
        students: page.records,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total_filtered,
    };
    if output == OutputMode::Text {
        return render_rows(&payload.students);
    }
    render(output, &payload, |p, w| {
        writeln!(
            w,
            "{:<11} {:<16} {:<16} {:<7} {:<9} {:<24}",
            "ID NUMBER", "LAST NAME", "FIRST NAME", "GENDER", "YEAR", "PROGRAM"
        )?;
        writeln!(w, "{:-<90}", "")?;
        for student in &p.students {
            student.render_human(w)?;
        }
        writeln!(
            w,
            "page {} of {} ({} student(s))",
            p.page, p.total_pages, p.total
        )
    })
}

fn validate_input(
    id_number: &str,
    first_name: &str,
    last_name: &str,
    output: OutputMode,
) -> Result<()> {
    for check in [
        validate_id_number(id_number),
        validate_name("first_name", first_name),
        validate_name("last_name", last_name),
    ] {
        if let Err(e) = check {
            return Err(report(output, CliError::new(e.to_string())));
        }
    }
    Ok(())
}

fn student_payload(
    id_number: &str,
    first_name: &str,
    last_name: &str,
    gender: Gender,
    year: YearLevel,
    college: i64,
    program: i64,
    photo_url: Option<&str>,
) -> Value {
    serde_json::json!({
        "id_number": id_number,
        "first_name": first_name,
        "last_name": last_name,
        "gender": gender.to_string(),
        "year_level": year.number(),
        "college_id": college,
        "program_id": program,
        "photo_url": photo_url,
    })
}

fn run_add(args: &StudentAddArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.id_number, &args.first_name, &args.last_name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }

    // Photo goes up first; an upload failure aborts the whole add.
    let photo_url = match &args.photo {
        Some(path) => Some(upload_photo(session, &args.id_number, path, None, output)?),
        None => None,
    };

    let mut controller = ListController::new(RestGateway::<Student>::new(&client));
    let payload = student_payload(
        &args.id_number,
        &args.first_name,
        &args.last_name,
        args.gender,
        args.year,
        args.college,
        args.program,
        photo_url.as_deref(),
    );
    let message = cmd::run_create(&mut controller, &payload, session, output)?;
    render_success(output, &message)
}

fn run_update(args: &StudentUpdateArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    validate_input(&args.id_number, &args.first_name, &args.last_name, output)?;
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }

    // Keep whatever photo the record already has.
    let existing = find_student(session, &args.id_number, output)?;
    let mut controller = ListController::new(RestGateway::<Student>::new(&client));
    let payload = student_payload(
        &args.id_number,
        &args.first_name,
        &args.last_name,
        args.gender,
        args.year,
        args.college,
        args.program,
        existing.photo_url.as_deref(),
    );
    let message = cmd::run_update(&mut controller, &args.id_number, &payload, session, output)?;
    render_success(output, &message)
}

fn run_photo_set(args: &PhotoSetArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    let student = find_student(session, &args.id_number, output)?;
    let url = upload_photo(
        session,
        &args.id_number,
        &args.file,
        student.photo_url.as_deref(),
        output,
    )?;
    write_photo_url(session, &student, Some(&url), output)?;
    render_success(output, &format!("photo set: {url}"))
}

fn run_photo_rm(args: &PhotoRmArgs, session: &mut Session, output: OutputMode) -> Result<()> {
    let student = find_student(session, &args.id_number, output)?;
    let Some(old_url) = student.photo_url.clone() else {
        render_success(output, "student has no photo")?;
        return Ok(());
    };

    let confirmed = args.force
        || cmd::confirm(&format!("Remove photo of student '{}'?", args.id_number))
            .unwrap_or(false);
    if !confirmed {
        anyhow::bail!("photo removal cancelled");
    }

    // Clear the record first, then clean up the object; an orphaned object
    // is only a log line.
    write_photo_url(session, &student, None, output)?;
    let store = PhotoStore::new(session.config().storage_url.clone());
    if let Err(e) = store.delete_url(&old_url) {
        tracing::warn!(url = %old_url, error = %e, "failed to delete photo object");
    }
    render_success(output, "photo removed")
}

fn run_year_levels(session: &mut Session, output: OutputMode) -> Result<()> {
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let levels = client
        .student_year_levels()
        .map_err(|e| cmd::write_failed(&e, session, output))?;
    render(output, &levels, |levels, w| {
        for level in levels {
            writeln!(w, "{level}")?;
        }
        Ok(())
    })
}

fn run_genders(session: &mut Session, output: OutputMode) -> Result<()> {
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let genders = client
        .student_genders()
        .map_err(|e| cmd::write_failed(&e, session, output))?;
    render(output, &genders, |genders, w| {
        for gender in genders {
            writeln!(w, "{gender}")?;
        }
        Ok(())
    })
}

/// Fetch the current collection and pick one record by ID number.
fn find_student(
    session: &mut Session,
    id_number: &str,
    output: OutputMode,
) -> Result<Student> {
    let client = session.client();
    if !client.has_token() {
        return Err(cmd::not_logged_in(output));
    }
    let gateway = RestGateway::<Student>::new(&client);
    let students = gateway
        .fetch_all()
        .map_err(|e| cmd::write_failed(&e, session, output))?;
    students
        .into_iter()
        .find(|s| s.key() == id_number)
        .ok_or_else(|| report(output, CliError::new(format!("student '{id_number}' not found"))))
}

fn upload_photo(
    session: &mut Session,
    id_number: &str,
    path: &std::path::Path,
    old_url: Option<&str>,
    output: OutputMode,
) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let store = PhotoStore::new(session.config().storage_url.clone());
    store
        .replace(id_number, &bytes, old_url)
        .map_err(|e| report(output, CliError::new(e.to_string())))
}

/// Rewrite just the photo URL, carrying the rest of the record as is.
fn write_photo_url(
    session: &mut Session,
    student: &Student,
    url: Option<&str>,
    output: OutputMode,
) -> Result<String> {
    let client = session.client();
    let mut controller = ListController::new(RestGateway::<Student>::new(&client));
    let payload = student_payload(
        &student.id_number,
        &student.first_name,
        &student.last_name,
        student.gender,
        student.year_level,
        student.college_id,
        student.program_id,
        url,
    );
    cmd::run_update(&mut controller, &student.id_number, &payload, session, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: StudentCommand,
    }

    #[test]
    fn add_args_parse_year_synonyms() {
        let w = Wrapper::parse_from([
            "regis",
            "add",
            "2025-0001",
            "--first-name",
            "Ana",
            "--last-name",
            "Reyes",
            "--gender",
            "female",
            "--year",
            "2nd",
            "--college",
            "1",
            "--program",
            "4",
        ]);
        let StudentCommand::Add(args) = w.command else {
            panic!("expected add");
        };
        assert_eq!(args.year, YearLevel::Second);
        assert_eq!(args.gender, Gender::Female);
        assert!(args.photo.is_none());
    }

    #[test]
    fn add_args_reject_bad_year() {
        let result = Wrapper::try_parse_from([
            "regis",
            "add",
            "2025-0001",
            "--first-name",
            "Ana",
            "--last-name",
            "Reyes",
            "--gender",
            "female",
            "--year",
            "5th",
            "--college",
            "1",
            "--program",
            "4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn photo_set_args_parse() {
        let w = Wrapper::parse_from(["regis", "photo", "set", "2025-0001", "face.png"]);
        let StudentCommand::Photo {
            command: PhotoCommand::Set(args),
        } = w.command
        else {
            panic!("expected photo set");
        };
        assert_eq!(args.id_number, "2025-0001");
        assert_eq!(args.file, PathBuf::from("face.png"));
    }

    #[test]
    fn photo_rm_args_parse_with_force() {
        let w = Wrapper::parse_from(["regis", "photo", "rm", "2025-0001", "--force"]);
        let StudentCommand::Photo {
            command: PhotoCommand::Rm(args),
        } = w.command
        else {
            panic!("expected photo rm");
        };
        assert!(args.force);
    }

    #[test]
    fn payload_carries_year_as_number_and_gender_as_label() {
        let payload = student_payload(
            "2025-0001",
            "Ana",
            "Reyes",
            Gender::Female,
            YearLevel::Third,
            1,
            4,
            None,
        );
        assert_eq!(payload["year_level"], 3);
        assert_eq!(payload["gender"], "Female");
        assert_eq!(payload["photo_url"], Value::Null);
    }

    #[test]
    fn student_table_row_uses_numeric_year() {
        let student = Student {
            id_number: "2025-0001".into(),
            last_name: "Reyes".into(),
            first_name: "Ana".into(),
            gender: Gender::Female,
            year_level: YearLevel::Second,
            college_id: 1,
            program_id: 4,
            program: Some("BSCS".into()),
            photo_url: None,
        };
        let mut buf = Vec::new();
        student.render_table(&mut buf).unwrap();
        let row = String::from_utf8(buf).unwrap();
        assert_eq!(row.trim_end(), "2025-0001\tReyes\tAna\tFemale\t2\tBSCS");
    }
}
