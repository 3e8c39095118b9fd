use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, MIN_PASSWORD_LEN, MonthYear};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "splitcart_admin")]
#[command(about = "Admin utilities for splitcart (bootstrap users, export reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitcart.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Report(Report),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Report {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    Export(ReportExportArgs),
    Monthly(ReportMonthlyArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Csv,
}

#[derive(Args, Debug)]
struct ReportExportArgs {
    /// Owner of the session.
    #[arg(long)]
    email: String,
    #[arg(long)]
    session: Uuid,
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
    /// Output file; a directory gets the session's default file name.
    /// Stdout when absent.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportMonthlyArgs {
    #[arg(long)]
    email: String,
    /// `M/YYYY`; the current month when absent.
    #[arg(long)]
    month: Option<MonthYear>,
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
    /// Output file; a directory gets the report's default file name.
    /// Stdout when absent.
    #[arg(long)]
    output: Option<PathBuf>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn warn_line(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            warn_line(&format!(
                "Password must have at least {MIN_PASSWORD_LEN} characters."
            ))?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        warn_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn write_output(
    body: &[u8],
    output: Option<PathBuf>,
    default_name: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(default_name)
            } else {
                path
            };
            std::fs::write(&path, body)?;
            println!("report written to {}", path.display());
        }
        None => std::io::stdout().write_all(body)?,
    }
    Ok(())
}

async fn export_report(
    engine: &Engine,
    args: ReportExportArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let owner = engine.user_by_email(&args.email).await?;
    let report = engine
        .session_report(&owner.id.to_string(), args.session)
        .await?;

    let (body, extension) = match args.format {
        Format::Text => (report.render_text().into_bytes(), "txt"),
        Format::Csv => (report.to_csv()?, "csv"),
    };
    write_output(&body, args.output, report.file_name(extension))
}

async fn monthly_report(
    engine: &Engine,
    args: ReportMonthlyArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let owner = engine.user_by_email(&args.email).await?;
    let report = engine
        .monthly_report(&owner.id.to_string(), args.month)
        .await?;

    let (body, extension) = match args.format {
        Format::Text => (report.render_text().into_bytes(), "txt"),
        Format::Csv => (report.to_csv()?, "csv"),
    };
    write_output(&body, args.output, report.file_name(extension))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            match engine.sign_up(&args.email, &password).await {
                Ok(auth) => println!("created user: {} ({})", auth.user.email, auth.user.id),
                Err(EngineError::ExistingKey(email)) => {
                    eprintln!("user already exists: {email}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Report(Report {
            command: ReportCommand::Export(args),
        }) => {
            if let Err(err) = export_report(&engine, args).await {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
        Command::Report(Report {
            command: ReportCommand::Monthly(args),
        }) => {
            if let Err(err) = monthly_report(&engine, args).await {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
