use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use course_core::model::Status;
use services::{Clock, CourseProgress, TrackerService, TrackerSession, progress_overview};
use storage::json::JsonFileRepository;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingInput,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingInput => {
                write!(f, "import needs --input <export.json> (or TRACK_INPUT)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- import --input <export.json> [--data-dir <dir>] [--force]");
    eprintln!("  cargo run -p app -- summary [--data-dir <dir>] [--course <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data-dir .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACK_DATA_DIR, TRACK_INPUT");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Import,
    Summary,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "import" => Some(Self::Import),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

struct ImportArgs {
    data_dir: PathBuf,
    input: PathBuf,
    force: bool,
}

struct SummaryArgs {
    data_dir: PathBuf,
    course: Option<String>,
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("TRACK_DATA_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from)
}

impl ImportArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_dir = default_data_dir();
        let mut input = std::env::var_os("TRACK_INPUT").map(PathBuf::from);
        let mut force = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--input" => input = Some(PathBuf::from(require_value(args, "--input")?)),
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let input = input.ok_or(ArgsError::MissingInput)?;
        Ok(Self {
            data_dir,
            input,
            force,
        })
    }
}

impl SummaryArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_dir = default_data_dir();
        let mut course = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--course" => course = Some(require_value(args, "--course")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { data_dir, course })
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("initialize tracing subscriber: {err}"))?;
    Ok(())
}

fn open_tracker(
    data_dir: &Path,
) -> Result<(JsonFileRepository, TrackerService), Box<dyn std::error::Error>> {
    let repo = JsonFileRepository::open(data_dir)?;
    let service = TrackerService::new(
        Clock::system(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );
    Ok((repo, service))
}

fn run_import(args: &ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, service) = open_tracker(&args.data_dir)?;
    let autosave_path = repo.autosave_path();
    if autosave_path.exists() && !args.force {
        return Err(format!(
            "{} already exists; pass --force to replace it",
            autosave_path.display()
        )
        .into());
    }

    let raw = std::fs::read_to_string(&args.input)?;
    let mut session = TrackerSession::new(service.vocabulary().clone());
    let embedded = service.load_upload(&mut session, &raw)?;
    service.save(&mut session)?;

    println!(
        "imported {} courses ({embedded} embedded status entries) into {}",
        session.catalog().len(),
        args.data_dir.display()
    );
    Ok(())
}

fn run_summary(args: &SummaryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_repo, service) = open_tracker(&args.data_dir)?;
    let session = service.open_session(None)?;
    if session.catalog().is_empty() {
        println!("no courses in {}", args.data_dir.display());
        return Ok(());
    }

    let rows = match &args.course {
        Some(course_id) => {
            let progress = CourseProgress::for_course(&session, course_id)
                .ok_or_else(|| format!("course {course_id} is not in the catalog"))?;
            vec![progress]
        }
        None => progress_overview(&session),
    };

    for progress in rows {
        println!(
            "{:>5.1}%  {}  {}",
            progress.completion_percent(),
            progress.course_id,
            progress.title
        );
        let breakdown = Status::ALL
            .iter()
            .map(|status| format!("{}: {}", status.plain(), progress.count(*status)))
            .collect::<Vec<_>>()
            .join(", ");
        println!("        {} tracked  [{breakdown}]", progress.total());
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: print the summary when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Summary,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Summary,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    match cmd {
        Command::Import => {
            let parsed = ImportArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            run_import(&parsed)
        }
        Command::Summary => {
            let parsed = SummaryArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            run_summary(&parsed)
        }
    }
}

fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
