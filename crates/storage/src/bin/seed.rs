use std::fmt;

use chrono::{DateTime, Utc};
use lesson_core::model::{LessonId, UserId};
use log::info;
use storage::catalog::{demo_lessons, demo_quizzes};
use storage::repository::{LessonRepository, ProgressRepository, QuizRepository, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    completed: Vec<LessonId>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidCompleted { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidCompleted { raw } => {
                write!(f, "invalid --completed value (expected lesson ids): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
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

fn parse_completed(raw: &str) -> Result<Vec<LessonId>, ArgsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map(LessonId::new)
                .map_err(|_| ArgsError::InvalidCompleted { raw: raw.to_string() })
        })
        .collect()
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LESSONS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("LESSONS_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut completed = std::env::var("LESSONS_COMPLETED")
            .ok()
            .as_deref()
            .map(parse_completed)
            .transpose()?
            .unwrap_or_else(|| vec![LessonId::new(1), LessonId::new(2)]);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--completed" => {
                    let value = require_value(&mut args, "--completed")?;
                    completed = parse_completed(&value)?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            completed,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user <id>               Demo user id to seed progress for (default: 1)");
    eprintln!("  --completed <ids>         Comma-separated lesson ids to mark completed (default: 1,2)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LESSONS_DB_URL, LESSONS_USER_ID, LESSONS_COMPLETED");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let lessons = demo_lessons()?;
    for lesson in &lessons {
        storage.lessons.upsert_lesson(lesson).await?;
        info!("seeded lesson {}: {}", lesson.id(), lesson.title());
    }

    let quizzes = demo_quizzes()?;
    for quiz in &quizzes {
        storage.quizzes.upsert_quiz(quiz).await?;
        info!(
            "seeded quiz for lesson {} ({} questions)",
            quiz.lesson_id(),
            quiz.question_count()
        );
    }

    for lesson_id in &args.completed {
        let newly = storage
            .progress
            .mark_completed(args.user_id, *lesson_id, now)
            .await?;
        if newly {
            info!("marked lesson {lesson_id} completed for user {}", args.user_id);
        }
    }

    println!(
        "Seeded {} lessons, {} quizzes and {} completions for user {} into {}",
        lessons.len(),
        quizzes.len(),
        args.completed.len(),
        args.user_id.value(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
