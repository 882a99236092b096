use std::fmt;
use std::time::Duration;

use quiz_core::model::QuestionImage;
use services::{Clock, QuizConfig, QuizError, QuizEvent, QuizHandle, QuizServices, RoundSummary};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    Config(services::ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<services::ConfigError> for ArgsError {
    fn from(err: services::ConfigError) -> Self {
        Self::Config(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_number(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<u32, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  movie-quiz [--db <sqlite_url>] [--questions <n>] [--dwell-ms <ms>]");
    eprintln!("             [--catalog <path> | --catalog-url <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://movie-quiz.sqlite3");
    eprintln!("  --questions 10, --dwell-ms 1000, built-in movie catalog");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS_AMOUNT, QUIZ_ANSWER_DWELL_MS,");
    eprintln!("  QUIZ_CATALOG_PATH, QUIZ_CATALOG_URL, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    db_url: String,
    config: QuizConfig,
}

impl Args {
    /// Flags override `config`, which already carries the environment.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        db_url: String,
        config: QuizConfig,
    ) -> Result<Option<Self>, ArgsError> {
        let mut parsed = Self { db_url, config };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    let amount = require_number(args, "--questions")?;
                    parsed.config = parsed.config.with_questions_amount(amount)?;
                }
                "--dwell-ms" => {
                    let millis = require_number(args, "--dwell-ms")?;
                    parsed.config = parsed
                        .config
                        .with_answer_dwell(Duration::from_millis(u64::from(millis)));
                }
                "--catalog" => {
                    let path = require_value(args, "--catalog")?;
                    parsed.config = parsed.config.with_catalog_file(path);
                }
                "--catalog-url" => {
                    let url = require_value(args, "--catalog-url")?;
                    parsed.config = parsed.config.with_remote_catalog(url)?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(parsed))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn describe_image(image: &QuestionImage) -> String {
    match image {
        QuestionImage::Named(name) => name.clone(),
        QuestionImage::Bytes(bytes) => format!("<image, {} bytes>", bytes.len()),
    }
}

fn render(event: &QuizEvent) {
    match event {
        QuizEvent::QuestionReady { question, .. } => {
            let label = event.progress_label().unwrap_or_default();
            println!();
            println!("[{label}] {}", describe_image(question.image()));
            println!("{} (y/n)", question.text());
        }
        QuizEvent::AnswerEvaluated { is_correct, .. } => {
            println!("{}", if *is_correct { "Correct!" } else { "Wrong." });
        }
        QuizEvent::RoundFinished { result, summary } => {
            let text = RoundSummary::new(result, summary.as_ref());
            println!();
            println!("{}", text.title);
            println!("{}", text.message);
            println!("[r] {}  [q] Quit", text.button_text);
        }
        QuizEvent::DataLoadError(err) => {
            println!("Could not load questions: {err}");
            println!("[r] Try again  [q] Quit");
        }
        QuizEvent::CatalogExhausted {
            delivered,
            expected,
        } => {
            println!("The catalog ran out after {delivered} of {expected} questions.");
            println!("[r] Try again  [q] Quit");
        }
        QuizEvent::PersistenceError(err) => {
            eprintln!("Statistics were not saved: {err}");
        }
    }
}

async fn answer(handle: &QuizHandle, choice: bool) -> Result<(), QuizError> {
    match handle.submit_answer(choice).await {
        Ok(_) => Ok(()),
        Err(QuizError::NoActiveQuestion) => {
            log::debug!("answer ignored, no question on screen");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db_url = std::env::var("QUIZ_DB_URL")
        .ok()
        .map_or_else(|| "sqlite://movie-quiz.sqlite3".into(), normalize_sqlite_url);
    let config = QuizConfig::from_env()?;

    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv, db_url, config) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    prepare_sqlite_file(&parsed.db_url)?;
    let services = QuizServices::new_sqlite(&parsed.db_url, parsed.config, Clock::system()).await?;

    let stats = services.results().snapshot().await?;
    if stats.games_count > 0 {
        println!(
            "Quizzes played: {}, average accuracy: {:.2}%",
            stats.games_count, stats.total_accuracy
        );
    }

    let (handle, mut events, task) = services.spawn_runner();
    handle.start()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                render(&event);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" => answer(&handle, true).await?,
                    "n" | "no" => answer(&handle, false).await?,
                    "r" => handle.restart()?,
                    "q" => break,
                    "" => {}
                    other => println!("Unknown input {other:?}: use y, n, r or q."),
                }
            }
        }
    }

    drop(handle);
    let _ = task.await;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter, "sqlite::memory:".into(), QuizConfig::default())
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&["--questions", "5", "--dwell-ms", "200", "--catalog", "movies.json"])
            .unwrap()
            .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.config.questions_amount.get(), 5);
        assert_eq!(args.config.answer_dwell, Duration::from_millis(200));
        assert_eq!(
            args.config.catalog,
            services::CatalogSource::File("movies.json".into())
        );
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["--questions"]),
            Err(ArgsError::MissingValue { flag: "--questions" })
        ));
        assert!(matches!(
            parse(&["--questions", "0"]),
            Err(ArgsError::Config(_))
        ));
        assert!(matches!(
            parse(&["--dwell-ms", "slow"]),
            Err(ArgsError::InvalidNumber { .. })
        ));
        assert!(matches!(parse(&["--wat"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        let url = normalize_sqlite_url("sqlite:quiz.sqlite3".into());
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
