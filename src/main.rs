use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use photostamp::{
    CaptureTimestamp, Config, Session, TimestampOrigin, Watermarker,
    extract_capture_timestamp, startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "photostamp.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the capture timestamp found in an image
    Inspect {
        file: PathBuf,
    },

    /// Burn a timestamp into an image and save a copy beside it
    Stamp {
        file: PathBuf,

        /// Use this text instead of the capture timestamp
        #[arg(short, long)]
        timestamp: Option<String>,

        /// Prompt to edit the timestamp before rendering
        #[arg(short, long)]
        edit: bool,
    },

    /// Check the configuration and font files
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Check) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Stamp {
            file,
            timestamp,
            edit,
        } => stamp(config, file, timestamp, edit),
        Commands::Check => check(&config),
    }
}

fn inspect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(file)?;
    match extract_capture_timestamp(&data, file) {
        Some(timestamp) => println!("{}", timestamp),
        None => println!(
            "{} (no capture timestamp found, using current time)",
            CaptureTimestamp::now()
        ),
    }
    Ok(())
}

fn stamp(
    config: Config,
    file: PathBuf,
    timestamp: Option<String>,
    edit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(Watermarker::new(config.watermark));

    let origin = session.select(file)?;
    if origin == TimestampOrigin::Clock {
        info!("No capture timestamp found, prefilled with the current time");
    }

    if let Some(text) = timestamp {
        session.set_timestamp(text);
    }

    if edit {
        let text = prompt_timestamp(session.timestamp())?;
        session.set_timestamp(text);
    }

    match session.render() {
        Ok(path) => {
            println!("Watermark added, saved at: {}", path.display());
            Ok(())
        }
        Err(e) if e.is_user_input() => {
            warn!("{}", e);
            eprintln!("Warning: {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Show the prefilled value and read a replacement; an empty reply keeps it.
fn prompt_timestamp(current: &str) -> std::io::Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Timestamp [{}]: ", current)?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let reply = line.trim_end_matches(['\r', '\n']);

    if reply.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(reply.to_string())
    }
}

fn check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match startup_checks::perform_startup_checks(config) {
        Ok(()) => {
            println!("All checks passed");
            Ok(())
        }
        Err(errors) => {
            let mut critical = false;
            for e in &errors {
                if e.is_critical() {
                    critical = true;
                    eprintln!("Error: {}", e);
                } else {
                    eprintln!("Warning: {}", e);
                }
            }
            if critical {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
