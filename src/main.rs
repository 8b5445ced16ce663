use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keyjourney::app;
use keyjourney::config::{BinaryWidth, Config, Mode};
use keyjourney::display::{AlternateScreen, TermDisplay};
use keyjourney::input::{self, TermInput};

/// The journey of a keystroke, animated in the terminal
#[derive(Parser, Debug)]
#[command(name = "keyjourney")]
#[command(about = "Follow a key press from the keyboard to the screen")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting speed: slow, normal or fast
    #[arg(short, long)]
    mode: Option<String>,

    /// What to do with characters above U+00FF
    #[arg(long, value_enum)]
    binary_width: Option<BinaryWidth>,

    /// Write logs here; the terminal belongs to the animation
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn,keyjourney=info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(mode) = &args.mode {
        config.mode = Mode::from_selector(mode);
    }
    if let Some(width) = args.binary_width {
        config.binary_width = width;
    }
    info!(mode = %config.mode, binary_width = ?config.binary_width, "starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    // the reader thread owns the input and leaves raw mode when it ends
    let input = TermInput::new()?;
    let _screen = AlternateScreen::enter()?;
    let mut display = TermDisplay::stdout()?;

    let (tx, rx) = unbounded_channel();
    let reader = input::forward(input, tx);

    let result = LocalSet::new().block_on(&runtime, app::run(config, &mut display, rx));
    // the loop closed the channel; the reader notices within a poll interval
    let _ = reader.join();
    Ok(result?)
}
