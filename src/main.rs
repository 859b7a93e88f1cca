mod display;
mod input;

use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing_subscriber::EnvFilter;

use formation_shooter::collision::AabbDetector;
use formation_shooter::compute::Coordinator;
use formation_shooter::config::GameConfig;
use formation_shooter::engine::NoticeBoard;

use display::Viewport;
use input::TerminalInput;

/// Terminal alien-formation shooter.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML file overriding the default tuning.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write tracing output to this file (filter with RUST_LOG).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective config as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

type TerminalGame = Coordinator<TerminalInput, AabbDetector, NoticeBoard>;

/// Tick at a fixed rate until the player quits.  After game over the world
/// stays frozen on screen with its notice.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut TerminalGame,
    dt: f32,
    frame: Duration,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        game.tick(dt);
        if game.input().quit_requested() {
            return Ok(());
        }

        let (cols, rows) = terminal::size().context("failed to query terminal size")?;
        let session = game.session();
        let view = Viewport::new(cols, rows, session.width, session.height);
        display::render(out, session, game.notifier().latest(), &view)
            .context("failed to draw frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}

// ── Terminal lifecycle ────────────────────────────────────────────────────────

/// Switch to the alternate screen and hide the cursor.  Returns whether the
/// terminal accepted the key-release reporting flags.
fn prepare_screen<W: Write>(out: &mut W) -> io::Result<bool> {
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    Ok(out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok())
}

/// Undo `prepare_screen`, ignoring errors so every step is attempted.
fn restore_screen<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.print_config {
        print!("{}", config.to_toml().context("failed to serialise config")?);
        return Ok(());
    }
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    tracing::info!(?config, "starting session");

    let dt = config.clock.dt;
    let frame = Duration::try_from_secs_f32(dt).context("invalid frame duration")?;

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    let setup = prepare_screen(&mut out).context("failed to prepare terminal");
    let keyboard_enhanced = matches!(setup, Ok(true));

    // Dedicate a thread to blocking event reads so the game loop never waits
    // on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let mut game = Coordinator::new(
        &config,
        TerminalInput::new(rx),
        AabbDetector,
        NoticeBoard::default(),
    );
    let result = setup.and_then(|_| game_loop(&mut out, &mut game, dt, frame));

    // Always restore the terminal
    restore_screen(&mut out, keyboard_enhanced);
    let _ = terminal::disable_raw_mode();

    let stats = &game.session().stats;
    tracing::info!(?stats, "session ended");
    result
}
