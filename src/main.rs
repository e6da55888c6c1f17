mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use star_assault::compute::{init_session, tick};
use star_assault::config::{DifficultyLevel, GameConfig, TICKS_PER_SECOND};
use star_assault::entities::{GameSession, HeldKeys, InputAction, InputSnapshot};

#[derive(Parser)]
#[command(name = "star_assault")]
#[command(about = "Terminal arcade shooter: five phases from the TIE squadron to the Death Star")]
struct Args {
    /// Starting difficulty (can be changed from the menu)
    #[arg(long, value_enum, default_value = "normal")]
    difficulty: DifficultyLevel,

    /// TOML file replacing the built-in phase list
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here; the terminal belongs to the renderer
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Fixed simulation step.
const TICK: Duration = Duration::from_micros(1_000_000 / TICKS_PER_SECOND as u64);

/// Catch-up limit per rendered frame after a stall.
const MAX_TICKS_PER_FRAME: u32 = 5;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many ticks. Covers terminals that don't emit key-release events: the
/// OS key-repeat rate is ≥ 15 Hz, so a window of 8 ticks (≈133 ms) is always
/// refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` ticks.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, now: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| now.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], now: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, now))
}

fn held_keys(key_frame: &HashMap<KeyCode, u64>, now: u64) -> HeldKeys {
    HeldKeys {
        up: any_held(key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], now),
        down: any_held(key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], now),
        left: any_held(key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], now),
        right: any_held(key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], now),
        shoot: any_held(key_frame, &[KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Char('J')], now),
    }
}

/// Edge-triggered action bound to a key, if any.
fn action_for(code: &KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::Enter => Some(InputAction::Confirm),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Some(InputAction::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputAction::Restart),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(InputAction::OpenDifficulty),
        KeyCode::Char('1') => Some(InputAction::ChooseDifficulty(DifficultyLevel::Easy)),
        KeyCode::Char('2') => Some(InputAction::ChooseDifficulty(DifficultyLevel::Normal)),
        KeyCode::Char('3') => Some(InputAction::ChooseDifficulty(DifficultyLevel::Hard)),
        KeyCode::Backspace => Some(InputAction::Back),
        _ => None,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the tick of the last press/repeat event for
/// every key. Each tick we check which keys are still "fresh" (within
/// `HOLD_WINDOW` ticks) and hand the whole set to the simulation at once, so
/// shooting while steering works on terminals with or without release events.
/// Menu/pause actions are edge-triggered and delivered on the first tick after
/// the key press only.
///
/// Timing: wall-clock time is accumulated and spent in fixed `TICK` steps, so
/// a slow frame delays rendering but never changes the simulation rate.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut pressed: Vec<InputAction> = Vec::new();
    let mut ticks: u64 = 0;
    let mut accumulator = Duration::ZERO;
    let mut last = Instant::now();

    loop {
        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        _ => {}
                    }
                    key_frame.insert(code, ticks);
                    if let Some(action) = action_for(&code) {
                        pressed.push(action);
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, ticks);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Fixed-step simulation ─────────────────────────────────────────────
        let now = Instant::now();
        accumulator += now - last;
        last = now;

        let mut steps = 0;
        while accumulator >= TICK && steps < MAX_TICKS_PER_FRAME {
            let input = InputSnapshot {
                held: held_keys(&key_frame, ticks),
                pressed: std::mem::take(&mut pressed),
            };
            tick(session, &input, rng);
            ticks += 1;
            accumulator -= TICK;
            steps += 1;
        }
        if steps == MAX_TICKS_PER_FRAME {
            accumulator = Duration::ZERO;
        }

        // Sound and particles have no terminal rendition.
        for event in session.drain_events() {
            tracing::trace!(?event, "game event");
        }

        let (width, height) = terminal::size()?;
        display::render(out, session, width, height)?;

        let until_next = TICK.saturating_sub(accumulator);
        thread::sleep(until_next.min(TICK));
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Undo raw mode and the alternate screen. Runs on every exit path, so
/// failures here are ignored.
fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = init_session(config, args.difficulty.settings());

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Release events make held keys exact; without them the hold window
    // stands in.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &mut rng, &rx);

    restore_terminal(&mut out, keyboard_enhanced);
    tracing::info!(score = session.score, "exiting");
    result
}
