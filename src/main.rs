mod display;

use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use space_invaders::compute::{init_state, tick};
use space_invaders::config::Settings;
use space_invaders::entities::{GameState, GameStatus, Level};
use space_invaders::input::{KeyTracker, Mouse};

use display::Viewport;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

const DEFAULT_CONFIG: &str = "space_invaders.json";

// ── Menu ──────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum MenuResult {
    Start(Level),
    Quit,
}

fn menu_choice(code: &KeyCode) -> Option<MenuResult> {
    match code {
        KeyCode::Char('1') => Some(MenuResult::Start(Level::Easy)),
        KeyCode::Char('2') => Some(MenuResult::Start(Level::Medium)),
        KeyCode::Char('3') => Some(MenuResult::Start(Level::Hard)),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(MenuResult::Quit),
        _ => None,
    }
}

/// Block until the user makes a choice.  A closed channel means the reader
/// thread is gone and no choice can ever arrive.
fn wait_for_menu_choice(rx: &mpsc::Receiver<Event>) -> MenuResult {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => {
                if let Some(choice) = menu_choice(&code) {
                    return choice;
                }
            }
            Ok(_) => {}
            Err(mpsc::RecvError) => {
                log::warn!("Input channel closed in menu, quitting");
                return MenuResult::Quit;
            }
        }
    }
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
) -> std::io::Result<MenuResult> {
    display::draw_menu(out, settings.pointer_steering)?;
    Ok(wait_for_menu_choice(rx))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// How a game session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameExit {
    Quit,
    /// Same difficulty, fresh world.
    Restart,
    Menu,
}

/// One-shot keys.  Restart and menu only apply once the game is over.
fn exit_for_key(code: &KeyCode, modifiers: KeyModifiers, status: GameStatus) -> Option<GameExit> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(GameExit::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(GameExit::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') if status != GameStatus::Playing => {
            Some(GameExit::Restart)
        }
        KeyCode::Char('m') | KeyCode::Char('M') if status != GameStatus::Playing => {
            Some(GameExit::Menu)
        }
        _ => None,
    }
}

/// Everything read from the input channel during one frame.
#[derive(Debug, Default, PartialEq)]
struct FrameInput {
    exit: Option<GameExit>,
    /// Last terminal cell the pointer was seen on.
    pointer: Option<(u16, u16)>,
}

/// Drain all pending input events without blocking.  Held keys go into
/// `keys`; a disconnected channel ends the game.
fn drain_events(
    rx: &mpsc::Receiver<Event>,
    keys: &mut KeyTracker,
    frame: u64,
    status: GameStatus,
) -> FrameInput {
    let mut input = FrameInput::default();
    loop {
        match rx.try_recv() {
            Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) => {
                keys.record(&code, kind, frame);
                if kind == KeyEventKind::Press {
                    if let Some(exit) = exit_for_key(&code, modifiers, status) {
                        input.exit = Some(exit);
                        return input;
                    }
                }
            }
            Ok(Event::Mouse(MouseEvent { kind, column, row, .. })) => {
                if matches!(
                    kind,
                    MouseEventKind::Moved | MouseEventKind::Down(_) | MouseEventKind::Drag(_)
                ) {
                    input.pointer = Some((column, row));
                }
            }
            Ok(_) => {}
            Err(TryRecvError::Empty) => return input,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Input channel closed during play, quitting");
                input.exit = Some(GameExit::Quit);
                return input;
            }
        }
    }
}

/// Each frame drains pending terminal events into the key tracker and the
/// mouse record, advances the simulation once and redraws everything.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<GameExit> {
    let mut rng = thread_rng();
    let mut keys = KeyTracker::new();
    let mut mouse = Mouse::default();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        let input = drain_events(rx, &mut keys, frame, state.status);
        if let Some(exit) = input.exit {
            return Ok(exit);
        }
        if let Some((column, row)) = input.pointer {
            let (width, height) = terminal::size()?;
            let view = Viewport::new(width, height, state.settings.width, state.settings.height);
            let (x, y) = view.to_surface(column, row);
            mouse.set_position(x, y);
        }

        if state.status == GameStatus::Playing {
            *state = tick(state, &keys.keyboard(frame), &mouse, &mut rng);
        }

        display::render(out, state)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    // Off unless RUST_LOG is set; redirect stderr to keep the screen clean.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let settings = Settings::load(&config_path)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to key-repeat.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    log::debug!("Keyboard enhancement: {}", keyboard_enhanced);

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                log::error!("Terminal event read failed: {}", e);
                break;
            }
        }
    });

    let result = run(&mut out, &rx, &settings);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
) -> std::io::Result<()> {
    log::info!("Space Invaders starting");

    loop {
        let level = match show_menu(out, rx, settings)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => level,
        };
        loop {
            log::info!("New game on {:?}", level);
            let mut state = init_state(settings.clone(), level);
            let exit = game_loop(out, &mut state, rx)?;
            log::info!(
                "Game ended: {:?}, score {}, frame {}",
                state.status,
                state.score,
                state.frame
            );
            match exit {
                GameExit::Restart => continue,
                GameExit::Menu => break,
                GameExit::Quit => return Ok(()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossterm::event::MouseButton;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn pointer(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn menu_quits_when_reader_thread_is_gone() {
        let (tx, rx) = mpsc::channel::<Event>();
        drop(tx);
        assert_eq!(wait_for_menu_choice(&rx), MenuResult::Quit);
    }

    #[test]
    fn menu_skips_unrelated_events() {
        let (tx, rx) = mpsc::channel::<Event>();
        tx.send(pointer(MouseEventKind::Moved, 3, 4)).unwrap();
        tx.send(press(KeyCode::Char('x'))).unwrap();
        tx.send(press(KeyCode::Char('2'))).unwrap();
        assert_eq!(wait_for_menu_choice(&rx), MenuResult::Start(Level::Medium));
    }

    #[test]
    fn play_quits_when_reader_thread_is_gone() {
        let (tx, rx) = mpsc::channel::<Event>();
        tx.send(press(KeyCode::Left)).unwrap();
        drop(tx);
        let mut keys = KeyTracker::new();
        let input = drain_events(&rx, &mut keys, 1, GameStatus::Playing);
        assert_eq!(input.exit, Some(GameExit::Quit));
        assert!(keys.keyboard(1).left);
    }

    #[test]
    fn empty_channel_keeps_playing() {
        let (_tx, rx) = mpsc::channel::<Event>();
        let mut keys = KeyTracker::new();
        assert_eq!(
            drain_events(&rx, &mut keys, 1, GameStatus::Playing),
            FrameInput::default()
        );
    }

    #[test]
    fn last_pointer_position_wins() {
        let (tx, rx) = mpsc::channel::<Event>();
        tx.send(pointer(MouseEventKind::Moved, 3, 4)).unwrap();
        tx.send(pointer(MouseEventKind::Down(MouseButton::Left), 10, 5)).unwrap();
        tx.send(pointer(MouseEventKind::ScrollUp, 20, 20)).unwrap();
        let mut keys = KeyTracker::new();
        let input = drain_events(&rx, &mut keys, 1, GameStatus::Playing);
        assert_eq!(input.pointer, Some((10, 5)));
        assert_eq!(input.exit, None);
    }

    #[test]
    fn restart_keeps_level_only_after_game_ends() {
        let r = KeyCode::Char('r');
        assert_eq!(exit_for_key(&r, KeyModifiers::NONE, GameStatus::Playing), None);
        assert_eq!(
            exit_for_key(&r, KeyModifiers::NONE, GameStatus::Lost),
            Some(GameExit::Restart)
        );
        assert_eq!(
            exit_for_key(&KeyCode::Char('m'), KeyModifiers::NONE, GameStatus::Won),
            Some(GameExit::Menu)
        );
        assert_eq!(
            exit_for_key(&KeyCode::Char('c'), KeyModifiers::CONTROL, GameStatus::Playing),
            Some(GameExit::Quit)
        );
        assert_eq!(
            exit_for_key(&KeyCode::Char('c'), KeyModifiers::NONE, GameStatus::Playing),
            None
        );
    }
}
