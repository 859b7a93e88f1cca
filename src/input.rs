/// Keyboard → `FrameInput`.
///
/// Instead of acting on each key event individually, we keep a `key_frame`
/// map with the frame of the last press/repeat event for every key.  Each
/// poll checks which keys are still "fresh" (within `HOLD_WINDOW` frames), so
/// Space and a direction can be held together.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events, keys drop out on release.
/// * **Classic terminals**: only `Press` events.  Keys expire after
///   `HOLD_WINDOW` frames of silence.

use std::collections::HashMap;
use std::sync::mpsc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use formation_shooter::engine::InputSource;
use formation_shooter::entities::FrameInput;

/// A key counts as held if its last press/repeat arrived within this many
/// frames (≈130 ms at 60 ticks/sec, longer than the OS repeat interval).
const HOLD_WINDOW: u64 = 8;

const FIRE: KeyCode = KeyCode::Char(' ');

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

pub struct TerminalInput {
    rx: mpsc::Receiver<Event>,
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    quit: bool,
}

impl TerminalInput {
    pub fn new(rx: mpsc::Receiver<Event>) -> Self {
        Self {
            rx,
            key_frame: HashMap::new(),
            frame: 0,
            quit: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| is_held(&self.key_frame, k, self.frame))
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> FrameInput {
        self.frame += 1;
        let mut shoot = false;

        // Drain all pending events without blocking.
        while let Ok(event) = self.rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    // A press while Space is still fresh is OS auto-repeat,
                    // not a new trigger.
                    if code == FIRE && !is_held(&self.key_frame, &FIRE, self.frame) {
                        shoot = true;
                    }
                    self.key_frame.insert(code, self.frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            self.quit = true;
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            self.quit = true;
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, self.frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }

        FrameInput {
            left: self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            shoot,
        }
    }
}
