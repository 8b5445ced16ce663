use crossterm::event::{
    poll, read, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
    EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, ModifierKeyCode, MouseButton, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, trace};

use crate::controller::Action;
use crate::journey::{Keystroke, Modifier};

/// how long the reader thread blocks before checking whether anyone is
/// still listening
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// bare modifier keys, as reported by terminals with keyboard enhancement
const MODIFIER_KEYMAP: [(ModifierKeyCode, Modifier); 12] = [
    (ModifierKeyCode::LeftShift, Modifier::Shift),
    (ModifierKeyCode::RightShift, Modifier::Shift),
    (ModifierKeyCode::LeftControl, Modifier::Control),
    (ModifierKeyCode::RightControl, Modifier::Control),
    (ModifierKeyCode::LeftAlt, Modifier::Alt),
    (ModifierKeyCode::RightAlt, Modifier::Alt),
    (ModifierKeyCode::LeftSuper, Modifier::Meta),
    (ModifierKeyCode::RightSuper, Modifier::Meta),
    (ModifierKeyCode::LeftMeta, Modifier::Meta),
    (ModifierKeyCode::RightMeta, Modifier::Meta),
    (ModifierKeyCode::LeftHyper, Modifier::Meta),
    (ModifierKeyCode::RightHyper, Modifier::Meta),
];

/// reads user actions
pub trait Input {
    /// wait up to `timeout` for the next action. `None` means nothing
    /// happened, or nothing that maps to an action.
    fn next_action(&mut self, timeout: Duration) -> Result<Option<Action>, io::Error>;
}

/// the one table that turns terminal events into actions
pub struct Keymap {
    modifiers: HashMap<ModifierKeyCode, Modifier>,
}

impl Default for Keymap {
    fn default() -> Self {
        Keymap {
            modifiers: HashMap::from(MODIFIER_KEYMAP),
        }
    }
}

impl Keymap {
    pub fn translate(&self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.translate_key(key),
            Event::Paste(text) => Keystroke::character(&text).map(Action::Key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(Action::Click {
                    column: mouse.column,
                    row: mouse.row,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    fn translate_key(&self, key: KeyEvent) -> Option<Action> {
        // releases and repeats only show up with keyboard enhancement on
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let chord = key.modifiers;
        match key.code {
            KeyCode::Char('c') if chord.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            // without keyboard enhancement a bare modifier is never reported,
            // so a chord stands in for it
            KeyCode::Char(_) if chord.contains(KeyModifiers::CONTROL) => {
                Some(Action::Key(Keystroke::Modifier(Modifier::Control)))
            }
            KeyCode::Char(_) if chord.contains(KeyModifiers::ALT) => {
                Some(Action::Key(Keystroke::Modifier(Modifier::Alt)))
            }
            KeyCode::Char(_) if chord.intersects(KeyModifiers::SUPER | KeyModifiers::META) => {
                Some(Action::Key(Keystroke::Modifier(Modifier::Meta)))
            }
            KeyCode::Char(c) => Keystroke::character(c.encode_utf8(&mut [0; 4])).map(Action::Key),
            KeyCode::Backspace => Some(Action::Key(Keystroke::Backspace)),
            KeyCode::Enter => Some(Action::Key(Keystroke::Enter)),
            KeyCode::Modifier(code) => match self.modifiers.get(&code) {
                Some(m) => Some(Action::Key(Keystroke::Modifier(*m))),
                None => {
                    trace!(?code, "unmapped modifier");
                    None
                }
            },
            KeyCode::Tab | KeyCode::Right => Some(Action::NextMode),
            KeyCode::BackTab | KeyCode::Left => Some(Action::PrevMode),
            KeyCode::F(5) => Some(Action::Restart),
            KeyCode::Esc => Some(Action::Home),
            code => {
                trace!(?code, "unmapped key");
                None
            }
        }
    }
}

/// keyboard and mouse from the controlling terminal. puts the terminal in
/// raw mode for as long as it lives.
pub struct TermInput {
    keymap: Keymap,
    enhanced: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )?;
        }
        debug!(enhanced, "terminal input ready");
        Ok(TermInput {
            keymap: Keymap::default(),
            enhanced,
        })
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        // nothing useful to do if restoring fails on the way out
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(io::stdout(), DisableBracketedPaste, DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn next_action(&mut self, timeout: Duration) -> Result<Option<Action>, io::Error> {
        if !poll(timeout)? {
            return Ok(None);
        }
        Ok(self.keymap.translate(read()?))
    }
}

/// dummy Input implementation for testing
pub struct DummyInput {
    actions: VecDeque<Action>,
}

impl DummyInput {
    pub fn new(actions: &[Action]) -> Self {
        DummyInput {
            actions: actions.iter().cloned().collect(),
        }
    }
}

impl Input for DummyInput {
    fn next_action(&mut self, timeout: Duration) -> Result<Option<Action>, io::Error> {
        match self.actions.pop_front() {
            Some(action) => Ok(Some(action)),
            None => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

/// read `input` on its own thread and send every action to `tx`, until the
/// receiving side goes away. a read error is logged and turned into a quit.
pub fn forward<I>(mut input: I, tx: UnboundedSender<Action>) -> thread::JoinHandle<()>
where
    I: Input + Send + 'static,
{
    thread::spawn(move || {
        while !tx.is_closed() {
            match input.next_action(POLL_INTERVAL) {
                Ok(Some(action)) => {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "reading terminal input failed");
                    let _ = tx.send(Action::Quit);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn press(code: KeyCode) -> Event {
        key(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_characters() {
        let k = Keymap::default();
        assert_eq!(
            k.translate(press(KeyCode::Char('A'))),
            Some(Action::Key(Keystroke::Character("A".into())))
        );
        assert_eq!(
            k.translate(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Action::Key(Keystroke::Character("A".into())))
        );
        // a space trims to nothing
        assert_eq!(k.translate(press(KeyCode::Char(' '))), None);
    }

    #[test]
    fn test_journey_keys() {
        let k = Keymap::default();
        assert_eq!(
            k.translate(press(KeyCode::Backspace)),
            Some(Action::Key(Keystroke::Backspace))
        );
        assert_eq!(
            k.translate(press(KeyCode::Enter)),
            Some(Action::Key(Keystroke::Enter))
        );
        assert_eq!(
            k.translate(press(KeyCode::Modifier(ModifierKeyCode::RightShift))),
            Some(Action::Key(Keystroke::Modifier(Modifier::Shift)))
        );
        assert_eq!(
            k.translate(press(KeyCode::Modifier(ModifierKeyCode::LeftMeta))),
            Some(Action::Key(Keystroke::Modifier(Modifier::Meta)))
        );
        assert_eq!(
            k.translate(press(KeyCode::Modifier(ModifierKeyCode::IsoLevel3Shift))),
            None
        );
    }

    #[test]
    fn test_chords_stand_in_for_modifiers() {
        let k = Keymap::default();
        assert_eq!(
            k.translate(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some(Action::Key(Keystroke::Modifier(Modifier::Control)))
        );
        assert_eq!(
            k.translate(key(KeyCode::Char('x'), KeyModifiers::ALT)),
            Some(Action::Key(Keystroke::Modifier(Modifier::Alt)))
        );
        assert_eq!(
            k.translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_scene_keys() {
        let k = Keymap::default();
        assert_eq!(k.translate(press(KeyCode::F(5))), Some(Action::Restart));
        assert_eq!(k.translate(press(KeyCode::Esc)), Some(Action::Home));
        assert_eq!(k.translate(press(KeyCode::Tab)), Some(Action::NextMode));
        assert_eq!(k.translate(press(KeyCode::Left)), Some(Action::PrevMode));
        assert_eq!(k.translate(press(KeyCode::F(1))), None);
    }

    #[test]
    fn test_releases_are_ignored() {
        let k = Keymap::default();
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(k.translate(Event::Key(release)), None);
    }

    #[test]
    fn test_paste_and_click() {
        let k = Keymap::default();
        assert_eq!(
            k.translate(Event::Paste("  hello ".into())),
            Some(Action::Key(Keystroke::Character("hello".into())))
        );
        assert_eq!(k.translate(Event::Paste("\n".into())), None);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            k.translate(Event::Mouse(click)),
            Some(Action::Click { column: 12, row: 3 })
        );
        assert_eq!(k.translate(Event::Resize(80, 24)), None);
    }

    #[test]
    fn test_forward_until_receiver_drops() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let input = DummyInput::new(&[Action::Start, Action::Home]);
        let reader = forward(input, tx);
        assert_eq!(rx.blocking_recv(), Some(Action::Start));
        assert_eq!(rx.blocking_recv(), Some(Action::Home));
        drop(rx);
        reader.join().unwrap();
    }
}
