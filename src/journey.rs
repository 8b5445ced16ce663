//! Journeys: the scripted trip a keystroke takes through the machine.
//!
//! Each kind of keystroke has a fixed, linear script of [`Cue`]s. A script is
//! plain data; [`run`] plays it against the stage through a [`Sequencer`].

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::BinaryWidth;
use crate::error::Halt;
use crate::sequencer::Sequencer;
use crate::stage::Anchor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

impl Modifier {
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Shift => "Shift",
            Modifier::Control => "Control",
            Modifier::Alt => "Alt",
            Modifier::Meta => "Meta",
        }
    }
}

/// a classified keystroke: which journey it takes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    /// printable input, already trimmed; usually one character, but a paste
    /// arrives whole
    Character(String),
    Backspace,
    Enter,
    Modifier(Modifier),
}

impl Keystroke {
    /// classify typed or pasted text. whitespace-only input is not a keystroke.
    pub fn character(input: &str) -> Option<Keystroke> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Keystroke::Character(trimmed.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Keystroke::Character(_) => "character",
            Keystroke::Backspace => "backspace",
            Keystroke::Enter => "enter",
            Keystroke::Modifier(_) => "modifier",
        }
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keystroke::Character(s) => f.write_str(s),
            Keystroke::Backspace => f.write_str("Backspace"),
            Keystroke::Enter => f.write_str("Enter"),
            Keystroke::Modifier(m) => f.write_str(m.name()),
        }
    }
}

/// the code of the first character, as the diagram reports it
pub fn ascii_code(text: &str) -> Option<u32> {
    text.chars().next().map(u32::from)
}

/// `code` in base 2, zero-padded to eight digits. `None` when the policy
/// refuses codes wider than a byte.
pub fn binary_digits(code: u32, width: BinaryWidth) -> Option<String> {
    match width {
        BinaryWidth::Widen => Some(format!("{:08b}", code)),
        BinaryWidth::Truncate => Some(format!("{:08b}", code & 0xff)),
        BinaryWidth::Reject if code > 0xff => None,
        BinaryWidth::Reject => Some(format!("{:08b}", code)),
    }
}

/// one beat of a journey
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// move the packet
    Move(Anchor),
    Step {
        heading: String,
        explanation: &'static str,
    },
    /// fill in the ascii readout
    Ascii(u32),
    /// fill in the binary readout
    Binary(String),
    CpuCycle,
    /// closing text, not typed
    Final {
        title: &'static str,
        explanation: &'static str,
    },
}

fn step(heading: impl Into<String>, explanation: &'static str) -> Cue {
    Cue::Step {
        heading: heading.into(),
        explanation,
    }
}

/// the script for `key`, or `None` if the binary policy turns it away
pub fn script(key: &Keystroke, width: BinaryWidth) -> Option<Vec<Cue>> {
    let cues = match key {
        Keystroke::Character(text) => {
            let code = ascii_code(text)?;
            let binary = binary_digits(code, width)?;
            vec![
                Cue::Move(Anchor::Keyboard),
                step(
                    format!("Key Pressed : {}", text),
                    "The keyboard sends an electrical signal representing the pressed key to the motherboard through the keyboard controller.",
                ),
                Cue::Move(Anchor::Ram),
                step(
                    "Stored in RAM",
                    "RAM temporarily stores the incoming data so the processor can access it instantly while processing.",
                ),
                Cue::Ascii(code),
                step(
                    format!("ASCII : {}", code),
                    "Each character is converted into a unique ASCII number so the computer can identify the symbol.",
                ),
                Cue::Binary(binary.clone()),
                step(
                    format!("Binary : {}", binary),
                    "The ASCII number is translated into binary because digital circuits work using ON (1) and OFF (0) electrical states.",
                ),
                Cue::Move(Anchor::Cpu),
                step(
                    "CPU Processing",
                    "The CPU fetches the instruction, decodes its meaning, and executes the required operation.",
                ),
                Cue::CpuCycle,
                Cue::Move(Anchor::Screen),
                step(
                    format!("Displayed : {}", text),
                    "The graphics hardware activates specific pixels to visually draw the character on the monitor.",
                ),
            ]
        }
        Keystroke::Backspace => vec![
            Cue::Move(Anchor::Keyboard),
            step(
                "Backspace Pressed",
                "Instead of sending a character, the keyboard sends a delete instruction signal.",
            ),
            Cue::Move(Anchor::Cpu),
            step(
                "Memory Updated",
                "The processor removes the previously stored character from memory.",
            ),
            Cue::Move(Anchor::Screen),
            step(
                "Display Refreshed",
                "The screen redraws without that character.",
            ),
            Cue::Final {
                title: "Character Deleted",
                explanation: "The system erased the character and refreshed the output buffer.",
            },
        ],
        Keystroke::Enter => vec![
            Cue::Move(Anchor::Keyboard),
            step(
                "Enter Key",
                "The keyboard sends a command instruction rather than a symbol.",
            ),
            Cue::Move(Anchor::Cpu),
            step(
                "Processing Command",
                "The CPU interprets it as moving the cursor to the next line.",
            ),
            Cue::Move(Anchor::Screen),
            step(
                "Cursor Moved",
                "The display shifts typing position to a new line.",
            ),
            Cue::Final {
                title: "New Line Created",
                explanation: "The system prepared a fresh line for upcoming characters.",
            },
        ],
        Keystroke::Modifier(m) => vec![
            Cue::Move(Anchor::Keyboard),
            step(
                format!("{} Key", m.name()),
                "Modifier keys do not produce characters independently.",
            ),
            Cue::Move(Anchor::Cpu),
            step(
                "Waiting for Combination",
                "They change the behavior of another key when pressed together.",
            ),
            Cue::Final {
                title: "Modifier Active",
                explanation: "No output appears until another key is pressed along with it.",
            },
        ],
    };
    Some(cues)
}

/// play `cues` from the top
pub async fn play(seq: &Sequencer, cues: &[Cue]) -> Result<(), Halt> {
    seq.checkpoint()?;
    seq.stage().borrow_mut().begin_journey();

    for cue in cues {
        match cue {
            Cue::Move(anchor) => seq.move_to(*anchor),
            Cue::Step {
                heading,
                explanation,
            } => seq.step(heading, explanation).await?,
            Cue::Ascii(code) => seq.stage().borrow_mut().set_ascii(*code),
            Cue::Binary(digits) => seq.stage().borrow_mut().set_binary(digits),
            Cue::CpuCycle => seq.cpu_cycle().await?,
            Cue::Final { title, explanation } => seq.finish(title, explanation),
        }
    }
    Ok(())
}

/// play a journey to the end and hand the stage back to idle. a cancelled
/// journey has been superseded by a reset and leaves the run state alone.
pub async fn run(seq: Sequencer, key: Keystroke, cues: Vec<Cue>) {
    info!(%key, "journey started");
    match play(&seq, &cues).await {
        Ok(()) => {
            seq.stage().borrow_mut().set_running(false);
            info!(%key, "journey finished");
        }
        Err(Halt::Cancelled) => debug!(%key, "journey cancelled"),
        Err(e @ Halt::Busy(_)) => {
            seq.stage().borrow_mut().set_running(false);
            warn!(%key, error = %e, "journey abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Mode};
    use crate::geometry::Rect;
    use crate::stage::{PacketPos, Scene, SharedStage, Stage, Target};
    use crate::timing::wait;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tokio_util::sync::CancellationToken;

    fn headings(cues: &[Cue]) -> Vec<&str> {
        cues.iter()
            .filter_map(|c| match c {
                Cue::Step { heading, .. } => Some(heading.as_str()),
                _ => None,
            })
            .collect()
    }

    fn moves(cues: &[Cue]) -> Vec<Anchor> {
        cues.iter()
            .filter_map(|c| match c {
                Cue::Move(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    fn running_stage(mode: Mode) -> SharedStage {
        let config = Config::default();
        let mut stage = Stage::new(&config);
        stage.set_container(Some(Rect::new(0.0, 0.0, 960.0, 400.0)));
        stage.set_mode(mode);
        stage.switch_scene(Scene::Input);
        stage.set_running(true);
        Rc::new(RefCell::new(stage))
    }

    #[test]
    fn test_classify_character() {
        assert_eq!(
            Keystroke::character("A"),
            Some(Keystroke::Character("A".into()))
        );
        assert_eq!(
            Keystroke::character("  hi \n"),
            Some(Keystroke::Character("hi".into()))
        );
        assert_eq!(Keystroke::character(" "), None);
        assert_eq!(Keystroke::character(""), None);
    }

    #[test]
    fn test_ascii_and_binary() {
        assert_eq!(ascii_code("A"), Some(65));
        assert_eq!(ascii_code("ab"), Some(97));
        assert_eq!(ascii_code(""), None);
        assert_eq!(binary_digits(65, BinaryWidth::Widen).unwrap(), "01000001");
        assert_eq!(binary_digits(0, BinaryWidth::Widen).unwrap(), "00000000");
        assert_eq!(binary_digits(0x20ac, BinaryWidth::Widen).unwrap(), "10000010101100");
        assert_eq!(binary_digits(0x20ac, BinaryWidth::Truncate).unwrap(), "10101100");
        assert_eq!(binary_digits(0x20ac, BinaryWidth::Reject), None);
        assert_eq!(binary_digits(0xff, BinaryWidth::Reject).unwrap(), "11111111");
    }

    proptest! {
        #[test]
        fn prop_binary_width(c in any::<char>()) {
            let code = u32::from(c);
            let digits = binary_digits(code, BinaryWidth::Widen).unwrap();
            let bits = (32 - code.leading_zeros()) as usize;
            prop_assert_eq!(digits.len(), bits.max(8));
            prop_assert_eq!(u32::from_str_radix(&digits, 2).unwrap(), code);
            prop_assert_eq!(binary_digits(code, BinaryWidth::Truncate).unwrap().len(), 8);
        }
    }

    #[test]
    fn test_character_script() {
        let cues = script(&Keystroke::Character("A".into()), BinaryWidth::Widen).unwrap();
        assert_eq!(
            headings(&cues),
            [
                "Key Pressed : A",
                "Stored in RAM",
                "ASCII : 65",
                "Binary : 01000001",
                "CPU Processing",
                "Displayed : A"
            ]
        );
        assert_eq!(
            moves(&cues),
            [Anchor::Keyboard, Anchor::Ram, Anchor::Cpu, Anchor::Screen]
        );
        // the cpu cycle follows the cpu step
        let cpu = cues
            .iter()
            .position(|c| *c == Cue::CpuCycle)
            .unwrap();
        assert!(matches!(&cues[cpu - 1], Cue::Step { heading, .. } if heading == "CPU Processing"));
    }

    #[test]
    fn test_backspace_script() {
        let cues = script(&Keystroke::Backspace, BinaryWidth::Widen).unwrap();
        assert_eq!(
            headings(&cues),
            ["Backspace Pressed", "Memory Updated", "Display Refreshed"]
        );
        assert_eq!(moves(&cues), [Anchor::Keyboard, Anchor::Cpu, Anchor::Screen]);
        assert!(matches!(
            cues.last(),
            Some(Cue::Final {
                title: "Character Deleted",
                ..
            })
        ));
    }

    #[test]
    fn test_enter_script() {
        let cues = script(&Keystroke::Enter, BinaryWidth::Widen).unwrap();
        assert_eq!(
            headings(&cues),
            ["Enter Key", "Processing Command", "Cursor Moved"]
        );
        assert!(matches!(
            cues.last(),
            Some(Cue::Final {
                title: "New Line Created",
                ..
            })
        ));
    }

    #[test]
    fn test_modifier_script() {
        let cues = script(&Keystroke::Modifier(Modifier::Alt), BinaryWidth::Widen).unwrap();
        assert_eq!(headings(&cues), ["Alt Key", "Waiting for Combination"]);
        assert_eq!(moves(&cues), [Anchor::Keyboard, Anchor::Cpu]);
        assert!(matches!(
            cues.last(),
            Some(Cue::Final {
                title: "Modifier Active",
                ..
            })
        ));
    }

    #[test]
    fn test_reject_policy_turns_away_wide_characters() {
        assert!(script(&Keystroke::Character("€".into()), BinaryWidth::Reject).is_none());
        assert!(script(&Keystroke::Character("é".into()), BinaryWidth::Reject).is_some());
        // other journeys carry no binary
        assert!(script(&Keystroke::Enter, BinaryWidth::Reject).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_character_journey_end_to_end() {
        let stage = running_stage(Mode::Fast);
        let key = Keystroke::Character("A".into());
        let cues = script(&key, BinaryWidth::Widen).unwrap();
        let seq = Sequencer::new(stage.clone(), CancellationToken::new(), Config::default().pacing);
        run(seq, key, cues).await;

        let s = stage.borrow();
        assert!(!s.running());
        assert_eq!(s.run_state().step_count, 6);
        assert_eq!(s.progress(), 96);
        assert_eq!(s.text(Target::Heading), "Displayed : A");
        assert_eq!(s.ascii(), "ASCII: 65");
        assert_eq!(s.binary(), "Binary: 01000001");
        assert_eq!(s.cpu(), None);
        let screen = s.anchor_rect(Anchor::Screen).unwrap().centre();
        assert_eq!(s.packet_rect().unwrap().centre(), screen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backspace_journey_ends_on_final_text() {
        let stage = running_stage(Mode::Fast);
        let cues = script(&Keystroke::Backspace, BinaryWidth::Widen).unwrap();
        let seq = Sequencer::new(stage.clone(), CancellationToken::new(), Config::default().pacing);
        run(seq, Keystroke::Backspace, cues).await;

        let s = stage.borrow();
        assert!(!s.running());
        assert_eq!(s.progress(), 48);
        assert_eq!(s.text(Target::Heading), "Character Deleted");
        assert_eq!(
            s.text(Target::Explanation),
            "The system erased the character and refreshed the output buffer."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_journey_resets_progress_at_entry() {
        let stage = running_stage(Mode::Fast);
        {
            let mut s = stage.borrow_mut();
            s.advance_step();
            s.advance_step();
        }
        let key = Keystroke::Modifier(Modifier::Shift);
        let cues = script(&key, BinaryWidth::Widen).unwrap();
        let seq = Sequencer::new(stage.clone(), CancellationToken::new(), Config::default().pacing);
        let watch = async {
            wait(1).await;
            stage.borrow().progress()
        };
        let (_, early) = tokio::join!(run(seq, key, cues), watch);
        assert_eq!(early, 16);
        assert_eq!(stage.borrow().progress(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_journey_leaves_stage_alone() {
        let stage = running_stage(Mode::Normal);
        let cancel = CancellationToken::new();
        let key = Keystroke::Enter;
        let cues = script(&key, BinaryWidth::Widen).unwrap();
        let seq = Sequencer::new(stage.clone(), cancel.clone(), Config::default().pacing);
        let reset = async {
            wait(1_000).await;
            cancel.cancel();
            let mut s = stage.borrow_mut();
            s.reset();
            // a new journey took over straight away
            s.set_running(true);
        };
        tokio::join!(run(seq, key, cues), reset);

        let s = stage.borrow();
        assert!(s.running());
        assert_eq!(s.text(Target::Heading), crate::stage::IDLE_HEADING);
        assert_eq!(s.packet(), PacketPos::Centred);
    }

    #[tokio::test(start_paused = true)]
    async fn test_journey_without_container_still_narrates() {
        let stage = running_stage(Mode::Fast);
        stage.borrow_mut().set_container(None);
        let cues = script(&Keystroke::Enter, BinaryWidth::Widen).unwrap();
        let seq = Sequencer::new(stage.clone(), CancellationToken::new(), Config::default().pacing);
        run(seq, Keystroke::Enter, cues).await;

        let s = stage.borrow();
        assert!(!s.running());
        assert_eq!(s.text(Target::Heading), "New Line Created");
        assert_eq!(s.packet(), PacketPos::Centred);
    }
}
