//! Typed-text reveal: writes a message into a target one character at a
//! time, lingering on punctuation the way a reader would.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::Halt;
use crate::stage::{SharedStage, Target, Ticket};
use crate::timing::pause;

/// extra delay after a character, on top of the base delay
pub fn punctuation_bonus(c: char) -> u64 {
    match c {
        ' ' => 35,
        ',' => 120,
        '.' => 220,
        ':' => 180,
        '\n' => 250,
        _ => 0,
    }
}

/// how long revealing `message` takes at `base_ms` per character
pub fn reveal_duration_ms(message: &str, base_ms: u64) -> u64 {
    message.chars().map(|c| base_ms + punctuation_bonus(c)).sum()
}

// holds a target's in-flight slot until dropped, including when the reveal
// future is dropped half way through
struct Claim {
    stage: SharedStage,
    target: Target,
    ticket: Ticket,
}

impl Drop for Claim {
    fn drop(&mut self) {
        if let Ok(mut stage) = self.stage.try_borrow_mut() {
            stage.release(self.target, self.ticket);
        }
    }
}

/// clear `target`, then type `message` into it. returns once the delay after
/// the last character has passed. a target that is already being revealed
/// is left untouched and the call fails with [`Halt::Busy`].
pub async fn reveal(
    stage: &SharedStage,
    target: Target,
    message: &str,
    base_ms: u64,
    cancel: &CancellationToken,
) -> Result<(), Halt> {
    let ticket = stage.borrow_mut().claim(target).map_err(|e| {
        warn!(%target, "overlapping reveal rejected");
        e
    })?;
    let _claim = Claim {
        stage: stage.clone(),
        target,
        ticket,
    };

    stage.borrow_mut().set_text(target, "");
    for c in message.chars() {
        stage.borrow_mut().push_char(target, c);
        pause(cancel, base_ms + punctuation_bonus(c)).await?;
    }
    Ok(())
}
