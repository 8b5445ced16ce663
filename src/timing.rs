//! The only timing primitives. Everything paced (typing, step pauses, the cpu
//! cycle, boot lines) is built from sequential calls to these.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Halt;

/// suspend for at least `ms`. always resumes.
pub async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// suspend for at least `ms`, or until `cancel` fires, whichever is first.
/// a token that is already cancelled wins even if the timer is also ready.
pub async fn pause(cancel: &CancellationToken, ms: u64) -> Result<(), Halt> {
    if cancel.is_cancelled() {
        return Err(Halt::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Halt::Cancelled),
        _ = wait(ms) => Ok(()),
    }
}
