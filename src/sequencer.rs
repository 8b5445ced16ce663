//! Step sequencer: the unit of narrative pacing. Every journey is a run of
//! steps, each one bumping the progress bar, typing a heading and an
//! explanation, then holding still for the configured speed.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Pacing;
use crate::error::Halt;
use crate::packet;
use crate::stage::{Anchor, SharedStage, Target};
use crate::timing::pause;
use crate::typewriter::reveal;

/// the labels the cpu readout cycles through, in order
pub const CPU_PHASES: [&str; 4] = ["FETCH", "DECODE", "EXECUTE", "WRITE"];

/// drives one task's worth of stage updates. every suspension goes through
/// the task's cancellation token.
pub struct Sequencer {
    stage: SharedStage,
    cancel: CancellationToken,
    pacing: Pacing,
}

impl Sequencer {
    pub fn new(stage: SharedStage, cancel: CancellationToken, pacing: Pacing) -> Sequencer {
        Sequencer {
            stage,
            cancel,
            pacing,
        }
    }

    pub fn stage(&self) -> &SharedStage {
        &self.stage
    }

    /// fail fast if the task has already been superseded
    pub fn checkpoint(&self) -> Result<(), Halt> {
        if self.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        Ok(())
    }

    pub fn move_to(&self, anchor: Anchor) {
        packet::move_to(&mut self.stage.borrow_mut(), anchor);
    }

    /// one narrated step
    pub async fn step(&self, heading: &str, explanation: &str) -> Result<(), Halt> {
        let (count, speed_ms) = {
            let mut stage = self.stage.borrow_mut();
            let count = stage.advance_step();
            (count, stage.run_state().speed_ms)
        };
        debug!(step = count, heading, "step");

        reveal(
            &self.stage,
            Target::Heading,
            heading,
            self.pacing.heading_ms,
            &self.cancel,
        )
        .await?;
        reveal(
            &self.stage,
            Target::Explanation,
            explanation,
            self.pacing.explanation_ms,
            &self.cancel,
        )
        .await?;
        pause(&self.cancel, speed_ms).await
    }

    /// closing text, shown at once rather than typed
    pub fn finish(&self, title: &str, explanation: &str) {
        let mut stage = self.stage.borrow_mut();
        stage.set_text(Target::Heading, title);
        stage.set_text(Target::Explanation, explanation);
    }

    /// run the cpu readout through its four phases, then hide it
    pub async fn cpu_cycle(&self) -> Result<(), Halt> {
        for phase in CPU_PHASES {
            self.stage.borrow_mut().show_cpu(phase);
            pause(&self.cancel, self.pacing.cpu_phase_ms).await?;
        }
        self.stage.borrow_mut().hide_cpu();
        Ok(())
    }
}
