//! Boot log shown once at startup, before the intro.

use tracing::info;

use crate::config::Pacing;
use crate::stage::{Scene, SharedStage, Target};
use crate::timing::wait;

/// print the boot lines one at a time, then switch to the intro scene.
/// not cancellable: it always runs to the end.
pub async fn run(stage: &SharedStage, lines: &[String], pacing: &Pacing) {
    for line in lines {
        {
            let mut stage = stage.borrow_mut();
            stage.push_str(Target::BootLog, line);
            stage.push_char(Target::BootLog, '\n');
        }
        wait(pacing.boot_line_ms).await;
    }
    wait(pacing.boot_settle_ms).await;

    stage.borrow_mut().switch_scene(Scene::Intro);
    info!(lines = lines.len(), "boot complete");
}
