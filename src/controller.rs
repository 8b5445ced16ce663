//! Scene/input controller: owns the stage, routes actions to journeys and
//! scene changes, and keeps at most one journey in flight.
//!
//! ```text
//! Boot --(boot done)--> Intro --Start--> Input(idle) --key--> Input(running)
//!                         ^                  ^                     |
//!                         |                  `----(journey done)---'
//!                         `------Home------ any scene after boot
//!                                Restart -> Input
//! ```

use std::rc::Rc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::boot;
use crate::config::Config;
use crate::error::Halt;
use crate::journey::{self, Keystroke};
use crate::sequencer::Sequencer;
use crate::stage::{Scene, SharedStage, Target};
use crate::timing::pause;
use crate::typewriter::reveal;

pub const TITLE: &str = "The Journey of a Keystroke";

/// everything the user can ask for, however it was asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Key(Keystroke),
    Start,
    Restart,
    Home,
    NextMode,
    PrevMode,
    /// a pointer press at a terminal cell; the display decides what was hit
    Click { column: u16, row: u16 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller {
    stage: SharedStage,
    config: Rc<Config>,
    /// cancels the journey in flight, if any
    journey: Option<CancellationToken>,
    /// cancels the intro title animation, if any
    title: Option<CancellationToken>,
}

impl Controller {
    pub fn new(stage: SharedStage, config: Rc<Config>) -> Controller {
        Controller {
            stage,
            config,
            journey: None,
            title: None,
        }
    }

    /// start the boot log; the intro follows on its own. must be called
    /// from inside a `LocalSet`.
    pub fn boot(&mut self) {
        let stage = self.stage.clone();
        let config = self.config.clone();
        let cancel = CancellationToken::new();
        self.title = Some(cancel.clone());
        tokio::task::spawn_local(async move {
            boot::run(&stage, &config.boot_lines, &config.pacing).await;
            play_title(&stage, &config, &cancel).await;
        });
    }

    pub fn handle(&mut self, action: Action) -> Flow {
        if action == Action::Quit {
            info!("quit");
            return Flow::Quit;
        }

        let scene = self.stage.borrow().scene();
        match (scene, action) {
            (Scene::Boot, action) => debug!(?action, "ignored during boot"),
            (_, Action::Restart) => self.restart(),
            (_, Action::Home) => self.home(),
            (Scene::Intro, Action::Start) | (Scene::Intro, Action::Key(Keystroke::Enter)) => {
                self.start()
            }
            (Scene::Intro, Action::NextMode) => self.cycle_mode(true),
            (Scene::Intro, Action::PrevMode) => self.cycle_mode(false),
            (Scene::Input, Action::Key(key)) => self.keystroke(key),
            (scene, action) => debug!(?scene, ?action, "no handler"),
        }
        Flow::Continue
    }

    pub fn is_running(&self) -> bool {
        self.stage.borrow().running()
    }

    /// stop everything in flight, e.g. on the way out
    pub fn shutdown(&mut self) {
        self.cancel_tasks();
    }

    fn start(&mut self) {
        self.cancel_title();
        let mut stage = self.stage.borrow_mut();
        stage.switch_scene(Scene::Input);
        stage.set_focused(true);
        info!(mode = %stage.mode(), "started");
    }

    fn cycle_mode(&mut self, forward: bool) {
        let mut stage = self.stage.borrow_mut();
        let mode = if forward {
            stage.mode().next()
        } else {
            stage.mode().prev()
        };
        stage.set_mode(mode);
        debug!(%mode, "mode selected");
    }

    fn keystroke(&mut self, key: Keystroke) {
        if self.is_running() {
            debug!(%key, "journey in flight, keystroke dropped");
            return;
        }
        let Some(cues) = journey::script(&key, self.config.binary_width) else {
            debug!(%key, "binary width policy rejected keystroke");
            return;
        };

        {
            let mut stage = self.stage.borrow_mut();
            stage.set_running(true);
            stage.set_input(&key.to_string());
            stage.switch_scene(Scene::Input);
        }

        let cancel = CancellationToken::new();
        self.journey = Some(cancel.clone());
        let seq = Sequencer::new(self.stage.clone(), cancel, self.config.pacing);
        let span = info_span!("journey", kind = key.kind());
        tokio::task::spawn_local(journey::run(seq, key, cues).instrument(span));
    }

    fn restart(&mut self) {
        self.reset();
        let mut stage = self.stage.borrow_mut();
        stage.switch_scene(Scene::Input);
        stage.set_focused(true);
        info!("restart");
    }

    fn home(&mut self) {
        self.reset();
        self.stage.borrow_mut().switch_scene(Scene::Intro);
        info!("home");

        let stage = self.stage.clone();
        let config = self.config.clone();
        let cancel = CancellationToken::new();
        self.title = Some(cancel.clone());
        tokio::task::spawn_local(async move {
            play_title(&stage, &config, &cancel).await;
        });
    }

    fn reset(&mut self) {
        self.cancel_tasks();
        let mut stage = self.stage.borrow_mut();
        stage.reset();
        stage.set_focused(false);
    }

    fn cancel_tasks(&mut self) {
        if let Some(cancel) = self.journey.take() {
            cancel.cancel();
        }
        self.cancel_title();
    }

    fn cancel_title(&mut self) {
        if let Some(cancel) = self.title.take() {
            cancel.cancel();
        }
    }
}

/// the intro title's entry animation: a short beat, then type it out
async fn play_title(stage: &SharedStage, config: &Config, cancel: &CancellationToken) {
    let played = async {
        pause(cancel, config.pacing.title_delay_ms).await?;
        reveal(stage, Target::Title, TITLE, config.pacing.title_ms, cancel).await
    };
    match played.await {
        Ok(()) => {}
        Err(Halt::Cancelled) => {
            // leave the title readable for whatever comes next
            stage.borrow_mut().set_text(Target::Title, TITLE);
        }
        Err(e) => debug!(error = %e, "title animation skipped"),
    }
}
