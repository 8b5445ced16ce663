//! The main loop: actions in, frames out.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::controller::{Action, Controller, Flow};
use crate::display::Display;
use crate::error::Error;
use crate::stage::Stage;

/// run until the user quits or the action channel closes. must be called
/// from inside a `LocalSet`.
pub async fn run<D: Display>(
    config: Config,
    display: &mut D,
    mut actions: UnboundedReceiver<Action>,
) -> Result<(), Error> {
    let frame = Duration::from_millis(config.pacing.frame_ms.max(1));
    let stage = Rc::new(RefCell::new(Stage::new(&config)));
    let mut controller = Controller::new(stage.clone(), Rc::new(config));

    // lay out once so the first journey has somewhere to go
    display.draw(&mut stage.borrow_mut())?;
    controller.boot();

    let mut ticks = interval(frame);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            action = actions.recv() => {
                let Some(action) = action else {
                    debug!("input closed");
                    break;
                };
                let action = match action {
                    Action::Click { column, row } => {
                        let scene = stage.borrow().scene();
                        match display.button_at(scene, column, row)? {
                            Some(button) => button.action(),
                            None => continue,
                        }
                    }
                    action => action,
                };
                if controller.handle(action) == Flow::Quit {
                    break;
                }
            }
            _ = ticks.tick() => {
                let mut stage = stage.borrow_mut();
                stage.prune_wires(Instant::now());
                display.draw(&mut stage)?;
            }
        }
    }

    controller.shutdown();
    actions.close();
    info!("bye");
    Ok(())
}
