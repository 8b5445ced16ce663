//! Keystroke journey: an animated walk of one key press through a toy
//! computer, in the terminal.
//!
//! ## Design
//!
//! * one key, one journey: keyboard -> RAM -> CPU -> screen, with a heading
//!   and an explanation typed out at every stop
//! * a journey is a script of cues (data), played by a sequencer that owns
//!   the pauses; nothing else sleeps
//! * everything runs on one thread: a `LocalSet` for the journey, the title
//!   and the boot log, and a frame loop that draws whatever the stage holds
//! * abstract display and input so can plug alternatives; starting with TUI
//!   in-console and crossterm events
//! * restart/home cancel whatever is in flight at its next pause, and never
//!   wait for it
//!
//! Model
//!
//! app
//!  |-- stage (shared, Rc<RefCell<_>>): scene, mode, run state, texts,
//!  |    readouts, packet position, connectors, container size
//!  |-- controller(stage, config)
//!  |    |-- boot -> title
//!  |    `-- journey(sequencer(stage, cancel token))
//!  |         |-- packet/wire: move and draw a connector
//!  |         `-- typewriter: reveal text, one owner per target
//!  `-- main loop
//!       |-- action in (from the input thread) -> controller.handle()
//!       `-- frame tick -> prune connectors; display.draw(stage)
pub mod app;
pub mod boot;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod geometry;
pub mod input;
pub mod journey;
pub mod packet;
pub mod sequencer;
pub mod stage;
pub mod timing;
pub mod typewriter;
pub mod wire;
