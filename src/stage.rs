//! Everything that is on screen, plus the run state that gates journeys.
//!
//! There is exactly one `Stage`. The controller owns it and lends it to the
//! task in flight as a [`SharedStage`]; borrows never span a suspension point,
//! so every mutation happens inside one synchronous block.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{Config, Mode, Speeds};
use crate::error::Halt;
use crate::geometry::{Point, Rect, Segment};

pub type SharedStage = Rc<RefCell<Stage>>;

/// how big one terminal cell is in stage pixels
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub const PACKET_SIZE_PX: f64 = 16.0;
pub const ANCHOR_WIDTH_PX: f64 = 120.0;
pub const ANCHOR_HEIGHT_PX: f64 = 64.0;

pub const WIRE_LIFETIME: Duration = Duration::from_millis(900);

/// progress gained per step; journeys have at most six
pub const PROGRESS_PER_STEP: u32 = 16;

pub const IDLE_HEADING: &str = "Waiting for input...";
pub const BLANK_ASCII: &str = "ASCII: -";
pub const BLANK_BINARY: &str = "Binary: --------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Boot,
    Intro,
    /// the keyboard/ram/cpu/screen diagram, taking keystrokes
    Input,
}

/// the four fixed places the packet travels between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Keyboard,
    Ram,
    Cpu,
    Screen,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Keyboard, Anchor::Ram, Anchor::Cpu, Anchor::Screen];

    pub fn id(self) -> &'static str {
        match self {
            Anchor::Keyboard => "nodeKeyboard",
            Anchor::Ram => "nodeRAM",
            Anchor::Cpu => "nodeCPU",
            Anchor::Screen => "nodeScreen",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Anchor::Keyboard => "KEYBOARD",
            Anchor::Ram => "RAM",
            Anchor::Cpu => "CPU",
            Anchor::Screen => "SCREEN",
        }
    }

    // centre as a fraction of the container
    fn placement(self) -> (f64, f64) {
        match self {
            Anchor::Keyboard => (0.15, 0.72),
            Anchor::Ram => (0.38, 0.28),
            Anchor::Cpu => (0.62, 0.28),
            Anchor::Screen => (0.85, 0.72),
        }
    }

    /// where this anchor sits inside `container`, relative to the container
    pub fn rect_in(self, container: Rect) -> Rect {
        let (fx, fy) = self.placement();
        Rect::centred_on(
            Point::new(container.width * fx, container.height * fy),
            ANCHOR_WIDTH_PX,
            ANCHOR_HEIGHT_PX,
        )
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// text areas that are written a character at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Heading,
    Explanation,
    Title,
    BootLog,
}

impl Target {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Target::Heading => 0,
            Target::Explanation => 1,
            Target::Title => 2,
            Target::BootLog => 3,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Heading => "heading",
            Target::Explanation => "explanation",
            Target::Title => "title",
            Target::BootLog => "boot log",
        })
    }
}

/// where the packet is: the default centre of the container, or with its
/// top-left corner at an offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketPos {
    Centred,
    At(Point),
}

/// a connector on screen until `expires_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wire {
    pub segment: Segment,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub running: bool,
    pub step_count: u32,
    /// pause after each step, from the mode when the scene was last entered
    pub speed_ms: u64,
}

/// proof that a reveal owns a target; see [`Stage::claim`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Stage {
    scene: Scene,
    mode: Mode,
    speeds: Speeds,
    run: RunState,
    focused: bool,
    container: Option<Rect>,
    packet: PacketPos,
    wires: Vec<Wire>,
    texts: [String; Target::COUNT],
    reveals: [Option<Ticket>; Target::COUNT],
    next_ticket: u64,
    input: String,
    ascii: String,
    binary: String,
    cpu: String,
    cpu_visible: bool,
    progress: u32,
}

impl Stage {
    pub fn new(config: &Config) -> Stage {
        Stage {
            scene: Scene::Boot,
            mode: config.mode,
            speeds: config.speeds,
            run: RunState {
                running: false,
                step_count: 0,
                speed_ms: config.speed_ms(config.mode),
            },
            focused: false,
            container: None,
            packet: PacketPos::Centred,
            wires: Vec::new(),
            texts: [
                IDLE_HEADING.to_string(),
                String::new(),
                String::new(),
                String::new(),
            ],
            reveals: [None; Target::COUNT],
            next_ticket: 0,
            input: String::new(),
            ascii: BLANK_ASCII.to_string(),
            binary: BLANK_BINARY.to_string(),
            cpu: String::new(),
            cpu_visible: false,
            progress: 0,
        }
    }

    // scene & run state

    pub fn scene(&self) -> Scene {
        self.scene
    }

    /// show a scene. entering any scene re-reads the step pause from the mode.
    pub fn switch_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.run.speed_ms = self.speeds.for_mode(self.mode);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// change the selector; takes effect on the next scene switch
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn running(&self) -> bool {
        self.run.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.run.running = running;
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// zero the step counter and the progress bar
    pub fn begin_journey(&mut self) {
        self.run.step_count = 0;
        self.progress = 0;
    }

    /// count a step and grow the progress bar; returns the new step count
    pub fn advance_step(&mut self) -> u32 {
        self.run.step_count += 1;
        self.progress = (self.run.step_count * PROGRESS_PER_STEP).min(100);
        self.run.step_count
    }

    /// percent, 0..=100
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// back to a blank idle stage. the scene and mode are left alone.
    pub fn reset(&mut self) {
        self.run.running = false;
        self.run.step_count = 0;
        self.progress = 0;
        self.texts[Target::Heading.index()] = IDLE_HEADING.to_string();
        self.texts[Target::Explanation.index()].clear();
        self.packet = PacketPos::Centred;
        self.wires.clear();
        self.reveals = [None; Target::COUNT];
        self.input.clear();
        self.ascii = BLANK_ASCII.to_string();
        self.binary = BLANK_BINARY.to_string();
        self.cpu.clear();
        self.cpu_visible = false;
    }

    // geometry

    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    /// the display tells us how big the diagram currently is
    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
    }

    /// an anchor's box, worked out from the container as it is right now
    pub fn anchor_rect(&self, anchor: Anchor) -> Option<Rect> {
        self.container.map(|c| anchor.rect_in(c))
    }

    pub fn packet(&self) -> PacketPos {
        self.packet
    }

    pub fn packet_rect(&self) -> Option<Rect> {
        let c = self.container?;
        Some(match self.packet {
            PacketPos::Centred => Rect::centred_on(
                Point::new(c.width / 2.0, c.height / 2.0),
                PACKET_SIZE_PX,
                PACKET_SIZE_PX,
            ),
            PacketPos::At(p) => Rect::new(p.x, p.y, PACKET_SIZE_PX, PACKET_SIZE_PX),
        })
    }

    pub fn set_packet(&mut self, pos: PacketPos) {
        self.packet = pos;
    }

    /// put a connector on screen for [`WIRE_LIFETIME`]
    pub fn add_wire(&mut self, segment: Segment, now: Instant) {
        self.prune_wires(now);
        self.wires.push(Wire {
            segment,
            expires_at: now + WIRE_LIFETIME,
        });
    }

    /// drop connectors whose time is up
    pub fn prune_wires(&mut self, now: Instant) {
        self.wires.retain(|w| w.expires_at > now);
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    // text

    pub fn text(&self, target: Target) -> &str {
        &self.texts[target.index()]
    }

    pub fn set_text(&mut self, target: Target, text: &str) {
        let t = &mut self.texts[target.index()];
        t.clear();
        t.push_str(text);
    }

    pub fn push_char(&mut self, target: Target, c: char) {
        self.texts[target.index()].push(c);
    }

    pub fn push_str(&mut self, target: Target, s: &str) {
        self.texts[target.index()].push_str(s);
    }

    /// take the in-flight slot of `target`, or fail if a reveal holds it
    pub fn claim(&mut self, target: Target) -> Result<Ticket, Halt> {
        let slot = &mut self.reveals[target.index()];
        if slot.is_some() {
            return Err(Halt::Busy(target));
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        *slot = Some(ticket);
        Ok(ticket)
    }

    /// give the slot back, unless a reset already handed it to someone else
    pub fn release(&mut self, target: Target, ticket: Ticket) {
        let slot = &mut self.reveals[target.index()];
        if *slot == Some(ticket) {
            *slot = None;
        }
    }

    pub fn is_revealing(&self, target: Target) -> bool {
        self.reveals[target.index()].is_some()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
    }

    // readouts

    pub fn ascii(&self) -> &str {
        &self.ascii
    }

    pub fn set_ascii(&mut self, code: u32) {
        self.ascii = format!("ASCII: {}", code);
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn set_binary(&mut self, digits: &str) {
        self.binary = format!("Binary: {}", digits);
    }

    /// the cpu readout, if it is showing
    pub fn cpu(&self) -> Option<&str> {
        self.cpu_visible.then_some(self.cpu.as_str())
    }

    pub fn show_cpu(&mut self, label: &str) {
        self.cpu_visible = true;
        self.cpu.clear();
        self.cpu.push_str(label);
    }

    pub fn hide_cpu(&mut self) {
        self.cpu.clear();
        self.cpu_visible = false;
    }
}
