use std::io;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use tui::backend::{Backend, CrosstermBackend};
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect as Area};
use tui::style::{Color, Modifier, Style};
use tui::symbols::Marker;
use tui::text::{Span, Spans};
use tui::widgets::canvas::{Canvas, Line, Rectangle};
use tui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use tui::{Frame, Terminal};

use crate::controller::Action;
use crate::geometry::Rect;
use crate::stage::{Anchor, Scene, Stage, Target, CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// Display draws the stage. It should abstract the implementation details,
/// so the controller and journeys never know what kind of screen it is.
pub trait Display {
    /// draw the stage as it is now, and tell it how big the diagram is
    fn draw(&mut self, stage: &mut Stage) -> Result<(), io::Error>;

    /// which on-screen button, if any, is under a terminal cell
    fn button_at(&mut self, scene: Scene, column: u16, row: u16)
        -> Result<Option<Button>, io::Error>;
}

/// clickable things
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Start,
    Restart,
    Home,
}

impl Button {
    pub fn action(self) -> Action {
        match self {
            Button::Start => Action::Start,
            Button::Restart => Action::Restart,
            Button::Home => Action::Home,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Button::Start => " Start [Enter] ",
            Button::Restart => " Restart [F5] ",
            Button::Home => " Home [Esc] ",
        }
    }
}

// canvas bounds for a container. y is flipped: the stage grows downward, the
// canvas grows upward
fn x_bounds(c: Rect) -> [f64; 2] {
    [0.0, c.width]
}

fn y_bounds(c: Rect) -> [f64; 2] {
    [-c.height, 0.0]
}

/// the stage-pixel container for a diagram drawn in `inner` cells. nothing
/// to lay out in a zero-sized area.
pub fn container_for(inner: Area) -> Option<Rect> {
    if inner.width == 0 || inner.height == 0 {
        return None;
    }
    Some(Rect::new(
        0.0,
        0.0,
        inner.width as f64 * CELL_WIDTH_PX,
        inner.height as f64 * CELL_HEIGHT_PX,
    ))
}

struct InputLayout {
    header: Area,
    diagram: Area,
    readouts: Vec<Area>,
    progress: Area,
    heading: Area,
    explanation: Area,
    prompt: Area,
    restart: Area,
    home: Area,
}

fn input_layout(area: Area) -> InputLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let readouts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(rows[2]);
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Min(10),
                Constraint::Length(Button::Restart.label().len() as u16 + 2),
                Constraint::Length(Button::Home.label().len() as u16 + 2),
            ]
            .as_ref(),
        )
        .split(rows[6]);
    InputLayout {
        header: rows[0],
        diagram: rows[1],
        readouts,
        progress: rows[3],
        heading: rows[4],
        explanation: rows[5],
        prompt: footer[0],
        restart: footer[1],
        home: footer[2],
    }
}

struct IntroLayout {
    title: Area,
    subtitle: Area,
    mode: Area,
    start: Area,
    help: Area,
}

fn intro_layout(area: Area) -> IntroLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);
    IntroLayout {
        title: rows[1],
        subtitle: rows[2],
        mode: rows[3],
        start: centred(Button::Start.label().len() as u16 + 2, rows[4]),
        help: rows[5],
    }
}

// a `width`-wide slice from the middle of `area`
fn centred(width: u16, area: Area) -> Area {
    let width = width.min(area.width);
    Area::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

fn hit(area: Area, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// which button sits at a cell, for a screen of size `area`
pub fn button_at(area: Area, scene: Scene, column: u16, row: u16) -> Option<Button> {
    match scene {
        Scene::Boot => None,
        Scene::Intro => hit(intro_layout(area).start, column, row).then_some(Button::Start),
        Scene::Input => {
            let l = input_layout(area);
            if hit(l.restart, column, row) {
                Some(Button::Restart)
            } else if hit(l.home, column, row) {
                Some(Button::Home)
            } else {
                None
            }
        }
    }
}

fn diagram_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(" keyboard → RAM → CPU → screen ")
}

fn button(b: Button) -> Paragraph<'static> {
    Paragraph::new(b.label())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL))
}

fn render<B: Backend>(f: &mut Frame<B>, stage: &Stage) {
    match stage.scene() {
        Scene::Boot => render_boot(f, stage),
        Scene::Intro => render_intro(f, stage),
        Scene::Input => render_input(f, stage),
    }
}

fn render_boot<B: Backend>(f: &mut Frame<B>, stage: &Stage) {
    let log = Paragraph::new(stage.text(Target::BootLog))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title(" BOOT "));
    f.render_widget(log, f.size());
}

fn render_intro<B: Backend>(f: &mut Frame<B>, stage: &Stage) {
    let l = intro_layout(f.size());
    let title = Paragraph::new(stage.text(Target::Title))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(title, l.title);

    let subtitle = Paragraph::new("follow one key from your fingertip to the pixels")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(subtitle, l.subtitle);

    let mode = Paragraph::new(Spans::from(vec![
        Span::raw("Mode: ◀ "),
        Span::styled(
            stage.mode().label(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ▶"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(mode, l.mode);

    f.render_widget(button(Button::Start), l.start);

    let help = Paragraph::new("Tab/←/→ change mode · Ctrl+C quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, l.help);
}

fn render_input<B: Backend>(f: &mut Frame<B>, stage: &Stage) {
    let l = input_layout(f.size());

    let status = if stage.running() { "running" } else { "idle" };
    let header = Paragraph::new(format!(
        " mode: {} · {} · step {}",
        stage.mode(),
        status,
        stage.run_state().step_count
    ))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(header, l.header);

    render_diagram(f, stage, l.diagram);

    let readout = |text: String| {
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    };
    f.render_widget(readout(stage.ascii().to_string()), l.readouts[0]);
    f.render_widget(readout(stage.binary().to_string()), l.readouts[1]);
    f.render_widget(
        readout(stage.cpu().unwrap_or("").to_string())
            .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        l.readouts[2],
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(stage.progress().min(100) as u16);
    f.render_widget(gauge, l.progress);

    let heading = Paragraph::new(stage.text(Target::Heading))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(heading, l.heading);

    let explanation = Paragraph::new(stage.text(Target::Explanation))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(explanation, l.explanation);

    let cursor = if stage.focused() && !stage.running() {
        "_"
    } else {
        ""
    };
    let prompt = Paragraph::new(format!("> {}{}", stage.input(), cursor))
        .block(Block::default().borders(Borders::ALL).title(" type a key "));
    f.render_widget(prompt, l.prompt);
    f.render_widget(button(Button::Restart), l.restart);
    f.render_widget(button(Button::Home), l.home);
}

fn render_diagram<B: Backend>(f: &mut Frame<B>, stage: &Stage, area: Area) {
    let block = diagram_block();
    let Some(c) = stage.container() else {
        f.render_widget(block, area);
        return;
    };
    let packet = stage.packet_rect();
    let wires = stage.wires();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds(c))
        .y_bounds(y_bounds(c))
        .paint(|ctx| {
            for anchor in Anchor::ALL {
                let r = anchor.rect_in(c);
                ctx.draw(&Rectangle {
                    x: r.x,
                    y: -(r.y + r.height),
                    width: r.width,
                    height: r.height,
                    color: Color::Cyan,
                });
                let label = anchor.label();
                ctx.print(
                    r.centre().x - label.len() as f64 * CELL_WIDTH_PX / 2.0,
                    -r.centre().y,
                    Span::styled(label, Style::default().fg(Color::White)),
                );
            }
            ctx.layer();
            for w in wires {
                let end = w.segment.end();
                ctx.draw(&Line {
                    x1: w.segment.start.x,
                    y1: -w.segment.start.y,
                    x2: end.x,
                    y2: -end.y,
                    color: Color::Yellow,
                });
            }
            if let Some(p) = packet {
                let centre = p.centre();
                ctx.print(
                    centre.x,
                    -centre.y,
                    Span::styled("◆", Style::default().fg(Color::Yellow)),
                );
            }
        });
    f.render_widget(canvas, area);
}

/// the stage, drawn with TUI into a terminal backend
pub struct TermDisplay<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TermDisplay<B> {
    pub fn with_backend(backend: B) -> Result<TermDisplay<B>, io::Error> {
        Ok(TermDisplay {
            terminal: Terminal::new(backend)?,
        })
    }

    #[cfg(test)]
    fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl TermDisplay<CrosstermBackend<io::Stdout>> {
    /// draw on stdout
    pub fn stdout() -> Result<Self, io::Error> {
        TermDisplay::with_backend(CrosstermBackend::new(io::stdout()))
    }
}

impl<B: Backend> Display for TermDisplay<B> {
    fn draw(&mut self, stage: &mut Stage) -> Result<(), io::Error> {
        let area = self.terminal.size()?;
        let inner = diagram_block().inner(input_layout(area).diagram);
        stage.set_container(container_for(inner));

        let stage: &Stage = stage;
        self.terminal.draw(|f| render(f, stage))?;
        Ok(())
    }

    fn button_at(
        &mut self,
        scene: Scene,
        column: u16,
        row: u16,
    ) -> Result<Option<Button>, io::Error> {
        Ok(button_at(self.terminal.size()?, scene, column, row))
    }
}

/// switches the terminal to its alternate screen until dropped
pub struct AlternateScreen;

impl AlternateScreen {
    pub fn enter() -> Result<AlternateScreen, io::Error> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(AlternateScreen)
    }
}

impl Drop for AlternateScreen {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// useful for testing non-display routines: lays out a fixed-size screen
/// and draws nothing
pub struct DummyDisplay {
    area: Area,
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new(width: u16, height: u16) -> DummyDisplay {
        DummyDisplay {
            area: Area::new(0, 0, width, height),
            frames: 0,
        }
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, stage: &mut Stage) -> Result<(), io::Error> {
        let inner = diagram_block().inner(input_layout(self.area).diagram);
        stage.set_container(container_for(inner));
        self.frames += 1;
        Ok(())
    }

    fn button_at(
        &mut self,
        scene: Scene,
        column: u16,
        row: u16,
    ) -> Result<Option<Button>, io::Error> {
        Ok(button_at(self.area, scene, column, row))
    }
}
