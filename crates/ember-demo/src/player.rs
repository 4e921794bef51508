//! The host loop: a [`Stage`], a [`GateSequence`] and a [`Canvas`].
//!
//! `Player` owns no terminal. [`run_terminal`] feeds it wall-clock deltas
//! and key events; [`run_headless`] feeds it fixed frames, which is what the
//! tests and `play --headless` use.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ember_core::clock::FrameClock;
use ember_core::geometry::BoxF;
use ember_gate::stage::GateLayout;
use ember_gate::{GateConfig, GateSequence, GateState, MountOutcome, Stage, UnlockInput};
use tracing::{debug, info};

use crate::canvas::{Canvas, Tone};
use crate::error::{DemoError, Result};
use crate::terminal::TerminalGuard;

pub const MIN_COLS: u16 = 24;
pub const MIN_ROWS: u16 = 8;
/// Fixed step for headless runs and the input poll budget.
pub const FRAME: Duration = Duration::from_millis(16);
/// Ember sprites in the emitter: one lead plus a trail.
const EMBERS: usize = 3;
/// How long the finished frame stays up before a replay or exit.
const LINGER: Duration = Duration::from_millis(1500);

/// What the player does around the cinematic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Play once, or forever with `repeat`.
    Play { repeat: bool },
    /// Ask for the phrase first; a match starts the cinematic.
    Unlock { phrase: String },
}

/// What the host loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    TogglePause,
    Quit,
}

pub struct Player {
    config: GateConfig,
    mode: Mode,
    stage: Stage,
    layout: GateLayout,
    gate: GateSequence,
    canvas: Canvas,
    completed: Rc<Cell<bool>>,
    unlock: Option<UnlockInput>,
    unlocked: Rc<Cell<bool>>,
    linger: Option<Duration>,
    finished: bool,
}

impl Player {
    /// Build a player for a `cols × rows` terminal. The bottom row is the
    /// status line.
    pub fn new(config: GateConfig, mode: Mode, cols: u16, rows: u16) -> Result<Self> {
        if cols < MIN_COLS || rows < MIN_ROWS {
            return Err(DemoError::TerminalTooSmall {
                cols,
                rows,
                min_cols: MIN_COLS,
                min_rows: MIN_ROWS,
            });
        }
        let (stage, layout, gate, completed) = build_scene(&config, cols, rows)?;
        let unlocked = Rc::new(Cell::new(false));
        let unlock = match &mode {
            Mode::Unlock { phrase } => {
                let flag = Rc::clone(&unlocked);
                Some(UnlockInput::new(phrase.clone()).on_unlock(move || flag.set(true)))
            }
            Mode::Play { .. } => None,
        };
        Ok(Self {
            config,
            mode,
            stage,
            layout,
            gate,
            canvas: Canvas::new(cols, rows),
            completed,
            unlock,
            unlocked,
            linger: None,
            finished: false,
        })
    }

    /// Mount the gate, unless the unlock prompt is still waiting.
    pub fn start(&mut self) -> Result<()> {
        if self.unlock.as_ref().is_some_and(|u| !u.is_unlocked()) {
            return Ok(());
        }
        self.mount()
    }

    fn mount(&mut self) -> Result<()> {
        match self.gate.mount(&mut self.stage) {
            MountOutcome::Started | MountOutcome::AlreadyActive => Ok(()),
            outcome => Err(DemoError::NotStarted(format!("{outcome:?}"))),
        }
    }

    /// Rebuild the scene for a new terminal size and start over.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        let was_active = self.gate.is_active();
        self.gate.unmount(&mut self.stage);
        let (stage, layout, gate, completed) = build_scene(&self.config, cols, rows)?;
        self.stage = stage;
        self.layout = layout;
        self.gate = gate;
        self.completed = completed;
        self.canvas = Canvas::new(cols, rows);
        self.linger = None;
        debug!(cols, rows, "scene rebuilt");
        if was_active {
            self.mount()
        } else {
            Ok(())
        }
    }

    /// Tear down and play again from the first phase.
    pub fn replay(&mut self) -> Result<()> {
        self.gate.unmount(&mut self.stage);
        self.completed.set(false);
        self.linger = None;
        info!("replay");
        self.mount()
    }

    /// Advance the stage, then the gate, by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Result<()> {
        self.stage.advance(dt);
        self.gate.advance(dt, &mut self.stage);

        if !self.completed.get() {
            return Ok(());
        }
        let waited = self.linger.map_or(Duration::ZERO, |w| w.saturating_add(dt));
        if waited < LINGER {
            self.linger = Some(waited);
            return Ok(());
        }
        match self.mode {
            Mode::Play { repeat: true } => self.replay(),
            _ => {
                self.finished = true;
                Ok(())
            }
        }
    }

    /// Route a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Control> {
        if key.kind != KeyEventKind::Press {
            return Ok(Control::Continue);
        }
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Ok(Control::Quit);
        }
        if let Some(input) = self.unlock.as_mut().filter(|u| !u.is_unlocked()) {
            match key.code {
                KeyCode::Char(c) => {
                    input.push(c);
                }
                KeyCode::Backspace => input.backspace(),
                _ => {}
            }
            if self.unlocked.get() {
                self.mount()?;
            }
            return Ok(Control::Continue);
        }
        match key.code {
            KeyCode::Char('q') => Ok(Control::Quit),
            KeyCode::Char(' ') => Ok(Control::TogglePause),
            KeyCode::Char('r') => {
                self.replay()?;
                Ok(Control::Continue)
            }
            _ => Ok(Control::Continue),
        }
    }

    /// Paint the stage and the status line.
    pub fn paint(&mut self) -> &Canvas {
        self.canvas.paint(&self.stage);
        let (cols, rows) = self.canvas.size();
        let status_row = rows.saturating_sub(1);
        match self.unlock.as_ref().filter(|u| !u.is_unlocked()) {
            Some(input) => {
                let prompt = format!("speak the phrase › {}", input.value());
                let col = cols.saturating_sub(prompt.chars().count() as u16) / 2;
                self.canvas.label(rows / 2, col, &prompt, Tone::Text);
                self.canvas.label(status_row, 1, "esc quit", Tone::Dim);
            }
            None => {
                let status = format!(
                    "{}  ·  space pause  r replay  q quit",
                    state_label(self.gate.state())
                );
                self.canvas.label(status_row, 1, &status, Tone::Dim);
            }
        }
        &self.canvas
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn gate(&self) -> &GateSequence {
        &self.gate
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn layout(&self) -> &GateLayout {
        &self.layout
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock.as_ref().is_none_or(UnlockInput::is_unlocked)
    }

    /// The cinematic completed and nothing else will be shown.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn build_scene(
    config: &GateConfig,
    cols: u16,
    rows: u16,
) -> Result<(Stage, GateLayout, GateSequence, Rc<Cell<bool>>)> {
    let mut stage = Stage::default();
    let cell = stage.cell();
    let panel = BoxF::new(
        0.0,
        0.0,
        f64::from(cols) * cell.width,
        f64::from(rows.saturating_sub(1)) * cell.height,
    );
    let layout = stage
        .gate_layout(panel, EMBERS)
        .ok_or_else(|| DemoError::NotStarted("could not lay out the panel".to_string()))?;
    let completed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&completed);
    let mut gate = GateSequence::new(config.clone()).on_complete(move || {
        info!("gate complete");
        flag.set(true);
    });
    layout.attach_to(&mut gate);
    Ok((stage, layout, gate, completed))
}

fn state_label(state: GateState) -> &'static str {
    match state {
        GateState::Idle => "idle",
        GateState::Scattering => "scattering",
        GateState::PausedAfterScatter | GateState::PausedAfterScramble => "holding",
        GateState::Scrambling => "decoding",
        GateState::EmitterActive => "burning",
        GateState::Complete => "ash",
    }
}

/// Drive `player` with the real clock until it finishes or the user quits.
pub fn run_terminal(player: &mut Player, guard: &TerminalGuard, speed: f64) -> Result<()> {
    let mut clock = FrameClock::new();
    clock.set_speed(speed);
    let mut stdout = io::stdout();
    player.start()?;
    info!(size = ?guard.size()?, "player started");

    while !player.is_finished() {
        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) => match player.handle_key(key)? {
                    Control::Quit => break,
                    Control::TogglePause if clock.is_paused() => {
                        clock.resume();
                        clock.set_speed(speed);
                    }
                    Control::TogglePause => clock.pause(),
                    Control::Continue => {}
                },
                Event::Resize(cols, rows) => player.resize(cols, rows)?,
                _ => {}
            }
        }
        let dt = clock.tick();
        player.tick(dt)?;
        player.paint().render(&mut stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessReport {
    pub frames: usize,
    pub elapsed: Duration,
    pub completions: u64,
    /// The last painted frame, one string per row.
    pub last_frame: Vec<String>,
}

/// Run with fixed [`FRAME`] steps until the player finishes.
pub fn run_headless(player: &mut Player, max_frames: usize) -> Result<HeadlessReport> {
    player.start()?;
    for frame in 1..=max_frames {
        player.tick(FRAME)?;
        if player.is_finished() {
            return Ok(HeadlessReport {
                frames: frame,
                elapsed: player.gate().now(),
                completions: player.gate().completions(),
                last_frame: player.paint().lines(),
            });
        }
    }
    Err(DemoError::Stalled { frames: max_frames })
}
