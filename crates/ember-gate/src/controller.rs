#![forbid(unsafe_code)]

//! The gate sequence: one restartable run of the cinematic.
//!
//! # State machine
//!
//! ```text
//! Idle ─mount(ready)─▶ Scattering ─▶ PausedAfterScatter ─▶ Scrambling
//!                                                              │
//!        Complete ◀─all dissolved─ EmitterActive ◀─ PausedAfterScramble
//! ```
//!
//! Every arrow but the last is a timeout taken from the run's
//! [`SequenceTimeline`]. `EmitterActive → Complete` happens when the last unit
//! dissolves; the completion callback follows once the ash has settled.
//!
//! # Ownership
//!
//! A [`GateSequence`] owns its [`Scheduler`], so every timeout, interval and
//! frame request of a run lives in one place. Teardown (unmount, or an anchor
//! detaching mid-run) clears the scheduler, empties both text containers and
//! restores the ember nodes, so the next mount starts from a clean surface.
//!
//! # Invariants
//!
//! 1. At most one run is active; mounting again while active is a no-op.
//! 2. After teardown `pending().total() == 0` and both text containers are
//!    empty.
//! 3. The completion callback runs at most once per run, and only after every
//!    non-blank unit has dissolved.

use std::fmt;
use std::time::Duration;

use ember_core::animation::{NodeStyle, SequenceTimeline, Tween};
use ember_core::geometry::BoxF;
use ember_runtime::{Dispatch, PendingCounts, Scheduler, TimerId, run_frame};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, error, info, info_span, warn};

use crate::config::GateConfig;
use crate::dissolve::{CompletionLatch, DissolveEmitter, DissolveOutcome, fade_trail};
use crate::factory::CharacterFactory;
use crate::glyphs::GlyphTable;
use crate::proximity::ProximityTracker;
use crate::readiness::{Anchor, Anchors, Readiness, ReadinessGate};
use crate::scatter::{ScatterSequencer, scatter_total};
use crate::scramble::ScrambleSequencer;
use crate::surface::{Markers, NodeId, Surface};
use crate::unit::{Segment, UnitArena, UnitRole};

/// Where a run is in the cinematic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GateState {
    #[default]
    Idle,
    Scattering,
    PausedAfterScatter,
    Scrambling,
    PausedAfterScramble,
    EmitterActive,
    Complete,
}

/// Work items the run's scheduler hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTask {
    /// Timeline transition.
    Enter(GateState),
    /// Scatter container was detached when the phase began; try again.
    RetryScatter,
    /// Swap the placeholder of a scramble unit (segment-local index).
    ScrambleTick(usize),
    /// Lock a scramble unit to its final glyph (segment-local index).
    ScrambleLock(usize),
    /// One proximity poll.
    ProximityPoll,
    /// Dissolve the unit at an arena position.
    Dissolve(usize),
    /// Invoke the completion callback.
    Complete,
}

/// What [`GateSequence::mount`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// A run started.
    Started,
    /// Some anchor is missing or detached; the mount is retried on every
    /// [`GateSequence::advance`] until it succeeds.
    NotReady,
    /// A run is already active.
    AlreadyActive,
    /// Ember nodes exist but none is marked lead. Nothing is retried until an
    /// anchor is attached again.
    LeadMissing,
}

impl MountOutcome {
    #[inline]
    pub fn is_started(self) -> bool {
        self == Self::Started
    }
}

type Callback = Box<dyn FnMut()>;

/// Per-run state, created on mount and dropped on teardown.
struct Run {
    id: u64,
    span: tracing::Span,
    state: GateState,
    anchors: Anchors,
    /// Ember nodes with the pose they had before the run.
    embers: Vec<(NodeId, NodeStyle)>,
    arena: UnitArena,
    glyphs: GlyphTable,
    timeline: SequenceTimeline<GateState>,
    scramble: ScrambleSequencer,
    tracker: ProximityTracker,
    latch: CompletionLatch,
    rng: SmallRng,
    completed: bool,
}

/// The gate cinematic controller.
pub struct GateSequence {
    config: GateConfig,
    readiness: ReadinessGate,
    scheduler: Scheduler<GateTask>,
    run: Option<Run>,
    on_complete: Option<Callback>,
    runs_started: u64,
    completions: u64,
    /// A mount was requested but the surface was not ready.
    mount_pending: bool,
    /// The last readiness check found no lead ember.
    lead_missing: bool,
}

impl fmt::Debug for GateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateSequence")
            .field("state", &self.state())
            .field("readiness", &self.readiness)
            .field("pending", &self.pending())
            .field("runs_started", &self.runs_started)
            .field("completions", &self.completions)
            .finish_non_exhaustive()
    }
}

impl Default for GateSequence {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

impl GateSequence {
    /// Create an idle sequence. Config problems are logged, not rejected.
    pub fn new(config: GateConfig) -> Self {
        for problem in config.validate() {
            warn!(%problem, "gate config");
        }
        Self {
            config,
            readiness: ReadinessGate::new(),
            scheduler: Scheduler::new(),
            run: None,
            on_complete: None,
            runs_started: 0,
            completions: 0,
            mount_pending: false,
            lead_missing: false,
        }
    }

    /// Set the completion callback (builder pattern).
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn set_on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    #[inline]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[inline]
    pub fn readiness(&self) -> &ReadinessGate {
        &self.readiness
    }

    /// Current state; `Idle` when no run is active.
    pub fn state(&self) -> GateState {
        self.run.as_ref().map_or(GateState::Idle, |r| r.state)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Id of the active run.
    pub fn run_id(&self) -> Option<u64> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Runs started since creation.
    #[inline]
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Completion callbacks invoked since creation.
    #[inline]
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Units of the active run.
    pub fn units(&self) -> Option<&UnitArena> {
        self.run.as_ref().map(|r| &r.arena)
    }

    /// Phase plan of the active run.
    pub fn timeline(&self) -> Option<&SequenceTimeline<GateState>> {
        self.run.as_ref().map(|r| &r.timeline)
    }

    /// Reveal order of the scramble phrase in the active run.
    pub fn scramble_order(&self) -> Option<&[usize]> {
        self.run.as_ref().map(|r| r.scramble.order())
    }

    /// Outstanding scheduler work.
    pub fn pending(&self) -> PendingCounts {
        self.scheduler.pending_counts()
    }

    /// Virtual time of the sequence's scheduler.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Fill an anchor slot. Returns `false` if the slot is already filled.
    pub fn attach(&mut self, anchor: Anchor, node: NodeId) -> bool {
        let filled = self.readiness.fill(anchor, node);
        if filled && self.lead_missing {
            self.lead_missing = false;
            self.mount_pending = true;
        }
        filled
    }

    /// Empty an anchor slot. An active run is torn down, and the mount is
    /// retried once the slot is filled again.
    pub fn detach<S: Surface + ?Sized>(&mut self, anchor: Anchor, surface: &mut S) -> Option<NodeId> {
        if self.run.is_some() {
            self.teardown(surface);
            self.mount_pending = true;
        }
        self.readiness.clear(anchor)
    }

    /// Start a run if every anchor is ready.
    pub fn mount<S: Surface + ?Sized>(&mut self, surface: &mut S) -> MountOutcome {
        if self.run.is_some() {
            debug!("mount ignored: run already active");
            return MountOutcome::AlreadyActive;
        }
        if self.lead_missing {
            return MountOutcome::LeadMissing;
        }
        match self.readiness.check(surface) {
            Readiness::Waiting => {
                self.mount_pending = true;
                debug!("mount deferred: surface not ready");
                MountOutcome::NotReady
            }
            Readiness::LeadMissing => {
                self.lead_missing = true;
                self.mount_pending = false;
                error!(
                    emitter = ?self.readiness.get(Anchor::Emitter).map(NodeId::get),
                    "emitter has no lead ember; gate will not start until an anchor is re-attached"
                );
                MountOutcome::LeadMissing
            }
            Readiness::Ready(anchors) => {
                self.mount_pending = false;
                self.start_run(anchors, surface);
                MountOutcome::Started
            }
        }
    }

    /// Tear the active run down and stop retrying a deferred mount.
    pub fn unmount<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.mount_pending = false;
        self.teardown(surface);
    }

    /// Advance the sequence by one frame of length `dt`.
    ///
    /// Call after the surface has advanced its own tweens for this frame.
    /// Returns the number of tasks dispatched.
    pub fn advance<S: Surface + ?Sized>(&mut self, dt: Duration, surface: &mut S) -> usize {
        if self.run.is_none() {
            if self.mount_pending {
                self.mount(surface);
            }
            if self.run.is_none() {
                return 0;
            }
        }
        if !matches!(self.readiness.check(surface), Readiness::Ready(_)) {
            info!("surface became unready; tearing down");
            self.teardown(surface);
            self.mount_pending = true;
            return 0;
        }
        let Some(run) = self.run.as_mut() else {
            return 0;
        };
        let span = run.span.clone();
        let _guard = span.enter();
        let mut driver = Driver {
            run,
            surface,
            config: &self.config,
            on_complete: &mut self.on_complete,
            completions: &mut self.completions,
        };
        run_frame(&mut self.scheduler, dt, &mut driver)
    }

    fn start_run<S: Surface + ?Sized>(&mut self, anchors: Anchors, surface: &mut S) {
        self.runs_started += 1;
        let id = self.runs_started;
        let span = info_span!("gate_run", run = id);
        let _guard = span.enter();

        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let glyphs = self.config.scramble.glyphs.table();
        let factory = CharacterFactory::new(&glyphs);
        let mut scatter = factory.build(&self.config.phrases.scatter, UnitRole::StaticScatter, &mut rng);
        let mut scramble = factory.build(&self.config.phrases.scramble, UnitRole::ScrambleReveal, &mut rng);

        surface.clear_children(anchors.scatter_text);
        surface.clear_children(anchors.scramble_text);
        for unit in &mut scatter {
            unit.node = surface.append_glyph(anchors.scatter_text, &unit.current_glyph, NodeStyle::HIDDEN);
        }
        for unit in &mut scramble {
            unit.node = surface.append_glyph(anchors.scramble_text, &unit.current_glyph, NodeStyle::HIDDEN);
        }

        let embers: Vec<(NodeId, NodeStyle)> = surface
            .children(anchors.emitter)
            .into_iter()
            .map(|e| (e, surface.style(e).unwrap_or_default()))
            .collect();
        for &(ember, rest) in &embers {
            surface.stop_animations(ember);
            surface.set_style(ember, rest.with_opacity(0.0));
        }

        let sequencer = ScrambleSequencer::plan(scramble.len(), self.config.scramble.order, &mut rng);
        let timeline = SequenceTimeline::new()
            .then(GateState::Scattering, scatter_total(scatter.len(), &self.config.scatter))
            .then(GateState::PausedAfterScatter, self.config.pauses.after_scatter)
            .then(
                GateState::Scrambling,
                sequencer.planned_total(&scramble, &self.config.scramble),
            )
            .then(GateState::PausedAfterScramble, self.config.pauses.after_scramble)
            .then(GateState::EmitterActive, self.config.emitter.sweep);

        let arena = UnitArena::new(scatter, scramble);
        info!(
            units = arena.len(),
            active = arena.active_total(),
            embers = embers.len(),
            planned_ms = timeline.total().as_millis() as u64,
            "gate run started"
        );

        let run = self.run.insert(Run {
            id,
            span: span.clone(),
            state: GateState::Idle,
            anchors,
            embers,
            arena,
            glyphs,
            timeline,
            scramble: sequencer,
            tracker: ProximityTracker::new(
                self.config.proximity_threshold,
                self.config.dissolve.ignite_delay,
            ),
            latch: CompletionLatch::default(),
            rng,
            completed: false,
        });
        let mut driver = Driver {
            run,
            surface,
            config: &self.config,
            on_complete: &mut self.on_complete,
            completions: &mut self.completions,
        };
        driver.enter(&mut self.scheduler, GateState::Scattering);
    }

    fn teardown<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let Some(run) = self.run.take() else {
            return;
        };
        let _guard = run.span.enter();
        let cancelled = self.scheduler.clear();
        let removed = surface.clear_children(run.anchors.scatter_text)
            + surface.clear_children(run.anchors.scramble_text);
        for &(ember, rest) in &run.embers {
            surface.stop_animations(ember);
            surface.set_style(ember, rest);
        }
        info!(
            state = ?run.state,
            cancelled,
            removed,
            "gate run torn down"
        );
    }
}

/// Borrowed view of one run while its tasks are dispatched.
struct Driver<'a, S: ?Sized> {
    run: &'a mut Run,
    surface: &'a mut S,
    config: &'a GateConfig,
    on_complete: &'a mut Option<Callback>,
    completions: &'a mut u64,
}

impl<S: Surface + ?Sized> Driver<'_, S> {
    fn container(&self, pos: usize) -> NodeId {
        if self.run.arena.segment(Segment::Scatter).contains(&pos) {
            self.run.anchors.scatter_text
        } else {
            self.run.anchors.scramble_text
        }
    }

    fn enter(&mut self, scheduler: &mut Scheduler<GateTask>, state: GateState) {
        self.run.state = state;
        info!(?state, at_ms = scheduler.now().as_millis() as u64, "phase");
        match state {
            GateState::Scattering => {
                if !self.start_scatter() {
                    debug!("scatter container detached; retrying next frame");
                    scheduler.request_frame(GateTask::RetryScatter);
                    return;
                }
            }
            GateState::Scrambling => self.start_scramble(scheduler),
            GateState::EmitterActive => self.start_emitter(scheduler),
            GateState::Idle
            | GateState::PausedAfterScatter
            | GateState::PausedAfterScramble
            | GateState::Complete => {}
        }
        self.schedule_successor(scheduler, state);
    }

    fn schedule_successor(&self, scheduler: &mut Scheduler<GateTask>, state: GateState) {
        if let Some((next, delay)) = self.run.timeline.successor(state) {
            scheduler.set_timeout(delay, GateTask::Enter(next));
        }
    }

    fn start_scatter(&mut self) -> bool {
        let units = self.run.arena.segment_units(Segment::Scatter);
        ScatterSequencer::new(&self.config.scatter)
            .start(
                self.surface,
                self.run.anchors.scatter_text,
                units,
                &mut self.run.rng,
            )
            .is_some()
    }

    fn start_scramble(&mut self, scheduler: &mut Scheduler<GateTask>) {
        let run = &mut *self.run;
        let units = run.arena.segment_units(Segment::Scramble);
        for unit in units {
            if let Some(node) = unit.node() {
                self.surface.animate(
                    node,
                    Tween::to(NodeStyle::REST, self.config.scramble.speed).from(NodeStyle::HIDDEN),
                );
            }
        }
        let total = run.scramble.start(
            scheduler,
            units,
            &self.config.scramble,
            GateTask::ScrambleTick,
            GateTask::ScrambleLock,
        );
        debug!(total_ms = total.as_millis() as u64, order = ?run.scramble.order(), "scramble scheduled");
    }

    /// Horizontal extent the ember must cover: the emitter plus every unit
    /// still waiting to burn.
    fn sweep_extent(&self) -> Option<BoxF> {
        let units = self
            .run
            .arena
            .iter()
            .filter(|u| !u.is_processed())
            .filter_map(|u| self.surface.bounds(u.node()?));
        self.surface
            .bounds(self.run.anchors.emitter)
            .into_iter()
            .chain(units)
            .reduce(|a, b| a.union(&b))
    }

    fn start_emitter(&mut self, scheduler: &mut Scheduler<GateTask>) {
        let emitter = &self.config.emitter;
        let extent = self.sweep_extent().unwrap_or_default();
        let lead = self.run.anchors.lead;
        let mut rank = 0u32;
        for &(ember, rest) in &self.run.embers {
            let trail = if ember == lead {
                0
            } else {
                rank += 1;
                rank
            };
            let opacity = (1.0 - 0.2 * f64::from(trail)).max(0.2);
            // Sweep dx is relative to where the ember sits at rest.
            let home = self
                .surface
                .bounds(ember)
                .map_or(0.0, |b| b.center_x() - self.surface.style(ember).map_or(0.0, |s| s.dx));
            let from = NodeStyle {
                dx: extent.x - home - emitter.overshoot,
                opacity,
                ..rest
            };
            let to = NodeStyle {
                dx: extent.right() - home + emitter.overshoot,
                ..from
            };
            self.surface.set_style(ember, from);
            self.surface.animate(
                ember,
                Tween::to(to, emitter.sweep)
                    .from(from)
                    .delay(emitter.trail_lag.saturating_mul(trail))
                    .easing(emitter.easing),
            );
        }
        let polling = self
            .run
            .tracker
            .start(scheduler, &self.run.arena, GateTask::ProximityPoll);
        debug!(polling, embers = self.run.embers.len(), "emitter active");
        self.check_complete(scheduler);
    }

    fn scramble_tick(&mut self, index: usize) {
        if !self.run.scramble.is_cycling(index) {
            return;
        }
        let pos = self.run.arena.segment(Segment::Scramble).start + index;
        let glyph = self.run.glyphs.pick(&mut self.run.rng).to_string();
        if let Some(unit) = self.run.arena.get_mut(pos) {
            if let Some(node) = unit.node {
                self.surface.set_glyph(node, &glyph);
            }
            unit.current_glyph = glyph;
        }
    }

    fn scramble_lock(&mut self, scheduler: &mut Scheduler<GateTask>, index: usize) {
        if !self.run.scramble.lock(scheduler, index) {
            return;
        }
        let pos = self.run.arena.segment(Segment::Scramble).start + index;
        if let Some(unit) = self.run.arena.get_mut(pos) {
            unit.current_glyph.clone_from(&unit.final_glyph);
            if let Some(node) = unit.node {
                self.surface.set_glyph(node, &unit.final_glyph);
                self.surface.insert_markers(node, Markers::REVEALED);
            }
            debug!(index, glyph = %unit.final_glyph, "scramble locked");
        }
    }

    fn dissolve(&mut self, scheduler: &mut Scheduler<GateTask>, pos: usize) {
        let container = self.container(pos);
        let outcome = DissolveEmitter::new(&self.config.dissolve).dissolve(
            &mut self.run.arena,
            pos,
            container,
            self.surface,
            &mut self.run.rng,
        );
        if let DissolveOutcome::Skipped(reason) = outcome {
            debug!(pos, ?reason, "dissolve skipped");
            return;
        }
        self.check_complete(scheduler);
    }

    fn check_complete(&mut self, scheduler: &mut Scheduler<GateTask>) {
        if !self.run.latch.trip(&self.run.arena) {
            return;
        }
        self.run.tracker.cancel(scheduler);
        let embers: Vec<NodeId> = self.run.embers.iter().map(|(e, _)| *e).collect();
        fade_trail(self.surface, &embers, self.config.emitter.trail_fade);
        let delay = self.config.dissolve.completion_delay();
        scheduler.set_timeout(delay, GateTask::Complete);
        self.run.state = GateState::Complete;
        info!(
            dissolved = self.run.arena.dissolved_count(),
            callback_in_ms = delay.as_millis() as u64,
            "all units dissolved"
        );
    }

    fn complete(&mut self) {
        if self.run.completed {
            return;
        }
        self.run.completed = true;
        *self.completions += 1;
        info!("gate sequence complete");
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

impl<S: Surface + ?Sized> Dispatch<GateTask> for Driver<'_, S> {
    fn on_timer(&mut self, scheduler: &mut Scheduler<GateTask>, _id: TimerId, task: GateTask) {
        match task {
            GateTask::Enter(state) => self.enter(scheduler, state),
            GateTask::ScrambleTick(index) => self.scramble_tick(index),
            GateTask::ScrambleLock(index) => self.scramble_lock(scheduler, index),
            GateTask::Dissolve(pos) => self.dissolve(scheduler, pos),
            GateTask::Complete => self.complete(),
            GateTask::RetryScatter | GateTask::ProximityPoll => {
                debug!(?task, "frame task delivered as timer");
            }
        }
    }

    fn on_frame(&mut self, scheduler: &mut Scheduler<GateTask>, id: TimerId, task: GateTask) {
        match task {
            GateTask::ProximityPoll => {
                let run = &mut *self.run;
                run.tracker.poll(
                    id,
                    scheduler,
                    &mut run.arena,
                    self.surface,
                    run.anchors.lead,
                    GateTask::Dissolve,
                    GateTask::ProximityPoll,
                );
            }
            GateTask::RetryScatter => {
                if self.run.state != GateState::Scattering {
                    return;
                }
                if self.start_scatter() {
                    self.schedule_successor(scheduler, GateState::Scattering);
                } else {
                    scheduler.request_frame(GateTask::RetryScatter);
                }
            }
            other => debug!(task = ?other, "timer task delivered as frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use tracing_test::traced_test;

    #[test]
    fn mount_outcome_started() {
        assert!(MountOutcome::Started.is_started());
        assert!(!MountOutcome::NotReady.is_started());
    }

    #[test]
    fn idle_sequence_reports_idle() {
        let seq = GateSequence::default();
        assert_eq!(seq.state(), GateState::Idle);
        assert!(!seq.is_active());
        assert_eq!(seq.pending().total(), 0);
        assert!(seq.units().is_none());
    }

    #[test]
    #[traced_test]
    fn missing_lead_is_logged_and_sticky() {
        let mut stage = Stage::default();
        let layout = stage
            .gate_layout(BoxF::new(0.0, 0.0, 640.0, 240.0), 2)
            .unwrap();
        stage.remove_markers(layout.embers[0], Markers::LEAD);
        let mut gate = GateSequence::new(GateConfig::default().seeded(1));
        layout.attach_to(&mut gate);

        assert_eq!(gate.mount(&mut stage), MountOutcome::LeadMissing);
        assert!(logs_contain("no lead ember"));

        // Fixing the surface alone is not enough; an anchor must be re-attached.
        stage.insert_markers(layout.embers[1], Markers::LEAD);
        assert_eq!(gate.mount(&mut stage), MountOutcome::LeadMissing);
        assert_eq!(gate.advance(Duration::from_millis(16), &mut stage), 0);
        assert!(!gate.is_active());

        gate.detach(Anchor::Emitter, &mut stage);
        gate.attach(Anchor::Emitter, layout.emitter);
        gate.advance(Duration::from_millis(16), &mut stage);
        assert_eq!(gate.state(), GateState::Scattering);
    }

    #[test]
    fn timeline_follows_config() {
        let mut stage = Stage::default();
        let layout = stage
            .gate_layout(BoxF::new(0.0, 0.0, 640.0, 240.0), 1)
            .unwrap();
        let config = GateConfig::with_phrases("abc", "de").seeded(3);
        let mut gate = GateSequence::new(config.clone());
        layout.attach_to(&mut gate);
        assert!(gate.mount(&mut stage).is_started());

        let tl = gate.timeline().unwrap();
        let scatter = scatter_total(3, &config.scatter);
        assert_eq!(tl.duration_of(GateState::Scattering), Some(scatter));
        assert_eq!(
            tl.start_of(GateState::Scrambling),
            Some(scatter + config.pauses.after_scatter)
        );
        assert_eq!(
            tl.duration_of(GateState::Scrambling),
            Some(config.scramble.stagger + config.scramble.duration)
        );
        assert_eq!(gate.pending().timeouts, 1);
    }
}
