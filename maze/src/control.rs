//! Drives a [`PathFinder`] one BFS layer at a time, either on a timer or on demand, and forwards
//! what it sees to a [`Renderer`].

use std::time::Duration;

use log::{debug, error, warn};

use crate::{
    config::MazeConfig,
    find::{PathFinder, PathFinderState, PathResult, Snapshot},
    generate::RandomSource,
    grid::{Maze, WallModel, WallSet},
};

/// Receives everything worth drawing. Only coordinates and step numbers are passed on.
pub trait Renderer {
    /// Called once after every generation
    fn on_walls_generated(&mut self, walls: &WallSet);

    /// Called once per BFS layer while animating or stepping
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    /// Called once when a search ends
    fn on_terminal(&mut self, outcome: &Outcome);
}

/// A single slot, cancellable timer. When it expires the owner calls [`Controller::tick`].
pub trait Scheduler {
    /// Arm the timer, replacing whatever was pending
    fn schedule(&mut self, delay: Duration);

    fn cancel(&mut self);

    fn is_pending(&self) -> bool;
}

/// A scheduler that never fires on its own. Whoever drives it decides when time has passed.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Option<Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// Expire the pending timer, returning the delay it was armed with
    pub fn fire(&mut self) -> Option<Duration> {
        self.pending.take()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.pending = Some(delay);
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PathFound(PathResult),
    Exhausted,
}

impl Outcome {
    /// `None` while the search is still computing
    fn from_state(state: PathFinderState) -> Option<Self> {
        match state {
            PathFinderState::PathFound(result) => Some(Outcome::PathFound(result)),
            PathFinderState::NoPathFound => Some(Outcome::Exhausted),
            PathFinderState::Computing => None,
        }
    }

    pub fn path(&self) -> Option<&PathResult> {
        match self {
            Outcome::PathFound(result) => Some(result),
            Outcome::Exhausted => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Pulling one layer per timer expiry
    Running,
    Paused,
    /// Pulling a single layer on request
    Stepping,
}

/// Everything the controller owns between two commands
#[derive(Debug)]
pub struct ControllerState {
    pub phase: Phase,
    pub maze: Maze,
    pub finder: Option<PathFinder<Maze>>,
    /// How the last search ended, kept until the next search or generation
    pub outcome: Option<Outcome>,
}

pub struct Controller<R: Renderer, S: Scheduler, G: RandomSource> {
    config: MazeConfig,
    rng: G,
    renderer: R,
    scheduler: S,
    state: ControllerState,
}

impl<R: Renderer, S: Scheduler, G: RandomSource> Controller<R, S, G> {
    /// Validate the config and generate the first maze
    pub fn new(config: MazeConfig, mut rng: G, renderer: R, scheduler: S) -> anyhow::Result<Self> {
        config.validate()?;
        let maze = Maze::generate(config.width, config.height, &mut rng)?;

        let mut controller = Self {
            config,
            rng,
            renderer,
            scheduler,
            state: ControllerState {
                phase: Phase::Idle,
                maze,
                finder: None,
                outcome: None,
            },
        };
        controller
            .renderer
            .on_walls_generated(controller.state.maze.walls());
        Ok(controller)
    }

    /// Replace the maze with a fresh one. Only meaningful while idle.
    pub fn generate(&mut self) {
        if self.state.phase != Phase::Idle {
            debug!("ignoring generate while {:?}", self.state.phase);
            return;
        }
        self.regenerate();
    }

    /// Start an animated search
    pub fn solve_animated(&mut self) {
        if self.state.phase != Phase::Idle {
            debug!("ignoring solve while {:?}", self.state.phase);
            return;
        }
        self.start_search();
        self.set_phase(Phase::Running);
        self.scheduler.schedule(self.config.tempo());
    }

    /// Search to the end without pacing. A paused search is finished where it stands.
    pub fn solve_immediate(&mut self) {
        match self.state.phase {
            Phase::Idle => self.start_search(),
            Phase::Paused => {}
            phase => {
                debug!("ignoring immediate solve while {phase:?}");
                return;
            }
        }
        let Some(finder) = self.state.finder.take() else {
            return;
        };
        let (state, _) = finder.finish(&self.state.maze);
        self.conclude(state);
    }

    pub fn pause(&mut self) {
        if self.state.phase != Phase::Running {
            debug!("ignoring pause while {:?}", self.state.phase);
            return;
        }
        self.scheduler.cancel();
        self.set_phase(Phase::Paused);
    }

    pub fn resume(&mut self) {
        if self.state.phase != Phase::Paused {
            debug!("ignoring resume while {:?}", self.state.phase);
            return;
        }
        self.set_phase(Phase::Running);
        self.scheduler.schedule(self.config.tempo());
    }

    /// Pull exactly one layer and stay paused
    pub fn step(&mut self) {
        match self.state.phase {
            Phase::Idle => self.start_search(),
            Phase::Paused => {}
            phase => {
                debug!("ignoring step while {phase:?}");
                return;
            }
        }
        self.set_phase(Phase::Stepping);
        self.pull();
        if self.state.phase == Phase::Stepping {
            self.set_phase(Phase::Paused);
        }
    }

    /// Abandon any search and generate a new maze
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.state.finder = None;
        self.set_phase(Phase::Idle);
        self.regenerate();
    }

    /// The timer armed by this controller has expired
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Running {
            debug!("ignoring stale tick while {:?}", self.state.phase);
            return;
        }
        self.pull();
        if self.state.phase == Phase::Running {
            self.scheduler.schedule(self.config.tempo());
        }
    }

    /// Swap the random source used by later generations
    pub fn reseed(&mut self, rng: G) {
        self.rng = rng;
    }

    /// Apply new settings and start over with a fresh maze
    pub fn configure(&mut self, config: MazeConfig) -> anyhow::Result<()> {
        config.validate()?;
        self.config = config;
        self.reset();
        Ok(())
    }

    fn regenerate(&mut self) {
        match Maze::generate(self.config.width, self.config.height, &mut self.rng) {
            Ok(maze) => self.state.maze = maze,
            Err(err) => {
                error!("keeping the previous maze: {err}");
                return;
            }
        }
        self.state.outcome = None;
        self.renderer.on_walls_generated(self.state.maze.walls());
    }

    fn start_search(&mut self) {
        debug!(
            "starting search on {}x{} maze",
            self.state.maze.width(),
            self.state.maze.height()
        );
        self.state.finder = Some(PathFinder::new(&self.state.maze));
        self.state.outcome = None;
    }

    /// Forward the next layer, or the outcome if there is none
    fn pull(&mut self) {
        let Some(finder) = self.state.finder.as_mut() else {
            self.set_phase(Phase::Idle);
            return;
        };
        match finder.next_wave(&self.state.maze) {
            Some(snapshot) => self.renderer.on_snapshot(&snapshot),
            None => {
                let state = finder.state().clone();
                self.conclude(state);
            }
        }
    }

    /// Report a finished search and go back to idle
    fn conclude(&mut self, state: PathFinderState) {
        let Some(outcome) = Outcome::from_state(state) else {
            warn!("search stopped before it finished, abandoning it");
            self.scheduler.cancel();
            self.state.finder = None;
            self.set_phase(Phase::Idle);
            return;
        };
        self.scheduler.cancel();
        self.state.finder = None;
        self.renderer.on_terminal(&outcome);
        self.state.outcome = Some(outcome);
        self.set_phase(Phase::Idle);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            debug!("{:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn maze(&self) -> &Maze {
        &self.state.maze
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.state.outcome.as_ref()
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    /// Lucky on every roll, so every maze is open
    struct Open;

    impl RandomSource for Open {
        fn next_f64(&mut self) -> f64 {
            0.0
        }
    }

    /// Unlucky on every roll, so every edge is walled
    struct Closed;

    impl RandomSource for Closed {
        fn next_f64(&mut self) -> f64 {
            0.99
        }
    }

    #[derive(Default)]
    struct Recorder {
        walls: Vec<WallSet>,
        waves: Vec<usize>,
        outcomes: Vec<Outcome>,
    }

    impl Renderer for Recorder {
        fn on_walls_generated(&mut self, walls: &WallSet) {
            self.walls.push(walls.clone());
        }

        fn on_snapshot(&mut self, snapshot: &Snapshot) {
            self.waves.push(snapshot.wave_step);
        }

        fn on_terminal(&mut self, outcome: &Outcome) {
            self.outcomes.push(outcome.clone());
        }
    }

    fn small() -> MazeConfig {
        MazeConfig {
            width: 4,
            height: 4,
            tempo_ms: 5,
            seed: None,
        }
    }

    fn controller<G: RandomSource>(rng: G) -> Controller<Recorder, ManualScheduler, G> {
        Controller::new(small(), rng, Recorder::default(), ManualScheduler::new()).unwrap()
    }

    /// Fire the timer until nothing is pending
    fn run_out<G: RandomSource>(c: &mut Controller<Recorder, ManualScheduler, G>) {
        while c.scheduler_mut().fire().is_some() {
            c.tick();
        }
    }

    fn assert_found(outcome: &Outcome, steps: usize) {
        assert!(
            matches!(outcome, Outcome::PathFound(PathResult { steps: s, .. }) if *s == steps),
            "expected a path of {steps} steps, got {outcome:?}"
        );
    }

    #[test]
    fn test_new_generates_once() {
        let c = controller(Open);
        assert_eq!(c.renderer().walls.len(), 1);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.scheduler().is_pending());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MazeConfig {
            width: 0,
            ..small()
        };
        assert!(
            Controller::new(config, Open, Recorder::default(), ManualScheduler::new()).is_err()
        );
    }

    #[test]
    fn test_animated_run() {
        let mut c = controller(Open);
        c.solve_animated();
        assert_eq!(c.phase(), Phase::Running);
        assert_eq!(c.scheduler().pending(), Some(Duration::from_millis(5)));

        run_out(&mut c);

        assert_eq!(c.renderer().waves, vec![1, 2, 3, 4]);
        assert_eq!(c.renderer().outcomes.len(), 1);
        assert_found(&c.renderer().outcomes[0], 4);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.state().finder.is_none());
        assert!(c.outcome().is_some());
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut c = controller(Open);
        c.solve_animated();
        c.scheduler_mut().fire();
        c.tick();

        c.solve_animated();
        c.solve_immediate();
        c.generate();
        assert_eq!(c.phase(), Phase::Running);
        assert_eq!(c.renderer().walls.len(), 1);
        assert!(c.renderer().outcomes.is_empty());

        run_out(&mut c);
        assert_eq!(c.renderer().waves, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut c = controller(Open);
        c.solve_animated();
        c.scheduler_mut().fire();
        c.tick();

        c.pause();
        c.pause();
        assert_eq!(c.phase(), Phase::Paused);
        assert!(!c.scheduler().is_pending());

        // a tick that raced the pause does nothing
        c.tick();
        assert_eq!(c.renderer().waves, vec![1]);

        c.resume();
        assert_eq!(c.phase(), Phase::Running);
        run_out(&mut c);
        assert_eq!(c.renderer().waves, vec![1, 2, 3, 4]);
        assert_found(&c.renderer().outcomes[0], 4);
    }

    #[test]
    fn test_resume_while_not_paused_is_noop() {
        let mut c = controller(Open);
        c.resume();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.scheduler().is_pending());
        assert!(c.state().finder.is_none());
    }

    #[test]
    fn test_step_while_running_is_noop() {
        let mut c = controller(Open);
        c.solve_animated();
        c.scheduler_mut().fire();
        c.tick();

        c.step();
        assert_eq!(c.phase(), Phase::Running);
        assert_eq!(c.renderer().waves, vec![1]);

        run_out(&mut c);
        assert_eq!(c.renderer().waves, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_step_from_idle() {
        let mut c = controller(Open);
        c.step();
        assert_eq!(c.phase(), Phase::Paused);
        assert_eq!(c.renderer().waves, vec![1]);
        assert!(!c.scheduler().is_pending());

        c.step();
        assert_eq!(c.renderer().waves, vec![1, 2]);

        c.resume();
        run_out(&mut c);
        assert_eq!(c.renderer().waves, vec![1, 2, 3, 4]);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_step_to_the_end() {
        let mut c = controller(Open);
        for _ in 0..4 {
            c.step();
        }
        assert_eq!(c.phase(), Phase::Paused);
        assert!(c.renderer().outcomes.is_empty());

        c.step();
        assert_eq!(c.phase(), Phase::Idle);
        assert_found(&c.renderer().outcomes[0], 4);
    }

    #[test]
    fn test_immediate_only_reports_outcome() {
        let mut c = controller(Open);
        c.solve_immediate();
        assert!(c.renderer().waves.is_empty());
        assert_eq!(c.renderer().outcomes.len(), 1);
        assert_found(&c.renderer().outcomes[0], 4);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_immediate_finishes_paused_search() {
        let mut c = controller(Open);
        c.step();
        c.solve_immediate();
        assert_eq!(c.renderer().waves, vec![1]);
        assert_found(&c.renderer().outcomes[0], 4);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_exhausted() {
        let mut c = controller(Closed);
        c.solve_immediate();
        assert_eq!(c.renderer().outcomes, vec![Outcome::Exhausted]);

        c.solve_animated();
        run_out(&mut c);
        assert!(c.renderer().waves.is_empty());
        assert_eq!(
            c.renderer().outcomes,
            vec![Outcome::Exhausted, Outcome::Exhausted]
        );
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_reset_while_running() {
        let mut c = controller(Open);
        c.solve_animated();
        c.scheduler_mut().fire();
        c.tick();

        c.reset();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.scheduler().is_pending());
        assert!(c.state().finder.is_none());
        assert_eq!(c.renderer().walls.len(), 2);
        assert!(c.renderer().outcomes.is_empty());
    }

    #[test]
    fn test_reset_while_paused() {
        let mut c = controller(Open);
        c.step();
        c.reset();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.state().finder.is_none());

        // a new step starts from scratch
        c.step();
        assert_eq!(c.renderer().waves, vec![1, 1]);
    }

    #[test]
    fn test_reseed_replays_generation() {
        let mut c = controller(StdRng::seed_from_u64(7));
        let first = c.maze().clone();

        c.generate();
        assert_ne!(c.maze(), &first);

        c.reseed(StdRng::seed_from_u64(7));
        c.reset();
        assert_eq!(c.maze(), &first);

        c.reseed(StdRng::seed_from_u64(7));
        c.generate();
        assert_eq!(c.maze(), &first);
    }

    #[test]
    fn test_unfinished_search_has_no_outcome() {
        assert_eq!(Outcome::from_state(PathFinderState::Computing), None);
        assert_eq!(
            Outcome::from_state(PathFinderState::NoPathFound),
            Some(Outcome::Exhausted)
        );
    }

    #[test]
    fn test_conclude_ignores_unfinished_search() {
        let mut c = controller(Open);
        c.step();
        c.conclude(PathFinderState::Computing);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.state().finder.is_none());
        assert!(c.outcome().is_none());
        assert!(c.renderer().outcomes.is_empty());
    }

    #[test]
    fn test_generation_matches_maze_generate() {
        let mut c = controller(StdRng::seed_from_u64(3));
        c.generate();

        let mut rng = StdRng::seed_from_u64(3);
        let first = Maze::generate(4, 4, &mut rng).unwrap();
        let second = Maze::generate(4, 4, &mut rng).unwrap();
        assert_eq!(c.renderer().walls, vec![first.walls().clone(), second.walls().clone()]);
        assert_eq!(c.maze(), &second);
    }

    #[test]
    fn test_configure() {
        let mut c = controller(Open);
        let config = MazeConfig {
            width: 6,
            height: 3,
            ..small()
        };
        c.configure(config).unwrap();
        assert_eq!((c.maze().width(), c.maze().height()), (6, 3));

        c.solve_immediate();
        assert_found(&c.renderer().outcomes[0], 3);

        assert!(c
            .configure(MazeConfig {
                width: 0,
                ..small()
            })
            .is_err());
        assert_eq!(c.config().width, 6);
    }
}
