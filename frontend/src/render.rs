use std::time::{Duration, Instant};

use maze::{Outcome, Renderer, Scheduler, Snapshot, Visit, WallSet};

/// Collects what the controller reports so the next frame can paint it
#[derive(Default)]
pub struct FrameRenderer {
    pub visited: Vec<Visit>,
    pub wave_step: usize,
    pub outcome: Option<Outcome>,
    /// How many path segments the backtrace animation has revealed so far
    pub revealed: usize,
    /// Earliest time the next segment may be revealed
    next_reveal: Option<Instant>,
}

impl Renderer for FrameRenderer {
    fn on_walls_generated(&mut self, walls: &WallSet) {
        log::debug!("new maze with {} walls", walls.len());
        *self = Self::default();
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.visited.clone_from(&snapshot.visited);
        self.wave_step = snapshot.wave_step;
        self.outcome = None;
    }

    fn on_terminal(&mut self, outcome: &Outcome) {
        self.outcome = Some(outcome.clone());
        self.revealed = 0;
        self.next_reveal = None;
    }
}

impl FrameRenderer {
    /// Reveal one more segment of the path, returns false once all of it is visible
    pub fn reveal_next(&mut self) -> bool {
        let Some(Outcome::PathFound(result)) = &self.outcome else {
            return false;
        };
        // the entrance and exit count as segments too
        if self.revealed <= result.path.len() {
            self.revealed += 1;
            true
        } else {
            false
        }
    }

    /// Reveal the next segment once `tempo` has passed since the previous one.
    /// Returns how long until another segment is due, `None` once the whole path is visible.
    pub fn reveal_paced(&mut self, now: Instant, tempo: Duration) -> Option<Duration> {
        if let Some(due) = self.next_reveal {
            if due > now {
                return Some(due - now);
            }
        }
        if self.reveal_next() {
            self.next_reveal = Some(now + tempo);
            Some(tempo)
        } else {
            self.next_reveal = None;
            None
        }
    }
}

/// A timer that fires on the first frame painted after its deadline
#[derive(Default)]
pub struct FrameScheduler {
    deadline: Option<Instant>,
}

impl FrameScheduler {
    /// Expire the timer if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
