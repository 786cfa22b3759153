/// Actor facade: liveness, the tracked obstacle set, and the
/// commit-then-notify seam toward the presentation layer.
///
/// The scene reports proximity enter/exit by obstacle id; the facade keeps
/// that set deduplicated and hands it to the motion simulator each tick.
/// Death is terminal: the hook fires exactly once and every later update
/// is a no-op.

use crate::domain::actor::{ActorBody, InputSnapshot};
use crate::domain::obstacle::{MoverLookup, ObstacleId, ObstacleSet};
use crate::domain::tuning::ActorTuning;
use crate::domain::vec2::Vec2;

use super::event::SimEvent;
use super::motion::MotionSimulator;

pub struct ActorFacade {
    sim: MotionSimulator,
    tracked: Vec<ObstacleId>,
    observers: Vec<Box<dyn FnMut(Vec2)>>,
    death_hook: Option<Box<dyn FnMut()>>,
    is_dead: bool,
    has_cleared: bool,
}

impl ActorFacade {
    pub fn new(body: ActorBody, tuning: ActorTuning) -> Self {
        ActorFacade {
            sim: MotionSimulator::new(body, tuning),
            tracked: Vec::new(),
            observers: Vec::new(),
            death_hook: None,
            is_dead: false,
            has_cleared: false,
        }
    }

    pub fn body(&self) -> &ActorBody {
        &self.sim.body
    }

    pub fn pos(&self) -> Vec2 {
        self.sim.body.pos
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn has_cleared(&self) -> bool {
        self.has_cleared
    }

    pub fn tracked(&self) -> &[ObstacleId] {
        &self.tracked
    }

    /// Register a position observer, called synchronously with every
    /// committed position.
    pub fn observe(&mut self, observer: impl FnMut(Vec2) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Register the one-shot death notification.
    pub fn set_death_hook(&mut self, hook: impl FnMut() + 'static) {
        self.death_hook = Some(Box::new(hook));
    }

    /// Proximity enter. Duplicate enters for the same id are ignored.
    pub fn track(&mut self, id: ObstacleId) {
        if self.is_dead {
            return;
        }
        if !self.tracked.contains(&id) {
            self.tracked.push(id);
        }
    }

    /// Proximity exit. Removing an id that is not tracked is a no-op.
    pub fn untrack(&mut self, id: ObstacleId) {
        if self.is_dead {
            return;
        }
        self.tracked.retain(|&t| t != id);
    }

    pub fn mark_cleared(&mut self) {
        self.has_cleared = true;
    }

    /// Terminal and idempotent: the hook fires on the first call only.
    pub fn die(&mut self) {
        if self.is_dead {
            return;
        }
        self.is_dead = true;
        if let Some(hook) = self.death_hook.as_mut() {
            hook();
        }
    }

    /// Advance one tick. Commits the new position, notifies observers,
    /// then applies a crush death if the step produced one.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        obstacles: &ObstacleSet,
        movers: &dyn MoverLookup,
    ) -> Vec<SimEvent> {
        if self.is_dead {
            return Vec::new();
        }

        let mut events = Vec::new();
        let pos = self.sim.update(dt, input, &self.tracked, obstacles, movers, &mut events);

        for observer in &mut self.observers {
            observer(pos);
        }

        if events.contains(&SimEvent::Died) {
            self.die();
        }
        events
    }
}
