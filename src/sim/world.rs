/// Scene state: obstacles, movers, the player facade, and the run phase.
///
/// Per-tick order mirrors the data flow the movement core expects:
///   1. Advance scripted movers
///   2. Move governed obstacles, recording previous positions
///   3. Proximity trigger — enter/exit events into the facade
///   4. Actor update (the movement core)
///   5. Kill plane and goal checks
///   6. Phase transition

use crate::domain::actor::{ActorBody, InputSnapshot};
use crate::domain::obstacle::{MotionSource, MoverLookup, ObstacleSet};
use crate::domain::tuning::ActorTuning;
use crate::domain::vec2::Vec2;

use super::actor::ActorFacade;
use super::event::SimEvent;
use super::level::{build_geometry, LevelDef};
use super::mover::MoverSet;

/// Actor collider, in world cells.
const ACTOR_SIZE: Vec2 = Vec2::new(0.9, 0.9);
/// Extra reach of the proximity trigger beyond touching distance.
const PROXIMITY_MARGIN: f32 = 1.5;
/// Falling this far below the world floor is fatal.
const KILL_DEPTH: f32 = 6.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Dead,
    Cleared,
}

pub struct World {
    pub obstacles: ObstacleSet,
    pub movers: MoverSet,
    pub player: ActorFacade,
    pub goals: Vec<Vec2>,
    pub width: f32,
    pub height: f32,
    pub phase: Phase,
    pub tick: u64,
    pub level_name: String,
}

impl World {
    pub fn from_level(def: &LevelDef, tuning: &ActorTuning) -> Result<World, String> {
        let geo = build_geometry(def)?;
        let body = ActorBody::new(
            geo.spawn,
            ACTOR_SIZE,
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            tuning,
        );
        Ok(World {
            obstacles: geo.obstacles,
            movers: geo.movers,
            player: ActorFacade::new(body, tuning.clone()),
            goals: geo.goals,
            width: geo.width,
            height: geo.height,
            phase: Phase::Title,
            tick: 0,
            level_name: def.name.clone(),
        })
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Title {
            self.phase = Phase::Playing;
        }
    }

    /// Advance the scene by one tick.
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> Vec<SimEvent> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        self.tick += 1;

        self.movers.step(dt);
        for (_, ob) in self.obstacles.iter_mut() {
            ob.prev_pos = ob.pos;
            if let MotionSource::Governed(id) = ob.motion {
                let disp = self.movers.displacement_of(id);
                ob.pos += disp;
            }
        }

        self.refresh_proximity();

        let mut events = self.player.update(dt, input, &self.obstacles, &self.movers);

        if !self.player.is_dead() && self.player.pos().y < -KILL_DEPTH {
            self.player.die();
            events.push(SimEvent::Died);
        }

        if !self.player.is_dead() && !self.player.has_cleared() && self.touches_goal() {
            self.player.mark_cleared();
            events.push(SimEvent::Cleared);
        }

        if self.player.is_dead() {
            self.phase = Phase::Dead;
        } else if self.player.has_cleared() {
            self.phase = Phase::Cleared;
        }

        events
    }

    /// Expanded-AABB proximity trigger. Obstacles near the actor enter the
    /// tracked set; obstacles that moved away leave it. The facade handles
    /// duplicate enters and absent exits.
    fn refresh_proximity(&mut self) {
        let body = self.player.body();
        let pos = body.pos;
        let reach_r = body.clear_right + PROXIMITY_MARGIN;
        let reach_l = body.clear_left + PROXIMITY_MARGIN;
        let reach_u = body.clear_up + PROXIMITY_MARGIN;
        let reach_d = body.clear_down + PROXIMITY_MARGIN;

        let mut enters = Vec::new();
        let mut exits = Vec::new();
        for (id, ob) in self.obstacles.iter() {
            let near = pos.x + reach_r > ob.pos.x - ob.half.x
                && pos.x - reach_l < ob.pos.x + ob.half.x
                && pos.y + reach_u > ob.pos.y - ob.half.y
                && pos.y - reach_d < ob.pos.y + ob.half.y;
            if near {
                enters.push(id);
            } else {
                exits.push(id);
            }
        }
        for id in exits {
            self.player.untrack(id);
        }
        for id in enters {
            self.player.track(id);
        }
    }

    fn touches_goal(&self) -> bool {
        let b = self.player.body();
        self.goals.iter().any(|g| {
            b.pos.x + b.clear_right > g.x - 0.5
                && b.pos.x - b.clear_left < g.x + 0.5
                && b.pos.y + b.clear_up > g.y - 0.5
                && b.pos.y - b.clear_down < g.y + 0.5
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_level;

    const DT: f32 = 1.0 / 60.0;

    fn world_from(text: &str) -> World {
        let def = parse_level(text).unwrap();
        let mut world = World::from_level(&def, &ActorTuning::default()).unwrap();
        world.start();
        world
    }

    #[test]
    fn proximity_tracks_nearby_obstacles_only() {
        // A floor under the spawn and a far-away island.
        let mut world = world_from("# Prox\nP\n###                 ###");
        world.step(DT, &InputSnapshot::NONE);
        assert!(!world.player.tracked().is_empty(), "nearby floor is tracked");
        assert!(
            world.player.tracked().len() < world.obstacles.len(),
            "distant obstacles stay untracked"
        );
    }

    #[test]
    fn falling_out_of_the_world_is_fatal() {
        // No floor under the spawn at all.
        let mut world = world_from("# Pit\nP\n   ###");
        let mut died = false;
        for _ in 0..600 {
            let events = world.step(DT, &InputSnapshot::NONE);
            if events.contains(&SimEvent::Died) {
                died = true;
                break;
            }
        }
        assert!(died);
        assert_eq!(world.phase, Phase::Dead);
        // A dead scene is inert.
        assert!(world.step(DT, &InputSnapshot::NONE).is_empty());
    }

    #[test]
    fn reaching_the_goal_clears_the_run() {
        let mut world = world_from("# Goal\nP G\n####");
        let right = InputSnapshot { right: true, ..InputSnapshot::NONE };
        let mut cleared = false;
        for _ in 0..120 {
            let events = world.step(DT, &right);
            if events.contains(&SimEvent::Cleared) {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert_eq!(world.phase, Phase::Cleared);
        assert!(world.player.has_cleared());
    }

    #[test]
    fn governed_platforms_move_with_their_mover() {
        let text = "# M\n@ mover 2x1 2 : 8,5 12,5 12,8 8,8\nP\n###";
        let mut world = world_from(text);
        let start = world
            .obstacles
            .iter()
            .find(|(_, o)| matches!(o.motion, MotionSource::Governed(_)))
            .map(|(_, o)| o.pos)
            .unwrap();

        for _ in 0..30 {
            world.step(DT, &InputSnapshot::NONE);
        }
        let now = world
            .obstacles
            .iter()
            .find(|(_, o)| matches!(o.motion, MotionSource::Governed(_)))
            .map(|(_, o)| o.pos)
            .unwrap();
        assert_ne!(start, now, "platform advances along its loop");
    }

    #[test]
    fn title_phase_does_not_simulate() {
        let def = parse_level("# T\nP\n###").unwrap();
        let mut world = World::from_level(&def, &ActorTuning::default()).unwrap();
        let before = world.player.pos();
        assert!(world.step(DT, &InputSnapshot::NONE).is_empty());
        assert_eq!(world.player.pos(), before);
        assert_eq!(world.tick, 0);
    }
}
