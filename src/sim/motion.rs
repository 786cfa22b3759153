/// The per-tick movement and collision core — single source of truth.
///
/// ## Update order
///
/// Every tick, while the actor is alive:
///   1. Snapshot the entry position (swept tests compare against it)
///   2. Walk — eased charge timers drive horizontal velocity
///   3. Jump buffer — early presses are remembered briefly
///   4. Jump state machine — ground / coyote / air jumps
///   5. Gravity — eases toward `min_gravity`, fall speed floored
///   6. Integrate — `pos += vel * dt`
///   7. Platform following — ride / push coupling from last tick's contacts
///   8. Collision resolution — swept AABB against the tracked set
///
/// ## Contact model
///
/// One contact per axis per tick. A contact records which side touched
/// and which obstacle resolved it; the reference feeds next tick's
/// platform following. An axis with no contact this scan resets to none.
///
/// ## Crush
///
/// A new contact opposing an already-active contact on the same axis is
/// fatal. The scan stops immediately; the position is not mutated further
/// that tick.

use crate::domain::actor::{ActorBody, HContact, InputSnapshot, VContact};
use crate::domain::obstacle::{MoverLookup, ObstacleId, ObstacleKind, ObstacleSet};
use crate::domain::tuning::ActorTuning;
use crate::domain::vec2::Vec2;

use super::event::{JumpKind, SimEvent};

/// Numerical tolerance for edge contact, keeps resolved positions stable.
const COLLISION_ERROR: f32 = 1e-4;

pub struct MotionSimulator {
    tuning: ActorTuning,
    pub body: ActorBody,
}

impl MotionSimulator {
    pub fn new(body: ActorBody, tuning: ActorTuning) -> Self {
        MotionSimulator { tuning, body }
    }

    /// Advance the actor by one tick. Appends any events to `events` and
    /// returns the committed position.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        tracked: &[ObstacleId],
        obstacles: &ObstacleSet,
        movers: &dyn MoverLookup,
        events: &mut Vec<SimEvent>,
    ) -> Vec2 {
        self.body.prev_pos = self.body.pos;
        self.walk(dt, input);
        self.jump_and_fall(dt, input, events);
        self.body.pos += self.body.vel * dt;
        self.follow_contacts(dt, obstacles, movers);
        self.resolve_collisions(tracked, obstacles, movers, events);
        self.body.jump_was_held = input.jump;
        self.body.pos
    }

    /// Eased walk: a charge timer per direction moves toward 1 while that
    /// direction is held and toward 0 otherwise; the squared difference
    /// gives smooth acceleration rather than linear ramping.
    fn walk(&mut self, dt: f32, input: &InputSnapshot) {
        let t = &self.tuning;
        let b = &mut self.body;
        let charge = dt * 1000.0 / t.acceleration_ms;
        let discharge = dt * 1000.0 / t.deceleration_ms;

        if input.left {
            b.push_left += charge;
            b.push_right -= discharge;
        } else if input.right {
            b.push_right += charge;
            b.push_left -= discharge;
        } else {
            b.push_left -= discharge;
            b.push_right -= discharge;
        }
        b.push_left = b.push_left.clamp(0.0, 1.0);
        b.push_right = b.push_right.clamp(0.0, 1.0);

        let ratio = b.push_right * b.push_right - b.push_left * b.push_left;
        b.vel.x = t.walk_speed * ratio;
    }

    fn jump_and_fall(&mut self, dt: f32, input: &InputSnapshot, events: &mut Vec<SimEvent>) {
        let t = &self.tuning;
        let b = &mut self.body;
        let rising_edge = input.jump && !b.jump_was_held;

        // Buffer early jump presses so one landing just after a press
        // still registers.
        b.extra_jump_timer += dt;
        if rising_edge {
            b.jump_buffered = true;
            b.extra_jump_timer = 0.0;
        }
        if b.extra_jump_timer > t.max_extra_jump_ms * 1e-3 {
            b.jump_buffered = false;
            b.extra_jump_timer = 0.0;
        }

        match b.v_contact {
            VContact::Below => {
                b.gravity = t.init_gravity;
                b.jump_timer = 0.0;
                b.vel.y = 0.0;
                b.is_jumping = false;
                b.consumed_ground_jump = false;
                b.air_jumps_used = 0;
                b.coyote_timer = 0.0;
                if b.jump_buffered {
                    b.jump_buffered = false;
                    b.extra_jump_timer = 0.0;
                    b.is_jumping = true;
                    b.consumed_ground_jump = true;
                    b.vel.y = t.jump_speed;
                    events.push(SimEvent::Jumped(JumpKind::Ground));
                }
            }
            VContact::Above => {
                if b.vel.y > 0.0 {
                    b.vel.y = 0.0;
                    events.push(SimEvent::CeilingHit);
                }
                b.jump_timer = t.max_jump_time;
                b.is_jumping = false;
            }
            VContact::None => {
                if b.coyote_timer < t.max_coyote_ms * 1e-3 {
                    // Still within the grace window after leaving ground.
                    if rising_edge && !b.consumed_ground_jump {
                        b.is_jumping = true;
                        b.consumed_ground_jump = true;
                        b.jump_timer = 0.0;
                        b.vel.y = t.jump_speed;
                        events.push(SimEvent::Jumped(JumpKind::Coyote));
                    }
                    b.coyote_timer += dt;
                } else if rising_edge && b.air_jumps_used < t.max_air_jump_count {
                    b.is_jumping = true;
                    b.air_jumps_used += 1;
                    b.jump_timer = 0.0;
                    b.vel.y = t.jump_speed;
                    events.push(SimEvent::Jumped(JumpKind::Air));
                }
            }
        }

        // Held rise: ascent speed holds until release or the window ends.
        if b.is_jumping && b.jump_timer < t.max_jump_time && input.jump {
            b.jump_timer += dt;
            b.vel.y = t.jump_speed;
        } else {
            b.is_jumping = false;
        }

        // Gravity applies unless standing or rising. Magnitude eases from
        // the landing value toward the floating minimum.
        if !b.grounded() && !b.is_jumping {
            b.gravity = (b.gravity - t.d_gravity * dt).max(t.min_gravity);
            b.vel.y = if b.vel.y > -t.max_fall_speed {
                b.vel.y - b.gravity * dt
            } else {
                -t.max_fall_speed
            };
        }
    }

    /// Ride / push coupling with the obstacles resolved last tick.
    fn follow_contacts(&mut self, dt: f32, obstacles: &ObstacleSet, movers: &dyn MoverLookup) {
        let b = &mut self.body;

        if let Some(id) = b.contact_h {
            if let Some(ob) = obstacles.get(id) {
                let disp = ob.displacement(movers);
                let pushed = (b.h_contact == HContact::Right && disp.x < 0.0)
                    || (b.h_contact == HContact::Left && disp.x > 0.0);
                if pushed {
                    b.pos.x += disp.x;
                }
            }
        }

        if let Some(id) = b.contact_v {
            if let Some(ob) = obstacles.get(id) {
                let disp = ob.displacement(movers);
                match b.v_contact {
                    VContact::Below => {
                        // Ride the platform in both axes, and match its
                        // vertical speed so the next tick does not read as
                        // free fall. A jump started this tick keeps its own
                        // launch velocity.
                        b.pos += disp;
                        if !b.consumed_ground_jump && dt > 0.0 {
                            b.vel.y = disp.y / dt;
                        }
                    }
                    VContact::Above if disp.y < 0.0 => {
                        b.pos.y += disp.y;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Swept AABB resolution against every tracked obstacle.
    fn resolve_collisions(
        &mut self,
        tracked: &[ObstacleId],
        obstacles: &ObstacleSet,
        movers: &dyn MoverLookup,
        events: &mut Vec<SimEvent>,
    ) {
        let b = &mut self.body;
        let was_below = b.v_contact == VContact::Below;

        if tracked.is_empty() {
            b.h_contact = HContact::None;
            b.v_contact = VContact::None;
            b.contact_h = None;
            b.contact_v = None;
            return;
        }

        let mut updated_h = false;
        let mut updated_v = false;

        for &id in tracked {
            let ob = match obstacles.get(id) {
                Some(ob) => ob,
                None => continue,
            };
            if ob.is_degenerate() {
                continue;
            }
            let opos = ob.pos;
            let oprev = ob.prev(movers);
            let half = ob.half;
            // Cross-axis gate shrinks by half the tolerance to avoid
            // corner false positives.
            let shrink = Vec2::new(half.x - COLLISION_ERROR / 2.0, half.y - COLLISION_ERROR / 2.0);

            // Horizontal, solid obstacles only.
            if ob.kind == ObstacleKind::Solid
                && b.pos.y + b.clear_up > opos.y - shrink.y
                && b.pos.y - b.clear_down < opos.y + shrink.y
            {
                if (b.prev_pos.x + b.clear_right) - (oprev.x - half.x) < COLLISION_ERROR
                    && (opos.x - half.x) - (b.pos.x + b.clear_right) < COLLISION_ERROR
                {
                    if b.h_contact == HContact::Left {
                        events.push(SimEvent::Died);
                        return; // crushed
                    }
                    b.pos.x = opos.x - half.x - b.clear_right;
                    b.h_contact = HContact::Right;
                    b.contact_h = Some(id);
                    updated_h = true;
                } else if (oprev.x + half.x) - (b.prev_pos.x - b.clear_left) < COLLISION_ERROR
                    && (b.pos.x - b.clear_left) - (opos.x + half.x) < COLLISION_ERROR
                {
                    if b.h_contact == HContact::Right {
                        events.push(SimEvent::Died);
                        return; // crushed
                    }
                    b.pos.x = opos.x + half.x + b.clear_left;
                    b.h_contact = HContact::Left;
                    b.contact_h = Some(id);
                    updated_h = true;
                }
            }

            // Vertical. Landing from above works for both kinds; ceiling
            // contact only against solid.
            if b.pos.x + b.clear_right > opos.x - shrink.x
                && b.pos.x - b.clear_left < opos.x + shrink.x
            {
                if ob.kind == ObstacleKind::Solid
                    && (b.prev_pos.y + b.clear_up) - (oprev.y - half.y) < COLLISION_ERROR
                    && (opos.y - half.y) - (b.pos.y + b.clear_up) < COLLISION_ERROR
                {
                    if b.v_contact == VContact::Below {
                        events.push(SimEvent::Died);
                        return; // crushed
                    }
                    b.pos.y = opos.y - half.y - b.clear_up;
                    b.v_contact = VContact::Above;
                    b.contact_v = Some(id);
                    updated_v = true;
                } else if (oprev.y + half.y) - (b.prev_pos.y - b.clear_down) < COLLISION_ERROR
                    && (b.pos.y - b.clear_down) - (opos.y + half.y) < COLLISION_ERROR
                {
                    if b.v_contact == VContact::Above {
                        events.push(SimEvent::Died);
                        return; // crushed
                    }
                    b.pos.y = opos.y + half.y + b.clear_down;
                    b.v_contact = VContact::Below;
                    b.contact_v = Some(id);
                    updated_v = true;
                }
            }
        }

        if !updated_h {
            b.h_contact = HContact::None;
            b.contact_h = None;
        }
        if !updated_v {
            b.v_contact = VContact::None;
            b.contact_v = None;
        }

        if !was_below && b.v_contact == VContact::Below {
            events.push(SimEvent::Landed);
        }
    }
}
