/// Actor state: input snapshot, contact flags, and the simulated body.
///
/// The body is plain data; all per-tick mutation lives in `sim::motion`.

use super::obstacle::ObstacleId;
use super::tuning::ActorTuning;
use super::vec2::Vec2;

/// Per-tick input intents, captured by the input collaborator.
/// `up` and `down` are recorded for completeness; the movement core
/// consumes `left`, `right` and `jump`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    #[allow(dead_code)]
    pub up: bool,
    #[allow(dead_code)]
    pub down: bool,
    pub jump: bool,
}

impl InputSnapshot {
    #[allow(dead_code)]
    pub const NONE: InputSnapshot =
        InputSnapshot { left: false, right: false, up: false, down: false, jump: false };
}

/// Horizontal contact resolved this tick. `Right` means the actor's right
/// side touches an obstacle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HContact {
    #[default]
    None,
    Right,
    Left,
}

/// Vertical contact resolved this tick. `Below` means standing on ground,
/// `Above` means touching a ceiling.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VContact {
    #[default]
    None,
    Above,
    Below,
}

/// The simulated body. Collider clearances are fixed at construction;
/// everything else is mutated once per tick by the motion simulator.
#[derive(Clone, Debug)]
pub struct ActorBody {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub vel: Vec2,

    // Collider clearances from the origin, scale already applied.
    pub clear_up: f32,
    pub clear_down: f32,
    pub clear_right: f32,
    pub clear_left: f32,

    // Contact state from the last collision resolution.
    pub h_contact: HContact,
    pub v_contact: VContact,
    pub contact_h: Option<ObstacleId>,
    pub contact_v: Option<ObstacleId>,

    // Walk charge timers, normalized to [0, 1].
    pub push_left: f32,
    pub push_right: f32,

    // Jump / gravity state.
    pub jump_timer: f32,
    pub is_jumping: bool,
    pub gravity: f32,
    pub consumed_ground_jump: bool,
    pub air_jumps_used: u32,
    pub coyote_timer: f32,
    pub jump_buffered: bool,
    pub extra_jump_timer: f32,
    pub jump_was_held: bool,
}

impl ActorBody {
    /// Build a body from the collider description. `collider_size` is the
    /// full box size; `scale` is the owning transform's local scale and is
    /// applied as an absolute value to both size and offset.
    pub fn new(pos: Vec2, collider_size: Vec2, collider_offset: Vec2, scale: Vec2, tuning: &ActorTuning) -> Self {
        let half = Vec2::new(
            collider_size.x * scale.x.abs() / 2.0,
            collider_size.y * scale.y.abs() / 2.0,
        );
        let offset = Vec2::new(
            collider_offset.x * scale.x.abs(),
            collider_offset.y * scale.y.abs(),
        );

        ActorBody {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            clear_up: half.y + offset.y,
            clear_down: half.y - offset.y,
            clear_right: half.x + offset.x,
            clear_left: half.x - offset.x,
            h_contact: HContact::None,
            v_contact: VContact::None,
            contact_h: None,
            contact_v: None,
            push_left: 0.0,
            push_right: 0.0,
            // Starts "complete": no rise is in progress until a jump begins.
            jump_timer: tuning.max_jump_time,
            is_jumping: false,
            gravity: tuning.init_gravity,
            consumed_ground_jump: false,
            // Spawning in midair grants no free air jumps until first landing.
            air_jumps_used: tuning.max_air_jump_count,
            coyote_timer: 0.0,
            jump_buffered: false,
            extra_jump_timer: 0.0,
            jump_was_held: false,
        }
    }

    pub fn grounded(&self) -> bool {
        self.v_contact == VContact::Below
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearances_from_offset_collider() {
        let tuning = ActorTuning::default();
        let body = ActorBody::new(
            Vec2::ZERO,
            Vec2::new(0.8, 1.2),
            Vec2::new(0.1, -0.2),
            Vec2::new(1.0, 1.0),
            &tuning,
        );
        assert!((body.clear_up - 0.4).abs() < 1e-6);
        assert!((body.clear_down - 0.8).abs() < 1e-6);
        assert!((body.clear_right - 0.5).abs() < 1e-6);
        assert!((body.clear_left - 0.3).abs() < 1e-6);
    }

    #[test]
    fn negative_scale_is_absolute() {
        let tuning = ActorTuning::default();
        let body = ActorBody::new(
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            Vec2::ZERO,
            Vec2::new(-2.0, -2.0),
            &tuning,
        );
        assert!((body.clear_right - 1.0).abs() < 1e-6);
        assert!((body.clear_up - 1.0).abs() < 1e-6);
    }

    #[test]
    fn spawn_state_cannot_air_jump() {
        let tuning = ActorTuning::default();
        let body = ActorBody::new(Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::ZERO, Vec2::new(1.0, 1.0), &tuning);
        assert_eq!(body.air_jumps_used, tuning.max_air_jump_count);
        assert!(!body.grounded());
    }
}
