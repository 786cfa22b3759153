/// Immutable per-actor movement constants.
///
/// Loaded once from the `[tuning]` table in `config.toml`; a partial or
/// missing table falls back to the defaults below. Distances are in world
/// cells, speeds in cells per second, gravity in cells per second squared.
/// Fields named `*_ms` are milliseconds to match how short grace windows
/// are usually tuned.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ActorTuning {
    /// Full walk speed once the acceleration timer is charged.
    pub walk_speed: f32,
    /// Vertical speed held while a jump rise is active.
    pub jump_speed: f32,
    /// Falling speed floor (applied as `-max_fall_speed`).
    pub max_fall_speed: f32,
    /// Gravity right after leaving the ground or ending a rise.
    pub init_gravity: f32,
    /// Gravity eases down to this value while airborne.
    pub min_gravity: f32,
    /// Easing rate from `init_gravity` toward `min_gravity`, per second.
    pub d_gravity: f32,
    /// Maximum duration of a held jump rise, in seconds.
    pub max_jump_time: f32,
    /// Time to charge the walk timer from 0 to 1.
    pub acceleration_ms: f32,
    /// Time to discharge the walk timer from 1 to 0.
    pub deceleration_ms: f32,
    /// Grace window for jumping after walking off an edge.
    pub max_coyote_ms: f32,
    /// How long an early jump press stays buffered before landing.
    pub max_extra_jump_ms: f32,
    /// Number of mid-air jumps allowed between landings.
    pub max_air_jump_count: u32,
}

impl Default for ActorTuning {
    fn default() -> Self {
        ActorTuning {
            walk_speed: 8.0,
            jump_speed: 11.0,
            max_fall_speed: 16.0,
            init_gravity: 30.0,
            min_gravity: 22.0,
            d_gravity: 12.0,
            max_jump_time: 0.32,
            acceleration_ms: 120.0,
            deceleration_ms: 80.0,
            max_coyote_ms: 100.0,
            max_extra_jump_ms: 120.0,
            max_air_jump_count: 1,
        }
    }
}
