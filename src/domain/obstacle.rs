/// Obstacles: axis-aligned boxes the actor collides with.
///
/// ## Motion sources
///
/// An obstacle's per-tick displacement comes from exactly one source,
/// chosen at setup and immutable afterwards:
///   - `Tracked`  — own position pair (current minus previous). Static
///     obstacles simply never move, so their displacement stays zero.
///   - `Governed` — inherited from a path mover, looked up by id in the
///     mover arena. Used for blocks riding a scripted platform chain;
///     the scene moves the obstacle by the mover's displacement each
///     tick, and the getter delegates rather than recomputing locally.
///
/// `prev()` is always `pos - displacement`, which keeps the swept
/// collision tests consistent for both sources.

use super::vec2::Vec2;

/// Identity of an obstacle within an [`ObstacleSet`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObstacleId(u32);

/// Identity of a path mover within the mover arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MoverId(pub u32);

/// Resolves a governing mover's per-tick displacement.
/// Implemented by the sim's mover arena; tests use lightweight stubs.
pub trait MoverLookup {
    fn displacement_of(&self, id: MoverId) -> Vec2;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObstacleKind {
    /// Blocks all four sides.
    Solid,
    /// Blocks only landing from above; passable sideways and from below.
    OneWay,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MotionSource {
    Tracked,
    Governed(MoverId),
}

#[derive(Clone, Debug)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Half extents, already scaled by absolute local scale.
    pub half: Vec2,
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub motion: MotionSource,
}

impl Obstacle {
    pub fn solid(pos: Vec2, half: Vec2) -> Self {
        Obstacle { kind: ObstacleKind::Solid, half, pos, prev_pos: pos, motion: MotionSource::Tracked }
    }

    pub fn one_way(pos: Vec2, half: Vec2) -> Self {
        Obstacle { kind: ObstacleKind::OneWay, half, pos, prev_pos: pos, motion: MotionSource::Tracked }
    }

    pub fn governed(kind: ObstacleKind, pos: Vec2, half: Vec2, mover: MoverId) -> Self {
        Obstacle { kind, half, pos, prev_pos: pos, motion: MotionSource::Governed(mover) }
    }

    /// Per-tick displacement: own motion or the governing mover's.
    pub fn displacement(&self, movers: &dyn MoverLookup) -> Vec2 {
        match self.motion {
            MotionSource::Tracked => self.pos - self.prev_pos,
            MotionSource::Governed(id) => movers.displacement_of(id),
        }
    }

    /// Position at the start of the tick, derived from the displacement.
    pub fn prev(&self, movers: &dyn MoverLookup) -> Vec2 {
        self.pos - self.displacement(movers)
    }

    /// Zero or negative extents never match any collision test.
    pub fn is_degenerate(&self) -> bool {
        self.half.x <= 0.0 || self.half.y <= 0.0
    }
}

/// Arena of obstacles; ids are stable for the lifetime of a level.
#[derive(Default)]
pub struct ObstacleSet {
    items: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        ObstacleSet { items: Vec::new() }
    }

    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = ObstacleId(self.items.len() as u32);
        self.items.push(obstacle);
        id
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.items.get(id.0 as usize)
    }

    #[allow(dead_code)]
    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.items.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.items.iter().enumerate().map(|(i, o)| (ObstacleId(i as u32), o))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObstacleId, &mut Obstacle)> {
        self.items.iter_mut().enumerate().map(|(i, o)| (ObstacleId(i as u32), o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubMovers(Vec2);
    impl MoverLookup for StubMovers {
        fn displacement_of(&self, _id: MoverId) -> Vec2 {
            self.0
        }
    }

    #[test]
    fn tracked_displacement_from_position_pair() {
        let movers = StubMovers(Vec2::ZERO);
        let mut ob = Obstacle::solid(Vec2::new(3.0, 1.0), Vec2::new(1.0, 0.5));
        assert_eq!(ob.displacement(&movers), Vec2::ZERO);

        ob.prev_pos = ob.pos;
        ob.pos += Vec2::new(0.25, 0.0);
        assert_eq!(ob.displacement(&movers), Vec2::new(0.25, 0.0));
        assert_eq!(ob.prev(&movers), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn governed_displacement_delegates_to_mover() {
        let movers = StubMovers(Vec2::new(0.0, -0.5));
        let ob = Obstacle::governed(
            ObstacleKind::Solid,
            Vec2::new(5.0, 4.0),
            Vec2::new(1.5, 0.5),
            MoverId(0),
        );
        assert_eq!(ob.displacement(&movers), Vec2::new(0.0, -0.5));
        assert_eq!(ob.prev(&movers), Vec2::new(5.0, 4.5));
    }

    #[test]
    fn degenerate_extents_detected() {
        let flat = Obstacle::solid(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!(flat.is_degenerate());
        let ok = Obstacle::solid(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert!(!ok.is_degenerate());
    }

    #[test]
    fn set_ids_are_stable() {
        let mut set = ObstacleSet::new();
        let a = set.insert(Obstacle::solid(Vec2::ZERO, Vec2::new(1.0, 1.0)));
        let b = set.insert(Obstacle::one_way(Vec2::new(4.0, 0.0), Vec2::new(2.0, 0.5)));
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(b).unwrap().kind, ObstacleKind::OneWay);
    }
}
