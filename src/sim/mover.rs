/// Path movers: anchors advancing along a closed Bezier loop on a timer.
///
/// Purely decorative motion — no physics. Obstacles governed by a mover
/// inherit its per-tick displacement; the movement core only ever sees
/// that displacement, never the curve.
///
/// The control polygon is treated as a single Bezier of arbitrary degree,
/// closed by looping the last point back to the first, and evaluated by
/// De Casteljau subdivision. A four-point polygon gives the quartic loop
/// the demo levels use.

use crate::domain::obstacle::{MoverId, MoverLookup};
use crate::domain::vec2::Vec2;

pub struct PathMover {
    control: Vec<Vec2>,
    /// Seconds per full lap around the loop.
    period: f32,
    /// Normalized position along the loop, in [0, 1).
    phase: f32,
    anchor: Vec2,
    disp: Vec2,
}

impl PathMover {
    /// `control` needs at least two points; the loop closes automatically.
    pub fn new(control: Vec<Vec2>, period: f32) -> Self {
        let anchor = eval_closed(&control, 0.0);
        PathMover { control, period, phase: 0.0, anchor, disp: Vec2::ZERO }
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn displacement(&self) -> Vec2 {
        self.disp
    }

    /// Advance the anchor along the loop and record the displacement.
    pub fn step(&mut self, dt: f32) {
        if self.period <= 0.0 {
            self.disp = Vec2::ZERO;
            return;
        }
        self.phase = (self.phase + dt / self.period).fract();
        let next = eval_closed(&self.control, self.phase);
        self.disp = next - self.anchor;
        self.anchor = next;
    }
}

/// De Casteljau over the control polygon with the first point appended,
/// so `t = 0` and `t = 1` meet.
fn eval_closed(control: &[Vec2], t: f32) -> Vec2 {
    if control.is_empty() {
        return Vec2::ZERO;
    }
    let mut pts: Vec<Vec2> = control.to_vec();
    pts.push(control[0]);
    let mut n = pts.len();
    while n > 1 {
        for i in 0..n - 1 {
            pts[i] = pts[i] + (pts[i + 1] - pts[i]) * t;
        }
        n -= 1;
    }
    pts[0]
}

/// Arena of movers; governed obstacles resolve displacement by id.
#[derive(Default)]
pub struct MoverSet {
    movers: Vec<PathMover>,
}

impl MoverSet {
    pub fn new() -> Self {
        MoverSet { movers: Vec::new() }
    }

    pub fn insert(&mut self, mover: PathMover) -> MoverId {
        let id = MoverId(self.movers.len() as u32);
        self.movers.push(mover);
        id
    }

    pub fn get(&self, id: MoverId) -> Option<&PathMover> {
        self.movers.get(id.0 as usize)
    }

    /// Advance every mover by one tick.
    pub fn step(&mut self, dt: f32) {
        for mover in &mut self.movers {
            mover.step(dt);
        }
    }
}

impl MoverLookup for MoverSet {
    fn displacement_of(&self, id: MoverId) -> Vec2 {
        self.movers
            .get(id.0 as usize)
            .map(|m| m.displacement())
            .unwrap_or(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_loop() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn curve_is_closed() {
        let pts = square_loop();
        let start = eval_closed(&pts, 0.0);
        let end = eval_closed(&pts, 1.0);
        assert!((start.x - end.x).abs() < 1e-5);
        assert!((start.y - end.y).abs() < 1e-5);
        assert_eq!(start, pts[0]);
    }

    #[test]
    fn midpoint_matches_bernstein_weights() {
        // Closed square loop is a quartic; at t = 0.5 the Bernstein
        // weights are (1,4,6,4,1)/16, giving (2.5, 2.5).
        let mid = eval_closed(&square_loop(), 0.5);
        assert!((mid.x - 2.5).abs() < 1e-5);
        assert!((mid.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn two_point_polygon_degenerates_to_line_and_back() {
        let pts = vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)];
        // Closed quadratic: out along the segment, back to the start.
        let quarter = eval_closed(&pts, 0.25);
        assert!(quarter.x > 0.0 && quarter.x < 2.0);
        assert_eq!(quarter.y, 0.0);
        assert_eq!(eval_closed(&pts, 1.0), Vec2::ZERO);
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut mover = PathMover::new(square_loop(), 2.0);
        let start = mover.anchor();

        let dt: f32 = 1.0 / 60.0;
        let steps = (2.0 / dt).round() as usize;
        let mut total = Vec2::ZERO;
        for _ in 0..steps {
            mover.step(dt);
            total += mover.displacement();
        }
        assert!((mover.anchor().x - start.x).abs() < 1e-2);
        assert!((mover.anchor().y - start.y).abs() < 1e-2);
        assert!(total.x.abs() < 1e-2 && total.y.abs() < 1e-2);
    }

    #[test]
    fn zero_dt_produces_zero_displacement() {
        let mut mover = PathMover::new(square_loop(), 2.0);
        mover.step(0.0);
        assert_eq!(mover.displacement(), Vec2::ZERO);
    }

    #[test]
    fn set_resolves_displacement_by_id() {
        let mut set = MoverSet::new();
        let id = set.insert(PathMover::new(square_loop(), 1.0));
        set.step(0.1);
        let from_set = set.displacement_of(id);
        assert_eq!(from_set, set.get(id).unwrap().displacement());
        // Unknown ids resolve to zero rather than panicking.
        assert_eq!(set.displacement_of(MoverId(99)), Vec2::ZERO);
    }
}
