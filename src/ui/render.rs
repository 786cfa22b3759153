/// Presentation layer: draws committed world state onto the terminal.
///
/// A pure sink — it reads the scene and prints it, feeding nothing back
/// into the simulation. The motion trail is fed through the actor
/// facade's position observer, so the renderer only ever sees committed
/// positions.

use std::io::{self, stdout, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::domain::obstacle::{MotionSource, ObstacleKind};
use crate::domain::vec2::Vec2;
use crate::sim::event::{JumpKind, SimEvent};
use crate::sim::world::{Phase, World};

/// Terminal cells are tall; two columns per world cell looks square-ish.
const SCALE_X: usize = 2;

/// Committed positions kept for the motion trail.
const TRAIL_LEN: usize = 6;

/// Ring buffer of recently committed actor positions.
pub struct PositionTrail {
    ring: [Vec2; TRAIL_LEN],
    idx: usize,
    len: usize,
}

impl PositionTrail {
    pub fn new() -> Self {
        PositionTrail { ring: [Vec2::ZERO; TRAIL_LEN], idx: 0, len: 0 }
    }

    pub fn push(&mut self, pos: Vec2) {
        self.ring[self.idx] = pos;
        self.idx = (self.idx + 1) % TRAIL_LEN;
        self.len = (self.len + 1).min(TRAIL_LEN);
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.idx = 0;
    }

    fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.len).map(move |i| {
            let slot = (self.idx + TRAIL_LEN - self.len + i) % TRAIL_LEN;
            self.ring[slot]
        })
    }
}

pub struct Renderer {
    out: Stdout,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { out: stdout() }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.out, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(
        &mut self,
        world: &World,
        trail: &PositionTrail,
        last_event: Option<SimEvent>,
        deaths: u32,
    ) -> io::Result<()> {
        let cols = world.width as usize * SCALE_X;
        let rows = world.height as usize;
        let mut grid = vec![vec![(' ', Color::Reset); cols]; rows];

        let put = |grid: &mut Vec<Vec<(char, Color)>>, col: i32, row: i32, ch: char, color: Color| {
            if row >= 0 && (row as usize) < rows && col >= 0 && (col as usize) < cols {
                grid[row as usize][col as usize] = (ch, color);
            }
        };

        // Obstacles.
        for (_, ob) in world.obstacles.iter() {
            let (glyph, color) = match (ob.kind, ob.motion) {
                (ObstacleKind::OneWay, _) => ('─', Color::DarkYellow),
                (ObstacleKind::Solid, MotionSource::Governed(_)) => ('▓', Color::Cyan),
                (ObstacleKind::Solid, MotionSource::Tracked) => ('█', Color::Blue),
            };
            let x0 = ((ob.pos.x - ob.half.x) * SCALE_X as f32).round() as i32;
            let x1 = ((ob.pos.x + ob.half.x) * SCALE_X as f32).round() as i32;
            let y0 = (ob.pos.y - ob.half.y).round() as i32;
            let y1 = (ob.pos.y + ob.half.y).round() as i32;
            for wy in y0..y1 {
                let row = rows as i32 - 1 - wy;
                for gx in x0..x1 {
                    put(&mut grid, gx, row, glyph, color);
                }
            }
        }

        // Goals.
        for goal in &world.goals {
            let row = rows as i32 - 1 - goal.y.floor() as i32;
            let col = (goal.x * SCALE_X as f32).floor() as i32;
            put(&mut grid, col - 1, row, '◆', Color::Green);
            put(&mut grid, col, row, '◆', Color::Green);
        }

        // Motion trail (committed positions only), drawn on empty cells.
        for pos in trail.iter() {
            let row = rows as i32 - 1 - pos.y.floor() as i32;
            let col = (pos.x * SCALE_X as f32).floor() as i32;
            let empty = grid
                .get(row.max(0) as usize)
                .and_then(|r| r.get(col.max(0) as usize))
                .map_or(false, |&(ch, _)| ch == ' ');
            if empty {
                put(&mut grid, col, row, '·', Color::DarkGrey);
            }
        }

        // Actor.
        let body = world.player.body();
        let row = rows as i32 - 1 - body.pos.y.floor() as i32;
        let col = (body.pos.x * SCALE_X as f32).floor() as i32;
        let actor_color = match world.phase {
            Phase::Dead => Color::Red,
            Phase::Cleared => Color::Green,
            _ => Color::Yellow,
        };
        put(&mut grid, col - 1, row, '@', actor_color);
        put(&mut grid, col, row, '@', actor_color);

        // Phase banner over the middle of the playfield.
        if let Some(text) = banner(world.phase) {
            let row = rows / 2;
            let start = cols.saturating_sub(text.chars().count()) / 2;
            for (i, ch) in text.chars().enumerate() {
                put(&mut grid, (start + i) as i32, row as i32, ch, Color::White);
            }
        }

        // Emit the grid, grouping runs of one color per row.
        for (y, row) in grid.iter().enumerate() {
            queue!(self.out, MoveTo(0, y as u16))?;
            let mut current = Color::Reset;
            let mut run = String::new();
            for &(ch, color) in row {
                if color != current && !run.is_empty() {
                    queue!(self.out, Print(std::mem::take(&mut run)))?;
                }
                if color != current {
                    queue!(self.out, SetForegroundColor(color))?;
                    current = color;
                }
                run.push(ch);
            }
            queue!(self.out, Print(run), ResetColor)?;
        }

        // HUD.
        let body = world.player.body();
        queue!(
            self.out,
            MoveTo(0, rows as u16),
            Clear(ClearType::CurrentLine),
            Print(format!(
                "{}  tick {:>6}  pos ({:>6.2},{:>6.2})  near {}/{}  deaths {}  {}",
                world.level_name,
                world.tick,
                body.pos.x,
                body.pos.y,
                world.player.tracked().len(),
                world.obstacles.len(),
                deaths,
                event_label(last_event),
            )),
            MoveTo(0, rows as u16 + 1),
            Clear(ClearType::CurrentLine),
            Print("[arrows/AD] walk   [space] jump   [R] restart   [Esc] quit"),
        )?;

        self.out.flush()
    }
}

fn banner(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Title => Some(" BOX RUNNER — press Enter "),
        Phase::Dead => Some(" CRUSHED — [R] restart "),
        Phase::Cleared => Some(" CLEAR! — [N] next  [R] again "),
        Phase::Playing => None,
    }
}

fn event_label(event: Option<SimEvent>) -> &'static str {
    match event {
        Some(SimEvent::Jumped(JumpKind::Ground)) => "jump",
        Some(SimEvent::Jumped(JumpKind::Coyote)) => "coyote jump",
        Some(SimEvent::Jumped(JumpKind::Air)) => "air jump",
        Some(SimEvent::Landed) => "landed",
        Some(SimEvent::CeilingHit) => "bonk",
        Some(SimEvent::Died) => "crushed",
        Some(SimEvent::Cleared) => "clear",
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_keeps_the_newest_positions_in_order() {
        let mut trail = PositionTrail::new();
        for i in 0..10 {
            trail.push(Vec2::new(i as f32, 0.0));
        }
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        trail.clear();
        assert_eq!(trail.iter().count(), 0);
    }

    #[test]
    fn event_labels_are_short() {
        assert_eq!(event_label(Some(SimEvent::Jumped(JumpKind::Coyote))), "coyote jump");
        assert_eq!(event_label(None), "");
    }
}
