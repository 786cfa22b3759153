/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by name)
///   2. Built-in embedded levels
///
/// ## Format:
///   Line 1: `# Level Name`
///   Optional: `@ mover WxH PERIOD : x,y x,y ...` (Bezier platform loop,
///   world coordinates, at least two points; the loop closes itself)
///   Remaining lines: map rows, top row first, one world cell per char.
///
/// ## Tile legend:
///   '#' = block (solid)        '=' = plate (solid)
///   '-' = ledge (one-way)      'P' = player spawn
///   'G' = goal                 ' ' = empty
///
/// Horizontal runs of the same tile merge into a single obstacle.

use std::path::PathBuf;

use crate::config::GameConfig;
use crate::domain::obstacle::{Obstacle, ObstacleKind, ObstacleSet};
use crate::domain::vec2::Vec2;

use super::mover::{MoverSet, PathMover};

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    pub movers: Vec<MoverSpec>,
}

/// A scripted platform: full size, seconds per lap, control loop.
#[derive(Clone, Debug)]
pub struct MoverSpec {
    pub size: Vec2,
    pub period: f32,
    pub points: Vec<Vec2>,
}

/// Everything a scene needs, built from a parsed level.
pub struct LevelGeometry {
    pub obstacles: ObstacleSet,
    pub movers: MoverSet,
    pub spawn: Vec2,
    pub goals: Vec<Vec2>,
    pub width: f32,
    pub height: f32,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the level list: `levels/*.txt` if present, embedded otherwise.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let mut defs = Vec::new();

    if config.levels_dir.is_dir() {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&config.levels_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.extension().map_or(false, |x| x == "txt"))
                    .collect()
            })
            .unwrap_or_default();
        paths.sort();

        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(text) => match parse_level(&text) {
                    Ok(def) => defs.push(def),
                    Err(e) => eprintln!("Warning: skipping {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
            }
        }
    }

    if defs.is_empty() {
        defs = EMBEDDED
            .iter()
            .filter_map(|text| match parse_level(text) {
                Ok(def) => Some(def),
                Err(e) => {
                    eprintln!("Warning: embedded level broken: {e}");
                    None
                }
            })
            .collect();
    }

    defs
}

/// Parse one level text into a definition.
pub fn parse_level(text: &str) -> Result<LevelDef, String> {
    let mut name = String::from("Unnamed");
    let mut movers = Vec::new();
    let mut rows: Vec<String> = Vec::new();
    let mut saw_name = false;

    for line in text.trim_end().lines() {
        if !saw_name && line.starts_with('#') && rows.is_empty() {
            name = line.trim_start_matches('#').trim().to_string();
            saw_name = true;
        } else if line.starts_with('@') {
            movers.push(parse_mover(line)?);
        } else {
            rows.push(line.to_string());
        }
    }

    if rows.is_empty() {
        return Err("level has no map rows".into());
    }
    Ok(LevelDef { name, rows, movers })
}

/// Build scene geometry from a definition.
pub fn build_geometry(def: &LevelDef) -> Result<LevelGeometry, String> {
    let mut obstacles = ObstacleSet::new();
    let mut movers = MoverSet::new();
    let mut spawn = None;
    let mut goals = Vec::new();

    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    for spec in &def.movers {
        if spec.points.len() < 2 {
            return Err("mover needs at least two control points".into());
        }
        let id = movers.insert(PathMover::new(spec.points.clone(), spec.period));
        let anchor = movers.get(id).map(|m| m.anchor()).unwrap_or(Vec2::ZERO);
        obstacles.insert(Obstacle::governed(
            ObstacleKind::Solid,
            anchor,
            Vec2::new(spec.size.x / 2.0, spec.size.y / 2.0),
            id,
        ));
    }

    for (r, row) in def.rows.iter().enumerate() {
        // Bottom of this row of cells, in y-up world space.
        let base_y = (height - 1 - r) as f32;
        let mut run: Option<(usize, usize, char)> = None;

        let flush = |run: &mut Option<(usize, usize, char)>, obstacles: &mut ObstacleSet| {
            if let Some((a, b, ch)) = run.take() {
                let half = Vec2::new((b - a + 1) as f32 / 2.0, 0.5);
                let pos = Vec2::new((a + b + 1) as f32 / 2.0, base_y + 0.5);
                let ob = match ch {
                    '-' => Obstacle::one_way(pos, half),
                    _ => Obstacle::solid(pos, half),
                };
                obstacles.insert(ob);
            }
        };

        for (c, ch) in row.chars().enumerate() {
            let tile = match ch {
                '#' | '=' => Some('#'),
                '-' => Some('-'),
                'P' => {
                    spawn = Some(Vec2::new(c as f32 + 0.5, base_y + 0.5));
                    None
                }
                'G' => {
                    goals.push(Vec2::new(c as f32 + 0.5, base_y + 0.5));
                    None
                }
                _ => None,
            };

            match tile {
                Some(t) => {
                    let extends = matches!(run, Some((_, b, rc)) if rc == t && b + 1 == c);
                    if extends {
                        if let Some((_, b, _)) = run.as_mut() {
                            *b = c;
                        }
                    } else {
                        flush(&mut run, &mut obstacles);
                        run = Some((c, c, t));
                    }
                }
                None => flush(&mut run, &mut obstacles),
            }
        }
        flush(&mut run, &mut obstacles);
    }

    let spawn = spawn.ok_or_else(|| "level has no player spawn 'P'".to_string())?;

    Ok(LevelGeometry {
        obstacles,
        movers,
        spawn,
        goals,
        width: width as f32,
        height: height as f32,
    })
}

// ══════════════════════════════════════════════════════════════
// Metadata parsing
// ══════════════════════════════════════════════════════════════

/// `@ mover WxH PERIOD : x,y x,y ...`
fn parse_mover(line: &str) -> Result<MoverSpec, String> {
    let rest = line.trim_start_matches('@').trim();
    let mut parts = rest.split_whitespace();

    match parts.next() {
        Some("mover") => {}
        other => return Err(format!("unknown metadata: {other:?}")),
    }

    let size_tok = parts.next().ok_or("mover: missing size")?;
    let (w, h) = size_tok
        .split_once('x')
        .ok_or("mover: size must be WxH")?;
    let size = Vec2::new(
        w.parse::<f32>().map_err(|e| format!("mover width: {e}"))?,
        h.parse::<f32>().map_err(|e| format!("mover height: {e}"))?,
    );

    let period = parts
        .next()
        .ok_or("mover: missing period")?
        .parse::<f32>()
        .map_err(|e| format!("mover period: {e}"))?;

    if parts.next() != Some(":") {
        return Err("mover: expected ':' before control points".into());
    }

    let mut points = Vec::new();
    for tok in parts {
        let (x, y) = tok.split_once(',').ok_or("mover: point must be x,y")?;
        points.push(Vec2::new(
            x.parse::<f32>().map_err(|e| format!("mover point: {e}"))?,
            y.parse::<f32>().map_err(|e| format!("mover point: {e}"))?,
        ));
    }
    if points.len() < 2 {
        return Err("mover: needs at least two control points".into());
    }

    Ok(MoverSpec { size, period, points })
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[&str] = &[LEVEL_PROVING_GROUND, LEVEL_CRUSHER_HALL];

const LEVEL_PROVING_GROUND: &str = "\
# Proving Ground
@ mover 3x1 6 : 14,4.5 20,4.5 20,7.5 14,7.5


                                 G
                              ########

          ----

   P           ---
  ######
       #
       #          ##
       #          ##              ######
       #          ##
########################################";

const LEVEL_CRUSHER_HALL: &str = "\
# Crusher Hall
@ mover 4x1 5 : 7,6.5 7,2.5
@ mover 3x1 7 : 20,3.5 26,3.5 26,8.5 20,8.5


                                 G
                               #####


     -----

  P
 ####     ####

####################################";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::obstacle::ObstacleKind;

    const SAMPLE: &str = "\
# Test Pit
@ mover 2x1 4 : 3,5 9,5
     P
  ---
#### ###";

    #[test]
    fn parses_name_rows_and_movers() {
        let def = parse_level(SAMPLE).unwrap();
        assert_eq!(def.name, "Test Pit");
        assert_eq!(def.rows.len(), 3);
        assert_eq!(def.movers.len(), 1);
        assert_eq!(def.movers[0].period, 4.0);
        assert_eq!(def.movers[0].points.len(), 2);
    }

    #[test]
    fn geometry_merges_runs_and_places_entities() {
        let def = parse_level(SAMPLE).unwrap();
        let geo = build_geometry(&def).unwrap();

        // 1 governed platform + 1 one-way ledge + 2 solid runs.
        assert_eq!(geo.obstacles.len(), 4);

        let one_way: Vec<_> = geo
            .obstacles
            .iter()
            .filter(|(_, o)| o.kind == ObstacleKind::OneWay)
            .collect();
        assert_eq!(one_way.len(), 1);
        // Ledge spans columns 2..=4 of the middle row (y band 1..2).
        let (_, ledge) = one_way[0];
        assert_eq!(ledge.half, Vec2::new(1.5, 0.5));
        assert_eq!(ledge.pos, Vec2::new(3.5, 1.5));

        // Spawn is the cell center of 'P' in the top row.
        assert_eq!(geo.spawn, Vec2::new(5.5, 2.5));
        assert_eq!(geo.width, 8.0);
        assert_eq!(geo.height, 3.0);
    }

    #[test]
    fn governed_platform_spawns_at_curve_start() {
        let def = parse_level(SAMPLE).unwrap();
        let geo = build_geometry(&def).unwrap();
        let governed: Vec<_> = geo
            .obstacles
            .iter()
            .filter(|(_, o)| matches!(o.motion, crate::domain::obstacle::MotionSource::Governed(_)))
            .collect();
        assert_eq!(governed.len(), 1);
        assert_eq!(governed[0].1.pos, Vec2::new(3.0, 5.0));
        assert_eq!(governed[0].1.half, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn missing_spawn_is_an_error() {
        let def = parse_level("# No Spawn\n####").unwrap();
        assert!(build_geometry(&def).is_err());
    }

    #[test]
    fn bad_mover_lines_are_rejected() {
        assert!(parse_level("# X\n@ mover 2x1 : 1,2 3,4\n#P#").is_err());
        assert!(parse_level("# X\n@ mover 2x1 4 : 1,2\n#P#").is_err());
        assert!(parse_level("# X\n@ teleporter 1x1 4 : 1,2 3,4\n#P#").is_err());
    }

    #[test]
    fn embedded_levels_build_cleanly() {
        for text in EMBEDDED {
            let def = parse_level(text).unwrap();
            let geo = build_geometry(&def).unwrap();
            assert!(geo.obstacles.len() > 3, "{} too sparse", def.name);
            assert!(!geo.goals.is_empty(), "{} has no goal", def.name);
        }
    }
}
