use anyhow::{anyhow, Context, Result};
use glam::Vec2;

/// Parses `"x,y"` into a world position.
pub fn parse_point(s: &str) -> Result<Vec2> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected x,y but got {:?}", s))?;
    let x: f32 = x.trim().parse().with_context(|| format!("bad x in {:?}", s))?;
    let y: f32 = y.trim().parse().with_context(|| format!("bad y in {:?}", s))?;
    Ok(Vec2::new(x, y))
}

/// Parses `"x,y:x,y"` into a (start, goal) pair.
pub fn parse_route(s: &str) -> Result<(Vec2, Vec2)> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected x,y:x,y but got {:?}", s))?;
    Ok((parse_point(a)?, parse_point(b)?))
}

pub fn format_path(path: &[Vec2]) -> String {
    path.iter()
        .map(|p| format!("({},{})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_and_routes() {
        assert_eq!(parse_point("3, 4.5").unwrap(), Vec2::new(3.0, 4.5));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,1").is_err());
        let (s, g) = parse_route("0,6:1,1").unwrap();
        assert_eq!((s, g), (Vec2::new(0.0, 6.0), Vec2::new(1.0, 1.0)));
        assert!(parse_route("0,6").is_err());
    }

    #[test]
    fn formats_waypoints() {
        assert_eq!(format_path(&[Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)]), "(0,1) -> (1,1)");
        assert_eq!(format_path(&[]), "");
    }
}
