use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::models::Cell;

/// Immutable description of one map: row-major heights, nonzero means blocked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridModel {
    pub width: usize,
    pub height: usize,
    pub heights: Vec<f32>,
}

impl GridModel {
    pub fn new(width: usize, height: usize, heights: Vec<f32>) -> Result<Self> {
        let grid = Self { width, height, heights };
        grid.validate()?;
        Ok(grid)
    }

    pub fn open(width: usize, height: usize) -> Result<Self> {
        Self::new(width, height, vec![0.0; width * height])
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("grid must have nonzero dimensions, got {}x{}", self.width, self.height);
        }
        if self.width > i32::MAX as usize || self.height > i32::MAX as usize {
            bail!("grid dimensions {}x{} exceed the cell coordinate range", self.width, self.height);
        }
        if self.heights.len() != self.width * self.height {
            bail!(
                "grid {}x{} expects {} heights, got {}",
                self.width,
                self.height,
                self.width * self.height,
                self.heights.len()
            );
        }
        Ok(())
    }

    /// ASCII map: `.` is open, `#` or a digit 1-9 is blocked (the digit is kept as height).
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = rows.first() else { bail!("empty ASCII grid") };
        let width = first.chars().count();
        let mut heights = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                bail!("row {} has {} cells, expected {}", y, row.chars().count(), width);
            }
            for (x, ch) in row.chars().enumerate() {
                let h = match ch {
                    '.' | '0' => 0.0,
                    '#' => 1.0,
                    d @ '1'..='9' => d.to_digit(10).unwrap_or(1) as f32,
                    other => bail!("unexpected character {:?} at ({}, {})", other, x, y),
                };
                heights.push(h);
            }
        }
        Self::new(width, rows.len(), heights)
    }

    /// JSON (`.json`) or ASCII (anything else).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read grid {}", path.display()))?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            let grid: GridModel = serde_json::from_str(&text)
                .with_context(|| format!("parse JSON grid {}", path.display()))?;
            grid.validate()?;
            Ok(grid)
        } else {
            Self::from_ascii(&text).with_context(|| format!("parse ASCII grid {}", path.display()))
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    pub fn index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    /// Integer height the way nodes store it (truncated).
    pub fn height_at(&self, cell: Cell) -> i32 {
        self.heights[self.index(cell)] as i32
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.height_at(cell) != 0
    }

    pub fn set_height(&mut self, cell: Cell, height: f32) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            self.heights[idx] = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn rejects_mismatched_heights() {
        assert!(GridModel::new(3, 2, vec![0.0; 5]).is_err());
        assert!(GridModel::new(0, 2, Vec::new()).is_err());
        assert!(GridModel::new(3, 2, vec![0.0; 6]).is_ok());
    }

    #[test]
    fn parses_ascii_rows() -> Result<()> {
        let grid = GridModel::from_ascii(
            "
            ..#
            2..
            ",
        )?;
        assert_eq!((grid.width, grid.height), (3, 2));
        assert!(grid.is_blocked(Cell::new(2, 0)));
        assert_eq!(grid.height_at(Cell::new(0, 1)), 2);
        assert!(!grid.is_blocked(Cell::new(1, 1)));
        assert!(grid.is_blocked(Cell::new(3, 0)));
        Ok(())
    }

    #[test]
    fn ascii_rejects_ragged_rows() {
        assert!(GridModel::from_ascii("...\n..").is_err());
        assert!(GridModel::from_ascii("..x").is_err());
    }

    #[test]
    fn loads_json_and_ascii_files() -> Result<()> {
        let mut json = Builder::new().suffix(".json").tempfile()?;
        write!(json, r#"{{"width":2,"height":2,"heights":[0,1,0,0]}}"#)?;
        let grid = GridModel::load(json.path())?;
        assert!(grid.is_blocked(Cell::new(1, 0)));

        let mut ascii = Builder::new().suffix(".txt").tempfile()?;
        writeln!(ascii, ".#")?;
        writeln!(ascii, "..")?;
        assert_eq!(GridModel::load(ascii.path())?, grid);
        Ok(())
    }
}
