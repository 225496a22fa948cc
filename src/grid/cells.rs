use rand::Rng;

use crate::foundation::core::{Bounds, CellId, Generation, GridCoord, Rect};

/// Pick a uniformly random cell inside `bounds`.
///
/// Each axis is `floor(random * dimension / cell_dimension)`. Nothing is checked: zero
/// bounds give `(0, 0)`, and degenerate cell sizes saturate instead of panicking.
pub fn random_coord<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: Bounds,
    cell_width: f64,
    cell_height: f64,
) -> GridCoord {
    let u: f64 = rng.r#gen();
    let v: f64 = rng.r#gen();
    GridCoord {
        column: axis_index(u * bounds.width, cell_width),
        row: axis_index(v * bounds.height, cell_height),
    }
}

fn axis_index(offset: f64, cell: f64) -> u32 {
    // `as` saturates and maps NaN to zero.
    (offset / cell).floor() as u32
}

/// Rectangle drawn for a cell: inset by one pixel so the grid line stays visible.
pub fn cell_rect(coord: GridCoord, cell_width: f64, cell_height: f64) -> Rect {
    let x0 = f64::from(coord.column) * cell_width + 1.0;
    let y0 = f64::from(coord.row) * cell_height + 1.0;
    Rect::new(x0, y0, x0 + cell_width - 1.0, y0 + cell_height - 1.0)
}

/// One animated square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Cell {
    /// Stable identity, reused across relocations.
    pub id: CellId,
    /// Current grid coordinate.
    pub coord: GridCoord,
    /// Number of relocations since the collection was generated.
    pub epoch: u64,
}

/// The full collection of animated cells plus the generation it was built under.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellSet {
    generation: Generation,
    cells: Vec<Cell>,
}

impl CellSet {
    /// An empty collection at generation zero (before the first measurement).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build `count` cells with ids `0..count`, each at a fresh random coordinate.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        generation: Generation,
        count: usize,
        bounds: Bounds,
        cell_width: f64,
        cell_height: f64,
    ) -> Self {
        let cells = (0..count)
            .map(|i| Cell {
                id: CellId(i as u32),
                coord: random_coord(rng, bounds, cell_width, cell_height),
                epoch: 0,
            })
            .collect();
        Self { generation, cells }
    }

    /// Generation this collection was built under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Cells in id order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// The collection holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up a cell by id.
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index()).filter(|c| c.id == id)
    }

    /// Move cell `id` to a fresh random coordinate, leaving every other entry untouched.
    ///
    /// Returns the updated cell, or `None` when `issued_under` is not this collection's
    /// generation or the id is unknown. Either way nothing changes.
    pub fn relocate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        id: CellId,
        issued_under: Generation,
        bounds: Bounds,
        cell_width: f64,
        cell_height: f64,
    ) -> Option<Cell> {
        if issued_under != self.generation {
            return None;
        }
        let cell = self.cells.get_mut(id.index()).filter(|c| c.id == id)?;
        cell.coord = random_coord(rng, bounds, cell_width, cell_height);
        cell.epoch += 1;
        Some(*cell)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/cells.rs"]
mod tests;
