use super::*;
use rand::{SeedableRng, rngs::StdRng, rngs::mock::StepRng};

const CELL: f64 = 40.0;

fn square() -> Bounds {
    Bounds::new(400.0, 400.0)
}

#[test]
fn coords_stay_inside_measured_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let bounds = Bounds::new(410.0, 230.0);
    let set = CellSet::generate(&mut rng, Generation(1), 500, bounds, CELL, CELL);
    for cell in set.cells() {
        assert!(cell.coord.column < 10, "column {}", cell.coord.column);
        assert!(cell.coord.row < 5, "row {}", cell.coord.row);
    }
}

#[test]
fn extreme_samples_map_to_first_and_last_cells() {
    let mut low = StepRng::new(0, 0);
    assert_eq!(
        random_coord(&mut low, square(), CELL, CELL),
        GridCoord::new(0, 0)
    );

    let mut high = StepRng::new(u64::MAX, 0);
    assert_eq!(
        random_coord(&mut high, square(), CELL, CELL),
        GridCoord::new(9, 9)
    );
}

#[test]
fn zero_bounds_collapse_to_origin() {
    let mut rng = StdRng::seed_from_u64(1);
    let set = CellSet::generate(&mut rng, Generation(1), 20, Bounds::ZERO, CELL, CELL);
    assert!(set.cells().iter().all(|c| c.coord == GridCoord::new(0, 0)));
}

#[test]
fn zero_cell_size_saturates_without_panicking() {
    let mut rng = StepRng::new(u64::MAX / 2, 0);
    let coord = random_coord(&mut rng, square(), 0.0, -40.0);
    assert_eq!(coord.column, u32::MAX);
    assert_eq!(coord.row, 0);
}

#[test]
fn generate_assigns_sequential_ids() {
    let mut rng = StdRng::seed_from_u64(3);
    let set = CellSet::generate(&mut rng, Generation(4), 50, square(), CELL, CELL);
    assert_eq!(set.len(), 50);
    assert_eq!(set.generation(), Generation(4));
    for (i, cell) in set.cells().iter().enumerate() {
        assert_eq!(cell.id, CellId(i as u32));
        assert_eq!(cell.epoch, 0);
    }
}

#[test]
fn count_change_regenerates_with_fresh_ids() {
    let mut rng = StdRng::seed_from_u64(3);
    let set = CellSet::generate(&mut rng, Generation(1), 5, square(), CELL, CELL);
    assert_eq!(set.len(), 5);

    let set = CellSet::generate(&mut rng, Generation(2), 3, square(), CELL, CELL);
    let ids: Vec<u32> = set.cells().iter().map(|c| c.id.0).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn zero_count_is_empty() {
    let mut rng = StdRng::seed_from_u64(3);
    let set = CellSet::generate(&mut rng, Generation(1), 0, square(), CELL, CELL);
    assert!(set.is_empty());
}

#[test]
fn relocate_touches_only_the_target_cell() {
    let mut rng = StepRng::new(0, 0);
    let mut set = CellSet::generate(&mut rng, Generation(1), 4, square(), CELL, CELL);
    let before = set.clone();

    let mut high = StepRng::new(u64::MAX, 0);
    let moved = set
        .relocate(&mut high, CellId(2), Generation(1), square(), CELL, CELL)
        .unwrap();
    assert_eq!(moved.coord, GridCoord::new(9, 9));
    assert_eq!(moved.epoch, 1);

    assert_eq!(set.len(), before.len());
    for (a, b) in set.cells().iter().zip(before.cells()) {
        if a.id == CellId(2) {
            assert_ne!(a.coord, b.coord);
        } else {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn relocate_from_stale_generation_is_ignored() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut set = CellSet::generate(&mut rng, Generation(2), 4, square(), CELL, CELL);
    let before = set.clone();

    assert!(
        set.relocate(&mut rng, CellId(1), Generation(1), square(), CELL, CELL)
            .is_none()
    );
    assert!(
        set.relocate(&mut rng, CellId(9), Generation(2), square(), CELL, CELL)
            .is_none()
    );
    assert_eq!(set, before);
}

#[test]
fn cell_rect_is_inset_by_one_pixel() {
    let r = cell_rect(GridCoord::new(2, 3), 40.0, 20.0);
    assert_eq!(r.x0, 81.0);
    assert_eq!(r.y0, 61.0);
    assert_eq!(r.width(), 39.0);
    assert_eq!(r.height(), 19.0);
}
