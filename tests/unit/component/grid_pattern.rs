use super::*;
use crate::{
    animation::ease::Ease,
    config::options::RepeatDelayMode,
    foundation::core::{Generation, GridCoord},
};
use rand::rngs::mock::StepRng;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn quick_options(num_squares: usize) -> GridPatternOptions {
    GridPatternOptions {
        num_squares,
        duration: 1.0,
        stagger: 0.1,
        ease: Ease::Linear,
        initial_opacity: 0.0,
        max_opacity: 0.5,
        seed: Some(42),
        ..GridPatternOptions::default()
    }
}

fn mounted(options: GridPatternOptions, w: f64, h: f64) -> (GridPattern, Surface) {
    let mut surface = Surface::new(Bounds::new(w, h));
    let pattern = GridPattern::mount(options, &mut surface);
    (pattern, surface)
}

#[test]
fn collection_is_empty_until_first_tick() {
    let (pattern, surface) = mounted(GridPatternOptions::default(), 400.0, 400.0);
    assert!(pattern.cells().is_empty());
    assert_eq!(pattern.bounds(), Bounds::ZERO);
    assert_eq!(surface.observer_count(), 1);
}

#[test]
fn first_measurement_populates_and_attaches() {
    let (mut pattern, mut surface) = mounted(GridPatternOptions::default(), 400.0, 400.0);
    let report = pattern.advance(&mut surface, 0.0);
    assert_eq!(report.regenerations, 1);
    assert_eq!(report.attached, 50);
    assert_eq!(pattern.cells().len(), 50);
    assert_eq!(pattern.bounds(), Bounds::new(400.0, 400.0));
}

#[test]
fn single_square_lands_inside_ten_by_ten_grid() {
    for seed in 0..32 {
        let options = GridPatternOptions {
            num_squares: 1,
            seed: Some(seed),
            ..GridPatternOptions::default()
        };
        let (mut pattern, mut surface) = mounted(options, 400.0, 400.0);
        pattern.advance(&mut surface, 0.0);
        let cell = pattern.cells().cells()[0];
        assert!(cell.coord.column < 10);
        assert!(cell.coord.row < 10);
    }
}

#[test]
fn zero_squares_draws_no_rectangles() {
    let (mut pattern, mut surface) = mounted(quick_options(0), 400.0, 400.0);
    pattern.advance(&mut surface, 0.5);
    let frame = pattern.frame();
    assert!(frame.squares.is_empty());
    assert_eq!(frame.bounds, Bounds::new(400.0, 400.0));
}

#[test]
fn unmeasured_surface_keeps_collection_empty() {
    let (mut pattern, mut surface) = mounted(quick_options(5), 0.0, 0.0);
    let report = pattern.advance(&mut surface, 0.1);
    assert_eq!(report.regenerations, 0);
    assert!(pattern.cells().is_empty());

    pattern.set_num_squares(8);
    assert!(pattern.cells().is_empty());

    surface.resize(200.0, 120.0);
    let report = pattern.advance(&mut surface, 0.0);
    assert_eq!(report.regenerations, 1);
    assert_eq!(pattern.cells().len(), 8);
}

#[test]
fn resize_regenerates_every_cell() {
    let (mut pattern, mut surface) = mounted(quick_options(6), 400.0, 400.0);
    pattern.advance(&mut surface, 0.3);
    let before = pattern.cells().generation();

    surface.resize(80.0, 40.0);
    let report = pattern.advance(&mut surface, 0.0);
    assert_eq!(report.regenerations, 1);
    assert_eq!(report.attached, 6);
    assert!(pattern.cells().generation() > before);

    let ids: Vec<u32> = pattern.cells().cells().iter().map(|c| c.id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    for cell in pattern.cells().cells() {
        assert!(cell.coord.column < 2);
        assert_eq!(cell.coord.row, 0);
        assert_eq!(cell.epoch, 0);
    }
}

#[test]
fn collapsing_to_zero_keeps_previous_cells() {
    let (mut pattern, mut surface) = mounted(quick_options(3), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let before = pattern.cells().clone();

    surface.resize(0.0, 400.0);
    let report = pattern.advance(&mut surface, 0.0);
    assert_eq!(report.regenerations, 0);
    assert_eq!(pattern.cells(), &before);
    assert_eq!(pattern.bounds(), Bounds::new(0.0, 400.0));
}

#[test]
fn count_change_regenerates_with_new_ids() {
    let (mut pattern, mut surface) = mounted(quick_options(5), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let before = pattern.cells().generation();

    pattern.set_num_squares(5);
    assert_eq!(pattern.cells().generation(), before);

    pattern.set_num_squares(2);
    assert!(pattern.cells().generation() > before);
    let ids: Vec<u32> = pattern.cells().cells().iter().map(|c| c.id.0).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn cosmetic_option_changes_do_not_regenerate() {
    let (mut pattern, mut surface) = mounted(quick_options(4), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let before = pattern.cells().clone();

    let mut next = pattern.options().clone();
    next.line.color = "red".to_string();
    next.max_opacity = 0.9;
    pattern.set_options(next);
    assert_eq!(pattern.cells(), &before);
    assert_eq!(pattern.options().line.color, "red");

    let mut next = pattern.options().clone();
    next.num_squares = 7;
    pattern.set_options(next);
    assert_eq!(pattern.cells().len(), 7);
}

#[test]
fn cycle_fades_in_out_then_relocates_and_restarts() {
    let (mut pattern, mut surface) = mounted(quick_options(2), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    assert_eq!(pattern.phase(CellId(0)), Some(CellPhase::FadingIn));

    pattern.advance(&mut surface, 0.5);
    let frame = pattern.frame();
    assert!(approx(frame.squares[0].opacity, 0.25));
    assert!(approx(frame.squares[1].opacity, 0.2));

    pattern.advance(&mut surface, 1.0);
    assert_eq!(pattern.phase(CellId(0)), Some(CellPhase::FadingOut));
    assert!(approx(pattern.frame().squares[0].opacity, 0.25));

    let key_before = pattern.frame().squares[0].key.clone();
    let report = pattern.advance(&mut surface, 0.5);
    assert_eq!(report.relocated, vec![CellId(0)]);
    assert_eq!(pattern.phase(CellId(0)), Some(CellPhase::Unpositioned));
    assert_eq!(pattern.phase(CellId(1)), Some(CellPhase::FadingOut));
    assert_eq!(pattern.cells().cells()[0].epoch, 1);
    assert_ne!(pattern.frame().squares[0].key, key_before);
    assert_eq!(pattern.frame().squares[0].opacity, 0.0);

    let report = pattern.advance(&mut surface, 0.2);
    assert_eq!(report.attached, 1);
    assert_eq!(report.relocated, vec![CellId(1)]);
    assert_eq!(pattern.phase(CellId(0)), Some(CellPhase::FadingIn));
    assert_eq!(pattern.stats().relocations, 2);
}

#[test]
fn cells_keep_cycling_indefinitely() {
    let (mut pattern, mut surface) = mounted(quick_options(3), 400.0, 400.0);
    for _ in 0..200 {
        pattern.advance(&mut surface, 0.25);
    }
    // 50 seconds of two-second cycles: every cell must have gone round many times.
    for cell in pattern.cells().cells() {
        assert!(cell.epoch >= 20, "cell {} epoch {}", cell.id.0, cell.epoch);
    }
    assert_eq!(pattern.stats().regenerations, 1);
    assert_eq!(pattern.stats().stale_completions, 0);
}

#[test]
fn stale_completion_after_regeneration_is_ignored() {
    let (mut pattern, mut surface) = mounted(quick_options(3), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let old = TweenTarget {
        cell: CellId(1),
        generation: pattern.cells().generation(),
        epoch: 0,
    };

    surface.resize(600.0, 600.0);
    pattern.advance(&mut surface, 0.0);
    let before = pattern.cells().clone();

    assert!(!pattern.complete(old));
    assert_eq!(pattern.cells(), &before);
    assert_eq!(pattern.stats().stale_completions, 1);
}

#[test]
fn completion_for_replaced_element_is_ignored() {
    let (mut pattern, mut surface) = mounted(quick_options(1), 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let generation = pattern.cells().generation();
    let first = TweenTarget {
        cell: CellId(0),
        generation,
        epoch: 0,
    };

    assert!(pattern.complete(first));
    assert!(!pattern.complete(first));
    assert_eq!(pattern.cells().cells()[0].epoch, 1);
}

#[test]
fn injected_rng_gives_deterministic_coordinates() {
    let mut surface = Surface::new(Bounds::new(400.0, 400.0));
    let mut pattern =
        GridPattern::mount_with_rng(quick_options(3), StepRng::new(u64::MAX, 0), &mut surface);
    pattern.advance(&mut surface, 0.0);
    for cell in pattern.cells().cells() {
        assert_eq!(cell.coord, GridCoord::new(9, 9));
    }
    let rect = pattern.frame().squares[0].rect;
    assert_eq!((rect.x0, rect.y0), (361.0, 361.0));
    assert_eq!((rect.width(), rect.height()), (39.0, 39.0));
}

#[test]
fn repeat_delay_between_halves_extends_the_cycle() {
    let options = GridPatternOptions {
        repeat_delay: 0.5,
        repeat_delay_mode: RepeatDelayMode::BetweenHalves,
        ..quick_options(1)
    };
    let (mut pattern, mut surface) = mounted(options, 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);

    let report = pattern.advance(&mut surface, 2.0);
    assert!(report.relocated.is_empty());
    let report = pattern.advance(&mut surface, 0.5);
    assert_eq!(report.relocated, vec![CellId(0)]);
}

#[test]
fn ignored_repeat_delay_keeps_two_duration_cycle() {
    let options = GridPatternOptions {
        repeat_delay: 5.0,
        ..quick_options(1)
    };
    let (mut pattern, mut surface) = mounted(options, 400.0, 400.0);
    pattern.advance(&mut surface, 0.0);
    let report = pattern.advance(&mut surface, 2.0);
    assert_eq!(report.relocated, vec![CellId(0)]);
}

#[test]
fn zero_duration_relocates_on_next_step() {
    let options = GridPatternOptions {
        duration: 0.0,
        stagger: 0.0,
        ..quick_options(2)
    };
    let (mut pattern, mut surface) = mounted(options, 400.0, 400.0);
    let report = pattern.advance(&mut surface, 0.016);
    assert_eq!(report.relocated, vec![CellId(0), CellId(1)]);
}

#[test]
fn unmount_detaches_observer() {
    let (mut pattern, mut surface) = mounted(quick_options(2), 400.0, 400.0);
    pattern.advance(&mut surface, 1.0);
    let stats = pattern.unmount(&mut surface);
    assert_eq!(surface.observer_count(), 0);
    assert_eq!(stats.regenerations, 1);
}

#[test]
fn pattern_ids_are_unique_per_mount() {
    let (a, _) = mounted(quick_options(1), 10.0, 10.0);
    let (b, _) = mounted(quick_options(1), 10.0, 10.0);
    assert_ne!(a.pattern_id(), b.pattern_id());
    assert_eq!(a.frame().generation, Generation(0));
}

#[test]
fn large_collections_attach_every_square() {
    let (mut pattern, mut surface) = mounted(quick_options(20_000), 4000.0, 4000.0);
    let report = pattern.advance(&mut surface, 0.0);
    assert_eq!(report.attached, 20_000);

    let frame = pattern.frame();
    assert_eq!(frame.squares.len(), 20_000);
    assert!(frame.squares.iter().all(|s| s.phase == CellPhase::FadingIn));
    assert_eq!(pattern.commit(), 0);
}

#[test]
fn oversized_count_is_clamped_instead_of_allocating() {
    let (mut pattern, _surface) = mounted(quick_options(usize::MAX), 400.0, 400.0);
    assert!(pattern.on_resize(Bounds::new(400.0, 400.0)));
    assert_eq!(pattern.cells().len(), MAX_SQUARES);
    assert_eq!(pattern.options().num_squares, usize::MAX);
}
