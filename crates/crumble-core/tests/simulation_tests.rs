//! Whole-world properties of the cell simulation
//!
//! These drive `World` through its public API only: conservation, settling
//! time, lifetimes, chunk activity, determinism and scrolling.

use crumble_core::SimConfig;
use crumble_core::world::World;
use crumble_simulation::MaterialKind;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

fn world(width: usize, height: usize) -> World {
    World::new(SimConfig::with_size(width, height)).unwrap()
}

fn census(world: &World) -> [usize; 9] {
    MaterialKind::ALL.map(|m| world.grid().count(m))
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn test_mass_conserved_for_moving_materials() {
    let mut world = world(64, 64);
    let mut layout = Xoshiro256StarStar::seed_from_u64(7);
    for y in 0..64 {
        for x in 0..64 {
            let material = match layout.gen_range(0..10) {
                0 | 1 => MaterialKind::Sand,
                2 | 3 => MaterialKind::Water,
                4 => MaterialKind::Gas,
                5 => MaterialKind::Stone,
                _ => continue,
            };
            world.set_cell(x, y, material);
        }
    }
    let before = census(&world);

    for _ in 0..300 {
        world.step();
    }

    assert_eq!(census(&world), before);
}

#[test]
fn test_sand_settles_in_exactly_height_ticks() {
    let mut world = world(64, 64);
    let height = 45;
    world.set_cell(10, height, MaterialKind::Sand);

    for _ in 0..height - 1 {
        world.step();
    }
    assert_eq!(world.material_at(10, 1), Some(MaterialKind::Sand));
    assert_eq!(world.material_at(10, 0), Some(MaterialKind::Empty));

    world.step();
    assert_eq!(world.material_at(10, 0), Some(MaterialKind::Sand));
    assert_eq!(world.grid().count(MaterialKind::Sand), 1);
}

#[test]
fn test_sand_sinks_through_water() {
    let mut world = world(16, 16);
    world.fill_rect(0, 0, 16, 4, MaterialKind::Water);
    world.set_cell(8, 10, MaterialKind::Sand);

    for _ in 0..40 {
        world.step();
    }

    assert_eq!(world.material_at(8, 0), Some(MaterialKind::Sand));
    assert_eq!(world.grid().count(MaterialKind::Water), 16 * 4);
}

#[test]
fn test_fire_burns_out_after_its_lifetime() {
    let mut world = world(32, 32);
    // Top row: nothing above to climb into
    world.set_cell(16, 31, MaterialKind::Fire);
    world.set_lifetime(16, 31, 20.0);

    for _ in 0..19 {
        world.step();
        assert_eq!(world.material_at(16, 31), Some(MaterialKind::Fire));
    }
    world.step();
    assert_ne!(world.material_at(16, 31), Some(MaterialKind::Fire));
}

#[test]
fn test_fresh_fire_never_outlives_its_range() {
    let mut world = world(32, 32);
    world.fill_rect(0, 31, 32, 1, MaterialKind::Fire);
    for _ in 0..100 {
        world.step();
    }
    assert_eq!(world.grid().count(MaterialKind::Fire), 0);
}

// ============================================================================
// Chunks
// ============================================================================

#[test]
fn test_resting_chunk_sleeps_and_wakes_on_write() {
    let mut world = world(64, 64);
    world.set_cell(5, 0, MaterialKind::Sand);
    world.step();
    world.step();
    assert!(world.is_chunk_sleeping(0, 0));

    // Written without waking: the sweep must skip it
    if let Some(cell) = world.grid_mut().cell_mut(5, 20) {
        cell.material = MaterialKind::Sand;
    }
    world.step();
    assert_eq!(world.material_at(5, 20), Some(MaterialKind::Sand));
    assert_eq!(world.active_chunk_count(), 0);

    // Any write in the chunk wakes it for the next sweep
    world.set_cell(20, 20, MaterialKind::Stone);
    assert!(!world.is_chunk_sleeping(0, 0));
    world.step();
    assert_eq!(world.material_at(5, 19), Some(MaterialKind::Sand));
}

#[test]
fn test_without_chunking_everything_is_swept() {
    let mut world = world(64, 64);
    world.set_chunk_optimization(false);
    world.set_cell(5, 0, MaterialKind::Sand);
    for _ in 0..3 {
        world.step();
    }
    if let Some(cell) = world.grid_mut().cell_mut(40, 40) {
        cell.material = MaterialKind::Sand;
    }
    world.step();
    assert_eq!(world.material_at(40, 39), Some(MaterialKind::Sand));
    assert_eq!(world.active_chunk_count(), world.total_chunk_count());
}

// ============================================================================
// Explosions
// ============================================================================

fn demolition(seed: u32) -> World {
    let config = SimConfig {
        seed,
        ..SimConfig::with_size(96, 96)
    };
    let mut world = World::new(config).unwrap();
    world.fill_rect(20, 0, 56, 40, MaterialKind::Stone);
    world.fill_rect(30, 40, 36, 6, MaterialKind::Sand);
    world.set_cell(48, 46, MaterialKind::Bomb);
    world.set_lifetime(48, 46, 5.0);
    world
}

#[test]
fn test_explosions_are_deterministic() {
    let mut a = demolition(99);
    let mut b = demolition(99);
    for _ in 0..60 {
        a.step();
        b.step();
    }
    assert_eq!(a.stats().explosions, 1);
    assert!(a.grid().cells() == b.grid().cells());
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn test_bomb_fuse_detonates() {
    let mut world = demolition(5);
    let stone_before = world.grid().count(MaterialKind::Stone);
    for _ in 0..5 {
        world.step();
    }
    assert_eq!(world.stats().explosions, 1);
    assert_eq!(world.grid().count(MaterialKind::Bomb), 0);
    assert!(world.grid().count(MaterialKind::Stone) < stone_before);
    assert!(world.grid().count(MaterialKind::Fire) > 0);
}

#[test]
fn test_blast_fire_dies_down() {
    let mut world = world(64, 64);
    world.explode(32, 32, 6);
    for _ in 0..400 {
        world.step();
    }
    assert_eq!(world.grid().count(MaterialKind::Fire), 0);
}

// ============================================================================
// Scrolling
// ============================================================================

#[test]
fn test_scroll_round_trip() {
    let mut world = world(32, 32);
    let mut layout = Xoshiro256StarStar::seed_from_u64(3);
    for y in 0..32 {
        for x in 0..32 {
            if layout.gen_bool(0.5) {
                world.set_cell(x, y, MaterialKind::Stone);
            }
        }
    }
    world.set_cell(3, 4, MaterialKind::Fire);
    world.set_lifetime(3, 4, 42.0);
    let before: Vec<_> = world.grid().cells().to_vec();

    world.scroll_up(7);

    for y in 0..32 {
        for x in 0..32 {
            let cell = world.get_cell(x, y).unwrap();
            if y < 7 {
                assert_eq!(cell.material, MaterialKind::Empty);
            } else {
                assert_eq!(cell, before[((y - 7) * 32 + x) as usize]);
            }
        }
    }
    assert_eq!(world.get_cell(3, 11).unwrap().lifetime, 42.0);
}

#[test]
fn test_scroll_edge_cases() {
    let mut world = world(16, 16);
    world.fill_rect(0, 0, 16, 16, MaterialKind::Stone);
    world.scroll_up(0);
    assert_eq!(world.grid().count(MaterialKind::Stone), 256);
    world.scroll_up(16);
    assert_eq!(world.grid().count(MaterialKind::Empty), 256);
}
