//! Stress benchmark: sand and fire rained onto an empty grid

use std::fmt::Write as _;

use rand::Rng;
use web_time::Instant;

use crumble_core::world::World;
use crumble_simulation::MaterialKind;

/// Benchmark settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchConfig {
    pub ticks: u64,
    /// Leading ticks left out of the min/max rates
    pub warmup_ticks: u64,
    /// Half-size of the square brush dropped each tick
    pub brush_half: i32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            ticks: 1000,
            warmup_ticks: 25,
            brush_half: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub ticks: u64,
    pub total_secs: f64,
    pub avg_tps: f64,
    pub min_tps: f64,
    pub max_tps: f64,
    pub avg_active_chunks: f64,
    pub total_chunks: usize,
    pub chunking: bool,
}

impl BenchReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Benchmark ===");
        let _ = writeln!(out, "Chunking:       {}", if self.chunking { "on" } else { "off" });
        let _ = writeln!(out, "Ticks:          {}", self.ticks);
        let _ = writeln!(out, "Duration:       {:.2}s", self.total_secs);
        let _ = writeln!(out, "Avg ticks/s:    {:.1}", self.avg_tps);
        let _ = writeln!(out, "Min ticks/s:    {:.1}", self.min_tps);
        let _ = writeln!(out, "Max ticks/s:    {:.1}", self.max_tps);
        let _ = writeln!(
            out,
            "Active chunks:  {:.1} / {}",
            self.avg_active_chunks, self.total_chunks
        );
        let _ = writeln!(out, "=================");
        out
    }
}

/// Drop an 11x11 (by default) block of sand or fire at a random column near
/// the top of the grid
fn drop_brush(world: &mut World, half: i32) {
    let (w, h) = (world.width() as i32, world.height() as i32);
    let margin = (half + 15).min(w / 2 - 1).max(0);
    let rng = world.rng_mut();
    let cx = rng.gen_range(margin..(w - margin).max(margin + 1));
    let material = if rng.r#gen::<f32>() > 0.5 {
        MaterialKind::Sand
    } else {
        MaterialKind::Fire
    };
    let cy = h - 10;
    world.fill_rect(cx - half, cy - half, 2 * half + 1, 2 * half + 1, material);
}

/// Clear the grid and run the stress load for `config.ticks` ticks
pub fn run(world: &mut World, config: &BenchConfig) -> BenchReport {
    log::info!("Benchmark started: {} ticks", config.ticks);
    world.clear();

    let mut total_secs = 0.0;
    let mut min_tps = f64::MAX;
    let mut max_tps = 0.0f64;
    let mut active_sum = 0usize;

    for tick in 0..config.ticks {
        let start = Instant::now();
        drop_brush(world, config.brush_half);
        world.step();
        let secs = start.elapsed().as_secs_f64().max(1e-9);

        total_secs += secs;
        active_sum += world.active_chunk_count();
        if tick >= config.warmup_ticks {
            let tps = 1.0 / secs;
            min_tps = min_tps.min(tps);
            max_tps = max_tps.max(tps);
        }
    }

    if min_tps == f64::MAX {
        min_tps = 0.0;
    }
    let ticks = config.ticks.max(1) as f64;
    let report = BenchReport {
        ticks: config.ticks,
        total_secs,
        avg_tps: if total_secs > 0.0 { config.ticks as f64 / total_secs } else { 0.0 },
        min_tps,
        max_tps,
        avg_active_chunks: active_sum as f64 / ticks,
        total_chunks: world.total_chunk_count(),
        chunking: world.config().use_chunk_optimization,
    };
    log::info!("Benchmark finished: {:.1} ticks/s", report.avg_tps);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumble_core::SimConfig;

    #[test]
    fn test_bench_reports_rates() {
        let mut world = World::new(SimConfig::with_size(128, 128)).unwrap();
        let config = BenchConfig {
            ticks: 40,
            warmup_ticks: 5,
            ..BenchConfig::default()
        };
        let report = run(&mut world, &config);
        assert_eq!(report.ticks, 40);
        assert!(report.avg_tps > 0.0);
        assert!(report.min_tps <= report.max_tps);
        assert!(report.avg_active_chunks > 0.0);
        assert!(report.avg_active_chunks <= report.total_chunks as f64);
        assert!(report.render().contains("Ticks:          40"));
    }

    #[test]
    fn test_brush_lands_near_top() {
        let mut world = World::new(SimConfig::with_size(64, 64)).unwrap();
        drop_brush(&mut world, 5);
        let filled = world.grid().count(MaterialKind::Sand) + world.grid().count(MaterialKind::Fire);
        assert_eq!(filled, 121);
        for x in 0..64 {
            assert_eq!(world.material_at(x, 40), Some(MaterialKind::Empty));
        }
    }
}
