//! CLI command implementations.

use std::time::Instant;

use verdure_debug::StateSnapshot;
use verdure_io::{build_solver, validate_scene, SceneConfig, SourceShape};

/// Run a scene from its config file.
pub fn simulate(
    config_path: &str,
    snapshot_path: Option<&str>,
    report_every: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verdure Simulation");
    println!("──────────────────");
    println!("Config: {config_path}");
    println!();

    let scene = SceneConfig::from_path(config_path)?;
    let mut solver = build_solver(&scene)?;

    let particles: usize = solver.bodies().iter().map(|b| b.particle_count()).sum();
    println!("Bodies:       {}", solver.bodies().len());
    println!("Particles:    {particles}");
    println!("Steps:        {} × {:.4}s", scene.steps, scene.dt);
    println!();

    let start = Instant::now();
    let mut broken = 0u32;
    let mut recovered = 0u32;
    let mut max_contacts = 0u32;

    for _ in 0..scene.steps {
        let report = solver.step(scene.dt)?;
        broken += report.broken;
        recovered += report.recovered;
        max_contacts = max_contacts.max(report.body_contacts + report.external_contacts);

        if report_every > 0 && (report.timestep + 1) % report_every as u64 == 0 {
            println!(
                "  step {:>6}  t={:.3}s  broken={:<4} recovered={:<4} contacts={}",
                report.timestep + 1,
                solver.sim_time(),
                report.broken,
                report.recovered,
                report.body_contacts + report.external_contacts,
            );
        }
    }
    let wall_time = start.elapsed().as_secs_f64();

    println!("Wall time:    {wall_time:.3}s");
    println!("Avg step:     {:.3}ms", wall_time * 1000.0 / scene.steps as f64);
    println!("Broken:       {broken}");
    println!("Recovered:    {recovered}");
    println!("Max contacts: {max_contacts}");
    for (i, body) in solver.bodies().iter().enumerate() {
        println!(
            "  body {i}: living ratio {:.3}, KE {:.6e}",
            body.living_ratio(),
            body.kinetic_energy()
        );
    }

    if let Some(path) = snapshot_path {
        StateSnapshot::capture(&solver).write_to(path)?;
        println!();
        println!("Snapshot written to: {path}");
    }

    Ok(())
}

/// Validate a scene file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verdure Validator");
    println!("─────────────────");
    println!();

    let scene = SceneConfig::from_path(path)?;
    match validate_scene(&scene) {
        Ok(()) => {
            println!("✅ Scene is valid ({} bodies, {:.2}s).", scene.bodies.len(), scene.duration());
            for (i, body) in scene.bodies.iter().enumerate() {
                let source = match body.source {
                    SourceShape::Grid { rows, cols } => format!("grid {rows}×{cols}"),
                    SourceShape::Volume { min, max } => format!("volume {min} .. {max}"),
                };
                println!("  body {i}: {source}");
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ Scene validation failed: {e}");
            Err(e.into())
        }
    }
}

/// Inspect a state snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verdure Snapshot Inspector");
    println!("──────────────────────────");
    println!();

    let snapshot = StateSnapshot::read_from(path)?;

    println!("Timestep:     {}", snapshot.timestep);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Bodies:       {}", snapshot.bodies.len());
    println!("Particles:    {}", snapshot.particle_count());
    println!("Broken:       {}", snapshot.broken_count());

    if snapshot.particle_count() > 0 {
        let bounds = snapshot.bounds();
        println!("Y range:      [{:.4}, {:.4}]", bounds.min.y, bounds.max.y);
    }
    for (i, body) in snapshot.bodies.iter().enumerate() {
        let pinned = body.is_static.iter().filter(|&&s| s).count();
        println!(
            "  body {i}: {} particles ({pinned} pinned), living ratio {:.3}, max speed {:.4}m/s",
            body.particle_count(),
            body.living_ratio,
            body.max_speed()
        );
    }

    Ok(())
}
