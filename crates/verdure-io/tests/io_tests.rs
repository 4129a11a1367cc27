//! Integration tests for verdure-io.

use approx::assert_relative_eq;
use verdure_contact::BroadPhase;
use verdure_io::{build_body, build_solver, validate_scene, SceneBody, SceneConfig, SourceShape};
use verdure_math::{Aabb, Vec3};
use verdure_types::VerdureError;

const HANGING_SHEET: &str = r#"
dt = 0.02
steps = 50
body_collisions = true
broad_phase = "spatial_hash"

[solver]
solver_iterations = 8
apply_gravity = true

[[bodies]]
source = { kind = "grid", rows = 4, cols = 4 }
translation = [0.0, 2.0, 0.0]
static_region = { min = [-1.0, 1.5, -1.0], max = [1.0, 2.5, -0.35] }

[bodies.config]
particle_radius = 0.1
stretch_stiffness = 1.0

[[bodies]]
source = { kind = "volume", min = [-0.3, 0.0, -0.3], max = [0.3, 0.6, 0.3] }

[bodies.config]
particle_radius = 0.1
"#;

fn grid_scene() -> SceneConfig {
    SceneConfig {
        bodies: vec![SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 })],
        ..Default::default()
    }
}

// ─── Contract Tests ───────────────────────────────────────────

#[test]
fn scene_defaults() {
    let scene = SceneConfig::default();
    assert_eq!(scene.steps, 120);
    assert!(!scene.body_collisions);
    assert_eq!(scene.broad_phase, BroadPhase::BruteForce);
    assert!(scene.bodies.is_empty());
    assert_relative_eq!(scene.duration(), scene.dt * 120.0);
}

#[test]
fn scene_parses_from_toml() {
    let scene = SceneConfig::from_toml_str(HANGING_SHEET).unwrap();
    assert_relative_eq!(scene.dt, 0.02);
    assert_eq!(scene.steps, 50);
    assert_eq!(scene.solver.solver_iterations, 8);
    // Unspecified solver fields keep their defaults.
    assert_eq!(scene.solver.collision_iterations, 2);
    assert_eq!(scene.broad_phase, BroadPhase::SpatialHash);
    assert_eq!(scene.bodies.len(), 2);

    let sheet = &scene.bodies[0];
    assert_eq!(sheet.source, SourceShape::Grid { rows: 4, cols: 4 });
    assert_eq!(sheet.translation, Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(sheet.rotation, Vec3::ZERO);
    assert!(sheet.static_region.is_some());
    assert_relative_eq!(sheet.config.stretch_stiffness, 1.0);
    assert_relative_eq!(sheet.config.bend_stiffness, 0.5);

    assert!(matches!(scene.bodies[1].source, SourceShape::Volume { .. }));
}

#[test]
fn scene_toml_round_trip() {
    let scene = SceneConfig::from_toml_str(HANGING_SHEET).unwrap();
    let text = scene.to_toml_string().unwrap();
    assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), scene);
}

#[test]
fn scene_json_round_trip() {
    let scene = grid_scene();
    let json = serde_json::to_string(&scene).unwrap();
    let recovered: SceneConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, scene);
}

#[test]
fn malformed_toml_is_a_serialization_error() {
    let err = SceneConfig::from_toml_str("dt = \"fast\"").unwrap_err();
    assert!(matches!(err, VerdureError::Serialization(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SceneConfig::from_path("/nonexistent/scene.toml").unwrap_err();
    assert!(matches!(err, VerdureError::Io(_)));
}

// ─── Validator Tests ──────────────────────────────────────────

#[test]
fn valid_scene_passes() {
    assert!(validate_scene(&grid_scene()).is_ok());
    assert!(validate_scene(&SceneConfig::from_toml_str(HANGING_SHEET).unwrap()).is_ok());
}

#[test]
fn bad_timestep_rejected() {
    for dt in [0.0, -0.01, 2.0, f64::NAN] {
        let scene = SceneConfig {
            dt,
            ..grid_scene()
        };
        assert!(
            matches!(validate_scene(&scene), Err(VerdureError::InvalidConfig(_))),
            "dt = {dt}"
        );
    }
}

#[test]
fn empty_scene_rejected() {
    assert!(validate_scene(&SceneConfig::default()).is_err());
    let scene = SceneConfig {
        steps: 0,
        ..grid_scene()
    };
    assert!(validate_scene(&scene).is_err());
}

#[test]
fn solver_config_is_validated() {
    let mut scene = grid_scene();
    scene.solver.solver_iterations = 0;
    assert!(validate_scene(&scene).is_err());
}

#[test]
fn body_errors_name_the_body() {
    let mut scene = grid_scene();
    scene
        .bodies
        .push(SceneBody::new(SourceShape::Grid { rows: 0, cols: 3 }));

    let err = validate_scene(&scene).unwrap_err();
    assert!(err.to_string().contains("Body 1"), "{err}");
}

#[test]
fn invalid_scene_bodies_rejected() {
    let inverted = SceneBody::new(SourceShape::Volume {
        min: Vec3::ONE,
        max: Vec3::ZERO,
    });
    let mut heavy = SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 });
    heavy.config.particle_mass = -1.0;
    let mut tilted = SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 });
    tilted.rotation = Vec3::new(f64::INFINITY, 0.0, 0.0);
    let mut pinned = SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 });
    pinned.static_region = Some(Aabb::empty());

    for body in [inverted, heavy, tilted, pinned] {
        let scene = SceneConfig {
            bodies: vec![body.clone()],
            ..Default::default()
        };
        assert!(validate_scene(&scene).is_err(), "{body:?}");
    }
}

// ─── Builder Tests ────────────────────────────────────────────

#[test]
fn grid_body_is_cloth() {
    let mut entry = SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 });
    entry.translation = Vec3::new(0.0, 1.0, 0.0);
    let body = build_body(&entry).unwrap();

    assert_eq!(body.particle_count(), 9);
    // 12 structural + 8 shear distance constraints, 6 bending.
    assert_eq!(body.live_constraints().len(), 26);
    assert_eq!(body.total_bending_count(), 6);
    assert!(body
        .particles
        .positions
        .iter()
        .all(|p| (p.y - 1.0).abs() < 1e-12));
}

#[test]
fn thick_volume_is_deformable() {
    let mut entry = SceneBody::new(SourceShape::Volume {
        min: Vec3::ZERO,
        max: Vec3::splat(0.65),
    });
    entry.config.particle_radius = 0.1;
    let body = build_body(&entry).unwrap();

    assert_eq!(body.particle_count(), 27);
    assert_eq!(body.total_bending_count(), 0);
    assert!(!body.live_constraints().is_empty());
}

#[test]
fn thin_volume_is_cloth() {
    let mut entry = SceneBody::new(SourceShape::Volume {
        min: Vec3::ZERO,
        max: Vec3::new(0.65, 0.25, 0.65),
    });
    entry.config.particle_radius = 0.1;
    let body = build_body(&entry).unwrap();
    // One particle thick: a 3x3-cell plane spanning the footprint.
    assert_eq!(body.particle_count(), 16);
    assert!(body.total_bending_count() > 0);
}

#[test]
fn static_region_pins_in_world_space() {
    let mut entry = SceneBody::new(SourceShape::Grid { rows: 2, cols: 2 });
    entry.config.particle_radius = 0.5;
    entry.translation = Vec3::new(10.0, 0.0, 0.0);
    // Row of particles at z = -1 after translation.
    entry.static_region =
        Some(Aabb::new(Vec3::new(8.0, -1.0, -1.5), Vec3::new(12.0, 1.0, -0.5)).unwrap());
    let body = build_body(&entry).unwrap();

    assert_eq!(body.particles.is_static.iter().filter(|&&s| s).count(), 3);
    assert_eq!(body.static_constraints().len(), 3);
}

#[test]
fn build_solver_registers_bodies_and_stages() {
    let scene = SceneConfig::from_toml_str(HANGING_SHEET).unwrap();
    let solver = build_solver(&scene).unwrap();
    assert_eq!(solver.bodies().len(), 2);
    assert_eq!(solver.collision_stage_names(), vec!["body_collision"]);
    assert_eq!(solver.forces().len(), 1);
}

#[test]
fn build_solver_rejects_invalid_scene() {
    assert!(build_solver(&SceneConfig::default()).is_err());
}

#[test]
fn built_scene_steps() {
    let scene = SceneConfig::from_toml_str(HANGING_SHEET).unwrap();
    let mut solver = build_solver(&scene).unwrap();
    for _ in 0..scene.steps {
        solver.step(scene.dt).unwrap();
    }
    assert_eq!(solver.timestep(), 50);
    assert!(solver.bodies().iter().all(|b| b.first_non_finite().is_none()));
}

#[test]
fn bundled_scenes_are_valid() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenes");
    for name in ["hanging_sheet.toml", "trampled_grass.toml"] {
        let scene = SceneConfig::from_path(dir.join(name)).unwrap();
        let solver = build_solver(&scene).unwrap();
        assert!(!solver.bodies().is_empty(), "{name}");
        assert!(!solver.bodies()[0].static_constraints().is_empty(), "{name}");
    }
}

#[test]
fn bundled_scenes_carry_no_contact_input() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenes");
    let scene = SceneConfig::from_path(dir.join("trampled_grass.toml")).unwrap();
    let mut solver = build_solver(&scene).unwrap();
    for _ in 0..5 {
        solver.step(scene.dt).unwrap();
    }
    // Degradation only reacts to host-set contact flags.
    for body in solver.bodies() {
        assert!(body.particles.is_contact.iter().all(|&c| !c));
    }
}
