//! Integration tests for verdure-contact.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use verdure_contact::{
    BodyBodyContact, BodyCollision, BodyExternalContact, BroadPhase, ContactPolicy, ContactResult,
    ExternalCollision, SpatialHash,
};
use verdure_math::{rest_pose, Aabb, Vec3};
use verdure_mesh::GridSource;
use verdure_solver::{
    Body, BodyConfig, CollisionContext, CollisionStage, ContactInfo, ExternalBody, Solver,
    SolverConfig,
};
use verdure_types::{BodyId, ExternalBodyId, VerdureError};

fn single(x: f64, radius: f64) -> Body {
    Body::from_positions(vec![Vec3::new(x, 0.0, 0.0)], radius, 1.0).unwrap()
}

fn ctx(external_bodies: &[ExternalBody], iterations: u32) -> CollisionContext<'_> {
    CollisionContext {
        dt: 0.1,
        iterations,
        use_penetration_distance: false,
        fixed_step: 0.01,
        external_bodies,
    }
}

fn quiet_config() -> SolverConfig {
    SolverConfig {
        apply_gravity: false,
        sleep_threshold: 0.0,
        ..Default::default()
    }
}

fn random_body(rng: &mut StdRng, offset: Vec3, count: usize) -> Body {
    let positions = (0..count)
        .map(|_| offset + Vec3::new(rng.gen(), rng.gen(), rng.gen()))
        .collect();
    Body::from_positions(positions, 0.1, 1.0).unwrap()
}

// ─── Spatial Hash Tests ───────────────────────────────────────

#[test]
fn spatial_hash_finds_neighbors() {
    let points = vec![
        Vec3::ZERO,
        Vec3::new(0.05, 0.0, 0.0),
        Vec3::new(5.0, 5.0, 5.0),
    ];
    let mut hash = SpatialHash::new(0.1);
    hash.rebuild(&points);
    assert_eq!(hash.len(), 3);
    assert!(!hash.is_empty());

    let mut out = Vec::new();
    hash.query(Vec3::new(0.01, 0.0, 0.0), &mut out);
    assert_eq!(out, vec![0, 1]);

    out.clear();
    hash.query(Vec3::new(-3.0, 0.0, 0.0), &mut out);
    assert!(out.is_empty());
}

#[test]
fn spatial_hash_rebuild_replaces_contents() {
    let mut hash = SpatialHash::new(1.0);
    hash.rebuild(&[Vec3::ZERO, Vec3::ONE]);
    hash.rebuild(&[]);
    assert!(hash.is_empty());
    assert_eq!(hash.cell_count(), 0);
}

// ─── Body-Body Detection Tests ────────────────────────────────

#[test]
fn overlapping_particles_are_detected() {
    let bodies = vec![single(0.0, 0.5), single(0.8, 0.5)];
    let contacts = BodyCollision::new().find_contacts(&bodies);
    assert_eq!(
        contacts,
        vec![BodyBodyContact {
            body_a: BodyId(0),
            particle_a: 0,
            body_b: BodyId(1),
            particle_b: 0,
        }]
    );
}

#[test]
fn touching_particles_do_not_collide() {
    let bodies = vec![single(0.0, 0.5), single(1.0, 0.5)];
    assert!(BodyCollision::new().find_contacts(&bodies).is_empty());
}

#[test]
fn particles_of_one_body_never_collide() {
    let body = Body::from_positions(vec![Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0)], 0.5, 1.0).unwrap();
    assert!(BodyCollision::new().find_contacts(&[body]).is_empty());
}

#[test]
fn detection_uses_predicted_positions() {
    let mut bodies = vec![single(0.0, 0.5), single(3.0, 0.5)];
    bodies[1].particles.predicted[0] = Vec3::new(0.5, 0.0, 0.0);
    assert_eq!(BodyCollision::new().find_contacts(&bodies).len(), 1);
}

#[test]
fn spatial_hash_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let bodies: Vec<Body> = (0..3)
        .map(|k| random_body(&mut rng, Vec3::new(k as f64 * 0.5, 0.0, 0.0), 40))
        .collect();

    let brute = BodyCollision::with_broad_phase(BroadPhase::BruteForce).find_contacts(&bodies);
    let hashed = BodyCollision::with_broad_phase(BroadPhase::SpatialHash).find_contacts(&bodies);
    assert!(!brute.is_empty());
    assert_eq!(brute, hashed);
}

#[test]
fn grid_bodies_side_by_side() {
    let config = BodyConfig {
        particle_radius: 0.1,
        ..Default::default()
    };
    let source = GridSource::new(2, 2, 0.1).unwrap().build();
    let a = Body::cloth(&source, &config, &rest_pose(Vec3::ZERO, Vec3::ZERO)).unwrap();
    let far = Body::cloth(
        &source,
        &config,
        &rest_pose(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO),
    )
    .unwrap();
    let near = Body::cloth(
        &source,
        &config,
        &rest_pose(Vec3::new(0.0, 0.1, 0.0), Vec3::ZERO),
    )
    .unwrap();

    let collision = BodyCollision::new();
    assert!(collision.find_contacts(&[a.clone(), far]).is_empty());
    // Each particle overlaps only its twin directly above.
    assert_eq!(collision.find_contacts(&[a, near]).len(), 9);
}

// ─── Body-Body Resolution Tests ───────────────────────────────

#[test]
fn resolution_splits_by_inverse_mass() {
    let mut bodies = vec![single(0.0, 0.5), single(0.8, 0.5)];
    let contact = BodyCollision::new().find_contacts(&bodies)[0];

    let separation = contact.resolve_contact(&mut bodies, 1.0).unwrap();
    assert_relative_eq!(separation, 0.2, epsilon = 1e-12);
    assert_relative_eq!(bodies[0].particles.predicted[0].x, -0.1, epsilon = 1e-12);
    assert_relative_eq!(bodies[1].particles.predicted[0].x, 0.9, epsilon = 1e-12);
    // Positions move with predictions so no velocity is injected.
    assert_relative_eq!(bodies[0].particles.positions[0].x, -0.1, epsilon = 1e-12);
    assert_relative_eq!(bodies[1].particles.positions[0].x, 0.9, epsilon = 1e-12);
}

#[test]
fn static_side_does_not_move() {
    let mut bodies = vec![single(0.0, 0.5), single(0.8, 0.5)];
    bodies[1].mark_static(&Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0)).unwrap());
    let contact = BodyCollision::new().find_contacts(&bodies)[0];

    contact.resolve_contact(&mut bodies, 1.0).unwrap();
    assert_relative_eq!(bodies[0].particles.predicted[0].x, -0.2, epsilon = 1e-12);
    assert_relative_eq!(bodies[1].particles.predicted[0].x, 0.8, epsilon = 1e-12);
}

#[test]
fn coincident_particles_are_skipped() {
    let mut bodies = vec![single(1.0, 0.5), single(1.0, 0.5)];
    let contact = BodyCollision::new().find_contacts(&bodies)[0];
    assert!(contact.resolve_contact(&mut bodies, 1.0).is_none());
    assert_eq!(bodies[0].particles.predicted[0], bodies[1].particles.predicted[0]);
}

#[test]
fn stale_contact_is_ignored() {
    let mut bodies = vec![single(0.0, 0.5), single(0.8, 0.5)];
    let contact = BodyCollision::new().find_contacts(&bodies)[0];
    bodies[1].particles.predicted[0].x = 2.0;
    assert!(contact.resolve_contact(&mut bodies, 1.0).is_none());
}

#[test]
fn stage_runs_all_passes() {
    let mut bodies = vec![single(0.0, 0.5), single(0.8, 0.5)];
    let mut stage = BodyCollision::new();
    let summary = stage.resolve(&mut bodies, &ctx(&[], 2)).unwrap();

    assert_eq!(summary.body_contacts, 1);
    assert_eq!(summary.external_contacts, 0);
    assert_eq!(stage.contacts().len(), 1);
    // 0.2 overlap: 0.1 then 0.05 of separation.
    let gap = bodies[1].particles.predicted[0].x - bodies[0].particles.predicted[0].x;
    assert_relative_eq!(gap, 0.95, epsilon = 1e-12);
    let result = stage.last_result();
    assert_eq!(result.resolved_count, 2);
    assert_relative_eq!(result.max_correction, 0.1, epsilon = 1e-12);
    assert_relative_eq!(result.total_correction, 0.15, epsilon = 1e-12);
    assert_eq!(stage.name(), "body_collision");
}

// ─── External Contact Tests ───────────────────────────────────

fn touched(normal: Vec3, penetration: f64) -> Body {
    let mut body = single(0.0, 0.1);
    let hit = ContactInfo {
        normal,
        point: Vec3::ZERO,
        body: None,
    };
    body.set_contact(0, hit, penetration).unwrap();
    body
}

#[test]
fn policy_from_context() {
    let mut c = ctx(&[], 1);
    assert_eq!(ContactPolicy::from_context(&c), ContactPolicy::FixedStep(0.01));
    c.use_penetration_distance = true;
    assert_eq!(ContactPolicy::from_context(&c), ContactPolicy::PenetrationDistance);
}

#[test]
fn fixed_step_moves_along_normal() {
    let mut bodies = vec![touched(Vec3::new(0.0, 2.0, 0.0), 0.5)];
    let contact = BodyExternalContact {
        body: BodyId(0),
        particle: 0,
        external: None,
    };
    let step = contact
        .resolve_contact_external(&mut bodies, 0.5, ContactPolicy::FixedStep(0.01), 0.1)
        .unwrap();
    assert_relative_eq!(step, 0.005, epsilon = 1e-12);
    assert_relative_eq!(bodies[0].particles.predicted[0].y, 0.005, epsilon = 1e-12);
    assert_relative_eq!(bodies[0].particles.positions[0].y, 0.005, epsilon = 1e-12);
}

#[test]
fn penetration_policy_scales_with_depth_and_dt() {
    let mut bodies = vec![touched(Vec3::new(0.0, 0.0, -1.0), 0.5)];
    let contact = BodyExternalContact {
        body: BodyId(0),
        particle: 0,
        external: None,
    };
    contact
        .resolve_contact_external(&mut bodies, 0.5, ContactPolicy::PenetrationDistance, 0.1)
        .unwrap();
    assert_relative_eq!(bodies[0].particles.predicted[0].z, -0.025, epsilon = 1e-12);
}

#[test]
fn short_normal_is_skipped() {
    let mut bodies = vec![touched(Vec3::new(0.0, 1e-5, 0.0), 0.5)];
    let contact = BodyExternalContact {
        body: BodyId(0),
        particle: 0,
        external: None,
    };
    assert!(contact
        .resolve_contact_external(&mut bodies, 1.0, ContactPolicy::FixedStep(0.01), 0.1)
        .is_none());
    assert_eq!(bodies[0].particles.predicted[0], Vec3::ZERO);
}

#[test]
fn particle_out_of_contact_is_skipped() {
    let mut bodies = vec![touched(Vec3::Y, 0.5)];
    bodies[0].clear_contact(0).unwrap();
    let contact = BodyExternalContact {
        body: BodyId(0),
        particle: 0,
        external: None,
    };
    assert!(contact
        .resolve_contact_external(&mut bodies, 1.0, ContactPolicy::FixedStep(0.01), 0.1)
        .is_none());
}

#[test]
fn find_external_contacts_skips_free_and_static_particles() {
    let mut body = Body::from_positions(
        vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        0.1,
        1.0,
    )
    .unwrap();
    body.set_contact(0, ContactInfo::default(), 0.0).unwrap();
    body.set_contact(2, ContactInfo::default(), 0.0).unwrap();
    body.mark_static(&Aabb::new(Vec3::new(1.5, -1.0, -1.0), Vec3::new(2.5, 1.0, 1.0)).unwrap());

    let externals = vec![ExternalBody::new("rock", Vec3::ZERO)];
    let contacts = ExternalCollision::new()
        .find_external_contacts(&[body], &externals)
        .unwrap();
    assert_eq!(
        contacts,
        vec![BodyExternalContact {
            body: BodyId(0),
            particle: 0,
            external: Some(ExternalBodyId(0)),
        }]
    );
}

#[test]
fn external_body_comes_from_hit_info() {
    let mut body = single(0.0, 0.1);
    let hit = ContactInfo {
        normal: Vec3::Y,
        point: Vec3::ZERO,
        body: Some(ExternalBodyId(1)),
    };
    body.set_contact(0, hit, 0.0).unwrap();
    let externals = vec![
        ExternalBody::new("ground", Vec3::ZERO),
        ExternalBody::new("boot", Vec3::Y),
    ];
    let bodies = vec![body];
    let stage = ExternalCollision::new();

    let contacts = stage.find_external_contacts(&bodies, &externals).unwrap();
    assert_eq!(contacts[0].external, Some(ExternalBodyId(1)));

    let err = stage.find_external_contacts(&bodies, &externals[..1]).unwrap_err();
    assert!(matches!(err, VerdureError::InconsistentState(_)));

    let mut anonymous = bodies;
    anonymous[0].particles.external_hit[0].body = None;
    let contacts = stage.find_external_contacts(&anonymous, &[]).unwrap();
    assert_eq!(contacts[0].external, None);
}

#[test]
fn contact_result_accumulates() {
    let mut result = ContactResult::default();
    result.record(0.2);
    result.record(0.05);
    assert_eq!(result.resolved_count, 2);
    assert_relative_eq!(result.max_correction, 0.2);
    assert_relative_eq!(result.total_correction, 0.25);
}

// ─── Solver Integration Tests ─────────────────────────────────

#[test]
fn solver_runs_external_stage() {
    let mut solver = Solver::new(SolverConfig {
        collision_iterations: 2,
        collision_fixed_step: 0.001,
        ..quiet_config()
    })
    .unwrap();
    solver.add_external_body(ExternalBody::new("ground", Vec3::new(0.0, -1.0, 0.0)));
    let id = solver.add_body(touched(Vec3::Y, 0.0));
    solver.add_collision(Box::new(ExternalCollision::new()));
    assert_eq!(solver.collision_stage_names(), vec!["external_collision"]);

    let report = solver.step(1.0 / 60.0).unwrap();
    assert_eq!(report.external_contacts, 1);
    let body = solver.body(id).unwrap();
    assert_relative_eq!(body.particles.positions[0].y, 0.001, epsilon = 1e-12);
    assert_relative_eq!(body.particles.velocities[0].length(), 0.0, epsilon = 1e-9);
}

#[test]
fn solver_separates_bodies() {
    let mut solver = Solver::new(SolverConfig {
        collision_iterations: 2,
        ..quiet_config()
    })
    .unwrap();
    let a = solver.add_body(single(0.0, 0.5));
    let b = solver.add_body(single(0.8, 0.5));
    solver.add_collision(Box::new(BodyCollision::with_broad_phase(BroadPhase::SpatialHash)));

    let report = solver.step(1.0 / 60.0).unwrap();
    assert_eq!(report.body_contacts, 1);
    let xa = solver.body(a).unwrap().particles.positions[0].x;
    let xb = solver.body(b).unwrap().particles.positions[0].x;
    assert_relative_eq!(xb - xa, 0.95, epsilon = 1e-12);
}
