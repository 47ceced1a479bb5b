use flitter_core::{
    EngineConfig, ParticlePool, RandomSource, ScriptedRandom, SeededRandom, Simulation,
    TrailPreset, SENTINEL_POSITION,
};
use glam::Vec3;

#[test]
fn test_cursor_visits_every_slot_equally() {
    let mut sim = Simulation::new(EngineConfig {
        seed: Some(9),
        ..EngineConfig::default()
    })
    .unwrap();
    let capacity = sim.trail().capacity();
    let per_frame = sim.config().preset.spawns_per_frame;
    let mut visits = vec![0u32; capacity];
    let mut cursor = sim.trail().cursor();
    let rounds = 3;
    for _ in 0..(capacity * rounds / per_frame) {
        sim.tick();
        for _ in 0..per_frame {
            visits[cursor] += 1;
            cursor = (cursor + 1) % capacity;
        }
        assert_eq!(sim.trail().cursor(), cursor);
        assert!(sim.trail().cursor() < capacity);
    }
    assert!(visits.iter().all(|&v| v == rounds as u32));
}

#[test]
fn test_velocity_bounded_from_rest() {
    let mut sim = Simulation::new(EngineConfig {
        seed: Some(2024),
        ..EngineConfig::default()
    })
    .unwrap();
    for _ in 0..10_000 {
        sim.tick();
        let v = sim.flight().velocity();
        assert!(v.is_finite());
        assert!(v.length() < 1.0);
    }
}

#[test]
fn test_expired_particles_never_flash_back() {
    let mut rng = ScriptedRandom::constant(0.0);
    let mut pool = ParticlePool::new(TrailPreset::default(), &mut rng);
    let idx = pool.spawn(Vec3::ZERO, &mut rng);
    for _ in 0..400 {
        pool.advance(0.02);
        let slot = pool.slot(idx).unwrap();
        if slot.motion.age >= slot.motion.life_span {
            assert_eq!(slot.opacity, 0.0);
            assert_eq!(slot.position, SENTINEL_POSITION);
        }
        assert!(!slot.opacity.is_nan());
        assert!(!slot.size.is_nan());
    }
}

#[test]
fn test_zero_velocity_orientation_is_stable() {
    let mut config = EngineConfig::default();
    config.flight.bob_amplitude = 0.0;
    config.flight.resample_probability = 0.0;
    let mut sim = Simulation::with_random(config, ScriptedRandom::constant(0.5)).unwrap();
    for _ in 0..20 {
        let view = sim.tick();
        assert_eq!(view.entity.position, Vec3::ZERO);
        assert!(view.entity.orientation.is_finite());
        assert!(view.entity.body_matrix().is_finite());
    }
}

#[test]
fn test_snapshot_arrays_are_parallel() {
    let mut sim =
        Simulation::with_random(EngineConfig::default(), SeededRandom::from_seed(5)).unwrap();
    for _ in 0..5 {
        sim.tick();
    }
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.frame, 5);
    assert_eq!(snapshot.positions.len(), 3 * snapshot.sizes.len());
    assert_eq!(snapshot.opacities.len(), snapshot.rotation_angles.len());
}

#[test]
fn test_random_source_works_through_mut_reference() {
    fn draw(mut rng: impl RandomSource) -> f32 {
        rng.in_range(0.0..4.0)
    }
    let mut inner = ScriptedRandom::new(vec![0.25, 0.5]);
    assert_eq!(draw(&mut inner), 1.0);
    assert_eq!(draw(&mut inner), 2.0);
}

#[test]
fn test_sample_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../flitter.toml");
    let config = EngineConfig::load(path).unwrap();
    let expected = EngineConfig {
        seed: Some(1),
        ..EngineConfig::default()
    };
    assert_eq!(config, expected);
}
