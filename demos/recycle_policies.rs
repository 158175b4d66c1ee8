//! Comparing recycle policies on a saturated pool

use prefab_pool::{
    FrameScheduler, PoolConfiguration, PoolManager, PoolSpec, Quaternion, RecyclePolicy, Transform,
    Vector3,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct Enemy {
    spawned_at: Option<Vector3>,
}

fn on_spawn(enemy: &mut Enemy, transform: &Transform) {
    enemy.spawned_at = Some(transform.position);
}

fn on_despawn(enemy: &mut Enemy) {
    enemy.spawned_at = None;
}

fn main() {
    println!("=== prefab_pool - Recycle Policies ===\n");

    for policy in [RecyclePolicy::RoundRobin, RecyclePolicy::SkipActive, RecyclePolicy::Strict] {
        run(policy);
    }
}

fn run(policy: RecyclePolicy) {
    println!("{:?}:", policy);

    let frames = Arc::new(FrameScheduler::new());
    let config = PoolConfiguration::new()
        .with_recycle_policy(policy)
        .with_on_activate(on_spawn)
        .with_on_deactivate(on_despawn);
    let manager = PoolManager::with_configuration(
        vec![PoolSpec::new("enemy", Enemy::default(), 3).with_time_to_deactivate(1.0)],
        config,
        frames.clone(),
    )
    .unwrap();

    // Spawn one enemy every 0.25s; each lives for 1s, so demand exceeds the pool
    for frame in 0..6 {
        let at = Vector3::new(frame as f32, 0.0, 0.0);
        match manager.acquire("enemy", at, Quaternion::IDENTITY) {
            Ok(enemy) => println!(
                "   frame {}: enemy #{} spawned at {:?}",
                frame,
                enemy.id(),
                enemy.with(|e| e.spawned_at.map(|p| p.x))
            ),
            Err(e) => println!("   frame {}: {}", frame, e),
        }
        frames.advance(Duration::from_millis(250));
    }

    let metrics = manager.get_metrics("enemy").unwrap();
    println!(
        "   reused while active: {}, refused: {}\n",
        metrics.premature_reuses, metrics.exhausted_events
    );
}
