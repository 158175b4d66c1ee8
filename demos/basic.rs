//! Basic usage of PoolManager

use prefab_pool::{FrameScheduler, PoolManager, PoolSpec, Quaternion, Vector3};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Projectile {
    damage: u32,
}

fn main() {
    println!("=== prefab_pool - Basic Examples ===\n");

    // Example 1: Round-robin reuse
    round_robin();

    // Example 2: Unknown pools
    unknown_pool();

    // Example 3: Metrics and health
    metrics_and_health();
}

fn manager() -> PoolManager<Projectile> {
    PoolManager::new(
        vec![PoolSpec::new("bullet", Projectile { damage: 10 }, 3)],
        Arc::new(FrameScheduler::new()),
    )
    .unwrap()
}

fn round_robin() {
    println!("1. Round Robin:");
    let manager = manager();

    for i in 0..4 {
        let bullet = manager
            .acquire("bullet", Vector3::new(i as f32, 0.0, 0.0), Quaternion::IDENTITY)
            .unwrap();
        println!(
            "   Acquire {} -> object #{} (damage {})",
            i,
            bullet.id(),
            bullet.with(|p| p.damage)
        );
    }

    println!("   Objects in pool: {}\n", manager.handle_count("bullet").unwrap());
}

fn unknown_pool() {
    println!("2. Unknown Pool:");
    let manager = manager();

    match manager.acquire("Bullet", Vector3::ZERO, Quaternion::IDENTITY) {
        Ok(_) => println!("   Unexpected object"),
        Err(e) => println!("   {}", e),
    }
    println!("   Not-found events: {}\n", manager.pool_not_found_count());
}

fn metrics_and_health() {
    println!("3. Metrics and Health:");
    let manager = manager();

    for _ in 0..5 {
        manager.acquire("bullet", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
    }

    let health = manager.get_health_status("bullet").unwrap();
    println!("   Health: {}", if health.is_healthy { "Healthy" } else { "Unhealthy" });
    println!("   Utilization: {:.1}%", health.utilization * 100.0);
    for warning in &health.warnings {
        println!("   Warning: {}", warning);
    }

    println!("\n   Metrics:");
    for (key, value) in manager.export_metrics("bullet").unwrap() {
        println!("     {}: {}", key, value);
    }
}
