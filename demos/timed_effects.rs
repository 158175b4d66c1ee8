//! Timed deactivation with tokio timers and specs loaded from JSON

use prefab_pool::{PoolManager, Quaternion, TokioScheduler, Vector3, specs_from_json};
use std::sync::Arc;
use std::time::Duration;

const SPECS: &str = r#"[
    {"name": "muzzle_flash", "template": "flash", "size": 2, "time_to_deactivate": 0.1},
    {"name": "shell_casing", "template": "casing", "size": 8, "time_to_deactivate": 0.5},
    {"name": "decal", "template": "decal", "size": 16}
]"#;

#[tokio::main]
async fn main() {
    println!("=== prefab_pool - Timed Effects ===\n");

    let specs = specs_from_json::<String>(SPECS).unwrap();
    let manager = PoolManager::new(specs, Arc::new(TokioScheduler::current().unwrap())).unwrap();

    println!("Pools: {:?}\n", manager.pool_names());

    for shot in 0..3 {
        let at = Vector3::new(shot as f32, 1.0, 0.0);
        manager.acquire("muzzle_flash", at, Quaternion::IDENTITY).unwrap();
        manager.acquire("shell_casing", at, Quaternion::from_yaw(0.3 * shot as f32)).unwrap();
        manager.acquire("decal", at, Quaternion::IDENTITY).unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    for step in 0..4 {
        println!(
            "t+{}ms  flashes={} casings={} decals={}",
            step * 200,
            manager.active_count("muzzle_flash").unwrap(),
            manager.active_count("shell_casing").unwrap(),
            manager.active_count("decal").unwrap(),
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let flash = manager.get_metrics("muzzle_flash").unwrap();
    println!(
        "\nmuzzle_flash: fired={} stale={} reused_while_active={}",
        flash.deactivations_fired, flash.stale_deactivations, flash.premature_reuses
    );
}
