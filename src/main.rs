// Small demo of the pool manager.
// Run examples with: cargo run --example basic
// Set RUST_LOG=prefab_pool=trace to see pool activity.

use prefab_pool::{PoolManager, PoolResult, PoolSpec, Quaternion, TokioScheduler, Vector3};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> PoolResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== prefab_pool ===");
    println!("See demos/ for more usage");
    println!();

    let manager = PoolManager::new(
        vec![
            PoolSpec::new("bullet", "bullet", 3),
            PoolSpec::new("muzzle_flash", "flash", 1).with_time_to_deactivate(0.25),
        ],
        Arc::new(TokioScheduler::current()?),
    )?;

    for shot in 0..4 {
        let position = Vector3::new(shot as f32, 1.5, 0.0);
        let bullet = manager.acquire("bullet", position, Quaternion::IDENTITY)?;
        let flash = manager.acquire("muzzle_flash", position, Quaternion::IDENTITY)?;
        println!(
            "  shot {}: bullet #{} at x={}, flash active={}",
            shot,
            bullet.id(),
            bullet.position().x,
            flash.is_active()
        );
    }

    // Logged, not fatal
    let _ = manager.try_acquire("rocket", Vector3::ZERO, Quaternion::IDENTITY);

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!();
    println!("  flashes active after 300ms: {}", manager.active_count("muzzle_flash")?);
    println!();
    print!("{}", manager.export_metrics_prometheus(None));

    Ok(())
}
