use prefab_pool::{
    FrameScheduler, ObjectHandle, PoolError, PoolManager, PoolSpec, Quaternion, TokioScheduler,
    Vector3,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Prefab(&'static str);

fn frame_manager(specs: Vec<PoolSpec<Prefab>>) -> (PoolManager<Prefab>, Arc<FrameScheduler>) {
    let frames = Arc::new(FrameScheduler::new());
    let manager = PoolManager::new(specs, frames.clone()).unwrap();
    (manager, frames)
}

fn spin(angle: f32) -> Quaternion {
    Quaternion::from_yaw(angle)
}

#[test]
fn bullet_pool_wraps_to_first_object() {
    let (manager, frames) = frame_manager(vec![PoolSpec::new("bullet", Prefab("bullet"), 3)]);

    let points = [
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0),
        Vector3::new(3.0, 0.0, 0.0),
        Vector3::new(4.0, 0.0, 0.0),
    ];
    let handles: Vec<ObjectHandle<Prefab>> = points
        .iter()
        .enumerate()
        .map(|(i, p)| manager.acquire("bullet", *p, spin(i as f32)).unwrap())
        .collect();

    assert_eq!(handles[3], handles[0]);
    assert_ne!(handles[0], handles[1]);
    assert_ne!(handles[1], handles[2]);
    assert_ne!(handles[0], handles[2]);

    assert_eq!(handles[0].position(), points[3]);
    assert_eq!(handles[0].rotation(), spin(3.0));
    assert!(handles[0].is_active());

    frames.advance(Duration::from_secs(3600));
    assert!(handles.iter().all(|h| h.is_active()));
    assert_eq!(frames.pending(), 0);
}

#[test]
fn muzzle_flash_deactivates_after_half_a_second() {
    let (manager, frames) = frame_manager(vec![
        PoolSpec::new("muzzle_flash", Prefab("flash"), 1).with_time_to_deactivate(0.5),
    ]);

    let flash = manager
        .acquire("muzzle_flash", Vector3::ZERO, Quaternion::IDENTITY)
        .unwrap();
    assert!(flash.is_active());

    frames.advance(Duration::from_millis(499));
    assert!(flash.is_active());

    frames.advance(Duration::from_millis(2));
    assert!(!flash.is_active());
}

#[tokio::test(start_paused = true)]
async fn muzzle_flash_deactivates_on_wall_clock() {
    let manager = PoolManager::new(
        vec![PoolSpec::new("muzzle_flash", Prefab("flash"), 1).with_time_to_deactivate(0.5)],
        Arc::new(TokioScheduler::current().unwrap()),
    )
    .unwrap();

    let flash = manager
        .acquire("muzzle_flash", Vector3::ZERO, Quaternion::IDENTITY)
        .unwrap();
    assert!(flash.is_active());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(flash.is_active());

    tokio::time::sleep(Duration::from_millis(110)).await;
    tokio::task::yield_now().await;
    assert!(!flash.is_active());
}

#[test]
fn handle_count_never_changes() {
    let (manager, frames) = frame_manager(vec![
        PoolSpec::new("bullet", Prefab("bullet"), 5),
        PoolSpec::new("spark", Prefab("spark"), 2).with_time_to_deactivate(0.1),
    ]);

    for i in 0..200 {
        let pool = if i % 3 == 0 { "spark" } else { "bullet" };
        manager.acquire(pool, Vector3::ZERO, Quaternion::IDENTITY).unwrap();
        frames.advance(Duration::from_millis(16));
    }

    assert_eq!(manager.handle_count("bullet").unwrap(), 5);
    assert_eq!(manager.handle_count("spark").unwrap(), 2);

    let ids: Vec<_> = manager.handles("bullet").unwrap().iter().map(|h| h.id()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn unknown_pool_leaves_registry_untouched() {
    let (manager, _) = frame_manager(vec![PoolSpec::new("bullet", Prefab("bullet"), 2)]);

    let err = manager
        .acquire("grenade", Vector3::ZERO, Quaternion::IDENTITY)
        .unwrap_err();

    assert_eq!(err, PoolError::PoolNotFound("grenade".to_string()));
    assert_eq!(manager.pool_not_found_count(), 1);
    assert!(!manager.contains("grenade"));
    assert_eq!(manager.pool_names(), ["bullet"]);
    assert_eq!(manager.get_metrics("bullet").unwrap().total_acquired, 0);
}

#[test]
fn timers_are_independent_of_other_pools() {
    let (manager, frames) = frame_manager(vec![
        PoolSpec::new("flash", Prefab("flash"), 4).with_time_to_deactivate(0.2),
        PoolSpec::new("bullet", Prefab("bullet"), 4),
    ]);

    let flash = manager.acquire("flash", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
    for _ in 0..10 {
        manager.acquire("bullet", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
        frames.advance(Duration::from_millis(25));
    }

    assert!(!flash.is_active());
    assert_eq!(manager.active_count("bullet").unwrap(), 4);
}

#[test]
fn registration_rejects_bad_specs() {
    let duplicate = PoolManager::new(
        vec![
            PoolSpec::new("bullet", Prefab("a"), 2),
            PoolSpec::new("bullet", Prefab("b"), 2),
        ],
        Arc::new(FrameScheduler::new()),
    );
    assert!(matches!(duplicate, Err(PoolError::DuplicatePoolName(name)) if name == "bullet"));

    let empty = PoolManager::new(
        vec![PoolSpec::new("bullet", Prefab("a"), 0)],
        Arc::new(FrameScheduler::new()),
    );
    assert!(matches!(empty, Err(PoolError::InvalidPoolSpec { .. })));
}

#[cfg(feature = "serde")]
#[test]
fn specs_load_from_json_in_order() {
    let specs = prefab_pool::specs_from_json::<String>(
        r#"[
            {"name": "decal", "template": "decal", "size": 4},
            {"name": "flash", "template": "flash", "size": 1, "time_to_deactivate": 0.5}
        ]"#,
    )
    .unwrap();

    let manager = PoolManager::new(specs, Arc::new(FrameScheduler::new())).unwrap();
    assert_eq!(manager.pool_names(), ["decal", "flash"]);
    assert_eq!(manager.time_to_deactivate("decal").unwrap(), 0.0);

    let flash = manager.acquire("flash", Vector3::ZERO, Quaternion::IDENTITY).unwrap();
    assert_eq!(flash.with(|t| t.clone()), "flash");
}
