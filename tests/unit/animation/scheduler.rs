use std::time::Instant;

use super::*;
use crate::config::params::Param;

#[test]
fn clock_carries_remainder() {
    let mut clock = LoopClock::new(Duration::from_millis(10)).unwrap();
    assert_eq!(clock.advance(Duration::from_millis(25)), 2);
    assert_eq!(clock.advance(Duration::from_millis(4)), 0);
    assert_eq!(clock.advance(Duration::from_millis(1)), 1);
    assert_eq!(clock.advance(Duration::ZERO), 0);
}

#[test]
fn default_clock_gives_two_ticks_per_30fps_frame() {
    let mut clock = LoopClock::default();
    let frame = Duration::from_secs_f64(1.0 / 30.0);
    for _ in 0..10 {
        assert_eq!(clock.advance(frame), 2);
    }
}

#[test]
fn zero_interval_is_rejected() {
    assert!(matches!(
        LoopClock::new(Duration::ZERO),
        Err(DepthflowError::Config(_))
    ));
    let engine = Arc::new(Mutex::new(LoopEngine::new()));
    let store = Arc::new(ConfigStore::default());
    assert!(LoopScheduler::spawn(engine, store, Duration::ZERO).is_err());
}

#[test]
fn scheduler_ticks_active_loops_until_stopped() {
    let engine = Arc::new(Mutex::new(LoopEngine::new()));
    engine.lock().unwrap().enable(Param::Dolly);
    let store = Arc::new(ConfigStore::default());

    let scheduler = LoopScheduler::spawn(
        Arc::clone(&engine),
        Arc::clone(&store),
        Duration::from_millis(1),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while scheduler.ticks() < 3 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    scheduler.stop();

    let after_stop = store.get(Param::Dolly);
    assert!(after_stop > 0.0);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(store.get(Param::Dolly), after_stop);
}
