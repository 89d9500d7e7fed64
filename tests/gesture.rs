mod common;

use blinds_button_control::{ControllerConfig, GestureDetector, HoldTier};
use common::Buttons;
use embassy_time::{Duration, Instant};

#[test]
fn test_paired_begin_and_end_with_duration() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    let g = detector.update(&buttons.step(1_000, true, true), false, &config);
    assert!(g.paired_begin);
    assert!(g.pair_active);
    assert_eq!(detector.paired_since(), Some(Instant::from_millis(1_000)));

    let g = detector.update(&buttons.step(1_500, true, true), false, &config);
    assert!(!g.paired_begin);
    assert_eq!(g.paired_end, None);

    let g = detector.update(&buttons.step(1_800, false, true), false, &config);
    assert_eq!(g.paired_end, Some(Duration::from_millis(800)));
    assert!(!detector.is_paired());
    // 按下时已处理，释放时不再产生短按
    assert!(!g.short_press);
}

#[test]
fn test_short_press_deferred_to_release_when_calibrating() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    let g = detector.update(&buttons.step(0, true, true), true, &config);
    assert!(g.paired_begin);
    assert!(!g.short_press);

    let g = detector.update(&buttons.step(4_999, false, false), true, &config);
    assert!(g.short_press);
}

#[test]
fn test_release_after_calibrate_hold_is_not_short() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    detector.update(&buttons.step(0, true, true), true, &config);
    let g = detector.update(&buttons.step(5_000, false, false), true, &config);
    assert!(!g.short_press);
    assert_eq!(g.paired_end, Some(Duration::from_millis(5_000)));
}

#[test]
fn test_fallback_short_press_when_mode_changed_mid_press() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    // 按下时处于校准模式，释放时已回到正常模式：按下时没有执行停止
    detector.update(&buttons.step(0, true, true), true, &config);
    let g = detector.update(&buttons.step(200, false, false), false, &config);
    assert!(g.short_press);
}

#[test]
fn test_hold_tiers_fire_once_each() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();
    let mut tiers = Vec::new();

    let mut t = 0;
    while t <= 25_000 {
        let g = detector.update(&buttons.step(t, true, true), false, &config);
        tiers.extend(g.hold);
        t += 50;
    }
    assert_eq!(tiers, vec![HoldTier::Calibrate, HoldTier::Reset]);

    // 释放后重新武装
    detector.update(&buttons.step(25_050, false, false), false, &config);
    let g = detector.update(&buttons.step(26_000, true, true), false, &config);
    assert!(g.paired_begin);
    let g = detector.update(&buttons.step(31_000, true, true), false, &config);
    assert_eq!(g.hold, Some(HoldTier::Calibrate));
}

#[test]
fn test_reset_tier_suppresses_calibrate_tier() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    // 一个周期直接跨过两个阈值
    detector.update(&buttons.step(0, true, true), false, &config);
    let g = detector.update(&buttons.step(12_000, true, true), false, &config);
    assert_eq!(g.hold, Some(HoldTier::Reset));
    let g = detector.update(&buttons.step(12_100, true, true), false, &config);
    assert_eq!(g.hold, None);
}

#[test]
fn test_calibrate_tier_skipped_while_calibrating() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    detector.update(&buttons.step(0, true, true), true, &config);
    let g = detector.update(&buttons.step(6_000, true, true), true, &config);
    assert_eq!(g.hold, None);
    let g = detector.update(&buttons.step(10_000, true, true), true, &config);
    assert_eq!(g.hold, Some(HoldTier::Reset));
}

#[test]
fn test_pairing_window_tolerates_near_simultaneous_press() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    let g = detector.update(&buttons.step(0, true, false), false, &config);
    assert!(g.up_tap);
    assert!(!g.pair_active);

    // 上键按住期间，下键在 300ms 内按下后立即松开
    let g = detector.update(&buttons.step(250, true, true), false, &config);
    assert!(g.pair_active);
    let g = detector.update(&buttons.step(280, true, false), false, &config);
    assert!(g.pair_active);

    // 窗口过后单独按住上键不再算配对
    let g = detector.update(&buttons.step(700, true, false), false, &config);
    assert!(!g.pair_active);
}

#[test]
fn test_edges_update_last_pressed_timestamps() {
    let config = ControllerConfig::default();
    let mut detector = GestureDetector::new();
    let mut buttons = Buttons::default();

    assert_eq!(detector.up_last_pressed_at(), None);
    detector.update(&buttons.step(100, true, false), false, &config);
    detector.update(&buttons.step(200, false, false), false, &config);
    detector.update(&buttons.step(300, false, true), false, &config);
    assert_eq!(detector.up_last_pressed_at(), Some(Instant::from_millis(100)));
    assert_eq!(detector.down_last_pressed_at(), Some(Instant::from_millis(300)));
}
