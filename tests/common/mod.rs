#![allow(dead_code)]

use core::cell::Cell;
use core::convert::Infallible;

use blinds_button_control::{
    Characteristic, Clock, ConfigStore, Controller, ControllerConfig, InputSnapshot, Lifecycle,
    Motor, Notifier, SavedConfig,
};
use embassy_time::Instant;

// --- Mock Hardware (模拟硬件) ---

/// 手动推进的时钟，单位毫秒。
#[derive(Default)]
pub struct ManualClock {
    ms: Cell<u64>,
}

impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self { ms: Cell::new(ms) }
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.ms.set(self.ms.get() + ms);
    }

    pub fn ms(&self) -> u64 {
        self.ms.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.ms.get())
    }
}

#[derive(Default)]
pub struct MockMotor {
    pub position: i32,
    pub moved_to: Vec<i32>,
    pub rebased_to: Vec<i32>,
    pub max_speed: Option<f32>,
    pub acceleration: Option<f32>,
}

impl Motor for MockMotor {
    fn current_position(&mut self) -> i32 {
        self.position
    }
    fn move_to(&mut self, position: i32) {
        self.moved_to.push(position);
    }
    fn set_current_position(&mut self, position: i32) {
        self.position = position;
        self.rebased_to.push(position);
    }
    fn set_max_speed(&mut self, speed: f32) {
        self.max_speed = Some(speed);
    }
    fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = Some(acceleration);
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Vec<(Characteristic, i32)>,
    pub fail: bool,
}

impl Notifier for MockNotifier {
    type Error = ();
    fn notify(&mut self, characteristic: Characteristic, value: i32) -> Result<(), Self::Error> {
        self.sent.push((characteristic, value));
        if self.fail {
            Err(())
        } else {
            Ok(())
        }
    }
}

impl MockNotifier {
    pub fn count(&self, characteristic: Characteristic) -> usize {
        self.sent.iter().filter(|(c, _)| *c == characteristic).count()
    }
}

#[derive(Default)]
pub struct MockStore {
    pub saved: Vec<SavedConfig>,
    pub fail: bool,
}

impl ConfigStore for MockStore {
    type Error = ();
    fn save(&mut self, config: &SavedConfig) -> Result<(), Self::Error> {
        if self.fail {
            return Err(());
        }
        self.saved.push(*config);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockLifecycle {
    pub resets: u32,
    pub calibrations: u32,
    pub reconnects: u32,
    pub registrations: u32,
}

impl Lifecycle for MockLifecycle {
    fn reset(&mut self) {
        self.resets += 1;
    }
    fn calibration_mode_entered(&mut self) {
        self.calibrations += 1;
    }
    fn reconnect_network(&mut self) {
        self.reconnects += 1;
    }
    fn register_accessory(&mut self) {
        self.registrations += 1;
    }
}

/// 记录电平变化次数的 LED。
#[derive(Default)]
pub struct MockLed {
    pub on: bool,
    pub changes: u32,
}

impl embedded_hal::digital::ErrorType for MockLed {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.on {
            self.changes += 1;
        }
        self.on = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.on {
            self.changes += 1;
        }
        self.on = true;
        Ok(())
    }
}

// --- Test Harness (测试工具) ---

pub type TestController<'a> =
    Controller<&'a ManualClock, MockMotor, MockNotifier, MockStore, MockLifecycle, MockLed>;

/// 上电静默期之后的第一个时刻。
pub const AFTER_GRACE: u64 = 10_001;

pub fn controller(clock: &ManualClock) -> TestController<'_> {
    controller_with(clock, ControllerConfig::default())
}

pub fn controller_with(clock: &ManualClock, config: ControllerConfig) -> TestController<'_> {
    Controller::new(
        config,
        clock,
        MockMotor::default(),
        MockNotifier::default(),
        MockStore::default(),
        MockLifecycle::default(),
        MockLed::default(),
    )
}

/// 两个按键的模拟状态，按周期生成快照。
#[derive(Default, Clone, Copy)]
pub struct Buttons {
    pub up: bool,
    pub down: bool,
}

impl Buttons {
    /// 生成一个快照：相对上一个状态新按下的键产生边沿。
    pub fn step(&mut self, now_ms: u64, up: bool, down: bool) -> InputSnapshot {
        let snapshot = InputSnapshot {
            now: Instant::from_millis(now_ms),
            up_pressed: up,
            down_pressed: down,
            up_just_pressed: up && !self.up,
            down_just_pressed: down && !self.down,
        };
        self.up = up;
        self.down = down;
        snapshot
    }
}

pub fn idle(now_ms: u64) -> InputSnapshot {
    InputSnapshot::idle(Instant::from_millis(now_ms))
}
