#![no_std]

mod fmt;

pub mod accessory;
pub mod blink;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod gesture;
pub mod gpio;

pub use accessory::{Characteristic, Notifier, PositionState};
pub use blink::Blink;
pub use calibration::{CalibrationOutcome, CalibrationStep, SavedConfig};
pub use config::*;
pub use controller::{Action, Actions, ConfigStore, Controller, ControllerState, Lifecycle, Mode, Motor};
pub use gesture::{GestureDetector, Gestures, HoldTier};

use embassy_time::Instant;

/// 一个trait，抽象了已经消抖的按键输入层。
///
/// `was_pressed` 是一次性的边沿事件，报告此前 `is_pressed` 观察到的按下，
/// 读取后即被消耗。因此每个轮询周期只能通过 [`InputSnapshot::sample`] 读取一次。
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
    fn was_pressed(&mut self) -> bool;
}

impl<T: ButtonInput + ?Sized> ButtonInput for &mut T {
    fn is_pressed(&mut self) -> bool {
        T::is_pressed(self)
    }

    fn was_pressed(&mut self) -> bool {
        T::was_pressed(self)
    }
}

/// 单调时钟。
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        C::now(self)
    }
}

/// 使用 `embassy-time` 全局时间驱动的时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 一个轮询周期内两个按键的输入快照。
///
/// 快照在周期开始时采样一次，之后的所有判定都只读取它，
/// 不会再次查询输入层。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSnapshot {
    pub now: Instant,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub up_just_pressed: bool,
    pub down_just_pressed: bool,
}

impl InputSnapshot {
    /// 从两个按键各采样一次电平与边沿。
    pub fn sample<U: ButtonInput, D: ButtonInput>(up: &mut U, down: &mut D, now: Instant) -> Self {
        let up_pressed = up.is_pressed();
        let down_pressed = down.is_pressed();
        let up_just_pressed = up.was_pressed();
        let down_just_pressed = down.was_pressed();
        Self {
            now,
            up_pressed,
            down_pressed,
            up_just_pressed,
            down_just_pressed,
        }
    }

    /// 没有任何按键活动的快照。
    pub const fn idle(now: Instant) -> Self {
        Self {
            now,
            up_pressed: false,
            down_pressed: false,
            up_just_pressed: false,
            down_just_pressed: false,
        }
    }

    pub fn both_pressed(&self) -> bool {
        self.up_pressed && self.down_pressed
    }
}
