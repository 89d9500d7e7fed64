use embassy_time::{Duration, Instant};

use crate::config::ControllerConfig;
use crate::InputSnapshot;

/// 组合长按触发的档位。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldTier {
    /// 达到 `calibrate_hold`：进入校准模式。
    Calibrate,
    /// 达到 `reset_hold`：硬复位。
    Reset,
}

/// 一次组合按压从按下到释放的生命周期。
///
/// 每个档位在一次按压中最多触发一次，释放时整体回到 `Idle`。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressLifecycle {
    Idle,
    Pressed {
        since: Instant,
        /// 正常模式下按下瞬间已经执行了停止动作。
        handled_on_press: bool,
    },
    CalibrateFired {
        since: Instant,
    },
    ResetFired {
        since: Instant,
    },
}

impl PressLifecycle {
    fn since(&self) -> Option<Instant> {
        match *self {
            PressLifecycle::Idle => None,
            PressLifecycle::Pressed { since, .. }
            | PressLifecycle::CalibrateFired { since }
            | PressLifecycle::ResetFired { since } => Some(since),
        }
    }
}

/// 一个周期内由输入快照推导出的手势。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gestures {
    /// 两键同时按下在本周期开始。
    pub paired_begin: bool,
    /// 两键同时按下在本周期结束，附带持续时间。
    pub paired_end: Option<Duration>,
    /// 本周期达到的长按档位。
    pub hold: Option<HoldTier>,
    /// 本周期需要执行的组合短按。
    pub short_press: bool,
    /// 宽松的配对信号，为真时单键预设被抑制。
    pub pair_active: bool,
    pub up_tap: bool,
    pub down_tap: bool,
}

/// 双键手势检测器。
#[derive(Debug)]
pub struct GestureDetector {
    lifecycle: PressLifecycle,
    up_last_pressed_at: Option<Instant>,
    down_last_pressed_at: Option<Instant>,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDetector {
    pub const fn new() -> Self {
        Self {
            lifecycle: PressLifecycle::Idle,
            up_last_pressed_at: None,
            down_last_pressed_at: None,
        }
    }

    /// 处理一个周期的输入快照。
    ///
    /// `calibrating` 为真时，5 秒档位不会触发，
    /// 组合短按延迟到释放时才执行；否则停止动作在按下瞬间执行。
    pub fn update(&mut self, input: &InputSnapshot, calibrating: bool, config: &ControllerConfig) -> Gestures {
        let now = input.now;
        let mut gestures = Gestures {
            up_tap: input.up_just_pressed,
            down_tap: input.down_just_pressed,
            ..Gestures::default()
        };

        if input.up_just_pressed {
            self.up_last_pressed_at = Some(now);
            debug!("button: up pressed");
        }
        if input.down_just_pressed {
            self.down_last_pressed_at = Some(now);
            debug!("button: down pressed");
        }

        let both = input.both_pressed();

        if both && self.lifecycle == PressLifecycle::Idle {
            debug!("buttons: both pressed");
            self.lifecycle = PressLifecycle::Pressed {
                since: now,
                handled_on_press: !calibrating,
            };
            gestures.paired_begin = true;
        }

        if both {
            gestures.hold = self.check_hold(now, calibrating, config);
        } else if let Some(since) = self.lifecycle.since() {
            let held = now.saturating_duration_since(since);
            debug!("buttons: both released after {} ms", held.as_millis());
            if held < config.calibrate_hold {
                gestures.short_press = match self.lifecycle {
                    _ if calibrating => true,
                    // 正常模式下停止已在按下时执行，这里只是兜底
                    PressLifecycle::Pressed { handled_on_press, .. } => !handled_on_press,
                    _ => false,
                };
            }
            gestures.paired_end = Some(held);
            self.lifecycle = PressLifecycle::Idle;
        }

        gestures.pair_active = both || self.near_simultaneous(input, config.pairing_window);
        gestures
    }

    fn check_hold(&mut self, now: Instant, calibrating: bool, config: &ControllerConfig) -> Option<HoldTier> {
        let since = self.lifecycle.since()?;
        let held = now.saturating_duration_since(since);
        match self.lifecycle {
            PressLifecycle::ResetFired { .. } => None,
            _ if held >= config.reset_hold => {
                self.lifecycle = PressLifecycle::ResetFired { since };
                Some(HoldTier::Reset)
            }
            PressLifecycle::Pressed { .. } if held >= config.calibrate_hold && !calibrating => {
                self.lifecycle = PressLifecycle::CalibrateFired { since };
                Some(HoldTier::Calibrate)
            }
            _ => None,
        }
    }

    fn near_simultaneous(&self, input: &InputSnapshot, window: Duration) -> bool {
        let within = |at: Option<Instant>| {
            at.is_some_and(|at| input.now.saturating_duration_since(at) <= window)
        };
        (input.down_pressed && within(self.up_last_pressed_at))
            || (input.up_pressed && within(self.down_last_pressed_at))
    }

    /// 当前是否处于一次组合按压之中。
    pub fn is_paired(&self) -> bool {
        self.lifecycle != PressLifecycle::Idle
    }

    /// 当前组合按压开始的时间。
    pub fn paired_since(&self) -> Option<Instant> {
        self.lifecycle.since()
    }

    pub fn up_last_pressed_at(&self) -> Option<Instant> {
        self.up_last_pressed_at
    }

    pub fn down_last_pressed_at(&self) -> Option<Instant> {
        self.down_last_pressed_at
    }
}
