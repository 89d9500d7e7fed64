use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;

/// 非阻塞的 LED 闪烁序列器。
///
/// `start` 立即点亮指示灯，之后每次 `advance` 只比较时间戳，
/// 间隔到达时翻转一次电平。序列结束时强制熄灭。
pub struct Blink<P: OutputPin> {
    pin: P,
    remaining: u16,
    interval: Duration,
    last_toggle: Instant,
    level: bool,
}

impl<P: OutputPin> Blink<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            remaining: 0,
            interval: Duration::from_ticks(0),
            last_toggle: Instant::from_ticks(0),
            level: false,
        }
    }

    /// 开始一个 `pulses` 次亮灭的闪烁序列。
    ///
    /// `pulses` 为 0 或 `interval` 为 0 时不做任何事。
    /// 每个脉冲包含亮、灭两次翻转，起始的“亮”在这里就已消耗掉。
    pub fn start(&mut self, pulses: u16, interval: Duration, now: Instant) {
        if pulses == 0 || interval.as_ticks() == 0 {
            return;
        }
        self.remaining = pulses.saturating_mul(2) - 1;
        self.interval = interval;
        self.last_toggle = now;
        self.set_level(true);
    }

    /// 推进一次序列，必须在每个轮询周期调用。
    pub fn advance(&mut self, now: Instant) {
        if self.remaining == 0 {
            return;
        }
        if now.saturating_duration_since(self.last_toggle) < self.interval {
            return;
        }
        let next = !self.level;
        self.set_level(next);
        self.last_toggle = now;
        self.remaining -= 1;
        if self.remaining == 0 {
            self.set_level(false);
        }
    }

    /// 序列是否已经结束。
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    /// 剩余的翻转次数。
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// 指示灯当前电平。
    pub fn is_on(&self) -> bool {
        self.level
    }

    /// 直接驱动指示灯，不影响正在进行的序列计数。
    pub fn set_level(&mut self, on: bool) {
        self.level = on;
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    /// 获取底层引脚的不可变引用
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
