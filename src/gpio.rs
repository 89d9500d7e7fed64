use crate::ButtonInput;
use embedded_hal::digital::InputPin;

/// 定义GPIO按钮的有效电平。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveLevel {
    /// 低电平有效（例如，使用上拉电阻，按下时引脚接地）。
    Low,
    /// 高电平有效（例如，使用下拉电阻，按下时引脚接VCC）。
    High,
}

/// 一个直接由GPIO输入引脚驱动的按钮。
///
/// 引脚电平应当已经由下层完成消抖。只有 `is_pressed` 会读取引脚，
/// 读到的按下边沿被锁存，直到下一次 `was_pressed` 取走。
pub struct GpioButton<P: InputPin> {
    pin: P,
    active_level: ActiveLevel,
    last_pressed: bool,
    press_latched: bool,
}

impl<P: InputPin> GpioButton<P> {
    /// 创建一个新的GPIO按钮。
    ///
    /// # 参数
    /// * `pin`: 一个实现了 `InputPin` 的GPIO引脚。
    /// * `active_level`: 定义了按钮按下时的有效电平 (`ActiveLevel::Low` 或 `ActiveLevel::High`)。
    pub fn new(pin: P, active_level: ActiveLevel) -> Self {
        Self {
            pin,
            active_level,
            last_pressed: false,
            press_latched: false,
        }
    }

    fn read(&mut self) -> bool {
        // 读取失败按“未按下”处理
        let pressed = match self.active_level {
            ActiveLevel::Low => self.pin.is_low().unwrap_or(false),
            ActiveLevel::High => self.pin.is_high().unwrap_or(false),
        };
        if pressed && !self.last_pressed {
            self.press_latched = true;
        }
        self.last_pressed = pressed;
        pressed
    }
}

impl<P: InputPin> ButtonInput for GpioButton<P> {
    fn is_pressed(&mut self) -> bool {
        self.read()
    }

    fn was_pressed(&mut self) -> bool {
        core::mem::take(&mut self.press_latched)
    }
}
