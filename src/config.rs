use embassy_time::Duration;

/// 电机的运动参数（最大速度与加速度）。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfile {
    /// 最大速度，单位：步/秒。
    pub max_speed: f32,
    /// 加速度，单位：步/秒²。
    pub acceleration: f32,
}

/// 控制器的全部可调参数。
///
/// 时间相关的阈值决定了按键手势的判定方式，
/// 其余字段描述校准与运动行为。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// 配对窗口。
    ///
    /// 一个按键按住时，如果另一个按键在此窗口内被按下过，
    /// 就把两者视为同一个组合手势，单键预设会被抑制。
    pub pairing_window: Duration,

    /// 上电后的静默期，期间所有按键输入都被丢弃。
    pub startup_grace: Duration,

    /// 组合长按进入校准模式所需的时长。
    ///
    /// 同时也是短按与长按的分界：释放时持续时间小于此值才算短按。
    pub calibrate_hold: Duration,

    /// 组合长按触发硬复位所需的时长。
    pub reset_hold: Duration,

    /// 校准确认闪烁的脉冲数。
    pub confirm_pulses: u16,

    /// 校准确认闪烁的半周期。
    pub confirm_interval: Duration,

    /// 可接受的最小行程（步数），小于此值的校准会被拒绝。
    pub min_travel: i32,

    /// 单击“上”键请求的逻辑位置。
    pub preset_up: u8,

    /// 单击“下”键请求的逻辑位置。
    pub preset_down: u8,

    /// 正常模式下的运动参数。
    pub normal_motion: MotionProfile,

    /// 校准模式下的运动参数，通常更慢以便手动点动。
    pub calibration_motion: MotionProfile,
}

impl Default for ControllerConfig {
    /// 提供一套合理的默认配置。
    ///
    /// - 配对窗口: 300ms
    /// - 上电静默: 10s
    /// - 进入校准: 5s
    /// - 硬复位: 10s
    /// - 确认闪烁: 5 次, 80ms
    /// - 最小行程: 100 步
    fn default() -> Self {
        Self {
            pairing_window: Duration::from_millis(300),
            startup_grace: Duration::from_secs(10),
            calibrate_hold: Duration::from_secs(5),
            reset_hold: Duration::from_secs(10),
            confirm_pulses: 5,
            confirm_interval: Duration::from_millis(80),
            min_travel: 100,
            preset_up: 100,
            preset_down: 0,
            normal_motion: MotionProfile {
                max_speed: 1000.0,
                acceleration: 500.0,
            },
            calibration_motion: MotionProfile {
                max_speed: 300.0,
                acceleration: 200.0,
            },
        }
    }
}
