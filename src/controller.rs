use embassy_time::{Duration, Instant, Ticker};
use embedded_hal::digital::OutputPin;

use crate::accessory::{publish, Characteristic, Notifier, PositionState};
use crate::blink::Blink;
use crate::calibration::{self, CalibrationOutcome, CalibrationStep, SavedConfig};
use crate::config::{ControllerConfig, MotionProfile};
use crate::gesture::{GestureDetector, Gestures, HoldTier};
use crate::{ButtonInput, Clock, InputSnapshot};

/// 步进电机控制器。
pub trait Motor {
    fn current_position(&mut self) -> i32;
    fn move_to(&mut self, position: i32);
    fn set_current_position(&mut self, position: i32);
    fn set_max_speed(&mut self, speed: f32);
    fn set_acceleration(&mut self, acceleration: f32);
}

/// 配置持久化。
pub trait ConfigStore {
    type Error;
    fn save(&mut self, config: &SavedConfig) -> Result<(), Self::Error>;
}

/// 由外部实现的生命周期动作，返回值不被使用。
pub trait Lifecycle {
    fn reset(&mut self);
    fn calibration_mode_entered(&mut self);
    fn reconnect_network(&mut self);
    fn register_accessory(&mut self);
}

/// 工作模式。校准子状态只存在于 `Calibrate` 中。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Calibrate(CalibrationStep),
}

impl Mode {
    pub fn is_calibrating(&self) -> bool {
        matches!(self, Mode::Calibrate(_))
    }
}

/// 一个周期内触发的动作。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 就地停止，附带新的目标位置。
    Stop { target: u8 },
    /// 单键预设，附带请求的目标位置。
    Preset { target: u8 },
    EnterCalibration,
    HardReset,
    Calibration(CalibrationOutcome),
}

pub type Actions = heapless::Vec<Action, 4>;

/// 控制器的全部可变状态。
#[derive(Debug)]
pub struct ControllerState {
    pub(crate) mode: Mode,
    pub(crate) gestures: GestureDetector,
    pub min_travel: i32,
    pub up_step: i32,
    pub down_step: i32,
    pub max_steps: i32,
    pub current_step: i32,
    pub target_step: i32,
    pub startup_time: Instant,
    /// 最近一次通知的目标位置特征值。
    pub target_position: u8,
    /// 最近一次通知的当前位置特征值。
    pub current_position: u8,
    pub position_state: PositionState,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig, startup_time: Instant) -> Self {
        Self {
            mode: Mode::Normal,
            gestures: GestureDetector::new(),
            min_travel: config.min_travel,
            up_step: 0,
            down_step: 0,
            max_steps: 0,
            current_step: 0,
            target_step: 0,
            startup_time,
            target_position: 0,
            current_position: 0,
            position_state: PositionState::Stopped,
        }
    }

    /// 应用启动时读取到的持久化配置。
    pub fn restore(&mut self, saved: &SavedConfig) {
        self.max_steps = saved.max_steps;
        self.min_travel = saved.min_travel;
        self.current_step = saved.current_step;
        self.target_step = saved.current_step;
        // 上报值与恢复后的位置保持一致，否则预设可能被误判为“未变化”
        let position = self.logical_position();
        self.target_position = position;
        self.current_position = position;
    }

    pub fn saved_config(&self) -> SavedConfig {
        SavedConfig {
            max_steps: self.max_steps,
            min_travel: self.min_travel,
            current_step: self.current_step,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 校准子状态；正常模式下为 `None`。
    pub fn calibration_step(&self) -> Option<CalibrationStep> {
        match self.mode {
            Mode::Normal => None,
            Mode::Calibrate(step) => Some(step),
        }
    }

    /// 进入校准模式，从 `Init` 开始。
    pub fn enter_calibration(&mut self) {
        self.mode = Mode::Calibrate(CalibrationStep::Init);
    }

    /// 回到正常模式，校准子状态随之清除。
    pub fn enter_normal(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn gestures(&self) -> &GestureDetector {
        &self.gestures
    }

    /// 逻辑位置的百分比表示，未校准时为 0。
    pub fn logical_position(&self) -> u8 {
        if self.max_steps <= 0 {
            return 0;
        }
        let step = i64::from(self.current_step.clamp(0, self.max_steps));
        (step * 100 / i64::from(self.max_steps)) as u8
    }

    fn in_startup_grace(&self, now: Instant, grace: Duration) -> bool {
        now.saturating_duration_since(self.startup_time) <= grace
    }
}

/// 模式分发器：把手势路由到正常模式或校准模式的逻辑。
pub struct Controller<C, M, N, S, L, P>
where
    C: Clock,
    M: Motor,
    N: Notifier,
    S: ConfigStore,
    L: Lifecycle,
    P: OutputPin,
{
    config: ControllerConfig,
    clock: C,
    state: ControllerState,
    blink: Blink<P>,
    motor: M,
    notifier: N,
    store: S,
    lifecycle: L,
}

impl<C, M, N, S, L, P> Controller<C, M, N, S, L, P>
where
    C: Clock,
    M: Motor,
    N: Notifier,
    S: ConfigStore,
    L: Lifecycle,
    P: OutputPin,
{
    /// 创建控制器，以当前时刻作为上电时间。
    pub fn new(config: ControllerConfig, clock: C, motor: M, notifier: N, store: S, lifecycle: L, led: P) -> Self {
        let state = ControllerState::new(&config, clock.now());
        Self {
            config,
            clock,
            state,
            blink: Blink::new(led),
            motor,
            notifier,
            store,
            lifecycle,
        }
    }

    /// 采样一次两个按键并处理这个周期。
    pub fn poll<U: ButtonInput, D: ButtonInput>(&mut self, up: &mut U, down: &mut D) -> Actions {
        let input = InputSnapshot::sample(up, down, self.clock.now());
        self.handle_input(input)
    }

    /// 处理一个周期的输入快照，返回本周期触发的动作。
    pub fn handle_input(&mut self, input: InputSnapshot) -> Actions {
        let mut actions = Actions::new();

        // 上电静默期内快照照常采样，边沿被丢弃
        if self.state.in_startup_grace(input.now, self.config.startup_grace) {
            return actions;
        }

        let calibrating = self.state.mode.is_calibrating();
        let gestures = self.state.gestures.update(&input, calibrating, &self.config);

        // 正常模式下停止动作在按下瞬间执行
        if gestures.paired_begin && !calibrating {
            let target = self.stop();
            let _ = actions.push(Action::Stop { target });
        }

        match gestures.hold {
            Some(HoldTier::Reset) => {
                self.hard_reset();
                let _ = actions.push(Action::HardReset);
            }
            Some(HoldTier::Calibrate) => {
                self.enter_calibration();
                let _ = actions.push(Action::EnterCalibration);
            }
            None => {}
        }

        if self.state.mode.is_calibrating() {
            self.dispatch_calibrate(&gestures, &mut actions);
        } else {
            self.dispatch_normal(&gestures, &mut actions);
        }
        actions
    }

    fn dispatch_calibrate(&mut self, gestures: &Gestures, actions: &mut Actions) {
        if !gestures.short_press {
            return;
        }
        let outcome = calibration::capture(
            &mut self.state,
            &self.config,
            &mut self.motor,
            &mut self.notifier,
            &mut self.store,
        );
        if let Some(outcome) = outcome {
            if !matches!(outcome, CalibrationOutcome::Rejected { .. }) {
                self.start_blink(self.config.confirm_pulses, self.config.confirm_interval);
            }
            let _ = actions.push(Action::Calibration(outcome));
        }
    }

    fn dispatch_normal(&mut self, gestures: &Gestures, actions: &mut Actions) {
        if gestures.short_press {
            let target = self.stop();
            let _ = actions.push(Action::Stop { target });
        } else if gestures.pair_active {
            // 组合手势进行中，抑制单键预设
        } else {
            if gestures.up_tap {
                let _ = actions.push(Action::Preset {
                    target: self.request_target(self.config.preset_up),
                });
            }
            if gestures.down_tap {
                let _ = actions.push(Action::Preset {
                    target: self.request_target(self.config.preset_down),
                });
            }
        }
    }

    /// 就地停止：目标设为当前逻辑位置，电机停在当前物理位置。
    fn stop(&mut self) -> u8 {
        let target = self.state.logical_position();
        info!("stop at position {}%", target);
        self.state.target_position = target;
        publish(&mut self.notifier, Characteristic::TargetPosition, i32::from(target));

        let here = self.motor.current_position();
        self.state.target_step = here;
        self.motor.move_to(here);

        self.state.position_state = PositionState::Stopped;
        publish(
            &mut self.notifier,
            Characteristic::PositionState,
            PositionState::Stopped.value(),
        );
        target
    }

    /// 只有目标值真的改变时才通知。
    fn request_target(&mut self, target: u8) -> u8 {
        if self.state.target_position != target {
            info!("preset: target position {}%", target);
            self.state.target_position = target;
            publish(&mut self.notifier, Characteristic::TargetPosition, i32::from(target));
        }
        target
    }

    fn enter_calibration(&mut self) {
        info!("entering calibration mode");
        self.state.enter_calibration();
        self.apply_motion(self.config.calibration_motion);
        self.lifecycle.calibration_mode_entered();
    }

    fn hard_reset(&mut self) {
        warn!("hard reset requested");
        self.lifecycle.reset();
        self.blink.set_level(true);
        self.lifecycle.reconnect_network();
        self.lifecycle.register_accessory();
        self.blink.set_level(false);
    }

    fn apply_motion(&mut self, profile: MotionProfile) {
        self.motor.set_max_speed(profile.max_speed);
        self.motor.set_acceleration(profile.acceleration);
    }

    /// 开始一个闪烁序列，参数非法时不做任何事。
    pub fn start_blink(&mut self, pulses: u16, interval: Duration) {
        let now = self.clock.now();
        self.blink.start(pulses, interval, now);
    }

    /// 推进闪烁序列，每个轮询周期调用一次。
    pub fn advance_blink(&mut self) {
        let now = self.clock.now();
        self.blink.advance(now);
    }

    pub fn current_logical_position(&self) -> u8 {
        self.state.logical_position()
    }

    /// 外部运动逻辑上报当前的逻辑步数。
    pub fn set_current_step(&mut self, step: i32) {
        self.state.current_step = step;
    }

    /// 驱动轮询循环：每个 tick 处理一次输入并推进闪烁。
    pub async fn run<U: ButtonInput, D: ButtonInput>(&mut self, up: &mut U, down: &mut D, poll_interval: Duration) -> ! {
        let mut ticker = Ticker::every(poll_interval);
        loop {
            self.poll(up, down);
            self.advance_blink();
            ticker.next().await;
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    pub fn blink(&self) -> &Blink<P> {
        &self.blink
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }
}
