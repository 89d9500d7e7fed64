//! 校准状态机。
//!
//! 校准分两步：第一次组合短按记录顶部的原始步数，
//! 第二次记录底部并测量行程。行程足够时重新设定坐标原点，
//! 使顶部成为逻辑位置 0，底部成为 `max_steps`。

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::accessory::{publish, Characteristic, Notifier};
use crate::config::ControllerConfig;
use crate::controller::{ConfigStore, ControllerState, Mode, Motor};

/// 校准子状态，仅在校准模式下有意义。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    /// 尚未记录任何参考点。
    Init,
    /// 顶部参考点已记录。
    UpKnown,
}

/// 一次校准捕获的结果。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// 顶部已记录，进入 `UpKnown`。
    TopCaptured { up_step: i32 },
    /// 行程小于 `min_travel`（或超出 `i32` 范围，此时 `travel` 为 `i32::MAX`），
    /// 保持 `UpKnown`，需要重新记录底部。
    Rejected { travel: i32 },
    /// 校准完成并已切回正常模式。
    ///
    /// `persisted` 为假表示保存失败，新数值只存在于内存中。
    Completed { max_steps: i32, rebased_step: i32, persisted: bool },
}

/// 需要持久化的校准结果。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedConfig {
    pub max_steps: i32,
    pub min_travel: i32,
    pub current_step: i32,
}

/// 在校准模式下处理一次组合短按。
///
/// 不在校准模式时返回 `None`。重设原点的所有写入
/// （电机参考位置、`current_step`、`max_steps`）都在这一次调用内完成，
/// 期间不会发出任何运动指令。
pub fn capture<M, N, S>(
    state: &mut ControllerState,
    config: &ControllerConfig,
    motor: &mut M,
    notifier: &mut N,
    store: &mut S,
) -> Option<CalibrationOutcome>
where
    M: Motor,
    N: Notifier,
    S: ConfigStore,
{
    let Mode::Calibrate(step) = state.mode else {
        return None;
    };

    let outcome = match step {
        CalibrationStep::Init => {
            // 用户可能把窗帘开过了原来的逻辑零点，所以记录原始步数
            state.up_step = motor.current_position();
            state.mode = Mode::Calibrate(CalibrationStep::UpKnown);
            info!("calibration: saved top raw position = {}", state.up_step);
            CalibrationOutcome::TopCaptured { up_step: state.up_step }
        }
        CalibrationStep::UpKnown => {
            state.down_step = motor.current_position();
            info!("calibration: saved bottom raw position = {}", state.down_step);

            let Some(rebased) = state.current_step.checked_sub(state.up_step) else {
                warn!("calibration: travel out of range, not saved");
                return Some(CalibrationOutcome::Rejected { travel: i32::MAX });
            };
            let Some(travel) = rebased.checked_abs() else {
                warn!("calibration: travel out of range, not saved");
                return Some(CalibrationOutcome::Rejected { travel: i32::MAX });
            };
            info!("calibration: measured travel = {}", travel);
            if travel < state.min_travel {
                warn!("calibration: travel {} below minimum {}, not saved", travel, state.min_travel);
                return Some(CalibrationOutcome::Rejected { travel });
            }

            motor.set_current_position(rebased);
            state.current_step = rebased;
            state.max_steps = travel;

            state.target_position = 0;
            publish(notifier, Characteristic::TargetPosition, 0);
            state.current_position = 0;
            publish(notifier, Characteristic::CurrentPosition, 0);

            state.enter_normal();
            motor.set_max_speed(config.normal_motion.max_speed);
            motor.set_acceleration(config.normal_motion.acceleration);

            let persisted = match store.save(&state.saved_config()) {
                Ok(()) => true,
                Err(_) => {
                    warn!("calibration: saving config failed, values kept in memory only");
                    false
                }
            };
            info!("calibration: finished, max steps = {}, rebased to {}", travel, rebased);
            CalibrationOutcome::Completed {
                max_steps: travel,
                rebased_step: rebased,
                persisted,
            }
        }
    };
    Some(outcome)
}
