//! 家庭自动化层（窗帘附件）的特征值与通知接口。

/// 窗帘附件对外暴露的特征。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    TargetPosition,
    CurrentPosition,
    PositionState,
}

/// 运动状态特征的取值。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PositionState {
    Decreasing = 0,
    Increasing = 1,
    #[default]
    Stopped = 2,
}

impl PositionState {
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// 向家庭自动化层推送特征值变化。
pub trait Notifier {
    type Error;
    fn notify(&mut self, characteristic: Characteristic, value: i32) -> Result<(), Self::Error>;
}

/// 推送一次通知，失败只记录日志，不重试。
pub(crate) fn publish<N: Notifier>(notifier: &mut N, characteristic: Characteristic, value: i32) -> bool {
    match notifier.notify(characteristic, value) {
        Ok(()) => true,
        Err(_) => {
            warn!("notify failed for {} = {}", characteristic, value);
            false
        }
    }
}
