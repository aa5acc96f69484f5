//! 应用层控制循环
//!
//! `Robot::control()` 替调用方驱动「启动 → 逐周期 update → 停止」的完整流程：
//! 每个周期把收到的状态和距上个周期的时长交给用户回调，取回一条带结束语义的
//! 命令并转发。回调通过返回 [`ControlSignal::Finished`] 结束运动，循环会在
//! 终止周期强制打上 `motion_generation_finished` 标志（不信任回调自带的值），
//! 然后进入等待终止响应的收尾阶段。

use std::time::Duration;

use crate::protocol::{
    ControllerCommand, ControllerMode, Deviation, MotionGeneratorCommand, MotionGeneratorMode,
    MoveStatus, RobotState,
};
use crate::robot::error::RobotError;
use crate::robot::robot_impl::Robot;

/// 实时流的标称周期：每个消息号对应 1ms
const CYCLE_PERIOD: Duration = Duration::from_millis(1);

/// 一个周期的命令载荷
///
/// 运动命令必填；力矩命令只在外部控制器模式下给出，
/// 组合是否合法由状态机在发送前校验。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleCommand {
    pub motion: MotionGeneratorCommand,
    pub control: Option<ControllerCommand>,
}

impl CycleCommand {
    /// 仅运动命令（内部控制器模式）
    pub fn from_motion(motion: MotionGeneratorCommand) -> Self {
        CycleCommand {
            motion,
            control: None,
        }
    }

    /// 运动命令 + 力矩命令（外部控制器模式）
    pub fn with_torques(motion: MotionGeneratorCommand, control: ControllerCommand) -> Self {
        CycleCommand {
            motion,
            control: Some(control),
        }
    }
}

/// 用户回调每周期的输出
#[derive(Debug, Clone, PartialEq)]
pub enum ControlSignal {
    /// 继续运动，提交本周期命令
    Continue(CycleCommand),
    /// 提交最后一条命令并结束运动
    Finished(CycleCommand),
}

impl Robot {
    /// 运行一个完整的闭环控制会话
    ///
    /// 回调是 `(状态, 距上周期的时长) -> 命令` 的纯函数；第一周期的时长为零，
    /// 之后按消息号差值折算（每号 1ms），丢包时自然变大。
    ///
    /// 回调返回 `Err` 时，循环先干净地停掉运动（终止周期 + 等待终止响应），
    /// 再把用户错误原样上抛。
    ///
    /// # 参数
    ///
    /// - `controller_mode`: 与运动耦合的控制器模式；`ExternalController`
    ///   要求回调每周期通过 [`CycleCommand::with_torques`] 附带力矩命令
    /// - `motion_generator_mode`: 运动发生器模式
    /// - `maximum_path_deviation` / `maximum_goal_pose_deviation`: 启动容差
    /// - `callback`: 用户控制回调
    ///
    /// # 错误
    ///
    /// - `RobotError::Control`: 启动被拒、运动被对端终止、命令组合不合法
    /// - `RobotError::Network`: 实时流超时或可靠通道断开
    pub fn control<F>(
        &mut self,
        controller_mode: ControllerMode,
        motion_generator_mode: MotionGeneratorMode,
        maximum_path_deviation: Deviation,
        maximum_goal_pose_deviation: Deviation,
        mut callback: F,
    ) -> Result<(), RobotError>
    where
        F: FnMut(&RobotState, Duration) -> Result<ControlSignal, RobotError>,
    {
        self.start_motion(
            controller_mode,
            motion_generator_mode,
            maximum_path_deviation,
            maximum_goal_pose_deviation,
        )?;

        let mut previous_id: Option<u32> = None;
        loop {
            let state = self.receive_state()?;
            if let Some(status) = self.take_motion_termination() {
                return Err(RobotError::Control(format!("motion {}", status.describe())));
            }

            let period = match previous_id {
                Some(previous) => CYCLE_PERIOD * state.message_id.wrapping_sub(previous),
                None => Duration::ZERO,
            };
            previous_id = Some(state.message_id);

            match callback(&state, period) {
                Ok(ControlSignal::Continue(cycle)) => {
                    self.send_cycle_command(&state, &cycle, false)?;
                }
                Ok(ControlSignal::Finished(cycle)) => {
                    self.send_cycle_command(&state, &cycle, true)?;
                    let status = self.wait_for_motion_termination()?;
                    if status != MoveStatus::Success {
                        return Err(RobotError::Control(format!(
                            "motion {}",
                            status.describe()
                        )));
                    }
                    return Ok(());
                }
                Err(user_error) => {
                    // 用户回调失败：尽力收尾，但上抛的一定是用户自己的错误
                    let _ = self.send_finished_command(&state);
                    let _ = self.wait_for_motion_termination();
                    return Err(user_error);
                }
            }
        }
    }
}
