//! 机器人命令记录（UDP 实时通道，客户端 → 控制器）
//!
//! 客户端对收到的每条状态至多回发一条 `RobotCommand`，
//! `message_id` 必须回显触发它的那条状态的消息号。

use crate::protocol::{get_f64s, get_u32, put_f64s, put_u32, ProtocolError};

/// 命令记录的固定线上长度（字节）
///
/// 布局：message_id(4) + 运动子记录(306) + 控制子记录(56)
pub const ROBOT_COMMAND_WIRE_SIZE: usize = 366;

/// 运动发生器命令
///
/// 按当前运动模式只填充对应的变体字段，其余保持零。
/// `motion_generation_finished` 由状态机在终止周期打上，调用方通常不直接设置。
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct MotionGeneratorCommand {
    /// 期望关节位置 (rad)
    pub q_c: [f64; 7],
    /// 期望关节速度 (rad/s)
    pub dq_c: [f64; 7],
    /// 期望末端位姿（4x4 列主序）
    pub O_T_EE_c: [f64; 16],
    /// 期望末端速度旋量
    pub O_dP_EE_c: [f64; 6],
    /// 期望肘部状态
    pub elbow_c: [f64; 2],
    /// 肘部字段是否有效
    pub valid_elbow: bool,
    /// 运动结束标志，仅在终止周期为 true
    pub motion_generation_finished: bool,
}

impl Default for MotionGeneratorCommand {
    fn default() -> Self {
        MotionGeneratorCommand {
            q_c: [0.0; 7],
            dq_c: [0.0; 7],
            O_T_EE_c: [0.0; 16],
            O_dP_EE_c: [0.0; 6],
            elbow_c: [0.0; 2],
            valid_elbow: false,
            motion_generation_finished: false,
        }
    }
}

/// 控制器命令（外部控制器模式下每周期的期望关节力矩）
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerCommand {
    /// 期望关节力矩 (Nm)
    pub tau_J_d: [f64; 7],
}

/// 每周期的完整命令记录
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RobotCommand {
    /// 回显触发本命令的状态消息号
    pub message_id: u32,
    pub motion: MotionGeneratorCommand,
    pub control: ControllerCommand,
}

impl RobotCommand {
    /// 编码为固定布局的线上记录
    pub fn encode(&self, buf: &mut [u8; ROBOT_COMMAND_WIRE_SIZE]) {
        let mut pos = put_u32(buf, 0, self.message_id);
        pos = put_f64s(buf, pos, &self.motion.q_c);
        pos = put_f64s(buf, pos, &self.motion.dq_c);
        pos = put_f64s(buf, pos, &self.motion.O_T_EE_c);
        pos = put_f64s(buf, pos, &self.motion.O_dP_EE_c);
        pos = put_f64s(buf, pos, &self.motion.elbow_c);
        buf[pos] = self.motion.valid_elbow as u8;
        buf[pos + 1] = self.motion.motion_generation_finished as u8;
        pos += 2;
        pos = put_f64s(buf, pos, &self.control.tau_J_d);
        debug_assert_eq!(pos, ROBOT_COMMAND_WIRE_SIZE);
    }

    /// 从线上记录解码
    ///
    /// # 错误
    ///
    /// - `ProtocolError::InvalidLength`: 长度不是精确的 366 字节
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() != ROBOT_COMMAND_WIRE_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: ROBOT_COMMAND_WIRE_SIZE,
                actual: buf.len(),
            });
        }

        let mut command = RobotCommand::default();
        command.message_id = get_u32(buf, 0);
        let mut pos = 4;
        pos = get_f64s(buf, pos, &mut command.motion.q_c);
        pos = get_f64s(buf, pos, &mut command.motion.dq_c);
        pos = get_f64s(buf, pos, &mut command.motion.O_T_EE_c);
        pos = get_f64s(buf, pos, &mut command.motion.O_dP_EE_c);
        pos = get_f64s(buf, pos, &mut command.motion.elbow_c);
        command.motion.valid_elbow = buf[pos] != 0;
        command.motion.motion_generation_finished = buf[pos + 1] != 0;
        pos += 2;
        get_f64s(buf, pos, &mut command.control.tau_J_d);

        Ok(command)
    }
}
