//! 机器人状态记录（UDP 实时通道，控制器 → 客户端）
//!
//! 每个控制周期控制器下发一条 `RobotState` 数据报，布局固定 790 字节。
//! 解码对长度做精确校验，拒绝截断或超长的数据报。

use crate::protocol::{get_f64s, get_u32, put_f64s, put_u32, ProtocolError};

/// 状态记录的固定线上长度（字节）
///
/// 布局：message_id(4) + 98 个 f64(784) + 两个模式字节(2)
pub const ROBOT_STATE_WIRE_SIZE: usize = 790;

/// 运动发生器模式
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionGeneratorMode {
    Idle = 0,
    JointPosition = 1,
    JointVelocity = 2,
    CartesianPosition = 3,
    CartesianVelocity = 4,
}

impl MotionGeneratorMode {
    /// 从线上字节还原模式
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MotionGeneratorMode::Idle),
            1 => Some(MotionGeneratorMode::JointPosition),
            2 => Some(MotionGeneratorMode::JointVelocity),
            3 => Some(MotionGeneratorMode::CartesianPosition),
            4 => Some(MotionGeneratorMode::CartesianVelocity),
            _ => None,
        }
    }
}

/// 控制器模式
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    JointImpedance = 0,
    CartesianImpedance = 1,
    ExternalController = 2,
    MotorPD = 3,
    JointPosition = 4,
    JointVelocity = 5,
    Other = 6,
}

impl ControllerMode {
    /// 从线上字节还原模式
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ControllerMode::JointImpedance),
            1 => Some(ControllerMode::CartesianImpedance),
            2 => Some(ControllerMode::ExternalController),
            3 => Some(ControllerMode::MotorPD),
            4 => Some(ControllerMode::JointPosition),
            5 => Some(ControllerMode::JointVelocity),
            6 => Some(ControllerMode::Other),
            _ => None,
        }
    }
}

/// 机器人状态（每周期一条）
///
/// 字段命名沿用机器人学惯例（`O_T_EE` 为基座系到末端系的 4x4 列主序位姿矩阵，
/// `tau_J` 为关节测量力矩），因此允许非 snake_case。
///
/// # 字段
///
/// - 关节量（宽度 7）：测量位置 `q`、期望位置 `q_d`、测量速度 `dq`、
///   测量力矩 `tau_J`、力矩导数 `dtau_J`、外力矩估计 `tau_ext_hat_filtered`、
///   逐关节接触/碰撞水平
/// - 笛卡尔量：末端位姿 `O_T_EE_start`、肘部状态 `elbow_start`、
///   逐轴接触/碰撞水平、基座系/末端系外力旋量
/// - 模式字段与单调递增的 `message_id`
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    /// 控制器打在每条状态上的单调消息号，客户端在对应命令上回显
    pub message_id: u32,
    /// 末端执行器位姿（4x4 列主序）
    pub O_T_EE_start: [f64; 16],
    /// 肘部状态
    pub elbow_start: [f64; 2],
    /// 关节测量力矩 (Nm)
    pub tau_J: [f64; 7],
    /// 关节力矩导数 (Nm/s)
    pub dtau_J: [f64; 7],
    /// 关节测量位置 (rad)
    pub q: [f64; 7],
    /// 关节期望位置 (rad)
    pub q_d: [f64; 7],
    /// 关节测量速度 (rad/s)
    pub dq: [f64; 7],
    /// 滤波后的外部力矩估计 (Nm)
    pub tau_ext_hat_filtered: [f64; 7],
    /// 逐关节接触水平
    pub joint_contact: [f64; 7],
    /// 逐关节碰撞水平
    pub joint_collision: [f64; 7],
    /// 逐轴笛卡尔接触水平
    pub cartesian_contact: [f64; 6],
    /// 逐轴笛卡尔碰撞水平
    pub cartesian_collision: [f64; 6],
    /// 基座系下的末端外力旋量
    pub O_F_ext_hat_EE: [f64; 6],
    /// 末端系下的末端外力旋量
    pub EE_F_ext_hat_EE: [f64; 6],
    /// 当前运动发生器模式
    pub motion_generator_mode: MotionGeneratorMode,
    /// 当前控制器模式
    pub controller_mode: ControllerMode,
}

impl Default for RobotState {
    fn default() -> Self {
        RobotState {
            message_id: 0,
            O_T_EE_start: [0.0; 16],
            elbow_start: [0.0; 2],
            tau_J: [0.0; 7],
            dtau_J: [0.0; 7],
            q: [0.0; 7],
            q_d: [0.0; 7],
            dq: [0.0; 7],
            tau_ext_hat_filtered: [0.0; 7],
            joint_contact: [0.0; 7],
            joint_collision: [0.0; 7],
            cartesian_contact: [0.0; 6],
            cartesian_collision: [0.0; 6],
            O_F_ext_hat_EE: [0.0; 6],
            EE_F_ext_hat_EE: [0.0; 6],
            motion_generator_mode: MotionGeneratorMode::Idle,
            controller_mode: ControllerMode::JointImpedance,
        }
    }
}

impl RobotState {
    /// 编码为固定布局的线上记录
    pub fn encode(&self, buf: &mut [u8; ROBOT_STATE_WIRE_SIZE]) {
        let mut pos = put_u32(buf, 0, self.message_id);
        pos = put_f64s(buf, pos, &self.O_T_EE_start);
        pos = put_f64s(buf, pos, &self.elbow_start);
        pos = put_f64s(buf, pos, &self.tau_J);
        pos = put_f64s(buf, pos, &self.dtau_J);
        pos = put_f64s(buf, pos, &self.q);
        pos = put_f64s(buf, pos, &self.q_d);
        pos = put_f64s(buf, pos, &self.dq);
        pos = put_f64s(buf, pos, &self.tau_ext_hat_filtered);
        pos = put_f64s(buf, pos, &self.joint_contact);
        pos = put_f64s(buf, pos, &self.joint_collision);
        pos = put_f64s(buf, pos, &self.cartesian_contact);
        pos = put_f64s(buf, pos, &self.cartesian_collision);
        pos = put_f64s(buf, pos, &self.O_F_ext_hat_EE);
        pos = put_f64s(buf, pos, &self.EE_F_ext_hat_EE);
        buf[pos] = self.motion_generator_mode as u8;
        buf[pos + 1] = self.controller_mode as u8;
        debug_assert_eq!(pos + 2, ROBOT_STATE_WIRE_SIZE);
    }

    /// 从线上记录解码
    ///
    /// # 错误
    ///
    /// - `ProtocolError::InvalidLength`: 数据报长度不是精确的 790 字节
    /// - `ProtocolError::InvalidValue`: 模式字节不在枚举范围内
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() != ROBOT_STATE_WIRE_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: ROBOT_STATE_WIRE_SIZE,
                actual: buf.len(),
            });
        }

        let mut state = RobotState::default();
        state.message_id = get_u32(buf, 0);
        let mut pos = 4;
        pos = get_f64s(buf, pos, &mut state.O_T_EE_start);
        pos = get_f64s(buf, pos, &mut state.elbow_start);
        pos = get_f64s(buf, pos, &mut state.tau_J);
        pos = get_f64s(buf, pos, &mut state.dtau_J);
        pos = get_f64s(buf, pos, &mut state.q);
        pos = get_f64s(buf, pos, &mut state.q_d);
        pos = get_f64s(buf, pos, &mut state.dq);
        pos = get_f64s(buf, pos, &mut state.tau_ext_hat_filtered);
        pos = get_f64s(buf, pos, &mut state.joint_contact);
        pos = get_f64s(buf, pos, &mut state.joint_collision);
        pos = get_f64s(buf, pos, &mut state.cartesian_contact);
        pos = get_f64s(buf, pos, &mut state.cartesian_collision);
        pos = get_f64s(buf, pos, &mut state.O_F_ext_hat_EE);
        pos = get_f64s(buf, pos, &mut state.EE_F_ext_hat_EE);

        state.motion_generator_mode = MotionGeneratorMode::from_u8(buf[pos]).ok_or(
            ProtocolError::InvalidValue {
                field: "motion_generator_mode",
                value: buf[pos] as u16,
            },
        )?;
        state.controller_mode =
            ControllerMode::from_u8(buf[pos + 1]).ok_or(ProtocolError::InvalidValue {
                field: "controller_mode",
                value: buf[pos + 1] as u16,
            })?;

        Ok(state)
    }
}
