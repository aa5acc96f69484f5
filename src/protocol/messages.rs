//! 可靠通道消息（TCP，请求/响应 + 会话握手）
//!
//! 可靠通道不带长度前缀：请求以 `u16` 命令号开头，命令号决定定长请求体；
//! 响应统一为 4 字节（命令号 + 状态）。会话开始时的 `ConnectRequest` /
//! `ConnectReply` 是裸 4 字节记录，只出现一次，之后才有带命令号的流量。

use crate::protocol::{
    get_f64s, get_u16, put_f64s, put_u16, ControllerMode, MotionGeneratorMode, ProtocolError,
};

// ============================================================================
// 会话握手
// ============================================================================

/// 握手请求长度（字节）
pub const CONNECT_REQUEST_SIZE: usize = 4;
/// 握手响应长度（字节）
pub const CONNECT_REPLY_SIZE: usize = 4;

/// 握手状态
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Success = 0,
    IncompatibleLibraryVersion = 1,
}

impl ConnectStatus {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(ConnectStatus::Success),
            1 => Some(ConnectStatus::IncompatibleLibraryVersion),
            _ => None,
        }
    }
}

/// 握手请求（客户端 → 控制器）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    /// 客户端协议版本
    pub version: u16,
    /// 客户端为实时流绑定的本地 UDP 端口（由操作系统分配后上报）
    pub udp_port: u16,
}

impl ConnectRequest {
    pub fn encode(&self, buf: &mut [u8; CONNECT_REQUEST_SIZE]) {
        put_u16(buf, 0, self.version);
        put_u16(buf, 2, self.udp_port);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() != CONNECT_REQUEST_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: CONNECT_REQUEST_SIZE,
                actual: buf.len(),
            });
        }
        Ok(ConnectRequest {
            version: get_u16(buf, 0),
            udp_port: get_u16(buf, 2),
        })
    }
}

/// 握手响应（控制器 → 客户端）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectReply {
    /// 控制器协议版本
    pub version: u16,
    pub status: ConnectStatus,
}

impl ConnectReply {
    pub fn encode(&self, buf: &mut [u8; CONNECT_REPLY_SIZE]) {
        put_u16(buf, 0, self.version);
        put_u16(buf, 2, self.status as u16);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() != CONNECT_REPLY_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: CONNECT_REPLY_SIZE,
                actual: buf.len(),
            });
        }
        let status_raw = get_u16(buf, 2);
        Ok(ConnectReply {
            version: get_u16(buf, 0),
            status: ConnectStatus::from_u16(status_raw).ok_or(ProtocolError::InvalidValue {
                field: "connect_status",
                value: status_raw,
            })?,
        })
    }
}

// ============================================================================
// 命令号与状态
// ============================================================================

/// 可靠通道命令号
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Move = 1,
    StopMove = 2,
    SetControllerMode = 3,
    SetCollisionBehavior = 4,
    SetJointImpedance = 5,
    SetCartesianImpedance = 6,
    SetGuidingMode = 7,
    SetEEToK = 8,
    SetNEToEE = 9,
    SetLoad = 10,
    SetFilters = 11,
    AutomaticErrorRecovery = 12,
    LoadModelLibrary = 13,
}

impl CommandId {
    /// 从线上命令号还原
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(CommandId::Move),
            2 => Some(CommandId::StopMove),
            3 => Some(CommandId::SetControllerMode),
            4 => Some(CommandId::SetCollisionBehavior),
            5 => Some(CommandId::SetJointImpedance),
            6 => Some(CommandId::SetCartesianImpedance),
            7 => Some(CommandId::SetGuidingMode),
            8 => Some(CommandId::SetEEToK),
            9 => Some(CommandId::SetNEToEE),
            10 => Some(CommandId::SetLoad),
            11 => Some(CommandId::SetFilters),
            12 => Some(CommandId::AutomaticErrorRecovery),
            13 => Some(CommandId::LoadModelLibrary),
            _ => None,
        }
    }
}

/// 请求帧的完整长度（含 2 字节命令号）
///
/// 可靠通道没有长度前缀，读取侧按命令号查表确定还要读多少字节。
pub fn request_frame_len(id: CommandId) -> usize {
    match id {
        CommandId::Move => MOVE_REQUEST_SIZE,
        CommandId::StopMove => EMPTY_REQUEST_SIZE,
        CommandId::SetControllerMode => SET_CONTROLLER_MODE_REQUEST_SIZE,
        CommandId::SetCollisionBehavior => SET_COLLISION_BEHAVIOR_REQUEST_SIZE,
        CommandId::SetJointImpedance => SET_JOINT_IMPEDANCE_REQUEST_SIZE,
        CommandId::SetCartesianImpedance => SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE,
        CommandId::SetGuidingMode => SET_GUIDING_MODE_REQUEST_SIZE,
        CommandId::SetEEToK => SET_EE_TO_K_REQUEST_SIZE,
        CommandId::SetNEToEE => SET_NE_TO_EE_REQUEST_SIZE,
        CommandId::SetLoad => SET_LOAD_REQUEST_SIZE,
        CommandId::SetFilters => SET_FILTERS_REQUEST_SIZE,
        CommandId::AutomaticErrorRecovery => EMPTY_REQUEST_SIZE,
        CommandId::LoadModelLibrary => LOAD_MODEL_LIBRARY_REQUEST_SIZE,
    }
}

/// Move 命令的响应状态
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Success = 0,
    MotionStarted = 1,
    Preempted = 2,
    Rejected = 3,
    Aborted = 4,
}

impl MoveStatus {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(MoveStatus::Success),
            1 => Some(MoveStatus::MotionStarted),
            2 => Some(MoveStatus::Preempted),
            3 => Some(MoveStatus::Rejected),
            4 => Some(MoveStatus::Aborted),
            _ => None,
        }
    }

    /// 是否为终止状态（结束当前运动会话）
    pub fn is_terminal(self) -> bool {
        !matches!(self, MoveStatus::MotionStarted)
    }

    /// 人类可读描述（用于错误消息）
    pub fn describe(self) -> &'static str {
        match self {
            MoveStatus::Success => "finished successfully",
            MoveStatus::MotionStarted => "motion started",
            MoveStatus::Preempted => "preempted by another command",
            MoveStatus::Rejected => "rejected: command not possible in the current state",
            MoveStatus::Aborted => "aborted by the controller",
        }
    }
}

/// 通用命令的响应状态（Move 之外的所有命令）
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success = 0,
    CommandNotPossibleRejected = 1,
    InvalidArgumentRejected = 2,
}

impl CommandStatus {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(CommandStatus::Success),
            1 => Some(CommandStatus::CommandNotPossibleRejected),
            2 => Some(CommandStatus::InvalidArgumentRejected),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            CommandStatus::Success => "success",
            CommandStatus::CommandNotPossibleRejected => {
                "rejected: command not possible in the current state"
            }
            CommandStatus::InvalidArgumentRejected => "rejected: invalid argument",
        }
    }
}

// ============================================================================
// 响应帧
// ============================================================================

/// 响应帧的统一长度（命令号 u16 + 状态 u16）
pub const RESPONSE_SIZE: usize = 4;

/// 解码后的响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Move(MoveStatus),
    Command(CommandId, CommandStatus),
}

impl Response {
    /// 响应所属的命令号
    pub fn command_id(&self) -> CommandId {
        match self {
            Response::Move(_) => CommandId::Move,
            Response::Command(id, _) => *id,
        }
    }
}

/// 解码一个响应帧
///
/// # 错误
///
/// - `ProtocolError::InvalidLength`: 帧长不是 4 字节
/// - `ProtocolError::UnknownCommandId`: 命令号不认识
/// - `ProtocolError::InvalidValue`: 状态值不在枚举范围内
pub fn decode_response(buf: &[u8]) -> Result<Response, ProtocolError> {
    if buf.len() != RESPONSE_SIZE {
        return Err(ProtocolError::InvalidLength {
            expected: RESPONSE_SIZE,
            actual: buf.len(),
        });
    }
    let raw_id = get_u16(buf, 0);
    let id = CommandId::from_u16(raw_id).ok_or(ProtocolError::UnknownCommandId { id: raw_id })?;
    let raw_status = get_u16(buf, 2);

    match id {
        CommandId::Move => Ok(Response::Move(MoveStatus::from_u16(raw_status).ok_or(
            ProtocolError::InvalidValue {
                field: "move_status",
                value: raw_status,
            },
        )?)),
        other => Ok(Response::Command(
            other,
            CommandStatus::from_u16(raw_status).ok_or(ProtocolError::InvalidValue {
                field: "command_status",
                value: raw_status,
            })?,
        )),
    }
}

/// 编码 Move 响应帧（控制器侧 / 测试桩使用）
pub fn encode_move_response(status: MoveStatus) -> [u8; RESPONSE_SIZE] {
    let mut buf = [0u8; RESPONSE_SIZE];
    put_u16(&mut buf, 0, CommandId::Move as u16);
    put_u16(&mut buf, 2, status as u16);
    buf
}

/// 编码通用命令响应帧（控制器侧 / 测试桩使用）
pub fn encode_command_response(id: CommandId, status: CommandStatus) -> [u8; RESPONSE_SIZE] {
    let mut buf = [0u8; RESPONSE_SIZE];
    put_u16(&mut buf, 0, id as u16);
    put_u16(&mut buf, 2, status as u16);
    buf
}

// ============================================================================
// 请求帧
// ============================================================================

/// 空请求体的帧长（StopMove / AutomaticErrorRecovery）
pub const EMPTY_REQUEST_SIZE: usize = 2;

/// 编码只有命令号的空请求
pub fn encode_empty_request(id: CommandId) -> [u8; EMPTY_REQUEST_SIZE] {
    let mut buf = [0u8; EMPTY_REQUEST_SIZE];
    put_u16(&mut buf, 0, id as u16);
    buf
}

/// 校验请求帧头部的命令号与整帧长度
fn check_request_frame(buf: &[u8], id: CommandId, len: usize) -> Result<(), ProtocolError> {
    if buf.len() != len {
        return Err(ProtocolError::InvalidLength {
            expected: len,
            actual: buf.len(),
        });
    }
    let raw_id = get_u16(buf, 0);
    if raw_id != id as u16 {
        return Err(ProtocolError::UnknownCommandId { id: raw_id });
    }
    Ok(())
}

/// 运动开始时传入的最大容差三元组
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Deviation {
    pub translation: f64,
    pub rotation: f64,
    pub elbow: f64,
}

impl Deviation {
    pub fn new(translation: f64, rotation: f64, elbow: f64) -> Self {
        Deviation {
            translation,
            rotation,
            elbow,
        }
    }

    fn encode(&self, buf: &mut [u8], offset: usize) -> usize {
        put_f64s(buf, offset, &[self.translation, self.rotation, self.elbow])
    }

    fn decode(buf: &[u8], offset: usize) -> (Self, usize) {
        let mut values = [0.0; 3];
        let next = get_f64s(buf, offset, &mut values);
        (
            Deviation {
                translation: values[0],
                rotation: values[1],
                elbow: values[2],
            },
            next,
        )
    }
}

/// Move 请求帧长
pub const MOVE_REQUEST_SIZE: usize = 52;

/// Move 请求：启动一个运动发生器 + 控制器组合
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub controller_mode: ControllerMode,
    pub motion_generator_mode: MotionGeneratorMode,
    pub maximum_path_deviation: Deviation,
    pub maximum_goal_pose_deviation: Deviation,
}

impl MoveRequest {
    pub fn encode(&self, buf: &mut [u8; MOVE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::Move as u16);
        buf[2] = self.controller_mode as u8;
        buf[3] = self.motion_generator_mode as u8;
        let pos = self.maximum_path_deviation.encode(buf, 4);
        self.maximum_goal_pose_deviation.encode(buf, pos);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::Move, MOVE_REQUEST_SIZE)?;
        let controller_mode =
            ControllerMode::from_u8(buf[2]).ok_or(ProtocolError::InvalidValue {
                field: "controller_mode",
                value: buf[2] as u16,
            })?;
        let motion_generator_mode =
            MotionGeneratorMode::from_u8(buf[3]).ok_or(ProtocolError::InvalidValue {
                field: "motion_generator_mode",
                value: buf[3] as u16,
            })?;
        let (maximum_path_deviation, pos) = Deviation::decode(buf, 4);
        let (maximum_goal_pose_deviation, _) = Deviation::decode(buf, pos);
        Ok(MoveRequest {
            controller_mode,
            motion_generator_mode,
            maximum_path_deviation,
            maximum_goal_pose_deviation,
        })
    }
}

/// SetControllerMode 请求帧长
pub const SET_CONTROLLER_MODE_REQUEST_SIZE: usize = 3;

/// SetControllerMode 请求：切换控制器模式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetControllerModeRequest {
    pub mode: ControllerMode,
}

impl SetControllerModeRequest {
    pub fn encode(&self, buf: &mut [u8; SET_CONTROLLER_MODE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetControllerMode as u16);
        buf[2] = self.mode as u8;
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(
            buf,
            CommandId::SetControllerMode,
            SET_CONTROLLER_MODE_REQUEST_SIZE,
        )?;
        Ok(SetControllerModeRequest {
            mode: ControllerMode::from_u8(buf[2]).ok_or(ProtocolError::InvalidValue {
                field: "controller_mode",
                value: buf[2] as u16,
            })?,
        })
    }
}

/// SetCollisionBehavior 请求帧长
pub const SET_COLLISION_BEHAVIOR_REQUEST_SIZE: usize = 418;

/// SetCollisionBehavior 请求：接触/碰撞检测阈值
#[derive(Debug, Clone, PartialEq)]
pub struct SetCollisionBehaviorRequest {
    pub lower_torque_thresholds_acceleration: [f64; 7],
    pub upper_torque_thresholds_acceleration: [f64; 7],
    pub lower_torque_thresholds_nominal: [f64; 7],
    pub upper_torque_thresholds_nominal: [f64; 7],
    pub lower_force_thresholds_acceleration: [f64; 6],
    pub upper_force_thresholds_acceleration: [f64; 6],
    pub lower_force_thresholds_nominal: [f64; 6],
    pub upper_force_thresholds_nominal: [f64; 6],
}

impl SetCollisionBehaviorRequest {
    pub fn encode(&self, buf: &mut [u8; SET_COLLISION_BEHAVIOR_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetCollisionBehavior as u16);
        let mut pos = 2;
        pos = put_f64s(buf, pos, &self.lower_torque_thresholds_acceleration);
        pos = put_f64s(buf, pos, &self.upper_torque_thresholds_acceleration);
        pos = put_f64s(buf, pos, &self.lower_torque_thresholds_nominal);
        pos = put_f64s(buf, pos, &self.upper_torque_thresholds_nominal);
        pos = put_f64s(buf, pos, &self.lower_force_thresholds_acceleration);
        pos = put_f64s(buf, pos, &self.upper_force_thresholds_acceleration);
        pos = put_f64s(buf, pos, &self.lower_force_thresholds_nominal);
        pos = put_f64s(buf, pos, &self.upper_force_thresholds_nominal);
        debug_assert_eq!(pos, SET_COLLISION_BEHAVIOR_REQUEST_SIZE);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(
            buf,
            CommandId::SetCollisionBehavior,
            SET_COLLISION_BEHAVIOR_REQUEST_SIZE,
        )?;
        let mut request = SetCollisionBehaviorRequest {
            lower_torque_thresholds_acceleration: [0.0; 7],
            upper_torque_thresholds_acceleration: [0.0; 7],
            lower_torque_thresholds_nominal: [0.0; 7],
            upper_torque_thresholds_nominal: [0.0; 7],
            lower_force_thresholds_acceleration: [0.0; 6],
            upper_force_thresholds_acceleration: [0.0; 6],
            lower_force_thresholds_nominal: [0.0; 6],
            upper_force_thresholds_nominal: [0.0; 6],
        };
        let mut pos = 2;
        pos = get_f64s(buf, pos, &mut request.lower_torque_thresholds_acceleration);
        pos = get_f64s(buf, pos, &mut request.upper_torque_thresholds_acceleration);
        pos = get_f64s(buf, pos, &mut request.lower_torque_thresholds_nominal);
        pos = get_f64s(buf, pos, &mut request.upper_torque_thresholds_nominal);
        pos = get_f64s(buf, pos, &mut request.lower_force_thresholds_acceleration);
        pos = get_f64s(buf, pos, &mut request.upper_force_thresholds_acceleration);
        pos = get_f64s(buf, pos, &mut request.lower_force_thresholds_nominal);
        get_f64s(buf, pos, &mut request.upper_force_thresholds_nominal);
        Ok(request)
    }
}

/// SetJointImpedance 请求帧长
pub const SET_JOINT_IMPEDANCE_REQUEST_SIZE: usize = 58;

/// SetJointImpedance 请求：内部关节阻抗刚度
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SetJointImpedanceRequest {
    pub K_theta: [f64; 7],
}

impl SetJointImpedanceRequest {
    pub fn encode(&self, buf: &mut [u8; SET_JOINT_IMPEDANCE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetJointImpedance as u16);
        put_f64s(buf, 2, &self.K_theta);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(
            buf,
            CommandId::SetJointImpedance,
            SET_JOINT_IMPEDANCE_REQUEST_SIZE,
        )?;
        let mut K_theta = [0.0; 7];
        get_f64s(buf, 2, &mut K_theta);
        Ok(SetJointImpedanceRequest { K_theta })
    }
}

/// SetCartesianImpedance 请求帧长
pub const SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE: usize = 50;

/// SetCartesianImpedance 请求：内部笛卡尔阻抗刚度
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SetCartesianImpedanceRequest {
    pub K_x: [f64; 6],
}

impl SetCartesianImpedanceRequest {
    pub fn encode(&self, buf: &mut [u8; SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetCartesianImpedance as u16);
        put_f64s(buf, 2, &self.K_x);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(
            buf,
            CommandId::SetCartesianImpedance,
            SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE,
        )?;
        let mut K_x = [0.0; 6];
        get_f64s(buf, 2, &mut K_x);
        Ok(SetCartesianImpedanceRequest { K_x })
    }
}

/// SetGuidingMode 请求帧长
pub const SET_GUIDING_MODE_REQUEST_SIZE: usize = 9;

/// SetGuidingMode 请求：手动引导允许的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetGuidingModeRequest {
    pub guiding_mode: [bool; 6],
    pub nullspace: bool,
}

impl SetGuidingModeRequest {
    pub fn encode(&self, buf: &mut [u8; SET_GUIDING_MODE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetGuidingMode as u16);
        for (i, &enabled) in self.guiding_mode.iter().enumerate() {
            buf[2 + i] = enabled as u8;
        }
        buf[8] = self.nullspace as u8;
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::SetGuidingMode, SET_GUIDING_MODE_REQUEST_SIZE)?;
        let mut guiding_mode = [false; 6];
        for (i, flag) in guiding_mode.iter_mut().enumerate() {
            *flag = buf[2 + i] != 0;
        }
        Ok(SetGuidingModeRequest {
            guiding_mode,
            nullspace: buf[8] != 0,
        })
    }
}

/// SetEEToK 请求帧长
pub const SET_EE_TO_K_REQUEST_SIZE: usize = 130;

/// SetEEToK 请求：末端系到刚度系的变换
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SetEEToKRequest {
    pub EE_T_K: [f64; 16],
}

impl SetEEToKRequest {
    pub fn encode(&self, buf: &mut [u8; SET_EE_TO_K_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetEEToK as u16);
        put_f64s(buf, 2, &self.EE_T_K);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::SetEEToK, SET_EE_TO_K_REQUEST_SIZE)?;
        let mut EE_T_K = [0.0; 16];
        get_f64s(buf, 2, &mut EE_T_K);
        Ok(SetEEToKRequest { EE_T_K })
    }
}

/// SetNEToEE 请求帧长
pub const SET_NE_TO_EE_REQUEST_SIZE: usize = 130;

/// SetNEToEE 请求：法兰系到末端系的变换
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SetNEToEERequest {
    pub NE_T_EE: [f64; 16],
}

impl SetNEToEERequest {
    pub fn encode(&self, buf: &mut [u8; SET_NE_TO_EE_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetNEToEE as u16);
        put_f64s(buf, 2, &self.NE_T_EE);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::SetNEToEE, SET_NE_TO_EE_REQUEST_SIZE)?;
        let mut NE_T_EE = [0.0; 16];
        get_f64s(buf, 2, &mut NE_T_EE);
        Ok(SetNEToEERequest { NE_T_EE })
    }
}

/// SetLoad 请求帧长
pub const SET_LOAD_REQUEST_SIZE: usize = 106;

/// SetLoad 请求：末端负载参数（质量、质心、惯量）
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SetLoadRequest {
    /// 负载质量 (kg)
    pub m_load: f64,
    /// 负载质心（法兰系，m）
    pub F_x_Cload: [f64; 3],
    /// 负载惯量矩阵（3x3 列主序，kg·m²）
    pub I_load: [f64; 9],
}

impl SetLoadRequest {
    pub fn encode(&self, buf: &mut [u8; SET_LOAD_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetLoad as u16);
        let mut pos = put_f64s(buf, 2, &[self.m_load]);
        pos = put_f64s(buf, pos, &self.F_x_Cload);
        put_f64s(buf, pos, &self.I_load);
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::SetLoad, SET_LOAD_REQUEST_SIZE)?;
        let mut m = [0.0; 1];
        let mut F_x_Cload = [0.0; 3];
        let mut I_load = [0.0; 9];
        let mut pos = get_f64s(buf, 2, &mut m);
        pos = get_f64s(buf, pos, &mut F_x_Cload);
        get_f64s(buf, pos, &mut I_load);
        Ok(SetLoadRequest {
            m_load: m[0],
            F_x_Cload,
            I_load,
        })
    }
}

/// SetFilters 请求帧长
pub const SET_FILTERS_REQUEST_SIZE: usize = 42;

/// SetFilters 请求：机器人侧低通滤波截止频率 (Hz)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetFiltersRequest {
    pub joint_position_filter_frequency: f64,
    pub joint_velocity_filter_frequency: f64,
    pub cartesian_position_filter_frequency: f64,
    pub cartesian_velocity_filter_frequency: f64,
    pub controller_filter_frequency: f64,
}

impl SetFiltersRequest {
    pub fn encode(&self, buf: &mut [u8; SET_FILTERS_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::SetFilters as u16);
        put_f64s(
            buf,
            2,
            &[
                self.joint_position_filter_frequency,
                self.joint_velocity_filter_frequency,
                self.cartesian_position_filter_frequency,
                self.cartesian_velocity_filter_frequency,
                self.controller_filter_frequency,
            ],
        );
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(buf, CommandId::SetFilters, SET_FILTERS_REQUEST_SIZE)?;
        let mut values = [0.0; 5];
        get_f64s(buf, 2, &mut values);
        Ok(SetFiltersRequest {
            joint_position_filter_frequency: values[0],
            joint_velocity_filter_frequency: values[1],
            cartesian_position_filter_frequency: values[2],
            cartesian_velocity_filter_frequency: values[3],
            controller_filter_frequency: values[4],
        })
    }
}

/// LoadModelLibrary 请求帧长
pub const LOAD_MODEL_LIBRARY_REQUEST_SIZE: usize = 4;

/// 模型库目标架构
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelArchitecture {
    X64 = 0,
    X86 = 1,
    Arm = 2,
    Arm64 = 3,
}

impl ModelArchitecture {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ModelArchitecture::X64),
            1 => Some(ModelArchitecture::X86),
            2 => Some(ModelArchitecture::Arm),
            3 => Some(ModelArchitecture::Arm64),
            _ => None,
        }
    }
}

/// 模型库目标系统
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSystem {
    Linux = 0,
    Windows = 1,
}

impl ModelSystem {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ModelSystem::Linux),
            1 => Some(ModelSystem::Windows),
            _ => None,
        }
    }
}

/// LoadModelLibrary 请求：下载动力学模型库
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadModelLibraryRequest {
    pub architecture: ModelArchitecture,
    pub system: ModelSystem,
}

impl LoadModelLibraryRequest {
    pub fn encode(&self, buf: &mut [u8; LOAD_MODEL_LIBRARY_REQUEST_SIZE]) {
        put_u16(buf, 0, CommandId::LoadModelLibrary as u16);
        buf[2] = self.architecture as u8;
        buf[3] = self.system as u8;
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_request_frame(
            buf,
            CommandId::LoadModelLibrary,
            LOAD_MODEL_LIBRARY_REQUEST_SIZE,
        )?;
        Ok(LoadModelLibraryRequest {
            architecture: ModelArchitecture::from_u8(buf[2]).ok_or(
                ProtocolError::InvalidValue {
                    field: "architecture",
                    value: buf[2] as u16,
                },
            )?,
            system: ModelSystem::from_u8(buf[3]).ok_or(ProtocolError::InvalidValue {
                field: "system",
                value: buf[3] as u16,
            })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_request_roundtrip() {
        let request = ConnectRequest {
            version: 1,
            udp_port: 54321,
        };
        let mut buf = [0u8; CONNECT_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(ConnectRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_connect_reply_roundtrip() {
        let reply = ConnectReply {
            version: 2,
            status: ConnectStatus::IncompatibleLibraryVersion,
        };
        let mut buf = [0u8; CONNECT_REPLY_SIZE];
        reply.encode(&mut buf);
        assert_eq!(ConnectReply::decode(&buf).unwrap(), reply);
    }

    #[test]
    fn test_connect_reply_rejects_bad_status() {
        let mut buf = [0u8; CONNECT_REPLY_SIZE];
        put_u16(&mut buf, 2, 99);
        assert!(ConnectReply::decode(&buf).is_err());
    }

    #[test]
    fn test_command_id_from_u16() {
        assert_eq!(CommandId::from_u16(1), Some(CommandId::Move));
        assert_eq!(CommandId::from_u16(13), Some(CommandId::LoadModelLibrary));
        assert_eq!(CommandId::from_u16(0), None);
        assert_eq!(CommandId::from_u16(14), None);
    }

    #[test]
    fn test_move_status_terminal() {
        assert!(MoveStatus::Success.is_terminal());
        assert!(MoveStatus::Rejected.is_terminal());
        assert!(MoveStatus::Aborted.is_terminal());
        assert!(MoveStatus::Preempted.is_terminal());
        assert!(!MoveStatus::MotionStarted.is_terminal());
    }

    #[test]
    fn test_response_roundtrip_move() {
        let frame = encode_move_response(MoveStatus::MotionStarted);
        let response = decode_response(&frame).unwrap();
        assert_eq!(response, Response::Move(MoveStatus::MotionStarted));
        assert_eq!(response.command_id(), CommandId::Move);
    }

    #[test]
    fn test_response_roundtrip_command() {
        let frame = encode_command_response(
            CommandId::SetCollisionBehavior,
            CommandStatus::InvalidArgumentRejected,
        );
        let response = decode_response(&frame).unwrap();
        assert_eq!(
            response,
            Response::Command(
                CommandId::SetCollisionBehavior,
                CommandStatus::InvalidArgumentRejected
            )
        );
    }

    #[test]
    fn test_response_rejects_unknown_command_id() {
        let mut frame = [0u8; RESPONSE_SIZE];
        put_u16(&mut frame, 0, 0x7777);
        let err = decode_response(&frame).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownCommandId { id: 0x7777 });
    }

    #[test]
    fn test_response_rejects_wrong_length() {
        assert!(decode_response(&[0u8; 3]).is_err());
        assert!(decode_response(&[0u8; 5]).is_err());
    }

    #[test]
    fn test_move_request_roundtrip() {
        let request = MoveRequest {
            controller_mode: ControllerMode::ExternalController,
            motion_generator_mode: MotionGeneratorMode::CartesianPosition,
            maximum_path_deviation: Deviation::new(0.0, 1.0, 2.0),
            maximum_goal_pose_deviation: Deviation::new(3.0, 4.0, 5.0),
        };
        let mut buf = [0u8; MOVE_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(MoveRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_move_request_rejects_wrong_id() {
        let request = SetControllerModeRequest {
            mode: ControllerMode::JointImpedance,
        };
        let mut buf = [0u8; SET_CONTROLLER_MODE_REQUEST_SIZE];
        request.encode(&mut buf);
        // SetControllerMode 帧喂给 Move 解码器：长度就不对
        assert!(MoveRequest::decode(&buf).is_err());
    }

    #[test]
    fn test_set_controller_mode_roundtrip() {
        let request = SetControllerModeRequest {
            mode: ControllerMode::ExternalController,
        };
        let mut buf = [0u8; SET_CONTROLLER_MODE_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetControllerModeRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_set_collision_behavior_roundtrip() {
        let request = SetCollisionBehaviorRequest {
            lower_torque_thresholds_acceleration: [1.0; 7],
            upper_torque_thresholds_acceleration: [2.0; 7],
            lower_torque_thresholds_nominal: [3.0; 7],
            upper_torque_thresholds_nominal: [4.0; 7],
            lower_force_thresholds_acceleration: [5.0; 6],
            upper_force_thresholds_acceleration: [6.0; 6],
            lower_force_thresholds_nominal: [7.0; 6],
            upper_force_thresholds_nominal: [8.0; 6],
        };
        let mut buf = [0u8; SET_COLLISION_BEHAVIOR_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetCollisionBehaviorRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_set_guiding_mode_roundtrip() {
        let request = SetGuidingModeRequest {
            guiding_mode: [true, false, true, false, true, false],
            nullspace: true,
        };
        let mut buf = [0u8; SET_GUIDING_MODE_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetGuidingModeRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_set_load_roundtrip() {
        let request = SetLoadRequest {
            m_load: 1.25,
            F_x_Cload: [0.01, 0.02, 0.03],
            I_load: [0.1, 0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 0.1],
        };
        let mut buf = [0u8; SET_LOAD_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetLoadRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_set_filters_roundtrip() {
        let request = SetFiltersRequest {
            joint_position_filter_frequency: 100.0,
            joint_velocity_filter_frequency: 100.0,
            cartesian_position_filter_frequency: 50.0,
            cartesian_velocity_filter_frequency: 50.0,
            controller_filter_frequency: 25.0,
        };
        let mut buf = [0u8; SET_FILTERS_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetFiltersRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_transform_requests_roundtrip() {
        let mut transform = [0.0; 16];
        for (i, v) in transform.iter_mut().enumerate() {
            *v = i as f64 * 0.5;
        }

        let request = SetEEToKRequest { EE_T_K: transform };
        let mut buf = [0u8; SET_EE_TO_K_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetEEToKRequest::decode(&buf).unwrap(), request);

        let request = SetNEToEERequest { NE_T_EE: transform };
        let mut buf = [0u8; SET_NE_TO_EE_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(SetNEToEERequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_load_model_library_roundtrip() {
        let request = LoadModelLibraryRequest {
            architecture: ModelArchitecture::Arm64,
            system: ModelSystem::Linux,
        };
        let mut buf = [0u8; LOAD_MODEL_LIBRARY_REQUEST_SIZE];
        request.encode(&mut buf);
        assert_eq!(LoadModelLibraryRequest::decode(&buf).unwrap(), request);
    }

    #[test]
    fn test_empty_request_encoding() {
        let frame = encode_empty_request(CommandId::StopMove);
        assert_eq!(get_u16(&frame, 0), CommandId::StopMove as u16);

        let frame = encode_empty_request(CommandId::AutomaticErrorRecovery);
        assert_eq!(get_u16(&frame, 0), CommandId::AutomaticErrorRecovery as u16);
    }

    #[test]
    fn test_request_frame_len_table() {
        // 读取侧按此表切帧，任何一项跑偏都会让整条流错位
        assert_eq!(request_frame_len(CommandId::Move), 52);
        assert_eq!(request_frame_len(CommandId::StopMove), 2);
        assert_eq!(request_frame_len(CommandId::SetControllerMode), 3);
        assert_eq!(request_frame_len(CommandId::SetCollisionBehavior), 418);
        assert_eq!(request_frame_len(CommandId::SetJointImpedance), 58);
        assert_eq!(request_frame_len(CommandId::SetCartesianImpedance), 50);
        assert_eq!(request_frame_len(CommandId::SetGuidingMode), 9);
        assert_eq!(request_frame_len(CommandId::SetEEToK), 130);
        assert_eq!(request_frame_len(CommandId::SetNEToEE), 130);
        assert_eq!(request_frame_len(CommandId::SetLoad), 106);
        assert_eq!(request_frame_len(CommandId::SetFilters), 42);
        assert_eq!(request_frame_len(CommandId::AutomaticErrorRecovery), 2);
        assert_eq!(request_frame_len(CommandId::LoadModelLibrary), 4);
    }
}
