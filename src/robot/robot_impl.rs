//! 机器人会话与控制状态机
//!
//! `Robot` 在一条 RCI 会话上跟踪两个逻辑会话：运动发生器与控制器。
//! 状态机的两条铁律：
//!
//! 1. **回显纪律**：对消息号为 N 的状态，至多回发一条 `message_id == N` 的命令，
//!    且回显由状态机打点，调用方永远不碰 `message_id`
//! 2. **双重见证**：启动/停止只有在可靠响应与状态模式字段都反映转换之后才算完成，
//!    两个见证的到达顺序不定，期间的可靠响应非阻塞地排队等待认领

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::net::{Network, NetworkError, PollEvent};
use crate::protocol::{
    encode_empty_request, CommandId, CommandStatus, ConnectStatus, ControllerCommand,
    ControllerMode, Deviation, LoadModelLibraryRequest, ModelArchitecture, ModelSystem,
    MotionGeneratorCommand, MotionGeneratorMode, MoveRequest, MoveStatus, RobotCommand,
    RobotState, SetCartesianImpedanceRequest, SetCollisionBehaviorRequest,
    SetControllerModeRequest, SetEEToKRequest, SetFiltersRequest, SetGuidingModeRequest,
    SetJointImpedanceRequest, SetLoadRequest, SetNEToEERequest, COMMAND_PORT,
    LOAD_MODEL_LIBRARY_REQUEST_SIZE, MOVE_REQUEST_SIZE, PROTOCOL_VERSION,
    SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE, SET_COLLISION_BEHAVIOR_REQUEST_SIZE,
    SET_CONTROLLER_MODE_REQUEST_SIZE, SET_EE_TO_K_REQUEST_SIZE, SET_FILTERS_REQUEST_SIZE,
    SET_GUIDING_MODE_REQUEST_SIZE, SET_JOINT_IMPEDANCE_REQUEST_SIZE, SET_LOAD_REQUEST_SIZE,
    SET_NE_TO_EE_REQUEST_SIZE,
};
use crate::robot::control_loop::CycleCommand;
use crate::robot::error::RobotError;

/// 会话配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotConfig {
    /// 控制器命令通道端口
    pub command_port: u16,
    /// 可靠通道操作与每周期数据报接收共用的超时
    pub timeout: Duration,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            command_port: COMMAND_PORT,
            timeout: Duration::from_secs(1),
        }
    }
}

/// 判断命令组合在当前状态下是否合法
///
/// | 运动发生器 | 控制器 | 合法调用 |
/// |---|---|---|
/// | 停 | 停 | `update(None, None)` |
/// | 行 | 停 | `update(Some(m), None)` / `update(None, None)` |
/// | 停 | 行 | `update(None, Some(c))` / `update(None, None)` |
/// | 行 | 行 | `update(Some(m), Some(c))` / `update(None, None)` |
fn command_arity_is_legal(
    motion_running: bool,
    controller_running: bool,
    has_motion: bool,
    has_control: bool,
) -> bool {
    match (motion_running, controller_running) {
        (false, false) => !has_motion && !has_control,
        (true, false) => !has_control,
        (false, true) => !has_motion,
        (true, true) => has_motion == has_control,
    }
}

/// 机器人会话（对外 API）
///
/// 单线程协作式：所有方法在调用线程上同步阻塞，阻塞点只在 socket 接收，
/// 状态修改都发生在两次接收之间，不需要任何锁。
#[derive(Debug)]
pub struct Robot {
    network: Network,
    timeout: Duration,
    /// 握手协商出的控制器协议版本
    server_version: u16,
    /// 运动发生器会话是否存活
    motion_running: bool,
    /// 外部控制器会话是否存活
    controller_running: bool,
    /// 最近一条状态的消息号，命令回显用
    last_state_message_id: u32,
    /// 本周期内观察到的运动终止状态（已从 pending 队列取出，等待上抛）
    motion_terminated: Option<MoveStatus>,
}

impl Robot {
    /// 用默认配置连接控制器
    pub fn connect(hostname: &str) -> Result<Self, RobotError> {
        Self::connect_with_config(hostname, RobotConfig::default())
    }

    /// 连接控制器并完成版本握手
    ///
    /// # 错误
    ///
    /// - `RobotError::Network`: TCP 连接失败、握手超时、对端关闭
    /// - `RobotError::IncompatibleVersion`: 控制器拒绝本客户端的协议版本
    pub fn connect_with_config(hostname: &str, config: RobotConfig) -> Result<Self, RobotError> {
        let (network, reply) = Network::connect(hostname, config.command_port, config.timeout)?;
        if reply.status != ConnectStatus::Success {
            return Err(RobotError::IncompatibleVersion {
                server: reply.version,
                client: PROTOCOL_VERSION,
            });
        }
        debug!(hostname, server_version = reply.version, "robot session established");

        Ok(Robot {
            network,
            timeout: config.timeout,
            server_version: reply.version,
            motion_running: false,
            controller_running: false,
            last_state_message_id: 0,
            motion_terminated: None,
        })
    }

    /// 握手协商出的控制器协议版本
    pub fn server_version(&self) -> u16 {
        self.server_version
    }

    /// 运动发生器会话是否存活
    pub fn motion_generator_running(&self) -> bool {
        self.motion_running
    }

    /// 外部控制器会话是否存活
    pub fn controller_running(&self) -> bool {
        self.controller_running
    }

    /// 每周期的状态接收与命令提交
    ///
    /// 接收一条状态数据报；若给出了命令，则构造一条 `RobotCommand` 回发，
    /// `message_id` 回显刚收到的状态，省略的子记录补零。
    /// 命令组合必须与当前状态匹配（见 [`command_arity_is_legal`] 的矩阵），
    /// 违规时直接失败，不产生任何网络流量。
    ///
    /// # 错误
    ///
    /// - `RobotError::Control`: 命令组合与当前状态不符，或运动已被对端终止
    /// - `RobotError::Network`: 周期内没有状态数据报到达 / 可靠通道被关闭
    pub fn update(
        &mut self,
        motion: Option<&MotionGeneratorCommand>,
        control: Option<&ControllerCommand>,
    ) -> Result<RobotState, RobotError> {
        if !command_arity_is_legal(
            self.motion_running,
            self.controller_running,
            motion.is_some(),
            control.is_some(),
        ) {
            return Err(RobotError::Control(format!(
                "invalid command combination for the current state \
                 (motion generator running: {}, controller running: {})",
                self.motion_running, self.controller_running
            )));
        }

        let state = self.receive_state()?;

        if let Some(status) = self.motion_terminated.take() {
            // 对端结束了运动会话；只有调用方还想继续供给运动命令时才算错误
            if motion.is_some() {
                return Err(RobotError::Control(format!("motion {}", status.describe())));
            }
        }

        if motion.is_some() || control.is_some() {
            let command = RobotCommand {
                message_id: self.last_state_message_id,
                motion: motion.cloned().unwrap_or_default(),
                control: control.cloned().unwrap_or_default(),
            };
            self.network
                .send_command(&command)
                .map_err(RobotError::from)?;
        }

        Ok(state)
    }

    /// 启动运动发生器（以及耦合的控制器模式）
    ///
    /// 发送 `Move` 请求后循环接收，直到 `MotionStarted` 响应与状态模式字段
    /// 两个见证都到齐。模式字段可能落后响应若干周期，期间的状态被正常消费。
    ///
    /// # 错误
    ///
    /// - `RobotError::Control`: 已有运动在运行、对端拒绝、或超时未完成转换
    pub fn start_motion(
        &mut self,
        controller_mode: ControllerMode,
        motion_generator_mode: MotionGeneratorMode,
        maximum_path_deviation: Deviation,
        maximum_goal_pose_deviation: Deviation,
    ) -> Result<(), RobotError> {
        if self.motion_running {
            return Err(RobotError::Control(
                "motion generator already running".into(),
            ));
        }
        // 上一个会话无人认领的终止响应在此作废
        self.motion_terminated = None;
        self.network.clear_move_responses();

        let request = MoveRequest {
            controller_mode,
            motion_generator_mode,
            maximum_path_deviation,
            maximum_goal_pose_deviation,
        };
        let mut frame = [0u8; MOVE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.network.send_request(&frame).map_err(RobotError::from)?;

        let deadline = Instant::now() + self.timeout;
        let mut started = false;
        let mut modes_match = false;
        while !(started && modes_match) {
            if let Some(status) = self.network.take_move_response() {
                match status {
                    MoveStatus::MotionStarted => started = true,
                    terminal => {
                        return Err(RobotError::Control(format!(
                            "Move command failed: {}",
                            terminal.describe()
                        )));
                    }
                }
                continue;
            }
            match self.network.poll_once(deadline) {
                Ok(PollEvent::State(state)) => {
                    self.last_state_message_id = state.message_id;
                    modes_match = state.motion_generator_mode == motion_generator_mode
                        && state.controller_mode == controller_mode;
                }
                Ok(PollEvent::CommandChannel) => {}
                Err(NetworkError::Timeout) => {
                    return Err(RobotError::Control(
                        "motion could not be started: no confirmation within timeout".into(),
                    ));
                }
                Err(e) => return Err(self.fail_network(e)),
            }
        }

        self.motion_running = true;
        if controller_mode == ControllerMode::ExternalController {
            self.controller_running = true;
        }
        debug!(?motion_generator_mode, ?controller_mode, "motion session started");
        Ok(())
    }

    /// 启动外部控制器（不带运动发生器）
    ///
    /// # 错误
    ///
    /// - `RobotError::Control`: 已有控制器在运行、对端拒绝、或超时未完成转换
    pub fn start_controller(&mut self) -> Result<(), RobotError> {
        if self.controller_running {
            return Err(RobotError::Control("controller already running".into()));
        }
        self.set_controller_mode_and_wait(ControllerMode::ExternalController)?;
        self.controller_running = true;
        debug!("external controller started");
        Ok(())
    }

    /// 停止外部控制器：切回内部关节阻抗控制
    ///
    /// # 错误
    ///
    /// - `RobotError::InvalidOperation`: 没有控制器在运行
    pub fn stop_controller(&mut self) -> Result<(), RobotError> {
        if !self.controller_running {
            return Err(RobotError::InvalidOperation("no controller running"));
        }
        // 先清标志：即使切换失败，调用方也从干净状态重试
        self.controller_running = false;
        self.set_controller_mode_and_wait(ControllerMode::JointImpedance)?;
        debug!("external controller stopped");
        Ok(())
    }

    /// 停止运动发生器
    ///
    /// 先打一个 `motion_generation_finished = true` 的终止周期，
    /// 然后持续消费状态，直到对端给出终止的 `Move` 响应。
    /// 与运动一起启动的外部控制器不受影响，要用 [`Robot::stop_controller`] 单独停。
    ///
    /// # 错误
    ///
    /// - `RobotError::InvalidOperation`: 没有运动在运行
    /// - `RobotError::Control`: 对端以非成功状态终止
    pub fn stop_motion(&mut self) -> Result<(), RobotError> {
        if !self.motion_running {
            return Err(RobotError::InvalidOperation("no motion generator running"));
        }

        let state = self.receive_state()?;
        if let Some(status) = self.motion_terminated.take() {
            // 对端先一步终止了运动，不再需要终止周期
            return if status == MoveStatus::Success {
                Ok(())
            } else {
                Err(RobotError::Control(format!("motion {}", status.describe())))
            };
        }

        let mut command = RobotCommand::default();
        command.message_id = state.message_id;
        command.motion.motion_generation_finished = true;
        if let Err(e) = self.network.send_command(&command) {
            self.motion_running = false;
            return Err(e.into());
        }

        let status = self.wait_for_motion_termination()?;
        if status != MoveStatus::Success {
            return Err(RobotError::Control(format!("motion {}", status.describe())));
        }
        debug!("motion session stopped");
        Ok(())
    }

    /// 从周期循环之外中止当前运动（`StopMove` 命令）
    ///
    /// 与 [`Robot::stop_motion`] 不同，这不参与实时流，适合在异常路径上收尾。
    pub fn stop(&mut self) -> Result<(), RobotError> {
        let frame = encode_empty_request(CommandId::StopMove);
        self.network.send_request(&frame).map_err(RobotError::from)?;
        let result = self.wait_for_command_status(CommandId::StopMove);

        // 不论结果如何，运动会话都已结束；作废无人认领的终止响应
        self.motion_running = false;
        self.motion_terminated = None;
        self.network.clear_move_responses();

        let status = result?;
        if status != CommandStatus::Success {
            return Err(RobotError::Control(format!(
                "StopMove command failed: {}",
                status.describe()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // 参数命令（可靠通道的请求/响应往返）
    // ========================================================================

    /// 设置接触/碰撞检测阈值
    #[allow(clippy::too_many_arguments)]
    pub fn set_collision_behavior(
        &mut self,
        lower_torque_thresholds_acceleration: [f64; 7],
        upper_torque_thresholds_acceleration: [f64; 7],
        lower_torque_thresholds_nominal: [f64; 7],
        upper_torque_thresholds_nominal: [f64; 7],
        lower_force_thresholds_acceleration: [f64; 6],
        upper_force_thresholds_acceleration: [f64; 6],
        lower_force_thresholds_nominal: [f64; 6],
        upper_force_thresholds_nominal: [f64; 6],
    ) -> Result<(), RobotError> {
        let request = SetCollisionBehaviorRequest {
            lower_torque_thresholds_acceleration,
            upper_torque_thresholds_acceleration,
            lower_torque_thresholds_nominal,
            upper_torque_thresholds_nominal,
            lower_force_thresholds_acceleration,
            upper_force_thresholds_acceleration,
            lower_force_thresholds_nominal,
            upper_force_thresholds_nominal,
        };
        let mut frame = [0u8; SET_COLLISION_BEHAVIOR_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetCollisionBehavior, &frame)
    }

    /// 设置内部关节阻抗刚度
    #[allow(non_snake_case)]
    pub fn set_joint_impedance(&mut self, K_theta: [f64; 7]) -> Result<(), RobotError> {
        let request = SetJointImpedanceRequest { K_theta };
        let mut frame = [0u8; SET_JOINT_IMPEDANCE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetJointImpedance, &frame)
    }

    /// 设置内部笛卡尔阻抗刚度
    #[allow(non_snake_case)]
    pub fn set_cartesian_impedance(&mut self, K_x: [f64; 6]) -> Result<(), RobotError> {
        let request = SetCartesianImpedanceRequest { K_x };
        let mut frame = [0u8; SET_CARTESIAN_IMPEDANCE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetCartesianImpedance, &frame)
    }

    /// 设置手动引导允许的轴
    pub fn set_guiding_mode(
        &mut self,
        guiding_mode: [bool; 6],
        nullspace: bool,
    ) -> Result<(), RobotError> {
        let request = SetGuidingModeRequest {
            guiding_mode,
            nullspace,
        };
        let mut frame = [0u8; SET_GUIDING_MODE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetGuidingMode, &frame)
    }

    /// 设置末端系到刚度系的变换
    #[allow(non_snake_case)]
    pub fn set_ee_to_k(&mut self, EE_T_K: [f64; 16]) -> Result<(), RobotError> {
        let request = SetEEToKRequest { EE_T_K };
        let mut frame = [0u8; SET_EE_TO_K_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetEEToK, &frame)
    }

    /// 设置法兰系到末端系的变换
    #[allow(non_snake_case)]
    pub fn set_ne_to_ee(&mut self, NE_T_EE: [f64; 16]) -> Result<(), RobotError> {
        let request = SetNEToEERequest { NE_T_EE };
        let mut frame = [0u8; SET_NE_TO_EE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetNEToEE, &frame)
    }

    /// 设置末端负载参数
    #[allow(non_snake_case)]
    pub fn set_load(
        &mut self,
        m_load: f64,
        F_x_Cload: [f64; 3],
        I_load: [f64; 9],
    ) -> Result<(), RobotError> {
        let request = SetLoadRequest {
            m_load,
            F_x_Cload,
            I_load,
        };
        let mut frame = [0u8; SET_LOAD_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetLoad, &frame)
    }

    /// 设置机器人侧低通滤波截止频率
    pub fn set_filters(
        &mut self,
        joint_position_filter_frequency: f64,
        joint_velocity_filter_frequency: f64,
        cartesian_position_filter_frequency: f64,
        cartesian_velocity_filter_frequency: f64,
        controller_filter_frequency: f64,
    ) -> Result<(), RobotError> {
        let request = SetFiltersRequest {
            joint_position_filter_frequency,
            joint_velocity_filter_frequency,
            cartesian_position_filter_frequency,
            cartesian_velocity_filter_frequency,
            controller_filter_frequency,
        };
        let mut frame = [0u8; SET_FILTERS_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::SetFilters, &frame)
    }

    /// 自动错误恢复（反射锁定等可自动恢复的故障）
    pub fn automatic_error_recovery(&mut self) -> Result<(), RobotError> {
        let frame = encode_empty_request(CommandId::AutomaticErrorRecovery);
        self.execute_command(CommandId::AutomaticErrorRecovery, &frame)
    }

    /// 请求控制器下发动力学模型库
    pub fn load_model_library(
        &mut self,
        architecture: ModelArchitecture,
        system: ModelSystem,
    ) -> Result<(), RobotError> {
        let request = LoadModelLibraryRequest {
            architecture,
            system,
        };
        let mut frame = [0u8; LOAD_MODEL_LIBRARY_REQUEST_SIZE];
        request.encode(&mut frame);
        self.execute_command(CommandId::LoadModelLibrary, &frame)
    }

    // ========================================================================
    // 内部：接收与等待
    // ========================================================================

    /// 接收一条状态并推进状态机
    ///
    /// 接收前后都非阻塞地清空可靠通道，保证跨周期到达的响应不会丢。
    pub(crate) fn receive_state(&mut self) -> Result<RobotState, RobotError> {
        let deadline = Instant::now() + self.timeout;
        let state = loop {
            match self.network.poll_once(deadline) {
                Ok(PollEvent::State(state)) => break state,
                Ok(PollEvent::CommandChannel) => continue,
                Err(e) => return Err(self.fail_network(e)),
            }
        };
        // 状态之后可能还跟着响应，再清一遍
        if let Err(e) = self.network.drain_responses() {
            return Err(self.fail_network(e));
        }

        self.last_state_message_id = state.message_id;
        self.process_move_responses();
        Ok(state)
    }

    /// 取走本周期观察到的运动终止状态（若有）
    pub(crate) fn take_motion_termination(&mut self) -> Option<MoveStatus> {
        self.motion_terminated.take()
    }

    /// 等待终止的 Move 响应，期间正常消费状态流
    pub(crate) fn wait_for_motion_termination(&mut self) -> Result<MoveStatus, RobotError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = self.network.take_move_response() {
                if status.is_terminal() {
                    self.motion_running = false;
                    return Ok(status);
                }
                // 迟到的 MotionStarted 确认
                continue;
            }
            match self.network.poll_once(deadline) {
                Ok(PollEvent::State(state)) => {
                    self.last_state_message_id = state.message_id;
                }
                Ok(PollEvent::CommandChannel) => {}
                Err(NetworkError::Timeout) => {
                    self.motion_running = false;
                    return Err(RobotError::Control(
                        "motion did not terminate within timeout".into(),
                    ));
                }
                Err(e) => {
                    self.motion_running = false;
                    return Err(self.fail_network(e));
                }
            }
        }
    }

    /// 发送一条周期命令，回显给定状态的消息号
    ///
    /// 外部控制器运行时每周期必须附带力矩命令，反之不允许。
    pub(crate) fn send_cycle_command(
        &mut self,
        state: &RobotState,
        cycle: &CycleCommand,
        finished: bool,
    ) -> Result<(), RobotError> {
        if self.controller_running != cycle.control.is_some() {
            return Err(RobotError::Control(if self.controller_running {
                "external controller is running: a controller command is required every cycle"
                    .into()
            } else {
                "no external controller running: controller commands are not allowed".into()
            }));
        }
        let mut command = RobotCommand {
            message_id: state.message_id,
            motion: cycle.motion.clone(),
            control: cycle.control.clone().unwrap_or_default(),
        };
        // 终止标志由状态机决定，覆盖回调自带的值
        command.motion.motion_generation_finished = finished;
        self.network.send_command(&command).map_err(RobotError::from)
    }

    /// 发送一条只带终止标志的空命令
    pub(crate) fn send_finished_command(&mut self, state: &RobotState) -> Result<(), RobotError> {
        let mut command = RobotCommand::default();
        command.message_id = state.message_id;
        command.motion.motion_generation_finished = true;
        self.network.send_command(&command).map_err(RobotError::from)
    }

    /// 消费已到达的 Move 响应，驱动运动会话的终止
    fn process_move_responses(&mut self) {
        if !self.motion_running {
            return;
        }
        while let Some(status) = self.network.take_move_response() {
            if status.is_terminal() {
                debug!(?status, "motion session terminated by controller");
                self.motion_running = false;
                self.motion_terminated = Some(status);
            } else {
                warn!("unexpected MotionStarted response during an active motion");
            }
        }
    }

    /// 发送 SetControllerMode 并等待响应与状态两个见证
    fn set_controller_mode_and_wait(&mut self, mode: ControllerMode) -> Result<(), RobotError> {
        let request = SetControllerModeRequest { mode };
        let mut frame = [0u8; SET_CONTROLLER_MODE_REQUEST_SIZE];
        request.encode(&mut frame);
        self.network.send_request(&frame).map_err(RobotError::from)?;

        let deadline = Instant::now() + self.timeout;
        let mut acknowledged = false;
        let mut mode_reached = false;
        while !(acknowledged && mode_reached) {
            if let Some(status) = self.network.take_command_response(CommandId::SetControllerMode)
            {
                if status != CommandStatus::Success {
                    return Err(RobotError::Control(format!(
                        "SetControllerMode command failed: {}",
                        status.describe()
                    )));
                }
                acknowledged = true;
                continue;
            }
            match self.network.poll_once(deadline) {
                Ok(PollEvent::State(state)) => {
                    self.last_state_message_id = state.message_id;
                    mode_reached = match mode {
                        ControllerMode::ExternalController => {
                            state.controller_mode == ControllerMode::ExternalController
                        }
                        // 切回内部控制器：状态不再报告外部控制器即算到位
                        _ => state.controller_mode != ControllerMode::ExternalController,
                    };
                }
                Ok(PollEvent::CommandChannel) => {}
                Err(NetworkError::Timeout) => {
                    return Err(RobotError::Control(
                        "controller mode switch did not complete within timeout".into(),
                    ));
                }
                Err(e) => return Err(self.fail_network(e)),
            }
        }
        Ok(())
    }

    /// 发送通用参数请求并等待成功响应
    fn execute_command(&mut self, id: CommandId, frame: &[u8]) -> Result<(), RobotError> {
        self.network.send_request(frame).map_err(RobotError::from)?;
        let status = self.wait_for_command_status(id)?;
        if status != CommandStatus::Success {
            return Err(RobotError::Control(format!(
                "{:?} command failed: {}",
                id,
                status.describe()
            )));
        }
        Ok(())
    }

    /// 等待某个命令的响应，期间正常消费状态流
    fn wait_for_command_status(&mut self, id: CommandId) -> Result<CommandStatus, RobotError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = self.network.take_command_response(id) {
                return Ok(status);
            }
            match self.network.poll_once(deadline) {
                Ok(PollEvent::State(state)) => {
                    self.last_state_message_id = state.message_id;
                }
                Ok(PollEvent::CommandChannel) => {}
                Err(e) => return Err(self.fail_network(e)),
            }
        }
    }

    /// 网络失败上抛前按传播策略清理运行标志
    ///
    /// 数据报超时使进行中的运动作废；可靠通道断开则整个会话终结。
    fn fail_network(&mut self, error: NetworkError) -> RobotError {
        match error {
            NetworkError::Timeout => {
                self.motion_running = false;
            }
            NetworkError::Disconnected => {
                self.motion_running = false;
                self.controller_running = false;
            }
            _ => {}
        }
        error.into()
    }
}
