//! RCI SDK - 7 轴力控机械臂 Rust 客户端驱动
//!
//! 通过 RCI 双通道协议与机器人控制器保持会话：TCP 可靠通道承载命令请求/响应，
//! UDP 数据报通道以固定 1kHz 周期交换状态与命令记录。
//!
//! # 架构层次
//!
//! - **协议层** (`protocol`): 固定布局的二进制编解码（状态、命令、请求/响应）
//! - **传输层** (`net`): 双 socket 复用（poll）、握手、响应缓冲
//! - **机器人层** (`robot`): 会话生命周期、运动/控制器状态机、每周期控制循环

pub mod net;
pub mod prelude;
pub mod protocol;
pub mod robot;

// Re-export 核心类型（简化用户导入）
pub use net::NetworkError;
pub use protocol::{
    ControllerCommand, ControllerMode, Deviation, MotionGeneratorCommand, MotionGeneratorMode,
    ProtocolError, RobotCommand, RobotState,
};
pub use robot::{ControlSignal, CycleCommand, Robot, RobotConfig, RobotError};
