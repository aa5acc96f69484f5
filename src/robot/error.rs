//! 机器人层错误类型定义

use crate::net::NetworkError;
use crate::protocol::ProtocolError;
use thiserror::Error;

/// 机器人层错误类型
///
/// 把失败分成互不混淆的几类：网络瞬断与超时（`Network`）、
/// 线上记录违规（`Protocol`）、握手版本被拒（`IncompatibleVersion`）、
/// 机器人侧拒绝或调用序列违规（`Control`）、
/// 当前状态下不允许的调用（`InvalidOperation`）。
#[derive(Error, Debug)]
pub enum RobotError {
    /// 传输失败：任一通道超时、对端关闭连接、socket 错误
    #[error("Network error: {0}")]
    Network(NetworkError),

    /// 线上记录违反协议：未知命令号、长度不符、非法枚举值
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 握手版本协商被控制器拒绝
    #[error("Incompatible library version: controller version {server}, client version {client}")]
    IncompatibleVersion { server: u16, client: u16 },

    /// 逻辑违规：运动中再次启动、update 参数组合与当前状态不符、
    /// 对端在期望继续时返回了非成功的终止响应
    #[error("Control error: {0}")]
    Control(String),

    /// 当前状态下被禁止的操作（例如没有控制器在运行时调用 stop_controller）
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
}

impl From<NetworkError> for RobotError {
    fn from(error: NetworkError) -> Self {
        // 传输层把解码失败也报成 NetworkError，这里按分类拆回去
        match error {
            NetworkError::Protocol(protocol) => RobotError::Protocol(protocol),
            other => RobotError::Network(other),
        }
    }
}
