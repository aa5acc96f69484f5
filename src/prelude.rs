//! 常用类型一次性导入
//!
//! ```
//! use rci_sdk::prelude::*;
//! ```

pub use crate::net::NetworkError;
pub use crate::protocol::{
    ControllerCommand, ControllerMode, Deviation, MotionGeneratorCommand, MotionGeneratorMode,
    ProtocolError, RobotCommand, RobotState,
};
pub use crate::robot::{ControlSignal, CycleCommand, Robot, RobotConfig, RobotError};
