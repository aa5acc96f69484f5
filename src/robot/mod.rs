//! 机器人层
//!
//! 对外提供 `Robot`：会话生命周期、运动发生器/控制器状态机、
//! 每周期的 `update()` 以及应用层的 `control()` 循环。

pub mod control_loop;
pub mod error;
mod robot_impl;

pub use control_loop::{ControlSignal, CycleCommand};
pub use error::RobotError;
pub use robot_impl::{Robot, RobotConfig};
