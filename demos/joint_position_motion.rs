//! 关节位置运动示例
//!
//! 连接机器人后用余弦轨迹摆动 4、5、7 三个关节，运行 5 秒后结束。
//! 运行前确认机器人前方有足够的空间。
//!
//! ```bash
//! cargo run --example joint_position_motion -- <robot-hostname>
//! ```

use std::f64::consts::PI;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rci_sdk::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let hostname = match std::env::args().nth(1) {
        Some(hostname) => hostname,
        None => bail!("usage: joint_position_motion <robot-hostname>"),
    };

    let mut robot = Robot::connect(&hostname).context("failed to connect to the robot")?;

    // 参数只在控制循环开始前设置，绝不要在循环里设
    robot.set_collision_behavior(
        [20.0, 20.0, 18.0, 18.0, 16.0, 14.0, 12.0],
        [20.0, 20.0, 18.0, 18.0, 16.0, 14.0, 12.0],
        [20.0, 20.0, 18.0, 18.0, 16.0, 14.0, 12.0],
        [20.0, 20.0, 18.0, 18.0, 16.0, 14.0, 12.0],
        [20.0, 20.0, 20.0, 25.0, 25.0, 25.0],
        [20.0, 20.0, 20.0, 25.0, 25.0, 25.0],
        [20.0, 20.0, 20.0, 25.0, 25.0, 25.0],
        [20.0, 20.0, 20.0, 25.0, 25.0, 25.0],
    )?;

    println!("WARNING: this example will move the robot!");
    println!("Please make sure to have the user stop button at hand!");
    println!("Press Enter to continue...");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    let deviation = Deviation::new(10.0, 3.12, 2.0 * PI);
    let mut time = Duration::ZERO;
    let mut initial_position = [0.0; 7];

    robot.control(
        ControllerMode::JointImpedance,
        MotionGeneratorMode::JointPosition,
        deviation,
        deviation,
        |state, period| {
            time += period;
            if time.is_zero() {
                initial_position = state.q_d;
            }

            let t = time.as_secs_f64();
            let delta_angle = PI / 8.0 * (1.0 - (PI / 2.5 * t).cos());

            let mut motion = MotionGeneratorCommand::default();
            motion.q_c = initial_position;
            motion.q_c[3] += delta_angle;
            motion.q_c[4] += delta_angle;
            motion.q_c[6] += delta_angle;

            if t >= 5.0 {
                println!("Finished motion, shutting down example");
                Ok(ControlSignal::Finished(CycleCommand::from_motion(motion)))
            } else {
                Ok(ControlSignal::Continue(CycleCommand::from_motion(motion)))
            }
        },
    )?;

    Ok(())
}
