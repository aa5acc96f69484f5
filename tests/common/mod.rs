//! 进程内的脚本化控制器桩
//!
//! 测试线程把动作按顺序入队，桩线程逐条执行：
//! 发送状态数据报、读取并应答可靠请求、校验收到的命令记录。
//! 阻塞动作（等请求、等命令）在机器人侧推进之前不会完成，
//! 因此脚本顺序即是协议交互顺序。

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use rci_sdk::protocol::{
    encode_command_response, encode_move_response, request_frame_len, CommandId, CommandStatus,
    ConnectReply, ConnectRequest, ConnectStatus, MoveRequest, MoveStatus, RobotCommand,
    RobotState, SetControllerModeRequest, CONNECT_REPLY_SIZE, CONNECT_REQUEST_SIZE,
    PROTOCOL_VERSION, ROBOT_COMMAND_WIRE_SIZE, ROBOT_STATE_WIRE_SIZE,
};
use rci_sdk::{Robot, RobotConfig};

type StateFn = Box<dyn FnOnce(&mut RobotState) + Send>;
type MoveFn = Box<dyn FnOnce(&MoveRequest) -> MoveStatus + Send>;
type ControllerModeFn = Box<dyn FnOnce(&SetControllerModeRequest) -> CommandStatus + Send>;
type CommandFn = Box<dyn FnOnce(&RobotCommand) + Send>;

enum ServerAction {
    /// 发送一条状态数据报（默认自增消息号，回调可改写任意字段）
    SendState(StateFn),
    /// 阻塞读取一个 Move 请求并按回调应答
    OnMove(MoveFn),
    /// 阻塞读取一个 SetControllerMode 请求并按回调应答
    OnSetControllerMode(ControllerModeFn),
    /// 阻塞读取指定命令的请求，丢弃请求体并回以给定状态
    OnRequest(CommandId, CommandStatus),
    /// 主动推送一个 Move 响应（不等请求）
    SendMoveResponse(MoveStatus),
    /// 阻塞接收一条命令记录并交给回调校验
    ExpectCommand(CommandFn),
    /// 关闭可靠通道
    CloseControlChannel,
}

/// 握手行为
pub enum Handshake {
    /// 正常接受
    Accept,
    /// 回复版本不兼容
    RejectVersion,
    /// 接受 TCP 连接但永不回复握手
    Silent,
}

pub struct MockServer {
    actions: Option<Sender<ServerAction>>,
    done: Receiver<()>,
    port: u16,
    pending: usize,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start() -> Self {
        Self::start_with(Handshake::Accept)
    }

    pub fn start_with(handshake: Handshake) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (action_tx, action_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let handle =
            thread::spawn(move || server_thread(listener, handshake, action_rx, done_tx));
        MockServer {
            actions: Some(action_tx),
            done: done_rx,
            port,
            pending: 0,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn send_state(&mut self, build: impl FnOnce(&mut RobotState) + Send + 'static) {
        self.push(ServerAction::SendState(Box::new(build)));
    }

    pub fn on_move(&mut self, respond: impl FnOnce(&MoveRequest) -> MoveStatus + Send + 'static) {
        self.push(ServerAction::OnMove(Box::new(respond)));
    }

    pub fn on_set_controller_mode(
        &mut self,
        respond: impl FnOnce(&SetControllerModeRequest) -> CommandStatus + Send + 'static,
    ) {
        self.push(ServerAction::OnSetControllerMode(Box::new(respond)));
    }

    pub fn on_request(&mut self, id: CommandId, status: CommandStatus) {
        self.push(ServerAction::OnRequest(id, status));
    }

    pub fn send_move_response(&mut self, status: MoveStatus) {
        self.push(ServerAction::SendMoveResponse(status));
    }

    pub fn expect_command(&mut self, check: impl FnOnce(&RobotCommand) + Send + 'static) {
        self.push(ServerAction::ExpectCommand(Box::new(check)));
    }

    pub fn close_control_channel(&mut self) {
        self.push(ServerAction::CloseControlChannel);
    }

    /// 等待已入队的动作全部执行完
    pub fn sync(&mut self) {
        while self.pending > 0 {
            self.done
                .recv_timeout(Duration::from_secs(5))
                .expect("mock server action timed out");
            self.pending -= 1;
        }
    }

    /// 执行完所有动作并回收桩线程，传播桩线程里的断言失败
    pub fn finish(mut self) {
        self.sync();
        self.actions.take();
        if let Some(handle) = self.handle.take() {
            handle.join().expect("mock server thread panicked");
        }
    }

    fn push(&mut self, action: ServerAction) {
        self.pending += 1;
        self.actions
            .as_ref()
            .expect("mock server already finished")
            .send(action)
            .expect("mock server thread is gone");
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        // 测试失败路径：丢掉通道让桩线程自行退出，不在 Drop 里二次 panic
        self.actions.take();
    }
}

/// 用给定的桩建立机器人会话（短超时，保证失败用例跑得快）
pub fn connect(server: &MockServer) -> Robot {
    Robot::connect_with_config(
        "127.0.0.1",
        RobotConfig {
            command_port: server.port(),
            timeout: Duration::from_secs(2),
        },
    )
    .unwrap()
}

fn server_thread(
    listener: TcpListener,
    handshake: Handshake,
    actions: Receiver<ServerAction>,
    done: Sender<()>,
) {
    let (mut tcp, peer) = listener.accept().unwrap();

    let mut request_buf = [0u8; CONNECT_REQUEST_SIZE];
    tcp.read_exact(&mut request_buf).unwrap();
    let connect_request = ConnectRequest::decode(&request_buf).unwrap();
    assert_eq!(connect_request.version, PROTOCOL_VERSION);

    match handshake {
        Handshake::Silent => {
            // 握住连接直到测试结束
            let _ = actions.recv();
            return;
        }
        Handshake::RejectVersion => {
            let reply = ConnectReply {
                version: PROTOCOL_VERSION + 1,
                status: ConnectStatus::IncompatibleLibraryVersion,
            };
            let mut buf = [0u8; CONNECT_REPLY_SIZE];
            reply.encode(&mut buf);
            tcp.write_all(&buf).unwrap();
            return;
        }
        Handshake::Accept => {
            let reply = ConnectReply {
                version: PROTOCOL_VERSION,
                status: ConnectStatus::Success,
            };
            let mut buf = [0u8; CONNECT_REPLY_SIZE];
            reply.encode(&mut buf);
            tcp.write_all(&buf).unwrap();
        }
    }

    let udp = UdpSocket::bind("127.0.0.1:0").unwrap();
    let client_udp = SocketAddr::new(peer.ip(), connect_request.udp_port);
    let mut message_id: u32 = 100;

    for action in actions.iter() {
        match action {
            ServerAction::SendState(build) => {
                message_id += 1;
                let mut state = RobotState::default();
                state.message_id = message_id;
                build(&mut state);
                // 回调可以改写消息号，后续自增从改写值继续
                message_id = state.message_id;
                let mut buf = [0u8; ROBOT_STATE_WIRE_SIZE];
                state.encode(&mut buf);
                udp.send_to(&buf, client_udp).unwrap();
            }
            ServerAction::OnMove(respond) => {
                let frame = read_request_frame(&mut tcp, CommandId::Move);
                let request = MoveRequest::decode(&frame).unwrap();
                let status = respond(&request);
                tcp.write_all(&encode_move_response(status)).unwrap();
            }
            ServerAction::OnSetControllerMode(respond) => {
                let frame = read_request_frame(&mut tcp, CommandId::SetControllerMode);
                let request = SetControllerModeRequest::decode(&frame).unwrap();
                let status = respond(&request);
                tcp.write_all(&encode_command_response(CommandId::SetControllerMode, status))
                    .unwrap();
            }
            ServerAction::OnRequest(id, status) => {
                let _ = read_request_frame(&mut tcp, id);
                tcp.write_all(&encode_command_response(id, status)).unwrap();
            }
            ServerAction::SendMoveResponse(status) => {
                tcp.write_all(&encode_move_response(status)).unwrap();
            }
            ServerAction::ExpectCommand(check) => {
                let mut buf = [0u8; ROBOT_COMMAND_WIRE_SIZE];
                let (n, _) = udp.recv_from(&mut buf).unwrap();
                assert_eq!(n, ROBOT_COMMAND_WIRE_SIZE, "robot command datagram size");
                let command = RobotCommand::decode(&buf[..n]).unwrap();
                check(&command);
            }
            ServerAction::CloseControlChannel => {
                let _ = tcp.shutdown(Shutdown::Both);
            }
        }
        let _ = done.send(());
    }
}

/// 读取一个完整请求帧：2 字节命令号 + 查表长度的请求体
fn read_request_frame(tcp: &mut TcpStream, expected: CommandId) -> Vec<u8> {
    let mut id_buf = [0u8; 2];
    tcp.read_exact(&mut id_buf).unwrap();
    let raw_id = u16::from_le_bytes(id_buf);
    let id = CommandId::from_u16(raw_id).expect("unknown command id from client");
    assert_eq!(id, expected, "unexpected command on the reliable channel");

    let total = request_frame_len(id);
    let mut frame = vec![0u8; total];
    frame[..2].copy_from_slice(&id_buf);
    tcp.read_exact(&mut frame[2..]).unwrap();
    frame
}
