//! 网络传输层
//!
//! 每个会话持有两个 socket：
//!
//! - **可靠通道**（TCP）：承载请求/响应记录与会话握手，响应可能跨多个实时周期
//!   陆续到达，因此这里维护一个按命令号分队列的待取响应表
//! - **数据报通道**（UDP）：承载固定长度的状态/命令实时流，本地端口由操作系统
//!   分配并在握手时上报给控制器
//!
//! 所有接收都经过 `poll_once()`：用 `poll(2)` 同时等待两个 socket，
//! 把到达的字节按通道分类后推进上层状态机。可靠通道上的零长读取
//! 意味着控制器关闭了连接，立即报告 `Disconnected`。

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::protocol::{
    decode_response, CommandId, CommandStatus, ConnectReply, ConnectRequest, MoveStatus,
    ProtocolError, Response, RobotCommand, RobotState, CONNECT_REPLY_SIZE, CONNECT_REQUEST_SIZE,
    PROTOCOL_VERSION, RESPONSE_SIZE, ROBOT_COMMAND_WIRE_SIZE, ROBOT_STATE_WIRE_SIZE,
};

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum NetworkError {
    /// 底层 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// 接收超时（数据报在周期内未到达，或可靠响应超时）
    #[error("Receive timeout")]
    Timeout,

    /// 可靠通道被控制器关闭
    #[error("Connection closed by the controller")]
    Disconnected,

    /// 尚未收到任何状态数据报，不知道控制器的实时流对端地址
    #[error("No state datagram received yet")]
    NotConnected,

    /// 线上记录违反协议（长度、命令号、枚举值）
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// 一次轮询的结果
#[derive(Debug)]
pub enum PollEvent {
    /// 收到一条状态数据报
    State(RobotState),
    /// 可靠通道有新响应入队（调用方应检查待取响应表）
    CommandChannel,
}

/// 双通道传输
///
/// socket 由会话独占，所有方法都要求 `&mut self`，不支持跨线程并发使用。
#[derive(Debug)]
pub struct Network {
    tcp: TcpStream,
    udp: UdpSocket,
    /// 控制器实时流的对端地址，从第一条状态数据报学习
    server_udp_addr: Option<SocketAddr>,
    /// 可靠通道的字节缓冲（响应帧可能跨 read 边界）
    rx_buf: Vec<u8>,
    /// 已到达、尚未被上层取走的响应，按命令号分队列
    pending: HashMap<CommandId, VecDeque<Response>>,
}

impl Network {
    /// 建立会话：TCP 连接 + 握手
    ///
    /// 绑定一个操作系统分配端口的 UDP socket，把端口号放进 `ConnectRequest`
    /// 上报给控制器，然后读取 `ConnectReply`。版本协商结果由上层判定，
    /// 这里只负责把握手记录完整收发。
    ///
    /// # 错误
    ///
    /// - `NetworkError::Timeout`: 连接或握手读取超时
    /// - `NetworkError::Disconnected`: 对端在握手期间关闭连接
    /// - `NetworkError::Io`: 其他 socket 错误
    pub fn connect(
        hostname: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<(Self, ConnectReply), NetworkError> {
        let addr = (hostname, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("cannot resolve hostname: {}", hostname),
                )
            })?;

        let tcp = TcpStream::connect_timeout(&addr, timeout)?;
        tcp.set_nodelay(true)?;
        tcp.set_read_timeout(Some(timeout))?;
        tcp.set_write_timeout(Some(timeout))?;

        let udp = UdpSocket::bind(("0.0.0.0", 0))?;
        let udp_port = udp.local_addr()?.port();
        udp.set_nonblocking(true)?;

        // 握手：上报版本与本地 UDP 端口，读取控制器的回复
        let request = ConnectRequest {
            version: PROTOCOL_VERSION,
            udp_port,
        };
        let mut request_buf = [0u8; CONNECT_REQUEST_SIZE];
        request.encode(&mut request_buf);
        (&tcp).write_all(&request_buf)?;

        let mut reply_buf = [0u8; CONNECT_REPLY_SIZE];
        let mut read = 0;
        while read < CONNECT_REPLY_SIZE {
            match (&tcp).read(&mut reply_buf[read..]) {
                Ok(0) => return Err(NetworkError::Disconnected),
                Ok(n) => read += n,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Err(NetworkError::Timeout);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let reply = ConnectReply::decode(&reply_buf)?;
        debug!(
            server_version = reply.version,
            udp_port, "RCI handshake complete"
        );

        Ok((
            Network {
                tcp,
                udp,
                server_udp_addr: None,
                rx_buf: Vec::new(),
                pending: HashMap::new(),
            },
            reply,
        ))
    }

    /// 在可靠通道上发送一个已编码的请求帧
    pub fn send_request(&mut self, frame: &[u8]) -> Result<(), NetworkError> {
        self.tcp.write_all(frame)?;
        trace!(len = frame.len(), "request sent on command channel");
        Ok(())
    }

    /// 在数据报通道上发送一条命令记录
    ///
    /// 目的地址取自最近一条状态数据报的来源；命令总是对某条状态的回应，
    /// 因此正常流程里地址必然已知。
    pub fn send_command(&mut self, command: &RobotCommand) -> Result<(), NetworkError> {
        let addr = self.server_udp_addr.ok_or(NetworkError::NotConnected)?;
        let mut buf = [0u8; ROBOT_COMMAND_WIRE_SIZE];
        command.encode(&mut buf);
        self.udp.send_to(&buf, addr)?;
        trace!(message_id = command.message_id, "robot command sent");
        Ok(())
    }

    /// 轮询两个通道直到有事件或到达截止时间
    ///
    /// # 返回
    ///
    /// - `Ok(PollEvent::State)`: 收到并解码了一条状态数据报
    /// - `Ok(PollEvent::CommandChannel)`: 可靠通道有新响应入队
    /// - `Err(NetworkError::Timeout)`: 截止时间内两个通道都没有事件
    /// - `Err(NetworkError::Disconnected)`: 可靠通道被对端关闭
    pub fn poll_once(&mut self, deadline: Instant) -> Result<PollEvent, NetworkError> {
        // 响应可能早已躺在 socket 缓冲区里，先非阻塞清一遍
        if self.drain_responses()? {
            return Ok(PollEvent::CommandChannel);
        }

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(NetworkError::Timeout);
            }
            let remaining = deadline - now;
            let ms = remaining.as_millis().clamp(1, u16::MAX as u128) as u16;

            let (tcp_ready, udp_ready) = {
                let mut fds = [
                    PollFd::new(self.tcp.as_fd(), PollFlags::POLLIN),
                    PollFd::new(self.udp.as_fd(), PollFlags::POLLIN),
                ];
                match poll(&mut fds, PollTimeout::from(ms)) {
                    Ok(0) => (false, false),
                    Ok(_) => (
                        fds[0].revents().map_or(false, |r| !r.is_empty()),
                        fds[1].revents().map_or(false, |r| !r.is_empty()),
                    ),
                    Err(nix::errno::Errno::EINTR) => continue,
                    Err(e) => {
                        return Err(NetworkError::Io(io::Error::from_raw_os_error(e as i32)));
                    }
                }
            };

            if tcp_ready && self.drain_responses()? {
                return Ok(PollEvent::CommandChannel);
            }
            if udp_ready {
                if let Some(state) = self.try_receive_state()? {
                    return Ok(PollEvent::State(state));
                }
            }
        }
    }

    /// 非阻塞地把可靠通道上已到达的字节切成响应帧并入队
    ///
    /// # 返回
    ///
    /// - `Ok(true)`: 至少有一个新响应入队
    /// - `Ok(false)`: 没有完整的新响应（可能只到了半帧）
    /// - `Err(NetworkError::Disconnected)`: 零长读取，对端已关闭
    pub fn drain_responses(&mut self) -> Result<bool, NetworkError> {
        self.tcp.set_nonblocking(true)?;
        let mut chunk = [0u8; 256];
        let read_result = loop {
            match self.tcp.read(&mut chunk) {
                Ok(0) => break Err(NetworkError::Disconnected),
                Ok(n) => self.rx_buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e.into()),
            }
        };
        self.tcp.set_nonblocking(false)?;
        read_result?;

        let mut any = false;
        while self.rx_buf.len() >= RESPONSE_SIZE {
            let response = decode_response(&self.rx_buf[..RESPONSE_SIZE])?;
            self.rx_buf.drain(..RESPONSE_SIZE);
            trace!(?response, "response received on command channel");
            self.pending
                .entry(response.command_id())
                .or_default()
                .push_back(response);
            any = true;
        }
        Ok(any)
    }

    /// 取走一个已到达的 Move 响应（若有）
    pub fn take_move_response(&mut self) -> Option<MoveStatus> {
        match self.pending.get_mut(&CommandId::Move)?.pop_front() {
            Some(Response::Move(status)) => Some(status),
            Some(other) => {
                warn!(?other, "mismatched response in Move queue");
                None
            }
            None => None,
        }
    }

    /// 取走一个已到达的通用命令响应（若有）
    pub fn take_command_response(&mut self, id: CommandId) -> Option<CommandStatus> {
        match self.pending.get_mut(&id)?.pop_front() {
            Some(Response::Command(_, status)) => Some(status),
            Some(other) => {
                warn!(?other, "mismatched response in command queue");
                None
            }
            None => None,
        }
    }

    /// 丢弃所有尚未取走的 Move 响应
    ///
    /// `StopMove` 中止运动后，对应的终止响应已无人认领。
    pub fn clear_move_responses(&mut self) {
        if let Some(queue) = self.pending.get_mut(&CommandId::Move) {
            queue.clear();
        }
    }

    fn try_receive_state(&mut self) -> Result<Option<RobotState>, NetworkError> {
        let mut buf = [0u8; 2048];
        match self.udp.recv_from(&mut buf) {
            Ok((n, peer)) => {
                if n != ROBOT_STATE_WIRE_SIZE {
                    return Err(NetworkError::Protocol(ProtocolError::InvalidLength {
                        expected: ROBOT_STATE_WIRE_SIZE,
                        actual: n,
                    }));
                }
                self.server_udp_addr = Some(peer);
                let state = RobotState::decode(&buf[..n])?;
                trace!(message_id = state.message_id, "robot state received");
                Ok(Some(state))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_move_response, ConnectStatus};
    use std::net::TcpListener;
    use std::thread;

    // 最小握手服务端：接受连接，校验 ConnectRequest，按给定状态回复
    fn spawn_handshake_server(
        reply_status: ConnectStatus,
        after: impl FnOnce(TcpStream) + Send + 'static,
    ) -> (u16, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; CONNECT_REQUEST_SIZE];
            stream.read_exact(&mut buf).unwrap();
            let request = ConnectRequest::decode(&buf).unwrap();
            assert_eq!(request.version, PROTOCOL_VERSION);
            assert_ne!(request.udp_port, 0);

            let reply = ConnectReply {
                version: PROTOCOL_VERSION,
                status: reply_status,
            };
            let mut reply_buf = [0u8; CONNECT_REPLY_SIZE];
            reply.encode(&mut reply_buf);
            stream.write_all(&reply_buf).unwrap();
            after(stream);
        });
        (port, handle)
    }

    #[test]
    fn test_connect_and_drain_responses() {
        let (port, handle) = spawn_handshake_server(ConnectStatus::Success, |mut stream| {
            stream
                .write_all(&encode_move_response(MoveStatus::MotionStarted))
                .unwrap();
            // 给客户端一点时间消费响应，然后关闭连接
            thread::sleep(Duration::from_millis(100));
        });

        let (mut network, reply) =
            Network::connect("127.0.0.1", port, Duration::from_secs(1)).unwrap();
        assert_eq!(reply.status, ConnectStatus::Success);

        // 轮询直到响应入队
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match network.poll_once(deadline).unwrap() {
                PollEvent::CommandChannel => break,
                PollEvent::State(_) => panic!("unexpected state datagram"),
            }
        }
        assert_eq!(network.take_move_response(), Some(MoveStatus::MotionStarted));
        assert_eq!(network.take_move_response(), None);

        handle.join().unwrap();

        // 服务端已关闭：下一次轮询必须报告断连
        let deadline = Instant::now() + Duration::from_secs(1);
        match network.poll_once(deadline) {
            Err(NetworkError::Disconnected) => {}
            Err(e) => panic!("expected Disconnected, got {:?}", e),
            Ok(event) => panic!("expected Disconnected, got {:?}", event),
        }
    }

    #[test]
    fn test_handshake_read_timeout() {
        // 服务端接受连接但不回复握手
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(600));
        });

        let start = Instant::now();
        let result = Network::connect("127.0.0.1", port, Duration::from_millis(200));
        assert!(matches!(result, Err(NetworkError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(1));

        handle.join().unwrap();
    }

    #[test]
    fn test_poll_timeout_when_idle() {
        let (port, handle) = spawn_handshake_server(ConnectStatus::Success, |_stream| {
            thread::sleep(Duration::from_millis(300));
        });

        let (mut network, _) =
            Network::connect("127.0.0.1", port, Duration::from_secs(1)).unwrap();

        let deadline = Instant::now() + Duration::from_millis(50);
        match network.poll_once(deadline) {
            Err(NetworkError::Timeout) => {}
            Err(e) => panic!("expected Timeout, got {:?}", e),
            Ok(event) => panic!("expected Timeout, got {:?}", event),
        }

        handle.join().unwrap();
    }

    #[test]
    fn test_send_command_without_peer_fails() {
        let (port, handle) = spawn_handshake_server(ConnectStatus::Success, |_stream| {
            thread::sleep(Duration::from_millis(100));
        });

        let (mut network, _) =
            Network::connect("127.0.0.1", port, Duration::from_secs(1)).unwrap();

        // 还没收到任何状态数据报，不知道对端实时流地址
        let command = RobotCommand::default();
        assert!(matches!(
            network.send_command(&command),
            Err(NetworkError::NotConnected)
        ));

        handle.join().unwrap();
    }
}
