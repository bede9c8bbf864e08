use integration_core::system_info::SystemInfo;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};

/// Coordinator-side record of one connected worker.
///
/// The session exclusively owns its socket; dropping the session closes it.
/// Reads and writes go through `&TcpStream`, so the orchestrator can send on
/// a socket while that session's collector is parked in a receive.
pub struct ClientSession {
    client_id: u64,
    stream: TcpStream,
    peer: SocketAddr,
    system_info: SystemInfo,
    task_sent: AtomicBool,
    result_received: AtomicBool,
}

impl ClientSession {
    pub fn new(client_id: u64, stream: TcpStream, peer: SocketAddr, system_info: SystemInfo) -> Self {
        Self {
            client_id,
            stream,
            peer,
            system_info,
            task_sent: AtomicBool::new(false),
            result_received: AtomicBool::new(false),
        }
    }

    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    pub fn cpu_cores(&self) -> u32 {
        self.system_info.cpu_cores
    }

    pub fn mark_task_sent(&self) {
        self.task_sent.store(true, Ordering::SeqCst);
    }

    pub fn task_sent(&self) -> bool {
        self.task_sent.load(Ordering::SeqCst)
    }

    pub fn mark_result_received(&self) {
        self.result_received.store(true, Ordering::SeqCst);
    }

    pub fn result_received(&self) -> bool {
        self.result_received.load(Ordering::SeqCst)
    }

    /// Shuts the socket down in both directions, waking any thread blocked
    /// on it. Errors are ignored: the peer may already be gone.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
