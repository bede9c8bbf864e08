// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::client_session::ClientSession;
use integration_core::system_info::SystemInfo;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Process-wide monotonic client id source. Ids are unique for the lifetime
/// of a coordinator process and start at 1.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Restarts client id assignment at 1 for a fresh coordinator run.
pub fn reset_client_ids() {
    NEXT_CLIENT_ID.store(1, Ordering::SeqCst);
}

/// Thread-safe table of active worker sessions.
///
/// The `accepting` latch is separate from the snapshot mutex: admission
/// checks stay off the lock, and flipping the latch is a one-way operation
/// that never blocks behind a snapshot.
pub struct ClientRegistry {
    clients: Mutex<Vec<Arc<ClientSession>>>,
    accepting: AtomicBool,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
            accepting: AtomicBool::new(true),
        }
    }

    /// Admits a handshaked worker: checks the accepting latch, assigns the
    /// next client id, and registers the session.
    ///
    /// Returns `None` without mutating anything once `stop_accepting` has
    /// been latched; the caller still owns nothing (the stream is dropped,
    /// which closes the connection).
    pub fn add_client(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        system_info: SystemInfo,
    ) -> Option<Arc<ClientSession>> {
        if !self.accepting.load(Ordering::SeqCst) {
            warn!(%peer, "rejecting worker: registry no longer accepting");
            return None;
        }

        let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::SeqCst);
        let session = Arc::new(ClientSession::new(client_id, stream, peer, system_info));

        let mut clients = self.clients.lock().unwrap();
        clients.push(session.clone());

        info!(
            client_id,
            %peer,
            cores = session.cpu_cores(),
            total_clients = clients.len(),
            "worker registered"
        );

        Some(session)
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// One-way latch: no worker is admitted after this returns.
    pub fn stop_accepting(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        info!("stopped accepting new workers");
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn total_cpu_cores(&self) -> u32 {
        let clients = self.clients.lock().unwrap();
        clients.iter().map(|c| c.cpu_cores()).sum()
    }

    pub fn get_client(&self, client_id: u64) -> Option<Arc<ClientSession>> {
        let clients = self.clients.lock().unwrap();
        clients.iter().find(|c| c.client_id() == client_id).cloned()
    }

    /// Snapshot of the current sessions, in registration order. Callers
    /// iterate the snapshot so the registry lock is never held across I/O.
    pub fn snapshot(&self) -> Vec<Arc<ClientSession>> {
        self.clients.lock().unwrap().clone()
    }

    pub fn remove_client(&self, client_id: u64) -> bool {
        let mut clients = self.clients.lock().unwrap();
        let before = clients.len();
        clients.retain(|c| c.client_id() != client_id);
        if clients.len() < before {
            info!(client_id, "worker removed from registry");
            true
        } else {
            warn!(client_id, "worker not found for removal");
            false
        }
    }

    pub fn clear(&self) {
        let mut clients = self.clients.lock().unwrap();
        info!(count = clients.len(), "clearing worker registry");
        clients.clear();
    }

    pub fn log_clients_info(&self) {
        let clients = self.clients.lock().unwrap();
        let total_cores: u32 = clients.iter().map(|c| c.cpu_cores()).sum();
        info!(
            total_clients = clients.len(),
            total_cores, "registered worker pool"
        );
        for session in clients.iter() {
            info!(
                client_id = session.client_id(),
                peer = %session.peer(),
                info = %session.system_info(),
                "worker"
            );
        }
    }
}
