// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::client_registry::ClientRegistry;
use crate::client_session::ClientSession;
use crate::result_aggregator::ResultAggregator;
use crate::task_partitioner::{PartitionError, TaskPartitioner};
use integration_core::messages::{Command, HandshakeRequest, HandshakeResponse, ResultBatch};
use integration_core::params::{IntegrationParameters, ParameterError};
use integration_core::wire::{receive_message, send_message, WireError};
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// How often the accept loop and the START gate re-check their latches.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the coordinator waits for the full result set before settling
/// for a partial sum.
pub const DEFAULT_RESULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid integration parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
    #[error("failed to listen on port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },
    #[error("no workers connected at START")]
    NoWorkers,
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error("failed to send task batch to worker {client_id}: {source}")]
    Dispatch { client_id: u64, source: WireError },
}

/// What one finished job looked like from the coordinator's side.
///
/// `completed == false` means the collection window expired and
/// `final_result` is a partial sum.
#[derive(Debug, Clone, Copy)]
pub struct JobOutcome {
    pub final_result: f64,
    pub completed: bool,
    pub expected_results: usize,
    pub received_results: usize,
    pub successful_results: usize,
    pub failed_results: usize,
}

/// The coordinator: accepts workers until the START gate opens, partitions
/// the job over the frozen registry, dispatches one batch per worker,
/// collects one result batch per worker, and broadcasts STOP_WORK on the
/// way out — on error paths too.
pub struct Server {
    port: u16,
    registry: Arc<ClientRegistry>,
    running: Arc<AtomicBool>,
    start_requested: Arc<AtomicBool>,
    local_addr: Mutex<Option<SocketAddr>>,
    result_timeout_secs: u64,
}

impl Server {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            registry: Arc::new(ClientRegistry::new()),
            running: Arc::new(AtomicBool::new(false)),
            start_requested: Arc::new(AtomicBool::new(false)),
            local_addr: Mutex::new(None),
            result_timeout_secs: DEFAULT_RESULT_TIMEOUT_SECS,
        }
    }

    /// Overrides the collection deadline. Zero waits forever.
    pub fn with_result_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.result_timeout_secs = timeout_secs;
        self
    }

    /// The address actually bound, available once `run` has started
    /// accepting. With port 0 this is where the OS-assigned port shows up.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap()
    }

    pub fn client_count(&self) -> usize {
        self.registry.client_count()
    }

    /// Opens the START gate. Called by the operator input handler; tests
    /// call it directly.
    pub fn request_start(&self) {
        self.start_requested.store(true, Ordering::SeqCst);
    }

    /// Requests shutdown. The accept loop and the START gate observe the
    /// flag within one poll interval.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Runs one complete job. Returns `Ok(None)` when shutdown arrived
    /// before the START gate opened.
    pub fn run(&self, params: &IntegrationParameters) -> Result<Option<JobOutcome>, ServerError> {
        params.validate()?;

        info!(
            lower = params.lower_limit,
            upper = params.upper_limit,
            step = params.step,
            "coordinator starting"
        );

        self.running.store(true, Ordering::SeqCst);
        let accept_handle = self.start_accepting()?;

        info!("waiting for workers; START opens the dispatch gate");
        while !self.start_requested.load(Ordering::SeqCst) {
            if !self.running.load(Ordering::SeqCst) {
                info!("coordinator stopped before START");
                self.registry.stop_accepting();
                let _ = accept_handle.join();
                self.registry.clear();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }

        // Freeze the worker pool; the partition below is computed over this
        // exact snapshot.
        self.registry.stop_accepting();
        let _ = accept_handle.join();

        if self.registry.client_count() == 0 {
            error!("no workers connected, cannot start integration");
            self.running.store(false, Ordering::SeqCst);
            return Err(ServerError::NoWorkers);
        }

        self.registry.log_clients_info();

        let clients = self.registry.snapshot();
        let job = self.run_job(&clients, params);

        // STOPPING: best-effort stop broadcast and socket teardown happen on
        // success, timeout, and dispatch-failure paths alike.
        self.send_stop_to_all(&clients);
        for session in &clients {
            session.shutdown();
        }

        let outcome = match job {
            Ok((outcome, collectors)) => {
                for handle in collectors {
                    let _ = handle.join();
                }
                Ok(Some(outcome))
            }
            Err(e) => Err(e),
        };

        self.registry.clear();
        self.running.store(false, Ordering::SeqCst);
        info!("coordinator stopped");

        outcome
    }

    fn start_accepting(&self) -> Result<JoinHandle<()>, ServerError> {
        let bind_err = |source| ServerError::Bind {
            port: self.port,
            source,
        };

        let listener = TcpListener::bind(("0.0.0.0", self.port)).map_err(bind_err)?;
        listener.set_nonblocking(true).map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;
        *self.local_addr.lock().unwrap() = Some(addr);

        info!(%addr, "listening for workers");

        let registry = self.registry.clone();
        let running = self.running.clone();
        Ok(thread::spawn(move || accept_loop(listener, registry, running)))
    }

    fn run_job(
        &self,
        clients: &[Arc<ClientSession>],
        params: &IntegrationParameters,
    ) -> Result<(JobOutcome, Vec<JoinHandle<()>>), ServerError> {
        let shares: Vec<(u64, u32)> = clients
            .iter()
            .map(|c| (c.client_id(), c.cpu_cores()))
            .collect();

        let mut partitioner = TaskPartitioner::new();
        let batches = partitioner.distribute(
            &shares,
            params.lower_limit,
            params.upper_limit,
            params.step,
        )?;

        let aggregator = Arc::new(ResultAggregator::new(partitioner.total_tasks()));

        // DISPATCHING: any send failure fails the whole job.
        for session in clients {
            let batch = &batches[&session.client_id()];
            debug!(
                client_id = session.client_id(),
                tasks = batch.tasks.len(),
                "sending task batch"
            );
            send_message(&mut session.stream(), batch).map_err(|source| ServerError::Dispatch {
                client_id: session.client_id(),
                source,
            })?;
            session.mark_task_sent();
        }
        info!("all task batches sent");

        // COLLECTING: one collector per session, each performing exactly one
        // result receive and pushing into the shared aggregator.
        let collectors: Vec<JoinHandle<()>> = clients
            .iter()
            .map(|session| {
                let session = session.clone();
                let aggregator = aggregator.clone();
                thread::spawn(move || collect_results(&session, &aggregator))
            })
            .collect();

        let completed = aggregator.wait_for_all(self.result_timeout_secs);
        if !completed {
            warn!(
                "collection window expired; the reported integral is a PARTIAL sum over the \
                 results that did arrive"
            );
        }
        aggregator.log_summary();

        let outcome = JobOutcome {
            final_result: aggregator.final_result(),
            completed,
            expected_results: aggregator.expected_count(),
            received_results: aggregator.received_count(),
            successful_results: aggregator.successful_count(),
            failed_results: aggregator.error_count(),
        };

        Ok((outcome, collectors))
    }

    fn send_stop_to_all(&self, clients: &[Arc<ClientSession>]) {
        info!("broadcasting STOP_WORK to all workers");

        let command = Command::stop_work("Integration completed");
        for session in clients {
            match send_message(&mut session.stream(), &command) {
                Ok(()) => debug!(client_id = session.client_id(), "STOP_WORK sent"),
                Err(e) => warn!(
                    client_id = session.client_id(),
                    error = %e,
                    "failed to send STOP_WORK"
                ),
            }
        }
    }
}

fn accept_loop(listener: TcpListener, registry: Arc<ClientRegistry>, running: Arc<AtomicBool>) {
    debug!("accept thread started");

    while running.load(Ordering::SeqCst) && registry.is_accepting() {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!(%peer, error = %e, "failed to configure accepted socket");
                    continue;
                }
                let registry = registry.clone();
                thread::spawn(move || handle_connection(stream, peer, &registry));
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                error!(error = %e, "accept failed");
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    debug!("accept thread finished");
}

/// Per-connection handshake: read the request, screen it, register the
/// session, reply with the assigned id.
fn handle_connection(stream: TcpStream, peer: SocketAddr, registry: &ClientRegistry) {
    info!(%peer, "new connection");

    let request: HandshakeRequest = match receive_message(&mut &stream) {
        Ok(request) => request,
        Err(e) => {
            error!(%peer, error = %e, "handshake receive failed");
            return;
        }
    };

    info!(
        %peer,
        version = %request.client_version,
        info = %request.system_info,
        "handshake received"
    );

    if request.system_info.cpu_cores == 0 {
        warn!(%peer, "rejecting worker reporting zero CPU cores");
        let response = HandshakeResponse {
            assigned_client_id: 0,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            accepted: false,
            message: "worker must report at least one CPU core".to_string(),
        };
        if let Err(e) = send_message(&mut &stream, &response) {
            warn!(%peer, error = %e, "failed to send handshake rejection");
        }
        return;
    }

    if !registry.is_accepting() {
        let response = HandshakeResponse {
            assigned_client_id: 0,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            accepted: false,
            message: "server is no longer accepting workers".to_string(),
        };
        if let Err(e) = send_message(&mut &stream, &response) {
            warn!(%peer, error = %e, "failed to send handshake rejection");
        }
        return;
    }

    match registry.add_client(stream, peer, request.system_info) {
        Some(session) => {
            let response = HandshakeResponse {
                assigned_client_id: session.client_id(),
                server_version: env!("CARGO_PKG_VERSION").to_string(),
                accepted: true,
                message: "connection accepted".to_string(),
            };
            if let Err(e) = send_message(&mut session.stream(), &response) {
                error!(
                    client_id = session.client_id(),
                    error = %e,
                    "failed to send handshake response"
                );
                registry.remove_client(session.client_id());
            } else {
                info!(client_id = session.client_id(), "handshake completed");
            }
        }
        // Latch flipped between the check above and the insert; the dropped
        // stream closes the connection.
        None => {}
    }
}

/// Receives the single result batch of one session and folds it into the
/// aggregator. A transport or decode failure only logs: the missing batch
/// stalls completion until the aggregator timeout expires.
fn collect_results(session: &ClientSession, aggregator: &ResultAggregator) {
    debug!(client_id = session.client_id(), "waiting for results");

    match receive_message::<_, ResultBatch>(&mut session.stream()) {
        Ok(batch) => {
            session.mark_result_received();
            info!(
                client_id = session.client_id(),
                results = batch.results.len(),
                time_seconds = batch.total_time_seconds,
                "results received"
            );
            aggregator.add(&batch);
        }
        Err(e) => {
            error!(
                client_id = session.client_id(),
                error = %e,
                "failed to receive results; this worker will not be aggregated"
            );
        }
    }
}
