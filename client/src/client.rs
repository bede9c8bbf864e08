// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::integration::{IntegrationStrategy, SimpsonsRule};
use crate::integrator::Integrator;
use crate::network::{ClientError, ServerConnection};
use crate::system::collect_system_info;
use crate::worker_pool::WorkerPool;
use integration_core::messages::{CommandType, ResultBatch, TaskResult};
use integration_core::system_info::SystemInfo;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// One worker session: connect, handshake, receive the task batch, execute
/// it across local threads, report the results, await STOP_WORK.
///
/// Any transport error after connecting is fatal to the session; the socket
/// is released on every exit path.
pub struct Client {
    connection: ServerConnection,
    system_info: SystemInfo,
    integrator: Arc<Integrator>,
    client_id: u64,
}

impl Client {
    pub fn new(server_address: impl Into<String>, server_port: u16) -> Self {
        let system_info = collect_system_info();
        info!(%system_info, "system info collected");

        Self {
            connection: ServerConnection::new(server_address, server_port),
            system_info,
            integrator: Arc::new(Integrator::new(Box::new(SimpsonsRule))),
            client_id: 0,
        }
    }

    /// Swaps the numerical rule before the session runs. The coordinator
    /// never learns which rule a worker uses.
    pub fn with_strategy(mut self, strategy: Box<dyn IntegrationStrategy>) -> Self {
        self.integrator = Arc::new(Integrator::new(strategy));
        self
    }

    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    pub fn run(&mut self) -> Result<(), ClientError> {
        self.connection.connect()?;

        let handshake = self
            .connection
            .perform_handshake(env!("CARGO_PKG_VERSION"), &self.system_info)?;
        self.client_id = handshake.assigned_client_id;
        info!(client_id = self.client_id, "assigned client id");

        let batch = self.connection.receive_tasks()?;

        // An empty batch is a legal no-op: an empty result batch is still
        // reported and the session proceeds to await STOP_WORK.
        let start = Instant::now();
        let results: Vec<TaskResult> = if batch.tasks.is_empty() {
            warn!("received empty task batch");
            Vec::new()
        } else {
            let pool = WorkerPool::new(self.system_info.cpu_cores, self.integrator.clone());
            pool.execute(&batch.tasks)
        };
        let total_time_seconds = start.elapsed().as_secs_f64();
        info!(time_seconds = total_time_seconds, "task batch executed");

        self.connection.send_results(&ResultBatch {
            client_id: self.client_id,
            results,
            total_time_seconds,
        })?;

        let command = self.connection.receive_command()?;
        match command.command_type {
            CommandType::StopWork => {
                info!(message = %command.message, "STOP_WORK received");
            }
            other => {
                warn!(command = ?other, "unexpected command, stopping anyway");
            }
        }

        self.connection.disconnect();
        info!("session finished");
        Ok(())
    }
}
