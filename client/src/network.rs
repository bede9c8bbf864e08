// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_core::messages::{
    Command, HandshakeRequest, HandshakeResponse, ResultBatch, TaskBatch,
};
use integration_core::system_info::SystemInfo;
use integration_core::wire::{receive_message, send_message, WireError};
use std::net::{Shutdown, TcpStream};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not connected to server")]
    NotConnected,
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("handshake rejected by server: {0}")]
    HandshakeRejected(String),
}

/// The worker's side of its one coordinator connection.
///
/// One method per protocol step; all of them fail with `NotConnected` when
/// called out of order.
pub struct ServerConnection {
    server_address: String,
    server_port: u16,
    stream: Option<TcpStream>,
}

impl ServerConnection {
    pub fn new(server_address: impl Into<String>, server_port: u16) -> Self {
        Self {
            server_address: server_address.into(),
            server_port,
            stream: None,
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_address, self.server_port)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn connect(&mut self) -> Result<(), ClientError> {
        if self.stream.is_some() {
            warn!("already connected to server");
            return Ok(());
        }

        info!(address = %self.server_address(), "connecting to server");

        let stream = TcpStream::connect((self.server_address.as_str(), self.server_port))
            .map_err(|source| ClientError::Connect {
                address: self.server_address(),
                source,
            })?;

        self.stream = Some(stream);
        info!(address = %self.server_address(), "connected to server");
        Ok(())
    }

    fn stream(&self) -> Result<&TcpStream, ClientError> {
        self.stream.as_ref().ok_or(ClientError::NotConnected)
    }

    /// Sends the handshake request and awaits the coordinator's verdict.
    /// A rejection is surfaced as `HandshakeRejected`.
    pub fn perform_handshake(
        &mut self,
        client_version: &str,
        system_info: &SystemInfo,
    ) -> Result<HandshakeResponse, ClientError> {
        let mut stream = self.stream()?;

        let request = HandshakeRequest {
            client_version: client_version.to_string(),
            system_info: system_info.clone(),
        };
        send_message(&mut stream, &request)?;
        debug!("handshake request sent");

        let response: HandshakeResponse = receive_message(&mut stream)?;
        if !response.accepted {
            return Err(ClientError::HandshakeRejected(response.message));
        }

        info!(
            client_id = response.assigned_client_id,
            server_version = %response.server_version,
            "handshake successful"
        );
        Ok(response)
    }

    pub fn receive_tasks(&mut self) -> Result<TaskBatch, ClientError> {
        let mut stream = self.stream()?;

        info!("waiting for tasks from server");
        let batch: TaskBatch = receive_message(&mut stream)?;
        info!(tasks = batch.tasks.len(), "tasks received");
        Ok(batch)
    }

    pub fn send_results(&mut self, results: &ResultBatch) -> Result<(), ClientError> {
        let mut stream = self.stream()?;

        info!(results = results.results.len(), "sending results to server");
        send_message(&mut stream, results)?;
        info!("results sent");
        Ok(())
    }

    pub fn receive_command(&mut self) -> Result<Command, ClientError> {
        let mut stream = self.stream()?;

        debug!("waiting for command from server");
        let command: Command = receive_message(&mut stream)?;
        debug!(command = ?command.command_type, "command received");
        Ok(command)
    }

    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            info!("disconnecting from server");
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for ServerConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
