// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::params::validate_interval;
use crate::system_info::SystemInfo;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One integration sub-problem: a sub-interval of the global job plus the
/// operator-supplied step, identified by a job-wide unique id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub begin: f64,
    pub end: f64,
    pub step: f64,
}

impl Task {
    /// True when the sub-interval is integrable for 1/ln(x).
    pub fn is_valid(&self) -> bool {
        validate_interval(self.begin, self.end, self.step).is_ok()
    }
}

/// Outcome of a single task. A failed result carries value 0.0 and a
/// descriptive message; it contributes nothing to the final sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: u64,
    pub value: f64,
    pub success: bool,
    pub error_message: String,
}

impl TaskResult {
    pub fn success(task_id: u64, value: f64) -> Self {
        Self {
            task_id,
            value,
            success: true,
            error_message: String::new(),
        }
    }

    pub fn failure(task_id: u64, error_message: impl Into<String>) -> Self {
        Self {
            task_id,
            value: 0.0,
            success: false,
            error_message: error_message.into(),
        }
    }
}

/// The unit of work shipped to one worker for one job. Task order defines
/// the worker's local execution ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBatch {
    pub tasks: Vec<Task>,
}

/// The unit of results shipped back by one worker: one entry per received
/// task, plus the measured wall-clock execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBatch {
    pub client_id: u64,
    pub results: Vec<TaskResult>,
    pub total_time_seconds: f64,
}

/// First frame on a fresh connection, worker to coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    pub client_version: String,
    pub system_info: SystemInfo,
}

/// Coordinator's reply. `assigned_client_id` identifies the worker for the
/// rest of its session; `accepted = false` ends the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeResponse {
    pub assigned_client_id: u64,
    pub server_version: String,
    pub accepted: bool,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("unknown command discriminant on the wire: {0}")]
pub struct UnknownCommand(u8);

/// Control command kinds. Only STOP_WORK is exchanged during a normal job;
/// the remaining kinds are reserved by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CommandType {
    StartWork = 1,
    StopWork = 2,
    Ping = 3,
    Ack = 4,
}

impl From<CommandType> for u8 {
    fn from(command: CommandType) -> u8 {
        command as u8
    }
}

impl TryFrom<u8> for CommandType {
    type Error = UnknownCommand;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CommandType::StartWork),
            2 => Ok(CommandType::StopWork),
            3 => Ok(CommandType::Ping),
            4 => Ok(CommandType::Ack),
            _ => Err(UnknownCommand(value)),
        }
    }
}

/// Unicast control message, coordinator to worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub command_type: CommandType,
    pub message: String,
}

impl Command {
    pub fn stop_work(message: impl Into<String>) -> Self {
        Self {
            command_type: CommandType::StopWork,
            message: message.into(),
        }
    }
}
