// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod client_registry;
pub mod client_session;
pub mod input_handler;
pub mod result_aggregator;
pub mod server;
pub mod task_partitioner;
