// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod client;
pub mod integration;
pub mod integrator;
pub mod network;
pub mod system;
pub mod worker_pool;
