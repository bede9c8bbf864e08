// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::integrator::Integrator;
use integration_core::messages::{Task, TaskResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Bounded pool executing a task batch in parallel.
///
/// Threads pull task indices from a shared atomic cursor, so fast threads
/// absorb the slow tasks of their siblings. Each output slot belongs to
/// exactly one task index: the returned vector has one result per task, in
/// task order, with matching task ids.
pub struct WorkerPool {
    num_threads: usize,
    integrator: Arc<Integrator>,
}

impl WorkerPool {
    pub fn new(num_threads: u32, integrator: Arc<Integrator>) -> Self {
        let num_threads = num_threads.max(1) as usize;
        info!(
            num_threads,
            method = integrator.method_name(),
            "worker pool created"
        );
        Self {
            num_threads,
            integrator,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn execute(&self, tasks: &[Task]) -> Vec<TaskResult> {
        if tasks.is_empty() {
            warn!("no tasks to execute");
            return Vec::new();
        }

        let thread_count = self.num_threads.min(tasks.len());
        info!(
            tasks = tasks.len(),
            threads = thread_count,
            "starting parallel execution"
        );

        let cursor = AtomicUsize::new(0);
        let mut slots: Vec<Option<TaskResult>> = vec![None; tasks.len()];

        thread::scope(|scope| {
            let handles: Vec<_> = (0..thread_count)
                .map(|_| {
                    let cursor = &cursor;
                    let integrator = &self.integrator;
                    scope.spawn(move || {
                        let mut completed = Vec::new();
                        loop {
                            let index = cursor.fetch_add(1, Ordering::SeqCst);
                            if index >= tasks.len() {
                                break;
                            }
                            completed.push((index, integrator.execute_task(&tasks[index])));
                        }
                        completed
                    })
                })
                .collect();

            for handle in handles {
                if let Ok(completed) = handle.join() {
                    for (index, result) in completed {
                        slots[index] = Some(result);
                    }
                }
            }
        });

        let results: Vec<TaskResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| TaskResult::failure(tasks[index].id, "task was not executed"))
            })
            .collect();

        let successful = results.iter().filter(|r| r.success).count();
        info!(
            successful,
            failed = results.len() - successful,
            "parallel execution completed"
        );

        results
    }
}
