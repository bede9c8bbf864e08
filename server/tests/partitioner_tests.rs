// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_core::messages::TaskBatch;
use integration_server::task_partitioner::{PartitionError, TaskPartitioner};
use std::collections::HashMap;

// Task ids come from a process-wide counter shared by concurrently running
// tests, so assertions here stay relative: consecutive within a batch,
// unique across batches. Absolute id values are covered in task_id_tests.rs.

fn ordered_tasks(batches: &HashMap<u64, TaskBatch>, clients: &[(u64, u32)]) -> Vec<(f64, f64)> {
    let mut intervals = Vec::new();
    for &(client_id, _) in clients {
        for task in &batches[&client_id].tasks {
            intervals.push((task.begin, task.end));
        }
    }
    intervals
}

#[test]
fn test_single_worker_gets_one_task_per_core() {
    // Arrange
    let clients = vec![(1, 4)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let batches = partitioner.distribute(&clients, 2.0, 3.0, 0.01).unwrap();

    // Assert
    let batch = &batches[&1];
    assert_eq!(batch.tasks.len(), 4);
    assert_eq!(partitioner.total_tasks(), 4);
    assert_eq!(batch.tasks[0].begin, 2.0);
    assert_eq!(batch.tasks[3].end, 3.0);
    for task in &batch.tasks {
        assert!((task.end - task.begin - 0.25).abs() < 1e-9);
        assert_eq!(task.step, 0.01);
    }
    for pair in batch.tasks.windows(2) {
        assert_eq!(pair[0].end, pair[1].begin);
        assert_eq!(pair[1].id, pair[0].id + 1);
    }
}

#[test]
fn test_uneven_cores_share_the_interval_proportionally() {
    // Arrange: 2 + 6 cores over [2, 10000]
    let clients = vec![(1, 2), (2, 6)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let batches = partitioner.distribute(&clients, 2.0, 10000.0, 0.01).unwrap();

    // Assert
    assert_eq!(partitioner.total_tasks(), 8);
    let first = &batches[&1];
    let second = &batches[&2];
    assert_eq!(first.tasks.len(), 2);
    assert_eq!(second.tasks.len(), 6);

    // First worker covers a quarter of the range, starting at the lower bound
    let expected_boundary = 2.0 + 9998.0 * 2.0 / 8.0;
    assert_eq!(first.tasks[0].begin, 2.0);
    assert!((first.tasks[1].end - expected_boundary).abs() < 1e-6);

    // Second worker continues seamlessly and lands exactly on the upper bound
    assert_eq!(second.tasks[0].begin, first.tasks[1].end);
    assert_eq!(second.tasks[5].end, 10000.0);
}

#[test]
fn test_partition_is_a_contiguous_cover() {
    // Arrange
    let clients = vec![(10, 3), (11, 1), (12, 5), (13, 2)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let batches = partitioner.distribute(&clients, 1.5, 7.25, 0.001).unwrap();

    // Assert: no gap, no overlap, exact bounds
    let intervals = ordered_tasks(&batches, &clients);
    assert_eq!(intervals.len(), 11);
    assert_eq!(intervals.first().unwrap().0, 1.5);
    assert_eq!(intervals.last().unwrap().1, 7.25);
    for pair in intervals.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
    for (begin, end) in &intervals {
        assert!(end > begin);
    }
}

#[test]
fn test_task_ids_are_unique_and_increasing_across_workers() {
    // Arrange
    let clients = vec![(1, 2), (2, 3), (3, 1)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let batches = partitioner.distribute(&clients, 2.0, 5.0, 0.01).unwrap();

    // Assert
    let mut ids = Vec::new();
    for &(client_id, _) in &clients {
        ids.extend(batches[&client_id].tasks.iter().map(|t| t.id));
    }
    assert_eq!(ids.len(), 6);
    for pair in ids.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
    assert!(ids[0] >= 1);
}

#[test]
fn test_zero_core_worker_is_treated_as_single_core() {
    // Arrange: must be rejected at handshake, but the partitioner still
    // refuses to starve one that slipped through
    let clients = vec![(1, 0), (2, 4)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let batches = partitioner.distribute(&clients, 2.0, 7.0, 0.01).unwrap();

    // Assert: shares computed as 1 core out of 5
    assert_eq!(batches[&1].tasks.len(), 1);
    assert_eq!(batches[&2].tasks.len(), 4);
    assert!((batches[&1].tasks[0].end - 3.0).abs() < 1e-9);
    assert_eq!(batches[&2].tasks[3].end, 7.0);
}

#[test]
fn test_no_workers_is_an_error() {
    // Arrange
    let mut partitioner = TaskPartitioner::new();

    // Act
    let result = partitioner.distribute(&[], 2.0, 3.0, 0.01);

    // Assert
    assert!(matches!(result, Err(PartitionError::NoWorkers)));
}

#[test]
fn test_job_producing_a_sub_interval_at_the_singularity_is_rejected() {
    // Arrange: [0.5, 1.5] splits into sub-intervals around x = 1; the job
    // must be refused before dispatch rather than shipped to fail remotely
    let clients = vec![(1, 2)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let result = partitioner.distribute(&clients, 0.5, 1.5, 0.001);

    // Assert
    assert!(matches!(result, Err(PartitionError::InvalidTask { .. })));
}

#[test]
fn test_step_wider_than_a_share_is_rejected_before_dispatch() {
    // Arrange: 0.3 fits [2, 3] but not a quarter of it
    let clients = vec![(1, 4)];
    let mut partitioner = TaskPartitioner::new();

    // Act
    let result = partitioner.distribute(&clients, 2.0, 3.0, 0.3);

    // Assert
    assert!(matches!(result, Err(PartitionError::InvalidTask { .. })));
}
