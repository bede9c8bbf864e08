// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_client::integration::SimpsonsRule;
use integration_client::integrator::Integrator;
use integration_client::worker_pool::WorkerPool;
use integration_core::messages::Task;
use std::sync::Arc;

const REFERENCE_2_TO_3: f64 = 1.11842;

fn pool(num_threads: u32) -> WorkerPool {
    WorkerPool::new(num_threads, Arc::new(Integrator::new(Box::new(SimpsonsRule))))
}

fn tasks_over_2_to_3() -> Vec<Task> {
    vec![
        Task {
            id: 10,
            begin: 2.0,
            end: 2.5,
            step: 0.001,
        },
        Task {
            id: 20,
            begin: 2.5,
            end: 2.75,
            step: 0.001,
        },
        Task {
            id: 30,
            begin: 2.75,
            end: 3.0,
            step: 0.001,
        },
    ]
}

#[test]
fn test_results_preserve_task_identity_and_order() {
    // Arrange
    let tasks = tasks_over_2_to_3();

    // Act
    let results = pool(4).execute(&tasks);

    // Assert: one result per task, same position, same id
    assert_eq!(results.len(), tasks.len());
    for (task, result) in tasks.iter().zip(&results) {
        assert_eq!(result.task_id, task.id);
        assert!(result.success);
        assert!(result.error_message.is_empty());
    }
}

#[test]
fn test_sub_results_sum_to_the_whole_integral() {
    // Arrange
    let tasks = tasks_over_2_to_3();

    // Act
    let results = pool(2).execute(&tasks);
    let sum: f64 = results.iter().map(|r| r.value).sum();

    // Assert
    assert!((sum - REFERENCE_2_TO_3).abs() < REFERENCE_2_TO_3 * 0.01);
}

#[test]
fn test_single_thread_matches_parallel_execution() {
    // Arrange
    let tasks = tasks_over_2_to_3();

    // Act
    let sequential = pool(1).execute(&tasks);
    let parallel = pool(8).execute(&tasks);

    // Assert: identical work items, identical values
    assert_eq!(sequential, parallel);
}

#[test]
fn test_invalid_task_fails_alone() {
    // Arrange: the middle task straddles x = 1
    let tasks = vec![
        Task {
            id: 1,
            begin: 2.0,
            end: 2.5,
            step: 0.001,
        },
        Task {
            id: 2,
            begin: 0.5,
            end: 1.5,
            step: 0.001,
        },
        Task {
            id: 3,
            begin: 2.5,
            end: 3.0,
            step: 0.001,
        },
    ];

    // Act
    let results = pool(2).execute(&tasks);

    // Assert
    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(results[2].success);
    assert_eq!(results[1].value, 0.0);
    assert_eq!(results[1].error_message, "Invalid task parameters");
}

#[test]
fn test_oversized_step_is_an_invalid_task() {
    // Arrange
    let tasks = vec![Task {
        id: 1,
        begin: 2.0,
        end: 2.1,
        step: 0.5,
    }];

    // Act
    let results = pool(1).execute(&tasks);

    // Assert
    assert!(!results[0].success);
    assert_eq!(results[0].error_message, "Invalid task parameters");
}

#[test]
fn test_empty_batch_produces_empty_results() {
    // Act
    let results = pool(4).execute(&[]);

    // Assert
    assert!(results.is_empty());
}

#[test]
fn test_more_threads_than_tasks() {
    // Arrange
    let tasks = vec![Task {
        id: 7,
        begin: 2.0,
        end: 3.0,
        step: 0.01,
    }];

    // Act
    let results = pool(16).execute(&tasks);

    // Assert
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].task_id, 7);
}

#[test]
fn test_zero_requested_threads_clamps_to_one() {
    // Act
    let pool = pool(0);

    // Assert
    assert_eq!(pool.num_threads(), 1);
    let results = pool.execute(&tasks_over_2_to_3());
    assert_eq!(results.len(), 3);
}

#[test]
fn test_many_small_tasks_keep_identity_under_contention() {
    // Arrange: enough tasks that every thread steals repeatedly
    let tasks: Vec<Task> = (0..64)
        .map(|i| {
            let begin = 2.0 + i as f64 * 0.015625;
            Task {
                id: 1000 + i,
                begin,
                end: begin + 0.015625,
                step: 0.0001,
            }
        })
        .collect();

    // Act
    let results = pool(8).execute(&tasks);

    // Assert
    assert_eq!(results.len(), 64);
    for (task, result) in tasks.iter().zip(&results) {
        assert_eq!(result.task_id, task.id);
        assert!(result.success);
    }
}
