// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use integration_core::messages::{Command, CommandType, Task};
use integration_core::wire::{
    receive_frame, receive_message, send_frame, send_message, WireError, MAX_PACKET_SIZE,
};
use std::io::Cursor;

#[test]
fn test_frame_round_trip() {
    // Arrange
    let payload = b"distributed integration".to_vec();
    let mut wire = Vec::new();

    // Act
    send_frame(&mut wire, &payload).unwrap();
    let received = receive_frame(&mut Cursor::new(&wire)).unwrap();

    // Assert
    assert_eq!(received, payload);
}

#[test]
fn test_length_prefix_is_big_endian_payload_length() {
    // Arrange
    let payload = vec![0xAB; 300];
    let mut wire = Vec::new();

    // Act
    send_frame(&mut wire, &payload).unwrap();

    // Assert
    assert_eq!(wire.len(), 4 + payload.len());
    assert_eq!(wire[..4], (payload.len() as u32).to_be_bytes());
}

#[test]
fn test_empty_payload_is_rejected_on_send() {
    // Arrange
    let mut wire = Vec::new();

    // Act
    let result = send_frame(&mut wire, &[]);

    // Assert
    assert!(matches!(result, Err(WireError::FrameLength(0))));
    assert!(wire.is_empty());
}

#[test]
fn test_zero_declared_length_is_rejected() {
    // Arrange
    let wire = 0u32.to_be_bytes().to_vec();

    // Act
    let result = receive_frame(&mut Cursor::new(&wire));

    // Assert
    assert!(matches!(result, Err(WireError::FrameLength(0))));
}

#[test]
fn test_oversized_declared_length_is_rejected_before_reading_payload() {
    // Arrange: only the prefix is on the wire; a reader that tried to
    // allocate and read the declared payload would fail with an i/o error
    // instead of the length error.
    let declared = (MAX_PACKET_SIZE as u32) + 1;
    let wire = declared.to_be_bytes().to_vec();

    // Act
    let result = receive_frame(&mut Cursor::new(&wire));

    // Assert
    assert!(matches!(result, Err(WireError::FrameLength(n)) if n == declared as usize));
}

#[test]
fn test_maximum_declared_length_is_still_read() {
    // Arrange: declared length == cap with a truncated body; the length
    // check must pass and the failure must be the short read.
    let mut wire = (MAX_PACKET_SIZE as u32).to_be_bytes().to_vec();
    wire.extend_from_slice(&[0u8; 16]);

    // Act
    let result = receive_frame(&mut Cursor::new(&wire));

    // Assert
    assert!(matches!(result, Err(WireError::Io(_))));
}

#[test]
fn test_truncated_payload_is_a_transport_error() {
    // Arrange
    let mut wire = Vec::new();
    send_frame(&mut wire, &[1, 2, 3, 4, 5]).unwrap();
    wire.truncate(wire.len() - 2);

    // Act
    let result = receive_frame(&mut Cursor::new(&wire));

    // Assert
    assert!(matches!(result, Err(WireError::Io(_))));
}

#[test]
fn test_truncated_prefix_is_a_transport_error() {
    // Arrange
    let wire = vec![0u8, 0u8];

    // Act
    let result = receive_frame(&mut Cursor::new(&wire));

    // Assert
    assert!(matches!(result, Err(WireError::Io(_))));
}

#[test]
fn test_message_round_trip_reproduces_the_value() {
    // Arrange
    let task = Task {
        id: 42,
        begin: 2.0,
        end: 3.0,
        step: 0.01,
    };
    let mut wire = Vec::new();

    // Act
    send_message(&mut wire, &task).unwrap();
    let received: Task = receive_message(&mut Cursor::new(&wire)).unwrap();

    // Assert
    assert_eq!(received, task);
}

#[test]
fn test_consecutive_messages_share_one_stream() {
    // Arrange
    let first = Task {
        id: 1,
        begin: 2.0,
        end: 2.5,
        step: 0.01,
    };
    let second = Task {
        id: 2,
        begin: 2.5,
        end: 3.0,
        step: 0.01,
    };
    let mut wire = Vec::new();

    // Act
    send_message(&mut wire, &first).unwrap();
    send_message(&mut wire, &second).unwrap();
    let mut cursor = Cursor::new(&wire);
    let received_first: Task = receive_message(&mut cursor).unwrap();
    let received_second: Task = receive_message(&mut cursor).unwrap();

    // Assert
    assert_eq!(received_first, first);
    assert_eq!(received_second, second);
}

#[test]
fn test_stop_work_command_keeps_its_wire_discriminant() {
    // Arrange
    let command = Command::stop_work("done");
    let mut wire = Vec::new();

    // Act
    send_message(&mut wire, &command).unwrap();

    // Assert: first payload byte is the STOP_WORK discriminant
    assert_eq!(wire[4], 2);
    let received: Command = receive_message(&mut Cursor::new(&wire)).unwrap();
    assert_eq!(received.command_type, CommandType::StopWork);
}
