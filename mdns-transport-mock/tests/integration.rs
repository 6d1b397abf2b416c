// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for the mock transport

use mdns_transport::{
    recv_completion, send_completion, BindError, Completion, DatagramSocket, Endpoint,
    MulticastError, SocketError, SocketFactory,
};
use mdns_transport_mock::{MockTransport, ResponseDelivery, SentPacket};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn any_port() -> Endpoint {
    "0.0.0.0:0".parse().unwrap()
}

fn peer() -> Endpoint {
    "192.168.1.2:5353".parse().unwrap()
}

#[tokio::test]
async fn test_simulated_receive_into_larger_buffer() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let (callback, completion) = recv_completion();
    // Poison the buffer to prove untouched bytes stay untouched.
    assert!(socket.recv_from(vec![0xEE; 10], callback).unwrap().is_pending());

    assert!(transport.simulate_receive(&[1, 2, 3, 4, 5], peer()));

    let outcome = completion.await.unwrap().unwrap();
    assert_eq!(outcome.len, 5);
    assert_eq!(&outcome.buffer[..5], &[1, 2, 3, 4, 5]);
    assert_eq!(&outcome.buffer[5..], &[0xEE; 5]);
    assert_eq!(outcome.source, peer());
}

#[tokio::test]
async fn test_simulated_receive_truncates_to_buffer() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let (callback, completion) = recv_completion();
    socket.recv_from(vec![0u8; 3], callback).unwrap();

    assert!(transport.simulate_receive(&[1, 2, 3, 4, 5], peer()));

    let outcome = completion.await.unwrap().unwrap();
    assert_eq!(outcome.len, 3);
    assert_eq!(outcome.buffer, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_immediate_delivery_completes_synchronously() {
    let transport = MockTransport::new();
    transport.set_response_packet(vec![9, 8, 7, 6, 5], peer());
    transport.set_delivery(ResponseDelivery::Immediate);

    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let (callback, _completion) = recv_completion();
    match socket.recv_from(vec![0u8; 10], callback).unwrap() {
        Completion::Ready(outcome) => {
            assert_eq!(outcome.len, 5);
            assert_eq!(&outcome.buffer[..5], &[9, 8, 7, 6, 5]);
            assert_eq!(outcome.source, peer());
        }
        Completion::Pending => panic!("immediate delivery should not defer"),
    }
}

#[tokio::test]
async fn test_deferred_delivery_fires_on_later_turn() {
    let transport = MockTransport::new();
    transport.set_response_packet(b"reply".to_vec(), peer());
    transport.set_delivery(ResponseDelivery::Deferred);

    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let (callback, completion) = recv_completion();
    assert!(socket.recv_from(vec![0u8; 32], callback).unwrap().is_pending());

    let outcome = tokio::time::timeout(Duration::from_secs(5), completion)
        .await
        .expect("deferred delivery timed out")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.len, 5);
    assert_eq!(&outcome.buffer[..5], b"reply");
}

#[tokio::test]
async fn test_send_is_recorded_not_transmitted() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let payload = vec![0xDE, 0xAD, 0xBE, 0xEF];
    let (callback, _rx) = send_completion();
    match socket.send_to(&payload, peer(), callback).unwrap() {
        Completion::Ready(sent) => assert_eq!(sent, payload.len()),
        Completion::Pending => panic!("mock send should complete synchronously"),
    }

    assert_eq!(
        transport.sent_packets(),
        vec![SentPacket {
            payload,
            destination: peer(),
        }]
    );

    transport.clear_sent_packets();
    assert!(transport.sent_packets().is_empty());
}

#[tokio::test]
async fn test_second_receive_fails_without_disturbing_first() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let (first_cb, first_rx) = recv_completion();
    socket.recv_from(vec![0u8; 16], first_cb).unwrap();

    let (second_cb, _second_rx) = recv_completion();
    assert!(matches!(
        socket.recv_from(vec![0u8; 16], second_cb),
        Err(SocketError::OperationInProgress)
    ));

    // The first receive is untouched and still completes.
    assert!(transport.simulate_receive(&[42], peer()));
    let outcome = first_rx.await.unwrap().unwrap();
    assert_eq!(outcome.len, 1);
    assert_eq!(outcome.buffer[0], 42);
}

#[tokio::test]
async fn test_dropped_socket_never_invokes_pending_callback() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invocations);
    socket
        .recv_from(
            vec![0u8; 16],
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    drop(socket);

    assert!(!transport.simulate_receive(&[1, 2, 3], peer()));
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delivery_targets_most_recent_pending_receive() {
    let transport = MockTransport::new();
    let mut older = transport.create_socket();
    let mut newer = transport.create_socket();
    older.listen(any_port()).unwrap();
    newer.listen(any_port()).unwrap();

    let (older_cb, older_rx) = recv_completion();
    older.recv_from(vec![0u8; 8], older_cb).unwrap();
    let (newer_cb, newer_rx) = recv_completion();
    newer.recv_from(vec![0u8; 8], newer_cb).unwrap();

    // First injection goes to the most recently registered receive.
    assert!(transport.simulate_receive(&[2], peer()));
    let outcome = newer_rx.await.unwrap().unwrap();
    assert_eq!(outcome.buffer[0], 2);

    // With that one fulfilled, the older receive is next in line.
    assert!(transport.simulate_receive(&[1], peer()));
    let outcome = older_rx.await.unwrap().unwrap();
    assert_eq!(outcome.buffer[0], 1);
}

#[tokio::test]
async fn test_bind_and_ephemeral_ports() {
    let transport = MockTransport::new();
    let mut first = transport.create_socket();
    let mut second = transport.create_socket();

    first.listen(any_port()).unwrap();
    second.listen(any_port()).unwrap();

    let a = first.local_endpoint().unwrap();
    let b = second.local_endpoint().unwrap();
    assert_ne!(a.port(), 0);
    assert_ne!(a.port(), b.port());

    assert!(matches!(first.listen(any_port()), Err(BindError::AlreadyBound)));

    // A fixed port is kept as requested.
    let mut fixed = transport.create_socket();
    fixed.listen("0.0.0.0:5353".parse().unwrap()).unwrap();
    assert_eq!(fixed.local_endpoint().unwrap().port(), 5353);
}

#[tokio::test]
async fn test_operations_require_bind() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();

    let (send_cb, _rx) = send_completion();
    assert!(matches!(
        socket.send_to(&[1], peer(), send_cb),
        Err(SocketError::NotBound)
    ));

    let (recv_cb, _rx) = recv_completion();
    assert!(matches!(
        socket.recv_from(vec![0u8; 8], recv_cb),
        Err(SocketError::NotBound)
    ));
}

#[tokio::test]
async fn test_multicast_membership_invariants() {
    let transport = MockTransport::new();
    let mut socket = transport.create_socket();
    socket.listen(any_port()).unwrap();

    let group: std::net::IpAddr = "224.0.0.251".parse().unwrap();
    let unicast: std::net::IpAddr = "10.0.0.1".parse().unwrap();

    assert!(matches!(
        socket.join_group(unicast),
        Err(MulticastError::InvalidGroupAddress(_))
    ));
    assert!(matches!(
        socket.leave_group(group),
        Err(MulticastError::NotAMember(_))
    ));

    socket.join_group(group).unwrap();
    // Idempotent re-join.
    socket.join_group(group).unwrap();

    socket.leave_group(group).unwrap();
    assert!(matches!(
        socket.leave_group(group),
        Err(MulticastError::NotAMember(_))
    ));
}
