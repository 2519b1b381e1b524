//! Integration tests for the packet stream transport.
//!
//! Each test wires two ends of an in-memory duplex pipe together, so the
//! bytes really go through tokio's read/write machinery but no sockets are
//! needed.

use std::time::Duration;

use rand::Rng;
use syncbox_protocol::{PACKET_DATA_SIZE, PACKET_TOTAL_SIZE, Packet, ProtocolError, serialize};
use syncbox_transport::{Connection, PacketConnection, TransportError};
use tokio::io::{AsyncWriteExt, DuplexStream, duplex};

fn pair() -> (PacketConnection<DuplexStream>, PacketConnection<DuplexStream>) {
    let (a, b) = duplex(64 * 1024);
    (PacketConnection::new(a), PacketConnection::new(b))
}

#[tokio::test]
async fn test_message_round_trip_keeps_padding() {
    let (client, server) = pair();
    let payload: Vec<u8> = (0..2500u32).map(|i| (i % 200) as u8 + 1).collect();

    client.send(&payload).await.expect("send should succeed");
    let received = server
        .recv()
        .await
        .expect("recv should succeed")
        .expect("message expected");

    assert_eq!(received.len(), 3 * PACKET_DATA_SIZE);
    assert_eq!(&received[..2500], payload.as_slice());
    assert!(received[2500..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn test_large_random_message_with_small_pipe() {
    // A pipe smaller than the message forces the writer to wait on the
    // reader, so both sides must run together.
    let (a, b) = duplex(PACKET_TOTAL_SIZE);
    let client = PacketConnection::new(a);
    let server = PacketConnection::new(b);

    let mut payload = vec![0u8; 100_000];
    rand::rng().fill(&mut payload[..]);

    let (sent, received) = tokio::join!(client.send(&payload), server.recv());
    sent.expect("send should succeed");
    let received = received.expect("recv should succeed").expect("message expected");

    assert_eq!(&received[..payload.len()], payload.as_slice());
}

#[tokio::test]
async fn test_messages_arrive_in_order() {
    let (client, server) = pair();

    for i in 1..=5u8 {
        client.send(&vec![i; 1500]).await.unwrap();
    }
    for i in 1..=5u8 {
        let message = server.recv().await.unwrap().unwrap();
        assert!(message[..1500].iter().all(|&b| b == i));
    }
}

#[tokio::test]
async fn test_both_directions() {
    let (client, server) = pair();

    client.send(b"ping").await.unwrap();
    let ping = server.recv().await.unwrap().unwrap();
    assert_eq!(&ping[..4], b"ping");

    server.send(b"pong").await.unwrap();
    let pong = client.recv().await.unwrap().unwrap();
    assert_eq!(&pong[..4], b"pong");
}

#[tokio::test]
async fn test_clean_close_yields_none() {
    let (client, server) = pair();

    client.send(b"last").await.unwrap();
    client.close().await.unwrap();

    assert!(server.recv().await.unwrap().is_some());
    assert!(server.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let (client, _server) = pair();
    let err = client.send(&[]).await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Framing(ProtocolError::EmptyPayload)
    ));
}

#[tokio::test]
async fn test_eof_mid_message_is_short_read() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b);

    let packets = serialize(&[7u8; 3000]).unwrap();
    raw.write_all(&packets[0].to_bytes()).await.unwrap();
    drop(raw);

    let err = server.recv().await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::ShortRead { expected, received }
            if expected == 3 * PACKET_TOTAL_SIZE && received == PACKET_TOTAL_SIZE
    ));
}

#[tokio::test]
async fn test_eof_mid_record_is_short_read() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b);

    let packets = serialize(b"hello").unwrap();
    raw.write_all(&packets[0].to_bytes()[..500]).await.unwrap();
    drop(raw);

    assert!(matches!(
        server.recv().await,
        Err(TransportError::ShortRead { received: 500, .. })
    ));
}

#[tokio::test]
async fn test_out_of_sequence_packets_are_rejected() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b);

    let packets = serialize(&[1u8; 2048]).unwrap();
    raw.write_all(&packets[1].to_bytes()).await.unwrap();
    raw.write_all(&packets[0].to_bytes()).await.unwrap();

    assert!(matches!(
        server.recv().await,
        Err(TransportError::Framing(ProtocolError::OutOfSequence { index: 0, .. }))
    ));
}

#[tokio::test]
async fn test_oversized_message_is_rejected() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b).with_max_packets(2);

    let header = Packet::new(3, 0, [0u8; PACKET_DATA_SIZE]).unwrap();
    raw.write_all(&header.to_bytes()).await.unwrap();

    assert!(matches!(
        server.recv().await,
        Err(TransportError::MessageTooLarge(3))
    ));
    assert!(matches!(
        server.recv().await,
        Err(TransportError::ConnectionClosed(_))
    ));
}

#[tokio::test]
async fn test_recv_resumes_after_timeout_mid_message() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b);

    let payload: Vec<u8> = (0..7000u32).map(|i| (i % 241) as u8).collect();
    let packets = serialize(&payload).unwrap();
    assert_eq!(packets.len(), 7);

    raw.write_all(&packets[0].to_bytes()).await.unwrap();
    raw.write_all(&packets[1].to_bytes()[..300]).await.unwrap();
    let waited = tokio::time::timeout(Duration::from_millis(50), server.recv()).await;
    assert!(waited.is_err(), "recv should still be waiting for packets");

    raw.write_all(&packets[1].to_bytes()[300..]).await.unwrap();
    for packet in &packets[2..] {
        raw.write_all(&packet.to_bytes()).await.unwrap();
    }
    raw.write_all(&serialize(b"next").unwrap()[0].to_bytes())
        .await
        .unwrap();

    let received = server.recv().await.unwrap().unwrap();
    assert_eq!(&received[..payload.len()], payload.as_slice());
    let next = server.recv().await.unwrap().unwrap();
    assert_eq!(&next[..4], b"next");
}

#[tokio::test]
async fn test_failed_connection_stays_failed() {
    let (mut raw, b) = duplex(64 * 1024);
    let server = PacketConnection::new(b);

    let packets = serialize(&[1u8; 2048]).unwrap();
    raw.write_all(&packets[1].to_bytes()).await.unwrap();
    raw.write_all(&packets[0].to_bytes()).await.unwrap();
    raw.write_all(&serialize(b"valid").unwrap()[0].to_bytes())
        .await
        .unwrap();

    assert!(matches!(
        server.recv().await,
        Err(TransportError::Framing(ProtocolError::OutOfSequence { .. }))
    ));
    assert!(matches!(
        server.recv().await,
        Err(TransportError::ConnectionClosed(_))
    ));
}

#[tokio::test]
async fn test_send_packets_and_recv_packets() {
    let (client, server) = pair();
    let packets = serialize(&[5u8; 4000]).unwrap();

    client.send_packets(&packets).await.unwrap();
    let received = server.recv_packets().await.unwrap().unwrap();
    assert_eq!(received, packets);
}
