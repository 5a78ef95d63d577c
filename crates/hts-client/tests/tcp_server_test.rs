//! TCP server receiver tests over loopback sockets.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use hts_client::{Client, ClientConfig, ClientError, StreamEvent, TcpServerLineReceiver};
use hts_core::{LineReceiver, TransportError};
use hts_harness::{ManualClock, landmarks_line, sample_landmarks, sample_pose, wrist_line};
use hts_proto::HandSide;
use tokio::{io::AsyncWriteExt, net::TcpStream};

const WAIT: Option<Duration> = Some(Duration::from_secs(2));

async fn server(config: ClientConfig) -> (TcpServerLineReceiver, SocketAddr) {
    let rx = TcpServerLineReceiver::bind(&config).await.unwrap();
    let addr = rx.local_addr().unwrap();
    (rx, addr)
}

async fn default_server() -> (TcpServerLineReceiver, SocketAddr) {
    server(ClientConfig::tcp_server("127.0.0.1", 0)).await
}

#[tokio::test]
async fn lines_split_across_writes_are_reassembled() {
    let (mut rx, addr) = default_server().await;
    let mut peer = TcpStream::connect(addr).await.unwrap();

    peer.write_all(b"Right wr").await.unwrap();
    peer.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    peer.write_all(b"ist:, 1\r\nsecond\nthi").await.unwrap();

    let first = rx.receive_line(WAIT).await.unwrap();
    assert_eq!(first.line, "Right wrist:, 1");
    assert_eq!(first.meta.peer, Some(peer.local_addr().unwrap()));
    assert_eq!(rx.receive_line(WAIT).await.unwrap().line, "second");

    peer.write_all(b"rd\n").await.unwrap();
    assert_eq!(rx.receive_line(WAIT).await.unwrap().line, "third");
}

#[tokio::test]
async fn lines_from_one_read_keep_the_read_timestamp() {
    let clock = ManualClock::new();
    let (rx, addr) = default_server().await;
    let mut rx = rx.with_clock(Arc::new(clock.clone()));
    let mut peer = TcpStream::connect(addr).await.unwrap();

    peer.write_all(b"a\nb\n").await.unwrap();
    peer.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let first = rx.receive_line(WAIT).await.unwrap();
    clock.advance(Duration::from_millis(200));
    let second = rx.receive_line(WAIT).await.unwrap();

    assert_eq!((first.line.as_str(), second.line.as_str()), ("a", "b"));
    assert_eq!(second.meta.recv_ts_ns, first.meta.recv_ts_ns + 1);
    assert_eq!(second.meta.recv_time_unix_ns, first.meta.recv_time_unix_ns);

    peer.write_all(b"c\n").await.unwrap();
    let third = rx.receive_line(WAIT).await.unwrap();
    assert!(third.meta.recv_ts_ns >= first.meta.recv_ts_ns + 200_000_000);
}

#[tokio::test]
async fn timeout_keeps_the_partial_line() {
    let (mut rx, addr) = default_server().await;
    let mut peer = TcpStream::connect(addr).await.unwrap();

    peer.write_all(b"hal").await.unwrap();
    let err = rx.receive_line(Some(Duration::from_millis(50))).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout(_)));

    peer.write_all(b"f\n").await.unwrap();
    assert_eq!(rx.receive_line(WAIT).await.unwrap().line, "half");
}

#[tokio::test]
async fn disconnect_discards_partial_line_and_reaccepts() {
    let (mut rx, addr) = default_server().await;

    let mut first = TcpStream::connect(addr).await.unwrap();
    first.write_all(b"complete\npartial").await.unwrap();
    drop(first);

    assert_eq!(rx.receive_line(WAIT).await.unwrap().line, "complete");
    let err = rx.receive_line(WAIT).await.unwrap_err();
    assert!(matches!(err, TransportError::Disconnected { .. }));
    assert!(rx.peer_addr().is_none());

    let mut second = TcpStream::connect(addr).await.unwrap();
    second.write_all(b"next\n").await.unwrap();
    assert_eq!(rx.receive_line(WAIT).await.unwrap().line, "next");
}

#[tokio::test]
async fn oversized_line_drops_the_connection() {
    let config = ClientConfig { max_line_bytes: 16, ..ClientConfig::tcp_server("127.0.0.1", 0) };
    let (mut rx, addr) = server(config).await;

    let mut peer = TcpStream::connect(addr).await.unwrap();
    peer.write_all(&[b'x'; 32]).await.unwrap();

    let err = rx.receive_line(WAIT).await.unwrap_err();
    let TransportError::Disconnected { reason } = err else {
        panic!("expected disconnect, got {err:?}");
    };
    assert!(reason.contains("16 bytes"));
}

#[tokio::test]
async fn close_from_another_task_unblocks_accept() {
    let (mut rx, _addr) = default_server().await;
    let handle = rx.close_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.close();
    });

    let result = tokio::time::timeout(Duration::from_secs(2), rx.receive_line(None)).await.unwrap();
    assert!(matches!(result, Err(TransportError::Closed)));
    assert!(rx.local_addr().is_none());
}

#[tokio::test]
async fn sequence_ids_continue_across_reconnects() {
    let mut client = Client::connect(ClientConfig::tcp_server("127.0.0.1", 0)).await.unwrap();
    let addr = client.receiver().local_addr().unwrap();

    let mut first = TcpStream::connect(addr).await.unwrap();
    let lines = format!(
        "{}\n{}\n",
        wrist_line(HandSide::Right, &sample_pose()),
        landmarks_line(HandSide::Right, &sample_landmarks())
    );
    first.write_all(lines.as_bytes()).await.unwrap();
    drop(first);

    let Some(StreamEvent::Frame(frame)) = client.next_event().await.unwrap() else {
        panic!("expected first frame");
    };
    assert_eq!(frame.sequence_id, 0);
    assert!(matches!(client.next_event().await, Err(ClientError::Disconnected { .. })));

    // Assembler state survives the reconnect: one wrist line completes a frame
    let mut second = TcpStream::connect(addr).await.unwrap();
    let line = format!("{}\n", wrist_line(HandSide::Right, &sample_pose()));
    second.write_all(line.as_bytes()).await.unwrap();

    let Some(StreamEvent::Frame(frame)) = client.next_event().await.unwrap() else {
        panic!("expected second frame");
    };
    assert_eq!(frame.sequence_id, 1);
    assert_eq!(client.stats().frames_emitted, 2);
}
