//! Client policy and accounting scenarios over scripted receivers.

use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::StreamExt;
use hts_client::{
    Client, ClientConfig, ClientError, ConfigError, ErrorPolicy, HandFilter, HookError,
    LogEventKind, StreamEvent, StreamLogEvent, StreamOutput,
};
use hts_harness::{ScriptedReceiver, Step, landmarks_line, sample_landmarks, sample_pose, wrist_line};
use hts_proto::{HandSide, PacketKind};
use proptest::prelude::*;

fn wrist(side: HandSide) -> Step {
    Step::Line(wrist_line(side, &sample_pose()))
}

fn landmarks(side: HandSide) -> Step {
    Step::Line(landmarks_line(side, &sample_landmarks()))
}

fn client(config: ClientConfig, steps: Vec<Step>) -> Client<ScriptedReceiver> {
    Client::with_receiver(config, ScriptedReceiver::new(steps)).unwrap()
}

fn tolerant() -> ClientConfig {
    ClientConfig { error_policy: ErrorPolicy::Tolerant, ..ClientConfig::default() }
}

fn expect_frame(event: Option<StreamEvent>) -> hts_proto::HandFrame {
    match event {
        Some(StreamEvent::Frame(frame)) => frame,
        other => panic!("expected frame, got {other:?}"),
    }
}

#[tokio::test]
async fn strict_decode_error_is_terminal() {
    let mut client = client(
        ClientConfig::default(),
        vec![wrist(HandSide::Right), Step::from("garbage"), landmarks(HandSide::Right)],
    );

    let err = client.next_event().await.unwrap_err();
    let ClientError::Decode { line, .. } = &err else {
        panic!("expected decode error, got {err:?}");
    };
    assert_eq!(line, "garbage");
    assert!(err.is_terminal());

    let stats = client.stats();
    assert_eq!(stats.lines_received, 2);
    assert_eq!(stats.parse_errors, 1);
    assert_eq!(stats.dropped_lines, 0);
    assert_eq!(stats.frames_emitted, 0);

    // Terminal: the remaining landmarks line is never read
    assert!(client.next_event().await.unwrap().is_none());
    assert_eq!(client.receiver().remaining(), 1);
}

#[tokio::test]
async fn tolerant_policy_drops_bad_lines() {
    let mut client = client(
        tolerant(),
        vec![wrist(HandSide::Right), Step::from("Right wrist:, 1, 2"), landmarks(HandSide::Right)],
    );

    let frame = expect_frame(client.next_event().await.unwrap());
    assert_eq!(frame.sequence_id, 0);

    let stats = client.stats();
    assert_eq!(stats.lines_received, 3);
    assert_eq!(stats.parse_errors, 1);
    assert_eq!(stats.dropped_lines, 1);
    assert_eq!(stats.frames_emitted, 1);

    assert!(client.next_event().await.unwrap().is_none());
}

#[tokio::test]
async fn hand_filter_drops_before_assembly() {
    let config = ClientConfig { hand_filter: HandFilter::Left, ..ClientConfig::default() };
    let mut client = client(
        config,
        vec![
            wrist(HandSide::Right),
            wrist(HandSide::Left),
            landmarks(HandSide::Right),
            landmarks(HandSide::Left),
        ],
    );

    let frame = expect_frame(client.next_event().await.unwrap());
    assert_eq!(frame.side, HandSide::Left);
    assert_eq!(client.stats().packets_filtered, 2);
    assert_eq!(client.assembler().next_sequence_id(HandSide::Right), 0);
    assert!(client.assembler().latest_wrist(HandSide::Right).is_none());
}

#[tokio::test]
async fn both_output_yields_frame_after_its_packet() {
    let config = ClientConfig { output: StreamOutput::Both, ..ClientConfig::default() };
    let mut client = client(config, vec![wrist(HandSide::Right), landmarks(HandSide::Right)]);

    let first = client.next_event().await.unwrap().unwrap();
    assert_eq!(first.as_packet().map(hts_proto::Packet::kind), Some(PacketKind::Wrist));

    let second = client.next_event().await.unwrap().unwrap();
    assert_eq!(second.as_packet().map(hts_proto::Packet::kind), Some(PacketKind::Landmarks));

    let frame = expect_frame(client.next_event().await.unwrap());
    assert_eq!(frame.sequence_id, 0);
    assert!(client.next_event().await.unwrap().is_none());

    let stats = client.stats();
    assert_eq!(stats.packets_emitted, 2);
    assert_eq!(stats.frames_emitted, 1);
}

#[tokio::test]
async fn packets_output_still_advances_the_assembler() {
    let config = ClientConfig { output: StreamOutput::Packets, ..ClientConfig::default() };
    let mut client = client(config, vec![wrist(HandSide::Left), landmarks(HandSide::Left)]);

    let mut events = Vec::new();
    while let Some(event) = client.next_event().await.unwrap() {
        events.push(event);
    }

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.as_packet().is_some()));
    assert_eq!(client.stats().frames_emitted, 0);
    assert_eq!(client.assembler().next_sequence_id(HandSide::Left), 1);
}

#[tokio::test]
async fn timeouts_and_disconnects_are_recoverable() {
    let mut client = client(
        ClientConfig::default(),
        vec![
            Step::Timeout,
            wrist(HandSide::Right),
            Step::Disconnect("peer closed connection".into()),
            landmarks(HandSide::Right),
        ],
    );

    let err = client.next_event().await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_secs(1)));
    assert!(matches!(client.next_event().await, Err(ClientError::Disconnected { .. })));

    let frame = expect_frame(client.next_event().await.unwrap());
    assert_eq!(frame.recv_ts_ns, frame.landmarks_recv_ts_ns);
}

#[tokio::test]
async fn io_fault_is_terminal() {
    let mut client = client(
        ClientConfig::default(),
        vec![Step::Io(io::ErrorKind::ConnectionReset), wrist(HandSide::Right)],
    );

    let err = client.next_event().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.is_terminal());
    assert!(client.next_event().await.unwrap().is_none());
}

#[tokio::test]
async fn hook_failures_are_counted_and_swallowed() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    let hook = move |event: &StreamLogEvent| -> Result<(), HookError> {
        recorded.lock().unwrap().push(event.kind);
        match event.kind {
            LogEventKind::ParseError => panic!("hook exploded"),
            LogEventKind::EmittedFrame => Err("sink unavailable".into()),
            _ => Ok(()),
        }
    };
    let config = tolerant().with_log_hook(hook);
    let mut client = client(
        config,
        vec![Step::from("garbage"), wrist(HandSide::Left), landmarks(HandSide::Left)],
    );

    expect_frame(client.next_event().await.unwrap());

    let stats = client.stats();
    assert_eq!(stats.callbacks_invoked, 5);
    assert_eq!(stats.callback_errors, 2);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            LogEventKind::ReceivedLine,
            LogEventKind::ParseError,
            LogEventKind::ReceivedLine,
            LogEventKind::ReceivedLine,
            LogEventKind::EmittedFrame,
        ]
    );

    assert!(client.next_event().await.unwrap().is_none());
    assert_eq!(seen.lock().unwrap().last(), Some(&LogEventKind::Closed));
}

#[tokio::test]
async fn filtered_packets_are_reported_to_the_hook() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    let config = ClientConfig {
        hand_filter: HandFilter::Right,
        ..ClientConfig::default().with_log_hook(move |event: &StreamLogEvent| -> Result<(), HookError> {
            recorded.lock().unwrap().push(event.clone());
            Ok(())
        })
    };
    let mut client = client(config, vec![wrist(HandSide::Left)]);

    assert!(client.next_event().await.unwrap().is_none());
    let seen = seen.lock().unwrap();
    let filtered = seen.iter().find(|event| event.kind == LogEventKind::FilteredPacket).unwrap();
    assert_eq!(filtered.side, Some(HandSide::Left));
}

#[tokio::test]
async fn wall_time_can_be_omitted() {
    let config = ClientConfig { include_wall_time: false, ..ClientConfig::default() };
    let mut client = client(config, vec![wrist(HandSide::Right), landmarks(HandSide::Right)]);
    let frame = expect_frame(client.next_event().await.unwrap());
    assert_eq!(frame.recv_time_unix_ns, None);
    assert_eq!(frame.source_ts_ns, None);

    let mut client =
        self::client(ClientConfig::default(), vec![wrist(HandSide::Right), landmarks(HandSide::Right)]);
    let frame = expect_frame(client.next_event().await.unwrap());
    assert!(frame.recv_time_unix_ns.is_some());
}

#[tokio::test]
async fn frame_ids_come_from_config() {
    let config = ClientConfig::default().with_frame_id(HandSide::Left, "left_palm");
    let mut client = client(
        config,
        vec![wrist(HandSide::Left), landmarks(HandSide::Left), wrist(HandSide::Right), landmarks(HandSide::Right)],
    );

    assert_eq!(expect_frame(client.next_event().await.unwrap()).frame_id, "left_palm");
    assert_eq!(expect_frame(client.next_event().await.unwrap()).frame_id, "hts_right_hand");
}

#[tokio::test]
async fn run_processes_until_end_of_stream() {
    let mut client = client(
        ClientConfig::default(),
        vec![wrist(HandSide::Right), Step::Timeout, landmarks(HandSide::Right), wrist(HandSide::Right)],
    );

    let mut sequence_ids = Vec::new();
    let processed = client
        .run(
            |event| {
                sequence_ids.push(event.as_frame().map(|frame| frame.sequence_id));
                Ok(())
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(processed, 2);
    assert_eq!(sequence_ids, vec![Some(0), Some(1)]);
    assert_eq!(client.stats().callbacks_invoked, 2);
}

#[tokio::test]
async fn run_stops_at_max_events() {
    let mut client = client(
        ClientConfig::default(),
        vec![wrist(HandSide::Right), landmarks(HandSide::Right), wrist(HandSide::Right)],
    );

    let processed = client.run(|_| Ok(()), Some(1)).await.unwrap();
    assert_eq!(processed, 1);
    assert_eq!(client.receiver().remaining(), 1);
}

#[tokio::test]
async fn run_surfaces_callback_failure() {
    let mut client =
        client(ClientConfig::default(), vec![wrist(HandSide::Right), landmarks(HandSide::Right)]);

    let err = client.run(|_| Err("downstream full".into()), None).await.unwrap_err();
    assert!(matches!(err, ClientError::Callback(_)));
    assert_eq!(err.to_string(), "event callback failed: downstream full");

    let stats = client.stats();
    assert_eq!(stats.callback_errors, 1);
    assert_eq!(stats.callbacks_invoked, 0);
}

#[tokio::test]
async fn run_counts_only_successful_callbacks() {
    let mut client = client(
        ClientConfig::default(),
        vec![
            wrist(HandSide::Right),
            landmarks(HandSide::Right),
            wrist(HandSide::Right),
            landmarks(HandSide::Right),
        ],
    );

    let mut calls = 0;
    let err = client
        .run(
            |_| {
                calls += 1;
                if calls == 2 { Err("second frame rejected".into()) } else { Ok(()) }
            },
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Callback(_)));
    let stats = client.stats();
    assert_eq!(stats.frames_emitted, 2);
    assert_eq!(stats.callbacks_invoked, 1);
    assert_eq!(stats.callback_errors, 1);
}

#[tokio::test]
async fn stream_ends_after_terminal_error() {
    let client = client(
        ClientConfig::default(),
        vec![
            Step::Timeout,
            wrist(HandSide::Left),
            landmarks(HandSide::Left),
            Step::from("Left elbow:, 1"),
            wrist(HandSide::Left),
        ],
    );

    let items: Vec<_> = client.into_stream().collect().await;
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], Err(ClientError::Timeout(_))));
    assert!(matches!(items[1], Ok(StreamEvent::Frame(_))));
    assert!(matches!(items[2], Err(ClientError::Decode { .. })));
}

#[tokio::test]
async fn close_handle_ends_a_blocked_pull() {
    let mut client = client(ClientConfig::default(), vec![Step::Block]);
    let handle = client.close_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.close();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), client.next_event()).await.unwrap();
    assert!(result.unwrap().is_none());
}

#[tokio::test]
async fn reset_stats_zeroes_counters() {
    let mut client = client(tolerant(), vec![Step::from("x"), wrist(HandSide::Left)]);
    assert!(client.next_event().await.unwrap().is_none());
    assert_eq!(client.stats().lines_received, 2);

    client.reset_stats();
    assert_eq!(client.stats(), hts_client::ClientStats::default());
}

#[test]
fn invalid_config_is_rejected_before_use() {
    let config = ClientConfig { max_datagram_size: 0, ..ClientConfig::default() };
    let result = Client::with_receiver(config, ScriptedReceiver::new(Vec::<Step>::new()));
    assert!(matches!(
        result,
        Err(ClientError::Config(ConfigError::ZeroLimit { field: "max_datagram_size" }))
    ));
}

fn scripted_line() -> impl Strategy<Value = Step> {
    let side = prop_oneof![Just(HandSide::Left), Just(HandSide::Right)];
    prop_oneof![
        side.clone().prop_map(wrist),
        side.prop_map(landmarks),
        Just(Step::from("Left wrist:, 1, 2")),
        Just(Step::from("")),
        "[a-z ]{0,12}".prop_map(Step::Line),
    ]
}

proptest! {
    #[test]
    fn every_line_is_accounted_once(
        steps in prop::collection::vec(scripted_line(), 0..60),
        filter in prop_oneof![Just(HandFilter::Left), Just(HandFilter::Right), Just(HandFilter::Both)],
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let line_count = steps.len() as u64;
        let config = ClientConfig { hand_filter: filter, ..tolerant() };
        let mut client = client(config, steps);

        let frames = runtime.block_on(async {
            let mut frames = 0u64;
            while let Some(event) = client.next_event().await.unwrap() {
                prop_assert!(event.as_frame().is_some());
                frames += 1;
            }
            Ok(frames)
        })?;

        let stats = client.stats();
        prop_assert_eq!(stats.lines_received, line_count);
        prop_assert_eq!(stats.parse_errors, stats.dropped_lines);
        prop_assert_eq!(stats.frames_emitted, frames);
        prop_assert!(stats.packets_accepted() >= stats.frames_emitted);
        prop_assert_eq!(
            stats.lines_received,
            stats.packets_filtered + stats.packets_accepted() + stats.parse_errors
        );
    }
}
