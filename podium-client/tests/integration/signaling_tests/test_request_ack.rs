use std::time::Duration;

use podium_client::{ChannelEvent, SignalChannel, SignalError};
use podium_core::{
    ClientRequest, CreateTransportResponse, Direction, ParticipantId, RoomId, ServerPush,
};
use serde_json::Value;

use crate::integration::init_tracing;
use crate::utils::{MockRoom, Reply};

const TIMEOUT: Duration = Duration::from_millis(200);

#[tokio::test]
async fn test_ack_resolves_with_payload() {
    init_tracing();

    let room = MockRoom::new();
    let (channel, _events) = SignalChannel::connect(room.connector().as_ref(), TIMEOUT)
        .await
        .expect("connect failed");

    let options: CreateTransportResponse = channel
        .request_ack(ClientRequest::CreateTransport {
            direction: Direction::Recv,
        })
        .await
        .expect("request failed");
    assert_eq!(options.id.as_str(), "recv-transport");
    assert_eq!(options.ice_candidates.len(), 1);

    channel.disconnect().await;
    assert!(!channel.is_connected());
}

#[tokio::test]
async fn test_server_error_surfaces() {
    init_tracing();

    let room = MockRoom::new();
    room.reply("create-transport", Reply::Error("no router".to_owned()));
    let (channel, _events) = SignalChannel::connect(room.connector().as_ref(), TIMEOUT)
        .await
        .unwrap();

    let err = channel
        .request_ack::<Value>(ClientRequest::CreateTransport {
            direction: Direction::Send,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SignalError::Server { event: "create-transport", ref message } if message == "no router"
    ));
    assert!(channel.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_request_times_out() {
    init_tracing();

    let room = MockRoom::new();
    room.reply("start-hls", Reply::Silent);
    let (channel, _events) = SignalChannel::connect(room.connector().as_ref(), TIMEOUT)
        .await
        .unwrap();

    let err = channel
        .request_ack::<Value>(ClientRequest::StartHls {
            room_id: RoomId::from("stage"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SignalError::Timeout { event: "start-hls", after } if after == TIMEOUT));

    // The channel stays usable.
    let value: Value = channel
        .request_ack(ClientRequest::StopHls {
            room_id: RoomId::from("stage"),
        })
        .await
        .expect("follow-up request failed");
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_pending_requests_rejected_on_disconnect() {
    init_tracing();

    let room = MockRoom::new();
    room.reply("start-hls", Reply::Silent);
    let (channel, mut events) =
        SignalChannel::connect(room.connector().as_ref(), Duration::from_secs(5))
            .await
            .unwrap();

    let pending = {
        let channel = channel.clone();
        tokio::spawn(async move {
            channel
                .request_ack::<Value>(ClientRequest::StartHls {
                    room_id: RoomId::from("stage"),
                })
                .await
        })
    };
    assert!(room.wait_for_requests("start-hls", 1, 1000).await);

    room.drop_connection();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, SignalError::ChannelClosed));
    assert!(matches!(
        events.recv().await,
        Some(ChannelEvent::Disconnected { .. })
    ));

    // Nothing can be sent afterwards.
    let err = channel
        .emit(ClientRequest::StopHls {
            room_id: RoomId::from("stage"),
        })
        .unwrap_err();
    assert!(matches!(err, SignalError::ChannelClosed));
}

#[tokio::test]
async fn test_pushes_delivered_in_order() {
    init_tracing();

    let room = MockRoom::new();
    let (_channel, mut events) = SignalChannel::connect(room.connector().as_ref(), TIMEOUT)
        .await
        .unwrap();

    for id in ["a", "b", "c"] {
        room.push(ServerPush::ParticipantLeft {
            participant_id: ParticipantId::from(id),
        });
    }

    let mut seen = Vec::new();
    while seen.len() < 3 {
        match events.recv().await {
            Some(ChannelEvent::Push(ServerPush::ParticipantLeft { participant_id })) => {
                seen.push(participant_id.to_string())
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(seen, vec!["a", "b", "c"]);
}
