use podium_core::{ClientRequest, MediaKind, Role};

use crate::integration::init_tracing;
use crate::utils::{MockRoom, joined_session};

#[tokio::test]
async fn test_unpublish() {
    init_tracing();

    let session = joined_session(MockRoom::new(), Role::Host)
        .await
        .expect("join failed");
    session.handle.publish().await.expect("publish failed");
    session.handle.unpublish().await.expect("unpublish failed");

    let view = session.handle.view();
    assert!(!view.is_streaming());
    assert!(view.local_producer(MediaKind::Audio).is_none());
    assert!(view.local_producer(MediaKind::Video).is_none());
    let me = view.registry.local_participant().unwrap();
    assert!(!me.has_audio && !me.has_video);

    assert_eq!(session.backend.open_producers(), 0);
    assert!(session.devices.all_stopped());

    assert!(session.room.wait_for_requests("close-producer", 2, 1000).await);
    let mut closed: Vec<String> = session
        .room
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            ClientRequest::CloseProducer { producer_id } => Some(producer_id.to_string()),
            _ => None,
        })
        .collect();
    closed.sort();
    assert_eq!(closed, vec!["me-audio", "me-video"]);

    // Publishing again after unpublish is allowed.
    session.handle.publish().await.expect("second publish failed");
    assert_eq!(session.backend.open_producers(), 2);
}
