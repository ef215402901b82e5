use podium_client::{DeviceError, NegotiationError, SessionConfig, SessionError, SessionState};
use podium_core::{MediaKind, Role};

use crate::integration::init_tracing;
use crate::utils::{
    MockBackend, MockRoom, RecordingDevices, join_params, spawn_test_session_with, test_config,
};

#[tokio::test]
async fn test_publish_rolls_back_on_produce_failure() {
    init_tracing();

    let session = spawn_test_session_with(
        MockRoom::new(),
        MockBackend::new().fail_produce(MediaKind::Video),
        RecordingDevices::new(),
        test_config(),
    );
    session.handle.join(join_params(Role::Host)).await.unwrap();

    let err = session.handle.publish().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Negotiation(NegotiationError::Backend(_))
    ));

    // The audio producer created before the failure is gone again.
    assert_eq!(session.backend.open_producers(), 0);
    assert_eq!(session.devices.acquired().len(), 2);
    assert!(session.devices.all_stopped());

    let view = session.handle.view();
    assert_eq!(view.session.state, SessionState::Active);
    assert!(!view.is_streaming());
    assert_eq!(view.registry.producers().count(), 0);
    assert!(view.session.last_error.is_some());

    let me = view.registry.local_participant().unwrap();
    assert!(!me.has_audio && !me.has_video);
}

#[tokio::test]
async fn test_device_failure_keeps_session_active() {
    init_tracing();

    let session = spawn_test_session_with(
        MockRoom::new(),
        MockBackend::new(),
        RecordingDevices::denied("permission dismissed"),
        test_config(),
    );
    session.handle.join(join_params(Role::Host)).await.unwrap();

    let err = session.handle.publish().await.unwrap_err();
    assert!(matches!(err, SessionError::Device(DeviceError::Denied(_))));
    assert!(!err.is_fatal());
    assert_eq!(session.room.count("produce"), 0);

    let view = session.handle.view();
    assert_eq!(view.session.state, SessionState::Active);
    assert!(view.session.last_error.as_deref().unwrap().contains("permission dismissed"));

    // The next successful action clears the error.
    session.handle.set_hls(true).await.unwrap();
    assert_eq!(session.handle.view().session.last_error, None);
}

#[tokio::test]
async fn test_missing_device_fails_publish() {
    init_tracing();

    let session = spawn_test_session_with(
        MockRoom::new(),
        MockBackend::new(),
        RecordingDevices::with_kinds(&[MediaKind::Audio]),
        test_config(),
    );
    session.handle.join(join_params(Role::Host)).await.unwrap();

    let err = session.handle.publish().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Device(DeviceError::Unavailable("video"))
    ));
    assert!(session.devices.acquired().is_empty());
}

#[tokio::test]
async fn test_publish_with_no_kinds_enabled() {
    init_tracing();

    let config = SessionConfig {
        publish_audio: false,
        publish_video: false,
        ..test_config()
    };
    let session =
        spawn_test_session_with(MockRoom::new(), MockBackend::new(), RecordingDevices::new(), config);
    session.handle.join(join_params(Role::Host)).await.unwrap();

    for _ in 0..2 {
        let err = session.handle.publish().await.unwrap_err();
        assert!(matches!(err, SessionError::NothingToPublish));
    }

    let view = session.handle.view();
    assert!(!view.is_streaming());
    assert_eq!(view.session.state, SessionState::Active);
    assert!(session.devices.acquired().is_empty());
    assert_eq!(session.room.count("produce"), 0);
}
