use podium_client::{DiagnosticEvent, SessionError, SessionState};
use podium_core::Role;

use crate::integration::init_tracing;
use crate::utils::{MockRoom, joined_session, wait_for_state};

#[tokio::test]
async fn test_disconnect_faults() {
    init_tracing();

    let room = MockRoom::new().with_existing_producers(&[("alice-audio", "alice")]);
    let session = joined_session(room, Role::Guest).await.expect("join failed");

    session.room.drop_connection();

    let view = wait_for_state(&session.handle, SessionState::Faulted)
        .await
        .expect("session never faulted");
    assert!(view.registry.is_empty());
    assert!(!view.is_connected());
    assert!(
        view.session
            .last_error
            .as_deref()
            .unwrap_or_default()
            .contains("closed by server")
    );
    assert!(session.backend.is_idle());
    assert!(session.diagnostics.events().iter().any(|e| matches!(
        e,
        DiagnosticEvent::ChannelDisconnected { reason } if reason == "closed by server"
    )));

    // Actions are refused until the session is cleaned up.
    assert!(session.handle.publish().await.is_err());

    session.handle.leave().await.expect("leave failed");
    assert_eq!(session.handle.view().session.state, SessionState::Idle);
}

#[tokio::test]
async fn test_disconnect_while_joining_fails_join() {
    init_tracing();

    let room = MockRoom::new().without_room_joined();
    let session = crate::utils::spawn_test_session(room.clone(), Default::default());

    let handle = session.handle.clone();
    let join = tokio::spawn(async move {
        handle
            .join(crate::utils::join_params(Role::Guest))
            .await
    });

    assert!(room.wait_for_requests("join-room", 1, 1000).await);
    room.drop_connection();

    let result = join.await.expect("join task panicked");
    let err = result.expect_err("join should fail");
    assert!(matches!(err, SessionError::Disconnected(_)));
    assert_eq!(session.handle.view().session.state, SessionState::Faulted);
}
