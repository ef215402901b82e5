use podium_client::SessionState;
use podium_core::{Direction, Role};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

use crate::integration::init_tracing;
use crate::utils::{MockRoom, joined_session};

#[tokio::test]
async fn test_transport_state_diagnostics() {
    init_tracing();

    let session = joined_session(MockRoom::new(), Role::Guest)
        .await
        .expect("join failed");

    session
        .backend
        .emit_state(Direction::Recv, RTCPeerConnectionState::Connecting);
    session
        .backend
        .emit_state(Direction::Recv, RTCPeerConnectionState::Failed);

    assert_eq!(
        session.diagnostics.transport_states(Direction::Recv),
        vec![
            RTCPeerConnectionState::Connecting,
            RTCPeerConnectionState::Failed
        ]
    );
    assert!(session.diagnostics.transport_states(Direction::Send).is_empty());

    // Observational only: a failed transport does not end the session.
    session.handle.set_hls(true).await.expect("session stopped working");
    assert_eq!(session.handle.view().session.state, SessionState::Active);
}
