use podium_client::{ConnectionStatus, DiagnosticEvent, SessionError, SessionState};
use podium_core::{ClientRequest, Direction, Role};

use crate::integration::init_tracing;
use crate::utils::{MockRoom, joined_session, join_params};

#[tokio::test]
async fn test_join_reaches_active() {
    init_tracing();

    let session = joined_session(MockRoom::new(), Role::Guest)
        .await
        .expect("join failed");
    let view = session.handle.view();

    assert_eq!(view.session.state, SessionState::Active);
    assert_eq!(view.connection(), ConnectionStatus::Connected);
    assert_eq!(view.session.local_participant_id.as_ref().map(|id| id.as_str()), Some("me"));

    let names: Vec<&str> = view.participants().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Me"]);
    assert!(!view.is_streaming());

    // Join, then one transport per direction.
    let requests = session.room.requests();
    assert!(matches!(
        &requests[0],
        ClientRequest::JoinRoom { room_id, role: Role::Guest, .. } if room_id.as_str() == "stage"
    ));
    assert_eq!(
        requests[1..]
            .iter()
            .filter_map(|r| match r {
                ClientRequest::CreateTransport { direction } => Some(*direction),
                _ => None,
            })
            .collect::<Vec<_>>(),
        vec![Direction::Send, Direction::Recv]
    );
    assert_eq!(session.backend.loads(), 1);
    assert_eq!(session.backend.open_transports(), 2);

    let states: Vec<SessionState> = session
        .diagnostics
        .events()
        .into_iter()
        .filter_map(|e| match e {
            DiagnosticEvent::SessionState { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![SessionState::Connecting, SessionState::Joining, SessionState::Active]
    );

    // Joining again while active is rejected without side effects.
    let err = session.handle.join(join_params(Role::Guest)).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { action: "join", .. }));
    assert_eq!(session.room.connects(), 1);
}
