use std::time::Duration;

use podium_core::Role;

use crate::integration::init_tracing;
use crate::utils::{MockRoom, joined_session};

#[tokio::test]
async fn test_handle_drop_tears_down() {
    init_tracing();

    let room = MockRoom::new().with_existing_producers(&[("alice-video", "alice")]);
    let session = joined_session(room, Role::Host).await.expect("join failed");
    session.handle.publish().await.expect("publish failed");

    let backend = session.backend.clone();
    let devices = session.devices.clone();
    drop(session);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !backend.is_idle() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(backend.is_idle(), "media objects outlived the session");
    assert!(devices.all_stopped());
}
