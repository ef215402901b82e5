pub use podium_core::model::{ParticipantId, RoomId};

pub mod model {
    pub use podium_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use podium_client::*;
}
