use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a server-assigned string identifier.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Room identifier (room code) chosen when the room was registered.
    RoomId
);

string_id!(
    /// Participant identifier, stable for the lifetime of the room.
    ParticipantId
);

string_id!(
    /// Identifier of a published media leg.
    ProducerId
);

string_id!(
    /// Identifier of a subscription to a remote media leg.
    ConsumerId
);

string_id!(TransportId);
