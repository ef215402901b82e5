use podium_core::RoomId;

/// Server-side HLS relay as last reported by the room service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HlsStatus {
    pub enabled: bool,
    pub url: Option<String>,
}

impl HlsStatus {
    /// Uses `reported` when the server sent a URL, otherwise derives one
    /// from `base` for an enabled relay.
    pub fn resolve(
        enabled: bool,
        reported: Option<String>,
        base: Option<&str>,
        room_id: &RoomId,
    ) -> Self {
        let url = match (enabled, reported, base) {
            (_, Some(url), _) => Some(url),
            (true, None, Some(base)) => Some(playlist_url(base, room_id)),
            _ => None,
        };
        Self { enabled, url }
    }
}

/// `<base>/<room>/index.m3u8`
pub fn playlist_url(base: &str, room_id: &RoomId) -> String {
    format!("{}/{}/index.m3u8", base.trim_end_matches('/'), room_id)
}
