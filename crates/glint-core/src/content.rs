//! Server-produced content and takeover types.

use serde::{Deserialize, Serialize};

/// Payload of `/api/current_qr`: the current link plus the authoritative
/// takeover flags. Absent or malformed fields mean "no content yet".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentState {
    #[serde(default)]
    pub link: Option<String>,
    /// Pre-rendered image data URL; served for clients that cannot render
    /// locally. The engine ignores it.
    #[serde(default)]
    pub qr_image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub fallback_active: bool,
    #[serde(default)]
    pub fallback_file: Option<String>,
    #[serde(default)]
    pub fallback_url: Option<String>,
}

impl ContentState {
    /// The takeover the server is asking for, if any. A file reference wins
    /// over a URL reference when both are present.
    pub fn takeover_directive(&self) -> Option<TakeoverDirective> {
        if !self.fallback_active {
            return None;
        }
        if let Some(file) = self.fallback_file.as_deref().filter(|f| !f.is_empty()) {
            return Some(TakeoverDirective::File(file.to_string()));
        }
        if let Some(url) = self.fallback_url.as_deref().filter(|u| !u.is_empty()) {
            return Some(TakeoverDirective::Url(url.to_string()));
        }
        None
    }
}

/// What a takeover should do: navigate the top-level context away, or
/// cover the page with an embedded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TakeoverDirective {
    Url(String),
    File(String),
}

/// Payload of `/api/fallback_status`, also used for startup reconciliation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TakeoverStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl TakeoverStatus {
    pub fn takeover_directive(&self) -> Option<TakeoverDirective> {
        if !self.active {
            return None;
        }
        let wants_url = self.kind.as_deref() == Some("url");
        match (&self.file, &self.url) {
            (Some(f), _) if !wants_url && !f.is_empty() => {
                Some(TakeoverDirective::File(f.clone()))
            }
            (_, Some(u)) if !u.is_empty() => Some(TakeoverDirective::Url(u.clone())),
            (Some(f), _) if !f.is_empty() => Some(TakeoverDirective::File(f.clone())),
            _ => None,
        }
    }
}

/// Takeover fields carried by a push event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TakeoverPayload {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl TakeoverPayload {
    /// Directive selection mirrors the poll path: an explicit `url` kind or
    /// a URL without a file means navigation; otherwise the file overlay.
    pub fn takeover_directive(&self) -> Option<TakeoverDirective> {
        let url = self.url.as_deref().filter(|u| !u.is_empty());
        let file = self.file.as_deref().filter(|f| !f.is_empty());
        if self.kind.as_deref() == Some("url") || (file.is_none() && url.is_some()) {
            return url.map(|u| TakeoverDirective::Url(u.to_string()));
        }
        file.map(|f| TakeoverDirective::File(f.to_string()))
    }
}

/// One frame on the push channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PushFrame {
    pub event: String,
    #[serde(default)]
    pub data: TakeoverPayload,
}

/// Event name for a takeover-on push frame.
pub const PUSH_EVENT_TAKEOVER_ON: &str = "fallback_on";
/// Event name for a takeover-off push frame.
pub const PUSH_EVENT_TAKEOVER_OFF: &str = "fallback_off";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_state_defaults_when_fields_absent() {
        let state: ContentState = serde_json::from_str("{}").unwrap();
        assert!(state.link.is_none());
        assert!(!state.fallback_active);
        assert!(state.takeover_directive().is_none());
    }

    #[test]
    fn real_server_payload_parses() {
        let state: ContentState = serde_json::from_str(
            r#"{"link":"https://example.com/x","qr_image":"data:image/png;base64,AAAA",
                "timestamp":"2026-08-23T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(state.link.as_deref(), Some("https://example.com/x"));
        assert!(state.takeover_directive().is_none());
    }

    #[test]
    fn content_takeover_prefers_file() {
        let state: ContentState = serde_json::from_str(
            r#"{"fallback_active":true,"fallback_file":"promo.html",
                "fallback_url":"https://example.com/promo"}"#,
        )
        .unwrap();
        assert_eq!(
            state.takeover_directive(),
            Some(TakeoverDirective::File("promo.html".into()))
        );
    }

    #[test]
    fn content_takeover_url_when_no_file() {
        let state: ContentState = serde_json::from_str(
            r#"{"fallback_active":true,"fallback_url":"https://example.com/promo"}"#,
        )
        .unwrap();
        assert_eq!(
            state.takeover_directive(),
            Some(TakeoverDirective::Url("https://example.com/promo".into()))
        );
    }

    #[test]
    fn active_flag_without_target_is_no_directive() {
        let state: ContentState =
            serde_json::from_str(r#"{"fallback_active":true,"fallback_file":""}"#).unwrap();
        assert!(state.takeover_directive().is_none());
    }

    #[test]
    fn push_payload_url_kind_navigates() {
        let payload: TakeoverPayload =
            serde_json::from_str(r#"{"url":"https://example.com/y","type":"url"}"#).unwrap();
        assert_eq!(
            payload.takeover_directive(),
            Some(TakeoverDirective::Url("https://example.com/y".into()))
        );
    }

    #[test]
    fn push_payload_bare_url_navigates() {
        let payload: TakeoverPayload =
            serde_json::from_str(r#"{"url":"https://example.com/y"}"#).unwrap();
        assert_eq!(
            payload.takeover_directive(),
            Some(TakeoverDirective::Url("https://example.com/y".into()))
        );
    }

    #[test]
    fn push_payload_file_overlays() {
        let payload: TakeoverPayload =
            serde_json::from_str(r#"{"file":"promo.html","type":"file"}"#).unwrap();
        assert_eq!(
            payload.takeover_directive(),
            Some(TakeoverDirective::File("promo.html".into()))
        );
    }

    #[test]
    fn push_frame_parses_with_missing_data() {
        let frame: PushFrame = serde_json::from_str(r#"{"event":"fallback_off"}"#).unwrap();
        assert_eq!(frame.event, PUSH_EVENT_TAKEOVER_OFF);
        assert!(frame.data.takeover_directive().is_none());
    }

    #[test]
    fn status_directive_honors_kind() {
        let status: TakeoverStatus = serde_json::from_str(
            r#"{"active":true,"file":"promo.html","url":"https://example.com/p","type":"url"}"#,
        )
        .unwrap();
        assert_eq!(
            status.takeover_directive(),
            Some(TakeoverDirective::Url("https://example.com/p".into()))
        );
    }

    #[test]
    fn inactive_status_has_no_directive() {
        let status: TakeoverStatus =
            serde_json::from_str(r#"{"active":false,"file":"promo.html"}"#).unwrap();
        assert!(status.takeover_directive().is_none());
    }
}
