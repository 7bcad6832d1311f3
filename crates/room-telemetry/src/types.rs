//! Label vocabulary shared by the facade and its callers.
//!
//! `node_type` values are drawn from [`NodeType`]. Track kinds and subscribe
//! failure reasons have typed forms here, but the facade accepts any string
//! for `kind`.

use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Role of the node emitting telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    /// Combined signaling and media server.
    #[default]
    Server,
    /// Control-plane only node.
    Controller,
    /// Media forwarding node.
    Media,
    /// TURN relay node.
    Turn,
}

impl NodeType {
    /// Returns the node type as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeType::Server => "SERVER",
            NodeType::Controller => "CONTROLLER",
            NodeType::Media => "MEDIA",
            NodeType::Turn => "TURN",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SERVER" => Ok(NodeType::Server),
            "CONTROLLER" => Ok(NodeType::Controller),
            "MEDIA" => Ok(NodeType::Media),
            "TURN" => Ok(NodeType::Turn),
            _ => Err(ConfigError::InvalidValue(format!("unknown node type: {s}"))),
        }
    }
}

/// Media kind of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
    Data,
}

impl TrackKind {
    /// Returns the kind as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
            TrackKind::Data => "data",
        }
    }
}

impl AsRef<str> for TrackKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded classification of subscribe failures.
///
/// Cardinality: 6. Use this instead of raw error messages wherever the
/// caller can classify the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscribeFailureReason {
    /// Subscriber lacks permission for the track.
    PermissionDenied,
    /// Requested track does not exist.
    TrackNotFound,
    /// Publishing participant does not exist.
    ParticipantNotFound,
    /// Negotiation did not complete in time.
    Timeout,
    /// Media transport failed.
    Transport,
    /// Any other server-side failure.
    Internal,
}

impl SubscribeFailureReason {
    /// Returns the reason as a string for the `error` label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SubscribeFailureReason::PermissionDenied => "permission_denied",
            SubscribeFailureReason::TrackNotFound => "track_not_found",
            SubscribeFailureReason::ParticipantNotFound => "participant_not_found",
            SubscribeFailureReason::Timeout => "timeout",
            SubscribeFailureReason::Transport => "transport",
            SubscribeFailureReason::Internal => "internal",
        }
    }

    /// Whether the failure was caused by the subscriber rather than the server.
    ///
    /// User errors are subtracted from attempts when computing success rate.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            SubscribeFailureReason::PermissionDenied
                | SubscribeFailureReason::TrackNotFound
                | SubscribeFailureReason::ParticipantNotFound
        )
    }
}

impl fmt::Display for SubscribeFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
