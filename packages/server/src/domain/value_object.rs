//! Value Object 定義
//!
//! ID や列挙値など、不変で値によって同一性が決まる型を定義します。
//! 生の `String` を受け取る境界（WebSocket クエリ、HTTP ボディ）でのみ検証を行い、
//! 以降のレイヤーは検証済みの型を扱います。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Room name reserved for list-level notices such as `debate:created`.
pub const DEBATES_LIST_ROOM: &str = "debates-list";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id, rejecting empty or whitespace-only values.
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::EmptyId($label));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
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
    /// Authenticated user identifier.
    UserId,
    "userId"
);

string_id!(
    /// Debate identifier. A debate's room shares the same id.
    DebateId,
    "debateId"
);

string_id!(
    /// Broadcast scope identifier.
    RoomId,
    "roomId"
);

string_id!(
    /// Participant record identifier.
    ParticipantId,
    "participantId"
);

string_id!(
    /// Speak request identifier.
    SpeakRequestId,
    "speakRequestId"
);

impl DebateId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ParticipantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl SpeakRequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl RoomId {
    /// The reserved room that receives `debate:created` notices.
    pub fn debates_list() -> Self {
        Self(DEBATES_LIST_ROOM.to_string())
    }
}

impl From<&DebateId> for RoomId {
    fn from(debate_id: &DebateId) -> Self {
        Self(debate_id.as_str().to_string())
    }
}

impl From<&RoomId> for DebateId {
    /// The debate a debate room belongs to.
    fn from(room_id: &RoomId) -> Self {
        Self(room_id.as_str().to_string())
    }
}

/// A participant's stance in a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Agree,
    Disagree,
    Neutral,
}

impl Side {
    /// Normalize (trim, lowercase) and parse a side string.
    ///
    /// An empty string means "no side picked yet" and yields `Ok(None)`.
    pub fn parse(raw: &str) -> Result<Option<Self>, ValueObjectError> {
        match raw.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "agree" => Ok(Some(Self::Agree)),
            "disagree" => Ok(Some(Self::Disagree)),
            "neutral" => Ok(Some(Self::Neutral)),
            _ => Err(ValueObjectError::InvalidSide(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agree => "agree",
            Self::Disagree => "disagree",
            Self::Neutral => "neutral",
        }
    }
}

/// Participant role inside one debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParticipantRole {
    Host,
    User,
}

/// Debate lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebateStatus {
    Scheduled,
    Active,
    Ended,
}

impl DebateStatus {
    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        match raw {
            "SCHEDULED" => Ok(Self::Scheduled),
            "ACTIVE" => Ok(Self::Active),
            "ENDED" => Ok(Self::Ended),
            _ => Err(ValueObjectError::InvalidDebateStatus(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
        }
    }
}

impl fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debate visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebateType {
    Public,
    Private,
}

impl DebateType {
    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        match raw {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE" => Ok(Self::Private),
            _ => Err(ValueObjectError::InvalidDebateType(raw.to_string())),
        }
    }
}

/// Speak request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakRequestStatus {
    Pending,
    Approved,
    Denied,
}

impl SpeakRequestStatus {
    /// Parse a resolution. Only `approved` and `denied` are legal.
    pub fn parse_resolution(raw: &str) -> Result<Self, ValueObjectError> {
        match raw {
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(ValueObjectError::InvalidResolution(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank_values() {
        // テスト項目: 空文字・空白のみの ID は拒否される
        // given (前提条件):
        let empty = String::new();
        let blank = "   ".to_string();

        // when (操作):
        let empty_result = UserId::new(empty);
        let blank_result = UserId::new(blank);

        // then (期待する結果):
        assert_eq!(empty_result, Err(ValueObjectError::EmptyId("userId")));
        assert_eq!(blank_result, Err(ValueObjectError::EmptyId("userId")));
    }

    #[test]
    fn test_user_id_accepts_non_blank_value() {
        // テスト項目: 通常の ID はそのまま保持される
        // given (前提条件):
        let raw = "alice".to_string();

        // when (操作):
        let user_id = UserId::try_from(raw).unwrap();

        // then (期待する結果):
        assert_eq!(user_id.as_str(), "alice");
        assert_eq!(user_id.to_string(), "alice");
    }

    #[test]
    fn test_side_parse_normalizes_input() {
        // テスト項目: side 文字列は trim + lowercase で正規化される
        // given (前提条件):
        let inputs = ["  Agree ", "DISAGREE", "neutral", ""];

        // when (操作):
        let parsed: Vec<_> = inputs.iter().map(|s| Side::parse(s).unwrap()).collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                Some(Side::Agree),
                Some(Side::Disagree),
                Some(Side::Neutral),
                None
            ]
        );
    }

    #[test]
    fn test_side_parse_rejects_unknown_value() {
        // テスト項目: 未知の side は拒否される
        // given (前提条件):
        let raw = "maybe";

        // when (操作):
        let result = Side::parse(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::InvalidSide("maybe".to_string())));
    }

    #[test]
    fn test_debate_status_parse_is_case_sensitive() {
        // テスト項目: ステータスは大文字の表記のみ受け付ける
        assert_eq!(DebateStatus::parse("ACTIVE"), Ok(DebateStatus::Active));
        assert_eq!(DebateStatus::parse("ENDED"), Ok(DebateStatus::Ended));
        assert_eq!(
            DebateStatus::parse("active"),
            Err(ValueObjectError::InvalidDebateStatus("active".to_string()))
        );
    }

    #[test]
    fn test_speak_request_resolution_accepts_only_final_states() {
        // テスト項目: 解決ステータスは approved / denied のみ受け付ける
        assert_eq!(
            SpeakRequestStatus::parse_resolution("approved"),
            Ok(SpeakRequestStatus::Approved)
        );
        assert_eq!(
            SpeakRequestStatus::parse_resolution("denied"),
            Ok(SpeakRequestStatus::Denied)
        );
        assert!(SpeakRequestStatus::parse_resolution("pending").is_err());
    }

    #[test]
    fn test_room_id_from_debate_id() {
        // テスト項目: ディベート ID からルーム ID が導出される
        // given (前提条件):
        let debate_id = DebateId::new("debate-1".to_string()).unwrap();

        // when (操作):
        let room_id = RoomId::from(&debate_id);

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "debate-1");
        assert_eq!(RoomId::debates_list().as_str(), DEBATES_LIST_ROOM);
    }
}
