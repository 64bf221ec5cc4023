use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Trims surrounding whitespace and rejects identifiers that end up empty.
    pub fn parse(raw: &str, field: &str) -> Result<Self, LedgerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(format!("{field} must be a non-empty user id")));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slack mention syntax for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreValue {
    Positive,
    Team,
    Improve,
    Forward,
    Performance,
}

impl CoreValue {
    pub const ALL: [CoreValue; 5] =
        [Self::Positive, Self::Team, Self::Improve, Self::Forward, Self::Performance];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Team => "team",
            Self::Improve => "improve",
            Self::Forward => "forward",
            Self::Performance => "performance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive Energy",
            Self::Team => "Team Player",
            Self::Improve => "Constant Improvement",
            Self::Forward => "Forward Thinking",
            Self::Performance => "Deliver Performance",
        }
    }
}

impl FromStr for CoreValue {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|candidate| candidate.key() == normalized).ok_or_else(|| {
            LedgerError::Validation(format!(
                "unsupported core value `{normalized}` (expected positive|team|improve|forward|performance)"
            ))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionEvent {
    pub giver: UserId,
    pub receiver: UserId,
    pub core_value: CoreValue,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl RecognitionEvent {
    /// Builds an event from raw form fields. Self-recognition is allowed.
    pub fn from_raw(
        giver: &str,
        receiver: &str,
        core_value: &str,
        message: &str,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            giver: UserId::parse(giver, "giver")?,
            receiver: UserId::parse(receiver, "receiver")?,
            core_value: core_value.parse()?,
            message: message.trim().to_owned(),
            submitted_at: Utc::now(),
        })
    }
}
