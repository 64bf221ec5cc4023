use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use highfive_core::domain::recognition::{CoreValue, RecognitionEvent, UserId};
use highfive_core::errors::LedgerError;

use crate::blocks::{
    CORE_VALUE_ACTION_ID, CORE_VALUE_BLOCK_ID, MESSAGE_ACTION_ID, MESSAGE_BLOCK_ID,
    RECIPIENT_ACTION_ID, RECIPIENT_BLOCK_ID, RECOGNITION_CALLBACK_ID,
};

/// Decoded `payload` field of an interactivity request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    ViewSubmission { user: InteractionUser, view: SubmittedView },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InteractionUser {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmittedView {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, InputValue>>,
}

/// One input element's state. Only the field matching the element type is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InputValue {
    #[serde(default)]
    pub selected_user: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("interaction payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unexpected view callback `{0}`")]
    UnexpectedCallback(String),
    #[error("missing `{block_id}` in view submission")]
    MissingField { block_id: &'static str },
    #[error("{source}")]
    InvalidField {
        block_id: &'static str,
        #[source]
        source: LedgerError,
    },
    #[error(transparent)]
    Invalid(#[from] LedgerError),
}

impl InteractionError {
    /// Block the error should be attached to in the modal, when there is one.
    pub fn block_id(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { block_id } | Self::InvalidField { block_id, .. } => Some(*block_id),
            _ => None,
        }
    }
}

pub fn parse_interaction_payload(raw: &str) -> Result<InteractionPayload, InteractionError> {
    Ok(serde_json::from_str(raw)?)
}

impl SubmittedView {
    fn input(&self, block_id: &str, action_id: &str) -> Option<&InputValue> {
        self.state.values.get(block_id).and_then(|actions| actions.get(action_id))
    }

    /// Reads the recognition form into an event given by `giver`.
    pub fn recognition(&self, giver: &str) -> Result<RecognitionEvent, InteractionError> {
        if self.callback_id != RECOGNITION_CALLBACK_ID {
            return Err(InteractionError::UnexpectedCallback(self.callback_id.clone()));
        }

        let receiver = self
            .input(RECIPIENT_BLOCK_ID, RECIPIENT_ACTION_ID)
            .and_then(|input| input.selected_user.as_deref())
            .ok_or(InteractionError::MissingField { block_id: RECIPIENT_BLOCK_ID })?;
        let core_value = self
            .input(CORE_VALUE_BLOCK_ID, CORE_VALUE_ACTION_ID)
            .and_then(|input| input.selected_option.as_ref())
            .map(|option| option.value.as_str())
            .ok_or(InteractionError::MissingField { block_id: CORE_VALUE_BLOCK_ID })?;
        let message = self
            .input(MESSAGE_BLOCK_ID, MESSAGE_ACTION_ID)
            .and_then(|input| input.value.as_deref())
            .unwrap_or_default();

        let receiver = UserId::parse(receiver, "receiver")
            .map_err(|source| InteractionError::InvalidField { block_id: RECIPIENT_BLOCK_ID, source })?;
        let core_value = core_value
            .parse::<CoreValue>()
            .map_err(|source| InteractionError::InvalidField { block_id: CORE_VALUE_BLOCK_ID, source })?;

        Ok(RecognitionEvent::from_raw(giver, receiver.as_str(), core_value.key(), message)?)
    }
}

/// Body returned to Slack for a `view_submission`; field errors keep the modal open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewSubmissionResponse {
    pub response_action: &'static str,
    pub errors: BTreeMap<String, String>,
}

impl ViewSubmissionResponse {
    pub fn field_error(block_id: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(block_id.to_owned(), message.into());
        Self { response_action: "errors", errors }
    }
}
