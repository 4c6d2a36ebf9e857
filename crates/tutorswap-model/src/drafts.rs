use crate::{AppointmentKind, RecordId};
use serde::{Deserialize, Serialize};

/// Client-side appointment payload; the server assigns id, revision, and the
/// created/updated stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub teacher_id: RecordId,
    pub learner_id: RecordId,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    #[serde(default)]
    pub url: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(rename = "toId")]
    pub to_id: RecordId,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}
