// SPDX-License-Identifier: Apache-2.0

use crate::{RecordId, Revision};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A TutorSwap member. The remote API omits `email` and `name` unless the
/// record describes the requesting user; mirrored copies may carry a `_rev`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub known: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Whether the user offers any of `known` and wants any of `interests`.
    /// Empty filter lists match everything, as the remote listing does.
    #[must_use]
    pub fn matches_skills(&self, known: &[String], interests: &[String]) -> bool {
        let offers = known.is_empty() || known.iter().any(|s| self.known.contains(s));
        let wants = interests.is_empty() || interests.iter().any(|s| self.interests.contains(s));
        offers && wants
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum AppointmentKind {
    Online,
    InPerson,
}

impl AppointmentKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::InPerson => "in-person",
        }
    }
}

impl Display for AppointmentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tutoring session between two members. Times are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    pub teacher_id: RecordId,
    pub learner_id: RecordId,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: AppointmentKind,
    #[serde(default)]
    pub url: String,
    pub topic: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Appointment {
    #[must_use]
    pub fn involves(&self, user: &RecordId) -> bool {
        self.teacher_id == *user || self.learner_id == *user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    pub from_id: RecordId,
    pub to_id: RecordId,
    pub time: i64,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn involves(&self, user: &RecordId) -> bool {
        self.from_id == *user || self.to_id == *user
    }

    /// The other party of a message, from `own`'s point of view.
    #[must_use]
    pub fn counterpart(&self, own: &RecordId) -> &RecordId {
        if self.from_id == *own {
            &self.to_id
        } else {
            &self.from_id
        }
    }
}

/// Conversations keyed by counterpart id, each newest message first. This is
/// the exact shape the remote messages listing returns.
pub type Conversations = BTreeMap<RecordId, Vec<Message>>;

/// Groups `own`'s messages into conversations, newest first within each,
/// replicating the remote grouping so mirror fallbacks agree with live reads.
#[must_use]
pub fn group_conversations(messages: Vec<Message>, own: &RecordId) -> Conversations {
    let mut grouped = Conversations::new();
    for msg in messages {
        let other = msg.counterpart(own).clone();
        grouped.entry(other).or_default().push(msg);
    }
    for thread in grouped.values_mut() {
        thread.sort_by(|a, b| b.time.cmp(&a.time));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RecordId {
        RecordId::parse(s).expect("id")
    }

    fn msg(mid: &str, from: &str, to: &str, time: i64) -> Message {
        Message {
            id: id(mid),
            rev: None,
            from_id: id(from),
            to_id: id(to),
            time,
            text: format!("m{time}"),
        }
    }

    #[test]
    fn user_round_trips_wire_names() {
        let raw = r#"{"_id":"u1","username":"ada","known":["rust"],"interests":["go"]}"#;
        let user: User = serde_json::from_str(raw).expect("user");
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.known, vec!["rust".to_string()]);
        assert!(user.email.is_none());
        let out = serde_json::to_value(&user).expect("json");
        assert_eq!(out["_id"], "u1");
        assert!(out.get("_rev").is_none());
    }

    #[test]
    fn appointment_kind_uses_kebab_wire_values() {
        let raw = r#"{"_id":"a1","teacherId":"t","learnerId":"l","time":5,
            "type":"in-person","topic":"knots","createdAt":1,"updatedAt":2}"#;
        let appt: Appointment = serde_json::from_str(raw).expect("appt");
        assert_eq!(appt.kind, AppointmentKind::InPerson);
        assert_eq!(appt.url, "");
        let out = serde_json::to_value(&appt).expect("json");
        assert_eq!(out["type"], "in-person");
        assert_eq!(out["teacherId"], "t");
    }

    #[test]
    fn involvement_covers_both_roles() {
        let raw = r#"{"_id":"a1","teacherId":"t","learnerId":"l","time":5,
            "type":"online","url":"x","topic":"y","createdAt":1,"updatedAt":2}"#;
        let appt: Appointment = serde_json::from_str(raw).expect("appt");
        assert!(appt.involves(&id("t")));
        assert!(appt.involves(&id("l")));
        assert!(!appt.involves(&id("z")));
    }

    #[test]
    fn skills_filter_requires_any_of_each_list() {
        let user = User {
            id: id("u1"),
            rev: None,
            username: "ada".to_string(),
            name: None,
            email: None,
            known: vec!["rust".to_string(), "piano".to_string()],
            interests: vec!["go".to_string()],
            avatar_url: None,
        };
        assert!(user.matches_skills(&[], &[]));
        assert!(user.matches_skills(&["piano".to_string()], &[]));
        assert!(user.matches_skills(&["piano".to_string()], &["go".to_string()]));
        assert!(!user.matches_skills(&["violin".to_string()], &["go".to_string()]));
        assert!(!user.matches_skills(&["piano".to_string()], &["chess".to_string()]));
    }

    #[test]
    fn conversations_group_by_counterpart_newest_first() {
        let own = id("me");
        let grouped = group_conversations(
            vec![
                msg("m1", "me", "a", 10),
                msg("m2", "a", "me", 30),
                msg("m3", "b", "me", 20),
            ],
            &own,
        );
        assert_eq!(grouped.len(), 2);
        let a = grouped.get(&id("a")).expect("thread a");
        assert_eq!(a.iter().map(|m| m.time).collect::<Vec<_>>(), vec![30, 10]);
        assert_eq!(grouped.get(&id("b")).expect("thread b").len(), 1);
    }
}
