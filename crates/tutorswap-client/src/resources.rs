// SPDX-License-Identifier: Apache-2.0

use crate::mirror::MirrorRecord;
use crate::{ApiError, Connectivity, LocalMirror, RemoteApi};
use std::sync::Arc;
use tutorswap_model::{
    group_conversations, Appointment, AppointmentDraft, Conversations, Message, OutgoingMessage,
    Paginated, RecordId, User, USERS_PAGE_SIZE,
};

/// Page-facing data access. Reads try the live API and fall back to the
/// mirror, refreshing the mirror on every live success; writes reach the
/// server or fail, and only a confirmed result is mirrored.
#[derive(Clone)]
pub struct Resources {
    net: Arc<Connectivity>,
    api: RemoteApi,
    mirror: LocalMirror,
}

impl Resources {
    #[must_use]
    pub fn new(net: Arc<Connectivity>, api: RemoteApi, mirror: LocalMirror) -> Self {
        Self { net, api, mirror }
    }

    /// One page of users offering any of `known` and wanting any of
    /// `interests`. The mirror fallback filters and slices with the same
    /// page size the server uses, so the envelope looks the same either
    /// way.
    pub async fn users_with_skills(
        &self,
        page: u32,
        known: &[String],
        interests: &[String],
    ) -> Result<Paginated<User>, ApiError> {
        let offered = known.to_vec();
        let wanted = interests.to_vec();
        self.net
            .with_fallback(
                async {
                    let listed = self.api.fetch_users(page, known, interests).await?;
                    self.mirror.put_many(&listed.data).await?;
                    Ok(listed)
                },
                async move {
                    let users = self
                        .mirror
                        .find::<User, _>(move |u| u.matches_skills(&offered, &wanted))
                        .await?;
                    Ok(Paginated::from_page(users, page, USERS_PAGE_SIZE))
                },
            )
            .await
    }

    /// One user by record id or `@`-prefixed username.
    pub async fn user(&self, target: &str) -> Result<User, ApiError> {
        self.net
            .with_fallback(
                async {
                    let user = self.api.fetch_user(target).await?;
                    self.mirror.put(&user).await?;
                    Ok(user)
                },
                self.cached_user(target),
            )
            .await
    }

    async fn cached_user(&self, target: &str) -> Result<User, ApiError> {
        let found = match target.strip_prefix('@') {
            Some(username) => {
                let username = username.to_string();
                self.mirror
                    .find_first::<User, _>(move |u| u.username == username)
                    .await?
            }
            None => match RecordId::parse(target) {
                Ok(id) => self.mirror.get::<User>(&id).await?,
                Err(_) => None,
            },
        };
        found.ok_or_else(ApiError::not_cached)
    }

    pub async fn appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.net
            .with_fallback(
                async {
                    let listed = self.api.fetch_appointments().await?;
                    self.mirror.put_many(&listed).await?;
                    Ok(listed)
                },
                async {
                    let mut mirrored = self.mirror.find::<Appointment, _>(|_| true).await?;
                    mirrored.sort_by_key(|a| a.time);
                    Ok(mirrored)
                },
            )
            .await
    }

    pub async fn appointment(&self, id: &str) -> Result<Appointment, ApiError> {
        self.net
            .with_fallback(
                async {
                    let appt = self.api.fetch_appointment(id).await?;
                    self.mirror.put(&appt).await?;
                    Ok(appt)
                },
                async {
                    let found = match RecordId::parse(id) {
                        Ok(id) => self.mirror.get::<Appointment>(&id).await?,
                        Err(_) => None,
                    };
                    found.ok_or_else(ApiError::not_cached)
                },
            )
            .await
    }

    pub async fn appointments_with_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.net
            .with_fallback(
                async {
                    let listed = self.api.fetch_user_appointments(user_id).await?;
                    self.mirror.put_many(&listed).await?;
                    Ok(listed)
                },
                async {
                    let Ok(uid) = RecordId::parse(user_id) else {
                        return Ok(Vec::new());
                    };
                    let mut mirrored = self
                        .mirror
                        .find::<Appointment, _>(move |a| a.involves(&uid))
                        .await?;
                    mirrored.sort_by_key(|a| a.time);
                    Ok(mirrored)
                },
            )
            .await
    }

    /// All conversations of `own`, grouped by counterpart, newest first per
    /// thread. The fallback regroups mirrored messages the same way.
    pub async fn conversations(&self, own: &RecordId) -> Result<Conversations, ApiError> {
        self.net
            .with_fallback(
                async {
                    let threads = self.api.fetch_conversations().await?;
                    let all: Vec<Message> = threads.values().flatten().cloned().collect();
                    self.mirror.put_many(&all).await?;
                    Ok(threads)
                },
                async {
                    let me = own.clone();
                    let involved = self
                        .mirror
                        .find::<Message, _>(move |m| m.involves(&me))
                        .await?;
                    Ok(group_conversations(involved, own))
                },
            )
            .await
    }

    pub async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        let appt = self
            .net
            .without_fallback(self.api.create_appointment(draft))
            .await?;
        self.remember(&appt).await;
        Ok(appt)
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        let appt = self
            .net
            .without_fallback(self.api.update_appointment(id, draft))
            .await?;
        self.remember(&appt).await;
        Ok(appt)
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<(), ApiError> {
        self.net
            .without_fallback(self.api.delete_appointment(id))
            .await?;
        if let Ok(rid) = RecordId::parse(id) {
            if let Err(err) = self.mirror.remove::<Appointment>(&rid).await {
                tracing::warn!(error = %err, "could not drop deleted appointment from mirror");
            }
        }
        Ok(())
    }

    pub async fn send_message(&self, outgoing: &OutgoingMessage) -> Result<Message, ApiError> {
        let sent = self
            .net
            .without_fallback(self.api.send_message(outgoing))
            .await?;
        self.remember(&sent).await;
        Ok(sent)
    }

    /// Mirror failures after a confirmed write are logged, not surfaced;
    /// the write itself already happened.
    async fn remember<T: MirrorRecord>(&self, record: &T) {
        if let Err(err) = self.mirror.put(record).await {
            tracing::warn!(error = %err, "could not mirror confirmed write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MirrorConfig, RemoteApiConfig, ToggleSignal};

    async fn offline_resources() -> Resources {
        let mirror = LocalMirror::open(&MirrorConfig::default())
            .await
            .expect("mirror");
        let api = RemoteApi::new(&RemoteApiConfig::default()).expect("api");
        let net = Arc::new(Connectivity::new(Arc::new(ToggleSignal::new(false))));
        Resources::new(net, api, mirror)
    }

    fn sample_user(id: &str, username: &str) -> User {
        User {
            id: RecordId::parse(id).expect("id"),
            rev: None,
            username: username.to_string(),
            name: None,
            email: None,
            known: vec!["rust".to_string()],
            interests: Vec::new(),
            avatar_url: None,
        }
    }

    fn sample_appointment(id: &str, time: i64) -> Appointment {
        Appointment {
            id: RecordId::parse(id).expect("id"),
            rev: None,
            teacher_id: RecordId::parse("t1").expect("id"),
            learner_id: RecordId::parse("l1").expect("id"),
            time,
            kind: tutorswap_model::AppointmentKind::Online,
            url: String::new(),
            topic: "topic".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn offline_reads_serve_mirrored_copies() {
        let resources = offline_resources().await;
        resources
            .mirror
            .put(&sample_user("u1", "ada"))
            .await
            .expect("put");

        let by_id = resources.user("u1").await.expect("by id");
        assert_eq!(by_id.username, "ada");
        let by_name = resources.user("@ada").await.expect("by username");
        assert_eq!(by_name.id.as_str(), "u1");

        let miss = resources.user("u9").await.expect_err("uncached miss");
        assert_eq!(miss.status_code(), Some(404));
    }

    #[tokio::test]
    async fn offline_appointment_list_sorts_ascending_by_time() {
        let resources = offline_resources().await;
        resources
            .mirror
            .put_many(&[sample_appointment("a2", 50), sample_appointment("a1", 10)])
            .await
            .expect("put");

        let listed = resources.appointments().await.expect("list");
        assert_eq!(
            listed.iter().map(|a| a.time).collect::<Vec<_>>(),
            vec![10, 50]
        );
    }

    #[tokio::test]
    async fn offline_writes_are_refused_up_front() {
        let resources = offline_resources().await;
        let err = resources
            .delete_appointment("a1")
            .await
            .expect_err("refused");
        assert!(err.is_offline());
        assert_eq!(err.to_string(), crate::OFFLINE_MESSAGE);
    }
}
