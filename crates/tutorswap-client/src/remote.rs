// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tutorswap_model::{
    Appointment, AppointmentDraft, Conversations, Credentials, Message, OutgoingMessage,
    Paginated, SignupForm, User,
};

#[derive(Debug, Clone)]
pub struct RemoteApiConfig {
    /// Origin of the API server, without a trailing slash.
    pub base_url: String,
}

impl Default for RemoteApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Error payload the server sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Thin typed wrapper over the HTTP API. Sessions ride on a cookie jar, so
/// one instance must serve all calls of a browsing context.
#[derive(Clone)]
pub struct RemoteApi {
    http: reqwest::Client,
    base: String,
}

impl RemoteApi {
    pub fn new(config: &RemoteApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// One page of users, narrowed to those offering any of `known` and
    /// wanting any of `interests`. The server splits the lists on comma
    /// plus whitespace, so they are joined with ", " here.
    pub async fn fetch_users(
        &self,
        page: u32,
        known: &[String],
        interests: &[String],
    ) -> Result<Paginated<User>, ApiError> {
        let mut request = self
            .http
            .get(self.url("/api/users"))
            .query(&[("page", page.to_string())]);
        if !known.is_empty() {
            request = request.query(&[("known", known.join(", "))]);
        }
        if !interests.is_empty() {
            request = request.query(&[("interests", interests.join(", "))]);
        }
        let response = request.send().await.map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    /// Fetch one user. `target` is either a record id or an `@`-prefixed
    /// username.
    pub async fn fetch_user(&self, target: &str) -> Result<User, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/users/{target}")))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    /// The signed-in user, or a 401 status error when nobody is.
    pub async fn fetch_me(&self) -> Result<User, ApiError> {
        let response = self
            .http
            .get(self.url("/api/me"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn fetch_user_appointments(
        &self,
        user_id: &str,
    ) -> Result<Vec<Appointment>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/users/{user_id}/appointments")))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn fetch_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/appointments"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn fetch_appointment(&self, id: &str) -> Result<Appointment, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/appointments/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        let response = self
            .http
            .post(self.url("/api/appointments/create"))
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/appointments/{id}")))
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/appointments/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        expect_ok(response).await
    }

    /// Every conversation of the signed-in user, keyed by counterpart and
    /// newest first within each thread.
    pub async fn fetch_conversations(&self) -> Result<Conversations, ApiError> {
        let response = self
            .http
            .get(self.url("/api/messages"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn send_message(&self, outgoing: &OutgoingMessage) -> Result<Message, ApiError> {
        let response = self
            .http
            .post(self.url("/api/messages"))
            .json(outgoing)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    /// Auth endpoints sit at the server root, not under `/api`.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<User, ApiError> {
        let response = self
            .http
            .post(self.url("/signup"))
            .json(form)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        decode(response).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/logout"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        expect_ok(response).await
    }
}

/// Decodes a success body, or turns a non-success status into a status
/// error carrying the server's `message` when one is present.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| ApiError::from_reqwest(&e));
    }
    Err(status_error(status.as_u16(), response).await)
}

async fn expect_ok(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(status_error(status.as_u16(), response).await)
}

async fn status_error(code: u16, response: reqwest::Response) -> ApiError {
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("request failed with status {code}")),
        Err(_) => format!("request failed with status {code}"),
    };
    ApiError::status(code, message)
}
