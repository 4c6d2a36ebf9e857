// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tutorswap_client::{
    ApiError, Connectivity, LocalMirror, MirrorConfig, RemoteApi, RemoteApiConfig, Resources,
    ToggleSignal,
};
use tutorswap_model::{RecordId, User};

#[derive(Default)]
struct ApiState {
    user_fetches: AtomicUsize,
}

fn ada_json() -> Value {
    json!({
        "_id": "u1",
        "username": "ada",
        "known": ["rust"],
        "interests": ["go"]
    })
}

async fn get_user(State(state): State<Arc<ApiState>>, Path(_id): Path<String>) -> Json<Value> {
    state.user_fetches.fetch_add(1, Ordering::SeqCst);
    Json(ada_json())
}

async fn spawn_api(state: Arc<ApiState>) -> SocketAddr {
    let app = Router::new()
        .route("/api/users/:id", get(get_user))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    addr
}

struct Harness {
    signal: Arc<ToggleSignal>,
    net: Arc<Connectivity>,
    mirror: LocalMirror,
    resources: Resources,
}

async fn harness(base_url: String, online: bool) -> Harness {
    let signal = Arc::new(ToggleSignal::new(online));
    let net = Arc::new(Connectivity::new(signal.clone()));
    let mirror = LocalMirror::open(&MirrorConfig::default())
        .await
        .expect("mirror");
    let api = RemoteApi::new(&RemoteApiConfig { base_url }).expect("api");
    Harness {
        signal,
        net: Arc::clone(&net),
        mirror: mirror.clone(),
        resources: Resources::new(net, api, mirror),
    }
}

fn mirrored_user(id: &str, skill: &str) -> User {
    User {
        id: RecordId::parse(id).expect("id"),
        rev: None,
        username: format!("user-{id}"),
        name: None,
        email: None,
        known: vec![skill.to_string()],
        interests: Vec::new(),
        avatar_url: None,
    }
}

#[tokio::test]
async fn live_reads_refresh_the_mirror_for_offline_reuse() {
    let state = Arc::new(ApiState::default());
    let addr = spawn_api(Arc::clone(&state)).await;
    let h = harness(format!("http://{addr}"), true).await;

    let live = h.resources.user("u1").await.expect("live read");
    assert_eq!(live.username, "ada");
    assert_eq!(state.user_fetches.load(Ordering::SeqCst), 1);

    h.signal.set_online(false);
    let cached = h.resources.user("u1").await.expect("cached read");
    assert_eq!(cached.username, "ada");
    assert_eq!(
        state.user_fetches.load(Ordering::SeqCst),
        1,
        "an offline read must not touch the server"
    );
}

#[tokio::test]
async fn transport_failure_falls_back_and_reports_offline() {
    // Reserve a port, then free it so connections are refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let h = harness(format!("http://{addr}"), true).await;
    h.mirror
        .put(&mirrored_user("u1", "rust"))
        .await
        .expect("seed");

    assert!(!h.net.is_offline());
    let read = h.resources.user("u1").await.expect("fallback read");
    assert_eq!(read.username, "user-u1");
    assert!(h.net.is_offline(), "failed call flips the offline assessment");
    assert!(h.net.is_online(), "the host signal itself still says online");
}

#[tokio::test]
async fn live_success_clears_the_offline_assessment() {
    let state = Arc::new(ApiState::default());
    let addr = spawn_api(state).await;
    let h = harness(format!("http://{addr}"), true).await;

    let shaken: Result<(), ApiError> = h
        .net
        .with_fallback(async { Err(ApiError::transport("boom")) }, async { Ok(()) })
        .await;
    shaken.expect("fallback result");
    assert!(h.net.is_offline());

    h.resources.user("u1").await.expect("live read");
    assert!(!h.net.is_offline());
}

#[tokio::test]
async fn offline_listing_synthesizes_the_remote_envelope() {
    let h = harness("http://127.0.0.1:1".to_string(), false).await;
    let users: Vec<User> = (1..=7).map(|i| mirrored_user(&format!("u{i}"), "rust")).collect();
    h.mirror.put_many(&users).await.expect("seed");

    let page = h
        .resources
        .users_with_skills(2, &[], &[])
        .await
        .expect("second page");
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.prev, Some(1));
    assert_eq!(page.pagination.current, 2);
    assert_eq!(page.pagination.next, None);
    assert_eq!(page.pagination.total, Some(2));
}

#[tokio::test]
async fn offline_listing_filters_by_offered_and_wanted_skills() {
    let h = harness("http://127.0.0.1:1".to_string(), false).await;
    let mut pianist = mirrored_user("u2", "piano");
    pianist.interests = vec!["go".to_string()];
    h.mirror
        .put_many(&[mirrored_user("u1", "rust"), pianist, mirrored_user("u3", "rust")])
        .await
        .expect("seed");

    let page = h
        .resources
        .users_with_skills(1, &["piano".to_string()], &[])
        .await
        .expect("filtered page");
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id.as_str(), "u2");
    assert_eq!(page.pagination.total, Some(1));

    let both = h
        .resources
        .users_with_skills(1, &["piano".to_string()], &["go".to_string()])
        .await
        .expect("offer and want");
    assert_eq!(both.data.len(), 1);

    let neither = h
        .resources
        .users_with_skills(1, &["piano".to_string()], &["chess".to_string()])
        .await
        .expect("no takers");
    assert!(neither.data.is_empty());
}
