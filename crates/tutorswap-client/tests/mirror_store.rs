// SPDX-License-Identifier: Apache-2.0

use tempfile::tempdir;
use tutorswap_client::{LocalMirror, MirrorConfig, FORCE_LOGOUT_FLAG, LOGGED_IN_USER_MARKER};
use tutorswap_model::{RecordId, Revision, User};

fn user(id: &str, rev: Option<&str>, username: &str) -> User {
    User {
        id: RecordId::parse(id).expect("id"),
        rev: rev.map(|r| Revision::parse(r).expect("rev")),
        username: username.to_string(),
        name: None,
        email: None,
        known: Vec::new(),
        interests: Vec::new(),
        avatar_url: None,
    }
}

async fn open_at(path: &std::path::Path) -> LocalMirror {
    LocalMirror::open(&MirrorConfig {
        path: Some(path.to_path_buf()),
    })
    .await
    .expect("open mirror")
}

#[tokio::test]
async fn records_survive_reopening_the_same_file() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("mirror.sqlite");

    let mirror = open_at(&db).await;
    mirror.put(&user("u1", None, "ada")).await.expect("put");
    drop(mirror);

    let reopened = open_at(&db).await;
    let got: User = reopened
        .get(&RecordId::parse("u1").expect("id"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(got.username, "ada");
}

#[tokio::test]
async fn upsert_without_revision_keeps_the_stored_one() {
    let mirror = LocalMirror::open(&MirrorConfig::default())
        .await
        .expect("open mirror");
    mirror
        .put(&user("u1", Some("3-abc"), "ada"))
        .await
        .expect("put with rev");

    // A live payload carries no revision token; the mirrored token must
    // survive the refresh.
    mirror
        .put(&user("u1", None, "ada-renamed"))
        .await
        .expect("put without rev");

    let got: User = mirror
        .get(&RecordId::parse("u1").expect("id"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(got.username, "ada-renamed");
    assert_eq!(got.rev.as_ref().map(Revision::as_str), Some("3-abc"));

    // An explicit newer token replaces it.
    mirror
        .put(&user("u1", Some("4-def"), "ada-renamed"))
        .await
        .expect("put newer rev");
    let got: User = mirror
        .get(&RecordId::parse("u1").expect("id"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(got.rev.as_ref().map(Revision::as_str), Some("4-def"));
}

#[tokio::test]
async fn records_without_an_id_are_skipped() {
    let mirror = LocalMirror::open(&MirrorConfig::default())
        .await
        .expect("open mirror");

    let raw = r#"{"_id":"","username":"ghost"}"#;
    let ghost: User = serde_json::from_str(raw).expect("decode");
    mirror.put(&ghost).await.expect("put is a no-op");

    let all = mirror.find::<User, _>(|_| true).await.expect("scan");
    assert!(all.is_empty());
}

#[tokio::test]
async fn clearing_records_spares_markers_and_flags() {
    let mirror = LocalMirror::open(&MirrorConfig::default())
        .await
        .expect("open mirror");
    mirror.put(&user("u1", None, "ada")).await.expect("put");
    mirror
        .set_marker(LOGGED_IN_USER_MARKER, "u1")
        .await
        .expect("marker");
    mirror
        .flags()
        .set_true(FORCE_LOGOUT_FLAG)
        .await
        .expect("flag");

    mirror.clear_records().await.expect("clear");

    assert!(mirror
        .find::<User, _>(|_| true)
        .await
        .expect("scan")
        .is_empty());
    assert_eq!(
        mirror
            .marker(LOGGED_IN_USER_MARKER)
            .await
            .expect("marker read")
            .as_deref(),
        Some("u1")
    );
    assert!(mirror
        .flags()
        .is_set(FORCE_LOGOUT_FLAG)
        .await
        .expect("flag read"));
}

#[tokio::test]
async fn find_first_scans_in_id_order() {
    let mirror = LocalMirror::open(&MirrorConfig::default())
        .await
        .expect("open mirror");
    mirror
        .put_many(&[
            user("u2", None, "bo"),
            user("u1", None, "ada"),
            user("u3", None, "bo"),
        ])
        .await
        .expect("put");

    let bo = mirror
        .find_first::<User, _>(|u| u.username == "bo")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(bo.id.as_str(), "u2");

    mirror
        .remove::<User>(&RecordId::parse("u2").expect("id"))
        .await
        .expect("remove");
    let bo = mirror
        .find_first::<User, _>(|u| u.username == "bo")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(bo.id.as_str(), "u3");
}
