mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bfj_mix_bridge::config::AuthRetryPolicy;
use bfj_mix_bridge::error::{ApiError, AuthError};
use bfj_mix_bridge::models::{Session, SessionCookie, System};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use support::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn authorize_returns_cookies_from_third_attempt() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    Mock::given(method("POST"))
        .and(path(BFJ_LOGIN))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => ResponseTemplate::new(401).set_body_string("bad credentials"),
                _ => ResponseTemplate::new(200).insert_header("set-cookie", "sid=third; Path=/"),
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    let (auth, delays) = session_auth(&server, System::Bfj, retry_policy(5));
    let session = auth.authorize().await.expect("session");

    assert_eq!(session.cookie_header().as_deref(), Some("sid=third"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        *delays.lock().unwrap(),
        vec![Duration::from_secs(300), Duration::from_secs(300)]
    );

    let logins = requests_to(&server, BFJ_LOGIN).await;
    let body: Value = serde_json::from_slice(&logins[0].body).unwrap();
    assert_eq!(body, json!({"login": "relay", "password": "s3cret"}));
}

#[tokio::test]
async fn authorize_gives_up_after_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MIX_LOGIN))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let (auth, delays) = session_auth(&server, System::Mix, retry_policy(3));
    let err = auth.authorize().await.unwrap_err();

    match err {
        AuthError::Exhausted {
            system,
            attempts,
            last_error,
        } => {
            assert_eq!(system, System::Mix);
            assert_eq!(attempts, 3);
            assert!(matches!(
                *last_error,
                AuthError::Rejected { status: 503, ref body, .. } if body == "maintenance"
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(delays.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn authorize_backs_off_exponentially_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(BFJ_LOGIN))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let policy = AuthRetryPolicy {
        max_attempts: 4,
        delay_secs: 10,
        exponential: true,
        max_delay_secs: 25,
    };
    let (auth, delays) = session_auth(&server, System::Bfj, policy);
    assert!(auth.authorize().await.is_err());

    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Duration::from_secs(10),
            Duration::from_secs(20),
            Duration::from_secs(25)
        ]
    );
}

#[tokio::test]
async fn authorize_retries_transport_failures() {
    let (sleeper, delays) = recording_sleeper();
    let auth = bfj_mix_bridge::SessionAuth::new(
        reqwest::Client::new(),
        System::Bfj,
        "http://127.0.0.1:1/auth",
        credentials(),
        retry_policy(2),
    )
    .with_sleeper(sleeper);

    let err = auth.authorize().await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::Exhausted { attempts: 2, ref last_error, .. }
            if matches!(**last_error, AuthError::Transport { .. })
    ));
    assert_eq!(delays.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_request_is_reissued_with_fresh_session() {
    let server = MockServer::start().await;
    mount_login(&server, BFJ_LOGIN, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/bfj/bf"))
        .and(header("cookie", "sid=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": [1, 2]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bfj/bf"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = bfj_client(&server);
    let mut session = Session::empty();
    let list: Value = client
        .get(&format!("{}/bfj/bf", server.uri()), &mut session)
        .await
        .expect("list");

    assert_eq!(list, json!({"name": [1, 2]}));
    assert_eq!(session.cookie_header().as_deref(), Some("sid=fresh"));
    assert_eq!(requests_to(&server, BFJ_LOGIN).await.len(), 1);

    let calls = requests_to(&server, "/bfj/bf").await;
    assert_eq!(calls.len(), 2);
    assert_eq!(cookie_of(&calls[0]), None);
    assert_eq!(cookie_of(&calls[1]).as_deref(), Some("sid=fresh"));
}

#[tokio::test]
async fn bfj_retries_only_once() {
    let server = MockServer::start().await;
    mount_login(&server, BFJ_LOGIN, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/bfj/bf"))
        .respond_with(ResponseTemplate::new(403).set_body_string("NotAuthorized"))
        .mount(&server)
        .await;

    let client = bfj_client(&server).with_max_reauth_attempts(5);
    let mut session = Session::empty();
    let err = client
        .get::<Value>(&format!("{}/bfj/bf", server.uri()), &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { status: 403, .. }));
    assert_eq!(requests_to(&server, BFJ_LOGIN).await.len(), 1);
    assert_eq!(requests_to(&server, "/bfj/bf").await.len(), 2);
}

#[tokio::test]
async fn mix_not_authorized_marker_is_retried_up_to_ceiling() {
    let server = MockServer::start().await;
    mount_login(&server, MIX_LOGIN, "mix").await;
    Mock::given(method("POST"))
        .and(path("/mix/chemical"))
        .respond_with(ResponseTemplate::new(401).set_body_string("NotAuthorized"))
        .mount(&server)
        .await;

    let client = mix_client(&server, 3);
    let mut session = Session::empty();
    let err = client
        .post(
            &format!("{}/mix/chemical", server.uri()),
            &mut session,
            &json!({"nMix": 1}),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized { status: 401, ref body, .. } if body == "NotAuthorized"
    ));
    assert_eq!(requests_to(&server, MIX_LOGIN).await.len(), 3);
    assert_eq!(requests_to(&server, "/mix/chemical").await.len(), 4);
}

#[tokio::test]
async fn mix_other_rejection_is_abandoned_after_one_retry() {
    let server = MockServer::start().await;
    mount_login(&server, MIX_LOGIN, "mix").await;
    Mock::given(method("POST"))
        .and(path("/mix/chemical"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ladle not found"))
        .mount(&server)
        .await;

    let client = mix_client(&server, 3);
    let mut session = Session::empty();
    let result = client
        .post(
            &format!("{}/mix/chemical", server.uri()),
            &mut session,
            &json!({"nMix": 1}),
        )
        .await;

    assert!(matches!(result, Err(ApiError::Unauthorized { status: 500, .. })));
    assert_eq!(requests_to(&server, MIX_LOGIN).await.len(), 1);
    assert_eq!(requests_to(&server, "/mix/chemical").await.len(), 2);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bfj/bf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = bfj_client(&server);
    let mut session = Session::empty();
    let err = client
        .get::<Value>(&format!("{}/bfj/bf", server.uri()), &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(requests_to(&server, BFJ_LOGIN).await.is_empty());
}

#[tokio::test]
async fn expired_session_is_renewed_before_sending() {
    let server = MockServer::start().await;
    mount_login(&server, MIX_LOGIN, "renewed").await;
    Mock::given(method("GET"))
        .and(path("/mix/journals/1"))
        .and(header("cookie", "sid=renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataJournals": []})))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc::now();
    let mut session = Session::new(
        vec![SessionCookie::new("sid", "stale").expiring_at(now - ChronoDuration::minutes(1))],
        now - ChronoDuration::hours(1),
    );

    let client = mix_client(&server, 3);
    let page = client
        .get::<Value>(&format!("{}/mix/journals/1", server.uri()), &mut session)
        .await;

    tokio_test::assert_ok!(page);
    assert_eq!(session.cookie_header().as_deref(), Some("sid=renewed"));
    assert_eq!(requests_to(&server, MIX_LOGIN).await.len(), 1);
}
