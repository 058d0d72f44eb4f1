#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bfj_mix_bridge::clients::{ApiClient, SessionAuth, Sleeper};
use bfj_mix_bridge::config::{AuthRetryPolicy, BfjApiConfig, Credentials, MixApiConfig};
use bfj_mix_bridge::models::System;
use futures::FutureExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const BFJ_LOGIN: &str = "/bfj/auth";
pub const MIX_LOGIN: &str = "/mix/auth";

/// 立即返回并记录等待时长
pub fn recording_sleeper() -> (Sleeper, Arc<Mutex<Vec<Duration>>>) {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let sink = delays.clone();
    let sleeper: Sleeper = Arc::new(move |delay: Duration| {
        sink.lock().unwrap().push(delay);
        futures::future::ready(()).boxed()
    });
    (sleeper, delays)
}

pub fn credentials() -> Credentials {
    Credentials {
        login: "relay".to_string(),
        password: "s3cret".to_string(),
    }
}

pub fn retry_policy(max_attempts: u32) -> AuthRetryPolicy {
    AuthRetryPolicy {
        max_attempts,
        ..AuthRetryPolicy::default()
    }
}

pub fn session_auth(
    server: &MockServer,
    system: System,
    policy: AuthRetryPolicy,
) -> (SessionAuth, Arc<Mutex<Vec<Duration>>>) {
    let login = match system {
        System::Bfj => BFJ_LOGIN,
        System::Mix => MIX_LOGIN,
    };
    let (sleeper, delays) = recording_sleeper();
    let auth = SessionAuth::new(
        reqwest::Client::new(),
        system,
        format!("{}{}", server.uri(), login),
        credentials(),
        policy,
    )
    .with_sleeper(sleeper);
    (auth, delays)
}

pub fn bfj_client(server: &MockServer) -> ApiClient {
    let (auth, _) = session_auth(server, System::Bfj, retry_policy(3));
    ApiClient::new(reqwest::Client::new(), auth)
}

pub fn mix_client(server: &MockServer, max_reauth_attempts: u32) -> ApiClient {
    let (auth, _) = session_auth(server, System::Mix, retry_policy(3));
    ApiClient::new(reqwest::Client::new(), auth).with_max_reauth_attempts(max_reauth_attempts)
}

/// 登录成功并下发 `sid=<value>`
pub async fn mount_login(server: &MockServer, login_path: &str, sid: &str) {
    Mock::given(method("POST"))
        .and(path(login_path))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", format!("sid={}; Path=/", sid)),
        )
        .mount(server)
        .await;
}

pub fn bfj_endpoints(server: &MockServer) -> BfjApiConfig {
    let base = server.uri();
    BfjApiConfig {
        auth_endpoint: format!("{}{}", base, BFJ_LOGIN),
        list_endpoint: format!("{}/bfj/bf", base),
        journal_endpoint: format!("{}/bfj/journals/{{}}", base),
        tapping_endpoint: format!("{}/bfj/tappings/{{}}", base),
    }
}

pub fn mix_endpoints(server: &MockServer) -> MixApiConfig {
    let base = server.uri();
    MixApiConfig {
        auth_endpoint: format!("{}{}", base, MIX_LOGIN),
        journal_endpoint: format!("{}/mix/journals/{{}}", base),
        chemical_endpoint: format!("{}/mix/chemical", base),
        ladle_movement_endpoint: format!("{}/mix/ladle-movement/{{}}", base),
        max_reauth_attempts: 3,
    }
}

/// 发往某路径的请求
pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .collect()
}

/// 发往某路径前缀的请求
pub async fn requests_under(server: &MockServer, prefix: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .collect()
}

pub fn cookie_of(request: &Request) -> Option<String> {
    request
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
