//! 带会话的 API 客户端
//!
//! 请求被拒绝（非 200）时通过 [`SessionAuth`] 重新授权，用新会话重发同一请求。
//! 调用方传入的会话会被原地替换。

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clients::SessionAuth;
use crate::error::{ApiError, ApiResult};
use crate::models::{Session, System};
use crate::utils::logging::truncate_text;

/// MIX 用于标记会话失效的响应体
pub const NOT_AUTHORIZED_MARKER: &str = "NotAuthorized";

/// 单个外部系统的 API 客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    auth: SessionAuth,
    max_reauth_attempts: u32,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, auth: SessionAuth) -> Self {
        Self {
            http,
            auth,
            max_reauth_attempts: 1,
        }
    }

    /// 设置重新授权次数上限
    ///
    /// 首次被拒总会重新授权一次；之后只有 MIX 返回 `NotAuthorized` 时才继续。
    pub fn with_max_reauth_attempts(mut self, attempts: u32) -> Self {
        self.max_reauth_attempts = attempts.max(1);
        self
    }

    pub fn system(&self) -> System {
        self.auth.system()
    }

    /// GET 并解析 JSON
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        session: &mut Session,
    ) -> ApiResult<T> {
        let body = self.execute(Method::GET, endpoint, None, session).await?;
        serde_json::from_str(&body).map_err(|source| {
            warn!("{} 响应解析失败 ({}): {}", self.system(), endpoint, source);
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    /// POST JSON，返回响应文本
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        session: &mut Session,
        body: &B,
    ) -> ApiResult<String> {
        let payload = serde_json::to_vec(body).map_err(|source| ApiError::Encode {
            endpoint: endpoint.to_string(),
            source,
        })?;
        self.execute(Method::POST, endpoint, Some(payload), session)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Vec<u8>>,
        session: &mut Session,
    ) -> ApiResult<String> {
        if !session.is_empty() && !session.is_valid(Utc::now()) {
            debug!("{} 会话已过期，重新授权", self.system());
            *session = self.auth.authorize().await?;
        }

        let mut reauths = 0u32;
        loop {
            let (status, body) = self
                .send(method.clone(), endpoint, payload.as_deref(), session)
                .await?;

            if status == StatusCode::OK {
                return Ok(body);
            }

            let marked = self.system().honours_not_authorized_marker()
                && body.trim().trim_matches('"') == NOT_AUTHORIZED_MARKER;
            let may_retry = reauths < self.max_reauth_attempts && (reauths == 0 || marked);

            if !may_retry {
                warn!(
                    "❌ {} 拒绝请求 {} {} (status={}): {}",
                    self.system(),
                    method,
                    endpoint,
                    status,
                    truncate_text(&body, 200)
                );
                return Err(ApiError::Unauthorized {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            warn!(
                "{} 返回 {} ({}), 重新授权后重试",
                self.system(),
                status,
                endpoint
            );
            *session = self.auth.authorize().await?;
            reauths += 1;
        }
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&[u8]>,
        session: &Session,
    ) -> ApiResult<(StatusCode, String)> {
        let mut request = self.http.request(method.clone(), endpoint);
        if let Some(cookies) = session.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_vec());
        }

        debug!("{} {} {}", self.system(), method, endpoint);

        let transport = |source: reqwest::Error| {
            warn!("{} 请求失败 ({}): {}", self.system(), endpoint, source);
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        Ok((status, body))
    }
}
