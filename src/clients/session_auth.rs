//! 会话认证
//!
//! 向单个外部系统登录并返回 [`Session`]。登录失败时按 [`AuthRetryPolicy`]
//! 等待后重试，达到上限返回 [`AuthError::Exhausted`]。
//!
//! 调用方在授权完成前不会继续任何请求，整个同步流程随之阻塞。

use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{AuthRetryPolicy, Credentials};
use crate::error::AuthError;
use crate::models::{Session, System};
use crate::utils::logging::truncate_text;

/// 可注入的等待函数，测试中替换为立即返回的记录器
pub type Sleeper = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// 基于 `tokio::time::sleep` 的等待函数
pub fn tokio_sleeper() -> Sleeper {
    Arc::new(|delay: Duration| tokio::time::sleep(delay).boxed())
}

/// 单个系统的会话认证
#[derive(Clone)]
pub struct SessionAuth {
    http: reqwest::Client,
    system: System,
    endpoint: String,
    credentials: Credentials,
    policy: AuthRetryPolicy,
    sleeper: Sleeper,
}

impl SessionAuth {
    pub fn new(
        http: reqwest::Client,
        system: System,
        endpoint: impl Into<String>,
        credentials: Credentials,
        policy: AuthRetryPolicy,
    ) -> Self {
        Self {
            http,
            system,
            endpoint: endpoint.into(),
            credentials,
            policy,
            sleeper: tokio_sleeper(),
        }
    }

    /// 替换等待函数
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn system(&self) -> System {
        self.system
    }

    /// 登录，失败时等待后重试直到成功或达到上限
    pub async fn authorize(&self) -> Result<Session, AuthError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut failures = 0u32;

        loop {
            let err = match self.try_login().await {
                Ok(session) => {
                    info!(
                        "✓ {} 授权成功 (第 {} 次尝试, {} 个 Cookie)",
                        self.system,
                        failures + 1,
                        session.cookies().len()
                    );
                    debug!(
                        "{} 会话签发于 {}, 过期时间 {:?}",
                        self.system,
                        session.issued_at(),
                        session.expires_at()
                    );
                    return Ok(session);
                }
                Err(err) => err,
            };

            failures += 1;
            warn!(
                "⚠️ {} 授权失败 ({}/{}): {}",
                self.system, failures, max_attempts, err
            );

            if failures >= max_attempts {
                return Err(AuthError::Exhausted {
                    system: self.system,
                    attempts: failures,
                    last_error: Box::new(err),
                });
            }

            let delay = self.policy.delay_after(failures);
            info!("{} 下一次授权尝试将在 {:?} 后进行", self.system, delay);
            (self.sleeper)(delay).await;
        }
    }

    async fn try_login(&self) -> Result<Session, AuthError> {
        debug!("发送 {} 登录请求: {}", self.system, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&self.credentials)
            .send()
            .await
            .map_err(|source| AuthError::Transport {
                system: self.system,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(Session::from_response(&response));
        }

        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Rejected {
            system: self.system,
            status: status.as_u16(),
            body: truncate_text(&body, 200),
        })
    }
}
