//! 会话
//!
//! 登录成功后由响应 `Set-Cookie` 构造，作为显式值在调用之间传递，
//! 不作为全局可变状态持有。

use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// 单个会话 Cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// 已认证会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<SessionCookie>,
    issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(cookies: Vec<SessionCookie>, issued_at: DateTime<Utc>) -> Self {
        Self { cookies, issued_at }
    }

    /// 空会话（首次请求前尚未登录）
    pub fn empty() -> Self {
        Self::new(Vec::new(), Utc::now())
    }

    /// 从登录响应的 `Set-Cookie` 构造会话
    pub fn from_response(response: &reqwest::Response) -> Self {
        let now = Utc::now();
        let cookies = response
            .cookies()
            .map(|cookie| {
                let from_max_age = cookie
                    .max_age()
                    .and_then(|age| ChronoDuration::from_std(age).ok())
                    .map(|age| now + age);
                let from_expires = cookie.expires().map(DateTime::<Utc>::from);
                let expires_at = match (from_max_age, from_expires) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                SessionCookie {
                    name: cookie.name().to_string(),
                    value: cookie.value().to_string(),
                    expires_at,
                }
            })
            .collect();
        Self::new(cookies, now)
    }

    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// 最早的 Cookie 过期时间
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.cookies.iter().filter_map(|c| c.expires_at).min()
    }

    /// 会话在 `now` 时刻是否可用
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.is_empty() {
            return false;
        }
        match self.expires_at() {
            Some(expiry) => now < expiry,
            None => true,
        }
    }

    /// 渲染为 `Cookie` 请求头，空会话返回 `None`
    pub fn cookie_header(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}
