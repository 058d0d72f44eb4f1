use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::MixStationId;

/// 程序配置文件
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 化验记录广播的混铁站
    pub mix_stations: Vec<MixStationId>,
    /// 多个高炉/混铁站查询最新日志时的失败处理方式
    pub lookup_policy: LookupPolicy,
    /// 登录凭据（两个系统共用）
    pub auth: Credentials,
    /// 登录重试策略
    pub auth_retry: AuthRetryPolicy,
    pub bfj: BfjApiConfig,
    pub mix: MixApiConfig,
}

/// 登录凭据，原样序列化为登录请求体
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// 登录重试策略
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthRetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 两次尝试之间的等待（秒）
    pub delay_secs: u64,
    /// 是否按指数退避
    pub exponential: bool,
    /// 指数退避的等待上限（秒）
    pub max_delay_secs: u64,
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            delay_secs: 300,
            exponential: false,
            max_delay_secs: 1800,
        }
    }
}

impl AuthRetryPolicy {
    /// 第 `failures` 次失败后的等待时长（从 1 开始计数）
    pub fn delay_after(&self, failures: u32) -> Duration {
        let base = Duration::from_secs(self.delay_secs);
        if !self.exponential {
            return base;
        }
        let shift = failures.saturating_sub(1).min(16);
        let cap = Duration::from_secs(self.max_delay_secs.max(self.delay_secs));
        base.saturating_mul(1u32 << shift).min(cap)
    }
}

/// 批量查询最新日志的失败处理方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// 任一查询失败则整批作废
    #[default]
    FailFast,
    /// 丢弃失败项，保留其余结果
    BestEffort,
}

/// 高炉日志 API 端点
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BfjApiConfig {
    pub auth_endpoint: String,
    pub list_endpoint: String,
    pub journal_endpoint: String,
    pub tapping_endpoint: String,
}

impl Default for BfjApiConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: "http://localhost:8081/api/auth/login".to_string(),
            list_endpoint: "http://localhost:8081/api/bf/list".to_string(),
            journal_endpoint: "http://localhost:8081/api/journals/last/{}".to_string(),
            tapping_endpoint: "http://localhost:8081/api/tappings/{}".to_string(),
        }
    }
}

/// 混铁炉 API 端点
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MixApiConfig {
    pub auth_endpoint: String,
    pub journal_endpoint: String,
    pub chemical_endpoint: String,
    pub ladle_movement_endpoint: String,
    /// 收到 `NotAuthorized` 时最多重新授权的次数
    pub max_reauth_attempts: u32,
}

impl Default for MixApiConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: "http://localhost:8082/api/auth/login".to_string(),
            journal_endpoint: "http://localhost:8082/api/journals/last/{}".to_string(),
            chemical_endpoint: "http://localhost:8082/api/chemical".to_string(),
            ladle_movement_endpoint: "http://localhost:8082/api/ladle-movement/{}".to_string(),
            max_reauth_attempts: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            request_timeout_secs: 30,
            verbose_logging: false,
            mix_stations: vec![1, 2, 3, 4],
            lookup_policy: LookupPolicy::FailFast,
            auth: Credentials::default(),
            auth_retry: AuthRetryPolicy::default(),
            bfj: BfjApiConfig::default(),
            mix: MixApiConfig::default(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// 默认值 → `BRIDGE_CONFIG` 指向的文件 → 环境变量覆盖
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("BRIDGE_CONFIG") {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 应用环境变量覆盖，`lookup` 便于测试时替换
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(login) = lookup("BRIDGE_LOGIN") {
            self.auth.login = login;
        }
        if let Some(password) = lookup("BRIDGE_PASSWORD") {
            self.auth.password = password;
        }
        if let Some(v) = lookup("POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_env("POLL_INTERVAL_SECS", &v, "u64")?;
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &v, "u64")?;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_env("VERBOSE_LOGGING", &v, "bool")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mix_stations.is_empty() {
            return Err(invalid("mix_stations", "至少需要一个混铁站"));
        }
        if self.auth_retry.max_attempts == 0 {
            return Err(invalid("auth_retry.max_attempts", "必须大于 0"));
        }
        let endpoints = [
            ("bfj.auth_endpoint", &self.bfj.auth_endpoint),
            ("bfj.list_endpoint", &self.bfj.list_endpoint),
            ("bfj.journal_endpoint", &self.bfj.journal_endpoint),
            ("bfj.tapping_endpoint", &self.bfj.tapping_endpoint),
            ("mix.auth_endpoint", &self.mix.auth_endpoint),
            ("mix.journal_endpoint", &self.mix.journal_endpoint),
            ("mix.chemical_endpoint", &self.mix.chemical_endpoint),
            ("mix.ladle_movement_endpoint", &self.mix.ladle_movement_endpoint),
        ];
        for (field, value) in endpoints {
            if value.trim().is_empty() {
                return Err(invalid(field, "端点不能为空"));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 用整数编号填充端点模板
///
/// 模板含 `{}` 时替换，否则作为路径段追加。
pub fn endpoint_for(template: &str, id: i32) -> String {
    if template.contains("{}") {
        template.replacen("{}", &id.to_string(), 1)
    } else {
        format!("{}/{}", template.trim_end_matches('/'), id)
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::EnvVarParse {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
