use thiserror::Error;

use crate::models::System;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 认证错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 会话认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 登录请求发送失败
    #[error("{system} 登录请求失败: {source}")]
    Transport {
        system: System,
        #[source]
        source: reqwest::Error,
    },
    /// 登录被拒绝（非 200）
    #[error("{system} 拒绝登录 (status={status}): {body}")]
    Rejected {
        system: System,
        status: u16,
        body: String,
    },
    /// 重试次数耗尽
    #[error("{system} 授权在 {attempts} 次尝试后仍失败: {last_error}")]
    Exhausted {
        system: System,
        attempts: u32,
        last_error: Box<AuthError>,
    },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接、DNS、超时）
    #[error("API请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 请求体序列化失败
    #[error("请求体序列化失败 ({endpoint}): {source}")]
    Encode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 重新授权后仍被拒绝
    #[error("API拒绝请求 ({endpoint}): status={status}, body={body}")]
    Unauthorized {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 日志列表为空
    #[error("日志列表为空: {endpoint}")]
    EmptyJournal { endpoint: String },
    /// 续期会话失败
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParse {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

/// API 结果类型
pub type ApiResult<T> = Result<T, ApiError>;

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
