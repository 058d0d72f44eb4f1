//! # BFJ → MIX Bridge
//!
//! 将高炉日志系统（BFJ）的出铁、铁水罐与化验数据同步到混铁炉系统（MIX）。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `SessionAuth` - 登录并获取会话，有上限的重试
//! - `ApiClient` - 携带会话发送请求，被拒时重新授权并重发
//!
//! ### ② 业务能力层（Services）
//! - `JournalReader` - 读取高炉列表、最新日志、出铁记录
//! - `record_mapper` - BFJ 记录 → MIX 记录（纯函数）
//! - `MixWriter` - 查询 MIX 日志并推送化验与铁水罐移动记录
//!
//! ### ③ 编排层（Orchestration）
//! - `SyncCycle` - 单轮同步
//! - `App` - 持有连接池与会话，按间隔轮询
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{ApiClient, SessionAuth};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, AuthError, ConfigError};
pub use models::{Session, System};
pub use orchestrator::{App, SyncCycle};
pub use services::{JournalReader, MixWriter};
