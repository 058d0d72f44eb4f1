//! 应用生命周期 - 编排层
//!
//! 持有配置、HTTP 连接池和两个会话，按固定间隔执行 [`SyncCycle`]。

use tracing::{error, info};

use crate::clients::{ApiClient, SessionAuth};
use crate::config::Config;
use crate::error::{AppResult, ApiError};
use crate::models::{Session, System};
use crate::orchestrator::sync_cycle::{CycleStats, Sessions, SyncCycle};
use crate::services::{JournalReader, MixWriter};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    cycle: SyncCycle,
    sessions: Sessions,
}

impl App {
    /// 初始化应用
    ///
    /// MIX 会话立即授权；BFJ 会话为空，首次被拒时再授权。
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: String::new(),
                source,
            })?;

        let bfj_auth = SessionAuth::new(
            http.clone(),
            System::Bfj,
            &config.bfj.auth_endpoint,
            config.auth.clone(),
            config.auth_retry.clone(),
        );
        let mix_auth = SessionAuth::new(
            http.clone(),
            System::Mix,
            &config.mix.auth_endpoint,
            config.auth.clone(),
            config.auth_retry.clone(),
        );

        let mix_session = mix_auth.authorize().await?;

        let reader = JournalReader::new(ApiClient::new(http.clone(), bfj_auth), config.bfj.clone());
        let writer = MixWriter::new(
            ApiClient::new(http, mix_auth).with_max_reauth_attempts(config.mix.max_reauth_attempts),
            config.mix.clone(),
            config.mix_stations.clone(),
        );
        let cycle = SyncCycle::new(reader, writer, config.lookup_policy);

        Ok(Self {
            config,
            cycle,
            sessions: Sessions {
                bfj: Session::empty(),
                mix: mix_session,
            },
        })
    }

    /// 执行一轮同步
    pub async fn run_once(&mut self) -> AppResult<CycleStats> {
        let stats = self.cycle.run_once(&mut self.sessions).await?;
        logging::log_cycle_stats(&stats);
        Ok(stats)
    }

    /// 循环同步，授权耗尽时返回错误
    pub async fn run(&mut self) -> AppResult<()> {
        let interval = self.config.poll_interval();
        info!("🔁 开始轮询，间隔 {:?}", interval);

        loop {
            if let Err(e) = self.run_once().await {
                error!("❌ 同步终止: {}", e);
                return Err(e);
            }
            tokio::time::sleep(interval).await;
        }
    }
}
