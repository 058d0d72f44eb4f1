//! 混铁炉写入 - 业务能力层
//!
//! 查询 MIX 最新日志并逐条推送化验记录与铁水罐移动记录。
//! 单条推送失败只记录日志，不影响其余目标。

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::clients::ApiClient;
use crate::config::{endpoint_for, LookupPolicy, MixApiConfig};
use crate::error::{ApiError, AuthError};
use crate::models::{JournalId, JournalPage, Ladle, LadleMovement, MixStationId, Session};
use crate::services::journal_lookup::JournalLookup;
use crate::services::record_mapper;

/// 推送统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostReport {
    pub sent: usize,
    pub failed: usize,
}

impl PostReport {
    pub fn total(&self) -> usize {
        self.sent + self.failed
    }

    pub fn merge(&mut self, other: PostReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

pub struct MixWriter {
    client: ApiClient,
    endpoints: MixApiConfig,
    stations: Vec<MixStationId>,
}

impl MixWriter {
    pub fn new(client: ApiClient, endpoints: MixApiConfig, stations: Vec<MixStationId>) -> Self {
        Self {
            client,
            endpoints,
            stations,
        }
    }

    pub fn stations(&self) -> &[MixStationId] {
        &self.stations
    }

    /// 每个混铁站的最新日志编号，日志为空的站被跳过
    pub async fn latest_mix_journal_ids(
        &self,
        station_ids: &[MixStationId],
        session: &mut Session,
        policy: LookupPolicy,
    ) -> Result<BTreeMap<MixStationId, Vec<JournalId>>, AuthError> {
        let mut lookup = JournalLookup::default();

        for &station in station_ids {
            let endpoint = endpoint_for(&self.endpoints.journal_endpoint, station);
            let outcome = self
                .client
                .get::<JournalPage>(&endpoint, session)
                .await
                .map(|page| page.latest_id());
            if let Ok(None) = outcome {
                debug!("MIX 混铁站 {} 没有日志，跳过", station);
            }
            let stop = match &outcome {
                Err(ApiError::Auth(_)) => true,
                Err(_) => policy == LookupPolicy::FailFast,
                Ok(_) => false,
            };
            lookup.push(station, outcome);
            if stop {
                break;
            }
        }

        let ids = lookup.resolve(policy)?;
        info!("MIX 最新日志: {:?}", ids);
        Ok(ids)
    }

    /// 将所有铁水罐的化验记录广播到每个混铁站
    pub async fn post_chemicals(
        &self,
        ladles: &[Ladle],
        session: &mut Session,
    ) -> Result<PostReport, AuthError> {
        let endpoint = &self.endpoints.chemical_endpoint;
        let mut report = PostReport::default();

        for dto in record_mapper::to_chemical_dtos(ladles, &self.stations) {
            let target = format!("混铁站 {} 罐 {}", dto.mix_station, dto.ladle_id);
            self.post_one(endpoint, session, &dto, &target, &mut report)
                .await?;
        }

        info!(
            "化验记录推送完成: 成功 {}/{}",
            report.sent,
            report.total()
        );
        Ok(report)
    }

    /// 每个铁水罐 × 每个 MIX 日志编号推送一条铁水罐移动记录
    pub async fn post_ladle_movements(
        &self,
        ladles: &[Ladle],
        base: &LadleMovement,
        mix_ids: &BTreeMap<MixStationId, Vec<JournalId>>,
        session: &mut Session,
    ) -> Result<PostReport, AuthError> {
        let mut report = PostReport::default();

        for ladle in ladles {
            let movement = base.for_ladle(ladle);
            for key in mix_ids.values().flatten() {
                let endpoint = endpoint_for(&self.endpoints.ladle_movement_endpoint, *key);
                let target = format!("日志 {} 罐 {}", key, ladle.ladle_id);
                self.post_one(&endpoint, session, &movement, &target, &mut report)
                    .await?;
            }
        }

        info!(
            "铁水罐移动推送完成: 成功 {}/{}",
            report.sent,
            report.total()
        );
        Ok(report)
    }

    async fn post_one<B: serde::Serialize>(
        &self,
        endpoint: &str,
        session: &mut Session,
        body: &B,
        target: &str,
        report: &mut PostReport,
    ) -> Result<(), AuthError> {
        match self.client.post(endpoint, session, body).await {
            Ok(response) => {
                debug!("✓ 已推送 {}: {}", target, response);
                report.sent += 1;
                Ok(())
            }
            Err(ApiError::Auth(err)) => Err(err),
            Err(err) => {
                warn!("⚠️ 推送 {} 失败: {}", target, err);
                report.failed += 1;
                Ok(())
            }
        }
    }
}
