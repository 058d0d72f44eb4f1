//! 高炉日志读取 - 业务能力层
//!
//! 只负责从 BFJ 读取高炉列表、最新日志和出铁记录。
//! 网络或解析失败只记录日志并返回空结果；授权耗尽上抛。

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::clients::ApiClient;
use crate::config::{endpoint_for, BfjApiConfig, LookupPolicy};
use crate::error::{ApiError, ApiResult, AuthError};
use crate::models::{FurnaceId, FurnaceList, JournalId, JournalPage, Session, Tapping};
use crate::services::journal_lookup::{JournalLookup, LookupOutcome};

pub struct JournalReader {
    client: ApiClient,
    endpoints: BfjApiConfig,
}

impl JournalReader {
    pub fn new(client: ApiClient, endpoints: BfjApiConfig) -> Self {
        Self { client, endpoints }
    }

    /// 高炉编号列表
    pub async fn list_furnaces(&self, session: &mut Session) -> Result<Vec<FurnaceId>, AuthError> {
        match self
            .client
            .get::<FurnaceList>(&self.endpoints.list_endpoint, session)
            .await
        {
            Ok(list) => {
                debug!("BFJ 高炉列表: {:?}", list.furnaces);
                Ok(list.furnaces)
            }
            Err(err) => swallow(err, "高炉列表").map(|_| Vec::new()),
        }
    }

    /// 每个高炉的最新日志编号
    ///
    /// `FailFast` 下任一高炉失败即停止并返回空表。
    pub async fn latest_journal_ids(
        &self,
        furnace_ids: &[FurnaceId],
        session: &mut Session,
        policy: LookupPolicy,
    ) -> Result<BTreeMap<FurnaceId, Vec<JournalId>>, AuthError> {
        let mut lookup = JournalLookup::default();

        for &furnace_id in furnace_ids {
            let outcome = self.latest_journal_id(furnace_id, session).await;
            let stop = match &outcome {
                Err(ApiError::Auth(_)) => true,
                Err(_) => policy == LookupPolicy::FailFast,
                Ok(_) => false,
            };
            lookup.push(furnace_id, outcome);
            if stop {
                break;
            }
        }

        let ids = lookup.resolve(policy)?;
        info!("BFJ 最新日志: {:?}", ids);
        Ok(ids)
    }

    async fn latest_journal_id(
        &self,
        furnace_id: FurnaceId,
        session: &mut Session,
    ) -> LookupOutcome {
        let endpoint = endpoint_for(&self.endpoints.journal_endpoint, furnace_id);
        let page: JournalPage = self.client.get(&endpoint, session).await?;
        match page.latest_id() {
            Some(id) => Ok(Some(id)),
            None => Err(ApiError::EmptyJournal { endpoint }),
        }
    }

    /// 日志下的出铁记录
    pub async fn tappings_for(
        &self,
        journal_id: JournalId,
        session: &mut Session,
    ) -> Result<Vec<Tapping>, AuthError> {
        let endpoint = endpoint_for(&self.endpoints.tapping_endpoint, journal_id);
        let result: ApiResult<Vec<Tapping>> = self.client.get(&endpoint, session).await;
        match result {
            Ok(tappings) => {
                debug!("日志 {} 共 {} 条出铁记录", journal_id, tappings.len());
                Ok(tappings)
            }
            Err(err) => swallow(err, "出铁记录").map(|_| Vec::new()),
        }
    }
}

/// 记录可吞掉的错误；授权耗尽上抛
pub(crate) fn swallow(err: ApiError, what: &str) -> Result<(), AuthError> {
    match err {
        ApiError::Auth(err) => Err(err),
        err => {
            warn!("⚠️ 获取{}失败: {}", what, err);
            Ok(())
        }
    }
}
