//! 单轮同步
//!
//! BFJ 高炉列表 → 最新日志 → 最新出铁 → 化验记录 / 铁水罐移动 → MIX。
//! 全部步骤顺序执行。

use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::LookupPolicy;
use crate::error::AuthError;
use crate::models::{FurnaceId, Session, Tapping};
use crate::services::record_mapper;
use crate::services::{JournalReader, MixWriter, PostReport};

/// 两个系统各自的会话
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    pub bfj: Session,
    pub mix: Session,
}

/// 单轮统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub furnaces: usize,
    pub tappings_relayed: usize,
    pub tappings_skipped: usize,
    pub chemicals: PostReport,
    pub movements: PostReport,
}

pub struct SyncCycle {
    reader: JournalReader,
    writer: MixWriter,
    policy: LookupPolicy,
    /// 本进程内每座高炉最近一次完整转发的出铁号
    relayed: HashMap<FurnaceId, i32>,
}

impl SyncCycle {
    pub fn new(reader: JournalReader, writer: MixWriter, policy: LookupPolicy) -> Self {
        Self {
            reader,
            writer,
            policy,
            relayed: HashMap::new(),
        }
    }

    /// 出铁号不大于该高炉最近一次转发的出铁号即视为已转发
    pub fn is_relayed(&self, furnace_id: FurnaceId, num_tapping: i32) -> bool {
        self.relayed
            .get(&furnace_id)
            .is_some_and(|&last| num_tapping <= last)
    }

    pub async fn run_once(&mut self, sessions: &mut Sessions) -> Result<CycleStats, AuthError> {
        let mut stats = CycleStats::default();

        let furnaces = self.reader.list_furnaces(&mut sessions.bfj).await?;
        if furnaces.is_empty() {
            warn!("⚠️ 未获取到高炉列表，本轮跳过");
            return Ok(stats);
        }
        stats.furnaces = furnaces.len();

        let journals = self
            .reader
            .latest_journal_ids(&furnaces, &mut sessions.bfj, self.policy)
            .await?;
        if journals.is_empty() {
            warn!("⚠️ 未获取到高炉最新日志，本轮跳过");
            return Ok(stats);
        }

        let stations = self.writer.stations().to_vec();
        let mix_ids = self
            .writer
            .latest_mix_journal_ids(&stations, &mut sessions.mix, self.policy)
            .await?;
        if mix_ids.is_empty() {
            warn!("⚠️ 未获取到 MIX 工位日志，本轮跳过");
            return Ok(stats);
        }

        for (&furnace_id, journal_ids) in &journals {
            for &journal_id in journal_ids {
                let tappings = self.reader.tappings_for(journal_id, &mut sessions.bfj).await?;
                let Some(tapping) = latest_tapping(&tappings) else {
                    info!("高炉 {} 日志 {} 暂无出铁记录", furnace_id, journal_id);
                    continue;
                };

                if self.is_relayed(furnace_id, tapping.num_tapping) {
                    stats.tappings_skipped += 1;
                    continue;
                }

                info!(
                    "📤 转发高炉 {} 出铁 #{} ({} 个铁水罐)",
                    furnace_id,
                    tapping.num_tapping,
                    tapping.ladles.len()
                );

                let chemicals = self
                    .writer
                    .post_chemicals(&tapping.ladles, &mut sessions.mix)
                    .await?;
                let base = record_mapper::to_ladle_movement(furnace_id, tapping);
                let movements = self
                    .writer
                    .post_ladle_movements(&tapping.ladles, &base, &mix_ids, &mut sessions.mix)
                    .await?;

                // 任一条发送失败则下轮整体重发
                if chemicals.failed == 0 && movements.failed == 0 {
                    self.relayed.insert(furnace_id, tapping.num_tapping);
                    stats.tappings_relayed += 1;
                } else {
                    warn!(
                        "⚠️ 高炉 {} 出铁 #{} 未完整送达 (化验失败 {}, 移动失败 {})，下轮重试",
                        furnace_id,
                        tapping.num_tapping,
                        chemicals.failed,
                        movements.failed
                    );
                }
                stats.chemicals.merge(chemicals);
                stats.movements.merge(movements);
            }
        }

        Ok(stats)
    }
}

/// 出铁号最大的一条
fn latest_tapping(tappings: &[Tapping]) -> Option<&Tapping> {
    tappings.iter().max_by_key(|t| t.num_tapping)
}
