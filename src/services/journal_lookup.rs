//! 批量查询最新日志的逐项结果
//!
//! 每个高炉（或混铁站）一条结果，由 [`LookupPolicy`] 决定如何汇总。

use std::collections::BTreeMap;
use tracing::warn;

use crate::config::LookupPolicy;
use crate::error::{ApiError, ApiResult, AuthError};
use crate::models::JournalId;

/// 单项查询结果，`Ok(None)` 表示该项被跳过（日志为空）
pub type LookupOutcome = ApiResult<Option<JournalId>>;

#[derive(Debug, Default)]
pub struct JournalLookup {
    outcomes: Vec<(i32, LookupOutcome)>,
}

impl JournalLookup {
    pub fn push(&mut self, key: i32, outcome: LookupOutcome) {
        self.outcomes.push((key, outcome));
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_err()).count()
    }

    /// 按策略汇总为 `编号 -> [日志编号]`
    ///
    /// 授权耗尽总是上抛；其余失败在 `FailFast` 下作废整批，在 `BestEffort` 下被丢弃。
    pub fn resolve(self, policy: LookupPolicy) -> Result<BTreeMap<i32, Vec<JournalId>>, AuthError> {
        let failures = self.failures();
        let mut ids = BTreeMap::new();

        for (key, outcome) in self.outcomes {
            match outcome {
                Ok(Some(id)) => {
                    ids.insert(key, vec![id]);
                }
                Ok(None) => {}
                Err(ApiError::Auth(err)) => return Err(err),
                Err(err) => {
                    warn!("⚠️ 编号 {} 的最新日志查询失败: {}", key, err);
                }
            }
        }

        if failures > 0 && policy == LookupPolicy::FailFast {
            warn!("{} 项查询失败，按 fail-fast 策略丢弃整批结果", failures);
            return Ok(BTreeMap::new());
        }
        Ok(ids)
    }
}
