//! 后台定时任务
//!
//! 按 `scheduler.interval_secs` 周期执行：
//! - 以今天为参照重新推导收费记录状态（逾期 / 恢复）
//! - 上次发薪早于本月的员工重置为未发薪
//! - 清理过期登录会话
//!
//! 启动时先执行一次，单项失败只记录日志，不影响下一轮。

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::models::staff::entities::salary_month_key;
use crate::services::DynamicConfig;
use crate::storage::Storage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub fee_records_updated: u64,
    pub salaries_reset: u64,
    pub sessions_purged: u64,
    pub failures: u32,
}

/// 执行一轮维护任务
pub async fn run_once(storage: &Arc<dyn Storage>) -> TickReport {
    let mut report = TickReport::default();

    let ctx = DynamicConfig::fee_context().await;
    let month = salary_month_key(ctx.as_of);

    match storage.refresh_fee_statuses(ctx).await {
        Ok(count) => report.fee_records_updated = count,
        Err(e) => {
            error!("Scheduler failed to refresh fee statuses: {}", e);
            report.failures += 1;
        }
    }

    match storage.reset_salary_statuses(&month).await {
        Ok(count) => report.salaries_reset = count,
        Err(e) => {
            error!("Scheduler failed to reset salary statuses: {}", e);
            report.failures += 1;
        }
    }

    match storage.purge_expired_sessions().await {
        Ok(count) => report.sessions_purged = count,
        Err(e) => {
            error!("Scheduler failed to purge sessions: {}", e);
            report.failures += 1;
        }
    }

    report
}

/// 启动后台任务，返回任务句柄
pub fn spawn(storage: Arc<dyn Storage>) -> Option<tokio::task::JoinHandle<()>> {
    let config = &AppConfig::get().scheduler;
    if !config.enabled {
        warn!("Background scheduler is disabled");
        return None;
    }

    let period = Duration::from_secs(config.interval_secs);
    info!("Background scheduler started, interval {}s", period.as_secs());

    Some(tokio::spawn(async move {
        // 第一次 tick 立即触发
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let report = run_once(&storage).await;
            if report == TickReport::default() {
                debug!("Scheduler tick: nothing to update");
            } else {
                info!(
                    "Scheduler tick: {} fee record(s) updated, {} salary status(es) reset, {} session(s) purged, {} failure(s)",
                    report.fee_records_updated,
                    report.salaries_reset,
                    report.sessions_purged,
                    report.failures
                );
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_storage;

    #[tokio::test]
    async fn test_run_once_on_empty_database() {
        let storage: Arc<dyn Storage> = Arc::new(test_storage().await);
        let report = run_once(&storage).await;
        assert_eq!(report, TickReport::default());
    }
}
