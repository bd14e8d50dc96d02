// ==========================================
// MooTracker 牧场管理系统 - 提醒看板 API
// ==========================================
// 职责: 刷新提醒看板、提醒转任务、暂缓/处理提醒、任务状态
// 说明: 刷新失败时若已有看板,返回旧看板并标记 stale
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ClassifierConfigReader;
use crate::domain::alert::{Alert, AlertState};
use crate::domain::task::{Task, TaskId, TaskOverrides};
use crate::domain::types::TaskStatus;
use crate::engine::classifier::EventClassifier;
use crate::engine::sink::TaskSink;
use crate::i18n::t;
use crate::repository::{AlertStateRepository, AnimalRepository, PenRepository, TaskRepository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument, warn};

// ==========================================
// AlertBoard - 提醒看板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBoard {
    pub generated_for: NaiveDate, // 判定基准日
    pub alerts: Vec<Alert>,       // 已隐藏暂缓/已处理的提醒
    pub hidden_count: usize,      // 被隐藏的提醒数
    pub stale: bool,              // true = 本次刷新失败,展示的是上一次结果
    pub error: Option<String>,    // 刷新失败提示（按当前语言）
}

/// 最近一次成功刷新的结果
struct RefreshCache {
    board: AlertBoard,
    by_id: HashMap<String, Alert>, // 含被隐藏的提醒
}

// ==========================================
// AlertApi - 提醒看板 API
// ==========================================
pub struct AlertApi {
    animal_repo: Arc<AnimalRepository>,
    pen_repo: Arc<PenRepository>,
    alert_state_repo: Arc<AlertStateRepository>,
    task_repo: Arc<TaskRepository>,
    config_reader: Arc<dyn ClassifierConfigReader>,
    task_sink: Arc<dyn TaskSink>,
    cache: Mutex<Option<RefreshCache>>,
}

impl AlertApi {
    /// 创建新的AlertApi实例
    pub fn new(
        animal_repo: Arc<AnimalRepository>,
        pen_repo: Arc<PenRepository>,
        alert_state_repo: Arc<AlertStateRepository>,
        task_repo: Arc<TaskRepository>,
        config_reader: Arc<dyn ClassifierConfigReader>,
        task_sink: Arc<dyn TaskSink>,
    ) -> Self {
        Self {
            animal_repo,
            pen_repo,
            alert_state_repo,
            task_repo,
            config_reader,
            task_sink,
            cache: Mutex::new(None),
        }
    }

    fn lock_cache(&self) -> ApiResult<MutexGuard<Option<RefreshCache>>> {
        self.cache
            .lock()
            .map_err(|e| ApiError::InternalError(format!("看板缓存锁获取失败: {}", e)))
    }

    // ==========================================
    // 看板刷新
    // ==========================================

    /// 刷新提醒看板
    ///
    /// # 返回
    /// - Ok(AlertBoard{stale: false}): 刷新成功
    /// - Ok(AlertBoard{stale: true, error}): 刷新失败,返回上一次成功的看板;
    ///   error 为本地化提示,原始错误只写入日志
    /// - Err(ApiError): 刷新失败且没有可用的旧看板
    #[instrument(skip(self), fields(today = %today))]
    pub async fn refresh_alerts(&self, today: NaiveDate) -> ApiResult<AlertBoard> {
        match self.compute_board(today).await {
            Ok(cache) => {
                let board = cache.board.clone();
                *self.lock_cache()? = Some(cache);
                info!(
                    shown = board.alerts.len(),
                    hidden = board.hidden_count,
                    "提醒看板已刷新"
                );
                Ok(board)
            }
            Err(err) => {
                warn!(error = %err, "提醒看板刷新失败");
                let guard = self.lock_cache()?;
                match guard.as_ref() {
                    Some(cache) => {
                        let mut board = cache.board.clone();
                        board.stale = true;
                        board.error = Some(t("common.stale_alerts"));
                        Ok(board)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// 最近一次成功刷新的看板（未刷新过时为 None）
    pub fn current_board(&self) -> ApiResult<Option<AlertBoard>> {
        Ok(self.lock_cache()?.as_ref().map(|c| c.board.clone()))
    }

    async fn compute_board(&self, today: NaiveDate) -> ApiResult<RefreshCache> {
        let config = self
            .config_reader
            .load_classifier_config()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let classifier = EventClassifier::new(config)?;

        let animals = self.animal_repo.list_all()?;
        let pens = self.pen_repo.list_all()?;
        let alerts = classifier.classify(&animals, &pens, today)?;

        let states: HashMap<String, AlertState> = self
            .alert_state_repo
            .list_all()?
            .into_iter()
            .map(|s| (s.alert_id.clone(), s))
            .collect();

        let by_id: HashMap<String, Alert> = alerts.iter().map(|a| (a.id.clone(), a.clone())).collect();
        let total = alerts.len();
        let visible: Vec<Alert> = alerts
            .into_iter()
            .filter(|a| !states.get(&a.id).map_or(false, |s| s.hides(a, today)))
            .collect();

        Ok(RefreshCache {
            board: AlertBoard {
                generated_for: today,
                hidden_count: total - visible.len(),
                alerts: visible,
                stale: false,
                error: None,
            },
            by_id,
        })
    }

    /// 在最近一次刷新结果中查找提醒
    fn find_alert(&self, alert_id: &str) -> ApiResult<(Alert, NaiveDate)> {
        let guard = self.lock_cache()?;
        let cache = guard
            .as_ref()
            .ok_or_else(|| ApiError::NotFound(format!("提醒(id={})不存在: 看板尚未刷新", alert_id)))?;
        let alert = cache
            .by_id
            .get(alert_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("提醒(id={})不存在", alert_id)))?;
        Ok((alert, cache.board.generated_for))
    }

    /// 从缓存看板中移除已暂缓/已处理的提醒
    fn hide_in_board(&self, alert_id: &str) -> ApiResult<()> {
        let mut guard = self.lock_cache()?;
        if let Some(cache) = guard.as_mut() {
            let before = cache.board.alerts.len();
            cache.board.alerts.retain(|a| a.id != alert_id);
            cache.board.hidden_count += before - cache.board.alerts.len();
        }
        Ok(())
    }

    // ==========================================
    // 提醒操作
    // ==========================================

    /// 提醒转任务
    ///
    /// # 参数
    /// - alert_id: 最近一次刷新结果中的提醒ID
    /// - overrides: 用户覆写（标题/到期日/优先级/备注）
    pub fn create_task(&self, alert_id: &str, overrides: TaskOverrides) -> ApiResult<TaskId> {
        let (alert, _) = self.find_alert(alert_id)?;
        let task_id = self
            .task_sink
            .create_from_alert(&alert, overrides)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(task_id)
    }

    /// 暂缓提醒至 `until`（不含当天）
    pub fn snooze_alert(&self, alert_id: &str, until: NaiveDate, actor: &str) -> ApiResult<AlertState> {
        let actor = require_actor(actor)?;
        let (alert, today) = self.find_alert(alert_id)?;
        ensure_resolvable(&alert)?;
        if until <= today {
            return Err(ApiError::InvalidInput(format!(
                "暂缓日期必须晚于 {}: {}",
                today, until
            )));
        }

        let state = self.alert_state_repo.snooze(alert_id, until, actor)?;
        self.hide_in_board(alert_id)?;
        info!(alert_id, %until, actor, "提醒已暂缓");
        Ok(state)
    }

    /// 标记提醒已处理（到期日变化后会重新出现）
    pub fn resolve_alert(&self, alert_id: &str, actor: &str) -> ApiResult<AlertState> {
        let actor = require_actor(actor)?;
        let (alert, _) = self.find_alert(alert_id)?;
        ensure_resolvable(&alert)?;

        let state = self.alert_state_repo.resolve(alert_id, alert.due_date, actor)?;
        self.hide_in_board(alert_id)?;
        info!(alert_id, actor, "提醒已处理");
        Ok(state)
    }

    /// 撤销暂缓/处理（下次刷新生效）
    pub fn reopen_alert(&self, alert_id: &str) -> ApiResult<bool> {
        Ok(self.alert_state_repo.clear(alert_id)?)
    }

    // ==========================================
    // 任务
    // ==========================================

    pub fn complete_task(&self, task_id: &str) -> ApiResult<()> {
        self.task_repo.update_status(task_id, TaskStatus::Completed)?;
        Ok(())
    }

    pub fn cancel_task(&self, task_id: &str) -> ApiResult<()> {
        self.task_repo.update_status(task_id, TaskStatus::Cancelled)?;
        Ok(())
    }

    pub fn list_open_tasks(&self) -> ApiResult<Vec<Task>> {
        Ok(self.task_repo.list_open()?)
    }
}

fn require_actor(actor: &str) -> ApiResult<&str> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
    }
    Ok(actor)
}

fn ensure_resolvable(alert: &Alert) -> ApiResult<()> {
    if !alert.resolvable {
        return Err(ApiError::BusinessRuleViolation(format!(
            "提醒 {} 不能暂缓或手动处理,需先解决实际问题",
            alert.id
        )));
    }
    Ok(())
}
