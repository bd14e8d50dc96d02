// ==========================================
// MooTracker 牧场管理系统 - 任务落地接口
// ==========================================
// 职责: 定义"提醒 → 任务"的落地 trait,实现依赖倒置
// 说明: Engine 层定义 trait,Repository 层 (TaskRepository) 实现
// ==========================================

use crate::domain::alert::Alert;
use crate::domain::task::{TaskId, TaskOverrides};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 任务落地 Trait
// ==========================================

/// 提醒转任务的接收方
///
/// # 实现说明
/// - `TaskRepository` 将任务写入 task 表
/// - 任务一旦创建即独立于提醒存在
pub trait TaskSink: Send + Sync {
    /// 根据提醒创建任务
    ///
    /// # 参数
    /// - `alert`: 来源提醒
    /// - `overrides`: 用户覆写（标题/到期日/优先级/备注）
    ///
    /// # 返回
    /// - `Ok(task_id)`: 新任务ID（不支持时为空字符串）
    /// - `Err`: 创建失败
    fn create_from_alert(
        &self,
        alert: &Alert,
        overrides: TaskOverrides,
    ) -> Result<TaskId, Box<dyn Error + Send + Sync>>;
}

/// 空操作任务接收方
///
/// 用于不需要落地任务的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpTaskSink;

impl TaskSink for NoOpTaskSink {
    fn create_from_alert(
        &self,
        alert: &Alert,
        _overrides: TaskOverrides,
    ) -> Result<TaskId, Box<dyn Error + Send + Sync>> {
        tracing::debug!("NoOpTaskSink: 跳过任务创建 - alert_id={}", alert.id);
        Ok(TaskId::new())
    }
}

/// 可选的任务接收方包装
pub struct OptionalTaskSink {
    inner: Option<Arc<dyn TaskSink>>,
}

impl OptionalTaskSink {
    pub fn with_sink(sink: Arc<dyn TaskSink>) -> Self {
        Self { inner: Some(sink) }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 创建任务（未配置接收方时返回空ID）
    pub fn create_from_alert(
        &self,
        alert: &Alert,
        overrides: TaskOverrides,
    ) -> Result<TaskId, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(sink) => sink.create_from_alert(alert, overrides),
            None => {
                tracing::debug!("OptionalTaskSink: 未配置接收方,跳过 - alert_id={}", alert.id);
                Ok(TaskId::new())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalTaskSink {
    fn default() -> Self {
        Self::none()
    }
}
