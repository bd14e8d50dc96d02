// ==========================================
// MooTracker 牧场管理系统 - 引擎层错误类型
// ==========================================
// 说明: 缺少可选字段不是错误（规则直接不触发）;
//       只有输入集合结构不合法才会使整次判定失败
// ==========================================

use thiserror::Error;

/// 提醒引擎错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// 输入集合结构不合法（整次调用失败,不产生部分结果）
    #[error("输入校验失败: {collection}{}: {reason}", index_suffix(.index))]
    Validation {
        collection: &'static str,
        index: Option<usize>,
        reason: String,
    },

    /// 阈值配置不合法
    #[error("规则配置无效: {0}")]
    InvalidConfig(String),
}

impl ClassifierError {
    pub(crate) fn at(collection: &'static str, index: usize, reason: impl Into<String>) -> Self {
        ClassifierError::Validation {
            collection,
            index: Some(index),
            reason: reason.into(),
        }
    }
}

fn index_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!("[{}]", i)).unwrap_or_default()
}

/// Result 类型别名
pub type ClassifierResult<T> = Result<T, ClassifierError>;
