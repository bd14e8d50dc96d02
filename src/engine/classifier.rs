// ==========================================
// MooTracker 牧场管理系统 - 事件提醒引擎
// ==========================================
// 职责: 牛只/圈舍快照 + today → 去重、排序后的提醒列表
// 红线: 纯函数;无 I/O,无共享可变状态,不修改输入
// 红线: 同一 (主体, 提醒类型) 每次调用至多一条提醒
// 红线: 非在群牛只不产生、也不出现在任何提醒中
// ==========================================
// 流程:
//   1) 结构校验（失败即整体返回错误）
//   2) 逐头牛只执行规则表 + 事件日志抑制
//   3) 可汇总类型按圈舍合并
//   4) 圈舍级规则
//   5) 按 ID 去重（先到者保留）
//   6) 稳定排序: 优先级降序 → 到期日升序 → 插入顺序
// ==========================================

use crate::config::ClassifierConfig;
use crate::domain::alert::Alert;
use crate::domain::animal::AnimalSnapshot;
use crate::domain::pen::PenSnapshot;
use crate::domain::types::{AlertPriority, AlertType, SubjectType, ALL_ALERT_TYPES};
use crate::engine::error::{ClassifierError, ClassifierResult};
use crate::engine::pen_rules::{aggregate_members, evaluate_pen, PenMember};
use crate::engine::rules::{RuleContext, RuleOutcome, ANIMAL_RULES};
use crate::i18n::t_with_args;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument};

/// 单头牛只的一条规则命中（已通过抑制检查）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalHit {
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub due_date: NaiveDate,
    pub message: String,
}

// ==========================================
// EventClassifier - 事件提醒引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct EventClassifier {
    config: ClassifierConfig,
}

impl EventClassifier {
    /// 使用指定阈值创建引擎（阈值不合法时返回错误）
    pub fn new(config: ClassifierConfig) -> ClassifierResult<Self> {
        config.validate().map_err(ClassifierError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算提醒列表
    ///
    /// # 参数
    /// - `animals`: 牛只快照
    /// - `pens`: 圈舍快照
    /// - `today`: 判定基准日
    ///
    /// # 返回
    /// - Ok(Vec<Alert>): 已去重、已排序的提醒
    /// - Err(ClassifierError::Validation): 输入结构不合法（不返回部分结果）
    #[instrument(skip_all, fields(animals = animals.len(), pens = pens.len(), today = %today))]
    pub fn classify(
        &self,
        animals: &[AnimalSnapshot],
        pens: &[PenSnapshot],
        today: NaiveDate,
    ) -> ClassifierResult<Vec<Alert>> {
        let animal_ids = validate_animals(animals)?;
        validate_pens(pens, &animal_ids)?;

        let pen_index: HashMap<&str, &PenSnapshot> =
            pens.iter().map(|p| (p.id.as_str(), p)).collect();
        let inactive_ids: HashSet<&str> = animals
            .iter()
            .filter(|a| !a.is_active())
            .map(|a| a.id.as_str())
            .collect();

        let mut alerts: Vec<Alert> = Vec::new();
        let mut pen_buckets: HashMap<(&str, AlertType), Vec<PenMember>> = HashMap::new();

        // ===== 牛只级规则 =====
        for animal in animals.iter().filter(|a| a.is_active()) {
            let pen = animal
                .current_pen_id
                .as_deref()
                .and_then(|id| pen_index.get(id).copied());

            for hit in self.evaluate_animal(animal, pen, today) {
                match pen {
                    Some(p) if self.config.aggregate_in_pens && hit.alert_type.is_pen_aggregatable() => {
                        pen_buckets
                            .entry((p.id.as_str(), hit.alert_type))
                            .or_default()
                            .push(PenMember {
                                animal_id: animal.id.clone(),
                                due_date: hit.due_date,
                                priority: hit.priority,
                            });
                    }
                    _ => alerts.push(Alert::new(
                        SubjectType::Animal,
                        animal.id.clone(),
                        hit.alert_type,
                        hit.priority,
                        hit.due_date,
                        today,
                        BTreeSet::from([animal.id.clone()]),
                        hit.message,
                    )),
                }
            }
        }

        // ===== 圈舍级规则 + 汇总 (按输入顺序) =====
        for pen in pens {
            for alert_type in ALL_ALERT_TYPES {
                if let Some(members) = pen_buckets.get(&(pen.id.as_str(), alert_type)) {
                    if let Some(alert) = aggregate_members(pen, alert_type, members, today) {
                        alerts.push(alert);
                    }
                }
            }
            alerts.extend(evaluate_pen(pen, &inactive_ids, today));
        }

        let mut alerts = dedup_alerts(alerts);
        sort_alerts(&mut alerts);

        debug!(alert_count = alerts.len(), "提醒计算完成");
        Ok(alerts)
    }

    /// 从原始 JSON 计算提醒
    ///
    /// 集合不是数组、或某一项无法解析时返回 Validation 错误并指出下标
    pub fn classify_value(
        &self,
        animals: &Value,
        pens: &Value,
        today: NaiveDate,
    ) -> ClassifierResult<Vec<Alert>> {
        let animals: Vec<AnimalSnapshot> = parse_collection("animals", animals)?;
        let pens: Vec<PenSnapshot> = parse_collection("pens", pens)?;
        self.classify(&animals, &pens, today)
    }

    /// 对单头牛只执行规则表
    ///
    /// 已在事件日志中记录（到期日当天或之后）的事件不再提示;
    /// 缺少字段的规则只记 debug 日志
    pub fn evaluate_animal(
        &self,
        animal: &AnimalSnapshot,
        pen: Option<&PenSnapshot>,
        today: NaiveDate,
    ) -> Vec<AnimalHit> {
        if !animal.is_active() {
            return Vec::new();
        }

        let ctx = RuleContext {
            animal,
            pen,
            today,
            config: &self.config,
        };

        let mut hits: Vec<AnimalHit> = Vec::new();
        for rule in ANIMAL_RULES {
            match (rule.evaluate)(&ctx) {
                RuleOutcome::Fire(hit) => {
                    let handled = hit
                        .alert_type
                        .handled_by()
                        .map_or(false, |tag| animal.has_event_since(tag, hit.due_date));
                    if handled {
                        debug!(animal_id = %animal.id, rule = rule.name, "事件已记录,跳过提醒");
                        continue;
                    }
                    if hits.iter().any(|h| h.alert_type == hit.alert_type) {
                        continue;
                    }

                    let args: Vec<(&str, &str)> = hit
                        .message_args
                        .iter()
                        .map(|(k, v)| (*k, v.as_str()))
                        .collect();
                    hits.push(AnimalHit {
                        alert_type: hit.alert_type,
                        priority: rule.priority,
                        due_date: hit.due_date,
                        message: t_with_args(&hit.alert_type.message_key(), &args),
                    });
                }
                RuleOutcome::Skip { missing } => {
                    debug!(animal_id = %animal.id, rule = rule.name, missing, "缺少字段,规则跳过");
                }
                RuleOutcome::NotApplicable => {}
            }
        }
        hits
    }
}

// ==========================================
// 结构校验
// ==========================================

/// 返回全部牛只 id,供圈舍校验使用
fn validate_animals(animals: &[AnimalSnapshot]) -> ClassifierResult<HashSet<&str>> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(animals.len());
    for (index, animal) in animals.iter().enumerate() {
        if animal.id.trim().is_empty() {
            return Err(ClassifierError::at("animals", index, "id 为空"));
        }
        if !seen.insert(animal.id.as_str()) {
            return Err(ClassifierError::at(
                "animals",
                index,
                format!("id 重复: {}", animal.id),
            ));
        }
    }
    Ok(seen)
}

/// 圈舍 id 不能与牛只 id 相同: (subject_id, alert_type) 在整次输出中唯一
fn validate_pens(pens: &[PenSnapshot], animal_ids: &HashSet<&str>) -> ClassifierResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(pens.len());
    for (index, pen) in pens.iter().enumerate() {
        if pen.id.trim().is_empty() {
            return Err(ClassifierError::at("pens", index, "id 为空"));
        }
        if !seen.insert(pen.id.as_str()) {
            return Err(ClassifierError::at("pens", index, format!("id 重复: {}", pen.id)));
        }
        if animal_ids.contains(pen.id.as_str()) {
            return Err(ClassifierError::at(
                "pens",
                index,
                format!("id 与牛只 id 冲突: {}", pen.id),
            ));
        }
        if pen.capacity == 0 {
            return Err(ClassifierError::at("pens", index, "容量必须大于 0"));
        }
    }
    Ok(())
}

fn parse_collection<T: DeserializeOwned>(
    collection: &'static str,
    value: &Value,
) -> ClassifierResult<Vec<T>> {
    let items = value.as_array().ok_or_else(|| ClassifierError::Validation {
        collection,
        index: None,
        reason: "不是数组".to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item.clone())
                .map_err(|e| ClassifierError::at(collection, index, e.to_string()))
        })
        .collect()
}

// ==========================================
// 去重 / 排序
// ==========================================

/// 按提醒ID去重,保留先出现的一条
pub fn dedup_alerts(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut seen: HashSet<String> = HashSet::with_capacity(alerts.len());
    alerts
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect()
}

/// 稳定排序: 优先级降序 → 到期日升序 → 原有顺序
///
/// 合并多次调用的结果后,调用方需要重新执行本排序
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by_key(|a| (Reverse(a.priority), a.due_date));
}
