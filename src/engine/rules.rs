// ==========================================
// MooTracker 牧场管理系统 - 单头牛只规则表
// ==========================================
// 职责: 声明式规则表 (谓词 + 提醒类型 + 优先级)
// 红线: 规则之间不共享可变状态;同优先级按声明顺序展示
// 红线: 妊娠相关规则必须 pregnancy_status=Pregnant 且有预产期
// ==========================================
// 规则一览 (阈值见 ClassifierConfig):
//   耳标+疫苗      哺乳中       日龄 ∈ [15, 30]          Critical
//   断奶           哺乳中       月龄 ∈ [6, 8]            Critical
//   育成转群       已断奶       月龄 ∈ [12, 24)          High
//   母牛成年       已断奶,母    月龄 ≥ 24                High
//   公牛可出售     已断奶,公    月龄 ≥ 24                Medium
//   妊娠检查       妊娠,配种后  天数 ∈ [75, 90]          High
//   妊娠检查超期   妊娠,配种后  天数 > 90                Critical
//   产前减料       妊娠,妊娠群  距预产期 ∈ [0, 14]       High
//   RCC 疫苗       妊娠         距预产期 ∈ [0, 42]       Critical
//   转入产房       妊娠         距预产期 ∈ [0, 7]        High
//   超期未产       妊娠         today > 预产期           Urgent
// ==========================================

use crate::config::ClassifierConfig;
use crate::domain::animal::AnimalSnapshot;
use crate::domain::pen::PenSnapshot;
use crate::domain::types::{AlertPriority, AlertType, AnimalCategory, EventTag, PenFunction, Sex};
use crate::engine::age::{days_since, days_until, months_since, plus_days, plus_months};
use chrono::NaiveDate;

// ==========================================
// 规则输入 / 输出
// ==========================================

/// 单次规则判定的上下文
pub struct RuleContext<'a> {
    pub animal: &'a AnimalSnapshot,
    pub pen: Option<&'a PenSnapshot>, // 牛只所在圈舍（圈舍未在输入中则为 None）
    pub today: NaiveDate,
    pub config: &'a ClassifierConfig,
}

/// 规则命中结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub alert_type: AlertType,
    pub due_date: NaiveDate,
    pub message_args: Vec<(&'static str, String)>,
}

/// 规则判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Fire(RuleHit),
    /// 前提条件不满足（正常情况）
    NotApplicable,
    /// 缺少可选字段,按规则不触发（仅记录 debug 日志）
    Skip { missing: &'static str },
}

/// 规则表条目
pub struct AnimalRule {
    pub name: &'static str,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub evaluate: fn(&RuleContext<'_>) -> RuleOutcome,
}

// ==========================================
// 规则表 (声明顺序即同级展示顺序)
// ==========================================
pub static ANIMAL_RULES: &[AnimalRule] = &[
    AnimalRule {
        name: "ear_tag_bundle",
        alert_type: AlertType::EarTagDue,
        priority: AlertPriority::Critical,
        evaluate: ear_tag_bundle,
    },
    AnimalRule {
        name: "weaning",
        alert_type: AlertType::WeaningDue,
        priority: AlertPriority::Critical,
        evaluate: weaning,
    },
    AnimalRule {
        name: "age_transition_12",
        alert_type: AlertType::AgeTransition12Months,
        priority: AlertPriority::High,
        evaluate: age_transition_12,
    },
    AnimalRule {
        name: "breeding_ready_female",
        alert_type: AlertType::AgeTransition24Months,
        priority: AlertPriority::High,
        evaluate: breeding_ready_female,
    },
    AnimalRule {
        name: "sale_ready_male",
        alert_type: AlertType::SaleReady,
        priority: AlertPriority::Medium,
        evaluate: sale_ready_male,
    },
    AnimalRule {
        name: "pregnancy_check_due",
        alert_type: AlertType::PregnancyCheckDue,
        priority: AlertPriority::High,
        evaluate: pregnancy_check_due,
    },
    AnimalRule {
        name: "pregnancy_check_overdue",
        alert_type: AlertType::PregnancyCheckOverdue,
        priority: AlertPriority::Critical,
        evaluate: pregnancy_check_overdue,
    },
    AnimalRule {
        name: "feed_withdrawal",
        alert_type: AlertType::FeedWithdrawalDue,
        priority: AlertPriority::High,
        evaluate: feed_withdrawal,
    },
    AnimalRule {
        name: "rcc_vaccine",
        alert_type: AlertType::RccVaccineDue,
        priority: AlertPriority::Critical,
        evaluate: rcc_vaccine,
    },
    AnimalRule {
        name: "move_to_maternity",
        alert_type: AlertType::MoveToMaternityDue,
        priority: AlertPriority::High,
        evaluate: move_to_maternity,
    },
    AnimalRule {
        name: "birth_overdue",
        alert_type: AlertType::BirthOverdue,
        priority: AlertPriority::Urgent,
        evaluate: birth_overdue,
    },
];

/// 到期日超出日期范围时按缺少数据处理,不触发
fn hit(
    alert_type: AlertType,
    due_date: Option<NaiveDate>,
    args: Vec<(&'static str, String)>,
) -> RuleOutcome {
    let due_date = match due_date {
        Some(d) => d,
        None => return RuleOutcome::Skip { missing: "due_date" },
    };
    RuleOutcome::Fire(RuleHit {
        alert_type,
        due_date,
        message_args: args,
    })
}

fn birth_date(ctx: &RuleContext<'_>) -> Result<NaiveDate, RuleOutcome> {
    ctx.animal
        .birth_date
        .ok_or(RuleOutcome::Skip { missing: "birth_date" })
}

// ==========================================
// 犊牛规则
// ==========================================

/// 耳标 + BoviPast 疫苗（同一窗口,一次只提示一项）
///
/// 耳标已记录后改为提示疫苗;两者都记录则不再提示
fn ear_tag_bundle(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.animal.is_nursing() {
        return RuleOutcome::NotApplicable;
    }
    let birth = match birth_date(ctx) {
        Ok(d) => d,
        Err(skip) => return skip,
    };

    let age_days = days_since(birth, ctx.today);
    if age_days < ctx.config.ear_tag_min_days || age_days > ctx.config.ear_tag_max_days {
        return RuleOutcome::NotApplicable;
    }

    let due = match plus_days(birth, ctx.config.ear_tag_min_days) {
        Some(d) => d,
        None => return RuleOutcome::Skip { missing: "due_date" },
    };
    let args = vec![
        ("id", ctx.animal.display_id().to_string()),
        ("days", age_days.to_string()),
    ];

    if !ctx.animal.has_event_since(EventTag::EarTag, due) {
        return hit(AlertType::EarTagDue, Some(due), args);
    }
    if !ctx.animal.has_event_since(EventTag::Vaccination, due) {
        return hit(AlertType::VaccinationDue15Days, Some(due), args);
    }
    RuleOutcome::NotApplicable
}

fn weaning(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.animal.is_nursing() {
        return RuleOutcome::NotApplicable;
    }
    if matches!(ctx.animal.weaning_date, Some(w) if w <= ctx.today) {
        return RuleOutcome::NotApplicable;
    }
    let birth = match birth_date(ctx) {
        Ok(d) => d,
        Err(skip) => return skip,
    };

    let months = months_since(birth, ctx.today);
    if months < ctx.config.weaning_min_months || months > ctx.config.weaning_max_months {
        return RuleOutcome::NotApplicable;
    }

    hit(
        AlertType::WeaningDue,
        plus_months(birth, ctx.config.weaning_min_months),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("months", months.to_string()),
        ],
    )
}

// ==========================================
// 转群 / 出售规则
// ==========================================

fn age_transition_12(ctx: &RuleContext<'_>) -> RuleOutcome {
    if ctx.animal.is_nursing() {
        return RuleOutcome::NotApplicable;
    }
    let birth = match birth_date(ctx) {
        Ok(d) => d,
        Err(skip) => return skip,
    };

    let months = months_since(birth, ctx.today);
    if months < ctx.config.transition_min_months || months >= ctx.config.adult_months {
        return RuleOutcome::NotApplicable;
    }

    hit(
        AlertType::AgeTransition12Months,
        plus_months(birth, ctx.config.transition_min_months),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("months", months.to_string()),
        ],
    )
}

/// 24 月龄母牛: 可进入配种群 (tenyész)
fn breeding_ready_female(ctx: &RuleContext<'_>) -> RuleOutcome {
    if ctx.animal.is_nursing()
        || ctx.animal.sex != Sex::Female
        || ctx.animal.category.is_breeding_female()
    {
        return RuleOutcome::NotApplicable;
    }
    adult_hit(ctx, AlertType::AgeTransition24Months)
}

/// 24 月龄公牛: 可出售（种公牛除外）
fn sale_ready_male(ctx: &RuleContext<'_>) -> RuleOutcome {
    if ctx.animal.is_nursing()
        || ctx.animal.sex != Sex::Male
        || ctx.animal.category == AnimalCategory::BreedingBull
    {
        return RuleOutcome::NotApplicable;
    }
    adult_hit(ctx, AlertType::SaleReady)
}

fn adult_hit(ctx: &RuleContext<'_>, alert_type: AlertType) -> RuleOutcome {
    let birth = match birth_date(ctx) {
        Ok(d) => d,
        Err(skip) => return skip,
    };

    let months = months_since(birth, ctx.today);
    if months < ctx.config.adult_months {
        return RuleOutcome::NotApplicable;
    }

    hit(
        alert_type,
        plus_months(birth, ctx.config.adult_months),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("months", months.to_string()),
        ],
    )
}

// ==========================================
// 妊娠检查规则 (VV)
// ==========================================

/// 配种日期 + 尚未做过检查时的配种后天数
fn days_since_unchecked_pairing(ctx: &RuleContext<'_>) -> Result<(NaiveDate, i64), RuleOutcome> {
    if !ctx.animal.is_pregnant() {
        return Err(RuleOutcome::NotApplicable);
    }
    let pairing = ctx
        .animal
        .pairing_date
        .ok_or(RuleOutcome::Skip { missing: "pairing_date" })?;
    if matches!(ctx.animal.vv_date, Some(vv) if vv >= pairing) {
        return Err(RuleOutcome::NotApplicable);
    }
    Ok((pairing, days_since(pairing, ctx.today)))
}

fn pregnancy_check_due(ctx: &RuleContext<'_>) -> RuleOutcome {
    let (pairing, days) = match days_since_unchecked_pairing(ctx) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    if days < ctx.config.vv_window_start_days || days > ctx.config.vv_window_end_days {
        return RuleOutcome::NotApplicable;
    }

    hit(
        AlertType::PregnancyCheckDue,
        plus_days(pairing, ctx.config.vv_window_start_days),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("days", days.to_string()),
        ],
    )
}

fn pregnancy_check_overdue(ctx: &RuleContext<'_>) -> RuleOutcome {
    let (pairing, days) = match days_since_unchecked_pairing(ctx) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    if days <= ctx.config.vv_window_end_days {
        return RuleOutcome::NotApplicable;
    }

    hit(
        AlertType::PregnancyCheckOverdue,
        plus_days(pairing, ctx.config.vv_window_end_days),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("days", days.to_string()),
        ],
    )
}

// ==========================================
// 产前规则 (以预产期为基准)
// ==========================================

fn expected_birth(ctx: &RuleContext<'_>) -> Result<NaiveDate, RuleOutcome> {
    if !ctx.animal.is_pregnant() {
        return Err(RuleOutcome::NotApplicable);
    }
    ctx.animal
        .expected_birth_date
        .ok_or(RuleOutcome::Skip { missing: "expected_birth_date" })
}

/// 距预产期 ∈ [0, window] 时命中,到期日 = 预产期 - window
fn pre_birth_window(ctx: &RuleContext<'_>, alert_type: AlertType, window: i64) -> RuleOutcome {
    let expected = match expected_birth(ctx) {
        Ok(d) => d,
        Err(outcome) => return outcome,
    };

    let remaining = days_until(expected, ctx.today);
    if remaining < 0 || remaining > window {
        return RuleOutcome::NotApplicable;
    }

    hit(
        alert_type,
        plus_days(expected, -window),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("days", remaining.to_string()),
        ],
    )
}

/// 产前减料: 仅对妊娠群 (产前过渡) 中的牛只
fn feed_withdrawal(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.animal.is_pregnant() {
        return RuleOutcome::NotApplicable;
    }
    let pen = match ctx.pen {
        Some(p) => p,
        None => return RuleOutcome::Skip { missing: "current_pen_id" },
    };
    if pen.current_function != PenFunction::PregnantGroup {
        return RuleOutcome::NotApplicable;
    }
    pre_birth_window(ctx, AlertType::FeedWithdrawalDue, ctx.config.feed_withdrawal_days)
}

fn rcc_vaccine(ctx: &RuleContext<'_>) -> RuleOutcome {
    pre_birth_window(ctx, AlertType::RccVaccineDue, ctx.config.rcc_vaccine_days)
}

/// 转入产房: 已在产房的不再提示
fn move_to_maternity(ctx: &RuleContext<'_>) -> RuleOutcome {
    if matches!(ctx.pen, Some(p) if p.current_function == PenFunction::Maternity) {
        return RuleOutcome::NotApplicable;
    }
    pre_birth_window(ctx, AlertType::MoveToMaternityDue, ctx.config.maternity_move_days)
}

fn birth_overdue(ctx: &RuleContext<'_>) -> RuleOutcome {
    let expected = match expected_birth(ctx) {
        Ok(d) => d,
        Err(outcome) => return outcome,
    };
    if ctx.today <= expected {
        return RuleOutcome::NotApplicable;
    }

    hit(
        AlertType::BirthOverdue,
        Some(expected),
        vec![
            ("id", ctx.animal.display_id().to_string()),
            ("days", days_since(expected, ctx.today).to_string()),
        ],
    )
}
