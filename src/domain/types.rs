// ==========================================
// MooTracker 牧场管理系统 - 领域类型定义
// ==========================================
// 职责: 牛只/圈舍/提醒相关的枚举类型
// 约定: 数据库存储使用 SCREAMING_SNAKE_CASE,
//       提醒类型对外序列化使用 kebab-case
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 为枚举生成 `to_db_str` / `from_db_str` / `Display`
macro_rules! db_enum {
    ($name:ident { $($variant:ident => $db:literal),+ $(,)? }) => {
        impl $name {
            /// 转换为数据库存储的字符串
            pub fn to_db_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $db,)+
                }
            }

            /// 从数据库字符串解析（大小写不敏感）
            pub fn from_db_str(s: &str) -> Option<Self> {
                match s.trim().to_uppercase().as_str() {
                    $($db => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_db_str())
            }
        }
    };
}

// ==========================================
// 性别 (Sex)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Female, // 母
    Male,   // 公
}

db_enum!(Sex { Female => "FEMALE", Male => "MALE" });

// ==========================================
// 牛只类别 (Animal Category)
// ==========================================
// 生命阶段/用途标签,决定适用哪些规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimalCategory {
    CalfFemale,     // 母犊
    CalfMale,       // 公犊
    HeiferVirgin,   // 未配种青年母牛
    HeiferPregnant, // 妊娠青年母牛
    Cow,            // 成母牛
    FatteningBull,  // 育肥公牛
    BreedingBull,   // 种公牛
}

db_enum!(AnimalCategory {
    CalfFemale => "CALF_FEMALE",
    CalfMale => "CALF_MALE",
    HeiferVirgin => "HEIFER_VIRGIN",
    HeiferPregnant => "HEIFER_PREGNANT",
    Cow => "COW",
    FatteningBull => "FATTENING_BULL",
    BreedingBull => "BREEDING_BULL",
});

impl AnimalCategory {
    /// 已进入繁殖群的母牛（不再提示 24 月龄转群）
    pub fn is_breeding_female(&self) -> bool {
        matches!(self, AnimalCategory::Cow | AnimalCategory::HeiferPregnant)
    }
}

// ==========================================
// 牛只状态 (Animal Status)
// ==========================================
// 红线: 非 Active 牛只不参与任何提醒判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimalStatus {
    Active,      // 在群
    Sold,        // 已售
    Deceased,    // 死亡
    Quarantined, // 隔离
}

db_enum!(AnimalStatus {
    Active => "ACTIVE",
    Sold => "SOLD",
    Deceased => "DECEASED",
    Quarantined => "QUARANTINED",
});

impl AnimalStatus {
    /// 是否仍在场内（占用圈位）
    pub fn is_on_farm(&self) -> bool {
        matches!(self, AnimalStatus::Active | AnimalStatus::Quarantined)
    }
}

// ==========================================
// 妊娠状态 (Pregnancy Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PregnancyStatus {
    Pregnant,   // 已确认妊娠
    Open,       // 空怀
    EarlySigns, // 疑似妊娠
    None,       // 未检查
}

db_enum!(PregnancyStatus {
    Pregnant => "PREGNANT",
    Open => "OPEN",
    EarlySigns => "EARLY_SIGNS",
    None => "NONE",
});

// ==========================================
// 圈舍物理类型 (Pen Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PenType {
    Outdoor,  // 室外围栏
    Barn,     // 牛舍
    Birthing, // 产房
}

db_enum!(PenType {
    Outdoor => "OUTDOOR",
    Barn => "BARN",
    Birthing => "BIRTHING",
});

// ==========================================
// 圈舍当前功能 (Pen Function)
// ==========================================
// 与物理类型无关,随饲养安排变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PenFunction {
    Empty,         // 空置
    Harem,         // 配种群 (hárem)
    PregnantGroup, // 妊娠群 (产前过渡)
    Maternity,     // 产房
    Nursery,       // 犊牛
    WeanedYoung,   // 断奶犊牛
    Fattening,     // 育肥
    Hospital,      // 病号
    Quarantine,    // 隔离
    Cull,          // 淘汰
    Transitional,  // 过渡
}

db_enum!(PenFunction {
    Empty => "EMPTY",
    Harem => "HAREM",
    PregnantGroup => "PREGNANT_GROUP",
    Maternity => "MATERNITY",
    Nursery => "NURSERY",
    WeanedYoung => "WEANED_YOUNG",
    Fattening => "FATTENING",
    Hospital => "HOSPITAL",
    Quarantine => "QUARANTINE",
    Cull => "CULL",
    Transitional => "TRANSITIONAL",
});

// ==========================================
// 提醒优先级 (Alert Priority)
// ==========================================
// 顺序: Low < Medium < High < Critical < Urgent (全序,用于排序和配色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
    Urgent,
}

db_enum!(AlertPriority {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Critical => "CRITICAL",
    Urgent => "URGENT",
});

// ==========================================
// 提醒主体类型 (Subject Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectType {
    Animal,
    Pen,
}

db_enum!(SubjectType { Animal => "ANIMAL", Pen => "PEN" });

impl SubjectType {
    /// 提醒ID中使用的前缀
    pub fn as_id_prefix(&self) -> &'static str {
        match self {
            SubjectType::Animal => "animal",
            SubjectType::Pen => "pen",
        }
    }
}

// ==========================================
// 提醒类型 (Alert Type) - 封闭集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    EarTagDue,
    WeaningDue,
    PregnancyCheckDue,
    PregnancyCheckOverdue,
    #[serde(rename = "vaccination-due-15-days")]
    VaccinationDue15Days,
    RccVaccineDue,
    FeedWithdrawalDue,
    MoveToMaternityDue,
    BirthOverdue,
    #[serde(rename = "age-transition-12-months")]
    AgeTransition12Months,
    #[serde(rename = "age-transition-24-months")]
    AgeTransition24Months,
    SaleReady,
    PenEmpty,
    PenOvercapacity,
}

impl AlertType {
    /// 对外标识 (kebab-case,与序列化一致)
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::EarTagDue => "ear-tag-due",
            AlertType::WeaningDue => "weaning-due",
            AlertType::PregnancyCheckDue => "pregnancy-check-due",
            AlertType::PregnancyCheckOverdue => "pregnancy-check-overdue",
            AlertType::VaccinationDue15Days => "vaccination-due-15-days",
            AlertType::RccVaccineDue => "rcc-vaccine-due",
            AlertType::FeedWithdrawalDue => "feed-withdrawal-due",
            AlertType::MoveToMaternityDue => "move-to-maternity-due",
            AlertType::BirthOverdue => "birth-overdue",
            AlertType::AgeTransition12Months => "age-transition-12-months",
            AlertType::AgeTransition24Months => "age-transition-24-months",
            AlertType::SaleReady => "sale-ready",
            AlertType::PenEmpty => "pen-empty",
            AlertType::PenOvercapacity => "pen-overcapacity",
        }
    }

    /// 从对外标识解析
    pub fn parse(s: &str) -> Option<Self> {
        ALL_ALERT_TYPES.iter().copied().find(|t| t.as_str() == s.trim())
    }

    /// 用户能否在底层数据不变的情况下手动关闭该提醒
    ///
    /// 超期未产犊、超员只能通过修正数据消除
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, AlertType::BirthOverdue | AlertType::PenOvercapacity)
    }

    /// 已记录即视为处理完成的事件标签（圈舍级提醒无对应标签）
    pub fn handled_by(&self) -> Option<EventTag> {
        match self {
            AlertType::EarTagDue => Some(EventTag::EarTag),
            AlertType::VaccinationDue15Days => Some(EventTag::Vaccination),
            AlertType::WeaningDue => Some(EventTag::Weaning),
            AlertType::PregnancyCheckDue | AlertType::PregnancyCheckOverdue => {
                Some(EventTag::PregnancyCheck)
            }
            AlertType::FeedWithdrawalDue => Some(EventTag::FeedWithdrawal),
            AlertType::RccVaccineDue => Some(EventTag::RccVaccine),
            AlertType::MoveToMaternityDue => Some(EventTag::MovedToMaternity),
            AlertType::BirthOverdue => Some(EventTag::Birth),
            AlertType::AgeTransition12Months | AlertType::AgeTransition24Months => {
                Some(EventTag::Transfer)
            }
            AlertType::SaleReady => Some(EventTag::Sale),
            AlertType::PenEmpty | AlertType::PenOvercapacity => None,
        }
    }

    /// 可在圈舍维度汇总的提醒类型
    pub fn is_pen_aggregatable(&self) -> bool {
        matches!(
            self,
            AlertType::WeaningDue
                | AlertType::AgeTransition12Months
                | AlertType::AgeTransition24Months
                | AlertType::SaleReady
        )
    }

    /// i18n 消息键
    pub fn message_key(&self) -> String {
        format!("alerts.{}", self.as_str())
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 全部提醒类型（声明顺序）
pub const ALL_ALERT_TYPES: [AlertType; 14] = [
    AlertType::EarTagDue,
    AlertType::WeaningDue,
    AlertType::PregnancyCheckDue,
    AlertType::PregnancyCheckOverdue,
    AlertType::VaccinationDue15Days,
    AlertType::RccVaccineDue,
    AlertType::FeedWithdrawalDue,
    AlertType::MoveToMaternityDue,
    AlertType::BirthOverdue,
    AlertType::AgeTransition12Months,
    AlertType::AgeTransition24Months,
    AlertType::SaleReady,
    AlertType::PenEmpty,
    AlertType::PenOvercapacity,
];

// ==========================================
// 事件标签 (Event Tag)
// ==========================================
// 结构化事件日志,替代在备注里搜索关键字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventTag {
    EarTag,           // 打耳标
    Vaccination,      // 犊牛疫苗 (BoviPast)
    Weaning,          // 断奶
    PregnancyCheck,   // 妊娠检查 (VV)
    FeedWithdrawal,   // 产前减料
    RccVaccine,       // RCC 疫苗
    MovedToMaternity, // 转入产房
    Birth,            // 产犊
    Transfer,         // 转群
    Sale,             // 出售
}

db_enum!(EventTag {
    EarTag => "EAR_TAG",
    Vaccination => "VACCINATION",
    Weaning => "WEANING",
    PregnancyCheck => "PREGNANCY_CHECK",
    FeedWithdrawal => "FEED_WITHDRAWAL",
    RccVaccine => "RCC_VACCINE",
    MovedToMaternity => "MOVED_TO_MATERNITY",
    Birth => "BIRTH",
    Transfer => "TRANSFER",
    Sale => "SALE",
});

// ==========================================
// 任务状态 (Task Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,      // 待办
    Completed, // 已完成
    Cancelled, // 已取消
}

db_enum!(TaskStatus {
    Open => "OPEN",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

// ==========================================
// 提醒处理状态 (Alert State Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStateKind {
    Snoozed,  // 暂缓
    Resolved, // 已处理
}

db_enum!(AlertStateKind {
    Snoozed => "SNOOZED",
    Resolved => "RESOLVED",
});
