// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Duration, NaiveDate};
use moo_tracker::domain::animal::{AnimalSnapshot, EventLogEntry};
use moo_tracker::domain::pen::PenSnapshot;
use moo_tracker::domain::types::{
    AnimalCategory, AnimalStatus, EventTag, PenFunction, PenType, PregnancyStatus, Sex,
};

/// 测试基准日
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

pub fn days_ago(n: i64) -> NaiveDate {
    today() - Duration::days(n)
}

pub fn days_ahead(n: i64) -> NaiveDate {
    today() + Duration::days(n)
}

// ==========================================
// AnimalSnapshot 构建器
// ==========================================

pub struct AnimalBuilder {
    animal: AnimalSnapshot,
}

impl AnimalBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            animal: AnimalSnapshot::new(id, Sex::Female, AnimalCategory::HeiferVirgin, None),
        }
    }

    /// 在哺乳期的犊牛
    pub fn calf(id: &str, age_days: i64) -> Self {
        Self::new(id)
            .category(AnimalCategory::CalfFemale)
            .born_days_ago(age_days)
            .mother("M1")
    }

    /// 怀孕母牛
    pub fn pregnant_cow(id: &str, expected_birth: NaiveDate) -> Self {
        Self::new(id)
            .category(AnimalCategory::Cow)
            .born_days_ago(1500)
            .pregnancy(PregnancyStatus::Pregnant)
            .expected_birth(expected_birth)
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.animal.sex = sex;
        self
    }

    pub fn category(mut self, category: AnimalCategory) -> Self {
        self.animal.category = category;
        self
    }

    pub fn status(mut self, status: AnimalStatus) -> Self {
        self.animal.status = status;
        self
    }

    pub fn enar(mut self, enar: &str) -> Self {
        self.animal.enar = Some(enar.to_string());
        self
    }

    pub fn born_days_ago(mut self, days: i64) -> Self {
        self.animal.birth_date = Some(days_ago(days));
        self
    }

    pub fn mother(mut self, mother_id: &str) -> Self {
        self.animal.mother_id = Some(mother_id.to_string());
        self
    }

    pub fn pen(mut self, pen_id: &str) -> Self {
        self.animal.current_pen_id = Some(pen_id.to_string());
        self
    }

    pub fn pregnancy(mut self, status: PregnancyStatus) -> Self {
        self.animal.pregnancy_status = Some(status);
        self
    }

    pub fn paired(mut self, date: NaiveDate) -> Self {
        self.animal.pairing_date = Some(date);
        self
    }

    pub fn expected_birth(mut self, date: NaiveDate) -> Self {
        self.animal.expected_birth_date = Some(date);
        self
    }

    pub fn event(mut self, tag: EventTag, date: NaiveDate) -> Self {
        self.animal.last_event_log.push(EventLogEntry::new(tag, date));
        self
    }

    pub fn build(self) -> AnimalSnapshot {
        self.animal
    }
}

// ==========================================
// PenSnapshot 构建器
// ==========================================

pub struct PenBuilder {
    pen: PenSnapshot,
}

impl PenBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            pen: PenSnapshot::new(id, id.trim_start_matches('P'), PenType::Barn, 10, PenFunction::Fattening),
        }
    }

    pub fn pen_type(mut self, pen_type: PenType) -> Self {
        self.pen.pen_type = pen_type;
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.pen.capacity = capacity;
        self
    }

    pub fn function(mut self, function: PenFunction) -> Self {
        self.pen.current_function = function;
        self
    }

    pub fn occupants(mut self, ids: &[&str]) -> Self {
        self.pen.occupant_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> PenSnapshot {
        self.pen
    }
}
