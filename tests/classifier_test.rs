// ==========================================
// 提醒引擎集成测试
// ==========================================
// 测试范围: 规则表 → 事件日志抑制 → 圈舍汇总 → 去重 → 排序
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use moo_tracker::config::ClassifierConfig;
use moo_tracker::domain::types::{
    AlertPriority, AlertType, AnimalCategory, AnimalStatus, EventTag, PenFunction, PenType,
    PregnancyStatus, Sex, SubjectType,
};
use moo_tracker::engine::{ClassifierError, EventClassifier};
use moo_tracker::logging;
use serde_json::json;
use std::collections::HashSet;

fn classifier() -> EventClassifier {
    EventClassifier::default()
}

// ==========================================
// 场景: 单头牛只
// ==========================================

#[test]
fn test_scenario_calf_ear_tag_due() {
    logging::init_test();

    let animals = vec![AnimalBuilder::calf("A1", 20).build()];
    let alerts = classifier().classify(&animals, &[], today()).unwrap();

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.alert_type, AlertType::EarTagDue);
    assert_eq!(alert.subject_type, SubjectType::Animal);
    assert_eq!(alert.subject_id, "A1");
    assert_eq!(alert.priority, AlertPriority::Critical);
    assert_eq!(alert.id, "animal:A1:ear-tag-due");
    assert_eq!(alert.due_date, days_ago(5));
    assert_eq!(alert.days_overdue, 5);
    assert!(alert.affected_ids.contains("A1"));
}

#[test]
fn test_scenario_birth_overdue() {
    let mut animal = AnimalBuilder::pregnant_cow("A2", days_ago(3)).build();
    animal.birth_date = None;

    let alerts = classifier().classify(&[animal], &[], today()).unwrap();

    let overdue: Vec<_> = alerts
        .iter()
        .filter(|a| a.alert_type == AlertType::BirthOverdue)
        .collect();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].priority, AlertPriority::Urgent);
    assert_eq!(overdue[0].days_overdue, 3);
    assert_eq!(overdue[0].subject_id, "A2");
}

#[test]
fn test_scenario_empty_pen_by_type() {
    let outdoor = PenBuilder::new("P1").pen_type(PenType::Outdoor).capacity(10).build();
    let alerts = classifier().classify(&[], &[outdoor], today()).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::PenEmpty);
    assert_eq!(alerts[0].subject_id, "P1");
    assert_eq!(alerts[0].priority, AlertPriority::Low);

    let birthing = PenBuilder::new("P1").pen_type(PenType::Birthing).capacity(10).build();
    let alerts = classifier().classify(&[], &[birthing], today()).unwrap();
    assert!(alerts.is_empty());
}

// ==========================================
// 不变量
// ==========================================

fn mixed_herd() -> (Vec<moo_tracker::AnimalSnapshot>, Vec<moo_tracker::PenSnapshot>) {
    let animals = vec![
        AnimalBuilder::calf("C1", 20).pen("P1").build(),
        AnimalBuilder::calf("C2", 200).pen("P1").build(),
        AnimalBuilder::calf("C3", 195).pen("P1").build(),
        AnimalBuilder::new("B1")
            .sex(Sex::Male)
            .category(AnimalCategory::FatteningBull)
            .born_days_ago(750)
            .pen("P2")
            .build(),
        AnimalBuilder::new("H1").born_days_ago(400).pen("P2").build(),
        AnimalBuilder::pregnant_cow("K1", days_ahead(5)).pen("P3").build(),
        AnimalBuilder::pregnant_cow("K2", days_ago(10)).pen("P3").build(),
        AnimalBuilder::pregnant_cow("K3", days_ago(2)).build(),
        AnimalBuilder::calf("SOLD1", 20)
            .status(AnimalStatus::Sold)
            .pen("P2")
            .build(),
        AnimalBuilder::pregnant_cow("DEAD1", days_ago(30))
            .status(AnimalStatus::Deceased)
            .build(),
    ];
    let pens = vec![
        PenBuilder::new("P1").function(PenFunction::Nursery).occupants(&["C1", "C2", "C3"]).build(),
        PenBuilder::new("P2")
            .capacity(2)
            .occupants(&["B1", "H1", "SOLD1"])
            .build(),
        PenBuilder::new("P3").function(PenFunction::PregnantGroup).occupants(&["K1", "K2"]).build(),
        PenBuilder::new("P4").pen_type(PenType::Outdoor).build(),
    ];
    (animals, pens)
}

#[test]
fn test_idempotence() {
    let (animals, pens) = mixed_herd();
    let first = classifier().classify(&animals, &pens, today()).unwrap();
    let second = classifier().classify(&animals, &pens, today()).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_status_exclusion() {
    let (animals, pens) = mixed_herd();
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    for alert in &alerts {
        for inactive in ["SOLD1", "DEAD1"] {
            assert_ne!(alert.subject_id, inactive);
            assert!(!alert.affected_ids.contains(inactive), "{} in {}", inactive, alert.id);
        }
    }
}

#[test]
fn test_no_duplicate_alerts() {
    let (animals, pens) = mixed_herd();
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    let mut seen = HashSet::new();
    for alert in &alerts {
        assert!(
            seen.insert((alert.subject_id.clone(), alert.alert_type)),
            "duplicate {}",
            alert.id
        );
    }
}

#[test]
fn test_output_sorted_by_priority_then_due_date() {
    let (animals, pens) = mixed_herd();
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    for pair in alerts.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.priority >= b.priority, "{} before {}", a.id, b.id);
        if a.priority == b.priority {
            assert!(a.due_date <= b.due_date, "{} before {}", a.id, b.id);
        }
    }
    assert_eq!(alerts[0].alert_type, AlertType::BirthOverdue);
}

#[test]
fn test_monotonic_birth_overdue_priority() {
    let animals = vec![
        AnimalBuilder::pregnant_cow("X", days_ago(20)).build(),
        AnimalBuilder::pregnant_cow("Y", days_ago(1)).build(),
    ];
    let alerts = classifier().classify(&animals, &[], today()).unwrap();

    let priority_of = |id: &str| {
        alerts
            .iter()
            .find(|a| a.subject_id == id && a.alert_type == AlertType::BirthOverdue)
            .map(|a| a.priority)
            .unwrap()
    };
    assert!(priority_of("X") >= priority_of("Y"));

    let x = alerts.iter().find(|a| a.subject_id == "X").unwrap();
    let y = alerts.iter().find(|a| a.subject_id == "Y").unwrap();
    assert!(x.days_overdue > y.days_overdue);
}

#[test]
fn test_ear_tag_window_boundaries() {
    let fires = |age: i64| {
        let animals = vec![AnimalBuilder::calf("C", age).build()];
        classifier()
            .classify(&animals, &[], today())
            .unwrap()
            .iter()
            .any(|a| a.alert_type == AlertType::EarTagDue)
    };
    assert!(!fires(14));
    assert!(fires(15));
    assert!(fires(30));
    assert!(!fires(31));
}

#[test]
fn test_pen_capacity_boundary() {
    let at_capacity = PenBuilder::new("P1").capacity(2).occupants(&["A", "B"]).build();
    let alerts = classifier().classify(&[], &[at_capacity], today()).unwrap();
    assert!(alerts.iter().all(|a| a.alert_type != AlertType::PenOvercapacity));

    let over = PenBuilder::new("P1").capacity(2).occupants(&["A", "B", "C"]).build();
    let alerts = classifier().classify(&[], &[over], today()).unwrap();
    let over_alerts: Vec<_> = alerts
        .iter()
        .filter(|a| a.alert_type == AlertType::PenOvercapacity)
        .collect();
    assert_eq!(over_alerts.len(), 1);
    assert_eq!(over_alerts[0].priority, AlertPriority::High);
}

// ==========================================
// 事件日志抑制
// ==========================================

#[test]
fn test_ear_tag_then_vaccination_then_silence() {
    let due = days_ago(5);

    let tagged = AnimalBuilder::calf("C1", 20).event(EventTag::EarTag, due).build();
    let alerts = classifier().classify(&[tagged], &[], today()).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::VaccinationDue15Days);

    let done = AnimalBuilder::calf("C1", 20)
        .event(EventTag::EarTag, due)
        .event(EventTag::Vaccination, today())
        .build();
    assert!(classifier().classify(&[done], &[], today()).unwrap().is_empty());
}

#[test]
fn test_event_before_due_date_does_not_suppress() {
    let cow = AnimalBuilder::pregnant_cow("K1", days_ago(4))
        .event(EventTag::Birth, days_ago(400))
        .build();
    let alerts = classifier().classify(&[cow], &[], today()).unwrap();
    assert!(alerts.iter().any(|a| a.alert_type == AlertType::BirthOverdue));

    let calved = AnimalBuilder::pregnant_cow("K1", days_ago(4))
        .event(EventTag::Birth, days_ago(1))
        .build();
    let alerts = classifier().classify(&[calved], &[], today()).unwrap();
    assert!(alerts.iter().all(|a| a.alert_type != AlertType::BirthOverdue));
}

// ==========================================
// 繁殖规则
// ==========================================

#[test]
fn test_pregnancy_check_window_and_overdue() {
    let check = |days_since_pairing: i64| {
        let cow = AnimalBuilder::new("K1")
            .category(AnimalCategory::Cow)
            .born_days_ago(1500)
            .pregnancy(PregnancyStatus::Pregnant)
            .paired(days_ago(days_since_pairing))
            .build();
        classifier()
            .classify(&[cow], &[], today())
            .unwrap()
            .into_iter()
            .map(|a| (a.alert_type, a.priority))
            .collect::<Vec<_>>()
    };

    assert!(check(74).is_empty());
    assert_eq!(check(75), vec![(AlertType::PregnancyCheckDue, AlertPriority::High)]);
    assert_eq!(check(90), vec![(AlertType::PregnancyCheckDue, AlertPriority::High)]);
    assert_eq!(
        check(91),
        vec![(AlertType::PregnancyCheckOverdue, AlertPriority::Critical)]
    );
}

#[test]
fn test_pre_birth_alerts_respect_pen_function() {
    let pens = vec![
        PenBuilder::new("P1").function(PenFunction::PregnantGroup).occupants(&["K1"]).build(),
        PenBuilder::new("P2").function(PenFunction::Maternity).occupants(&["K2"]).build(),
    ];
    let animals = vec![
        AnimalBuilder::pregnant_cow("K1", days_ahead(5)).pen("P1").build(),
        AnimalBuilder::pregnant_cow("K2", days_ahead(5)).pen("P2").build(),
    ];
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    let types_for = |id: &str| {
        alerts
            .iter()
            .filter(|a| a.subject_id == id)
            .map(|a| a.alert_type)
            .collect::<HashSet<_>>()
    };

    let k1 = types_for("K1");
    assert!(k1.contains(&AlertType::FeedWithdrawalDue));
    assert!(k1.contains(&AlertType::RccVaccineDue));
    assert!(k1.contains(&AlertType::MoveToMaternityDue));

    let k2 = types_for("K2");
    assert!(!k2.contains(&AlertType::FeedWithdrawalDue));
    assert!(k2.contains(&AlertType::RccVaccineDue));
    assert!(!k2.contains(&AlertType::MoveToMaternityDue));
}

// ==========================================
// 圈舍汇总
// ==========================================

#[test]
fn test_weaning_aggregated_per_pen() {
    let (animals, pens) = mixed_herd();
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    let weaning: Vec<_> = alerts
        .iter()
        .filter(|a| a.alert_type == AlertType::WeaningDue)
        .collect();
    assert_eq!(weaning.len(), 1);
    assert_eq!(weaning[0].subject_type, SubjectType::Pen);
    assert_eq!(weaning[0].subject_id, "P1");
    assert_eq!(weaning[0].affected_ids.len(), 2);
    assert!(weaning[0].affected_ids.contains("C2"));
    assert!(weaning[0].affected_ids.contains("C3"));
    // C2 先到期
    assert_eq!(weaning[0].due_date, days_ago(20));

    // 非汇总类型仍挂在牛只上
    assert!(alerts
        .iter()
        .any(|a| a.id == "animal:C1:ear-tag-due"));
}

#[test]
fn test_aggregation_can_be_disabled() {
    let (animals, pens) = mixed_herd();
    let config = ClassifierConfig {
        aggregate_in_pens: false,
        ..ClassifierConfig::default()
    };
    let alerts = EventClassifier::new(config)
        .unwrap()
        .classify(&animals, &pens, today())
        .unwrap();

    let weaning_subjects: HashSet<_> = alerts
        .iter()
        .filter(|a| a.alert_type == AlertType::WeaningDue)
        .map(|a| a.subject_id.as_str())
        .collect();
    assert_eq!(weaning_subjects, HashSet::from(["C2", "C3"]));
}

#[test]
fn test_overcapacity_lists_only_active_occupants() {
    let (animals, pens) = mixed_herd();
    let alerts = classifier().classify(&animals, &pens, today()).unwrap();

    let over = alerts
        .iter()
        .find(|a| a.id == "pen:P2:pen-overcapacity")
        .unwrap();
    assert_eq!(over.affected_ids.len(), 2);
    assert!(!over.affected_ids.contains("SOLD1"));
}

// ==========================================
// 输入校验
// ==========================================

#[test]
fn test_duplicate_animal_id_fails_whole_call() {
    let animals = vec![
        AnimalBuilder::calf("A1", 20).build(),
        AnimalBuilder::calf("A1", 21).build(),
    ];
    let err = classifier().classify(&animals, &[], today()).unwrap_err();
    match err {
        ClassifierError::Validation { collection, index, .. } => {
            assert_eq!(collection, "animals");
            assert_eq!(index, Some(1));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_pen_id_shared_with_animal_fails_whole_call() {
    // 同名的公牛与圈舍都可能产生 sale-ready
    let bull = AnimalBuilder::new("P1")
        .sex(Sex::Male)
        .category(AnimalCategory::FatteningBull)
        .born_days_ago(800)
        .build();
    let pens = vec![PenBuilder::new("P2").build(), PenBuilder::new("P1").build()];

    let err = classifier().classify(&[bull], &pens, today()).unwrap_err();
    match err {
        ClassifierError::Validation { collection, index, reason } => {
            assert_eq!(collection, "pens");
            assert_eq!(index, Some(1));
            assert!(reason.contains("P1"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_classify_value_from_json() {
    let animals = json!([
        {
            "id": "A1",
            "birthDate": days_ago(20).to_string(),
            "sex": "female",
            "category": "calf-female",
            "status": "active",
            "motherId": "M1"
        }
    ]);
    let pens = json!([
        { "id": "P1", "number": "1", "type": "outdoor", "capacity": 10, "currentFunction": "empty" }
    ]);

    let alerts = classifier().classify_value(&animals, &pens, today()).unwrap();
    let types: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(types, vec![AlertType::EarTagDue, AlertType::PenEmpty]);

    let serialized = serde_json::to_value(&alerts[0]).unwrap();
    assert_eq!(serialized["alertType"], "ear-tag-due");
    assert_eq!(serialized["subjectId"], "A1");
}

#[test]
fn test_classify_value_rejects_missing_id() {
    let animals = json!([{ "sex": "female", "category": "cow", "status": "active" }]);
    let err = classifier()
        .classify_value(&animals, &json!([]), today())
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::Validation { collection: "animals", index: Some(0), .. }
    ));

    let err = classifier()
        .classify_value(&json!({"id": "A1"}), &json!([]), today())
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Validation { index: None, .. }));
}
