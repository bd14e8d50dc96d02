// ==========================================
// AlertApi 集成测试
// ==========================================
// 测试范围: 刷新看板 → 转任务 → 暂缓/处理 → 刷新失败时的旧看板
// ==========================================

mod helpers;
mod test_helpers;

use helpers::mock_config::MockConfig;
use helpers::test_data_builder::*;
use moo_tracker::api::{AlertApi, ApiError};
use moo_tracker::app::AppState;
use moo_tracker::config::{config_keys, ClassifierConfig, ClassifierConfigReader};
use moo_tracker::domain::task::TaskOverrides;
use moo_tracker::domain::types::{AlertType, AnimalStatus, PenType};
use moo_tracker::engine::{NoOpTaskSink, TaskSink};
use moo_tracker::i18n::t;
use moo_tracker::logging;
use moo_tracker::repository::{AlertStateRepository, AnimalRepository, PenRepository, TaskRepository};
use std::sync::Arc;

/// 基础牛群: 一头待打耳标的犊牛、一头超期未产的母牛、一个超员圈舍
fn seed_herd(state: &AppState) {
    state
        .pen_repo
        .insert(&PenBuilder::new("P1").capacity(1).build())
        .unwrap();
    state
        .animal_repo
        .insert(&AnimalBuilder::calf("C1", 20).pen("P1").build())
        .unwrap();
    state
        .animal_repo
        .insert(&AnimalBuilder::pregnant_cow("K1", days_ago(3)).pen("P1").build())
        .unwrap();
}

fn app_state() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to init AppState");
    (temp_file, state)
}

#[tokio::test]
async fn test_refresh_builds_board() {
    logging::init_test();
    let (_temp_file, state) = app_state();
    seed_herd(&state);

    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert!(!board.stale);
    assert!(board.error.is_none());
    assert_eq!(board.generated_for, today());
    assert_eq!(board.hidden_count, 0);

    let ids: Vec<_> = board.alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["animal:K1:birth-overdue", "animal:C1:ear-tag-due", "pen:P1:pen-overcapacity"]
    );

    assert_eq!(state.alert_api.current_board().unwrap(), Some(board));
}

#[tokio::test]
async fn test_sold_animal_disappears_on_next_refresh() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    state.alert_api.refresh_alerts(today()).await.unwrap();

    state.animal_repo.update_status("K1", AnimalStatus::Sold).unwrap();
    let board = state.alert_api.refresh_alerts(today()).await.unwrap();

    assert!(board.alerts.iter().all(|a| !a.affected_ids.contains("K1")));
    assert!(board
        .alerts
        .iter()
        .all(|a| a.alert_type != AlertType::PenOvercapacity));
}

#[tokio::test]
async fn test_create_task_from_alert() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    state.alert_api.refresh_alerts(today()).await.unwrap();

    let overrides = TaskOverrides {
        title: Some("Fülszám C1".to_string()),
        due_date: Some(days_ahead(1)),
        ..TaskOverrides::default()
    };
    let task_id = state
        .alert_api
        .create_task("animal:C1:ear-tag-due", overrides)
        .unwrap();

    let open = state.alert_api.list_open_tasks().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task_id, task_id);
    assert_eq!(open[0].title, "Fülszám C1");
    assert_eq!(open[0].due_date, days_ahead(1));

    state.alert_api.complete_task(&task_id).unwrap();
    assert!(state.alert_api.list_open_tasks().unwrap().is_empty());

    let err = state
        .alert_api
        .create_task("animal:C1:weaning-due", TaskOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_snooze_hides_until_date() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    state.alert_api.refresh_alerts(today()).await.unwrap();

    let id = "animal:C1:ear-tag-due";
    state.alert_api.snooze_alert(id, days_ahead(2), "gazda").unwrap();

    let cached = state.alert_api.current_board().unwrap().unwrap();
    assert!(cached.alerts.iter().all(|a| a.id != id));
    assert_eq!(cached.hidden_count, 1);

    let board = state.alert_api.refresh_alerts(days_ahead(1)).await.unwrap();
    assert!(board.alerts.iter().all(|a| a.id != id));
    assert_eq!(board.hidden_count, 1);

    let board = state.alert_api.refresh_alerts(days_ahead(2)).await.unwrap();
    assert!(board.alerts.iter().any(|a| a.id == id));

    let err = state.alert_api.snooze_alert(id, days_ahead(2), "gazda").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    let err = state.alert_api.snooze_alert(id, days_ahead(5), "  ").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_resolve_hides_until_due_date_changes() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    state.alert_api.refresh_alerts(today()).await.unwrap();

    let id = "animal:C1:ear-tag-due";
    let resolved = state.alert_api.resolve_alert(id, "gazda").unwrap();
    assert_eq!(resolved.resolved_due_date, Some(days_ago(5)));

    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert!(board.alerts.iter().all(|a| a.id != id));

    assert!(state.alert_api.reopen_alert(id).unwrap());
    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert!(board.alerts.iter().any(|a| a.id == id));
}

#[tokio::test]
async fn test_non_resolvable_alerts_are_rejected() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    state.alert_api.refresh_alerts(today()).await.unwrap();

    for id in ["animal:K1:birth-overdue", "pen:P1:pen-overcapacity"] {
        let err = state.alert_api.resolve_alert(id, "gazda").unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)), "{}", id);
        let err = state
            .alert_api
            .snooze_alert(id, days_ahead(3), "gazda")
            .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)), "{}", id);
    }

    let err = state.alert_api.resolve_alert("animal:X:sale-ready", "gazda").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_config_overrides_apply_on_refresh() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);

    // 耳标窗口推后,20 天的犊牛不再触发
    state
        .config_manager
        .set_global_config_value(config_keys::EAR_TAG_MIN_DAYS, "21")
        .unwrap();
    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert!(board.alerts.iter().all(|a| a.alert_type != AlertType::EarTagDue));
}

// ==========================================
// 刷新失败: 保留旧看板
// ==========================================

#[tokio::test]
async fn test_invalid_config_returns_stale_board() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);

    let good = state.alert_api.refresh_alerts(today()).await.unwrap();

    state
        .config_manager
        .set_global_config_value(config_keys::WEANING_MIN_MONTHS, "9")
        .unwrap();
    let board = state.alert_api.refresh_alerts(days_ahead(1)).await.unwrap();

    assert!(board.stale);
    assert_eq!(board.error, Some(t("common.stale_alerts")));
    assert_eq!(board.alerts, good.alerts);
    assert_eq!(board.generated_for, today());
}

#[tokio::test]
async fn test_out_of_range_window_is_config_error() {
    let (_temp_file, state) = app_state();
    seed_herd(&state);
    // 5 天后预产: 产前窗口内
    state
        .animal_repo
        .insert(&AnimalBuilder::pregnant_cow("K2", days_ahead(5)).build())
        .unwrap();
    state
        .config_manager
        .set_global_config_value(config_keys::RCC_VACCINE_DAYS, "1000000000")
        .unwrap();

    let err = state.alert_api.refresh_alerts(today()).await.unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(ref msg) if msg.contains("rcc_vaccine_days")));
    assert!(state.alert_api.current_board().unwrap().is_none());

    state
        .config_manager
        .set_global_config_value(config_keys::RCC_VACCINE_DAYS, "42")
        .unwrap();
    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert!(board
        .alerts
        .iter()
        .any(|a| a.id == "animal:K2:rcc-vaccine-due"));
}

#[tokio::test]
async fn test_failure_without_previous_board_is_an_error() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let mock = Arc::new(MockConfig::new(ClassifierConfig::default()));
    mock.set_failing(true);

    let api = AlertApi::new(
        Arc::new(AnimalRepository::new(&db_path).unwrap()),
        Arc::new(PenRepository::new(&db_path).unwrap()),
        Arc::new(AlertStateRepository::new(&db_path).unwrap()),
        Arc::new(TaskRepository::new(&db_path).unwrap()),
        mock.clone() as Arc<dyn ClassifierConfigReader>,
        Arc::new(NoOpTaskSink) as Arc<dyn TaskSink>,
    );

    let err = api.refresh_alerts(today()).await.unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
    assert!(api.current_board().unwrap().is_none());

    mock.set_failing(false);
    let board = api.refresh_alerts(today()).await.unwrap();
    assert!(!board.stale);

    mock.set_failing(true);
    let stale = api.refresh_alerts(today()).await.unwrap();
    assert!(stale.stale);
    assert!(stale.error.is_some());
}

#[tokio::test]
async fn test_empty_outdoor_pen_on_board() {
    let (_temp_file, state) = app_state();
    state
        .pen_repo
        .insert(&PenBuilder::new("P7").pen_type(PenType::Outdoor).build())
        .unwrap();

    let board = state.alert_api.refresh_alerts(today()).await.unwrap();
    assert_eq!(board.alerts.len(), 1);
    assert_eq!(board.alerts[0].id, "pen:P7:pen-empty");
}
