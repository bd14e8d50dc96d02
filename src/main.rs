// ==========================================
// MooTracker 牧场管理系统 - 命令行入口
// ==========================================
// 用法:
//   moo-tracker [--db PATH] [--date YYYY-MM-DD] [--locale hu|en]
// 输出: 提醒看板 JSON（stdout）,日志走 stderr
// ==========================================

use chrono::NaiveDate;
use moo_tracker::app::{get_default_db_path, AppState};
use moo_tracker::{i18n, logging};
use std::error::Error;

#[derive(Debug, Default)]
struct CliArgs {
    db_path: Option<String>,
    date: Option<NaiveDate>,
    locale: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .filter(|v| !v.starts_with("--"))
                .ok_or_else(|| format!("{} 缺少参数值", name))
        };
        match arg.as_str() {
            "--db" => parsed.db_path = Some(value("--db")?),
            "--date" => {
                let raw = value("--date")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| format!("--date 格式错误 '{}': {}", raw, e))?;
                parsed.date = Some(date);
            }
            "--locale" => {
                let locale = value("--locale")?;
                if locale != "hu" && locale != "en" {
                    return Err(format!("不支持的语言: {}", locale));
                }
                parsed.locale = Some(locale);
            }
            other => return Err(format!("未知参数: {}", other)),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args = parse_args(std::env::args().skip(1))?;

    tracing::info!("==================================================");
    tracing::info!("{} - 提醒看板", moo_tracker::APP_NAME);
    tracing::info!("系统版本: {}", moo_tracker::VERSION);
    tracing::info!("==================================================");

    i18n::set_locale(args.locale.as_deref().unwrap_or(i18n::DEFAULT_LOCALE));

    let db_path = args.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let today = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let state = AppState::new(db_path)?;

    let board = state.alert_api.refresh_alerts(today).await?;
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}
