//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    x: CheckResult,
    feeds: CheckResult,
    snapshot: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        x: CheckResult::error("Not checked"),
        feeds: CheckResult::error("Not checked"),
        snapshot: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.x = check_x(config);
        report.feeds = check_feeds(config);
        report.snapshot = check_snapshot(config);
    }

    let checks = [&report.config, &report.x, &report.feeds, &report.snapshot];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_x(config: &AppConfig) -> CheckResult {
    if !config.x.enabled {
        return CheckResult::ok("X source disabled");
    }

    let env_var = &config.x.bearer_token_env;
    let accounts = &config.x.accounts;
    let details = serde_json::json!({
        "accounts": accounts,
        "base_url": config.x.base_url,
        "language": config.x.language,
    });

    if env_var.trim().is_empty() {
        return CheckResult::error("No bearer token env var configured").with_details(details);
    }

    if accounts.is_empty() {
        return CheckResult::warn("No accounts configured").with_details(details);
    }

    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => CheckResult::ok(format!(
            "Bearer token: {} (set), Accounts: {}",
            env_var,
            accounts.len()
        ))
        .with_details(details),
        _ => CheckResult::warn(format!(
            "Bearer token: {} (not set), Accounts: {}",
            env_var,
            accounts.len()
        ))
        .with_details(details),
    }
}

fn check_feeds(config: &AppConfig) -> CheckResult {
    if !config.feeds.enabled {
        return CheckResult::ok("Feed source disabled");
    }

    let sources = &config.feeds.sources;
    if sources.is_empty() {
        return CheckResult::warn("No feeds configured");
    }

    let details: Vec<serde_json::Value> = sources
        .iter()
        .map(|s| {
            let platform = social_feed_domain::Platform::from_feed_key(&s.key);
            serde_json::json!({ "key": s.key, "url": s.url, "platform": platform })
        })
        .collect();

    let invalid: Vec<&str> = sources
        .iter()
        .filter(|s| !(s.url.starts_with("http://") || s.url.starts_with("https://")))
        .map(|s| s.key.as_str())
        .collect();

    if !invalid.is_empty() {
        return CheckResult::error(format!("Feeds with non-HTTP URLs: {}", invalid.join(", ")))
            .with_details(serde_json::Value::Array(details));
    }

    CheckResult::ok(format!(
        "Feeds: {}, Retries: {}, Timeout: {}s",
        sources.len(),
        config.feeds.retries,
        config.feeds.timeout_secs
    ))
    .with_details(serde_json::Value::Array(details))
}

fn check_snapshot(config: &AppConfig) -> CheckResult {
    match config.general.snapshot_path {
        Some(ref path) => CheckResult::ok(format!("Snapshot: {}", path.display())),
        None => CheckResult::ok("Snapshot disabled"),
    }
}

fn print_report(report: &DoctorReport) {
    println!("social-feed Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("X Source", &report.x);
    print_check("Feeds", &report.feeds);
    print_check("Snapshot", &report.snapshot);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: social-feed posts");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
