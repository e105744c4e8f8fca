use clap::Parser;
use cli_toolbox::config::cli::{FetcherArgs, DEFAULT_INTERVAL};
use cli_toolbox::config::fetcher_config::{default_log_path, default_sound_path};
use cli_toolbox::core::fetcher::{auto_name_file, read_url_list, Fetcher, WatchOptions};
use cli_toolbox::domain::model::WatchOutcome;
use cli_toolbox::utils::display::WatchDisplay;
use cli_toolbox::utils::{logger, validation::Validate};
use cli_toolbox::{FetcherSettings, Result, ToolError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let args = FetcherArgs::parse();

    // 日誌寫入檔案；非 daemon 的 verbose 模式同時輸出到 stderr
    let log_path = default_log_path();
    if let Err(e) = logger::init_file_logger(args.verbose, &log_path, args.verbose && !args.daemon) {
        logger::init_cli_logger(args.verbose);
        tracing::warn!("Cannot write log file {}: {}", log_path.display(), e);
    }

    if let Err(e) = args.validate() {
        std::process::exit(e.report());
    }

    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            let exit_code = e.report();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

fn parse_headers(raw: Option<&str>) -> Result<Option<HashMap<String, String>>> {
    raw.map(|json| {
        serde_json::from_str(json)
            .map_err(|e| ToolError::invalid_value("headers", json, format!("Invalid JSON in headers argument: {}", e)))
    })
    .transpose()
}

/// 回傳是否所有網址都已下載 (或被使用者中斷)
async fn run(args: FetcherArgs) -> Result<bool> {
    let file_settings = args
        .config
        .as_deref()
        .map(FetcherSettings::load)
        .unwrap_or_default();

    let cli_settings = FetcherSettings {
        interval: args.interval,
        max_attempts: args.max_attempts,
        headers: parse_headers(args.headers.as_deref())?,
        webhook: args.webhook.clone(),
        sound: args.sound.clone(),
        no_sound: args.no_sound.then_some(true),
        spinner: args.spinner,
    };
    let settings = cli_settings.or(file_settings);

    let options = WatchOptions {
        interval_secs: settings.interval.unwrap_or(DEFAULT_INTERVAL),
        max_attempts: settings.max_attempts.unwrap_or(0),
        headers: settings.headers.clone().unwrap_or_default(),
        check_size: args.check_size,
        expected_size: args.expected_size,
        no_sound: settings.no_sound.unwrap_or(false),
        sound: Some(settings.sound.clone().unwrap_or_else(default_sound_path)),
        webhook: settings.webhook.clone(),
    };

    let display = WatchDisplay::new(settings.spinner.unwrap_or_default(), !args.daemon);
    if let Some(path) = &args.config {
        display.info(&format!("Loaded configuration from {}", path.display()));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let interval = options.interval_secs;
    let max_attempts = options.max_attempts;
    let fetcher = Fetcher::new(options, display.clone(), shutdown_rx)?;

    let outcomes = match (&args.multiple, &args.url) {
        (Some(list), _) => {
            let urls = read_url_list(list)?;
            tokio::fs::create_dir_all(&args.out).await?;
            Arc::new(fetcher).watch_many(urls, &args.out).await
        }
        (None, Some(url)) => {
            let output = auto_name_file(url, &args.out);
            display.info(&format!("Watching URL: {}", url));
            display.info(&format!("Output: {}", output.display()));
            display.info(&format!("Interval: {}s", interval));
            if max_attempts > 0 {
                display.info(&format!("Max attempts: {}", max_attempts));
            }
            let outcome = fetcher.watch_one(url, &output).await;
            display.clear();
            vec![(url.clone(), outcome)]
        }
        (None, None) => {
            return Err(ToolError::MissingConfigError {
                field: "URL (No URL provided)".to_string(),
            })
        }
    };

    let mut all_done = true;
    for (url, outcome) in &outcomes {
        match outcome {
            WatchOutcome::Downloaded { path, bytes, attempts } => tracing::info!(
                "{} -> {} ({} bytes, {} attempts)",
                url,
                path.display(),
                bytes,
                attempts
            ),
            WatchOutcome::GaveUp { attempts } => {
                tracing::warn!("Gave up on {} after {} attempts", url, attempts);
                all_done = false;
            }
            WatchOutcome::Cancelled { .. } => {
                display.warning(&format!("Stopped watching {}", url));
            }
        }
    }

    if let Some(path) = &args.save_config {
        settings.save(path)?;
        display.success(&format!("Configuration saved to {}", path.display()));
    }

    Ok(all_done)
}
