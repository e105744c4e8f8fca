use clap::{CommandFactory, Parser};
use cli_toolbox::adapters::clipboard::{CommandClipboard, CommandWindowProbe};
use cli_toolbox::adapters::sqlite::ClipulseDb;
use cli_toolbox::adapters::tui::run_history_browser;
use cli_toolbox::config::cli::{ClipulseArgs, ClipulseCommand, ExportFormat, FilterArgs, SyncArgs};
use cli_toolbox::config::ClipulsePaths;
use cli_toolbox::core::clipulse::{compile_pattern, format_entry, unified_diff};
use cli_toolbox::utils::{logger, validation::Validate};
use cli_toolbox::{ClipulseConfig, ClipulseMonitor, Result};
use tokio::sync::watch;

const EXPORT_LIMIT: usize = 10_000;
const TUI_LIMIT: usize = 1_000;

#[tokio::main]
async fn main() {
    let args = ClipulseArgs::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = args.validate() {
        std::process::exit(e.report());
    }

    let Some(command) = args.command.clone() else {
        let _ = ClipulseArgs::command().print_help();
        return;
    };

    if let Err(e) = run(&args, command).await {
        let exit_code = e.report();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: &ClipulseArgs, command: ClipulseCommand) -> Result<()> {
    let paths = ClipulsePaths::new(args.data_dir.clone())?;
    let db = ClipulseDb::open(&paths.database())?;
    let mut config = ClipulseConfig::load(&paths.config());
    tracing::debug!("Data dir: {}", paths.data_dir.display());

    match command {
        ClipulseCommand::Watch => {
            let clipboard = CommandClipboard::detect()?;
            tracing::info!("Reading clipboard with {}", clipboard.program());
            let mut monitor = ClipulseMonitor::new(db, config, clipboard, CommandWindowProbe)?;

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(true);
                }
            });
            monitor.run(shutdown_rx).await?;
        }
        ClipulseCommand::History { limit, full, tui } => {
            if tui {
                let entries = db.get_history(TUI_LIMIT)?;
                tokio::task::spawn_blocking(move || run_history_browser(entries))
                    .await
                    .map_err(cli_toolbox::ToolError::pty)??;
                return Ok(());
            }
            let entries = db.get_history(limit)?;
            if entries.is_empty() {
                println!("📋 No clipboard history found.");
                return Ok(());
            }
            println!("📋 Last {} clipboard entries:", entries.len());
            for entry in &entries {
                println!("{}", format_entry(entry, full));
            }
        }
        ClipulseCommand::Search { keyword, full } => {
            let entries = db.search(&keyword)?;
            if entries.is_empty() {
                println!("🔍 No entries found for '{}'", keyword);
                return Ok(());
            }
            println!("🔍 Found {} entries for '{}':", entries.len(), keyword);
            for entry in &entries {
                println!("{}", format_entry(entry, full));
            }
        }
        ClipulseCommand::Clear => {
            let removed = db.clear()?;
            tracing::debug!("Removed {} entries", removed);
            println!("🗑️  Clipboard history cleared.");
        }
        ClipulseCommand::Export(export) => {
            let entries = db.get_history(EXPORT_LIMIT)?;
            let output = match export.format() {
                ExportFormat::Json => serde_json::to_string_pretty(&entries)?,
                ExportFormat::Txt => entries
                    .iter()
                    .map(|entry| format_entry(entry, true))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            let path = export.output_path();
            std::fs::write(&path, output)?;
            println!("📄 Exported {} entries to {}", entries.len(), path.display());
        }
        ClipulseCommand::Filter(filter) => {
            run_filter(&mut config, filter)?;
            config.save(&paths.config())?;
        }
        ClipulseCommand::Expire { minutes } => {
            let removed = db.expire_older_than(minutes)?;
            tracing::debug!("Expired {} entries", removed);
            println!("🕐 Removed entries older than {} minutes.", minutes);
        }
        ClipulseCommand::Sync(sync) => {
            run_sync(&mut config, sync);
            config.save(&paths.config())?;
        }
        ClipulseCommand::Diff { count } => {
            let entries = db.get_history(count)?;
            if entries.len() < 2 {
                println!("📊 Need at least 2 entries for diff.");
                return Ok(());
            }
            println!("📊 Content Diff:");
            for line in unified_diff(&entries[1].content, &entries[0].content).lines() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn run_filter(config: &mut ClipulseConfig, filter: FilterArgs) -> Result<()> {
    if let Some(app) = filter.add_app {
        println!("✅ Added app filter: {}", app);
        config.filters.ignore_apps.push(app);
    } else if let Some(pattern) = filter.add_pattern {
        compile_pattern(&pattern)?;
        println!("✅ Added pattern filter: {}", pattern);
        config.filters.ignore_patterns.push(pattern);
    } else if filter.list {
        println!("🔍 Current filters:");
        println!("  Ignored apps: {:?}", config.filters.ignore_apps);
        println!("  Ignored patterns: {:?}", config.filters.ignore_patterns);
    } else if filter.clear {
        config.filters = Default::default();
        println!("🗑️  All filters cleared.");
    }
    Ok(())
}

fn run_sync(config: &mut ClipulseConfig, sync: SyncArgs) {
    if let Some(url) = sync.webhook {
        println!("🔗 Webhook URL set: {}", url);
        config.sync.webhook_url = Some(url);
    }
    if sync.enable {
        config.sync.enabled = true;
        println!("✅ Sync enabled.");
    }
    if sync.disable {
        config.sync.enabled = false;
        println!("❌ Sync disabled.");
    }
}
