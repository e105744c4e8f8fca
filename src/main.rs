use clap::Parser;
use cli_toolbox::config::cli::{ToolboxArgs, ToolboxCommand};
use cli_toolbox::core::installer::{dir_on_path, find_tool};
use cli_toolbox::domain::model::{LinkOutcome, LinkStatus};
use cli_toolbox::utils::{logger, validation::Validate};
use cli_toolbox::{Installer, Result, ToolError, ToolboxConfig};

fn main() {
    let args = ToolboxArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);
    tracing::debug!("toolbox args: {:?}", args);

    // 驗證參數
    if let Err(e) = args.validate() {
        std::process::exit(e.report());
    }

    if let Err(e) = run(args) {
        let exit_code = e.report();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(args: ToolboxArgs) -> Result<()> {
    let config = ToolboxConfig::load(args.config.as_deref())?;
    let installer = Installer::new(
        config.install_dir(args.install_dir.clone())?,
        config.bin_dir(args.bin_dir.clone())?,
    );
    tracing::debug!(
        "install dir: {}, bin dir: {}",
        installer.install_dir().display(),
        installer.bin_dir().display()
    );

    match args.command {
        ToolboxCommand::Link { tool, name, force } => {
            let tool = find_tool(&tool).ok_or_else(|| ToolError::NotFound {
                what: format!("tool '{}'", tool),
            })?;
            let name = name.unwrap_or_else(|| config.command_name(tool.name).to_string());
            let link = installer.bin_dir().join(&name);

            match installer.link(tool.name, &name, force)? {
                LinkOutcome::Created => println!("✅ Linked {} -> {}", link.display(), tool.name),
                LinkOutcome::Replaced => println!("♻️  Replaced {} -> {}", link.display(), tool.name),
                LinkOutcome::AlreadyLinked => println!("✓ {} is already linked", link.display()),
            }

            let path_var = std::env::var_os("PATH");
            if !dir_on_path(installer.bin_dir(), path_var.as_deref()) {
                println!(
                    "💡 {} is not on your PATH; add it with:\n   export PATH=\"{}:$PATH\"",
                    installer.bin_dir().display(),
                    installer.bin_dir().display()
                );
            }
        }
        ToolboxCommand::Unlink { name } => {
            let removed = installer.unlink(&name)?;
            println!("🗑️  Removed {}", removed.display());
        }
        ToolboxCommand::List => {
            println!("Tools in {}:", installer.install_dir().display());
            for (tool, status) in installer.list()? {
                let state = match status {
                    LinkStatus::Linked { link } => format!("linked at {}", link.display()),
                    LinkStatus::NotLinked => "not linked".to_string(),
                    LinkStatus::Missing => "missing from install dir".to_string(),
                };
                println!("  {:<10} {:<24} {}", tool.name, state, tool.summary);
            }
        }
    }
    Ok(())
}
