use clap::Parser;
use cli_toolbox::config::cli::TreeviewArgs;
use cli_toolbox::core::treeview::{ignored_set, render_tree};
use cli_toolbox::utils::{logger, validation::Validate};
use cli_toolbox::Result;

fn main() {
    let args = TreeviewArgs::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = args.validate() {
        std::process::exit(e.report());
    }

    if let Err(e) = run(&args) {
        std::process::exit(e.report());
    }
}

fn run(args: &TreeviewArgs) -> Result<()> {
    let ignored = ignored_set(args.ignore.iter().cloned());
    tracing::debug!("Ignoring: {:?}", ignored);

    let lines = render_tree(&args.folder, &ignored)?;
    let base = std::fs::canonicalize(&args.folder)?;
    println!("{}", base.display());
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
