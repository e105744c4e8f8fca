use clap::Parser;
use cli_toolbox::adapters::http::HttpClient;
use cli_toolbox::config::cli::IpinfoArgs;
use cli_toolbox::core::ipinfo::{format_local, format_public, local_ipv4, public_ip};
use cli_toolbox::utils::{logger, validation::Validate};
use cli_toolbox::Result;

#[tokio::main]
async fn main() {
    let args = IpinfoArgs::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = args.validate() {
        std::process::exit(e.report());
    }

    if let Err(e) = run(&args).await {
        std::process::exit(e.report());
    }
}

async fn run(args: &IpinfoArgs) -> Result<()> {
    if args.show_local() {
        let addresses = local_ipv4();
        tracing::debug!("Found {} local IPv4 addresses", addresses.len());
        println!("{}", format_local(&addresses));
    }

    if args.show_public() {
        let client = HttpClient::new()?;
        // 查詢失敗只顯示錯誤，不影響退出碼
        match public_ip(&client, &args.endpoint).await {
            Ok(ip) => println!("{}", format_public(&ip)),
            Err(e) => {
                tracing::warn!("Public IP lookup failed: {}", e);
                println!("Error getting public IP: {}", e);
            }
        }
    }
    Ok(())
}
