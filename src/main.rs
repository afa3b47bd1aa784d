use anyhow::Result;
use clap::Parser;

use musebar::app::cli::Args;
use musebar::app::config::AppConfig;
use musebar::app::{auth, logging, runtime};

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let args = Args::parse();

    if args.generate_config {
        println!("{}", AppConfig::default_config_toml()?);
        return Ok(());
    }

    let _log_guard = logging::init(&AppConfig::get_log_dir());

    // URL scheme callback: store the tokens and leave the running instance alone
    if let Some(url) = args.open_url.as_deref() {
        return auth::handle_open_url(url).await;
    }

    runtime::run(args).await
}
