use staticd::config::{Config, USAGE};
use staticd::server::{listener, shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match Config::from_args(std::env::args()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e:#}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level())
        .init();

    tracing::info!(root = %cfg.root_dir, port = cfg.port, "starting");

    let interrupt = shutdown::interrupt()?;
    listener::run(cfg, interrupt).await
}
