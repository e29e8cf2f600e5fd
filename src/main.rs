use clap::Parser;

use ocr_web::config::{Args, Config};
use ocr_web::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from(args);

    logging::init(&config.log_file, &config.log_level);

    tracing::info!("Starting ocr-web-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
