use calo_readability::{ServiceConfig, init_tracing, serve};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::parse();
    init_tracing(config.log_format)?;
    serve(config).await
}
