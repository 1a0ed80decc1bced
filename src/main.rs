use anyhow::Context;
use clap::Parser;

use rxtrace::core::{args::CommandlineArgs, config::Settings, logging};
use rxtrace::proxy::server::TraceProxy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommandlineArgs::parse();
    logging::init_logging(None).context("logging setup failed")?;

    let settings = Settings::from_args(&args).context("invalid configuration")?;
    let proxy = TraceProxy::bind(&args.listen, &args.display, settings)
        .await
        .with_context(|| format!("cannot listen on {}", args.listen))?;

    tokio::select! {
        result = proxy.run() => result.context("proxy terminated")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }
    Ok(())
}
