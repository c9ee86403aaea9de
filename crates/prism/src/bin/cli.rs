use clap::Parser;
use prism::Cli;
use tracing::log::error;

// The evaluation isolate is bound to the thread that created it
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.handle().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}
