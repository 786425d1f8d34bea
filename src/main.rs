use clap::{Parser, Subcommand};
use permitminder::cmd::{DispatchArgs, RunArgs, dispatch, run};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true, env = "PERMITMINDER_CONFIG_DIR")]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produces today's snapshot, finds new exceedances and sends alerts.
    Run(RunArgs),
    /// Sends alerts for a previously saved day of new exceedances.
    Dispatch(DispatchArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Run(args) => run::execute(config_dir, args).await?,
        Commands::Dispatch(args) => dispatch::execute(config_dir, args).await?,
    }

    Ok(())
}
