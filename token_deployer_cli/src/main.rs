use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use deploy_config::{
    env::{env_file_name, load_env, selected_env_name},
    DeployConfig, DEFAULT_CONFIG_PATH,
};
use token_deployer::{deployment::DEFAULT_CONTRACT_NAME, DeployError, DeployTask, DeploymentResult};
use tracing_subscriber::EnvFilter;

/// Deploy the token contract to a configured network.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Network name from the config's `[networks]` table.
    #[arg(long, env = "DEPLOY_NETWORK", default_value = "testnet")]
    network: String,

    #[arg(long, env = "DEPLOY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Selects `.<name>.env` as the environment file.
    #[arg(long = "env", env = "DEPLOY_ENV")]
    env_name: Option<String>,

    #[arg(long, env = "DEPLOY_CONTRACT", default_value = DEFAULT_CONTRACT_NAME)]
    contract: String,

    /// Compiled artifact; defaults to `artifacts/contracts/<C>.sol/<C>.json`.
    #[arg(long, env = "DEPLOY_ARTIFACT")]
    artifact: Option<PathBuf>,
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout is reserved for the deployed address
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

async fn run(args: Args) -> Result<DeploymentResult, DeployError> {
    let config = DeployConfig::from_file(&args.config)?;

    let task = DeployTask::new(args.network).contract(args.contract, args.artifact);
    task.run(&config).await
}

/// Process exit status for a finished run; prints the address on success.
fn report(result: &Result<DeploymentResult, DeployError>) -> u8 {
    match result {
        Ok(deployed) => {
            println!("{}", success_line(deployed));
            0
        }
        Err(e) => {
            tracing::error!(kind = ?e.kind(), "error deploying contract: {e}");
            1
        }
    }
}

fn success_line(deployed: &DeploymentResult) -> String {
    format!("{} address: {}", deployed.contract_name, deployed.address_hex())
}

#[tokio::main]
async fn main() -> ExitCode {
    // exactly one env file, picked before the flags it may provide fallbacks for
    let env_name = selected_env_name(std::env::args().skip(1));
    let env_file = load_env(env_name.as_deref());
    let args = Args::parse();

    if let Err(e) = init_tracing() {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    match &env_file {
        Some(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        None => tracing::debug!(
            file = %env_file_name(env_name.as_deref()),
            "no environment file loaded"
        ),
    }

    let result = run(args).await;
    ExitCode::from(report(&result))
}
