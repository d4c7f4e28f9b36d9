//! Contract Lens CLI
//!
//! Usage:
//!   contract_lens --address 0x...      analyze a verified contract via the explorer
//!   contract_lens --file Token.sol     analyze a local source file
//!   contract_lens --code "contract..." analyze source passed inline
//!
//! Environment (a `.env` file in the working directory is loaded first):
//!   OPENAI_API_KEY     - generation backend key (required)
//!   ETHERSCAN_API_KEY  - explorer key (optional, lookups may be limited without it)
//!   EXPLORER_API_URL   - explorer endpoint (default: Sepolia Etherscan)
//!   RUST_LOG           - log filter (default: info)

use clap::{ArgGroup, Parser};
use contract_lens::utils::constants::{APP_NAME, APP_VERSION};
use contract_lens::{
    validate_input, AnalysisResult, AnalysisState, AppConfig, ContractAnalyzer, ContractInput,
};
use eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const RULE: &str = "==================================================";

#[derive(Debug, Parser)]
#[command(
    name = "contract_lens",
    version,
    about = "Explain a smart contract's behavior and security posture"
)]
#[command(group(ArgGroup::new("input").required(true).multiple(false)))]
struct Args {
    /// Contract address (resolved through the block explorer)
    #[arg(short, long, group = "input")]
    address: Option<String>,

    /// Solidity source file, or a Standard JSON input file
    #[arg(short, long, group = "input")]
    file: Option<PathBuf>,

    /// Raw Solidity source code
    #[arg(short, long, group = "input")]
    code: Option<String>,
}

impl Args {
    fn into_input(self) -> Result<ContractInput> {
        if let Some(address) = self.address {
            return Ok(ContractInput::Address(address));
        }
        if let Some(path) = self.file {
            return ContractInput::from_path(&path)
                .map_err(|e| eyre::eyre!("File {} could not be read: {}", path.display(), e));
        }
        match self.code {
            Some(code) => Ok(ContractInput::RawSource(code)),
            None => Err(eyre::eyre!("one of --address, --file or --code is required")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    tracing::info!("{} v{}", APP_NAME, APP_VERSION);

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("⚠️ .env file could not be loaded: {}", e);
        }
    }

    let input = match args.into_input() {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(rejected) = reject_early(&input) {
        print_report(&rejected);
        return Ok(ExitCode::FAILURE);
    }

    let config = AppConfig::from_env()?;
    let analyzer = ContractAnalyzer::from_config(&config)?;

    let result = analyzer.analyze(input).await;
    print_report(&result);

    Ok(if result.is_done() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Malformed addresses fail before configuration is required
fn reject_early(input: &ContractInput) -> Option<AnalysisResult> {
    validate_input(input)
        .err()
        .map(|e| AnalysisResult::failed(e, AnalysisState::Start))
}

fn print_report(result: &AnalysisResult) {
    println!("\n{}\n", RULE);
    println!("SMART CONTRACT ANALYSIS");
    println!("\n{}\n", RULE);
    println!("{}", result.render());
    println!("\n{}\n", RULE);
}
