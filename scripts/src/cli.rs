//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    artifacts::ArtifactStore,
    commands::{deploy_builtin_plan, deploy_contract, deploy_plan_file, show_plan},
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_RPC_URL},
    errors::ScriptError,
    plans::{PlanKind, StakingParams},
};

/// Deploy the Sphynx token, treasury, staking, bonding & farming contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Root of the Hardhat compilation artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path of the file to which deployed addresses are written
    #[arg(short, long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Split the arguments into the configuration shared by all commands and
    /// the command to run
    pub fn into_parts(self) -> (ScriptConfig, Command) {
        let Cli {
            priv_key,
            rpc_url,
            artifacts,
            deployments_path,
            command,
        } = self;

        let config = ScriptConfig {
            priv_key,
            rpc_url,
            artifacts: ArtifactStore::new(artifacts),
            deployments_path,
        };
        (config, command)
    }
}

/// Configuration shared by all commands
pub struct ScriptConfig {
    /// Private key of the deployer
    pub priv_key: Option<String>,
    /// Network RPC URL
    pub rpc_url: String,
    /// The compilation artifacts
    pub artifacts: ArtifactStore,
    /// Path of the file to which deployed addresses are written
    pub deployments_path: PathBuf,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Run one of the built-in deployment plans
    Deploy(DeployArgs),
    /// Run a deployment plan read from a JSON file
    DeployPlan(DeployPlanArgs),
    /// Deploy a single contract by name
    DeployContract(DeployContractArgs),
    /// Print the steps of a plan without sending any transaction
    ShowPlan(ShowPlanArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, config: &ScriptConfig) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy_builtin_plan(args, config).await,
            Command::DeployPlan(args) => deploy_plan_file(args, config).await,
            Command::DeployContract(args) => deploy_contract(args, config).await,
            Command::ShowPlan(args) => show_plan(args),
        }
    }
}

/// Options controlling how a plan is executed
#[derive(Args, Clone, Debug)]
pub struct ExecutionArgs {
    /// Record the transactions and predict addresses instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// The deployer nonce assumed by a dry run
    #[arg(long, default_value_t = 0)]
    pub nonce: u64,
}

/// Overrides of the staking parameters used by the built-in plans
#[derive(Args, Clone, Debug, Default)]
pub struct StakingArgs {
    /// The staking epoch length, in blocks
    #[arg(long)]
    pub epoch_length: Option<u64>,

    /// The number of the first staking epoch
    #[arg(long)]
    pub first_epoch_number: Option<u64>,

    /// The block at which the first staking epoch ends
    #[arg(long)]
    pub first_block_number: Option<u64>,

    /// The initial index of the staked token
    #[arg(long)]
    pub initial_index: Option<u64>,
}

impl From<StakingArgs> for StakingParams {
    fn from(args: StakingArgs) -> Self {
        StakingParams {
            epoch_length: args.epoch_length.map(|n| n.to_string()),
            first_epoch_number: args.first_epoch_number.map(|n| n.to_string()),
            first_block_number: args.first_block_number.map(|n| n.to_string()),
            initial_index: args.initial_index.map(|n| n.to_string()),
        }
    }
}

/// Run a built-in deployment plan
#[derive(Args)]
pub struct DeployArgs {
    /// The plan to run
    #[arg(long)]
    pub plan: PlanKind,

    /// Overrides of the staking parameters
    #[command(flatten)]
    pub staking: StakingArgs,

    /// How to execute the plan
    #[command(flatten)]
    pub execution: ExecutionArgs,
}

/// Run a deployment plan read from a JSON file
#[derive(Args)]
pub struct DeployPlanArgs {
    /// Path of the plan file
    #[arg(short, long)]
    pub file: PathBuf,

    /// How to execute the plan
    #[command(flatten)]
    pub execution: ExecutionArgs,
}

/// Deploy a single contract by name.
///
/// Arguments are coerced to the constructor's parameter types; `deployer`
/// passes the deployer's address.
#[derive(Args)]
pub struct DeployContractArgs {
    /// The name of the contract artifact
    #[arg(short, long)]
    pub contract: String,

    /// The key under which the address is recorded, defaults to the contract name
    #[arg(short, long)]
    pub label: Option<String>,

    /// The constructor arguments
    pub args: Vec<String>,

    /// How to execute the plan
    #[command(flatten)]
    pub execution: ExecutionArgs,
}

/// Print the steps of a plan
#[derive(Args)]
pub struct ShowPlanArgs {
    /// A built-in plan
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub plan: Option<PlanKind>,

    /// A plan file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Overrides of the staking parameters
    #[command(flatten)]
    pub staking: StakingArgs,
}
