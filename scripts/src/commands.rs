//! Implementations of the deploy script commands

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::{
    cli::{
        DeployArgs, DeployContractArgs, DeployPlanArgs, ExecutionArgs, ScriptConfig, ShowPlanArgs,
    },
    deployer::DryRunDeployer,
    errors::ScriptError,
    executor::execute_plan,
    plan::{DeployStep, DeploymentPlan, PlanArg, Step},
    utils::{parse_signer, setup_client},
};

/// Run one of the built-in plans
pub async fn deploy_builtin_plan(
    args: DeployArgs,
    config: &ScriptConfig,
) -> Result<(), ScriptError> {
    let plan = args.plan.build(&args.staking.into());
    run_plan(&plan, &args.execution, config).await
}

/// Run a plan read from a JSON file
pub async fn deploy_plan_file(
    args: DeployPlanArgs,
    config: &ScriptConfig,
) -> Result<(), ScriptError> {
    let plan = DeploymentPlan::from_file(&args.file)?;
    run_plan(&plan, &args.execution, config).await
}

/// Deploy a single contract with the given constructor arguments
pub async fn deploy_contract(
    args: DeployContractArgs,
    config: &ScriptConfig,
) -> Result<(), ScriptError> {
    let plan = single_contract_plan(&args);
    run_plan(&plan, &args.execution, config).await
}

/// Print the steps of a plan
pub fn show_plan(args: ShowPlanArgs) -> Result<(), ScriptError> {
    let plan = match (args.plan, args.file) {
        (Some(kind), _) => kind.build(&args.staking.into()),
        (None, Some(path)) => DeploymentPlan::from_file(&path)?,
        (None, None) => {
            return Err(ScriptError::ReadPlan(
                "either a built-in plan or a plan file is required".to_string(),
            ))
        }
    };

    print!("{}", plan);
    Ok(())
}

/// Build a plan deploying a single contract
pub fn single_contract_plan(args: &DeployContractArgs) -> DeploymentPlan {
    let label = args.label.clone().unwrap_or_else(|| args.contract.clone());

    let mut plan = DeploymentPlan::new(&format!("deploy-{}", args.contract));
    plan.steps.push(Step::Deploy(DeployStep {
        label: label.clone(),
        contract: args.contract.clone(),
        args: args.args.iter().map(|arg| PlanArg::from(arg.as_str())).collect(),
    }));
    plan.summarize(&args.contract, &label)
}

/// Execute a plan, either against the network or as a dry run
async fn run_plan(
    plan: &DeploymentPlan,
    execution: &ExecutionArgs,
    config: &ScriptConfig,
) -> Result<(), ScriptError> {
    if execution.dry_run {
        let sender = match &config.priv_key {
            Some(priv_key) => parse_signer(priv_key)?.address(),
            None => {
                warn!("no private key given, dry run deploys from the zero address");
                Address::ZERO
            }
        };

        let deployer = DryRunDeployer::new(sender, execution.nonce);
        execute_plan(plan, &deployer, &config.artifacts, None /* deployments_path */).await?;
        info!(
            "dry run of `{}` recorded {} transactions",
            plan.name,
            deployer.transactions().len()
        );
        return Ok(());
    }

    let priv_key = config.priv_key.as_deref().ok_or_else(|| {
        ScriptError::ClientInitialization(
            "a private key is required, pass --priv-key or set PKEY".to_string(),
        )
    })?;
    let client = setup_client(priv_key, &config.rpc_url).await?;

    let deployments_path = config.deployments_path.as_path();
    let deployed = execute_plan(plan, &client, &config.artifacts, Some(deployments_path)).await?;
    info!(
        "plan `{}` deployed {} contracts, addresses written to {}",
        plan.name,
        deployed.len(),
        deployments_path.display()
    );

    Ok(())
}
