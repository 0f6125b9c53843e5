//! Straight-line execution of a deployment plan

use std::path::Path;

use alloy::primitives::Address;
use itertools::Itertools;
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    deployer::ContractDeployer,
    errors::ScriptError,
    plan::{CallStep, DeployStep, DeployedContracts, DeploymentPlan, PlanArg, Step},
    utils::write_deployed_address,
};

/// Execute the steps of `plan` in order, awaiting each transaction before
/// sending the next.
///
/// The first failing step aborts the plan; contracts deployed before it stay
/// deployed. If `deployments_path` is given, each address is written to the
/// deployments file as soon as its contract is deployed.
pub async fn execute_plan(
    plan: &DeploymentPlan,
    deployer: &impl ContractDeployer,
    artifacts: &ArtifactStore,
    deployments_path: Option<&Path>,
) -> Result<DeployedContracts, ScriptError> {
    plan.validate()?;

    let deployer_address = deployer.deployer_address();
    info!("running plan `{}`", plan.name);
    info!("Deploying contracts with the account: {:#x}", deployer_address);

    let mut deployed = DeployedContracts::default();
    for step in &plan.steps {
        match step {
            Step::Deploy(step) => {
                let address = deploy_contract(step, deployer, artifacts, &deployed).await?;
                deployed.insert(&step.label, &step.contract, address);

                if let Some(path) = deployments_path {
                    write_deployed_address(path, &step.label, address)?;
                }
            }
            Step::Call(step) => call_contract(step, deployer, artifacts, &deployed).await?,
        }
    }

    print_summary(plan, &deployed)?;
    Ok(deployed)
}

/// Deploy the contract of a single step
async fn deploy_contract(
    step: &DeployStep,
    deployer: &impl ContractDeployer,
    artifacts: &ArtifactStore,
    deployed: &DeployedContracts,
) -> Result<Address, ScriptError> {
    let artifact = artifacts.load(&step.contract)?;
    let args = resolve_args(&step.args, deployer.deployer_address(), deployed)?;
    let creation_code = artifact.creation_code(&args)?;

    let address = deployer.deploy(creation_code).await?;
    info!(
        "{} ({}) deployed to {:#x} with args [{}]",
        step.contract,
        step.label,
        address,
        args.iter().join(", ")
    );

    Ok(address)
}

/// Call a method on a contract deployed by an earlier step
async fn call_contract(
    step: &CallStep,
    deployer: &impl ContractDeployer,
    artifacts: &ArtifactStore,
    deployed: &DeployedContracts,
) -> Result<(), ScriptError> {
    let target = deployed.get(&step.target)?;
    let artifact = artifacts.load(&target.contract)?;
    let args = resolve_args(&step.args, deployer.deployer_address(), deployed)?;
    let calldata = artifact.encode_call(&step.method, &args)?;

    let tx_hash = deployer.call(target.address, calldata).await?;
    info!(
        "called {}.{}({}) in {:#x}",
        step.target,
        step.method,
        args.iter().join(", "),
        tx_hash
    );

    Ok(())
}

/// Resolve plan arguments against the deployer and the contracts deployed so far
fn resolve_args(
    args: &[PlanArg],
    deployer: Address,
    deployed: &DeployedContracts,
) -> Result<Vec<String>, ScriptError> {
    args.iter().map(|arg| arg.resolve(deployer, deployed)).collect()
}

/// Print the addresses named in the plan's summary
fn print_summary(plan: &DeploymentPlan, deployed: &DeployedContracts) -> Result<(), ScriptError> {
    for (title, label) in &plan.summary {
        println!("{}: {:#x}", title, deployed.address(label)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use alloy::primitives::address;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::{deployer::DryRunDeployer, plans::masterchef_plan};

    /// A log writer keeping everything written to it
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Everything logged so far
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_logs_deploying_account() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let artifacts = ArtifactStore::new(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests")
                .join("fixtures")
                .join("artifacts"),
        );
        let sender = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let deployer = DryRunDeployer::new(sender, 0);
        execute_plan(&masterchef_plan(), &deployer, &artifacts, None).await.unwrap();

        let logs = logs.contents();
        assert!(logs.contains(
            "Deploying contracts with the account: 0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        ));
        assert!(logs.contains(&format!(
            "SphynxMasterChef (masterChef) deployed to {:#x}",
            sender.create(0)
        )));
    }
}
