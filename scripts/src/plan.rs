//! Deployment plans: ordered lists of contract deployments and method calls,
//! with arguments that may reference the deployer or earlier deployments

use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    fs,
    path::Path,
};

use alloy::primitives::Address;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CONTRACT_REF_PREFIX, DEPLOYER_ARG},
    errors::ScriptError,
};

/// An argument to a constructor or method call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanArg {
    /// The address of the deploying account
    Deployer,
    /// The address of the contract deployed under the given label
    Contract(String),
    /// A literal, coerced to the ABI type of the parameter it is passed as
    Literal(String),
}

impl From<&str> for PlanArg {
    fn from(s: &str) -> Self {
        if s == DEPLOYER_ARG {
            PlanArg::Deployer
        } else if let Some(label) = s.strip_prefix(CONTRACT_REF_PREFIX) {
            PlanArg::Contract(label.to_string())
        } else {
            PlanArg::Literal(s.to_string())
        }
    }
}

impl From<String> for PlanArg {
    fn from(s: String) -> Self {
        PlanArg::from(s.as_str())
    }
}

impl From<PlanArg> for String {
    fn from(arg: PlanArg) -> Self {
        arg.to_string()
    }
}

impl Display for PlanArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PlanArg::Deployer => write!(f, "{}", DEPLOYER_ARG),
            PlanArg::Contract(label) => write!(f, "{}{}", CONTRACT_REF_PREFIX, label),
            PlanArg::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

impl PlanArg {
    /// Resolve the argument to the string passed to the ABI encoder
    pub fn resolve(
        &self,
        deployer: Address,
        deployed: &DeployedContracts,
    ) -> Result<String, ScriptError> {
        match self {
            PlanArg::Deployer => Ok(format!("{:#x}", deployer)),
            PlanArg::Contract(label) => deployed.address(label).map(|a| format!("{:#x}", a)),
            PlanArg::Literal(literal) => Ok(literal.clone()),
        }
    }
}

/// Deploy a contract by name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployStep {
    /// The label under which the deployed address is recorded
    pub label: String,
    /// The name of the contract artifact
    pub contract: String,
    /// The constructor arguments
    #[serde(default)]
    pub args: Vec<PlanArg>,
}

/// Call a method on a contract deployed earlier in the plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStep {
    /// The label of the contract to call
    pub target: String,
    /// The name of the method
    pub method: String,
    /// The method arguments
    #[serde(default)]
    pub args: Vec<PlanArg>,
}

/// A single step of a deployment plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Deploy a contract
    Deploy(DeployStep),
    /// Call a method on a deployed contract
    Call(CallStep),
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Step::Deploy(step) => write!(
                f,
                "{} = {}({})",
                step.label,
                step.contract,
                step.args.iter().join(", ")
            ),
            Step::Call(step) => write!(
                f,
                "{}.{}({})",
                step.target,
                step.method,
                step.args.iter().join(", ")
            ),
        }
    }
}

/// An ordered list of deployment steps
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    /// The name of the plan
    pub name: String,
    /// The steps, executed in order
    pub steps: Vec<Step>,
    /// `(title, label)` pairs printed once the plan completes
    #[serde(default)]
    pub summary: Vec<(String, String)>,
}

impl DeploymentPlan {
    /// Create an empty plan
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            summary: Vec::new(),
        }
    }

    /// Append a deployment of `contract` recorded under `label`
    pub fn deploy<const N: usize>(mut self, label: &str, contract: &str, args: [&str; N]) -> Self {
        self.steps.push(Step::Deploy(DeployStep {
            label: label.to_string(),
            contract: contract.to_string(),
            args: args.into_iter().map(PlanArg::from).collect(),
        }));
        self
    }

    /// Append a call of `method` on the contract recorded under `target`
    pub fn call<const N: usize>(mut self, target: &str, method: &str, args: [&str; N]) -> Self {
        self.steps.push(Step::Call(CallStep {
            target: target.to_string(),
            method: method.to_string(),
            args: args.into_iter().map(PlanArg::from).collect(),
        }));
        self
    }

    /// Append a line to the summary printed after the plan completes
    pub fn summarize(mut self, title: &str, label: &str) -> Self {
        self.summary.push((title.to_string(), label.to_string()));
        self
    }

    /// Read a plan from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadPlan(format!("{}: {}", path.display(), e)))?;
        let plan: Self = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadPlan(format!("{}: {}", path.display(), e)))?;

        plan.validate()?;
        Ok(plan)
    }

    /// Check that labels are unique and that every reference names a
    /// contract deployed by an earlier step
    pub fn validate(&self) -> Result<(), ScriptError> {
        let mut labels = HashSet::new();
        let check_ref = |labels: &HashSet<&str>, label: &str, step: &Step| {
            if labels.contains(label) {
                Ok(())
            } else {
                Err(ScriptError::PlanResolution(format!(
                    "`{}` references `{}` before it is deployed",
                    step, label
                )))
            }
        };

        for step in &self.steps {
            let args = match step {
                Step::Deploy(deploy) => &deploy.args,
                Step::Call(call) => {
                    check_ref(&labels, &call.target, step)?;
                    &call.args
                }
            };

            for arg in args {
                if let PlanArg::Contract(label) = arg {
                    check_ref(&labels, label, step)?;
                }
            }

            if let Step::Deploy(deploy) = step {
                if !labels.insert(deploy.label.as_str()) {
                    return Err(ScriptError::PlanResolution(format!(
                        "label `{}` is deployed more than once",
                        deploy.label
                    )));
                }
            }
        }

        for (title, label) in &self.summary {
            if !labels.contains(label.as_str()) {
                return Err(ScriptError::PlanResolution(format!(
                    "summary line `{}` references unknown label `{}`",
                    title, label
                )));
            }
        }

        Ok(())
    }
}

impl Display for DeploymentPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "plan `{}`:", self.name)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {:>2}. {}", i + 1, step)?;
        }
        Ok(())
    }
}

/// A contract deployed while executing a plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The label of the deploy step
    pub label: String,
    /// The name of the contract artifact
    pub contract: String,
    /// The address of the deployed contract
    pub address: Address,
}

/// The contracts deployed so far, in deployment order
#[derive(Clone, Debug, Default)]
pub struct DeployedContracts {
    /// The deployed contracts
    contracts: Vec<DeployedContract>,
}

impl DeployedContracts {
    /// Record a newly deployed contract
    pub fn insert(&mut self, label: &str, contract: &str, address: Address) {
        self.contracts.push(DeployedContract {
            label: label.to_string(),
            contract: contract.to_string(),
            address,
        });
    }

    /// Get the contract deployed under `label`
    pub fn get(&self, label: &str) -> Result<&DeployedContract, ScriptError> {
        self.contracts.iter().find(|c| c.label == label).ok_or_else(|| {
            ScriptError::PlanResolution(format!("no contract deployed under `{}`", label))
        })
    }

    /// Get the address of the contract deployed under `label`
    pub fn address(&self, label: &str) -> Result<Address, ScriptError> {
        self.get(label).map(|c| c.address)
    }

    /// Iterate over the deployed contracts in deployment order
    pub fn iter(&self) -> impl Iterator<Item = &DeployedContract> {
        self.contracts.iter()
    }

    /// The number of deployed contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether nothing has been deployed
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
