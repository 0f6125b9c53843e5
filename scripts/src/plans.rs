//! The built-in deployment plans

use std::fmt::{self, Display};

use clap::ValueEnum;

use crate::{
    constants::{
        AUTHORITY_CONTRACT, BONDING_CALCULATOR_CONTRACT, BOND_DEPOSITORY_CONTRACT,
        BOND_TELLER_CONTRACT, DISTRIBUTOR_CONTRACT, EPOCH_LENGTH, FIRST_EPOCH_NUMBER,
        GOHM_CONTRACT, GSPH_CONTRACT, INITIAL_INDEX, MASTER_CHEF_CONTRACT,
        MASTER_CHEF_DEV_ADDRESS, MASTER_CHEF_REWARD_PER_BLOCK, MASTER_CHEF_START_BLOCK,
        MASTER_CHEF_TOKEN, STAKED_TOKEN_CONTRACT, STAKING_CONTRACT, STAKING_FIRST_BLOCK_NUMBER,
        STAKING_SETUP_FIRST_BLOCK_NUMBER, TOKEN_CONTRACT, TREASURY_CONTRACT, TREASURY_TIMELOCK,
    },
    plan::DeploymentPlan,
};

/// The built-in deployment plans
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanKind {
    /// The master chef farm
    Masterchef,
    /// The staking system: authority, token, treasury, staked & governance
    /// tokens, staking and distributor
    Staking,
    /// The staking system together with the bonding contracts
    StakingSetup,
}

impl Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Masterchef => write!(f, "masterchef"),
            PlanKind::Staking => write!(f, "staking"),
            PlanKind::StakingSetup => write!(f, "staking-setup"),
        }
    }
}

/// Parameters of the staking contracts that may be overridden on the command
/// line; `None` keeps the plan's default
#[derive(Clone, Debug, Default)]
pub struct StakingParams {
    /// The epoch length, in blocks
    pub epoch_length: Option<String>,
    /// The number of the first epoch
    pub first_epoch_number: Option<String>,
    /// The block at which the first epoch ends
    pub first_block_number: Option<String>,
    /// The initial index of the staked token
    pub initial_index: Option<String>,
}

impl PlanKind {
    /// Build the plan with the given overrides
    pub fn build(self, params: &StakingParams) -> DeploymentPlan {
        match self {
            PlanKind::Masterchef => masterchef_plan(),
            PlanKind::Staking => staking_plan(params),
            PlanKind::StakingSetup => staking_setup_plan(params),
        }
    }
}

/// Deploy the master chef with its reward token, dev address, reward rate and
/// start block
pub fn masterchef_plan() -> DeploymentPlan {
    DeploymentPlan::new(&PlanKind::Masterchef.to_string())
        .deploy(
            "masterChef",
            MASTER_CHEF_CONTRACT,
            [
                MASTER_CHEF_TOKEN,
                MASTER_CHEF_DEV_ADDRESS,
                MASTER_CHEF_REWARD_PER_BLOCK,
                MASTER_CHEF_START_BLOCK,
            ],
        )
        .summarize("MasterChef", "masterChef")
}

/// Deploy the staking system and initialize the staked token
pub fn staking_plan(params: &StakingParams) -> DeploymentPlan {
    let epoch_length = params.epoch_length.as_deref().unwrap_or(EPOCH_LENGTH);
    let first_epoch_number = params.first_epoch_number.as_deref().unwrap_or(FIRST_EPOCH_NUMBER);
    let first_block_number =
        params.first_block_number.as_deref().unwrap_or(STAKING_FIRST_BLOCK_NUMBER);
    let initial_index = params.initial_index.as_deref().unwrap_or(INITIAL_INDEX);

    DeploymentPlan::new(&PlanKind::Staking.to_string())
        .deploy("authority", AUTHORITY_CONTRACT, ["deployer"; 4])
        .deploy("ohm", TOKEN_CONTRACT, ["$authority"])
        .deploy(
            "treasury",
            TREASURY_CONTRACT,
            ["$ohm", TREASURY_TIMELOCK, "$authority"],
        )
        .deploy("sOHM", STAKED_TOKEN_CONTRACT, [])
        .deploy("gOHM", GOHM_CONTRACT, ["$sOHM"])
        .deploy(
            "staking",
            STAKING_CONTRACT,
            [
                "$ohm",
                "$sOHM",
                "$gOHM",
                epoch_length,
                first_epoch_number,
                first_block_number,
                "$authority",
            ],
        )
        .deploy(
            "distributor",
            DISTRIBUTOR_CONTRACT,
            ["$treasury", "$ohm", "$staking", "$authority"],
        )
        .call("sOHM", "setIndex", [initial_index])
        .call("sOHM", "setgOHM", ["$gOHM"])
        .call("sOHM", "initialize", ["$staking", "$treasury"])
        .summarize("OHM", "ohm")
        .summarize("Sphynx Treasury", "treasury")
        .summarize("Staked Sphynx", "sOHM")
        .summarize("Staking Contract", "staking")
        .summarize("Distributor", "distributor")
}

/// Deploy the staking system together with the bond depository, bonding
/// calculator and bond teller, then initialize the staked token
pub fn staking_setup_plan(params: &StakingParams) -> DeploymentPlan {
    let epoch_length = params.epoch_length.as_deref().unwrap_or(EPOCH_LENGTH);
    let first_epoch_number = params.first_epoch_number.as_deref().unwrap_or(FIRST_EPOCH_NUMBER);
    let first_block_number =
        params.first_block_number.as_deref().unwrap_or(STAKING_SETUP_FIRST_BLOCK_NUMBER);
    let initial_index = params.initial_index.as_deref().unwrap_or(INITIAL_INDEX);

    DeploymentPlan::new(&PlanKind::StakingSetup.to_string())
        .deploy("authority", AUTHORITY_CONTRACT, ["deployer"; 4])
        .deploy("sph", TOKEN_CONTRACT, ["$authority"])
        .deploy(
            "treasury",
            TREASURY_CONTRACT,
            ["$sph", TREASURY_TIMELOCK, "$authority"],
        )
        .deploy(
            "bondDepository",
            BOND_DEPOSITORY_CONTRACT,
            ["$sph", "$treasury", "$authority"],
        )
        .deploy("calculator", BONDING_CALCULATOR_CONTRACT, ["$sph"])
        .deploy("sSPH", STAKED_TOKEN_CONTRACT, [])
        .deploy("gSPH", GSPH_CONTRACT, ["$sSPH"])
        .deploy(
            "staking",
            STAKING_CONTRACT,
            [
                "$sph",
                "$sSPH",
                "$gSPH",
                epoch_length,
                first_epoch_number,
                first_block_number,
                "$authority",
            ],
        )
        .deploy(
            "distributor",
            DISTRIBUTOR_CONTRACT,
            ["$treasury", "$sph", "$staking", "$authority"],
        )
        .deploy(
            "bondTeller",
            BOND_TELLER_CONTRACT,
            [
                "$bondDepository",
                "$staking",
                "$treasury",
                "$sph",
                "$sSPH",
                "$authority",
            ],
        )
        .call("sSPH", "setIndex", [initial_index])
        .call("sSPH", "setgSPH", ["$gSPH"])
        .call("sSPH", "initialize", ["$staking", "$treasury"])
        .summarize("bondTeller deployed to", "bondTeller")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanArg, Step};

    #[test]
    fn test_builtin_plans_are_valid() {
        for kind in PlanKind::value_variants() {
            let plan = kind.build(&StakingParams::default());
            assert_eq!(plan.name, kind.to_string());
            plan.validate().unwrap();
        }
    }

    #[test]
    fn test_staking_overrides() {
        let params = StakingParams {
            first_block_number: Some("20000000".to_string()),
            ..Default::default()
        };
        let plan = staking_plan(&params);

        let Some(Step::Deploy(staking)) = plan.steps.get(5) else {
            panic!("expected the staking deployment at step 6");
        };
        assert_eq!(staking.contract, STAKING_CONTRACT);
        assert_eq!(staking.args[3], PlanArg::Literal("2200".to_string()));
        assert_eq!(staking.args[4], PlanArg::Literal("550".to_string()));
        assert_eq!(staking.args[5], PlanArg::Literal("20000000".to_string()));
    }

    #[test]
    fn test_summary_lines() {
        let summary = |plan: DeploymentPlan| {
            plan.summary.into_iter().map(|(title, _)| title).collect::<Vec<_>>()
        };

        assert_eq!(summary(masterchef_plan()), ["MasterChef"]);
        assert_eq!(
            summary(staking_plan(&StakingParams::default())),
            [
                "OHM",
                "Sphynx Treasury",
                "Staked Sphynx",
                "Staking Contract",
                "Distributor"
            ]
        );
        assert_eq!(
            summary(staking_setup_plan(&StakingParams::default())),
            ["bondTeller deployed to"]
        );
    }

    #[test]
    fn test_plans_use_distinct_first_blocks() {
        let staking = staking_plan(&StakingParams::default()).to_string();
        let setup = staking_setup_plan(&StakingParams::default()).to_string();

        assert!(staking.contains("9505000"));
        assert!(setup.contains("14987521"));
    }
}
