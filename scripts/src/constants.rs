//! Constants used in the deploy scripts

/// The number of confirmations to wait for on each transaction
pub const NUM_CONFIRMATIONS: u64 = 1;

/// The default RPC URL, a local development node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default root of the Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The deployments key in the deployments file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The plan argument that resolves to the deployer's address
pub const DEPLOYER_ARG: &str = "deployer";

/// The prefix marking a plan argument as a reference to an earlier step
pub const CONTRACT_REF_PREFIX: &str = "$";

// --------------------
// | Contract Names |
// --------------------

/// The master chef farming contract
pub const MASTER_CHEF_CONTRACT: &str = "SphynxMasterChef";
/// The authority contract holding the governor, guardian, policy & vault roles
pub const AUTHORITY_CONTRACT: &str = "SphynxAuthority";
/// The protocol's ERC20 token
pub const TOKEN_CONTRACT: &str = "SphynxERC20Token";
/// The treasury contract
pub const TREASURY_CONTRACT: &str = "SphynxTreasury";
/// The bond depository contract
pub const BOND_DEPOSITORY_CONTRACT: &str = "SphynxBondDepository";
/// The bonding calculator contract
pub const BONDING_CALCULATOR_CONTRACT: &str = "SphynxBondingCalculator";
/// The staked token (rebasing) contract
pub const STAKED_TOKEN_CONTRACT: &str = "sSphynx";
/// The governance token contract deployed by the `staking` plan
pub const GOHM_CONTRACT: &str = "gOHM";
/// The governance token contract deployed by the `staking-setup` plan
pub const GSPH_CONTRACT: &str = "gSPH";
/// The staking contract
pub const STAKING_CONTRACT: &str = "SphynxStaking";
/// The rewards distributor contract
pub const DISTRIBUTOR_CONTRACT: &str = "Distributor";
/// The bond teller contract
pub const BOND_TELLER_CONTRACT: &str = "BondTeller";

// ---------------------
// | Master Chef Args |
// ---------------------

/// The reward token passed to the master chef
pub const MASTER_CHEF_TOKEN: &str = "0xc183062db25fc96325485ea369c979ce881ac0ea";
/// The dev address passed to the master chef
pub const MASTER_CHEF_DEV_ADDRESS: &str = "0x04Dc3d07820074CDbE4D1B2b4eF7c095FA52a102";
/// The reward emitted per block by the master chef
pub const MASTER_CHEF_REWARD_PER_BLOCK: &str = "30000";
/// The block at which master chef rewards start
pub const MASTER_CHEF_START_BLOCK: &str = "15503750";

// -----------------
// | Staking Args |
// -----------------

/// The treasury timelock passed at construction
pub const TREASURY_TIMELOCK: &str = "0";
/// The staking epoch length, in blocks
pub const EPOCH_LENGTH: &str = "2200";
/// The first epoch number of the staking contract
pub const FIRST_EPOCH_NUMBER: &str = "550";
/// The first epoch block used by the `staking` plan
pub const STAKING_FIRST_BLOCK_NUMBER: &str = "9505000";
/// The first epoch block used by the `staking-setup` plan
pub const STAKING_SETUP_FIRST_BLOCK_NUMBER: &str = "14987521";
/// The initial index of the staked token
pub const INITIAL_INDEX: &str = "7675210820";
