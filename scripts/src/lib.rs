//! Scripts for deploying and initializing the Sphynx token, treasury, staking,
//! bonding & farming contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod executor;
pub mod plan;
pub mod plans;
pub mod utils;
