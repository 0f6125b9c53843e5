//! Utilities for the deploy scripts.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{constants::DEPLOYMENTS_KEY, deployer::RpcDeployer, errors::ScriptError};

/// Sets up the client used to send deployment transactions, signing with the
/// given private key and checking that the RPC endpoint is reachable.
pub async fn setup_client(priv_key: &str, rpc_url: &str) -> Result<RpcDeployer, ScriptError> {
    let signer = parse_signer(priv_key)?;
    let sender = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    let provider = DynProvider::new(provider);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("connected to chain {} as {:#x}", chain_id, sender);

    Ok(RpcDeployer::new(provider, sender))
}

/// Parse a hex-encoded private key
pub fn parse_signer(priv_key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

// ---------------------
// | Deployments File |
// ---------------------

/// Read and parse a JSON file
pub fn get_json_from_file(file_path: &Path) -> Result<Value, ScriptError> {
    let contents = fs::read_to_string(file_path)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", file_path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", file_path.display(), e)))
}

/// Record `address` under `contract_key` in the deployments file, creating the
/// file if it does not exist and keeping any other entries
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json = if file_path.exists() {
        get_json_from_file(file_path)?
    } else {
        Value::Object(Map::new())
    };

    let not_an_object = || {
        ScriptError::WriteDeployments(format!(
            "{} is not a JSON object of deployments",
            file_path.display()
        ))
    };
    let deployments = parsed_json
        .as_object_mut()
        .ok_or_else(not_an_object)?
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(not_an_object)?;
    deployments.insert(
        contract_key.to_string(),
        Value::String(format!("{address:#x}")),
    );

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents)
        .map_err(|e| ScriptError::WriteDeployments(format!("{}: {}", file_path.display(), e)))
}

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf};

    use alloy::primitives::address;

    use super::*;

    /// Read the address recorded under `contract_key` in the deployments file
    fn parse_addr_from_deployments_file(
        file_path: &Path,
        contract_key: &str,
    ) -> Result<Address, ScriptError> {
        let parsed_json = get_json_from_file(file_path)?;

        let addr_str = parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!(
                    "no address for {} in {}",
                    contract_key,
                    file_path.display()
                ))
            })?;

        Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }

    /// A deployments file path unique to this process and test
    fn temp_deployments_path(test_name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "sphynx-deployments-{}-{}.json",
            std::process::id(),
            test_name
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_write_creates_missing_file() {
        let path = temp_deployments_path("create");
        let staking = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

        write_deployed_address(&path, "staking", staking).unwrap();
        assert_eq!(parse_addr_from_deployments_file(&path, "staking").unwrap(), staking);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_keeps_other_entries() {
        let path = temp_deployments_path("update");
        fs::write(
            &path,
            r#"{ "network": "bsc", "deployments": { "authority": "0x04dc3d07820074cdbe4d1b2b4ef7c095fa52a102" } }"#,
        )
        .unwrap();

        let treasury = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");
        write_deployed_address(&path, "treasury", treasury).unwrap();

        let json = get_json_from_file(&path).unwrap();
        assert_eq!(json["network"], "bsc");
        assert_eq!(
            parse_addr_from_deployments_file(&path, "authority").unwrap(),
            address!("0x04Dc3d07820074CDbE4D1B2b4eF7c095FA52a102")
        );
        assert_eq!(parse_addr_from_deployments_file(&path, "treasury").unwrap(), treasury);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_rejects_non_object_file() {
        let path = temp_deployments_path("array");
        fs::write(&path, "[]").unwrap();

        let res = write_deployed_address(&path, "staking", Address::ZERO);
        assert!(matches!(res, Err(ScriptError::WriteDeployments(_))));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_key() {
        let path = temp_deployments_path("missing");
        write_deployed_address(&path, "staking", Address::ZERO).unwrap();

        let res = parse_addr_from_deployments_file(&path, "distributor");
        assert!(matches!(res, Err(ScriptError::ReadDeployments(_))));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_signer() {
        // The default anvil account
        let signer =
            parse_signer("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
                .unwrap();
        assert_eq!(
            signer.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert!(parse_signer("not-a-key").is_err());
    }
}
