//! The transaction-sending seam of the deploy scripts.
//!
//! [`RpcDeployer`] signs and sends transactions to a node, [`DryRunDeployer`]
//! records them and predicts the addresses contracts would be deployed at.

use std::{
    future::Future,
    sync::{Mutex, MutexGuard},
};

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::debug;

use crate::{constants::NUM_CONFIRMATIONS, errors::ScriptError};

/// Sends the transactions of a deployment plan, one at a time
pub trait ContractDeployer {
    /// The address of the deploying account
    fn deployer_address(&self) -> Address;

    /// Send a contract creation transaction and wait for it to be mined,
    /// returning the address of the new contract
    fn deploy(
        &self,
        creation_code: Bytes,
    ) -> impl Future<Output = Result<Address, ScriptError>> + Send;

    /// Send a transaction calling `to` and wait for it to be mined
    fn call(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> impl Future<Output = Result<TxHash, ScriptError>> + Send;
}

// ----------------
// | RPC Deployer |
// ----------------

/// A deployer sending signed transactions over RPC
#[derive(Clone)]
pub struct RpcDeployer {
    /// The provider, with the deployer's wallet attached
    provider: DynProvider,
    /// The address of the deployer's wallet
    sender: Address,
}

impl RpcDeployer {
    /// Wrap a provider that signs with the wallet of `sender`
    pub fn new(provider: DynProvider, sender: Address) -> Self {
        Self { provider, sender }
    }

    /// Send a transaction and wait for its receipt
    async fn send(&self, tx: TransactionRequest) -> Result<TransactionReceipt, String> {
        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?;
        debug!("sent transaction {:#x}", pending_tx.tx_hash());

        pending_tx
            .with_required_confirmations(NUM_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| e.to_string())
    }
}

/// Check that a mined transaction did not revert
fn check_status(receipt: &TransactionReceipt) -> Result<(), String> {
    if !receipt.status() {
        return Err(format!("transaction {:#x} reverted", receipt.transaction_hash));
    }

    Ok(())
}

/// The address of the contract created by a mined deployment transaction
fn deployed_address(receipt: &TransactionReceipt) -> Result<Address, ScriptError> {
    check_status(receipt).map_err(ScriptError::ContractDeployment)?;
    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "receipt of {:#x} has no contract address",
            receipt.transaction_hash
        ))
    })
}

impl ContractDeployer for RpcDeployer {
    fn deployer_address(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, creation_code: Bytes) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(creation_code);

        let receipt = self.send(tx).await.map_err(ScriptError::ContractDeployment)?;
        deployed_address(&receipt)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        let receipt = self.send(tx).await.map_err(ScriptError::ContractInteraction)?;
        check_status(&receipt).map_err(ScriptError::ContractInteraction)?;
        Ok(receipt.transaction_hash)
    }
}

// --------------------
// | Dry Run Deployer |
// --------------------

/// A transaction recorded by the [`DryRunDeployer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedTx {
    /// A contract creation
    Deploy {
        /// The creation code, including constructor arguments
        creation_code: Bytes,
        /// The predicted address of the contract
        address: Address,
    },
    /// A method call
    Call {
        /// The called contract
        to: Address,
        /// The calldata, including the selector
        calldata: Bytes,
    },
}

/// A deployer that records transactions instead of sending them.
///
/// Addresses are predicted from the deployer's address and a local nonce
/// that every recorded transaction increments, as a fresh account would see
/// on chain.
#[derive(Debug)]
pub struct DryRunDeployer {
    /// The address of the deploying account
    sender: Address,
    /// The nonce of the next transaction
    nonce: Mutex<u64>,
    /// The transactions recorded so far
    txs: Mutex<Vec<RecordedTx>>,
}

impl DryRunDeployer {
    /// Create a dry-run deployer for `sender` starting at `nonce`
    pub fn new(sender: Address, nonce: u64) -> Self {
        Self {
            sender,
            nonce: Mutex::new(nonce),
            txs: Mutex::new(Vec::new()),
        }
    }

    /// The transactions recorded so far, in order
    pub fn transactions(&self) -> Vec<RecordedTx> {
        lock(&self.txs).clone()
    }

    /// Take the nonce of the next transaction
    fn next_nonce(&self) -> u64 {
        let mut nonce = lock(&self.nonce);
        let next = *nonce;
        *nonce += 1;
        next
    }

    /// Record a transaction
    fn record(&self, tx: RecordedTx) {
        lock(&self.txs).push(tx);
    }
}

impl ContractDeployer for DryRunDeployer {
    fn deployer_address(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, creation_code: Bytes) -> Result<Address, ScriptError> {
        let address = self.sender.create(self.next_nonce());
        self.record(RecordedTx::Deploy {
            creation_code,
            address,
        });

        Ok(address)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        self.next_nonce();
        self.record(RecordedTx::Call { to, calldata });
        Ok(TxHash::ZERO)
    }
}

/// Lock a mutex, recovering the data if a panicking thread poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, bytes, Bloom};
    use serde_json::json;

    use super::*;

    /// The address of the default anvil account
    const SENDER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    /// A mined EIP-1559 receipt with the given status and created contract
    fn receipt(status: bool, contract_address: Option<Address>) -> TransactionReceipt {
        let receipt = json!({
            "type": "0x2",
            "status": if status { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": Bloom::ZERO,
            "transactionHash": TxHash::repeat_byte(0x11),
            "transactionIndex": "0x0",
            "blockHash": TxHash::repeat_byte(0x22),
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "blobGasUsed": null,
            "blobGasPrice": null,
            "from": SENDER,
            "to": null,
            "contractAddress": contract_address,
        });

        serde_json::from_value(receipt).unwrap()
    }

    #[test]
    fn test_deployed_address() {
        let created = SENDER.create(0);
        assert_eq!(deployed_address(&receipt(true, Some(created))).unwrap(), created);
    }

    #[test]
    fn test_reverted_deployment() {
        let res = deployed_address(&receipt(false, Some(SENDER.create(0))));
        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
    }

    #[test]
    fn test_deployment_without_contract_address() {
        let res = deployed_address(&receipt(true, None));
        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
    }

    #[test]
    fn test_reverted_call() {
        assert!(check_status(&receipt(true, None)).is_ok());
        assert!(check_status(&receipt(false, None)).is_err());
    }

    #[tokio::test]
    async fn test_dry_run_predicts_create_addresses() {
        let deployer = DryRunDeployer::new(SENDER, 0);

        let first = deployer.deploy(bytes!("6080")).await.unwrap();
        deployer.call(first, bytes!("deadbeef")).await.unwrap();
        let second = deployer.deploy(bytes!("6080")).await.unwrap();

        // The first contract deployed by the default anvil account
        assert_eq!(first, address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert_eq!(second, SENDER.create(2));
        assert_eq!(deployer.transactions().len(), 3);
        assert_eq!(
            deployer.transactions()[1],
            RecordedTx::Call {
                to: first,
                calldata: bytes!("deadbeef")
            }
        );
    }
}
