//! Lookup of Hardhat compilation artifacts by contract name, and encoding of
//! constructor & method calldata against their ABIs

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use serde::Deserialize;
use tracing::debug;

use crate::{constants::ARTIFACT_EXTENSION, errors::ScriptError};

/// The fields of a Hardhat artifact that are needed for deployment
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    /// The name of the compiled contract
    contract_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The hex-encoded creation bytecode
    bytecode: String,
}

/// A compiled contract: the contract factory of the deploy scripts
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The name of the contract
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Parse an artifact from the contents of a Hardhat artifact file
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let HardhatArtifact {
            contract_name,
            abi,
            bytecode,
        } = serde_json::from_str(json).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        // Unlinked library placeholders are not valid hex, so they fail here
        let bytecode = Bytes::from_str(&bytecode).map_err(|e| {
            ScriptError::ArtifactParsing(format!("invalid bytecode for {}: {}", contract_name, e))
        })?;

        Ok(Self {
            name: contract_name,
            abi,
            bytecode,
        })
    }

    /// Build the creation code for a deployment: the bytecode followed by the
    /// ABI-encoded constructor arguments.
    ///
    /// Each argument is a string coerced to the type of the matching
    /// constructor parameter, e.g. `"30000"` for a `uint256`.
    pub fn creation_code(&self, args: &[String]) -> Result<Bytes, ScriptError> {
        if self.bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no creation bytecode, is it abstract or an interface?",
                self.name
            )));
        }

        let encoded_args = match self.abi.constructor() {
            Some(constructor) => {
                let values = coerce_args(&self.name, &constructor.inputs, args)?;
                constructor
                    .abi_encode_input(&values)
                    .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?
            }
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} has no constructor, but {} arguments were given",
                    self.name,
                    args.len()
                )))
            }
        };

        Ok([self.bytecode.as_ref(), encoded_args.as_slice()].concat().into())
    }

    /// Build the calldata for a call to `method`, picking the overload whose
    /// arity matches the given arguments
    pub fn encode_call(&self, method: &str, args: &[String]) -> Result<Bytes, ScriptError> {
        let function = self
            .abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
            .ok_or_else(|| {
                ScriptError::CalldataConstruction(format!(
                    "{} has no method `{}` taking {} arguments",
                    self.name,
                    method,
                    args.len()
                ))
            })?;

        let context = format!("{}.{}", self.name, method);
        let values = coerce_args(&context, &function.inputs, args)?;
        function
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
    }
}

/// Coerce string arguments to the types of the given ABI parameters
fn coerce_args(
    context: &str,
    params: &[Param],
    args: &[String],
) -> Result<Vec<DynSolValue>, ScriptError> {
    if params.len() != args.len() {
        return Err(ScriptError::CalldataConstruction(format!(
            "{} expects {} arguments, got {}",
            context,
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param
                .resolve()
                .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
            ty.coerce_str(arg).map_err(|e| {
                ScriptError::CalldataConstruction(format!(
                    "{}: cannot pass `{}` as {} {}: {}",
                    context, arg, param.ty, param.name, e
                ))
            })
        })
        .collect()
}

/// A directory of Hardhat artifacts, searched by contract name
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The root of the artifacts tree
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the artifact file for the given contract.
    ///
    /// Files in a directory are considered before its subdirectories, and
    /// entries are visited in lexicographic order so that lookup is stable.
    pub fn find(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let file_name = format!("{}.{}", name, ARTIFACT_EXTENSION);
        find_file(&self.root, &file_name)
            .map_err(|e| {
                ScriptError::ReadArtifact(format!("{}: {}", self.root.display(), e))
            })?
            .ok_or_else(|| {
                ScriptError::ReadArtifact(format!(
                    "no artifact for {} under {}",
                    name,
                    self.root.display()
                ))
            })
    }

    /// Look up and parse the artifact for the given contract
    pub fn load(&self, name: &str) -> Result<ContractArtifact, ScriptError> {
        let path = self.find(name)?;
        let json = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ReadArtifact(format!("{}: {}", path.display(), e)))?;

        let artifact = ContractArtifact::from_json(&json)?;
        if artifact.name != name {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} contains contract {}, expected {}",
                path.display(),
                artifact.name,
                name
            )));
        }

        debug!("loaded artifact for {} from {}", name, path.display());
        Ok(artifact)
    }
}

/// Recursively search `dir` for a file named `file_name`
fn find_file(dir: &Path, file_name: &str) -> io::Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    let file = entries
        .iter()
        .find(|path| path.is_file() && path.file_name().is_some_and(|n| n == file_name));
    if let Some(path) = file {
        return Ok(Some(path.clone()));
    }

    for subdir in entries.iter().filter(|path| path.is_dir()) {
        if let Some(path) = find_file(subdir, file_name)? {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
