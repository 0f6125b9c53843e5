//! Tests for artifact lookup by contract name

use std::path::PathBuf;

use alloy::primitives::bytes;
use eyre::Result;
use scripts::{artifacts::ArtifactStore, errors::ScriptError};

/// The artifacts used by the tests
fn fixture_artifacts() -> ArtifactStore {
    ArtifactStore::new(fixtures_dir().join("artifacts"))
}

/// The directory holding the fixture artifact trees
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Artifacts whose names appear at more than one path
fn shadowed_artifacts() -> ArtifactStore {
    ArtifactStore::new(fixtures_dir().join("shadowed"))
}

#[test]
fn test_find_nested_artifact() -> Result<()> {
    let store = fixture_artifacts();

    let path = store.find("SphynxStaking")?;
    assert!(path.ends_with("contracts/staking/SphynxStaking.sol/SphynxStaking.json"));

    let artifact = store.load("SphynxStaking")?;
    assert_eq!(artifact.name, "SphynxStaking");
    let constructor = artifact.abi.constructor().expect("staking has a constructor");
    assert_eq!(constructor.inputs.len(), 7);

    Ok(())
}

#[test]
fn test_debug_files_are_not_artifacts() -> Result<()> {
    let store = fixture_artifacts();

    let path = store.find("BondTeller")?;
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("BondTeller.json")
    );
    store.load("BondTeller")?;

    Ok(())
}

#[test]
fn test_lookup_is_case_sensitive() {
    let store = fixture_artifacts();

    assert!(store.find("sSphynx").is_ok());
    assert!(matches!(
        store.find("SSPHYNX"),
        Err(ScriptError::ReadArtifact(_))
    ));
}

#[test]
fn test_missing_artifact() {
    let store = fixture_artifacts();
    assert!(matches!(
        store.load("SphynxVault"),
        Err(ScriptError::ReadArtifact(_))
    ));
}

#[test]
fn test_missing_root() {
    let store = ArtifactStore::new("/nonexistent/artifacts");
    assert!(matches!(
        store.find("SphynxStaking"),
        Err(ScriptError::ReadArtifact(_))
    ));
}

#[test]
fn test_interface_cannot_be_deployed() -> Result<()> {
    let store = fixture_artifacts();

    let artifact = store.load("IERC20")?;
    assert!(matches!(
        artifact.creation_code(&[]),
        Err(ScriptError::ArtifactParsing(_))
    ));

    Ok(())
}

#[test]
fn test_files_found_before_subdirectories() -> Result<()> {
    let store = shadowed_artifacts();

    // `A.sol/` sorts before `Vault.json`, but the file in the root wins
    let path = store.find("Vault")?;
    assert_eq!(path, fixtures_dir().join("shadowed").join("Vault.json"));
    assert_eq!(store.load("Vault")?.bytecode, bytes!("0x60806040526001"));

    Ok(())
}

#[test]
fn test_first_match_in_sorted_order() -> Result<()> {
    let store = shadowed_artifacts();

    let path = store.find("Pool")?;
    assert!(path.ends_with("b.sol/Pool.json"));
    assert_eq!(store.load("Pool")?.bytecode, bytes!("0x60806040526003"));

    Ok(())
}
