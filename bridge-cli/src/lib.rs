// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, Context};
use clap::*;
use ethers::types::{Address as EthAddress, Bytes, H256, U256};
use message_bridge::bundle::{
    build_bundle_root, build_proof, derive_bundle_id, derive_message_id, verify_proof, BundleProof,
};
use message_bridge::config::BridgeConfig;
use message_bridge::types::Message;
use message_bridge_config::Config;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    #[clap(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum BridgeCommand {
    // Print the id of a message
    #[clap(name = "message-id")]
    MessageId {
        #[clap(long, value_parser = parse_u256)]
        nonce: U256,
        #[clap(long = "from-chain-id", value_parser = parse_u256)]
        from_chain_id: U256,
        #[clap(long)]
        from: EthAddress,
        #[clap(long = "to-chain-id", value_parser = parse_u256)]
        to_chain_id: U256,
        #[clap(long)]
        to: EthAddress,
        // Hex encoded calldata
        #[clap(long, default_value = "0x")]
        data: Bytes,
    },
    #[clap(name = "bundle-root")]
    BundleRoot {
        #[clap(name = "message-ids", use_value_delimiter = true, long, required = true)]
        message_ids: Vec<H256>,
    },
    #[clap(name = "bundle-id")]
    BundleId {
        #[clap(long = "from-chain-id", value_parser = parse_u256)]
        from_chain_id: U256,
        #[clap(long = "to-chain-id", value_parser = parse_u256)]
        to_chain_id: U256,
        #[clap(long = "bundle-root")]
        bundle_root: H256,
    },
    // Print the inclusion proof of the message id at `index` as JSON
    #[clap(name = "build-proof")]
    BuildProof {
        #[clap(name = "message-ids", use_value_delimiter = true, long, required = true)]
        message_ids: Vec<H256>,
        #[clap(long)]
        index: usize,
        #[clap(long = "from-chain-id", value_parser = parse_u256)]
        from_chain_id: U256,
        #[clap(long = "to-chain-id", value_parser = parse_u256)]
        to_chain_id: U256,
    },
    // Check a JSON proof written by `build-proof`
    #[clap(name = "verify-proof")]
    VerifyProof {
        #[clap(long)]
        leaf: H256,
        #[clap(long = "proof-path")]
        proof_path: PathBuf,
        #[clap(long = "bundle-id")]
        bundle_id: H256,
        #[clap(long = "from-chain-id", value_parser = parse_u256)]
        from_chain_id: U256,
        #[clap(long = "to-chain-id", value_parser = parse_u256)]
        to_chain_id: U256,
    },
    #[clap(name = "create-bridge-config-template")]
    CreateBridgeConfigTemplate { path: PathBuf },
    // Load a bridge config and run its consistency checks
    #[clap(name = "validate-bridge-config")]
    ValidateBridgeConfig {
        #[clap(long = "config-path")]
        config_path: PathBuf,
    },
}

// Chain ids and nonces are given in decimal unless prefixed with `0x`.
pub fn parse_u256(s: &str) -> anyhow::Result<U256> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex_str) => U256::from_str_radix(hex_str, 16).map_err(|e| anyhow!("{e}")),
        None => U256::from_dec_str(s).map_err(|e| anyhow!("{e}")),
    };
    parsed.with_context(|| format!("Invalid number {s}"))
}

pub fn format_digest(digest: &H256) -> String {
    format!("0x{}", hex::encode(digest.as_bytes()))
}

pub fn read_proof(path: &Path) -> anyhow::Result<BundleProof> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read proof file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse proof file {}", path.display()))
}

/// Runs an offline command and returns what should be printed.
pub fn run_command(command: BridgeCommand) -> anyhow::Result<String> {
    match command {
        BridgeCommand::MessageId {
            nonce,
            from_chain_id,
            from,
            to_chain_id,
            to,
            data,
        } => {
            let message = Message::new(nonce, from_chain_id, from, to_chain_id, to, data);
            message.validate()?;
            Ok(format_digest(&derive_message_id(&message)))
        }
        BridgeCommand::BundleRoot { message_ids } => {
            Ok(format_digest(&build_bundle_root(&message_ids)?))
        }
        BridgeCommand::BundleId {
            from_chain_id,
            to_chain_id,
            bundle_root,
        } => Ok(format_digest(&derive_bundle_id(
            from_chain_id,
            to_chain_id,
            bundle_root,
        ))),
        BridgeCommand::BuildProof {
            message_ids,
            index,
            from_chain_id,
            to_chain_id,
        } => {
            let proof = build_proof(&message_ids, index, from_chain_id, to_chain_id)?;
            Ok(serde_json::to_string_pretty(&proof)?)
        }
        BridgeCommand::VerifyProof {
            leaf,
            proof_path,
            bundle_id,
            from_chain_id,
            to_chain_id,
        } => {
            let proof = read_proof(&proof_path)?;
            let valid = verify_proof(&leaf, &proof, &bundle_id, from_chain_id, to_chain_id)?;
            info!(?leaf, ?bundle_id, valid, "Proof checked");
            Ok(valid.to_string())
        }
        BridgeCommand::CreateBridgeConfigTemplate { path } => {
            message_bridge::config::generate_bridge_config_and_write_to_file(&path)?;
            Ok(format!(
                "Bridge config template generated at {}",
                path.display()
            ))
        }
        BridgeCommand::ValidateBridgeConfig { config_path } => {
            let config = BridgeConfig::load(&config_path)?;
            config.validate()?;
            Ok(format!(
                "Bridge config at {} is valid: hub chain {}, {} spoke(s)",
                config_path.display(),
                config.hub_chain_id,
                config.spokes.len()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::keccak256;
    use message_bridge::error::BridgeError;

    const ID_A: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const ID_B: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let args = Args::try_parse_from(
            std::iter::once("message-bridge-cli").chain(args.iter().copied()),
        )?;
        run_command(args.command)
    }

    #[test]
    fn test_parse_u256() {
        assert_eq!(parse_u256("1112").unwrap(), U256::from(1112));
        assert_eq!(parse_u256("0x458").unwrap(), U256::from(1112));
        assert!(parse_u256("12ab").is_err());
    }

    #[test]
    fn test_bundle_root_and_id() {
        let root = run(&["bundle-root", "--message-ids", &format!("{ID_A},{ID_B}")]).unwrap();
        let a: H256 = ID_A.parse().unwrap();
        let b: H256 = ID_B.parse().unwrap();
        let expected = H256::from(keccak256([a.as_bytes(), b.as_bytes()].concat()));
        assert_eq!(root, format_digest(&expected));

        let bundle_id = run(&[
            "bundle-id",
            "--from-chain-id",
            "1112",
            "--to-chain-id",
            "1111",
            "--bundle-root",
            &root,
        ])
        .unwrap();
        assert_eq!(
            bundle_id,
            format_digest(&derive_bundle_id(1112.into(), 1111.into(), expected))
        );
    }

    #[test]
    fn test_message_id() {
        let from = EthAddress::repeat_byte(0x5e);
        let to = EthAddress::repeat_byte(0x7e);
        let id = run(&[
            "message-id",
            "--nonce",
            "1",
            "--from-chain-id",
            "1112",
            "--from",
            &format!("{from:?}"),
            "--to-chain-id",
            "1111",
            "--to",
            &format!("{to:?}"),
            "--data",
            "0xdeadbeef",
        ])
        .unwrap();
        let message = Message::new(
            1.into(),
            1112.into(),
            from,
            1111.into(),
            to,
            Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        );
        assert_eq!(id, format_digest(&derive_message_id(&message)));
    }

    #[test]
    fn test_build_and_verify_proof() {
        let ids = format!("{ID_A},{ID_B}");
        let proof_json = run(&[
            "build-proof",
            "--message-ids",
            &ids,
            "--index",
            "1",
            "--from-chain-id",
            "1112",
            "--to-chain-id",
            "1111",
        ])
        .unwrap();
        let proof: BundleProof = serde_json::from_str(&proof_json).unwrap();
        assert_eq!(proof.tree_index, 1);
        assert_eq!(proof.total_leaves, 2);

        let dir = tempfile::tempdir().unwrap();
        let proof_path = dir.path().join("proof.json");
        std::fs::write(&proof_path, &proof_json).unwrap();
        let bundle_id = format_digest(&proof.bundle_id);
        let proof_path = proof_path.to_str().unwrap();
        let verify = |leaf: &str, from_chain_id: &str| {
            run(&[
                "verify-proof",
                "--leaf",
                leaf,
                "--proof-path",
                proof_path,
                "--bundle-id",
                &bundle_id,
                "--from-chain-id",
                from_chain_id,
                "--to-chain-id",
                "1111",
            ])
        };
        assert_eq!(verify(ID_B, "1112").unwrap(), "true");
        assert_eq!(verify(ID_A, "1112").unwrap(), "false");
        assert_eq!(verify(ID_B, "1113").unwrap(), "false");
    }

    #[test]
    fn test_build_proof_index_out_of_range() {
        let err = run(&[
            "build-proof",
            "--message-ids",
            ID_A,
            "--index",
            "1",
            "--from-chain-id",
            "1112",
            "--to-chain-id",
            "1111",
        ])
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_config_template_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.yaml");
        run(&["create-bridge-config-template", path.to_str().unwrap()]).unwrap();
        let output = run(&[
            "validate-bridge-config",
            "--config-path",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(output.contains("1 spoke(s)"));
    }
}
