// Copyright (C) Microsoft Corporation. All rights reserved.

//! The tally controller's operator CLI, mirroring
//! `original_source/scripts/admin_cli.py`'s `click` group one-to-one
//! (spec.md §6 "Operator CLI").

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Operator CLI for the voting ledger's tally controller")]
struct Cli {
    /// Path to the Paillier public key file.
    #[arg(
        long,
        global = true,
        env = "VOTING_ADMIN_PUBKEY_FILE",
        default_value = "./config/paillier_pubkey.json"
    )]
    pubkey_file: PathBuf,

    /// Path to the Shamir shares file.
    #[arg(
        long,
        global = true,
        env = "VOTING_ADMIN_SHARES_FILE",
        default_value = "./config/sss_shares.json"
    )]
    shares_file: PathBuf,

    /// `tracing_subscriber::EnvFilter` directive.
    #[arg(long, global = true, env = "VOTING_ADMIN_LOG_FILTER", default_value = "info")]
    log_filter: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a Paillier keypair and split the private key via SSS.
    GenerateKeys {
        #[arg(long, short = 'n', default_value_t = 4)]
        nodes: u8,
        #[arg(long, short = 't', default_value_t = 3)]
        threshold: u8,
        #[arg(long, default_value_t = 1024)]
        key_length: usize,
    },
    /// Emit the `app_state` genesis fragment.
    SetupGenesis {
        #[arg(long)]
        end_height: u64,
    },
    /// Reconstruct the private key, decrypt the tally, and publish it.
    Tally {
        #[arg(long, default_value = "http://localhost:26657")]
        tendermint_rpc: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    util::logging::init(&cli.log_filter);

    match cli.command {
        Command::GenerateKeys {
            nodes,
            threshold,
            key_length,
        } => {
            voting_tally::keygen::generate_keys(
                nodes,
                threshold,
                key_length,
                &cli.pubkey_file,
                &cli.shares_file,
            )?;
            println!("Key generation complete.");
            println!(
                "Distribute the shares in {:?} to each guardian out of band.",
                cli.shares_file
            );
        }
        Command::SetupGenesis { end_height } => {
            let fragment = voting_tally::genesis::setup_genesis(end_height);
            println!("Copy the following into your genesis file's \"app_state\":");
            println!("{fragment}");
        }
        Command::Tally { tendermint_rpc } => {
            let result =
                voting_tally::tally::tally(&tendermint_rpc, &cli.pubkey_file, &cli.shares_file)?;
            println!("Tally complete and published: {result}");
        }
    }

    Ok(())
}
