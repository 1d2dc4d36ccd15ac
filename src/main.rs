// dao - drive an organization through governance and treasury actions

use clap::{Parser, Subcommand};
use dao_ledger::governance::{GovernanceRule, OrganizationConfig, Vote};
use dao_ledger::multisig::ApprovalEngine;
use dao_ledger::registry::Registry;
use dao_ledger::transactions::Transaction;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dao")]
#[command(about = "Hash-chained DAO ledger with multisig treasury approvals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session: rules, membership, a proposal and a token sale
    Demo {
        /// Organization name
        #[arg(long, default_value = "RevoDAO")]
        name: String,

        /// Comma-separated founder names
        #[arg(long, value_delimiter = ',', default_value = "Mihail,Ben,Moritz")]
        founders: Vec<String>,

        /// Name of the governance token
        #[arg(long, default_value = "REVO")]
        token: String,

        /// Tokens split between founders
        #[arg(long, default_value_t = 900)]
        supply: u64,

        /// Approvals needed from founders before a treasury action runs
        #[arg(long, default_value_t = 2)]
        required: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Demo {
            name,
            founders,
            token,
            supply,
            required,
        } => run_demo(&name, founders, &token, supply, required),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run_demo(
    name: &str,
    founders: Vec<String>,
    token: &str,
    supply: u64,
    required: usize,
) -> Result<(), Box<dyn Error>> {
    let registry = Registry::new();
    let config = OrganizationConfig::new()
        .with_token_name(token)
        .with_initial_supply(supply);
    let org_id = registry.create_organization(name, founders.clone(), config)?;
    let wallet_id = registry.register_wallet(ApprovalEngine::new(founders.clone(), required)?)?;

    // Governance: rules, a new member, and one proposal through to passage
    let proposal_id = registry.with_organization(org_id, |org| {
        println!("{}", org.set_rule(GovernanceRule::Quorum(2)));
        println!("{}", org.set_rule(GovernanceRule::MinVotesToPass(2)));
        println!("{}", org.add_member("Alice"));

        let id = org.create_proposal(
            "Increase Supply",
            "Mint more tokens for the contributor pool",
            founders.first().map(String::as_str).unwrap_or_default(),
        );
        org.start_voting(id)?;
        for voter in founders.iter().take(2) {
            println!("{}", org.cast_vote(id, voter, Vote::Yes)?);
        }
        println!("{}", org.evaluate_proposal(id)?);
        Ok::<_, dao_ledger::governance::GovernanceError>(id)
    })??;
    info!(proposal = %proposal_id, "demo proposal decided");

    // Treasury: each founder approves separately until the threshold is met
    let sale = Transaction::token_sale("Alice", 100, 1.5);
    let approval = registry.submit_transaction(wallet_id, &sale)?;
    for owner in &founders {
        if registry.approve(wallet_id, approval, owner)? {
            break;
        }
    }
    let receipt = registry.execute_transaction(org_id, wallet_id, &sale, approval)?;
    println!("{}", receipt);

    registry.with_organization(org_id, |org| {
        let summary = org.summary();
        println!();
        println!("Organization {} ({})", summary.name, summary.id);
        println!("  token: {} supply {}", summary.token_name, summary.initial_supply);
        println!("  rules: {}", summary.rules);
        for (member, balance) in &summary.balances {
            println!("  {:<12} {:>8}", member, balance);
        }

        println!();
        for block in org.ledger().snapshot() {
            let kinds: Vec<&str> = block.payload.iter().map(|r| r.kind()).collect();
            println!(
                "#{:<3} {} {} <- {} [{}]",
                block.index,
                block.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
                &block.fingerprint[..16],
                &block.previous_fingerprint[..block.previous_fingerprint.len().min(16)],
                kinds.join(", ")
            );
        }

        org.ledger().verify()
    })??;
    println!("ledger verified");

    Ok(())
}
