//! Neoncover CLI - SecurePool insurance on Neon EVM from the terminal.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use alloy::primitives::{Address, TxHash};
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use neoncover::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const SECONDS_PER_DAY: u64 = 86_400;

/// Neoncover - buy cover, file claims and provide liquidity on SecurePool
#[derive(Parser)]
#[command(name = "neoncover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "NEONCOVER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// RPC endpoint (overrides config)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the configured wallet and save the session
    Connect,

    /// Forget the saved session
    Disconnect,

    /// Show session, balances and pool position
    Status,

    /// Show the native balance of an address (default: connected account)
    Balance {
        /// Address to query
        address: Option<Address>,
    },

    /// Purchase a policy
    Buy(BuyArgs),

    /// Submit a claim against a policy
    Claim(ClaimArgs),

    /// Provide liquidity to the capital pool
    Stake {
        /// Amount of pool tokens
        amount: String,
    },

    /// Withdraw liquidity from the capital pool
    Withdraw {
        /// Amount of pool tokens
        amount: String,
    },

    /// Mint test pool tokens from the faucet
    Faucet,

    /// Show capital pool figures
    Pool,

    /// List policy ids held by an address (default: connected account)
    Policies {
        /// Policy holder
        address: Option<Address>,
    },

    /// Show one policy
    Policy {
        /// Policy id
        id: u64,
    },

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the buy command
#[derive(Args)]
struct BuyArgs {
    /// Coverage amount
    #[arg(long)]
    coverage: String,

    /// Coverage duration in days
    #[arg(long, default_value_t = 30)]
    days: u64,

    /// Risk category
    #[arg(long, default_value = "smart-contract")]
    risk: String,

    /// Only print the premium
    #[arg(long)]
    quote: bool,
}

/// Arguments for the claim command
#[derive(Args)]
struct ClaimArgs {
    /// Policy id
    #[arg(long)]
    policy: u64,

    /// Claimed amount
    #[arg(long)]
    amount: String,

    /// Evidence reference (URL, IPFS hash, description)
    #[arg(long)]
    evidence: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<CoverError>() {
                println!("{}", err.user_message());
            }
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "neoncover={level},neoncover_cli={level},{}",
            if verbosity >= 3 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_file = cli.config.clone().unwrap_or_else(config_path);

    if let Commands::Config(args) = cli.command {
        return cmd_config(args, &config_file).await;
    }

    let mut config = load_config(&config_file)
        .await
        .map_err(CoverError::from)
        .with_context(|| format!("failed to load {}", config_file.display()))?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = Some(url);
    }
    let app = App::new(config).await?;

    match cli.command {
        Commands::Connect => app.cmd_connect().await,
        Commands::Disconnect => app.cmd_disconnect().await,
        Commands::Status => app.cmd_status().await,
        Commands::Balance { address } => app.cmd_balance(address).await,
        Commands::Buy(args) => app.cmd_buy(args).await,
        Commands::Claim(args) => app.cmd_claim(args).await,
        Commands::Stake { amount } => app.cmd_stake(&amount).await,
        Commands::Withdraw { amount } => app.cmd_withdraw(&amount).await,
        Commands::Faucet => app.cmd_faucet().await,
        Commands::Pool => app.cmd_pool().await,
        Commands::Policies { address } => app.cmd_policies(address).await,
        Commands::Policy { id } => app.cmd_policy(id).await,
        Commands::Config(_) => Ok(()),
    }
}

/// Wired-up library components for one invocation.
struct App {
    config: CoverConfig,
    rpc_url: String,
    provider: Option<Arc<LocalKeyProvider>>,
    balances: Arc<RpcBalanceReader>,
}

impl App {
    async fn new(config: CoverConfig) -> anyhow::Result<Self> {
        let rpc_url = config.require_rpc_url().map_err(CoverError::from)?.to_owned();
        let balances = Arc::new(RpcBalanceReader::connect(&rpc_url).await?);
        let provider = if config.has_wallet() {
            let provider = config
                .key_provider_builder()
                .build()
                .map_err(CoverError::from)?;
            Some(Arc::new(provider))
        } else {
            None
        };
        Ok(Self {
            config,
            rpc_url,
            provider,
            balances,
        })
    }

    fn session(&self) -> WalletSession {
        let provider = self
            .provider
            .as_ref()
            .map(|p| Arc::clone(p) as Arc<dyn InjectedProvider>);
        let adapter = WalletAdapter::new(provider, Arc::clone(&self.balances) as _)
            .with_network(self.config.network.clone());
        WalletSession::new(adapter, FileStore::new(self.config.session_dir()))
    }

    /// Restored session, connecting first if nothing was saved.
    async fn connected_session(&self) -> anyhow::Result<WalletSession> {
        let mut session = self.session();
        session.initialize().await?;
        if !session.session().connected {
            session.connect_wallet().await?;
        }
        Ok(session)
    }

    async fn account(&self, explicit: Option<Address>) -> anyhow::Result<Address> {
        if let Some(address) = explicit {
            return Ok(address);
        }
        let session = self.connected_session().await?;
        session
            .session()
            .address
            .context("no connected account")
    }

    fn contract_addresses(&self) -> Result<ContractAddresses> {
        self.config
            .contract_addresses()
            .ok_or(CoverError::NotConfigured)
    }

    async fn reader(&self) -> anyhow::Result<CoverContracts> {
        let addresses = self.contract_addresses()?;
        let transport = RpcTransport::read_only(&self.rpc_url)
            .await
            .map_err(|e| CoverError::read("transport", e))?;
        Ok(CoverContracts::new(transport).with_addresses(addresses))
    }

    async fn writer(&self) -> anyhow::Result<CoverContracts> {
        let addresses = self.contract_addresses()?;
        self.connected_session().await?;
        let Some(provider) = self.provider.as_ref() else {
            return Err(CoverError::NoProvider.into());
        };
        let transport = RpcTransport::with_signer(provider.signer().clone(), &self.rpc_url)
            .await
            .map_err(|e| CoverError::rpc(e.to_string()))?;
        Ok(CoverContracts::new(transport).with_addresses(addresses))
    }

    fn print_tx(&self, label: &str, tx_hash: TxHash) {
        println!("{label}: {tx_hash}");
        if let Some(url) = self.config.network.explorer_tx_url(tx_hash) {
            println!("  {url}");
        }
    }

    async fn cmd_connect(&self) -> anyhow::Result<()> {
        let mut session = self.session();
        let wallet = session.connect_wallet().await?;
        println!("Connected: {}", wallet.address);
        println!("Balance:   {} {}", wallet.balance, self.config.network.native_currency.symbol);
        Ok(())
    }

    async fn cmd_disconnect(&self) -> anyhow::Result<()> {
        self.session().disconnect_wallet().await?;
        println!("Disconnected");
        Ok(())
    }

    async fn cmd_status(&self) -> anyhow::Result<()> {
        let mut session = self.session();
        session.initialize().await?;
        let state = session.session();

        let network = &self.config.network;
        println!("Network: {} ({})", network.chain_name, network.chain_id_hex());
        println!("RPC:     {}", self.rpc_url);
        println!();
        println!("Session: {:?}", state.phase());
        let Some(address) = state.address else {
            println!("Run 'neoncover connect' to connect a wallet.");
            return Ok(());
        };
        println!("  Address: {address}");
        println!("  Balance: {} {}", state.balance, network.native_currency.symbol);

        if self.config.contract_addresses().is_some() {
            let contracts = self.reader().await?;
            let overview = contracts.account_overview(address).await?;
            let allowance = contracts.get_token_allowance(address).await?;
            println!();
            println!("Pool token balance: {}", overview.token_balance);
            println!("Pool allowance:     {allowance}");
            println!("Policies:           {:?}", overview.policy_ids);
            println!("Pool deposits:      {}", overview.pool.total_deposits);
        }
        Ok(())
    }

    async fn cmd_balance(&self, address: Option<Address>) -> anyhow::Result<()> {
        let address = self.account(address).await?;
        let adapter = WalletAdapter::new(None, Arc::clone(&self.balances) as _);
        let balance = adapter.get_balance(address).await?;
        println!("{address}: {balance} {}", self.config.network.native_currency.symbol);
        Ok(())
    }

    async fn cmd_buy(&self, args: BuyArgs) -> anyhow::Result<()> {
        let duration = args
            .days
            .checked_mul(SECONDS_PER_DAY)
            .context("duration too long")?;
        if args.quote {
            let premium = self.reader().await?.calculate_premium(&args.coverage, duration).await?;
            println!("Premium: {premium} {}", self.config.network.native_currency.symbol);
            return Ok(());
        }

        let outcome = self
            .writer()
            .await?
            .purchase_policy(&args.coverage, duration, &args.risk)
            .await?;
        self.print_tx("Policy purchased", outcome.tx_hash);
        if let Some(id) = outcome.policy_id {
            println!("Policy id: {id}");
        }
        Ok(())
    }

    async fn cmd_claim(&self, args: ClaimArgs) -> anyhow::Result<()> {
        let outcome = self
            .writer()
            .await?
            .submit_claim(args.policy, &args.amount, &args.evidence)
            .await?;
        self.print_tx("Claim submitted", outcome.tx_hash);
        Ok(())
    }

    async fn cmd_stake(&self, amount: &str) -> anyhow::Result<()> {
        let outcome = self.writer().await?.provide_liquidity(amount).await?;
        self.print_tx("Liquidity provided", outcome.tx_hash);
        Ok(())
    }

    async fn cmd_withdraw(&self, amount: &str) -> anyhow::Result<()> {
        let outcome = self.writer().await?.withdraw_liquidity(amount).await?;
        self.print_tx("Liquidity withdrawn", outcome.tx_hash);
        Ok(())
    }

    async fn cmd_faucet(&self) -> anyhow::Result<()> {
        let outcome = self.writer().await?.use_faucet().await?;
        self.print_tx("Faucet used", outcome.tx_hash);
        Ok(())
    }

    async fn cmd_pool(&self) -> anyhow::Result<()> {
        let stats = self.reader().await?.get_capital_pool_stats().await?;
        println!("Total deposits:      {}", stats.total_deposits);
        println!("Available liquidity: {}", stats.available_liquidity);
        println!("Locked liquidity:    {}", stats.locked_liquidity);
        println!("Total rewards:       {}", stats.total_rewards);
        Ok(())
    }

    async fn cmd_policies(&self, address: Option<Address>) -> anyhow::Result<()> {
        let address = self.account(address).await?;
        let ids = self.reader().await?.get_user_policies(address).await?;
        if ids.is_empty() {
            println!("No policies for {address}");
        }
        for id in ids {
            println!("{id}");
        }
        Ok(())
    }

    async fn cmd_policy(&self, id: u64) -> anyhow::Result<()> {
        let policy = self.reader().await?.get_policy_details(id).await?;
        println!("{}", serde_json::to_string_pretty(&policy)?);
        Ok(())
    }
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: &std::path::Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Init => {
            if !init_config(config_file).await.map_err(CoverError::from)? {
                bail!("configuration already exists at {}", config_file.display());
            }
            println!("Configuration created: {}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = load_config(config_file).await.map_err(CoverError::from)?;
            println!("{config:#?}");
        }
        ConfigCommands::Validate => {
            let config = load_config(config_file).await.map_err(CoverError::from)?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.level == IssueLevel::Error) {
                bail!("configuration has errors");
            }
        }
    }
    Ok(())
}
