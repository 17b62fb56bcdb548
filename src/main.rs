use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qcdesk::api::SortOrder;
use qcdesk::model::{EntryKind, Role, Shift};

mod cmd;

#[derive(Parser)]
#[command(name = "qcdesk")]
#[command(version, about = "Quality-control desk for IPQC/OQC entry, history and reporting")]
pub struct Cli {
    /// QC API base URL. Overrides qcdesk.toml and QCDESK_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to qcdesk.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding session.json and prefs.json
    #[arg(long, global = true, env = "QCDESK_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// IPQC entries, dashboard and history
    Ipqc {
        #[command(subcommand)]
        command: IpqcCommands,
    },
    /// OQC entries, dashboard and history
    Oqc {
        #[command(subcommand)]
        command: OqcCommands,
    },
    /// Product master data (ADMIN)
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// User accounts (ADMIN)
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Admin dashboards (ADMIN)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default qcdesk.toml file
    Init,
}

/// Date, shift, plant and line. Unset values fall back to qcdesk.toml, then
/// today / S1.
#[derive(Args, Clone, Debug, Default)]
pub struct ScopeArgs {
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub shift: Option<Shift>,
    #[arg(long)]
    pub plant: Option<String>,
    #[arg(long)]
    pub line: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Search product code or name
    #[arg(short, long)]
    pub query: Option<String>,
    /// Only rows recorded by me
    #[arg(long)]
    pub mine: bool,
    #[arg(long, default_value = "1")]
    pub page: u32,
    /// Rows per page (default from qcdesk.toml)
    #[arg(long)]
    pub take: Option<u32>,
    /// Write the page as CSV; a directory gets the default file name
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand, Clone)]
pub enum IpqcCommands {
    /// List entries for a date and shift
    Entries {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Dashboard totals and pass rates
    Summary {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Carry-over quantities from the shift before
    Previous {
        /// Product id or code
        #[arg(long)]
        product: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Create an entry
    Submit {
        /// Product id or code
        #[arg(long)]
        product: String,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Start from the previous shift's quantities
        #[arg(long)]
        from_previous: bool,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        after_postcured: Option<String>,
        /// Pass everything entered as "before"
        #[arg(long, conflicts_with_all = ["after", "after_postcured"])]
        all_pass: bool,
        /// Do not take "after" out of "before"
        #[arg(long)]
        no_auto_deduct: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Edit an entry in place
    Edit {
        id: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        after_postcured: Option<String>,
        #[arg(long)]
        no_auto_deduct: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete an entry
    Delete {
        id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Write the entry list as CSV
    Export {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Audit trail of IPQC changes
    History(HistoryArgs),
}

#[derive(Subcommand, Clone)]
pub enum OqcCommands {
    /// List entries for a date and shift
    Entries {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Dashboard totals
    Summary {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Create an entry. Values are taken as given and must satisfy
    /// after + hold <= source.
    Submit {
        /// Product id or code
        #[arg(long)]
        product: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        hold: Option<String>,
        /// Pass everything that is not on hold
        #[arg(long)]
        all_pass: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Edit an entry in place
    Edit {
        id: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        hold: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete an entry
    Delete {
        id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Write the entry list as CSV
    Export {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Audit trail of OQC changes
    History(HistoryArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct ProductFields {
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub uom: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum ProductsCommands {
    /// Page through products. Unset options reuse the last listing.
    List {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        take: Option<u32>,
        #[arg(long)]
        include_inactive: Option<bool>,
    },
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Mark a product inactive
    Deactivate { id: String },
    /// Make an inactive product active again
    Restore { id: String },
}

#[derive(Subcommand, Clone)]
pub enum UsersCommands {
    List {
        /// Filter on name, email or role
        #[arg(short, long)]
        filter: Option<String>,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: Role,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Change a user's role
    Role { id: String, role: Role },
    /// Reset a user's password
    Password {
        id: String,
        #[arg(long)]
        password: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Clone)]
pub enum AdminCommands {
    /// Counts for today and the latest entries
    Overview {
        /// Which recent entries to show (default: last used)
        #[arg(long)]
        kind: Option<EntryKind>,
        #[arg(long, default_value = "10")]
        take: u32,
    },
    /// Totals per product over a date range
    Totals {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        plant: Option<String>,
        #[arg(long)]
        line: Option<String>,
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        #[arg(long, default_value = "20")]
        take: u32,
        /// Write the totals as CSV; a directory gets the default file name
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "qcdesk=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Login { email, password } => {
            cmd::cmd_login(&cli, email.clone(), password.clone()).await?
        }
        Commands::Logout => cmd::cmd_logout(&cli)?,
        Commands::Whoami => cmd::cmd_whoami(&cli)?,
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
        Commands::Ipqc { command } => cmd::cmd_ipqc(&cli, command.clone()).await?,
        Commands::Oqc { command } => cmd::cmd_oqc(&cli, command.clone()).await?,
        Commands::Products { command } => cmd::cmd_products(&cli, command.clone()).await?,
        Commands::Users { command } => cmd::cmd_users(&cli, command.clone()).await?,
        Commands::Admin { command } => cmd::cmd_admin(&cli, command.clone()).await?,
    }

    Ok(())
}
