use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scope",
    about = "Versioned component scopes and the workspaces that tag into them",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a workspace, or a bare scope with --bare
    Init(InitArgs),
    /// Track a component directory
    Add(AddArgs),
    /// Reconcile the workspace and show component states
    Status(StatusArgs),
    /// Tag new or modified components into the scope
    Tag(TagArgs),
    /// Push staged components to a remote
    Export(ExportArgs),
    /// Show one tracked component
    Show(ShowArgs),
    /// Remove a staged version from the scope
    Untag(UntagArgs),
    /// List components in the scope or on a remote
    List(ListArgs),
    /// Manage remote scopes
    Remote(RemoteArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<String>,
    #[arg(long)]
    pub bare: bool,
    /// Scope name (defaults to the directory name)
    #[arg(long, requires = "bare")]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Component directory
    pub path: String,
    /// Identifier to track it as (namespace/name)
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct TagArgs {
    /// Component to tag; every tracked component when omitted
    pub id: Option<String>,
    /// Tag even if unchanged
    #[arg(short, long)]
    pub force: bool,
    #[arg(long, group = "bump")]
    pub patch: bool,
    #[arg(long, group = "bump")]
    pub minor: bool,
    #[arg(long, group = "bump")]
    pub major: bool,
    /// Exact version to tag
    #[arg(long, group = "bump")]
    pub exact: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,
    /// Export every staged component
    #[arg(short, long, conflicts_with = "id")]
    pub all: bool,
    /// Remote alias; defaults to the only configured remote
    #[arg(short, long)]
    pub remote: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Args)]
pub struct UntagArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// List what a remote owns instead
    pub remote: Option<String>,
}

#[derive(Args)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub action: Option<RemoteAction>,
    /// Operate on the user-wide table
    #[arg(short, long, global = true)]
    pub global: bool,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    Add { name: String, address: String },
    #[command(alias = "remove")]
    Rm { name: String },
    List,
}
