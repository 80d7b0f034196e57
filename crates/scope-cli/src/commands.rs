use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use scope_core::{Remote, Scope, ScopeConfig};
use scope_remote::config as global;
use scope_types::{ComponentId, VersionBump};
use scope_workspace::{ComponentStatus, StatusReport, Target, Workspace};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ScopeConfig::from_global(global::load().context("reading global configuration")?);
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Init(args) => cmd_init(args, config),
        Command::Add(args) => cmd_add(args, config),
        Command::Status(_) => cmd_status(config, json),
        Command::Tag(args) => cmd_tag(args, config).await,
        Command::Export(args) => cmd_export(args, config).await,
        Command::Show(args) => cmd_show(args, config, json),
        Command::Untag(args) => cmd_untag(args, config),
        Command::List(args) => cmd_list(args, config, json).await,
        Command::Remote(args) => cmd_remote(args, config),
    }
}

fn cwd() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("reading current directory")
}

fn parse_id(raw: &str) -> anyhow::Result<ComponentId> {
    raw.parse().with_context(|| format!("invalid component id {raw}"))
}

fn target(id: Option<&str>) -> anyhow::Result<Target> {
    Ok(match id {
        Some(raw) => Target::One(parse_id(raw)?),
        None => Target::All,
    })
}

fn cmd_init(args: InitArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let path = match args.path {
        Some(p) => PathBuf::from(p),
        None => cwd()?,
    };
    if args.bare {
        let mut scope = Scope::create(&path, args.name.as_deref(), config)?;
        let fresh = scope.created();
        scope.ensure_dir()?;
        let verb = if fresh { "Initialized" } else { "Reinitialized" };
        println!("{} {} scope {} in {}", "✓".green().bold(), verb, scope.name().bold(), path.display());
    } else {
        let workspace = Workspace::init(&path, config)?;
        println!(
            "{} Initialized workspace in {} (scope {})",
            "✓".green().bold(),
            workspace.root().display(),
            workspace.scope().name().bold()
        );
    }
    Ok(())
}

fn cmd_add(args: AddArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let cwd = cwd()?;
    let mut workspace = Workspace::load(&cwd, config)?;
    let id = workspace.add(&cwd.join(&args.path), &parse_id(&args.id)?)?;
    println!("  {} {} ({})", "tracking".green(), id.to_string().bold(), args.path);
    Ok(())
}

fn status_label(status: ComponentStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        ComponentStatus::New => label.green(),
        ComponentStatus::Staged => label.cyan(),
        ComponentStatus::Exported => label.blue(),
        ComponentStatus::Modified => label.yellow(),
        ComponentStatus::Missing | ComponentStatus::ImportPending => label.red(),
    }
}

fn print_status(report: &StatusReport) {
    const ORDER: [ComponentStatus; 6] = [
        ComponentStatus::New,
        ComponentStatus::Modified,
        ComponentStatus::Staged,
        ComponentStatus::Exported,
        ComponentStatus::Missing,
        ComponentStatus::ImportPending,
    ];
    for status in ORDER {
        let ids = report.with_status(status);
        if ids.is_empty() {
            continue;
        }
        println!("{} components:", status_label(status).bold());
        for id in ids {
            println!("  {id}");
        }
    }
    for message in report.messages() {
        println!("{message}");
    }
}

fn cmd_status(config: ScopeConfig, json: bool) -> anyhow::Result<()> {
    let mut workspace = Workspace::load(&cwd()?, config)?;
    let report = workspace.status()?;
    if json {
        let components: Vec<_> = report
            .components
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id.to_string(),
                    "status": c.status,
                    "root": c.root,
                })
            })
            .collect();
        let out = serde_json::json!({ "components": components, "messages": report.messages() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_status(&report);
    }
    Ok(())
}

fn bump_of(args: &TagArgs) -> anyhow::Result<VersionBump> {
    Ok(match &args.exact {
        Some(raw) => VersionBump::Explicit(raw.parse().with_context(|| format!("invalid version {raw}"))?),
        None if args.major => VersionBump::Major,
        None if args.minor => VersionBump::Minor,
        None => VersionBump::Patch,
    })
}

async fn cmd_tag(args: TagArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let mut workspace = Workspace::load(&cwd()?, config)?;
    let bump = bump_of(&args)?;
    let tagged = workspace
        .tag(&target(args.id.as_deref())?, &bump, args.force)
        .await?;
    println!("{} tagged {} components", "✓".green().bold(), tagged.len());
    for id in tagged {
        println!("  {}", id.to_string().cyan());
    }
    Ok(())
}

async fn cmd_export(args: ExportArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let mut workspace = Workspace::load(&cwd()?, config)?;
    let target = if args.all { Target::All } else { target(args.id.as_deref())? };
    let report = workspace.export(&target, args.remote.as_deref()).await?;
    for id in report.exported.iter().chain(&report.untracked) {
        println!("  {} {}", "exported".blue(), id);
    }
    for message in report.messages() {
        println!("{message}");
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: ScopeConfig, json: bool) -> anyhow::Result<()> {
    let workspace = Workspace::load(&cwd()?, config)?;
    let view = workspace.show(&parse_id(&args.id)?)?;
    let versions: Vec<String> = view.versions.iter().map(|v| v.to_string()).collect();
    if json {
        let out = serde_json::json!({
            "id": view.state.id.to_string(),
            "status": view.state.status,
            "root": view.state.root,
            "versions": versions,
            "manifest": view.manifest,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("{}  {}", view.state.id.to_string().bold(), status_label(view.state.status));
    if let Some(root) = &view.state.root {
        println!("  Root: {root}");
    }
    if !versions.is_empty() {
        println!("  Versions: {}", versions.join(", "));
    }
    if let Some(manifest) = &view.manifest {
        println!("  Implementation: {}", manifest.impl_file);
        if let Some(compiler) = &manifest.compiler {
            println!("  Compiler: {compiler}");
        }
        for dependency in &manifest.dependencies {
            println!("  Depends on: {}", dependency.yellow());
        }
    }
    Ok(())
}

fn cmd_untag(args: UntagArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let mut scope = Scope::load(&cwd()?, config)?;
    let removed = scope.untag(&parse_id(&args.id)?)?;
    println!("{} untagged {}", "✓".green().bold(), removed.to_string().bold());
    Ok(())
}

async fn cmd_list(args: ListArgs, config: ScopeConfig, json: bool) -> anyhow::Result<()> {
    let scope = Scope::load(&cwd()?, config)?;
    let (ids, staged) = match &args.remote {
        Some(alias) => (scope.list_remote(alias).await?, Vec::new()),
        None => (scope.list_components()?, scope.local_staged()?),
    };
    if json {
        let names: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    if ids.is_empty() {
        println!("No components.");
    }
    for id in &ids {
        if staged.contains(id) {
            println!("  {} {}", id, "(staged)".cyan());
        } else {
            println!("  {id}");
        }
    }
    Ok(())
}

fn cmd_remote(args: RemoteArgs, config: ScopeConfig) -> anyhow::Result<()> {
    let action = args.action.unwrap_or(RemoteAction::List);
    if args.global {
        match action {
            RemoteAction::Add { name, address } => {
                global::add_remote(Remote::new(name.as_str(), address.as_str())?)?;
                println!("Added global remote {} → {}", name.bold(), address.blue());
            }
            RemoteAction::Rm { name } => {
                let removed = global::remove_remote(&name)?;
                println!("Removed global remote {}", removed.alias.bold());
            }
            RemoteAction::List => print_remotes(config.global_remotes.iter()),
        }
        return Ok(());
    }

    let mut scope = Scope::load(&cwd()?, config)?;
    match action {
        RemoteAction::Add { name, address } => {
            scope.add_remote(Remote::new(name.as_str(), address.as_str())?)?;
            println!("Added remote {} → {}", name.bold(), address.blue());
        }
        RemoteAction::Rm { name } => {
            let removed = scope.remove_remote(&name)?;
            println!("Removed remote {}", removed.alias.bold());
        }
        RemoteAction::List => print_remotes(scope.remotes().iter()),
    }
    Ok(())
}

fn print_remotes(remotes: impl Iterator<Item = Remote>) {
    let mut any = false;
    for remote in remotes {
        any = true;
        println!("{}\t{}", remote.alias.bold(), remote.address);
    }
    if !any {
        println!("No remotes configured.");
    }
}
