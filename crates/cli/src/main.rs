//! gitid command-line tool.
//!
//! Keeps several git identities (name, email, optional nickname) and switches
//! which one git uses, either machine-wide or for the current repository.
//! Run without a subcommand for the interactive menu.

mod completion;
mod interactive;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use completion::CompletionShell;
use gitid_core::errors::IdentityError;
use gitid_core::{
    ActiveIdentity, AppConfig, GitConfigBackend, Identity, IdentityRepository, IdentityService,
    IdentityState, Scope,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// gitid command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "gitid",
    version,
    about = "Switch between git identities globally or per repository"
)]
struct Cli {
    /// Path to the gitid TOML settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all identities.
    List {
        /// Render as a table with active markers.
        #[arg(long, conflicts_with = "json")]
        table: bool,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the current git identity.
    Current {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Switch to an identity by nickname, name, or email.
    #[command(visible_alias = "use")]
    Switch {
        /// Nickname, email, or name (partial matches allowed).
        identifier: String,

        /// Set the identity for the current repository only.
        #[arg(short, long)]
        local: bool,
    },

    /// Add a new identity.
    Add {
        name: String,
        email: String,
        nickname: Option<String>,

        /// Also make it the current repository's identity.
        #[arg(short, long)]
        local: bool,
    },

    /// Delete an identity.
    Delete {
        identifier: String,
    },

    /// Set or change an identity's nickname.
    Nickname {
        identifier: String,
        nickname: String,
    },

    /// Change an identity's name, email, or nickname.
    Edit {
        identifier: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// New nickname; pass an empty string to remove it.
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Inspect or clear the current repository's identity.
    Local {
        #[command(subcommand)]
        action: LocalAction,
    },

    /// Manage the gitid settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print a shell completion script, e.g. `eval "$(gitid completion bash)"`.
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },

    /// Print completion candidates (nicknames, names, emails), one per line.
    #[command(hide = true)]
    Candidates,
}

#[derive(Subcommand, Debug)]
enum LocalAction {
    /// Show the repository identity, if one is set.
    Show,
    /// Remove the repository identity so the global one applies.
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default settings file.
    Init {
        /// Output path (defaults to the platform config directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the settings file path.
    Path,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("failed to load gitid configuration")?;
    init_logging(&config, cli.verbose);

    let service = || open_service(&config);

    match cli.command {
        None => interactive::run(&service()?, &config),
        Some(Commands::List { table, json }) => cmd_list(&service()?, &config, table, json),
        Some(Commands::Current { json }) => cmd_current(&service()?, json),
        Some(Commands::Switch { identifier, local }) => cmd_switch(&service()?, &identifier, local),
        Some(Commands::Add {
            name,
            email,
            nickname,
            local,
        }) => cmd_add(
            &service()?,
            &name,
            &email,
            nickname.as_deref().unwrap_or(""),
            local,
        ),
        Some(Commands::Delete { identifier }) => cmd_delete(&service()?, &identifier),
        Some(Commands::Nickname {
            identifier,
            nickname,
        }) => cmd_nickname(&service()?, &identifier, &nickname),
        Some(Commands::Edit {
            identifier,
            name,
            email,
            nickname,
        }) => cmd_edit(
            &service()?,
            &identifier,
            name.as_deref(),
            email.as_deref(),
            nickname.as_deref(),
        ),
        Some(Commands::Local { action }) => cmd_local(&service()?, action),
        Some(Commands::Config { action }) => cmd_config(action),
        Some(Commands::Completion { shell }) => cmd_completion(shell),
        Some(Commands::Candidates) => cmd_candidates(&service()?),
    }
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn init_logging(config: &AppConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GITID_LOG").unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn open_service(config: &AppConfig) -> Result<IdentityService> {
    let backend = match config.git.global_config_path() {
        Some(path) => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            GitConfigBackend::with_paths(path, cwd)
        }
        None => GitConfigBackend::discover().context("failed to locate git config")?,
    };
    debug!(file = %backend.global_write_target().display(), "global identity file");
    Ok(IdentityService::new(Arc::new(backend)))
}

fn require_identifier(identifier: &str) -> Result<&str> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        anyhow::bail!("identifier must not be empty");
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_list(service: &IdentityService, config: &AppConfig, table: bool, json: bool) -> Result<()> {
    let identities = service.list().context("failed to list identities")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&identities)?);
        return Ok(());
    }

    if identities.is_empty() {
        println!("No identities configured.");
        return Ok(());
    }

    if !table {
        let width = config.ui.nickname_width;
        for identity in &identities {
            let nickname = if identity.has_nickname() {
                identity.nickname.as_str()
            } else {
                "-"
            };
            println!(
                "{:<width$} {} <{}>",
                nickname,
                identity.name,
                identity.email,
                width = width
            );
        }
        return Ok(());
    }

    let global = service.active().get_active(Scope::Global).ok();
    let local = if service.active().has_local_override() {
        service.active().get_active(Scope::Local).ok()
    } else {
        None
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Nickname", "Name", "Email", "Active"]);

    for identity in &identities {
        let this = Some(ActiveIdentity::from(identity));
        let active = match (global == this, local == this) {
            (true, true) => Cell::new("global, local").fg(Color::Green),
            (true, false) => Cell::new("global").fg(Color::Cyan),
            (false, true) => Cell::new("local").fg(Color::Green),
            (false, false) => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(if identity.has_nickname() {
                identity.nickname.as_str()
            } else {
                "-"
            }),
            Cell::new(&identity.name),
            Cell::new(&identity.email),
            active,
        ]);
    }

    println!("{}", table);
    Ok(())
}

fn cmd_current(service: &IdentityService, json: bool) -> Result<()> {
    let state = service.state();

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let display = |active: &ActiveIdentity| -> Result<String> {
        let nickname = service
            .nickname_for(&active.email)
            .context("failed to read nickname")?;
        Ok(active.with_nickname(nickname).to_string())
    };

    match &state {
        IdentityState::NoIdentityConfigured => {
            anyhow::bail!(IdentityError::NoIdentityConfigured {
                scope: Scope::Global
            })
        }
        IdentityState::GlobalOnly { global } => {
            println!("{}", display(global)?);
            if service.active().is_in_project_context() {
                println!("{}", style::dim("Repository: using global identity"));
            }
        }
        IdentityState::LocalOverrideActive { local, global } => {
            println!("{} {}", display(local)?, style::local_marker());
            match global {
                Some(global) => println!("{}", style::dim(&format!("Global: {}", display(global)?))),
                None => println!("{}", style::dim("Global: not configured")),
            }
        }
    }
    Ok(())
}

fn cmd_switch(service: &IdentityService, identifier: &str, local: bool) -> Result<()> {
    let identifier = require_identifier(identifier)?;
    let scope = if local { Scope::Local } else { Scope::Global };
    let identity = service
        .switch_to(identifier, scope)
        .with_context(|| format!("failed to switch {} identity", scope))?;

    if local {
        println!(
            "{}",
            style::success(&format!("Repository identity set to {}", identity))
        );
    } else {
        println!("{}", style::success(&format!("Switched to {}", identity)));
        let state = service.state();
        if state.effective() != Some(&ActiveIdentity::from(&identity)) {
            println!(
                "{}",
                style::warn("This repository has its own identity, which still takes precedence here.")
            );
        }
    }
    Ok(())
}

fn cmd_add(service: &IdentityService, name: &str, email: &str, nickname: &str, local: bool) -> Result<()> {
    if name.trim().is_empty() || email.trim().is_empty() {
        anyhow::bail!("name and email must not be empty");
    }

    let identity = Identity::new(name, email, nickname);
    if local {
        service
            .add_local(name, email, nickname)
            .context("failed to add repository identity")?;
        println!(
            "{}",
            style::success(&format!("Added identity and set for this repository: {}", identity))
        );
    } else {
        service
            .store()
            .add(name, email, nickname)
            .context("failed to add identity")?;
        println!("{}", style::success(&format!("Added identity: {}", identity)));
    }
    Ok(())
}

fn cmd_delete(service: &IdentityService, identifier: &str) -> Result<()> {
    let identifier = require_identifier(identifier)?;
    let identity = service
        .delete(identifier)
        .context("failed to delete identity")?;
    println!("{}", style::success(&format!("Deleted identity: {}", identity)));
    Ok(())
}

fn cmd_nickname(service: &IdentityService, identifier: &str, nickname: &str) -> Result<()> {
    let identifier = require_identifier(identifier)?;
    let identity = service
        .set_nickname(identifier, nickname)
        .context("failed to set nickname")?;
    println!(
        "{}",
        style::success(&format!(
            "Set nickname \"{}\" for {} <{}>",
            nickname, identity.name, identity.email
        ))
    );
    Ok(())
}

fn cmd_edit(
    service: &IdentityService,
    identifier: &str,
    name: Option<&str>,
    email: Option<&str>,
    nickname: Option<&str>,
) -> Result<()> {
    let identifier = require_identifier(identifier)?;
    if name.is_none() && email.is_none() && nickname.is_none() {
        anyhow::bail!("nothing to change: pass --name, --email, or --nickname");
    }
    let (old, new) = service
        .edit(identifier, name, email, nickname)
        .context("failed to update identity")?;
    println!("{}", style::success(&format!("Updated {} -> {}", old, new)));
    Ok(())
}

fn cmd_local(service: &IdentityService, action: LocalAction) -> Result<()> {
    let active = service.active();
    if !active.is_in_project_context() {
        anyhow::bail!("not inside a git repository");
    }

    match action {
        LocalAction::Show => {
            if !active.has_local_override() {
                println!("{}", style::dim("Repository: using global identity"));
                return Ok(());
            }
            let local = active
                .get_active(Scope::Local)
                .context("failed to read repository identity")?;
            let nickname = service.nickname_for(&local.email)?;
            println!("Repository identity: {}", local.with_nickname(nickname));
        }
        LocalAction::Clear => {
            active
                .clear_local_override()
                .context("failed to clear repository identity")?;
            println!("{}", style::success("Repository identity cleared"));
        }
    }
    Ok(())
}

fn cmd_candidates(service: &IdentityService) -> Result<()> {
    for candidate in service.store().completion_candidates()? {
        println!("{}", candidate);
    }
    Ok(())
}

fn cmd_completion(shell: CompletionShell) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    completion::write_script(shell, &mut Cli::command(), "gitid", &mut stdout)
        .context("failed to write completion script")
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { output } => {
            let path = output
                .or_else(AppConfig::default_path)
                .context("cannot determine config directory")?;
            if path.exists() {
                anyhow::bail!(
                    "file already exists: {}. Use a different path or remove the existing file.",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("failed to create config directory")?;
            }
            std::fs::write(&path, AppConfig::default_template())
                .context("failed to write config file")?;
            println!("Default configuration written to {}", path.display());
        }
        ConfigAction::Path => match AppConfig::default_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("cannot determine config directory"),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_use_is_alias_for_switch() {
        let cli = Cli::try_parse_from(["gitid", "use", "work", "--local"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Switch { ref identifier, local: true }) if identifier == "work"
        ));
    }

    #[test]
    fn test_add_nickname_is_optional() {
        let cli = Cli::try_parse_from(["gitid", "add", "John Doe", "john@example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Add { nickname: None, local: false, .. })
        ));
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["gitid"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_completion_shell_argument() {
        let cli = Cli::try_parse_from(["gitid", "completion", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Completion {
                shell: CompletionShell::Zsh
            })
        ));
        assert!(Cli::try_parse_from(["gitid", "completion", "tcsh"]).is_err());
    }

    #[test]
    fn test_completion_script_covers_identity_subcommands() {
        let mut out = Vec::new();
        completion::write_script(CompletionShell::Bash, &mut Cli::command(), "gitid", &mut out)
            .unwrap();
        let script = String::from_utf8(out).unwrap();
        for sub in completion::IDENTITY_SUBCOMMANDS {
            assert!(script.contains(sub), "missing {}", sub);
        }
        assert!(script.contains("gitid candidates"));
    }

    #[test]
    fn test_require_identifier() {
        assert_eq!(require_identifier("  work ").unwrap(), "work");
        assert!(require_identifier("   ").is_err());
    }
}
