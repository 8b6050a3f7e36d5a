//! Interactive identity menu, shown when `gitid` runs without a subcommand.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use tracing::debug;

use gitid_core::{AppConfig, Identity, IdentityRepository, IdentityService, IdentityState, Scope};

use super::style;

/// What the user picked at the top level.
enum MenuChoice {
    Identity(usize),
    ClearLocal,
    Add,
    Quit,
}

/// What to do with a selected identity.
#[derive(Debug, Clone, Copy)]
enum IdentityAction {
    UseGlobally,
    UseForRepository,
    EditNickname,
    EditIdentity,
    Delete,
    Back,
}

impl IdentityAction {
    fn label(self) -> &'static str {
        match self {
            IdentityAction::UseGlobally => "Use globally",
            IdentityAction::UseForRepository => "Use for this repository",
            IdentityAction::EditNickname => "Edit nickname",
            IdentityAction::EditIdentity => "Edit name / email / nickname",
            IdentityAction::Delete => "Delete",
            IdentityAction::Back => "Back",
        }
    }
}

/// Run the menu until the user switches globally or quits.
pub fn run(service: &IdentityService, config: &AppConfig) -> Result<()> {
    loop {
        let identities = service.list().context("failed to list identities")?;
        let state = service.state();
        print_banner(service, &state)?;

        match choose(service, &identities, &state)? {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::Add => add_identity(service)?,
            MenuChoice::ClearLocal => {
                service
                    .active()
                    .clear_local_override()
                    .context("failed to clear repository identity")?;
                println!("{}", style::success("Repository identity cleared"));
            }
            MenuChoice::Identity(index) => {
                let identity = &identities[index];
                if act_on(service, config, identity)? {
                    return Ok(());
                }
            }
        }
    }
}

fn print_banner(service: &IdentityService, state: &IdentityState) -> Result<()> {
    println!();
    println!("{}", style::header("Git Identity Manager"));
    if service.active().is_in_project_context() {
        match state {
            IdentityState::LocalOverrideActive { local, .. } => {
                let nickname = service.nickname_for(&local.email)?;
                println!(
                    "{}",
                    style::success(&format!(
                        "Repository identity: {}",
                        local.with_nickname(nickname)
                    ))
                );
            }
            _ => println!("{}", style::dim("Repository: using global identity")),
        }
    }
    println!();
    Ok(())
}

fn choose(
    service: &IdentityService,
    identities: &[Identity],
    state: &IdentityState,
) -> Result<MenuChoice> {
    let (global, local) = match state {
        IdentityState::NoIdentityConfigured => (None, None),
        IdentityState::GlobalOnly { global } => (Some(global), None),
        IdentityState::LocalOverrideActive { local, global } => (global.as_ref(), Some(local)),
    };

    let mut items: Vec<String> = identities
        .iter()
        .map(|identity| style::identity_line(identity, global, local))
        .collect();
    if identities.is_empty() {
        println!("{}", style::dim("No identities configured yet."));
    }

    let clear_local = local.is_some() && service.active().is_in_project_context();
    if clear_local {
        items.push("Clear repository identity".to_string());
    }
    items.push("Add new identity".to_string());
    items.push("Quit".to_string());

    let selection = Select::new()
        .with_prompt("Select an identity (esc to quit)")
        .items(&items)
        .default(0)
        .interact_opt()
        .context("failed to read selection")?;

    let Some(selection) = selection else {
        return Ok(MenuChoice::Quit);
    };
    debug!(selection, "menu selection");

    let mut extra = selection.checked_sub(identities.len());
    if extra.is_none() {
        return Ok(MenuChoice::Identity(selection));
    }
    if clear_local {
        if extra == Some(0) {
            return Ok(MenuChoice::ClearLocal);
        }
        extra = extra.map(|e| e - 1);
    }
    Ok(match extra {
        Some(0) => MenuChoice::Add,
        _ => MenuChoice::Quit,
    })
}

/// Returns `true` when the menu should close.
fn act_on(service: &IdentityService, config: &AppConfig, identity: &Identity) -> Result<bool> {
    let mut actions = vec![IdentityAction::UseGlobally];
    if service.active().is_in_project_context() {
        actions.push(IdentityAction::UseForRepository);
    }
    actions.extend([
        IdentityAction::EditNickname,
        IdentityAction::EditIdentity,
        IdentityAction::Delete,
        IdentityAction::Back,
    ]);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    let selection = Select::new()
        .with_prompt(identity.to_string())
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("failed to read action")?;
    let action = selection.map_or(IdentityAction::Back, |i| actions[i]);
    debug!(?action, email = %identity.email, "identity action");

    match action {
        IdentityAction::UseGlobally => {
            service
                .active()
                .set_active(Scope::Global, &identity.name, &identity.email)
                .context("failed to switch identity")?;
            println!("{}", style::success(&format!("Switched to {}", identity)));
            Ok(true)
        }
        IdentityAction::UseForRepository => {
            service
                .active()
                .set_active(Scope::Local, &identity.name, &identity.email)
                .context("failed to set repository identity")?;
            println!(
                "{}",
                style::success(&format!("Repository identity set to {}", identity))
            );
            Ok(false)
        }
        IdentityAction::EditNickname => {
            let nickname: String = Input::new()
                .with_prompt("Nickname")
                .with_initial_text(identity.nickname.clone())
                .allow_empty(true)
                .interact_text()
                .context("failed to read nickname")?;
            service
                .store()
                .set_nickname(&identity.email, nickname.trim())
                .context("failed to set nickname")?;
            Ok(false)
        }
        IdentityAction::EditIdentity => {
            let name = prompt_required("Name", &identity.name)?;
            let email = prompt_required("Email", &identity.email)?;
            let nickname: String = Input::new()
                .with_prompt("Nickname (optional)")
                .with_initial_text(identity.nickname.clone())
                .allow_empty(true)
                .interact_text()
                .context("failed to read nickname")?;
            service
                .store()
                .update(&identity.email, &name, &email, nickname.trim())
                .context("failed to update identity")?;
            Ok(false)
        }
        IdentityAction::Delete => {
            let confirmed = !config.ui.confirm_delete
                || Confirm::new()
                    .with_prompt(format!("Delete {}?", identity))
                    .default(false)
                    .interact()
                    .context("failed to read confirmation")?;
            if confirmed {
                service
                    .store()
                    .delete(&identity.email)
                    .context("failed to delete identity")?;
                println!("{}", style::success(&format!("Deleted identity: {}", identity)));
            }
            Ok(false)
        }
        IdentityAction::Back => Ok(false),
    }
}

fn add_identity(service: &IdentityService) -> Result<()> {
    let name = prompt_required("Name", "")?;
    let email = prompt_required("Email", "")?;
    let nickname: String = Input::new()
        .with_prompt("Nickname (optional)")
        .allow_empty(true)
        .interact_text()
        .context("failed to read nickname")?;

    service
        .store()
        .add(&name, &email, nickname.trim())
        .context("failed to add identity")?;
    let identity = Identity::new(name, email, nickname.trim());
    println!("{}", style::success(&format!("Added identity: {}", identity)));
    Ok(())
}

fn prompt_required(prompt: &str, initial: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                Err(format!("{} must not be empty", prompt))
            } else {
                Ok(())
            }
        })
        .interact_text()
        .with_context(|| format!("failed to read {}", prompt.to_lowercase()))?;
    Ok(value.trim().to_string())
}
