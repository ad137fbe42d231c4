//! Hook bodies of the account wizard.

use crate::core::Context;
use crate::engine::{HookError, Step};
use crate::wizard::form::{self, AccountForm};
use crate::wizard::session::{Button, Reply, Session};
use crate::wizard::{AccountWizard, WizardEnv, WizardEvent, WizardState};

type Ctx = Context<AccountWizard>;

fn session(ctx: &Ctx) -> Result<Session, HookError> {
    ctx.meta
        .clone()
        .ok_or_else(|| HookError::failed("no session attached to conversation"))
}

fn input(ctx: &Ctx) -> &str {
    ctx.input().map(String::as_str).unwrap_or_default()
}

pub(super) fn show_menu(ctx: &mut Ctx, _env: &WizardEnv) -> Result<(), HookError> {
    ctx.data = AccountForm::default();

    let menu = Reply::text("Select action")
        .row([
            Button::new("List users", WizardEvent::ListUsers, ""),
            Button::new("List proxies", WizardEvent::ListProxies, ""),
        ])
        .row([Button::new("Create user", WizardEvent::Create, "")]);
    session(ctx)?.reply(menu)
}

pub(super) fn list_from_menu(
    step: &Step<'_, AccountWizard>,
    ctx: &mut Ctx,
    env: &WizardEnv,
) -> Result<(), HookError> {
    let listing = if step.is(&WizardState::Default, &WizardEvent::ListUsers) {
        let accounts = env
            .provisioner
            .list_accounts()
            .map_err(|err| HookError::failed(err.to_string()))?;
        if accounts.is_empty() {
            "No users yet".to_string()
        } else {
            let lines: Vec<String> = accounts
                .iter()
                .map(|a| {
                    format!(
                        "{} ({}, {}), used {} B",
                        a.username, a.category, a.status, a.used_traffic
                    )
                })
                .collect();
            format!("Users:\n{}", lines.join("\n"))
        }
    } else if step.is(&WizardState::Default, &WizardEvent::ListProxies) {
        let categories = env
            .catalog
            .list_categories()
            .map_err(|err| HookError::failed(err.to_string()))?;
        format!("Proxy configurations:\n{}", categories.join("\n"))
    } else {
        return Ok(());
    };

    session(ctx)?.reply(Reply::text(listing))
}

pub(super) fn prompt_username(ctx: &mut Ctx, env: &WizardEnv) -> Result<(), HookError> {
    let prompt = format!(
        "Input username. It must match {}",
        env.username_pattern.as_str()
    );
    session(ctx)?.reply(Reply::text(prompt))
}

pub(super) fn accept_username(ctx: &mut Ctx, env: &WizardEnv) -> Result<(), HookError> {
    let username = input(ctx).to_string();
    tracing::debug!(username = %username, "validating username");

    if !env.username_pattern.is_match(&username) {
        return Err(HookError::rejected(format!(
            "username '{}' does not match pattern {}",
            username,
            env.username_pattern.as_str()
        )));
    }

    ctx.data.username = Some(username);
    Ok(())
}

pub(super) fn offer_categories(ctx: &mut Ctx, env: &WizardEnv) -> Result<(), HookError> {
    let categories = env
        .catalog
        .list_categories()
        .map_err(|err| HookError::failed(err.to_string()))?;

    let buttons = categories
        .iter()
        .map(|name| Button::new(name.as_str(), WizardEvent::Pick, name));
    let reply = Reply::text("Select user proxy configuration from list").row(buttons);
    session(ctx)?.reply(reply)
}

pub(super) fn accept_category(ctx: &mut Ctx, _env: &WizardEnv) -> Result<(), HookError> {
    let category = input(ctx).to_string();
    if category.is_empty() {
        return Err(HookError::rejected("Select a proxy configuration from the list"));
    }

    tracing::debug!(category = %category, "setting proxy configuration");
    ctx.data.category = Some(category);
    Ok(())
}

pub(super) fn show_summary(ctx: &mut Ctx, _env: &WizardEnv) -> Result<(), HookError> {
    let summary = format!(
        "Username: {}\nProxy config: {}",
        ctx.data.username.as_deref().unwrap_or_default(),
        ctx.data.category.as_deref().unwrap_or_default()
    );
    let reply = Reply::text(summary).row([
        Button::new("Submit", WizardEvent::Confirm, ""),
        Button::new("Cancel", WizardEvent::Cancel, ""),
    ]);
    session(ctx)?.reply(reply)
}

pub(super) fn submit_account(
    step: &Step<'_, AccountWizard>,
    ctx: &mut Ctx,
    env: &WizardEnv,
) -> Result<(), HookError> {
    if !step.is(&WizardState::SubmitData, &WizardEvent::Confirm) {
        return Ok(());
    }

    let request = ctx
        .data
        .validate()
        .map_err(|violations| HookError::rejected(form::describe(&violations)))?;
    let session = session(ctx)?;
    if session.cancel.is_cancelled() {
        return Err(HookError::failed("request cancelled before provisioning"));
    }

    match env.provisioner.create_account(&request) {
        Ok(account) => {
            tracing::info!(username = %account.username, "account created");
            session.reply(Reply::text(format!(
                "Created user:\nusername: {}\nproxy config: {}\nconfig url: `{}`",
                account.username, account.category, account.config_url
            )))
        }
        Err(err) => {
            session.reply(Reply::text("Could not add user, try again later"))?;
            Err(HookError::failed(err.to_string()))
        }
    }
}
