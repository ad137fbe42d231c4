//! Account Wizard
//!
//! This example drives the account wizard through a scripted console
//! conversation.
//!
//! Key concepts:
//! - Dispatcher routing text and button presses into per-operator instances
//! - Hook rejections relayed to the operator verbatim
//! - In-memory collaborators standing in for the provisioning service
//! - Transition history summaries serialized with serde_json
//!
//! Configuration is read from `AUTHORIZED_USER_IDS` (and optionally
//! `USERNAME_PATTERN`); without it operator 1 is authorized.
//!
//! Run with: cargo run --example account_wizard

use std::sync::Arc;
use stepflow::config::WizardConfig;
use stepflow::dispatch::{Dispatcher, Update, CANCEL_COMMAND, START_COMMAND};
use stepflow::wizard::{
    self, ChatId, InMemoryProvisioner, Reply, ReplyError, ReplySink, StaticCatalog, Whitelist,
    WizardEnv,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Prints replies the way a chat client would show them
struct Console;

impl ReplySink for Console {
    fn send(&self, chat: ChatId, reply: Reply) -> Result<(), ReplyError> {
        println!("[chat {chat}] {}", reply.text.replace('\n', "\n           "));
        for row in &reply.keyboard {
            let buttons: Vec<String> = row
                .iter()
                .map(|b| format!("[{} -> {}]", b.label, b.payload))
                .collect();
            println!("           {}", buttons.join(" "));
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = WizardConfig::from_env().unwrap_or_else(|err| {
        tracing::info!(error = %err, "using demo configuration");
        WizardConfig::new(vec![1])
    });
    let operator = config.authorized_operators.first().copied().unwrap_or(1);
    let chat = operator * 10;

    let catalog = StaticCatalog::new(["vless", "trojan", "shadowsocks"]);
    let provisioner = Arc::new(InMemoryProvisioner::new(catalog.clone()));
    let env = WizardEnv::new(&config, provisioner, Arc::new(catalog))?;
    let dispatcher = Dispatcher::new(
        wizard::template()?,
        env,
        Arc::new(Whitelist::new(config.authorized_operators.clone())),
        Arc::new(Console),
        config.messages.clone(),
    );

    let text = |body: &str| Update::Message {
        sender: operator,
        chat,
        text: body.to_string(),
    };
    let press = |payload: &str| Update::Action {
        sender: operator,
        chat,
        payload: payload.to_string(),
    };
    let script = vec![
        Update::Message {
            sender: operator + 1000,
            chat: 0,
            text: START_COMMAND.to_string(),
        },
        text("hello"),
        text(START_COMMAND),
        press("list_proxies:"),
        press("create:"),
        text("x!"),
        text("demo_user"),
        press("pick:trojan"),
        press("confirm:"),
        press("list_users:"),
    ];

    for update in script {
        println!("\n> {update:?}");
        let outcome = dispatcher.dispatch(update, CancellationToken::new());
        println!("  => {outcome:?}");
    }

    if let Some(instance) = dispatcher.registry().get(&operator) {
        println!("\n=== History ===");
        for record in instance.history() {
            println!("{}", serde_json::to_string(&record.summary())?);
        }
    }

    dispatcher.dispatch(text(CANCEL_COMMAND), CancellationToken::new());
    println!("\nConversations left: {}", dispatcher.registry().len());
    Ok(())
}
