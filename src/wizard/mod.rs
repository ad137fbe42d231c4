//! Guided "create account" conversation.
//!
//! ```text
//! DEFAULT --list_users/list_proxies--> DEFAULT
//! DEFAULT --create--> CREATE_USER_INPUT_NAME --continue--> CREATE_USER_SELECT_PROXY
//!         --pick--> CREATE_USER_SUBMIT_DATA --confirm/cancel--> DEFAULT
//! ```
//!
//! Hooks reply through the [`Session`] stored in the conversation's meta and
//! reach the provisioning service through [`WizardEnv`].

pub mod collaborators;
pub mod form;
mod hooks;
pub mod session;

pub use collaborators::{
    Account, CategoryCatalog, InMemoryProvisioner, NewAccount, OperatorDirectory,
    ProvisionError, Provisioner, StaticCatalog, Whitelist,
};
pub use form::{AccountForm, FormViolation};
pub use session::{Button, ChatId, OperatorId, Reply, ReplyError, ReplySink, Session};

use crate::builder::{BuildError, TemplateBuilder};
use crate::config::{ConfigError, WizardConfig};
use crate::core::Flow;
use crate::engine::Template;
use regex::Regex;
use std::sync::Arc;

crate::state_enum! {
    pub enum WizardState {
        Default => "DEFAULT",
        InputName => "CREATE_USER_INPUT_NAME",
        SelectProxy => "CREATE_USER_SELECT_PROXY",
        SubmitData => "CREATE_USER_SUBMIT_DATA",
    }
}

crate::event_enum! {
    pub enum WizardEvent {
        ListUsers => "list_users",
        ListProxies => "list_proxies",
        Create => "create",
        /// Fired by free-text messages.
        Continue => "continue",
        Pick => "pick",
        Confirm => "confirm",
        Cancel => "cancel",
    }
}

/// Marker type tying the wizard's types together.
pub enum AccountWizard {}

impl Flow for AccountWizard {
    type State = WizardState;
    type Event = WizardEvent;
    type Input = String;
    type Data = AccountForm;
    type Meta = Option<Session>;
    type Env = WizardEnv;
}

/// Dependencies handed to every wizard hook.
#[derive(Clone)]
pub struct WizardEnv {
    pub provisioner: Arc<dyn Provisioner>,
    pub catalog: Arc<dyn CategoryCatalog>,
    pub username_pattern: Regex,
}

impl WizardEnv {
    pub fn new(
        config: &WizardConfig,
        provisioner: Arc<dyn Provisioner>,
        catalog: Arc<dyn CategoryCatalog>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            provisioner,
            catalog,
            username_pattern: config.username_regex()?,
        })
    }
}

/// Build the wizard's template.
pub fn template() -> Result<Arc<Template<AccountWizard>>, BuildError> {
    use WizardEvent as E;
    use WizardState as S;

    TemplateBuilder::new()
        .initial(S::Default)
        .add_transition(S::Default, E::ListUsers, S::Default)
        .add_transition(S::Default, E::ListProxies, S::Default)
        .add_transition(S::Default, E::Create, S::InputName)
        .add_transition(S::InputName, E::Continue, S::SelectProxy)
        .add_transition(S::SelectProxy, E::Pick, S::SubmitData)
        .add_transition(S::SubmitData, E::Confirm, S::Default)
        .add_transition(S::SubmitData, E::Cancel, S::Default)
        .on_transition(hooks::list_from_menu)
        .on_transition(hooks::submit_account)
        .on_enter(S::Default, hooks::show_menu)
        .on_enter(S::InputName, hooks::prompt_username)
        .on_exit(S::InputName, hooks::accept_username)
        .on_enter(S::SelectProxy, hooks::offer_categories)
        .on_exit(S::SelectProxy, hooks::accept_category)
        .on_enter(S::SubmitData, hooks::show_summary)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;
    use crate::engine::{Instance, TriggerError};
    use parking_lot::Mutex;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<Reply>>,
    }

    impl Outbox {
        fn last_text(&self) -> String {
            self.sent
                .lock()
                .last()
                .map(|r| r.text.clone())
                .unwrap_or_default()
        }
    }

    impl ReplySink for Outbox {
        fn send(&self, _chat: ChatId, reply: Reply) -> Result<(), ReplyError> {
            self.sent.lock().push(reply);
            Ok(())
        }
    }

    struct Fixture {
        env: WizardEnv,
        outbox: Arc<Outbox>,
        instance: Instance<AccountWizard>,
    }

    fn fixture() -> Fixture {
        let catalog = StaticCatalog::new(["vless", "trojan"]);
        let env = WizardEnv::new(
            &WizardConfig::new(vec![1]),
            Arc::new(InMemoryProvisioner::new(catalog.clone())),
            Arc::new(catalog),
        )
        .unwrap();
        let outbox = Arc::new(Outbox::default());
        let instance = template().unwrap().instantiate();
        let replies: Arc<dyn ReplySink> = outbox.clone();
        instance.with_context_mut(|ctx| {
            ctx.meta = Some(Session::new(1, replies, CancellationToken::new()));
        });
        Fixture {
            env,
            outbox,
            instance,
        }
    }

    fn run(f: &Fixture, event: WizardEvent, input: &str) -> Result<WizardState, TriggerError> {
        f.instance.trigger(event, Some(input.to_string()), &f.env)
    }

    #[test]
    fn labels_round_trip() {
        for state in WizardState::ALL {
            assert_eq!(state.name().parse::<WizardState>().unwrap(), *state);
        }
        assert_eq!("continue".parse::<WizardEvent>().unwrap(), WizardEvent::Continue);
    }

    #[test]
    fn full_wizard_creates_account() {
        let f = fixture();

        assert_eq!(run(&f, WizardEvent::Create, "").unwrap(), WizardState::InputName);
        assert!(f.outbox.last_text().starts_with("Input username"));

        assert_eq!(run(&f, WizardEvent::Continue, "bob_1").unwrap(), WizardState::SelectProxy);
        {
            let sent = f.outbox.sent.lock();
            let offer = sent.last().unwrap();
            assert_eq!(offer.keyboard[0][0].payload, "pick:vless");
        }

        assert_eq!(run(&f, WizardEvent::Pick, "trojan").unwrap(), WizardState::SubmitData);
        assert_eq!(f.outbox.last_text(), "Username: bob_1\nProxy config: trojan");

        assert_eq!(run(&f, WizardEvent::Confirm, "").unwrap(), WizardState::Default);
        let sent = f.outbox.sent.lock();
        let created = &sent[sent.len() - 2];
        assert!(created.text.starts_with("Created user:\nusername: bob_1\nproxy config: trojan"));
        assert_eq!(sent.last().unwrap().text, "Select action");
        drop(sent);

        f.instance.with_context(|ctx| assert_eq!(ctx.data, AccountForm::default()));
        let accounts = f.env.provisioner.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn invalid_username_is_rejected_verbatim() {
        let f = fixture();
        run(&f, WizardEvent::Create, "").unwrap();

        let err = run(&f, WizardEvent::Continue, "!!").unwrap_err();

        assert_eq!(
            err.rejection(),
            Some("username '!!' does not match pattern ^[a-zA-Z0-9_]{3,32}$")
        );
        assert_eq!(f.instance.current_state(), WizardState::InputName);
        f.instance.with_context(|ctx| assert!(ctx.data.username.is_none()));
    }

    #[test]
    fn cancel_from_summary_returns_to_menu() {
        let f = fixture();
        run(&f, WizardEvent::Create, "").unwrap();
        run(&f, WizardEvent::Continue, "alice").unwrap();
        run(&f, WizardEvent::Pick, "vless").unwrap();

        assert_eq!(run(&f, WizardEvent::Cancel, "").unwrap(), WizardState::Default);
        assert!(f.env.provisioner.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn duplicate_account_keeps_summary_state() {
        let f = fixture();
        f.env
            .provisioner
            .create_account(&NewAccount {
                username: "alice".to_string(),
                category: "vless".to_string(),
            })
            .unwrap();
        run(&f, WizardEvent::Create, "").unwrap();
        run(&f, WizardEvent::Continue, "alice").unwrap();
        run(&f, WizardEvent::Pick, "vless").unwrap();

        let err = run(&f, WizardEvent::Confirm, "").unwrap_err();

        assert!(matches!(err, TriggerError::Hook(crate::engine::HookError::Failed(_))));
        assert_eq!(f.instance.current_state(), WizardState::SubmitData);
        assert_eq!(f.outbox.last_text(), "Could not add user, try again later");
    }

    #[test]
    fn cancelled_session_does_not_provision() {
        let f = fixture();
        run(&f, WizardEvent::Create, "").unwrap();
        run(&f, WizardEvent::Continue, "alice").unwrap();
        run(&f, WizardEvent::Pick, "vless").unwrap();
        f.instance.with_context(|ctx| {
            if let Some(session) = &ctx.meta {
                session.cancel.cancel();
            }
        });

        assert!(run(&f, WizardEvent::Confirm, "").is_err());
        assert!(f.env.provisioner.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn listing_users_stays_on_menu() {
        let f = fixture();

        assert_eq!(run(&f, WizardEvent::ListUsers, "").unwrap(), WizardState::Default);

        let sent = f.outbox.sent.lock();
        assert_eq!(sent[0].text, "No users yet");
        assert_eq!(sent[1].text, "Select action");
    }

    #[test]
    fn listing_proxies_shows_catalog() {
        let f = fixture();

        run(&f, WizardEvent::ListProxies, "").unwrap();

        let sent = f.outbox.sent.lock();
        assert_eq!(sent[0].text, "Proxy configurations:\nvless\ntrojan");
    }

    #[test]
    fn missing_session_fails_hooks() {
        let f = fixture();
        f.instance.with_context_mut(|ctx| ctx.meta = None);

        let err = run(&f, WizardEvent::Create, "").unwrap_err();
        assert!(err.rejection().is_none());
        assert_eq!(f.instance.current_state(), WizardState::Default);
    }
}
