//! Identity-keyed instance registry.
//!
//! Maps each identity to at most one live [`Instance`]. Membership lives in
//! a sharded concurrent map whose locks are separate from every instance's
//! own lock: lookups hand out an `Arc<Instance>` and release the map before
//! any trigger runs, so adding, removing or finding identities never waits
//! on an in-flight conversation step.
//!
//! Instances are never evicted automatically; they live until removed.

mod error;

pub use error::RegistryError;

use crate::core::Flow;
use crate::engine::{Instance, Template};
use dashmap::mapref::entry::{Entry, VacantEntry};
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Registry of live instances cloned from one template.
///
/// # Example
///
/// ```rust
/// use stepflow::builder::TemplateBuilder;
/// use stepflow::core::Flow;
/// use stepflow::registry::{Registry, RegistryError};
///
/// enum Chat {}
///
/// impl Flow for Chat {
///     type State = &'static str;
///     type Event = &'static str;
///     type Input = String;
///     type Data = ();
///     type Meta = ();
///     type Env = ();
/// }
///
/// let template = TemplateBuilder::<Chat>::new()
///     .initial("idle")
///     .add_transition("idle", "hello", "greeted")
///     .build()
///     .unwrap();
/// let registry = Registry::new(template);
///
/// registry.add(42_i64).unwrap();
/// assert!(matches!(registry.add(42), Err(RegistryError::AlreadyExists { .. })));
///
/// registry.trigger(&42, "hello", None, &()).unwrap();
/// assert_eq!(registry.get(&42).unwrap().current_state(), "greeted");
/// ```
pub struct Registry<K, F: Flow>
where
    K: Eq + Hash,
{
    template: Arc<Template<F>>,
    entries: DashMap<K, Arc<Instance<F>>>,
}

impl<K, F> Registry<K, F>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    F: Flow,
{
    pub fn new(template: Arc<Template<F>>) -> Self {
        Self {
            template,
            entries: DashMap::new(),
        }
    }

    pub fn template(&self) -> &Arc<Template<F>> {
        &self.template
    }

    /// Register a fresh instance for `identity`.
    pub fn add(&self, identity: K) -> Result<Arc<Instance<F>>, RegistryError> {
        match self.entries.entry(identity) {
            Entry::Occupied(entry) => Err(RegistryError::AlreadyExists {
                identity: format!("{:?}", entry.key()),
            }),
            Entry::Vacant(slot) => Ok(self.create(slot)),
        }
    }

    /// Existing instance for `identity`, or a fresh one.
    pub fn get_or_add(&self, identity: K) -> Arc<Instance<F>> {
        match self.entries.entry(identity) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(slot) => self.create(slot),
        }
    }

    fn create(&self, slot: VacantEntry<'_, K, Arc<Instance<F>>>) -> Arc<Instance<F>> {
        let instance = Arc::new(self.template.instantiate());
        tracing::info!(
            identity = ?slot.key(),
            instance = %instance.id(),
            "instance created"
        );
        slot.insert(Arc::clone(&instance));
        instance
    }

    /// Drop the instance for `identity`. Absent identities are ignored.
    ///
    /// Never takes the instance's lock, so it returns even while a trigger
    /// on the same identity is in flight.
    pub fn remove(&self, identity: &K) -> Option<Arc<Instance<F>>> {
        let removed = self.entries.remove(identity).map(|(_, instance)| instance);
        if let Some(instance) = &removed {
            tracing::info!(
                identity = ?identity,
                instance = %instance.id(),
                "instance removed"
            );
        }
        removed
    }

    pub fn exists(&self, identity: &K) -> bool {
        self.entries.contains_key(identity)
    }

    /// Look up without creating.
    pub fn get(&self, identity: &K) -> Option<Arc<Instance<F>>> {
        self.entries
            .get(identity)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Trigger `event` on the instance for `identity`.
    ///
    /// The map is released before the trigger runs.
    pub fn trigger(
        &self,
        identity: &K,
        event: F::Event,
        input: Option<F::Input>,
        env: &F::Env,
    ) -> Result<F::State, RegistryError> {
        let instance = self.get(identity).ok_or_else(|| RegistryError::NotFound {
            identity: format!("{identity:?}"),
        })?;
        Ok(instance.trigger(event, input, env)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of registered identities, in no particular order.
    pub fn identities(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateBuilder;
    use crate::engine::HookError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct Notes {
        items: Vec<String>,
    }

    enum TestFlow {}

    impl Flow for TestFlow {
        type State = &'static str;
        type Event = &'static str;
        type Input = String;
        type Data = Notes;
        type Meta = Option<u64>;
        type Env = ();
    }

    fn registry() -> Registry<i64, TestFlow> {
        let template = TemplateBuilder::<TestFlow>::new()
            .initial("A")
            .add_transition("A", "note", "A")
            .add_transition("A", "fail", "B")
            .on_transition(|step, ctx, _| {
                if let Some(input) = ctx.input().cloned() {
                    ctx.data.items.push(input);
                }
                if *step.event == "fail" {
                    return Err(HookError::failed("refused"));
                }
                Ok(())
            })
            .build()
            .unwrap();
        Registry::new(template)
    }

    #[test]
    fn duplicate_add_fails_until_removed() {
        let registry = registry();

        registry.add(1).unwrap();
        let err = registry.add(1).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyExists {
                identity: "1".to_string()
            }
        );

        assert!(registry.remove(&1).is_some());
        assert!(registry.add(1).is_ok());
    }

    #[test]
    fn remove_absent_identity_is_not_an_error() {
        let registry = registry();

        assert!(registry.remove(&7).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn get_does_not_create() {
        let registry = registry();

        assert!(registry.get(&3).is_none());
        assert!(!registry.exists(&3));

        registry.add(3).unwrap();
        assert!(registry.exists(&3));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_or_add_returns_same_instance() {
        let registry = registry();

        let first = registry.get_or_add(5);
        let second = registry.get_or_add(5);

        assert_eq!(first.id(), second.id());
        assert_eq!(registry.identities(), vec![5]);
    }

    #[test]
    fn trigger_unknown_identity_is_not_found() {
        let registry = registry();

        let err = registry.trigger(&9, "note", None, &()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn trigger_failure_is_wrapped() {
        let registry = registry();
        registry.add(1).unwrap();

        let err = registry.trigger(&1, "fail", None, &()).unwrap_err();
        assert!(matches!(err, RegistryError::Trigger(_)));
        assert_eq!(registry.get(&1).unwrap().current_state(), "A");
    }

    #[test]
    fn readding_resets_data_and_meta() {
        let registry = registry();
        let instance = registry.add(1).unwrap();
        instance.with_context_mut(|ctx| ctx.meta = Some(99));
        registry
            .trigger(&1, "note", Some("remember".to_string()), &())
            .unwrap();

        registry.remove(&1);
        let fresh = registry.add(1).unwrap();

        fresh.with_context(|ctx| {
            assert!(ctx.data.items.is_empty());
            assert!(ctx.meta.is_none());
        });
    }

    #[test]
    fn instances_do_not_share_context() {
        let registry = registry();
        let a = registry.add(1).unwrap();
        let b = registry.add(2).unwrap();

        a.with_context_mut(|ctx| ctx.meta = Some(1));
        registry
            .trigger(&1, "note", Some("only a".to_string()), &())
            .unwrap();

        b.with_context(|ctx| {
            assert!(ctx.data.items.is_empty());
            assert!(ctx.meta.is_none());
        });
        a.with_context(|ctx| assert_eq!(ctx.data.items, vec!["only a"]));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logging_into(captured: &Captured) -> impl tracing::Subscriber + Send + Sync {
        let writer = captured.clone();
        tracing_subscriber::fmt()
            .with_env_filter("stepflow=info")
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }

    #[test]
    fn remove_returns_while_trigger_is_in_flight() {
        let entered = Arc::new(AtomicBool::new(false));
        let release = Arc::new(AtomicBool::new(false));
        let (started, gate) = (entered.clone(), release.clone());
        let template = TemplateBuilder::<TestFlow>::new()
            .initial("A")
            .add_transition("A", "block", "A")
            .on_transition(move |_, _, _| {
                started.store(true, Ordering::SeqCst);
                while !gate.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
                Ok(())
            })
            .build()
            .unwrap();
        let registry = Arc::new(Registry::new(template));
        registry.add(1).unwrap();

        let worker = {
            let registry = registry.clone();
            thread::spawn(move || registry.trigger(&1, "block", None, &()))
        };
        while !entered.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }

        let (tx, rx) = mpsc::channel();
        let captured = Captured::default();
        let remover = {
            let registry = registry.clone();
            let subscriber = logging_into(&captured);
            thread::spawn(move || {
                let removed = tracing::subscriber::with_default(subscriber, || registry.remove(&1));
                let _ = tx.send(removed.is_some());
            })
        };
        let outcome = rx.recv_timeout(Duration::from_millis(500));

        release.store(true, Ordering::SeqCst);
        worker.join().unwrap().unwrap();
        remover.join().unwrap();
        assert_eq!(outcome, Ok(true));
        assert!(!registry.exists(&1));
        let logs = String::from_utf8_lossy(&captured.0.lock()).to_string();
        assert!(logs.contains("instance removed"));
    }

    #[test]
    fn creation_logs_identity_on_every_path() {
        let registry = registry();
        let captured = Captured::default();

        tracing::subscriber::with_default(logging_into(&captured), || {
            registry.add(11).unwrap();
            registry.get_or_add(12);
            registry.get_or_add(12);
        });

        let logs = String::from_utf8_lossy(&captured.0.lock()).to_string();
        let created: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("instance created"))
            .collect();
        assert_eq!(created.len(), 2);
        assert!(created[0].contains("identity=11"));
        assert!(created[1].contains("identity=12"));
    }
}
