//! Effect runtime for one record screen
//!
//! Effects run as tasks on a `JoinSet`; each resolves to the completion
//! event that is fed back through the reducer on the owning task, so state
//! transitions never race. Tearing the screen down aborts open prompts, while
//! mutations already sent run to completion in the background so their
//! toasts resolve and the cache learns about the change.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinSet};

use crate::api::MutationGateway;
use crate::data::Resource;
use crate::store::{QueryState, RecordStore};

use super::confirm::Confirmer;
use super::effect::Effect;
use super::event::ScreenEvent;
use super::notify::Notifier;
use super::state::{ScreenState, ScreenView};

/// Collaborators a screen needs, supplied by the surrounding application
#[derive(Clone)]
pub struct ScreenServices {
    pub store: RecordStore,
    pub gateway: MutationGateway,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
}

/// Executes effects and collects their completions
struct EffectRunner {
    services: ScreenServices,
    tasks: JoinSet<Option<ScreenEvent>>,
    /// Open confirmation prompts
    prompts: Vec<AbortHandle>,
}

impl EffectRunner {
    fn new(services: ScreenServices) -> Self {
        Self {
            services,
            tasks: JoinSet::new(),
            prompts: Vec::new(),
        }
    }

    /// Wait for the next task. `None` once nothing is pending; `Some(None)`
    /// for tasks that finish without a completion event.
    async fn join_next(&mut self) -> Option<Option<ScreenEvent>> {
        let joined = self.tasks.join_next().await?;
        Some(match joined {
            Ok(event) => event,
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                tracing::error!(error = %e, "Screen effect task failed");
                None
            }
        })
    }

    fn abort_prompts(&mut self) {
        for prompt in self.prompts.drain(..) {
            prompt.abort();
        }
    }

    fn run(&mut self, resource: &Resource, effect: Effect) {
        match effect {
            Effect::Notify(notification) => self.services.notifier.notify(&notification),
            Effect::PromptDelete { epoch, prompt } => {
                let confirmer = self.services.confirmer.clone();
                let handle = self.tasks.spawn(async move {
                    let confirmation = confirmer.confirm(&prompt).await;
                    Some(ScreenEvent::DeleteAnswered {
                        epoch,
                        confirmation,
                    })
                });
                self.prompts.retain(|prompt| !prompt.is_finished());
                self.prompts.push(handle);
            }
            Effect::Update {
                epoch,
                toast,
                patch,
            } => {
                let gateway = self.services.gateway.clone();
                let resource = resource.clone();
                self.tasks.spawn(async move {
                    let result = gateway.update(&resource, &patch).await;
                    Some(ScreenEvent::UpdateFinished {
                        epoch,
                        toast,
                        id: patch.id,
                        result,
                    })
                });
            }
            Effect::Delete { epoch, toast, id } => {
                let gateway = self.services.gateway.clone();
                let resource = resource.clone();
                self.tasks.spawn(async move {
                    let result = gateway.delete(&resource, id).await;
                    Some(ScreenEvent::DeleteFinished {
                        epoch,
                        toast,
                        id,
                        result,
                    })
                });
            }
            Effect::Invalidate(key) => {
                // Staleness is recorded before anything else can run; the
                // refetch itself belongs to the store.
                if let Some(refetch) = self.services.store.mark_stale(&key) {
                    self.tasks.spawn(async move {
                        refetch.await;
                        None
                    });
                }
            }
        }
    }
}

fn apply(state: &mut ScreenState, runner: &mut EffectRunner, event: ScreenEvent) {
    for effect in state.handle(event) {
        runner.run(state.resource(), effect);
    }
}

pub struct RecordScreen {
    state: ScreenState,
    collection_rx: watch::Receiver<QueryState>,
    runner: EffectRunner,
}

impl RecordScreen {
    pub fn new(resource: Resource, services: ScreenServices) -> Self {
        let mut collection_rx = services.store.subscribe(&resource);
        let mut state = ScreenState::new(resource);
        let initial = collection_rx.borrow_and_update().clone();
        state.handle(ScreenEvent::CollectionChanged(initial));

        Self {
            state,
            collection_rx,
            runner: EffectRunner::new(services),
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn view(&self) -> ScreenView<'_> {
        self.state.view()
    }

    /// Number of effects still in flight
    pub fn pending(&self) -> usize {
        self.runner.tasks.len()
    }

    /// Fetch the collection (or take it from cache) and apply it
    pub async fn load(&mut self) {
        let resource = self.state.resource().clone();
        if let Err(failure) = self.runner.services.store.fetch(&resource).await {
            tracing::debug!(error = %failure, "Initial load failed");
        }
        self.sync();
    }

    /// Apply a collection change published by the store, if any
    pub fn sync(&mut self) {
        if matches!(self.collection_rx.has_changed(), Ok(true)) {
            let latest = self.collection_rx.borrow_and_update().clone();
            apply(
                &mut self.state,
                &mut self.runner,
                ScreenEvent::CollectionChanged(latest),
            );
        }
    }

    /// Feed an event through the reducer and start its effects
    pub fn dispatch(&mut self, event: ScreenEvent) {
        self.sync();
        apply(&mut self.state, &mut self.runner, event);
    }

    /// Wait for the next in-flight effect and apply its completion.
    /// Returns false once nothing is pending.
    pub async fn next(&mut self) -> bool {
        let Some(completion) = self.runner.join_next().await else {
            return false;
        };
        if let Some(event) = completion {
            apply(&mut self.state, &mut self.runner, event);
        }
        self.sync();
        true
    }

    /// Run until every in-flight effect (and the effects they trigger) has
    /// completed
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    /// Tear the screen down. Open prompts are aborted and user input is
    /// ignored from now on; in-flight mutations finish on a background task
    /// that still notifies and invalidates.
    pub fn teardown(&mut self) {
        self.runner.abort_prompts();
        self.state.deactivate();
        if self.runner.tasks.is_empty() {
            return;
        }

        let mut runner = EffectRunner {
            services: self.runner.services.clone(),
            tasks: std::mem::take(&mut self.runner.tasks),
            prompts: Vec::new(),
        };
        let mut state = self.state.clone();
        match Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(
                    pending = runner.tasks.len(),
                    "Finishing effects of a closed screen"
                );
                handle.spawn(async move {
                    while let Some(completion) = runner.join_next().await {
                        if let Some(event) = completion {
                            apply(&mut state, &mut runner, event);
                        }
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    pending = runner.tasks.len(),
                    "No runtime to finish effects of a closed screen, dropping them"
                );
            }
        }
    }
}

impl Drop for RecordScreen {
    fn drop(&mut self) {
        if self.state.is_active() {
            self.teardown();
        }
    }
}
