//! The session lifecycle coordinator.
//!
//! Serializes session operations against a [`SessionProvider`], owns the
//! pending-subscription slot for each operation kind and translates provider
//! completions into exactly one outward [`SessionNotification`] per requested
//! operation. Runs entirely on the game's update thread; provider completions
//! are drained once per tick via [`SessionCoordinator::update`].

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use sessions_shared::{
    Completion, JoinSessionResult, OperationKind, ProviderHandle, SessionNotification,
    SessionProvider, SessionSearch, SessionSearchResult, SessionSettings, GAME_SESSION_NAME,
};

/// Saved parameters of a create request that was redirected into a
/// destroy-then-create sequence. Consumed by the destroy completion handler.
#[derive(Debug, Clone)]
struct DeferredRecreate {
    public_connections: u32,
    match_type: String,
}

/// Coordinates the lifecycle of the single well-known session.
///
/// Constructed with its provider explicitly (`None` models a platform without
/// any session service). Listeners subscribe with
/// [`subscribe_notifications`](Self::subscribe_notifications) or attach their
/// own channel sender via [`add_listener`](Self::add_listener).
pub struct SessionCoordinator<P: SessionProvider> {
    provider: Option<P>,
    pending_create: Option<ProviderHandle>,
    pending_find: Option<ProviderHandle>,
    pending_join: Option<ProviderHandle>,
    pending_destroy: Option<ProviderHandle>,
    pending_start: Option<ProviderHandle>,
    recreate_on_destroy: Option<DeferredRecreate>,
    last_settings: Option<SessionSettings>,
    last_search: Option<SessionSearch>,
    listeners: Vec<UnboundedSender<SessionNotification>>,
}

impl<P: SessionProvider> SessionCoordinator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_provider(Some(provider))
    }

    /// A coordinator without any session service. Join and destroy (and,
    /// uniformly, create and find) short-circuit to failure notifications.
    pub fn offline() -> Self {
        Self::with_provider(None)
    }

    pub fn with_provider(provider: Option<P>) -> Self {
        Self {
            provider,
            pending_create: None,
            pending_find: None,
            pending_join: None,
            pending_destroy: None,
            pending_start: None,
            recreate_on_destroy: None,
            last_settings: None,
            last_search: None,
            listeners: Vec::new(),
        }
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    /// Creates a fresh notification channel and registers its sender.
    pub fn subscribe_notifications(&mut self) -> UnboundedReceiver<SessionNotification> {
        let (sender, receiver) = unbounded_channel();
        self.listeners.push(sender);
        receiver
    }

    /// Registers an existing channel sender as a listener. Closed listeners
    /// are pruned on the next broadcast.
    pub fn add_listener(&mut self, sender: UnboundedSender<SessionNotification>) {
        self.listeners.push(sender);
    }

    /// True while an operation of the given kind is in flight.
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.pending_slot_ref(kind).is_some()
    }

    /// Settings submitted with the most recent create request.
    pub fn last_settings(&self) -> Option<&SessionSettings> {
        self.last_settings.as_ref()
    }

    /// Query submitted with the most recent find request.
    pub fn last_search(&self) -> Option<&SessionSearch> {
        self.last_search.as_ref()
    }

    /// Address to travel to after a successful join, resolved by the provider.
    pub fn connect_string(&self) -> Option<String> {
        self.provider.as_ref()?.resolved_connect_string()
    }

    /// Requests creation of the well-known session.
    ///
    /// When a session with that identity already exists it is destroyed
    /// first; creation resumes automatically from the destroy completion with
    /// the parameters given here.
    pub fn create_session(&mut self, public_connections: u32, match_type: &str) {
        if self.pending_create.is_some() {
            warn!(
                target: "sessions::coordinator",
                "create_session requested while a create is already in flight"
            );
            self.broadcast(SessionNotification::CreateSessionComplete { success: false });
            return;
        }
        let Some(provider) = self.provider.as_mut() else {
            warn!(
                target: "sessions::coordinator",
                "create_session requested without a session provider"
            );
            self.broadcast(SessionNotification::CreateSessionComplete { success: false });
            return;
        };

        if provider.existing_session().is_some() {
            debug!(
                target: "sessions::coordinator",
                "session {GAME_SESSION_NAME} already exists, destroying before recreate"
            );
            self.recreate_on_destroy = Some(DeferredRecreate {
                public_connections,
                match_type: match_type.to_owned(),
            });
            self.destroy_session();
            return;
        }

        let lan_match = provider.subsystem_name().is_none();
        let settings = SessionSettings::new(public_connections, match_type, lan_match);
        let handle = provider.subscribe(OperationKind::Create);
        match provider.create_session(&settings) {
            Ok(()) => {
                self.pending_create = Some(handle);
                self.last_settings = Some(settings);
            }
            Err(err) => {
                provider.unsubscribe(handle);
                warn!(target: "sessions::coordinator", "session create rejected: {err}");
                self.last_settings = Some(settings);
                self.broadcast(SessionNotification::CreateSessionComplete { success: false });
            }
        }
    }

    /// Requests a discovery query bounded to `max_results`.
    pub fn find_sessions(&mut self, max_results: u32) {
        if self.pending_find.is_some() {
            warn!(
                target: "sessions::coordinator",
                "find_sessions requested while a find is already in flight"
            );
            self.broadcast(SessionNotification::FindSessionsComplete {
                results: Vec::new(),
                success: false,
            });
            return;
        }
        let Some(provider) = self.provider.as_mut() else {
            warn!(
                target: "sessions::coordinator",
                "find_sessions requested without a session provider"
            );
            self.broadcast(SessionNotification::FindSessionsComplete {
                results: Vec::new(),
                success: false,
            });
            return;
        };

        let lan_query = provider.subsystem_name().is_none();
        let search = SessionSearch::new(max_results, lan_query);
        let handle = provider.subscribe(OperationKind::Find);
        match provider.find_sessions(&search) {
            Ok(()) => {
                self.pending_find = Some(handle);
                self.last_search = Some(search);
            }
            Err(err) => {
                provider.unsubscribe(handle);
                warn!(target: "sessions::coordinator", "session search rejected: {err}");
                self.last_search = Some(search);
                self.broadcast(SessionNotification::FindSessionsComplete {
                    results: Vec::new(),
                    success: false,
                });
            }
        }
    }

    /// Requests joining a previously discovered session.
    pub fn join_session(&mut self, result: &SessionSearchResult) {
        if self.pending_join.is_some() {
            warn!(
                target: "sessions::coordinator",
                "join_session requested while a join is already in flight"
            );
            self.broadcast(SessionNotification::JoinSessionComplete {
                result: JoinSessionResult::UnknownError,
            });
            return;
        }
        let Some(provider) = self.provider.as_mut() else {
            self.broadcast(SessionNotification::JoinSessionComplete {
                result: JoinSessionResult::UnknownError,
            });
            return;
        };

        let handle = provider.subscribe(OperationKind::Join);
        match provider.join_session(result) {
            Ok(()) => self.pending_join = Some(handle),
            Err(err) => {
                provider.unsubscribe(handle);
                warn!(target: "sessions::coordinator", "session join rejected: {err}");
                self.broadcast(SessionNotification::JoinSessionComplete {
                    result: JoinSessionResult::UnknownError,
                });
            }
        }
    }

    /// Requests teardown of the well-known session.
    pub fn destroy_session(&mut self) {
        if self.pending_destroy.is_some() {
            // A latched recreate intent stays untouched here: the in-flight
            // destroy will consume it when it completes.
            warn!(
                target: "sessions::coordinator",
                "destroy_session requested while a destroy is already in flight"
            );
            self.broadcast(SessionNotification::DestroySessionComplete { success: false });
            return;
        }
        let Some(provider) = self.provider.as_mut() else {
            self.broadcast(SessionNotification::DestroySessionComplete { success: false });
            return;
        };

        let handle = provider.subscribe(OperationKind::Destroy);
        match provider.destroy_session() {
            Ok(()) => self.pending_destroy = Some(handle),
            Err(err) => {
                provider.unsubscribe(handle);
                warn!(target: "sessions::coordinator", "session destroy rejected: {err}");
                if self.recreate_on_destroy.take().is_some() {
                    warn!(
                        target: "sessions::coordinator",
                        "destroy rejected with a recreate pending, reporting the deferred create as failed"
                    );
                    self.broadcast(SessionNotification::CreateSessionComplete { success: false });
                }
                self.broadcast(SessionNotification::DestroySessionComplete { success: false });
            }
        }
    }

    /// Intentional no-op seam: the provider flow for transitioning a session
    /// to in-progress is not wired up yet. Performs no provider call and
    /// emits no notification.
    pub fn start_session(&mut self) {
        debug!(
            target: "sessions::coordinator",
            "start_session requested, no provider flow wired"
        );
    }

    /// Drains provider completions and dispatches them. Call once per tick.
    pub fn update(&mut self) {
        let mut completions = Vec::new();
        if let Some(provider) = self.provider.as_mut() {
            provider.poll_completions(&mut completions);
        }
        for completion in completions {
            self.dispatch(completion);
        }
    }

    fn dispatch(&mut self, completion: Completion) {
        match completion {
            Completion::Create { success } => self.on_create_complete(success),
            Completion::Find { results, success } => self.on_find_complete(results, success),
            Completion::Join { result } => self.on_join_complete(result),
            Completion::Destroy { success } => self.on_destroy_complete(success),
            Completion::Start { success } => self.on_start_complete(success),
        }
    }

    fn on_create_complete(&mut self, success: bool) {
        self.release(OperationKind::Create);
        debug!(target: "sessions::coordinator", success, "create session completed");
        self.broadcast(SessionNotification::CreateSessionComplete { success });
    }

    fn on_find_complete(&mut self, results: Vec<SessionSearchResult>, success: bool) {
        self.release(OperationKind::Find);
        // An empty result set is always reported as a failed search.
        if results.is_empty() {
            debug!(target: "sessions::coordinator", "session search returned no results");
            self.broadcast(SessionNotification::FindSessionsComplete {
                results: Vec::new(),
                success: false,
            });
            return;
        }
        debug!(
            target: "sessions::coordinator",
            count = results.len(),
            success,
            "session search completed"
        );
        self.broadcast(SessionNotification::FindSessionsComplete { results, success });
    }

    fn on_join_complete(&mut self, result: JoinSessionResult) {
        self.release(OperationKind::Join);
        debug!(target: "sessions::coordinator", ?result, "join session completed");
        self.broadcast(SessionNotification::JoinSessionComplete { result });
    }

    fn on_destroy_complete(&mut self, success: bool) {
        self.release(OperationKind::Destroy);
        if let Some(intent) = self.recreate_on_destroy.take() {
            if success {
                debug!(
                    target: "sessions::coordinator",
                    "recreating session after destroy, capacity {} match type {:?}",
                    intent.public_connections,
                    intent.match_type
                );
                self.create_session(intent.public_connections, &intent.match_type);
            } else {
                warn!(
                    target: "sessions::coordinator",
                    "destroy failed with a recreate pending, reporting the deferred create as failed"
                );
                self.broadcast(SessionNotification::CreateSessionComplete { success: false });
            }
        }
        self.broadcast(SessionNotification::DestroySessionComplete { success });
    }

    fn on_start_complete(&mut self, success: bool) {
        self.release(OperationKind::Start);
        debug!(target: "sessions::coordinator", success, "start session completed");
        self.broadcast(SessionNotification::StartSessionComplete { success });
    }

    /// Takes the pending handle for `kind` and releases its subscription.
    fn release(&mut self, kind: OperationKind) {
        let taken = self.pending_slot(kind).take();
        match taken {
            Some(handle) => {
                if let Some(provider) = self.provider.as_mut() {
                    provider.unsubscribe(handle);
                }
            }
            None => warn!(
                target: "sessions::coordinator",
                "completion for {kind:?} arrived without a pending handle"
            ),
        }
    }

    fn pending_slot(&mut self, kind: OperationKind) -> &mut Option<ProviderHandle> {
        match kind {
            OperationKind::Create => &mut self.pending_create,
            OperationKind::Find => &mut self.pending_find,
            OperationKind::Join => &mut self.pending_join,
            OperationKind::Destroy => &mut self.pending_destroy,
            OperationKind::Start => &mut self.pending_start,
        }
    }

    fn pending_slot_ref(&self, kind: OperationKind) -> &Option<ProviderHandle> {
        match kind {
            OperationKind::Create => &self.pending_create,
            OperationKind::Find => &self.pending_find,
            OperationKind::Join => &self.pending_join,
            OperationKind::Destroy => &self.pending_destroy,
            OperationKind::Start => &self.pending_start,
        }
    }

    fn broadcast(&mut self, notification: SessionNotification) {
        self.listeners
            .retain(|listener| listener.send(notification.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackSessionProvider;
    use tokio::sync::mpsc::error::TryRecvError;

    fn drain(
        receiver: &mut UnboundedReceiver<SessionNotification>,
    ) -> Vec<SessionNotification> {
        let mut out = Vec::new();
        while let Ok(notification) = receiver.try_recv() {
            out.push(notification);
        }
        out
    }

    #[test]
    fn create_stores_submitted_settings() {
        let mut coordinator = SessionCoordinator::new(LoopbackSessionProvider::new());
        coordinator.create_session(4, "Deathmatch");
        let settings = coordinator.last_settings().unwrap();
        assert_eq!(settings.public_connections, 4);
        assert_eq!(settings.match_type, "Deathmatch");
        // The loopback provider has no online identity, so LAN mode applies.
        assert!(settings.lan_match);
    }

    #[test]
    fn find_stores_submitted_search() {
        let mut coordinator = SessionCoordinator::new(LoopbackSessionProvider::new());
        coordinator.find_sessions(25);
        let search = coordinator.last_search().unwrap();
        assert_eq!(search.max_results, 25);
        assert!(search.lan_query);
        assert!(search.presence);
    }

    #[test]
    fn pending_state_clears_after_completion() {
        let mut coordinator = SessionCoordinator::new(LoopbackSessionProvider::new());
        coordinator.create_session(2, "Duel");
        assert!(coordinator.is_pending(OperationKind::Create));
        coordinator.update();
        assert!(!coordinator.is_pending(OperationKind::Create));
    }

    #[test]
    fn closed_listeners_are_pruned() {
        let mut coordinator = SessionCoordinator::new(LoopbackSessionProvider::new());
        let receiver = coordinator.subscribe_notifications();
        drop(receiver);
        let mut live = coordinator.subscribe_notifications();
        coordinator.create_session(2, "Duel");
        coordinator.update();
        assert_eq!(drain(&mut live).len(), 1);
        assert!(matches!(live.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn start_session_is_a_silent_noop() {
        let mut coordinator = SessionCoordinator::new(LoopbackSessionProvider::new());
        let mut receiver = coordinator.subscribe_notifications();
        coordinator.start_session();
        coordinator.update();
        assert!(drain(&mut receiver).is_empty());
        assert!(coordinator.provider().unwrap().calls().is_empty());
    }
}
