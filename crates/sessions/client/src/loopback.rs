//! In-memory session provider for local play and tests.
//!
//! Implements the full [`SessionProvider`] contract without touching any
//! platform service: operations are accepted or rejected synchronously and
//! their completion events queue up until the next poll, giving tests the
//! same accepted-now-completes-later shape as a real backend. Every accepted
//! or rejected call is recorded so tests can assert exactly what the
//! coordinator asked for.

use std::collections::VecDeque;

use tracing::debug;
use uuid::Uuid;

use sessions_shared::{
    Completion, JoinSessionResult, OperationKind, ProviderError, ProviderHandle, SessionProvider,
    SessionSearch, SessionSearchResult, SessionSettings,
};

/// One provider entry point invocation, recorded in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Create(SessionSettings),
    Find(SessionSearch),
    Join(Uuid),
    Destroy,
    Start,
}

#[derive(Debug)]
struct HostedSession {
    session_id: Uuid,
    settings: SessionSettings,
}

/// Deterministic in-memory [`SessionProvider`].
///
/// Hosts at most the one well-known session, serves discovery from a
/// scriptable list of remote sessions and exposes failure knobs
/// ([`reject_next`](Self::reject_next), [`fail_next`](Self::fail_next)) so
/// every error path of the coordinator can be driven from tests.
#[derive(Debug, Default)]
pub struct LoopbackSessionProvider {
    next_handle_id: u64,
    subscriptions: Vec<ProviderHandle>,
    queued: VecDeque<Completion>,
    hosted: Option<HostedSession>,
    remote_sessions: Vec<SessionSearchResult>,
    joined: Option<SessionSearchResult>,
    join_result_override: Option<JoinSessionResult>,
    reject_next: Vec<OperationKind>,
    fail_next: Vec<OperationKind>,
    calls: Vec<ProviderCall>,
}

impl LoopbackSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a discoverable remote session and returns the handle a find
    /// would produce for it.
    pub fn add_remote_session(
        &mut self,
        host_name: &str,
        match_type: &str,
        public_connections: u32,
    ) -> SessionSearchResult {
        let result = SessionSearchResult::new(
            host_name,
            SessionSettings::new(public_connections, match_type, true),
        );
        self.remote_sessions.push(result.clone());
        result
    }

    /// The next call of the given kind is rejected synchronously.
    pub fn reject_next(&mut self, kind: OperationKind) {
        self.reject_next.push(kind);
    }

    /// The next call of the given kind is accepted but completes as failed.
    pub fn fail_next(&mut self, kind: OperationKind) {
        self.fail_next.push(kind);
    }

    /// Overrides the result code of the next accepted join.
    pub fn script_join_result(&mut self, result: JoinSessionResult) {
        self.join_result_override = Some(result);
    }

    /// Every entry point invocation so far, in call order.
    pub fn calls(&self) -> &[ProviderCall] {
        &self.calls
    }

    /// Number of live completion subscriptions.
    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    fn take_knob(knobs: &mut Vec<OperationKind>, kind: OperationKind) -> bool {
        if let Some(position) = knobs.iter().position(|k| *k == kind) {
            knobs.remove(position);
            true
        } else {
            false
        }
    }

    fn has_subscriber(&self, kind: OperationKind) -> bool {
        self.subscriptions.iter().any(|handle| handle.kind() == kind)
    }

    /// Queues a completion, honoring the subscription gate: completions for
    /// kinds nobody listens to are dropped, as a platform delegate list would.
    fn queue(&mut self, completion: Completion) {
        if self.has_subscriber(completion.kind()) {
            self.queued.push_back(completion);
        } else {
            debug!(
                target: "sessions::loopback",
                "dropping {:?} completion without a subscriber",
                completion.kind()
            );
        }
    }

    fn hosted_as_result(&self) -> Option<SessionSearchResult> {
        self.hosted.as_ref().map(|hosted| SessionSearchResult {
            session_id: hosted.session_id,
            host_name: "localhost".into(),
            current_players: 1,
            settings: hosted.settings.clone(),
        })
    }
}

impl SessionProvider for LoopbackSessionProvider {
    fn subscribe(&mut self, kind: OperationKind) -> ProviderHandle {
        self.next_handle_id += 1;
        let handle = ProviderHandle::new(kind, self.next_handle_id);
        self.subscriptions.push(handle);
        handle
    }

    fn unsubscribe(&mut self, handle: ProviderHandle) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|live| *live != handle);
        self.subscriptions.len() != before
    }

    fn create_session(&mut self, settings: &SessionSettings) -> Result<(), ProviderError> {
        self.calls.push(ProviderCall::Create(settings.clone()));
        if Self::take_knob(&mut self.reject_next, OperationKind::Create) {
            return Err(ProviderError::Other("scripted create rejection".into()));
        }
        if settings.public_connections == 0 {
            return Err(ProviderError::InvalidSettings(
                "public_connections must be positive",
            ));
        }
        if self.hosted.is_some() {
            return Err(ProviderError::AlreadyExists);
        }
        if Self::take_knob(&mut self.fail_next, OperationKind::Create) {
            self.queue(Completion::Create { success: false });
            return Ok(());
        }
        self.hosted = Some(HostedSession {
            session_id: Uuid::new_v4(),
            settings: settings.clone(),
        });
        self.queue(Completion::Create { success: true });
        Ok(())
    }

    fn find_sessions(&mut self, search: &SessionSearch) -> Result<(), ProviderError> {
        self.calls.push(ProviderCall::Find(search.clone()));
        if Self::take_knob(&mut self.reject_next, OperationKind::Find) {
            return Err(ProviderError::Other("scripted find rejection".into()));
        }
        if search.max_results == 0 {
            return Err(ProviderError::InvalidSettings(
                "max_results must be positive",
            ));
        }
        if Self::take_knob(&mut self.fail_next, OperationKind::Find) {
            self.queue(Completion::Find {
                results: Vec::new(),
                success: false,
            });
            return Ok(());
        }
        let results: Vec<SessionSearchResult> = self
            .remote_sessions
            .iter()
            .filter(|result| !search.presence || result.settings.uses_presence)
            .take(search.max_results as usize)
            .cloned()
            .collect();
        self.queue(Completion::Find {
            results,
            success: true,
        });
        Ok(())
    }

    fn join_session(&mut self, result: &SessionSearchResult) -> Result<(), ProviderError> {
        self.calls.push(ProviderCall::Join(result.session_id));
        if Self::take_knob(&mut self.reject_next, OperationKind::Join) {
            return Err(ProviderError::Other("scripted join rejection".into()));
        }
        let outcome = if let Some(scripted) = self.join_result_override.take() {
            scripted
        } else if self.joined.is_some() {
            JoinSessionResult::AlreadyInSession
        } else if !self
            .remote_sessions
            .iter()
            .any(|known| known.session_id == result.session_id)
        {
            JoinSessionResult::SessionDoesNotExist
        } else if result.open_public_connections() == 0 {
            JoinSessionResult::SessionIsFull
        } else {
            JoinSessionResult::Success
        };
        if outcome.is_success() {
            self.joined = Some(result.clone());
        }
        self.queue(Completion::Join { result: outcome });
        Ok(())
    }

    fn destroy_session(&mut self) -> Result<(), ProviderError> {
        self.calls.push(ProviderCall::Destroy);
        if Self::take_knob(&mut self.reject_next, OperationKind::Destroy) {
            return Err(ProviderError::Other("scripted destroy rejection".into()));
        }
        if self.hosted.is_none() && self.joined.is_none() {
            return Err(ProviderError::NoSession);
        }
        if Self::take_knob(&mut self.fail_next, OperationKind::Destroy) {
            // Teardown failed, the session stays up.
            self.queue(Completion::Destroy { success: false });
            return Ok(());
        }
        self.hosted = None;
        self.joined = None;
        self.queue(Completion::Destroy { success: true });
        Ok(())
    }

    fn start_session(&mut self) -> Result<(), ProviderError> {
        self.calls.push(ProviderCall::Start);
        if Self::take_knob(&mut self.reject_next, OperationKind::Start) {
            return Err(ProviderError::Other("scripted start rejection".into()));
        }
        if self.hosted.is_none() {
            return Err(ProviderError::NoSession);
        }
        let success = !Self::take_knob(&mut self.fail_next, OperationKind::Start);
        self.queue(Completion::Start { success });
        Ok(())
    }

    fn existing_session(&self) -> Option<SessionSearchResult> {
        self.hosted_as_result()
    }

    fn subsystem_name(&self) -> Option<&str> {
        // No online identity; everything the loopback hosts is LAN.
        None
    }

    fn resolved_connect_string(&self) -> Option<String> {
        self.joined
            .as_ref()
            .map(|session| format!("loopback:{}", session.session_id))
    }

    fn poll_completions(&mut self, out: &mut Vec<Completion>) {
        out.extend(self.queued.drain(..));
    }
}
