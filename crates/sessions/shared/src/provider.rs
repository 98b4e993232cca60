//! Contract for the platform session service consumed by the coordinator.

use crate::events::{Completion, ProviderError};
use crate::settings::{SessionSearch, SessionSearchResult, SessionSettings};

/// The five session operation kinds a provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Find,
    Join,
    Destroy,
    Start,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Create,
        OperationKind::Find,
        OperationKind::Join,
        OperationKind::Destroy,
        OperationKind::Start,
    ];
}

/// Registration token for one completion subscription.
///
/// Returned by [`SessionProvider::subscribe`] and required to release the
/// subscription again. At most one handle per [`OperationKind`] may be
/// outstanding at a time; the coordinator enforces this with a per-kind slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHandle {
    kind: OperationKind,
    id: u64,
}

impl ProviderHandle {
    pub const fn new(kind: OperationKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Platform session service contract.
///
/// Each operation either begins asynchronously (`Ok(())`, a matching
/// [`Completion`] arrives on a later [`poll_completions`] pump) or is rejected
/// synchronously (`Err`, no completion will ever follow). Completions are only
/// queued for operation kinds that hold a live subscription, mirroring the
/// delegate lists of the platform services this abstracts.
///
/// [`poll_completions`]: SessionProvider::poll_completions
pub trait SessionProvider {
    /// Registers interest in completions of one operation kind.
    fn subscribe(&mut self, kind: OperationKind) -> ProviderHandle;

    /// Releases a subscription. Returns false when the handle was not live.
    fn unsubscribe(&mut self, handle: ProviderHandle) -> bool;

    /// Begins creating the well-known session with the given settings.
    fn create_session(&mut self, settings: &SessionSettings) -> Result<(), ProviderError>;

    /// Begins a discovery query.
    fn find_sessions(&mut self, search: &SessionSearch) -> Result<(), ProviderError>;

    /// Begins joining a previously discovered session.
    fn join_session(&mut self, result: &SessionSearchResult) -> Result<(), ProviderError>;

    /// Begins destroying the well-known session.
    fn destroy_session(&mut self) -> Result<(), ProviderError>;

    /// Begins starting the well-known session (transition to in-progress).
    fn start_session(&mut self) -> Result<(), ProviderError>;

    /// Synchronous lookup of the well-known session, if one exists.
    fn existing_session(&self) -> Option<SessionSearchResult>;

    /// Name of the online subsystem backing this provider. `None` means the
    /// null/offline subsystem, i.e. LAN play.
    fn subsystem_name(&self) -> Option<&str>;

    /// Address to travel to after a successful join, if one is resolvable.
    fn resolved_connect_string(&self) -> Option<String>;

    /// Drains queued completion events into `out`, oldest first.
    fn poll_completions(&mut self, out: &mut Vec<Completion>);
}
