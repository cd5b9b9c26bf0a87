use async_trait::async_trait;
use tracker_core::model::{ChapterId, SubjectId};

use crate::cache::LocalCache;
use crate::error::{CacheError, RemoteError, SyncError};
use crate::remote::RemoteStore;

/// Lifecycle of one in-flight mutation.
///
/// `Idle -> AppliedLocally -> Confirmed` on success,
/// `Idle -> AppliedLocally -> RolledBack` on failure. There is no retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    AppliedLocally,
    Confirmed,
    RolledBack,
}

/// Which derived values a mutation invalidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub subject_id: Option<SubjectId>,
    pub chapter_id: Option<ChapterId>,
}

impl Scope {
    #[must_use]
    pub fn overall() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subject(subject_id: SubjectId) -> Self {
        Self {
            subject_id: Some(subject_id),
            chapter_id: None,
        }
    }

    #[must_use]
    pub fn chapter(subject_id: SubjectId, chapter_id: ChapterId) -> Self {
        Self {
            subject_id: Some(subject_id),
            chapter_id: Some(chapter_id),
        }
    }
}

/// A cache-first mutation: apply locally, send, then commit or roll back.
///
/// `apply`, `commit` and `rollback` only touch the cache, so the rollback path
/// can be exercised without any transport.
#[async_trait]
pub trait OptimisticCommand: Send + Sync {
    /// Everything needed to restore the cache exactly.
    type Prior: Send + Sync;
    type Response: Send;

    /// Mutate the cache. `Ok(None)` means there is nothing to do: no request
    /// is sent and the cache is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the target is not cached.
    fn apply(&self, cache: &mut LocalCache) -> Result<Option<Self::Prior>, SyncError>;

    /// # Errors
    ///
    /// Returns `RemoteError` on transport or store failure.
    async fn send(
        &self,
        remote: &dyn RemoteStore,
        prior: &Self::Prior,
    ) -> Result<Self::Response, RemoteError>;

    /// Accept the store's representation as authoritative.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the target vanished from the cache meanwhile.
    fn commit(&self, cache: &mut LocalCache, response: Self::Response) -> Result<(), CacheError>;

    /// Restore exactly what `apply` overwrote.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the target vanished from the cache meanwhile.
    fn rollback(&self, cache: &mut LocalCache, prior: Self::Prior) -> Result<(), CacheError>;

    fn scope(&self) -> Scope;

    /// User-visible notice after a confirmed change, if any.
    fn success_notice(&self) -> Option<String> {
        None
    }

    /// User-visible notice after a rollback.
    fn failure_notice(&self, error: &RemoteError) -> String {
        error.to_string()
    }
}

/// One command moving through the optimistic state machine.
pub struct Mutation<C: OptimisticCommand> {
    command: C,
    state: MutationState,
    prior: Option<C::Prior>,
}

impl<C: OptimisticCommand> Mutation<C> {
    #[must_use]
    pub fn new(command: C) -> Self {
        Self {
            command,
            state: MutationState::Idle,
            prior: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> MutationState {
        self.state
    }

    #[must_use]
    pub fn command(&self) -> &C {
        &self.command
    }

    /// Apply to the cache. Returns `false` for a no-op, leaving the mutation idle.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidTransition` unless idle, or the command's error.
    pub fn apply(&mut self, cache: &mut LocalCache) -> Result<bool, SyncError> {
        self.expect(MutationState::Idle)?;
        match self.command.apply(cache)? {
            Some(prior) => {
                self.prior = Some(prior);
                self.state = MutationState::AppliedLocally;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Issue the request for an applied mutation.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Remote` when the request fails.
    pub async fn send(&self, remote: &dyn RemoteStore) -> Result<C::Response, SyncError> {
        self.expect(MutationState::AppliedLocally)?;
        let prior = self
            .prior
            .as_ref()
            .ok_or(SyncError::InvalidTransition(self.state))?;
        Ok(self.command.send(remote, prior).await?)
    }

    /// # Errors
    ///
    /// Returns `SyncError` unless applied, or if the cache rejects the response.
    pub fn commit(
        &mut self,
        cache: &mut LocalCache,
        response: C::Response,
    ) -> Result<(), SyncError> {
        self.expect(MutationState::AppliedLocally)?;
        self.prior = None;
        self.state = MutationState::Confirmed;
        self.command.commit(cache, response)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SyncError` unless applied, or if the cache cannot be restored.
    pub fn rollback(&mut self, cache: &mut LocalCache) -> Result<(), SyncError> {
        self.expect(MutationState::AppliedLocally)?;
        let prior = self
            .prior
            .take()
            .ok_or(SyncError::InvalidTransition(self.state))?;
        self.state = MutationState::RolledBack;
        self.command.rollback(cache, prior)?;
        Ok(())
    }

    fn expect(&self, state: MutationState) -> Result<(), SyncError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SyncError::InvalidTransition(self.state))
        }
    }
}
