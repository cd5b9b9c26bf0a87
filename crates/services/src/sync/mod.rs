//! Optimistic update / commit / rollback against a Remote Store.

mod commands;
mod controller;
mod mutation;
mod notice;
#[cfg(test)]
pub(crate) mod testing;

pub use commands::{
    AdjustRevision, DeleteChapter, DeleteSubject, DeletedSubject, RenameChapter, RenameSubject,
    RevisionChange, RevisionStep, ToggleCriterion, UpdateConfig,
};
pub use controller::{LoadStatus, SyncController, SyncOutcome};
pub use mutation::{Mutation, MutationState, OptimisticCommand, Scope};
pub use notice::{Notice, NoticeLevel};
