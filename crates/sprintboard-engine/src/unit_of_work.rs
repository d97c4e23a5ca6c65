//! Load, mutate a copy, save with a revision check.
//!
//! Every mutation runs against a freshly loaded [`WorkspaceSnapshot`]. An
//! error from the work closure drops the copy, so nothing partial is ever
//! saved. A save that loses the revision race is re-run from a fresh load up
//! to `retries` times before surfacing as [`SprintboardError::Fatal`].

use sprintboard_core::{SprintboardError, SprintboardResult};
use sprintboard_domain::commands::{Command, CommandContext};
use sprintboard_domain::{RequestContext, SprintEvent, WorkspaceSnapshot};
use sprintboard_persistence::{JsonSerializer, PersistenceStore, Serializer};

/// Result of a committed unit of work.
#[derive(Debug)]
pub struct Committed<T> {
    pub output: T,
    /// Notifications raised by the work, to deliver after commit.
    pub events: Vec<SprintEvent>,
    pub revision: u64,
}

pub struct UnitOfWork<S: PersistenceStore> {
    store: S,
    retries: u32,
}

impl<S: PersistenceStore> UnitOfWork<S> {
    pub fn new(store: S, retries: u32) -> Self {
        Self { store, retries }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last committed workspace and its revision; empty at revision 0.
    pub async fn read(&self) -> SprintboardResult<(WorkspaceSnapshot, u64)> {
        match self.store.load().await? {
            Some(snapshot) => {
                let workspace: WorkspaceSnapshot = JsonSerializer.deserialize(&snapshot.data)?;
                Ok((workspace, snapshot.metadata.revision))
            }
            None => Ok((WorkspaceSnapshot::new(), 0)),
        }
    }

    pub async fn execute<T, F>(
        &self,
        request: &RequestContext,
        mut work: F,
    ) -> SprintboardResult<Committed<T>>
    where
        T: Send,
        F: FnMut(&mut CommandContext<'_>) -> SprintboardResult<T> + Send,
    {
        let mut attempt = 0;
        loop {
            let (mut workspace, revision) = self.read().await?;
            let mut events = Vec::new();
            let output = {
                let mut ctx = workspace.context(request, &mut events);
                work(&mut ctx)?
            };
            let bytes = JsonSerializer.serialize(&workspace)?;

            match self.store.save(bytes, revision).await {
                Ok(metadata) => {
                    return Ok(Committed {
                        output,
                        events,
                        revision: metadata.revision,
                    })
                }
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!("Retrying unit of work (attempt {}): {}", attempt + 1, e);
                }
                Err(e) if e.is_transient() => return Err(SprintboardError::Fatal(Box::new(e))),
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn run<C>(
        &self,
        request: &RequestContext,
        command: &C,
    ) -> SprintboardResult<Committed<C::Output>>
    where
        C: Command,
        C::Output: Send,
    {
        self.execute(request, |ctx| command.execute(ctx)).await
    }
}
