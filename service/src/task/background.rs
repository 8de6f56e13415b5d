//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    fmt,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a finished [`Task`].
type BoxError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Named handles of spawned tasks.
    handles: Vec<(String, task::JoinHandle<Result<(), BoxError>>)>,
}

impl Background {
    /// Spawns a new named [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: impl fmt::Display, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        let handle = self.set.spawn_local(
            future.map(|r| r.map_err(|e| -> BoxError { Box::new(e) })),
        );
        self.handles.push((name.to_string(), handle));
    }

    /// Returns the number of [`Task`]s spawned in this [`Background`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Indicates whether no [`Task`] has been spawned in this [`Background`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    /// Runs every spawned [`Task`], resolving once all of them finish or
    /// with the first failure.
    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let tasks = handles.into_iter().map(|(name, handle)| {
            handle
                .map(move |r| {
                    let res = r.map_err(BoxError::from).and_then(|r| r);
                    match &res {
                        Ok(()) => log::debug!("`{name}` task finished"),
                        Err(e) => log::error!("`{name}` task failed: {e}"),
                    }
                    res
                })
                .boxed_local()
        });
        async move {
            set.run_until(future::try_join_all(tasks)).await.map(drop)
        }
        .boxed_local()
    }
}
