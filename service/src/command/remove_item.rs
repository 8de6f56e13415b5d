//! [`Command`] for removing a record from a [`Collection`].

use std::marker::PhantomData;

use common::operations::{By, Delete};
use tracerr::Traced;

use crate::{
    domain::{Collection, Entry, Id},
    infra::{
        database::{self, Written},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for removing a record from a [`Collection`] by its [`Id`].
///
/// Removing an absent record is a no-op.
#[derive(Debug)]
pub struct RemoveItem<T> {
    /// [`Id`] of the record to remove.
    pub id: Id,

    /// Type of the [`Collection`] to remove from.
    _of: PhantomData<T>,
}

impl<T> RemoveItem<T> {
    /// Creates a new [`RemoveItem`] [`Command`] for the provided [`Id`].
    #[must_use]
    pub fn new(id: Id) -> Self {
        Self {
            id,
            _of: PhantomData,
        }
    }
}

impl<Db, Ai, T> Command<RemoveItem<T>> for Service<Db, Ai>
where
    T: Collection,
    Db: Database<
        Delete<By<T, Id>>,
        Ok = Written<Vec<Entry<T>>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RemoveItem<T>) -> Result<Self::Ok, Self::Err> {
        let written = self
            .database()
            .execute(Delete(By::new(cmd.id)))
            .await
            .map_err(tracerr::wrap!())?;
        self.apply::<T>(written);
        Ok(())
    }
}

/// Error of [`RemoveItem`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use crate::{
        domain::{Feature, Id, Post, Section as _},
        fake::{self, Oracle},
        infra::database::local::Memory,
        Command as _,
    };

    use super::RemoveItem;

    #[tokio::test]
    async fn removes_record_idempotently() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        let id = Feature::defaults()[0].id.clone();

        svc.execute(RemoveItem::<Feature>::new(id.clone())).await.unwrap();
        let after = svc.cache().get::<Feature>();
        assert!(after.iter().all(|e| e.id != id));
        assert_eq!(after.len(), Feature::defaults().len() - 1);

        svc.execute(RemoveItem::<Feature>::new(id)).await.unwrap();
        assert_eq!(svc.cache().get::<Feature>(), after);
    }

    #[tokio::test]
    async fn ignores_unknown_id() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        svc.execute(RemoveItem::<Post>::new(Id::Key("-Nmissing".to_owned())))
            .await
            .unwrap();

        assert_eq!(svc.cache().get::<Post>(), Post::defaults());
    }
}
