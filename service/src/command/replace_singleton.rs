//! [`Command`] for replacing a [`Singleton`] wholesale.

use common::operations::{By, Replace};
use tracerr::Traced;

use crate::{
    domain::Singleton,
    infra::{
        database::{self, Written},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for replacing a [`Singleton`] with the provided record.
#[derive(Clone, Debug)]
pub struct ReplaceSingleton<T>(pub T);

impl<Db, Ai, T> Command<ReplaceSingleton<T>> for Service<Db, Ai>
where
    T: Singleton,
    Db: Database<
        Replace<By<T, T>>,
        Ok = Written<T>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ReplaceSingleton(record): ReplaceSingleton<T>,
    ) -> Result<Self::Ok, Self::Err> {
        let written = self
            .database()
            .execute(Replace(By::new(record)))
            .await
            .map_err(tracerr::wrap!())?;
        self.apply::<T>(written);
        Ok(())
    }
}

/// Error of [`ReplaceSingleton`] [`Command`] execution.
pub type ExecutionError = database::Error;
