//! [`Command`] for adding a record to a [`Collection`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
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

/// [`Command`] for adding a record to a [`Collection`].
///
/// The record gets a fresh [`Id`] assigned by the [`Database`].
#[derive(Clone, Debug)]
pub struct AddItem<T>(pub T);

impl<Db, Ai, T> Command<AddItem<T>> for Service<Db, Ai>
where
    T: Collection,
    Db: Database<
        Insert<T>,
        Ok = (Id, Written<Vec<Entry<T>>>),
        Err = Traced<database::Error>,
    >,
{
    type Ok = Id;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        AddItem(record): AddItem<T>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if let Some(field) = record.missing_field() {
            return Err(tracerr::new!(E::MissingField(field)));
        }

        let (id, written) = self
            .database()
            .execute(Insert(record))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.apply::<T>(written);

        Ok(id)
    }
}

/// Error of [`AddItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Required field of the record is blank.
    #[display("`{_0}` field is required")]
    MissingField(#[error(not(source))] &'static str),
}
