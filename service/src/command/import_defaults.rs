//! [`Command`] for importing the demo [`Listing`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{Entry, Id, Listing},
    infra::{
        database::{self, Mode, Written},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for prepending the demo [`Listing`] to the listings.
///
/// Available in [`Mode::Local`] only.
#[derive(Clone, Copy, Debug)]
pub struct ImportDefaults;

impl<Db, Ai> Command<ImportDefaults> for Service<Db, Ai>
where
    Db: Database<
        Insert<Listing>,
        Ok = (Id, Written<Vec<Entry<Listing>>>),
        Err = Traced<database::Error>,
    >,
{
    type Ok = Id;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: ImportDefaults) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if self.mode() != Mode::Local {
            return Err(tracerr::new!(E::Disabled));
        }

        let (id, written) = self
            .database()
            .execute(Insert(Listing::demo()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.apply::<Listing>(written);

        Ok(id)
    }
}

/// Error of [`ImportDefaults`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Command`] is unavailable in [`Mode::Remote`].
    #[display("Importing defaults is disabled in remote mode")]
    Disabled,
}
