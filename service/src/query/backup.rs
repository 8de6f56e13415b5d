//! [`Query`] exporting a [`Backup`].

use std::convert::Infallible;

#[cfg(doc)]
use crate::domain::Section;
use crate::{domain::Backup, Service};

use super::Query;

/// [`Query`] exporting every [`Section`] as a [`Backup`] stamped with the
/// current date.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportBackup;

impl<Db, Ai> Query<ExportBackup> for Service<Db, Ai> {
    type Ok = Backup;
    type Err = Infallible;

    async fn execute(&self, _: ExportBackup) -> Result<Self::Ok, Self::Err> {
        Ok(Backup::of(self.cache().content()))
    }
}
