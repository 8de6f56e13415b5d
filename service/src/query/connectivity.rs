//! [`Query`] collection related to the [`Connectivity`].

use std::convert::Infallible;

use tokio::sync::watch;

use crate::{Connectivity, Service};

use super::Query;

/// [`Query`] of the current overall [`Connectivity`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentConnectivity;

impl<Db, Ai> Query<CurrentConnectivity> for Service<Db, Ai> {
    type Ok = Connectivity;
    type Err = Infallible;

    async fn execute(
        &self,
        _: CurrentConnectivity,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.cache().connectivity())
    }
}

/// [`Query`] of a [`watch::Receiver`] of the overall [`Connectivity`]
/// changes.
#[derive(Clone, Copy, Debug, Default)]
pub struct WatchConnectivity;

impl<Db, Ai> Query<WatchConnectivity> for Service<Db, Ai> {
    type Ok = watch::Receiver<Connectivity>;
    type Err = Infallible;

    async fn execute(
        &self,
        _: WatchConnectivity,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.cache().watch_connectivity())
    }
}
