//! [`Listen`] [`Task`].

use std::{convert::Infallible, marker::PhantomData, time::Duration};

use common::operations::{By, Start, Subscribe};
use futures::StreamExt as _;
use smart_default::SmartDefault;
use tokio::time;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::Cache;
use crate::{
    domain::Section,
    infra::{
        database::{self, Feed},
        Database,
    },
    Connectivity, Service,
};

use super::Task;

/// Configuration for [`Listen`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Delay before the first resubscription attempt.
    #[default(Duration::from_secs(1))]
    pub min_backoff: Duration,

    /// Maximum delay between resubscription attempts.
    #[default(Duration::from_secs(30))]
    pub max_backoff: Duration,
}

/// [`Task`] keeping the `S` [`Section`] of the [`Cache`] in sync with the
/// [`Database`] subscription.
///
/// Every delivered snapshot replaces the cached value. A lost subscription
/// marks the [`Section`] [`Connectivity::Offline`] and is re-established
/// with an exponential backoff, while the last known value stays in place.
#[derive(Debug)]
pub struct Listen<S>(PhantomData<S>);

impl<Db, Ai, S> Task<Start<By<Listen<S>, Config>>> for Service<Db, Ai>
where
    S: Section,
    Db: Database<
        Subscribe<By<S, ()>>,
        Ok = Feed<S::Value>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<Listen<S>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let mut backoff = config.min_backoff;

        loop {
            let subscribed =
                self.database().execute(Subscribe(By::<S, _>::new(()))).await;
            match subscribed {
                Ok(mut feed) => loop {
                    match feed.next().await {
                        Some(Ok(value)) => {
                            self.cache().set::<S>(value);
                            self.cache().mark(S::KIND, Connectivity::Online);
                            backoff = config.min_backoff;
                        }
                        Some(Err(e)) => {
                            log::warn!(
                                "`{}` subscription failed: {e}",
                                S::KIND,
                            );
                            break;
                        }
                        None => {
                            log::warn!("`{}` subscription closed", S::KIND);
                            break;
                        }
                    }
                },
                Err(e) => {
                    log::warn!("cannot subscribe to `{}`: {e}", S::KIND);
                }
            }

            self.cache().mark(S::KIND, Connectivity::Offline);
            log::info!("resubscribing to `{}` in {backoff:?}", S::KIND);
            time::sleep(backoff).await;
            backoff = next_backoff(backoff, config.max_backoff);
        }
    }
}

/// Doubles the provided `backoff`, capping it with the provided `max`.
fn next_backoff(backoff: Duration, max: Duration) -> Duration {
    backoff.saturating_mul(2).min(max)
}
