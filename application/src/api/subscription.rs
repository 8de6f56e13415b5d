//! GraphQL [`Subscription`]s definitions.

use futures::{
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::graphql_subscription;
use service::{domain, query, Query as _};
use tokio::sync::watch;

use crate::{
    api::{self, content},
    Context, Error,
};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Emits all the `Listing`s now and on every their change.
    pub async fn listings(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Vec<api::Listing>, Error>>, Error>
    {
        let rx = ctx
            .service()
            .execute(query::Watch::<domain::Listing>::new())
            .await
            .unwrap_or_else(|e| match e {});
        Ok(changes(rx, |v| v.into_iter().map(Into::into).collect()))
    }

    /// Emits all the `Faq`s now and on every their change.
    pub async fn faqs(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Vec<api::Faq>, Error>>, Error> {
        let rx = ctx
            .service()
            .execute(query::Watch::<domain::Faq>::new())
            .await
            .unwrap_or_else(|e| match e {});
        Ok(changes(rx, |v| v.into_iter().map(Into::into).collect()))
    }

    /// Emits the broker `Profile` now and on every its change.
    pub async fn profile(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<api::Profile, Error>>, Error> {
        let rx = ctx
            .service()
            .execute(query::Watch::<domain::BrokerProfile>::new())
            .await
            .unwrap_or_else(|e| match e {});
        Ok(changes(rx, Into::into))
    }

    /// Emits the state of the link to the source of truth now and on every
    /// its change.
    pub async fn connectivity(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<content::Connectivity, Error>>, Error>
    {
        let rx = ctx
            .service()
            .execute(query::WatchConnectivity)
            .await
            .unwrap_or_else(|e| match e {});
        Ok(changes(rx, Into::into))
    }
}

/// Turns the provided [`watch::Receiver`] into a stream emitting its current
/// value and then every change of it, mapped with the provided `map`.
///
/// Intermediate values may be skipped, but the last one is always emitted.
fn changes<T, O>(
    rx: watch::Receiver<T>,
    map: fn(T) -> O,
) -> BoxStream<'static, Result<O, Error>>
where
    T: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    stream::unfold((rx, true), move |(mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let value = rx.borrow_and_update().clone();
        Some((Ok(map(value)), (rx, false)))
    })
    .boxed()
}

#[cfg(test)]
mod spec {
    use futures::StreamExt as _;
    use tokio::sync::watch;

    use super::changes;

    #[tokio::test]
    async fn emits_current_value_then_changes() {
        let (tx, rx) = watch::channel(1);
        let mut stream = changes(rx, |v: i32| v * 10);

        assert_eq!(stream.next().await.unwrap().unwrap(), 10);

        _ = tx.send_replace(2);
        assert_eq!(stream.next().await.unwrap().unwrap(), 20);

        drop(tx);
        assert!(stream.next().await.is_none());
    }
}
