//! [`Query`] definition.
//!
//! Every [`Query`] is served by the [`Cache`] and never suspends on the
//! [`Database`].
//!
//! [`Cache`]: crate::Cache
//! [`Database`]: crate::infra::Database

pub mod backup;
pub mod connectivity;

use std::{convert::Infallible, marker::PhantomData};

use tokio::sync::watch;

use crate::{domain::Section, infra::database::Mode, Service};

pub use self::{
    backup::ExportBackup,
    connectivity::{CurrentConnectivity, WatchConnectivity},
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] of the current value of the `S` [`Section`].
#[derive(Debug)]
pub struct Current<S>(PhantomData<S>);

impl<S> Current<S> {
    /// Creates a new [`Current`] [`Query`].
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for Current<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Db, Ai, S: Section> Query<Current<S>> for Service<Db, Ai> {
    type Ok = S::Value;
    type Err = Infallible;

    async fn execute(&self, _: Current<S>) -> Result<Self::Ok, Self::Err> {
        Ok(self.cache().get::<S>())
    }
}

/// [`Query`] of a [`watch::Receiver`] of the `S` [`Section`] changes.
///
/// The returned [`watch::Receiver`] observes the current value as seen.
#[derive(Debug)]
pub struct Watch<S>(PhantomData<S>);

impl<S> Watch<S> {
    /// Creates a new [`Watch`] [`Query`].
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for Watch<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Db, Ai, S: Section> Query<Watch<S>> for Service<Db, Ai> {
    type Ok = watch::Receiver<S::Value>;
    type Err = Infallible;

    async fn execute(&self, _: Watch<S>) -> Result<Self::Ok, Self::Err> {
        Ok(self.cache().watch::<S>())
    }
}

/// [`Query`] of the persistence [`Mode`] selected at startup.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentMode;

impl<Db, Ai> Query<CurrentMode> for Service<Db, Ai> {
    type Ok = Mode;
    type Err = Infallible;

    async fn execute(&self, _: CurrentMode) -> Result<Self::Ok, Self::Err> {
        Ok(self.mode())
    }
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use crate::{
        command::AddItem,
        domain::{Faq, Section as _},
        fake::{self, Oracle},
        infra::database::{local::Memory, Mode},
        Command as _, Query as _,
    };

    use super::{Current, CurrentMode, Watch};

    #[tokio::test]
    async fn reads_sections_from_cache() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        let faqs = svc.execute(Current::<Faq>::new()).await.unwrap();
        let mode = svc.execute(CurrentMode).await.unwrap();

        assert_eq!(faqs, Faq::defaults());
        assert_eq!(mode, Mode::Local);
    }

    #[tokio::test]
    async fn watches_section_changes() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        let mut faqs = svc.execute(Watch::<Faq>::new()).await.unwrap();
        assert!(!faqs.has_changed().unwrap());

        let id = svc
            .execute(AddItem(Faq {
                q: "Q".to_owned(),
                a: "A".to_owned(),
            }))
            .await
            .unwrap();

        assert!(faqs.has_changed().unwrap());
        assert_eq!(faqs.borrow_and_update().last().map(|e| &e.id), Some(&id));
    }
}
