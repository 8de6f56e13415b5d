//! Service contains the content store of the site: its domain, persistence
//! backends and reactive cache.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod cache;
pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod task;

#[cfg(test)]
mod fake;

use std::{convert::Infallible, sync::Arc};

use common::operations::{By, Replace, Select, Start};
use derive_more::Debug;
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Ai;
use crate::{
    domain::{
        BrokerProfile, Content, Faq, Feature, Listing, Post, Section,
        SocialLinks,
    },
    infra::{
        database::{self, Mode, Written},
        Database,
    },
};

pub use self::{
    cache::{Cache, Connectivity},
    command::Command,
    query::Query,
    task::Task,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// [`task::Listen`] configuration.
    pub listen: task::listen::Config,
}

/// Content store of the site.
#[derive(Clone, Debug)]
pub struct Service<Db, Ai> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Ai`] provider of this [`Service`].
    ai: Ai,

    /// Persistence [`Mode`] of the [`Database`].
    mode: Mode,

    /// [`Cache`] every read is served from.
    #[debug(skip)]
    cache: Arc<Cache>,
}

impl<Db, Ai> Service<Db, Ai> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// Seeds the [`Cache`] with the initial [`Content`] of the [`Database`]
    /// and subscribes to every [`Section`] of it in the returned
    /// [`task::Background`].
    ///
    /// # Errors
    ///
    /// If the initial [`Content`] cannot be read from the [`Database`].
    pub async fn new(
        config: Config,
        database: Db,
        ai: Ai,
    ) -> Result<(Self, task::Background), Traced<database::Error>>
    where
        Db: Database<
                Select<By<Content, ()>>,
                Ok = Content,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Mode, ()>>,
                Ok = Mode,
                Err = Traced<database::Error>,
            >,
        Self: Task<ListenStart<Listing>, Ok = (), Err = Infallible>
            + Task<ListenStart<BrokerProfile>, Ok = (), Err = Infallible>
            + Task<ListenStart<SocialLinks>, Ok = (), Err = Infallible>
            + Task<ListenStart<Faq>, Ok = (), Err = Infallible>
            + Task<ListenStart<Feature>, Ok = (), Err = Infallible>
            + Task<ListenStart<Post>, Ok = (), Err = Infallible>
            + Clone
            + 'static,
    {
        let mode = database
            .execute(Select(By::<Mode, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let content = database
            .execute(Select(By::<Content, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let connectivity = match mode {
            Mode::Local => Connectivity::Online,
            Mode::Remote => Connectivity::Connecting,
        };

        let this = Self {
            config,
            database,
            ai,
            mode,
            cache: Arc::new(Cache::new(content, connectivity)),
        };

        let mut bg = task::Background::default();
        this.listen::<Listing>(&mut bg);
        this.listen::<BrokerProfile>(&mut bg);
        this.listen::<SocialLinks>(&mut bg);
        this.listen::<Faq>(&mut bg);
        this.listen::<Feature>(&mut bg);
        this.listen::<Post>(&mut bg);

        Ok((this, bg))
    }

    /// Spawns the [`task::Listen`] of the `S` [`Section`] in the provided
    /// [`task::Background`].
    fn listen<S: Section>(&self, bg: &mut task::Background)
    where
        Self: Task<ListenStart<S>, Ok = (), Err = Infallible> + Clone + 'static,
    {
        let svc = self.clone();
        bg.spawn(S::KIND, async move {
            svc.execute(Start(By::new(svc.config().listen))).await
        });
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Ai`] provider of this [`Service`].
    #[must_use]
    pub fn ai(&self) -> &Ai {
        &self.ai
    }

    /// Returns persistence [`Mode`] of this [`Service`].
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns [`Cache`] of this [`Service`].
    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Applies the provided [`Written`] value of the `S` [`Section`] to the
    /// [`Cache`].
    ///
    /// [`Written::Pending`] values are left for [`task::Listen`] to deliver.
    pub(crate) fn apply<S: Section>(&self, written: Written<S::Value>) {
        match written {
            Written::Applied(value) => self.cache.set::<S>(value),
            Written::Pending => {}
        }
    }

    /// Replaces the `S` [`Section`] with the provided value wholesale.
    pub(crate) async fn replace<S: Section>(
        &self,
        value: S::Value,
    ) -> Result<(), Traced<database::Error>>
    where
        Db: Database<
            Replace<By<S, S::Value>>,
            Ok = Written<S::Value>,
            Err = Traced<database::Error>,
        >,
    {
        let written = self
            .database
            .execute(Replace(By::new(value)))
            .await
            .map_err(tracerr::wrap!())?;
        self.apply::<S>(written);
        Ok(())
    }
}

/// Shortcut for starting a [`task::Listen`] of the `S` [`Section`].
pub type ListenStart<S> = Start<By<task::Listen<S>, task::listen::Config>>;
