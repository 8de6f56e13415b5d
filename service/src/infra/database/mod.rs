//! [`Database`]-related implementations.

pub mod local;
pub mod remote;

use std::sync::Arc;

use derive_more::{Display, Error as StdError, From};
use futures::stream::LocalBoxStream;
use tracerr::Traced;
use tracing as log;

pub use self::{
    local::{Local, Storage},
    remote::Remote,
};

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Remote`] error.
    #[display("`Remote` database failed: {_0}")]
    Remote(remote::Error),
}

/// Outcome of a [`Database`] write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Written<T> {
    /// The [`Database`] already holds the new authoritative value.
    Applied(T),

    /// The new value will be delivered by a subscription later.
    Pending,
}

/// Stream of authoritative values of a subscribed section.
pub type Feed<V> = LocalBoxStream<'static, Result<V, Traced<Error>>>;

/// Persistence mode a [`Database`] operates in.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Mode {
    /// Content is kept in a [`Storage`] of this process.
    Local,

    /// Content is kept in a [`Remote`] realtime database.
    Remote,
}

/// [`Database`] selected once at startup: either [`Local`] or [`Remote`].
#[derive(Clone, Debug)]
pub enum Persistence {
    /// [`Local`] persistence.
    Local(Local),

    /// [`Remote`] persistence.
    Remote(Remote),
}

impl Persistence {
    /// Selects the [`Persistence`] to use.
    ///
    /// [`Remote`] one is used only if the provided [`remote::Config`] has an
    /// URL and a valid secret, and its client can be built. Otherwise, falls
    /// back to the [`Local`] one over the provided [`Storage`].
    #[must_use]
    pub fn select(
        storage: Arc<dyn Storage + Send + Sync>,
        remote: Option<remote::Config>,
    ) -> Self {
        let Some(conf) = remote else {
            log::info!("remote database is not configured, using local one");
            return Self::Local(Local::open(storage));
        };
        if conf.url.trim().is_empty() {
            log::warn!("remote database URL is empty, using local one");
            return Self::Local(Local::open(storage));
        }
        if !remote::is_valid_secret(&conf.secret) {
            log::warn!(
                "remote database secret is missing or is a placeholder, \
                 using local one",
            );
            return Self::Local(Local::open(storage));
        }
        match Remote::new(conf) {
            Ok(remote) => {
                log::info!("using remote database");
                Self::Remote(remote)
            }
            Err(e) => {
                log::warn!(
                    "cannot build remote database client, using local one: \
                     {e}",
                );
                Self::Local(Local::open(storage))
            }
        }
    }

    /// Returns the [`Mode`] of this [`Persistence`].
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Local(_) => Mode::Local,
            Self::Remote(_) => Mode::Remote,
        }
    }
}

impl<Op> Database<Op> for Persistence
where
    Local: Database<Op, Err = Traced<Error>>,
    Remote: Database<
        Op,
        Ok = <Local as Database<Op>>::Ok,
        Err = Traced<Error>,
    >,
{
    type Ok = <Local as Database<Op>>::Ok;
    type Err = Traced<Error>;

    async fn execute(&self, op: Op) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Local(db) => db.execute(op).await,
            Self::Remote(db) => db.execute(op).await,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::{local::Memory, remote, Mode, Persistence};

    fn remote(url: &str, secret: &str) -> remote::Config {
        remote::Config {
            url: url.to_owned(),
            secret: SecretString::from(secret.to_owned()),
            ..remote::Config::default()
        }
    }

    #[test]
    fn selects_remote_only_with_valid_credentials() {
        let storage = Arc::new(Memory::default());

        let db = Persistence::select(
            storage.clone(),
            Some(remote("https://site.firebaseio.com", "s3cr3t")),
        );
        assert_eq!(db.mode(), Mode::Remote);

        for conf in [
            None,
            Some(remote("", "s3cr3t")),
            Some(remote("https://site.firebaseio.com", "")),
            Some(remote("https://site.firebaseio.com", "   ")),
            Some(remote(
                "https://site.firebaseio.com",
                "COLE_SUA_API_KEY_AQUI",
            )),
            Some(remote("https://site.firebaseio.com", "SUA_API_KEY_AQUI")),
        ] {
            let db = Persistence::select(storage.clone(), conf);
            assert_eq!(db.mode(), Mode::Local);
        }
    }
}
