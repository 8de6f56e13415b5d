//! Test doubles of the [`Database`] and [`Ai`] collaborators.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use common::operations::{
    By, Delete, Generate, Insert, Replace, Select, Subscribe,
};
use futures::{stream, StreamExt as _};
use reqwest::StatusCode;
use tokio::sync::watch;
use tracerr::Traced;

use crate::{
    domain::{Collection, Content, Entry, Id, Section},
    infra::{
        ai::{Image, Picture, Prompt, ProviderError, Vision},
        database::{
            self, local::Memory, remote, Feed, Local, Mode, Written,
        },
        Ai, Database,
    },
    task, Cache, Config, Connectivity, Service,
};

/// Remote realtime database double, keeping its documents in a [`Cache`]
/// and delivering every write through subscriptions only.
#[derive(Debug)]
pub(crate) struct Remote {
    /// Documents of this database.
    pub(crate) server: Cache,

    /// Counter of generated keys.
    pushes: AtomicU64,

    /// Indicator whether writes are rejected.
    fail_writes: AtomicBool,

    /// Number of upcoming subscription attempts to reject.
    fail_subscriptions: AtomicUsize,

    /// Number of subscription attempts made so far.
    pub(crate) subscriptions: AtomicUsize,

    /// Epoch bumped to break every open subscription.
    epoch: watch::Sender<u64>,
}

impl Default for Remote {
    fn default() -> Self {
        Self::with(Content::default())
    }
}

impl Remote {
    /// Creates a new [`Remote`] double holding the provided [`Content`].
    pub(crate) fn with(content: Content) -> Self {
        Self {
            server: Cache::new(content, Connectivity::Online),
            pushes: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
            fail_subscriptions: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
            epoch: watch::Sender::new(0),
        }
    }

    /// Makes every following write fail or succeed.
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes the provided number of upcoming subscription attempts fail.
    pub(crate) fn fail_subscriptions(&self, count: usize) {
        self.fail_subscriptions.store(count, Ordering::SeqCst);
    }

    /// Breaks every open subscription with an error.
    pub(crate) fn disconnect(&self) {
        self.epoch.send_modify(|e| *e += 1);
    }

    /// Returns an error, if writes are rejected.
    fn check_write(&self) -> Result<(), Traced<database::Error>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::from(
                remote::Error::Status(StatusCode::SERVICE_UNAVAILABLE),
            )));
        }
        Ok(())
    }
}

impl Database<Select<By<Content, ()>>> for Remote {
    type Ok = Content;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Content, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Content::default())
    }
}

impl Database<Select<By<Mode, ()>>> for Remote {
    type Ok = Mode;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Mode, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Mode::Remote)
    }
}

impl<T: Collection> Database<Insert<T>> for Remote {
    type Ok = (Id, Written<Vec<Entry<T>>>);
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(value): Insert<T>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check_write()?;
        let n = self.pushes.fetch_add(1, Ordering::SeqCst);
        let id = Id::Key(format!("-Nfake{n:04}"));

        let mut entries = self.server.get::<T>();
        let entry = Entry {
            id: id.clone(),
            value,
        };
        if T::NEWEST_FIRST {
            entries.insert(0, entry);
        } else {
            entries.push(entry);
        }
        self.server.set::<T>(entries);

        Ok((id, Written::Pending))
    }
}

impl<T: Collection> Database<Delete<By<T, Id>>> for Remote {
    type Ok = Written<Vec<Entry<T>>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<T, Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check_write()?;
        let id = by.into_inner();
        let mut entries = self.server.get::<T>();
        entries.retain(|e| e.id != id);
        self.server.set::<T>(entries);
        Ok(Written::Pending)
    }
}

impl<S: Section> Database<Replace<By<S, S::Value>>> for Remote {
    type Ok = Written<S::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Replace(by): Replace<By<S, S::Value>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check_write()?;
        self.server.set::<S>(by.into_inner());
        Ok(Written::Pending)
    }
}

impl<S: Section> Database<Subscribe<By<S, ()>>> for Remote {
    type Ok = Feed<S::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Subscribe<By<S, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let rejected = self
            .fail_subscriptions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if rejected {
            return Err(tracerr::new!(database::Error::from(
                remote::Error::Status(StatusCode::BAD_GATEWAY),
            )));
        }

        let epoch = self.epoch.subscribe();
        let docs = self.server.watch::<S>();
        Ok(stream::unfold(
            (docs, epoch, true, false),
            |(mut docs, mut epoch, first, broken)| async move {
                if broken {
                    return None;
                }
                if !first {
                    tokio::select! {
                        r = docs.changed() => r.ok()?,
                        _ = epoch.changed() => {
                            let err = tracerr::new!(database::Error::from(
                                remote::Error::Cancelled,
                            ));
                            return Some((Err(err), (docs, epoch, false, true)));
                        }
                    }
                }
                let snapshot = docs.borrow_and_update().clone();
                Some((Ok(snapshot), (docs, epoch, false, false)))
            },
        )
        .boxed_local())
    }
}

/// Scripted [`Ai`] provider double.
#[derive(Debug)]
pub(crate) struct Oracle {
    /// Answer to every request, or the kind of failure to fail it with.
    answer: Result<String, Failure>,

    /// Prompts received so far.
    pub(crate) prompts: Mutex<Vec<String>>,
}

/// Kind of a scripted [`Oracle`] failure.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Failure {
    /// [`ProviderError::Unconfigured`].
    Unconfigured,

    /// [`ProviderError::Quota`].
    Quota,
}

impl Oracle {
    /// Creates an [`Oracle`] answering every request with the provided text.
    pub(crate) fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_owned()),
            prompts: Mutex::default(),
        }
    }

    /// Creates an [`Oracle`] failing every request.
    pub(crate) fn failing(failure: Failure) -> Self {
        Self {
            answer: Err(failure),
            prompts: Mutex::default(),
        }
    }

    /// Records the provided prompt and returns the scripted answer.
    fn answer(&self, prompt: String) -> Result<String, Traced<ProviderError>> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        self.answer.clone().map_err(|f| {
            tracerr::new!(match f {
                Failure::Unconfigured => ProviderError::Unconfigured,
                Failure::Quota => ProviderError::Quota,
            })
        })
    }
}

impl Ai<Generate<Prompt>> for Oracle {
    type Ok = String;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(Prompt(prompt)): Generate<Prompt>,
    ) -> Result<Self::Ok, Self::Err> {
        self.answer(prompt)
    }
}

impl Ai<Generate<Vision>> for Oracle {
    type Ok = String;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(vision): Generate<Vision>,
    ) -> Result<Self::Ok, Self::Err> {
        self.answer(vision.prompt)
    }
}

impl Ai<Generate<Picture>> for Oracle {
    type Ok = Image;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(Picture(prompt)): Generate<Picture>,
    ) -> Result<Self::Ok, Self::Err> {
        self.answer(prompt).map(|data| Image::new("image/png", data))
    }
}

/// [`Service`] over a [`Local`] database kept in [`Memory`].
pub(crate) type LocalService = Service<Local, Arc<Oracle>>;

/// [`Service`] over a [`Remote`] database double.
pub(crate) type RemoteService = Service<Arc<Remote>, Arc<Oracle>>;

/// Configuration with short resubscription delays.
pub(crate) fn config() -> Config {
    Config {
        listen: task::listen::Config {
            min_backoff: std::time::Duration::from_millis(10),
            max_backoff: std::time::Duration::from_millis(40),
        },
    }
}

/// Creates a [`LocalService`] over the provided [`Memory`] storage.
pub(crate) async fn local(
    storage: Arc<Memory>,
    oracle: Oracle,
) -> (LocalService, task::Background) {
    Service::new(config(), Local::open(storage), Arc::new(oracle))
        .await
        .unwrap()
}

/// Creates a [`RemoteService`] over the provided [`Remote`] double.
pub(crate) async fn remote(
    remote: Arc<Remote>,
    oracle: Oracle,
) -> (RemoteService, task::Background) {
    Service::new(config(), remote, Arc::new(oracle)).await.unwrap()
}

/// Runs the provided test body while driving the [`task::Background`].
pub(crate) async fn running<F: std::future::Future>(
    bg: task::Background,
    body: F,
) -> F::Output {
    use std::future::IntoFuture as _;

    tokio::select! {
        out = body => out,
        res = bg.into_future() => panic!("background stopped: {res:?}"),
    }
}

/// Waits until the provided condition holds, yielding to background tasks.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("condition is not met in time");
}
