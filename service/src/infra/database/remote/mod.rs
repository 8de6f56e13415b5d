//! [`Remote`] [`Database`] implementation, speaking the [Firebase Realtime
//! Database REST protocol][1].
//!
//! [1]: https://firebase.google.com/docs/reference/rest/database

pub mod document;
mod sse;
mod tree;

use std::{collections::VecDeque, sync::Arc, time::Duration};

use common::operations::{By, Delete, Insert, Replace, Select, Subscribe};
use derive_more::{Display, Error as StdError, From};
use futures::{
    stream::{self, LocalBoxStream},
    StreamExt as _, TryStreamExt as _,
};
use reqwest::{header, Method, StatusCode, Url};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use serde_json::Value;
use smart_default::SmartDefault;
use tokio::time;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{Collection, Content, Entry, Id, Section},
    infra::database::{self, Database, Feed, Mode, Written},
};

use self::tree::Tree;

pub use self::document::Document;

/// Secrets shipped in configuration templates, never valid ones.
const PLACEHOLDER_SECRETS: &[&str] =
    &["COLE_SUA_API_KEY_AQUI", "SUA_API_KEY_AQUI"];

/// Checks whether the provided secret looks like a real credential.
#[must_use]
pub fn is_valid_secret(secret: &SecretString) -> bool {
    let secret = secret.expose_secret().trim();
    !secret.is_empty() && !PLACEHOLDER_SECRETS.contains(&secret)
}

/// Checks whether the provided record key is allowed as a single path
/// segment by the database.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains(['/', '.', '#', '$', '[', ']'])
        && !key.chars().any(char::is_control)
}

/// [`Remote`] database configuration.
#[derive(Debug, SmartDefault)]
pub struct Config {
    /// Base URL of the database (e.g. `https://<db>.firebaseio.com`).
    pub url: String,

    /// Secret to authorize requests with.
    #[default(SecretString::from(String::new()))]
    pub secret: SecretString,

    /// Root path every section is kept under. Empty for the root itself.
    pub namespace: String,

    /// Timeout of a single write request.
    #[default(Duration::from_secs(10))]
    pub timeout: Duration,

    /// [`Retry`] policy of writes.
    pub retry: Retry,

    /// Maximum silence of a subscription before it's considered lost.
    ///
    /// The server sends a `keep-alive` event every 30 seconds.
    #[default(Duration::from_secs(60))]
    pub idle_timeout: Duration,
}

/// Retry policy of [`Remote`] writes.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Retry {
    /// Total number of attempts, including the first one.
    #[default(3)]
    pub attempts: u32,

    /// Delay before the first retry, doubled before each next one.
    #[default(Duration::from_millis(200))]
    pub backoff: Duration,
}

/// [`Database`] backed by a hosted realtime database.
///
/// Writes never return the new state: it's delivered by subscriptions only.
#[derive(Clone, Debug)]
pub struct Remote {
    /// HTTP client.
    client: reqwest::Client,

    /// Parsed [`Config::url`].
    base: Url,

    /// [`Config`] of this [`Remote`].
    config: Arc<Config>,
}

impl Remote {
    /// Creates a new [`Remote`] database with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// - If the [`Config::url`] is not a valid base URL.
    /// - If the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, Error> {
        let base = Url::parse(config.url.trim())?;
        if base.cannot_be_a_base() {
            return Err(Error::NotBaseUrl(base));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            config: Arc::new(config),
        })
    }

    /// Returns the URL of the provided path `segments`, placed under the
    /// [`Config::namespace`].
    ///
    /// Every segment is percent-encoded, so it never escapes its parent.
    fn url<'s>(
        &'s self,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> Url {
        let mut segments: Vec<_> = self
            .config
            .namespace
            .split('/')
            .chain(segments)
            .filter(|s| !s.is_empty())
            .collect();
        let last = segments.pop().map(|s| format!("{s}.json"));

        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            _ = path.pop_if_empty().extend(segments).extend(last);
        }
        url
    }

    /// Starts an authorized request to the provided `url`.
    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .query(&[("auth", self.config.secret.expose_secret())])
    }

    /// Sends a write request to the provided `url`, retrying it on
    /// transient failures according to the [`Retry`] policy.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let Retry {
            attempts,
            mut backoff,
        } = self.config.retry;

        let mut attempt = 1;
        loop {
            let mut req = self
                .request(method.clone(), url.clone())
                .timeout(self.config.timeout);
            if let Some(body) = body {
                req = req.json(body);
            }

            let err = match req.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) if !is_transient(resp.status()) => {
                    return Err(Error::Status(resp.status()));
                }
                Ok(resp) => Error::Status(resp.status()),
                Err(e) => Error::Request(e.without_url()),
            };
            if attempt >= attempts {
                return Err(err);
            }

            log::warn!(
                "`{method} {}` failed (attempt {attempt}/{attempts}), \
                 retrying in {backoff:?}: {err}",
                url.path(),
            );
            time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }
}

/// Checks whether a request failed with the provided [`StatusCode`] is worth
/// retrying.
fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl Database<Select<By<Content, ()>>> for Remote {
    type Ok = Content;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Content, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Actual content is delivered by subscriptions.
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
        /// Response to a push request.
        #[derive(Deserialize)]
        struct Pushed {
            /// Generated key of the pushed record.
            name: String,
        }

        let body = serde_json::to_value(&value)
            .map_err(Error::Json)
            .map_err(tracerr::from_and_wrap!())?;
        let url = self.url(T::KIND.remote_path().split('/'));
        let resp = self
            .send(Method::POST, url, Some(&body))
            .await
            .map_err(tracerr::from_and_wrap!())?;
        let Pushed { name } = resp
            .json()
            .await
            .map_err(|e| Error::Request(e.without_url()))
            .map_err(tracerr::from_and_wrap!())?;

        Ok((name.parse().unwrap_or_else(|e| match e {}), Written::Pending))
    }
}

impl<T: Collection> Database<Delete<By<T, Id>>> for Remote {
    type Ok = Written<Vec<Entry<T>>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<T, Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner().to_string();
        if !is_valid_key(&key) {
            log::debug!(
                "ignoring removal of `{}` record with invalid `{key}` key",
                T::KIND,
            );
            return Ok(Written::Pending);
        }

        let url = self.url(T::KIND.remote_path().split('/').chain([&*key]));
        _ = self
            .send(Method::DELETE, url, None)
            .await
            .map_err(tracerr::from_and_wrap!())?;
        Ok(Written::Pending)
    }
}

impl<S> Database<Replace<By<S, S::Value>>> for Remote
where
    S: Section<Value: Document>,
{
    type Ok = Written<S::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Replace(by): Replace<By<S, S::Value>>,
    ) -> Result<Self::Ok, Self::Err> {
        let body = by
            .into_inner()
            .encode()
            .map_err(Error::Json)
            .map_err(tracerr::from_and_wrap!())?;
        let url = self.url(S::KIND.remote_path().split('/'));
        _ = self
            .send(Method::PUT, url, Some(&body))
            .await
            .map_err(tracerr::from_and_wrap!())?;
        Ok(Written::Pending)
    }
}

impl<S> Database<Subscribe<By<S, ()>>> for Remote
where
    S: Section<Value: Document>,
{
    type Ok = Feed<S::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Subscribe<By<S, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let path = S::KIND.remote_path();
        let resp = self
            .request(Method::GET, self.url(path.split('/')))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| Error::Request(e.without_url()))
            .map_err(tracerr::from_and_wrap!())?;
        if !resp.status().is_success() {
            return Err(tracerr::new!(database::Error::from(Error::Status(
                resp.status()
            ))));
        }
        log::debug!("subscribed to `{path}`");

        let body = resp
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .boxed_local();
        let listening = Listening::new(body, self.config.idle_timeout);
        Ok(stream::unfold(listening, |mut l| async move {
            let item = l.next().await?;
            Some((item, l))
        })
        .map(|item| {
            item.map(|root| <S::Value as Document>::decode(&root))
                .map_err(tracerr::from_and_wrap!())
        })
        .boxed_local())
    }
}

/// Payload of `put` and `patch` events.
#[derive(Debug, Deserialize)]
struct Change {
    /// Path relative to the subscribed one.
    path: String,

    /// New data at the `path`.
    data: Value,
}

/// State of a subscription, turning server-sent events into snapshots.
struct Listening {
    /// Body of the subscription response.
    body: LocalBoxStream<'static, reqwest::Result<Vec<u8>>>,

    /// Decoder of the `body`.
    decoder: sse::Decoder,

    /// Events decoded, but not applied yet.
    events: VecDeque<sse::Event>,

    /// Current state of the subscribed path.
    tree: Tree,

    /// Maximum silence of the `body` before it's considered lost.
    idle_timeout: Duration,

    /// Indicator whether this [`Listening`] is over.
    finished: bool,
}

impl Listening {
    /// Starts [`Listening`] to the provided response body, which must yield
    /// something at least once per the provided `idle_timeout`.
    fn new(
        body: LocalBoxStream<'static, reqwest::Result<Vec<u8>>>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            body,
            decoder: sse::Decoder::default(),
            events: VecDeque::new(),
            tree: Tree::default(),
            idle_timeout,
            finished: false,
        }
    }

    /// Returns the next snapshot of the subscribed path, if any.
    async fn next(&mut self) -> Option<Result<Value, Error>> {
        loop {
            if let Some(ev) = self.events.pop_front() {
                match self.apply(ev) {
                    Ok(true) => return Some(Ok(self.tree.root().clone())),
                    Ok(false) => continue,
                    Err(e) => {
                        self.finish();
                        return Some(Err(e));
                    }
                }
            }
            if self.finished {
                return None;
            }

            let Ok(chunk) =
                time::timeout(self.idle_timeout, self.body.next()).await
            else {
                self.finish();
                return Some(Err(Error::Idle(self.idle_timeout)));
            };
            match chunk {
                Some(Ok(chunk)) => {
                    self.events.extend(self.decoder.feed(&chunk));
                }
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(Error::Request(e.without_url())));
                }
                None => {
                    self.finish();
                    return None;
                }
            }
        }
    }

    /// Applies the provided event to the [`Tree`], returning whether it has
    /// been changed.
    fn apply(&mut self, ev: sse::Event) -> Result<bool, Error> {
        match ev.name.as_str() {
            "put" => {
                let Change { path, data } =
                    serde_json::from_str(&ev.data).map_err(Error::Json)?;
                self.tree.put(&path, data);
                Ok(true)
            }
            "patch" => {
                let Change { path, data } =
                    serde_json::from_str(&ev.data).map_err(Error::Json)?;
                self.tree.patch(&path, data);
                Ok(true)
            }
            "keep-alive" => Ok(false),
            "cancel" => Err(Error::Cancelled),
            "auth_revoked" => Err(Error::AuthRevoked),
            other => {
                log::debug!("ignoring unknown `{other}` event");
                Ok(false)
            }
        }
    }

    /// Finishes this [`Listening`], discarding pending events.
    fn finish(&mut self) {
        self.finished = true;
        self.events.clear();
    }
}

/// [`Remote`] database error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Configured URL cannot be parsed.
    #[display("malformed database URL: {_0}")]
    Url(url::ParseError),

    /// Configured URL cannot have path segments.
    #[display("`{_0}` cannot be a base URL")]
    #[from(ignore)]
    NotBaseUrl(#[error(not(source))] Url),

    /// Server responded with a non-success status.
    #[display("server responded with `{_0}` status")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),

    /// JSON payload cannot be encoded or decoded.
    #[display("malformed JSON payload: {_0}")]
    Json(serde_json::Error),

    /// Server cancelled the subscription.
    #[display("subscription cancelled by server")]
    #[from(ignore)]
    Cancelled,

    /// Server revoked the secret of the subscription.
    #[display("subscription authorization revoked")]
    #[from(ignore)]
    AuthRevoked,

    /// Subscription stayed silent for too long.
    #[display("subscription stayed silent for {_0:?}")]
    #[from(ignore)]
    Idle(#[error(not(source))] Duration),
}
