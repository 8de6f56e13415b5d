//! [`Local`] [`Database`] implementation.

mod storage;

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use common::{
    operations::{By, Delete, Insert, Replace, Select, Subscribe},
    DateTime,
};
use futures::{stream, StreamExt as _};
use tracerr::Traced;
use tracing as log;

use crate::domain::{
    BrokerProfile, Collection, Content, Entry, Faq, Feature, Id, Listing,
    Post, Section, SocialLinks,
};
use super::{Database, Error, Feed, Mode, Written};

pub use self::storage::{Directory, Memory, Storage};

/// [`Database`] keeping the whole [`Content`] in memory and mirroring every
/// [`Section`] into a [`Storage`] as a JSON blob.
///
/// Writes are applied synchronously and never fail: a failed [`Storage`]
/// write is only logged.
#[derive(Clone)]
pub struct Local {
    /// [`Storage`] mirroring the [`Content`].
    storage: Arc<dyn Storage + Send + Sync>,

    /// In-memory image of the [`Content`].
    image: Arc<Mutex<Content>>,
}

impl fmt::Debug for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Local")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl Local {
    /// Opens a [`Local`] [`Database`] over the provided [`Storage`].
    ///
    /// Every [`Section`] missing in the [`Storage`] or malformed there falls
    /// back to its default value.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage + Send + Sync>) -> Self {
        let image = Content {
            listings: load::<Listing>(&*storage),
            profile: load::<BrokerProfile>(&*storage),
            socials: load::<SocialLinks>(&*storage),
            faqs: load::<Faq>(&*storage),
            features: load::<Feature>(&*storage),
            posts: load::<Post>(&*storage),
        };
        Self {
            storage,
            image: Arc::new(Mutex::new(image)),
        }
    }

    /// Mutates the `S` [`Section`] with the provided function, mirrors it
    /// into the [`Storage`] and returns its new value.
    fn write<S, R>(
        &self,
        mutate: impl FnOnce(&mut S::Value) -> R,
    ) -> (R, S::Value)
    where
        S: Section,
    {
        let mut image =
            self.image.lock().unwrap_or_else(PoisonError::into_inner);
        let value = S::of_mut(&mut image);
        let out = mutate(&mut *value);
        let value = value.clone();

        let key = S::KIND.storage_key();
        match serde_json::to_string(&value) {
            Ok(blob) => {
                if let Err(e) = self.storage.set(key, &blob) {
                    log::warn!("cannot persist `{key}` section: {e}");
                }
            }
            Err(e) => log::warn!("cannot serialize `{key}` section: {e}"),
        }

        (out, value)
    }
}

/// Loads the `S` [`Section`] from the provided [`Storage`], falling back to
/// its defaults.
fn load<S: Section>(storage: &dyn Storage) -> S::Value {
    let key = S::KIND.storage_key();
    let Some(blob) = storage.get(key) else {
        log::debug!("`{key}` section is not persisted, using defaults");
        return S::defaults();
    };
    serde_json::from_str(&blob).unwrap_or_else(|e| {
        log::debug!("`{key}` section is malformed, using defaults: {e}");
        S::defaults()
    })
}

/// Generates a new numeric [`Id`] for the provided [`Collection`] entries.
///
/// Uses the current Unix timestamp in milliseconds, unless it doesn't exceed
/// an existing numeric [`Id`].
fn next_id<T>(entries: &[Entry<T>]) -> Id {
    let now = DateTime::now().unix_timestamp_millis();
    let max = entries
        .iter()
        .filter_map(|e| match e.id {
            Id::Numeric(n) => Some(n),
            Id::Key(_) => None,
        })
        .max();
    Id::Numeric(max.map_or(now, |max| now.max(max.saturating_add(1))))
}

impl Database<Select<By<Content, ()>>> for Local {
    type Ok = Content;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<Content, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl Database<Select<By<Mode, ()>>> for Local {
    type Ok = Mode;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<Mode, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Mode::Local)
    }
}

impl<T: Collection> Database<Insert<T>> for Local {
    type Ok = (Id, Written<Vec<Entry<T>>>);
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(value): Insert<T>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, entries) = self.write::<T, _>(|entries| {
            let id = next_id(entries);
            let entry = Entry {
                id: id.clone(),
                value,
            };
            if T::NEWEST_FIRST {
                entries.insert(0, entry);
            } else {
                entries.push(entry);
            }
            id
        });
        Ok((id, Written::Applied(entries)))
    }
}

impl<T: Collection> Database<Delete<By<T, Id>>> for Local {
    type Ok = Written<Vec<Entry<T>>>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<T, Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let ((), entries) =
            self.write::<T, _>(|entries| entries.retain(|e| e.id != id));
        Ok(Written::Applied(entries))
    }
}

impl<S: Section> Database<Replace<By<S, S::Value>>> for Local {
    type Ok = Written<S::Value>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Replace(by): Replace<By<S, S::Value>>,
    ) -> Result<Self::Ok, Self::Err> {
        let new = by.into_inner();
        let ((), value) = self.write::<S, _>(|value| *value = new);
        Ok(Written::Applied(value))
    }
}

impl<S: Section> Database<Subscribe<By<S, ()>>> for Local {
    type Ok = Feed<S::Value>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Subscribe<By<S, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Nothing but this process writes here.
        Ok(stream::pending().boxed_local())
    }
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use common::operations::{By, Delete, Insert, Replace, Select};

    use crate::{
        domain::{
            BrokerProfile, Content, Faq, Feature, Kind, Listing, Section as _,
        },
        infra::database::{Database as _, Written},
    };

    use super::{Local, Memory, Storage as _};

    fn faq(q: &str) -> Faq {
        Faq {
            q: q.to_owned(),
            a: "A.".to_owned(),
        }
    }

    #[tokio::test]
    async fn falls_back_to_defaults() {
        let storage = Arc::new(Memory::default());
        storage
            .set(Kind::Profile.storage_key(), "{\"name\": ")
            .unwrap();
        storage.set(Kind::Faqs.storage_key(), "[]").unwrap();

        let db = Local::open(storage);
        let content = db
            .execute(Select(By::<Content, _>::new(())))
            .await
            .unwrap();

        assert_eq!(content.profile, BrokerProfile::defaults());
        assert!(content.faqs.is_empty());
        assert_eq!(content.listings, Listing::defaults());
    }

    #[tokio::test]
    async fn mirrors_writes_into_storage() {
        let storage = Arc::new(Memory::default());
        let db = Local::open(storage.clone());

        let (id, written) = db.execute(Insert(faq("Q?"))).await.unwrap();
        let Written::Applied(faqs) = written else {
            panic!("`Local` applies writes immediately");
        };
        assert_eq!(faqs.last().map(|e| &e.id), Some(&id));

        let reopened = Local::open(storage);
        let content = reopened
            .execute(Select(By::<Content, _>::new(())))
            .await
            .unwrap();
        assert_eq!(content.faqs, faqs);
    }

    #[tokio::test]
    async fn prepends_listings_with_increasing_ids() {
        let db = Local::open(Arc::new(Memory::default()));
        let before = Listing::defaults();

        let (id, written) = db.execute(Insert(Listing::demo())).await.unwrap();
        let Written::Applied(listings) = written else {
            panic!("`Local` applies writes immediately");
        };

        assert_eq!(listings.len(), before.len() + 1);
        assert_eq!(listings[0].id, id);
        assert_eq!(listings[0].value, Listing::demo());
        assert!(before.iter().all(|e| e.id < id));

        let (next, _) = db.execute(Insert(Listing::demo())).await.unwrap();
        assert!(next > id);
    }

    #[tokio::test]
    async fn deletes_idempotently() {
        let db = Local::open(Arc::new(Memory::default()));
        let (id, _) = db.execute(Insert(faq("Q?"))).await.unwrap();

        let first = db
            .execute(Delete(By::<Faq, _>::new(id.clone())))
            .await
            .unwrap();
        let second =
            db.execute(Delete(By::<Faq, _>::new(id))).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Written::Applied(Faq::defaults()));
    }

    #[tokio::test]
    async fn replaces_sections_wholesale() {
        let db = Local::open(Arc::new(Memory::default()));
        let profile = BrokerProfile {
            name: "Broker".to_owned(),
            ..BrokerProfile::default()
        };

        let written = db
            .execute(Replace(By::<BrokerProfile, _>::new(profile.clone())))
            .await
            .unwrap();
        assert_eq!(written, Written::Applied(profile.clone()));

        let written = db
            .execute(Replace(By::<Faq, _>::new(vec![])))
            .await
            .unwrap();
        assert_eq!(written, Written::Applied(Vec::new()));

        let content = db
            .execute(Select(By::<Content, _>::new(())))
            .await
            .unwrap();
        assert_eq!(content.profile, profile);
        assert!(content.faqs.is_empty());
        assert_eq!(content.features, Feature::defaults());
    }
}
