//! Reactive in-memory [`Cache`] of the site content.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use derive_more::Display;
use tokio::sync::watch;

use crate::domain::{
    BrokerProfile, Content, Entry, Faq, Feature, Kind, Listing, Post, Section,
    SocialLinks,
};

/// State of the link between a [`Cache`] and its source of truth.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Connectivity {
    /// No snapshot has been received yet.
    Connecting,

    /// Every [`Section`] is up to date.
    Online,

    /// At least one [`Section`] lost its subscription and shows the last
    /// known state.
    Offline,
}

impl Connectivity {
    /// Aggregates the per-[`Section`] states into the overall one.
    fn aggregate<'a>(states: impl IntoIterator<Item = &'a Self>) -> Self {
        states.into_iter().fold(Self::Online, |acc, s| match (acc, s) {
            (Self::Offline, _) | (_, Self::Offline) => Self::Offline,
            (Self::Connecting, _) | (_, Self::Connecting) => Self::Connecting,
            (Self::Online, Self::Online) => Self::Online,
        })
    }
}

/// Reactive view over every [`Section`] of the site content.
///
/// Reads never suspend. Every [`Section`] value is replaced wholesale, so
/// the last applied value wins.
#[derive(Debug)]
pub struct Cache {
    /// [`Listing`]s channel.
    pub(crate) listings: watch::Sender<Vec<Entry<Listing>>>,

    /// [`BrokerProfile`] channel.
    pub(crate) profile: watch::Sender<BrokerProfile>,

    /// [`SocialLinks`] channel.
    pub(crate) socials: watch::Sender<SocialLinks>,

    /// [`Faq`]s channel.
    pub(crate) faqs: watch::Sender<Vec<Entry<Faq>>>,

    /// [`Feature`]s channel.
    pub(crate) features: watch::Sender<Vec<Entry<Feature>>>,

    /// [`Post`]s channel.
    pub(crate) posts: watch::Sender<Vec<Entry<Post>>>,

    /// Per-[`Section`] [`Connectivity`].
    links: Mutex<HashMap<Kind, Connectivity>>,

    /// Overall [`Connectivity`] channel.
    connectivity: watch::Sender<Connectivity>,
}

impl Cache {
    /// Creates a new [`Cache`] seeded with the provided [`Content`], having
    /// every [`Section`] in the provided [`Connectivity`] state.
    #[must_use]
    pub fn new(content: Content, connectivity: Connectivity) -> Self {
        let Content {
            listings,
            profile,
            socials,
            faqs,
            features,
            posts,
        } = content;
        Self {
            listings: watch::Sender::new(listings),
            profile: watch::Sender::new(profile),
            socials: watch::Sender::new(socials),
            faqs: watch::Sender::new(faqs),
            features: watch::Sender::new(features),
            posts: watch::Sender::new(posts),
            links: Mutex::new(
                Kind::ALL.iter().map(|k| (*k, connectivity)).collect(),
            ),
            connectivity: watch::Sender::new(connectivity),
        }
    }

    /// Returns the current value of the `S` [`Section`].
    #[must_use]
    pub fn get<S: Section>(&self) -> S::Value {
        S::channel(self).borrow().clone()
    }

    /// Returns a [`watch::Receiver`] of the `S` [`Section`] changes.
    #[must_use]
    pub fn watch<S: Section>(&self) -> watch::Receiver<S::Value> {
        S::channel(self).subscribe()
    }

    /// Returns the current value of every [`Section`].
    #[must_use]
    pub fn content(&self) -> Content {
        Content {
            listings: self.get::<Listing>(),
            profile: self.get::<BrokerProfile>(),
            socials: self.get::<SocialLinks>(),
            faqs: self.get::<Faq>(),
            features: self.get::<Feature>(),
            posts: self.get::<Post>(),
        }
    }

    /// Returns the current overall [`Connectivity`].
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        *self.connectivity.borrow()
    }

    /// Returns a [`watch::Receiver`] of the overall [`Connectivity`] changes.
    #[must_use]
    pub fn watch_connectivity(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    /// Replaces the value of the `S` [`Section`], notifying watchers only if
    /// it has changed.
    pub(crate) fn set<S: Section>(&self, value: S::Value) {
        _ = S::channel(self).send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Marks the [`Connectivity`] of the provided [`Kind`] of [`Section`].
    pub(crate) fn mark(&self, kind: Kind, state: Connectivity) {
        let overall = {
            let mut links =
                self.links.lock().unwrap_or_else(PoisonError::into_inner);
            _ = links.insert(kind, state);
            Connectivity::aggregate(links.values())
        };
        _ = self.connectivity.send_if_modified(|current| {
            if *current == overall {
                return false;
            }
            *current = overall;
            true
        });
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{Content, Entry, Faq, Id, Kind, Section as _};

    use super::{Cache, Connectivity};

    #[test]
    fn notifies_only_on_change() {
        let cache = Cache::new(Content::default(), Connectivity::Online);
        let mut rx = cache.watch::<Faq>();
        assert!(!rx.has_changed().unwrap());

        cache.set::<Faq>(Faq::defaults());
        assert!(!rx.has_changed().unwrap());

        let faqs = vec![Entry {
            id: Id::Key("-Nx".to_owned()),
            value: Faq {
                q: "Q?".to_owned(),
                a: "A.".to_owned(),
            },
        }];
        cache.set::<Faq>(faqs.clone());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), faqs);
        assert_eq!(cache.get::<Faq>(), faqs);
    }

    #[test]
    fn aggregates_connectivity() {
        let cache = Cache::new(Content::default(), Connectivity::Connecting);
        assert_eq!(cache.connectivity(), Connectivity::Connecting);

        for kind in Kind::ALL {
            cache.mark(*kind, Connectivity::Online);
        }
        assert_eq!(cache.connectivity(), Connectivity::Online);

        cache.mark(Kind::Faqs, Connectivity::Offline);
        cache.mark(Kind::Profile, Connectivity::Connecting);
        assert_eq!(cache.connectivity(), Connectivity::Offline);

        cache.mark(Kind::Faqs, Connectivity::Online);
        assert_eq!(cache.connectivity(), Connectivity::Connecting);

        cache.mark(Kind::Profile, Connectivity::Online);
        assert_eq!(cache.connectivity(), Connectivity::Online);
    }
}
