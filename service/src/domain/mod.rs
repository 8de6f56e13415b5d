//! Domain definitions.

pub mod backup;
pub mod faq;
pub mod feature;
pub mod listing;
pub mod post;
pub mod profile;
pub mod socials;

use std::{fmt, str::FromStr};

use derive_more::Display;
use serde::{
    de::{self, DeserializeOwned},
    Deserialize, Deserializer, Serialize, Serializer,
};
use tokio::sync::watch;

use crate::Cache;

pub use self::{
    backup::Backup, faq::Faq, feature::Feature, listing::Listing, post::Post,
    profile::BrokerProfile, socials::SocialLinks,
};

common::define_kind! {
    #[doc = "Kind of a content [`Section`]."]
    enum Kind {
        #[doc = "Property listings."]
        Listings = 1,

        #[doc = "Broker profile singleton."]
        Profile = 2,

        #[doc = "Social links singleton."]
        Socials = 3,

        #[doc = "Frequently asked questions."]
        Faqs = 4,

        #[doc = "Feature category tiles."]
        Features = 5,

        #[doc = "Social media post tiles."]
        Posts = 6,
    }
}

impl Kind {
    /// Returns the key this [`Kind`] of [`Section`] is stored under in a
    /// local key-value storage.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Listings => "properties",
            Self::Profile => "profile",
            Self::Socials => "socials",
            Self::Faqs => "faqs",
            Self::Features => "features",
            Self::Posts => "social_posts",
        }
    }

    /// Returns the path this [`Kind`] of [`Section`] is addressed by in a
    /// remote document store.
    #[must_use]
    pub const fn remote_path(self) -> &'static str {
        match self {
            Self::Listings => "properties",
            Self::Profile => "settings/profile",
            Self::Socials => "settings/socials",
            Self::Faqs => "faqs",
            Self::Features => "features",
            Self::Posts => "social_posts",
        }
    }
}

/// Part of the site content, either a [`Collection`] or a [`Singleton`].
pub trait Section: Sized + 'static {
    /// Value of this [`Section`] as a whole.
    type Value: Clone
        + fmt::Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// [`Kind`] of this [`Section`].
    const KIND: Kind;

    /// Returns the compiled-in default value of this [`Section`].
    fn defaults() -> Self::Value;

    /// Returns the value of this [`Section`] inside the provided [`Content`].
    fn of(content: &Content) -> &Self::Value;

    /// Returns the mutable value of this [`Section`] inside the provided
    /// [`Content`].
    fn of_mut(content: &mut Content) -> &mut Self::Value;

    /// Returns the [`Cache`] channel holding the value of this [`Section`].
    fn channel(cache: &Cache) -> &watch::Sender<Self::Value>;
}

/// [`Section`] consisting of identified [`Entry`]s.
pub trait Collection:
    Section<Value = Vec<Entry<Self>>>
    + Clone
    + fmt::Debug
    + PartialEq
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
{
    /// Indicator whether this [`Collection`] is presented newest-first.
    ///
    /// Otherwise, the insertion order is preserved.
    const NEWEST_FIRST: bool;

    /// Returns the name of the first required field missing in this record,
    /// if any.
    fn missing_field(&self) -> Option<&'static str>;
}

/// [`Section`] consisting of exactly one record, replaced wholesale.
pub trait Singleton: Section<Value = Self> {}

/// Opaque identifier of an [`Entry`] in its [`Collection`].
///
/// Local storage assigns [`Id::Numeric`] ones, while a remote store assigns
/// [`Id::Key`] ones. The textual form round-trips through [`FromStr`].
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Id {
    /// Numeric ID, derived from the creation timestamp.
    Numeric(i64),

    /// String key, generated by a server.
    Key(String),
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse()
            .map_or_else(|_| Self::Key(s.to_owned()), Self::Numeric))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_i64(*n),
            Self::Key(k) => serializer.serialize_str(k),
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a string identifier")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
                Ok(Id::Numeric(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
                i64::try_from(v)
                    .map(Id::Numeric)
                    .map_err(|_| E::custom("identifier overflows `i64`"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                Ok(Id::Key(v.to_owned()))
            }
        }

        d.deserialize_any(Visitor)
    }
}

/// Record of a [`Collection`] together with its [`Id`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Entry<T> {
    /// [`Id`] of this [`Entry`].
    pub id: Id,

    /// Record itself.
    #[serde(flatten)]
    pub value: T,
}

/// Whole site content: every [`Section`] at once.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Content {
    /// [`Listing`]s, newest-first.
    pub listings: Vec<Entry<Listing>>,

    /// [`BrokerProfile`] singleton.
    pub profile: BrokerProfile,

    /// [`SocialLinks`] singleton.
    pub socials: SocialLinks,

    /// [`Faq`]s, in insertion order.
    pub faqs: Vec<Entry<Faq>>,

    /// [`Feature`] categories, in insertion order.
    pub features: Vec<Entry<Feature>>,

    /// Social media [`Post`]s, in insertion order.
    pub posts: Vec<Entry<Post>>,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            listings: Listing::defaults(),
            profile: BrokerProfile::defaults(),
            socials: SocialLinks::defaults(),
            faqs: Faq::defaults(),
            features: Feature::defaults(),
            posts: Post::defaults(),
        }
    }
}

/// Builds default [`Entry`]s numbered from `1` in the provided order.
pub(crate) fn numbered<T>(
    values: impl IntoIterator<Item = T>,
) -> Vec<Entry<T>> {
    (1..)
        .zip(values)
        .map(|(n, value)| Entry {
            id: Id::Numeric(n),
            value,
        })
        .collect()
}

/// Checks whether the provided field value is blank.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod spec {
    use super::{Entry, Faq, Id};

    #[test]
    fn id_text_round_trips() {
        assert_eq!(
            "1715949045123".parse::<Id>().unwrap(),
            Id::Numeric(1_715_949_045_123),
        );
        assert_eq!(
            "-NqXb3kP0".parse::<Id>().unwrap(),
            Id::Key("-NqXb3kP0".to_owned()),
        );

        for id in [Id::Numeric(42), Id::Key("-Nabc".to_owned())] {
            assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
        }
    }

    #[test]
    fn numeric_ids_order_before_keys() {
        let mut ids = vec![
            Id::Key("-Nb".to_owned()),
            Id::Numeric(10),
            Id::Key("-Na".to_owned()),
            Id::Numeric(9),
        ];
        ids.sort();

        assert_eq!(
            ids,
            [
                Id::Numeric(9),
                Id::Numeric(10),
                Id::Key("-Na".to_owned()),
                Id::Key("-Nb".to_owned()),
            ],
        );
    }

    #[test]
    fn entry_flattens_record() {
        let entry = Entry {
            id: Id::Numeric(7),
            value: Faq {
                q: "Pergunta?".to_owned(),
                a: "Resposta.".to_owned(),
            },
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "q": "Pergunta?", "a": "Resposta."}),
        );
        assert_eq!(serde_json::from_value::<Entry<Faq>>(json).unwrap(), entry);

        let keyed: Entry<Faq> = serde_json::from_value(
            serde_json::json!({"id": "-Nx", "q": "X", "a": "Y"}),
        )
        .unwrap();
        assert_eq!(keyed.id, Id::Key("-Nx".to_owned()));
    }
}
