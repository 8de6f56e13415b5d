//! [`Backup`] definitions.

use common::{unit, DateTimeOf};
use serde::{Deserialize, Serialize};

use super::{
    BrokerProfile, Content, Entry, Faq, Feature, Listing, Post, SocialLinks,
};

/// Snapshot of the whole site content, exported as a single JSON document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// [`Listing`]s of this [`Backup`].
    pub properties: Vec<Entry<Listing>>,

    /// [`BrokerProfile`] of this [`Backup`].
    pub profile: BrokerProfile,

    /// [`SocialLinks`] of this [`Backup`].
    pub socials: SocialLinks,

    /// [`Faq`]s of this [`Backup`].
    pub faqs: Vec<Entry<Faq>>,

    /// [`Feature`]s of this [`Backup`].
    pub features: Vec<Entry<Feature>>,

    /// [`Post`]s of this [`Backup`].
    pub social_posts: Vec<Entry<Post>>,

    /// [`DateTime`] when this [`Backup`] was made.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub date: CreationDateTime,
}

impl Backup {
    /// Makes a new [`Backup`] of the provided [`Content`] at the current
    /// moment.
    #[must_use]
    pub fn of(content: Content) -> Self {
        let Content {
            listings,
            profile,
            socials,
            faqs,
            features,
            posts,
        } = content;
        Self {
            properties: listings,
            profile,
            socials,
            faqs,
            features,
            social_posts: posts,
            date: CreationDateTime::now(),
        }
    }
}

/// [`DateTime`] of a [`Backup`] creation.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Backup, unit::Creation)>;

/// Parsed [`Backup`] document to be restored.
///
/// Every section is optional: an absent one is left untouched on restore.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restore {
    /// [`Listing`]s to restore, if any.
    pub properties: Option<Vec<Entry<Listing>>>,

    /// [`BrokerProfile`] to restore, if any.
    pub profile: Option<BrokerProfile>,

    /// [`SocialLinks`] to restore, if any.
    pub socials: Option<SocialLinks>,

    /// [`Faq`]s to restore, if any.
    pub faqs: Option<Vec<Entry<Faq>>>,

    /// [`Feature`]s to restore, if any.
    pub features: Option<Vec<Entry<Feature>>>,

    /// [`Post`]s to restore, if any.
    pub social_posts: Option<Vec<Entry<Post>>>,
}

impl Restore {
    /// Parses a [`Restore`] out of the provided [`Backup`] document bytes.
    ///
    /// # Errors
    ///
    /// If the bytes are not a JSON object of the [`Backup`] shape.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
