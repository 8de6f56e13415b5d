//! Site content definitions, except [`Listing`]s.
//!
//! [`Listing`]: crate::api::Listing

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{GraphQLEnum, GraphQLInputObject, GraphQLObject, GraphQLScalar};
use service::{domain, infra::database};

/// Opaque identifier of a record in its collection.
///
/// Locally created records get numeric identifiers, while remotely created
/// ones get server-generated keys. Both are passed around as strings.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[graphql(name = "ItemId", transparent)]
pub struct ItemId(String);

impl From<domain::Id> for ItemId {
    fn from(id: domain::Id) -> Self {
        Self(id.to_string())
    }
}

impl From<ItemId> for domain::Id {
    fn from(ItemId(id): ItemId) -> Self {
        id.parse().unwrap_or_else(|e| match e {})
    }
}

/// Public profile of the broker.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Profile {
    /// Name of the broker.
    pub name: String,

    /// Professional title of the broker.
    pub title: String,

    /// About text, with paragraphs separated by newlines.
    pub description: String,

    /// Portrait image URL or data URI.
    pub image: String,

    /// Logo image, if any.
    pub logo: Option<String>,

    /// Hero section background image, if any.
    pub hero_image: Option<String>,

    /// Advertising pixel code, if any.
    pub pixel_code: Option<String>,

    /// Analytics measurement ID, if any.
    pub google_analytics_id: Option<String>,
}

impl From<domain::BrokerProfile> for Profile {
    fn from(profile: domain::BrokerProfile) -> Self {
        let domain::BrokerProfile {
            name,
            title,
            description,
            image,
            logo,
            hero_image,
            pixel_code,
            google_analytics_id,
        } = profile;
        Self {
            name,
            title,
            description,
            image,
            logo,
            hero_image,
            pixel_code,
            google_analytics_id,
        }
    }
}

/// New state of the broker `Profile`.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct ProfileInput {
    /// Name of the broker.
    pub name: String,

    /// Professional title of the broker.
    pub title: String,

    /// About text, with paragraphs separated by newlines.
    pub description: String,

    /// Portrait image URL or data URI.
    pub image: String,

    /// Logo image, if any.
    pub logo: Option<String>,

    /// Hero section background image, if any.
    pub hero_image: Option<String>,

    /// Advertising pixel code, if any.
    pub pixel_code: Option<String>,

    /// Analytics measurement ID, if any.
    pub google_analytics_id: Option<String>,
}

impl From<ProfileInput> for domain::BrokerProfile {
    fn from(input: ProfileInput) -> Self {
        let ProfileInput {
            name,
            title,
            description,
            image,
            logo,
            hero_image,
            pixel_code,
            google_analytics_id,
        } = input;
        Self {
            name,
            title,
            description,
            image,
            logo,
            hero_image,
            pixel_code,
            google_analytics_id,
        }
    }
}

/// Contact links of the broker.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Socials {
    /// Instagram profile URL.
    pub instagram: String,

    /// WhatsApp chat URL.
    pub whatsapp: String,
}

impl From<domain::SocialLinks> for Socials {
    fn from(links: domain::SocialLinks) -> Self {
        let domain::SocialLinks {
            instagram,
            whatsapp,
        } = links;
        Self {
            instagram,
            whatsapp,
        }
    }
}

/// New state of the broker `Socials`.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct SocialsInput {
    /// Instagram profile URL.
    pub instagram: String,

    /// WhatsApp chat URL.
    pub whatsapp: String,
}

impl From<SocialsInput> for domain::SocialLinks {
    fn from(SocialsInput { instagram, whatsapp }: SocialsInput) -> Self {
        Self {
            instagram,
            whatsapp,
        }
    }
}

/// Frequently asked question.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Faq {
    /// Unique identifier of this `Faq`.
    pub id: ItemId,

    /// Question itself.
    pub question: String,

    /// Answer to the question.
    pub answer: String,
}

impl From<domain::Entry<domain::Faq>> for Faq {
    fn from(entry: domain::Entry<domain::Faq>) -> Self {
        let domain::Entry {
            id,
            value: domain::Faq { q, a },
        } = entry;
        Self {
            id: id.into(),
            question: q,
            answer: a,
        }
    }
}

/// New `Faq` to be added.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct FaqInput {
    /// Question itself.
    pub question: String,

    /// Answer to the question.
    pub answer: String,
}

impl From<FaqInput> for domain::Faq {
    fn from(FaqInput { question, answer }: FaqInput) -> Self {
        Self {
            q: question,
            a: answer,
        }
    }
}

/// Filterable amenity or category tile.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Feature {
    /// Unique identifier of this `Feature`.
    pub id: ItemId,

    /// Title of this `Feature`.
    pub title: String,

    /// Image URL or data URI of this `Feature`.
    pub image: String,
}

impl From<domain::Entry<domain::Feature>> for Feature {
    fn from(entry: domain::Entry<domain::Feature>) -> Self {
        let domain::Entry {
            id,
            value: domain::Feature { title, image },
        } = entry;
        Self {
            id: id.into(),
            title,
            image,
        }
    }
}

/// New `Feature` to be added.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct FeatureInput {
    /// Title of the `Feature`.
    pub title: String,

    /// Image URL or data URI of the `Feature`.
    #[graphql(default)]
    pub image: String,
}

impl From<FeatureInput> for domain::Feature {
    fn from(FeatureInput { title, image }: FeatureInput) -> Self {
        Self { title, image }
    }
}

/// Social media post tile.
#[derive(Clone, Debug, GraphQLObject)]
pub struct SocialPost {
    /// Unique identifier of this `SocialPost`.
    pub id: ItemId,

    /// Image URL or data URI of this `SocialPost`.
    pub image: String,

    /// Link to the original post.
    pub link: String,

    /// Displayed number of likes.
    pub likes: String,

    /// Displayed number of comments.
    pub comments: String,
}

impl From<domain::Entry<domain::Post>> for SocialPost {
    fn from(entry: domain::Entry<domain::Post>) -> Self {
        let domain::Entry {
            id,
            value:
                domain::Post {
                    image,
                    link,
                    likes,
                    comments,
                },
        } = entry;
        Self {
            id: id.into(),
            image,
            link,
            likes,
            comments,
        }
    }
}

/// New `SocialPost` to be added.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct SocialPostInput {
    /// Image URL or data URI of the `SocialPost`.
    pub image: String,

    /// Link to the original post.
    #[graphql(default)]
    pub link: String,

    /// Displayed number of likes.
    #[graphql(default)]
    pub likes: String,

    /// Displayed number of comments.
    #[graphql(default)]
    pub comments: String,
}

impl From<SocialPostInput> for domain::Post {
    fn from(input: SocialPostInput) -> Self {
        let SocialPostInput {
            image,
            link,
            likes,
            comments,
        } = input;
        Self {
            image,
            link,
            likes,
            comments,
        }
    }
}

/// Exported snapshot of the whole site content.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Backup {
    /// `DateTime` when this `Backup` was made.
    pub date: DateTime,

    /// JSON document to be imported back.
    pub document: String,
}

/// Where the site content is kept.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum Mode {
    /// In files on the server itself.
    Local,

    /// In a remote realtime database.
    Remote,
}

impl From<database::Mode> for Mode {
    fn from(mode: database::Mode) -> Self {
        match mode {
            database::Mode::Local => Self::Local,
            database::Mode::Remote => Self::Remote,
        }
    }
}

/// State of the link between the served content and its source of truth.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum Connectivity {
    /// No content has been received yet.
    Connecting,

    /// The content is up to date.
    Online,

    /// The link is lost, so the last known content is served.
    Offline,
}

impl From<service::Connectivity> for Connectivity {
    fn from(connectivity: service::Connectivity) -> Self {
        match connectivity {
            service::Connectivity::Connecting => Self::Connecting,
            service::Connectivity::Online => Self::Online,
            service::Connectivity::Offline => Self::Offline,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::ItemId;

    #[test]
    fn item_ids_keep_their_form() {
        let numeric = ItemId::from(domain::Id::Numeric(1_717_171_717_171));
        let key = ItemId::from(domain::Id::Key("-Nabc".to_owned()));

        assert_eq!(numeric.to_string(), "1717171717171");
        assert_eq!(
            domain::Id::from(numeric),
            domain::Id::Numeric(1_717_171_717_171),
        );
        assert_eq!(domain::Id::from(key), domain::Id::Key("-Nabc".to_owned()));
    }
}
