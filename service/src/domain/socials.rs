//! [`SocialLinks`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{Content, Kind, Section, Singleton};

/// Contact links of the broker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SocialLinks {
    /// Instagram profile URL.
    pub instagram: String,

    /// WhatsApp chat URL.
    pub whatsapp: String,
}

impl Section for SocialLinks {
    type Value = Self;

    const KIND: Kind = Kind::Socials;

    fn defaults() -> Self {
        Self {
            instagram: "https://www.instagram.com/andrezascolari/?hl=pt"
                .to_owned(),
            whatsapp: "https://wa.me/".to_owned(),
        }
    }

    fn of(content: &Content) -> &Self {
        &content.socials
    }

    fn of_mut(content: &mut Content) -> &mut Self {
        &mut content.socials
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self> {
        &cache.socials
    }
}

impl Singleton for SocialLinks {}
