//! [`BrokerProfile`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{Content, Kind, Section, Singleton};

/// Public profile of the broker, shown across the whole site.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerProfile {
    /// Name of the broker.
    pub name: String,

    /// Professional title of the broker.
    pub title: String,

    /// About text. Paragraphs are separated with newlines.
    pub description: String,

    /// Portrait image URL or data URI.
    pub image: String,

    /// Logo image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Hero section background image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,

    /// Advertising pixel code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_code: Option<String>,

    /// Analytics measurement ID, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics_id: Option<String>,
}

impl Section for BrokerProfile {
    type Value = Self;

    const KIND: Kind = Kind::Profile;

    fn defaults() -> Self {
        Self {
            name: "ANDREZA SCOLARI".to_owned(),
            title: "Investimentos Imobiliários".to_owned(),
            description: "Referência para investidores que buscam segurança \
                          e alta rentabilidade no mercado imobiliário de \
                          luxo.\nNossa abordagem é analítica e focada em \
                          números: um imóvel deve ser um ativo gerador de \
                          riqueza."
                .to_owned(),
            image: "https://images.unsplash.com/\
                    photo-1573496359142-b8d87734a5a2?q=80&w=1888"
                .to_owned(),
            ..Self::default()
        }
    }

    fn of(content: &Content) -> &Self {
        &content.profile
    }

    fn of_mut(content: &mut Content) -> &mut Self {
        &mut content.profile
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self> {
        &cache.profile
    }
}

impl Singleton for BrokerProfile {}
