//! [`Feature`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{is_blank, numbered, Collection, Content, Entry, Kind, Section};

/// Filterable amenity or category tile (e.g. "Frente Mar").
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Feature {
    /// Title of this [`Feature`].
    pub title: String,

    /// Image URL or data URI of this [`Feature`].
    #[serde(default)]
    pub image: String,
}

impl Feature {
    fn new(title: &str, photo: &str) -> Self {
        Self {
            title: title.to_owned(),
            image: format!(
                "https://images.unsplash.com/{photo}?q=80&w=1000\
                 &auto=format&fit=crop",
            ),
        }
    }
}

impl Section for Feature {
    type Value = Vec<Entry<Self>>;

    const KIND: Kind = Kind::Features;

    fn defaults() -> Self::Value {
        numbered([
            Self::new("Lançamentos", "photo-1545324418-cc1a3fa10c00"),
            Self::new("Mobiliados", "photo-1618221195710-dd6b41faaea6"),
            Self::new("Frente Mar", "photo-1512917774080-9991f1c4c750"),
            Self::new("Quadra Mar", "photo-1600596542815-2495db98dada"),
            Self::new("Vista Mar", "photo-1570129477492-45f003f2ddfa"),
        ])
    }

    fn of(content: &Content) -> &Self::Value {
        &content.features
    }

    fn of_mut(content: &mut Content) -> &mut Self::Value {
        &mut content.features
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self::Value> {
        &cache.features
    }
}

impl Collection for Feature {
    const NEWEST_FIRST: bool = false;

    fn missing_field(&self) -> Option<&'static str> {
        is_blank(&self.title).then_some("title")
    }
}
