//! [`Listing`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{is_blank, numbered, Collection, Content, Entry, Kind, Section};

/// Image used for a [`Listing`] created without one.
pub const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/\
    photo-1600596542815-2495db98dada?q=80&w=2976";

/// Property offered by the broker.
///
/// Every field is an opaque display string: prices and payment conditions
/// are shown exactly as entered.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Title of this [`Listing`].
    pub title: String,

    /// Location (city or neighborhood) of this [`Listing`].
    #[serde(default)]
    pub location: String,

    /// Formatted price of this [`Listing`].
    pub price: String,

    /// Kind of the property (e.g. "Frente Mar").
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Short specification line (e.g. "4 Suítes | 280m²").
    #[serde(default)]
    pub specs: String,

    /// Highlight tag (e.g. "Lançamento").
    #[serde(default)]
    pub tag: String,

    /// Image URL or an embedded data URI.
    #[serde(default)]
    pub image: String,

    /// Formatted down payment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<String>,

    /// Formatted installments plan, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<String>,

    /// Formatted balloon payments plan, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balloon_payments: Option<String>,

    /// Expected delivery date, as displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
}

impl Listing {
    /// Returns the demo [`Listing`] appended by a defaults import.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            title: "Skyline Tower".to_owned(),
            location: "Itajaí".to_owned(),
            price: "R$ 3.500.000".to_owned(),
            kind: "Vista Mar".to_owned(),
            specs: "3 Suítes | 190m²".to_owned(),
            tag: "Oportunidade".to_owned(),
            image: "https://images.unsplash.com/\
                    photo-1545324418-cc1a3fa10c00?q=80&w=1000"
                .to_owned(),
            ..Self::default()
        }
    }
}

impl Section for Listing {
    type Value = Vec<Entry<Self>>;

    const KIND: Kind = Kind::Listings;

    fn defaults() -> Self::Value {
        numbered([
            Self {
                title: "The Ocean Collection".to_owned(),
                location: "Balneário Camboriú".to_owned(),
                price: "R$ 5.200.000".to_owned(),
                kind: "Frente Mar".to_owned(),
                specs: "4 Suítes | 280m²".to_owned(),
                tag: "Lançamento".to_owned(),
                image: "https://images.unsplash.com/\
                        photo-1512915922686-57c11dde9b6b?q=80&w=2973"
                    .to_owned(),
                ..Self::default()
            },
            Self {
                title: "Vogue Residence".to_owned(),
                location: "Itapema".to_owned(),
                price: "R$ 1.950.000".to_owned(),
                kind: "Quadra Mar".to_owned(),
                specs: "3 Suítes | 145m²".to_owned(),
                tag: "Pré-Lançamento".to_owned(),
                image: "https://images.unsplash.com/\
                        photo-1600607687939-ce8a6c25118c?q=80&w=2900"
                    .to_owned(),
                down_payment: Some("R$ 195.000".to_owned()),
                installments: Some("60x R$ 12.000".to_owned()),
                delivery_date: Some("Dez/2027".to_owned()),
                ..Self::default()
            },
            Self {
                title: "Investment Studio".to_owned(),
                location: "São Paulo".to_owned(),
                price: "R$ 780.000".to_owned(),
                kind: "Compacto de Luxo".to_owned(),
                specs: "1 Suíte | 42m²".to_owned(),
                tag: "Renda Passiva".to_owned(),
                image: "https://images.unsplash.com/\
                        photo-1502672260266-1c1ef2d93688?q=80&w=2880"
                    .to_owned(),
                ..Self::default()
            },
        ])
    }

    fn of(content: &Content) -> &Self::Value {
        &content.listings
    }

    fn of_mut(content: &mut Content) -> &mut Self::Value {
        &mut content.listings
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self::Value> {
        &cache.listings
    }
}

impl Collection for Listing {
    const NEWEST_FIRST: bool = true;

    fn missing_field(&self) -> Option<&'static str> {
        if is_blank(&self.title) {
            return Some("title");
        }
        if is_blank(&self.price) {
            return Some("price");
        }
        None
    }
}

#[cfg(test)]
mod spec {
    use super::Listing;
    use crate::domain::Collection as _;

    #[test]
    fn requires_title_and_price() {
        assert_eq!(Listing::demo().missing_field(), None);

        let untitled = Listing {
            title: "  ".to_owned(),
            ..Listing::demo()
        };
        assert_eq!(untitled.missing_field(), Some("title"));

        let unpriced = Listing {
            price: String::new(),
            ..Listing::demo()
        };
        assert_eq!(unpriced.missing_field(), Some("price"));
    }

    #[test]
    fn uses_camel_case_and_type_field() {
        let listing = Listing {
            down_payment: Some("10%".to_owned()),
            ..Listing::demo()
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["type"], "Vista Mar");
        assert_eq!(json["downPayment"], "10%");
        assert!(json.get("installments").is_none());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let listing: Listing = serde_json::from_value(serde_json::json!({
            "title": "Garden House",
            "price": "R$ 8.900.000",
        }))
        .unwrap();

        assert_eq!(listing.title, "Garden House");
        assert!(listing.kind.is_empty());
        assert_eq!(listing.delivery_date, None);
    }
}
