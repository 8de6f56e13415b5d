//! [`Listing`]-related definitions.

use juniper::{GraphQLInputObject, GraphQLObject};
use service::domain::{self, listing::PLACEHOLDER_IMAGE};

use crate::api::ItemId;

/// Property offered by the broker.
///
/// Prices and payment conditions are display strings, shown as entered.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Listing {
    /// Unique identifier of this `Listing`.
    pub id: ItemId,

    /// Title of this `Listing`.
    pub title: String,

    /// City or neighborhood of this `Listing`.
    pub location: String,

    /// Formatted price of this `Listing`.
    pub price: String,

    /// Kind of the property (e.g. "Frente Mar").
    #[graphql(name = "type")]
    pub kind: String,

    /// Short specification line (e.g. "4 Suítes | 280m²").
    pub specs: String,

    /// Highlight tag (e.g. "Lançamento").
    pub tag: String,

    /// Image URL or data URI of this `Listing`.
    pub image: String,

    /// Formatted down payment, if any.
    pub down_payment: Option<String>,

    /// Formatted installments plan, if any.
    pub installments: Option<String>,

    /// Formatted balloon payments plan, if any.
    pub balloon_payments: Option<String>,

    /// Expected delivery date, if any.
    pub delivery_date: Option<String>,
}

impl From<domain::Entry<domain::Listing>> for Listing {
    fn from(entry: domain::Entry<domain::Listing>) -> Self {
        let domain::Entry {
            id,
            value:
                domain::Listing {
                    title,
                    location,
                    price,
                    kind,
                    specs,
                    tag,
                    image,
                    down_payment,
                    installments,
                    balloon_payments,
                    delivery_date,
                },
        } = entry;
        Self {
            id: id.into(),
            title,
            location,
            price,
            kind,
            specs,
            tag,
            image,
            down_payment,
            installments,
            balloon_payments,
            delivery_date,
        }
    }
}

/// New `Listing` to be added.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
pub struct ListingInput {
    /// Title of the `Listing`.
    pub title: String,

    /// City or neighborhood of the `Listing`.
    pub location: Option<String>,

    /// Formatted price of the `Listing`.
    pub price: String,

    /// Kind of the property (e.g. "Frente Mar").
    #[graphql(name = "type")]
    pub kind: Option<String>,

    /// Short specification line.
    pub specs: Option<String>,

    /// Highlight tag.
    pub tag: Option<String>,

    /// Image URL or data URI. A placeholder is used when omitted.
    pub image: Option<String>,

    /// Formatted down payment.
    pub down_payment: Option<String>,

    /// Formatted installments plan.
    pub installments: Option<String>,

    /// Formatted balloon payments plan.
    pub balloon_payments: Option<String>,

    /// Expected delivery date.
    pub delivery_date: Option<String>,
}

impl From<ListingInput> for domain::Listing {
    fn from(input: ListingInput) -> Self {
        let ListingInput {
            title,
            location,
            price,
            kind,
            specs,
            tag,
            image,
            down_payment,
            installments,
            balloon_payments,
            delivery_date,
        } = input;
        let present = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            title,
            location: location.unwrap_or_default(),
            price,
            kind: kind.unwrap_or_default(),
            specs: specs.unwrap_or_default(),
            tag: tag.unwrap_or_default(),
            image: present(image)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            down_payment: present(down_payment),
            installments: present(installments),
            balloon_payments: present(balloon_payments),
            delivery_date: present(delivery_date),
        }
    }
}
