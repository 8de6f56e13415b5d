//! [`Faq`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{is_blank, numbered, Collection, Content, Entry, Kind, Section};

/// Frequently asked question with its answer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Faq {
    /// Question text.
    pub q: String,

    /// Answer text.
    pub a: String,
}

impl Section for Faq {
    type Value = Vec<Entry<Self>>;

    const KIND: Kind = Kind::Faqs;

    fn defaults() -> Self::Value {
        numbered([
            Self {
                q: "Qual o ticket médio para investimento?".to_owned(),
                a: "Trabalhamos com oportunidades a partir de R$ 800.000 em \
                    regiões de alta demanda, com fluxo de pagamento \
                    facilitado durante a obra."
                    .to_owned(),
            },
            Self {
                q: "Como funciona a gestão de renda passiva?".to_owned(),
                a: "Assessoramos na escolha de imóveis em regiões turísticas \
                    ou corporativas e indicamos parceiros para gestão de \
                    locação Short Stay."
                    .to_owned(),
            },
            Self {
                q: "Por que investir no Litoral Catarinense?".to_owned(),
                a: "Balneário Camboriú e Itapema possuem alguns dos metros \
                    quadrados mais valorizados do Brasil, garantindo liquidez \
                    e segurança."
                    .to_owned(),
            },
        ])
    }

    fn of(content: &Content) -> &Self::Value {
        &content.faqs
    }

    fn of_mut(content: &mut Content) -> &mut Self::Value {
        &mut content.faqs
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self::Value> {
        &cache.faqs
    }
}

impl Collection for Faq {
    const NEWEST_FIRST: bool = false;

    fn missing_field(&self) -> Option<&'static str> {
        if is_blank(&self.q) {
            return Some("q");
        }
        is_blank(&self.a).then_some("a")
    }
}
