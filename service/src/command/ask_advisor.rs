//! [`Command`] for asking the investment advisor a question.

use common::operations::Generate;
use derive_more::{Display, Error};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{is_blank, BrokerProfile, SocialLinks},
    infra::ai::{Ai, Prompt, ProviderError},
    Service,
};

use super::Command;

/// Reply given when the [`Ai`] provider fails.
pub const FALLBACK_REPLY: &str = "Desculpe, a conexão com o servidor de \
                                  investimentos foi interrompida \
                                  momentaneamente.";

/// Reply given when no [`Ai`] provider is configured.
pub const UNCONFIGURED_REPLY: &str = "AI Configuration Missing (API Key)";

/// [`Command`] for asking the investment advisor a question.
///
/// Always replies: [`Ai`] provider failures degrade to a canned [`Reply`].
#[derive(Clone, Debug)]
pub struct AskAdvisor {
    /// Question of a visitor.
    pub question: String,
}

/// Answer of the investment advisor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    /// Text of this [`Reply`].
    pub text: String,

    /// Indicator whether this [`Reply`] is a canned one, given instead of a
    /// generated answer.
    pub degraded: bool,
}

impl<Db, A> Command<AskAdvisor> for Service<Db, A>
where
    A: Ai<Generate<Prompt>, Ok = String, Err = Traced<ProviderError>>,
{
    type Ok = Reply;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AskAdvisor) -> Result<Self::Ok, Self::Err> {
        if is_blank(&cmd.question) {
            return Err(tracerr::new!(ExecutionError::EmptyInput));
        }

        let prompt = advisor_prompt(
            &self.cache().get::<BrokerProfile>(),
            &self.cache().get::<SocialLinks>(),
            cmd.question.trim(),
        );
        let reply = match self.ai().execute(Generate(Prompt(prompt))).await {
            Ok(text) => Reply {
                text,
                degraded: false,
            },
            Err(e) if matches!(e.as_ref(), ProviderError::Unconfigured) => {
                log::warn!("advisor is unavailable: {e}");
                Reply {
                    text: UNCONFIGURED_REPLY.to_owned(),
                    degraded: true,
                }
            }
            Err(e) => {
                log::error!("advisor failed to answer: {e}\n{}", e.trace());
                Reply {
                    text: FALLBACK_REPLY.to_owned(),
                    degraded: true,
                }
            }
        };
        Ok(reply)
    }
}

/// Error of [`AskAdvisor`] [`Command`] execution.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ExecutionError {
    /// Question is blank.
    #[display("Question is empty")]
    EmptyInput,
}

/// Builds the advisor prompt for the provided `question`, introducing the
/// broker by the provided [`BrokerProfile`].
fn advisor_prompt(
    profile: &BrokerProfile,
    socials: &SocialLinks,
    question: &str,
) -> String {
    let BrokerProfile { name, title, .. } = profile;
    let instagram = &socials.instagram;
    format!(
        "Você é o assistente virtual da corretora {name} ({title}), \
         especialista em investimentos imobiliários de alto padrão em SC.\n\
         Seu objetivo é qualificar investidores interessados em \
         multiplicação patrimonial e renda passiva.\n\
         \n\
         INFORMAÇÕES CRUCIAIS PARA SUAS RESPOSTAS:\n\
         1. Beto Carrero World: destaque a proximidade com o parque (em \
         Penha/Piçarras) como um grande vetor de rentabilidade para locação \
         Short Stay (Airbnb).\n\
         2. Imóveis na Planta: explique o conceito de \"alavancagem\" e \
         \"tabela zero\", onde o investidor paga apenas 10-20% de entrada e \
         ganha a valorização sobre o valor total do imóvel durante a obra.\n\
         3. Renda Passiva: mencione a gestão profissional de locação para \
         quem não quer ter dor de cabeça com inquilinos.\n\
         4. Regiões: Balneário Camboriú (luxo/segurança), Itapema \
         (valorização recorde), Piçarras/Penha (turismo/Beto Carrero).\n\
         \n\
         Responda em PORTUGUÊS (PT-BR) de forma elegante, profissional e \
         objetiva, usando termos como \"liquidez\", \"yield\", \"TIR\".\n\
         Se perguntarem sobre contato, sugira o Instagram: {instagram}\n\
         \n\
         Pergunta do usuário: {question}",
    )
}

#[cfg(test)]
mod spec {
    use std::sync::{Arc, PoisonError};

    use crate::{
        command::ReplaceSingleton,
        domain::{Section as _, SocialLinks},
        fake::{self, Failure, Oracle},
        infra::database::local::Memory,
        Command as _,
    };

    use super::{
        AskAdvisor, ExecutionError, Reply, FALLBACK_REPLY, UNCONFIGURED_REPLY,
    };

    fn ask(question: &str) -> AskAdvisor {
        AskAdvisor {
            question: question.to_owned(),
        }
    }

    #[tokio::test]
    async fn prompts_with_current_profile_and_socials() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::answering("Ótima pergunta!")).await;
        svc.execute(ReplaceSingleton(SocialLinks {
            instagram: "https://instagram.com/nova".to_owned(),
            ..SocialLinks::defaults()
        }))
        .await
        .unwrap();

        let reply = svc.execute(ask("Vale a pena Itapema?")).await.unwrap();

        assert_eq!(
            reply,
            Reply {
                text: "Ótima pergunta!".to_owned(),
                degraded: false,
            },
        );
        let prompts = svc
            .ai()
            .prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("ANDREZA SCOLARI"));
        assert!(prompts[0].contains("https://instagram.com/nova"));
        assert!(prompts[0].ends_with("Pergunta do usuário: Vale a pena Itapema?"));
    }

    #[tokio::test]
    async fn degrades_to_fallback_on_provider_error() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::failing(Failure::Quota)).await;

        let reply = svc.execute(ask("Olá")).await.unwrap();

        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.degraded);
    }

    #[tokio::test]
    async fn degrades_to_placeholder_when_unconfigured() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::failing(Failure::Unconfigured)).await;

        let reply = svc.execute(ask("Olá")).await.unwrap();

        assert_eq!(reply.text, UNCONFIGURED_REPLY);
        assert!(reply.degraded);
    }

    #[tokio::test]
    async fn rejects_blank_question() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        let err = svc.execute(ask("   ")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmptyInput));
        assert!(svc.ai().prompts.lock().unwrap().is_empty());
    }
}
