//! [`Command`] for analyzing an image with a prompt.

use common::operations::Generate;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::is_blank,
    infra::ai::{Ai, InlineImage, ProviderError, Vision},
    Service,
};

use super::Command;

/// [`Command`] for answering a prompt about an attached image.
#[derive(Clone, Debug)]
pub struct AnalyzeImage {
    /// Prompt about the image.
    pub prompt: String,

    /// Image as a `data:` URI or a raw base64 string.
    pub image: String,
}

impl<Db, A> Command<AnalyzeImage> for Service<Db, A>
where
    A: Ai<Generate<Vision>, Ok = String, Err = Traced<ProviderError>>,
{
    type Ok = String;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AnalyzeImage) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AnalyzeImage { prompt, image } = cmd;
        let image = InlineImage::parse(&image)
            .filter(|_| !is_blank(&prompt))
            .ok_or_else(|| tracerr::new!(E::EmptyInput))?;

        self.ai()
            .execute(Generate(Vision { prompt, image }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AnalyzeImage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Prompt or image is empty.
    #[display("Prompt and image are required")]
    EmptyInput,

    /// [`Ai`] provider error.
    #[display("Image analysis failed: {_0}")]
    #[from]
    Provider(ProviderError),
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use crate::{
        fake::{self, Failure, Oracle},
        infra::{ai::ProviderError, database::local::Memory},
        Command as _,
    };

    use super::{AnalyzeImage, ExecutionError};

    fn analyze(prompt: &str, image: &str) -> AnalyzeImage {
        AnalyzeImage {
            prompt: prompt.to_owned(),
            image: image.to_owned(),
        }
    }

    #[tokio::test]
    async fn answers_about_image() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::answering("Sala ampla.")).await;

        let text = svc
            .execute(analyze("Descreva", "data:image/png;base64,AAAA"))
            .await
            .unwrap();

        assert_eq!(text, "Sala ampla.");
    }

    #[tokio::test]
    async fn rejects_empty_input() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        for cmd in [analyze(" ", "AAAA"), analyze("Descreva", "")] {
            let err = svc.execute(cmd).await.unwrap_err();
            assert!(matches!(err.as_ref(), ExecutionError::EmptyInput));
        }
        assert!(svc.ai().prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn surfaces_provider_error() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::failing(Failure::Quota)).await;

        let err = svc.execute(analyze("Descreva", "AAAA")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Provider(ProviderError::Quota),
        ));
    }
}
