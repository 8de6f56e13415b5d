//! [`Command`] for generating an [`Image`] out of a prompt.

use common::operations::Generate;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::is_blank,
    infra::ai::{Ai, Image, Picture, ProviderError},
    Service,
};

use super::Command;

/// [`Command`] for generating an [`Image`] out of a prompt.
#[derive(Clone, Debug)]
pub struct GenerateImage {
    /// Description of the [`Image`] to generate.
    pub prompt: String,
}

impl<Db, A> Command<GenerateImage> for Service<Db, A>
where
    A: Ai<Generate<Picture>, Ok = Image, Err = Traced<ProviderError>>,
{
    type Ok = Image;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: GenerateImage) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if is_blank(&cmd.prompt) {
            return Err(tracerr::new!(E::EmptyInput));
        }

        self.ai()
            .execute(Generate(Picture(cmd.prompt)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`GenerateImage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Prompt is empty.
    #[display("Prompt is required")]
    EmptyInput,

    /// [`Ai`] provider error.
    #[display("Image generation failed: {_0}")]
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

    use super::{ExecutionError, GenerateImage};

    #[tokio::test]
    async fn returns_data_uri_image() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("AAAA")).await;

        let image = svc
            .execute(GenerateImage {
                prompt: "Fachada moderna".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(image.data_uri(), "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn rejects_blank_prompt() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        let err = svc
            .execute(GenerateImage {
                prompt: String::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmptyInput));
    }

    #[tokio::test]
    async fn surfaces_provider_error() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) =
            fake::local(storage, Oracle::failing(Failure::Unconfigured)).await;

        let err = svc
            .execute(GenerateImage {
                prompt: "Fachada".to_owned(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Provider(ProviderError::Unconfigured),
        ));
    }
}
