//! [`Gemini`] [`Ai`] provider, speaking the [Generative Language API][1].
//!
//! [1]: https://ai.google.dev/api/generate-content

use std::{sync::Arc, time::Duration};

use common::operations::Generate;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

use super::{Ai, Image, InlineImage, Picture, Prompt, ProviderError, Vision};

/// [`Gemini`] provider configuration.
#[derive(Debug, SmartDefault)]
pub struct Config {
    /// API key to authorize requests with.
    #[default(SecretString::from(String::new()))]
    pub api_key: SecretString,

    /// Model answering text and [`Vision`] prompts.
    #[default("gemini-2.5-flash".to_owned())]
    pub text_model: String,

    /// Model generating [`Image`]s.
    #[default("gemini-2.5-flash-image".to_owned())]
    pub image_model: String,

    /// Base URL of the API.
    #[default("https://generativelanguage.googleapis.com/v1beta".to_owned())]
    pub endpoint: String,

    /// Timeout of a single request.
    #[default(Duration::from_secs(60))]
    pub timeout: Duration,
}

/// Google Gemini [`Ai`] provider.
#[derive(Clone, Debug)]
pub struct Gemini {
    /// HTTP client.
    client: reqwest::Client,

    /// [`Config`] of this [`Gemini`] provider.
    config: Arc<Config>,
}

impl Gemini {
    /// Creates a new [`Gemini`] provider with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client =
            reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Generates content with the provided `model` out of the provided
    /// [`Part`]s.
    async fn generate(
        &self,
        model: &str,
        parts: Vec<Part>,
    ) -> Result<Vec<Part>, ProviderError> {
        let key = self.config.api_key.expose_secret().trim();
        if key.is_empty() {
            return Err(ProviderError::Unconfigured);
        }

        let url = format!(
            "{}/models/{model}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
        );
        let resp = self
            .client
            .post(url)
            .query(&[("key", key)])
            .json(&Request {
                contents: vec![Content { parts }],
            })
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(status));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.without_url()))?;
        let Response { candidates } =
            serde_json::from_slice(&body).map_err(ProviderError::Decode)?;

        Ok(candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default())
    }
}

impl Ai<Generate<Prompt>> for Gemini {
    type Ok = String;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(Prompt(prompt)): Generate<Prompt>,
    ) -> Result<Self::Ok, Self::Err> {
        let parts = self
            .generate(&self.config.text_model, vec![Part::text(prompt)])
            .await
            .map_err(tracerr::wrap!())?;
        text_of(parts)
            .ok_or(ProviderError::Empty)
            .map_err(tracerr::wrap!())
    }
}

impl Ai<Generate<Vision>> for Gemini {
    type Ok = String;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(vision): Generate<Vision>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vision { prompt, image } = vision;
        let parts = self
            .generate(
                &self.config.text_model,
                vec![Part::text(prompt), Part::inline(image)],
            )
            .await
            .map_err(tracerr::wrap!())?;
        text_of(parts)
            .ok_or(ProviderError::Empty)
            .map_err(tracerr::wrap!())
    }
}

impl Ai<Generate<Picture>> for Gemini {
    type Ok = Image;
    type Err = Traced<ProviderError>;

    async fn execute(
        &self,
        Generate(Picture(prompt)): Generate<Picture>,
    ) -> Result<Self::Ok, Self::Err> {
        let parts = self
            .generate(&self.config.image_model, vec![Part::text(prompt)])
            .await
            .map_err(tracerr::wrap!())?;
        image_of(parts)
            .ok_or(ProviderError::Empty)
            .map_err(tracerr::wrap!())
    }
}

/// Concatenates all the text [`Part`]s, if there are any non-blank.
fn text_of(parts: Vec<Part>) -> Option<String> {
    let text = parts.into_iter().filter_map(|p| p.text).collect::<String>();
    (!text.trim().is_empty()).then_some(text)
}

/// Returns the first inline [`Image`] of the [`Part`]s, if any.
fn image_of(parts: Vec<Part>) -> Option<Image> {
    let mut text = None;
    for part in parts {
        if let Some(InlineData { mime_type, data }) = part.inline_data {
            return Some(Image::new(mime_type, data));
        }
        text = text.or(part.text);
    }
    if let Some(text) = text {
        log::debug!("no image generated, model answered with: {text}");
    }
    None
}

/// Body of a `generateContent` request.
#[derive(Debug, Serialize)]
struct Request {
    /// Conversation turns, the single user one here.
    contents: Vec<Content>,
}

/// Single conversation turn.
#[derive(Debug, Deserialize, Serialize)]
struct Content {
    /// [`Part`]s of this turn.
    #[serde(default)]
    parts: Vec<Part>,
}

/// Part of a [`Content`]: either a text or an inline binary.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    /// Text of this [`Part`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    /// Inline binary of this [`Part`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    /// Creates a text [`Part`].
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    /// Creates an inline binary [`Part`] out of the provided [`InlineImage`].
    fn inline(image: InlineImage) -> Self {
        let InlineImage { mime_type, data } = image;
        Self {
            inline_data: Some(InlineData { mime_type, data }),
            ..Self::default()
        }
    }
}

/// Base64-encoded inline binary.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    /// MIME type of the binary.
    mime_type: String,

    /// Base64-encoded bytes.
    data: String,
}

/// Body of a `generateContent` response.
#[derive(Debug, Deserialize)]
struct Response {
    /// Generated candidates, the first one is used.
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Single generated candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    /// Generated [`Content`], absent if blocked.
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod spec {
    use common::operations::Generate;
    use serde_json::json;

    use crate::infra::ai::{Ai as _, Image, InlineImage, Prompt, ProviderError};

    use super::{
        image_of, text_of, Config, Content, Gemini, Part, Request, Response,
    };

    fn parts(response: serde_json::Value) -> Vec<Part> {
        let Response { candidates } = serde_json::from_value(response).unwrap();
        candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }

    #[test]
    fn serializes_inline_data_in_camel_case() {
        let image = InlineImage::parse("data:image/png;base64,AAAA").unwrap();
        let req = Request {
            contents: vec![Content {
                parts: vec![Part::text("Describe".to_owned()), Part::inline(image)],
            }],
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"contents": [{"parts": [
                {"text": "Describe"},
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
            ]}]}),
        );
    }

    #[test]
    fn concatenates_text_parts() {
        let text = text_of(parts(json!({"candidates": [{"content": {"parts": [
            {"text": "Olá, "},
            {"text": "investidor."},
        ]}}]})));

        assert_eq!(text.as_deref(), Some("Olá, investidor."));
        assert_eq!(text_of(parts(json!({"candidates": []}))), None);
        assert_eq!(text_of(parts(json!({}))), None);
    }

    #[test]
    fn extracts_first_inline_image() {
        let image = image_of(parts(json!({"candidates": [{"content": {"parts": [
            {"text": "Here it is"},
            {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
            {"inlineData": {"mimeType": "image/jpeg", "data": "BBBB"}},
        ]}}]})));

        assert_eq!(image, Some(Image::new("image/png", "AAAA")));
        assert_eq!(
            image_of(parts(json!({"candidates": [{"content": {"parts": [
                {"text": "no image"},
            ]}}]}))),
            None,
        );
    }

    #[tokio::test]
    async fn requires_api_key() {
        let gemini = Gemini::new(Config::default()).unwrap();

        let err = gemini
            .execute(Generate(Prompt("Olá".to_owned())))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ProviderError::Unconfigured));
    }
}
