//! [`Ai`] collaborator definitions.

pub mod gemini;

use derive_more::{Display, Error};
use reqwest::StatusCode;

pub use self::gemini::Gemini;

/// Generative AI operation.
pub use common::Handler as Ai;

/// Text [`Prompt`] to generate a text answer for.
#[derive(Clone, Debug)]
pub struct Prompt(pub String);

/// [`Prompt`] about an attached [`InlineImage`], answered with a text.
#[derive(Clone, Debug)]
pub struct Vision {
    /// Text of the prompt.
    pub prompt: String,

    /// Image the prompt is about.
    pub image: InlineImage,
}

/// Description of a picture to generate an [`Image`] of.
#[derive(Clone, Debug)]
pub struct Picture(pub String);

/// Base64-encoded image sent along a prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InlineImage {
    /// MIME type of the image.
    pub mime_type: String,

    /// Base64-encoded bytes of the image.
    pub data: String,
}

impl InlineImage {
    /// MIME type assumed when the input doesn't specify one.
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    /// Parses an [`InlineImage`] out of either a `data:` URI or a raw base64
    /// string.
    ///
    /// Returns [`None`] if there is no image data at all.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (mime_type, data) = match input.split_once(',') {
            Some((header, data)) if header.starts_with("data:") => {
                let mime_type = header
                    .trim_start_matches("data:")
                    .split(';')
                    .next()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(Self::DEFAULT_MIME_TYPE);
                (mime_type, data)
            }
            Some(_) | None => (Self::DEFAULT_MIME_TYPE, input),
        };
        (!data.trim().is_empty()).then(|| Self {
            mime_type: mime_type.to_owned(),
            data: data.trim().to_owned(),
        })
    }
}

/// Generated image.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("data:{mime_type};base64,{data}")]
pub struct Image {
    /// MIME type of this [`Image`].
    mime_type: String,

    /// Base64-encoded bytes of this [`Image`].
    data: String,
}

impl Image {
    /// Creates a new [`Image`] out of its base64-encoded bytes.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Returns this [`Image`] as a `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        self.to_string()
    }
}

/// Error of an [`Ai`] provider.
#[derive(Debug, Display, Error)]
pub enum ProviderError {
    /// Provider has no credentials configured.
    #[display("AI provider is not configured")]
    Unconfigured,

    /// Provider rejected the credentials.
    #[display("AI provider rejected the credentials")]
    Unauthorized,

    /// Provider quota is exhausted.
    #[display("AI provider quota is exceeded")]
    Quota,

    /// Provider cannot be reached.
    #[display("AI provider is unreachable: {_0}")]
    Network(reqwest::Error),

    /// Provider responded with an unexpected status.
    #[display("AI provider responded with `{_0}` status")]
    Status(#[error(not(source))] StatusCode),

    /// Provider response cannot be decoded.
    #[display("malformed AI provider response: {_0}")]
    Decode(serde_json::Error),

    /// Provider response has no usable content.
    #[display("AI provider returned no usable content")]
    Empty,
}

impl ProviderError {
    /// Classifies a non-success [`StatusCode`] of a provider response.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            StatusCode::TOO_MANY_REQUESTS => Self::Quota,
            _ => Self::Status(status),
        }
    }
}

#[cfg(test)]
mod spec {
    use reqwest::StatusCode;

    use super::{Image, InlineImage, ProviderError};

    #[test]
    fn strips_data_uri_header() {
        assert_eq!(
            InlineImage::parse("data:image/png;base64,iVBORw0KGgo="),
            Some(InlineImage {
                mime_type: "image/png".to_owned(),
                data: "iVBORw0KGgo=".to_owned(),
            }),
        );
        assert_eq!(
            InlineImage::parse("/9j/4AAQSkZJRg=="),
            Some(InlineImage {
                mime_type: "image/jpeg".to_owned(),
                data: "/9j/4AAQSkZJRg==".to_owned(),
            }),
        );
        assert_eq!(
            InlineImage::parse("data:;base64,AAAA").map(|i| i.mime_type),
            Some("image/jpeg".to_owned()),
        );
    }

    #[test]
    fn rejects_empty_image() {
        assert_eq!(InlineImage::parse(""), None);
        assert_eq!(InlineImage::parse("data:image/png;base64,"), None);
    }

    #[test]
    fn formats_data_uri() {
        assert_eq!(
            Image::new("image/png", "AAAA").data_uri(),
            "data:image/png;base64,AAAA",
        );
    }

    #[test]
    fn classifies_statuses() {
        assert!(matches!(
            ProviderError::from_status(StatusCode::FORBIDDEN),
            ProviderError::Unauthorized,
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS),
            ProviderError::Quota,
        ));
        assert!(matches!(
            ProviderError::from_status(StatusCode::BAD_GATEWAY),
            ProviderError::Status(StatusCode::BAD_GATEWAY),
        ));
    }
}
