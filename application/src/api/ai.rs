//! AI assistant definitions.

use juniper::GraphQLObject;
use service::command::ask_advisor;

/// Reply of the investment advisor.
#[derive(Clone, Debug, GraphQLObject)]
pub struct AdvisorReply {
    /// Text of this `AdvisorReply`.
    pub text: String,

    /// Indicator whether a canned message was returned instead of a real
    /// answer.
    pub degraded: bool,
}

impl From<ask_advisor::Reply> for AdvisorReply {
    fn from(reply: ask_advisor::Reply) -> Self {
        let ask_advisor::Reply { text, degraded } = reply;
        Self { text, degraded }
    }
}

/// Image produced by the AI provider.
#[derive(Clone, Debug, GraphQLObject)]
pub struct GeneratedImage {
    /// `data:` URI of this `GeneratedImage`, ready to be stored as any image
    /// field.
    pub data_uri: String,
}
