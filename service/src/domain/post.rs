//! [`Post`] definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Cache;

use super::{is_blank, Collection, Content, Entry, Kind, Section};

/// Social media post tile of the showcase.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Post {
    /// Image URL or data URI of this [`Post`].
    pub image: String,

    /// Link to the original post.
    #[serde(default)]
    pub link: String,

    /// Formatted likes count (e.g. "1.2k").
    #[serde(default)]
    pub likes: String,

    /// Formatted comments count.
    #[serde(default)]
    pub comments: String,
}

impl Section for Post {
    type Value = Vec<Entry<Self>>;

    const KIND: Kind = Kind::Posts;

    fn defaults() -> Self::Value {
        Vec::new()
    }

    fn of(content: &Content) -> &Self::Value {
        &content.posts
    }

    fn of_mut(content: &mut Content) -> &mut Self::Value {
        &mut content.posts
    }

    fn channel(cache: &Cache) -> &watch::Sender<Self::Value> {
        &cache.posts
    }
}

impl Collection for Post {
    const NEWEST_FIRST: bool = false;

    fn missing_field(&self) -> Option<&'static str> {
        is_blank(&self.image).then_some("image")
    }
}
