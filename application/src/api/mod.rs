//! GraphQL API definitions.

pub mod ai;
pub mod content;
pub mod listing;
mod mutation;
mod query;
mod subscription;

pub use self::{
    content::{Faq, Feature, ItemId, Profile, SocialPost, Socials},
    listing::Listing,
    mutation::Mutation,
    query::Query,
    subscription::Subscription,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;
