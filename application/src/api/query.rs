//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain, query, Query as _};

use crate::{
    api::{self, content},
    Context, Error,
};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns all the `Listing`s, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings(ctx: &Context) -> Vec<api::Listing> {
        ctx.service()
            .execute(query::Current::<domain::Listing>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Returns the broker `Profile`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "profile",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn profile(ctx: &Context) -> api::Profile {
        ctx.service()
            .execute(query::Current::<domain::BrokerProfile>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into()
    }

    /// Returns the broker `Socials`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "socials",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn socials(ctx: &Context) -> api::Socials {
        ctx.service()
            .execute(query::Current::<domain::SocialLinks>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into()
    }

    /// Returns all the `Faq`s, in insertion order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "faqs",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn faqs(ctx: &Context) -> Vec<api::Faq> {
        ctx.service()
            .execute(query::Current::<domain::Faq>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Returns all the `Feature`s, in insertion order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "features",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn features(ctx: &Context) -> Vec<api::Feature> {
        ctx.service()
            .execute(query::Current::<domain::Feature>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Returns all the `SocialPost`s, in insertion order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "socialPosts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn social_posts(ctx: &Context) -> Vec<api::SocialPost> {
        ctx.service()
            .execute(query::Current::<domain::Post>::new())
            .await
            .unwrap_or_else(|e| match e {})
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Exports the whole site content as a single JSON document.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "backup",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn backup(ctx: &Context) -> Result<content::Backup, Error> {
        let backup = ctx
            .service()
            .execute(query::ExportBackup)
            .await
            .unwrap_or_else(|e| match e {});
        let document = serde_json::to_string(&backup)
            .map_err(|e| Error::internal(&e))
            .map_err(ctx.error())?;

        Ok(content::Backup {
            date: backup.date.coerce(),
            document,
        })
    }

    /// Returns where the site content is kept.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "mode",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mode(ctx: &Context) -> content::Mode {
        ctx.service()
            .execute(query::CurrentMode)
            .await
            .unwrap_or_else(|e| match e {})
            .into()
    }

    /// Returns the state of the link to the source of truth.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "connectivity",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn connectivity(ctx: &Context) -> content::Connectivity {
        ctx.service()
            .execute(query::CurrentConnectivity)
            .await
            .unwrap_or_else(|e| match e {})
            .into()
    }
}
