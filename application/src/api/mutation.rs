//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{
    api::{self, ai, content, listing},
    define_error, AsError, Context, Error,
};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Adds a new `Listing` on top of the others.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_FIELD` - `title` or `price` is blank;
    /// - `PERSISTENCE_FAILED` - the `Listing` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addListing",
            otel.name = Self::SPAN_NAME,
            title = %listing.title,
        ),
    )]
    pub async fn add_listing(
        listing: listing::ListingInput,
        ctx: &Context,
    ) -> Result<api::ItemId, Error> {
        ctx.service()
            .execute(command::AddItem(domain::Listing::from(listing)))
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Removes the `Listing` with the provided ID.
    ///
    /// Removing an absent `Listing` succeeds.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the removal cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removeListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn remove_listing(
        id: api::ItemId,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::RemoveItem::<domain::Listing>::new(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Appends a new `Faq`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_FIELD` - `question` or `answer` is blank;
    /// - `PERSISTENCE_FAILED` - the `Faq` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addFaq",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn add_faq(
        faq: content::FaqInput,
        ctx: &Context,
    ) -> Result<api::ItemId, Error> {
        ctx.service()
            .execute(command::AddItem(domain::Faq::from(faq)))
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Removes the `Faq` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the removal cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removeFaq",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn remove_faq(
        id: api::ItemId,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::RemoveItem::<domain::Faq>::new(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Appends a new `Feature`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_FIELD` - `title` is blank;
    /// - `PERSISTENCE_FAILED` - the `Feature` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addFeature",
            otel.name = Self::SPAN_NAME,
            title = %feature.title,
        ),
    )]
    pub async fn add_feature(
        feature: content::FeatureInput,
        ctx: &Context,
    ) -> Result<api::ItemId, Error> {
        ctx.service()
            .execute(command::AddItem(domain::Feature::from(feature)))
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Removes the `Feature` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the removal cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removeFeature",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn remove_feature(
        id: api::ItemId,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::RemoveItem::<domain::Feature>::new(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Appends a new `SocialPost`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_FIELD` - `image` is blank;
    /// - `PERSISTENCE_FAILED` - the `SocialPost` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addSocialPost",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn add_social_post(
        post: content::SocialPostInput,
        ctx: &Context,
    ) -> Result<api::ItemId, Error> {
        ctx.service()
            .execute(command::AddItem(domain::Post::from(post)))
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Removes the `SocialPost` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the removal cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removeSocialPost",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn remove_social_post(
        id: api::ItemId,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::RemoveItem::<domain::Post>::new(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Replaces the broker `Profile` with the provided one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the `Profile` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProfile",
            name = %profile.name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_profile(
        profile: content::ProfileInput,
        ctx: &Context,
    ) -> Result<api::Profile, Error> {
        let profile = domain::BrokerProfile::from(profile);
        ctx.service()
            .execute(command::ReplaceSingleton(profile.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(profile.into())
    }

    /// Replaces the broker `Socials` with the provided ones.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PERSISTENCE_FAILED` - the `Socials` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateSocials",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_socials(
        socials: content::SocialsInput,
        ctx: &Context,
    ) -> Result<api::Socials, Error> {
        let socials = domain::SocialLinks::from(socials);
        ctx.service()
            .execute(command::ReplaceSingleton(socials.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(socials.into())
    }

    /// Adds the demo `Listing` on top of the others.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DISABLED_IN_REMOTE_MODE` - the content is kept remotely;
    /// - `PERSISTENCE_FAILED` - the `Listing` cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "importDefaults",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn import_defaults(ctx: &Context) -> Result<api::ItemId, Error> {
        ctx.service()
            .execute(command::ImportDefaults)
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Restores every section of the site content to its defaults.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DISABLED_IN_REMOTE_MODE` - the content is kept remotely;
    /// - `RESET_NOT_CONFIRMED` - `confirm` is not `true`;
    /// - `PERSISTENCE_FAILED` - the defaults cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            confirm = %confirm,
            gql.name = "resetAllData",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reset_all_data(
        confirm: bool,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::ResetAllData { confirmed: confirm })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Restores the site content from the provided `backup` JSON document.
    ///
    /// Sections absent in the document are left untouched.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_BACKUP_FILE` - the document is not a backup;
    /// - `PERSISTENCE_FAILED` - the restored content cannot be saved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "importBackup",
            otel.name = Self::SPAN_NAME,
            size = document.len(),
        ),
    )]
    pub async fn import_backup(
        document: String,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::ImportBackup(document.into_bytes()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(true)
    }

    /// Asks the investment advisor the provided `question`.
    ///
    /// Provider failures are answered with a canned message.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPTY_INPUT` - `question` is blank.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "askAdvisor",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn ask_advisor(
        question: String,
        ctx: &Context,
    ) -> Result<ai::AdvisorReply, Error> {
        ctx.service()
            .execute(command::AskAdvisor { question })
            .await
            .map(Into::into)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Describes the provided `image` following the provided `prompt`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPTY_INPUT` - `prompt` or `image` is blank;
    /// - `IMAGE_ANALYSIS_FAILED` - the AI provider failed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "analyzeImage",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn analyze_image(
        prompt: String,
        image: String,
        ctx: &Context,
    ) -> Result<String, Error> {
        ctx.service()
            .execute(command::AnalyzeImage { prompt, image })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Generates an image following the provided `prompt`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPTY_INPUT` - `prompt` is blank;
    /// - `IMAGE_GENERATION_FAILED` - the AI provider failed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "generateImage",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn generate_image(
        prompt: String,
        ctx: &Context,
    ) -> Result<ai::GeneratedImage, Error> {
        ctx.service()
            .execute(command::GenerateImage { prompt })
            .await
            .map(|image| ai::GeneratedImage {
                data_uri: image.data_uri(),
            })
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }
}

define_error! {
    enum InputError {
        #[code = "EMPTY_INPUT"]
        #[status = BAD_REQUEST]
        #[message = "Required input is empty"]
        Empty,
    }
}

define_error! {
    enum ModeError {
        #[code = "DISABLED_IN_REMOTE_MODE"]
        #[status = CONFLICT]
        #[message = "Operation is disabled while the content is kept \
                     remotely"]
        Disabled,
    }
}

impl AsError for command::add_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MissingField(field) => Some(Error {
                code: "MISSING_FIELD",
                status_code: http::StatusCode::BAD_REQUEST,
                message: format!("`{field}` field is required"),
                backtrace: None,
            }),
        }
    }
}

impl AsError for command::import_defaults::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Disabled => Some(ModeError::Disabled.into()),
        }
    }
}

impl AsError for command::reset_all_data::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RESET_NOT_CONFIRMED"]
                #[status = BAD_REQUEST]
                #[message = "Reset must be confirmed explicitly"]
                Unconfirmed,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Unconfirmed => Some(Error::Unconfirmed.into()),
            Self::Disabled => Some(ModeError::Disabled.into()),
        }
    }
}

impl AsError for command::import_backup::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_BACKUP_FILE"]
                #[status = BAD_REQUEST]
                #[message = "Invalid backup file"]
                InvalidFile,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidFile(_) => Some(Error::InvalidFile.into()),
        }
    }
}

impl AsError for command::ask_advisor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::EmptyInput => Some(InputError::Empty.into()),
        }
    }
}

impl AsError for command::analyze_image::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "IMAGE_ANALYSIS_FAILED"]
                #[status = BAD_GATEWAY]
                #[message = "Error analyzing image. Please try again."]
                Failed,
            }
        }

        match self {
            Self::EmptyInput => Some(InputError::Empty.into()),
            Self::Provider(_) => Some(Error::Failed.into()),
        }
    }
}

impl AsError for command::generate_image::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "IMAGE_GENERATION_FAILED"]
                #[status = BAD_GATEWAY]
                #[message = "Failed to generate image. Please try a \
                             different prompt."]
                Failed,
            }
        }

        match self {
            Self::EmptyInput => Some(InputError::Empty.into()),
            Self::Provider(_) => Some(Error::Failed.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, infra::ai::ProviderError};

    use crate::AsError as _;

    #[test]
    fn missing_field_names_the_field() {
        let err = command::add_item::ExecutionError::MissingField("title")
            .as_error();

        assert_eq!(err.code, "MISSING_FIELD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("title"));
    }

    #[test]
    fn remote_mode_disables_destructive_commands() {
        let reset = command::reset_all_data::ExecutionError::Disabled;
        let defaults = command::import_defaults::ExecutionError::Disabled;

        assert_eq!(reset.as_error().code, "DISABLED_IN_REMOTE_MODE");
        assert_eq!(defaults.as_error().code, "DISABLED_IN_REMOTE_MODE");
        assert_eq!(
            command::reset_all_data::ExecutionError::Unconfirmed
                .as_error()
                .code,
            "RESET_NOT_CONFIRMED",
        );
    }

    #[test]
    fn provider_failures_have_inline_codes() {
        let analysis =
            command::analyze_image::ExecutionError::from(ProviderError::Quota);
        let generation = command::generate_image::ExecutionError::from(
            ProviderError::Unconfigured,
        );

        assert_eq!(analysis.as_error().code, "IMAGE_ANALYSIS_FAILED");
        assert_eq!(
            analysis.as_error().message,
            "Error analyzing image. Please try again.",
        );
        assert_eq!(generation.as_error().code, "IMAGE_GENERATION_FAILED");
    }

    #[test]
    fn invalid_backup_is_reported() {
        let err = serde_json::from_str::<serde_json::Value>("{")
            .map(drop)
            .map_err(command::import_backup::ExecutionError::from)
            .unwrap_err();

        assert_eq!(err.as_error().code, "INVALID_BACKUP_FILE");
    }
}
