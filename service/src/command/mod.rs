//! [`Command`] definition.

pub mod add_item;
pub mod analyze_image;
pub mod ask_advisor;
pub mod generate_image;
pub mod import_backup;
pub mod import_defaults;
pub mod remove_item;
pub mod replace_singleton;
pub mod reset_all_data;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_item::AddItem, analyze_image::AnalyzeImage, ask_advisor::AskAdvisor,
    generate_image::GenerateImage, import_backup::ImportBackup,
    import_defaults::ImportDefaults, remove_item::RemoveItem,
    replace_singleton::ReplaceSingleton, reset_all_data::ResetAllData,
};
