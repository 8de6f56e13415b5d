//! [`Command`] for restoring content out of a [`Backup`] document.

use common::operations::{By, Replace};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{Backup, Section};
use crate::{
    domain::{
        backup::Restore, BrokerProfile, Entry, Faq, Feature, Listing, Post,
        SocialLinks,
    },
    infra::{
        database::{self, Written},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for restoring content out of raw [`Backup`] document bytes.
///
/// Every [`Section`] present in the document replaces the current one, while
/// absent ones are left untouched. Nothing changes if the document cannot be
/// parsed.
#[derive(Clone, Debug)]
pub struct ImportBackup(pub Vec<u8>);

impl<Db, Ai> Command<ImportBackup> for Service<Db, Ai>
where
    Db: Database<
            Replace<By<Listing, Vec<Entry<Listing>>>>,
            Ok = Written<Vec<Entry<Listing>>>,
            Err = Traced<database::Error>,
        > + Database<
            Replace<By<BrokerProfile, BrokerProfile>>,
            Ok = Written<BrokerProfile>,
            Err = Traced<database::Error>,
        > + Database<
            Replace<By<SocialLinks, SocialLinks>>,
            Ok = Written<SocialLinks>,
            Err = Traced<database::Error>,
        > + Database<
            Replace<By<Faq, Vec<Entry<Faq>>>>,
            Ok = Written<Vec<Entry<Faq>>>,
            Err = Traced<database::Error>,
        > + Database<
            Replace<By<Feature, Vec<Entry<Feature>>>>,
            Ok = Written<Vec<Entry<Feature>>>,
            Err = Traced<database::Error>,
        > + Database<
            Replace<By<Post, Vec<Entry<Post>>>>,
            Ok = Written<Vec<Entry<Post>>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ImportBackup(bytes): ImportBackup,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Restore {
            properties,
            profile,
            socials,
            faqs,
            features,
            social_posts,
        } = Restore::parse(&bytes).map_err(|e| tracerr::new!(E::from(e)))?;

        if let Some(listings) = properties {
            self.replace::<Listing>(listings)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        if let Some(profile) = profile {
            self.replace::<BrokerProfile>(profile)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        if let Some(socials) = socials {
            self.replace::<SocialLinks>(socials)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        if let Some(faqs) = faqs {
            self.replace::<Faq>(faqs)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        if let Some(features) = features {
            self.replace::<Feature>(features)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        if let Some(posts) = social_posts {
            self.replace::<Post>(posts)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        log::info!("backup is imported");
        Ok(())
    }
}

/// Error of [`ImportBackup`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided document is not a [`Backup`].
    #[display("Invalid backup file: {_0}")]
    #[from]
    InvalidFile(serde_json::Error),
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use crate::{
        command::{AddItem, RemoveItem},
        domain::{Backup, Content, Faq, Feature, Listing, Post, SocialLinks},
        fake::{self, Oracle},
        infra::database::local::Memory,
        query::ExportBackup,
        Command as _, Query as _,
    };

    use super::{ExecutionError, ImportBackup};

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        _ = svc
            .execute(AddItem(Post {
                image: "https://example.com/p.jpg".to_owned(),
                link: "https://instagram.com/p/1".to_owned(),
                likes: "1.2k".to_owned(),
                comments: "34".to_owned(),
            }))
            .await
            .unwrap();
        let backup = svc.execute(ExportBackup).await.unwrap();
        let bytes = serde_json::to_vec(&backup).unwrap();
        let exported = svc.cache().content();

        let id = svc.cache().get::<Listing>()[0].id.clone();
        svc.execute(RemoveItem::<Listing>::new(id)).await.unwrap();
        svc.execute(ImportBackup(bytes.clone())).await.unwrap();

        assert_eq!(svc.cache().content(), exported);
        let again = svc.execute(ExportBackup).await.unwrap();
        assert_eq!(
            serde_json::to_value(Backup { date: backup.date, ..again })
                .unwrap(),
            serde_json::from_slice::<serde_json::Value>(&bytes).unwrap(),
        );
    }

    #[tokio::test]
    async fn leaves_absent_sections_untouched() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        _ = svc
            .execute(AddItem(Faq {
                q: "Q".to_owned(),
                a: "A".to_owned(),
            }))
            .await
            .unwrap();
        let faqs = svc.cache().get::<Faq>();
        let doc = serde_json::json!({
            "socials": {"instagram": "https://instagram.com/x", "whatsapp": ""},
            "features": [],
        });

        svc.execute(ImportBackup(serde_json::to_vec(&doc).unwrap()))
            .await
            .unwrap();

        assert_eq!(svc.cache().get::<Faq>(), faqs);
        assert!(svc.cache().get::<Feature>().is_empty());
        assert_eq!(
            svc.cache().get::<SocialLinks>().instagram,
            "https://instagram.com/x",
        );
    }

    #[tokio::test]
    async fn rejects_invalid_file_without_changes() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;

        let err = svc
            .execute(ImportBackup(b"{\"faqs\": 42}".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidFile(_)));
        assert_eq!(svc.cache().content(), Content::default());
    }
}
