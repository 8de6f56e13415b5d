//! [`Command`] for restoring every [`Section`] to its defaults.

use common::operations::{By, Replace};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        BrokerProfile, Entry, Faq, Feature, Listing, Post, Section,
        SocialLinks,
    },
    infra::{
        database::{self, Mode, Written},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for restoring every [`Section`] to its compiled-in defaults.
///
/// Available in [`Mode::Local`] only.
#[derive(Clone, Copy, Debug)]
pub struct ResetAllData {
    /// Indicator whether the reset has been confirmed explicitly.
    pub confirmed: bool,
}

impl<Db, Ai> Command<ResetAllData> for Service<Db, Ai>
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

    async fn execute(&self, cmd: ResetAllData) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if self.mode() != Mode::Local {
            return Err(tracerr::new!(E::Disabled));
        }
        if !cmd.confirmed {
            return Err(tracerr::new!(E::Unconfirmed));
        }

        self.replace::<Listing>(Listing::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.replace::<BrokerProfile>(BrokerProfile::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.replace::<SocialLinks>(SocialLinks::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.replace::<Faq>(Faq::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.replace::<Feature>(Feature::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.replace::<Post>(Post::defaults())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!("all content is reset to defaults");
        Ok(())
    }
}

/// Error of [`ResetAllData`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Reset has not been confirmed.
    #[display("Reset must be confirmed explicitly")]
    Unconfirmed,

    /// [`Command`] is unavailable in [`Mode::Remote`].
    #[display("Reset is disabled in remote mode")]
    Disabled,
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use crate::{
        command::{AddItem, RemoveItem, ReplaceSingleton},
        domain::{BrokerProfile, Content, Faq, Feature, Listing},
        fake::{self, Oracle, Remote},
        infra::database::local::Memory,
        Command as _,
    };

    use super::{ExecutionError, ResetAllData};

    #[tokio::test]
    async fn restores_every_section_to_defaults() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        _ = svc
            .execute(AddItem(Faq {
                q: "Q".to_owned(),
                a: "A".to_owned(),
            }))
            .await
            .unwrap();
        let feature = svc.cache().get::<Feature>()[0].id.clone();
        svc.execute(RemoveItem::<Feature>::new(feature)).await.unwrap();
        svc.execute(ReplaceSingleton(BrokerProfile {
            name: "Outra".to_owned(),
            ..BrokerProfile::default()
        }))
        .await
        .unwrap();

        svc.execute(ResetAllData { confirmed: true }).await.unwrap();

        assert_eq!(svc.cache().content(), Content::default());
    }

    #[tokio::test]
    async fn requires_confirmation() {
        let storage = Arc::new(Memory::default());
        let (svc, _bg) = fake::local(storage, Oracle::answering("")).await;
        let id = svc.cache().get::<Listing>()[0].id.clone();
        svc.execute(RemoveItem::<Listing>::new(id)).await.unwrap();
        let before = svc.cache().content();

        let err = svc
            .execute(ResetAllData { confirmed: false })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Unconfirmed));
        assert_eq!(svc.cache().content(), before);
    }

    #[tokio::test]
    async fn is_disabled_in_remote_mode() {
        let (svc, _bg) =
            fake::remote(Arc::new(Remote::default()), Oracle::answering(""))
                .await;

        let err = svc
            .execute(ResetAllData { confirmed: true })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Disabled));
    }
}
