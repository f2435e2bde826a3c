//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_user;
pub mod create_user_session;
pub mod delete_user;
pub mod update_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_user::DeleteUser,
    update_user::UpdateUser,
};

#[cfg(test)]
mod spec {
    use std::sync::Mutex;

    use common::{
        operations::{By, Delete, Insert, Select, Update},
        DateTime,
    };
    use tracerr::Traced;

    use crate::{
        domain::{user, User},
        infra::{database, Database},
        security, Config, Service,
    };

    use super::{
        authorize_user_session, create_user, create_user_session, delete_user,
        update_user, AuthorizeUserSession, Command as _, CreateUser,
        CreateUserSession, DeleteUser, UpdateUser,
    };

    /// In-memory [`Database`] stub holding at most one [`User`].
    #[derive(Debug, Default)]
    struct StubDb {
        user: Mutex<Option<User>>,
    }

    impl StubDb {
        fn with(user: User) -> Self {
            Self {
                user: Mutex::new(Some(user)),
            }
        }
    }

    impl Database<Select<By<Option<User>, user::Id>>> for StubDb {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self.user.lock().unwrap().clone().filter(|u| u.id == id))
        }
    }

    impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for StubDb {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, &'e user::Email>>,
        ) -> Result<Self::Ok, Self::Err> {
            let email = by.into_inner();
            Ok(self
                .user
                .lock()
                .unwrap()
                .clone()
                .filter(|u| &u.email == email))
        }
    }

    impl Database<Insert<User>> for StubDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(user): Insert<User>,
        ) -> Result<Self::Ok, Self::Err> {
            *self.user.lock().unwrap() = Some(user);
            Ok(())
        }
    }

    impl Database<Update<User>> for StubDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(user): Update<User>,
        ) -> Result<Self::Ok, Self::Err> {
            *self.user.lock().unwrap() = Some(user);
            Ok(())
        }
    }

    impl Database<Delete<By<User, user::Id>>> for StubDb {
        type Ok = bool;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Delete(by): Delete<By<User, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            let mut user = self.user.lock().unwrap();
            let deleted = user.as_ref().is_some_and(|u| u.id == id);
            if deleted {
                *user = None;
            }
            Ok(deleted)
        }
    }

    fn service(db: StubDb) -> Service<StubDb> {
        Service::new(
            Config {
                signing: security::SigningConfigurations::generate(),
                token: security::TokenConfigurations::new(
                    "ExampleAudience",
                    "ExampleIssuer",
                    3600,
                )
                .unwrap(),
            },
            db,
        )
    }

    fn bob() -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Bob").unwrap(),
            email: user::Email::new("bob@example.com").unwrap(),
            created_at: DateTime::now().coerce(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_user_persists_and_assigns_id() {
        let svc = service(StubDb::default());

        let created = svc
            .execute(CreateUser {
                name: user::Name::new("Bob").unwrap(),
                email: user::Email::new("bob@example.com").unwrap(),
            })
            .await
            .unwrap();

        let stored = svc.database().user.lock().unwrap().clone().unwrap();
        assert_eq!(stored, created);
        assert!(stored.updated_at.is_none());
    }

    #[tokio::test]
    async fn created_user_is_selectable_by_its_id() {
        let svc = service(StubDb::default());

        let created = svc
            .execute(CreateUser {
                name: user::Name::new("Bob").unwrap(),
                email: user::Email::new("bob@example.com").unwrap(),
            })
            .await
            .unwrap();

        let first = svc
            .execute(crate::query::user::ById::by(created.id))
            .await
            .unwrap();
        let second = svc
            .execute(crate::query::user::ById::by(created.id))
            .await
            .unwrap();

        assert_eq!(first, Some(created));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn create_user_rejects_occupied_email() {
        let svc = service(StubDb::with(bob()));

        let res = svc
            .execute(CreateUser {
                name: user::Name::new("Other Bob").unwrap(),
                email: user::Email::new("bob@example.com").unwrap(),
            })
            .await;

        assert!(matches!(
            res.unwrap_err().as_ref(),
            create_user::ExecutionError::EmailOccupied(_),
        ));
    }

    #[tokio::test]
    async fn update_user_bumps_update_date_time() {
        let bob = bob();
        let svc = service(StubDb::with(bob.clone()));

        let updated = svc
            .execute(UpdateUser {
                id: bob.id,
                name: user::Name::new("Robert").unwrap(),
                email: bob.email.clone(),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, bob.id);
        assert_eq!(updated.name, user::Name::new("Robert").unwrap());
        assert_eq!(updated.created_at, bob.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_user_requires_existing_user() {
        let svc = service(StubDb::default());

        let res = svc
            .execute(UpdateUser {
                id: user::Id::new(),
                name: user::Name::new("Ghost").unwrap(),
                email: user::Email::new("ghost@example.com").unwrap(),
            })
            .await;

        assert!(matches!(
            res.unwrap_err().as_ref(),
            update_user::ExecutionError::UserNotExists(_),
        ));
    }

    #[tokio::test]
    async fn delete_user_reports_missing_user() {
        let bob = bob();
        let svc = service(StubDb::with(bob.clone()));

        svc.execute(DeleteUser { id: bob.id }).await.unwrap();

        let res = svc.execute(DeleteUser { id: bob.id }).await;
        assert!(matches!(
            res.unwrap_err().as_ref(),
            delete_user::ExecutionError::UserNotExists(_),
        ));
    }

    #[tokio::test]
    async fn issued_session_authorizes_back_to_its_user() {
        let bob = bob();
        let svc = service(StubDb::with(bob.clone()));

        let out = svc
            .execute(CreateUserSession {
                email: bob.email.clone(),
            })
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();

        assert_eq!(session, out.session);
        assert_eq!(session.user_id, bob.id);
    }

    #[tokio::test]
    async fn session_creation_requires_known_email() {
        let svc = service(StubDb::default());

        let res = svc
            .execute(CreateUserSession {
                email: user::Email::new("nobody@example.com").unwrap(),
            })
            .await;

        assert!(matches!(
            res.unwrap_err().as_ref(),
            create_user_session::ExecutionError::WrongCredentials,
        ));
    }

    #[tokio::test]
    async fn authorization_fails_once_user_is_gone() {
        let bob = bob();
        let svc = service(StubDb::with(bob.clone()));

        let out = svc
            .execute(CreateUserSession {
                email: bob.email.clone(),
            })
            .await
            .unwrap();
        svc.execute(DeleteUser { id: bob.id }).await.unwrap();

        let res = svc.execute(AuthorizeUserSession { token: out.token }).await;
        assert!(matches!(
            res.unwrap_err().as_ref(),
            authorize_user_session::ExecutionError::UserNotExists(_),
        ));
    }

    #[tokio::test]
    async fn authorization_rejects_garbage_tokens() {
        let svc = service(StubDb::with(bob()));

        let res = svc
            .execute(AuthorizeUserSession {
                token: "definitely.not.a-token".parse().unwrap(),
            })
            .await;

        assert!(matches!(
            res.unwrap_err().as_ref(),
            authorize_user_session::ExecutionError::Validation(
                security::ValidationError::InvalidSignature(_),
            ),
        ));
    }
}
