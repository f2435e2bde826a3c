//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    security, Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
///
/// The credential check itself is performed by an external collaborator
/// before this [`Command`] is executed: here the provided [`Email`] is only
/// required to identify an existing [`User`].
#[derive(Clone, Debug, From)]
pub struct CreateUserSession {
    /// [`Email`] of the [`User`] to create a [`Session`] for.
    pub email: user::Email,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// Claim set of the created [`Session`].
    pub session: Session,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'e> Database<
        Select<By<Option<User>, &'e user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongCredentials)
            .map_err(tracerr::wrap!())?;

        let (token, session) = security::issue_session(
            &self.config().signing,
            &self.config().token,
            user.id,
            DateTime::now(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            user,
            session,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to sign the [`Session`] token.
    #[display("{_0}")]
    Issuance(security::IssuanceError),

    /// Provided credentials do not match any [`User`].
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}
