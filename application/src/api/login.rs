//! Login endpoint definitions.

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_user_session, Command as _},
    domain::user,
};

use crate::{api, define_error, AsError as _, Error, Service, Violation};

/// Request of the login endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct Request {
    /// Email of the user to log in as.
    pub email: String,
}

/// Response of the login endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    /// Issued authentication token.
    pub token: String,

    /// [RFC 3339] timestamp of the token issuance.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub issued_at: String,

    /// [RFC 3339] timestamp the token expires at.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub expires_at: String,

    /// Logged-in user.
    pub user: api::user::Response,
}

/// `POST /login` handler.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - if the provided email is malformed;
/// - `WRONG_CREDENTIALS` - if no user with the provided email exists.
#[tracing::instrument(skip_all, fields(http.route = "/login"))]
pub async fn login(
    Extension(service): Extension<Service>,
    Json(req): Json<Request>,
) -> Result<Json<Response>, Error> {
    let email = req.email.parse::<user::Email>().map_err(|e| {
        Error::invalid_request(vec![Violation {
            field: "email",
            message: e.to_string(),
        }])
    })?;

    let out = service
        .execute(command::CreateUserSession { email })
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(Response {
        token: out.token.to_string(),
        issued_at: out.session.issued_at.to_rfc3339(),
        expires_at: out.session.expires_at.to_rfc3339(),
        user: out.user.into(),
    }))
}

impl crate::AsError for create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Issuance(_) => None,
            Self::WrongCredentials => Some(LoginError::WrongCredentials.into()),
        }
    }
}

define_error! {
    enum LoginError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Wrong `User` credentials"]
        WrongCredentials,
    }
}
