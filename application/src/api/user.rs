//! User endpoints definitions.

use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{
        self, create_user, delete_user, update_user, Command as _,
    },
    domain::{self, user},
    query,
};
use uuid::Uuid;

use crate::{
    define_error, AsError as _, Error, Service, Session, Violation,
};

/// Representation of a [`domain::User`] served by the API.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    /// Unique identifier of the user.
    pub id: Uuid,

    /// Name of the user.
    pub name: String,

    /// Email of the user.
    pub email: String,

    /// [RFC 3339] timestamp of the user creation.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of the last user update, if any.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<domain::User> for Response {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            name: user.name.into(),
            email: user.email.into(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Request creating or updating a user.
#[derive(Clone, Debug, Deserialize)]
pub struct Request {
    /// Name of the user.
    pub name: String,

    /// Email of the user.
    pub email: String,
}

impl Request {
    /// Validates this [`Request`] into domain types.
    ///
    /// # Errors
    ///
    /// With an `INVALID_REQUEST` [`Error`] carrying a [`Violation`] per
    /// malformed field.
    fn validate(self) -> Result<(user::Name, user::Email), Error> {
        let mut violations = Vec::new();

        let name = self
            .name
            .parse::<user::Name>()
            .map_err(|e| {
                violations.push(Violation {
                    field: "name",
                    message: e.to_string(),
                });
            })
            .ok();
        let email = self
            .email
            .parse::<user::Email>()
            .map_err(|e| {
                violations.push(Violation {
                    field: "email",
                    message: e.to_string(),
                });
            })
            .ok();

        if let (Some(name), Some(email)) = (name, email) {
            Ok((name, email))
        } else {
            Err(Error::invalid_request(violations))
        }
    }
}

/// `GET /users` handler.
#[tracing::instrument(skip_all, fields(http.route = "/users"))]
pub async fn list(
    _: Session,
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Response>>, Error> {
    let users = service
        .execute(query::users::All::by(()))
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// `GET /users/:id` handler.
///
/// # Errors
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - if no user with the provided ID exists.
#[tracing::instrument(skip_all, fields(http.route = "/users/:id"))]
pub async fn get(
    _: Session,
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Response>, Error> {
    service
        .execute(query::user::ById::by(id.into()))
        .await
        .map_err(|e| e.as_error())?
        .map(|user| Json(user.into()))
        .ok_or_else(|| UserError::NotExists.into())
}

/// `POST /users` handler.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - if the provided fields are malformed;
/// - `EMAIL_OCCUPIED` - if the provided email belongs to another user.
#[tracing::instrument(skip_all, fields(http.route = "/users"))]
pub async fn create(
    _: Session,
    Extension(service): Extension<Service>,
    Json(req): Json<Request>,
) -> Result<(StatusCode, Json<Response>), Error> {
    let (name, email) = req.validate()?;

    let user = service
        .execute(command::CreateUser { name, email })
        .await
        .map_err(|e| e.as_error())?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `PUT /users/:id` handler.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - if the provided fields are malformed;
/// - `EMAIL_OCCUPIED` - if the provided email belongs to another user;
/// - `USER_NOT_EXISTS` - if no user with the provided ID exists.
#[tracing::instrument(skip_all, fields(http.route = "/users/:id"))]
pub async fn update(
    _: Session,
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
    Json(req): Json<Request>,
) -> Result<Json<Response>, Error> {
    let (name, email) = req.validate()?;

    let user = service
        .execute(command::UpdateUser {
            id: id.into(),
            name,
            email,
        })
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(user.into()))
}

/// `DELETE /users/:id` handler.
///
/// # Errors
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - if no user with the provided ID exists.
#[tracing::instrument(skip_all, fields(http.route = "/users/:id"))]
pub async fn delete(
    _: Session,
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    service
        .execute(command::DeleteUser { id: id.into() })
        .await
        .map_err(|e| e.as_error())?;

    Ok(StatusCode::NO_CONTENT)
}

impl crate::AsError for create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
        }
    }
}

impl crate::AsError for update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl crate::AsError for delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`User` with the provided email already exists"]
        EmailOccupied,
    }
}

#[cfg(test)]
mod request_spec {
    use super::Request;

    #[test]
    fn accepts_well_formed_fields() {
        let req = Request {
            name: "Bob".to_owned(),
            email: "bob@example.com".to_owned(),
        };

        let (name, email) = req.validate().unwrap();
        assert_eq!(name.to_string(), "Bob");
        assert_eq!(email.to_string(), "bob@example.com");
    }

    #[test]
    fn reports_every_malformed_field_at_once() {
        let req = Request {
            name: String::new(),
            email: "not-an-email".to_owned(),
        };

        let err = req.validate().unwrap_err();
        assert_eq!(err.code, "INVALID_REQUEST");
        assert_eq!(err.violations.len(), 2);
    }
}
