//! [`User`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    DateTime,
};
use sqlx::{any::AnyRow, Row as _};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, sql::Error, Sql},
        Database,
    },
};

/// Decodes a [`User`] out of the provided `users` table row.
fn decode_user(row: &AnyRow) -> Result<User, Traced<database::Error>> {
    let id = row
        .try_get::<String, _>("id")
        .map_err(tracerr::from_and_wrap!(=> Error))
        .map_err(tracerr::map_from)?
        .parse::<Uuid>()
        .map_err(|_| tracerr::new!(Error::MalformedColumn("id")))
        .map_err(tracerr::map_from)?;

    let name = user::Name::new(
        row.try_get::<String, _>("name")
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?,
    )
    .ok_or_else(|| tracerr::new!(Error::MalformedColumn("name")))
    .map_err(tracerr::map_from)?;

    let email = user::Email::new(
        row.try_get::<String, _>("email")
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?,
    )
    .ok_or_else(|| tracerr::new!(Error::MalformedColumn("email")))
    .map_err(tracerr::map_from)?;

    let created_at = DateTime::from_unix_timestamp(
        row.try_get::<i64, _>("created_at")
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?,
    )
    .ok_or_else(|| tracerr::new!(Error::MalformedColumn("created_at")))
    .map_err(tracerr::map_from)?;

    let updated_at = row
        .try_get::<Option<i64>, _>("updated_at")
        .map_err(tracerr::from_and_wrap!(=> Error))
        .map_err(tracerr::map_from)?
        .map(|ts| {
            DateTime::from_unix_timestamp(ts)
                .map(DateTime::coerce)
                .ok_or_else(|| {
                    tracerr::new!(Error::MalformedColumn("updated_at"))
                })
                .map_err(tracerr::map_from)
        })
        .transpose()?;

    Ok(User {
        id: id.into(),
        name,
        email,
        created_at: created_at.coerce(),
        updated_at,
    })
}

impl Database<Select<By<Option<User>, user::Id>>> for Sql {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, email, created_at, updated_at \
            FROM users \
            WHERE id = ?";
        sqlx::query(SQL)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .map(|row| decode_user(&row))
            .transpose()
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Sql {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, email, created_at, updated_at \
            FROM users \
            WHERE email = ?";
        sqlx::query(SQL)
            .bind(email.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .map(|row| decode_user(&row))
            .transpose()
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Sql {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, email, created_at, updated_at \
            FROM users \
            ORDER BY created_at, id";
        sqlx::query(SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .iter()
            .map(decode_user)
            .collect()
    }
}

impl Database<Insert<User>> for Sql {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO users (id, name, email, created_at, updated_at) \
            VALUES (?, ?, ?, ?, ?)";
        sqlx::query(SQL)
            .bind(user.id.to_string())
            .bind(user.name.to_string())
            .bind(user.email.to_string())
            .bind(user.created_at.unix_timestamp())
            .bind(user.updated_at.map(|dt| dt.unix_timestamp()))
            .execute(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
            .map(drop)
    }
}

impl Database<Update<User>> for Sql {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE users \
            SET name = ?, email = ?, created_at = ?, updated_at = ? \
            WHERE id = ?";
        sqlx::query(SQL)
            .bind(user.name.to_string())
            .bind(user.email.to_string())
            .bind(user.created_at.unix_timestamp())
            .bind(user.updated_at.map(|dt| dt.unix_timestamp()))
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
            .map(drop)
    }
}

impl Database<Delete<By<User, user::Id>>> for Sql {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "DELETE FROM users WHERE id = ?";
        sqlx::query(SQL)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
            .map(|res| res.rows_affected() > 0)
    }
}
