//! PostgreSQL-backed `IdentityStore` implementation using Diesel ORM.
//!
//! Accounts are assembled from `users`, `user_roles` and `user_logins`.
//! Membership changes that span tables run inside one transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{IdentityStore, IdentityStoreError};
use crate::domain::{UserAccount, UserId};
use crate::outbound::identity_secrets::{
    hash_password_blocking, new_reset_token, reset_token_ttl, token_digest,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPasswordResetTokenRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{password_reset_tokens, roles, user_logins, user_roles, users};

/// Diesel-backed implementation of the `IdentityStore` port.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselIdentityStore {
    /// Create a store over `pool`; `clock` dates reset tokens.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn identity_pool_error(error: PoolError) -> IdentityStoreError {
    map_pool_error(error, IdentityStoreError::connection)
}

fn identity_diesel_error(error: diesel::result::Error) -> IdentityStoreError {
    map_diesel_error(
        error,
        IdentityStoreError::query,
        IdentityStoreError::connection,
    )
}

/// Failure inside a membership transaction.
///
/// Diesel rolls back on any `Err`; business refusals ride the same path.
enum TxError {
    Diesel(diesel::result::Error),
    Refused(IdentityStoreError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<TxError> for IdentityStoreError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => identity_diesel_error(error),
            TxError::Refused(error) => error,
        }
    }
}

async fn load_accounts(
    conn: &mut AsyncPgConnection,
    only: Option<Uuid>,
) -> Result<Vec<UserAccount>, diesel::result::Error> {
    let mut user_query = users::table
        .select(UserRow::as_select())
        .order_by(users::user_name.asc())
        .into_boxed();
    let mut role_query = user_roles::table
        .inner_join(roles::table)
        .select((user_roles::user_id, roles::name))
        .order_by(roles::name.asc())
        .into_boxed();
    let mut login_query = user_logins::table
        .select((user_logins::user_id, user_logins::provider))
        .into_boxed();
    if let Some(id) = only {
        user_query = user_query.filter(users::id.eq(id));
        role_query = role_query.filter(user_roles::user_id.eq(id));
        login_query = login_query.filter(user_logins::user_id.eq(id));
    }

    let user_rows: Vec<UserRow> = user_query.load(conn).await?;
    let memberships: Vec<(Uuid, String)> = role_query.load(conn).await?;
    let logins: Vec<(Uuid, String)> = login_query.load(conn).await?;

    let mut roles_by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (user_id, role) in memberships {
        roles_by_user.entry(user_id).or_default().push(role);
    }
    let mut logins_by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (user_id, provider) in logins {
        logins_by_user.entry(user_id).or_default().push(provider);
    }

    Ok(user_rows
        .into_iter()
        .map(|row| UserAccount {
            id: UserId::from_uuid(row.id),
            email: row.email,
            user_name: row.user_name,
            lockout_enabled: row.lockout_enabled,
            lockout_end: row.lockout_end,
            external_logins: logins_by_user.remove(&row.id).unwrap_or_default(),
            roles: roles_by_user.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

async fn require_user(conn: &mut AsyncPgConnection, id: Uuid) -> Result<(), TxError> {
    let found: bool = diesel::select(diesel::dsl::exists(users::table.find(id)))
        .get_result(conn)
        .await?;
    if found {
        Ok(())
    } else {
        Err(TxError::Refused(IdentityStoreError::user_not_found(
            id.to_string(),
        )))
    }
}

async fn require_role(conn: &mut AsyncPgConnection, name: &str) -> Result<Uuid, TxError> {
    roles::table
        .filter(roles::name.eq(name))
        .select(roles::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| TxError::Refused(IdentityStoreError::role_not_found(name)))
}

/// Statement consuming an unexpired reset token issued to `user_id`.
fn consume_reset_token(
    digest: &str,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(
        password_reset_tokens::table
            .filter(password_reset_tokens::token_digest.eq(digest))
            .filter(password_reset_tokens::user_id.eq(user_id))
            .filter(password_reset_tokens::expires_at.gt(now)),
    )
}

fn user_roles_delete(user_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(user_roles::table.filter(user_roles::user_id.eq(user_id)))
}

fn user_logins_delete(user_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(user_logins::table.filter(user_logins::user_id.eq(user_id)))
}

fn reset_tokens_delete(user_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(password_reset_tokens::table.filter(password_reset_tokens::user_id.eq(user_id)))
}

fn user_delete(user_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(users::table.find(user_id))
}

#[async_trait]
impl IdentityStore for DieselIdentityStore {
    async fn list_users(&self) -> Result<Vec<UserAccount>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(identity_pool_error)?;
        load_accounts(&mut conn, None)
            .await
            .map_err(identity_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(identity_pool_error)?;
        let accounts = load_accounts(&mut conn, Some(*id.as_uuid()))
            .await
            .map_err(identity_diesel_error)?;
        Ok(accounts.into_iter().next())
    }

    async fn add_to_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError> {
        let mut pooled = self.pool.get().await.map_err(identity_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user_id = *id.as_uuid();
        let role = role.to_owned();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_user(conn, user_id).await?;
                let role_id = require_role(conn, &role).await?;
                let inserted = diesel::insert_into(user_roles::table)
                    .values((
                        user_roles::user_id.eq(user_id),
                        user_roles::role_id.eq(role_id),
                    ))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                if inserted == 0 {
                    return Err(TxError::Refused(IdentityStoreError::already_in_role(role)));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(IdentityStoreError::from)
    }

    async fn remove_from_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError> {
        let mut pooled = self.pool.get().await.map_err(identity_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user_id = *id.as_uuid();
        let role = role.to_owned();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_user(conn, user_id).await?;
                let role_id = require_role(conn, &role).await?;
                let removed = diesel::delete(
                    user_roles::table
                        .filter(user_roles::user_id.eq(user_id))
                        .filter(user_roles::role_id.eq(role_id)),
                )
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Err(TxError::Refused(IdentityStoreError::not_in_role(role)));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(IdentityStoreError::from)
    }

    async fn set_lockout_enabled(
        &self,
        id: UserId,
        enabled: bool,
    ) -> Result<(), IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(identity_pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::lockout_enabled.eq(enabled),
                users::lockout_end.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map_err(identity_diesel_error)?;
        if updated == 0 {
            return Err(IdentityStoreError::user_not_found(id.to_string()));
        }
        Ok(())
    }

    async fn generate_password_reset_token(
        &self,
        id: UserId,
    ) -> Result<String, IdentityStoreError> {
        let mut pooled = self.pool.get().await.map_err(identity_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user_id = *id.as_uuid();
        let (token, digest) = new_reset_token();
        let expires_at = self.clock.utc() + reset_token_ttl();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_user(conn, user_id).await?;
                diesel::insert_into(password_reset_tokens::table)
                    .values(NewPasswordResetTokenRow {
                        token_digest: &digest,
                        user_id,
                        expires_at,
                    })
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(IdentityStoreError::from)?;
        Ok(token)
    }

    async fn reset_password(
        &self,
        id: UserId,
        token: &str,
        new_password: &str,
    ) -> Result<(), IdentityStoreError> {
        let password_hash = hash_password_blocking(new_password).await?;
        let digest = token_digest(token);
        let now = self.clock.utc();
        let mut pooled = self.pool.get().await.map_err(identity_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user_id = *id.as_uuid();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                require_user(conn, user_id).await?;
                let consumed = consume_reset_token(&digest, user_id, now)
                    .execute(conn)
                    .await?;
                if consumed == 0 {
                    return Err(TxError::Refused(IdentityStoreError::invalid_token()));
                }
                diesel::update(users::table.find(user_id))
                    .set(users::password_hash.eq(Some(password_hash)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(IdentityStoreError::from)
    }

    async fn delete_user_with_memberships(&self, id: UserId) -> Result<bool, IdentityStoreError> {
        let mut pooled = self.pool.get().await.map_err(identity_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user_id = *id.as_uuid();
        let deleted = conn
            .transaction(|conn| {
                async move {
                    user_roles_delete(user_id).execute(conn).await?;
                    user_logins_delete(user_id).execute(conn).await?;
                    reset_tokens_delete(user_id).execute(conn).await?;
                    user_delete(user_id).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(identity_diesel_error)?;
        Ok(deleted > 0)
    }
}
