//! PostgreSQL-backed `RoleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::RoleRow;
use super::pool::{DbPool, PoolError};
use super::schema::{roles, user_roles};

/// Diesel-backed implementation of the `RoleRepository` port.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn role_pool_error(error: PoolError) -> RoleRepositoryError {
    map_pool_error(error, RoleRepositoryError::connection)
}

fn role_diesel_error(error: diesel::result::Error) -> RoleRepositoryError {
    map_diesel_error(
        error,
        RoleRepositoryError::query,
        RoleRepositoryError::connection,
    )
}

fn row_to_role(row: RoleRow) -> Role {
    Role::new(RoleId::from_uuid(row.id), row.name)
}

/// `LIKE` pattern matching `fragment` anywhere, with wildcards escaped.
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Case-sensitive containment filter on role names.
fn name_contains(fragment: &str) -> diesel::dsl::Like<roles::name, String> {
    roles::name.like(contains_pattern(fragment))
}

/// Statement dropping every membership of the role.
fn memberships_delete(role_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(user_roles::table.filter(user_roles::role_id.eq(role_id)))
}

fn role_delete(role_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(roles::table.find(role_id))
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn list_by_name(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(role_pool_error)?;
        let rows: Vec<RoleRow> = roles::table
            .select(RoleRow::as_select())
            .order_by(roles::name.asc())
            .load(&mut conn)
            .await
            .map_err(role_diesel_error)?;
        Ok(rows.into_iter().map(row_to_role).collect())
    }

    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(role_pool_error)?;
        let row: Option<RoleRow> = roles::table
            .find(id.as_uuid())
            .select(RoleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(role_diesel_error)?;
        Ok(row.map(row_to_role))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(role_pool_error)?;
        let row: Option<RoleRow> = roles::table
            .filter(roles::name.eq(name))
            .select(RoleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(role_diesel_error)?;
        Ok(row.map(row_to_role))
    }

    async fn any_name_contains(&self, fragment: &str) -> Result<bool, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(role_pool_error)?;
        // LIKE is case-sensitive in PostgreSQL.
        diesel::select(diesel::dsl::exists(
            roles::table.filter(name_contains(fragment)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(role_diesel_error)
    }

    async fn insert(&self, name: &str) -> Result<Role, RoleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(role_pool_error)?;
        let row: RoleRow = diesel::insert_into(roles::table)
            .values((roles::id.eq(Uuid::new_v4()), roles::name.eq(name)))
            .returning(RoleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(role_diesel_error)?;
        Ok(row_to_role(row))
    }

    async fn delete_with_memberships(&self, id: RoleId) -> Result<bool, RoleRepositoryError> {
        let mut pooled = self.pool.get().await.map_err(role_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let role_id = *id.as_uuid();
        let deleted = conn
            .transaction(|conn| {
                async move {
                    memberships_delete(role_id).execute(conn).await?;
                    role_delete(role_id).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(role_diesel_error)?;
        Ok(deleted > 0)
    }
}
