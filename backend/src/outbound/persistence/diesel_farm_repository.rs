//! PostgreSQL-backed `FarmRepository` and `ProvinceRepository`.
//!
//! The list view joins farms to provinces and sorts in SQL; `NULLS LAST`
//! keeps farms without a province at the end.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    FarmRepository, FarmRepositoryError, ProvinceRepository, ProvinceRepositoryError,
};
use crate::domain::{Farm, FarmDetails, FarmId, FarmListing, Province};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FarmRow, FarmWrite, ProvinceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{farms, provinces};

/// Diesel-backed implementation of the `FarmRepository` port.
#[derive(Clone)]
pub struct DieselFarmRepository {
    pool: DbPool,
}

impl DieselFarmRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn farm_pool_error(error: PoolError) -> FarmRepositoryError {
    map_pool_error(error, FarmRepositoryError::connection)
}

fn farm_diesel_error(error: diesel::result::Error) -> FarmRepositoryError {
    map_diesel_error(
        error,
        FarmRepositoryError::query,
        FarmRepositoryError::connection,
    )
}

fn row_to_farm(row: FarmRow) -> Result<Farm, FarmRepositoryError> {
    let id = FarmId::new(row.id)
        .map_err(|err| FarmRepositoryError::query(format!("stored farm {}: {err}", row.id)))?;
    Ok(Farm {
        id,
        details: FarmDetails {
            name: row.name,
            address: row.address,
            town: row.town,
            county: row.county,
            province_code: row.province_code,
            postal_code: row.postal_code,
            home_phone: row.home_phone,
            cell_phone: row.cell_phone,
            directions: row.directions,
            date_joined: row.date_joined,
            last_contact_date: row.last_contact_date,
        },
    })
}

fn write_row(details: &FarmDetails) -> FarmWrite<'_> {
    FarmWrite {
        name: &details.name,
        address: details.address.as_deref(),
        town: details.town.as_deref(),
        county: details.county.as_deref(),
        province_code: details.province_code.as_deref(),
        postal_code: &details.postal_code,
        home_phone: details.home_phone.as_deref(),
        cell_phone: details.cell_phone.as_deref(),
        directions: details.directions.as_deref(),
        date_joined: details.date_joined,
        last_contact_date: details.last_contact_date,
    }
}

/// Whole-record replacement of `farm`; empty optional fields become `NULL`.
fn farm_update(farm: &Farm) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::update(farms::table.find(farm.id.get())).set(write_row(&farm.details))
}

#[async_trait]
impl FarmRepository for DieselFarmRepository {
    async fn list_with_provinces(&self) -> Result<Vec<FarmListing>, FarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(farm_pool_error)?;
        let rows: Vec<(FarmRow, Option<String>)> = farms::table
            .left_join(provinces::table)
            .select((FarmRow::as_select(), provinces::name.nullable()))
            .order_by((provinces::name.asc().nulls_last(), farms::name.asc()))
            .load(&mut conn)
            .await
            .map_err(farm_diesel_error)?;

        rows.into_iter()
            .map(|(row, province_name)| {
                row_to_farm(row).map(|farm| FarmListing {
                    farm,
                    province_name,
                })
            })
            .collect()
    }

    async fn find_by_id(&self, id: FarmId) -> Result<Option<Farm>, FarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(farm_pool_error)?;
        let row: Option<FarmRow> = farms::table
            .find(id.get())
            .select(FarmRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(farm_diesel_error)?;
        row.map(row_to_farm).transpose()
    }

    async fn insert(&self, details: &FarmDetails) -> Result<Farm, FarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(farm_pool_error)?;
        let row: FarmRow = diesel::insert_into(farms::table)
            .values(write_row(details))
            .returning(FarmRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(farm_diesel_error)?;
        row_to_farm(row)
    }

    async fn update(&self, farm: &Farm) -> Result<bool, FarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(farm_pool_error)?;
        let updated = farm_update(farm)
            .execute(&mut conn)
            .await
            .map_err(farm_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: FarmId) -> Result<bool, FarmRepositoryError> {
        let mut conn = self.pool.get().await.map_err(farm_pool_error)?;
        let deleted = diesel::delete(farms::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(farm_diesel_error)?;
        Ok(deleted > 0)
    }
}

/// Diesel-backed implementation of the `ProvinceRepository` port.
#[derive(Clone)]
pub struct DieselProvinceRepository {
    pool: DbPool,
}

impl DieselProvinceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn province_pool_error(error: PoolError) -> ProvinceRepositoryError {
    map_pool_error(error, ProvinceRepositoryError::connection)
}

fn province_diesel_error(error: diesel::result::Error) -> ProvinceRepositoryError {
    map_diesel_error(
        error,
        ProvinceRepositoryError::query,
        ProvinceRepositoryError::connection,
    )
}

#[async_trait]
impl ProvinceRepository for DieselProvinceRepository {
    async fn list_by_name(&self) -> Result<Vec<Province>, ProvinceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(province_pool_error)?;
        let rows: Vec<ProvinceRow> = provinces::table
            .select(ProvinceRow::as_select())
            .order_by(provinces::name.asc())
            .load(&mut conn)
            .await
            .map_err(province_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| Province::new(row.code, row.name))
            .collect())
    }

    async fn exists(&self, code: &str) -> Result<bool, ProvinceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(province_pool_error)?;
        diesel::select(diesel::dsl::exists(
            provinces::table.filter(provinces::code.eq(code)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(province_diesel_error)
    }
}
