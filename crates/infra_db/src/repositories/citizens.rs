//! Citizen and vehicle repository implementation
//!
//! The top of the ownership chain. Deleting a citizen or a vehicle
//! cascades through every document table and the payments table inside
//! one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{CitizenId, DocumentKind, UserId, VehicleId};

use crate::error::DatabaseError;
use crate::repositories::documents::table_profile;

/// Database row for a citizen
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CitizenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub relation_type: Option<String>,
    pub relation_name: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city_district: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a vehicle
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: Uuid,
    pub citizen_id: Uuid,
    pub registration_no: String,
    pub vehicle_type: Option<String>,
    pub make_model: Option<String>,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&domain_documents::Citizen> for CitizenRow {
    fn from(citizen: &domain_documents::Citizen) -> Self {
        Self {
            id: citizen.id.into(),
            user_id: citizen.user_id.into(),
            name: citizen.name.clone(),
            mobile_number: citizen.mobile_number.clone(),
            email: citizen.email.clone(),
            birth_date: citizen.birth_date,
            relation_type: citizen.relation_type.clone(),
            relation_name: citizen.relation_name.clone(),
            address: citizen.address.clone(),
            state: citizen.state.clone(),
            city_district: citizen.city_district.clone(),
            created_at: citizen.created_at,
        }
    }
}

impl From<&domain_documents::Vehicle> for VehicleRow {
    fn from(vehicle: &domain_documents::Vehicle) -> Self {
        Self {
            id: vehicle.id.into(),
            citizen_id: vehicle.citizen_id.into(),
            registration_no: vehicle.registration_no.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
            make_model: vehicle.make_model.clone(),
            chassis_no: vehicle.chassis_no.clone(),
            engine_no: vehicle.engine_no.clone(),
            created_at: vehicle.created_at,
        }
    }
}

/// Repository for citizens and their vehicles
#[derive(Debug, Clone)]
pub struct CitizenRepository {
    pool: PgPool,
}

impl CitizenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_citizen(&self, row: &CitizenRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO citizens (
                id, user_id, name, mobile_number, email, birth_date,
                relation_type, relation_name, address, state, city_district, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.name)
        .bind(&row.mobile_number)
        .bind(&row.email)
        .bind(row.birth_date)
        .bind(&row.relation_type)
        .bind(&row.relation_name)
        .bind(&row.address)
        .bind(&row.state)
        .bind(&row.city_district)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn fetch_citizen(&self, id: CitizenId) -> Result<CitizenRow, DatabaseError> {
        sqlx::query_as::<_, CitizenRow>("SELECT * FROM citizens WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Citizen", id))
    }

    pub async fn update_citizen(&self, row: &CitizenRow) -> Result<(), DatabaseError> {
        // user_id and created_at are fixed after creation
        let result = sqlx::query(
            r#"
            UPDATE citizens
            SET name = $2, mobile_number = $3, email = $4, birth_date = $5,
                relation_type = $6, relation_name = $7, address = $8,
                state = $9, city_district = $10
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.mobile_number)
        .bind(&row.email)
        .bind(row.birth_date)
        .bind(&row.relation_type)
        .bind(&row.relation_name)
        .bind(&row.address)
        .bind(&row.state)
        .bind(&row.city_district)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Citizen", CitizenId::from_uuid(row.id)));
        }
        Ok(())
    }

    /// Deletes a citizen with their vehicles, documents, and payments in
    /// one transaction.
    pub async fn delete_citizen_cascading(&self, id: CitizenId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let vehicle_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM vehicles WHERE citizen_id = $1")
                .bind(id.as_uuid())
                .fetch_all(&mut *tx)
                .await?;

        for vehicle_id in &vehicle_ids {
            delete_vehicle_documents(&mut tx, *vehicle_id).await?;
        }

        sqlx::query("DELETE FROM vehicles WHERE citizen_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM citizens WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::not_found("Citizen", id));
        }

        tx.commit().await?;
        debug!(citizen = %id, vehicles = vehicle_ids.len(), "deleted citizen");
        Ok(())
    }

    pub async fn list_citizens_of_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CitizenRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, CitizenRow>(
            "SELECT * FROM citizens WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_all_citizens(&self) -> Result<Vec<CitizenRow>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, CitizenRow>("SELECT * FROM citizens ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn insert_vehicle(&self, row: &VehicleRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, citizen_id, registration_no, vehicle_type,
                make_model, chassis_no, engine_no, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(row.citizen_id)
        .bind(&row.registration_no)
        .bind(&row.vehicle_type)
        .bind(&row.make_model)
        .bind(&row.chassis_no)
        .bind(&row.engine_no)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn fetch_vehicle(&self, id: VehicleId) -> Result<VehicleRow, DatabaseError> {
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Vehicle", id))
    }

    /// Deletes a vehicle with its documents and payments in one transaction.
    pub async fn delete_vehicle_cascading(&self, id: VehicleId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        delete_vehicle_documents(&mut tx, *id.as_uuid()).await?;

        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::not_found("Vehicle", id));
        }

        tx.commit().await?;
        debug!(vehicle = %id, "deleted vehicle");
        Ok(())
    }

    pub async fn list_vehicles_of_citizen(
        &self,
        citizen_id: CitizenId,
    ) -> Result<Vec<VehicleRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM vehicles WHERE citizen_id = $1 ORDER BY created_at",
        )
        .bind(citizen_id.as_uuid())
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_all_vehicles(&self) -> Result<Vec<VehicleRow>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

/// Removes every document of every kind for one vehicle, payments first.
async fn delete_vehicle_documents(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: Uuid,
) -> Result<(), DatabaseError> {
    for kind in DocumentKind::ALL {
        let profile = table_profile(kind);
        let payments_sql = format!(
            "DELETE FROM payments WHERE payable_kind = $1 \
             AND payable_id IN (SELECT id FROM {} WHERE vehicle_id = $2)",
            profile.table
        );
        sqlx::query(&payments_sql)
            .bind(kind.wire_name())
            .bind(vehicle_id)
            .execute(&mut **tx)
            .await?;

        let documents_sql = format!("DELETE FROM {} WHERE vehicle_id = $1", profile.table);
        sqlx::query(&documents_sql)
            .bind(vehicle_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
