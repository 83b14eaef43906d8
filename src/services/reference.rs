//! Reference data: sites, items, vendors. Plain CRUD with no
//! reconciliation logic.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, SqlErr,
};
use tracing::instrument;

use crate::entities::{items, sites, vendors};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct CreateSiteInput {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub is_expiry_tracked: bool,
    pub hsn_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateVendorInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct ReferenceDataService {
    db: Arc<DatabaseConnection>,
}

impl ReferenceDataService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create_site(&self, input: CreateSiteInput) -> Result<sites::Model, ServiceError> {
        let site = sites::ActiveModel {
            code: Set(input.code.clone()),
            name: Set(input.name),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        map_unique(site.insert(&*self.db).await, || {
            format!("site code {} already exists", input.code)
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: CreateItemInput) -> Result<items::Model, ServiceError> {
        let item = items::ActiveModel {
            code: Set(input.code.clone()),
            name: Set(input.name),
            unit: Set(input.unit),
            is_expiry_tracked: Set(input.is_expiry_tracked),
            hsn_code: Set(input.hsn_code),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        map_unique(item.insert(&*self.db).await, || {
            format!("item code {} already exists", input.code)
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create_vendor(
        &self,
        input: CreateVendorInput,
    ) -> Result<vendors::Model, ServiceError> {
        let vendor = vendors::ActiveModel {
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            phone: Set(input.phone),
            gst_number: Set(input.gst_number),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        Ok(vendor.insert(&*self.db).await?)
    }

    pub async fn get_site(&self, id: i64) -> Result<sites::Model, ServiceError> {
        sites::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Site {} not found", id)))
    }

    pub async fn get_item(&self, id: i64) -> Result<items::Model, ServiceError> {
        items::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    pub async fn get_vendor(&self, id: i64) -> Result<vendors::Model, ServiceError> {
        vendors::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", id)))
    }

    pub async fn list_sites(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<sites::Model>, u64), ServiceError> {
        let paginator = sites::Entity::find()
            .order_by_asc(sites::Column::Id)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        Ok((paginator.fetch_page(page.saturating_sub(1)).await?, total))
    }

    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<items::Model>, u64), ServiceError> {
        let paginator = items::Entity::find()
            .order_by_asc(items::Column::Id)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        Ok((paginator.fetch_page(page.saturating_sub(1)).await?, total))
    }

    pub async fn list_vendors(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<vendors::Model>, u64), ServiceError> {
        let paginator = vendors::Entity::find()
            .order_by_asc(vendors::Column::Id)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        Ok((paginator.fetch_page(page.saturating_sub(1)).await?, total))
    }
}

fn map_unique<T>(
    result: Result<T, sea_orm::DbErr>,
    conflict: impl FnOnce() -> String,
) -> Result<T, ServiceError> {
    result.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(conflict()),
        _ => e.into(),
    })
}
