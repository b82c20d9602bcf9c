use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clients::{IdentityAccount, IdentityProviderClient};
use crate::entities::{user, User, UserModel, UserRole};
use crate::errors::ServiceError;
use crate::services::catalog::{total_pages, ADMIN_PAGE_SIZE};

/// Query for the administrative user listing.
#[derive(Debug, Clone)]
pub struct DirectoryQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: ADMIN_PAGE_SIZE,
            search: None,
        }
    }
}

/// One page of the user directory.
#[derive(Debug)]
pub struct DirectoryPage {
    pub users: Vec<UserModel>,
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

/// Input for the admin user update: role and/or active flag.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Display-name projection joined onto catalog and video responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserBrief {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&UserModel> for UserBrief {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// User directory service: lazy identity binding plus admin management.
#[derive(Clone)]
pub struct UserDirectoryService {
    db: Arc<DatabaseConnection>,
    identity: Arc<IdentityProviderClient>,
}

impl UserDirectoryService {
    pub fn new(db: Arc<DatabaseConnection>, identity: Arc<IdentityProviderClient>) -> Self {
        Self { db, identity }
    }

    /// Materialize the local record for a verified identity: a single
    /// idempotent upsert keyed on the external id. Every verification
    /// refreshes the profile fields and bumps `last_login`; role and
    /// active flag are local state and never touched here.
    #[instrument(skip(self, account), fields(external_id = %account.id))]
    pub async fn upsert_from_identity(
        &self,
        account: &IdentityAccount,
    ) -> Result<UserModel, ServiceError> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(account.id.clone()),
            email: Set(account.email.clone()),
            first_name: Set(account.first_name.clone()),
            last_name: Set(account.last_name.clone()),
            role: Set(UserRole::User),
            is_active: Set(true),
            avatar_url: Set(account.image_url.clone()),
            last_login: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let bound = User::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::ExternalId)
                    .update_columns([
                        user::Column::Email,
                        user::Column::FirstName,
                        user::Column::LastName,
                        user::Column::AvatarUrl,
                        user::Column::LastLogin,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&*self.db)
            .await?;

        Ok(bound)
    }

    /// Paginated, searchable user listing, newest first.
    #[instrument(skip(self))]
    pub async fn search_users(&self, query: DirectoryQuery) -> Result<DirectoryPage, ServiceError> {
        let mut db_query = User::find();

        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            let pattern = format!("%{}%", needle.to_lowercase());
            db_query = db_query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::FirstName))))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::LastName))))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Email))))
                            .like(pattern),
                    ),
            );
        }

        let total = db_query.clone().count(&*self.db).await?;
        let pages = total_pages(total, query.limit);

        let users = db_query
            .order_by_desc(user::Column::CreatedAt)
            .limit(query.limit)
            .offset(query.page.saturating_sub(1) * query.limit)
            .all(&*self.db)
            .await?;

        Ok(DirectoryPage {
            users,
            current: query.page,
            pages,
            total,
        })
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserModel, ServiceError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Admin update of role and/or active flag.
    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> Result<UserModel, ServiceError> {
        let existing = self.get_user(user_id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!("Updated user: {}", user_id);
        Ok(updated)
    }

    /// Delete a user. Refused when the target is the last remaining admin;
    /// the provider-side deletion is best-effort and never blocks removal
    /// of the local record.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_user(user_id).await?;

        if existing.is_admin() {
            let admin_count = User::find()
                .filter(user::Column::Role.eq(UserRole::Admin))
                .count(&*self.db)
                .await?;
            if admin_count <= 1 {
                return Err(ServiceError::InvalidOperation(
                    "Cannot delete the last admin user".to_string(),
                ));
            }
        }

        if let Err(err) = self.identity.delete_account(&existing.external_id).await {
            warn!(user_id = %user_id, error = %err, "failed to delete identity provider account");
        }

        existing.delete(&*self.db).await?;
        info!("Deleted user: {}", user_id);
        Ok(())
    }

    /// Batch lookup used to join creator/updater display names onto
    /// responses. Unknown ids are simply absent from the map.
    #[instrument(skip(self, ids))]
    pub async fn display_briefs(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserBrief>, ServiceError> {
        let mut unique: Vec<Uuid> = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(unique))
            .all(&*self.db)
            .await?;

        Ok(users
            .iter()
            .map(|user| (user.id, UserBrief::from(user)))
            .collect())
    }
}
