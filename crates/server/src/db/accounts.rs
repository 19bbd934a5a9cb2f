//! Shop account repository.
//!
//! Besides plain CRUD this owns the sign-in lockout columns. The counter is
//! incremented in SQL so concurrent failed sign-ins are all counted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use shopdesk_core::{AccountStatus, Email, ShopId};

use super::store::AccountStore;
use super::{RepositoryError, parse_column};
use crate::models::{NewShopAccount, ShopAccount};

const ACCOUNT_COLUMNS: &str = "id, uid, email, shop_name, owner_name, phone, address, \
     failed_login_attempts, locked_until, lock_duration_minutes, account_status, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    uid: Uuid,
    email: String,
    shop_name: String,
    owner_name: String,
    phone: Option<String>,
    address: Option<String>,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    lock_duration_minutes: Option<i32>,
    account_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

impl TryFrom<AccountRow> for ShopAccount {
    type Error = RepositoryError;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ShopId::new(r.id),
            uid: r.uid,
            email,
            shop_name: r.shop_name,
            owner_name: r.owner_name,
            phone: r.phone,
            address: r.address,
            failed_login_attempts: r.failed_login_attempts,
            locked_until: r.locked_until,
            lock_duration_minutes: r.lock_duration_minutes,
            account_status: parse_column("account_status", &r.account_status)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Repository for shop account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ShopAccount>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM shop.shop_account ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ShopAccount::try_from).collect()
    }
}

impl AccountStore for AccountRepository<'_> {
    async fn create_account(&self, account: &NewShopAccount) -> Result<ShopAccount, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r"
            INSERT INTO shop.shop_account
                (uid, email, password_hash, shop_name, owner_name, account_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(&account.shop_name)
        .bind(&account.owner_name)
        .bind(account.account_status.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email already exists"))?;

        row.try_into()
    }

    async fn get_account(&self, id: ShopId) -> Result<Option<ShopAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM shop.shop_account WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ShopAccount::try_from).transpose()
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ShopAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM shop.shop_account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ShopAccount::try_from).transpose()
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(ShopAccount, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM shop.shop_account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((ShopAccount::try_from(r.account)?, r.password_hash)))
            .transpose()
    }

    async fn record_failed_attempt(&self, id: ShopId) -> Result<i32, RepositoryError> {
        let attempts: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE shop.shop_account
            SET failed_login_attempts = failed_login_attempts + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING failed_login_attempts
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        attempts.ok_or(RepositoryError::NotFound)
    }

    async fn lock_account(
        &self,
        id: ShopId,
        until: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.shop_account
            SET locked_until = $2,
                lock_duration_minutes = $3,
                account_status = 'locked',
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(until)
        .bind(duration_minutes)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear_lock(&self, id: ShopId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.shop_account
            SET failed_login_attempts = 0,
                locked_until = NULL,
                lock_duration_minutes = NULL,
                account_status = CASE WHEN account_status = 'locked'
                                      THEN 'active' ELSE account_status END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_account_status(
        &self,
        id: ShopId,
        status: AccountStatus,
    ) -> Result<ShopAccount, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r"
            UPDATE shop.shop_account
            SET account_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn save_profile(&self, account: &ShopAccount) -> Result<ShopAccount, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r"
            UPDATE shop.shop_account
            SET shop_name = $2, owner_name = $3, phone = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(account.id.as_i32())
        .bind(&account.shop_name)
        .bind(&account.owner_name)
        .bind(account.phone.as_deref())
        .bind(account.address.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
