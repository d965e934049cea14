//! Repository for users, roles and permission grants.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sqlx::{PgPool, Postgres, QueryBuilder};

use easyvol_core::{
    Action, Module, PermissionGrant, PermissionId, PermissionKey, PermissionSet, RoleId, Source,
    UserId,
};

use super::pagination::{Page, Pagination};
use super::RepositoryError;
use crate::models::user::{Role, RolePayload, User, UserFilter, UserPayload};

const USER_COLUMNS: &str = "id, username, password_hash, email, full_name, member_id, \
     role_id, is_active, must_change_password, created_at, last_login_at";

/// Raw grant row from the role/user permission UNION query.
#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    module: Module,
    action: Action,
    source: String,
}

impl TryFrom<GrantRow> for PermissionGrant {
    type Error = RepositoryError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        let source = match row.source.as_str() {
            "role" => Source::Role,
            "user" => Source::User,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown grant source: {other}"
                )));
            }
        };
        Ok(Self {
            key: PermissionKey::new(row.module, row.action),
            source,
        })
    }
}

/// A permission catalog row, as the role-editing page lists it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PermissionRow {
    pub id: PermissionId,
    pub module: Module,
    pub action: Action,
    pub description: Option<String>,
}

/// Repository for user, role and permission database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List user accounts matching the filter, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &UserFilter,
        pagination: Pagination,
    ) -> Result<Page<User>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY username");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let items = query.build_query_as::<User>().fetch_all(self.pool).await?;

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1=1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        Ok(Page::new(items, total, pagination))
    }

    /// Fetch one user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Fetch an active user by username, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Role name for display, when the user has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_name(&self, role_id: RoleId) -> Result<Option<String>, RepositoryError> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(name)
    }

    /// Create a user account with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate username or email.
    pub async fn create(
        &self,
        payload: &UserPayload,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, email, full_name, member_id,
                                role_id, is_active, must_change_password)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&payload.username)
        .bind(password_hash)
        .bind(&payload.email)
        .bind(&payload.full_name)
        .bind(payload.member_id)
        .bind(payload.role_id)
        .bind(payload.is_active)
        .bind(must_change_password)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// Update account fields (not the password).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update(&self, id: UserId, payload: &UserPayload) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $2, email = $3, full_name = $4,
                              member_id = $5, role_id = $6, is_active = $7
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&payload.full_name)
        .bind(payload.member_id)
        .bind(payload.role_id)
        .bind(payload.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Store a new password hash and clear the forced-change flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, must_change_password = FALSE WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Deactivate a user account. Login is refused for inactive accounts;
    /// rows are never removed so the activity log stays attributable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn deactivate(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// List all roles, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_roles(&self) -> Result<Vec<Role>, RepositoryError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(roles)
    }

    /// Create a role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate name.
    pub async fn create_role(&self, payload: &RolePayload) -> Result<Role, RepositoryError> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2)
             RETURNING id, name, description, created_at",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// Delete a role. Users pointing at it keep their account with no role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the role does not exist.
    pub async fn delete_role(&self, id: RoleId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET role_id = NULL WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    /// The full permission catalog, for the role/user editing pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_permissions(&self) -> Result<Vec<PermissionRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT id, module, action, description FROM permissions ORDER BY module, action",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Permission ids currently granted to a role, for pre-checking the
    /// editing matrix.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_permission_ids(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<PermissionId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, PermissionId>(
            "SELECT permission_id FROM role_permissions WHERE role_id = $1",
        )
        .bind(role_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Permission ids granted directly to a user, on top of the role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_permission_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PermissionId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, PermissionId>(
            "SELECT permission_id FROM user_permissions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Load the effective permission set for a user: role grants unioned with
    /// direct user grants, user-sourced winning on a duplicate key. One
    /// round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` for an unknown source tag.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
        role_id: Option<RoleId>,
    ) -> Result<PermissionSet, RepositoryError> {
        let rows = if let Some(role_id) = role_id {
            sqlx::query_as::<_, GrantRow>(
                "SELECT p.module, p.action, 'role' AS source
                 FROM permissions p
                 INNER JOIN role_permissions rp ON p.id = rp.permission_id
                 WHERE rp.role_id = $1
                 UNION
                 SELECT p.module, p.action, 'user' AS source
                 FROM permissions p
                 INNER JOIN user_permissions up ON p.id = up.permission_id
                 WHERE up.user_id = $2",
            )
            .bind(role_id)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, GrantRow>(
                "SELECT p.module, p.action, 'user' AS source
                 FROM permissions p
                 INNER JOIN user_permissions up ON p.id = up.permission_id
                 WHERE up.user_id = $1",
            )
            .bind(user_id)
            .fetch_all(self.pool)
            .await?
        };

        let grants = rows
            .into_iter()
            .map(PermissionGrant::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PermissionSet::merge(grants))
    }

    /// Replace a role's grant set atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails; the
    /// transaction is rolled back and the previous grants stay in place.
    pub async fn set_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        for permission_id in permission_ids {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replace a user's direct grant set atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn set_user_permissions(
        &self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for permission_id in permission_ids {
            sqlx::query("INSERT INTO user_permissions (user_id, permission_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(role_id) = filter.role_id {
        query.push(" AND role_id = ").push_bind(role_id);
    }
    if let Some(active) = filter.active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict("username o email già in uso".to_string());
        }
    }
    RepositoryError::Database(err)
}

// =============================================================================
// Password hashing
// =============================================================================

/// Hash a password with Argon2id using default parameters and a random salt.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if hashing fails, which only
/// happens on invalid parameters.
pub fn hash_password(password: &str) -> Result<String, RepositoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RepositoryError::DataCorruption(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC-format hash.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("Pw@12345678").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Pw@12345678", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-hash"));
    }

    #[test]
    fn grant_row_conversion_maps_sources() {
        let row = GrantRow {
            module: Module::Members,
            action: Action::View,
            source: "user".to_string(),
        };
        let grant = PermissionGrant::try_from(row).expect("convert");
        assert_eq!(grant.source, Source::User);

        let bad = GrantRow {
            module: Module::Members,
            action: Action::View,
            source: "cosmic".to_string(),
        };
        assert!(PermissionGrant::try_from(bad).is_err());
    }
}
