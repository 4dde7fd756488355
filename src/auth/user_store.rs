//! Credential Store
//! Mission: Persist users, roles, and their assignments in SQLite

use crate::auth::models::{Role, User};
use crate::auth::password::hash_password;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use tracing::{info, warn};
use uuid::Uuid;

/// Roles every deployment starts with. `user` is the sign-up default
/// and `public` is what unauthenticated callers resolve to.
const SEED_ROLES: [&str; 4] = ["admin", "owner", "user", "public"];

/// Typed storage failures, so the service layer can translate a
/// duplicate email into its own error kind without string matching.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// User and role storage with a SQLite backend.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Open the store, creating the schema and seed rows on first use.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, role_id),
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (role_id) REFERENCES roles(id)
            )",
            [],
        )?;

        self.seed_roles(&conn)?;
        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Insert the built-in roles if they are missing.
    fn seed_roles(&self, conn: &Connection) -> Result<()> {
        for name in SEED_ROLES {
            conn.execute(
                "INSERT OR IGNORE INTO roles (name) VALUES (?1)",
                params![name],
            )
            .with_context(|| format!("Failed to seed role '{name}'"))?;
        }
        Ok(())
    }

    /// Create a default admin account for initial setup when no user
    /// holds the admin role yet.
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_roles
                 JOIN roles ON roles.id = user_roles.role_id
                 WHERE roles.name = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let password_hash = hash_password("testPassword")?;
            let id = Uuid::new_v4();

            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id.to_string(),
                    "admin@example.com",
                    password_hash,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to insert admin user")?;

            conn.execute(
                "INSERT INTO user_roles (user_id, role_id)
                 SELECT ?1, id FROM roles WHERE name = 'admin'",
                params![id.to_string()],
            )
            .context("Failed to assign admin role")?;

            info!("🔐 Default admin user created (email: admin@example.com, password: testPassword)");
            warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    /// Check whether a role row exists. Used at startup to confirm
    /// the sign-up default role is present.
    pub fn role_exists(&self, role: &Role) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM roles WHERE name = ?1",
            params![role.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a user by email, with roles attached. The caller is
    /// responsible for lowercasing the email first.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], |row| {
            let id: String = row.get(0)?;
            Ok(User {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                email: row.get(1)?,
                password_hash: row.get(2)?,
                roles: Vec::new(),
                created_at: row.get(3)?,
            })
        });

        let mut user = match user_result {
            Ok(user) => user,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        user.roles = self.roles_for_user(&conn, &user.id)?;
        Ok(Some(user))
    }

    fn roles_for_user(&self, conn: &Connection, user_id: &Uuid) -> Result<Vec<Role>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT roles.name FROM roles
             JOIN user_roles ON user_roles.role_id = roles.id
             WHERE user_roles.user_id = ?1
             ORDER BY roles.id",
        )?;

        let roles = stmt
            .query_map(params![user_id.to_string()], |row| {
                row.get::<_, String>(0).map(Role::new)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles)
    }

    /// Create a new user from an already-hashed password.
    ///
    /// A concurrent sign-up race on the same email resolves through
    /// the UNIQUE constraint and surfaces as `DuplicateEmail`.
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            roles: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.email,
                user.password_hash,
                user.created_at,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::DuplicateEmail
            }
            other => StoreError::Database(other),
        })?;

        info!("✅ Created user: {}", user.email);

        Ok(user)
    }

    /// Assign a role to a user by role name.
    pub fn assign_role(&self, user_id: &Uuid, role: &Role) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let role_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM roles WHERE name = ?1",
                params![role.as_str()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let Some(role_id) = role_id else {
            return Err(StoreError::UnknownRole(role.as_str().to_string()));
        };

        // Re-assignment is a no-op.
        conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
            params![user_id.to_string(), role_id],
        )?;

        Ok(())
    }

    /// Remove every role from a user. Exists for role re-assignment
    /// flows and for exercising token staleness in tests.
    pub fn clear_roles(&self, user_id: &Uuid) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "DELETE FROM user_roles WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_seed_roles_created() {
        let (store, _temp) = create_test_store();

        for name in SEED_ROLES {
            assert!(store.role_exists(&Role::new(name)).unwrap(), "{name}");
        }
        assert!(!store.role_exists(&Role::new("superuser")).unwrap());
    }

    #[test]
    fn test_default_admin_created() {
        let (store, _temp) = create_test_store();

        let admin = store.find_by_email("admin@example.com").unwrap().unwrap();
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(admin.roles, vec![Role::new("admin")]);
    }

    #[test]
    fn test_create_and_retrieve_user_with_roles() {
        let (store, _temp) = create_test_store();

        let hash = hash_password("pw1").unwrap();
        let user = store.create_user("a@b.com", &hash).unwrap();
        store.assign_role(&user.id, &Role::default_user()).unwrap();
        store.assign_role(&user.id, &Role::new("owner")).unwrap();

        let retrieved = store.find_by_email("a@b.com").unwrap().unwrap();
        assert_eq!(retrieved.id, user.id);
        // Join ordered by role id: owner was seeded before user.
        assert_eq!(
            retrieved.roles,
            vec![Role::new("owner"), Role::new("user")]
        );
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        let hash = hash_password("pw1").unwrap();
        store.create_user("a@b.com", &hash).unwrap();

        let err = store.create_user("a@b.com", &hash).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn test_assign_unknown_role_rejected() {
        let (store, _temp) = create_test_store();

        let hash = hash_password("pw1").unwrap();
        let user = store.create_user("a@b.com", &hash).unwrap();

        let err = store.assign_role(&user.id, &Role::new("wizard")).unwrap_err();
        assert!(matches!(err, StoreError::UnknownRole(name) if name == "wizard"));
    }

    #[test]
    fn test_clear_roles() {
        let (store, _temp) = create_test_store();

        let hash = hash_password("pw1").unwrap();
        let user = store.create_user("a@b.com", &hash).unwrap();
        store.assign_role(&user.id, &Role::default_user()).unwrap();
        store.clear_roles(&user.id).unwrap();

        let retrieved = store.find_by_email("a@b.com").unwrap().unwrap();
        assert!(retrieved.roles.is_empty());
    }

    #[test]
    fn test_find_missing_user_is_none() {
        let (store, _temp) = create_test_store();
        assert!(store.find_by_email("nobody@b.com").unwrap().is_none());
    }
}
