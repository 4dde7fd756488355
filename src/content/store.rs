//! Content Storage
//! Mission: Persist tabs and pages with their allowed-roles sets

use crate::content::models::{Page, Tab};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::auth::models::Role;

/// Tab and page storage. Shares the SQLite database (and its `roles`
/// table) with the credential store.
pub struct ContentStore {
    db_path: String,
}

impl ContentStore {
    /// Open the store, creating the schema and default resources on
    /// first use.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        // Same DDL as the credential store; whichever opens first
        // creates it.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tabs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                uisref TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tab_roles (
                tab_id INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (tab_id, role_id),
                FOREIGN KEY (tab_id) REFERENCES tabs(id),
                FOREIGN KEY (role_id) REFERENCES roles(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS page_roles (
                page_id INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (page_id, role_id),
                FOREIGN KEY (page_id) REFERENCES pages(id),
                FOREIGN KEY (role_id) REFERENCES roles(id)
            )",
            [],
        )?;

        self.seed_defaults(&conn)?;

        Ok(())
    }

    /// Seed a starter navigation layout when the tables are empty.
    fn seed_defaults(&self, conn: &Connection) -> Result<()> {
        let tab_count: i64 = conn.query_row("SELECT COUNT(*) FROM tabs", [], |row| row.get(0))?;
        if tab_count == 0 {
            self.insert_tab(conn, "Home", "home", &["public", "user", "owner", "admin"])?;
            self.insert_tab(conn, "Dashboard", "dashboard", &["user", "owner", "admin"])?;
            self.insert_tab(conn, "Admin", "admin", &["admin"])?;
            info!("📐 Seeded default navigation tabs");
        }

        let page_count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        if page_count == 0 {
            self.insert_page(conn, "Welcome", "welcome", &["public", "user", "owner", "admin"])?;
            self.insert_page(conn, "Account", "account", &["user", "owner", "admin"])?;
            self.insert_page(conn, "User Management", "user-management", &["admin"])?;
            info!("📄 Seeded default pages");
        }

        Ok(())
    }

    /// Insert a tab with its allowed roles. Role names must already
    /// exist in the `roles` table.
    pub fn insert_tab(
        &self,
        conn: &Connection,
        title: &str,
        uisref: &str,
        roles: &[&str],
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO tabs (title, uisref) VALUES (?1, ?2)",
            params![title, uisref],
        )
        .with_context(|| format!("Failed to insert tab '{uisref}'"))?;
        let tab_id = conn.last_insert_rowid();

        for role in roles {
            conn.execute(
                "INSERT INTO tab_roles (tab_id, role_id)
                 SELECT ?1, id FROM roles WHERE name = ?2",
                params![tab_id, role],
            )?;
        }

        Ok(tab_id)
    }

    /// Insert a page with its allowed roles.
    pub fn insert_page(
        &self,
        conn: &Connection,
        title: &str,
        slug: &str,
        roles: &[&str],
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO pages (title, slug) VALUES (?1, ?2)",
            params![title, slug],
        )
        .with_context(|| format!("Failed to insert page '{slug}'"))?;
        let page_id = conn.last_insert_rowid();

        for role in roles {
            conn.execute(
                "INSERT INTO page_roles (page_id, role_id)
                 SELECT ?1, id FROM roles WHERE name = ?2",
                params![page_id, role],
            )?;
        }

        Ok(page_id)
    }

    pub fn connection(&self) -> Result<Connection> {
        Connection::open(&self.db_path).context("Failed to open content database")
    }

    /// All tabs, roles attached, in insertion order.
    pub fn all_tabs(&self) -> Result<Vec<Tab>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare("SELECT id, title, uisref FROM tabs ORDER BY id")?;
        let mut tabs = stmt
            .query_map([], |row| {
                Ok(Tab {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    uisref: row.get(2)?,
                    visible_roles: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for tab in &mut tabs {
            tab.visible_roles = self.roles_for(&conn, "tab_roles", "tab_id", tab.id)?;
        }

        Ok(tabs)
    }

    /// All pages, roles attached, in insertion order.
    pub fn all_pages(&self) -> Result<Vec<Page>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare("SELECT id, title, slug FROM pages ORDER BY id")?;
        let mut pages = stmt
            .query_map([], |row| {
                Ok(Page {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    slug: row.get(2)?,
                    visible_roles: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for page in &mut pages {
            page.visible_roles = self.roles_for(&conn, "page_roles", "page_id", page.id)?;
        }

        Ok(pages)
    }

    fn roles_for(
        &self,
        conn: &Connection,
        join_table: &str,
        fk_column: &str,
        resource_id: i64,
    ) -> Result<Vec<Role>> {
        let sql = format!(
            "SELECT roles.name FROM roles
             JOIN {join_table} ON {join_table}.role_id = roles.id
             WHERE {join_table}.{fk_column} = ?1
             ORDER BY roles.id"
        );
        let mut stmt = conn.prepare(&sql)?;

        let roles = stmt
            .query_map(params![resource_id], |row| {
                row.get::<_, String>(0).map(Role::new)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_store::UserStore;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (ContentStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        // Credential store first so the seed roles exist.
        UserStore::new(db_path).unwrap();
        let store = ContentStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_seeded_tabs_in_insertion_order() {
        let (store, _temp) = create_test_store();

        let tabs = store.all_tabs().unwrap();
        let uisrefs: Vec<&str> = tabs.iter().map(|t| t.uisref.as_str()).collect();
        assert_eq!(uisrefs, vec!["home", "dashboard", "admin"]);

        let home = &tabs[0];
        assert!(home.visible_roles.contains(&Role::public()));
        assert!(home.visible_roles.contains(&Role::new("admin")));

        let admin = &tabs[2];
        assert_eq!(admin.visible_roles, vec![Role::new("admin")]);
    }

    #[test]
    fn test_seeded_pages_carry_roles() {
        let (store, _temp) = create_test_store();

        let pages = store.all_pages().unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].slug, "welcome");
        assert!(pages[0].visible_roles.contains(&Role::public()));
        assert_eq!(pages[2].visible_roles, vec![Role::new("admin")]);
    }

    #[test]
    fn test_insert_custom_tab() {
        let (store, _temp) = create_test_store();

        let conn = store.connection().unwrap();
        store
            .insert_tab(&conn, "Reports", "reports", &["owner", "admin"])
            .unwrap();

        let tabs = store.all_tabs().unwrap();
        let reports = tabs.iter().find(|t| t.uisref == "reports").unwrap();
        assert_eq!(
            reports.visible_roles,
            vec![Role::new("admin"), Role::new("owner")]
        );
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let (store, temp) = create_test_store();
        drop(store);

        // Re-open over the same file; seeds must not duplicate.
        let store = ContentStore::new(temp.path().to_str().unwrap()).unwrap();
        assert_eq!(store.all_tabs().unwrap().len(), 3);
        assert_eq!(store.all_pages().unwrap().len(), 3);
    }
}
