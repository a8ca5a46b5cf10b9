// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use madang_app::{CustomerId, ListKind, Role};
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "madang";

pub const KEY_CUSTOMER_ID: &str = "custid";
pub const KEY_CUSTOMER_NAME: &str = "custname";
pub const KEY_CUSTOMER_ROLE: &str = "custrole";
pub const KEY_REDIRECT_AFTER_LOGIN: &str = "redirectAfterLogin";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS local_storage (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";

const REQUIRED_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

/// String key/value storage that survives restarts.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the table on first use and rejects a foreign one.
    pub fn bootstrap(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("create local_storage table")?;
        let columns = table_columns(&self.conn, "local_storage")?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !columns.iter().any(|existing| existing == column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `local_storage` is missing required columns: {}; point [storage] db_path at a madang database",
                missing.join(", ")
            );
        }
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read item {key}"))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO local_storage (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert item {key}"))?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?", params![key])
            .with_context(|| format!("remove item {key}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCustomer {
    pub custid: CustomerId,
    pub name: String,
    pub role: Role,
}

/// Outcome of a login check for a protected screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginGate {
    Allowed(CustomerId),
    LoginRequired,
}

/// The logged-in customer, kept in the store under the browser-era keys.
pub struct Session<'a> {
    store: &'a Store,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// `None` unless both id and name are stored and the id parses.
    pub fn customer(&self) -> Result<Option<SessionCustomer>> {
        let Some(raw_id) = self.store.get_item(KEY_CUSTOMER_ID)? else {
            return Ok(None);
        };
        let Some(name) = self.store.get_item(KEY_CUSTOMER_NAME)? else {
            return Ok(None);
        };
        let Ok(id) = raw_id.trim().parse::<i64>() else {
            tracing::warn!(value = %raw_id, "ignoring unparsable stored customer id");
            return Ok(None);
        };
        let role = self
            .store
            .get_item(KEY_CUSTOMER_ROLE)?
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default();
        Ok(Some(SessionCustomer {
            custid: CustomerId::new(id),
            name,
            role,
        }))
    }

    pub fn customer_id(&self) -> Result<Option<CustomerId>> {
        Ok(self.customer()?.map(|customer| customer.custid))
    }

    pub fn is_admin(&self) -> Result<bool> {
        Ok(self
            .customer()?
            .is_some_and(|customer| customer.role == Role::Admin))
    }

    pub fn set_customer(&self, custid: CustomerId, name: &str, role: Role) -> Result<()> {
        if custid.get() <= 0 {
            bail!("customer id must be positive, got {custid}");
        }
        self.store.set_item(KEY_CUSTOMER_ID, &custid.to_string())?;
        self.store.set_item(KEY_CUSTOMER_NAME, name)?;
        self.store.set_item(KEY_CUSTOMER_ROLE, role.as_str())?;
        tracing::info!(custid = custid.get(), "customer logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove_item(KEY_CUSTOMER_ID)?;
        self.store.remove_item(KEY_CUSTOMER_NAME)?;
        self.store.remove_item(KEY_CUSTOMER_ROLE)?;
        tracing::info!("customer logged out");
        Ok(())
    }

    /// Remembers `redirect` when nobody is logged in so login can return
    /// to it.
    pub fn require_login(&self, redirect: Option<ListKind>) -> Result<LoginGate> {
        if let Some(customer) = self.customer()? {
            return Ok(LoginGate::Allowed(customer.custid));
        }
        if let Some(kind) = redirect {
            self.store
                .set_item(KEY_REDIRECT_AFTER_LOGIN, kind.as_str())?;
        }
        Ok(LoginGate::LoginRequired)
    }

    /// Returns and forgets the screen saved by `require_login`.
    pub fn take_redirect_after_login(&self) -> Result<Option<ListKind>> {
        let Some(raw) = self.store.get_item(KEY_REDIRECT_AFTER_LOGIN)? else {
            return Ok(None);
        };
        self.store.remove_item(KEY_REDIRECT_AFTER_LOGIN)?;
        Ok(ListKind::parse(&raw))
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("MADANG_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set MADANG_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("madang.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("prepare table_info for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query table_info for {table}"))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
