//! SQLite-backed account store.
//! Reads the table Prisma generates for a `User` model: `"User"` with
//! `id`, `email`, `name` and `passwordHash` columns.
//! Used by: main, issuer tests.

use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::account::{AccountLookup, AccountRecord};
use crate::error::{lock_err, Result};

pub struct AccountStore {
    conn: Mutex<Connection>,
}

impl AccountStore {
    /// Opens an existing database read-only.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        tracing::debug!(path, "account store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (creating if needed) a writable database with the `User` table.
    #[cfg(test)]
    pub fn create(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"CREATE TABLE IF NOT EXISTS "User" (
                id PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                "passwordHash" TEXT NOT NULL
            )"#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::create(":memory:")
    }

    #[cfg(test)]
    pub fn insert_account(&self, account: &AccountRecord) -> Result<()> {
        let conn = self.conn.lock().map_err(lock_err("account store"))?;
        let id = match account.id.parse::<i64>() {
            Ok(n) => rusqlite::types::Value::Integer(n),
            Err(_) => rusqlite::types::Value::Text(account.id.clone()),
        };
        conn.execute(
            r#"INSERT INTO "User" (id, email, name, "passwordHash") VALUES (?1, ?2, ?3, ?4)"#,
            (id, &account.email, &account.name, &account.password_hash),
        )?;
        Ok(())
    }
}

impl AccountLookup for AccountStore {
    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let conn = self.conn.lock().map_err(lock_err("account store"))?;
        let mut stmt = conn.prepare(
            r#"SELECT id, email, name, "passwordHash" FROM "User" WHERE email = ?1"#,
        )?;
        let account = stmt.query_row([email], row_to_account).optional()?;
        Ok(account)
    }
}

impl Drop for AccountStore {
    fn drop(&mut self) {
        tracing::debug!("account store connection released");
    }
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<AccountRecord> {
    Ok(AccountRecord {
        id: id_to_string(row.get_ref(0)?)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

/// Ids may be stored as integers or text; both are rendered as strings.
fn id_to_string(value: ValueRef<'_>) -> rusqlite::Result<String> {
    match value {
        ValueRef::Integer(n) => Ok(n.to_string()),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(rusqlite::Error::Utf8Error),
        other => Err(rusqlite::Error::InvalidColumnType(
            0,
            "id".into(),
            other.data_type(),
        )),
    }
}
