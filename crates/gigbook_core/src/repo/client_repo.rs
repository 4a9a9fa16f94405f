//! Client repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `clients` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Client::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::client::{Client, ClientId, ClientStatus};
use crate::repo::{
    ensure_schema_ready, parse_uuid, push_page, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CLIENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    phone,
    company,
    notes,
    status,
    payment_terms_days
FROM clients";

const CLIENT_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "email",
    "phone",
    "company",
    "notes",
    "status",
    "payment_terms_days",
    "updated_at",
];

/// Query options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    pub status: Option<ClientStatus>,
    /// Case-insensitive substring match on name, e-mail, or company.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for client CRUD operations.
pub trait ClientRepository {
    fn create_client(&self, client: &Client) -> RepoResult<ClientId>;
    fn update_client(&self, client: &Client) -> RepoResult<()>;
    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>>;
    fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>>;
    fn delete_client(&self, id: ClientId) -> RepoResult<()>;
}

/// SQLite-backed client repository.
#[derive(Debug)]
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "clients", CLIENT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn create_client(&self, client: &Client) -> RepoResult<ClientId> {
        client.validate()?;

        self.conn.execute(
            "INSERT INTO clients (
                uuid,
                name,
                email,
                phone,
                company,
                notes,
                status,
                payment_terms_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                client.uuid.to_string(),
                client.name.as_str(),
                client.email.as_str(),
                client.phone.as_deref(),
                client.company.as_deref(),
                client.notes.as_deref(),
                client_status_to_db(client.status),
                client.payment_terms_days,
            ],
        )?;

        Ok(client.uuid)
    }

    fn update_client(&self, client: &Client) -> RepoResult<()> {
        client.validate()?;

        let changed = self.conn.execute(
            "UPDATE clients
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                company = ?4,
                notes = ?5,
                status = ?6,
                payment_terms_days = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                client.name.as_str(),
                client.email.as_str(),
                client.phone.as_deref(),
                client.company.as_deref(),
                client.notes.as_deref(),
                client_status_to_db(client.status),
                client.payment_terms_days,
                client.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("client", client.uuid));
        }

        Ok(())
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_client_row(row)?));
        }

        Ok(None)
    }

    fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>> {
        let mut sql = format!("{CLIENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(client_status_to_db(status).to_string()));
        }

        if let Some(search) = query.search.as_deref() {
            sql.push_str(
                " AND (name LIKE ? COLLATE NOCASE
                   OR email LIKE ? COLLATE NOCASE
                   OR company LIKE ? COLLATE NOCASE)",
            );
            let pattern = format!("%{search}%");
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, uuid ASC");
        push_page(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }

        Ok(clients)
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("client", id));
        }

        Ok(())
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status")?;
    let payment_terms: i64 = row.get("payment_terms_days")?;

    Ok(Client {
        uuid: parse_uuid(&uuid_text, "clients.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        company: row.get("company")?,
        notes: row.get("notes")?,
        status: parse_client_status(&status_text)?,
        payment_terms_days: u32::try_from(payment_terms).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid payment terms `{payment_terms}` in clients.payment_terms_days"
            ))
        })?,
    })
}

fn client_status_to_db(status: ClientStatus) -> &'static str {
    match status {
        ClientStatus::Active => "active",
        ClientStatus::Inactive => "inactive",
        ClientStatus::Prospect => "prospect",
    }
}

fn parse_client_status(value: &str) -> RepoResult<ClientStatus> {
    match value {
        "active" => Ok(ClientStatus::Active),
        "inactive" => Ok(ClientStatus::Inactive),
        "prospect" => Ok(ClientStatus::Prospect),
        other => Err(RepoError::InvalidData(format!(
            "invalid client status `{other}` in clients.status"
        ))),
    }
}
