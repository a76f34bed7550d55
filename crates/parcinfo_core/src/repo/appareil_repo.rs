//! Appareil repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A device owning peripherals cannot be deleted (`RepoError::InUse`).
//! - A device that is an attachment target keeps its category
//!   (`RepoError::InUse`) until those peripherals are detached.
//! - Deleting a device removes its ownership links.

use crate::model::appareil::{Appareil, AppareilCategorie, AppareilId, AppareilInput};
use crate::repo::{row_exists, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const APPAREIL_SELECT_SQL: &str = "SELECT id, libelle, categorie FROM appareils";

/// Query options for listing devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppareilListQuery {
    pub categorie: Option<AppareilCategorie>,
}

/// Repository interface for device CRUD operations.
pub trait AppareilRepository {
    fn create_appareil(&self, input: &AppareilInput) -> RepoResult<AppareilId>;
    fn update_appareil(&self, id: AppareilId, input: &AppareilInput) -> RepoResult<()>;
    fn get_appareil(&self, id: AppareilId) -> RepoResult<Option<Appareil>>;
    fn list_appareils(&self, query: &AppareilListQuery) -> RepoResult<Vec<Appareil>>;
    fn delete_appareil(&self, id: AppareilId) -> RepoResult<()>;
}

/// SQLite-backed device repository.
pub struct SqliteAppareilRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppareilRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AppareilRepository for SqliteAppareilRepository<'_> {
    fn create_appareil(&self, input: &AppareilInput) -> RepoResult<AppareilId> {
        let input = input.validate()?;
        self.conn.execute(
            "INSERT INTO appareils (libelle, categorie) VALUES (?1, ?2);",
            params![input.libelle, input.categorie.as_db()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_appareil(&self, id: AppareilId, input: &AppareilInput) -> RepoResult<()> {
        let input = input.validate()?;
        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT categorie FROM appareils WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(RepoError::not_found("appareil", id));
        };

        if current != input.categorie.as_db() {
            let attached: u32 = self.conn.query_row(
                "SELECT COUNT(*) FROM peripheriques
                 WHERE ordinateur_id = ?1 OR objet_nomade_id = ?1;",
                [id],
                |row| row.get(0),
            )?;
            if attached > 0 {
                return Err(RepoError::InUse {
                    entity: "appareil",
                    id,
                    dependents: attached,
                });
            }
        }

        self.conn.execute(
            "UPDATE appareils
             SET
                libelle = ?1,
                categorie = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![input.libelle, input.categorie.as_db(), id],
        )?;
        Ok(())
    }

    fn get_appareil(&self, id: AppareilId) -> RepoResult<Option<Appareil>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPAREIL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut appareil = parse_appareil_row(row)?;
            appareil.proprietaires = load_proprietaires(self.conn, appareil.id)?;
            return Ok(Some(appareil));
        }
        Ok(None)
    }

    fn list_appareils(&self, query: &AppareilListQuery) -> RepoResult<Vec<Appareil>> {
        let mut sql = format!("{APPAREIL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(categorie) = query.categorie {
            sql.push_str(" AND categorie = ?");
            bind_values.push(Value::Text(categorie.as_db().to_string()));
        }
        sql.push_str(" ORDER BY libelle COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut appareils = Vec::new();
        while let Some(row) = rows.next()? {
            let mut appareil = parse_appareil_row(row)?;
            appareil.proprietaires = load_proprietaires(self.conn, appareil.id)?;
            appareils.push(appareil);
        }
        Ok(appareils)
    }

    fn delete_appareil(&self, id: AppareilId) -> RepoResult<()> {
        if !row_exists(self.conn, "appareils", id)? {
            return Err(RepoError::not_found("appareil", id));
        }

        let dependents: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM peripheriques WHERE appareil_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        if dependents > 0 {
            return Err(RepoError::InUse {
                entity: "appareil",
                id,
                dependents,
            });
        }

        self.conn
            .execute("DELETE FROM appareils WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_appareil_row(row: &Row<'_>) -> RepoResult<Appareil> {
    let categorie_text: String = row.get("categorie")?;
    let categorie = AppareilCategorie::parse_db(&categorie_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid categorie `{categorie_text}` in appareils.categorie"
        ))
    })?;

    Ok(Appareil {
        id: row.get("id")?,
        libelle: row.get("libelle")?,
        categorie,
        proprietaires: Vec::new(),
    })
}

fn load_proprietaires(conn: &Connection, appareil_id: AppareilId) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT personne_id
         FROM personne_appareils
         WHERE appareil_id = ?1
         ORDER BY personne_id ASC;",
    )?;
    let ids = stmt
        .query_map([appareil_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}
