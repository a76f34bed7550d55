//! Personne repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `personnes`.
//! - Own device assignment replacement (`set_personne_appareils`) with
//!   atomic semantics.
//!
//! # Invariants
//! - Assignment replacement is all-or-nothing: an unknown device id aborts
//!   the whole transaction.
//! - Deleting a person removes its assignment links (FK cascade).

use crate::model::appareil::AppareilId;
use crate::model::personne::{Personne, PersonneId, PersonneInput};
use crate::repo::{row_exists, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const PERSONNE_SELECT_SQL: &str = "SELECT
    id,
    nom,
    prenom,
    adresse,
    telephone,
    date_naissance
FROM personnes";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for person CRUD and device assignment.
pub trait PersonneRepository {
    fn create_personne(&self, input: &PersonneInput) -> RepoResult<PersonneId>;
    fn update_personne(&self, id: PersonneId, input: &PersonneInput) -> RepoResult<()>;
    fn get_personne(&self, id: PersonneId) -> RepoResult<Option<Personne>>;
    /// Lists persons ordered by `nom, prenom, id`.
    fn list_personnes(&self) -> RepoResult<Vec<Personne>>;
    fn delete_personne(&self, id: PersonneId) -> RepoResult<()>;
    /// Replaces the full set of devices assigned to one person.
    fn set_personne_appareils(&self, id: PersonneId, appareils: &[AppareilId]) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonneRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonneRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersonneRepository for SqlitePersonneRepository<'_> {
    fn create_personne(&self, input: &PersonneInput) -> RepoResult<PersonneId> {
        let input = input.validate()?;
        self.conn.execute(
            "INSERT INTO personnes (
                nom,
                prenom,
                adresse,
                telephone,
                date_naissance
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                input.nom,
                input.prenom,
                input.adresse,
                input.telephone,
                input.date_naissance.map(format_date),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_personne(&self, id: PersonneId, input: &PersonneInput) -> RepoResult<()> {
        let input = input.validate()?;
        let changed = self.conn.execute(
            "UPDATE personnes
             SET
                nom = ?1,
                prenom = ?2,
                adresse = ?3,
                telephone = ?4,
                date_naissance = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                input.nom,
                input.prenom,
                input.adresse,
                input.telephone,
                input.date_naissance.map(format_date),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("personne", id));
        }
        Ok(())
    }

    fn get_personne(&self, id: PersonneId) -> RepoResult<Option<Personne>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSONNE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut personne = parse_personne_row(row)?;
            personne.appareils = load_appareils(self.conn, personne.id)?;
            return Ok(Some(personne));
        }
        Ok(None)
    }

    fn list_personnes(&self) -> RepoResult<Vec<Personne>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSONNE_SELECT_SQL}
             ORDER BY nom COLLATE NOCASE ASC, prenom COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut personnes = Vec::new();
        while let Some(row) = rows.next()? {
            let mut personne = parse_personne_row(row)?;
            personne.appareils = load_appareils(self.conn, personne.id)?;
            personnes.push(personne);
        }
        Ok(personnes)
    }

    fn delete_personne(&self, id: PersonneId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM personnes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("personne", id));
        }
        Ok(())
    }

    fn set_personne_appareils(&self, id: PersonneId, appareils: &[AppareilId]) -> RepoResult<()> {
        // Repositories borrow `&Connection`; no other transaction is open on it.
        let tx = self.conn.unchecked_transaction()?;
        if !row_exists(&tx, "personnes", id)? {
            return Err(RepoError::not_found("personne", id));
        }
        for appareil_id in appareils {
            if !row_exists(&tx, "appareils", *appareil_id)? {
                return Err(RepoError::not_found("appareil", *appareil_id));
            }
        }

        tx.execute(
            "DELETE FROM personne_appareils WHERE personne_id = ?1;",
            [id],
        )?;
        for appareil_id in appareils {
            tx.execute(
                "INSERT OR IGNORE INTO personne_appareils (personne_id, appareil_id)
                 VALUES (?1, ?2);",
                params![id, appareil_id],
            )?;
        }
        tx.execute(
            "UPDATE personnes
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn parse_personne_row(row: &Row<'_>) -> RepoResult<Personne> {
    let date_naissance = match row.get::<_, Option<String>>("date_naissance")? {
        Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{text}` in personnes.date_naissance"
            ))
        })?),
        None => None,
    };

    Ok(Personne {
        id: row.get("id")?,
        nom: row.get("nom")?,
        prenom: row.get("prenom")?,
        adresse: row.get("adresse")?,
        telephone: row.get("telephone")?,
        date_naissance,
        appareils: Vec::new(),
    })
}

fn load_appareils(conn: &Connection, personne_id: PersonneId) -> RepoResult<Vec<AppareilId>> {
    let mut stmt = conn.prepare(
        "SELECT appareil_id
         FROM personne_appareils
         WHERE personne_id = ?1
         ORDER BY appareil_id ASC;",
    )?;
    let ids = stmt
        .query_map([personne_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
