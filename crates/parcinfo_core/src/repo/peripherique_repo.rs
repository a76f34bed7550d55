//! Peripherique repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `peripheriques` and its comment set.
//! - Map the `Rattachement` enum onto two nullable FK columns.
//!
//! # Invariants
//! - `save_peripherique` rewrites the row and the full comment set in one
//!   transaction.
//! - Rows with both `ordinateur_id` and `objet_nomade_id` set are rejected
//!   on read (the schema `CHECK` also forbids them on write).

use crate::model::appareil::AppareilId;
use crate::model::peripherique::{
    NewPeripherique, Peripherique, PeripheriqueId, Rattachement, TypePeripherique,
};
use crate::model::validation::positive_id;
use crate::repo::{bool_to_int, int_to_bool, row_exists, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

const PERIPHERIQUE_SELECT_SQL: &str = "SELECT
    id,
    type,
    appareil_id,
    ordinateur_id,
    objet_nomade_id,
    actif
FROM peripheriques";

/// Query options for listing peripherals.
///
/// Filters combine with `AND`; `Default` lists everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeripheriqueListQuery {
    pub kind: Option<TypePeripherique>,
    pub actif: Option<bool>,
    /// `Some(true)`: active and unattached only.
    pub disponible: Option<bool>,
    pub appareil_id: Option<AppareilId>,
}

/// Repository interface for peripheral persistence.
pub trait PeripheriqueRepository {
    fn create_peripherique(&self, new: &NewPeripherique) -> RepoResult<PeripheriqueId>;
    /// Persists every mutable field, including the comment set.
    fn save_peripherique(&self, peripherique: &Peripherique) -> RepoResult<()>;
    fn get_peripherique(&self, id: PeripheriqueId) -> RepoResult<Option<Peripherique>>;
    fn list_peripheriques(&self, query: &PeripheriqueListQuery) -> RepoResult<Vec<Peripherique>>;
    fn delete_peripherique(&self, id: PeripheriqueId) -> RepoResult<()>;
}

/// SQLite-backed peripheral repository.
pub struct SqlitePeripheriqueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePeripheriqueRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PeripheriqueRepository for SqlitePeripheriqueRepository<'_> {
    fn create_peripherique(&self, new: &NewPeripherique) -> RepoResult<PeripheriqueId> {
        positive_id("appareil_id", new.appareil_id)?;
        if !row_exists(self.conn, "appareils", new.appareil_id)? {
            return Err(RepoError::not_found("appareil", new.appareil_id));
        }

        self.conn.execute(
            "INSERT INTO peripheriques (type, appareil_id, actif) VALUES (?1, ?2, ?3);",
            params![new.kind.as_db(), new.appareil_id, bool_to_int(new.actif)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn save_peripherique(&self, peripherique: &Peripherique) -> RepoResult<()> {
        positive_id("appareil_id", peripherique.appareil_id)?;
        let (ordinateur_id, objet_nomade_id) = rattachement_to_columns(peripherique.rattachement);

        // Repositories borrow `&Connection`; no other transaction is open on it.
        let tx = self.conn.unchecked_transaction()?;
        for appareil_id in [Some(peripherique.appareil_id), ordinateur_id, objet_nomade_id]
            .into_iter()
            .flatten()
        {
            if !row_exists(&tx, "appareils", appareil_id)? {
                return Err(RepoError::not_found("appareil", appareil_id));
            }
        }

        let changed = tx.execute(
            "UPDATE peripheriques
             SET
                type = ?1,
                appareil_id = ?2,
                ordinateur_id = ?3,
                objet_nomade_id = ?4,
                actif = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                peripherique.kind.as_db(),
                peripherique.appareil_id,
                ordinateur_id,
                objet_nomade_id,
                bool_to_int(peripherique.actif),
                peripherique.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("peripherique", peripherique.id));
        }

        tx.execute(
            "DELETE FROM peripherique_commentaires WHERE peripherique_id = ?1;",
            [peripherique.id],
        )?;
        for commentaire in &peripherique.commentaires {
            tx.execute(
                "INSERT INTO peripherique_commentaires (peripherique_id, commentaire)
                 VALUES (?1, ?2);",
                params![peripherique.id, commentaire],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_peripherique(&self, id: PeripheriqueId) -> RepoResult<Option<Peripherique>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIPHERIQUE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut peripherique = parse_peripherique_row(row)?;
            peripherique.commentaires = load_commentaires(self.conn, peripherique.id)?;
            return Ok(Some(peripherique));
        }
        Ok(None)
    }

    fn list_peripheriques(&self, query: &PeripheriqueListQuery) -> RepoResult<Vec<Peripherique>> {
        let mut sql = format!("{PERIPHERIQUE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_db().to_string()));
        }
        if let Some(actif) = query.actif {
            sql.push_str(" AND actif = ?");
            bind_values.push(Value::Integer(bool_to_int(actif)));
        }
        match query.disponible {
            Some(true) => sql.push_str(
                " AND actif = 1 AND ordinateur_id IS NULL AND objet_nomade_id IS NULL",
            ),
            Some(false) => sql.push_str(
                " AND (actif = 0 OR ordinateur_id IS NOT NULL OR objet_nomade_id IS NOT NULL)",
            ),
            None => {}
        }
        if let Some(appareil_id) = query.appareil_id {
            sql.push_str(" AND appareil_id = ?");
            bind_values.push(Value::Integer(appareil_id));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut peripheriques = Vec::new();
        while let Some(row) = rows.next()? {
            let mut peripherique = parse_peripherique_row(row)?;
            peripherique.commentaires = load_commentaires(self.conn, peripherique.id)?;
            peripheriques.push(peripherique);
        }
        Ok(peripheriques)
    }

    fn delete_peripherique(&self, id: PeripheriqueId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM peripheriques WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("peripherique", id));
        }
        Ok(())
    }
}

fn parse_peripherique_row(row: &Row<'_>) -> RepoResult<Peripherique> {
    let id: PeripheriqueId = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = TypePeripherique::parse_db(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid type `{type_text}` in peripheriques.type"))
    })?;

    let ordinateur_id: Option<AppareilId> = row.get("ordinateur_id")?;
    let objet_nomade_id: Option<AppareilId> = row.get("objet_nomade_id")?;
    let rattachement = match (ordinateur_id, objet_nomade_id) {
        (None, None) => Rattachement::Aucun,
        (Some(id), None) => Rattachement::Ordinateur(id),
        (None, Some(id)) => Rattachement::ObjetNomade(id),
        (Some(_), Some(_)) => {
            return Err(RepoError::InvalidData(format!(
                "peripherique {id} is attached to both an ordinateur and an objet nomade"
            )));
        }
    };

    Ok(Peripherique {
        id,
        kind,
        appareil_id: row.get("appareil_id")?,
        rattachement,
        actif: int_to_bool("peripheriques", "actif", row.get("actif")?)?,
        commentaires: BTreeSet::new(),
    })
}

fn rattachement_to_columns(rattachement: Rattachement) -> (Option<AppareilId>, Option<AppareilId>) {
    match rattachement {
        Rattachement::Aucun => (None, None),
        Rattachement::Ordinateur(id) => (Some(id), None),
        Rattachement::ObjetNomade(id) => (None, Some(id)),
    }
}

fn load_commentaires(conn: &Connection, id: PeripheriqueId) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT commentaire
         FROM peripherique_commentaires
         WHERE peripherique_id = ?1;",
    )?;
    let commentaires = stmt
        .query_map([id], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(commentaires)
}
