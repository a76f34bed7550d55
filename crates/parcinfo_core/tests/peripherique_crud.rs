use parcinfo_core::db::open_db_in_memory;
use parcinfo_core::{
    AppareilCategorie, AppareilId, AppareilInput, AppareilRepository, AttachmentError,
    NewPeripherique, PeripheriqueListQuery, PeripheriqueRepository, PeripheriqueService,
    PeripheriqueServiceError, PeripheriqueUpdate, Rattachement, RepoError,
    SqliteAppareilRepository, SqlitePeripheriqueRepository, TypePeripherique,
};
use rusqlite::Connection;

fn add_appareil(conn: &Connection, libelle: &str, categorie: AppareilCategorie) -> AppareilId {
    SqliteAppareilRepository::new(conn)
        .create_appareil(&AppareilInput::new(libelle, categorie))
        .unwrap()
}

fn service(
    conn: &Connection,
) -> PeripheriqueService<SqlitePeripheriqueRepository<'_>, SqliteAppareilRepository<'_>> {
    PeripheriqueService::new(
        SqlitePeripheriqueRepository::new(conn),
        SqliteAppareilRepository::new(conn),
    )
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let repo = SqlitePeripheriqueRepository::new(&conn);

    let id = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Ecran, pc))
        .unwrap();
    let loaded = repo.get_peripherique(id).unwrap().unwrap();

    assert_eq!(loaded.kind, TypePeripherique::Ecran);
    assert_eq!(loaded.appareil_id, pc);
    assert_eq!(loaded.rattachement, Rattachement::Aucun);
    assert!(loaded.actif);
    assert!(loaded.is_available());
    assert!(loaded.commentaires.is_empty());
}

#[test]
fn create_requires_existing_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePeripheriqueRepository::new(&conn);

    let err = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Souris, 12))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "appareil",
            id: 12
        }
    ));

    let err = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Souris, 0))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn save_persists_attachment_flag_and_comments() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let repo = SqlitePeripheriqueRepository::new(&conn);
    let id = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Clavier, pc))
        .unwrap();

    let mut peripherique = repo.get_peripherique(id).unwrap().unwrap();
    peripherique.attach_to_ordinateur(pc).unwrap();
    peripherique.set_actif(false);
    peripherique.add_commentaire("touche A cassée");
    peripherique.add_commentaire("  prêté au support  ");
    repo.save_peripherique(&peripherique).unwrap();

    let loaded = repo.get_peripherique(id).unwrap().unwrap();
    assert_eq!(loaded.rattachement, Rattachement::Ordinateur(pc));
    assert!(!loaded.actif);
    assert!(loaded.commentaires.contains("touche A cassée"));
    assert!(loaded.commentaires.contains("prêté au support"));

    let mut peripherique = loaded;
    peripherique.remove_commentaire("touche A cassée");
    peripherique.detach();
    repo.save_peripherique(&peripherique).unwrap();

    let loaded = repo.get_peripherique(id).unwrap().unwrap();
    assert_eq!(loaded.rattachement, Rattachement::Aucun);
    assert_eq!(loaded.commentaires.len(), 1);
}

#[test]
fn save_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let repo = SqlitePeripheriqueRepository::new(&conn);

    let ghost = parcinfo_core::Peripherique::new(99, TypePeripherique::Cable, pc);
    assert!(repo.save_peripherique(&ghost).unwrap_err().is_not_found());
}

#[test]
fn list_filters_by_type_actif_and_disponible() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let repo = SqlitePeripheriqueRepository::new(&conn);

    let souris = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Souris, pc))
        .unwrap();
    let mut inactive = NewPeripherique::new(TypePeripherique::Souris, pc);
    inactive.actif = false;
    let souris_hs = repo.create_peripherique(&inactive).unwrap();
    let casque = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Casque, pc))
        .unwrap();

    let mut attached = repo.get_peripherique(casque).unwrap().unwrap();
    attached.attach_to_ordinateur(pc).unwrap();
    repo.save_peripherique(&attached).unwrap();

    let ids = |query: PeripheriqueListQuery| {
        repo.list_peripheriques(&query)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        ids(PeripheriqueListQuery {
            kind: Some(TypePeripherique::Souris),
            ..PeripheriqueListQuery::default()
        }),
        vec![souris, souris_hs]
    );
    assert_eq!(
        ids(PeripheriqueListQuery {
            kind: Some(TypePeripherique::Souris),
            actif: Some(true),
            ..PeripheriqueListQuery::default()
        }),
        vec![souris]
    );
    assert_eq!(
        ids(PeripheriqueListQuery {
            disponible: Some(true),
            ..PeripheriqueListQuery::default()
        }),
        vec![souris]
    );
    assert_eq!(
        ids(PeripheriqueListQuery {
            disponible: Some(false),
            ..PeripheriqueListQuery::default()
        }),
        vec![souris_hs, casque]
    );
    assert_eq!(ids(PeripheriqueListQuery::default()).len(), 3);
}

#[test]
fn deleting_attachment_target_clears_attachment() {
    let conn = open_db_in_memory().unwrap();
    let owner = add_appareil(&conn, "Stock", AppareilCategorie::Autre);
    let tablette = add_appareil(&conn, "Tablette", AppareilCategorie::ObjetNomade);
    let repo = SqlitePeripheriqueRepository::new(&conn);
    let id = repo
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Casque, owner))
        .unwrap();

    let mut peripherique = repo.get_peripherique(id).unwrap().unwrap();
    peripherique.attach_to_objet_nomade(tablette).unwrap();
    repo.save_peripherique(&peripherique).unwrap();

    SqliteAppareilRepository::new(&conn)
        .delete_appareil(tablette)
        .unwrap();
    let loaded = repo.get_peripherique(id).unwrap().unwrap();
    assert_eq!(loaded.rattachement, Rattachement::Aucun);
}

#[test]
fn delete_removes_comments() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let service = service(&conn);
    let created = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Imprimante, pc))
        .unwrap();
    service.add_commentaire(created.id, "bourrage papier").unwrap();

    service.delete_peripherique(created.id).unwrap();
    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM peripherique_commentaires;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(matches!(
        service.delete_peripherique(created.id),
        Err(PeripheriqueServiceError::PeripheriqueNotFound(_))
    ));
}

#[test]
fn service_first_attach_records_optional_comment() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC-01", AppareilCategorie::Ordinateur);
    let service = service(&conn);
    let id = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Souris, pc))
        .unwrap()
        .id;

    let attached = service
        .attach(id, Rattachement::Ordinateur(pc), Some("poste accueil"))
        .unwrap();
    assert!(attached.is_attached_to_ordinateur());
    assert!(attached
        .commentaires
        .contains(&format!("Affectation Ordinateur #{pc} : poste accueil")));

    let again = service.attach(id, Rattachement::Ordinateur(pc), None).unwrap();
    assert_eq!(again.commentaires.len(), 1);
}

#[test]
fn service_reassignment_requires_comment() {
    let conn = open_db_in_memory().unwrap();
    let pc1 = add_appareil(&conn, "PC-01", AppareilCategorie::Ordinateur);
    let pc2 = add_appareil(&conn, "PC-02", AppareilCategorie::Ordinateur);
    let service = service(&conn);
    let id = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Ecran, pc1))
        .unwrap()
        .id;
    service.attach(id, Rattachement::Ordinateur(pc1), None).unwrap();

    let err = service
        .attach(id, Rattachement::Ordinateur(pc2), Some("   "))
        .unwrap_err();
    assert!(matches!(
        err,
        PeripheriqueServiceError::ReassignmentRequiresComment(_)
    ));
    assert_eq!(
        service.get_peripherique(id).unwrap().rattachement,
        Rattachement::Ordinateur(pc1)
    );

    let moved = service
        .attach(id, Rattachement::Ordinateur(pc2), Some("déménagement"))
        .unwrap();
    assert_eq!(moved.rattachement, Rattachement::Ordinateur(pc2));
    assert!(moved.commentaires.contains(&format!(
        "Réaffectation Ordinateur #{pc1} -> Ordinateur #{pc2} : déménagement"
    )));
}

#[test]
fn service_rejects_family_switch_and_wrong_category() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let tablette = add_appareil(&conn, "Tablette", AppareilCategorie::ObjetNomade);
    let service = service(&conn);
    let id = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Casque, pc))
        .unwrap()
        .id;

    let err = service
        .attach(id, Rattachement::Ordinateur(tablette), None)
        .unwrap_err();
    assert!(matches!(
        err,
        PeripheriqueServiceError::WrongCategorie {
            expected: AppareilCategorie::Ordinateur,
            actual: AppareilCategorie::ObjetNomade,
            ..
        }
    ));

    let err = service
        .attach(id, Rattachement::ObjetNomade(999), None)
        .unwrap_err();
    assert!(matches!(err, PeripheriqueServiceError::AppareilNotFound(999)));

    service.attach(id, Rattachement::Ordinateur(pc), None).unwrap();
    let err = service
        .attach(id, Rattachement::ObjetNomade(tablette), Some("mobilité"))
        .unwrap_err();
    assert!(matches!(
        err,
        PeripheriqueServiceError::Attachment(AttachmentError::AlreadyAttachedToOrdinateur(_))
    ));

    service.detach(id, None).unwrap();
    let moved = service
        .attach(id, Rattachement::ObjetNomade(tablette), None)
        .unwrap();
    assert!(moved.is_attached_to_objet_nomade());
}

#[test]
fn service_detach_records_comment_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let tablette = add_appareil(&conn, "Tablette", AppareilCategorie::ObjetNomade);
    let service = service(&conn);
    let id = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Cable, tablette))
        .unwrap()
        .id;
    service
        .attach(id, Rattachement::ObjetNomade(tablette), None)
        .unwrap();

    let detached = service.detach(id, Some("retour stock")).unwrap();
    assert!(detached.is_available());
    assert!(detached
        .commentaires
        .contains(&format!("Désaffectation Objet Nomade #{tablette} : retour stock")));

    let again = service.detach(id, Some("encore")).unwrap();
    assert_eq!(again.commentaires.len(), 1);

    let via_attach = service.attach(id, Rattachement::Aucun, None).unwrap();
    assert_eq!(via_attach.rattachement, Rattachement::Aucun);
}

#[test]
fn service_update_actif_and_comments() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    let stock = add_appareil(&conn, "Stock", AppareilCategorie::Autre);
    let service = service(&conn);
    let id = service
        .create_peripherique(&NewPeripherique::new(TypePeripherique::Souris, pc))
        .unwrap()
        .id;

    let updated = service
        .update_peripherique(
            id,
            &PeripheriqueUpdate {
                kind: TypePeripherique::Clavier,
                appareil_id: stock,
            },
        )
        .unwrap();
    assert!(updated.is_of_type(TypePeripherique::Clavier));
    assert_eq!(updated.appareil_id, stock);

    let err = service
        .update_peripherique(
            id,
            &PeripheriqueUpdate {
                kind: TypePeripherique::Clavier,
                appareil_id: 404,
            },
        )
        .unwrap_err();
    assert!(matches!(err, PeripheriqueServiceError::AppareilNotFound(404)));

    assert!(!service.set_actif(id, false).unwrap().actif);
    assert!(service.find_actifs().unwrap().is_empty());
    assert!(service.find_disponibles().unwrap().is_empty());
    assert!(service.set_actif(id, true).unwrap().actif);
    assert_eq!(service.find_disponibles().unwrap().len(), 1);
    assert_eq!(service.find_by_type(TypePeripherique::Clavier).unwrap().len(), 1);

    let blank = service.add_commentaire(id, "  ").unwrap();
    assert!(blank.commentaires.is_empty());
    service.add_commentaire(id, "neuf").unwrap();
    let removed = service.remove_commentaire(id, "neuf").unwrap();
    assert!(removed.commentaires.is_empty());

    assert!(matches!(
        service.get_peripherique(404),
        Err(PeripheriqueServiceError::PeripheriqueNotFound(404))
    ));
}

#[test]
fn reading_doubly_attached_row_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let pc = add_appareil(&conn, "PC", AppareilCategorie::Ordinateur);
    conn.execute(
        "INSERT INTO peripheriques (type, appareil_id) VALUES ('souris', ?1);",
        [pc],
    )
    .unwrap();
    // Bypass the table CHECK to simulate a corrupted row.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE peripheriques SET ordinateur_id = 1, objet_nomade_id = 1;
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();

    let err = SqlitePeripheriqueRepository::new(&conn)
        .list_peripheriques(&PeripheriqueListQuery::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
