use chrono::NaiveDate;
use parcinfo_core::db::open_db_in_memory;
use parcinfo_core::{
    AppareilCategorie, AppareilInput, AppareilRepository, PersonneInput, PersonneRepository,
    PersonneService, PersonneServiceError, RepoError, SqliteAppareilRepository,
    SqlitePersonneRepository, ValidationError,
};

fn sample_input() -> PersonneInput {
    let mut input = PersonneInput::new("Lagaffe", "Gaston");
    input.adresse = Some("12 rue de Champignac".to_string());
    input.telephone = Some("+33 6 12 34 56 78".to_string());
    input.date_naissance = NaiveDate::from_ymd_opt(1957, 2, 28);
    input
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonneRepository::new(&conn);

    let id = repo.create_personne(&sample_input()).unwrap();
    let loaded = repo.get_personne(id).unwrap().unwrap();

    assert_eq!(loaded.nom, "Lagaffe");
    assert_eq!(loaded.prenom, "Gaston");
    assert_eq!(loaded.adresse.as_deref(), Some("12 rue de Champignac"));
    assert_eq!(loaded.telephone.as_deref(), Some("+33 6 12 34 56 78"));
    assert_eq!(loaded.date_naissance, NaiveDate::from_ymd_opt(1957, 2, 28));
    assert!(loaded.appareils.is_empty());
    assert_eq!(loaded.full_name(), "Gaston Lagaffe");
}

#[test]
fn create_stores_blank_optionals_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonneRepository::new(&conn);

    let mut input = PersonneInput::new("Prunelle", "Léon");
    input.adresse = Some("   ".to_string());
    let id = repo.create_personne(&input).unwrap();

    let adresse: Option<String> = conn
        .query_row("SELECT adresse FROM personnes WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(adresse, None);
}

#[test]
fn create_rejects_invalid_telephone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonneRepository::new(&conn);

    let mut input = PersonneInput::new("Fantasio", "Jean");
    input.telephone = Some("appelle-moi".to_string());
    let err = repo.create_personne(&input).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidTelephone(_))
    ));
}

#[test]
fn update_and_missing_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonneRepository::new(&conn);
    let id = repo.create_personne(&sample_input()).unwrap();

    let mut input = sample_input();
    input.adresse = None;
    input.prenom = "G.".to_string();
    repo.update_personne(id, &input).unwrap();

    let loaded = repo.get_personne(id).unwrap().unwrap();
    assert_eq!(loaded.prenom, "G.");
    assert_eq!(loaded.adresse, None);

    assert!(repo.update_personne(id + 1, &input).unwrap_err().is_not_found());
}

#[test]
fn list_is_sorted_by_nom_then_prenom() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonneRepository::new(&conn);
    repo.create_personne(&PersonneInput::new("martin", "Zoé"))
        .unwrap();
    repo.create_personne(&PersonneInput::new("Durand", "Paul"))
        .unwrap();
    repo.create_personne(&PersonneInput::new("Martin", "Anne"))
        .unwrap();

    let names = repo
        .list_personnes()
        .unwrap()
        .into_iter()
        .map(|p| p.full_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Paul Durand", "Anne Martin", "Zoé martin"]);
}

#[test]
fn set_appareils_replaces_whole_set() {
    let conn = open_db_in_memory().unwrap();
    let personnes = SqlitePersonneRepository::new(&conn);
    let appareils = SqliteAppareilRepository::new(&conn);

    let id = personnes.create_personne(&sample_input()).unwrap();
    let pc = appareils
        .create_appareil(&AppareilInput::new("PC", AppareilCategorie::Ordinateur))
        .unwrap();
    let tel = appareils
        .create_appareil(&AppareilInput::new("Téléphone", AppareilCategorie::ObjetNomade))
        .unwrap();

    personnes.set_personne_appareils(id, &[tel, pc]).unwrap();
    assert_eq!(
        personnes.get_personne(id).unwrap().unwrap().appareils,
        vec![pc, tel]
    );

    personnes.set_personne_appareils(id, &[tel]).unwrap();
    let loaded = personnes.get_personne(id).unwrap().unwrap();
    assert_eq!(loaded.appareils, vec![tel]);
    assert!(loaded.owns(tel));
    assert!(!loaded.owns(pc));

    personnes.set_personne_appareils(id, &[]).unwrap();
    assert!(personnes
        .get_personne(id)
        .unwrap()
        .unwrap()
        .appareils
        .is_empty());
}

#[test]
fn set_appareils_with_unknown_device_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let personnes = SqlitePersonneRepository::new(&conn);
    let appareils = SqliteAppareilRepository::new(&conn);

    let id = personnes.create_personne(&sample_input()).unwrap();
    let pc = appareils
        .create_appareil(&AppareilInput::new("PC", AppareilCategorie::Ordinateur))
        .unwrap();
    personnes.set_personne_appareils(id, &[pc]).unwrap();

    let err = personnes
        .set_personne_appareils(id, &[pc + 50])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "appareil",
            ..
        }
    ));
    assert_eq!(
        personnes.get_personne(id).unwrap().unwrap().appareils,
        vec![pc]
    );
}

#[test]
fn delete_removes_person_and_links() {
    let conn = open_db_in_memory().unwrap();
    let personnes = SqlitePersonneRepository::new(&conn);
    let appareils = SqliteAppareilRepository::new(&conn);

    let id = personnes.create_personne(&sample_input()).unwrap();
    let pc = appareils
        .create_appareil(&AppareilInput::new("PC", AppareilCategorie::Ordinateur))
        .unwrap();
    personnes.set_personne_appareils(id, &[pc]).unwrap();

    personnes.delete_personne(id).unwrap();
    assert!(personnes.get_personne(id).unwrap().is_none());
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM personne_appareils;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
    assert!(appareils.get_appareil(pc).unwrap().is_some());

    assert!(personnes.delete_personne(id).unwrap_err().is_not_found());
}

#[test]
fn invalid_stored_date_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO personnes (nom, prenom, date_naissance) VALUES ('A', 'B', '28/02/1957');",
        [],
    )
    .unwrap();
    let repo = SqlitePersonneRepository::new(&conn);

    let err = repo.list_personnes().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn service_maps_not_found_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = PersonneService::new(SqlitePersonneRepository::new(&conn));

    assert!(matches!(
        service.get_personne(404),
        Err(PersonneServiceError::PersonneNotFound(404))
    ));
    assert!(matches!(
        service.affect_appareils(404, &[]),
        Err(PersonneServiceError::PersonneNotFound(404))
    ));

    let created = service.create_personne(&sample_input()).unwrap();
    assert!(matches!(
        service.affect_appareils(created.id, &[77]),
        Err(PersonneServiceError::AppareilNotFound(77))
    ));
    assert!(matches!(
        service.affect_appareils(created.id, &[0]),
        Err(PersonneServiceError::Validation(
            ValidationError::InvalidIdentifier { .. }
        ))
    ));
}

#[test]
fn service_affect_deduplicates_ids() {
    let conn = open_db_in_memory().unwrap();
    let appareils = SqliteAppareilRepository::new(&conn);
    let service = PersonneService::new(SqlitePersonneRepository::new(&conn));

    let pc = appareils
        .create_appareil(&AppareilInput::new("PC", AppareilCategorie::Ordinateur))
        .unwrap();
    let created = service.create_personne(&sample_input()).unwrap();

    let updated = service.affect_appareils(created.id, &[pc, pc, pc]).unwrap();
    assert_eq!(updated.appareils, vec![pc]);

    let renamed = service
        .update_personne(created.id, &PersonneInput::new("Lagaffe", "M'enfin"))
        .unwrap();
    assert_eq!(renamed.prenom, "M'enfin");
    assert_eq!(renamed.appareils, vec![pc]);

    service.delete_personne(created.id).unwrap();
    assert!(service.list_personnes().unwrap().is_empty());
}
