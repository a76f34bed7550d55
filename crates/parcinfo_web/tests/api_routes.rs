use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parcinfo_web::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::in_memory().unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sends `body` verbatim with the given content type.
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_appareil(app: &Router, libelle: &str, categorie: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/appareil",
        Some(json!({ "libelle": libelle, "categorie": categorie })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(!body["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn appareil_crud_and_filters() {
    let app = app();
    let pc = create_appareil(&app, "PC-01", "ordinateur").await;
    create_appareil(&app, "Tablette", "objet_nomade").await;

    let (status, body) = send(&app, "GET", "/api/appareils?categorie=ordinateur", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["libelle"], "PC-01");

    let (status, body) = send(&app, "GET", "/api/appareils?categorie=grille-pain", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("grille-pain"));

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/appareil/{pc}"),
        Some(json!({ "libelle": "PC-01 bis", "categorie": "ordinateur" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["libelle"], "PC-01 bis");

    let (status, _) = send(
        &app,
        "POST",
        "/api/appareil",
        Some(json!({ "libelle": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "DELETE", &format!("/api/appareil/{pc}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &format!("/api/appareil/{pc}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("appareil not found: {pc}"));
}

#[tokio::test]
async fn personne_crud_and_affectation() {
    let app = app();
    let pc = create_appareil(&app, "PC-01", "ordinateur").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/personne",
        Some(json!({ "nom": "", "prenom": "Gaston" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("nom"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/personne",
        Some(json!({
            "nom": "Lagaffe",
            "prenom": "Gaston",
            "telephone": "01 23 45 67 89",
            "date_naissance": "1957-02-28"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["date_naissance"], "1957-02-28");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/personne/{id}/appareils"),
        Some(json!({ "appareils": [pc, pc] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appareils"], json!([pc]));

    let (status, body) = send(&app, "GET", &format!("/api/personne/{id}/appareils"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], pc);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/personne/{id}/appareils"),
        Some(json!({ "appareils": [pc + 40] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/personnes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/personne/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/personne/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn peripherique_lifecycle() {
    let app = app();
    let pc1 = create_appareil(&app, "PC-01", "ordinateur").await;
    let pc2 = create_appareil(&app, "PC-02", "ordinateur").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/peripherique",
        Some(json!({ "type": "SOURIS", "appareil_id": pc1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["actif"], true);
    assert_eq!(body["rattachement"]["kind"], "aucun");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", "/api/peripheriques?type=souris", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (status, _) = send(&app, "GET", "/api/peripheriques?type=scanner", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let rattachement = format!("/api/peripherique/{id}/rattachement");
    let (status, body) = send(
        &app,
        "PUT",
        &rattachement,
        Some(json!({ "rattachement": { "kind": "ordinateur", "appareil_id": pc1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rattachement"]["appareil_id"], pc1);

    let (status, body) = send(
        &app,
        "PUT",
        &rattachement,
        Some(json!({ "rattachement": { "kind": "ordinateur", "appareil_id": pc2 } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("comment"));

    let (status, body) = send(
        &app,
        "PUT",
        &rattachement,
        Some(json!({
            "rattachement": { "kind": "ordinateur", "appareil_id": pc2 },
            "commentaire": "changement de poste"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rattachement"]["appareil_id"], pc2);
    assert_eq!(body["commentaires"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "PUT",
        &rattachement,
        Some(json!({ "rattachement": { "kind": "objet_nomade", "appareil_id": pc1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/peripherique/{id}/actif"),
        Some(json!({ "actif": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actif"], false);
    let (_, body) = send(&app, "GET", "/api/peripheriques?actif=true", None).await;
    assert!(body.as_array().unwrap().is_empty());

    let commentaires = format!("/api/peripherique/{id}/commentaires");
    let (status, body) = send(
        &app,
        "POST",
        &commentaires,
        Some(json!({ "commentaire": "écran fissuré" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commentaires"].as_array().unwrap().len(), 2);
    let (status, body) = send(
        &app,
        "DELETE",
        &commentaires,
        Some(json!({ "commentaire": "écran fissuré" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commentaires"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/appareil/{pc1}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/peripherique/{id}"),
        Some(json!({ "type": "CLAVIER", "appareil_id": pc2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "CLAVIER");

    let (status, _) = send(&app, "DELETE", &format!("/api/peripherique/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/peripherique/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn peripherique_requires_existing_owner() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/peripherique",
        Some(json!({ "type": "CABLE", "appareil_id": 77 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "appareil not found: 77");
}

#[tokio::test]
async fn undecodable_requests_answer_json_errors() {
    let app = app();
    let pc = create_appareil(&app, "PC-01", "ordinateur").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/peripherique",
        Some(json!({ "type": "WEBCAM", "appareil_id": pc })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("WEBCAM"));

    let (status, body) = send(&app, "GET", "/api/appareil/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_raw(&app, "POST", "/api/appareil", "text/plain", "libelle=PC").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) =
        send_raw(&app, "POST", "/api/appareil", "application/json", "{\"libelle\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/api/peripheriques?actif=peut-etre", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/api/imprimantes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no route for /api/imprimantes");
}

#[tokio::test]
async fn peripherique_body_accepts_labels_and_lowercase_codes() {
    let app = app();
    let pc = create_appareil(&app, "PC-01", "ordinateur").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/peripherique",
        Some(json!({ "type": "Écran", "appareil_id": pc })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "ECRAN");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/peripherique/{id}"),
        Some(json!({ "type": "souris", "appareil_id": pc })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "SOURIS");
}

#[tokio::test]
async fn attachment_target_keeps_its_categorie() {
    let app = app();
    let owner = create_appareil(&app, "Stock", "autre").await;
    let pc = create_appareil(&app, "PC-01", "ordinateur").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/peripherique",
        Some(json!({ "type": "CASQUE", "appareil_id": owner })),
    )
    .await;
    let id = body["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/peripherique/{id}/rattachement"),
        Some(json!({ "rattachement": { "kind": "ordinateur", "appareil_id": pc } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/appareil/{pc}"),
        Some(json!({ "libelle": "PC-01", "categorie": "autre" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(&format!("appareil {pc}")));
}
