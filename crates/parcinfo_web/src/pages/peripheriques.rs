use super::layout::{escape, option, page, post_button};
use super::{accept_form, log_rejected, redirect, FlashParams, PageResult};
use crate::error::ApiError;
use crate::pages::flash::Flash;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use parcinfo_core::{
    Appareil, AppareilCategorie, AppareilId, NewPeripherique, Peripherique, PeripheriqueId,
    PeripheriqueListQuery, PeripheriqueServiceError, PeripheriqueUpdate, Rattachement,
    TypePeripherique,
};
use serde::Deserialize;
use std::collections::BTreeMap;

const LIST_PATH: &str = "/peripheriques";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/peripheriques", get(index))
        .route("/peripheriques/create", get(create_form).post(create))
        .route("/peripheriques/:id/update", get(update_form).post(update))
        .route("/peripheriques/:id/delete", post(delete))
        .route("/peripheriques/:id/affect", get(affect_form).post(affect))
        .route("/peripheriques/:id/commentaire", post(add_commentaire))
        .route(
            "/peripheriques/:id/commentaire/delete",
            post(remove_commentaire),
        )
        .route("/peripheriques/:id/actif", post(set_actif))
}

#[derive(Debug, Deserialize)]
struct PeripheriqueForm {
    #[serde(rename = "type")]
    kind: String,
    appareil_id: String,
    /// Checkbox: present (any value) means active.
    #[serde(default)]
    actif: Option<String>,
}

impl PeripheriqueForm {
    fn parse(&self) -> Result<(TypePeripherique, AppareilId), ApiError> {
        let kind = self.kind.parse::<TypePeripherique>()?;
        let appareil_id = self
            .appareil_id
            .trim()
            .parse::<AppareilId>()
            .map_err(|_| ApiError::BadRequest("appareil_id".into()))?;
        Ok((kind, appareil_id))
    }
}

#[derive(Debug, Deserialize)]
struct AffectForm {
    /// `aucun`, `ordinateur:<id>` or `objet_nomade:<id>`.
    cible: String,
    #[serde(default)]
    commentaire: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentaireForm {
    commentaire: String,
}

#[derive(Debug, Deserialize)]
struct ActifForm {
    actif: String,
}

fn parse_cible(value: &str) -> Option<Rattachement> {
    let value = value.trim();
    if value == "aucun" {
        return Some(Rattachement::Aucun);
    }
    let (kind, id) = value.split_once(':')?;
    let id = id.parse::<AppareilId>().ok()?;
    match kind {
        "ordinateur" => Some(Rattachement::Ordinateur(id)),
        "objet_nomade" => Some(Rattachement::ObjetNomade(id)),
        _ => None,
    }
}

fn cible_value(rattachement: Rattachement) -> String {
    match rattachement {
        Rattachement::Aucun => "aucun".to_string(),
        Rattachement::Ordinateur(id) => format!("ordinateur:{id}"),
        Rattachement::ObjetNomade(id) => format!("objet_nomade:{id}"),
    }
}

fn libelles(appareils: &[Appareil]) -> BTreeMap<AppareilId, &str> {
    appareils
        .iter()
        .map(|appareil| (appareil.id, appareil.libelle.as_str()))
        .collect()
}

async fn index(State(state): State<AppState>, Query(params): Query<FlashParams>) -> PageResult {
    let peripheriques = state.peripheriques(|service| {
        service.list_peripheriques(&PeripheriqueListQuery::default())
    })?;
    let appareils = state.appareils(|service| service.list_appareils(None))?;
    let libelles = libelles(&appareils);

    let rows = peripheriques
        .iter()
        .map(|peripherique| peripherique_row(peripherique, &libelles))
        .collect::<String>();
    let body = format!(
        r#"<h1>Liste des périphériques</h1>
<p><a href="/peripheriques/create">Ajouter un périphérique</a></p>
<table class="table">
<thead><tr><th>Type</th><th>Appareil</th><th>Rattachement</th><th>En service</th><th>Commentaires</th><th>Actions</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );
    Ok(page("Périphériques", params.flash(), &body))
}

fn peripherique_row(peripherique: &Peripherique, libelles: &BTreeMap<AppareilId, &str>) -> String {
    let id = peripherique.id;
    let libelle = |appareil_id: AppareilId| {
        escape(libelles.get(&appareil_id).copied().unwrap_or("?"))
    };
    let rattachement = match peripherique.rattachement.appareil_id() {
        Some(appareil_id) => format!(
            "{} : {}",
            peripherique.attachment_label(),
            libelle(appareil_id)
        ),
        None => peripherique.attachment_label().to_string(),
    };
    let commentaires = peripherique
        .commentaires
        .iter()
        .map(|commentaire| {
            format!(
                "<li>{} {}</li>",
                escape(commentaire),
                post_button(
                    &format!("/peripheriques/{id}/commentaire/delete"),
                    "Retirer",
                    &[("commentaire", commentaire.as_str())]
                )
            )
        })
        .collect::<String>();
    let (actif_label, toggle_label, toggle_value) = if peripherique.actif {
        ("Oui", "Mettre hors service", "false")
    } else {
        ("Non", "Remettre en service", "true")
    };

    format!(
        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{actif_label} {}</td><td><ul>{commentaires}</ul><form method="post" action="/peripheriques/{id}/commentaire"><input type="text" name="commentaire" required><button type="submit">Ajouter</button></form></td><td><a href="/peripheriques/{id}/update">Modifier</a> <a href="/peripheriques/{id}/affect">Affecter</a> {}</td></tr>
"#,
        escape(peripherique.kind.label()),
        libelle(peripherique.appareil_id),
        rattachement,
        post_button(
            &format!("/peripheriques/{id}/actif"),
            toggle_label,
            &[("actif", toggle_value)]
        ),
        post_button(&format!("/peripheriques/{id}/delete"), "Supprimer", &[]),
    )
}

fn peripherique_form(
    action: &str,
    submit: &str,
    appareils: &[Appareil],
    current: Option<(TypePeripherique, AppareilId)>,
    with_actif: bool,
) -> String {
    let types = TypePeripherique::ALL
        .into_iter()
        .map(|kind| option(kind.code(), kind.label(), current.map(|c| c.0) == Some(kind)))
        .collect::<String>();
    let owners = appareils
        .iter()
        .map(|appareil| {
            option(
                &appareil.id.to_string(),
                &appareil.libelle,
                current.map(|c| c.1) == Some(appareil.id),
            )
        })
        .collect::<String>();
    let actif = if with_actif {
        r#"<label><input type="checkbox" name="actif" value="on" checked> En service</label>"#
    } else {
        ""
    };

    format!(
        r#"<form method="post" action="{}">
<label>Type <select name="type" required>{types}</select></label>
<label>Appareil <select name="appareil_id" required>{owners}</select></label>
{actif}
<button type="submit">{}</button>
</form>"#,
        escape(action),
        escape(submit),
    )
}

async fn create_form(State(state): State<AppState>, Query(params): Query<FlashParams>) -> PageResult {
    let appareils = state.appareils(|service| service.list_appareils(None))?;
    let body = format!(
        "<h1>Ajouter un périphérique</h1>\n{}",
        peripherique_form("/peripheriques/create", "Créer", &appareils, None, true)
    );
    Ok(page("Nouveau périphérique", params.flash(), &body))
}

async fn create(
    State(state): State<AppState>,
    form: Result<Form<PeripheriqueForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("peripherique_create", form) else {
        return redirect("/peripheriques/create", Flash::Error);
    };
    let result = form.parse().and_then(|(kind, appareil_id)| {
        let new = NewPeripherique {
            kind,
            appareil_id,
            actif: form.actif.is_some(),
        };
        state
            .peripheriques(|service| service.create_peripherique(&new))
            .map_err(ApiError::from)
    });
    match result {
        Ok(_) => redirect(LIST_PATH, Flash::PeripheriqueCreated),
        Err(err) => {
            log_rejected("peripherique_create", err);
            redirect("/peripheriques/create", Flash::Error)
        }
    }
}

async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    Query(params): Query<FlashParams>,
) -> PageResult {
    let peripherique = state.peripheriques(|service| service.get_peripherique(id))?;
    let appareils = state.appareils(|service| service.list_appareils(None))?;
    let body = format!(
        "<h1>Modifier le périphérique n°{id}</h1>\n{}",
        peripherique_form(
            &format!("/peripheriques/{id}/update"),
            "Enregistrer",
            &appareils,
            Some((peripherique.kind, peripherique.appareil_id)),
            false
        )
    );
    Ok(page("Modifier un périphérique", params.flash(), &body))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    form: Result<Form<PeripheriqueForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("peripherique_update", form) else {
        return redirect(&format!("/peripheriques/{id}/update"), Flash::Error);
    };
    let result = form.parse().and_then(|(kind, appareil_id)| {
        let update = PeripheriqueUpdate { kind, appareil_id };
        state
            .peripheriques(|service| service.update_peripherique(id, &update))
            .map_err(ApiError::from)
    });
    match result {
        Ok(_) => redirect(LIST_PATH, Flash::PeripheriqueUpdated),
        Err(err) => {
            log_rejected("peripherique_update", err);
            redirect(&format!("/peripheriques/{id}/update"), Flash::Error)
        }
    }
}

async fn delete(State(state): State<AppState>, Path(id): Path<PeripheriqueId>) -> Redirect {
    match state.peripheriques(|service| service.delete_peripherique(id)) {
        Ok(()) => redirect(LIST_PATH, Flash::PeripheriqueDeleted),
        Err(err) => {
            log_rejected("peripherique_delete", err);
            redirect(LIST_PATH, Flash::Error)
        }
    }
}

async fn affect_form(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    Query(params): Query<FlashParams>,
) -> PageResult {
    let peripherique = state.peripheriques(|service| service.get_peripherique(id))?;
    let appareils = state.appareils(|service| service.list_appareils(None))?;
    let current = cible_value(peripherique.rattachement);

    let mut cibles = option("aucun", Rattachement::Aucun.label(), current == "aucun");
    for appareil in &appareils {
        let target = match appareil.categorie {
            AppareilCategorie::Ordinateur => Rattachement::Ordinateur(appareil.id),
            AppareilCategorie::ObjetNomade => Rattachement::ObjetNomade(appareil.id),
            AppareilCategorie::Autre => continue,
        };
        let value = cible_value(target);
        cibles.push_str(&option(
            &value,
            &format!("{} : {}", target.label(), appareil.libelle),
            value == current,
        ));
    }

    let body = format!(
        r#"<h1>Affecter le périphérique n°{id} ({})</h1>
<p>Rattachement actuel : {}</p>
<form method="post" action="/peripheriques/{id}/affect">
<label>Cible <select name="cible">{cibles}</select></label>
<label>Commentaire <textarea name="commentaire"></textarea></label>
<p>Un commentaire est obligatoire pour réaffecter un périphérique déjà rattaché.</p>
<button type="submit">Affecter</button>
</form>"#,
        escape(peripherique.kind.label()),
        escape(peripherique.attachment_label()),
    );
    Ok(page("Affecter un périphérique", params.flash(), &body))
}

async fn affect(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    form: Result<Form<AffectForm>, FormRejection>,
) -> Redirect {
    let back = format!("/peripheriques/{id}/affect");
    let Some(form) = accept_form("peripherique_affect", form) else {
        return redirect(&back, Flash::Error);
    };
    let Some(target) = parse_cible(&form.cible) else {
        log_rejected("peripherique_affect", ApiError::BadRequest("cible".into()));
        return redirect(&back, Flash::Error);
    };

    match state.peripheriques(|service| service.attach(id, target, form.commentaire.as_deref())) {
        Ok(_) => redirect(LIST_PATH, Flash::PeripheriqueAffected),
        Err(PeripheriqueServiceError::ReassignmentRequiresComment(_)) => {
            redirect(&back, Flash::CommentaireRequired)
        }
        Err(err) => {
            log_rejected("peripherique_affect", err);
            redirect(&back, Flash::Error)
        }
    }
}

async fn add_commentaire(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    form: Result<Form<CommentaireForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("peripherique_comment_add", form) else {
        return redirect(LIST_PATH, Flash::Error);
    };
    match state.peripheriques(|service| service.add_commentaire(id, &form.commentaire)) {
        Ok(_) => redirect(LIST_PATH, Flash::CommentaireAdded),
        Err(err) => {
            log_rejected("peripherique_comment_add", err);
            redirect(LIST_PATH, Flash::Error)
        }
    }
}

async fn remove_commentaire(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    form: Result<Form<CommentaireForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("peripherique_comment_remove", form) else {
        return redirect(LIST_PATH, Flash::Error);
    };
    match state.peripheriques(|service| service.remove_commentaire(id, &form.commentaire)) {
        Ok(_) => redirect(LIST_PATH, Flash::CommentaireRemoved),
        Err(err) => {
            log_rejected("peripherique_comment_remove", err);
            redirect(LIST_PATH, Flash::Error)
        }
    }
}

async fn set_actif(
    State(state): State<AppState>,
    Path(id): Path<PeripheriqueId>,
    form: Result<Form<ActifForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("peripherique_set_actif", form) else {
        return redirect(LIST_PATH, Flash::Error);
    };
    let actif = matches!(form.actif.trim(), "true" | "on" | "1");
    match state.peripheriques(|service| service.set_actif(id, actif)) {
        Ok(_) => redirect(LIST_PATH, Flash::ActifUpdated),
        Err(err) => {
            log_rejected("peripherique_set_actif", err);
            redirect(LIST_PATH, Flash::Error)
        }
    }
}
