use super::layout::{escape, page, post_button};
use super::{accept_form, log_rejected, redirect, FlashParams, PageResult};
use crate::error::ApiError;
use crate::pages::flash::Flash;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::NaiveDate;
use parcinfo_core::{AppareilId, Personne, PersonneId, PersonneInput};
use serde::Deserialize;
use std::collections::BTreeMap;

const LIST_PATH: &str = "/personnes";
const HTML_DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/personnes", get(index))
        .route("/personnes/create", get(create_form).post(create))
        .route("/personnes/:id/update", get(update_form).post(update))
        .route("/personnes/:id/delete", post(delete))
        .route("/personnes/:id/affect", get(affect_form).post(affect))
}

#[derive(Debug, Default, Deserialize)]
struct PersonneForm {
    nom: String,
    prenom: String,
    #[serde(default)]
    adresse: String,
    #[serde(default)]
    telephone: String,
    #[serde(default)]
    date_naissance: String,
}

impl PersonneForm {
    /// `None` when the birth date is present but not `YYYY-MM-DD`.
    fn into_input(self) -> Option<PersonneInput> {
        let date_naissance = match self.date_naissance.trim() {
            "" => None,
            raw => Some(NaiveDate::parse_from_str(raw, HTML_DATE_FORMAT).ok()?),
        };
        Some(PersonneInput {
            nom: self.nom,
            prenom: self.prenom,
            adresse: Some(self.adresse),
            telephone: Some(self.telephone),
            date_naissance,
        })
    }
}

async fn index(State(state): State<AppState>, Query(params): Query<FlashParams>) -> PageResult {
    let personnes = state.personnes(|service| service.list_personnes())?;
    let libelles = state
        .appareils(|service| service.list_appareils(None))?
        .into_iter()
        .map(|appareil| (appareil.id, appareil.libelle))
        .collect::<BTreeMap<AppareilId, String>>();

    let rows = personnes
        .iter()
        .map(|personne| personne_row(personne, &libelles))
        .collect::<String>();
    let body = format!(
        r#"<h1>Liste des personnes</h1>
<p><a href="/personnes/create">Ajouter une personne</a></p>
<table class="table">
<thead><tr><th>Nom</th><th>Prénom</th><th>Adresse</th><th>Téléphone</th><th>Date de naissance</th><th>Appareils</th><th>Actions</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );
    Ok(page("Personnes", params.flash(), &body))
}

fn personne_row(personne: &Personne, libelles: &BTreeMap<AppareilId, String>) -> String {
    let appareils = personne
        .appareils
        .iter()
        .filter_map(|id| libelles.get(id))
        .map(|libelle| escape(libelle))
        .collect::<Vec<_>>()
        .join(", ");
    let date = personne
        .date_naissance
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_default();
    let id = personne.id;

    format!(
        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{date}</td><td>{appareils}</td><td><a href="/personnes/{id}/update">Modifier</a> <a href="/personnes/{id}/affect">Affecter</a> {}</td></tr>
"#,
        escape(&personne.nom),
        escape(&personne.prenom),
        escape(personne.adresse.as_deref().unwrap_or_default()),
        escape(personne.telephone.as_deref().unwrap_or_default()),
        post_button(&format!("/personnes/{id}/delete"), "Supprimer", &[]),
    )
}

fn personne_form(action: &str, submit: &str, input: &PersonneInput) -> String {
    let date = input
        .date_naissance
        .map(|date| date.format(HTML_DATE_FORMAT).to_string())
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="{}">
<label>Nom <input type="text" name="nom" value="{}" required maxlength="50"></label>
<label>Prénom <input type="text" name="prenom" value="{}" required maxlength="50"></label>
<label>Adresse <input type="text" name="adresse" value="{}" maxlength="255"></label>
<label>Téléphone <input type="tel" name="telephone" value="{}" maxlength="20"></label>
<label>Date de naissance <input type="date" name="date_naissance" value="{date}"></label>
<button type="submit">{}</button>
</form>"#,
        escape(action),
        escape(&input.nom),
        escape(&input.prenom),
        escape(input.adresse.as_deref().unwrap_or_default()),
        escape(input.telephone.as_deref().unwrap_or_default()),
        escape(submit),
    )
}

async fn create_form(Query(params): Query<FlashParams>) -> PageResult {
    let body = format!(
        "<h1>Ajouter une personne</h1>\n{}",
        personne_form("/personnes/create", "Créer", &PersonneInput::default())
    );
    Ok(page("Nouvelle personne", params.flash(), &body))
}

async fn create(
    State(state): State<AppState>,
    form: Result<Form<PersonneForm>, FormRejection>,
) -> Redirect {
    let Some(form) = accept_form("personne_create", form) else {
        return redirect("/personnes/create", Flash::Error);
    };
    let Some(input) = form.into_input() else {
        log_rejected("personne_create", ApiError::Validation("date_naissance".into()));
        return redirect("/personnes/create", Flash::Error);
    };
    match state.personnes(|service| service.create_personne(&input)) {
        Ok(_) => redirect(LIST_PATH, Flash::PersonneCreated),
        Err(err) => {
            log_rejected("personne_create", err);
            redirect("/personnes/create", Flash::Error)
        }
    }
}

async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<PersonneId>,
    Query(params): Query<FlashParams>,
) -> PageResult {
    let personne = state.personnes(|service| service.get_personne(id))?;
    let body = format!(
        "<h1>Modifier {}</h1>\n{}",
        escape(&personne.full_name()),
        personne_form(
            &format!("/personnes/{id}/update"),
            "Enregistrer",
            &PersonneInput::from(&personne)
        )
    );
    Ok(page("Modifier une personne", params.flash(), &body))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<PersonneId>,
    form: Result<Form<PersonneForm>, FormRejection>,
) -> Redirect {
    let back = format!("/personnes/{id}/update");
    let Some(form) = accept_form("personne_update", form) else {
        return redirect(&back, Flash::Error);
    };
    let Some(input) = form.into_input() else {
        log_rejected("personne_update", ApiError::Validation("date_naissance".into()));
        return redirect(&back, Flash::Error);
    };
    match state.personnes(|service| service.update_personne(id, &input)) {
        Ok(_) => redirect(LIST_PATH, Flash::PersonneUpdated),
        Err(err) => {
            log_rejected("personne_update", err);
            redirect(&back, Flash::Error)
        }
    }
}

async fn delete(State(state): State<AppState>, Path(id): Path<PersonneId>) -> Redirect {
    match state.personnes(|service| service.delete_personne(id)) {
        Ok(()) => redirect(LIST_PATH, Flash::PersonneDeleted),
        Err(err) => {
            log_rejected("personne_delete", err);
            redirect(LIST_PATH, Flash::Error)
        }
    }
}

async fn affect_form(
    State(state): State<AppState>,
    Path(id): Path<PersonneId>,
    Query(params): Query<FlashParams>,
) -> PageResult {
    let personne = state.personnes(|service| service.get_personne(id))?;
    let appareils = state.appareils(|service| service.list_appareils(None))?;

    let checkboxes = appareils
        .iter()
        .map(|appareil| {
            format!(
                r#"<li><label><input type="checkbox" name="appareils" value="{}"{}> {} ({})</label></li>
"#,
                appareil.id,
                if personne.owns(appareil.id) { " checked" } else { "" },
                escape(&appareil.libelle),
                appareil.categorie.label()
            )
        })
        .collect::<String>();
    let body = format!(
        r#"<h1>Affecter des appareils à {}</h1>
<form method="post" action="/personnes/{id}/affect">
<ul>
{checkboxes}</ul>
<button type="submit">Affecter</button>
</form>"#,
        escape(&personne.full_name())
    );
    Ok(page("Affecter des appareils", params.flash(), &body))
}

/// Repeated `appareils=<id>` checkbox fields; none checked clears the set.
async fn affect(
    State(state): State<AppState>,
    Path(id): Path<PersonneId>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Redirect {
    let back = format!("/personnes/{id}/affect");
    let Some(fields) = accept_form("personne_affect", form) else {
        return redirect(&back, Flash::Error);
    };
    let ids = fields
        .iter()
        .filter(|(name, _)| name == "appareils")
        .map(|(_, value)| value.trim().parse::<AppareilId>())
        .collect::<Result<Vec<_>, _>>();
    let Ok(ids) = ids else {
        log_rejected("personne_affect", ApiError::BadRequest("appareils".into()));
        return redirect(&back, Flash::Error);
    };

    match state.personnes(|service| service.affect_appareils(id, &ids)) {
        Ok(_) => redirect(LIST_PATH, Flash::PersonneAffected),
        Err(err) => {
            log_rejected("personne_affect", err);
            redirect(&back, Flash::Error)
        }
    }
}
