//! Admin panel: a single page with plain HTML forms. Every write redirects
//! back to `/admin` with the selected store and a flash message.

use crate::core::admin::{
    self, error_message, AdminSnapshot, BranchForm, PromotionForm, StoreForm,
};
use crate::domain::model::{Branch, Store};
use crate::web::render::{escape, layout, Head};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::fmt::Write;
use url::form_urlencoded;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(panel))
        .route("/admin/promotions", post(save_promotion))
        .route("/admin/promotions/:id/delete", post(delete_promotion))
        .route("/admin/stores", post(create_store))
        .route("/admin/stores/:id", post(update_store))
        .route("/admin/stores/:id/delete", post(delete_store))
        .route("/admin/stores/:id/branches", post(save_branch))
        .route("/admin/branches/:id/delete", post(delete_branch))
        .route(
            "/admin/stores/:id/promotions/:promotion_id/toggle",
            post(toggle_promotion),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct PanelParams {
    pub store: Option<String>,
    pub flash: Option<String>,
    pub edit_promo: Option<String>,
    pub edit_branch: Option<String>,
    pub edit_store: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreRef {
    #[serde(default)]
    pub store: Option<String>,
}

fn back(store: Option<&str>, flash: Option<&str>) -> Redirect {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(store) = store.filter(|s| !s.is_empty()) {
        query.append_pair("store", store);
    }
    if let Some(flash) = flash {
        query.append_pair("flash", flash);
    }
    let query = query.finish();

    if query.is_empty() {
        Redirect::to("/admin")
    } else {
        Redirect::to(&format!("/admin?{}", query))
    }
}

fn outcome<T>(result: crate::utils::error::Result<T>, ok: impl FnOnce(T) -> String) -> String {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            tracing::warn!("⚠️ Admin action failed: {}", e);
            error_message(&e)
        }
    }
}

async fn panel(State(state): State<AppState>, Query(params): Query<PanelParams>) -> Response {
    match AdminSnapshot::load(state.admin.as_ref(), params.store.as_deref()).await {
        Ok(snapshot) => Html(admin_page(&snapshot, &params)).into_response(),
        Err(e) => {
            tracing::error!("❌ Failed to load admin panel: {}", e);
            let body = format!(
                "<main><h1>Panel de Administración</h1><p class=\"error\">{}</p></main>",
                escape(&error_message(&e))
            );
            (
                e.status_code(),
                Html(layout(&Head::site(Some("Admin")), &body, false)),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PromotionSubmission {
    #[serde(flatten)]
    pub form: PromotionForm,
    #[serde(default)]
    pub store: Option<String>,
}

async fn save_promotion(
    State(state): State<AppState>,
    Form(submission): Form<PromotionSubmission>,
) -> Redirect {
    let flash = outcome(
        admin::save_promotion(state.admin.as_ref(), &submission.form).await,
        |message| message,
    );
    back(submission.store.as_deref(), Some(&flash))
}

async fn delete_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<String>,
    Form(store): Form<StoreRef>,
) -> Redirect {
    let flash = outcome(
        state.admin.delete_promotion(&promotion_id).await,
        |_| "Promoción eliminada.".to_string(),
    );
    back(store.store.as_deref(), Some(&flash))
}

async fn create_store(State(state): State<AppState>, Form(form): Form<StoreForm>) -> Redirect {
    match admin::create_store(state.admin.as_ref(), &form).await {
        Ok((store, message)) => back(Some(&store.id), Some(&message)),
        Err(e) => back(None, Some(&error_message(&e))),
    }
}

async fn update_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Form(form): Form<StoreForm>,
) -> Redirect {
    let flash = outcome(
        admin::update_store(state.admin.as_ref(), &store_id, &form).await,
        |(_, message)| message,
    );
    back(Some(&store_id), Some(&flash))
}

async fn delete_store(State(state): State<AppState>, Path(store_id): Path<String>) -> Redirect {
    match state.admin.delete_store(&store_id).await {
        Ok(()) => back(None, Some("Local eliminado.")),
        Err(e) => back(Some(&store_id), Some(&error_message(&e))),
    }
}

async fn save_branch(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Form(form): Form<BranchForm>,
) -> Redirect {
    let flash = outcome(
        admin::save_branch(state.admin.as_ref(), &store_id, &form).await,
        |message| message,
    );
    back(Some(&store_id), Some(&flash))
}

async fn delete_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
    Form(store): Form<StoreRef>,
) -> Redirect {
    let flash = outcome(
        state.admin.delete_branch(&branch_id).await,
        |_| "Sucursal eliminada.".to_string(),
    );
    back(store.store.as_deref(), Some(&flash))
}

async fn toggle_promotion(
    State(state): State<AppState>,
    Path((store_id, promotion_id)): Path<(String, String)>,
) -> Redirect {
    match admin::toggle_promotion(state.admin.as_ref(), &store_id, &promotion_id).await {
        Ok(assigned) => {
            tracing::debug!("Store {} now has {} promotions", store_id, assigned.len());
            back(Some(&store_id), None)
        }
        Err(e) => back(Some(&store_id), Some(&error_message(&e))),
    }
}

/// `onsubmit` 的確認對話框
fn confirm(message: &str) -> String {
    let literal = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    format!(" onsubmit=\"return confirm({})\"", escape(&literal))
}

fn admin_href(store: Option<&str>, extra: Option<(&str, &str)>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(store) = store {
        query.append_pair("store", store);
    }
    if let Some((key, value)) = extra {
        query.append_pair(key, value);
    }
    let query = query.finish();
    if query.is_empty() {
        "/admin".to_string()
    } else {
        format!("/admin?{}", query)
    }
}

fn text_input(name: &str, value: &str, placeholder: &str) -> String {
    format!(
        "<input name=\"{}\" value=\"{}\" placeholder=\"{}\">",
        name,
        escape(value),
        escape(placeholder)
    )
}

fn promotions_section(snapshot: &AdminSnapshot, params: &PanelParams) -> String {
    let store_id = snapshot.selected_store.as_ref().map(|s| s.id.as_str());
    let editing = params
        .edit_promo
        .as_deref()
        .and_then(|id| snapshot.promotions.iter().find(|p| p.id == id));
    let form = editing.map(PromotionForm::from_promotion).unwrap_or_default();

    let mut html = String::from("<section><h2>1. Gestionar Promociones Globales</h2>");
    let _ = write!(
        html,
        "<form method=\"POST\" action=\"/admin/promotions\"><h3>{}</h3>\
<input type=\"hidden\" name=\"editing_id\" value=\"{}\"><input type=\"hidden\" name=\"store\" value=\"{}\">\
{}{}<input name=\"value\" type=\"number\" step=\"any\" value=\"{}\" placeholder=\"Valor (%)\">{}{}\
<textarea name=\"description\" placeholder=\"Descripción de la promo...\">{}</textarea>\
<button type=\"submit\">{}</button>{}</form>",
        if editing.is_some() { "Editando Promoción" } else { "Crear Nueva Promoción" },
        escape(form.editing_id.as_deref().unwrap_or_default()),
        escape(store_id.unwrap_or_default()),
        text_input("name", &form.name, "Nombre (Ej: Itaú 25% Premium)"),
        text_input("card_issuer", &form.card_issuer, "Emisor (Ej: Itaú)"),
        escape(&form.value),
        text_input("card_type", &form.card_type, "Tipo Tarjeta (Crédito/Débito)"),
        text_input("card_tier", &form.card_tier, "Nivel Tarjeta (Black, Platinum)"),
        escape(&form.description),
        if editing.is_some() { "Actualizar" } else { "Crear" },
        if editing.is_some() {
            format!("<a href=\"{}\">Cancelar</a>", escape(&admin_href(store_id, None)))
        } else {
            String::new()
        },
    );

    html.push_str("<h3>Promociones Existentes</h3><ul>");
    for promotion in &snapshot.promotions {
        let _ = write!(
            html,
            "<li><span>{} ({}%)</span> <a href=\"{}\">Editar</a>\
<form method=\"POST\" action=\"/admin/promotions/{}/delete\"{}>\
<input type=\"hidden\" name=\"store\" value=\"{}\"><button type=\"submit\">Eliminar</button></form></li>",
            escape(&promotion.name),
            promotion.value,
            escape(&admin_href(store_id, Some(("edit_promo", &promotion.id)))),
            escape(&promotion.id),
            confirm(&format!("¿Seguro que quieres eliminar la promoción \"{}\"?", promotion.name)),
            escape(store_id.unwrap_or_default()),
        );
    }
    html.push_str("</ul></section>");
    html
}

fn store_picker(snapshot: &AdminSnapshot) -> String {
    let selected = snapshot.selected_store.as_ref().map(|s| s.id.as_str());
    let mut options = String::from("<option value=\"\">Selecciona un local...</option>");
    for store in &snapshot.stores {
        let _ = write!(
            options,
            "<option value=\"{}\"{}>{}</option>",
            escape(&store.id),
            if Some(store.id.as_str()) == selected { " selected" } else { "" },
            escape(&store.name)
        );
    }
    format!(
        "<form method=\"GET\" action=\"/admin\"><select name=\"store\" onchange=\"this.form.submit()\">{}</select></form>",
        options
    )
}

fn selected_store_section(
    store: &Store,
    snapshot: &AdminSnapshot,
    params: &PanelParams,
) -> String {
    let id = escape(&store.id);
    let mut html = String::new();

    if params.edit_store.is_some() {
        let _ = write!(
            html,
            "<form method=\"POST\" action=\"/admin/stores/{}\">{}{}\
<button type=\"submit\">Guardar</button> <a href=\"{}\">Cancelar</a></form>",
            id,
            text_input("name", &store.name, "Nombre del local"),
            text_input("logo_url", store.logo_url.as_deref().unwrap_or_default(), "URL del Logo"),
            escape(&admin_href(Some(&store.id), None)),
        );
    } else {
        let _ = write!(
            html,
            "<div><h4>{}</h4><a href=\"{}\">Editar</a>\
<form method=\"POST\" action=\"/admin/stores/{}/delete\"{}><button type=\"submit\">Eliminar Local</button></form></div>",
            escape(&store.name),
            escape(&admin_href(Some(&store.id), Some(("edit_store", "1")))),
            id,
            confirm("¿Seguro que quieres eliminar el local?"),
        );
    }

    let _ = write!(html, "<h4>Promociones Asignadas a {}</h4><ul>", escape(&store.name));
    for promotion in &snapshot.promotions {
        let assigned = snapshot.is_assigned(&promotion.id);
        let _ = write!(
            html,
            "<li><span>{}</span><form method=\"POST\" action=\"/admin/stores/{}/promotions/{}/toggle\">\
<button type=\"submit\" class=\"{}\">{}</button></form></li>",
            escape(&promotion.name),
            id,
            escape(&promotion.id),
            if assigned { "assigned" } else { "unassigned" },
            if assigned { "Quitar" } else { "Asignar" },
        );
    }
    html.push_str("</ul>");

    html.push_str(&branches_block(store, &snapshot.branches, params));
    html
}

fn branches_block(store: &Store, branches: &[Branch], params: &PanelParams) -> String {
    let editing = params
        .edit_branch
        .as_deref()
        .and_then(|id| branches.iter().find(|b| b.id == id));

    let mut html = format!("<h4>Sucursales de {}</h4><ul>", escape(&store.name));
    for branch in branches {
        let _ = write!(
            html,
            "<li><span>{}</span> <small>{}</small> <a href=\"{}\">Editar</a>\
<form method=\"POST\" action=\"/admin/branches/{}/delete\"{}>\
<input type=\"hidden\" name=\"store\" value=\"{}\"><button type=\"submit\">Eliminar</button></form></li>",
            escape(&branch.name),
            escape(branch.address.as_deref().unwrap_or_default()),
            escape(&admin_href(Some(&store.id), Some(("edit_branch", &branch.id)))),
            escape(&branch.id),
            confirm(&format!("¿Seguro que quieres eliminar la sucursal \"{}\"?", branch.name)),
            escape(&store.id),
        );
    }
    html.push_str("</ul>");

    let _ = write!(
        html,
        "<form method=\"POST\" action=\"/admin/stores/{}/branches\"><h4>{}</h4>\
<input type=\"hidden\" name=\"editing_id\" value=\"{}\">{}{}<button type=\"submit\">{}</button>{}</form>",
        escape(&store.id),
        if editing.is_some() { "Editando Sucursal" } else { "Añadir Sucursal" },
        escape(editing.map(|b| b.id.as_str()).unwrap_or_default()),
        text_input("name", editing.map(|b| b.name.as_str()).unwrap_or_default(), "Nombre Sucursal"),
        text_input(
            "address",
            editing.and_then(|b| b.address.as_deref()).unwrap_or_default(),
            "Dirección"
        ),
        if editing.is_some() { "Actualizar" } else { "Guardar" },
        if editing.is_some() {
            format!("<a href=\"{}\">Cancelar</a>", escape(&admin_href(Some(&store.id), None)))
        } else {
            String::new()
        },
    );
    html
}

pub fn admin_page(snapshot: &AdminSnapshot, params: &PanelParams) -> String {
    let mut body = String::from("<main><h1>Panel de Administración</h1>");

    if let Some(flash) = params.flash.as_deref().filter(|f| !f.is_empty()) {
        let class = if flash.starts_with("Error:") { "error" } else { "flash" };
        let _ = write!(body, "<p class=\"{}\">{}</p>", class, escape(flash));
    }

    body.push_str(&promotions_section(snapshot, params));

    body.push_str(
        "<section><h2>2. Gestionar Locales</h2>\
<form method=\"POST\" action=\"/admin/stores\"><h3>Crear Nuevo Local</h3>\
<input name=\"name\" placeholder=\"Nombre del Local\"><input name=\"logo_url\" placeholder=\"URL del Logo\">\
<button type=\"submit\">Crear Local</button></form><h3>Gestionar Local Existente</h3>",
    );
    body.push_str(&store_picker(snapshot));
    if let Some(store) = &snapshot.selected_store {
        body.push_str(&selected_store_section(store, snapshot, params));
    }
    body.push_str("</section></main>");

    layout(&Head::site(Some("Admin")), &body, false)
}
