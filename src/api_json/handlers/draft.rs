use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use super::{blocking_error, error_response};
use crate::draft::{load_draft, reset_draft, save_draft, Draft};
use crate::server::AppState;

/// GET /api/draft
pub async fn draft_get_handler(state: web::Data<AppState>) -> impl Responder {
    let path = state.config.draft_path();
    match web::block(move || load_draft(&path)).await {
        Ok(Ok(d)) => HttpResponse::Ok().json(d),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_error(e),
    }
}

/// POST /api/draft
/// Cualquier JSON se acepta: se sanea antes de guardar.
pub async fn draft_save_handler(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let draft = Draft::from(body.into_inner());
    let st = state.clone();
    let res = web::block(move || {
        let _guard = st.lock();
        save_draft(&st.config.draft_path(), &draft)
    })
    .await;

    match res {
        Ok(Ok(())) => HttpResponse::Ok().json(json!({"ok": true})),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_error(e),
    }
}

/// POST /api/draft/reset
/// Borra el archivo del borrador (la UI pide confirmación antes).
pub async fn draft_reset_handler(state: web::Data<AppState>) -> impl Responder {
    let st = state.clone();
    let res = web::block(move || {
        let _guard = st.lock();
        reset_draft(&st.config.draft_path())
    })
    .await;

    match res {
        Ok(Ok(deleted)) => HttpResponse::Ok().json(json!({"ok": true, "deleted": deleted})),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_error(e),
    }
}
