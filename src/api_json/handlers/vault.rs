use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use super::{blocking_error, error_response};
use crate::config::{APP_NAME, APP_VERSION};
use crate::error::MallaError;
use crate::server::AppState;
use crate::vault::{discover_all, materialize_course, MaterializeRequest};

/// GET /api/config
pub async fn config_handler(state: web::Data<AppState>) -> impl Responder {
    let planner = &state.config.planner;
    HttpResponse::Ok().json(json!({
        "app_name": APP_NAME,
        "app_version": APP_VERSION,
        "max_credits": planner.max_credits,
        "soft_credits": planner.soft_credits,
        "term_code_by_sem": planner.term_code_by_sem
    }))
}

/// GET /api/all
/// Períodos y cursos tal como están en la bóveda, más el reporte de lectura.
pub async fn all_handler(state: web::Data<AppState>) -> impl Responder {
    let st = state.clone();
    let res = web::block(move || {
        let _guard = st.lock();
        discover_all(&st.config.base_dir, &st.config.planner)
    })
    .await;

    match res {
        Ok(d) => HttpResponse::Ok().json(json!({
            "version": APP_VERSION,
            "debug": d.debug,
            "terms": d.terms,
            "courses": d.courses
        })),
        Err(e) => blocking_error(e),
    }
}

/// POST /api/materialize
/// Escribe un curso temporal como nota `.md` dentro de su período.
pub async fn materialize_handler(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let req: MaterializeRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return error_response(&MallaError::Json(e)),
    };

    let st = state.clone();
    let res = web::block(move || {
        let _guard = st.lock();
        materialize_course(&st.config.base_dir, &req)
    })
    .await;

    match res {
        Ok(Ok(file_rel)) => HttpResponse::Ok().json(json!({"ok": true, "fileRel": file_rel})),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_error(e),
    }
}
