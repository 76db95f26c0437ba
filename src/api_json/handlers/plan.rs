use actix_web::{web, HttpResponse, Responder};

use super::{blocking_error, error_response};
use crate::algorithm::evaluar_plan;
use crate::api_json::{evaluate_request, parse_evaluate_request, parse_unlock_request, unlock_request};
use crate::draft::load_draft;
use crate::error::MallaError;
use crate::server::AppState;
use crate::vault::discover_all;

/// GET /api/plan
/// Bóveda + borrador guardado -> malla efectiva, advertencias y alcanzables.
pub async fn plan_handler(state: web::Data<AppState>) -> impl Responder {
    let st = state.clone();
    let res = web::block(move || {
        let _guard = st.lock();
        let discovery = discover_all(&st.config.base_dir, &st.config.planner);
        let draft = load_draft(&st.config.draft_path())?;
        Ok::<_, MallaError>(evaluar_plan(
            &discovery.terms,
            &discovery.courses,
            &draft,
            &st.config.planner,
        ))
    })
    .await;

    match res {
        Ok(Ok(eval)) => HttpResponse::Ok().json(eval),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_error(e),
    }
}

/// POST /api/evaluate
/// Evalúa una foto enviada por el cliente (ver `EvaluateRequest`).
pub async fn evaluate_handler(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let json_str = String::from_utf8_lossy(&body);
    match parse_evaluate_request(&json_str) {
        Ok(req) => HttpResponse::Ok().json(evaluate_request(&req, &state.config.planner)),
        Err(e) => error_response(&MallaError::Json(e)),
    }
}

/// POST /api/unlock
/// Foto + `course_id` -> cursos que se desbloquean al aprobarlo.
pub async fn unlock_handler(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let json_str = String::from_utf8_lossy(&body);
    match parse_unlock_request(&json_str) {
        Ok(req) => HttpResponse::Ok().json(unlock_request(&req, &state.config.planner)),
        Err(e) => error_response(&MallaError::Json(e)),
    }
}
