pub mod docs;
pub mod draft;
pub mod plan;
pub mod vault;

pub use docs::*;
pub use draft::*;
pub use plan::*;
pub use vault::*;

use actix_web::HttpResponse;
use log::error;
use serde_json::json;

use crate::error::MallaError;

/// `{"ok": false, "error": ...}` con 400 para errores del cliente y 500 para E/S.
pub(crate) fn error_response(e: &MallaError) -> HttpResponse {
    if e.is_client_error() {
        HttpResponse::BadRequest().json(json!({"ok": false, "error": e.to_string()}))
    } else {
        error!("[api] {}", e);
        HttpResponse::InternalServerError().json(json!({"ok": false, "error": e.to_string()}))
    }
}

pub(crate) fn blocking_error(e: actix_web::error::BlockingError) -> HttpResponse {
    error!("[api] tarea bloqueante cancelada: {}", e);
    HttpResponse::InternalServerError().json(json!({"ok": false, "error": "tarea interna cancelada"}))
}
