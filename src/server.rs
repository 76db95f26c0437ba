use std::sync::{Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;

use crate::api_json::handlers::{
    all_handler, config_handler, draft_get_handler, draft_reset_handler, draft_save_handler,
    evaluate_handler, help_handler, materialize_handler, plan_handler, unlock_handler,
};
use crate::config::AppConfig;

/// Estado compartido entre workers. Las escrituras a la bóveda y al borrador
/// pasan por `lock()` para no pisarse.
pub struct AppState {
    pub config: AppConfig,
    write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState { config, write_lock: Mutex::new(()) }
    }

    pub fn lock(&self) -> MutexGuard<'_, ()> {
        // un panic con el lock tomado no deja estado inconsistente (es `()`)
        self.write_lock.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Tabla de rutas; se usa tanto en `run_server` como en los tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/config", web::get().to(config_handler))
        .route("/api/all", web::get().to(all_handler))
        .route("/api/draft", web::get().to(draft_get_handler))
        .route("/api/draft", web::post().to(draft_save_handler))
        .route("/api/draft/reset", web::post().to(draft_reset_handler))
        .route("/api/materialize", web::post().to(materialize_handler))
        .route("/api/plan", web::get().to(plan_handler))
        .route("/api/evaluate", web::post().to(evaluate_handler))
        .route("/api/unlock", web::post().to(unlock_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind.clone();
    info!(
        "[server] bóveda {} | borrador {} | escuchando en http://{}",
        config.base_dir.display(),
        config.draft_file,
        bind_addr
    );
    let state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
