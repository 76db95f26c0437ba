//! Configuración de la aplicación.
//!
//! `PlannerConfig` es lo único que leen los motores; `AppConfig` agrega lo que
//! necesitan el loader y el servidor. Ambos se leen de variables de entorno
//! (con `.env` opcional vía `dotenv`).

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "mallaplan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_MAX_CREDITS: i32 = 65;
pub const DEFAULT_SOFT_CREDITS: i32 = 50;
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_DRAFT_FILE: &str = "malla_draft.json";

/// Umbrales de carga y tabla semestre -> código de oferta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_max_credits")]
    pub max_credits: i32,
    #[serde(default = "default_soft_credits")]
    pub soft_credits: i32,
    #[serde(default = "default_term_codes")]
    pub term_code_by_sem: BTreeMap<u8, String>,
}

fn default_max_credits() -> i32 {
    DEFAULT_MAX_CREDITS
}

fn default_soft_credits() -> i32 {
    DEFAULT_SOFT_CREDITS
}

fn default_term_codes() -> BTreeMap<u8, String> {
    BTreeMap::from([
        (0, "V".to_string()),
        (1, "I".to_string()),
        (2, "P".to_string()),
    ])
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            max_credits: DEFAULT_MAX_CREDITS,
            soft_credits: DEFAULT_SOFT_CREDITS,
            term_code_by_sem: default_term_codes(),
        }
    }
}

impl PlannerConfig {
    pub fn with_limits(max_credits: i32, soft_credits: i32) -> Self {
        PlannerConfig { max_credits, soft_credits, ..Default::default() }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Carpeta raíz de la bóveda (períodos `YYYY-S/` con notas `.md`).
    pub base_dir: PathBuf,
    pub bind: String,
    pub draft_file: String,
    pub planner: PlannerConfig,
}

impl AppConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        AppConfig {
            base_dir: base_dir.into(),
            bind: DEFAULT_BIND.to_string(),
            draft_file: DEFAULT_DRAFT_FILE.to_string(),
            planner: PlannerConfig::default(),
        }
    }

    /// Lee `.env` (si existe) y luego MALLA_BASE_DIR, MALLA_BIND,
    /// MALLA_DRAFT_FILE, MALLA_MAX_CREDITS, MALLA_SOFT_CREDITS.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        let base_dir = env::var("MALLA_BASE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut cfg = AppConfig::new(base_dir);
        if let Ok(bind) = env::var("MALLA_BIND") {
            if !bind.trim().is_empty() {
                cfg.bind = bind.trim().to_string();
            }
        }
        if let Ok(f) = env::var("MALLA_DRAFT_FILE") {
            if !f.trim().is_empty() {
                cfg.draft_file = f.trim().to_string();
            }
        }
        cfg.planner.max_credits = int_from_env("MALLA_MAX_CREDITS", DEFAULT_MAX_CREDITS);
        cfg.planner.soft_credits = int_from_env("MALLA_SOFT_CREDITS", DEFAULT_SOFT_CREDITS);
        cfg
    }

    pub fn draft_path(&self) -> PathBuf {
        self.base_dir.join(&self.draft_file)
    }
}

fn int_from_env(key: &str, default: i32) -> i32 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<i32>() {
            Ok(v) => v,
            Err(_) => {
                warn!("[config] {}={:?} no es un entero, usando {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
