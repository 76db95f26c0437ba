// Biblioteca raíz del crate `mallaplan`.
// Planificador de malla curricular: lee la bóveda de notas, aplica el borrador
// del usuario y calcula advertencias y el grafo de desbloqueo.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod draft;
pub mod error;
pub mod models;
pub mod server;
pub mod vault;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;

pub use algorithm::{evaluar_plan, PlanEvaluation};
pub use error::MallaError;
