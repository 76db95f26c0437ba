// Persistencia del borrador en un archivo JSON dentro de la bóveda.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};

use super::Draft;
use crate::error::{MallaError, Result};

/// Lee el borrador. Si el archivo no existe o no es JSON válido devuelve el
/// borrador por defecto (nunca falla por contenido).
pub fn load_draft(path: &Path) -> Result<Draft> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Draft::default()),
        Err(e) => return Err(MallaError::io(path, e)),
    };
    match serde_json::from_str::<Draft>(&text) {
        Ok(d) => Ok(d),
        Err(e) => {
            warn!("[draft] {} inválido ({}), usando borrador vacío", path.display(), e);
            Ok(Draft::default())
        }
    }
}

/// Guarda el borrador saneado como JSON indentado.
pub fn save_draft(path: &Path, draft: &Draft) -> Result<()> {
    let mut clean = draft.clone();
    clean.sanitize();
    let body = serde_json::to_string_pretty(&clean)?;
    fs::write(path, body).map_err(|e| MallaError::io(path, e))?;
    info!(
        "[draft] guardado {} ({} ubicaciones, {} temporales)",
        path.display(),
        clean.placements.len(),
        clean.temp_courses.len()
    );
    Ok(())
}

/// Borra el archivo del borrador. Devuelve si existía.
pub fn reset_draft(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("[draft] eliminado {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MallaError::io(path, e)),
    }
}
