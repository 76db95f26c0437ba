// Escribe un curso temporal como nota Markdown dentro de la bóveda.

use std::fs;
use std::path::{Component, Path};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::frontmatter::render_frontmatter;
use super::{find_courses_root, rel, COURSE_DIRS};
use crate::algorithm::parse_term;
use crate::error::{MallaError, Result};
use crate::models::{value_to_string, Course, Requisito};

/// Cuerpo de `/api/materialize`. Los campos sueltos tienen prioridad sobre
/// los del `frontmatter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializeRequest {
    #[serde(default)]
    pub term_id: String,
    #[serde(default)]
    pub sigla: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, alias = "créditos")]
    pub creditos: Option<Value>,
    #[serde(default)]
    pub aprobado: Option<Value>,
    #[serde(default, alias = "concentración")]
    pub concentracion: Option<Value>,
    #[serde(default)]
    pub prerrequisitos: Option<Value>,
    #[serde(default, rename = "semestreOfrecido")]
    pub semestre_ofrecido: Option<Value>,
    #[serde(default)]
    pub frontmatter: Map<String, Value>,
}

impl MaterializeRequest {
    /// Pedido equivalente a un curso temporal del borrador.
    pub fn from_course(c: &Course, term_id: &str) -> Self {
        MaterializeRequest {
            term_id: term_id.to_string(),
            sigla: Some(c.sigla.clone()),
            nombre: Some(c.nombre.clone()),
            creditos: Some(Value::from(c.creditos)),
            aprobado: Some(Value::Bool(c.aprobado)),
            concentracion: Some(Value::from(c.concentracion.clone())),
            prerrequisitos: Some(Value::from(
                c.prerrequisitos.iter().map(Requisito::token).collect::<Vec<_>>(),
            )),
            semestre_ofrecido: Some(Value::from(c.semestre_ofrecido.clone())),
            frontmatter: Map::new(),
        }
    }
}

/// Reemplaza todo lo que no sea `[A-Za-z0-9._-]` por `_` (rachas colapsadas).
pub fn safe_file_stem(sigla: &str) -> String {
    let mut out = String::with_capacity(sigla.len());
    let mut en_racha = false;
    for ch in sigla.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
            en_racha = false;
        } else if !en_racha {
            out.push('_');
            en_racha = true;
        }
    }
    if out.is_empty() || out.chars().all(|c| c == '.') {
        "curso".to_string()
    } else {
        out
    }
}

/// Crea `<base>/<term>/,Cursos/<sigla>.md` (o usa la carpeta de cursos que
/// ya exista). Devuelve la ruta relativa a `base`.
pub fn materialize_course(base: &Path, req: &MaterializeRequest) -> Result<String> {
    let term_id = req.term_id.trim();
    let Some(parts) = parse_term(term_id) else {
        return Err(MallaError::InvalidTerm(term_id.to_string()));
    };

    let mut fm = req.frontmatter.clone();
    let pick = |campo: &Option<Value>, clave: &str| -> Option<Value> {
        campo.clone().filter(|v| !v.is_null()).or_else(|| fm_get(&req.frontmatter, clave))
    };

    let sigla = pick(&req.sigla.clone().map(Value::String), "sigla")
        .map(|v| value_to_string(&v))
        .unwrap_or_default();
    if sigla.is_empty() {
        return Err(MallaError::Validation("sigla obligatoria".to_string()));
    }
    let nombre = pick(&req.nombre.clone().map(Value::String), "nombre")
        .map(|v| value_to_string(&v))
        .unwrap_or_default();
    let creditos = pick(&req.creditos, "creditos").or_else(|| fm_get(&req.frontmatter, "créditos"));
    let aprobado = pick(&req.aprobado, "aprobado");
    let concentracion =
        pick(&req.concentracion, "concentracion").or_else(|| fm_get(&req.frontmatter, "concentración"));
    let prerrequisitos = pick(&req.prerrequisitos, "prerrequisitos");
    let semestre_ofrecido = pick(&req.semestre_ofrecido, "semestreOfrecido");

    set_default(&mut fm, "sigla", Some(Value::String(sigla.clone())));
    if !nombre.is_empty() {
        set_default(&mut fm, "nombre", Some(Value::String(nombre)));
    }
    set_default(&mut fm, "creditos", creditos.clone());
    set_default(&mut fm, "créditos", creditos);
    set_default(&mut fm, "aprobado", Some(aprobado.unwrap_or(Value::Bool(false))));
    set_default(&mut fm, "concentracion", concentracion);
    set_default(&mut fm, "prerrequisitos", prerrequisitos);
    set_default(&mut fm, "semestreOfrecido", semestre_ofrecido);
    set_default(&mut fm, "semestre", Some(Value::from(parts.sem)));
    set_default(&mut fm, "año", Some(Value::from(parts.year)));
    set_default(&mut fm, "sección", Some(Value::from(0)));
    set_default(&mut fm, "notaObtenida", Some(Value::from(0)));
    set_default(&mut fm, "dg-publish", Some(Value::Bool(true)));

    let term_dir = base.join(parts.term_id());
    fs::create_dir_all(&term_dir).map_err(|e| MallaError::io(&term_dir, e))?;
    let (mut courses_root, has_courses) = find_courses_root(&term_dir);
    if !has_courses {
        courses_root = term_dir.join(COURSE_DIRS[0]);
        fs::create_dir_all(&courses_root).map_err(|e| MallaError::io(&courses_root, e))?;
    }

    let file_name = format!("{}.md", safe_file_stem(&sigla));
    let md_path = courses_root.join(&file_name);
    let escapa = Path::new(&file_name)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapa || !md_path.starts_with(&term_dir) {
        return Err(MallaError::Validation("Ruta de destino inválida".to_string()));
    }

    let body = format!("---\n{}\n---\n", render_frontmatter(&fm)?);
    fs::write(&md_path, body).map_err(|e| MallaError::io(&md_path, e))?;

    let file_rel = rel(&md_path, base);
    info!("[vault::materialize] escrito {}", file_rel);
    Ok(file_rel)
}

fn fm_get(fm: &Map<String, Value>, key: &str) -> Option<Value> {
    fm.get(key).cloned().filter(|v| !v.is_null())
}

fn set_default(fm: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        fm.entry(key.to_string()).or_insert(v);
    }
}
