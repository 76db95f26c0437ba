//! Módulo `vault`: lectura de la malla desde una bóveda de notas Markdown.
//!
//! Estructura esperada:
//! - `<base>/<YYYY-S ...>/` una carpeta por período
//! - `<período>/,Cursos/*.md` (o `Cursos/`, o directamente en el período)
//! - cada nota es un curso; sus datos viven en el frontmatter YAML
//!
//! Submódulos:
//! - `frontmatter`: separar/parsear/escribir el bloque YAML
//! - `materialize`: escribir un curso temporal como nota nueva

pub mod frontmatter;
pub mod materialize;

pub use frontmatter::{parse_frontmatter, split_frontmatter};
pub use materialize::{materialize_course, MaterializeRequest};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::algorithm::{make_term, parse_offering_code, parse_term_prefix, TermParts};
use crate::config::{PlannerConfig, APP_NAME, APP_VERSION};
use crate::models::{
    parse_requisitos, value_to_bool, value_to_i32, value_to_list, value_to_string, Course, Term,
};

/// Nombres de la subcarpeta de cursos, en orden de preferencia.
pub const COURSE_DIRS: [&str; 2] = [",Cursos", "Cursos"];

/// Profundidad máxima de la búsqueda recursiva de períodos.
pub const MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TermDirDebug {
    pub term_id: String,
    #[serde(rename = "folderName")]
    pub folder_name: String,
    #[serde(rename = "searchRootRel")]
    pub search_root_rel: String,
    #[serde(rename = "mdCount")]
    pub md_count: usize,
    #[serde(rename = "hasCoursesDir")]
    pub has_courses_dir: bool,
}

/// Reporte de la lectura (se devuelve tal cual en `/api/all`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryDebug {
    pub app_name: String,
    pub app_version: String,
    pub base_dir: String,
    pub mode: Option<String>,
    pub terms_detected: usize,
    pub md_found_total: usize,
    pub warnings: Vec<String>,
    pub term_dirs: Vec<TermDirDebug>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    pub terms: Vec<Term>,
    pub courses: Vec<Course>,
    pub debug: DiscoveryDebug,
}

/// Lee todos los períodos y cursos bajo `base`. Nunca falla: los problemas
/// quedan en `debug.warnings` o en el `error` de cada curso.
pub fn discover_all(base: &Path, config: &PlannerConfig) -> Discovery {
    let mut debug = DiscoveryDebug {
        app_name: APP_NAME.to_string(),
        app_version: APP_VERSION.to_string(),
        base_dir: base.display().to_string(),
        ..Default::default()
    };
    if !base.is_dir() {
        debug.warnings.push(format!("Base dir no existe: {}", base.display()));
        warn!("[vault] base dir no existe: {}", base.display());
        return Discovery { debug, ..Default::default() };
    }

    let (term_dirs, mode) = find_terms(base, &mut debug.warnings);
    debug.mode = Some(mode);
    debug.terms_detected = term_dirs.len();

    let mut terms = Vec::new();
    let mut courses = Vec::new();
    for (tdir, parts) in term_dirs {
        let Some(mut term) = make_term(&parts.term_id(), config, false) else {
            continue;
        };
        term.folder_name = file_name(&tdir);

        let (root, has_courses) = find_courses_root(&tdir);
        let mut md_files = Vec::new();
        collect_md(&root, &mut md_files, &mut debug.warnings);
        md_files.sort();
        debug.md_found_total += md_files.len();
        debug.term_dirs.push(TermDirDebug {
            term_id: term.term_id.clone(),
            folder_name: term.folder_name.clone(),
            search_root_rel: rel(&root, base),
            md_count: md_files.len(),
            has_courses_dir: has_courses,
        });

        for md in &md_files {
            courses.push(read_course(md, base, &term.term_id));
        }
        terms.push(term);
    }

    info!(
        "[vault] {} períodos, {} cursos ({} .md) en {}",
        terms.len(),
        courses.len(),
        debug.md_found_total,
        base.display()
    );
    Discovery { terms, courses, debug }
}

fn file_name(p: &Path) -> String {
    p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

/// Ruta relativa a `base` con separador `/` (es el `course_id` estable).
pub fn rel(p: &Path, base: &Path) -> String {
    match p.strip_prefix(base) {
        Ok(r) => r
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => p.display().to_string(),
    }
}

fn sort_key(p: &(PathBuf, TermParts)) -> (i32, u8, String) {
    (p.1.year, p.1.sem, file_name(&p.0))
}

fn subdirs(dir: &Path, warnings: &mut Vec<String>) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(rd) => {
            let mut out: Vec<PathBuf> = rd
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            out.sort();
            out
        }
        Err(e) => {
            warnings.push(format!("No se pudo leer {}: {}", dir.display(), e));
            Vec::new()
        }
    }
}

/// Períodos directamente bajo `base`; si no hay, búsqueda recursiva
/// (la primera coincidencia de cada rama, sin bajar dentro de ella).
fn find_terms(base: &Path, warnings: &mut Vec<String>) -> (Vec<(PathBuf, TermParts)>, String) {
    let mut direct: Vec<(PathBuf, TermParts)> = subdirs(base, warnings)
        .into_iter()
        .filter_map(|p| parse_term_prefix(&file_name(&p)).map(|t| (p, t)))
        .collect();
    if !direct.is_empty() {
        direct.sort_by_key(sort_key);
        return (direct, "direct".to_string());
    }

    let mut found = Vec::new();
    let mut pending: Vec<(PathBuf, usize)> = subdirs(base, warnings).into_iter().map(|p| (p, 1)).collect();
    while let Some((dir, depth)) = pending.pop() {
        if let Some(parts) = parse_term_prefix(&file_name(&dir)) {
            found.push((dir, parts));
            continue;
        }
        if depth >= MAX_DEPTH {
            continue;
        }
        pending.extend(subdirs(&dir, warnings).into_iter().map(|p| (p, depth + 1)));
    }

    found.sort_by_key(sort_key);
    let mut seen = HashSet::new();
    found.retain(|(p, _)| seen.insert(fs::canonicalize(p).unwrap_or_else(|_| p.clone())));
    (found, format!("fallback_depth{}", MAX_DEPTH))
}

/// Subcarpeta de cursos del período (`,Cursos`, `Cursos`, sin importar
/// mayúsculas) o el período mismo.
fn find_courses_root(term_dir: &Path) -> (PathBuf, bool) {
    for name in COURSE_DIRS {
        let p = term_dir.join(name);
        if p.is_dir() {
            return (p, true);
        }
    }
    let wanted: Vec<String> = COURSE_DIRS.iter().map(|n| n.to_lowercase()).collect();
    if let Ok(rd) = fs::read_dir(term_dir) {
        let mut hijos: Vec<PathBuf> = rd.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        hijos.sort();
        for ch in hijos {
            if ch.is_dir() && wanted.contains(&file_name(&ch).to_lowercase()) {
                return (ch, true);
            }
        }
    }
    (term_dir.to_path_buf(), false)
}

fn collect_md(dir: &Path, out: &mut Vec<PathBuf>, warnings: &mut Vec<String>) {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warnings.push(format!("No se pudo leer {}: {}", dir.display(), e));
            return;
        }
    };
    for entry in rd.filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_dir() {
            collect_md(&p, out, warnings);
        } else if p.extension().is_some_and(|e| e == "md") {
            out.push(p);
        }
    }
}

/// Primer valor presente entre varias claves alternativas.
fn get<'a>(fm: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fm.get(*k))
}

fn read_course(md: &Path, base: &Path, term_id: &str) -> Course {
    let relp = rel(md, base);
    let stem = md
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let bytes = match fs::read(md) {
        Ok(b) => b,
        Err(e) => {
            warn!("[vault] no se pudo leer {}: {}", md.display(), e);
            let mut c = Course::new(relp.clone(), stem, 0).en_periodo(term_id);
            c.file_rel = relp;
            c.error = Some(format!("No se pudo leer: {}", e));
            return c;
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let (fm_text, _) = split_frontmatter(&text);
    let fm = parse_frontmatter(fm_text.as_deref());
    course_from_frontmatter(fm, &relp, term_id, &stem)
}

/// Arma un curso desde el frontmatter de su nota.
pub fn course_from_frontmatter(
    fm: Map<String, Value>,
    course_id: &str,
    term_id: &str,
    stem: &str,
) -> Course {
    let sigla = get(&fm, &["sigla", "código", "codigo"])
        .map(value_to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| stem.trim().to_string());

    let mut c = Course::new(course_id, sigla, 0).en_periodo(term_id);
    c.file_rel = course_id.to_string();
    c.nombre = get(&fm, &["nombre"]).map(value_to_string).unwrap_or_default();
    c.creditos = get(&fm, &["créditos", "creditos"]).map(|v| value_to_i32(v, 0)).unwrap_or(0);
    c.aprobado = get(&fm, &["aprobado"]).is_some_and(value_to_bool);

    let conc = match get(&fm, &["concentracion", "concentración"]) {
        Some(Value::Array(items)) => items.first().map(value_to_string).unwrap_or_default(),
        Some(v) => value_to_string(v),
        None => String::new(),
    };
    if !conc.is_empty() {
        c.concentracion = conc;
    }

    let prer = get(&fm, &["prerrequisitos"]).map(value_to_list).unwrap_or_default();
    c.prerrequisitos = parse_requisitos(prer);
    c.semestre_ofrecido = get(&fm, &["semestreOfrecido"])
        .map(value_to_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|s| parse_offering_code(s))
        .map(str::to_string)
        .collect();
    c.frontmatter = fm;
    c
}
