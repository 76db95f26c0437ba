// Cursos temporales: existen sólo en el borrador (`draft.temp_courses`) y se
// mezclan con los cursos reales antes de evaluar.

use std::collections::HashSet;

use log::debug;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Draft;
use crate::algorithm::parse_offering_code;
use crate::error::{MallaError, Result};
use crate::models::{parse_requisitos, sigla_key, value_to_i32, Course, Requisito};

pub const TEMP_KIND_OVERRIDE: &str = "override";

/// Datos del formulario "nuevo curso temporal".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempCourseForm {
    #[serde(default)]
    pub sigla: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, alias = "créditos")]
    pub creditos: Value,
    #[serde(default, alias = "concentración")]
    pub concentracion: String,
    #[serde(default)]
    pub aprobado: bool,
    #[serde(default)]
    pub prerrequisitos: Vec<String>,
    #[serde(default)]
    pub correquisitos: Vec<String>,
    #[serde(default, rename = "semestreOfrecido")]
    pub semestre_ofrecido: Vec<String>,
}

impl TempCourseForm {
    /// Formulario precargado con los datos de un curso existente.
    pub fn from_course(c: &Course) -> Self {
        TempCourseForm {
            sigla: c.sigla.clone(),
            nombre: c.nombre.clone(),
            creditos: Value::from(c.creditos),
            concentracion: c.concentracion.clone(),
            aprobado: c.aprobado,
            prerrequisitos: c.prerrequisitos_simples().map(|r| r.code.clone()).collect(),
            correquisitos: c.correquisitos().map(|r| r.code.clone()).collect(),
            semestre_ofrecido: c.semestre_ofrecido.clone(),
        }
    }
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

fn rand6() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// `tmp:<fecha-hora>:<6 aleatorios>`; se persiste dentro del borrador.
pub fn stable_course_id() -> String {
    format!("tmp:{}:{}", now_stamp(), rand6())
}

/// Primera sigla libre de la serie TMP-001, TMP-002, ...
pub fn next_temp_sigla(existing: &HashSet<String>) -> String {
    for i in 1..10000 {
        let s = format!("TMP-{:03}", i);
        if !existing.contains(&s) {
            return s;
        }
    }
    format!("TMP-{}", now_stamp())
}

/// Siglas en uso (claves normalizadas).
pub fn existing_siglas<'a, I>(courses: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Course>,
{
    courses
        .into_iter()
        .map(Course::sigla_key)
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_tokens(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nt"))
        .collect()
}

/// Crea un curso temporal validando el formulario. La sigla se pasa a
/// mayúsculas y, si ya existe, se le agrega una letra (A..Z).
pub fn make_temp_course(
    form: &TempCourseForm,
    term_id: Option<&str>,
    existing: &HashSet<String>,
) -> Result<Course> {
    let nombre = form.nombre.trim();
    if nombre.is_empty() {
        return Err(MallaError::Validation(
            "El nombre del curso temporal es obligatorio.".to_string(),
        ));
    }
    let creditos = value_to_i32(&form.creditos, 0);
    if creditos <= 0 {
        return Err(MallaError::Validation(
            "Los créditos deben ser un número positivo.".to_string(),
        ));
    }

    let mut sigla = sigla_key(&form.sigla);
    if sigla.is_empty() {
        sigla = next_temp_sigla(existing);
    }
    if existing.contains(&sigla) {
        if let Some(libre) = ('A'..='Z')
            .map(|l| format!("{}{}", sigla, l))
            .find(|s| !existing.contains(s))
        {
            sigla = libre;
        }
    }

    let concentracion = match form.concentracion.trim() {
        "" => "ex".to_string(),
        c => c.to_string(),
    };

    let mut tokens = clean_tokens(&form.prerrequisitos);
    tokens.extend(clean_tokens(&form.correquisitos).into_iter().map(|c| format!("{}(c)", c)));
    let prerrequisitos = parse_requisitos(tokens);

    let mut semestre_ofrecido: Vec<String> = Vec::new();
    for code in form.semestre_ofrecido.iter().filter_map(|c| parse_offering_code(c)) {
        if !semestre_ofrecido.iter().any(|s| s == code) {
            semestre_ofrecido.push(code.to_string());
        }
    }

    let mut course = Course::new(stable_course_id(), sigla, creditos);
    course.nombre = nombre.to_string();
    course.concentracion = concentracion;
    course.prerrequisitos = prerrequisitos;
    course.semestre_ofrecido = semestre_ofrecido;
    course.term_id = term_id.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
    course.is_temp = true;
    course.frontmatter = mirror_frontmatter(&course);
    Ok(course)
}

/// Frontmatter equivalente a los campos principales (lo que se escribiría a disco).
pub(crate) fn mirror_frontmatter(c: &Course) -> Map<String, Value> {
    let mut fm = Map::new();
    fm.insert("sigla".into(), Value::from(c.sigla.clone()));
    fm.insert("nombre".into(), Value::from(c.nombre.clone()));
    fm.insert("creditos".into(), Value::from(c.creditos));
    fm.insert("aprobado".into(), Value::from(c.aprobado));
    fm.insert("concentracion".into(), Value::from(c.concentracion.clone()));
    fm.insert(
        "prerrequisitos".into(),
        Value::from(c.prerrequisitos.iter().map(Requisito::token).collect::<Vec<_>>()),
    );
    fm.insert("semestreOfrecido".into(), Value::from(c.semestre_ofrecido.clone()));
    fm
}

/// Agrega el curso al borrador y lo ubica en `term_id` (si viene).
pub fn add_temp_course(draft: &mut Draft, course: Course, term_id: Option<&str>) {
    if let Some(tid) = term_id.or(course.term_id.as_deref()) {
        draft.place_course(&course.course_id, tid);
    }
    debug!("[draft] curso temporal {} ({})", course.course_id, course.sigla);
    draft.temp_courses.push(course);
}

/// Quita un curso temporal, su ubicación y, si era un reemplazo, libera el
/// curso real.
pub fn remove_temp_course(draft: &mut Draft, course_id: &str) -> Option<Course> {
    let pos = draft.temp_courses.iter().position(|c| c.course_id == course_id)?;
    let removed = draft.temp_courses.remove(pos);
    draft.unplace_course(course_id);
    if let Some(real) = &removed.override_of {
        let sigue = draft.temp_courses.iter().any(|c| c.override_of.as_ref() == Some(real));
        if !sigue {
            draft.overrides.retain(|o| o != real);
        }
    }
    Some(removed)
}

/// Reemplaza un curso real por una copia temporal editada. El real queda
/// suprimido (`overrides`) y la copia toma su período efectivo.
pub fn override_course(
    real: &Course,
    form: &TempCourseForm,
    draft: &mut Draft,
    existing: &HashSet<String>,
) -> Result<Course> {
    if real.course_id.is_empty() {
        return Err(MallaError::Validation("Curso inválido.".to_string()));
    }
    let term_id = draft
        .placements
        .get(&real.course_id)
        .cloned()
        .or_else(|| real.term_id.clone());

    // la sigla propia del curso real no cuenta como colisión
    let mut existing = existing.clone();
    existing.remove(&real.sigla_key());

    let mut copy = make_temp_course(form, term_id.as_deref(), &existing)?;
    copy.temp_kind = Some(TEMP_KIND_OVERRIDE.to_string());
    copy.override_of = Some(real.course_id.clone());
    copy.aprobado = form.aprobado;
    copy.frontmatter = mirror_frontmatter(&copy);

    if !draft.is_overridden(&real.course_id) {
        draft.overrides.push(real.course_id.clone());
    }
    draft.unplace_course(&real.course_id);
    add_temp_course(draft, copy.clone(), term_id.as_deref());
    Ok(copy)
}
