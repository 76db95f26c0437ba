// placement.rs - vista efectiva de la malla (cursos reales + borrador)
//
// Une la ubicación canónica de cada curso (su `term_id`) con las ubicaciones
// del borrador, aplica reemplazos y cursos temporales, y arma la lista de
// períodos que se muestra. Nunca falla: entradas mal formadas se ignoran.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::Serialize;

use super::terms::{make_term, parse_offering_code, parse_term, sort_terms, term_code};
use crate::config::PlannerConfig;
use crate::draft::Draft;
use crate::models::{Course, Placements, Term};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectivePlan {
    pub terms: Vec<Term>,
    pub courses: Vec<Course>,
    pub placements: Placements,
}

/// Período efectivo de un curso: ubicación resuelta o, si no hay, su `term_id`.
pub fn effective_term_of<'a>(course: &'a Course, placements: &'a Placements) -> Option<&'a str> {
    placements
        .get(&course.course_id)
        .or(course.term_id.as_ref())
        .map(String::as_str)
        .filter(|t| !t.is_empty())
}

/// Cursos reales menos los reemplazados, más los temporales del borrador.
/// Ids repetidos conservan la primera aparición.
pub fn merge_temp_courses(real: &[Course], draft: &Draft) -> Vec<Course> {
    let mut suprimidos: HashSet<&str> = draft.overrides.iter().map(String::as_str).collect();
    suprimidos.extend(draft.temp_courses.iter().filter_map(|t| t.override_of.as_deref()));

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(real.len() + draft.temp_courses.len());

    for c in real {
        if c.course_id.is_empty() || suprimidos.contains(c.course_id.as_str()) {
            continue;
        }
        if seen.insert(c.course_id.clone()) {
            out.push(c.clone());
        }
    }

    for t in &draft.temp_courses {
        if t.course_id.is_empty() || !seen.insert(t.course_id.clone()) {
            continue;
        }
        let mut c = t.clone();
        c.sigla = c.sigla.trim().to_string();
        c.nombre = c.nombre.trim().to_string();
        c.creditos = c.creditos.max(0);
        c.semestre_ofrecido = c
            .semestre_ofrecido
            .iter()
            .filter_map(|o| parse_offering_code(o))
            .map(str::to_string)
            .collect();
        c.is_temp = true;
        out.push(c);
    }

    debug!(
        "[placement] {} reales + {} temporales -> {} efectivos ({} suprimidos)",
        real.len(),
        draft.temp_courses.len(),
        out.len(),
        suprimidos.len()
    );
    out
}

/// course_id -> term_id para cada curso efectivo: primero el `term_id`
/// canónico, luego las ubicaciones del borrador (que ganan). Ubicaciones de
/// cursos que no están en la lista (p. ej. reales reemplazados) se descartan.
pub fn resolve_placements(courses: &[Course], draft_placements: &Placements) -> Placements {
    let mut placements = Placements::new();
    for c in courses {
        if c.course_id.is_empty() {
            continue;
        }
        if let Some(tid) = c.term_id.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            placements.insert(c.course_id.clone(), tid.to_string());
        }
    }

    let efectivos: HashSet<&str> = courses.iter().map(|c| c.course_id.as_str()).collect();
    for (cid, tid) in draft_placements {
        let (cid, tid) = (cid.trim(), tid.trim());
        if cid.is_empty() || tid.is_empty() || !efectivos.contains(cid) {
            continue;
        }
        placements.insert(cid.to_string(), tid.to_string());
    }
    placements
}

/// Períodos cargados ∪ períodos propios del borrador ∪ períodos usados por
/// alguna ubicación, ordenados cronológicamente (desempate por
/// `term_order` y luego por id).
pub fn resolve_effective_terms(
    terms: &[Term],
    draft: &Draft,
    placements: &Placements,
    config: &PlannerConfig,
) -> Vec<Term> {
    let mut by_id: BTreeMap<String, Term> = BTreeMap::new();
    for t in terms {
        if !t.term_id.is_empty() {
            by_id
                .entry(t.term_id.clone())
                .or_insert_with(|| completar_periodo(t, config));
        }
    }

    let extra = draft.custom_term_ids().chain(placements.values().map(String::as_str));
    for tid in extra {
        let tid = tid.trim();
        if tid.is_empty() || by_id.contains_key(tid) {
            continue;
        }
        let term = make_term(tid, config, true).unwrap_or_else(|| Term {
            term_id: tid.to_string(),
            year: 0,
            sem: 0,
            code: "?".to_string(),
            folder_name: String::new(),
            is_custom: true,
        });
        by_id.insert(tid.to_string(), term);
    }

    let mut out: Vec<Term> = by_id.into_values().collect();
    sort_terms(&mut out, &draft.term_order);
    out
}

/// Un período recibido sin `code` lo deriva de su id (y de paso año y semestre).
fn completar_periodo(t: &Term, config: &PlannerConfig) -> Term {
    let mut t = t.clone();
    if t.code.trim().is_empty() {
        if let Some(p) = parse_term(&t.term_id) {
            t.year = p.year;
            t.sem = p.sem;
            t.code = term_code(p.sem, config);
        }
    }
    t
}

/// Resolución completa: cursos efectivos, ubicaciones y períodos.
pub fn resolve_effective_plan(
    terms: &[Term],
    courses: &[Course],
    draft: &Draft,
    config: &PlannerConfig,
) -> EffectivePlan {
    let courses = merge_temp_courses(courses, draft);
    let placements = resolve_placements(&courses, &draft.placements);
    let terms = resolve_effective_terms(terms, draft, &placements, config);
    EffectivePlan { terms, courses, placements }
}
