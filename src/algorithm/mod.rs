// algorithm/mod.rs - orquestador de una evaluación de la malla
//
// Pipeline (se recalcula completo en cada cambio del borrador):
// FASE 1: resolver vista efectiva (cursos reales + temporales, ubicaciones, períodos)
// FASE 2: motor de advertencias
// FASE 3: grafo de desbloqueo (alcanzables + aristas vivas)
//
// Todo es puro: mismas entradas => misma salida.

pub mod placement;
pub mod terms;
pub mod unlock;
pub mod warnings;

pub use placement::{
    effective_term_of, merge_temp_courses, resolve_effective_plan, resolve_effective_terms,
    resolve_placements, EffectivePlan,
};
pub use terms::{
    make_term, next_non_summer, parse_offering_code, parse_term, parse_term_prefix, sort_terms,
    suggest_next_term, term_code, term_index, TermOrder, TermParts, INDICE_DESCONOCIDO,
    POSICION_DESCONOCIDA,
};
pub use unlock::UnlockGraph;
pub use warnings::{compute_warnings, first_warning_summary};

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::config::PlannerConfig;
use crate::draft::Draft;
use crate::models::{Course, Term, Warning, WarningSummary};

/// Resultado de evaluar la malla efectiva.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEvaluation {
    #[serde(flatten)]
    pub plan: EffectivePlan,
    pub warnings: Vec<Warning>,
    pub summary: WarningSummary,
    pub reachable: BTreeSet<String>,
    /// Sugerencia para "agregar período".
    pub next_term: String,
    #[serde(skip)]
    pub unlock: UnlockGraph,
}

impl PlanEvaluation {
    pub fn closure_from(&self, course_id: &str) -> BTreeSet<String> {
        self.unlock.reachable_closure_from(course_id)
    }
}

/// Evalúa la malla: resuelve la vista efectiva y corre ambos motores sobre ella.
pub fn evaluar_plan(
    terms: &[Term],
    courses: &[Course],
    draft: &Draft,
    config: &PlannerConfig,
) -> PlanEvaluation {
    // FASE 1
    let plan = resolve_effective_plan(terms, courses, draft, config);

    // FASE 2
    let warnings = compute_warnings(
        &plan.terms,
        &plan.courses,
        &plan.placements,
        &draft.ignored_warnings,
        config,
    );
    let summary = first_warning_summary(&warnings);

    // FASE 3
    let unlock = UnlockGraph::build(&plan.terms, &plan.courses, &plan.placements);
    let reachable = unlock.reachable_ids().clone();

    let next_term = suggest_next_term(&plan.terms, &plan.courses, &plan.placements, None).term_id();

    debug!(
        "[algorithm::evaluar_plan] {} períodos, {} cursos, {} advertencias, {} alcanzables",
        plan.terms.len(),
        plan.courses.len(),
        warnings.len(),
        reachable.len()
    );

    PlanEvaluation { plan, warnings, summary, reachable, next_term, unlock }
}
