// warnings.rs - motor de advertencias (carga de créditos, requisitos, oferta)
//
// Función pura: recibe la vista efectiva y devuelve la lista completa de
// advertencias, ya ordenada. Los ids son deterministas (causa + sujeto) para
// que el estado "ignorado" guardado en el borrador sobreviva a cada recálculo.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use strsim::jaro_winkler;

use super::placement::effective_term_of;
use super::terms::{TermOrder, POSICION_DESCONOCIDA};
use crate::config::PlannerConfig;
use crate::models::{
    sigla_key, Course, IgnoredWarnings, Placements, Requisito, Term, Warning, WarningKind,
    WarningScope, WarningSummary,
};

/// Similitud mínima para sugerir una sigla parecida a una desconocida.
const UMBRAL_SUGERENCIA: f64 = 0.88;

/// Contexto de una evaluación: índices armados una sola vez.
struct Contexto<'a> {
    order: TermOrder,
    code_by_term: HashMap<&'a str, &'a str>,
    by_sigla: HashMap<String, &'a Course>,
    placements: &'a Placements,
    ignored: &'a IgnoredWarnings,
}

impl<'a> Contexto<'a> {
    fn new(
        terms: &'a [Term],
        courses: &'a [Course],
        placements: &'a Placements,
        ignored: &'a IgnoredWarnings,
    ) -> Self {
        let code_by_term = terms
            .iter()
            .map(|t| (t.term_id.as_str(), t.code.as_str()))
            .collect();
        // si dos cursos comparten sigla gana el último
        let mut by_sigla = HashMap::new();
        for c in courses {
            let key = c.sigla_key();
            if !key.is_empty() {
                by_sigla.insert(key, c);
            }
        }
        Contexto {
            order: TermOrder::from_terms(terms),
            code_by_term,
            by_sigla,
            placements,
            ignored,
        }
    }

    fn term_of(&self, c: &'a Course) -> Option<&'a str> {
        effective_term_of(c, self.placements)
    }

    fn rank(&self, term_id: Option<&str>) -> usize {
        self.order.rank(term_id)
    }

    fn resolve(&self, req: &Requisito) -> Option<&'a Course> {
        self.by_sigla.get(&req.key()).copied()
    }

    fn sugerencia(&self, code: &str) -> Option<&str> {
        let key = sigla_key(code);
        self.by_sigla
            .iter()
            .map(|(k, c)| (jaro_winkler(&key, k), c.sigla.trim()))
            .filter(|(score, _)| *score >= UMBRAL_SUGERENCIA)
            .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, s)| s)
    }

    fn is_ignored(&self, id: &str) -> bool {
        self.ignored.get(id).copied().unwrap_or(false)
    }
}

fn course_warning(
    ctx: &Contexto<'_>,
    kind: WarningKind,
    id: String,
    course: &Course,
    term_id: Option<&str>,
    requisito: Option<&str>,
    text: String,
) -> Warning {
    Warning {
        ignored: ctx.is_ignored(&id),
        id,
        kind,
        scope: WarningScope::Course,
        term_id: term_id.map(str::to_string),
        course_id: Some(course.course_id.clone()),
        sigla: Some(course.sigla.trim().to_string()),
        requisito: requisito.map(str::to_string),
        credits: None,
        text,
    }
}

/// Calcula todas las advertencias de la malla efectiva.
///
/// `terms` debe venir en el orden de presentación; la posición de cada
/// período en esa lista (junto con su índice cronológico) define
/// "antes/mismo/después". Cursos aprobados no generan advertencias propias.
pub fn compute_warnings(
    terms: &[Term],
    courses: &[Course],
    placements: &Placements,
    ignored: &IgnoredWarnings,
    config: &PlannerConfig,
) -> Vec<Warning> {
    let ctx = Contexto::new(terms, courses, placements, ignored);
    let mut warnings = Vec::new();

    check_credit_load(&ctx, courses, config, &mut warnings);

    for course in courses.iter().filter(|c| !c.aprobado) {
        check_offering(&ctx, course, &mut warnings);
        check_prerrequisitos(&ctx, course, &mut warnings);
        check_correquisitos(&ctx, course, &mut warnings);
    }

    sort_warnings(&ctx.order, &mut warnings);
    debug!(
        "[warnings] {} advertencias ({} ignoradas) sobre {} cursos",
        warnings.len(),
        warnings.iter().filter(|w| w.ignored).count(),
        courses.len()
    );
    warnings
}

fn check_credit_load(
    ctx: &Contexto<'_>,
    courses: &[Course],
    config: &PlannerConfig,
    out: &mut Vec<Warning>,
) {
    let mut por_periodo: BTreeMap<&str, i64> = BTreeMap::new();
    for c in courses {
        if let Some(tid) = ctx.term_of(c) {
            *por_periodo.entry(tid).or_insert(0) += c.creditos as i64;
        }
    }

    let (max, soft) = (config.max_credits as i64, config.soft_credits as i64);
    for (tid, total) in por_periodo {
        let (kind, id, text) = if total > max {
            (
                WarningKind::Hard,
                format!("credits:hard:{}", tid),
                format!("Sobrecarga: {} créditos (máx {})", total, max),
            )
        } else if total > soft {
            (
                WarningKind::Soft,
                format!("credits:soft:{}", tid),
                format!("Carga alta: {} créditos (sobre {})", total, soft),
            )
        } else {
            continue;
        };
        out.push(Warning {
            ignored: ctx.is_ignored(&id),
            id,
            kind,
            scope: WarningScope::Term,
            term_id: Some(tid.to_string()),
            course_id: None,
            sigla: None,
            requisito: None,
            credits: Some(total),
            text,
        });
    }
}

fn check_offering(ctx: &Contexto<'_>, course: &Course, out: &mut Vec<Warning>) {
    if course.semestre_ofrecido.is_empty() {
        return;
    }
    let Some(tid) = ctx.term_of(course) else {
        return;
    };
    let Some(code) = ctx.code_by_term.get(tid).copied().filter(|c| !c.is_empty()) else {
        return;
    };
    if course.semestre_ofrecido.iter().any(|o| o == code) {
        return;
    }
    out.push(course_warning(
        ctx,
        WarningKind::Soft,
        format!("offered:{}:{}", course.course_id, tid),
        course,
        Some(tid),
        None,
        format!("{} no se ofrece en este período ({}).", course.label(), code),
    ));
}

fn check_prerrequisitos(ctx: &Contexto<'_>, course: &Course, out: &mut Vec<Warning>) {
    let tid = ctx.term_of(course);
    let rank_curso = ctx.rank(tid);
    let tid_txt = tid.unwrap_or("");

    for req in course.prerrequisitos_simples() {
        let Some(rc) = ctx.resolve(req) else {
            let mut text = format!("{} tiene prerrequisito desconocido: {}.", course.label(), req.code);
            if let Some(s) = ctx.sugerencia(&req.code) {
                text.push_str(&format!(" ¿Quizás {}?", s));
            }
            out.push(course_warning(
                ctx,
                WarningKind::Hard,
                format!("prereq:missing:{}:{}:{}", course.course_id, req.code, tid_txt),
                course,
                tid,
                Some(&req.code),
                text,
            ));
            continue;
        };

        if rc.aprobado {
            continue;
        }

        // un curso sin período queda al final; el requisito ubicado va antes
        let rank_req = ctx.rank(ctx.term_of(rc));
        if rank_req == POSICION_DESCONOCIDA || rank_req >= rank_curso {
            out.push(course_warning(
                ctx,
                WarningKind::Hard,
                format!("prereq:misplaced:{}:{}:{}", course.course_id, req.code, tid_txt),
                course,
                tid,
                Some(&req.code),
                format!("{} requiere {} en un período anterior.", course.label(), req.code),
            ));
        } else {
            out.push(course_warning(
                ctx,
                WarningKind::Soft,
                format!("prereq:pending:{}:{}:{}", course.course_id, req.code, tid_txt),
                course,
                tid,
                Some(&req.code),
                format!("{} requiere {}, que aún no está aprobado.", course.label(), req.code),
            ));
        }
    }
}

fn check_correquisitos(ctx: &Contexto<'_>, course: &Course, out: &mut Vec<Warning>) {
    let tid = ctx.term_of(course);
    let rank_curso = ctx.rank(tid);
    let tid_txt = tid.unwrap_or("");

    for req in course.correquisitos() {
        let Some(rc) = ctx.resolve(req) else {
            out.push(course_warning(
                ctx,
                WarningKind::Soft,
                format!("coreq:unknown:{}:{}", course.course_id, req.code),
                course,
                tid,
                Some(&req.code),
                format!("{} tiene correquisito desconocido: {}.", course.label(), req.code),
            ));
            continue;
        };

        if rc.aprobado {
            continue;
        }

        let rank_req = ctx.rank(ctx.term_of(rc));
        let desconocido = rank_curso == POSICION_DESCONOCIDA || rank_req == POSICION_DESCONOCIDA;
        // mismo período o anterior está bien (incluye pares mutuos en el mismo período)
        if desconocido || rank_req > rank_curso {
            out.push(course_warning(
                ctx,
                WarningKind::Hard,
                format!("coreq:missing:{}:{}:{}", course.course_id, req.code, tid_txt),
                course,
                tid,
                Some(&req.code),
                format!(
                    "{} requiere correquisito {} en el mismo semestre o en uno anterior.",
                    course.label(),
                    req.code
                ),
            ));
        }
    }
}

/// Clave de orden para texto en español: minúsculas y sin tildes, la ñ justo
/// después de la n.
fn clave_orden(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'á' | 'à' | 'ä' => out.push('a'),
            'é' | 'è' | 'ë' => out.push('e'),
            'í' | 'ì' | 'ï' => out.push('i'),
            'ó' | 'ò' | 'ö' => out.push('o'),
            'ú' | 'ù' | 'ü' => out.push('u'),
            'ñ' => out.push_str("n\u{10FFFF}"),
            _ => out.push(c),
        }
    }
    out
}

/// Activas antes que ignoradas, duras antes que blandas, luego por período,
/// texto e id (orden total, así la salida es determinista).
fn sort_warnings(order: &TermOrder, warnings: &mut [Warning]) {
    warnings.sort_by_cached_key(|w| {
        (
            w.ignored,
            w.kind,
            order.rank(w.term_id.as_deref()),
            clave_orden(&w.text),
            w.text.clone(),
            w.id.clone(),
        )
    });
}

/// Primera advertencia dura y primera blanda que no estén ignoradas.
pub fn first_warning_summary(warnings: &[Warning]) -> WarningSummary {
    let first = |kind: WarningKind| warnings.iter().find(|w| !w.ignored && w.kind == kind).cloned();
    WarningSummary {
        first_hard: first(WarningKind::Hard),
        first_soft: first(WarningKind::Soft),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(tid: &str, code: &str) -> Term {
        let mut t = crate::algorithm::make_term(tid, &PlannerConfig::default(), false).unwrap();
        t.code = code.to_string();
        t
    }

    #[test]
    fn test_unknown_prereq_suggests_close_sigla() {
        let terms = vec![term("2024-1", "I"), term("2024-2", "P")];
        let courses = vec![
            Course::new("a", "MAT1610", 10).en_periodo("2024-1"),
            Course::new("b", "MAT1620", 10).en_periodo("2024-2").con_requisitos(["MAT1601"]),
        ];
        let w = compute_warnings(
            &terms,
            &courses,
            &Placements::new(),
            &IgnoredWarnings::new(),
            &PlannerConfig::default(),
        );
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].id, "prereq:missing:b:MAT1601:2024-2");
        assert!(w[0].text.contains("MAT1601"));
        assert!(w[0].text.contains("¿Quizás MAT1610?"));
    }

    #[test]
    fn test_summary_skips_ignored() {
        let mk = |id: &str, kind, ignored| Warning {
            id: id.to_string(),
            kind,
            scope: WarningScope::Term,
            term_id: None,
            course_id: None,
            sigla: None,
            requisito: None,
            credits: None,
            text: id.to_string(),
            ignored,
        };
        let ws = vec![
            mk("h1", WarningKind::Hard, true),
            mk("s1", WarningKind::Soft, false),
            mk("h2", WarningKind::Hard, false),
        ];
        let s = first_warning_summary(&ws);
        assert_eq!(s.first_hard.map(|w| w.id), Some("h2".to_string()));
        assert_eq!(s.first_soft.map(|w| w.id), Some("s1".to_string()));
    }

    #[test]
    fn test_text_order_ignores_case_and_accents() {
        let mk = |id: &str, text: &str| Warning {
            id: id.to_string(),
            kind: WarningKind::Soft,
            scope: WarningScope::Course,
            term_id: Some("2024-1".to_string()),
            course_id: Some(id.to_string()),
            sigla: None,
            requisito: None,
            credits: None,
            text: text.to_string(),
            ignored: false,
        };
        let mut ws = vec![
            mk("z", "zeta no se ofrece en este período (I)."),
            mk("n2", "Ñandú no se ofrece en este período (I)."),
            mk("a", "Álgebra no se ofrece en este período (I)."),
            mk("n1", "nube no se ofrece en este período (I)."),
            mk("b", "Biología no se ofrece en este período (I)."),
        ];
        sort_warnings(&TermOrder::default(), &mut ws);
        let ids: Vec<&str> = ws.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "n1", "n2", "z"]);
        assert_eq!(clave_orden("Álgebra Ñ"), clave_orden("algebra ñ"));
    }
}
