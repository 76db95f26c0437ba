// terms.rs - orden cronológico de períodos ("YYYY-S")
//
// Un período se identifica como "<año>-<sem>" con sem 0 (verano), 1 o 2.
// El índice cronológico es año*10 + sem; lo que no se puede parsear ordena
// al final (INDICE_DESCONOCIDO).

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Datelike;

use crate::config::PlannerConfig;
use crate::models::{Course, Placements, Term};

/// Índice de un período no parseable: queda después de todos los conocidos.
pub const INDICE_DESCONOCIDO: i64 = i64::MAX;

/// Posición de un período que no está en la lista ordenada.
pub const POSICION_DESCONOCIDA: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermParts {
    pub year: i32,
    pub sem: u8,
}

impl TermParts {
    pub fn new(year: i32, sem: u8) -> Self {
        TermParts { year, sem }
    }

    pub fn index(&self) -> i64 {
        self.year as i64 * 10 + self.sem as i64
    }

    pub fn term_id(&self) -> String {
        format!("{}-{}", self.year, self.sem)
    }
}

/// Parsea exactamente `"YYYY-S"` (4 dígitos, guion, 0..=2).
pub fn parse_term(term_id: &str) -> Option<TermParts> {
    let s = term_id.trim();
    let (y, sem) = s.split_once('-')?;
    if y.len() != 4 || !y.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if sem.len() != 1 {
        return None;
    }
    let sem = match sem.as_bytes()[0] {
        b @ b'0'..=b'2' => b - b'0',
        _ => return None,
    };
    Some(TermParts { year: y.parse().ok()?, sem })
}

/// Como `parse_term`, pero acepta sufijos (nombres de carpeta como
/// `"2024-1 Otoño"`). El prefijo no puede seguir con otro dígito.
pub fn parse_term_prefix(name: &str) -> Option<TermParts> {
    let s = name.trim();
    let head = s.get(..6)?;
    if s.as_bytes().get(6).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_term(head)
}

pub fn term_index(term_id: &str) -> i64 {
    parse_term(term_id).map(|p| p.index()).unwrap_or(INDICE_DESCONOCIDO)
}

/// verano -> 1 del mismo año; 1 -> 2; 2 -> 1 del año siguiente.
pub fn next_non_summer(parts: TermParts) -> TermParts {
    match parts.sem {
        0 => TermParts::new(parts.year, 1),
        1 => TermParts::new(parts.year, 2),
        _ => TermParts::new(parts.year + 1, 1),
    }
}

/// Código de oferta de un semestre según la configuración; "?" si no existe.
pub fn term_code(sem: u8, config: &PlannerConfig) -> String {
    config
        .term_code_by_sem
        .get(&sem)
        .cloned()
        .unwrap_or_else(|| "?".to_string())
}

/// Normaliza un código de oferta: "0"/"1"/"2" o "V"/"I"/"P".
pub fn parse_offering_code(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "0" | "V" => Some("V"),
        "1" | "I" => Some("I"),
        "2" | "P" => Some("P"),
        _ => None,
    }
}

/// Construye un `Term` a partir de su id (None si no parsea).
pub fn make_term(term_id: &str, config: &PlannerConfig, is_custom: bool) -> Option<Term> {
    let parts = parse_term(term_id)?;
    Some(Term {
        term_id: parts.term_id(),
        year: parts.year,
        sem: parts.sem,
        code: term_code(parts.sem, config),
        folder_name: if is_custom { String::new() } else { parts.term_id() },
        is_custom,
    })
}

/// Orden total de períodos: índice cronológico, luego orden declarado,
/// luego id lexicográfico. El orden declarado nunca pasa por encima de la
/// cronología.
#[derive(Debug, Clone, Default)]
pub struct TermOrder {
    ordered: Vec<String>,
    position: HashMap<String, usize>,
}

impl TermOrder {
    pub fn new<'a, I>(term_ids: I, declared_order: &[String]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let declared: HashMap<&str, usize> = declared_order
            .iter()
            .enumerate()
            .rev()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut ordered: Vec<String> = Vec::new();
        for tid in term_ids {
            if !tid.is_empty() && !ordered.iter().any(|t| t == tid) {
                ordered.push(tid.to_string());
            }
        }
        ordered.sort_by(|a, b| compare_term_ids(a, b, &declared));

        let position = ordered.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();
        TermOrder { ordered, position }
    }

    /// Usa el orden de la lista como orden declarado.
    pub fn from_terms(terms: &[Term]) -> Self {
        let declared: Vec<String> = terms.iter().map(|t| t.term_id.clone()).collect();
        TermOrder::new(terms.iter().map(|t| t.term_id.as_str()), &declared)
    }

    pub fn position_of(&self, term_id: &str) -> Option<usize> {
        self.position.get(term_id).copied()
    }

    /// Posición para comparar; `None` o desconocido => POSICION_DESCONOCIDA.
    pub fn rank(&self, term_id: Option<&str>) -> usize {
        term_id.and_then(|t| self.position_of(t)).unwrap_or(POSICION_DESCONOCIDA)
    }

    pub fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    pub fn ordered(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn compare_term_ids(a: &str, b: &str, declared: &HashMap<&str, usize>) -> Ordering {
    let da = declared.get(a).copied().unwrap_or(usize::MAX);
    let db = declared.get(b).copied().unwrap_or(usize::MAX);
    term_index(a)
        .cmp(&term_index(b))
        .then(da.cmp(&db))
        .then_with(|| a.cmp(b))
}

/// Ordena períodos in-place con el mismo criterio que `TermOrder`.
pub fn sort_terms(terms: &mut [Term], declared_order: &[String]) {
    let declared: HashMap<&str, usize> = declared_order
        .iter()
        .enumerate()
        .rev()
        .map(|(i, t)| (t.as_str(), i))
        .collect();
    terms.sort_by(|a, b| compare_term_ids(&a.term_id, &b.term_id, &declared));
}

/// Período por defecto al agregar uno nuevo: el siguiente no-verano después
/// del último período con cursos; si no hay cursos ubicados, después del
/// último período conocido; si nada parsea, `fallback_year-1`.
pub fn suggest_next_term(
    terms: &[Term],
    courses: &[Course],
    placements: &Placements,
    fallback_year: Option<i32>,
) -> TermParts {
    let con_cursos = courses
        .iter()
        .filter_map(|c| placements.get(&c.course_id).or(c.term_id.as_ref()))
        .filter_map(|t| parse_term(t))
        .max();

    let ultimo = con_cursos.or_else(|| terms.iter().filter_map(|t| parse_term(&t.term_id)).max());

    match ultimo {
        Some(p) => next_non_summer(p),
        None => {
            let year = fallback_year.unwrap_or_else(|| chrono::Local::now().year());
            TermParts::new(year, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_term_strict() {
        assert_eq!(parse_term("2024-1"), Some(TermParts::new(2024, 1)));
        assert_eq!(parse_term(" 2023-0 "), Some(TermParts::new(2023, 0)));
        assert_eq!(parse_term("2024-3"), None);
        assert_eq!(parse_term("24-1"), None);
        assert_eq!(parse_term("2024-1x"), None);
        assert_eq!(parse_term(""), None);
    }

    #[test]
    fn test_parse_term_prefix_folders() {
        assert_eq!(parse_term_prefix("2024-2 Primavera"), Some(TermParts::new(2024, 2)));
        assert_eq!(parse_term_prefix("2024-2"), Some(TermParts::new(2024, 2)));
        assert_eq!(parse_term_prefix("2024-21"), None);
        assert_eq!(parse_term_prefix("Notas"), None);
    }

    #[test]
    fn test_offering_codes() {
        assert_eq!(parse_offering_code("0"), Some("V"));
        assert_eq!(parse_offering_code("i"), Some("I"));
        assert_eq!(parse_offering_code(" P "), Some("P"));
        assert_eq!(parse_offering_code("X"), None);
    }
}
