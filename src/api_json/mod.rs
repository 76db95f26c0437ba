pub mod handlers;

use serde::{Deserialize, Serialize};

use crate::algorithm::{evaluar_plan, PlanEvaluation};
use crate::config::PlannerConfig;
use crate::draft::Draft;
use crate::models::{Course, Term};

/// Foto de la malla enviada por el cliente para evaluar sin leer la bóveda.
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "terms": [{"term_id": "2024-1", "code": "I"}, {"term_id": "2024-2", "code": "P"}],
///   "courses": [
///     {"course_id": "a", "sigla": "MAT1610", "creditos": 10, "term_id": "2024-1", "aprobado": true},
///     {"course_id": "b", "sigla": "MAT1620", "creditos": 10, "term_id": "2024-2",
///      "prerrequisitos": ["MAT1610"], "semestreOfrecido": ["P"]}
///   ],
///   "draft": {"placements": {"b": "2025-1"}, "ignored_warnings": {}},
///   "config": {"max_credits": 65, "soft_credits": 50}
/// }
/// ```
///
/// # Campos:
/// - `terms`: períodos conocidos (los del borrador y las ubicaciones se agregan solos)
/// - `courses`: cursos reales; lectura tolerante (ver `models::Course`)
/// - `draft`: capa del usuario (opcional)
/// - `config`: umbrales de créditos (opcional; por defecto los del servidor)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub draft: Draft,
    #[serde(default)]
    pub config: Option<PlannerConfig>,
}

/// `EvaluateRequest` + el curso seleccionado.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    pub course_id: String,
    #[serde(flatten)]
    pub snapshot: EvaluateRequest,
}

pub fn parse_evaluate_request(json_str: &str) -> Result<EvaluateRequest, serde_json::Error> {
    serde_json::from_str(json_str)
}

pub fn parse_unlock_request(json_str: &str) -> Result<UnlockRequest, serde_json::Error> {
    serde_json::from_str(json_str)
}

/// Evalúa una foto enviada por el cliente. `default_config` se usa si la foto
/// no trae configuración propia.
pub fn evaluate_request(req: &EvaluateRequest, default_config: &PlannerConfig) -> PlanEvaluation {
    let config = req.config.as_ref().unwrap_or(default_config);
    evaluar_plan(&req.terms, &req.courses, &req.draft, config)
}

/// Respuesta de `/api/unlock`.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockResponse {
    pub course_id: String,
    pub known: bool,
    pub is_reachable: bool,
    /// Dependientes transitivos (lo que "parpadea" en la UI).
    pub reachable: Vec<String>,
    /// Dependientes directos.
    pub unlocks: Vec<String>,
}

pub fn unlock_request(req: &UnlockRequest, default_config: &PlannerConfig) -> UnlockResponse {
    let eval = evaluate_request(&req.snapshot, default_config);
    let cid = req.course_id.trim();
    UnlockResponse {
        course_id: cid.to_string(),
        known: eval.unlock.contains(cid),
        is_reachable: eval.unlock.is_reachable(cid),
        reachable: eval.closure_from(cid).into_iter().collect(),
        unlocks: eval.unlock.unlocks(cid).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate_request_completo() {
        let json_data = r#"
        {
            "terms": [{"term_id": "2024-1", "code": "I"}, {"term_id": "2024-2", "code": "P"}],
            "courses": [
                {"course_id": "a", "sigla": "MAT1610", "creditos": 10, "term_id": "2024-1", "aprobado": true},
                {"course_id": "b", "sigla": "MAT1620", "creditos": "10", "term_id": "2024-2", "prerrequisitos": ["MAT1610"]}
            ],
            "draft": {"placements": {"b": "2025-1"}},
            "config": {"max_credits": 20}
        }
        "#;
        let req = parse_evaluate_request(json_data).expect("Debe parsear la foto");
        assert_eq!(req.terms.len(), 2);
        assert_eq!(req.courses[1].creditos, 10);
        assert_eq!(req.draft.placements.get("b").map(String::as_str), Some("2025-1"));
        let cfg = req.config.clone().expect("Debe haber config");
        assert_eq!(cfg.max_credits, 20);
        assert_eq!(cfg.soft_credits, 50);

        let eval = evaluate_request(&req, &PlannerConfig::default());
        let ids: Vec<&str> = eval.plan.terms.iter().map(|t| t.term_id.as_str()).collect();
        assert_eq!(ids, vec!["2024-1", "2024-2", "2025-1"]);
        assert!(eval.warnings.is_empty());
        assert!(eval.reachable.contains("b"));
    }

    #[test]
    fn test_parse_evaluate_request_vacio() {
        let req = parse_evaluate_request("{}").expect("Debe parsear objeto vacío");
        assert!(req.terms.is_empty());
        assert!(req.courses.is_empty());
        assert!(req.config.is_none());
        let eval = evaluate_request(&req, &PlannerConfig::default());
        assert!(eval.warnings.is_empty());
        assert!(eval.reachable.is_empty());
    }

    #[test]
    fn test_unlock_request_unknown_course() {
        let req = parse_unlock_request(r#"{"course_id": "nada", "courses": []}"#).unwrap();
        let resp = unlock_request(&req, &PlannerConfig::default());
        assert!(!resp.known);
        assert!(resp.reachable.is_empty());
        assert!(resp.unlocks.is_empty());
    }
}
