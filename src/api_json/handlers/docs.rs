use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::api_json::EvaluateRequest;
use crate::draft::Draft;
use crate::models::Course;

pub async fn help_handler() -> impl Responder {
    let mut draft = Draft::default();
    draft.place_course("b", "2025-1");
    let example = EvaluateRequest {
        terms: Vec::new(),
        courses: vec![
            Course::new("a", "MAT1610", 10).en_periodo("2024-1").aprobado(true),
            Course::new("b", "MAT1620", 10)
                .en_periodo("2024-2")
                .con_requisitos(["MAT1610", "FIS1514(c)"])
                .ofrecido_en(["P"]),
        ],
        draft,
        config: None,
    };

    let help = json!({
        "description": "API del planificador de malla. Lee períodos y cursos desde la bóveda de notas, aplica el borrador y calcula advertencias y el grafo de desbloqueo.",
        "endpoints": [
            "GET /api/config",
            "GET /api/all",
            "GET /api/draft",
            "POST /api/draft",
            "POST /api/draft/reset",
            "POST /api/materialize",
            "GET /api/plan",
            "POST /api/evaluate",
            "POST /api/unlock"
        ],
        "evaluate_example": example,
        "unlock_example": {"course_id": "a", "courses": [], "terms": []},
        "note": "Los requisitos se escriben como \"SIGLA\" (prerrequisito) o \"SIGLA(c)\" (correquisito); \"nt\" significa sin requisitos."
    });

    HttpResponse::Ok().json(help)
}
