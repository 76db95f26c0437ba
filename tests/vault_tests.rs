use std::fs;
use std::path::Path;

use mallaplan::config::PlannerConfig;
use mallaplan::vault::{discover_all, materialize_course, MaterializeRequest};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn nota(dir: &Path, nombre: &str, cuerpo: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(nombre), cuerpo).unwrap();
}

#[test]
fn test_discover_direct_layout() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();
    nota(
        &base.join("2024-1 Otoño").join(",Cursos"),
        "MAT1610.md",
        "---\nsigla: MAT1610\nnombre: Cálculo I\ncreditos: 10\naprobado: true\n---\n# notas\n",
    );
    nota(
        &base.join("2024-2").join("Cursos"),
        "MAT1620.md",
        "---\nsigla: MAT1620\ncréditos: \"10\"\nprerrequisitos:\n  - MAT1610\nsemestreOfrecido: [2]\n---\n",
    );
    nota(&base.join("2024-2").join("Cursos"), "sin_frontmatter.md", "solo texto\n");
    fs::create_dir_all(base.join("Plantillas")).unwrap();

    let d = discover_all(base, &PlannerConfig::default());
    assert_eq!(d.debug.mode.as_deref(), Some("direct"));
    let tids: Vec<&str> = d.terms.iter().map(|t| t.term_id.as_str()).collect();
    assert_eq!(tids, vec!["2024-1", "2024-2"]);
    assert_eq!(d.terms[0].folder_name, "2024-1 Otoño");
    assert_eq!(d.terms[1].code, "P");

    assert_eq!(d.courses.len(), 3);
    let calc1 = d.courses.iter().find(|c| c.sigla == "MAT1610").unwrap();
    assert_eq!(calc1.course_id, "2024-1 Otoño/,Cursos/MAT1610.md");
    assert!(calc1.aprobado);
    assert_eq!(calc1.nombre, "Cálculo I");

    let calc2 = d.courses.iter().find(|c| c.sigla == "MAT1620").unwrap();
    assert_eq!(calc2.creditos, 10);
    assert_eq!(calc2.prerrequisitos.len(), 1);
    assert_eq!(calc2.semestre_ofrecido, vec!["P"]);

    // sin frontmatter la sigla sale del nombre del archivo
    assert!(d.courses.iter().any(|c| c.sigla == "sin_frontmatter" && c.creditos == 0));
    assert_eq!(d.debug.md_found_total, 3);
}

#[test]
fn test_discover_nested_fallback() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();
    nota(
        &base.join("Universidad").join("Ingeniería").join("2025-1").join(",Cursos"),
        "IIC2233.md",
        "---\nsigla: IIC2233\ncreditos: 10\n---\n",
    );
    let d = discover_all(base, &PlannerConfig::default());
    assert_eq!(d.debug.mode.as_deref(), Some("fallback_depth5"));
    assert_eq!(d.terms.len(), 1);
    assert_eq!(d.courses[0].term_id.as_deref(), Some("2025-1"));
    assert_eq!(d.courses[0].course_id, "Universidad/Ingeniería/2025-1/,Cursos/IIC2233.md");
}

#[test]
fn test_discover_missing_base_never_fails() {
    let tmp = tempdir().unwrap();
    let d = discover_all(&tmp.path().join("no-existe"), &PlannerConfig::default());
    assert!(d.terms.is_empty());
    assert_eq!(d.debug.warnings.len(), 1);
}

#[test]
fn test_materialize_then_rediscover() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();

    let req: MaterializeRequest = serde_json::from_value(json!({
        "term_id": "2025-2",
        "sigla": "TMP-001",
        "nombre": "Electivo de prueba",
        "creditos": 5,
        "prerrequisitos": ["IIC2233", "MAT1620(c)"],
        "frontmatter": {"notaObtenida": 6.5}
    }))
    .unwrap();
    let rel = materialize_course(base, &req).unwrap();
    assert_eq!(rel, "2025-2/,Cursos/TMP-001.md");

    let texto = fs::read_to_string(base.join(&rel)).unwrap();
    assert!(texto.starts_with("---\n"));
    assert!(texto.contains("dg-publish: true"));

    let d = discover_all(base, &PlannerConfig::default());
    assert_eq!(d.courses.len(), 1);
    let c = &d.courses[0];
    assert_eq!(c.sigla, "TMP-001");
    assert_eq!(c.creditos, 5);
    assert_eq!(c.term_id.as_deref(), Some("2025-2"));
    assert_eq!(c.prerrequisitos.len(), 2);
    assert_eq!(c.frontmatter.get("notaObtenida"), Some(&json!(6.5)));
    assert_eq!(c.frontmatter.get("semestre"), Some(&json!(2)));
}

#[test]
fn test_materialize_rejects_bad_input() {
    let tmp = tempdir().unwrap();
    let req = MaterializeRequest {
        term_id: "2025-9".into(),
        sigla: Some("X".into()),
        ..Default::default()
    };
    assert!(materialize_course(tmp.path(), &req).is_err());

    let req = MaterializeRequest { term_id: "2025-1".into(), ..Default::default() };
    assert!(materialize_course(tmp.path(), &req).is_err());
}
