use mallaplan::algorithm::{compute_warnings, first_warning_summary, make_term};
use mallaplan::config::PlannerConfig;
use mallaplan::models::{Course, IgnoredWarnings, Placements, Term, Warning, WarningKind};
use pretty_assertions::assert_eq;

fn terms(ids: &[&str]) -> Vec<Term> {
    ids.iter()
        .map(|t| make_term(t, &PlannerConfig::default(), false).unwrap())
        .collect()
}

fn run(terms: &[Term], courses: &[Course], config: &PlannerConfig) -> Vec<Warning> {
    compute_warnings(terms, courses, &Placements::new(), &IgnoredWarnings::new(), config)
}

fn ids(ws: &[Warning]) -> Vec<&str> {
    ws.iter().map(|w| w.id.as_str()).collect()
}

#[test]
fn test_credit_boundaries() {
    let cfg = PlannerConfig::with_limits(18, 15);
    let ts = terms(&["2024-1"]);

    // justo en el máximo: sin dura, pero sobre el umbral blando. Se aplica la
    // regla `total > soft_credits` aunque total == max; 18/18 da blanda a
    // propósito, no "sin advertencia".
    let w = run(&ts, &[Course::new("a", "A", 18).en_periodo("2024-1")], &cfg);
    assert!(w.iter().all(|w| w.kind != WarningKind::Hard));
    assert_eq!(ids(&w), vec!["credits:soft:2024-1"]);

    // uno sobre el máximo: una dura y ninguna blanda
    let w = run(&ts, &[Course::new("a", "A", 19).en_periodo("2024-1")], &cfg);
    assert_eq!(ids(&w), vec!["credits:hard:2024-1"]);
    assert_eq!(w[0].credits, Some(19));
    assert_eq!(w[0].term_id.as_deref(), Some("2024-1"));

    let w = run(&ts, &[Course::new("a", "A", 16).en_periodo("2024-1")], &cfg);
    assert_eq!(ids(&w), vec!["credits:soft:2024-1"]);
    assert_eq!(w[0].kind, WarningKind::Soft);

    let w = run(&ts, &[Course::new("a", "A", 15).en_periodo("2024-1")], &cfg);
    assert!(w.is_empty());
}

#[test]
fn test_credits_count_approved_courses() {
    let cfg = PlannerConfig::with_limits(18, 15);
    let courses = vec![
        Course::new("a", "A", 10).en_periodo("2024-1").aprobado(true),
        Course::new("b", "B", 10).en_periodo("2024-1"),
    ];
    let w = run(&terms(&["2024-1"]), &courses, &cfg);
    assert_eq!(ids(&w), vec!["credits:hard:2024-1"]);
}

#[test]
fn test_prereq_ordering_soft_then_hard() {
    let ts = terms(&["2024-1", "2024-2"]);
    let cfg = PlannerConfig::default();

    let ok = vec![
        Course::new("a", "MAT1610", 10).en_periodo("2024-1"),
        Course::new("b", "MAT1620", 10).en_periodo("2024-2").con_requisitos(["MAT1610"]),
    ];
    let w = run(&ts, &ok, &cfg);
    assert_eq!(ids(&w), vec!["prereq:pending:b:MAT1610:2024-2"]);
    assert_eq!(w[0].kind, WarningKind::Soft);

    // el requisito pasa al mismo período: dura
    let mut mal = ok.clone();
    mal[0].term_id = Some("2024-2".into());
    let w = run(&ts, &mal, &cfg);
    assert_eq!(ids(&w), vec!["prereq:misplaced:b:MAT1610:2024-2"]);
    assert_eq!(w[0].kind, WarningKind::Hard);
    assert_eq!(w[0].requisito.as_deref(), Some("MAT1610"));

    // o a uno posterior: también dura
    let mut peor = ok;
    peor[0].term_id = Some("2024-2".into());
    peor[1].term_id = Some("2024-1".into());
    let w = run(&ts, &peor, &cfg);
    assert_eq!(ids(&w), vec!["prereq:misplaced:b:MAT1610:2024-1"]);
}

#[test]
fn test_approved_prereq_needs_nothing_else() {
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        // aprobado pero "después": igual satisface
        Course::new("a", "MAT1610", 10).en_periodo("2024-2").aprobado(true),
        Course::new("b", "MAT1620", 10).en_periodo("2024-1").con_requisitos(["MAT1610"]),
    ];
    assert!(run(&ts, &courses, &PlannerConfig::default()).is_empty());
}

#[test]
fn test_unknown_prereq_is_hard() {
    let ts = terms(&["2024-1"]);
    let courses = vec![Course::new("b", "MAT1620", 10).en_periodo("2024-1").con_requisitos(["ZZZ"])];
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(w.len(), 1);
    assert_eq!(w[0].kind, WarningKind::Hard);
    assert!(w[0].text.contains("ZZZ"));
    assert!(!w[0].text.contains("¿Quizás"));
}

#[test]
fn test_unplaced_requirement_is_hard() {
    let ts = terms(&["2024-1"]);
    let courses = vec![
        Course::new("a", "MAT1610", 10),
        Course::new("b", "MAT1620", 10).en_periodo("2024-1").con_requisitos(["MAT1610"]),
    ];
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["prereq:misplaced:b:MAT1610:2024-1"]);
}

#[test]
fn test_unplaced_dependent_with_placed_prereq_is_soft() {
    let ts = terms(&["2024-1"]);
    let courses = vec![
        Course::new("a", "MAT1610", 10).en_periodo("2024-1"),
        Course::new("b", "MAT1620", 10).con_requisitos(["MAT1610"]),
    ];
    // sin período el dependiente queda después de todo
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["prereq:pending:b:MAT1610:"]);
    assert_eq!(w[0].kind, WarningKind::Soft);
    assert_eq!(w[0].term_id, None);

    // sin período ninguno de los dos: sigue siendo dura
    let courses = vec![
        Course::new("a", "MAT1610", 10),
        Course::new("b", "MAT1620", 10).con_requisitos(["MAT1610"]),
    ];
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["prereq:misplaced:b:MAT1610:"]);
    assert_eq!(w[0].kind, WarningKind::Hard);
}

#[test]
fn test_mutual_coreqs_same_term_no_warnings() {
    let ts = terms(&["2024-1"]);
    let courses = vec![
        Course::new("a", "FIS1513", 10).en_periodo("2024-1").con_requisitos(["FIS0151(c)"]),
        Course::new("b", "FIS0151", 2).en_periodo("2024-1").con_requisitos(["FIS1513(c)"]),
    ];
    assert!(run(&ts, &courses, &PlannerConfig::default()).is_empty());
}

#[test]
fn test_coreq_later_or_unknown() {
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        Course::new("a", "FIS1513", 10).en_periodo("2024-1").con_requisitos(["FIS0151(c)", "QQQ(c)"]),
        Course::new("b", "FIS0151", 2).en_periodo("2024-2"),
    ];
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["coreq:missing:a:FIS0151:2024-1", "coreq:unknown:a:QQQ"]);
    assert_eq!(w[0].kind, WarningKind::Hard);
    assert_eq!(w[1].kind, WarningKind::Soft);

    // correquisito en un período anterior está bien
    let mut antes = courses.clone();
    antes[1].term_id = Some("2024-1".into());
    antes[0].term_id = Some("2024-2".into());
    let w = run(&ts, &antes, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["coreq:unknown:a:QQQ"]);
}

#[test]
fn test_offering_mismatch_is_soft() {
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        Course::new("a", "IIC2233", 10).en_periodo("2024-1").ofrecido_en(["P"]),
        Course::new("b", "IIC2343", 10).en_periodo("2024-2").ofrecido_en(["2"]),
        Course::new("c", "IIC1001", 10).en_periodo("2024-1"),
    ];
    let w = run(&ts, &courses, &PlannerConfig::default());
    assert_eq!(ids(&w), vec!["offered:a:2024-1"]);
    assert_eq!(w[0].kind, WarningKind::Soft);
}

#[test]
fn test_approved_courses_emit_no_course_warnings() {
    let ts = terms(&["2024-1"]);
    let courses = vec![Course::new("a", "IIC2233", 10)
        .en_periodo("2024-1")
        .aprobado(true)
        .ofrecido_en(["P"])
        .con_requisitos(["ZZZ", "QQQ(c)"])];
    assert!(run(&ts, &courses, &PlannerConfig::default()).is_empty());
}

#[test]
fn test_sort_order_and_ignored() {
    let cfg = PlannerConfig::with_limits(18, 15);
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        Course::new("a", "A", 16).en_periodo("2024-1"),
        Course::new("b", "B", 19).en_periodo("2024-2").con_requisitos(["ZZZ"]),
    ];
    let mut ignored = IgnoredWarnings::new();
    ignored.insert("credits:hard:2024-2".into(), true);

    let w = compute_warnings(&ts, &courses, &Placements::new(), &ignored, &cfg);
    assert_eq!(
        ids(&w),
        vec!["prereq:missing:b:ZZZ:2024-2", "credits:soft:2024-1", "credits:hard:2024-2"]
    );
    assert!(w[2].ignored);
    assert!(!w[0].ignored);

    let s = first_warning_summary(&w);
    assert_eq!(s.first_hard.map(|w| w.id), Some("prereq:missing:b:ZZZ:2024-2".to_string()));
    assert_eq!(s.first_soft.map(|w| w.id), Some("credits:soft:2024-1".to_string()));
}

#[test]
fn test_ids_stable_when_ignoring() {
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        Course::new("a", "MAT1610", 10).en_periodo("2024-2"),
        Course::new("b", "MAT1620", 10).en_periodo("2024-1").con_requisitos(["MAT1610", "X"]),
    ];
    let cfg = PlannerConfig::default();
    let antes = run(&ts, &courses, &cfg);

    let mut ignored = IgnoredWarnings::new();
    for w in &antes {
        ignored.insert(w.id.clone(), true);
    }
    let despues = compute_warnings(&ts, &courses, &Placements::new(), &ignored, &cfg);

    let mut a: Vec<&str> = ids(&antes);
    let mut d: Vec<&str> = ids(&despues);
    a.sort();
    d.sort();
    assert_eq!(a, d);
    assert!(despues.iter().all(|w| w.ignored));
}

#[test]
fn test_deterministic_and_placement_aware() {
    let ts = terms(&["2024-1", "2024-2"]);
    let courses = vec![
        Course::new("a", "MAT1610", 10).en_periodo("2024-1"),
        Course::new("b", "MAT1620", 10).en_periodo("2024-2").con_requisitos(["MAT1610"]),
    ];
    let cfg = PlannerConfig::default();
    assert_eq!(run(&ts, &courses, &cfg), run(&ts, &courses, &cfg));

    // la ubicación del borrador gana sobre el term_id del curso
    let mut p = Placements::new();
    p.insert("a".into(), "2024-2".into());
    let w = compute_warnings(&ts, &courses, &p, &IgnoredWarnings::new(), &cfg);
    assert_eq!(ids(&w), vec!["prereq:misplaced:b:MAT1610:2024-2"]);
}
