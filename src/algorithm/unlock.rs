// unlock.rs - grafo de desbloqueo (qué cursos habilita aprobar uno)
//
// Se recorren los períodos en orden cronológico. Un curso es alcanzable si
// todos sus prerrequisitos son alcanzables en un período estrictamente
// anterior y todos sus correquisitos están aprobados, son alcanzables en un
// período anterior o son alcanzables en el mismo período. Las aristas
// requisito -> dependiente sólo se agregan para dependientes alcanzables.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;

use super::placement::effective_term_of;
use super::terms::{TermOrder, POSICION_DESCONOCIDA};
use crate::models::{Course, Placements, Term};

/// Período en que un curso quedó válido. `None` = antes de cualquier período
/// (aprobado sin ubicación conocida).
type Rango = Option<usize>;

#[derive(Debug, Clone, Default)]
pub struct UnlockGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    reachable: BTreeSet<String>,
    reachable_siglas: BTreeSet<String>,
}

impl UnlockGraph {
    pub fn build(terms: &[Term], courses: &[Course], placements: &Placements) -> Self {
        let order = TermOrder::from_terms(terms);

        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();
        let mut by_sigla: HashMap<String, &Course> = HashMap::new();
        for c in courses {
            if c.course_id.is_empty() {
                continue;
            }
            index
                .entry(c.course_id.clone())
                .or_insert_with(|| graph.add_node(c.course_id.clone()));
            let key = c.sigla_key();
            if !key.is_empty() {
                by_sigla.insert(key, c);
            }
        }

        let rank_of = |c: &Course| -> usize { order.rank(effective_term_of(c, placements)) };

        // semilla: aprobados
        let mut aprobados: HashSet<String> = HashSet::new();
        let mut valid_at: HashMap<String, Rango> = HashMap::new();
        let mut reachable: BTreeSet<String> = BTreeSet::new();
        for c in courses.iter().filter(|c| c.aprobado && !c.course_id.is_empty()) {
            let r = rank_of(c);
            let r = if r == POSICION_DESCONOCIDA { None } else { Some(r) };
            let key = c.sigla_key();
            if !key.is_empty() {
                aprobados.insert(key.clone());
                let slot = valid_at.entry(key).or_insert(r);
                *slot = (*slot).min(r);
            }
            reachable.insert(c.course_id.clone());
        }

        let mut por_periodo: BTreeMap<usize, Vec<&Course>> = BTreeMap::new();
        for c in courses.iter().filter(|c| !c.aprobado && !c.course_id.is_empty()) {
            let r = rank_of(c);
            if r != POSICION_DESCONOCIDA {
                por_periodo.entry(r).or_default().push(c);
            }
        }

        let mut edges = 0usize;
        for (&r, cursos) in &por_periodo {
            let prereq_ok = |key: &str| {
                valid_at
                    .get(key)
                    .is_some_and(|v| v.is_none_or(|v| v < r))
            };
            let mut candidatos: Vec<&Course> = cursos
                .iter()
                .copied()
                .filter(|c| c.prerrequisitos_simples().all(|req| prereq_ok(&req.key())))
                .collect();

            // poda hasta punto fijo: un correquisito del mismo período sólo
            // cuenta si su curso también sobrevive
            loop {
                let mismos: HashSet<String> = candidatos.iter().map(|c| c.sigla_key()).collect();
                let antes = candidatos.len();
                candidatos.retain(|c| {
                    c.correquisitos().all(|req| {
                        let key = req.key();
                        aprobados.contains(&key)
                            || valid_at.get(&key).is_some_and(|v| v.is_none_or(|v| v <= r))
                            || mismos.contains(&key)
                    })
                });
                if candidatos.len() == antes {
                    break;
                }
            }

            for c in &candidatos {
                reachable.insert(c.course_id.clone());
                let key = c.sigla_key();
                if !key.is_empty() {
                    valid_at.entry(key).or_insert(Some(r));
                }
                let Some(&to) = index.get(&c.course_id) else {
                    continue;
                };
                for req in &c.prerrequisitos {
                    let Some(rc) = by_sigla.get(&req.key()) else {
                        continue;
                    };
                    if let Some(&from) = index.get(&rc.course_id) {
                        if graph.find_edge(from, to).is_none() {
                            graph.add_edge(from, to, ());
                            edges += 1;
                        }
                    }
                }
            }
        }

        let reachable_siglas = courses
            .iter()
            .filter(|c| reachable.contains(&c.course_id))
            .map(Course::sigla_key)
            .filter(|k| !k.is_empty())
            .collect();

        debug!(
            "[unlock] {} cursos, {} alcanzables, {} aristas, {} períodos",
            courses.len(),
            reachable.len(),
            edges,
            por_periodo.len()
        );

        UnlockGraph { graph, index, reachable, reachable_siglas }
    }

    /// Todos los cursos que dependen (transitivamente) de `course_id`, sin
    /// incluirlo. Un id desconocido da un conjunto vacío.
    pub fn reachable_closure_from(&self, course_id: &str) -> BTreeSet<String> {
        let Some(&start) = self.index.get(course_id) else {
            return BTreeSet::new();
        };
        let mut out = BTreeSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(nx) = bfs.next(&self.graph) {
            if nx != start {
                out.insert(self.graph[nx].clone());
            }
        }
        out
    }

    /// Dependientes directos.
    pub fn unlocks(&self, course_id: &str) -> BTreeSet<String> {
        let Some(&nx) = self.index.get(course_id) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors_directed(nx, Direction::Outgoing)
            .filter(|&n| n != nx)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    pub fn is_reachable(&self, course_id: &str) -> bool {
        self.reachable.contains(course_id)
    }

    pub fn reachable_ids(&self) -> &BTreeSet<String> {
        &self.reachable
    }

    pub fn reachable_siglas(&self) -> &BTreeSet<String> {
        &self.reachable_siglas
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.index.contains_key(course_id)
    }
}
