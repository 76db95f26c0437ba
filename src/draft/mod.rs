// Borrador del usuario: capa editable sobre la malla cargada desde disco.
//
// Se persiste como JSON (ver `store`). La lectura es tolerante: cualquier campo
// con forma incorrecta se reemplaza por su valor por defecto.

pub mod store;
pub mod temp_courses;

pub use store::{load_draft, reset_draft, save_draft};
pub use temp_courses::{
    add_temp_course, make_temp_course, next_temp_sigla, override_course, remove_temp_course,
    stable_course_id, TempCourseForm,
};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::algorithm::{make_term, parse_term};
use crate::config::PlannerConfig;
use crate::error::{MallaError, Result};
use crate::models::{value_to_bool, value_to_string, Course, IgnoredWarnings, Placements};

/// Período creado por el usuario (no existe como carpeta).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTerm {
    pub term_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Draft {
    pub term_order: Vec<String>,
    pub placements: Placements,
    pub custom_terms: Vec<CustomTerm>,
    pub ignored_warnings: IgnoredWarnings,
    pub temp_courses: Vec<Course>,
    /// Ids de cursos reales reemplazados por una copia temporal.
    pub overrides: Vec<String>,
}

impl From<Value> for Draft {
    fn from(v: Value) -> Self {
        let Value::Object(map) = v else {
            return Draft::default();
        };

        let term_order = match map.get("term_order") {
            Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
            _ => Vec::new(),
        };

        let mut placements = Placements::new();
        if let Some(Value::Object(p)) = map.get("placements") {
            for (cid, tid) in p {
                placements.insert(cid.clone(), value_to_string(tid));
            }
        }

        // custom_terms acepta "2025-1", {"term_id": "2025-1"} o {"id": "2025-1"}
        let mut custom_terms = Vec::new();
        if let Some(Value::Array(items)) = map.get("custom_terms") {
            for item in items {
                let tid = match item {
                    Value::String(s) => s.trim().to_string(),
                    Value::Object(o) => o
                        .get("term_id")
                        .or_else(|| o.get("id"))
                        .map(value_to_string)
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                custom_terms.push(CustomTerm { term_id: tid });
            }
        }

        let mut ignored_warnings = IgnoredWarnings::new();
        if let Some(Value::Object(iw)) = map.get("ignored_warnings") {
            for (id, flag) in iw {
                ignored_warnings.insert(id.clone(), value_to_bool(flag));
            }
        }

        let temp_courses = match map.get("temp_courses") {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|x| x.is_object())
                .filter_map(|x| serde_json::from_value::<Course>(x.clone()).ok())
                .collect(),
            _ => Vec::new(),
        };

        let overrides = match map.get("overrides") {
            Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
            _ => Vec::new(),
        };

        let mut draft = Draft {
            term_order,
            placements,
            custom_terms,
            ignored_warnings,
            temp_courses,
            overrides,
        };
        draft.sanitize();
        draft
    }
}

impl Draft {
    /// Repara el borrador: sin ubicaciones vacías, sin duplicados, sin cursos
    /// temporales sin id. Idempotente.
    pub fn sanitize(&mut self) {
        let mut seen = HashSet::new();
        self.term_order = std::mem::take(&mut self.term_order)
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        self.placements = std::mem::take(&mut self.placements)
            .into_iter()
            .map(|(cid, tid)| (cid.trim().to_string(), tid.trim().to_string()))
            .filter(|(cid, tid)| !cid.is_empty() && !tid.is_empty())
            .collect();

        let mut seen = HashSet::new();
        self.custom_terms.retain(|ct| !ct.term_id.is_empty() && seen.insert(ct.term_id.clone()));

        self.ignored_warnings.retain(|id, _| !id.trim().is_empty());

        let mut seen = HashSet::new();
        self.temp_courses
            .retain(|c| !c.course_id.is_empty() && seen.insert(c.course_id.clone()));

        let mut seen = HashSet::new();
        self.overrides = std::mem::take(&mut self.overrides)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }

    pub fn place_course(&mut self, course_id: &str, term_id: &str) {
        let (cid, tid) = (course_id.trim(), term_id.trim());
        if cid.is_empty() || tid.is_empty() {
            return;
        }
        self.placements.insert(cid.to_string(), tid.to_string());
    }

    /// Quita la ubicación del borrador; el curso vuelve a su período canónico.
    pub fn unplace_course(&mut self, course_id: &str) -> bool {
        self.placements.remove(course_id.trim()).is_some()
    }

    pub fn custom_term_ids(&self) -> impl Iterator<Item = &str> {
        self.custom_terms.iter().map(|ct| ct.term_id.as_str())
    }

    /// Agrega un período propio. Rechaza semestres fuera de 0..=2 y duplicados.
    pub fn add_custom_term(&mut self, year: i32, sem: u8, config: &PlannerConfig) -> Result<String> {
        let tid = format!("{}-{}", year, sem);
        let term = make_term(&tid, config, true)
            .ok_or_else(|| MallaError::InvalidTerm(tid.clone()))?;
        if self.custom_term_ids().any(|t| t == term.term_id) {
            return Err(MallaError::Validation(format!("El período {} ya existe.", term.term_id)));
        }
        self.custom_terms.push(CustomTerm { term_id: term.term_id.clone() });
        Ok(term.term_id)
    }

    /// Elimina un período propio, sus ubicaciones y su entrada en `term_order`.
    pub fn remove_custom_term(&mut self, term_id: &str) -> bool {
        let before = self.custom_terms.len();
        self.custom_terms.retain(|ct| ct.term_id != term_id);
        if self.custom_terms.len() == before {
            return false;
        }
        self.placements.retain(|_, tid| tid != term_id);
        self.term_order.retain(|t| t != term_id);
        true
    }

    /// Quita los períodos propios que ya no tienen cursos ubicados.
    pub fn remove_empty_custom_terms(&mut self) -> Vec<String> {
        let used: HashSet<&str> = self.placements.values().map(String::as_str).collect();
        let empty: Vec<String> = self
            .custom_term_ids()
            .filter(|t| !used.contains(t))
            .map(str::to_string)
            .collect();
        for tid in &empty {
            self.remove_custom_term(tid);
        }
        empty
    }

    pub fn set_warning_ignored(&mut self, warning_id: &str, ignored: bool) {
        if warning_id.trim().is_empty() {
            return;
        }
        if ignored {
            self.ignored_warnings.insert(warning_id.to_string(), true);
        } else {
            self.ignored_warnings.remove(warning_id);
        }
    }

    pub fn is_warning_ignored(&self, warning_id: &str) -> bool {
        self.ignored_warnings.get(warning_id).copied().unwrap_or(false)
    }

    pub fn is_overridden(&self, course_id: &str) -> bool {
        self.overrides.iter().any(|o| o == course_id)
    }

    pub fn is_valid_term(term_id: &str) -> bool {
        parse_term(term_id).is_some()
    }
}
