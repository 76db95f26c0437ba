// Estructuras de datos principales del planificador de malla

mod lenient;
mod requisito;

pub(crate) use lenient::{value_to_bool, value_to_i32, value_to_list, value_to_opt_string, value_to_string};
pub use requisito::{parse_requisitos, sigla_key, Requisito};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ubicación efectiva: course_id -> term_id.
pub type Placements = BTreeMap<String, String>;

/// Ids de warnings ignorados por el usuario (persistidos en el borrador).
pub type IgnoredWarnings = BTreeMap<String, bool>;

/// Un período académico (`"<año>-<sem>"`, sem 0 = verano, 1, 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term_id: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub sem: u8,
    /// Código de oferta del semestre ("V", "I", "P").
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "folderName")]
    pub folder_name: String,
    #[serde(default, rename = "isCustom")]
    pub is_custom: bool,
}

/// Un curso tal como lo consumen los motores. Los requisitos ya vienen
/// parseados (`Requisito`), nunca como tokens crudos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CursoRaw", into = "CursoRaw")]
pub struct Course {
    pub course_id: String,
    pub term_id: Option<String>,
    pub sigla: String,
    pub nombre: String,
    pub creditos: i32,
    pub concentracion: String,
    pub aprobado: bool,
    /// Códigos de semestre en que se dicta; vacío = sin restricción.
    pub semestre_ofrecido: Vec<String>,
    pub prerrequisitos: Vec<Requisito>,
    pub is_temp: bool,
    pub temp_kind: Option<String>,
    pub override_of: Option<String>,
    pub file_rel: String,
    pub error: Option<String>,
    pub frontmatter: Map<String, Value>,
}

impl Course {
    /// Curso mínimo (usado por el loader y los tests).
    pub fn new(course_id: impl Into<String>, sigla: impl Into<String>, creditos: i32) -> Self {
        Course {
            course_id: course_id.into(),
            term_id: None,
            sigla: sigla.into(),
            nombre: String::new(),
            creditos,
            concentracion: "ex".to_string(),
            aprobado: false,
            semestre_ofrecido: Vec::new(),
            prerrequisitos: Vec::new(),
            is_temp: false,
            temp_kind: None,
            override_of: None,
            file_rel: String::new(),
            error: None,
            frontmatter: Map::new(),
        }
    }

    pub fn en_periodo(mut self, term_id: impl Into<String>) -> Self {
        self.term_id = Some(term_id.into());
        self
    }

    pub fn aprobado(mut self, aprobado: bool) -> Self {
        self.aprobado = aprobado;
        self
    }

    pub fn con_requisitos<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.prerrequisitos = parse_requisitos(tokens);
        self
    }

    pub fn ofrecido_en<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.semestre_ofrecido = codes
            .into_iter()
            .filter_map(|c| crate::algorithm::parse_offering_code(c.as_ref()))
            .map(str::to_string)
            .collect();
        self
    }

    /// Clave de unión por sigla (trim + mayúsculas).
    pub fn sigla_key(&self) -> String {
        sigla_key(&self.sigla)
    }

    pub fn label(&self) -> &str {
        if self.sigla.trim().is_empty() { "Curso" } else { self.sigla.trim() }
    }

    pub fn prerrequisitos_simples(&self) -> impl Iterator<Item = &Requisito> {
        self.prerrequisitos.iter().filter(|r| !r.es_correquisito)
    }

    pub fn correquisitos(&self) -> impl Iterator<Item = &Requisito> {
        self.prerrequisitos.iter().filter(|r| r.es_correquisito)
    }
}

/// Forma "de cable" de un curso. Acepta datos mal formados (créditos como
/// texto, listas como string separado por comas, campos ausentes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CursoRaw {
    #[serde(default)]
    course_id: Value,
    #[serde(default)]
    term_id: Value,
    #[serde(default)]
    sigla: Value,
    #[serde(default)]
    nombre: Value,
    #[serde(default, alias = "créditos")]
    creditos: Value,
    #[serde(default, alias = "concentración")]
    concentracion: Value,
    #[serde(default)]
    aprobado: Value,
    #[serde(default, rename = "semestreOfrecido")]
    semestre_ofrecido: Value,
    #[serde(default)]
    prerrequisitos: Value,
    #[serde(default, skip_serializing)]
    corequisitos: Value,
    #[serde(default)]
    is_temp: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temp_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    override_of: Option<String>,
    #[serde(default, rename = "fileRel")]
    file_rel: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    frontmatter: Value,
}

impl From<CursoRaw> for Course {
    fn from(raw: CursoRaw) -> Self {
        let mut prerrequisitos = value_to_list(&raw.prerrequisitos);
        // lista legacy `corequisitos`: se incorpora como "X(c)"
        prerrequisitos.extend(
            value_to_list(&raw.corequisitos)
                .into_iter()
                .map(|c| format!("{}(c)", c)),
        );

        let concentracion = match &raw.concentracion {
            Value::Array(items) => items.first().map(value_to_string).unwrap_or_default(),
            other => value_to_string(other),
        };

        let frontmatter = match raw.frontmatter {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Course {
            course_id: value_to_string(&raw.course_id),
            term_id: value_to_opt_string(&raw.term_id),
            sigla: value_to_string(&raw.sigla),
            nombre: value_to_string(&raw.nombre),
            creditos: value_to_i32(&raw.creditos, 0),
            concentracion: if concentracion.is_empty() { "ex".to_string() } else { concentracion },
            aprobado: value_to_bool(&raw.aprobado),
            semestre_ofrecido: value_to_list(&raw.semestre_ofrecido)
                .iter()
                .filter_map(|c| crate::algorithm::parse_offering_code(c))
                .map(str::to_string)
                .collect(),
            prerrequisitos: parse_requisitos(prerrequisitos),
            is_temp: value_to_bool(&raw.is_temp),
            temp_kind: raw.temp_kind.filter(|s| !s.trim().is_empty()),
            override_of: raw.override_of.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            file_rel: value_to_string(&raw.file_rel),
            error: raw.error,
            frontmatter,
        }
    }
}

impl From<Course> for CursoRaw {
    fn from(c: Course) -> Self {
        CursoRaw {
            course_id: Value::String(c.course_id),
            term_id: c.term_id.map(Value::String).unwrap_or(Value::Null),
            sigla: Value::String(c.sigla),
            nombre: Value::String(c.nombre),
            creditos: Value::from(c.creditos),
            concentracion: Value::String(c.concentracion),
            aprobado: Value::Bool(c.aprobado),
            semestre_ofrecido: Value::from(c.semestre_ofrecido),
            prerrequisitos: Value::from(
                c.prerrequisitos.iter().map(Requisito::token).collect::<Vec<_>>(),
            ),
            corequisitos: Value::Null,
            is_temp: Value::Bool(c.is_temp),
            temp_kind: c.temp_kind,
            override_of: c.override_of,
            file_rel: Value::String(c.file_rel),
            error: c.error,
            frontmatter: if c.frontmatter.is_empty() { Value::Null } else { Value::Object(c.frontmatter) },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningScope {
    Term,
    Course,
}

/// Advertencia de validación. Nunca bloquea acciones; `id` es estable entre
/// recomputaciones para que el estado "ignorado" sobreviva.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub id: String,
    pub kind: WarningKind,
    pub scope: WarningScope,
    pub term_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requisito: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    pub text: String,
    pub ignored: bool,
}

/// Primer warning duro y blando no ignorados (banner de la UI).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningSummary {
    pub first_hard: Option<Warning>,
    pub first_soft: Option<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_from_lenient_json() {
        let json = r#"{
            "course_id": "2024-1/,Cursos/MAT1610.md",
            "term_id": "2024-1",
            "sigla": " MAT1610 ",
            "creditos": "10",
            "aprobado": "true",
            "semestreOfrecido": "I, P",
            "prerrequisitos": ["nt", "MAT1000", "FIS1500(c)", "MAT1000"],
            "corequisitos": ["QIM100"]
        }"#;
        let c: Course = serde_json::from_str(json).unwrap();
        assert_eq!(c.sigla, "MAT1610");
        assert_eq!(c.creditos, 10);
        assert!(c.aprobado);
        assert_eq!(c.semestre_ofrecido, vec!["I", "P"]);
        assert_eq!(c.concentracion, "ex");
        let tokens: Vec<String> = c.prerrequisitos.iter().map(Requisito::token).collect();
        assert_eq!(tokens, vec!["MAT1000", "FIS1500(c)", "QIM100(c)"]);
    }

    #[test]
    fn test_course_garbage_fields_default() {
        let c: Course = serde_json::from_str(r#"{"sigla": 42, "creditos": "muchos", "aprobado": 1}"#).unwrap();
        assert_eq!(c.course_id, "");
        assert_eq!(c.sigla, "42");
        assert_eq!(c.creditos, 0);
        assert!(!c.aprobado);
        assert!(c.term_id.is_none());
    }

    #[test]
    fn test_course_serializes_tokens() {
        let c = Course::new("x", "IIC2233", 10).con_requisitos(["IIC1103", "MAT1107(c)"]);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["prerrequisitos"], serde_json::json!(["IIC1103", "MAT1107(c)"]));
        assert!(v.get("corequisitos").is_none());
        let back: Course = serde_json::from_value(v).unwrap();
        assert_eq!(back, c);
    }
}
