use std::collections::HashSet;
use std::fmt;

/// Token literal que significa "sin requisitos".
const SIN_REQUISITOS: &str = "nt";
const MARCA_CORREQUISITO: &str = "(c)";

/// Requisito ya parseado. `"MAT1610"` es prerrequisito (período estrictamente
/// anterior); `"MAT1610(c)"` es correquisito (mismo período o anterior).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Requisito {
    pub code: String,
    pub es_correquisito: bool,
}

impl Requisito {
    pub fn prerrequisito(code: impl Into<String>) -> Self {
        Requisito { code: code.into(), es_correquisito: false }
    }

    pub fn correquisito(code: impl Into<String>) -> Self {
        Requisito { code: code.into(), es_correquisito: true }
    }

    /// `None` para tokens vacíos, `"nt"` o una marca `(c)` sin código.
    pub fn parse(raw: &str) -> Option<Self> {
        let item = raw.trim();
        if item.is_empty() || item.eq_ignore_ascii_case(SIN_REQUISITOS) {
            return None;
        }
        if item.to_ascii_lowercase().ends_with(MARCA_CORREQUISITO) {
            let code = item[..item.len() - MARCA_CORREQUISITO.len()].trim();
            if code.is_empty() {
                return None;
            }
            return Some(Requisito::correquisito(code));
        }
        Some(Requisito::prerrequisito(item))
    }

    pub fn key(&self) -> String {
        sigla_key(&self.code)
    }

    /// Token original (`"X"` o `"X(c)"`).
    pub fn token(&self) -> String {
        if self.es_correquisito {
            format!("{}{}", self.code, MARCA_CORREQUISITO)
        } else {
            self.code.clone()
        }
    }
}

impl fmt::Display for Requisito {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Normaliza una sigla para usarla como clave de unión.
pub fn sigla_key(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Parsea una lista de tokens, descartando vacíos y `nt`, sin duplicados.
pub fn parse_requisitos<I, S>(items: I) -> Vec<Requisito>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<(String, bool)> = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if let Some(req) = Requisito::parse(item.as_ref()) {
            if seen.insert((req.key(), req.es_correquisito)) {
                out.push(req);
            }
        }
    }
    out
}
