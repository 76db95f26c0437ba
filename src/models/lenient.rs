//! Conversión tolerante de valores JSON (también del frontmatter YAML, que se
//! convierte a JSON antes de leerse). Nunca falla: ante datos mal formados
//! devuelve un valor seguro (string vacío, cero, lista vacía).

use serde_json::Value;

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn value_to_opt_string(v: &Value) -> Option<String> {
    let s = value_to_string(v);
    if s.is_empty() { None } else { Some(s) }
}

/// Entero truncado; `bool` y textos no numéricos devuelven `default`.
pub fn value_to_i32(v: &Value, default: i32) -> i32 {
    let parsed = match v {
        Value::Number(n) => n.as_i64().map(|i| i as f64).or_else(|| n.as_f64()),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => f.trunc() as i32,
        _ => default,
    }
}

/// Sólo `true` o el texto "true" (sin distinguir mayúsculas) cuentan como verdadero.
pub fn value_to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Lista de strings: arreglos, un string simple o "a, b, c".
pub fn value_to_list(v: &Value) -> Vec<String> {
    match v {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else if s.contains(',') {
                s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
            } else {
                vec![s.to_string()]
            }
        }
        other => vec![value_to_string(other)],
    }
}
