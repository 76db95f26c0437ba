// Frontmatter YAML de las notas Markdown (`---` ... `---` al inicio).

use log::debug;
use serde_json::{Map, Number, Value};

use crate::error::Result;

const DELIMITADOR: &str = "---";

/// Separa el frontmatter del cuerpo. `None` si la nota no empieza con `---`
/// o el bloque no se cierra.
pub fn split_frontmatter(text: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim()) != Some(DELIMITADOR) {
        return (None, text.to_string());
    }
    match lines.iter().skip(1).position(|l| l.trim() == DELIMITADOR) {
        Some(i) => {
            let end = i + 1;
            (Some(lines[1..end].join("\n")), lines[end + 1..].join("\n"))
        }
        None => (None, text.to_string()),
    }
}

/// YAML -> objeto JSON. Si el YAML no es válido (o no es un mapa) se usa el
/// parser mínimo `clave: valor` / `- item`.
pub fn parse_frontmatter(fm: Option<&str>) -> Map<String, Value> {
    let Some(fm) = fm.filter(|s| !s.trim().is_empty()) else {
        return Map::new();
    };
    match parse_yaml(fm) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            debug!("[vault::frontmatter] YAML inválido ({}), usando parser mínimo", e);
            parse_minimo(fm)
        }
    }
}

fn parse_yaml(fm: &str) -> Result<Value> {
    let y: serde_yaml::Value = serde_yaml::from_str(fm)?;
    Ok(serde_json::to_value(y)?)
}

fn parse_minimo(fm: &str) -> Map<String, Value> {
    let mut out = Map::new();
    let mut key: Option<String> = None;
    for raw in fm.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let (Some(k), Some(item)) = (&key, line.strip_prefix("- ")) {
            let entry = out.entry(k.clone()).or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            if let Value::Array(items) = entry {
                items.push(Value::String(item.trim().to_string()));
            }
            continue;
        }
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        let (k, v) = (k.trim().to_string(), v.trim());
        let value = if v.is_empty() {
            Value::Array(Vec::new())
        } else if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false") {
            Value::Bool(v.eq_ignore_ascii_case("true"))
        } else if let Ok(n) = v.parse::<i64>() {
            Value::Number(Number::from(n))
        } else {
            Value::String(v.to_string())
        };
        out.insert(k.clone(), value);
        key = Some(k);
    }
    out
}

/// Serializa el frontmatter como YAML (para notas nuevas).
pub fn render_frontmatter(fm: &Map<String, Value>) -> Result<String> {
    let text = serde_yaml::to_string(fm)?;
    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_frontmatter() {
        let (fm, body) = split_frontmatter("---\nsigla: A\n---\ncuerpo\n");
        assert_eq!(fm.as_deref(), Some("sigla: A"));
        assert_eq!(body, "cuerpo");

        let (fm, _) = split_frontmatter("sin frontmatter");
        assert!(fm.is_none());
        let (fm, _) = split_frontmatter("---\nsigla: A\nsin cierre");
        assert!(fm.is_none());
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let fm = parse_frontmatter(Some("sigla: MAT1610\ncréditos: 10\nprerrequisitos:\n  - nt\n"));
        assert_eq!(fm.get("sigla"), Some(&json!("MAT1610")));
        assert_eq!(fm.get("créditos"), Some(&json!(10)));
        assert_eq!(fm.get("prerrequisitos"), Some(&json!(["nt"])));
    }

    #[test]
    fn test_minimal_parser_fallback() {
        // "a: b: c" no es YAML válido
        let fm = parse_frontmatter(Some(
            "sigla: IIC2233\nnombre: Programación: avanzada\naprobado: true\nprerrequisitos:\n- IIC1103\n- MAT1203\ncreditos: 10",
        ));
        assert_eq!(fm.get("sigla"), Some(&json!("IIC2233")));
        assert_eq!(fm.get("nombre"), Some(&json!("Programación: avanzada")));
        assert_eq!(fm.get("aprobado"), Some(&json!(true)));
        assert_eq!(fm.get("prerrequisitos"), Some(&json!(["IIC1103", "MAT1203"])));
        assert_eq!(fm.get("creditos"), Some(&json!(10)));
    }
}
