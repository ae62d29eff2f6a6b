// src/common/lenient.rs
//
// Os formulários do front-end mandam números ora como número, ora como texto
// ("3", ""). Estes helpers aceitam os dois formatos.

use chrono::NaiveDate;
use serde::{de::Error as _, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

fn to_i64(value: NumberOrText) -> Result<Option<i64>, String> {
    match value {
        NumberOrText::Int(n) => Ok(Some(n)),
        NumberOrText::Float(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
        NumberOrText::Float(f) => Err(format!("se esperaba un entero, se recibió {}", f)),
        NumberOrText::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| format!("'{}' no es un número válido", s))
        }
    }
}

fn to_i32<E: serde::de::Error>(n: i64) -> Result<i32, E> {
    i32::try_from(n).map_err(|_| E::custom(format!("{} está fuera de rango", n)))
}

/// Identificador obrigatório (`3` ou `"3"`).
pub fn id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrText::deserialize(deserializer)?;
    match to_i64(value).map_err(D::Error::custom)? {
        Some(n) => to_i32(n),
        None => Err(D::Error::custom("identificador vacío")),
    }
}

/// Identificador opcional: `null`, `""` e `0` contam como ausente.
pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };
    match to_i64(value).map_err(D::Error::custom)? {
        Some(0) | None => Ok(None),
        Some(n) => to_i32(n).map(Some),
    }
}

/// Quantidade inteira; vazio vale zero.
pub fn quantity<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(0);
    };
    match to_i64(value).map_err(D::Error::custom)? {
        Some(n) => to_i32(n),
        None => Ok(0),
    }
}

/// Texto opcional; string vazia (ou só espaços) conta como ausente.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Data opcional no formato `YYYY-MM-DD`; string vazia conta como ausente.
pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| D::Error::custom(format!("fecha inválida: '{}'", s))),
    }
}
