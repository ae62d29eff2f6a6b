//! Regras de formato compartilhadas entre os payloads (DUI, placa, preço).

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

/// DUI salvadorenho: `00000000-0`.
pub static DUI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}-\d$").expect("regex de DUI válida"));

/// Placas como `P123-456`, `N12345` ou `CC-12345`.
pub static PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,2}[-\s]?\d{1,5}([-\s]\d{1,3})?$").expect("regex de placa válida")
});

/// Normaliza o DUI digitado: se não estiver no formato, remove tudo que não é
/// dígito e, com nove dígitos, insere o hífen. Devolve `None` quando não dá.
pub fn normalize_dui(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if DUI_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 9 {
        Some(format!("{}-{}", &digits[..8], &digits[8..]))
    } else {
        None
    }
}

pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("El precio debe ser mayor que cero".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_plate(val: &str) -> Result<(), ValidationError> {
    if !PLATE_RE.is_match(val) {
        let mut err = ValidationError::new("regex");
        err.message = Some("Formato de placa inválido".into());
        return Err(err);
    }
    Ok(())
}
