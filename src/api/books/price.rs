// Book prices: NUMERIC(6,2), kept as canonical text between the API and Postgres

use serde_json::Value;

const MAX_INTEGER_DIGITS: usize = 4;
const MAX_DECIMAL_PLACES: usize = 2;

/// Canonical price text ("12.50") from a JSON number or string
pub fn parse_price(raw: &Value) -> Result<String, String> {
    match raw {
        Value::Null => Ok("0.00".to_string()),
        Value::Number(n) => normalize(&n.to_string()),
        Value::String(s) if s.trim().is_empty() => Ok("0.00".to_string()),
        Value::String(s) => normalize(s.trim()),
        _ => Err("Enter a number.".to_string()),
    }
}

fn normalize(text: &str) -> Result<String, String> {
    if let Some(rest) = text.strip_prefix('-') {
        normalize(rest)?;
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    let text: &str = text.strip_prefix('+').unwrap_or(text);

    let (integer, fraction) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(integer) || !all_digits(fraction) || (integer.is_empty() && fraction.is_empty()) {
        return Err("Enter a number.".to_string());
    }

    let integer: &str = integer.trim_start_matches('0');
    let fraction: &str = fraction.trim_end_matches('0');

    if fraction.len() > MAX_DECIMAL_PLACES {
        return Err(format!("Ensure that there are no more than {MAX_DECIMAL_PLACES} decimal places."));
    }
    if integer.len() > MAX_INTEGER_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {MAX_INTEGER_DIGITS} digits before the decimal point."
        ));
    }

    let integer: &str = if integer.is_empty() { "0" } else { integer };
    Ok(format!("{integer}.{fraction:0<width$}", width = MAX_DECIMAL_PLACES))
}
