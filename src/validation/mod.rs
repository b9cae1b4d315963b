use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const IDENTIFIER_MAX_LEN: usize = 255;
pub const AMOUNT_INPUT_MAX_LEN: usize = 64;
/// Largest exponent accepted in an amount literal, and the widest scale
/// (either direction) of the parsed value.
pub const AMOUNT_MAX_EXPONENT_DIGITS: usize = 3;
pub const AMOUNT_MAX_SCALE: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control() || ch.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Returns the identifier exactly as sent, or an error when it is absent or
/// blank. Identifiers feed signature checks, so they are never rewritten.
pub fn required_identifier(
    field: &'static str,
    value: Option<&str>,
) -> Result<String, ValidationError> {
    let value = value.unwrap_or_default();
    validate_required(field, value)?;
    validate_max_len(field, value, IDENTIFIER_MAX_LEN)?;
    Ok(value.to_string())
}

/// Accepts a JSON number or a numeric string and requires it to be > 0.
pub fn parse_positive_amount(value: Option<&Value>) -> Result<BigDecimal, ValidationError> {
    let raw = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => {
            return Err(ValidationError::new("amount", "is required"));
        }
        Some(_) => return Err(ValidationError::new("amount", "must be a number")),
    };

    validate_max_len("amount", &raw, AMOUNT_INPUT_MAX_LEN)?;
    if !is_decimal_literal(&raw) {
        return Err(ValidationError::new("amount", "must be a number"));
    }

    let amount = BigDecimal::from_str(&raw)
        .map_err(|_| ValidationError::new("amount", "must be a number"))?;

    let (_, scale) = amount.as_bigint_and_exponent();
    if scale > AMOUNT_MAX_SCALE {
        return Err(ValidationError::new("amount", "has too many decimal places"));
    }
    if scale < -AMOUNT_MAX_SCALE {
        return Err(ValidationError::new("amount", "is too large"));
    }
    validate_positive_amount(&amount)?;

    Ok(amount)
}

/// Plain decimal notation with an optional short exponent, checked before
/// the literal reaches the decimal parser.
fn is_decimal_literal(raw: &str) -> bool {
    let (mantissa, exponent) = match raw.find(|ch| ch == 'e' || ch == 'E') {
        Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
        None => (raw, None),
    };

    let mantissa = mantissa.strip_prefix(|ch| ch == '+' || ch == '-').unwrap_or(mantissa);
    let mut digits = 0;
    let mut dots = 0;
    for ch in mantissa.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(|ch| ch == '+' || ch == '-').unwrap_or(exp);
            !exp.is_empty()
                && exp.len() <= AMOUNT_MAX_EXPONENT_DIGITS
                && exp.chars().all(|ch| ch.is_ascii_digit())
        }
    }
}

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

/// Scales a major-unit amount by `multiplier` and rounds to a whole minor unit.
pub fn to_minor_units(amount: &BigDecimal, multiplier: u32) -> Result<u64, ValidationError> {
    let scaled = (amount.clone() * BigDecimal::from(multiplier)).round(0);

    match scaled.to_u64() {
        Some(0) => Err(ValidationError::new(
            "amount",
            "is too small to be charged",
        )),
        Some(units) => Ok(units),
        None => Err(ValidationError::new("amount", "is too large")),
    }
}

/// Reads an optional positive count; anything else is treated as absent.
pub fn positive_count(value: Option<&Value>) -> Option<u32> {
    let count = match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    count
        .filter(|count| *count > 0)
        .and_then(|count| u32::try_from(count).ok())
}

/// Deserializes free text that clients may send as a string, number or bool.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Deserializes a flag the way a form posts it; absent, null and other
/// falsy values read as `false`.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("pay_\u{0000}1"), "pay_1");
    }

    #[test]
    fn required_identifier_rejects_missing_and_blank() {
        assert_eq!(required_identifier("paymentId", Some("pay_1")).unwrap(), "pay_1");
        assert!(required_identifier("paymentId", None).is_err());
        assert!(required_identifier("paymentId", Some("  ")).is_err());
        assert!(required_identifier("paymentId", Some(&"x".repeat(256))).is_err());
    }

    #[test]
    fn parses_positive_amounts() {
        assert_eq!(
            parse_positive_amount(Some(&json!(500))).unwrap(),
            BigDecimal::from(500)
        );
        assert_eq!(
            parse_positive_amount(Some(&json!("250.50"))).unwrap(),
            BigDecimal::from_str("250.50").unwrap()
        );
        assert_eq!(
            parse_positive_amount(Some(&json!(12.5))).unwrap(),
            BigDecimal::from_str("12.5").unwrap()
        );
    }

    #[test]
    fn rejects_non_positive_or_non_numeric_amounts() {
        assert!(parse_positive_amount(None).is_err());
        assert!(parse_positive_amount(Some(&Value::Null)).is_err());
        assert!(parse_positive_amount(Some(&json!(0))).is_err());
        assert!(parse_positive_amount(Some(&json!(-10))).is_err());
        assert!(parse_positive_amount(Some(&json!("abc"))).is_err());
        assert!(parse_positive_amount(Some(&json!(""))).is_err());
        assert!(parse_positive_amount(Some(&json!(true))).is_err());
        assert!(parse_positive_amount(Some(&json!([500]))).is_err());
    }

    #[test]
    fn identifiers_are_not_rewritten() {
        assert_eq!(
            required_identifier("paymentId", Some(" pay_1 ")).unwrap(),
            " pay_1 "
        );
        assert_eq!(
            required_identifier("orderId", Some("order  1")).unwrap(),
            "order  1"
        );
        assert_eq!(
            required_identifier("paymentId", Some("pay\u{0007}_1")).unwrap(),
            "pay\u{0007}_1"
        );
    }

    #[test]
    fn rejects_amounts_with_extreme_exponents() {
        for raw in [
            "1e2000000",
            "1e200000000",
            "1e-9223372036854775808",
            "5e-20",
            "1e300",
            "0.0000000000001",
            "1e",
            "e5",
            "1.2.3",
            "0x10",
            "NaN",
            "inf",
        ] {
            assert!(
                parse_positive_amount(Some(&json!(raw))).is_err(),
                "accepted {}",
                raw
            );
        }

        assert!(parse_positive_amount(Some(&json!(1e300))).is_err());
    }

    #[test]
    fn accepts_short_exponents_within_scale() {
        assert_eq!(
            parse_positive_amount(Some(&json!("5e2"))).unwrap(),
            BigDecimal::from(500)
        );
        assert_eq!(
            parse_positive_amount(Some(&json!("2.5E+1"))).unwrap(),
            BigDecimal::from(25)
        );
        assert_eq!(
            parse_positive_amount(Some(&json!("+10"))).unwrap(),
            BigDecimal::from(10)
        );

        let large = parse_positive_amount(Some(&json!("1e12"))).unwrap();
        assert!(to_minor_units(&large, 100_000_000).is_err());
    }

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(to_minor_units(&BigDecimal::from(500), 10).unwrap(), 5000);
        assert_eq!(to_minor_units(&BigDecimal::from(500), 100).unwrap(), 50000);
        assert_eq!(
            to_minor_units(&BigDecimal::from_str("99.99").unwrap(), 100).unwrap(),
            9999
        );
        assert!(to_minor_units(&BigDecimal::from_str("0.01").unwrap(), 10).is_err());
    }

    #[test]
    fn reads_positive_counts() {
        assert_eq!(positive_count(Some(&json!(6))), Some(6));
        assert_eq!(positive_count(Some(&json!("24"))), Some(24));
        assert_eq!(positive_count(Some(&json!(0))), None);
        assert_eq!(positive_count(Some(&json!(-3))), None);
        assert_eq!(positive_count(Some(&json!("soon"))), None);
        assert_eq!(positive_count(None), None);
    }

    #[test]
    fn lenient_text_coerces_scalars() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "lenient_text")]
            contact: Option<String>,
        }

        let parsed: Payload = serde_json::from_value(json!({ "contact": 9876543210u64 })).unwrap();
        assert_eq!(parsed.contact.as_deref(), Some("9876543210"));

        let parsed: Payload = serde_json::from_value(json!({ "contact": null })).unwrap();
        assert!(parsed.contact.is_none());

        let parsed: Payload = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.contact.is_none());
    }

    #[test]
    fn lenient_flag_treats_falsy_values_as_false() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "lenient_flag")]
            recurring: bool,
        }

        let read = |value: Value| -> bool {
            serde_json::from_value::<Payload>(value).unwrap().recurring
        };

        assert!(read(json!({ "recurring": true })));
        assert!(read(json!({ "recurring": "true" })));
        assert!(read(json!({ "recurring": 1 })));
        assert!(!read(json!({ "recurring": null })));
        assert!(!read(json!({ "recurring": false })));
        assert!(!read(json!({ "recurring": 0 })));
        assert!(!read(json!({ "recurring": "" })));
        assert!(!read(json!({})));
    }
}
