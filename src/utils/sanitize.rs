use serde_json::Value;

/// Masks donor details and payment secrets in JSON payloads for logging
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "signature"
            | "email"
            | "contact"
            | "address"
            | "pincode"
            | "password"
            | "secret"
            | "key_secret"
            | "token"
            | "api_key"
            | "authorization"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let start: String = chars[..4].iter().collect();
            let end: String = chars[chars.len() - 4..].iter().collect();
            Value::String(format!("{}****{}", start, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_signature() {
        let input = json!({
            "paymentId": "pay_29QQoUBi66xm2f",
            "signature": "9ef4dffbfd84f1318f6739a3ce19f9d85851857ae648f114332d8401e0949a3d",
            "amount": 500
        });

        let sanitized = sanitize_json(&input);
        let signature = sanitized["signature"].as_str().unwrap();

        assert_eq!(signature, "9ef4****9a3d");
        assert_eq!(sanitized["paymentId"], "pay_29QQoUBi66xm2f");
        assert_eq!(sanitized["amount"], 500);
    }

    #[test]
    fn test_sanitize_short_and_non_string_values() {
        let input = json!({ "pincode": 560001, "email": "a@b.in" });
        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["pincode"], "****");
        assert_eq!(sanitized["email"], "****");
    }

    #[test]
    fn test_sanitize_nested() {
        let input = json!({
            "donor": {
                "contact": "+919876543210",
                "name": "Asha"
            }
        });

        let sanitized = sanitize_json(&input);
        assert!(sanitized["donor"]["contact"].as_str().unwrap().contains("****"));
        assert_eq!(sanitized["donor"]["name"], "Asha");
    }
}
