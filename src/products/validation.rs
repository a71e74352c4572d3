use serde_json::{Map, Value};

use super::repo_types::{NewProduct, ProductPatch};
use crate::error::ApiError;

const FIELDS: [&str; 5] = ["name", "description", "price", "category", "inStock"];

/// Checks a create payload: every field present and well-typed.
pub fn validate_new(body: &Value) -> Result<NewProduct, ApiError> {
    let patch = extract(as_object(body)?, true)?;
    let ProductPatch {
        name: Some(name),
        description: Some(description),
        price: Some(price),
        category: Some(category),
        in_stock: Some(in_stock),
    } = patch
    else {
        return Err(invalid(&FIELDS));
    };
    Ok(NewProduct {
        name,
        description,
        price,
        category,
        in_stock,
    })
}

/// Checks an update payload: fields that are present must be well-typed,
/// and at least one must be present.
pub fn validate_patch(body: &Value) -> Result<ProductPatch, ApiError> {
    let patch = extract(as_object(body)?, false)?;
    if patch == ProductPatch::default() {
        return Err(ApiError::Validation(format!(
            "Update must include at least one of: {}",
            FIELDS.join(", ")
        )));
    }
    Ok(patch)
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::Validation("Request body must be a JSON object".into()))
}

fn invalid(fields: &[&str]) -> ApiError {
    ApiError::Validation(format!("Missing or invalid fields: {}", fields.join(", ")))
}

fn extract(obj: &Map<String, Value>, require_all: bool) -> Result<ProductPatch, ApiError> {
    let mut bad: Vec<&str> = Vec::new();

    let mut text = |key: &'static str| -> Option<String> {
        match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            None if !require_all => None,
            _ => {
                bad.push(key);
                None
            }
        }
    };
    let name = text("name");
    let description = text("description");
    let category = text("category");

    let price = match obj.get("price") {
        Some(Value::Number(n)) => n.as_f64(),
        None if !require_all => None,
        _ => {
            bad.push("price");
            None
        }
    };
    let in_stock = match obj.get("inStock") {
        Some(Value::Bool(b)) => Some(*b),
        None if !require_all => None,
        _ => {
            bad.push("inStock");
            None
        }
    };

    if !bad.is_empty() {
        // report in declaration order
        bad.sort_by_key(|f| FIELDS.iter().position(|k| k == f));
        return Err(invalid(&bad));
    }
    Ok(ProductPatch {
        name,
        description,
        price,
        category,
        in_stock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pen() -> Value {
        json!({
            "name": "Pen",
            "description": "Blue ink",
            "price": 1.5,
            "category": "Stationery",
            "inStock": true
        })
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        let p = validate_new(&pen()).unwrap();
        assert_eq!(p.name, "Pen");
        assert_eq!(p.price, 1.5);
        assert!(p.in_stock);
    }

    #[test]
    fn integer_price_is_a_number() {
        let mut body = pen();
        body["price"] = json!(3);
        assert_eq!(validate_new(&body).unwrap().price, 3.0);
    }

    #[test]
    fn names_every_missing_or_mistyped_field() {
        let body = json!({ "name": "", "description": "d", "price": "1.5", "category": "c" });
        let msg = message(validate_new(&body).unwrap_err());
        assert_eq!(msg, "Missing or invalid fields: name, price, inStock");
    }

    #[test]
    fn null_counts_as_invalid() {
        let mut body = pen();
        body["category"] = Value::Null;
        let msg = message(validate_new(&body).unwrap_err());
        assert!(msg.ends_with("category"));
    }

    #[test]
    fn rejects_non_object_bodies() {
        let msg = message(validate_new(&json!([1, 2])).unwrap_err());
        assert!(msg.contains("JSON object"));
        assert!(validate_patch(&json!("name")).is_err());
    }

    #[test]
    fn ignores_unknown_and_server_fields() {
        let mut body = pen();
        body["id"] = json!("abc");
        body["color"] = json!("blue");
        assert!(validate_new(&body).is_ok());
    }

    #[test]
    fn patch_accepts_single_field() {
        let patch = validate_patch(&json!({ "price": 2.0 })).unwrap();
        assert_eq!(
            patch,
            ProductPatch {
                price: Some(2.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn patch_checks_types_of_present_fields() {
        let msg = message(validate_patch(&json!({ "inStock": "yes" })).unwrap_err());
        assert_eq!(msg, "Missing or invalid fields: inStock");
    }

    #[test]
    fn patch_requires_some_known_field() {
        let msg = message(validate_patch(&json!({ "color": "red" })).unwrap_err());
        assert!(msg.starts_with("Update must include"));
    }
}
