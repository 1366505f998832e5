//! Shape checks for caller-supplied fields
//!
//! Runs at the request boundary; nothing that fails here reaches a store.

use crate::models::{Fields, LiveDraft, ProductDraft, ProductPatch};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Default title for live submissions that omit one
pub const DEFAULT_LIVE_TITLE: &str = "Untitled";

/// Default submitter name for live submissions that omit one
pub const DEFAULT_SUBMITTER_NAME: &str = "anonymous";

/// Keys owned by the server on every record
const RESERVED_KEYS: &[&str] = &["id", "source"];

/// Caller-supplied fields failed a shape constraint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("Field 'price' must be non-negative, got {0}")]
    NegativePrice(f64),

    #[error("Field '{0}' is assigned by the server")]
    ReservedField(String),
}

impl TryFrom<Value> for ProductDraft {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut fields = into_object(value)?;
        reject_reserved(&fields, &[])?;

        let title = take_string(&mut fields, "title")?.ok_or(ValidationError::MissingField("title"))?;
        let price = take_price(&mut fields, false)?.ok_or(ValidationError::MissingField("price"))?;

        Ok(ProductDraft {
            title,
            price,
            extra: fields,
        })
    }
}

impl ProductPatch {
    /// Validate an update body for the product with id `target`.
    ///
    /// An `id` field is tolerated only when it repeats the target id.
    pub fn parse(value: Value, target: Uuid) -> Result<Self, ValidationError> {
        let mut fields = into_object(value)?;
        if let Some(id) = fields.remove("id") {
            let same = id
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .is_some_and(|id| id == target);
            if !same {
                return Err(ValidationError::ReservedField("id".to_string()));
            }
        }
        reject_reserved(&fields, &[])?;

        Ok(ProductPatch {
            title: take_string(&mut fields, "title")?,
            price: take_price(&mut fields, false)?,
            extra: fields,
        })
    }
}

impl TryFrom<Value> for LiveDraft {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut fields = into_object(value)?;
        reject_reserved(&fields, &["submittedAt"])?;

        let title = take_string(&mut fields, "title")?
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LIVE_TITLE.to_string());
        // Form ingress sends the price as text
        let price = take_price(&mut fields, true)?.unwrap_or(0.0);
        let submitter_name = take_string(&mut fields, "submitterName")?
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBMITTER_NAME.to_string());
        let submitter_contact = take_string(&mut fields, "submitterContact")?.unwrap_or_default();
        let image_ref = take_string(&mut fields, "imageRef")?;

        Ok(LiveDraft {
            title,
            price,
            submitter_name,
            submitter_contact,
            image_ref,
            extra: fields,
        })
    }
}

fn into_object(value: Value) -> Result<Fields, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

fn reject_reserved(fields: &Fields, extra_reserved: &[&str]) -> Result<(), ValidationError> {
    RESERVED_KEYS
        .iter()
        .chain(extra_reserved)
        .find(|key| fields.contains_key(**key))
        .map_or(Ok(()), |key| Err(ValidationError::ReservedField(key.to_string())))
}

/// Remove `key` and require a string; null counts as absent
fn take_string(fields: &mut Fields, key: &str) -> Result<Option<String>, ValidationError> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::WrongType {
            field: key.to_string(),
            expected: "a string",
        }),
    }
}

fn take_price(fields: &mut Fields, allow_text: bool) -> Result<Option<f64>, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: "price".to_string(),
        expected: "a finite number",
    };

    let price = match fields.remove("price") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(wrong_type)?,
        Some(Value::String(s)) if allow_text => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>().map_err(|_| wrong_type())?
        }
        Some(_) => return Err(wrong_type()),
    };

    if !price.is_finite() {
        return Err(wrong_type());
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice(price));
    }
    Ok(Some(price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_requires_title_and_price() {
        let err = ProductDraft::try_from(json!({"price": 3})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("title"));

        let err = ProductDraft::try_from(json!({"title": "Chair"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("price"));
    }

    #[test]
    fn draft_keeps_extra_fields() {
        let draft = ProductDraft::try_from(json!({
            "title": "Chair",
            "price": 20,
            "color": "red"
        }))
        .unwrap();
        assert_eq!(draft.title, "Chair");
        assert_eq!(draft.price, 20.0);
        assert_eq!(draft.extra.get("color"), Some(&json!("red")));
        assert!(!draft.extra.contains_key("title"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = ProductDraft::try_from(json!({"title": "X", "price": -1})).unwrap_err();
        assert_eq!(err, ValidationError::NegativePrice(-1.0));

        let err = ProductPatch::parse(json!({"price": -0.5}), Uuid::new_v4()).unwrap_err();
        assert_eq!(err, ValidationError::NegativePrice(-0.5));
    }

    #[test]
    fn caller_cannot_choose_id() {
        let err = ProductDraft::try_from(json!({"id": 7, "title": "X", "price": 1})).unwrap_err();
        assert_eq!(err, ValidationError::ReservedField("id".to_string()));

        let target = Uuid::new_v4();
        let err = ProductPatch::parse(json!({"id": Uuid::new_v4().to_string()}), target).unwrap_err();
        assert_eq!(err, ValidationError::ReservedField("id".to_string()));

        let patch = ProductPatch::parse(json!({"id": target.to_string(), "price": 2}), target).unwrap();
        assert_eq!(patch.price, Some(2.0));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            ProductDraft::try_from(json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
        assert_eq!(
            LiveDraft::try_from(json!("hello")).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn wrong_title_type_is_rejected() {
        let err = ProductPatch::parse(json!({"title": 5}), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { ref field, .. } if field == "title"));
    }

    #[test]
    fn live_draft_applies_defaults() {
        let draft = LiveDraft::try_from(json!({})).unwrap();
        assert_eq!(draft.title, DEFAULT_LIVE_TITLE);
        assert_eq!(draft.price, 0.0);
        assert_eq!(draft.submitter_name, DEFAULT_SUBMITTER_NAME);
        assert_eq!(draft.submitter_contact, "");
        assert_eq!(draft.image_ref, None);
    }

    #[test]
    fn live_draft_accepts_text_price() {
        let draft = LiveDraft::try_from(json!({
            "title": "Bike",
            "price": " 42.5 ",
            "submitterName": "ana",
            "submitterContact": "555-0101",
            "imageRef": "/img/1700000000-bike.jpg"
        }))
        .unwrap();
        assert_eq!(draft.price, 42.5);
        assert_eq!(draft.submitter_name, "ana");
        assert_eq!(draft.image_ref.as_deref(), Some("/img/1700000000-bike.jpg"));

        let err = LiveDraft::try_from(json!({"price": "cheap"})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[test]
    fn live_draft_rejects_server_fields() {
        let err = LiveDraft::try_from(json!({"submittedAt": "2024-01-01T00:00:00Z"})).unwrap_err();
        assert_eq!(err, ValidationError::ReservedField("submittedAt".to_string()));
    }
}
