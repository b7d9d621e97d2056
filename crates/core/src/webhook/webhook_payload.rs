//! Transport normalization for webhook bodies.
//!
//! Ko-fi posts `application/x-www-form-urlencoded` with the JSON payload in a
//! single `data` field. Proxies and replay tools tend to forward the payload
//! as JSON instead, either bare or still wrapped in `data`. All three shapes
//! are reduced to a [`WebhookEvent`] here.

use serde_json::Value;

use super::{WebhookError, WebhookEvent};
use crate::errors::Result;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const DATA_FIELD: &str = "data";

/// Parses a raw webhook body into an event.
///
/// A form content type selects form decoding. A JSON content type selects
/// JSON. Anything else is sniffed: JSON first, then form.
pub fn parse_webhook_body(body: &[u8], content_type: Option<&str>) -> Result<WebhookEvent> {
    match content_type.map(media_type) {
        Some(media) if media.eq_ignore_ascii_case(FORM_CONTENT_TYPE) => from_form(body),
        Some(media) if is_json_media_type(media) => from_json(body),
        _ => from_json(body).or_else(|_| from_form(body)),
    }
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn is_json_media_type(media: &str) -> bool {
    let media = media.to_ascii_lowercase();
    media == "application/json" || media.ends_with("+json")
}

fn from_json(body: &[u8]) -> Result<WebhookEvent> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| WebhookError::Malformed(format!("body is not valid JSON: {e}")))?;
    unwrap_envelope(value)
}

fn from_form(body: &[u8]) -> Result<WebhookEvent> {
    let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| WebhookError::Malformed(format!("body is not a valid form: {e}")))?;
    let data = fields
        .into_iter()
        .find_map(|(key, value)| (key == DATA_FIELD).then_some(value))
        .ok_or_else(|| WebhookError::Malformed("form body has no 'data' field".to_string()))?;
    let value: Value = serde_json::from_str(&data)
        .map_err(|e| WebhookError::Malformed(format!("'data' field is not valid JSON: {e}")))?;
    event_from_value(value)
}

/// Accepts `{...payload}`, `{"data": {...payload}}` and `{"data": "<json>"}`.
fn unwrap_envelope(value: Value) -> Result<WebhookEvent> {
    match value {
        Value::Object(mut map) => match map.remove(DATA_FIELD) {
            Some(Value::Object(inner)) => event_from_value(Value::Object(inner)),
            Some(Value::String(raw)) => {
                let inner: Value = serde_json::from_str(&raw).map_err(|e| {
                    WebhookError::Malformed(format!("'data' field is not valid JSON: {e}"))
                })?;
                event_from_value(inner)
            }
            Some(_) => Err(WebhookError::Malformed(
                "'data' field must be an object or a JSON string".to_string(),
            )
            .into()),
            None => event_from_value(Value::Object(map)),
        },
        _ => Err(WebhookError::Malformed("payload must be a JSON object".to_string()).into()),
    }
}

fn event_from_value(value: Value) -> Result<WebhookEvent> {
    if !value.is_object() {
        return Err(WebhookError::Malformed("payload must be a JSON object".to_string()).into());
    }
    serde_json::from_value(value)
        .map_err(|e| WebhookError::Malformed(format!("unexpected payload shape: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    const PAYLOAD: &str = r#"{"verification_token":"tok","message_id":"m-1","type":"Donation","amount":"4.50","currency":"EUR"}"#;

    fn form_body(data: &str) -> Vec<u8> {
        serde_urlencoded::to_string([("data", data)])
            .unwrap()
            .into_bytes()
    }

    fn assert_malformed(result: Result<WebhookEvent>) {
        match result {
            Err(Error::Webhook(WebhookError::Malformed(_))) => {}
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn parses_kofi_form_body() {
        let event =
            parse_webhook_body(&form_body(PAYLOAD), Some("application/x-www-form-urlencoded"))
                .unwrap();
        assert_eq!(event.verification_token.as_deref(), Some("tok"));
        assert_eq!(event.event_id(), Some("m-1"));
        assert_eq!(event.amount_minor_units().unwrap(), 450);
    }

    #[test]
    fn parses_bare_json_body() {
        let event =
            parse_webhook_body(PAYLOAD.as_bytes(), Some("application/json; charset=utf-8"))
                .unwrap();
        assert_eq!(event.kind.as_deref(), Some("Donation"));
        assert_eq!(event.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn parses_json_wrapped_in_data() {
        let object = format!(r#"{{"data":{PAYLOAD}}}"#);
        let event = parse_webhook_body(object.as_bytes(), Some("application/json")).unwrap();
        assert_eq!(event.amount_minor_units().unwrap(), 450);

        let stringified = serde_json::json!({ "data": PAYLOAD }).to_string();
        let event = parse_webhook_body(stringified.as_bytes(), None).unwrap();
        assert_eq!(event.verification_token.as_deref(), Some("tok"));
    }

    #[test]
    fn sniffs_shape_without_content_type() {
        let event = parse_webhook_body(&form_body(PAYLOAD), None).unwrap();
        assert_eq!(event.amount_minor_units().unwrap(), 450);

        let event = parse_webhook_body(PAYLOAD.as_bytes(), Some("text/plain")).unwrap();
        assert_eq!(event.amount_minor_units().unwrap(), 450);
    }

    #[test]
    fn rejects_unparsable_json() {
        assert_malformed(parse_webhook_body(b"{not json", Some("application/json")));
        assert_malformed(parse_webhook_body(b"[1,2,3]", Some("application/json")));
    }

    #[test]
    fn rejects_form_without_data_field() {
        assert_malformed(parse_webhook_body(
            b"payload=%7B%7D",
            Some("application/x-www-form-urlencoded"),
        ));
        assert_malformed(parse_webhook_body(b"{not json", None));
    }

    #[test]
    fn rejects_form_with_invalid_data_json() {
        assert_malformed(parse_webhook_body(
            &form_body("not-json"),
            Some("application/x-www-form-urlencoded"),
        ));
        assert_malformed(parse_webhook_body(&form_body("42"), None));
    }
}
