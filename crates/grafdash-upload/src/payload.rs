//! Grafana dashboard import payloads.

use serde_json::{Map, Value};

use grafdash_core::UploadConfig;

use crate::error::UploadError;

/// Wrap a dashboard's JSON text in the payload `POST /api/dashboards/db`
/// expects.
///
/// The dashboard's numeric `id` is cleared so Grafana matches existing
/// dashboards by `uid` instead. Configured tags are appended to the
/// dashboard's own tags, skipping any already present.
pub fn build_payload(content: &str, config: &UploadConfig) -> Result<Value, UploadError> {
    let mut dashboard = match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => map,
        other => {
            return Err(UploadError::invalid(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )));
        }
    };

    dashboard.insert("id".to_string(), Value::Null);
    merge_tags(&mut dashboard, &config.tags)?;

    let mut payload = Map::new();
    payload.insert("dashboard".to_string(), Value::Object(dashboard));
    payload.insert("overwrite".to_string(), Value::Bool(config.overwrite));
    if let Some(ref folder_uid) = config.folder_uid {
        payload.insert("folderUid".to_string(), Value::String(folder_uid.clone()));
    }
    if let Some(ref message) = config.message {
        payload.insert("message".to_string(), Value::String(message.clone()));
    }
    Ok(Value::Object(payload))
}

fn merge_tags(dashboard: &mut Map<String, Value>, tags: &[String]) -> Result<(), UploadError> {
    if tags.is_empty() {
        return Ok(());
    }

    let existing = dashboard
        .entry("tags")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(existing) = existing else {
        return Err(UploadError::invalid("`tags` must be an array"));
    };

    for tag in tags {
        if !existing.iter().any(|t| t.as_str() == Some(tag.as_str())) {
            existing.push(Value::String(tag.clone()));
        }
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> UploadConfig {
        UploadConfig::builder()
            .url("http://grafana:3000")
            .credentials("token")
            .build()
            .unwrap()
    }

    #[test]
    fn test_payload_defaults() {
        let payload = build_payload(r#"{"id":42,"uid":"lat","title":"Latency"}"#, &config()).unwrap();
        assert_eq!(
            payload,
            json!({
                "dashboard": {"id": null, "uid": "lat", "title": "Latency"},
                "overwrite": true
            })
        );
    }

    #[test]
    fn test_payload_folder_message_and_tags() {
        let config = UploadConfig::builder()
            .url("http://grafana:3000")
            .credentials("token")
            .folder_uid("platform")
            .message("deployed by ci")
            .tags(vec!["generated".to_string(), "team-a".to_string()])
            .overwrite(false)
            .build()
            .unwrap();

        let payload = build_payload(r#"{"title":"Errors","tags":["team-a"]}"#, &config).unwrap();

        assert_eq!(payload["folderUid"], "platform");
        assert_eq!(payload["message"], "deployed by ci");
        assert_eq!(payload["overwrite"], false);
        assert_eq!(payload["dashboard"]["tags"], json!(["team-a", "generated"]));
    }

    #[test]
    fn test_payload_rejects_non_object() {
        let err = build_payload("[1, 2]", &config()).unwrap_err();
        match err {
            UploadError::InvalidDashboard { reason } => assert!(reason.contains("an array")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_payload_rejects_invalid_json() {
        let err = build_payload("{not json", &config()).unwrap_err();
        assert!(matches!(err, UploadError::InvalidJson(_)));
    }

    #[test]
    fn test_payload_rejects_non_array_tags() {
        let config = UploadConfig::builder()
            .url("http://grafana:3000")
            .credentials("token")
            .tags(vec!["x".to_string()])
            .build()
            .unwrap();
        let err = build_payload(r#"{"tags":"x"}"#, &config).unwrap_err();
        assert!(matches!(err, UploadError::InvalidDashboard { .. }));
    }
}
