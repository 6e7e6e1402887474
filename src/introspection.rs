use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Schema for the assessment JSON returned inside the response envelope.
pub fn assessment_schema() -> serde_json::Value {
    json!({
      "$schema": "https://json-schema.org/draft/2020-12/schema",
      "title": "PhishingAssessment",
      "type": "object",
      "required": [
        "found_urls",
        "url_assessments",
        "gsb_supported",
        "gsb_error",
        "overall_risk",
        "is_phishing"
      ],
      "properties": {
        "found_urls": {"type": "array", "items": {"type": "string"}},
        "url_assessments": {
          "type": "array",
          "items": {
            "type": "object",
            "required": ["url", "heuristics_flagged", "heuristic_reasons", "gsb_matches"],
            "properties": {
              "url": {"type": "string"},
              "heuristics_flagged": {"type": "boolean"},
              "heuristic_reasons": {"type": "array", "items": {"type": "string"}},
              "gsb_matches": {"type": "array", "items": {"type": "string"}}
            },
            "additionalProperties": false
          }
        },
        "gsb_supported": {"type": "boolean"},
        "gsb_error": {"type": ["string", "null"]},
        "overall_risk": {"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]},
        "is_phishing": {"type": "boolean"}
      },
      "additionalProperties": false
    })
}

pub fn json_error(status: StatusCode, msg: &str, extra: serde_json::Value) -> impl IntoResponse {
    let body = json!({
        "error": msg,
        "extra": extra
    });
    (status, Json(body))
}
