use actix_web::{error::InternalError, web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn bad_request(error: &str, fields: serde_json::Map<String, serde_json::Value>) -> actix_web::Error {
    let error_response = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    InternalError::from_response("", HttpResponse::BadRequest().json(error_response)).into()
}

fn message(text: impl Into<String>) -> serde_json::Map<String, serde_json::Value> {
    let mut fields = serde_json::Map::new();
    fields.insert("message".to_string(), serde_json::Value::String(text.into()));
    fields
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config(limit: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    let mut fields = serde_json::Map::new();
                    for (field, errors) in validation_errors.field_errors() {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
                            })
                            .collect();
                        fields.insert(
                            field.to_string(),
                            serde_json::json!({"errors": messages})
                        );
                    }
                    bad_request("Validation failed", fields)
                }
                actix_web_validator::Error::Deserialize(de_err) => {
                    let err_string = de_err.to_string();

                    let text = if err_string.contains("EOF while parsing") {
                        "Request body is empty. Expected JSON payload"
                    } else if err_string.contains("unknown variant") {
                        "Invalid enum value. Check allowed values for this field"
                    } else if err_string.contains("UUID") {
                        "Invalid identifier. Expected a UUID"
                    } else if err_string.contains("Content type error") {
                        "Expected Content-Type: application/json"
                    } else {
                        "Invalid JSON format"
                    };
                    bad_request("Request validation failed", message(text))
                }
                _ => bad_request("Validation failed", message("Validation error")),
            }
        })
}

/// Malformed query strings become 400 with the same body shape
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        bad_request("Request validation failed", message(err.to_string()))
    })
}

/// Malformed path parameters (ids that are not UUIDs) become 400 instead of 404
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| {
        bad_request("Request validation failed", message("Invalid id"))
    })
}
