//! Uniform JSON envelope for every response

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// `{statusCode, data, message, success}` with `success = statusCode < 400`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, serde_json::Value::Null, message)
    }
}

/// 200 envelope around `data`.
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, data, message).into_response()
}

/// 201 envelope around a newly created resource.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    ApiResponse::new(StatusCode::CREATED, data, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_tracks_status() {
        let ok = ApiResponse::new(StatusCode::OK, 1, "fine");
        assert!(ok.success);

        let redirect = ApiResponse::new(StatusCode::PERMANENT_REDIRECT, 1, "moved");
        assert!(redirect.success);

        let bad = ApiResponse::<serde_json::Value>::failure(StatusCode::BAD_REQUEST, "nope");
        assert!(!bad.success);
        assert_eq!(bad.status_code, 400);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let env = ApiResponse::new(StatusCode::OK, serde_json::json!({"liked": true}), "ok");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["data"]["liked"], true);
        assert_eq!(json["success"], true);
    }
}
