use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::core::error::CotacaoError;
use crate::core::quote::Quote;

/// Encodes the caller-facing payload, `{"bid":"<bid>"}`, keeping the
/// upstream's bid string as is.
pub fn encode(quote: &Quote) -> Vec<u8> {
    json!({ "bid": quote.bid }).to_string().into_bytes()
}

pub fn bid_response(quote: &Quote) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encode(quote),
    )
        .into_response()
}

impl CotacaoError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UpstreamUnreachable(_) | Self::UpstreamMalformedPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::UpstreamTimeout(_) | Self::StoreTimeout(_) | Self::OuterDeadlineExceeded(_) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            Self::StoreWriteFailure(_) | Self::SnapshotWriteFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CotacaoError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quote(bid: &str) -> Quote {
        serde_json::from_value(json!({
            "code": "USD", "codein": "BRL", "name": "Dólar Americano/Real Brasileiro",
            "high": "5.45", "low": "5.40", "varBid": "0.01", "pctChange": "0.19",
            "bid": bid, "ask": "5.44", "timestamp": "1718035200",
            "create_date": "2024-06-10 13:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn test_encode_keeps_bid_verbatim() {
        assert_eq!(encode(&quote("5.43")), br#"{"bid":"5.43"}"#);
        assert_eq!(encode(&quote("5.4300")), br#"{"bid":"5.4300"}"#);
        assert_eq!(encode(&quote(" 5,43 ")), br#"{"bid":" 5,43 "}"#);
    }

    #[test]
    fn test_bid_response_headers() {
        let response = bid_response(&quote("5.43"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_error_statuses_are_distinct_per_family() {
        let cases = [
            (
                CotacaoError::UpstreamUnreachable("connection refused".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CotacaoError::UpstreamTimeout(Duration::from_millis(200)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                CotacaoError::UpstreamMalformedPayload("eof".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CotacaoError::StoreTimeout(Duration::from_millis(10)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                CotacaoError::StoreWriteFailure("io".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CotacaoError::SnapshotWriteFailure("io".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CotacaoError::OuterDeadlineExceeded(Duration::from_millis(200)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
