//! Endpoint handlers
//!
//! One function per route. Each is a pure function of its path parameters
//! and the reference data: at most two dictionary lookups, then response
//! shaping. Lookup misses over enumerable key spaces return the valid keys
//! alongside the error so clients can self-correct.

use crate::catalog;
use crate::data::ReferenceData;
use crate::response::json_response;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

type EndpointResult = Result<Response<Full<Bytes>>, serde_json::Error>;

pub const API_NAME: &str = "Legal Data API";

/// GET /
pub fn health(data: &ReferenceData) -> EndpointResult {
    json_response(
        StatusCode::OK,
        &json!({
            "name": API_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "status": "operational",
            "dataVersion": data.data_version(),
        }),
    )
}

/// GET /states
pub fn states(data: &ReferenceData) -> EndpointResult {
    let states: Vec<Value> = data
        .jurisdictions()
        .iter()
        .map(|(code, jurisdiction)| json!({ "code": code, "name": jurisdiction.name }))
        .collect();
    json_response(
        StatusCode::OK,
        &json!({ "count": states.len(), "states": states }),
    )
}

/// GET /case-types
pub fn case_types() -> EndpointResult {
    json_response(
        StatusCode::OK,
        &json!({ "count": catalog::CASE_TYPES.len(), "caseTypes": catalog::CASE_TYPES }),
    )
}

/// GET /injury-types
pub fn injury_types() -> EndpointResult {
    json_response(
        StatusCode::OK,
        &json!({ "count": catalog::INJURY_TYPES.len(), "injuryTypes": catalog::INJURY_TYPES }),
    )
}

/// GET /statute-of-limitations/:state/:caseType
pub fn statute(data: &ReferenceData, state: &str, case_type: &str) -> EndpointResult {
    let Some(jurisdiction) = data.jurisdiction(state) else {
        return json_response(
            StatusCode::NOT_FOUND,
            &json!({
                "error": "State not found",
                "availableStates": data.jurisdiction_codes(),
            }),
        );
    };

    let Some(entry) = data.statute(state, case_type) else {
        // Scoped to this state's case types, not the global catalog
        let available: Vec<&str> = jurisdiction.case_types.keys().map(String::as_str).collect();
        return json_response(
            StatusCode::NOT_FOUND,
            &json!({
                "error": "Case type not found",
                "availableTypes": available,
            }),
        );
    };

    json_response(
        StatusCode::OK,
        &json!({
            "state": jurisdiction.name,
            "stateCode": state,
            "caseType": case_type,
            "years": entry.years,
            "notes": entry.notes,
        }),
    )
}

/// GET /statute-of-limitations/:state
pub fn state_statutes(data: &ReferenceData, state: &str) -> EndpointResult {
    let Some(jurisdiction) = data.jurisdiction(state) else {
        return json_response(StatusCode::NOT_FOUND, &json!({ "error": "State not found" }));
    };

    json_response(
        StatusCode::OK,
        &json!({
            "state": jurisdiction.name,
            "stateCode": state,
            "statutes": jurisdiction.case_types,
        }),
    )
}

/// GET /average-settlement/:injuryType
///
/// The stored entry's fields are merged flat into the response next to the
/// `injuryType` identifier. An entry field literally named `injuryType`
/// overwrites the identifier (last-write-wins).
pub fn settlement(data: &ReferenceData, injury_type: &str) -> EndpointResult {
    let Some(entry) = data.settlement(injury_type) else {
        return json_response(
            StatusCode::NOT_FOUND,
            &json!({
                "error": "Injury type not found",
                "availableTypes": data.settlement_types(),
            }),
        );
    };

    let mut body = serde_json::Map::new();
    body.insert(
        "injuryType".to_string(),
        Value::String(injury_type.to_string()),
    );
    for (field, value) in entry {
        body.insert(field.clone(), value.clone());
    }
    json_response(StatusCode::OK, &Value::Object(body))
}

/// GET /average-settlements
pub fn settlements(data: &ReferenceData) -> EndpointResult {
    json_response(
        StatusCode::OK,
        &json!({
            "count": data.settlements().len(),
            "settlements": data.settlements(),
        }),
    )
}
