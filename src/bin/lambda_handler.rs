//! AWS Lambda handler for running certificate projections
//!
//! Accepts a `ProjectionRequest` either as the raw invocation payload or as
//! the JSON `body` of a Lambda Function URL event, and returns the projection
//! results. Function URL callers get an HTTP-shaped response with CORS headers.

use irec_projection::{AggregateResult, ProjectionRequest};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

#[derive(Debug, Serialize)]
struct ProjectionResponse {
    project: String,
    reporting_currency: String,
    years: u32,
    results: Vec<AggregateResult>,
    execution_time_ms: u64,
}

fn project(request: &ProjectionRequest) -> Result<ProjectionResponse, Error> {
    let start = Instant::now();
    let results = request.run()?;
    Ok(ProjectionResponse {
        project: request.project.name.clone(),
        reporting_currency: request.rates.reporting.clone(),
        years: request.horizon.years,
        results,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

fn http_response(status: u16, body: String) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body,
    })
}

fn error_response(status: u16, message: &str) -> Value {
    http_response(status, json!({ "error": message }).to_string())
}

/// Function URL event: HTTP status codes carry the outcome
fn respond_http(event: &Value) -> Value {
    let method = event
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .unwrap_or("POST");
    if method.eq_ignore_ascii_case("OPTIONS") {
        return http_response(200, String::new());
    }
    if event.get("isBase64Encoded").and_then(Value::as_bool).unwrap_or(false) {
        return error_response(400, "base64-encoded bodies are not supported");
    }

    let body = event.get("body").and_then(Value::as_str).unwrap_or("{}");
    let request = match ProjectionRequest::from_json(body) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    match project(&request).and_then(|r| Ok(serde_json::to_string(&r)?)) {
        Ok(body) => http_response(200, body),
        Err(e) => {
            warn!("Projection rejected: {}", e);
            error_response(400, &e.to_string())
        }
    }
}

fn respond(event: Value) -> Result<Value, Error> {
    if event.get("body").is_some() {
        return Ok(respond_http(&event));
    }
    let request: ProjectionRequest = serde_json::from_value(event)?;
    Ok(serde_json::to_value(project(&request)?)?)
}

/// Lambda handler function
async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!("Projection request {}", context.request_id);
    respond(payload)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
