use crate::controller::Exhaust;
use application::resilience::{CircuitSnapshot, CircuitState};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CircuitResponse {
    name: String,
    state: &'static str,
    buffered_calls: usize,
    failed_calls: usize,
}

pub struct CircuitPresenter;

impl Exhaust<(String, CircuitSnapshot)> for CircuitPresenter {
    type To = Json<CircuitResponse>;
    fn emit(&self, input: (String, CircuitSnapshot)) -> Self::To {
        let (name, snapshot) = input;
        let state = match snapshot.state {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        Json(CircuitResponse {
            name,
            state,
            buffered_calls: snapshot.buffered_calls,
            failed_calls: snapshot.failed_calls,
        })
    }
}

impl Exhaust<()> for CircuitPresenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
