//! `/api/flow` routes: the UI navigation state machine.
//!
//! Transition guards (quiz done, scripts left) are read from the progress
//! store at the time of the event.

use serde::Serialize;

use crate::error::Result;
use crate::flow::{self, AppFlow, FlowContext, FlowEvent, FlowOutcome};
use crate::progress;
use crate::routes::util::{parse_json, request_now, respond};

#[derive(Serialize)]
struct Transition {
    outcome: FlowOutcome,
    flow: AppFlow,
}

/// GET /api/flow
pub fn handle_get() -> String {
    respond::<AppFlow>(Ok(flow::with_flow_mut(|f| f.clone())))
}

/// POST /api/flow/event: body: JSON `FlowEvent`, e.g. `{"type":"open_recorder"}`.
pub fn handle_event(query: &str, body: &str) -> String {
    let result: Result<Transition> = request_now(query, "").and_then(|now| {
        let event: FlowEvent = parse_json(body)?;
        let ctx = progress::with_store_mut(now.date(), |store| {
            let state = store.state();
            FlowContext {
                has_completed_quiz: state.has_completed_quiz,
                can_generate: state.is_premium || state.free_scripts_remaining > 0,
            }
        });
        flow::with_flow_mut(|f| {
            let outcome = f.apply(event, ctx)?;
            Ok(Transition {
                outcome,
                flow: f.clone(),
            })
        })
    });
    respond(result)
}
