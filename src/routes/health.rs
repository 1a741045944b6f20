//! `/api/health`: liveness probe for the worker bridge.

use serde::Serialize;

use crate::routes::util::ok;

#[derive(Serialize)]
struct Health {
    ok: bool,
    version: &'static str,
}

pub fn handle() -> String {
    ok(&Health {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}
