//! Structured tracing for resolution and plan compilation.
//!
//! Events use target `tmap::query_json` and are intended to be consumed with:
//! `TMAP_LOG=tmap::query_json=trace TMAP_LOG_FORMAT=json`.
//!
//! Environment:
//! - `TMAP_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::pair::{MapRequest, TypePair};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "tmap::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| std::env::var("TMAP_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string()))
        .as_str()
}

#[inline]
pub(crate) fn resolve_start(query_id: u64, pair: TypePair) {
    trace!(
        target: "tmap::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op = "resolve_type_map",
        source_type_id = pair.source.0,
        destination_type_id = pair.destination.0
    );
}

#[inline]
pub(crate) fn resolve_end(query_id: u64, found: Option<TypePair>, cache_hit: bool) {
    trace!(
        target: "tmap::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op = "resolve_type_map",
        found = found.is_some(),
        map_source_type_id = found.map(|pair| pair.source.0),
        map_destination_type_id = found.map(|pair| pair.destination.0),
        cache_hit
    );
}

#[inline]
pub(crate) fn plan_start(query_id: u64, request: &MapRequest) {
    trace!(
        target: "tmap::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op = "execution_plan",
        requested_source_type_id = request.requested.source.0,
        requested_destination_type_id = request.requested.destination.0,
        runtime_source_type_id = request.runtime.source.0,
        runtime_destination_type_id = request.runtime.destination.0,
        member = request.member.as_ref().map(|member| &*member.member)
    );
}

#[inline]
pub(crate) fn plan_end(query_id: u64, kind: &'static str, cache_hit: bool) {
    trace!(
        target: "tmap::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op = "execution_plan",
        kind,
        cache_hit
    );
}
