//! Checks that the push server can load storage mappings from the database.

use crate::constants::MAPPING_TEST_PATH;
use crate::db::MappingSource;
use crate::error::SetupError;
use crate::http::HttpGet;

use super::{fetch_and_compare, ProbeResult};

/// Computes a mount count locally and asks the push server for the same
/// storage's count.
///
/// Uses the mounts/filecache join the push server itself runs, so schema or
/// credential differences on the push server side show up as a mismatch.
/// Without any storage root mount there is nothing to compare and the
/// result is [`ProbeResult::Inconclusive`]; no request is made.
pub fn run(
    source: &dyn MappingSource,
    http: &dyn HttpGet,
    server: &str,
) -> Result<ProbeResult, SetupError> {
    let Some(fact) = source.storage_mapping_for_test()? else {
        return Ok(ProbeResult::Inconclusive {
            message: "no storage mounts found in the database".to_string(),
        });
    };
    log::info!(
        "Expecting {} mount(s) for storage {}",
        fact.count,
        fact.storage_id
    );

    let url = format!("{}{}/{}", server, MAPPING_TEST_PATH, fact.storage_id);
    Ok(fetch_and_compare(http, &url, fact.count))
}
