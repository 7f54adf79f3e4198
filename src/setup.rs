//! The setup run: checks a push server end to end and saves it on success.
//!
//! Runs as a linear state machine:
//!
//! ```text
//! Start -> QueueCheck -> MappingCheck -> ReverseCheck -> Done
//!   \__________\______________\_____________\_______-> Failed
//! ```
//!
//! Every transition needs the previous check to pass. The first failure
//! ends the run, so a later check never runs against state an earlier one
//! failed to establish (the reverse check needs the cookie the queue check
//! stored).

use crate::app_config::AppConfigStore;
use crate::constants::{APP_ID, BASE_ENDPOINT_KEY};
use crate::cookie::Cookie;
use crate::db::MappingSource;
use crate::error::SetupError;
use crate::http::HttpGet;
use crate::probe::{mapping, queue_relay, reverse, ProbeResult};
use crate::queue::Queue;
use crate::report::{Stage, StageReport, VerificationReport};

/// Position of a run in the check sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    /// Nothing checked yet.
    Start,
    /// Queue backend present; checking the queue relay.
    QueueCheck,
    /// Checking database access.
    MappingCheck,
    /// Checking that the push server reaches Nextcloud.
    ReverseCheck,
    /// All checks passed.
    Done,
    /// A check failed.
    Failed,
}

/// Collaborators of a setup run, passed explicitly.
#[derive(Debug)]
pub struct Setup<'a> {
    queue: &'a dyn Queue,
    config: &'a dyn AppConfigStore,
    http: &'a dyn HttpGet,
    mappings: &'a dyn MappingSource,
    cookie_source: fn() -> Cookie,
}

impl<'a> Setup<'a> {
    /// Creates a run over the given collaborators.
    pub fn new(
        queue: &'a dyn Queue,
        config: &'a dyn AppConfigStore,
        http: &'a dyn HttpGet,
        mappings: &'a dyn MappingSource,
    ) -> Self {
        Self {
            queue,
            config,
            http,
            mappings,
            cookie_source: Cookie::generate,
        }
    }

    /// Replaces the cookie generator, e.g. with a fixed value in tests.
    pub fn with_cookie_source(mut self, cookie_source: fn() -> Cookie) -> Self {
        self.cookie_source = cookie_source;
        self
    }

    /// Checks `server` and returns the report.
    pub fn run(&self, server: &str) -> Result<VerificationReport, SetupError> {
        self.run_with(server, |_| {})
    }

    /// Checks `server`, calling `on_stage` as soon as each stage finishes.
    ///
    /// Errors are local failures (appconfig write, database query); the push
    /// server misbehaving is never an error, it is a failed stage in the
    /// report. `server` is saved exactly as given; only request URLs use the
    /// normalized form.
    pub fn run_with<F>(
        &self,
        server: &str,
        mut on_stage: F,
    ) -> Result<VerificationReport, SetupError>
    where
        F: FnMut(&StageReport),
    {
        let base_url = normalize_server_url(server);
        let mut report = VerificationReport::new(server);
        let cookie = (self.cookie_source)();
        let mut state = SetupState::Start;

        loop {
            log::debug!("Setup state: {:?}", state);
            state = match state {
                SetupState::Start => {
                    let result = if self.queue.is_configured() {
                        ProbeResult::Success
                    } else {
                        ProbeResult::Unconfigured {
                            message: "no redis server configured".to_string(),
                        }
                    };
                    step(
                        &mut report,
                        &mut on_stage,
                        Stage::QueueBackend,
                        result,
                        SetupState::QueueCheck,
                    )
                }
                SetupState::QueueCheck => {
                    let result =
                        queue_relay::run(self.queue, self.config, self.http, &base_url, cookie)?;
                    step(
                        &mut report,
                        &mut on_stage,
                        Stage::QueueRelay,
                        result,
                        SetupState::MappingCheck,
                    )
                }
                SetupState::MappingCheck => {
                    let result = mapping::run(self.mappings, self.http, &base_url)?;
                    step(
                        &mut report,
                        &mut on_stage,
                        Stage::Mapping,
                        result,
                        SetupState::ReverseCheck,
                    )
                }
                SetupState::ReverseCheck => {
                    let result = reverse::run(self.http, &base_url, cookie);
                    step(
                        &mut report,
                        &mut on_stage,
                        Stage::Reverse,
                        result,
                        SetupState::Done,
                    )
                }
                SetupState::Done => {
                    self.config.set_value(APP_ID, BASE_ENDPOINT_KEY, server)?;
                    report.pass();
                    log::info!("Saved {} as push server endpoint", server);
                    break;
                }
                SetupState::Failed => break,
            };
        }

        Ok(report)
    }
}

/// Records a stage and picks the next state.
fn step<F>(
    report: &mut VerificationReport,
    on_stage: &mut F,
    stage: Stage,
    result: ProbeResult,
    next: SetupState,
) -> SetupState
where
    F: FnMut(&StageReport),
{
    let passed = result.is_success();
    let line = report.record(stage, result);
    if passed {
        log::info!("{:?} passed", stage);
    } else {
        log::warn!("{:?} failed: {}", stage, line.message);
    }
    on_stage(line);

    if passed {
        next
    } else {
        SetupState::Failed
    }
}

/// Trims whitespace and trailing slashes so endpoint paths join cleanly.
///
/// Only used for building request URLs.
pub fn normalize_server_url(server: &str) -> String {
    server.trim().trim_end_matches('/').to_string()
}
