//! Decision assembly: run the resolver, calculator, analyzer and
//! evaluator in order and either skip the file or synthesize a command.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{KEEP_ORIGINAL, PolicyConfig, RateControl};
use crate::engine::bitrate::{self, BitrateBudget};
use crate::engine::command;
use crate::engine::conditions;
use crate::engine::profile;
use crate::engine::streams;
use crate::probe::MediaDescriptor;

/// Ordered, append-only transcript of an evaluation. Nothing is ever
/// discarded; the host shows it to the operator verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    lines: Vec<String>,
}

impl DiagnosticLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// The engine's verdict for one file. Freshly allocated per call and
/// immutable after return; no state survives between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// Whether the host should run the encoder on this file.
    pub should_process: bool,
    /// Ordered encoder argument tokens, empty on skip.
    pub args: Vec<String>,
    /// Human-readable evaluation transcript.
    pub log: Vec<String>,
    /// Resolved output extension including the dot, once known.
    pub output_extension: Option<String>,
    /// Ask the host to re-evaluate the file after encoding.
    pub requeue_after: bool,
}

impl Decision {
    fn skip(log: DiagnosticLog, output_extension: Option<String>) -> Self {
        Self {
            should_process: false,
            args: Vec::new(),
            log: log.into_lines(),
            output_extension,
            requeue_after: false,
        }
    }

    fn transcode(
        log: DiagnosticLog,
        args: command::ArgList,
        output_extension: String,
    ) -> Self {
        Self {
            should_process: true,
            args: args.into_vec(),
            log: log.into_lines(),
            output_extension: Some(output_extension),
            requeue_after: true,
        }
    }

    /// Shell-safe single-line rendering of the argument tokens.
    pub fn command_line(&self) -> String {
        shlex::try_join(self.args.iter().map(String::as_str))
            .unwrap_or_else(|_| self.args.join(" "))
    }
}

fn source_details(log: &mut DiagnosticLog, video: &streams::VideoStreamSummary, current: u32) {
    log.push("========== Source Details ==========");
    log.push(format!(
        "Height: {} px",
        video.height.map_or_else(|| "unknown".into(), |h| h.to_string())
    ));
    log.push(format!(
        "Width: {} px",
        video.width.map_or_else(|| "unknown".into(), |w| w.to_string())
    ));
    log.push(format!(
        "Codec: {}",
        video.codec.as_deref().unwrap_or("unknown")
    ));
    log.push(format!("Bitrate: {current} kbps"));
    log.push("====================================");
}

fn bitrate_details(log: &mut DiagnosticLog, policy: &PolicyConfig, baseline: u32, budget: &BitrateBudget) {
    let bound = |b: Option<u32>| b.map_or_else(|| "unset".to_string(), |v| format!("{v} kbps"));
    log.push("======== Output Bitrate Details ========");
    log.push(format!("Ceiling (average): {}", bound(policy.bitrate_ceiling)));
    log.push(format!("Maximum (any given time): {} kbps", budget.maximum));
    log.push(format!("Chosen: {baseline} kbps"));
    log.push(format!("Target: {} kbps", budget.target));
    log.push(format!("Minimum (any given time): {} kbps", budget.minimum));
    log.push(format!("Floor (average): {}", bound(policy.bitrate_floor)));
    log.push("========================================");
}

/// Decide whether `media` needs transcoding under `policy`, and build the
/// encoder arguments when it does.
///
/// Pure and synchronous: no I/O, no shared state, bounded by the stream
/// count. Misconfiguration, malformed input and degenerate computations
/// all come back as skip decisions with diagnostics, never as errors.
pub fn plan(media: &MediaDescriptor, policy: &PolicyConfig) -> Decision {
    let mut log = DiagnosticLog::default();

    // Hard preconditions on the policy, before any per-file work.
    if let Err(err) = policy.validate() {
        debug!(%err, "policy rejected");
        log.push(format!("Configuration error: {err}. Skipping this file."));
        return Decision::skip(log, None);
    }

    let output_container = if policy.container == KEEP_ORIGINAL {
        media.container.clone()
    } else {
        policy.container.clone()
    };
    let output_extension = format!(".{output_container}");

    if !media.is_video() {
        log.push("File is not a video.");
        return Decision::skip(log, Some(output_extension));
    }

    // Validation guarantees the label resolves.
    let Some(profile) = profile::resolve(&policy.quality) else {
        log.push(format!("Configuration error: unknown quality profile '{}'.", policy.quality));
        return Decision::skip(log, None);
    };

    let duration_secs = media.effective_duration_secs().unwrap_or(0.0);
    let budget = bitrate::compute_budget(policy, profile, media.file_size, duration_secs, &mut log);
    if budget.target == 0 && policy.rate_control == RateControl::Bitrate {
        log.push("Target bitrate could not be calculated. Skipping this file.");
        return Decision::skip(log, Some(output_extension));
    }

    let analysis = streams::analyze(media, &output_container);
    debug!(
        removals = analysis.removals.len(),
        ten_bit = analysis.ten_bit,
        video_streams = analysis.video_streams.len(),
        "stream analysis complete"
    );

    // The first qualifying video stream is representative for the
    // conformance check; cover-art streams were already filtered out.
    let Some(video) = analysis.video_streams.first() else {
        log.push("No encodable video stream found.");
        return Decision::skip(log, Some(output_extension));
    };

    source_details(&mut log, video, budget.current);

    let report = conditions::evaluate(
        policy,
        profile,
        media,
        video,
        &output_container,
        budget.current,
    );
    if report.all_met() {
        log.push("Success conditions have all been met. Skipping transcoding for this file...");
        log.extend(report.conditions.iter().map(|c| c.log_line()));
        return Decision::skip(log, Some(output_extension));
    }
    log.push("Success conditions have not been met yet. Transcoding...");
    log.extend(report.conditions.iter().map(|c| c.log_line()));

    if policy.rate_control == RateControl::Bitrate {
        bitrate_details(&mut log, policy, profile.baseline_kbps, &budget);
    }

    let args = command::synthesize(
        policy,
        profile,
        &analysis,
        &budget,
        video.codec.as_deref(),
        video.width,
        video.height,
        &output_container,
    );
    debug!(tokens = args.as_slice().len(), "command synthesized");

    Decision::transcode(log, args, output_extension)
}
