//! Per-stream compatibility analysis for the selected output container.

use crate::probe::MediaDescriptor;

/// Subtitle/metadata codecs the mkv muxer cannot carry.
const MKV_INCOMPATIBLE: &[&str] = &["mov_text", "eia_608", "timed_id3"];

/// Image and bitmap-subtitle codecs the mp4 muxer cannot carry.
const MP4_INCOMPATIBLE: &[&str] = &["hdmv_pgs_subtitle", "eia_608", "subrip", "timed_id3"];

/// Still-image codecs that show up as bogus "video" streams (embedded
/// cover art); encoding them breaks the plan.
const IMAGE_VIDEO_CODECS: &[&str] = &["mjpeg", "png"];

/// A "drop this stream" directive for the synthesizer, in the order the
/// analyzer produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Drop every data stream (`-map -0:d`).
    DataStreams,
    /// Drop the stream at this absolute index (`-map -0:N`).
    Stream(usize),
    /// Drop the Nth video stream (`-map -v:N`).
    VideoStream(usize),
}

/// Dimensions and codec of one real video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStreamSummary {
    /// Index among video streams (not the absolute stream index).
    pub video_index: usize,
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// What a single pass over the stream sequence found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamAnalysis {
    pub removals: Vec<Removal>,
    /// Source is 10-bit/HDR; disables 10-bit-incapable hardware decoders.
    pub ten_bit: bool,
    pub video_streams: Vec<VideoStreamSummary>,
}

/// Codecs a restrictive container cannot carry. Anything not listed keeps
/// all streams.
fn incompatible_codecs(container: &str) -> &'static [&'static str] {
    match container {
        "mkv" => MKV_INCOMPATIBLE,
        "mp4" => MP4_INCOMPATIBLE,
        _ => &[],
    }
}

/// Inspect each stream once, producing removal directives for
/// container-incompatible and decorative streams, the 10-bit flag, and
/// the video-stream summaries the evaluator works from.
///
/// A stream with no readable codec type or name is treated as absent and
/// skipped; it is never an error.
pub fn analyze(media: &MediaDescriptor, output_container: &str) -> StreamAnalysis {
    let container = output_container.to_ascii_lowercase();
    let mut analysis = StreamAnalysis::default();

    // mkv carries no data tracks; drop them wholesale up front.
    if container == "mkv" {
        analysis.removals.push(Removal::DataStreams);
    }

    let incompatible = incompatible_codecs(&container);
    for (index, stream) in media.streams.iter().enumerate() {
        if let Some(codec) = stream.codec() {
            if incompatible.contains(&codec.as_str()) {
                analysis.removals.push(Removal::Stream(index));
            }
        }
    }

    let mut video_index = 0;
    for stream in &media.streams {
        if !stream.is_video() {
            continue;
        }
        let codec = stream.codec();

        if codec
            .as_deref()
            .is_some_and(|c| IMAGE_VIDEO_CODECS.contains(&c))
        {
            // Embedded picture masquerading as video; drop instead of encode.
            analysis.removals.push(Removal::VideoStream(video_index));
        } else {
            analysis.video_streams.push(VideoStreamSummary {
                video_index,
                codec: codec.clone(),
                width: stream.width,
                height: stream.height,
            });
        }

        if stream.profile.as_deref() == Some("High 10")
            || stream.bits_per_raw_sample.as_deref() == Some("10")
        {
            analysis.ten_bit = true;
        }

        video_index += 1;
    }

    analysis
}
