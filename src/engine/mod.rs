// Transcode decision engine - pure, no I/O

pub mod bitrate;
pub mod command;
pub mod conditions;
pub mod plan;
pub mod profile;
pub mod streams;

pub use bitrate::BitrateBudget;
pub use command::ArgList;
pub use plan::{Decision, DiagnosticLog, plan};
pub use profile::{QUALITY_PROFILES, QualityProfile};
