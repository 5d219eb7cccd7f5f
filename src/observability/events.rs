//! Observable events of a zone build
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Zone build begins
    BuildStart,
    /// Zone build finished
    BuildComplete,
    /// Build configuration assembled and validated
    ConfigLoaded,

    // Zone
    /// Backing image opened and session started
    ZoneInit,
    /// Zone initialization failed (FATAL)
    ZoneInitFailed,
    /// Existing image ignored while seeding the generation counter
    ZoneExistingIgnored,
    /// Header and region regenerated
    ZoneGenerate,
    /// Image flushed to the backing file
    ZoneCommit,
    /// Commit failed
    ZoneCommitFailed,
    /// In-memory store cleared
    ZoneCleared,
    /// Backing image overwritten
    ZoneErased,
    /// Session released
    ZoneDeinit,

    // Property loading
    /// A property file was read and parsed
    PropertyFileLoaded,
    /// A property file was skipped (missing, unreadable, insecure)
    PropertyFileSkipped,
    /// A property was written to the store
    PropertyApplied,
    /// A property was rejected by validation or the store
    PropertyRejected,
    /// A line was skipped by the parser
    LineSkipped,
    /// A physical line is being processed
    LineProcessed,
    /// A nested import begins
    ImportBegin,
    /// A nested import was not followed
    ImportSkipped,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BuildStart => "BUILD_START",
            Event::BuildComplete => "BUILD_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ZoneInit => "ZONE_INIT",
            Event::ZoneInitFailed => "ZONE_INIT_FAILED",
            Event::ZoneExistingIgnored => "ZONE_EXISTING_IGNORED",
            Event::ZoneGenerate => "ZONE_GENERATE",
            Event::ZoneCommit => "ZONE_COMMIT",
            Event::ZoneCommitFailed => "ZONE_COMMIT_FAILED",
            Event::ZoneCleared => "ZONE_CLEARED",
            Event::ZoneErased => "ZONE_ERASED",
            Event::ZoneDeinit => "ZONE_DEINIT",

            Event::PropertyFileLoaded => "PROPERTY_FILE_LOADED",
            Event::PropertyFileSkipped => "PROPERTY_FILE_SKIPPED",
            Event::PropertyApplied => "PROPERTY_APPLIED",
            Event::PropertyRejected => "PROPERTY_REJECTED",
            Event::LineSkipped => "LINE_SKIPPED",
            Event::LineProcessed => "LINE_PROCESSED",
            Event::ImportBegin => "IMPORT_BEGIN",
            Event::ImportSkipped => "IMPORT_SKIPPED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ZoneInitFailed)
    }

    /// Severity used when the caller does not pick one.
    pub fn default_severity(&self) -> Severity {
        match self {
            Event::ZoneInitFailed => Severity::Fatal,
            Event::ZoneCommitFailed => Severity::Error,
            Event::ZoneExistingIgnored
            | Event::PropertyFileSkipped
            | Event::PropertyRejected
            | Event::ImportSkipped => Severity::Warn,
            Event::LineProcessed | Event::LineSkipped | Event::ZoneGenerate => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
