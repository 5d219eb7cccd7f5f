//! Zone error types
//!
//! Error codes:
//! - NVZ_ZONE_INIT_FAILED (FATAL) - image cannot be opened/created, bad size
//! - NVZ_ZONE_IO_ERROR (ERROR) - write or sync of the image failed
//! - NVZ_ZONE_CAPACITY_EXCEEDED (ERROR) - tuples do not fit the zone
//! - NVZ_ZONE_CORRUPTION (FATAL) - image failed header or checksum validation

use std::fmt;
use std::io;

/// Severity levels for zone errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The failing call is aborted, cleanup continues
    Error,
    /// The run cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Zone error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneErrorCode {
    /// Backing image could not be set up
    NvzZoneInitFailed,
    /// Disk I/O failure after init
    NvzZoneIoError,
    /// Serialized tuples exceed the zone size
    NvzZoneCapacityExceeded,
    /// Header or checksum mismatch on read
    NvzZoneCorruption,
}

impl ZoneErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ZoneErrorCode::NvzZoneInitFailed => "NVZ_ZONE_INIT_FAILED",
            ZoneErrorCode::NvzZoneIoError => "NVZ_ZONE_IO_ERROR",
            ZoneErrorCode::NvzZoneCapacityExceeded => "NVZ_ZONE_CAPACITY_EXCEEDED",
            ZoneErrorCode::NvzZoneCorruption => "NVZ_ZONE_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ZoneErrorCode::NvzZoneInitFailed => Severity::Fatal,
            ZoneErrorCode::NvzZoneIoError => Severity::Error,
            ZoneErrorCode::NvzZoneCapacityExceeded => Severity::Error,
            ZoneErrorCode::NvzZoneCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for ZoneErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Zone error with context
#[derive(Debug)]
pub struct ZoneError {
    code: ZoneErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl ZoneError {
    /// Image could not be opened, created or sized
    pub fn init_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneInitFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Init rejected before touching the filesystem (bad size)
    pub fn invalid_size(size: u64, reason: impl Into<String>) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneInitFailed,
            message: reason.into(),
            details: Some(format!("size: {:#x}", size)),
            source: None,
        }
    }

    /// Write, seek or sync failed
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Header plus region needs `required` bytes but the zone has `size`
    pub fn capacity_exceeded(required: usize, size: usize) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneCapacityExceeded,
            message: "serialized tuples do not fit the zone".to_string(),
            details: Some(format!("required: {}, zone_size: {}", required, size)),
            source: None,
        }
    }

    /// Image failed validation
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Image failed validation at a byte offset
    pub fn corruption_at_offset(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Image could not be read at all
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ZoneErrorCode::NvzZoneIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    pub fn code(&self) -> ZoneErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error ends the run
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ZoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for zone operations
pub type ZoneResult<T> = Result<T, ZoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ZoneErrorCode::NvzZoneInitFailed.code(), "NVZ_ZONE_INIT_FAILED");
        assert_eq!(ZoneErrorCode::NvzZoneIoError.code(), "NVZ_ZONE_IO_ERROR");
        assert_eq!(
            ZoneErrorCode::NvzZoneCapacityExceeded.code(),
            "NVZ_ZONE_CAPACITY_EXCEEDED"
        );
        assert_eq!(ZoneErrorCode::NvzZoneCorruption.code(), "NVZ_ZONE_CORRUPTION");
    }

    #[test]
    fn test_init_failure_is_fatal() {
        let err = ZoneError::invalid_size(0, "zone size must be greater than zero");
        assert!(err.is_fatal());
        assert_eq!(err.details(), Some("size: 0x0"));
    }

    #[test]
    fn test_capacity_is_not_fatal() {
        let err = ZoneError::capacity_exceeded(4097, 4096);
        assert!(!err.is_fatal());
        assert_eq!(err.code(), ZoneErrorCode::NvzZoneCapacityExceeded);
    }

    #[test]
    fn test_display_contains_required_fields() {
        let err = ZoneError::corruption_at_offset(17, "checksum mismatch");
        let display = err.to_string();
        assert!(display.contains("NVZ_ZONE_CORRUPTION"));
        assert!(display.contains("FATAL"));
        assert!(display.contains("checksum mismatch"));
        assert!(display.contains("byte_offset: 17"));
    }

    #[test]
    fn test_display_includes_io_source() {
        let err = ZoneError::io_error(
            "failed to write image",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("disk full"));
    }
}
