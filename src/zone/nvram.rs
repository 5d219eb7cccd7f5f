//! File-backed NVRAM zone
//!
//! `NvramZone` owns the tuple store and the zone header for one session and
//! writes the whole zone image to a backing file on commit:
//!
//! - `init` opens or creates the image at exactly the zone size
//! - `generate` serializes persistent tuples and rebuilds the header
//! - `commit` generates and flushes with fsync
//! - `clear` resets the store, `erase` also overwrites the image
//! - `deinit` releases the session
//!
//! Nothing reaches the file until the whole image has been generated, so a
//! capacity failure never leaves a partial image behind.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{ZoneError, ZoneResult};
use super::header::{encode_image, ZoneHeader, ERASED_BYTE, HEADER_LEN};
use super::reader::ZoneReader;
use super::summary::{SummaryTuple, ZoneSummary};
use crate::observability::{log_event_with_fields, Event};
use crate::tuple::{TupleAttr, TupleResult, TupleStore};

/// The storage contract shared by the host-side builder and device backends.
///
/// `init` is the implementor's constructor and `deinit` consumes it, so only
/// the per-session operations live here.
pub trait Nvram {
    /// Exact-match lookup.
    fn get(&self, name: &str) -> Option<&str>;

    /// Inserts or replaces a tuple.
    fn set(&mut self, name: &str, value: &str, attr: TupleAttr) -> TupleResult<()>;

    /// Removes a tuple.
    fn unset(&mut self, name: &str) -> TupleResult<()>;

    /// Serialized `name=value\0...\0` layout, at most `capacity` bytes.
    fn get_all(&self, capacity: usize, include_temp: bool) -> TupleResult<Vec<u8>>;

    /// Regenerates the header and persists the zone.
    fn commit(&mut self) -> ZoneResult<ZoneHeader>;

    /// Empties the in-memory store.
    fn clear(&mut self) -> ZoneResult<()>;

    /// Empties the store and wipes the backing zone.
    fn erase(&mut self) -> ZoneResult<()>;
}

/// A zone stored in a regular file.
pub struct NvramZone {
    image_path: PathBuf,
    file: File,
    size: usize,
    store: TupleStore,
    /// Header of the last generated image
    header: Option<ZoneHeader>,
    /// Last generated image, flushed by commit
    image: Vec<u8>,
    generation: u32,
    /// Store changed since the last generate
    dirty: bool,
}

impl NvramZone {
    /// Opens or creates the image at `image_path` sized to exactly `size` bytes.
    ///
    /// If the path already holds a valid zone its generation seeds the
    /// counter; its tuples are not loaded. An unreadable or invalid existing
    /// image is ignored.
    ///
    /// # Errors
    ///
    /// `NVZ_ZONE_INIT_FAILED` when `size` is zero or exceeds the 32-bit length
    /// field, or when the file cannot be opened or resized.
    pub fn init(image_path: &Path, size: u64) -> ZoneResult<Self> {
        if size == 0 {
            log_init_failed(image_path, "zone size must be greater than zero");
            return Err(ZoneError::invalid_size(size, "zone size must be greater than zero"));
        }
        if size > u64::from(u32::MAX) {
            log_init_failed(image_path, "zone size exceeds 32-bit length field");
            return Err(ZoneError::invalid_size(size, "zone size exceeds 32-bit length field"));
        }

        let generation = Self::seed_generation(image_path);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(image_path)
            .map_err(|e| {
                log_init_failed(image_path, &e.to_string());
                ZoneError::init_failed(
                    format!("Failed to open zone image: {}", image_path.display()),
                    e,
                )
            })?;

        file.set_len(size).map_err(|e| {
            log_init_failed(image_path, &e.to_string());
            ZoneError::init_failed(
                format!("Failed to size zone image: {}", image_path.display()),
                e,
            )
        })?;

        log_event_with_fields(
            Event::ZoneInit,
            &[
                ("generation", &generation.to_string()),
                ("path", &image_path.display().to_string()),
                ("size", &format!("{:#x}", size)),
            ],
        );

        Ok(Self {
            image_path: image_path.to_path_buf(),
            file,
            size: size as usize,
            store: TupleStore::new(),
            header: None,
            image: Vec::new(),
            generation,
            dirty: true,
        })
    }

    fn seed_generation(image_path: &Path) -> u32 {
        let has_content = image_path
            .metadata()
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !has_content {
            return 0;
        }

        match ZoneReader::read(image_path) {
            Ok(snapshot) => snapshot.header.generation,
            Err(e) => {
                log_event_with_fields(
                    Event::ZoneExistingIgnored,
                    &[
                        ("path", &image_path.display().to_string()),
                        ("reason", &e.to_string()),
                    ],
                );
                0
            }
        }
    }

    /// Path of the backing image.
    pub fn path(&self) -> &Path {
        &self.image_path
    }

    /// Zone size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Read access to the tuple store.
    pub fn store(&self) -> &TupleStore {
        &self.store
    }

    /// Header of the last generated image, if any.
    pub fn header(&self) -> Option<&ZoneHeader> {
        self.header.as_ref()
    }

    /// Current generation counter.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Bytes the persistent tuples need: header plus region.
    pub fn used_bytes(&self) -> usize {
        HEADER_LEN + self.store.encoded_len(false)
    }

    /// Serializes persistent tuples and rebuilds the header.
    ///
    /// The generation is bumped when the store changed since the last
    /// generate, or when `rehash` is set. An unchanged store regenerates the
    /// identical header and image.
    ///
    /// # Errors
    ///
    /// `NVZ_ZONE_CAPACITY_EXCEEDED` when header plus region exceed the zone
    /// size. The previously generated image is kept in that case.
    pub fn generate(&mut self, rehash: bool) -> ZoneResult<ZoneHeader> {
        let required = self.used_bytes();
        if required > self.size {
            return Err(ZoneError::capacity_exceeded(required, self.size));
        }

        let region = self
            .store
            .get_all(self.size - HEADER_LEN, false)
            .map_err(|_| ZoneError::capacity_exceeded(required, self.size))?;

        let generation = if self.dirty || rehash || self.header.is_none() {
            self.generation.wrapping_add(1)
        } else {
            self.generation
        };

        let header = ZoneHeader::for_region(&region, generation);
        self.image = encode_image(&header, &region, self.size);
        self.header = Some(header);
        self.generation = generation;
        self.dirty = false;

        log_event_with_fields(
            Event::ZoneGenerate,
            &[
                ("checksum", &format!("{:08x}", header.checksum)),
                ("generation", &generation.to_string()),
                ("rehash", if rehash { "true" } else { "false" }),
                ("total_length", &header.total_length.to_string()),
            ],
        );

        Ok(header)
    }

    /// Forces a generation bump and flushes the image.
    pub fn rehash(&mut self) -> ZoneResult<ZoneHeader> {
        let header = self.generate(true)?;
        self.flush()?;
        Ok(header)
    }

    fn flush(&mut self) -> ZoneResult<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| ZoneError::io_error("Failed to seek zone image", e))?;
        self.file.write_all(&self.image).map_err(|e| {
            ZoneError::io_error(
                format!("Failed to write zone image: {}", self.image_path.display()),
                e,
            )
        })?;
        // fsync - mandatory for durability
        self.file.sync_all().map_err(|e| {
            ZoneError::io_error(
                format!("fsync failed for zone image: {}", self.image_path.display()),
                e,
            )
        })
    }

    /// Snapshot of the session for the operator dump.
    pub fn show(&self) -> ZoneSummary {
        let used = self.used_bytes();
        ZoneSummary {
            path: self.image_path.display().to_string(),
            size: self.size,
            used_bytes: used,
            free_bytes: self.size.saturating_sub(used),
            generation: self.header.map(|h| h.generation),
            checksum: self.header.map(|h| h.checksum),
            tuples: self
                .store
                .iter()
                .map(|t| SummaryTuple {
                    name: t.name.to_string(),
                    value: t.value.to_string(),
                    temporary: t.attr.is_temporary(),
                })
                .collect(),
        }
    }

    /// Releases the session and closes the backing image.
    pub fn deinit(self) {
        log_event_with_fields(
            Event::ZoneDeinit,
            &[
                ("path", &self.image_path.display().to_string()),
                ("tuples", &self.store.len().to_string()),
            ],
        );
    }
}

impl Nvram for NvramZone {
    fn get(&self, name: &str) -> Option<&str> {
        self.store.get(name)
    }

    fn set(&mut self, name: &str, value: &str, attr: TupleAttr) -> TupleResult<()> {
        self.store.set(name, value, attr)?;
        self.dirty = true;
        Ok(())
    }

    fn unset(&mut self, name: &str) -> TupleResult<()> {
        self.store.unset(name)?;
        self.dirty = true;
        Ok(())
    }

    fn get_all(&self, capacity: usize, include_temp: bool) -> TupleResult<Vec<u8>> {
        self.store.get_all(capacity, include_temp)
    }

    fn commit(&mut self) -> ZoneResult<ZoneHeader> {
        let header = match self.generate(false) {
            Ok(header) => header,
            Err(e) => {
                log_commit_failed(&self.image_path, &e);
                return Err(e);
            }
        };
        if let Err(e) = self.flush() {
            log_commit_failed(&self.image_path, &e);
            return Err(e);
        }

        log_event_with_fields(
            Event::ZoneCommit,
            &[
                ("checksum", &format!("{:08x}", header.checksum)),
                ("generation", &header.generation.to_string()),
                ("path", &self.image_path.display().to_string()),
                ("total_length", &header.total_length.to_string()),
            ],
        );
        Ok(header)
    }

    fn clear(&mut self) -> ZoneResult<()> {
        self.store.reset();
        self.dirty = true;
        log_event_with_fields(
            Event::ZoneCleared,
            &[("path", &self.image_path.display().to_string())],
        );
        Ok(())
    }

    fn erase(&mut self) -> ZoneResult<()> {
        self.store.reset();
        self.dirty = true;
        self.header = None;
        self.image = vec![ERASED_BYTE; self.size];
        self.flush()?;

        log_event_with_fields(
            Event::ZoneErased,
            &[
                ("path", &self.image_path.display().to_string()),
                ("size", &self.size.to_string()),
            ],
        );
        Ok(())
    }
}

fn log_init_failed(path: &Path, reason: &str) {
    log_event_with_fields(
        Event::ZoneInitFailed,
        &[("path", &path.display().to_string()), ("reason", reason)],
    );
}

fn log_commit_failed(path: &Path, err: &ZoneError) {
    log_event_with_fields(
        Event::ZoneCommitFailed,
        &[
            ("code", err.code().code()),
            ("path", &path.display().to_string()),
            ("reason", &err.to_string()),
        ],
    );
}
