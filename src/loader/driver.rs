//! Property loader
//!
//! Drives a stack of open files. Each frame owns its text, a line cursor,
//! its own parser state and the filter it was imported with. An `import`
//! pushes a frame and the new file is read to the end before its parent
//! resumes. The stack depth is bounded by `LoaderOptions::max_import_depth`.

use std::path::{Path, PathBuf};

use super::errors::LoadError;
use super::filter::PropertyFilter;
use super::lines::LineCursor;
use super::parser::{LineAction, ParserContext};
use super::report::{DiagnosticKind, LoadDiagnostic, LoadReport};
use super::source::read_property_file;
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope};
use crate::tuple::TupleAttr;
use crate::validator::validate_property_name;
use crate::zone::Nvram;

/// Default bound on nested imports, the root file included.
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 16;

/// Loader tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    pub max_import_depth: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

/// One open file.
struct Frame {
    source: PathBuf,
    text: String,
    cursor: LineCursor,
    parser: ParserContext,
    filter: PropertyFilter,
    /// 1 for the root file
    depth: usize,
}

impl Frame {
    fn new(source: PathBuf, text: String, filter: PropertyFilter, depth: usize) -> Self {
        Self {
            source,
            text,
            cursor: LineCursor::new(),
            parser: ParserContext::new(!filter.is_active()),
            filter,
            depth,
        }
    }
}

/// Applies property files to an `Nvram` implementation.
pub struct PropertyLoader<'n, N: Nvram + ?Sized> {
    nvram: &'n mut N,
    options: LoaderOptions,
    stack: Vec<Frame>,
    report: LoadReport,
}

impl<'n, N: Nvram + ?Sized> PropertyLoader<'n, N> {
    pub fn new(nvram: &'n mut N, options: LoaderOptions) -> Self {
        Self {
            nvram,
            options,
            stack: Vec::new(),
            report: LoadReport::default(),
        }
    }

    /// Loads the file at `path` and everything it imports.
    pub fn load_file(mut self, path: &Path, filter: PropertyFilter) -> LoadReport {
        let path_field = path.display().to_string();
        let scope = ObservationScope::with_fields("LOAD", &[("path", &path_field)]);

        self.open(path.to_path_buf(), filter, 1);
        self.run();

        scope.complete_with_fields(&[
            ("applied", &self.report.applied.to_string()),
            ("diagnostics", &self.report.diagnostics.len().to_string()),
        ]);
        self.report
    }

    /// Loads in-memory text. `source` only labels diagnostics; imports in
    /// the text are read from disk.
    pub fn load_str(mut self, source: &Path, text: &str, filter: PropertyFilter) -> LoadReport {
        self.report.files_loaded += 1;
        self.stack
            .push(Frame::new(source.to_path_buf(), text.to_string(), filter, 1));
        self.run();
        self.report
    }

    /// Reads a file and pushes its frame, or records why it was skipped.
    fn open(&mut self, path: PathBuf, filter: PropertyFilter, depth: usize) {
        match read_property_file(&path) {
            Ok(text) => {
                log_event_with_fields(
                    Event::PropertyFileLoaded,
                    &[
                        ("depth", &depth.to_string()),
                        ("filter", &filter.to_string()),
                        ("path", &path.display().to_string()),
                    ],
                );
                self.report.files_loaded += 1;
                self.stack.push(Frame::new(path, text, filter, depth));
            }
            Err(err) => {
                log_event_with_fields(
                    Event::PropertyFileSkipped,
                    &[
                        ("path", &path.display().to_string()),
                        ("reason", &err.to_string()),
                    ],
                );
                self.report.diagnostics.push(LoadDiagnostic {
                    source: path,
                    line: None,
                    kind: DiagnosticKind::FileSkipped(err),
                });
            }
        }
    }

    fn run(&mut self) {
        while let Some(frame) = self.stack.last_mut() {
            let Some(line) = frame.cursor.next_line(&frame.text) else {
                let pending = frame.parser.finish();
                if let Some(done) = self.stack.pop() {
                    if let Some((key, value)) = pending {
                        Self::apply(
                            &mut *self.nvram,
                            &mut self.report,
                            &done.source,
                            &done.filter,
                            None,
                            key,
                            value,
                        );
                    }
                }
                continue;
            };

            self.report.lines += 1;
            if Logger::enabled(Event::LineProcessed.default_severity()) {
                log_event_with_fields(
                    Event::LineProcessed,
                    &[
                        ("line", &line.number.to_string()),
                        ("path", &frame.source.display().to_string()),
                        ("text", line.text),
                    ],
                );
            }

            let number = line.number;
            match frame.parser.feed(line.text) {
                LineAction::Empty | LineAction::Comment | LineAction::Continued => {}
                LineAction::Property { key, value } => Self::apply(
                    &mut *self.nvram,
                    &mut self.report,
                    &frame.source,
                    &frame.filter,
                    Some(number),
                    key,
                    value,
                ),
                LineAction::MissingEquals(text) => {
                    log_event_with_fields(
                        Event::LineSkipped,
                        &[
                            ("line", &number.to_string()),
                            ("path", &frame.source.display().to_string()),
                            ("text", &text),
                        ],
                    );
                    self.report.diagnostics.push(LoadDiagnostic {
                        source: frame.source.clone(),
                        line: Some(number),
                        kind: DiagnosticKind::MissingEquals(text),
                    });
                }
                LineAction::Import { path, filter } => {
                    let depth = frame.depth + 1;
                    let parent = frame.source.clone();
                    self.import(parent, number, PathBuf::from(path), filter, depth);
                }
            }
        }
    }

    fn import(
        &mut self,
        parent: PathBuf,
        line: usize,
        path: PathBuf,
        filter: Option<String>,
        depth: usize,
    ) {
        let filter = PropertyFilter::parse(filter.as_deref());

        if depth > self.options.max_import_depth {
            let err = LoadError::ImportDepthExceeded {
                path,
                max_depth: self.options.max_import_depth,
            };
            log_event_with_fields(
                Event::ImportSkipped,
                &[
                    ("line", &line.to_string()),
                    ("parent", &parent.display().to_string()),
                    ("reason", &err.to_string()),
                ],
            );
            self.report.diagnostics.push(LoadDiagnostic {
                source: parent,
                line: Some(line),
                kind: DiagnosticKind::FileSkipped(err),
            });
            return;
        }

        log_event_with_fields(
            Event::ImportBegin,
            &[
                ("depth", &depth.to_string()),
                ("filter", &filter.to_string()),
                ("parent", &parent.display().to_string()),
                ("path", &path.display().to_string()),
            ],
        );
        self.open(path, filter, depth);
    }

    /// Filter commit rule: admitted keys are validated, then stored as
    /// persistent tuples.
    fn apply(
        nvram: &mut N,
        report: &mut LoadReport,
        source: &Path,
        filter: &PropertyFilter,
        line: Option<usize>,
        key: String,
        value: String,
    ) {
        if !filter.admits(&key) {
            report.filtered_out += 1;
            return;
        }

        let kind = match validate_property_name(&key) {
            Err(reason) => DiagnosticKind::IllegalName { name: key, reason },
            Ok(()) => match nvram.set(&key, &value, TupleAttr::Persistent) {
                Ok(()) => {
                    report.applied += 1;
                    log_event_with_fields(
                        Event::PropertyApplied,
                        &[("name", &key), ("value", &value)],
                    );
                    return;
                }
                Err(error) => DiagnosticKind::Rejected { name: key, error },
            },
        };

        let line_field = line.map(|l| l.to_string()).unwrap_or_default();
        log_event_with_fields(
            Event::PropertyRejected,
            &[
                ("line", &line_field),
                ("path", &source.display().to_string()),
                ("reason", &kind.to_string()),
            ],
        );
        report.diagnostics.push(LoadDiagnostic {
            source: source.to_path_buf(),
            line,
            kind,
        });
    }
}

/// Loads `path` into `nvram`.
pub fn load_file<N: Nvram + ?Sized>(
    nvram: &mut N,
    path: &Path,
    filter: PropertyFilter,
    options: LoaderOptions,
) -> LoadReport {
    PropertyLoader::new(nvram, options).load_file(path, filter)
}

/// Loads in-memory property text into `nvram`.
pub fn load_str<N: Nvram + ?Sized>(
    nvram: &mut N,
    text: &str,
    filter: PropertyFilter,
    options: LoaderOptions,
) -> LoadReport {
    PropertyLoader::new(nvram, options).load_str(Path::new("<input>"), text, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{TupleResult, TupleStore};
    use crate::zone::{ZoneHeader, ZoneResult};
    use std::fs;
    use tempfile::TempDir;

    /// Store-only backend.
    #[derive(Default)]
    struct MemoryNvram {
        store: TupleStore,
    }

    impl Nvram for MemoryNvram {
        fn get(&self, name: &str) -> Option<&str> {
            self.store.get(name)
        }

        fn set(&mut self, name: &str, value: &str, attr: TupleAttr) -> TupleResult<()> {
            self.store.set(name, value, attr)
        }

        fn unset(&mut self, name: &str) -> TupleResult<()> {
            self.store.unset(name)
        }

        fn get_all(&self, capacity: usize, include_temp: bool) -> TupleResult<Vec<u8>> {
            self.store.get_all(capacity, include_temp)
        }

        fn commit(&mut self) -> ZoneResult<ZoneHeader> {
            let region = self.store.get_all(usize::MAX, false).unwrap_or_default();
            Ok(ZoneHeader::for_region(&region, 1))
        }

        fn clear(&mut self) -> ZoneResult<()> {
            self.store.reset();
            Ok(())
        }

        fn erase(&mut self) -> ZoneResult<()> {
            self.clear()
        }
    }

    fn write_prop(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        }
        path
    }

    fn load(nvram: &mut MemoryNvram, text: &str) -> LoadReport {
        load_str(nvram, text, PropertyFilter::All, LoaderOptions::default())
    }

    #[test]
    fn test_loads_properties() {
        let mut nvram = MemoryNvram::default();
        let report = load(&mut nvram, "# header\n\na = 1\nb=two words\n");

        assert_eq!(nvram.get("a"), Some("1"));
        assert_eq!(nvram.get("b"), Some("two words"));
        assert_eq!(report.applied, 2);
        assert_eq!(report.lines, 4);
        assert!(report.is_clean());
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut nvram = MemoryNvram::default();
        load(&mut nvram, "a=1\nb=2");
        assert_eq!(nvram.get("b"), Some("2"));
    }

    #[test]
    fn test_later_assignment_wins() {
        let mut nvram = MemoryNvram::default();
        load(&mut nvram, "a=1\na=2\n");
        assert_eq!(nvram.get("a"), Some("2"));
    }

    #[test]
    fn test_illegal_name_is_reported_and_skipped() {
        let mut nvram = MemoryNvram::default();
        let report = load(&mut nvram, "bad..name=x\ngood=y\n");

        assert_eq!(nvram.get("bad..name"), None);
        assert_eq!(nvram.get("good"), Some("y"));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, Some(1));
        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::IllegalName { .. }
        ));
    }

    #[test]
    fn test_overlong_value_is_rejected() {
        let mut nvram = MemoryNvram::default();
        let text = format!("long={}\n", "v".repeat(300));
        let report = load(&mut nvram, &text);

        assert_eq!(nvram.get("long"), None);
        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::Rejected { .. }
        ));
    }

    #[test]
    fn test_missing_equals_is_reported() {
        let mut nvram = MemoryNvram::default();
        let report = load(&mut nvram, "garbage line\nok=1\n");

        assert_eq!(nvram.get("ok"), Some("1"));
        assert_eq!(
            report.diagnostics[0].kind,
            DiagnosticKind::MissingEquals("garbage line".into())
        );
    }

    #[test]
    fn test_continuation_across_lines() {
        let mut nvram = MemoryNvram::default();
        load(&mut nvram, "device.id = ABC\\\n123\nnext=1\n");
        assert_eq!(nvram.get("device.id"), Some("ABC\n123"));
        assert_eq!(nvram.get("next"), Some("1"));
    }

    #[test]
    fn test_continuation_at_end_of_input() {
        let mut nvram = MemoryNvram::default();
        let report = load(&mut nvram, "k = a\\\nb\\\n");
        assert_eq!(nvram.get("k"), Some("a\nb"));
        assert_eq!(report.applied, 1);
    }

    #[test]
    fn test_filter_prefix_and_exact() {
        let mut nvram = MemoryNvram::default();
        let text = "ro.foo.bar=1\nro.fo.bar=2\nro.foo.baz=3\n";

        let report = load_str(
            &mut nvram,
            text,
            PropertyFilter::parse(Some("ro.foo.*")),
            LoaderOptions::default(),
        );
        assert_eq!(nvram.get("ro.foo.bar"), Some("1"));
        assert_eq!(nvram.get("ro.fo.bar"), None);
        assert_eq!(nvram.get("ro.foo.baz"), Some("3"));
        assert_eq!(report.filtered_out, 1);

        let mut nvram = MemoryNvram::default();
        load_str(
            &mut nvram,
            text,
            PropertyFilter::parse(Some("ro.foo.bar")),
            LoaderOptions::default(),
        );
        assert_eq!(nvram.get("ro.foo.bar"), Some("1"));
        assert_eq!(nvram.store.len(), 1);
    }

    #[test]
    fn test_import_is_loaded_depth_first() {
        let dir = TempDir::new().unwrap();
        let child = write_prop(&dir, "child.prop", "shared=child\nchild.only=1\n");
        let root = write_prop(
            &dir,
            "root.prop",
            &format!("shared=root\nimport {}\nafter=1\n", child.display()),
        );

        let mut nvram = MemoryNvram::default();
        let report = load_file(
            &mut nvram,
            &root,
            PropertyFilter::All,
            LoaderOptions::default(),
        );

        // the import overrides what came before it
        assert_eq!(nvram.get("shared"), Some("child"));
        assert_eq!(nvram.get("child.only"), Some("1"));
        assert_eq!(nvram.get("after"), Some("1"));
        assert_eq!(report.files_loaded, 2);
    }

    #[test]
    fn test_import_with_filter() {
        let dir = TempDir::new().unwrap();
        let child = write_prop(
            &dir,
            "child.prop",
            "ro.foo.bar=1\nro.fo.bar=2\nother=3\n",
        );
        let root = write_prop(
            &dir,
            "root.prop",
            &format!("import {} ro.foo.*\n", child.display()),
        );

        let mut nvram = MemoryNvram::default();
        let report = load_file(&mut nvram, &root, PropertyFilter::All, LoaderOptions::default());

        assert_eq!(nvram.get("ro.foo.bar"), Some("1"));
        assert_eq!(nvram.get("ro.fo.bar"), None);
        assert_eq!(nvram.get("other"), None);
        assert_eq!(report.filtered_out, 2);
    }

    #[test]
    fn test_filtered_file_ignores_imports() {
        let dir = TempDir::new().unwrap();
        let grandchild = write_prop(&dir, "gc.prop", "ro.foo.deep=1\n");
        let child = write_prop(
            &dir,
            "child.prop",
            &format!("import {}\nro.foo.bar=1\n", grandchild.display()),
        );
        let root = write_prop(
            &dir,
            "root.prop",
            &format!("import {} ro.foo.*\n", child.display()),
        );

        let mut nvram = MemoryNvram::default();
        let report = load_file(&mut nvram, &root, PropertyFilter::All, LoaderOptions::default());

        assert_eq!(nvram.get("ro.foo.bar"), Some("1"));
        assert_eq!(nvram.get("ro.foo.deep"), None);
        assert_eq!(report.files_loaded, 2);
        // the import line is treated as a line without '='
        assert!(matches!(
            report.diagnostics[0].kind,
            DiagnosticKind::MissingEquals(_)
        ));
    }

    #[test]
    fn test_missing_import_is_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.prop");
        let root = write_prop(
            &dir,
            "root.prop",
            &format!("a=1\nimport {}\nb=2\n", missing.display()),
        );

        let mut nvram = MemoryNvram::default();
        let report = load_file(&mut nvram, &root, PropertyFilter::All, LoaderOptions::default());

        assert_eq!(nvram.get("a"), Some("1"));
        assert_eq!(nvram.get("b"), Some("2"));
        assert_eq!(report.skipped_files().count(), 1);
    }

    #[test]
    fn test_self_import_stops_at_depth_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loop.prop");
        write_prop(
            &dir,
            "loop.prop",
            &format!("import {}\nk=v\n", path.display()),
        );

        let mut nvram = MemoryNvram::default();
        let report = load_file(
            &mut nvram,
            &path,
            PropertyFilter::All,
            LoaderOptions { max_import_depth: 4 },
        );

        assert_eq!(report.files_loaded, 4);
        assert_eq!(nvram.get("k"), Some("v"));
        let exceeded: Vec<_> = report
            .skipped_files()
            .filter(|e| matches!(e, LoadError::ImportDepthExceeded { .. }))
            .collect();
        assert_eq!(exceeded.len(), 1);
    }

    #[test]
    fn test_missing_root_file() {
        let dir = TempDir::new().unwrap();
        let mut nvram = MemoryNvram::default();
        let report = load_file(
            &mut nvram,
            &dir.path().join("none.prop"),
            PropertyFilter::All,
            LoaderOptions::default(),
        );

        assert_eq!(report.files_loaded, 0);
        assert_eq!(report.skipped_files().count(), 1);
        assert!(nvram.store.is_empty());
    }
}
