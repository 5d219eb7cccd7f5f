//! Property loading against a file-backed zone

use std::fs;
use std::path::PathBuf;

use nvzone::loader::{load_file, DiagnosticKind, LoadError, LoaderOptions, PropertyFilter};
use nvzone::zone::{Nvram, NvramZone};
use tempfile::TempDir;

fn write_prop(dir: &TempDir, name: &str, content: &str, mode: u32) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }
    #[cfg(not(unix))]
    let _ = mode;
    path
}

fn zone(dir: &TempDir) -> NvramZone {
    NvramZone::init(&dir.path().join("nvram.img"), 0x1000).unwrap()
}

#[test]
fn test_import_chain_with_filters() {
    let dir = TempDir::new().unwrap();
    let vendor = write_prop(
        &dir,
        "vendor.prop",
        "ro.foo.bar=vendor\nro.fo.bar=nope\nro.baz=nope\n",
        0o644,
    );
    let exact = write_prop(&dir, "exact.prop", "ro.baz=exact\nro.qux=nope\n", 0o644);
    let root = write_prop(
        &dir,
        "root.prop",
        &format!(
            "top=1\nimport {} ro.foo.*\nimport {} ro.baz\n",
            vendor.display(),
            exact.display()
        ),
        0o644,
    );

    let mut zone = zone(&dir);
    let report = load_file(&mut zone, &root, PropertyFilter::All, LoaderOptions::default());

    assert_eq!(zone.get("top"), Some("1"));
    assert_eq!(zone.get("ro.foo.bar"), Some("vendor"));
    assert_eq!(zone.get("ro.fo.bar"), None);
    assert_eq!(zone.get("ro.baz"), Some("exact"));
    assert_eq!(zone.get("ro.qux"), None);
    assert_eq!(report.files_loaded, 3);
    assert_eq!(report.filtered_out, 3);
    assert!(report.is_clean());
}

#[test]
fn test_mutual_imports_hit_depth_limit() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.prop");
    let b = dir.path().join("b.prop");
    write_prop(&dir, "a.prop", &format!("import {}\na=1\n", b.display()), 0o644);
    write_prop(&dir, "b.prop", &format!("import {}\nb=1\n", a.display()), 0o644);

    let mut zone = zone(&dir);
    let report = load_file(&mut zone, &a, PropertyFilter::All, LoaderOptions::default());

    assert_eq!(report.files_loaded, 16);
    assert_eq!(zone.get("a"), Some("1"));
    assert_eq!(zone.get("b"), Some("1"));
    assert!(report
        .skipped_files()
        .any(|e| matches!(e, LoadError::ImportDepthExceeded { max_depth: 16, .. })));
}

#[cfg(unix)]
#[test]
fn test_insecure_import_is_skipped() {
    let dir = TempDir::new().unwrap();
    let open = write_prop(&dir, "open.prop", "evil=1\n", 0o666);
    let root = write_prop(
        &dir,
        "root.prop",
        &format!("import {}\ngood=1\n", open.display()),
        0o644,
    );

    let mut zone = zone(&dir);
    let report = load_file(&mut zone, &root, PropertyFilter::All, LoaderOptions::default());

    assert_eq!(zone.get("evil"), None);
    assert_eq!(zone.get("good"), Some("1"));
    assert!(matches!(
        report.diagnostics[0].kind,
        DiagnosticKind::FileSkipped(LoadError::InsecurePermissions { .. })
    ));
}

#[test]
fn test_bad_lines_do_not_stop_the_load() {
    let dir = TempDir::new().unwrap();
    let root = write_prop(
        &dir,
        "root.prop",
        "first=1\nno equals\n.lead=x\nnul=\0\nlast=2\n",
        0o644,
    );

    let mut zone = zone(&dir);
    let report = load_file(&mut zone, &root, PropertyFilter::All, LoaderOptions::default());

    assert_eq!(zone.get("first"), Some("1"));
    assert_eq!(zone.get("last"), Some("2"));
    assert_eq!(report.applied, 2);
    assert_eq!(report.diagnostics.len(), 3);
    assert_eq!(report.diagnostics[1].line, Some(3));
}

#[test]
fn test_crlf_files_are_trimmed() {
    let dir = TempDir::new().unwrap();
    let root = write_prop(&dir, "root.prop", "a = 1\r\nb=2\r\n", 0o644);

    let mut zone = zone(&dir);
    load_file(&mut zone, &root, PropertyFilter::All, LoaderOptions::default());

    assert_eq!(zone.get("a"), Some("1"));
    assert_eq!(zone.get("b"), Some("2"));
}
