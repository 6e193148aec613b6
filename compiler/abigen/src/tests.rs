#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;

const MANIFEST: &str = r#"{
    "name": "math",
    "version": "1.0.0",
    "language": "cpp",
    "methods": [
        {
            "name": "Add",
            "funcName": "Add_Impl",
            "paramTypes": [
                {"name": "a", "type": "int32"},
                {"name": "b", "type": "int32"}
            ],
            "retType": {"type": "int32"}
        }
    ]
}"#;

fn options(dir: &Path, language: &str) -> Options {
    let manifest_path = dir.join("math.json");
    fs::write(&manifest_path, MANIFEST).unwrap();
    Options {
        manifest_path,
        output_dir: dir.join("out"),
        language: language.to_string(),
        overwrite: false,
        verbose: false,
    }
}

#[test]
fn run_writes_every_generated_file() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run(&options(dir.path(), "cpp")).unwrap();

    assert_eq!(summary.plugin_name, "math");
    assert_eq!(summary.method_count, 1);
    assert!(!summary.written.is_empty());
    for path in &summary.written {
        assert!(path.exists(), "{} missing", path.display());
    }

    let core = fs::read_to_string(
        dir.path().join("out/include/math/math/core.hpp"),
    )
    .unwrap();
    assert!(core.contains("math.Add_Impl"));
}

#[test]
fn refuses_to_clobber_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), "python");
    run(&opts).unwrap();

    let err = run(&opts).unwrap_err();
    assert!(matches!(err, CliError::WouldClobber(_)));
}

#[test]
fn overwrite_replaces_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), "python");
    run(&opts).unwrap();

    opts.overwrite = true;
    let summary = run(&opts).unwrap();
    assert_eq!(summary.written.len(), 1);
}

#[test]
fn missing_manifest_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), "cpp");
    opts.manifest_path = dir.path().join("absent.json");

    let err = run(&opts).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
}

#[test]
fn generation_errors_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), "cobol");
    let err = run(&opts).unwrap_err();
    assert!(matches!(err, CliError::Generate(_)));
}

#[test]
fn refused_run_leaves_the_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), "cpp");
    run(&opts).unwrap();

    // Plant a sentinel in one generated file, then re-run without
    // overwrite: nothing may change.
    let target = dir.path().join("out/include/math/math.hpp");
    fs::write(&target, "sentinel").unwrap();
    run(&opts).unwrap_err();
    assert_eq!(fs::read_to_string(&target).unwrap(), "sentinel");
}
