//! Integration tests for `nrfconnect clean`

mod common;

use assert_fs::prelude::*;
use common::{streams, TestProject};
use predicates::prelude::*;

#[test]
fn test_clean_removes_only_the_named_output() {
    let project = TestProject::installed();
    let work = assert_fs::fixture::ChildPath::new(project.work_dir());
    work.child("_build/y/zephyr/zephyr.hex").touch().unwrap();
    work.child("_build/other/zephyr/zephyr.hex").touch().unwrap();

    let output = project.run(&["clean", "-o", "y", "--build-dir", "_build"]);
    let (stdout, stderr) = streams(&output);

    assert!(output.status.success(), "stdout={stdout}, stderr={stderr}");
    work.child("_build/y").assert(predicate::path::missing());
    work.child("_build/other/zephyr/zephyr.hex")
        .assert(predicate::path::exists());
    assert!(stdout.contains("Removed"), "stdout={stdout}");
}

#[test]
fn test_clean_twice_is_not_an_error() {
    let project = TestProject::installed();
    let work = assert_fs::fixture::ChildPath::new(project.work_dir());
    work.child("_build/nrfconnect/runner_nrf5340dk_nrf5340_cpuapp/build.ninja")
        .touch()
        .unwrap();

    let first = project.run(&["clean"]);
    let second = project.run(&["clean"]);
    let (stdout, stderr) = streams(&second);

    assert!(first.status.success());
    assert!(second.status.success(), "stdout={stdout}, stderr={stderr}");
    assert!(stdout.contains("Nothing to clean"), "stdout={stdout}");
    work.child("_build/nrfconnect/runner_nrf5340dk_nrf5340_cpuapp")
        .assert(predicate::path::missing());
    work.child("_build/nrfconnect").assert(predicate::path::is_dir());
}

#[test]
fn test_clean_ignores_a_plain_file() {
    let project = TestProject::installed();
    let work = assert_fs::fixture::ChildPath::new(project.work_dir());
    work.child("_build/y").write_str("not a directory").unwrap();

    let output = project.run(&["clean", "-o", "y", "--build-dir", "_build"]);

    assert!(output.status.success());
    work.child("_build/y").assert("not a directory");
}

#[test]
fn test_clean_dry_run_keeps_output() {
    let project = TestProject::installed();
    let work = assert_fs::fixture::ChildPath::new(project.work_dir());
    work.child("_build/y/build.ninja").touch().unwrap();

    let output = project.run(&["--dry-run", "clean", "-o", "y", "--build-dir", "_build"]);
    let (stdout, _) = streams(&output);

    assert!(output.status.success());
    assert!(stdout.contains("[dry-run] remove"), "stdout={stdout}");
    work.child("_build/y/build.ninja").assert(predicate::path::exists());
}
