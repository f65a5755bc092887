//! End-to-end builds in a fresh workspace.

use super::*;

#[test]
fn fresh_build_produces_the_resourced_bundle() -> anyhow::Result<()> {
    let space = TestSpace::with_inputs()?;
    let out = space.run_expect(&mut cpbundle_command(vec![]))?;
    assert_output_contains(&out, "ran 4 tasks");
    assert!(space.exists("CellProfiler"));
    assert!(space.exists("core"));
    assert_eq!(
        space.read("dist/CellProfiler.app/Contents/Info.plist")?,
        b"plist-template"
    );
    assert_eq!(
        space.read("dist/CellProfiler.app/Contents/MacOS/entitlements.plist")?,
        b"entitlements"
    );
    Ok(())
}

#[test]
fn second_run_does_no_work() -> anyhow::Result<()> {
    let space = TestSpace::with_inputs()?;
    space.run_expect(&mut cpbundle_command(vec![]))?;
    let out = space.run_expect(&mut cpbundle_command(vec![]))?;
    assert_output_contains(&out, "no work to do");
    Ok(())
}

#[test]
fn dmg_target_builds_the_disk_image() -> anyhow::Result<()> {
    let space = TestSpace::with_inputs()?;
    space.stub_tool("hdiutil", HDIUTIL_STUB)?;
    let out = space.run_expect(&mut cpbundle_command(vec!["dmg"]))?;
    assert_output_contains(&out, "ran 5 tasks");
    assert_output_contains(&out, "create disk image");
    assert!(space.exists("CellProfiler.dmg"));
    Ok(())
}

#[test]
fn missing_spec_file_fails_before_any_work() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("Info.plist", "plist-template")?;
    space.write("entitlements.plist", "entitlements")?;
    space.stub_tool("git", GIT_STUB)?;
    space.stub_tool("python3", PYTHON_STUB)?;
    let out = space.run(&mut cpbundle_command(vec![]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "input CellProfiler.spec missing");
    // Nothing ran: no clone happened.
    assert!(!space.exists("CellProfiler"));
    Ok(())
}

#[test]
fn unknown_target_is_an_error() -> anyhow::Result<()> {
    let space = TestSpace::with_inputs()?;
    let out = space.run(&mut cpbundle_command(vec!["bogus"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "unknown target");
    Ok(())
}
