use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {

/* Begin PBXBuildFile section */
		B10000000000000000000001 /* AppDelegate.swift in Sources */ = {isa = PBXBuildFile; fileRef = A10000000000000000000001 /* AppDelegate.swift */; };
		B10000000000000000000002 /* AppTests.swift in Sources */ = {isa = PBXBuildFile; fileRef = A10000000000000000000002 /* AppTests.swift */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
		A10000000000000000000001 /* AppDelegate.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = AppDelegate.swift; sourceTree = "<group>"; };
		A10000000000000000000002 /* AppTests.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = AppTests.swift; sourceTree = "<group>"; };
		A10000000000000000000004 /* Demo.app */ = {isa = PBXFileReference; explicitFileType = wrapper.application; includeInIndex = 0; path = Demo.app; sourceTree = BUILT_PRODUCTS_DIR; };
		A10000000000000000000005 /* DemoTests.xctest */ = {isa = PBXFileReference; explicitFileType = wrapper.cfbundle; includeInIndex = 0; path = DemoTests.xctest; sourceTree = BUILT_PRODUCTS_DIR; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
		G10000000000000000000001 = {
			isa = PBXGroup;
			children = (
				G10000000000000000000002 /* Demo */,
				G10000000000000000000003 /* DemoTests */,
				G10000000000000000000004 /* Products */,
			);
			sourceTree = "<group>";
		};
		G10000000000000000000002 /* Demo */ = {
			isa = PBXGroup;
			children = (
				A10000000000000000000001 /* AppDelegate.swift */,
			);
			path = Demo;
			sourceTree = "<group>";
		};
		G10000000000000000000003 /* DemoTests */ = {
			isa = PBXGroup;
			children = (
				A10000000000000000000002 /* AppTests.swift */,
			);
			path = DemoTests;
			sourceTree = "<group>";
		};
		G10000000000000000000004 /* Products */ = {
			isa = PBXGroup;
			children = (
				A10000000000000000000004 /* Demo.app */,
				A10000000000000000000005 /* DemoTests.xctest */,
			);
			name = Products;
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXNativeTarget section */
		T10000000000000000000001 /* Demo */ = {
			isa = PBXNativeTarget;
			buildPhases = (
				P10000000000000000000001 /* Sources */,
			);
			name = Demo;
			productName = Demo;
			productReference = A10000000000000000000004 /* Demo.app */;
			productType = "com.apple.product-type.application";
		};
		T10000000000000000000002 /* DemoTests */ = {
			isa = PBXNativeTarget;
			buildPhases = (
				P10000000000000000000003 /* Sources */,
			);
			name = DemoTests;
			productName = DemoTests;
			productReference = A10000000000000000000005 /* DemoTests.xctest */;
			productType = "com.apple.product-type.bundle.unit-test";
		};
/* End PBXNativeTarget section */

/* Begin PBXProject section */
		C10000000000000000000001 /* Project object */ = {
			isa = PBXProject;
			mainGroup = G10000000000000000000001;
			productRefGroup = G10000000000000000000004 /* Products */;
			targets = (
				T10000000000000000000001 /* Demo */,
				T10000000000000000000002 /* DemoTests */,
			);
		};
/* End PBXProject section */

/* Begin PBXSourcesBuildPhase section */
		P10000000000000000000001 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			files = (
				B10000000000000000000001 /* AppDelegate.swift in Sources */,
			);
		};
		P10000000000000000000003 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			files = (
				B10000000000000000000002 /* AppTests.swift in Sources */,
			);
		};
/* End PBXSourcesBuildPhase section */
	};
	rootObject = C10000000000000000000001 /* Project object */;
}
"#;

fn pbxmend() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pbxmend"));
    cmd.env_remove("PBXMEND_PROJECT").env_remove("RUST_LOG");
    cmd
}

/// A temp dir holding `Demo.xcodeproj/project.pbxproj` with `text`.
fn workspace(text: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let bundle = dir.path().join("Demo.xcodeproj");
    std::fs::create_dir_all(&bundle).unwrap();
    let manifest = bundle.join("project.pbxproj");
    std::fs::write(&manifest, text).unwrap();
    (dir, manifest)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_help() {
    pbxmend()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("repair"));
}

#[test]
fn test_add_then_show() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo", "--id-strategy", "deterministic", "Feature.swift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Feature.swift"))
        .stdout(predicate::str::contains("in phase P10000000000000000000001"));

    let text = read(&manifest);
    assert!(text.contains("/* Feature.swift in Sources */ = {isa = PBXBuildFile;"));
    assert!(text.contains("path = Feature.swift;"));

    pbxmend()
        .args(["show", "-p"])
        .arg(dir.path())
        .arg("G10000000000000000000002")
        .assert()
        .success()
        .stdout(predicate::str::contains("Isa:     PBXGroup"))
        .stdout(predicate::str::contains("G10000000000000000000001"));
}

#[test]
fn test_dry_run_leaves_file_untouched() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "--dry-run", "-p"])
        .arg(dir.path())
        .args(["-g", "DemoTests", "--test", "MoreTests.swift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would add MoreTests.swift"));

    assert_eq!(read(&manifest), MANIFEST);
}

#[test]
fn test_add_existing_path_exits_3() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo", "AppDelegate.swift"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("already present"));

    assert_eq!(read(&manifest), MANIFEST);
}

#[test]
fn test_skip_existing_is_a_noop() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "--skip-existing", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo", "AppDelegate.swift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped AppDelegate.swift"));

    assert_eq!(read(&manifest), MANIFEST);
}

#[test]
fn test_missing_group_exits_2() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo/Features", "Feature.swift"])
        .assert()
        .code(2);

    assert_eq!(read(&manifest), MANIFEST);
}

#[test]
fn test_create_groups_flag() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["add", "--create-groups", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo/Features", "Feature.swift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created group Features"));

    assert!(read(&manifest).contains("path = Features;"));
}

#[test]
fn test_add_from_json() {
    let (dir, manifest) = workspace(MANIFEST);
    let batch = dir.path().join("batch.json");
    std::fs::write(
        &batch,
        r#"[
            {"path": "One.swift", "group": "Demo"},
            {"path": "OneTests.swift", "group": "DemoTests", "kind": "test"}
        ]"#,
    )
    .unwrap();

    pbxmend()
        .args(["add", "-p"])
        .arg(dir.path())
        .arg("--from")
        .arg(&batch)
        .assert()
        .success();

    let text = read(&manifest);
    assert!(text.contains("/* One.swift in Sources */ = {isa = PBXBuildFile;"));
    assert!(text.contains("/* OneTests.swift in Sources */ = {isa = PBXBuildFile;"));
}

#[test]
fn test_add_json_output() {
    let (dir, _manifest) = workspace(MANIFEST);

    let output = pbxmend()
        .args(["--format", "json", "add", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo", "Feature.swift"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dry_run"], false);
    assert_eq!(json["report"]["added"][0]["path"], "Feature.swift");
    assert_eq!(json["report"]["added"][0]["group"], "G10000000000000000000002");
}

#[test]
fn test_remove() {
    let (dir, manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["remove", "-p"])
        .arg(dir.path())
        .args(["-g", "DemoTests", "AppTests.swift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed AppTests.swift"))
        .stdout(predicate::str::contains("B10000000000000000000002"));

    let text = read(&manifest);
    assert!(!text.contains("A10000000000000000000002"));
    assert!(!text.contains("B10000000000000000000002"));
}

#[test]
fn test_remove_missing_file_exits_2() {
    let (dir, _manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["remove", "-p"])
        .arg(dir.path())
        .args(["-g", "Demo", "Nope.swift"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a member"));
}

#[test]
fn test_check_clean_manifest() {
    let (dir, _manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["check", "-p"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found."));
}

#[test]
fn test_check_then_repair_duplicate_member() {
    let damaged = MANIFEST.replacen(
        "\t\t\t\tA10000000000000000000001 /* AppDelegate.swift */,\n",
        "\t\t\t\tA10000000000000000000001 /* AppDelegate.swift */,\n\t\t\t\tA10000000000000000000001 /* AppDelegate.swift */,\n",
        1,
    );
    assert_ne!(damaged, MANIFEST);
    let (dir, manifest) = workspace(&damaged);

    pbxmend()
        .args(["check", "-p"])
        .arg(dir.path())
        .assert()
        .code(5)
        .stdout(predicate::str::contains("duplicate member"));
    assert_eq!(read(&manifest), damaged);

    pbxmend()
        .args(["repair", "-p"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 fix(es)"));
    assert_eq!(read(&manifest), MANIFEST);

    pbxmend().args(["check", "-p"]).arg(dir.path()).assert().success();
}

#[test]
fn test_missing_project_exits_6() {
    let dir = TempDir::new().unwrap();

    pbxmend()
        .args(["check", "-p"])
        .arg(dir.path())
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Manifest not found"));
}

#[test]
fn test_show_unknown_object() {
    let (dir, _manifest) = workspace(MANIFEST);

    pbxmend()
        .args(["show", "-p"])
        .arg(dir.path())
        .arg("FFFFFFFFFFFFFFFFFFFFFFFF")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FFFFFFFFFFFFFFFFFFFFFFFF"));
}
