//! Manifests shared by unit tests.

/// A small but complete app + unit-test project.
///
/// Ids follow `<letter>1<zeros><n>`: `A` file references, `B` build files,
/// `G` groups, `P` build phases, `T` targets, `C` the project.
pub(crate) const SAMPLE: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {

/* Begin PBXBuildFile section */
		B10000000000000000000001 /* AppDelegate.swift in Sources */ = {isa = PBXBuildFile; fileRef = A10000000000000000000001 /* AppDelegate.swift */; };
		B10000000000000000000002 /* AppTests.swift in Sources */ = {isa = PBXBuildFile; fileRef = A10000000000000000000002 /* AppTests.swift */; };
		B10000000000000000000003 /* Assets.xcassets in Resources */ = {isa = PBXBuildFile; fileRef = A10000000000000000000003 /* Assets.xcassets */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
		A10000000000000000000001 /* AppDelegate.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = AppDelegate.swift; sourceTree = "<group>"; };
		A10000000000000000000002 /* AppTests.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = AppTests.swift; sourceTree = "<group>"; };
		A10000000000000000000003 /* Assets.xcassets */ = {isa = PBXFileReference; lastKnownFileType = folder.assetcatalog; path = Assets.xcassets; sourceTree = "<group>"; };
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
				A10000000000000000000003 /* Assets.xcassets */,
				G10000000000000000000005 /* Core */,
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
		G10000000000000000000005 /* Core */ = {
			isa = PBXGroup;
			children = (
				G10000000000000000000006 /* Models */,
			);
			path = Core;
			sourceTree = "<group>";
		};
		G10000000000000000000006 /* Models */ = {
			isa = PBXGroup;
			children = (
			);
			path = Models;
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXNativeTarget section */
		T10000000000000000000001 /* Demo */ = {
			isa = PBXNativeTarget;
			buildConfigurationList = L10000000000000000000001 /* Build configuration list for PBXNativeTarget "Demo" */;
			buildPhases = (
				P10000000000000000000001 /* Sources */,
				P10000000000000000000002 /* Resources */,
			);
			buildRules = (
			);
			dependencies = (
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
			buildRules = (
			);
			dependencies = (
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
			attributes = {
				BuildIndependentTargetsInParallel = 1;
				LastSwiftUpdateCheck = 1500;
				TargetAttributes = {
					T10000000000000000000001 = {
						CreatedOnToolsVersion = 15.0;
					};
				};
			};
			buildConfigurationList = L10000000000000000000002 /* Build configuration list for PBXProject "Demo" */;
			knownRegions = (
				en,
				Base,
			);
			mainGroup = G10000000000000000000001;
			productRefGroup = G10000000000000000000004 /* Products */;
			projectDirPath = "";
			projectRoot = "";
			targets = (
				T10000000000000000000001 /* Demo */,
				T10000000000000000000002 /* DemoTests */,
			);
		};
/* End PBXProject section */

/* Begin PBXResourcesBuildPhase section */
		P10000000000000000000002 /* Resources */ = {
			isa = PBXResourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				B10000000000000000000003 /* Assets.xcassets in Resources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
/* End PBXResourcesBuildPhase section */

/* Begin PBXSourcesBuildPhase section */
		P10000000000000000000001 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				B10000000000000000000001 /* AppDelegate.swift in Sources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
		P10000000000000000000003 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				B10000000000000000000002 /* AppTests.swift in Sources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
/* End PBXSourcesBuildPhase section */

/* Begin XCBuildConfiguration section */
		X10000000000000000000001 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				INFOPLIST_FILE = Demo/Info.plist;
				PRODUCT_BUNDLE_IDENTIFIER = "com.example.demo";
				SWIFT_ACTIVE_COMPILATION_CONDITIONS = "DEBUG $(inherited)";
			};
			name = Debug;
		};
/* End XCBuildConfiguration section */

/* Begin XCConfigurationList section */
		L10000000000000000000001 /* Build configuration list for PBXNativeTarget "Demo" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				X10000000000000000000001 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
		L10000000000000000000002 /* Build configuration list for PBXProject "Demo" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				X10000000000000000000001 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
/* End XCConfigurationList section */
	};
	rootObject = C10000000000000000000001 /* Project object */;
}
"#;

/// Flat sections, one group `G` and one sources phase `P`, no project object.
pub(crate) const MINIMAL: &str = r#"// !$*UTF8*$!
{
	objects = {

/* Begin PBXBuildFile section */
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
/* End PBXFileReference section */

/* Begin PBXGroup section */
		G /* G */ = {
			isa = PBXGroup;
			children = (
			);
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXSourcesBuildPhase section */
		P /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			files = (
			);
		};
/* End PBXSourcesBuildPhase section */
	};
}
"#;

pub(crate) fn id(prefix: char, n: u32) -> String {
    format!("{prefix}1{}{n:04}", "0".repeat(18))
}
