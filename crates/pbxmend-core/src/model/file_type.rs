/// Build phase a file type compiles or copies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Resources,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXSourcesBuildPhase" => Some(PhaseKind::Sources),
            "PBXResourcesBuildPhase" => Some(PhaseKind::Resources),
            _ => None,
        }
    }

    /// Suffix used in build file comments: `Foo.swift in Sources`.
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Sources => "Sources",
            PhaseKind::Resources => "Resources",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub last_known: &'static str,
    pub phase: Option<PhaseKind>,
}

impl FileType {
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name == "Info.plist" {
            return Self::new("text.plist.xml", None);
        }
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        use PhaseKind::{Resources, Sources};
        match ext.as_str() {
            "swift" => Self::new("sourcecode.swift", Some(Sources)),
            "m" => Self::new("sourcecode.c.objc", Some(Sources)),
            "mm" => Self::new("sourcecode.cpp.objcpp", Some(Sources)),
            "c" => Self::new("sourcecode.c.c", Some(Sources)),
            "cc" | "cpp" | "cxx" => Self::new("sourcecode.cpp.cpp", Some(Sources)),
            "metal" => Self::new("sourcecode.metal", Some(Sources)),
            "xcdatamodeld" => Self::new("wrapper.xcdatamodel", Some(Sources)),
            "h" => Self::new("sourcecode.c.h", None),
            "hpp" => Self::new("sourcecode.cpp.h", None),
            "json" => Self::new("text.json", Some(Resources)),
            "plist" => Self::new("text.plist.xml", Some(Resources)),
            "strings" => Self::new("text.plist.strings", Some(Resources)),
            "xcstrings" => Self::new("text.json.xcstrings", Some(Resources)),
            "storyboard" => Self::new("file.storyboard", Some(Resources)),
            "xib" => Self::new("file.xib", Some(Resources)),
            "xcassets" => Self::new("folder.assetcatalog", Some(Resources)),
            "png" => Self::new("image.png", Some(Resources)),
            "entitlements" => Self::new("text.plist.entitlements", None),
            "xcconfig" => Self::new("text.xcconfig", None),
            "md" => Self::new("net.daringfireball.markdown", None),
            _ => Self::new("text", None),
        }
    }

    fn new(last_known: &'static str, phase: Option<PhaseKind>) -> Self {
        Self { last_known, phase }
    }
}
