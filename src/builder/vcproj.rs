//! Visual C++ project synthesis for Windows.
//!
//! The project is built as a small element tree and serialized in the
//! Visual Studio attribute-per-line layout. Escaping happens exactly once,
//! at attribute-value emission, including reverting the manifest's
//! comment-marker escape so the document carries the literal project name.

use std::fmt::Write;

use crate::builder::filter::{
    expand_include_windows, filter_for_platform, filter_libraries, resolve_library_windows,
};
use crate::core::manifest::{unescape_comment_marker, Manifest};
use crate::core::platform::{Configuration, Platform};
use crate::core::target::{backslashed, BuildTarget};

/// One element of the project document.
#[derive(Debug, Clone)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Element {
        Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Element {
        self.attributes.push((key, value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let indent = "\t".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, "\n{}\t{}=\"{}\"", indent, key, escape_attr(value));
        }
        if self.attributes.is_empty() {
            if self.children.is_empty() {
                out.push_str("/>\n");
                return;
            }
            out.push_str(">\n");
        } else if self.children.is_empty() {
            let _ = write!(out, "\n{}/>\n", indent);
            return;
        } else {
            let _ = write!(out, "\n{}\t>\n", indent);
        }
        for child in &self.children {
            child.write_into(out, depth + 1);
        }
        let _ = writeln!(out, "{}</{}>", indent, self.name);
    }

    /// Serialize the element tree as a complete document.
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_into(&mut out, 0);
        out
    }
}

/// Escape an attribute value. Newlines become character references so
/// multi-line command blocks survive as single attributes.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push_str("&#x0D;"),
            '\n' => out.push_str("&#x0A;"),
            c => out.push(c),
        }
    }
    out
}

const BASE_DEFINES: &str = "WIN32;_DEBUG;_WINDOWS;_USRDLL;_CRT_SECURE_NO_WARNINGS;\
SW_PLATFORM_WIN;WIN_VERSION;_CRT_NOFORCE_MANIFEST;_STL_NOFORCE_MANIFEST";

/// Synthesize the `.vcproj` document text for one module.
pub fn synthesize(manifest: &Manifest, module_root: &str) -> String {
    let module_root_win = backslashed(module_root);
    let target = BuildTarget::resolve(
        manifest.kind,
        Platform::Windows,
        &module_root_win,
        &manifest.builddir,
    );

    // Include search paths, shared by both configurations.
    let mut include_dirs = String::new();
    for include in filter_for_platform(&manifest.includes, Platform::Windows) {
        for dir in expand_include_windows(&include, &module_root_win) {
            let _ = write!(include_dirs, "\"$(ProjectDir){}\";", dir);
        }
    }

    let mut defines = BASE_DEFINES.to_string();
    for define in &manifest.defines {
        defines.push(';');
        defines.push_str(define);
    }

    let output_file = format!("$(OutDir)\\$(ProjectName){}", target.suffix);

    // The post-build hook installs into the shared tree and mirrors into the
    // local build-output tree.
    let postbuild_cmd = format!(
        "IF NOT EXIST \"{dest}\" mkdir \"{dest}\"\r\n\
         copy $(OutDir)\\$(TargetFileName) \"{dest}\"\r\n\
         copy $(OutDir)\\$(TargetFileName) \"$(ProjectDir){root}\\..\\..\\Builds\"\r\n",
        dest = target.install_dest,
        root = module_root_win
    );
    let postbuild_outputs = format!("{}\\$(TargetFileName)", target.install_dest);

    let configuration = |config: Configuration| {
        let (opt_level, link_incremental) = match config {
            Configuration::Debug => ("0", "2"),
            Configuration::Release => ("3", "1"),
        };

        let mut libs = String::new();
        let mut lib_dirs = String::new();
        for lib in filter_libraries(&manifest.libraries, Platform::Windows, config) {
            let resolved = resolve_library_windows(&lib, &module_root_win);
            let _ = write!(libs, "{} ", resolved.lib);
            let _ = write!(lib_dirs, "\"{}\";", resolved.search_dir);
        }

        let mut linker = Element::new("Tool")
            .attr("Name", "VCLinkerTool")
            .attr("AdditionalDependencies", libs)
            .attr("OutputFile", &output_file)
            .attr("LinkIncremental", link_incremental)
            .attr("AdditionalLibraryDirectories", lib_dirs)
            .attr("GenerateManifest", "false")
            .attr("ModuleDefinitionFile", "")
            .attr("GenerateDebugInformation", "true")
            .attr("SubSystem", "2")
            .attr("TargetMachine", "1");
        if config == Configuration::Release {
            linker = linker
                .attr("OptimizeReferences", "2")
                .attr("EnableCOMDATFolding", "2");
        }

        Element::new("Configuration")
            .attr("Name", format!("{}|Win32", config))
            .attr("OutputDirectory", "..\\builds\\")
            .attr("IntermediateDirectory", config.as_str())
            .attr("ConfigurationType", "2")
            .child(
                Element::new("Tool")
                    .attr("Name", "VCCustomBuildTool")
                    .attr("CommandLine", &postbuild_cmd)
                    .attr("Outputs", &postbuild_outputs),
            )
            .child(
                Element::new("Tool")
                    .attr("Name", "VCCLCompilerTool")
                    .attr("Optimization", opt_level)
                    .attr("AdditionalIncludeDirectories", &include_dirs)
                    .attr("PreprocessorDefinitions", &defines)
                    .attr("MinimalRebuild", "true")
                    .attr("BasicRuntimeChecks", "3")
                    .attr("RuntimeLibrary", "1")
                    .attr("StructMemberAlignment", "2")
                    .attr("UsePrecompiledHeader", "0")
                    .attr("WarningLevel", "3")
                    .attr("Detect64BitPortabilityProblems", "false")
                    .attr("DebugInformationFormat", "4"),
            )
            .child(linker)
    };

    let mut files = Element::new("Files");
    for source in filter_for_platform(&manifest.sources, Platform::Windows) {
        files = files.child(Element::new("File").attr("RelativePath", backslashed(&source)));
    }

    Element::new("VisualStudioProject")
        .attr("ProjectType", "Visual C++")
        .attr("Version", "9.00")
        .attr("Name", unescape_comment_marker(&manifest.escaped_name()))
        .attr("ProjectGUID", "{8A5E3BA8-4AE1-4D41-B4C8-179B2C75E35A}")
        .attr("RootNamespace", "SlipwayExtension")
        .attr("Keyword", "Win32Proj")
        .attr("TargetFrameworkVersion", "131072")
        .child(Element::new("Platforms").child(Element::new("Platform").attr("Name", "Win32")))
        .child(Element::new("ToolFiles"))
        .child(
            Element::new("Configurations")
                .child(configuration(Configuration::Release))
                .child(configuration(Configuration::Debug)),
        )
        .child(Element::new("References"))
        .child(files)
        .child(Element::new("Globals"))
        .to_document()
}
