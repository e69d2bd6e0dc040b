//! Make script synthesis for Unix-like platforms.
//!
//! The generated script is fully regenerated on every call, never patched,
//! and carries no timestamp, so identical inputs produce byte-identical
//! output. Layout: toolchain variables, source/include/library accumulation
//! variables, composed flag variables, one object pattern rule per
//! (architecture × source extension) present, then the `Debug`, `Release`,
//! `clean`, and `install` targets.

use std::fmt::Write;

use crate::builder::filter::{
    expand_include, filter_for_platform, filter_libraries, object_rule_suffix, object_set,
    resolve_library_make, ObjectSet,
};
use crate::builder::toolchain::{optimization, Toolchain};
use crate::core::manifest::Manifest;
use crate::core::platform::{Configuration, Platform};
use crate::core::target::{BuildTarget, ProjectKind};

const SECTION: &str = "#########################################\n\n";

/// Synthesize the Makefile text for one module.
///
/// `platform` must be a Make platform (mac or linux); Windows modules get a
/// project document from [`super::vcproj`] instead. `config` selects which
/// configuration-tagged libraries survive filtering; the script still
/// carries both `Debug` and `Release` targets, but the link inputs are the
/// ones for this invocation.
pub fn synthesize(
    manifest: &Manifest,
    platform: Platform,
    config: Configuration,
    toolchain: &Toolchain,
    arm: bool,
    module_root: &str,
    distro_path: &str,
) -> String {
    let target = BuildTarget::resolve(manifest.kind, platform, module_root, &manifest.builddir);
    let sources = filter_for_platform(&manifest.sources, platform);

    // Apple builds split objects per architecture unless pinned to 32-bit.
    let split = platform == Platform::Mac && toolchain.universal && !manifest.is_32bit_only();
    let apple = platform == Platform::Mac;

    let obj_32 = apple.then(|| object_set(&sources, Some("i386")));
    let obj_64 = split.then(|| object_set(&sources, Some("x64")));
    let obj_single = (!apple).then(|| object_set(&sources, None));

    let mut out = String::new();
    out.push_str(
        "# Makefile generated by the slipway build system for the platform on which the build was run.\n\
         # Edits to this file are NOT under version control and will be lost when the build system is run again.\n\n",
    );
    let _ = writeln!(out, "NAME = {}\n", manifest.escaped_name());

    // Toolchain block.
    if apple {
        let _ = writeln!(out, "CC_32 = {}", toolchain.cc_32);
        if split {
            if let Some(cc_64) = &toolchain.cc_64 {
                let _ = writeln!(out, "CC_64 = {}", cc_64);
            }
        }
        out.push('\n');
    } else {
        let _ = writeln!(out, "CC = {}\n", toolchain.cc_32);
    }

    // Source variables.
    out.push_str(SECTION);
    if let Some(set) = &obj_32 {
        accumulate(&mut out, "SRC32", &set.objects);
    }
    if let Some(set) = &obj_64 {
        accumulate(&mut out, "SRC64", &set.objects);
    }
    if let Some(set) = &obj_single {
        accumulate(&mut out, "SRC", &set.objects);
    }
    out.push('\n');

    // Include paths. Compiled objects depend on the header set through
    // INCLUDE_FILES, so a header edit rebuilds everything.
    out.push_str(SECTION);
    let includes: Vec<String> = filter_for_platform(&manifest.includes, platform)
        .iter()
        .map(|inc| format!("-I{}", expand_include(inc, module_root)))
        .collect();
    accumulate(&mut out, "INCLUDES", &includes);
    out.push_str("INCLUDE_FILES := $(wildcard INCLUDES/*.h)\n\n");

    // Libraries and (on linux) their search paths, then mac frameworks.
    // LIBS is one accumulation across both.
    out.push_str(SECTION);
    let libraries = filter_libraries(&manifest.libraries, platform, config);
    let mut libs = Vec::new();
    let mut lib_dirs = Vec::new();
    for lib in &libraries {
        let resolved = resolve_library_make(lib, platform, module_root);
        libs.push(resolved.reference);
        if let Some(dir) = resolved.search_dir {
            lib_dirs.push(dir);
        }
    }
    if apple {
        for framework in &manifest.frameworks {
            libs.push(format!(
                "/System/Library/Frameworks/{fw}.framework/Versions/A/{fw}",
                fw = framework
            ));
        }
    }
    accumulate(&mut out, "LIBS", &libs);
    accumulate(&mut out, "LIB_INCLUDES", &lib_dirs);
    out.push('\n');

    // Flag variables.
    out.push_str(SECTION);
    let _ = writeln!(
        out,
        "OPTIMIZATION_DEBUG = {}",
        optimization(Configuration::Debug)
    );
    let _ = writeln!(
        out,
        "OPTIMIZATION_RELEASE = {}\n",
        optimization(Configuration::Release)
    );

    let _ = writeln!(out, "OPTIONS = {}", toolchain.options);
    let _ = writeln!(out, "OPTIONS += {}", toolchain.std_flag);
    if let Some(runtime) = toolchain.runtime_flag {
        let _ = writeln!(out, "OPTIONS += {}", runtime);
    }
    out.push('\n');
    let _ = writeln!(out, "WARNINGS = {}", toolchain.warnings);
    let _ = writeln!(out, "DEFINES = -D{}", platform.define());
    if arm {
        out.push_str("DEFINES += -DSW_PLATFORM_ARM\n");
    }
    for define in &manifest.defines {
        let _ = writeln!(out, "DEFINES += -D{}", define);
    }
    out.push('\n');

    out.push_str(SECTION);
    out.push_str("CFLAGS = $(OPTIONS) $(DEFINES) $(INCLUDES) $(WARNINGS)\n");
    if let Some(prefix) = &manifest.prefix {
        let _ = writeln!(out, "CFLAGS += -include{}", prefix);
    }
    if apple {
        out.push_str("LDFLAGS = $(OPTIONS) $(DEFINES) $(LIBS) $(WARNINGS)\n");
        if manifest.kind == ProjectKind::Library {
            let _ = writeln!(
                out,
                "LDFLAGS += -install_name \"{}/lib/$(NAME).dylib\"",
                distro_path
            );
        }
        if toolchain.static_libgcc {
            out.push_str("LDFLAGS += -static-libgcc\n");
        }
    } else {
        out.push_str("LDFLAGS = $(INCLUDES) $(LIB_INCLUDES) $(LIBS) -g\n");
    }
    if arm {
        out.push_str("LDFLAGS += -fPIC\n");
    }
    out.push('\n');

    // Targets.
    out.push_str(SECTION);
    out.push_str("Debug: OPTIMIZATION_FLAGS = $(OPTIMIZATION_DEBUG)\n");
    out.push_str("Debug: createdirs install\n\n");
    out.push_str("Release: OPTIMIZATION_FLAGS = $(OPTIMIZATION_RELEASE)\n");
    out.push_str("Release: createdirs install\n\n");

    let sudo = if target.needs_sudo { "sudo " } else { "" };
    out.push_str("createdirs:\n");
    let _ = writeln!(out, "\tmkdir -p {}", target.build_temp);
    let _ = writeln!(out, "\t{}mkdir -p {}", sudo, target.install_dest);
    let _ = writeln!(out, "\ttouch {}", target.touch_dest);
    if manifest.kind == ProjectKind::Implementation && apple {
        // Bundle package stamp so the host recognizes the plugin wrapper.
        let _ = writeln!(
            out,
            "\tcp {}/../../Core/Shared/host/PkgInfo {}/../PkgInfo",
            module_root, target.install_dest
        );
    }
    out.push('\n');

    // One pattern rule per (architecture × extension) present in the
    // filtered source list. Objects depend on their source and all headers.
    emit_pattern_rules(&mut out, obj_32.as_ref(), Some("i386"), "$(CC_32)");
    emit_pattern_rules(&mut out, obj_64.as_ref(), Some("x64"), "$(CC_64)");
    emit_pattern_rules(&mut out, obj_single.as_ref(), None, "$(CC)");
    out.push('\n');

    if apple {
        if split {
            out.push_str("link: i386 x64 | $(SRC32) $(SRC64)\n\n");
        } else {
            out.push_str("link: i386 | $(SRC32)\n\n");
        }

        out.push_str("i386: $(SRC32)\n");
        let _ = writeln!(
            out,
            "\t$(CC_32) $(LDFLAGS) $(OPTIMIZATION_FLAGS) -o {bt}/$(NAME)-i386{sfx} $(SRC32)\n",
            bt = target.build_temp,
            sfx = target.suffix
        );

        if split {
            out.push_str("x64: $(SRC64)\n");
            let _ = writeln!(
                out,
                "\t$(CC_64) $(LDFLAGS) $(OPTIMIZATION_FLAGS) -o {bt}/$(NAME)-x86_64{sfx} $(SRC64)\n",
                bt = target.build_temp,
                sfx = target.suffix
            );
        }

        out.push_str("merge: | link\n");
        if split {
            let _ = writeln!(
                out,
                "\tlipo {bt}/$(NAME)-i386{sfx} {bt}/$(NAME)-x86_64{sfx} -create -output {bt}/$(NAME){sfx}",
                bt = target.build_temp,
                sfx = target.suffix
            );
        } else {
            // Single architecture: nothing to merge, just take the binary.
            let _ = writeln!(
                out,
                "\tcp {bt}/$(NAME)-i386{sfx} {bt}/$(NAME){sfx}",
                bt = target.build_temp,
                sfx = target.suffix
            );
        }
        out.push('\n');

        out.push_str("clean:\n");
        if split {
            out.push_str("\trm -f $(SRC32) $(SRC64)\n");
        } else {
            out.push_str("\trm -f $(SRC32)\n");
        }
        let _ = writeln!(out, "\trm -rf {}\n", target.build_temp);

        out.push_str("install: | merge\n");
    } else {
        out.push_str("link: $(SRC)\n");
        let _ = writeln!(
            out,
            "\t$(CC) $(LDFLAGS) $(OPTIMIZATION_FLAGS) -o {bt}/$(NAME){sfx} $(SRC)\n",
            bt = target.build_temp,
            sfx = target.suffix
        );

        out.push_str("clean:\n");
        out.push_str("\trm -f $(SRC)\n");
        let _ = writeln!(out, "\trm -rf {}\n", target.build_temp);

        out.push_str("install: | link\n");
    }

    let _ = writeln!(
        out,
        "\t{}cp {}/$(NAME){} {}",
        sudo, target.build_temp, target.suffix, target.install_dest
    );
    for postbuild in &manifest.postbuilds {
        let _ = writeln!(out, "\t{}", postbuild);
    }

    out
}

/// Write `VAR = first` / `VAR += rest`, the accumulation shape every
/// generated variable family uses. Nothing is written for an empty list.
fn accumulate(out: &mut String, var: &str, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        let op = if i == 0 { "=" } else { "+=" };
        let _ = writeln!(out, "{} {} {}", var, op, item);
    }
}

fn emit_pattern_rules(out: &mut String, set: Option<&ObjectSet>, arch: Option<&str>, cc: &str) {
    let Some(set) = set else { return };
    for ext in &set.extensions {
        let _ = writeln!(
            out,
            "%{}: %.{} $(INCLUDE_FILES)",
            object_rule_suffix(arch, ext),
            ext
        );
        let _ = writeln!(out, "\t{} $(CFLAGS) $(OPTIMIZATION_FLAGS) -c $< -o $@", cc);
    }
}
