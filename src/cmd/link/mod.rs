mod config;
mod context;
mod error;
mod parsed_data;
mod phases;
mod sanitize;
mod scanner;

use {
    crate::cmd::link::context::LinkerContext,
    anyhow::{Context, Result},
    phases::LinkingPhase,
    std::path::Path,
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSummary {
    /// Canonical names of the bundled modules, in emission order.
    pub modules: Vec<String>,

    /// SHA-256 of the written bundle, hex encoded.
    pub digest: String,
}

/// Link `entry` and every module it requires into `output`.
///
/// Each call works on fresh state. The output file is created or overwritten
/// only when linking succeeds.
pub fn link(entry: &Path, output: &Path) -> Result<LinkSummary> {
    let mut ctx = LinkerContext::new(entry, output).with_context(|| {
        format!("failed to create linker context for {}", entry.display())
    })?;

    Linker::new(&mut ctx)
        .scan_entry()?
        .traverse_modules()?
        .emit_bundle()?
        .complete_linking()
}

#[derive(Debug)]
struct Linker<'a, P: LinkingPhase = phases::ScanEntry> {
    ctx: &'a mut LinkerContext,
    state: P,
}

impl<'a> Linker<'a> {
    fn new(ctx: &'a mut LinkerContext) -> Self {
        Self {
            ctx,
            state: phases::ScanEntry,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::cmd::template,
        pretty_assertions::assert_eq,
        std::fs,
        tempfile::TempDir,
    };

    fn create_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn link_to_string(root: &Path, entry: &str) -> (LinkSummary, String) {
        let output = root.join("out/bundle.lua");
        let summary = link(&root.join(entry), &output).unwrap();
        (summary, fs::read_to_string(output).unwrap())
    }

    fn registrations(bundle: &str, name: &str) -> usize {
        bundle
            .matches(&format!("package.preload['{name}'] = function(...)"))
            .count()
    }

    #[test]
    fn links_package_with_sibling_module() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "local ui = require 'ui'\nprint(ui.hello())\n");
        create_file(
            root,
            "ui/init.lua",
            "-- ui package\n\
             local fmt = require('fmt')\n\
             return { hello = function() return fmt.wrap(\"hi  there\") end }\n",
        );
        create_file(
            root,
            "ui/fmt.lua",
            "local M = {}\nfunction M.wrap(s)  return \"[\" .. s .. \"]\"  end\nreturn M\n",
        );

        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec!["ui.fmt", "ui"]);

        let preamble = template("preamble.lua").unwrap().replace("{{BANNER}}", "");
        let body = bundle.strip_prefix(preamble.as_str()).unwrap();
        assert_eq!(
            body,
            "\
package.loaded['ui.fmt'] = nil
package.preload['ui.fmt'] = function(...)
local M={}function M.wrap(s)return \"[\"..s ..\"]\" end return M
end

package.loaded['ui'] = nil
package.preload['ui'] = function(...)
local fmt=require('ui.fmt')return{hello=function()return fmt.wrap(\"hi  there\")end}
end

local ui=require 'ui' print(ui.hello())"
        );
    }

    #[test]
    fn each_module_is_bundled_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "require 'a'\nrequire 'b'\nrequire 'shared'\n");
        create_file(root, "a.lua", "local s = require 'shared'\nreturn require('shared')\n");
        create_file(root, "b.lua", "return require \"shared\"\n");
        create_file(root, "shared.lua", "return {}\n");

        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec!["shared", "a", "b"]);
        for name in ["a", "b", "shared"] {
            assert_eq!(registrations(&bundle, name), 1, "module {name}");
        }
    }

    #[test]
    fn cyclic_requires_terminate() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "local a = require 'a'\n");
        create_file(root, "a.lua", "local b = require 'b'\nreturn { b = b }\n");
        create_file(root, "b.lua", "local a = require 'a'\nreturn { a = a }\n");

        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec!["b", "a"]);
        assert_eq!(registrations(&bundle, "a"), 1);
        assert_eq!(registrations(&bundle, "b"), 1);
    }

    #[test]
    fn package_extends_search_roots() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "pkg/init.lua", "return require 'helper'\n");
        create_file(root, "pkg/helper.lua", "return 42\n");

        // `helper` only resolves once `pkg` has been resolved as a package.
        create_file(root, "early.lua", "require 'helper'\nrequire 'pkg'\n");
        let err = link(&root.join("early.lua"), &root.join("early.out.lua")).unwrap_err();
        assert!(format!("{err:#}").contains("\"helper\""));

        create_file(root, "main.lua", "require 'pkg'\n");
        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec!["pkg.helper", "pkg"]);
        assert!(bundle.contains(
            "package.preload['pkg'] = function(...)\nreturn require('pkg.helper')\nend"
        ));
    }

    #[test]
    fn rewrites_references_to_bundle_names() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "local pkg = require 'lib.pkg'\n");
        create_file(root, "lib/pkg/init.lua", "return require 'sub.x'\n");
        create_file(
            root,
            "lib/pkg/sub/x.lua",
            "local util = require \"util\"\nreturn util\n",
        );
        create_file(root, "lib/pkg/util.lua", "return {}\n");

        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec![
            "lib.pkg.util",
            "lib.pkg.sub.x",
            "lib.pkg"
        ]);
        assert!(bundle.contains(
            "package.preload['lib.pkg.sub.x'] = function(...)\n\
             local util=require('lib.pkg.util')return util\nend"
        ));
        assert!(bundle.contains("return require('lib.pkg.sub.x')"));
        assert!(bundle.ends_with("local pkg=require 'lib.pkg'"));
    }

    #[test]
    fn doubled_dots_rewrite_to_registered_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "local pkg = require 'pkg'\n");
        create_file(root, "pkg/init.lua", "return require 'util..fmt'\n");
        create_file(root, "pkg/util/fmt.lua", "return {}\n");

        let (summary, bundle) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules, vec!["pkg.util.fmt", "pkg"]);
        assert!(bundle.contains("package.preload['pkg.util.fmt'] = function(...)"));
        assert!(bundle.contains("return require('pkg.util.fmt')"));
    }

    #[test]
    fn missing_module_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "local m = require 'missing'\n");
        let output = root.join("out.lua");

        let err = link(&root.join("main.lua"), &output).unwrap_err();
        assert!(format!("{err:#}").contains("\"missing\""));
        assert!(!output.exists());
    }

    #[test]
    fn nested_missing_module_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "require 'a'\n");
        create_file(root, "a.lua", "return require 'missing'\n");
        let output = root.join("out.lua");
        fs::write(&output, "previous").unwrap();

        let err = link(&root.join("main.lua"), &output).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("\"missing\""));
        assert!(message.contains("a.lua"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn output_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(root, "main.lua", "require 'ui'\nrequire 'net'\nrequire 'util'\n");
        create_file(root, "ui/init.lua", "require 'button'\nrequire 'util'\n");
        create_file(root, "ui/button.lua", "return require 'util'\n");
        create_file(root, "net/init.lua", "return require 'socket'\n");
        create_file(root, "net/socket.lua", "return require 'ui'\n");
        create_file(root, "util.lua", "return {}\n");

        let first = link(&root.join("main.lua"), &root.join("first.lua")).unwrap();
        let second = link(&root.join("main.lua"), &root.join("second.lua")).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            fs::read(root.join("first.lua")).unwrap(),
            fs::read(root.join("second.lua")).unwrap()
        );
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let depth = 2_000;
        create_file(root, "main.lua", "require 'm0'\n");
        for i in 0..depth {
            create_file(root, &format!("m{i}.lua"), &format!("return require 'm{}'\n", i + 1));
        }
        create_file(root, &format!("m{depth}.lua"), "return true\n");

        let (summary, _) = link_to_string(root, "main.lua");
        assert_eq!(summary.modules.len(), depth + 1);
        assert_eq!(summary.modules.first().map(String::as_str), Some("m2000"));
        assert_eq!(summary.modules.last().map(String::as_str), Some("m0"));
    }

    #[test]
    fn config_controls_banner_and_minify() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        create_file(
            root,
            "lualink.toml",
            "[link]\nminify = false\nbanner = [\"Copyright (c) 2025 Example\"]\n",
        );
        create_file(root, "main.lua", "-- entry\nlocal a = require 'a'\n");
        create_file(root, "a.lua", "-- keep me\nreturn  1\n");

        let (_, bundle) = link_to_string(root, "main.lua");
        assert!(bundle.starts_with("--- Copyright (c) 2025 Example\n\n--- This file"));
        assert!(bundle.contains("function(...)\n-- keep me\nreturn  1\n\nend\n"));
        assert!(bundle.ends_with("-- entry\nlocal a = require 'a'\n"));
    }

    #[test]
    fn entry_must_be_a_file() {
        let dir = TempDir::new().unwrap();
        let err = link(dir.path(), &dir.path().join("out.lua")).unwrap_err();
        assert!(format!("{err:#}").contains("expected a file"));

        let err = link(&dir.path().join("nope.lua"), &dir.path().join("out.lua")).unwrap_err();
        assert!(format!("{err:#}").contains("expected a file"));
    }
}
