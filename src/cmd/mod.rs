pub mod link;

use {
    anyhow::{Context, Result},
    argh::FromArgs,
    include_dir::{Dir, include_dir},
    log::debug,
    std::path::PathBuf,
};

/// Link a Lua entry script and every module it requires into a single file.
#[derive(FromArgs, Debug)]
#[argh(help_triggers("-h", "--help", "help"))]
pub struct MainCmd {
    #[argh(positional)]
    /// entry script, e.g. `main.lua`
    entry: PathBuf,

    #[argh(positional)]
    /// output file, created or overwritten
    output: PathBuf,
}

impl MainCmd {
    /// Run the linker and print the digest of the written bundle.
    pub fn run(&self) -> Result<()> {
        let summary = link::link(&self.entry, &self.output)?;
        debug!("Bundled modules: {}", summary.modules.join(", "));
        println!("{}  {}", summary.digest, self.output.display());
        Ok(())
    }
}

pub static TPL_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/tpl");

/// Contents of an embedded template file.
pub fn template(name: &str) -> Result<&'static str> {
    TPL_DIR
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .with_context(|| format!("template {name:?} is missing from the template directory"))
}
