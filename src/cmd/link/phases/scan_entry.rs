use {
    crate::cmd::link::{
        Linker,
        phases::{self, LinkingPhase, utils::read_source},
        scanner::find_required_modules,
    },
    anyhow::{Context, Result},
    log::{debug, info},
};

/// Read the entry script and collect the modules it requires.
///
/// The entry script is not a module: it is never registered in the module
/// table and its references are left as written.
#[derive(Debug, Default)]
pub struct ScanEntry;

impl LinkingPhase for ScanEntry {}

impl<'a> Linker<'a, ScanEntry> {
    pub fn scan_entry(self) -> Result<Linker<'a, phases::TraverseModules>> {
        info!(
            "Linking {} -> {}",
            self.ctx.src.display(),
            self.ctx.dst.display()
        );

        let entry_code = read_source(&self.ctx.src).context("failed to read entry script")?;
        let references = find_required_modules(&entry_code);
        debug!("Entry script requires: {references:?}");

        Ok(Linker {
            ctx: self.ctx,
            state: phases::TraverseModules {
                entry_code,
                references,
            },
        })
    }
}
