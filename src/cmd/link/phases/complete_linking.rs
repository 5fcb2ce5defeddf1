use {
    crate::cmd::link::{Linker, LinkSummary, phases::LinkingPhase},
    anyhow::Result,
    log::info,
    std::path::Path,
};

/// Marks the end of the linking process.
#[derive(Debug)]
pub struct CompleteLinking {
    /// Size of the written bundle, in bytes.
    pub size: usize,

    /// SHA-256 of the written bundle, hex encoded.
    pub digest: String,
}

impl LinkingPhase for CompleteLinking {}

impl CompleteLinking {
    fn report(&self, module_count: usize, dst: &Path) -> String {
        format!(
            "Linked {module_count} module(s) into {} ({} bytes, sha256 {})",
            dst.display(),
            self.size,
            self.digest
        )
    }
}

impl<'a> Linker<'a, CompleteLinking> {
    pub fn complete_linking(self) -> Result<LinkSummary> {
        info!("{}", self.state.report(self.ctx.modules.len(), &self.ctx.dst));

        Ok(LinkSummary {
            modules: self.ctx.modules.names().map(String::from).collect(),
            digest: self.state.digest,
        })
    }
}
