use {
    crate::cmd::{
        link::{
            Linker,
            context::LinkerContext,
            error::LinkError,
            phases::{self, LinkingPhase},
            sanitize::sanitize,
        },
        template,
    },
    anyhow::{Context, Result},
    sha2::{Digest, Sha256},
    std::fs,
};

/// Renders the bundle and writes it to the output file.
#[derive(Debug)]
pub struct EmitBundle {
    pub entry_code: String,
}

impl LinkingPhase for EmitBundle {}

impl<'a> Linker<'a, EmitBundle> {
    pub fn emit_bundle(self) -> Result<Linker<'a, phases::CompleteLinking>> {
        let bundle = self
            .state
            .render(self.ctx)
            .context("failed to render bundle")?;

        // The output is only touched once everything rendered, so a failed
        // run never leaves a partial bundle behind.
        if let Some(parent) = self.ctx.dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LinkError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.ctx.dst, &bundle).map_err(|source| LinkError::Write {
            path: self.ctx.dst.clone(),
            source,
        })?;

        Ok(Linker {
            ctx: self.ctx,
            state: phases::CompleteLinking {
                size: bundle.len(),
                digest: format!("{:x}", Sha256::digest(bundle.as_bytes())),
            },
        })
    }
}

impl EmitBundle {
    /// Preamble, one loader registration per module in table order, then the
    /// entry script.
    fn render(&self, ctx: &LinkerContext) -> Result<String> {
        let mut out = preamble(&ctx.config.banner)?;

        for (name, code) in ctx.modules.iter() {
            out.push_str(&format!(
                "package.loaded['{name}'] = nil\n\
                 package.preload['{name}'] = function(...)\n\
                 {code}\n\
                 end\n\n"
            ));
        }

        if ctx.config.minify {
            out.push_str(&sanitize(&self.entry_code));
        } else {
            out.push_str(&self.entry_code);
        }
        Ok(out)
    }
}

/// Runtime bootstrap, with banner lines rendered as `---` comments.
///
/// The preamble only defines `package`, `package.loaded`, `package.preload`
/// and `require` when the host does not provide them.
fn preamble(banner: &[String]) -> Result<String> {
    let mut lines = banner
        .iter()
        .map(|line| format!("--- {line}\n"))
        .collect::<String>();
    if !lines.is_empty() {
        lines.push('\n');
    }
    Ok(template("preamble.lua")?.replace("{{BANNER}}", &lines))
}
