use {
    crate::cmd::link::{
        Linker,
        context::LinkerContext,
        error::LinkError,
        phases::{
            self,
            LinkingPhase,
            utils::{ModuleForm, canonical_reference, find_module_file, module_name, read_source},
        },
        sanitize::sanitize,
        scanner::{find_required_modules, require_calls},
    },
    anyhow::{Context, Result},
    indexmap::{IndexSet, set},
    log::{debug, info},
    tap::Tap,
};

/// Walks the module graph from the entry script's references, visiting every
/// reachable module file once.
#[derive(Debug)]
pub struct TraverseModules {
    pub entry_code: String,
    pub references: IndexSet<String>,
}

impl LinkingPhase for TraverseModules {}

/// A module whose references are still being processed.
struct Frame {
    /// Canonical module name; `None` for the entry script.
    name: Option<String>,

    /// Module source, with references already rewritten.
    code: String,

    /// References not yet processed.
    pending: set::IntoIter<String>,
}

impl<'a> Linker<'a, TraverseModules> {
    /// Resolve every reachable module, rewrite its references to canonical
    /// names, and store it in the module table.
    ///
    /// Traversal is depth-first over an explicit stack. A module is stored
    /// when all of its references have been processed, so the module table
    /// ends up in finish order. That is not dependency order: with cycles a
    /// module can be stored before a module it requires. The emitted loaders
    /// are lazy, so order does not matter at run time.
    pub fn traverse_modules(self) -> Result<Linker<'a, phases::EmitBundle>> {
        let TraverseModules {
            entry_code,
            references,
        } = self.state;

        let mut stack = vec![Frame {
            name: None,
            code: String::new(),
            pending: references.into_iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(reference) = frame.pending.next() else {
                if let Some(Frame {
                    name: Some(name),
                    code,
                    ..
                }) = stack.pop()
                {
                    store_module(self.ctx, name, &code);
                }
                continue;
            };

            let entered = enter_module(self.ctx, &reference).with_context(|| {
                let requirer = stack
                    .last()
                    .and_then(|frame| frame.name.as_deref())
                    .unwrap_or("entry script");
                format!("failed to link module {reference:?} required by {requirer}")
            })?;
            if let Some(frame) = entered {
                stack.push(frame);
            }
        }

        Ok(Linker {
            ctx: self.ctx,
            state: phases::EmitBundle { entry_code },
        })
    }
}

/// Resolve `reference` and, unless its file was seen before, load it.
///
/// Resolving a package marker extends the search roots before the package's
/// own references are looked at.
fn enter_module(ctx: &mut LinkerContext, reference: &str) -> Result<Option<Frame>> {
    let resolved = find_module_file(&ctx.search_roots, reference, &ctx.config)?
        .tap(|r| debug!("Resolved {reference:?} to {}", r.path.display()));

    if resolved.form == ModuleForm::Package {
        ctx.search_roots.extend_for_package(&resolved.path);
    }

    if !ctx.visited.insert(resolved.path.clone()) {
        debug!("- Skipping visited module: {}", resolved.path.display());
        return Ok(None);
    }

    let name = module_name(&ctx.base_path, &resolved.path, &ctx.config)?;
    let code = read_source(&resolved.path)?;
    let code = rewrite_references(ctx, &code).with_context(|| {
        format!("failed to rewrite references in {}", resolved.path.display())
    })?;
    let pending = find_required_modules(&code).into_iter();

    Ok(Some(Frame {
        name: Some(name),
        code,
        pending,
    }))
}

/// Replace every `require` reference in `code` with the name the required
/// module is registered under in the bundle.
///
/// A reference resolved through a search root other than the entry directory
/// gets that root's relative path as prefix: inside `lib/pkg`, `require 'util'`
/// becomes `require( 'lib.pkg.util' )`.
pub fn rewrite_references(ctx: &LinkerContext, code: &str) -> Result<String, LinkError> {
    let mut out = String::with_capacity(code.len());
    let mut last = 0;

    for call in require_calls(code) {
        let resolved = find_module_file(&ctx.search_roots, call.reference, &ctx.config)?;
        let canonical = canonical_reference(&ctx.base_path, &resolved.root, call.reference)?;

        out.push_str(&code[last..call.span.start]);
        out.push_str(&format!("require( '{canonical}' )"));
        last = call.span.end;
    }
    out.push_str(&code[last..]);

    Ok(out)
}

fn store_module(ctx: &mut LinkerContext, name: String, code: &str) {
    let code = if ctx.config.minify {
        sanitize(code)
    } else {
        code.to_string()
    };
    info!("- Registering module: {name:?}");
    ctx.modules.insert(name, code);
}
