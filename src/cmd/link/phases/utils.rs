use {
    crate::cmd::link::{config::LinkerConfig, error::LinkError, parsed_data::SearchRoots},
    std::{
        fs,
        path::{Component, Path, PathBuf},
    },
};

/// Which on-disk layout satisfied a module reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleForm {
    /// `{root}/{path}.lua`
    File,
    /// `{root}/{path}/init.lua`
    Package,
}

/// A module reference resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Search root that satisfied the reference.
    pub root: PathBuf,
    /// The module file.
    pub path: PathBuf,
    pub form: ModuleForm,
}

/// Locate the file behind a dotted module reference.
///
/// Roots are probed in order. Within a root, a module may be EITHER in the
/// form of `{path}.lua` or `{path}/init.lua`; the flat file is tried first,
/// so it wins over a package directory of the same name.
pub fn find_module_file(
    roots: &SearchRoots,
    reference: &str,
    config: &LinkerConfig,
) -> Result<ResolvedModule, LinkError> {
    let segments = reference
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    let not_found = || LinkError::ModuleNotFound {
        reference: reference.to_string(),
    };
    let (last, parents) = segments.split_last().ok_or_else(not_found)?;

    for root in roots.iter() {
        let dir = parents.iter().fold(root.to_path_buf(), |dir, s| dir.join(s));
        let candidates = [
            (
                dir.join(format!("{last}.{}", config.extension)),
                ModuleForm::File,
            ),
            (dir.join(last).join(config.marker_file()), ModuleForm::Package),
        ];
        if let Some((path, form)) = candidates.into_iter().find(|(p, _)| p.is_file()) {
            return Ok(ResolvedModule {
                root: root.to_path_buf(),
                path,
                form,
            });
        }
    }

    Err(not_found())
}

/// Canonical dotted name of a module file, relative to the entry directory.
///
/// `ui/button.lua` is `ui.button`, and a package marker `ui/init.lua` is
/// named after its directory, `ui`.
pub fn module_name(
    base_path: &Path,
    file: &Path,
    config: &LinkerConfig,
) -> Result<String, LinkError> {
    let mut segments = relative_segments(base_path, file)?;
    let Some(file_name) = segments.pop() else {
        return Err(LinkError::OutsideBase(file.to_path_buf()));
    };

    if file_name != config.marker_file() {
        let suffix = format!(".{}", config.extension);
        segments.push(
            file_name
                .strip_suffix(&suffix)
                .map_or(file_name.clone(), String::from),
        );
    }

    if segments.is_empty() {
        return Err(LinkError::OutsideBase(file.to_path_buf()));
    }
    Ok(segments.join("."))
}

/// Dotted name of a directory relative to the entry directory; the entry
/// directory itself has an empty name.
pub fn dir_name(base_path: &Path, dir: &Path) -> Result<String, LinkError> {
    Ok(relative_segments(base_path, dir)?.join("."))
}

/// Reference to `reference` as seen from the top level of the bundle, when it
/// was resolved through search root `root`.
///
/// Empty segments are dropped the same way [`find_module_file`] drops them,
/// so `a..b` names the module stored as `a.b`.
pub fn canonical_reference(
    base_path: &Path,
    root: &Path,
    reference: &str,
) -> Result<String, LinkError> {
    let prefix = dir_name(base_path, root)?;
    Ok([prefix.as_str()]
        .into_iter()
        .chain(reference.split('.'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("."))
}

fn relative_segments(base_path: &Path, path: &Path) -> Result<Vec<String>, LinkError> {
    let relative = path
        .strip_prefix(base_path)
        .map_err(|_| LinkError::OutsideBase(path.to_path_buf()))?;

    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| match c {
            Component::Normal(s) => Ok(s.to_string_lossy().into_owned()),
            _ => Err(LinkError::OutsideBase(path.to_path_buf())),
        })
        .collect()
}

/// Read a source file.
pub fn read_source(path: &Path) -> Result<String, LinkError> {
    fs::read_to_string(path).map_err(|source| LinkError::Read {
        path: path.to_path_buf(),
        source,
    })
}
