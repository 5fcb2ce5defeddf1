use {
    indexmap::{IndexMap, IndexSet},
    log::debug,
    std::path::{Path, PathBuf},
};

/// Directories probed when resolving a `require` reference.
///
/// Roots are probed in insertion order, so resolution stays deterministic when
/// more than one root could satisfy a reference. The first root is always the
/// entry directory. The set only ever grows during a run.
#[derive(Debug, Clone)]
pub struct SearchRoots(IndexSet<PathBuf>);

impl SearchRoots {
    pub fn new(base_path: &Path) -> Self {
        Self(IndexSet::from([base_path.to_path_buf()]))
    }

    /// Register the roots implied by a package marker file: the package
    /// directory itself and its parent.
    ///
    /// This makes sibling modules inside the package, and packages next to it,
    /// resolvable by their unqualified names.
    pub fn extend_for_package(&mut self, marker_file: &Path) {
        let Some(package_dir) = marker_file.parent() else {
            return;
        };
        for dir in [Some(package_dir), package_dir.parent()].into_iter().flatten() {
            if self.0.insert(dir.to_path_buf()) {
                debug!("Registering search root: {}", dir.display());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}

/// Transformed module sources, keyed by canonical module name.
///
/// Insertion order is the order in which traversal finished each module, and
/// is also the order in which modules are emitted.
#[derive(Debug, Default, Clone)]
pub struct ModuleTable(IndexMap<String, String>);

impl ModuleTable {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Store a finished module. A module is finished exactly once per run, so
    /// an existing entry is never replaced.
    pub fn insert(&mut self, name: String, code: String) {
        self.0.entry(name).or_insert(code);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, code)| (name.as_str(), code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
