use {
    crate::cmd::link::{
        config::LinkerConfig,
        error::LinkError,
        parsed_data::{ModuleTable, SearchRoots},
    },
    std::{
        collections::HashSet,
        path::{Path, PathBuf},
    },
};

/// State of a single linking run. Nothing in here outlives the run.
#[derive(Debug)]
pub struct LinkerContext {
    /// Settings from `lualink.toml` in the entry directory, or defaults.
    pub config: LinkerConfig,

    /// Directory of the entry script, in canonical form.
    ///
    /// Module names are derived from paths relative to this directory.
    pub base_path: PathBuf,

    /// Entry script path, in canonical form.
    pub src: PathBuf,

    /// Output file path. The file is only created once linking succeeded.
    pub dst: PathBuf,

    /// Directories probed when resolving `require` references.
    pub search_roots: SearchRoots,

    /// Module files already taken into processing.
    pub visited: HashSet<PathBuf>,

    /// Finished modules, in emission order.
    pub modules: ModuleTable,
}

impl LinkerContext {
    pub fn new(entry: &Path, dst: &Path) -> Result<Self, LinkError> {
        if !entry.is_file() {
            return Err(LinkError::NotAFile(entry.to_path_buf()));
        }
        let src = entry.canonicalize().map_err(|source| LinkError::Read {
            path: entry.to_path_buf(),
            source,
        })?;
        let base_path = src
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| LinkError::NotAFile(src.clone()))?;

        let config = LinkerConfig::load(&base_path)?;

        Ok(Self {
            config,
            search_roots: SearchRoots::new(&base_path),
            base_path,
            src,
            dst: dst.to_path_buf(),
            visited: HashSet::new(),
            modules: ModuleTable::new(),
        })
    }
}
