use {
    crate::cmd::link::error::LinkError,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    toml::{Table, Value},
};

/// Name of the optional configuration file, looked up in the entry directory.
pub const CONFIG_FILE: &str = "lualink.toml";

/// Linker settings, read from the `[link]` table of `lualink.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkerConfig {
    /// Extension of module files, without the dot.
    pub extension: String,

    /// File stem marking a directory as a package, e.g. `init` for `init.lua`.
    pub marker: String,

    /// Whether modules and the entry script are compacted before emission.
    pub minify: bool,

    /// Lines rendered as `---` comments at the top of the bundle.
    pub banner: Vec<String>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            extension: "lua".to_string(),
            marker: "init".to_string(),
            minify: true,
            banner: Vec::new(),
        }
    }
}

impl LinkerConfig {
    /// Load configuration from `dir`, falling back to defaults when there is
    /// no config file.
    pub fn load(dir: &Path) -> Result<Self, LinkError> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| LinkError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content).map_err(|reason| LinkError::Config { path, reason })
    }

    /// Parse config file contents. Keys that are not set keep their defaults.
    pub fn parse(content: &str) -> Result<Self, String> {
        let table = content.parse::<Table>().map_err(|e| e.to_string())?;
        let mut config = Self::default();

        let Some(link) = table.get("link") else {
            return Ok(config);
        };
        let link = link
            .as_table()
            .ok_or_else(|| "`link` must be a table".to_string())?;

        if let Some(value) = link.get("extension") {
            config.extension = non_empty_str(value, "extension")?;
        }
        if let Some(value) = link.get("marker") {
            config.marker = non_empty_str(value, "marker")?;
        }
        if let Some(value) = link.get("minify") {
            config.minify = value
                .as_bool()
                .ok_or_else(|| "`link.minify` must be a boolean".to_string())?;
        }
        if let Some(value) = link.get("banner") {
            config.banner = value
                .as_array()
                .and_then(|lines| {
                    lines
                        .iter()
                        .map(|line| line.as_str().map(String::from))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| "`link.banner` must be an array of strings".to_string())?;
        }

        Ok(config)
    }

    /// File name of the package marker, e.g. `init.lua`.
    pub fn marker_file(&self) -> String {
        format!("{}.{}", self.marker, self.extension)
    }

    /// Path of a config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }
}

fn non_empty_str(value: &Value, key: &str) -> Result<String, String> {
    value
        .as_str()
        .filter(|s| !s.is_empty() && !s.contains(['/', '\\', '.']))
        .map(String::from)
        .ok_or_else(|| format!("`link.{key}` must be a non-empty name without dots or slashes"))
}
