use std::{sync::Arc, time::Duration};

use cap_std::fs_utf8::Dir;
use indexmap::IndexMap;
use miette::{Context, IntoDiagnostic, Result};
use raid_core::MapSourceConfig;
use tracing::debug;
use url::Url;

/// Where map documents come from. `fetch` returns the raw json text of `<map_name>.json`.
pub trait MapSource: Send + Sync {
    fn fetch(&self, map_name: &str) -> Result<String>;
    /// shown in logs
    fn describe(&self) -> String;
}

pub fn document_file_name(map_name: &str) -> String {
    format!("{map_name}.json")
}

pub struct HttpMapSource {
    base_url: Url,
    agent: ureq::Agent,
}

impl HttpMapSource {
    const TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(mut base_url: Url) -> Self {
        // without the trailing slash `join` would replace the last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().timeout(Self::TIMEOUT).build(),
        }
    }

    pub fn document_url(&self, map_name: &str) -> Result<Url> {
        self.base_url
            .join(&document_file_name(map_name))
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid map name {map_name} for {}", self.base_url))
    }
}

impl MapSource for HttpMapSource {
    fn fetch(&self, map_name: &str) -> Result<String> {
        let url = self.document_url(map_name)?;
        debug!(%url, "fetching map document");
        self.agent
            .get(url.as_str())
            .call()
            .into_diagnostic()
            .wrap_err_with(|| format!("request for {url} failed"))?
            .into_string()
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read body of {url}"))
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

/// Reads `<map_name>.json` files from a directory.
pub struct DirMapSource {
    dir: Arc<Dir>,
}

impl DirMapSource {
    pub fn new(dir: Arc<Dir>) -> Self {
        Self { dir }
    }
}

impl MapSource for DirMapSource {
    fn fetch(&self, map_name: &str) -> Result<String> {
        let file_name = document_file_name(map_name);
        self.dir
            .read_to_string(&file_name)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read map document {file_name}"))
    }

    fn describe(&self) -> String {
        "maps directory".to_string()
    }
}

/// Documents kept in memory, keyed by map name.
#[derive(Default)]
pub struct MemoryMapSource {
    documents: IndexMap<String, String>,
}

impl MemoryMapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, map_name: impl Into<String>, json: impl Into<String>) -> Self {
        self.documents.insert(map_name.into(), json.into());
        self
    }
}

impl MapSource for MemoryMapSource {
    fn fetch(&self, map_name: &str) -> Result<String> {
        self.documents
            .get(map_name)
            .cloned()
            .ok_or_else(|| miette::miette!("no map document named {map_name}"))
    }

    fn describe(&self) -> String {
        format!("{} in-memory documents", self.documents.len())
    }
}

/// Builds the source named by the viewer configuration.
/// Relative directories are created inside `root_dir` when missing.
pub fn map_source_from_config(
    config: &MapSourceConfig,
    root_dir: &Dir,
) -> Result<Arc<dyn MapSource>> {
    Ok(match config {
        MapSourceConfig::Http { base_url } => Arc::new(HttpMapSource::new(base_url.clone())),
        MapSourceConfig::Directory { path } => {
            root_dir
                .create_dir_all(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to create maps directory {path}"))?;
            let dir = root_dir
                .open_dir(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to open maps directory {path}"))?;
            Arc::new(DirMapSource::new(Arc::new(dir)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::camino::Utf8Path;
    use rstest::rstest;
    use similar_asserts::assert_eq;

    #[rstest]
    #[case("https://example.com/maps", "https://example.com/maps/armory.json")]
    #[case("https://example.com/maps/", "https://example.com/maps/armory.json")]
    #[case("https://example.com", "https://example.com/armory.json")]
    fn document_url_keeps_the_base_path(#[case] base: &str, #[case] expected: &str) {
        let source = HttpMapSource::new(Url::parse(base).unwrap());
        assert_eq!(source.document_url("armory").unwrap().as_str(), expected);
    }

    #[test]
    fn directory_source_reads_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let root =
            Dir::open_ambient_dir(Utf8Path::from_path(tmp.path()).unwrap(), ambient_authority())
                .unwrap();
        let source = map_source_from_config(&MapSourceConfig::default(), &root).unwrap();
        assert!(source.fetch("farm").is_err());
        root.write("maps/farm.json", r#"{"mapName": "farm"}"#).unwrap();
        assert_eq!(source.fetch("farm").unwrap(), r#"{"mapName": "farm"}"#);
    }

    #[test]
    fn memory_source_misses_unknown_maps() {
        let source = MemoryMapSource::new().with_document("valley", "{}");
        assert_eq!(source.fetch("valley").unwrap(), "{}");
        assert!(source.fetch("factory").is_err());
    }
}
