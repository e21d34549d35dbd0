use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Values cached on the client between visits
///
/// Stands in for browser local storage. Only the active course id is kept;
/// it is read once when a controller is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCache {
    #[serde(default)]
    pub active_course_id: Option<u32>,
}

impl LocalCache {
    /// Read the cache file
    ///
    /// A missing or unreadable file yields an empty cache.
    pub fn load<P: AsRef<Path>>(path: P) -> LocalCache {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return LocalCache::default(),
        };

        match serde_json::from_str(&contents) {
            Ok(cache) => cache,
            Err(e) => {
                warn!("Ignoring malformed local cache {}: {}", path.display(), e);
                LocalCache::default()
            }
        }
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
