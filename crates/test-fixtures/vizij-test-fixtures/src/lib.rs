use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    packets: HashMap<String, PacketEntry>,
    objects: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PacketEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        kind: Option<String>,
    },
}

impl PacketEntry {
    fn as_path(&self) -> &str {
        match self {
            PacketEntry::Path(path) => path,
            PacketEntry::Detailed { path, .. } => path,
        }
    }

    fn kind(&self) -> Option<&str> {
        match self {
            PacketEntry::Path(_) => None,
            PacketEntry::Detailed { kind, .. } => kind.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Property packet streams (one packet or an array of packets per file).
pub mod packets {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.packets.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.packets, "packet", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.packets, "packet", name)?;
        super::load_json(entry.as_path())
    }

    /// Value kind the fixture targets (`scalar`, `cartesian3`, ...), if recorded.
    pub fn kind(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.packets, "packet", name)?;
        Ok(entry.kind().map(str::to_owned))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.packets, "packet", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}

/// Object packet documents (an array of object packets per file).
pub mod objects {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.objects.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.objects, "object", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.objects, "object", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.objects, "object", name)?;
        Ok(resolve_path(rel))
    }
}
