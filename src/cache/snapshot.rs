//! Snapshot Codec Module
//!
//! Binary encoding of the full entry set, used by save/load.
//!
//! The file is a bincode document holding a magic tag, a format version and
//! the key-to-entry map. Each value is written with its enum variant, so
//! heterogeneous values come back with their original kind.

use std::collections::HashMap;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, MAX_VALUE_DEPTH};
use crate::error::{CacheError, Result};

/// Leading tag identifying a snapshot file
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"KVS1";

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    magic: [u8; 4],
    version: u16,
    items: HashMap<String, CacheEntry>,
}

fn codec() -> bincode::DefaultOptions {
    bincode::DefaultOptions::new()
}

// == Encode ==
/// Serializes a key-to-entry snapshot.
///
/// Values nested deeper than [`MAX_VALUE_DEPTH`] are refused, since
/// [`decode`] would reject the file.
pub fn encode(items: &HashMap<String, CacheEntry>) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct SnapshotRef<'a> {
        magic: [u8; 4],
        version: u16,
        items: &'a HashMap<String, CacheEntry>,
    }

    if let Some((key, _)) = items
        .iter()
        .find(|(_, entry)| entry.value.nests_deeper_than(MAX_VALUE_DEPTH))
    {
        return Err(CacheError::CorruptData(format!(
            "Value for key '{}' nests deeper than {} levels",
            key, MAX_VALUE_DEPTH
        )));
    }

    let file = SnapshotRef {
        magic: SNAPSHOT_MAGIC,
        version: SNAPSHOT_VERSION,
        items,
    };
    Ok(codec().serialize(&file)?)
}

// == Decode ==
/// Deserializes a snapshot produced by [`encode`].
///
/// Truncated input, trailing bytes, unknown value tags, over-deep list
/// nesting, a wrong magic tag and unsupported versions all fail with
/// `CorruptData`.
pub fn decode(bytes: &[u8]) -> Result<HashMap<String, CacheEntry>> {
    let file: SnapshotFile = codec().deserialize(bytes)?;

    if file.magic != SNAPSHOT_MAGIC {
        return Err(CacheError::CorruptData(
            "Missing snapshot header".to_string(),
        ));
    }
    if file.version != SNAPSHOT_VERSION {
        return Err(CacheError::CorruptData(format!(
            "Unsupported snapshot version {}",
            file.version
        )));
    }

    Ok(file.items)
}
