//! Filesystem-backed store of loose objects.
//!
//! Each object lives in its own file at `objects/<xx>/<yyyy...>`, where `xx`
//! is the first two hex characters of its digest and the file name is the
//! remaining 38. File contents are the zlib-compressed framed object.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gitobj_types::ObjectId;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Loose object store rooted at an `objects` directory.
///
/// Nothing here consults the current directory or the environment.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression_level: u32,
}

impl LooseObjectStore {
    /// Create a store over `objects_dir` using the default compression level.
    ///
    /// The directory is created lazily by the first write.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects_dir: objects_dir.into(),
            compression_level: codec::DEFAULT_LEVEL,
        }
    }

    /// Set the zlib level (0-9) used for new objects.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// The `objects` directory this store writes into.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The zlib level used for new objects.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// Where the object with `id` lives: `objects/<hex[..2]>/<hex[2..]>`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        let (fan_out, rest) = hex.split_at(2);
        self.objects_dir.join(fan_out).join(rest)
    }

    /// Every object ID present on disk, sorted.
    ///
    /// Entries that do not look like loose objects (e.g. `info/`, `pack/`, or
    /// temporary files) are ignored.
    pub fn list(&self) -> StoreResult<Vec<ObjectId>> {
        if !self.objects_dir.try_exists()? {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.objects_dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let fan_out = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str());
            let rest = entry.file_name().to_str();
            if let (Some(fan_out), Some(rest)) = (fan_out, rest) {
                if fan_out.len() == 2 && rest.len() == 38 {
                    if let Ok(id) = ObjectId::from_hex(&format!("{fan_out}{rest}")) {
                        ids.push(id);
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn persist(&self, path: &Path, compressed: &[u8]) -> StoreResult<()> {
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        // Already-exists is success.
        fs::create_dir_all(dir)?;

        // Readers only ever see complete files under the final name.
        let mut tmp = tempfile::Builder::new().prefix("tmp_obj_").tempfile_in(dir)?;
        tmp.write_all(compressed)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let framed = codec::decompress(&compressed).map_err(|e| {
            warn!(%id, path = %path.display(), error = %e, "undecodable object file");
            StoreError::corrupt(*id, e.to_string())
        })?;
        let object = StoredObject::from_framed(*id, &framed).map_err(|e| {
            warn!(%id, path = %path.display(), error = %e, "malformed object frame");
            e
        })?;

        let actual = object.compute_id();
        if actual != *id {
            warn!(%id, %actual, "object content does not match its name");
            return Err(StoreError::corrupt(
                *id,
                format!("content hashes to {actual}"),
            ));
        }

        debug!(%id, kind = %object.kind, size = object.size, "read object");
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);

        // Existing files are trusted as-is.
        if path.try_exists()? {
            trace!(%id, "object already present");
            return Ok(id);
        }

        let compressed = codec::compress(&object.framed(), self.compression_level)?;
        self.persist(&path, &compressed)?;
        debug!(
            %id,
            kind = %object.kind,
            size = object.size,
            stored = compressed.len(),
            "wrote object"
        );
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }
}
