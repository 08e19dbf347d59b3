use std::fs;
use std::path::{Path, PathBuf};

use gitobj_store::{
    encode_commit, hash_file, read_object, write_tree, Blob, Commit, LooseObjectStore,
    ObjectKind, StoredObject, Tree, TreeEntry,
};
use gitobj_types::{ObjectId, Signature};
use tracing::{debug, info};

use crate::config::{RepoConfig, DEFAULT_METADATA_DIR};
use crate::error::{SdkError, SdkResult};

/// Contents written to `HEAD` by [`Repository::init`].
pub const HEAD_CONTENTS: &str = "ref: refs/heads/master\n";

/// A working directory with a metadata directory and its loose object store.
pub struct Repository {
    root: PathBuf,
    config: RepoConfig,
    store: LooseObjectStore,
}

impl Repository {
    /// Create the metadata layout under `root`: `objects/`, `refs/` and `HEAD`.
    pub fn init(root: impl Into<PathBuf>, config: RepoConfig) -> SdkResult<Self> {
        let root = root.into();
        let metadata = root.join(&config.metadata_dir);
        if metadata.join("objects").is_dir() {
            return Err(SdkError::AlreadyInitialized(metadata.display().to_string()));
        }

        fs::create_dir_all(metadata.join("objects"))?;
        fs::create_dir_all(metadata.join("refs"))?;
        fs::write(metadata.join("HEAD"), HEAD_CONTENTS)?;
        info!(path = %metadata.display(), "initialized repository");
        Ok(Self::from_parts(root, config))
    }

    /// Open an existing repository rooted exactly at `root`.
    pub fn open(root: impl Into<PathBuf>, config: RepoConfig) -> SdkResult<Self> {
        let root = root.into();
        let metadata = root.join(&config.metadata_dir);
        if !metadata.join("objects").is_dir() {
            return Err(SdkError::NotInitialized(root.display().to_string()));
        }
        Ok(Self::from_parts(root, config))
    }

    /// Find the nearest enclosing repository, starting at `start` and walking
    /// up through its parents, and load its `gitobj.toml`.
    pub fn discover(start: &Path) -> SdkResult<Self> {
        let mut candidate = Some(start);
        while let Some(dir) = candidate {
            let metadata = dir.join(DEFAULT_METADATA_DIR);
            if metadata.join("objects").is_dir() {
                let config = RepoConfig::load_or_default(&metadata)?;
                debug!(root = %dir.display(), "discovered repository");
                return Ok(Self::from_parts(dir.to_path_buf(), config));
            }
            candidate = dir.parent();
        }
        Err(SdkError::NotInitialized(start.display().to_string()))
    }

    fn from_parts(root: PathBuf, config: RepoConfig) -> Self {
        let store = LooseObjectStore::new(root.join(&config.metadata_dir).join("objects"))
            .with_compression_level(config.effective_compression_level());
        Self {
            root,
            config,
            store,
        }
    }

    // ---- Plumbing ----

    /// Digest of a file as a blob, storing it when `write` is set.
    pub fn hash_object(&self, path: &Path, write: bool) -> SdkResult<ObjectId> {
        if write {
            Ok(hash_file(&self.store, path)?)
        } else {
            Ok(Blob::hash(&fs::read(path)?))
        }
    }

    /// Kind and payload of any stored object.
    pub fn cat_file(&self, id: &ObjectId) -> SdkResult<StoredObject> {
        Ok(read_object(&self.store, id)?)
    }

    /// Fetch an object that must be of kind `expected`.
    fn read_kind(&self, id: &ObjectId, expected: ObjectKind) -> SdkResult<StoredObject> {
        let object = read_object(&self.store, id)?;
        if object.kind != expected {
            return Err(SdkError::WrongKind {
                id: *id,
                expected,
                actual: object.kind,
            });
        }
        Ok(object)
    }

    /// Entries of a tree object in stored order.
    pub fn ls_tree(&self, id: &ObjectId) -> SdkResult<Vec<TreeEntry>> {
        let object = self.read_kind(id, ObjectKind::Tree)?;
        Ok(Tree::from_stored_object(&object)?.entries)
    }

    /// Snapshot the working directory, excluding the metadata directory.
    pub fn write_tree(&self) -> SdkResult<ObjectId> {
        Ok(write_tree(&self.store, &self.root, &self.config.metadata_dir)?)
    }

    /// Commit `tree` with the configured identity at the current time.
    pub fn commit_tree(
        &self,
        tree: ObjectId,
        parent: Option<ObjectId>,
        message: &str,
    ) -> SdkResult<ObjectId> {
        self.commit_tree_as(tree, parent, self.signature(), message)
    }

    /// Commit `tree` with an explicit signature.
    ///
    /// The tree must be a stored tree and the parent, if any, a stored commit.
    pub fn commit_tree_as(
        &self,
        tree: ObjectId,
        parent: Option<ObjectId>,
        signature: Signature,
        message: &str,
    ) -> SdkResult<ObjectId> {
        Tree::from_stored_object(&self.read_kind(&tree, ObjectKind::Tree)?)?;
        if let Some(parent) = &parent {
            Commit::from_stored_object(&self.read_kind(parent, ObjectKind::Commit)?)?;
        }
        Ok(encode_commit(&self.store, tree, parent, signature, message)?)
    }

    /// Number of objects in the store.
    pub fn object_count(&self) -> SdkResult<usize> {
        Ok(self.store.list()?.len())
    }

    /// Parse a 40-character hex digest.
    pub fn parse_id(&self, hex: &str) -> SdkResult<ObjectId> {
        Ok(ObjectId::from_hex(hex)?)
    }

    /// Signature for a commit made now.
    pub fn signature(&self) -> Signature {
        match self.config.tz_offset_minutes {
            Some(offset) => Signature::now_with_offset(&self.config.identity, offset),
            None => Signature::now(&self.config.identity),
        }
    }

    // ---- Accessors ----

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(&self.config.metadata_dir)
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitobj_store::{EntryMode, ObjectStore, StoreError};

    fn new_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path(), RepoConfig::default()).unwrap();
        (dir, repo)
    }

    fn sig() -> Signature {
        Signature::new("Ada <ada@example.com>", 1_700_000_000, 0)
    }

    // -----------------------------------------------------------------------
    // Layout and discovery
    // -----------------------------------------------------------------------

    #[test]
    fn init_creates_layout() {
        let (dir, repo) = new_repo();
        let git = dir.path().join(".git");
        assert!(git.join("objects").is_dir());
        assert!(git.join("refs").is_dir());
        assert_eq!(fs::read_to_string(git.join("HEAD")).unwrap(), "ref: refs/heads/master\n");
        assert_eq!(repo.metadata_path(), git);
        assert_eq!(repo.store().objects_dir(), git.join("objects"));
    }

    #[test]
    fn init_twice_is_rejected() {
        let (dir, _repo) = new_repo();
        let err = Repository::init(dir.path(), RepoConfig::default()).err().unwrap();
        assert!(matches!(err, SdkError::AlreadyInitialized(_)));
    }

    #[test]
    fn open_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let err = Repository::open(dir.path(), RepoConfig::default()).err().unwrap();
        assert!(matches!(err, SdkError::NotInitialized(_)));
    }

    #[test]
    fn custom_metadata_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            metadata_dir: ".meta".into(),
            ..RepoConfig::default()
        };
        Repository::init(dir.path(), config.clone()).unwrap();
        assert!(dir.path().join(".meta/objects").is_dir());
        assert!(Repository::open(dir.path(), config).is_ok());
        assert!(Repository::open(dir.path(), RepoConfig::default()).is_err());
    }

    #[test]
    fn discover_walks_up() {
        let (dir, _repo) = new_repo();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let found = Repository::discover(&nested).unwrap();
        assert_eq!(found.root(), dir.path());
    }

    #[test]
    fn discover_reads_config_file() {
        let (dir, repo) = new_repo();
        fs::write(
            repo.metadata_path().join("gitobj.toml"),
            "identity = \"Ada <ada@example.com>\"\ntz_offset_minutes = 120\ncompression_level = 1\n",
        )
        .unwrap();

        let found = Repository::discover(dir.path()).unwrap();
        assert_eq!(found.config().identity, "Ada <ada@example.com>");
        assert_eq!(found.store().compression_level(), 1);
        let signature = found.signature();
        assert_eq!(signature.identity, "Ada <ada@example.com>");
        assert_eq!(signature.tz_offset_minutes, 120);
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    #[test]
    fn hash_object_without_write_stores_nothing() {
        let (dir, repo) = new_repo();
        let file = dir.path().join("hello.txt");
        fs::write(&file, b"hello\n").unwrap();

        let id = repo.hash_object(&file, false).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(!repo.store().exists(&id).unwrap());

        assert_eq!(repo.hash_object(&file, true).unwrap(), id);
        assert!(repo.store().object_path(&id).is_file());
        assert!(dir
            .path()
            .join(".git/objects/ce/013625030ba8dba906f756967f9e9ca394464a")
            .is_file());
    }

    #[test]
    fn cat_file_reports_kind_and_payload() {
        let (dir, repo) = new_repo();
        let file = dir.path().join("f");
        fs::write(&file, b"payload").unwrap();
        let id = repo.hash_object(&file, true).unwrap();

        let obj = repo.cat_file(&id).unwrap();
        assert_eq!(obj.kind, ObjectKind::Blob);
        assert_eq!(obj.data, b"payload");
        assert_eq!(obj.size, 7);
    }

    #[test]
    fn cat_file_missing_is_not_found() {
        let (_dir, repo) = new_repo();
        let id = repo.parse_id("ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
        assert!(matches!(
            repo.cat_file(&id).unwrap_err(),
            SdkError::Store(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn parse_id_rejects_short_hex() {
        let (_dir, repo) = new_repo();
        assert!(matches!(repo.parse_id("ce0136").unwrap_err(), SdkError::Type(_)));
    }

    #[test]
    fn write_tree_then_ls_tree() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), b"fn main() {}\n").unwrap();

        let tree = repo.write_tree().unwrap();
        let entries = repo.ls_tree(&tree).unwrap();
        let names: Vec<&[u8]> = entries.iter().map(|e| e.name.as_slice()).collect();
        assert_eq!(names, [&b"a.txt"[..], b"b.txt", b"src"]);
        assert_eq!(entries[2].mode, EntryMode::Directory);

        // Writing again is stable.
        assert_eq!(repo.write_tree().unwrap(), tree);
        // Three blobs, the root tree and the src subtree.
        assert_eq!(repo.object_count().unwrap(), 5);
    }

    #[test]
    fn ls_tree_on_blob_is_wrong_kind() {
        let (dir, repo) = new_repo();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        let blob = repo.hash_object(&file, true).unwrap();
        assert!(matches!(
            repo.ls_tree(&blob).unwrap_err(),
            SdkError::WrongKind {
                id,
                expected: ObjectKind::Tree,
                actual: ObjectKind::Blob,
            } if id == blob
        ));
    }

    #[test]
    fn ls_tree_on_damaged_tree_is_corrupt() {
        let (_dir, repo) = new_repo();
        let id = repo
            .store()
            .put(ObjectKind::Tree, b"100644 a.txt\0short".to_vec())
            .unwrap();
        assert!(matches!(
            repo.ls_tree(&id).unwrap_err(),
            SdkError::Store(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn commit_chain() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        let tree = repo.write_tree().unwrap();

        let first = repo.commit_tree_as(tree, None, sig(), "first").unwrap();
        let second = repo.commit_tree_as(tree, Some(first), sig(), "second").unwrap();

        let body = String::from_utf8(repo.cat_file(&second).unwrap().data).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], format!("tree {tree}"));
        assert_eq!(lines[1], format!("parent {first}"));
        assert!(body.ends_with("\n\nsecond\n"));

        let root = String::from_utf8(repo.cat_file(&first).unwrap().data).unwrap();
        assert!(!root.contains("parent"));
    }

    #[test]
    fn commit_tree_uses_configured_identity() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        let tree = repo.write_tree().unwrap();
        let id = repo.commit_tree(tree, None, "msg").unwrap();
        let body = String::from_utf8(repo.cat_file(&id).unwrap().data).unwrap();
        assert!(body.contains("\nauthor gitobj <gitobj@localhost> "));
        assert!(body.contains("\ncommitter gitobj <gitobj@localhost> "));
    }

    #[test]
    fn commit_tree_requires_stored_tree() {
        let (_dir, repo) = new_repo();
        let missing = ObjectId::from_hash([7; 20]);
        assert!(matches!(
            repo.commit_tree_as(missing, None, sig(), "m").unwrap_err(),
            SdkError::Store(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn commit_parent_must_be_commit() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        let tree = repo.write_tree().unwrap();
        let err = repo.commit_tree_as(tree, Some(tree), sig(), "m").unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("object {tree} is a tree, expected commit")
        );
        assert!(matches!(
            err,
            SdkError::WrongKind {
                expected: ObjectKind::Commit,
                actual: ObjectKind::Tree,
                ..
            }
        ));
    }

    #[test]
    fn commit_of_blob_is_wrong_kind() {
        let (dir, repo) = new_repo();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        let blob = repo.hash_object(&file, true).unwrap();
        let before = repo.object_count().unwrap();
        assert!(matches!(
            repo.commit_tree_as(blob, None, sig(), "m").unwrap_err(),
            SdkError::WrongKind {
                expected: ObjectKind::Tree,
                actual: ObjectKind::Blob,
                ..
            }
        ));
        assert_eq!(repo.object_count().unwrap(), before);
    }
}
