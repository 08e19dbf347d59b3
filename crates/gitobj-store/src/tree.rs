use std::borrow::Cow;

use gitobj_crypto::ObjectHasher;
use gitobj_types::{ObjectId, OBJECT_ID_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// File mode for a tree entry.
///
/// Only regular files and directories are modelled; executable bits,
/// symlinks, and submodules are out of scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Directory => 0o040000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Mode text as it appears inside a serialized tree entry.
    ///
    /// git writes octal without leading zeros, so directories are `40000`.
    pub fn as_entry_str(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Directory => "40000",
        }
    }

    /// Parse the mode text of a serialized entry. Leading zeros are accepted.
    pub fn from_entry_str(s: &str) -> Option<Self> {
        if s.is_empty() || !s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        u32::from_str_radix(s, 8).ok().and_then(Self::from_mode_bits)
    }

    /// `true` for subtree entries.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Regular => ObjectKind::Blob,
            Self::Directory => ObjectKind::Tree,
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular or directory).
    pub mode: EntryMode,
    /// Entry name: a single path segment, as raw bytes.
    pub name: Vec<u8>,
    /// Content-addressed ID of the referenced blob or tree.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<Vec<u8>>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// The name for display, with invalid UTF-8 replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    fn validate_name(&self) -> StoreResult<()> {
        let name = self.name.as_slice();
        let bad_byte = name.iter().any(|&b| b == b'/' || b == 0);
        if name.is_empty() || name == b"." || name == b".." || bad_byte {
            return Err(self.invalid_name());
        }
        Ok(())
    }

    fn invalid_name(&self) -> StoreError {
        StoreError::InvalidEntryName(self.display_name().into_owned())
    }
}

// Entries order by name bytes alone, never locale-aware.
impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object (analogous to git tree).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    /// Entries sorted by name.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted by name for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Serialize entries as `"<mode> <name>\0<20-byte id>"`, concatenated.
    ///
    /// Entries are written in name order even if `entries` was modified
    /// after construction. Fails if a name is invalid or appears twice.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort();

        let mut out = Vec::with_capacity(sorted.len() * (OBJECT_ID_LEN + 32));
        for (i, entry) in sorted.iter().enumerate() {
            entry.validate_name()?;
            if i > 0 && sorted[i - 1].name == entry.name {
                return Err(entry.invalid_name());
            }
            out.extend_from_slice(entry.mode.as_entry_str().as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.object_id.as_bytes());
        }
        Ok(out)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        Ok(StoredObject::new(ObjectKind::Tree, self.encode()?))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        Ok(Self {
            entries: parse_tree(&obj.data)?,
        })
    }

    /// Look up an entry by name.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&TreeEntry> {
        let name = name.as_ref();
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode a tree payload into its entries, in stored order.
///
/// Each entry is consumed as mode (up to a space), name (up to a NUL), then
/// exactly 20 digest bytes. A payload that ends mid-entry is corrupt.
pub fn parse_tree(payload: &[u8]) -> StoreResult<Vec<TreeEntry>> {
    let corrupt = |reason: String| StoreError::corrupt(ObjectHasher::TREE.hash(payload), reason);

    let mut entries = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let offset = payload.len() - rest.len();

        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| corrupt(format!("truncated mode at offset {offset}")))?;
        let mode_text = std::str::from_utf8(&rest[..space])
            .map_err(|_| corrupt(format!("non-text mode at offset {offset}")))?;
        let mode = EntryMode::from_entry_str(mode_text)
            .ok_or_else(|| corrupt(format!("unsupported mode {mode_text:?} at offset {offset}")))?;
        rest = &rest[space + 1..];

        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt(format!("truncated name at offset {offset}")))?;
        let name = rest[..nul].to_vec();
        rest = &rest[nul + 1..];

        if rest.len() < OBJECT_ID_LEN {
            return Err(corrupt(format!(
                "truncated object id for {:?}: {} of {OBJECT_ID_LEN} bytes",
                String::from_utf8_lossy(&name),
                rest.len()
            )));
        }
        let (id_bytes, tail) = rest.split_at(OBJECT_ID_LEN);
        let object_id = ObjectId::from_slice(id_bytes).map_err(|e| corrupt(e.to_string()))?;
        rest = tail;

        entries.push(TreeEntry::new(mode, name, object_id));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(tag: &[u8]) -> ObjectId {
        ObjectHasher::BLOB.hash(tag)
    }

    const ZERO: ObjectId = ObjectId::from_hash([0; 20]);

    fn names(tree: &Tree) -> Vec<&[u8]> {
        tree.entries.iter().map(|e| e.name.as_slice()).collect()
    }

    #[test]
    fn tree_entries_sorted() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "b", id(b"b")),
            TreeEntry::new(EntryMode::Regular, "a", id(b"a")),
            TreeEntry::new(EntryMode::Directory, "c", id(b"c")),
        ]);
        assert_eq!(names(&tree), [b"a", b"b", b"c"]);

        let encoded = tree.encode().unwrap();
        let stored_order: Vec<Vec<u8>> = parse_tree(&encoded)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(stored_order, [b"a", b"b", b"c"]);
    }

    #[test]
    fn sort_is_bytewise_not_locale() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "é", ZERO),
            TreeEntry::new(EntryMode::Regular, "a", ZERO),
            TreeEntry::new(EntryMode::Regular, "B", ZERO),
            TreeEntry::new(EntryMode::Regular, "Z", ZERO),
            TreeEntry::new(EntryMode::Regular, "_", ZERO),
        ]);
        let shown: Vec<_> = tree.entries.iter().map(|e| e.display_name()).collect();
        assert_eq!(shown, ["B", "Z", "_", "a", "é"]);
    }

    #[test]
    fn sort_ignores_mode_and_id() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "zeta", ObjectId::from_hash([0; 20])),
            TreeEntry::new(EntryMode::Directory, "alpha", ObjectId::from_hash([0xff; 20])),
        ]);
        assert_eq!(tree.entries[0].name, b"alpha");
    }

    #[test]
    fn single_file_entry_layout() {
        let blob = ObjectHasher::BLOB.hash(b"x");
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::Regular, "a.txt", blob)]);
        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(blob.as_bytes());
        assert_eq!(tree.encode().unwrap(), expected);
    }

    #[test]
    fn directory_mode_text() {
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::Directory, "sub", ZERO)]);
        assert!(tree.encode().unwrap().starts_with(b"40000 sub\0"));
        assert_eq!(EntryMode::Directory.to_string(), "040000");
    }

    #[test]
    fn empty_tree_has_well_known_id() {
        let stored = Tree::empty().to_stored_object().unwrap();
        assert!(stored.data.is_empty());
        assert_eq!(
            stored.compute_id().to_hex(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn tree_roundtrip() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "file.txt", id(b"content")),
            TreeEntry::new(EntryMode::Directory, "subdir", id(b"tree")),
            TreeEntry::new(EntryMode::Regular, "naïve name.md", id(b"naive")),
        ]);
        let stored = tree.to_stored_object().unwrap();
        let decoded = Tree::from_stored_object(&stored).unwrap();
        assert_eq!(tree, decoded);
    }

    #[test]
    fn non_utf8_names_roundtrip() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, &b"caf\xe9.txt"[..], id(b"latin1")),
            TreeEntry::new(EntryMode::Regular, "cafe.txt", id(b"ascii")),
        ]);
        assert_eq!(names(&tree), [&b"cafe.txt"[..], &b"caf\xe9.txt"[..]]);
        assert_eq!(tree.entries[1].display_name(), "caf\u{fffd}.txt");

        let decoded = Tree::from_stored_object(&tree.to_stored_object().unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn parse_accepts_non_utf8_name() {
        let mut payload = b"100644 caf\xe9.txt\0".to_vec();
        payload.extend_from_slice(&[3u8; 20]);
        let entries = parse_tree(&payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, b"caf\xe9.txt");
        assert_eq!(entries[0].object_id, ObjectId::from_hash([3u8; 20]));
    }

    #[test]
    fn duplicate_names_rejected() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "dup", id(b"1")),
            TreeEntry::new(EntryMode::Directory, "dup", id(b"2")),
        ]);
        assert!(matches!(
            tree.encode().unwrap_err(),
            StoreError::InvalidEntryName(name) if name == "dup"
        ));
    }

    #[test]
    fn invalid_names_rejected() {
        for bad in [&b""[..], b".", b"..", b"a/b", b"nul\0byte"] {
            let tree = Tree::new(vec![TreeEntry::new(EntryMode::Regular, bad, ZERO)]);
            assert!(
                matches!(tree.encode(), Err(StoreError::InvalidEntryName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn tree_get_entry() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "b.txt", id(b"b")),
            TreeEntry::new(EntryMode::Regular, "a.txt", ZERO),
        ]);
        assert!(tree.get("a.txt").is_some());
        assert!(tree.get(b"a.txt").is_some());
        assert_eq!(tree.get("b.txt").unwrap().object_id, id(b"b"));
        assert!(tree.get("missing").is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn empty_tree() {
        let tree = Tree::empty();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(parse_tree(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_accepts_zero_padded_directory_mode() {
        let mut payload = b"040000 sub\0".to_vec();
        payload.extend_from_slice(&[7u8; 20]);
        let entries = parse_tree(&payload).unwrap();
        assert_eq!(entries[0].mode, EntryMode::Directory);
        assert_eq!(entries[0].object_id, ObjectId::from_hash([7u8; 20]));
    }

    #[test]
    fn parse_truncated_digest() {
        let mut payload = b"100644 a.txt\0".to_vec();
        payload.extend_from_slice(&[1u8; 12]);
        assert!(matches!(
            parse_tree(&payload).unwrap_err(),
            StoreError::CorruptObject { .. }
        ));
    }

    #[test]
    fn parse_truncated_name() {
        assert!(matches!(
            parse_tree(b"100644 a.t").unwrap_err(),
            StoreError::CorruptObject { .. }
        ));
    }

    #[test]
    fn parse_truncated_mode() {
        let mut payload = b"100644 a\0".to_vec();
        payload.extend_from_slice(&[1u8; 20]);
        payload.extend_from_slice(b"1006");
        assert!(matches!(
            parse_tree(&payload).unwrap_err(),
            StoreError::CorruptObject { .. }
        ));
    }

    #[test]
    fn parse_rejects_unsupported_mode() {
        let mut payload = b"120000 link\0".to_vec();
        payload.extend_from_slice(&[1u8; 20]);
        assert!(matches!(
            parse_tree(&payload).unwrap_err(),
            StoreError::CorruptObject { .. }
        ));
    }

    #[test]
    fn entry_mode_bits_roundtrip() {
        for mode in [EntryMode::Regular, EntryMode::Directory] {
            assert_eq!(EntryMode::from_mode_bits(mode.mode_bits()), Some(mode));
            assert_eq!(EntryMode::from_entry_str(mode.as_entry_str()), Some(mode));
        }
        assert!(EntryMode::from_mode_bits(0o100755).is_none());
        assert!(EntryMode::from_entry_str("10064x").is_none());
        assert!(EntryMode::from_entry_str("").is_none());
    }

    #[test]
    fn mode_maps_to_object_kind() {
        assert_eq!(EntryMode::Regular.object_kind(), ObjectKind::Blob);
        assert_eq!(EntryMode::Directory.object_kind(), ObjectKind::Tree);
        assert!(EntryMode::Directory.is_tree());
    }
}
