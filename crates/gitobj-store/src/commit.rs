use std::fmt::Write as _;

use gitobj_types::{ObjectId, Signature};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Snapshot object (analogous to git commit).
///
/// Points at a root tree and at most one parent. Merge commits are not
/// modelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: ObjectId,
    /// Previous commit in the lineage; `None` for a root commit.
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Message text, always terminated by a newline.
    pub message: String,
}

impl Commit {
    /// Create a commit where author and committer are the same signature.
    pub fn new(
        tree: ObjectId,
        parent: Option<ObjectId>,
        signature: Signature,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if !message.ends_with('\n') {
            message.push('\n');
        }
        Self {
            tree,
            parent,
            author: signature.clone(),
            committer: signature,
            message,
        }
    }

    /// The textual commit body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = String::with_capacity(192 + self.message.len());
        // Writing into a String cannot fail.
        let _ = writeln!(body, "tree {}", self.tree);
        if let Some(parent) = &self.parent {
            let _ = writeln!(body, "parent {parent}");
        }
        let _ = writeln!(body, "author {}", self.author);
        let _ = writeln!(body, "committer {}", self.committer);
        body.push('\n');
        body.push_str(&self.message);
        body.into_bytes()
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.encode())
    }

    /// Decode from a `StoredObject`.
    ///
    /// Unknown header fields (and their continuation lines) are skipped.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        let corrupt = |reason: String| StoreError::corrupt(obj.compute_id(), reason);

        let text = std::str::from_utf8(&obj.data)
            .map_err(|_| corrupt("commit is not valid UTF-8".into()))?;
        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| corrupt("missing blank line before message".into()))?;

        let mut tree = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        for line in header.lines() {
            if line.starts_with(' ') {
                continue;
            }
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| corrupt(format!("malformed header line {line:?}")))?;
            match key {
                "tree" => {
                    tree = Some(parse_id(value).map_err(&corrupt)?);
                }
                "parent" => {
                    if parent.is_some() {
                        return Err(corrupt("multiple parents are not supported".into()));
                    }
                    parent = Some(parse_id(value).map_err(&corrupt)?);
                }
                "author" => {
                    author = Some(value.parse::<Signature>().map_err(|e| corrupt(e.to_string()))?);
                }
                "committer" => {
                    committer =
                        Some(value.parse::<Signature>().map_err(|e| corrupt(e.to_string()))?);
                }
                _ => {}
            }
        }

        Ok(Self {
            tree: tree.ok_or_else(|| corrupt("missing tree header".into()))?,
            parent,
            author: author.ok_or_else(|| corrupt("missing author header".into()))?,
            committer: committer.ok_or_else(|| corrupt("missing committer header".into()))?,
            message: message.to_string(),
        })
    }
}

/// Build a commit with author == committer, store it and return its ID.
pub fn encode_commit<S: ObjectStore + ?Sized>(
    store: &S,
    tree: ObjectId,
    parent: Option<ObjectId>,
    signature: Signature,
    message: &str,
) -> StoreResult<ObjectId> {
    let commit = Commit::new(tree, parent, signature, message);
    let id = store.write(&commit.to_stored_object())?;
    debug!(%id, %tree, parent = ?parent.map(|p| p.short_hex()), "wrote commit");
    Ok(id)
}

fn parse_id(value: &str) -> Result<ObjectId, String> {
    ObjectId::from_hex(value).map_err(|e| format!("bad object id {value:?}: {e}"))
}
