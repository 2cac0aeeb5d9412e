//! Node persistence: the store contract and its two implementations.
//!
//! The core only ever talks to [`NodeStore`]. [`FsStore`] keeps one JSON
//! file per document under a local data root and is what the CLI uses;
//! [`MemoryStore`] backs tests and embedding. Both guarantee the same
//! contract: a save is all-or-nothing, a delete removes every node of the
//! document atomically, and a second build for the same document is refused
//! while one is in flight.

use crate::{Error, Forest, Node, NodeId, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Persistence contract the core requires from its storage collaborator.
pub trait NodeStore: Send + Sync {
    /// Persist the full forest for a document in one all-or-nothing unit,
    /// replacing any previous structure.
    fn save_all(&self, forest: &Forest) -> Result<()>;

    /// Retrieve the persisted forest with parent/child/order relationships
    /// intact. Fails with [`Error::NotFound`] when the document has no
    /// stored structure.
    fn load_forest(&self, document_id: &str) -> Result<Forest>;

    /// Fetch a single node, or `None` when the id is unknown.
    fn load_node(&self, node_id: NodeId) -> Result<Option<Node>>;

    /// Fetch a node plus every descendant, flat, in depth-first source
    /// order. Fails with [`Error::NotFound`] when the id is unknown.
    fn load_subtree(&self, node_id: NodeId) -> Result<Vec<Node>>;

    /// Remove every node belonging to the document, atomically. Returns the
    /// number of nodes removed; deleting an absent structure is a no-op
    /// success returning 0.
    fn delete_all(&self, document_id: &str) -> Result<usize>;

    /// Whether the document has a persisted structure.
    fn exists(&self, document_id: &str) -> Result<bool>;

    /// Claim the exclusive right to build this document's structure.
    ///
    /// Fails with [`Error::Conflict`] while another build for the same
    /// document holds the permit. The permit releases on drop.
    fn try_lock_build(&self, document_id: &str) -> Result<BuildPermit>;
}

/// Exclusive build permit for one document; released on drop.
pub struct BuildPermit {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl BuildPermit {
    fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for BuildPermit {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for BuildPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildPermit").finish_non_exhaustive()
    }
}

/// Durable on-disk shape: the flat node array plus integrity metadata.
#[derive(Debug, Serialize, Deserialize)]
struct StructureFile {
    document_id: String,
    saved_at: DateTime<Utc>,
    /// SHA-256 over the serialized node array, verified on load.
    sha256: String,
    node_count: usize,
    nodes: Vec<Node>,
}

const STRUCTURE_FILE: &str = "structure.json";
const BUILD_LOCK_FILE: &str = ".build.lock";

/// Filesystem-backed store: one directory per document under a data root.
pub struct FsStore {
    root_dir: PathBuf,
}

impl FsStore {
    /// Create a store at the default data root.
    ///
    /// Resolution order: `DOCTREE_DATA_DIR`, then `XDG_DATA_HOME/doctree`,
    /// then `~/.doctree`.
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var("DOCTREE_DATA_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Self::with_root(PathBuf::from(trimmed));
            }
        }

        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            let trimmed = xdg.trim();
            if !trimmed.is_empty() {
                return Self::with_root(PathBuf::from(trimmed).join("doctree"));
            }
        }

        let base = directories::BaseDirs::new()
            .ok_or_else(|| Error::Storage("Failed to determine home directory".into()))?;
        Self::with_root(base.home_dir().join(".doctree"))
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_root(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir)
            .map_err(|e| Error::Storage(format!("Failed to create data root: {e}")))?;
        Ok(Self { root_dir })
    }

    /// The data root this store writes under.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn documents_dir(&self) -> PathBuf {
        self.root_dir.join("documents")
    }

    /// Directory holding one document's structure file and build lock.
    fn document_dir(&self, document_id: &str) -> Result<PathBuf> {
        Self::validate_document_id(document_id)?;
        Ok(self.documents_dir().join(document_id))
    }

    fn structure_path(&self, document_id: &str) -> Result<PathBuf> {
        Ok(self.document_dir(document_id)?.join(STRUCTURE_FILE))
    }

    /// Validate that a document id is safe to use as a directory name.
    fn validate_document_id(document_id: &str) -> Result<()> {
        if document_id.is_empty() {
            return Err(Error::Storage("Document id cannot be empty".into()));
        }
        if document_id.contains("..")
            || document_id.contains('/')
            || document_id.contains('\\')
        {
            return Err(Error::Storage(format!(
                "Invalid document id '{document_id}': contains path traversal characters"
            )));
        }
        if document_id.starts_with('.') || document_id.contains('\0') {
            return Err(Error::Storage(format!(
                "Invalid document id '{document_id}': contains invalid filesystem characters"
            )));
        }
        Ok(())
    }

    fn nodes_checksum(nodes: &[Node]) -> Result<String> {
        let bytes = serde_json::to_vec(nodes)?;
        let digest = Sha256::digest(&bytes);
        Ok(format!("{digest:x}"))
    }

    fn read_structure_file(path: &Path) -> Result<StructureFile> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read structure file: {e}")))?;
        let file: StructureFile = serde_json::from_str(&contents)?;

        let checksum = Self::nodes_checksum(&file.nodes)?;
        if checksum != file.sha256 {
            return Err(Error::Storage(format!(
                "Structure file for '{}' is corrupt: checksum mismatch",
                file.document_id
            )));
        }
        Ok(file)
    }

    /// Document ids that currently have a persisted structure.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let dir = self.documents_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&dir)
            .map_err(|e| Error::Storage(format!("Failed to list documents: {e}")))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::Storage(format!("Failed to list documents: {e}")))?;
            if entry.path().join(STRUCTURE_FILE).exists() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Scan persisted documents for the one holding `node_id`.
    fn find_document_of(&self, node_id: NodeId) -> Result<Option<Forest>> {
        for document_id in self.list_documents()? {
            let forest = self.load_forest(&document_id)?;
            if forest.get(node_id).is_some() {
                return Ok(Some(forest));
            }
        }
        Ok(None)
    }
}

impl NodeStore for FsStore {
    fn save_all(&self, forest: &Forest) -> Result<()> {
        let document_id = forest.document_id();
        let dir = self.document_dir(document_id)?;
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create document directory: {e}")))?;

        let file = StructureFile {
            document_id: document_id.to_string(),
            saved_at: Utc::now(),
            sha256: Self::nodes_checksum(forest.nodes())?,
            node_count: forest.len(),
            nodes: forest.nodes().to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // Write to a temp file in the same directory, then rename over the
        // final path: readers either see the old structure or the new one,
        // never a half-written file.
        let tmp = dir.join(format!("{STRUCTURE_FILE}.tmp"));
        let path = dir.join(STRUCTURE_FILE);
        fs::write(&tmp, json)
            .map_err(|e| Error::Storage(format!("Failed to write structure file: {e}")))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Storage(format!(
                "Failed to commit structure file: {e}"
            )));
        }

        info!(document_id, nodes = forest.len(), "saved document structure");
        Ok(())
    }

    fn load_forest(&self, document_id: &str) -> Result<Forest> {
        let path = self.structure_path(document_id)?;
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "no structure stored for document '{document_id}'"
            )));
        }

        let file = Self::read_structure_file(&path)?;
        debug!(document_id, nodes = file.nodes.len(), "loaded document structure");
        Ok(Forest::new(file.document_id, file.nodes))
    }

    fn load_node(&self, node_id: NodeId) -> Result<Option<Node>> {
        Ok(self
            .find_document_of(node_id)?
            .and_then(|forest| forest.get(node_id).cloned()))
    }

    fn load_subtree(&self, node_id: NodeId) -> Result<Vec<Node>> {
        let forest = self
            .find_document_of(node_id)?
            .ok_or_else(|| Error::NotFound(format!("no node with id '{node_id}'")))?;
        Ok(forest.subtree(node_id).into_iter().cloned().collect())
    }

    fn delete_all(&self, document_id: &str) -> Result<usize> {
        let dir = self.document_dir(document_id)?;
        let path = dir.join(STRUCTURE_FILE);
        if !path.exists() {
            // Idempotent: deleting an absent structure is a no-op success.
            return Ok(0);
        }

        let removed = match Self::read_structure_file(&path) {
            Ok(file) => file.node_count,
            Err(e) => {
                warn!(document_id, error = %e, "removing unreadable structure file");
                0
            },
        };

        fs::remove_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to delete document structure: {e}")))?;
        info!(document_id, removed, "deleted document structure");
        Ok(removed)
    }

    fn exists(&self, document_id: &str) -> Result<bool> {
        Ok(self.structure_path(document_id)?.exists())
    }

    fn try_lock_build(&self, document_id: &str) -> Result<BuildPermit> {
        let dir = self.document_dir(document_id)?;
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create document directory: {e}")))?;

        let lock_path = dir.join(BUILD_LOCK_FILE);
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Error::Storage(format!("Failed to open build lock: {e}")))?;

        if let Err(e) = lock_file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(Error::Conflict(document_id.to_string()));
            }
            return Err(Error::Storage(format!("Failed to acquire build lock: {e}")));
        }

        debug!(document_id, "acquired build lock");
        // The lock releases when the file handle drops; the lock file itself
        // stays behind, which is harmless.
        Ok(BuildPermit::new(move || drop(lock_file)))
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<Node>>>,
    building: Arc<Mutex<HashSet<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_forest(&self, document_id: &str) -> Result<Forest> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        documents
            .get(document_id)
            .map(|nodes| Forest::new(document_id, nodes.clone()))
            .ok_or_else(|| {
                Error::NotFound(format!("no structure stored for document '{document_id}'"))
            })
    }

    fn find_document_of(&self, node_id: NodeId) -> Result<Option<Forest>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        for (document_id, nodes) in documents.iter() {
            if nodes.iter().any(|n| n.id == node_id) {
                return Ok(Some(Forest::new(document_id.clone(), nodes.clone())));
            }
        }
        Ok(None)
    }
}

impl NodeStore for MemoryStore {
    fn save_all(&self, forest: &Forest) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        documents.insert(forest.document_id().to_string(), forest.nodes().to_vec());
        Ok(())
    }

    fn load_forest(&self, document_id: &str) -> Result<Forest> {
        self.read_forest(document_id)
    }

    fn load_node(&self, node_id: NodeId) -> Result<Option<Node>> {
        Ok(self
            .find_document_of(node_id)?
            .and_then(|forest| forest.get(node_id).cloned()))
    }

    fn load_subtree(&self, node_id: NodeId) -> Result<Vec<Node>> {
        let forest = self
            .find_document_of(node_id)?
            .ok_or_else(|| Error::NotFound(format!("no node with id '{node_id}'")))?;
        Ok(forest.subtree(node_id).into_iter().cloned().collect())
    }

    fn delete_all(&self, document_id: &str) -> Result<usize> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        Ok(documents.remove(document_id).map_or(0, |nodes| nodes.len()))
    }

    fn exists(&self, document_id: &str) -> Result<bool> {
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        Ok(documents.contains_key(document_id))
    }

    fn try_lock_build(&self, document_id: &str) -> Result<BuildPermit> {
        let mut building = self
            .building
            .lock()
            .map_err(|_| Error::Storage("store lock poisoned".into()))?;
        if !building.insert(document_id.to_string()) {
            return Err(Error::Conflict(document_id.to_string()));
        }

        let set = Arc::clone(&self.building);
        let id = document_id.to_string();
        Ok(BuildPermit::new(move || {
            if let Ok(mut building) = set.lock() {
                building.remove(&id);
            }
        }))
    }
}
