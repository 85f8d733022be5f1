//! The B-tree engine.
//!
//! Insertion uses proactive splitting: a full child is split before the
//! descent enters it, so no node ever has to hold more than `MAX_KEYS`
//! keys, and the tree only grows in height when the root itself is split.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::buffer::{PageCache, StatsSnapshot};
use crate::common::config::{CACHE_CAPACITY, MAX_HEIGHT};
use crate::common::{BlockId, Durability, Error, Result};
use crate::index::btree::interchange::{self, LoadReport};
use crate::storage::block::{Header, Node};
use crate::storage::BlockStore;

/// Lifecycle state of a [`BTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// No file attached. Every operation except create/open fails with `NotOpen`.
    Closed,
    /// File attached, no root allocated yet.
    Empty,
    /// File attached, at least one entry stored.
    NonEmpty,
}

/// A disk-resident B-tree mapping unique `u64` keys to `u64` values.
///
/// # State
/// ```text
///            create / open
///  Closed ─────────────────▶ Open { Empty ──insert──▶ NonEmpty }
///    ▲                                  │
///    └──────────── close ───────────────┘
/// ```
///
/// # Failure
/// Every error is returned as a value. An I/O failure in the middle of a
/// split can still leave some of the rewritten nodes on disk and others
/// not: there is no multi-block atomic commit.
///
/// # Usage
/// ```no_run
/// use blocktree::BTree;
///
/// let mut tree = BTree::new();
/// tree.create("numbers.idx", false)?;
/// tree.insert(5, 50)?;
/// assert_eq!(tree.search(5)?, 50);
/// tree.extract("numbers.csv")?;
/// tree.close();
/// # Ok::<(), blocktree::Error>(())
/// ```
#[derive(Default)]
pub struct BTree {
    durability: Durability,
    open: Option<OpenTree>,
}

/// Engine state for one attached file.
struct OpenTree {
    path: PathBuf,
    header: Header,
    cache: PageCache,
}

impl BTree {
    /// Create a closed tree with [`Durability::Sync`] writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a closed tree whose files will use `durability`.
    pub fn with_durability(durability: Durability) -> Self {
        Self {
            durability,
            open: None,
        }
    }

    // ========================================================================
    // Public API: File lifecycle
    // ========================================================================

    /// Create a new index file and attach to it.
    ///
    /// Any previously attached file is closed once the new one exists.
    ///
    /// # Errors
    /// - `Error::AlreadyExists` if `path` exists and `overwrite` is false
    /// - I/O errors from creating the file
    pub fn create<P: AsRef<Path>>(&mut self, path: P, overwrite: bool) -> Result<()> {
        let store = BlockStore::create(&path, overwrite, self.durability)?;
        self.attach(store, Header::new());
        Ok(())
    }

    /// Open and validate an existing index file and attach to it.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if `path` does not exist
    /// - `Error::InvalidFormat` if the header is missing or malformed
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let (store, header) = BlockStore::open(&path, self.durability)?;
        self.attach(store, header);
        Ok(())
    }

    /// Release the file handle. Closing a closed tree is a no-op.
    pub fn close(&mut self) {
        if let Some(tree) = self.open.take() {
            info!(
                path = %tree.path.display(),
                stats = %tree.cache.stats().snapshot(),
                "btree.closed"
            );
        }
    }

    fn attach(&mut self, store: BlockStore, header: Header) {
        self.close();
        self.open = Some(OpenTree {
            path: store.path().to_path_buf(),
            header,
            cache: PageCache::new(store, CACHE_CAPACITY),
        });
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    pub fn state(&self) -> TreeState {
        match &self.open {
            None => TreeState::Closed,
            Some(tree) if tree.header.is_empty() => TreeState::Empty,
            Some(_) => TreeState::NonEmpty,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Path of the attached file.
    pub fn path(&self) -> Result<&Path> {
        Ok(self.tree()?.path.as_path())
    }

    /// In-memory copy of the file header (always equal to block 0).
    pub fn header(&self) -> Result<Header> {
        Ok(self.tree()?.header)
    }

    /// Read one node through the cache.
    pub fn node(&self, block_id: BlockId) -> Result<Node> {
        self.tree()?.cache.get(block_id)
    }

    /// Number of levels; 0 for an empty tree.
    pub fn height(&self) -> Result<usize> {
        let tree = self.tree()?;
        let mut height = 0;
        let mut next = tree.header.root_id;
        while !next.is_none() {
            next = tree.fetch(next, height)?.children[0];
            height += 1;
        }
        Ok(height)
    }

    pub fn cache_stats(&self) -> Result<StatsSnapshot> {
        Ok(self.tree()?.cache.stats().snapshot())
    }

    // ========================================================================
    // Public API: Operations
    // ========================================================================

    /// Insert a new entry.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is already stored; the tree is unchanged
    /// - `Error::NotOpen` on a closed tree
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        self.tree_mut()?.insert(key, value)
    }

    /// Look up the value stored for `key`.
    ///
    /// # Errors
    /// - `Error::KeyNotFound` if `key` is absent
    /// - `Error::NotOpen` on a closed tree
    pub fn search(&self, key: u64) -> Result<u64> {
        self.tree()?.search(key)
    }

    pub fn contains(&self, key: u64) -> Result<bool> {
        match self.search(key) {
            Ok(_) => Ok(true),
            Err(Error::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Visit every entry in ascending key order.
    ///
    /// Stops at the first error returned by `f`.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(u64, u64) -> Result<()>,
    {
        let tree = self.tree()?;
        if tree.header.is_empty() {
            return Ok(());
        }
        tree.walk(tree.header.root_id, 0, &mut HashSet::new(), &mut f)
    }

    /// All entries in ascending key order.
    pub fn entries(&self) -> Result<Vec<(u64, u64)>> {
        let mut entries = Vec::new();
        self.for_each(|key, value| {
            entries.push((key, value));
            Ok(())
        })?;
        Ok(entries)
    }

    /// Number of stored entries. Walks the whole tree.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        self.for_each(|_, _| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.tree()?.header.is_empty())
    }

    /// Write every entry to `out` as `"Key: <k>, Value: <v>"` lines.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        self.for_each(|key, value| {
            writeln!(out, "Key: {}, Value: {}", key, value)?;
            Ok(())
        })
    }

    /// Write every entry to `path` as `"<k>,<v>"` lines, replacing any
    /// existing file. Returns the number of lines written.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.tree()?;

        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        let mut written = 0;
        self.for_each(|key, value| {
            interchange::write_line(&mut out, key, value)?;
            written += 1;
            Ok(())
        })?;
        out.flush()?;

        info!(path = %path.display(), entries = written, "btree.extracted");
        Ok(written)
    }

    /// Insert every `"<k>,<v>"` line of `path`, skipping keys already stored.
    ///
    /// Lines are inserted one at a time through [`insert`](Self::insert).
    ///
    /// # Errors
    /// Aborts on the first unreadable or malformed line with
    /// `Error::Io` or `Error::MalformedInput`. Lines before it stay inserted.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        self.tree()?;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let mut report = LoadReport::default();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let (key, value) = interchange::parse_line(idx + 1, &line)?;

            match self.insert(key, value) {
                Ok(()) => report.inserted += 1,
                Err(Error::DuplicateKey(key)) => {
                    warn!(key, line = idx + 1, "btree.load.skip_duplicate");
                    report.skipped.push(key);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            path = %path.display(),
            inserted = report.inserted,
            skipped = report.skipped.len(),
            "btree.loaded"
        );
        Ok(report)
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn tree(&self) -> Result<&OpenTree> {
        self.open.as_ref().ok_or(Error::NotOpen)
    }

    fn tree_mut(&mut self) -> Result<&mut OpenTree> {
        self.open.as_mut().ok_or(Error::NotOpen)
    }
}

impl OpenTree {
    fn search(&self, key: u64) -> Result<u64> {
        if self.header.is_empty() {
            return Err(Error::KeyNotFound(key));
        }

        let mut depth = 0;
        let mut node = self.fetch(self.header.root_id, depth)?;
        loop {
            depth += 1;
            match node.find(key) {
                Ok(i) => return Ok(node.values[i]),
                Err(_) if node.is_leaf() => return Err(Error::KeyNotFound(key)),
                Err(i) => node = self.fetch(node.children[i], depth)?,
            }
        }
    }

    fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        match self.search(key) {
            Ok(_) => return Err(Error::DuplicateKey(key)),
            Err(Error::KeyNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        if self.header.is_empty() {
            let mut root = self.allocate()?;
            root.insert_entry(0, key, value);
            self.cache.put(&root)?;
            return self.set_root(root.block_id);
        }

        let mut root = self.fetch(self.header.root_id, 0)?;
        if root.is_full() {
            let mut new_root = self.allocate()?;
            new_root.children[0] = root.block_id;
            self.split_child(&mut new_root, 0, &mut root)?;
            self.set_root(new_root.block_id)?;
            debug!(root = new_root.block_id.0, "btree.root_split");
            root = new_root;
        }

        self.insert_non_full(root, key, value)
    }

    /// Descend from `node`, which has room for one more key, splitting any
    /// full child before entering it.
    fn insert_non_full(&mut self, mut node: Node, key: u64, value: u64) -> Result<()> {
        let mut depth = 0;
        loop {
            depth += 1;
            let pos = match node.find(key) {
                Ok(_) => return Err(Error::DuplicateKey(key)),
                Err(pos) => pos,
            };

            if node.is_leaf() {
                node.insert_entry(pos, key, value);
                return self.cache.put(&node);
            }

            let mut child = self.fetch(node.children[pos], depth)?;
            if child.is_full() {
                let sibling = self.split_child(&mut node, pos, &mut child)?;
                match key.cmp(&node.keys[pos]) {
                    std::cmp::Ordering::Greater => child = sibling,
                    std::cmp::Ordering::Equal => return Err(Error::DuplicateKey(key)),
                    std::cmp::Ordering::Less => {}
                }
            }
            node = child;
        }
    }

    /// Split the full `child` at `parent.children[index]`, promoting its
    /// median into `parent`. Persists all three nodes and returns the new
    /// right sibling.
    fn split_child(&mut self, parent: &mut Node, index: usize, child: &mut Node) -> Result<Node> {
        let mut sibling = self.allocate()?;
        let (key, value) = child.split_upper_into(&mut sibling);

        child.parent_id = parent.block_id;
        sibling.parent_id = parent.block_id;
        parent.insert_separator(index, key, value, sibling.block_id);

        self.cache.put(child)?;
        self.cache.put(&sibling)?;
        self.cache.put(parent)?;

        debug!(
            parent = parent.block_id.0,
            left = child.block_id.0,
            right = sibling.block_id.0,
            median = key,
            "btree.split"
        );
        Ok(sibling)
    }

    /// Hand out the next block id. The bumped counter is on disk before the
    /// id is used, so it can never be handed out twice.
    fn allocate(&mut self) -> Result<Node> {
        let block_id = self.header.next_block_id;
        let next_block_id = block_id
            .next()
            .ok_or_else(|| Error::InvalidFormat("block ids exhausted".into()))?;
        let header = Header {
            next_block_id,
            ..self.header
        };
        self.cache.write_header(&header)?;
        self.header = header;

        debug!(block = block_id.0, "btree.allocate");
        Ok(Node::new(block_id))
    }

    fn set_root(&mut self, root_id: BlockId) -> Result<()> {
        let header = Header {
            root_id,
            ..self.header
        };
        self.cache.write_header(&header)?;
        self.header = header;
        Ok(())
    }

    /// Read the node at `block_id`, `depth` levels below the root.
    ///
    /// Ids at or past the allocation counter and descents deeper than
    /// `MAX_HEIGHT` can only come from a corrupt file.
    fn fetch(&self, block_id: BlockId, depth: usize) -> Result<Node> {
        if block_id >= self.header.next_block_id {
            return Err(Error::InvalidFormat(format!(
                "{} is past the last allocated block",
                block_id
            )));
        }
        if depth >= MAX_HEIGHT {
            return Err(Error::InvalidFormat(format!(
                "{} is more than {} levels deep",
                block_id, MAX_HEIGHT
            )));
        }
        self.cache.get(block_id)
    }

    /// In-order walk of the subtree rooted at `block_id`.
    ///
    /// `visited` catches child pointers that lead back into the tree.
    fn walk<F>(
        &self,
        block_id: BlockId,
        depth: usize,
        visited: &mut HashSet<BlockId>,
        f: &mut F,
    ) -> Result<()>
    where
        F: FnMut(u64, u64) -> Result<()>,
    {
        if !visited.insert(block_id) {
            return Err(Error::InvalidFormat(format!("{} is reachable twice", block_id)));
        }

        let node = self.fetch(block_id, depth)?;
        for i in 0..node.num_keys {
            if !node.children[i].is_none() {
                self.walk(node.children[i], depth + 1, visited, f)?;
            }
            f(node.keys[i], node.values[i])?;
        }
        if !node.children[node.num_keys].is_none() {
            self.walk(node.children[node.num_keys], depth + 1, visited, f)?;
        }
        Ok(())
    }
}
