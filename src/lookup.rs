//! Adaptive lookup tree keyed by quadkeys.
//!
//! [`QuadLookup`] stores payloads tagged with a fine quadkey and answers the
//! two spatial questions without touching raw coordinates: which stored items
//! fall inside a coarse area ([`QuadLookup::items_within`]) and which stored
//! region contains a fine position ([`QuadLookup::item_containing`]).
//!
//! The tree starts as a single bucket at `min_zoom` and subdivides lazily:
//! once a bucket below `max_zoom` would exceed `branch_limit` entries it
//! splits into four children one digit deeper and redistributes. Geographic
//! data is rarely spread evenly, so the tree stays shallow where data is
//! sparse and only pays for depth in dense cells; at `max_zoom` buckets grow
//! without limit. Entries are never removed; the index only grows.
//!
//! The tree is not internally synchronized. `add` takes `&mut self`, so
//! single-writer discipline is enforced at compile time; to share it across
//! threads, wrap the whole tree in a lock (see [`crate::CachedDeclination`]
//! for the reference pattern).

use crate::error::{QuadError, Result};
use crate::projection::MAX_ZOOM;
use crate::quad::Quad;
use rustc_hash::FxHashMap;

/// One stored payload with its quadkey tag.
struct Entry<T> {
    quad: Quad,
    item: T,
}

/// A tree level: either a terminal bucket of entries or a branch of children
/// keyed by quad prefixes one digit deeper than the parent's key.
enum Node<T> {
    Leaf(Vec<Entry<T>>),
    Branch(FxHashMap<Quad, Node<T>>),
}

/// Adaptive index of quadkey-tagged items.
///
/// Configuration is fixed at construction: `min_zoom` is the entry level of
/// the tree, `max_zoom` the deepest level content is stored at (and the
/// resolution contract for keys), `branch_limit` the bucket size that
/// triggers a split below `max_zoom`.
///
/// # Examples
///
/// ```rust
/// use quadtile::{Quad, QuadLookup};
///
/// let mut tree: QuadLookup<&str> = QuadLookup::new(3, 5, 4);
/// tree.add("01100".parse()?, "airport A")?;
/// tree.add("01102".parse()?, "airport B")?;
///
/// let area: Quad = "011".parse()?;
/// assert_eq!(tree.items_within(area)?.len(), 2);
/// assert_eq!(tree.item_containing("01102".parse()?)?, Some(&"airport B"));
/// # Ok::<(), quadtile::QuadError>(())
/// ```
pub struct QuadLookup<T> {
    root: Node<T>,
    min_zoom: u8,
    max_zoom: u8,
    branch_limit: usize,
    count: usize,
    max_level: u8,
}

impl<T> QuadLookup<T> {
    /// Create a tree spanning `min_zoom..=max_zoom` levels.
    ///
    /// Values are clamped rather than rejected: `min_zoom` into `[1, 23]`,
    /// `max_zoom` into `[min_zoom, 23]`, and `branch_limit` into
    /// `[max_zoom, 4^max_zoom]`.
    pub fn new(min_zoom: u8, max_zoom: u8, branch_limit: usize) -> Self {
        let min_zoom = min_zoom.clamp(1, MAX_ZOOM);
        let max_zoom = max_zoom.clamp(min_zoom, MAX_ZOOM);
        let branch_limit = branch_limit.clamp(max_zoom as usize, 1usize << (2 * max_zoom as u32));

        Self {
            root: Node::Leaf(Vec::new()),
            min_zoom,
            max_zoom,
            branch_limit,
            count: 0,
            max_level: 0,
        }
    }

    /// Entry level of the tree.
    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    /// Deepest level content is stored at; also the resolution contract for
    /// keys passed to [`QuadLookup::add`] and [`QuadLookup::item_containing`].
    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Bucket size that triggers a split below `max_zoom`.
    pub fn branch_limit(&self) -> usize {
        self.branch_limit
    }

    /// Number of items stored.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Deepest level any item has actually been stored at; 0 before the
    /// first add.
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Store `item` under `quad` and return the level it landed at.
    ///
    /// The key must be at least as fine as the tree's resolution:
    /// `quad.zoom() >= max_zoom`, otherwise [`QuadError::InvalidInput`].
    pub fn add(&mut self, quad: Quad, item: T) -> Result<u8> {
        if quad.zoom() < self.max_zoom {
            log::warn!(
                "rejecting add of quad '{quad}' at zoom {}: tree max zoom is {}",
                quad.zoom(),
                self.max_zoom
            );
            return Err(QuadError::InvalidInput(format!(
                "quad zoom {} is shallower than the tree max zoom {}",
                quad.zoom(),
                self.max_zoom
            )));
        }

        let stored_at = add_node(
            &mut self.root,
            self.min_zoom,
            self.max_zoom,
            self.branch_limit,
            quad,
            item,
        );
        self.count += 1;
        self.max_level = self.max_level.max(stored_at);
        Ok(stored_at)
    }

    /// All items whose key is part of `area` (the coarse-or-equal
    /// containment query). The key may be no finer than the library-wide
    /// maximum zoom; an empty result is a normal outcome.
    pub fn items_within(&self, area: Quad) -> Result<Vec<&T>> {
        if area.zoom() > MAX_ZOOM {
            log::warn!(
                "rejecting containment query '{area}' at zoom {}: deeper than max zoom {MAX_ZOOM}",
                area.zoom()
            );
            return Err(QuadError::InvalidInput(format!(
                "query zoom {} exceeds the maximum zoom {MAX_ZOOM}",
                area.zoom()
            )));
        }

        let mut out = Vec::new();
        query_within(&self.root, self.min_zoom, area, &mut out);
        Ok(out)
    }

    /// The stored item (if any) whose key includes `quad` (the fine-position
    /// ancestor lookup). The key must satisfy `quad.zoom() >= max_zoom`.
    ///
    /// When several stored regions overlap the position, the first match in
    /// the bucket scan wins; the tie-break is unspecified.
    pub fn item_containing(&self, quad: Quad) -> Result<Option<&T>> {
        if quad.zoom() < self.max_zoom {
            log::warn!(
                "rejecting ancestor lookup of quad '{quad}' at zoom {}: tree max zoom is {}",
                quad.zoom(),
                self.max_zoom
            );
            return Err(QuadError::InvalidInput(format!(
                "quad zoom {} is shallower than the tree max zoom {}",
                quad.zoom(),
                self.max_zoom
            )));
        }

        Ok(query_containing(&self.root, self.min_zoom, quad))
    }
}

/// Recursive insert. `level` is the zoom of `node`; a leaf stores at
/// `level`, a branch keys children by `quad.at_zoom(level)` with the
/// children one level deeper.
fn add_node<T>(
    node: &mut Node<T>,
    level: u8,
    max_zoom: u8,
    branch_limit: usize,
    quad: Quad,
    item: T,
) -> u8 {
    match node {
        Node::Leaf(entries) => {
            if level == max_zoom || entries.len() < branch_limit {
                entries.push(Entry { quad, item });
                return level;
            }

            // capacity exceeded below max zoom: subdivide once, permanently
            log::trace!("splitting bucket at level {level} holding {} entries", entries.len());
            let drained = std::mem::take(entries);
            *node = Node::Branch(FxHashMap::default());
            for e in drained {
                add_node(node, level, max_zoom, branch_limit, e.quad, e.item);
            }
            add_node(node, level, max_zoom, branch_limit, quad, item)
        }
        Node::Branch(children) => {
            let key = quad.at_zoom(level);
            let child = children.entry(key).or_insert_with(|| Node::Leaf(Vec::new()));
            add_node(child, level + 1, max_zoom, branch_limit, quad, item)
        }
    }
}

/// Recursive coarse-or-equal query. While the query is finer than the
/// current level the answer can only live in the single matching child;
/// once at or above the query's resolution, answer locally.
fn query_within<'a, T>(node: &'a Node<T>, level: u8, area: Quad, out: &mut Vec<&'a T>) {
    if area.zoom() > level
        && let Node::Branch(children) = node
        && let Some(child) = children.get(&area.at_zoom(level))
    {
        query_within(child, level + 1, area, out);
        return;
    }

    match node {
        Node::Leaf(entries) => {
            out.extend(entries.iter().filter(|e| e.quad.is_part_of(area)).map(|e| &e.item));
        }
        Node::Branch(children) => {
            for (key, child) in children {
                if key.is_part_of(area) {
                    collect_all(child, out);
                }
            }
        }
    }
}

fn collect_all<'a, T>(node: &'a Node<T>, out: &mut Vec<&'a T>) {
    match node {
        Node::Leaf(entries) => out.extend(entries.iter().map(|e| &e.item)),
        Node::Branch(children) => {
            for child in children.values() {
                collect_all(child, out);
            }
        }
    }
}

/// Recursive fine-position ancestor lookup, the mirror image of
/// [`query_within`]: the query is always finer than any branch level, so it
/// descends by truncation and can only be answered in a bucket.
fn query_containing<'a, T>(node: &'a Node<T>, level: u8, quad: Quad) -> Option<&'a T> {
    match node {
        Node::Leaf(entries) => entries.iter().find(|e| e.quad.includes(quad)).map(|e| &e.item),
        Node::Branch(children) => children
            .get(&quad.at_zoom(level))
            .and_then(|child| query_containing(child, level + 1, quad)),
    }
}
