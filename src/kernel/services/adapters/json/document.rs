//! Shared, mutable JSON document with stable fragment references.
//!
//! A `DataRef` is a token for a path into the document. Structural edits keep the
//! table in sync (sibling indices shift, removed subtrees drop their tokens), so a
//! token keeps naming the same fragment. Reloading clears the table; old tokens then
//! fail to resolve, which is how stale writers are detected.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::DataRef;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(CompactString),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    UnknownRef(DataRef),
    NotAnObject(DataRef),
    NotAContainer(CompactString),
    UnknownContainer(CompactString),
    ChildNotAnObject,
    RootRemoval,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::UnknownRef(data_ref) => {
                write!(f, "reference {} does not resolve", data_ref)
            }
            DocumentError::NotAnObject(data_ref) => {
                write!(f, "fragment {} is not an object", data_ref)
            }
            DocumentError::NotAContainer(key) => write!(f, "property {} is not an array", key),
            DocumentError::UnknownContainer(key) => {
                write!(f, "property {} is not a configured child container", key)
            }
            DocumentError::ChildNotAnObject => write!(f, "child fragments must be objects"),
            DocumentError::RootRemoval => write!(f, "the document root cannot be removed"),
        }
    }
}

impl std::error::Error for DocumentError {}

struct DocumentInner {
    root: Value,
    paths: FxHashMap<DataRef, Vec<Segment>>,
    by_path: FxHashMap<Vec<Segment>, DataRef>,
    next_ref: u64,
    generation: u64,
}

impl DocumentInner {
    fn intern(&mut self, path: Vec<Segment>) -> DataRef {
        if let Some(&data_ref) = self.by_path.get(&path) {
            return data_ref;
        }
        let data_ref = DataRef::new(self.next_ref);
        self.next_ref += 1;
        self.by_path.insert(path.clone(), data_ref);
        self.paths.insert(data_ref, path);
        data_ref
    }

    fn resolve(&self, data_ref: DataRef) -> Option<&Value> {
        let path = self.paths.get(&data_ref)?;
        walk(&self.root, path)
    }

    fn resolve_mut(&mut self, data_ref: DataRef) -> Option<&mut Value> {
        let path = self.paths.get(&data_ref)?;
        walk_mut(&mut self.root, path)
    }

    /// Applies `delta` to the index segment right below `parent` for every tracked
    /// path whose index there is `>= from`.
    fn shift_indices(&mut self, parent: &[Segment], from: usize, delta: isize) {
        let depth = parent.len();
        let mut rewritten = Vec::new();
        for (&data_ref, path) in self.paths.iter() {
            if path.len() <= depth || path[..depth] != *parent {
                continue;
            }
            if let Segment::Index(i) = path[depth] {
                if i >= from {
                    rewritten.push((data_ref, path.clone(), i));
                }
            }
        }
        for (data_ref, old, i) in &rewritten {
            self.by_path.remove(old);
            let mut path = old.clone();
            path[depth] = Segment::Index(i.saturating_add_signed(delta));
            self.paths.insert(*data_ref, path);
        }
        for (data_ref, _, _) in rewritten {
            if let Some(path) = self.paths.get(&data_ref) {
                self.by_path.insert(path.clone(), data_ref);
            }
        }
    }

    fn forget_subtree(&mut self, prefix: &[Segment]) {
        let depth = prefix.len();
        self.paths.retain(|_, path| path.len() < depth || path[..depth] != *prefix);
        self.by_path
            .retain(|path, _| path.len() < depth || path[..depth] != *prefix);
    }
}

fn walk<'a>(mut value: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    for segment in path {
        value = match segment {
            Segment::Key(key) => value.as_object()?.get(key.as_str())?,
            Segment::Index(i) => value.as_array()?.get(*i)?,
        };
    }
    Some(value)
}

fn walk_mut<'a>(mut value: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    for segment in path {
        value = match segment {
            Segment::Key(key) => value.as_object_mut()?.get_mut(key.as_str())?,
            Segment::Index(i) => value.as_array_mut()?.get_mut(*i)?,
        };
    }
    Some(value)
}

/// Object elements of the listed arrays, in container order then array order.
pub(crate) fn child_slots<'a>(
    value: &'a Value,
    container_keys: &'a [CompactString],
) -> impl Iterator<Item = (&'a CompactString, usize, &'a Value)> + 'a {
    container_keys.iter().flat_map(move |key| {
        value
            .get(key.as_str())
            .and_then(Value::as_array)
            .into_iter()
            .flat_map(|items| items.iter().enumerate())
            .filter(|(_, item)| item.is_object())
            .map(move |(i, item)| (key, i, item))
    })
}

#[derive(Clone)]
pub struct JsonDocument {
    inner: Arc<RwLock<DocumentInner>>,
}

impl JsonDocument {
    pub fn new(root: Value) -> Self {
        let mut inner = DocumentInner {
            root,
            paths: FxHashMap::default(),
            by_path: FxHashMap::default(),
            next_ref: 0,
            generation: 0,
        };
        inner.intern(Vec::new());
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    // Writers never leave the tree half-edited, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, DocumentInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DocumentInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn root_ref(&self) -> DataRef {
        self.write().intern(Vec::new())
    }

    pub fn snapshot(&self) -> Value {
        self.read().root.clone()
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn get(&self, data_ref: DataRef) -> Option<Value> {
        self.read().resolve(data_ref).cloned()
    }

    pub fn path_of(&self, data_ref: DataRef) -> Option<Vec<Segment>> {
        self.read().paths.get(&data_ref).cloned()
    }

    /// Resolves an RFC 6901 pointer and returns the reference for it.
    pub fn ref_for_pointer(&self, pointer: &str) -> Option<DataRef> {
        let mut inner = self.write();
        let mut path = Vec::new();
        let mut current = &inner.root;
        if !pointer.is_empty() {
            for raw in pointer.strip_prefix('/')?.split('/') {
                let token = raw.replace("~1", "/").replace("~0", "~");
                let segment = match current {
                    Value::Array(items) => {
                        let i = token.parse::<usize>().ok()?;
                        current = items.get(i)?;
                        Segment::Index(i)
                    }
                    Value::Object(map) => {
                        current = map.get(&token)?;
                        Segment::Key(token.into())
                    }
                    _ => return None,
                };
                path.push(segment);
            }
        }
        Some(inner.intern(path))
    }

    /// References and values of `data_ref`'s child objects.
    pub fn children_of(
        &self,
        data_ref: DataRef,
        container_keys: &[CompactString],
    ) -> Result<Vec<(DataRef, Value)>, DocumentError> {
        let mut inner = self.write();
        let path = inner
            .paths
            .get(&data_ref)
            .cloned()
            .ok_or(DocumentError::UnknownRef(data_ref))?;
        let value = walk(&inner.root, &path).ok_or(DocumentError::UnknownRef(data_ref))?;

        let slots: Vec<(CompactString, usize, Value)> = child_slots(value, container_keys)
            .map(|(key, i, item)| (key.clone(), i, item.clone()))
            .collect();

        Ok(slots
            .into_iter()
            .map(|(key, i, item)| {
                let mut child_path = path.clone();
                child_path.push(Segment::Key(key));
                child_path.push(Segment::Index(i));
                (inner.intern(child_path), item)
            })
            .collect())
    }

    /// Runs `f` on the object behind `data_ref`.
    pub fn update_object<R>(
        &self,
        data_ref: DataRef,
        f: impl FnOnce(&mut serde_json::Map<String, Value>) -> R,
    ) -> Result<R, DocumentError> {
        let mut inner = self.write();
        let value = inner
            .resolve_mut(data_ref)
            .ok_or(DocumentError::UnknownRef(data_ref))?;
        let object = value
            .as_object_mut()
            .ok_or(DocumentError::NotAnObject(data_ref))?;
        let result = f(object);
        inner.generation += 1;
        Ok(result)
    }

    /// Appends `fragment` to `parent[container]`, creating the array if missing.
    /// Returns the new reference and the fragment's position among the parent's
    /// child objects, which run through `container_keys` in order.
    pub fn append_child(
        &self,
        parent: DataRef,
        container: &CompactString,
        fragment: Value,
        container_keys: &[CompactString],
    ) -> Result<(DataRef, usize), DocumentError> {
        let rank = container_keys
            .iter()
            .position(|key| key == container)
            .ok_or_else(|| DocumentError::UnknownContainer(container.clone()))?;
        if !fragment.is_object() {
            return Err(DocumentError::ChildNotAnObject);
        }

        let mut inner = self.write();
        let parent_path = inner
            .paths
            .get(&parent)
            .cloned()
            .ok_or(DocumentError::UnknownRef(parent))?;
        let parent_value = walk(&inner.root, &parent_path).ok_or(DocumentError::UnknownRef(parent))?;
        // Everything in earlier containers plus the current tail of this one.
        let index = child_slots(parent_value, &container_keys[..=rank]).count();

        let object = walk_mut(&mut inner.root, &parent_path)
            .ok_or(DocumentError::UnknownRef(parent))?
            .as_object_mut()
            .ok_or(DocumentError::NotAnObject(parent))?;
        let items = object
            .entry(container.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| DocumentError::NotAContainer(container.clone()))?;
        items.push(fragment);
        let array_index = items.len() - 1;

        let mut child_path = parent_path;
        child_path.push(Segment::Key(container.clone()));
        child_path.push(Segment::Index(array_index));
        let data_ref = inner.intern(child_path);
        inner.generation += 1;
        Ok((data_ref, index))
    }

    /// Removes the fragment behind `data_ref` from its parent array or object.
    pub fn remove(&self, data_ref: DataRef) -> Result<(), DocumentError> {
        let mut inner = self.write();
        let path = inner
            .paths
            .get(&data_ref)
            .cloned()
            .ok_or(DocumentError::UnknownRef(data_ref))?;
        let (last, parent_path) = path.split_last().ok_or(DocumentError::RootRemoval)?;
        let container =
            walk_mut(&mut inner.root, parent_path).ok_or(DocumentError::UnknownRef(data_ref))?;

        match (last, container) {
            (Segment::Index(i), Value::Array(items)) if *i < items.len() => {
                items.remove(*i);
                let i = *i;
                inner.forget_subtree(&path);
                inner.shift_indices(parent_path, i + 1, -1);
            }
            (Segment::Key(key), Value::Object(map)) if map.contains_key(key.as_str()) => {
                map.remove(key.as_str());
                inner.forget_subtree(&path);
            }
            _ => return Err(DocumentError::UnknownRef(data_ref)),
        }
        inner.generation += 1;
        Ok(())
    }

    /// Swaps in a freshly loaded document and returns the new root reference.
    /// Every previously issued reference stops resolving.
    pub fn reload(&self, root: Value) -> DataRef {
        let mut inner = self.write();
        inner.root = root;
        inner.paths.clear();
        inner.by_path.clear();
        inner.generation += 1;
        inner.intern(Vec::new())
    }
}
