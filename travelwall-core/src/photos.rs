use std::collections::HashMap;
use std::fmt;

/// Opaque, revocable reference to in-memory image data. In the browser this
/// is an object URL. Not `Clone`: [`ResourceStore::revoke`] consumes it, so a
/// handle can be released at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        ResourceHandle(url.into())
    }

    /// URL usable as an `<img src>` while the handle is alive.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A picked file that can be turned into a handle.
pub trait PhotoSource {
    fn file_name(&self) -> String;
}

/// Platform file paired with the name it was picked under. Lets a shell
/// hand any file type to the wall without implementing [`PhotoSource`]
/// on a type it does not own.
#[derive(Clone, Debug)]
pub struct PickedFile<T> {
    pub name: String,
    pub file: T,
}

impl<T> PickedFile<T> {
    pub fn new(name: impl Into<String>, file: T) -> Self {
        PickedFile {
            name: name.into(),
            file,
        }
    }
}

impl<T> PhotoSource for PickedFile<T> {
    fn file_name(&self) -> String {
        self.name.clone()
    }
}

/// Creates and releases resource handles.
pub trait ResourceStore {
    type Source: PhotoSource + ?Sized;

    /// `None` when the backing store refuses the data.
    fn create(&mut self, source: &Self::Source) -> Option<ResourceHandle>;

    fn revoke(&mut self, handle: ResourceHandle);
}

/// Photo attached to one country.
#[derive(Debug, PartialEq, Eq)]
pub struct PhotoRecord {
    pub handle: ResourceHandle,
    pub file_name: String,
}

impl PhotoRecord {
    pub fn url(&self) -> &str {
        self.handle.as_str()
    }
}

/// Country id → photo. At most one record per id.
#[derive(Debug, Default)]
pub struct PhotoRegistry {
    by_id: HashMap<String, PhotoRecord>,
}

impl PhotoRegistry {
    pub fn get(&self, id: &str) -> Option<&PhotoRecord> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub(crate) fn insert(&mut self, id: String, record: PhotoRecord) {
        self.by_id.insert(id, record);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<PhotoRecord> {
        self.by_id.remove(id)
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (String, PhotoRecord)> + '_ {
        self.by_id.drain()
    }
}

/// File held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        MemoryFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl PhotoSource for MemoryFile {
    fn file_name(&self) -> String {
        self.name.clone()
    }
}

/// What happened to a handle, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Created(String),
    Revoked(String),
}

/// In-memory store keeping the bytes behind each live handle. Records every
/// create/revoke so callers can check release ordering and leaks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) next: u64,
    pub(crate) live: HashMap<String, Vec<u8>>,
    pub(crate) events: Vec<StoreEvent>,
    pub(crate) stale_revokes: usize,
    /// When set, `create` refuses empty files.
    pub reject_empty: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains_key(url)
    }

    pub fn bytes(&self, url: &str) -> Option<&[u8]> {
        self.live.get(url).map(Vec::as_slice)
    }

    pub fn events(&self) -> &[StoreEvent] {
        &self.events
    }

    /// Revokes of handles this store never issued or already released.
    pub fn stale_revokes(&self) -> usize {
        self.stale_revokes
    }
}

impl ResourceStore for MemoryStore {
    type Source = MemoryFile;

    fn create(&mut self, source: &MemoryFile) -> Option<ResourceHandle> {
        if self.reject_empty && source.bytes.is_empty() {
            return None;
        }
        self.next += 1;
        let url = format!("mem:{}", self.next);
        self.live.insert(url.clone(), source.bytes.clone());
        self.events.push(StoreEvent::Created(url.clone()));
        Some(ResourceHandle(url))
    }

    fn revoke(&mut self, handle: ResourceHandle) {
        if self.live.remove(&handle.0).is_none() {
            log::warn!("revoke of unknown handle {handle}");
            self.stale_revokes += 1;
        }
        self.events.push(StoreEvent::Revoked(handle.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_tracks_live_handles() {
        let mut store = MemoryStore::new();
        let a = store.create(&MemoryFile::new("a.jpg", vec![1, 2])).unwrap();
        let b = store.create(&MemoryFile::new("b.jpg", vec![3])).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.bytes(a.as_str()), Some(&[1u8, 2][..]));
        let a_url = a.as_str().to_string();
        store.revoke(a);
        assert!(!store.is_live(&a_url));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.stale_revokes(), 0);
    }

    #[test]
    fn foreign_handles_are_counted_as_stale() {
        let mut store = MemoryStore::new();
        store.revoke(ResourceHandle::new("blob:elsewhere"));
        assert_eq!(store.stale_revokes(), 1);
    }

    #[test]
    fn picked_files_drive_the_wall_through_a_store() {
        use crate::wall::WallController;

        #[derive(Default)]
        struct Counting {
            next: u32,
            revoked: Vec<String>,
        }

        impl ResourceStore for Counting {
            type Source = PickedFile<Vec<u8>>;
            fn create(&mut self, source: &PickedFile<Vec<u8>>) -> Option<ResourceHandle> {
                self.next += 1;
                Some(ResourceHandle::new(format!("blob:{}:{}", self.next, source.file.len())))
            }
            fn revoke(&mut self, handle: ResourceHandle) {
                self.revoked.push(handle.as_str().to_string());
            }
        }

        let picked = PickedFile::new("beach.jpg", vec![1u8, 2, 3]);
        assert_eq!(picked.file_name(), "beach.jpg");

        let mut wall = WallController::new(Counting::default(), 3);
        assert!(wall.attach_photo("008", Some(&picked)));
        assert!(wall.attach_photo("008", Some(&PickedFile::new("hills.jpg", vec![4u8]))));
        let record = wall.snapshot().photos.get("008").unwrap();
        assert_eq!(record.file_name, "hills.jpg");
        assert_eq!(record.url(), "blob:2:1");
        assert_eq!(wall.store().revoked, vec!["blob:1:3".to_string()]);
    }

    #[test]
    fn reject_empty_refuses_zero_byte_files() {
        let mut store = MemoryStore {
            reject_empty: true,
            ..MemoryStore::default()
        };
        assert!(store.create(&MemoryFile::new("empty.jpg", Vec::new())).is_none());
        assert!(store.events().is_empty());
    }
}
