use std::fmt;

use crate::atlas::Country;
use crate::photos::{PhotoRecord, PhotoRegistry, PhotoSource, ResourceStore};

/// Countries with a photo out of all countries in the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitedCount {
    pub visited: usize,
    pub total: usize,
}

impl fmt::Display for VisitedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.visited, self.total)
    }
}

/// Borrowed, read-only view of the wall handed to views. Holding one blocks
/// mutation, so no view can keep a handle past its revocation.
#[derive(Clone, Copy, Debug)]
pub struct WallSnapshot<'a> {
    pub selection: Option<&'a Country>,
    pub photos: &'a PhotoRegistry,
    pub total: usize,
}

impl<'a> WallSnapshot<'a> {
    pub fn has_photo(&self, id: &str) -> bool {
        self.photos.contains(id)
    }

    pub fn current_photo(&self) -> Option<&'a PhotoRecord> {
        self.selection.and_then(|c| self.photos.get(&c.id))
    }

    pub fn visited_count(&self) -> VisitedCount {
        VisitedCount {
            visited: self.photos.len(),
            total: self.total,
        }
    }
}

/// Owns the current selection, the per-country photos and the store that
/// backs their handles.
#[derive(Debug)]
pub struct WallController<S: ResourceStore> {
    store: S,
    selection: Option<Country>,
    photos: PhotoRegistry,
    total: usize,
}

impl<S: ResourceStore> WallController<S> {
    pub fn new(store: S, total: usize) -> Self {
        WallController {
            store,
            selection: None,
            photos: PhotoRegistry::default(),
            total,
        }
    }

    pub fn select_country(&mut self, country: Country) {
        log::debug!("select {} ({})", country.id, country.name);
        self.selection = Some(country);
    }

    /// Install a photo for `country_id`, revoking any previous one first.
    /// `None` (dialog cancelled) and store refusals leave the wall untouched.
    /// Callers only pass the id of the active selection.
    pub fn attach_photo(&mut self, country_id: &str, file: Option<&S::Source>) -> bool {
        let Some(file) = file else {
            return false;
        };
        let file_name = file.file_name();
        let Some(handle) = self.store.create(file) else {
            log::warn!("could not create a resource for {file_name}; keeping previous photo");
            return false;
        };
        if let Some(old) = self.photos.remove(country_id) {
            log::debug!("revoke {} for {country_id}", old.handle);
            self.store.revoke(old.handle);
        }
        log::debug!("attach {file_name} to {country_id} as {handle}");
        self.photos
            .insert(country_id.to_string(), PhotoRecord { handle, file_name });
        true
    }

    /// `attach_photo` for whatever is selected; no-op without a selection.
    pub fn attach_to_selection(&mut self, file: Option<&S::Source>) -> bool {
        match self.selection.as_ref().map(|c| c.id.clone()) {
            Some(id) => self.attach_photo(&id, file),
            None => false,
        }
    }

    /// Revoke and remove the photo for `country_id`. Returns whether one existed.
    pub fn clear_photo(&mut self, country_id: &str) -> bool {
        match self.photos.remove(country_id) {
            Some(old) => {
                log::debug!("clear {country_id}, revoke {}", old.handle);
                self.store.revoke(old.handle);
                true
            }
            None => false,
        }
    }

    pub fn has_photo(&self, country_id: &str) -> bool {
        self.photos.contains(country_id)
    }

    pub fn selection(&self) -> Option<&Country> {
        self.selection.as_ref()
    }

    pub fn current_photo(&self) -> Option<&PhotoRecord> {
        self.snapshot().current_photo()
    }

    pub fn visited_count(&self) -> VisitedCount {
        self.snapshot().visited_count()
    }

    pub fn snapshot(&self) -> WallSnapshot<'_> {
        WallSnapshot {
            selection: self.selection.as_ref(),
            photos: &self.photos,
            total: self.total,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ResourceStore> Drop for WallController<S> {
    fn drop(&mut self) {
        let remaining: Vec<_> = self.photos.drain().collect();
        for (_, record) in remaining {
            self.store.revoke(record.handle);
        }
    }
}
