use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use crate::source::{FormatClass, SourceReference};
use crate::utils::extension_of;

/// Raster extensions accepted for upload besides the radiance formats.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "avif"];
pub const RADIANCE_EXTENSIONS: &[&str] = &["hdr", "exr"];

/// Whether a local file with this name can be opened as a panorama.
pub fn accepts(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| {
        IMAGE_EXTENSIONS.contains(&ext.as_str()) || RADIANCE_EXTENSIONS.contains(&ext.as_str())
    })
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("cannot read local file {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file supplied by the user, either already in memory (web upload) or
/// still on disk (native dialog, drag-and-drop).
#[derive(Debug, Clone)]
pub enum LocalFile {
    InMemory { name: String, bytes: Vec<u8> },
    OnDisk(PathBuf),
}

impl LocalFile {
    pub fn in_memory<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        LocalFile::InMemory {
            name: name.into(),
            bytes,
        }
    }

    pub fn on_disk<P: AsRef<Path>>(path: P) -> Self {
        LocalFile::OnDisk(path.as_ref().to_path_buf())
    }

    pub fn name(&self) -> String {
        match self {
            LocalFile::InMemory { name, .. } => name.clone(),
            LocalFile::OnDisk(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    fn read(&self) -> Result<Arc<[u8]>, ResourceError> {
        match self {
            LocalFile::InMemory { bytes, .. } => Ok(Arc::from(bytes.as_slice())),
            LocalFile::OnDisk(path) => std::fs::read(path)
                .map(Arc::from)
                .map_err(|source| ResourceError::Read {
                    name: self.name(),
                    source,
                }),
        }
    }
}

type BlobMap = Rc<RefCell<HashMap<String, Arc<[u8]>>>>;

/// Read-only view of the live temporary handles, used to fetch `blob:` sources.
#[derive(Clone, Default)]
pub struct BlobReader {
    blobs: BlobMap,
}

impl BlobReader {
    /// Bytes behind a temporary handle; any hint fragment is ignored.
    pub fn read(&self, reference: &str) -> Option<Arc<[u8]>> {
        let key = SourceReference::from(reference);
        self.blobs.borrow().get(key.without_fragment()).cloned()
    }
}

/// Creates and revokes temporary `blob:` handles for local files.
#[derive(Default)]
pub struct ResourceStore {
    blobs: BlobMap,
    next_id: Cell<u64>,
    revoked: Cell<usize>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the file's bytes under a fresh handle.
    ///
    /// `.hdr` / `.exr` names get a hint fragment appended since the handle
    /// itself has no extension.
    pub fn create_handle(&self, file: &LocalFile) -> Result<SourceReference, ResourceError> {
        let bytes = file.read()?;
        let name = file.name();

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let key = format!("blob:panorama/{id:08x}");
        let size = bytes.len();
        self.blobs.borrow_mut().insert(key.clone(), bytes);

        let handle = match FormatClass::from_file_name(&name).hint() {
            Some(hint) => format!("{key}{hint}"),
            None => key,
        };
        log::info!("created {handle} for {name} ({size} bytes)");
        Ok(SourceReference::new(handle))
    }

    /// Revokes a temporary handle. Returns whether anything was revoked.
    ///
    /// Remote URLs and paths are ignored. Releasing an already revoked handle
    /// does nothing.
    pub fn release_handle(&self, handle: &SourceReference) -> bool {
        if !handle.is_temporary() {
            return false;
        }
        let removed = self
            .blobs
            .borrow_mut()
            .remove(handle.without_fragment())
            .is_some();
        if removed {
            self.revoked.set(self.revoked.get() + 1);
            log::debug!("revoked {handle}");
        } else {
            log::warn!("{handle} is not live, ignoring release");
        }
        removed
    }

    pub fn is_live(&self, handle: &SourceReference) -> bool {
        self.blobs.borrow().contains_key(handle.without_fragment())
    }

    pub fn live_count(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.get()
    }

    pub fn reader(&self) -> BlobReader {
        BlobReader {
            blobs: self.blobs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::classify;

    #[test]
    fn exr_upload_gets_hint() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("scene.exr", vec![1, 2, 3]))
            .unwrap();
        assert!(handle.is_temporary());
        assert!(handle.as_str().ends_with("#type=exr.exr"));
        assert_eq!(classify(&handle), FormatClass::RadianceExr);
        assert_eq!(store.reader().read(handle.as_str()).as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn raster_upload_has_no_hint() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("Beach.JPG", vec![0]))
            .unwrap();
        assert_eq!(handle.format_hint(), None);
        assert_eq!(classify(&handle), FormatClass::Standard);
    }

    #[test]
    fn handles_are_unique() {
        let store = ResourceStore::new();
        let file = LocalFile::in_memory("a.hdr", vec![0]);
        let a = store.create_handle(&file).unwrap();
        let b = store.create_handle(&file).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn release_once() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("a.hdr", vec![0]))
            .unwrap();
        assert!(store.release_handle(&handle));
        assert!(!store.release_handle(&handle));
        assert_eq!(store.revoked_count(), 1);
        assert!(!store.is_live(&handle));
        assert!(store.reader().read(handle.as_str()).is_none());
    }

    #[test]
    fn releasing_remote_url_is_noop() {
        let store = ResourceStore::new();
        assert!(!store.release_handle(&SourceReference::from("https://x/img.jpg")));
        assert_eq!(store.revoked_count(), 0);
    }

    #[test]
    fn unreadable_file_registers_nothing() {
        let store = ResourceStore::new();
        let dir = tempfile::tempdir().unwrap();
        let err = store
            .create_handle(&LocalFile::on_disk(dir.path().join("missing.hdr")))
            .unwrap_err();
        assert!(matches!(err, ResourceError::Read { ref name, .. } if name == "missing.hdr"));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn on_disk_file_is_read() {
        let store = ResourceStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.HDR");
        std::fs::write(&path, b"#?RADIANCE").unwrap();
        let handle = store.create_handle(&LocalFile::on_disk(&path)).unwrap();
        assert_eq!(classify(&handle), FormatClass::RadianceHdr);
        assert_eq!(
            store.reader().read(handle.as_str()).as_deref(),
            Some(&b"#?RADIANCE"[..])
        );
    }

    #[test]
    fn accepted_types() {
        assert!(accepts("pano.JPG"));
        assert!(accepts("studio.hdr"));
        assert!(accepts("scene.exr"));
        assert!(!accepts("notes.txt"));
        assert!(!accepts("noext"));
    }
}
