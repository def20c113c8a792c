//! The mounted filesystem: resolution root plus open.

use storage::{Result, SectorDevice, Storage, StorageError};

use crate::directory::resolve;
use crate::file::DiscFile;
use crate::volume::{read_volume_descriptor, VolumeDescriptor};

/// A mounted read-only disc filesystem.
///
/// Construction reads and validates the volume descriptor once; the driver
/// is injected by reference and shared with every handle opened here.
pub struct DiscFileSystem<'d, D: SectorDevice> {
    dev: &'d D,
    volume: VolumeDescriptor,
}

impl<'d, D: SectorDevice> DiscFileSystem<'d, D> {
    /// Mount the filesystem on `dev`.
    pub fn new(dev: &'d D) -> Result<Self> {
        let volume = read_volume_descriptor(dev)?;
        log::debug!("iso9660: mounted volume \"{}\"", volume.volume_id);
        Ok(Self { dev, volume })
    }

    /// The volume descriptor captured at mount.
    pub fn volume(&self) -> &VolumeDescriptor {
        &self.volume
    }

    /// Open the file at `path`, resolved against the volume root.
    ///
    /// A path that resolves to a directory is not an openable file and
    /// reports `NotFound`.
    pub fn open(&self, path: &str) -> Result<DiscFile<'d, D>> {
        let record = resolve(self.dev, &self.volume.root, path)?;
        if record.is_directory() {
            return Err(StorageError::NotFound);
        }
        Ok(DiscFile::new(self.dev, &record))
    }
}

impl<'d, D: SectorDevice> Storage for DiscFileSystem<'d, D> {
    type File<'a>
        = DiscFile<'d, D>
    where
        Self: 'a;

    fn open_file(&self, path: &str) -> Result<Self::File<'_>> {
        self.open(path)
    }
}
