//! Test ISO image builder with nested directory support.
//!
//! Lays out a minimal but structurally faithful volume: system area,
//! volume descriptor at sector 16, set terminator at 17, directory extents
//! from 18, file data after. Directory records never cross a sector
//! boundary; the tail of each sector is zero padding, exactly as a
//! mastering tool would emit it.

use super::{MemoryBlockDevice, SECTOR_SIZE};

const PVD_LBA: usize = 16;
const ROOT_LBA: u32 = 18;

#[derive(Default)]
struct DirNode {
    subdirs: Vec<(String, DirNode)>,
    files: Vec<(String, Vec<u8>)>,
}

impl DirNode {
    fn child(&mut self, name: &str) -> &mut DirNode {
        if let Some(index) = self.subdirs.iter().position(|(n, _)| n == name) {
            return &mut self.subdirs[index].1;
        }
        self.subdirs.push((name.to_string(), DirNode::default()));
        &mut self.subdirs.last_mut().unwrap().1
    }
}

#[derive(Default)]
pub struct IsoBuilder {
    root: DirNode,
}

/// Flattened directory with its assigned extent.
struct FlatDir {
    parent: usize,
    subdirs: Vec<(String, usize)>,
    files: Vec<(String, Vec<u8>)>,
    lba: u32,
    size_bytes: usize,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating intermediate directories. Files are stored
    /// on disc with a ";1" version suffix, as mastering tools write them.
    pub fn add_file(&mut self, path: &str, content: &[u8]) {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let file_name = components.pop().expect("path has a file name");
        let mut node = &mut self.root;
        for dir in components {
            node = node.child(dir);
        }
        node.files.push((file_name.to_string(), content.to_vec()));
    }

    /// Add an empty directory, creating intermediate directories.
    pub fn add_dir(&mut self, path: &str) {
        let mut node = &mut self.root;
        for dir in path.split('/').filter(|c| !c.is_empty()) {
            node = node.child(dir);
        }
    }

    pub fn build(self) -> MemoryBlockDevice {
        let mut flat = Vec::new();
        flatten(self.root, 0, &mut flat);

        // Size every directory extent, then assign extents: directories
        // first (root at 18), file data after.
        for index in 0..flat.len() {
            flat[index].size_bytes = extent_size(&flat[index]);
        }
        let mut next_lba = ROOT_LBA;
        for dir in flat.iter_mut() {
            dir.lba = next_lba;
            next_lba += (dir.size_bytes / SECTOR_SIZE) as u32;
        }
        let mut file_lbas: Vec<Vec<u32>> = Vec::new();
        for dir in &flat {
            let mut lbas = Vec::new();
            for (_, content) in &dir.files {
                lbas.push(next_lba);
                next_lba += content.len().div_ceil(SECTOR_SIZE).max(1) as u32;
            }
            file_lbas.push(lbas);
        }

        let mut data = vec![0u8; next_lba as usize * SECTOR_SIZE];

        write_volume_descriptor(&mut data, &flat[0], next_lba);

        // Volume descriptor set terminator at 17
        let term = 17 * SECTOR_SIZE;
        data[term] = 255;
        data[term + 1..term + 6].copy_from_slice(b"CD001");
        data[term + 6] = 1;

        // Directory extents
        for (index, dir) in flat.iter().enumerate() {
            let base = dir.lba as usize * SECTOR_SIZE;
            let mut offset = 0usize;
            let parent = &flat[dir.parent];
            write_entry(&mut data, base, &mut offset, dir.lba, dir.size_bytes as u32, 0x02, b"\x00");
            write_entry(&mut data, base, &mut offset, parent.lba, parent.size_bytes as u32, 0x02, b"\x01");
            for (name, child) in &dir.subdirs {
                let child = &flat[*child];
                write_entry(
                    &mut data,
                    base,
                    &mut offset,
                    child.lba,
                    child.size_bytes as u32,
                    0x02,
                    name.as_bytes(),
                );
            }
            for (file_index, (name, content)) in dir.files.iter().enumerate() {
                let lba = file_lbas[index][file_index];
                let on_disc = format!("{name};1");
                write_entry(
                    &mut data,
                    base,
                    &mut offset,
                    lba,
                    content.len() as u32,
                    0x00,
                    on_disc.as_bytes(),
                );
                let file_offset = lba as usize * SECTOR_SIZE;
                data[file_offset..file_offset + content.len()].copy_from_slice(content);
            }
        }

        MemoryBlockDevice::new(data)
    }
}

fn flatten(node: DirNode, parent: usize, flat: &mut Vec<FlatDir>) -> usize {
    let id = flat.len();
    flat.push(FlatDir {
        parent,
        subdirs: Vec::new(),
        files: node.files,
        lba: 0,
        size_bytes: 0,
    });
    for (name, child) in node.subdirs {
        let child_id = flatten(child, id, flat);
        flat[id].subdirs.push((name, child_id));
    }
    id
}

fn entry_len(name_len: usize) -> usize {
    let len = 33 + name_len;
    len + len % 2 // pad to even
}

/// Advance `offset` past the sector tail if `len` would cross a boundary.
fn place(offset: &mut usize, len: usize) -> usize {
    let remaining = SECTOR_SIZE - *offset % SECTOR_SIZE;
    if len > remaining {
        *offset += remaining;
    }
    let start = *offset;
    *offset += len;
    start
}

fn extent_size(dir: &FlatDir) -> usize {
    let mut offset = 0usize;
    place(&mut offset, entry_len(1)); // "."
    place(&mut offset, entry_len(1)); // ".."
    for (name, _) in &dir.subdirs {
        place(&mut offset, entry_len(name.len()));
    }
    for (name, _) in &dir.files {
        place(&mut offset, entry_len(name.len() + 2)); // ";1"
    }
    offset.div_ceil(SECTOR_SIZE).max(1) * SECTOR_SIZE
}

fn write_both_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn write_both_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

fn write_entry(
    data: &mut [u8],
    base: usize,
    offset: &mut usize,
    lba: u32,
    size: u32,
    flags: u8,
    name: &[u8],
) {
    let len = entry_len(name.len());
    let start = base + place(offset, len);

    data[start] = len as u8;
    write_both_u32(&mut data[start + 2..], lba);
    write_both_u32(&mut data[start + 10..], size);
    // recording date left zeroed
    data[start + 25] = flags;
    write_both_u16(&mut data[start + 28..], 1); // volume sequence
    data[start + 32] = name.len() as u8;
    data[start + 33..start + 33 + name.len()].copy_from_slice(name);
}

fn write_volume_descriptor(data: &mut [u8], root: &FlatDir, total_blocks: u32) {
    let pvd = PVD_LBA * SECTOR_SIZE;

    data[pvd] = 1; // primary
    data[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
    data[pvd + 6] = 1; // version

    // identifier fields are space-padded ASCII
    data[pvd + 8..pvd + 40].fill(b' ');
    data[pvd + 8..pvd + 18].copy_from_slice(b"RELIC TEST");
    data[pvd + 40..pvd + 72].fill(b' ');
    data[pvd + 40..pvd + 47].copy_from_slice(b"TESTVOL");

    write_both_u32(&mut data[pvd + 80..], total_blocks);
    write_both_u16(&mut data[pvd + 120..], 1); // volume set size
    write_both_u16(&mut data[pvd + 124..], 1); // volume sequence
    write_both_u16(&mut data[pvd + 128..], SECTOR_SIZE as u16);
    write_both_u32(&mut data[pvd + 132..], 0); // path table size

    // root directory record at offset 156
    let record = pvd + 156;
    data[record] = 34;
    write_both_u32(&mut data[record + 2..], root.lba);
    write_both_u32(&mut data[record + 10..], root.size_bytes as u32);
    data[record + 25] = 0x02;
    write_both_u16(&mut data[record + 28..], 1);
    data[record + 32] = 1;
    data[record + 33] = 0x00;
}
