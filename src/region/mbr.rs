//! Minimal MS-DOS master boot record, so that an extracted partition
//! can be mounted by generic FAT tooling.

use heapless::Vec;

use super::partition::Partition;
use crate::codec::{set_u32, set_u8, Sector, SECTOR_SIZE};
use crate::endian::Little as LE;
use crate::error::InputError;
use crate::types::FileSystem;

pub const MAX_ENTRIES: usize = 4;
const TABLE_OFFSET: usize = 0x1BE;
const ENTRY_SIZE: usize = 0x10;
const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MbrEntry {
    pub bootable: bool,
    /// File system type code, e.g. 0x0E for FAT16 with LBA
    pub fs_type: u8,
    pub start_sector: u32,
    pub sectors: u32,
}

impl MbrEntry {
    /// Entry for `partition` copied right behind the MBR, i.e. starting at sector 1
    pub fn for_partition(
        partition: &Partition,
        file_system: FileSystem,
        bootable: bool,
    ) -> Result<Self, InputError> {
        let sectors = partition.length() / SECTOR_SIZE as u64;
        let sectors = u32::try_from(sectors).map_err(|_| InputError::PartitionTooLarge(sectors))?;
        Ok(Self { bootable, fs_type: file_system.mbr_type(), start_sector: 1, sectors })
    }

    fn encode(&self, entry: &mut [u8]) {
        set_u8(entry, 0x00, if self.bootable { 0x80 } else { 0x00 });
        // CHS addresses unused
        entry[0x01..0x04].fill(0);
        set_u8(entry, 0x04, self.fs_type);
        entry[0x05..0x08].fill(0);
        set_u32::<LE>(entry, 0x08, self.start_sector);
        set_u32::<LE>(entry, 0x0C, self.sectors);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mbr {
    entries: Vec<MbrEntry, MAX_ENTRIES>,
    disk_signature: Option<u32>,
}

impl Mbr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[MbrEntry]) -> Result<Self, InputError> {
        let mut mbr = Self::new();
        for &entry in entries.iter() {
            mbr.push(entry)?;
        }
        Ok(mbr)
    }

    pub fn push(&mut self, entry: MbrEntry) -> Result<(), InputError> {
        self.entries.push(entry).map_err(|_| InputError::TooManyPartitions(MAX_ENTRIES))
    }

    pub fn set_disk_signature(&mut self, signature: u32) {
        self.disk_signature = Some(signature)
    }

    pub fn entries(&self) -> &[MbrEntry] {
        &self.entries
    }

    pub fn encode(&self) -> Sector {
        let mut sector = [0u8; SECTOR_SIZE];
        if let Some(signature) = self.disk_signature {
            set_u32::<LE>(&mut sector, DISK_SIGNATURE_OFFSET, signature);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            let offset = TABLE_OFFSET + index * ENTRY_SIZE;
            entry.encode(&mut sector[offset..offset + ENTRY_SIZE]);
        }
        sector[0x1FE..].copy_from_slice(&super::BOOT_SIGNATURE);
        sector
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::get_u32;
    use crate::endian::Big as BE;
    use crate::region::partition::RawPartition;

    fn partition(sectors: u32) -> Partition {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(b"\x01BGM");
        set_u32::<BE>(&mut bytes, 4, 2);
        set_u32::<BE>(&mut bytes, 8, sectors);
        RawPartition::decode(&bytes, 0, 0).locate(0)
    }

    #[test]
    fn test_encode() {
        let partition = partition(2048);
        assert_eq!(partition.length(), 1048576);
        let entry = MbrEntry::for_partition(&partition, FileSystem::FAT16, true).unwrap();
        let sector = Mbr::from_entries(&[entry]).unwrap().encode();
        assert_eq!(sector.len(), 512);
        assert_eq!(sector[0x1FE..], hex!("55 AA"));
        assert_eq!(sector[0x1BE], 0x80);
        assert_eq!(sector[0x1C2], 0x0E);
        assert_eq!(get_u32::<LE>(&sector, 0x1C6), 1);
        assert_eq!(get_u32::<LE>(&sector, 0x1CA), 2048);
        assert_eq!(sector[0x1BE..0x1CE], hex!("80 000000 0E 000000 01000000 00080000"));
        assert!(sector[..0x1BE].iter().all(|&b| b == 0));
        assert!(sector[0x1CE..0x1FE].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_disk_signature() {
        let entry = MbrEntry::for_partition(&partition(8), FileSystem::FAT12, false).unwrap();
        let mut mbr = Mbr::from_entries(&[entry]).unwrap();
        mbr.set_disk_signature(0xDEADBEEF);
        let sector = mbr.encode();
        assert_eq!(sector[0x1B8..0x1BC], hex!("EFBEADDE"));
        assert_eq!(sector[0x1BE], 0x00);
        assert_eq!(sector[0x1C2], 0x01);
    }

    #[test]
    fn test_too_many_entries() {
        let entry = MbrEntry { bootable: false, fs_type: 0x0C, start_sector: 1, sectors: 1 };
        let mut mbr = Mbr::from_entries(&[entry; 4]).unwrap();
        assert_eq!(mbr.entries().len(), 4);
        let sector = mbr.encode();
        for index in 0..4 {
            assert_eq!(sector[0x1BE + index * 0x10 + 4], 0x0C);
        }
        assert_eq!(mbr.push(entry), Err(InputError::TooManyPartitions(4)));
        assert_eq!(Mbr::from_entries(&[entry; 5]).err(), Some(InputError::TooManyPartitions(4)));
    }
}
