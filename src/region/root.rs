use core::fmt::{Display, Formatter, Result};

use super::partition::{Partition, PartitionType, RawPartition, ENTRY_SIZE};
use crate::codec::{self, get_u16, get_u32, get_u8, Sector, EXECUTABLE_CHECKSUM, SECTOR_SIZE};
use crate::endian::Big as BE;
use crate::types::Role;

pub const NUM_PARTITIONS: usize = 12;
const PRIMARY_OFFSET: usize = 0x1C6;
const EXTENDED_OFFSET: usize = 0x156;

/// Slots 0..=3 are the primary entries, 4..=11 the extended ones stored in front of them
pub(crate) fn slot_offset(number: usize) -> usize {
    match number {
        0..=3 => PRIMARY_OFFSET + number * ENTRY_SIZE,
        _ => EXTENDED_OFFSET + (number - 4) * ENTRY_SIZE,
    }
}

/// Root sector of an AHDI partitioned disk, big endian
#[derive(Clone, Debug, PartialEq)]
pub struct RootSector {
    role: Role,
    offset: u64,
    cylinders: u16,
    heads: u8,
    sectors_per_track: u8,
    size: u64,
    checksum: u16,
    partitions: [Partition; NUM_PARTITIONS],
}

impl RootSector {
    /// Decodes the sector found at absolute `offset`.
    ///
    /// XGM entries are anchored to `xgm_offset`, the first chained root sector,
    /// every other entry to `offset`.
    pub fn decode(role: Role, offset: u64, xgm_offset: u64, sector: &Sector) -> Self {
        let partitions = core::array::from_fn(|number| {
            let raw = RawPartition::decode(sector, slot_offset(number), number as u8);
            let is_xgm = raw.partition_type == PartitionType::XGM;
            raw.locate(if is_xgm { xgm_offset } else { offset })
        });
        Self {
            role,
            offset,
            cylinders: get_u16::<BE>(sector, 0x1B6),
            heads: get_u8(sector, 0x1B8),
            sectors_per_track: get_u8(sector, 0x1C1),
            size: get_u32::<BE>(sector, 0x1C2) as u64 * SECTOR_SIZE as u64,
            checksum: codec::checksum16::<BE>(sector, 0, SECTOR_SIZE),
            partitions,
        }
    }

    pub(crate) fn map_partitions<F: FnMut(Partition) -> Partition>(self, f: F) -> Self {
        Self { partitions: self.partitions.map(f), ..self }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Absolute offset in the disk image
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn cylinders(&self) -> u16 {
        self.cylinders
    }

    pub fn heads(&self) -> u8 {
        self.heads
    }

    pub fn sectors_per_track(&self) -> u8 {
        self.sectors_per_track
    }

    /// Disk size in bytes, only meaningful on the master root sector
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn is_executable(&self) -> bool {
        self.checksum == EXECUTABLE_CHECKSUM
    }

    /// All 12 slots including invalid ones
    pub fn all_partitions(&self) -> &[Partition; NUM_PARTITIONS] {
        &self.partitions
    }

    /// Valid and active partitions, containers included
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter().filter(|p| p.is_valid() && p.is_active())
    }

    pub fn real_partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter().filter(|p| p.is_real())
    }

    /// Container partition leading to the next root sector, only the first one counts
    pub fn xgm_partition(&self) -> Option<&Partition> {
        self.partitions().find(|p| p.is_xgm())
    }

    pub fn has_valid_partitions(&self) -> bool {
        self.partitions().next().is_some()
    }
}

impl Display for RootSector {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let chained = self.role.is_chained();
        if chained {
            write!(f, "XGM ")?;
        }
        writeln!(f, "Root sector")?;
        writeln!(f, "CHS     : {}/{}/{}", self.cylinders, self.heads, self.sectors_per_track)?;
        writeln!(f, "Start   : {}", self.offset)?;
        writeln!(f, "First   : {}", self.offset + SECTOR_SIZE as u64)?;
        if !chained {
            writeln!(f, "Size    : {}", self.size)?;
            writeln!(f, "End     : {}", self.end())?;
        }
        write!(f, "Checksum: ${:04X}", self.checksum)?;
        if self.is_executable() {
            write!(f, " (executable)")?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::codec::{set_u16, set_u32, set_u8};

    /// Writes an entry with `start` and `length` in sectors
    pub(crate) fn set_entry(
        sector: &mut Sector,
        number: usize,
        flags: u8,
        tag: &[u8; 3],
        start: u32,
        length: u32,
    ) {
        let offset = slot_offset(number);
        set_u8(sector, offset, flags);
        sector[offset + 1..offset + 4].copy_from_slice(tag);
        set_u32::<BE>(sector, offset + 4, start);
        set_u32::<BE>(sector, offset + 8, length);
    }

    #[test]
    fn test_decode() {
        let mut sector = [0u8; SECTOR_SIZE];
        set_u16::<BE>(&mut sector, 0x1B6, 615);
        set_u8(&mut sector, 0x1B8, 4);
        set_u8(&mut sector, 0x1C1, 17);
        set_u32::<BE>(&mut sector, 0x1C2, 41820);
        set_entry(&mut sector, 0, 0x81, b"GEM", 2, 32766);
        set_entry(&mut sector, 3, 0x01, b"XGM", 65536, 100000);
        set_entry(&mut sector, 4, 0x01, b"BGM", 200000, 65536);
        set_entry(&mut sector, 11, 0x01, b"BGM", 300000, 8);
        set_entry(&mut sector, 1, 0x41, b"GEM", 1, 1);
        set_entry(&mut sector, 2, 0x00, b"GEM", 1, 1);
        set_entry(&mut sector, 5, 0x01, b"LNX", 400000, 8);

        let root = RootSector::decode(Role::Chained(1), 1024, 512, &sector);
        assert_eq!(root.role(), Role::Chained(1));
        assert_eq!((root.cylinders(), root.heads(), root.sectors_per_track()), (615, 4, 17));
        assert_eq!(root.size(), 41820 * 512);
        assert_eq!(root.all_partitions().len(), NUM_PARTITIONS);
        for (number, partition) in root.all_partitions().iter().enumerate() {
            assert_eq!(partition.number() as usize, number);
        }

        let gem = &root.all_partitions()[0];
        assert!(gem.is_gem() && gem.is_bootable());
        assert_eq!((gem.start(), gem.length()), (2 * 512, 32766 * 512));
        assert_eq!(gem.owner_offset(), 1024);

        let xgm = root.xgm_partition().unwrap();
        assert_eq!(xgm.number(), 3);
        assert_eq!(xgm.owner_offset(), 512);
        assert_eq!(xgm.absolute_start(), 512 + 65536 * 512);

        let bgm = &root.all_partitions()[4];
        assert!(bgm.is_bgm());
        assert_eq!(bgm.absolute_start(), 1024 + 200000 * 512);
        assert_eq!(root.all_partitions()[11].start(), 300000 * 512);
        let unknown = &root.all_partitions()[5];
        assert_eq!(unknown.partition_type(), PartitionType::Unknown(*b"LNX"));
        assert!(unknown.is_active() && !unknown.is_valid());

        let numbers: Vec<u8> = root.partitions().map(|p| p.number()).collect();
        assert_eq!(numbers, [0, 3, 4, 11]);
        let numbers: Vec<u8> = root.real_partitions().map(|p| p.number()).collect();
        assert_eq!(numbers, [0, 4, 11]);
        assert!(root.has_valid_partitions());
    }

    #[test]
    fn test_empty() {
        let sector = [0u8; SECTOR_SIZE];
        let root = RootSector::decode(Role::Master, 0, 0, &sector);
        assert!(!root.has_valid_partitions());
        assert!(root.xgm_partition().is_none());
        assert_eq!(root.checksum(), 0);
        assert!(!root.is_executable());
        let text = format!("{}", root);
        assert!(text.starts_with("Root sector\nCHS     : 0/0/0\n"));
        assert!(text.ends_with("Checksum: $0000\n"));
    }

    #[test]
    fn test_executable() {
        let mut sector = [0u8; SECTOR_SIZE];
        set_u16::<BE>(&mut sector, 0x1FE, 0x1234);
        let root = RootSector::decode(Role::Chained(2), 512, 512, &sector);
        assert!(root.is_executable());
        let text = format!("{}", root);
        assert!(text.starts_with("XGM Root sector\n"));
        assert!(!text.contains("Size"));
        assert!(text.ends_with("$1234 (executable)\n"));
    }
}
