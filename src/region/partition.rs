use core::fmt::{Display, Formatter, Result};

use bitfield::bitfield;
use derive_more::Into;

use super::boot::BootSector;
use crate::codec::{get_u32, get_u8, SECTOR_SIZE};
use crate::endian::Big as BE;

pub const ENTRY_SIZE: usize = 12;

bitfield! {
    #[derive(Copy, Clone, Default, Into, PartialEq, Eq)]
    pub struct Flags(u8);
    impl Debug;
    pub bootable, set_bootable: 7, 7;
    pub reserved, set_reserved: 6, 1;
    pub active, set_active: 0, 0;
}

/// Three letter partition type tag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionType {
    GEM,
    BGM,
    /// Container whose first sector is another root sector
    XGM,
    Unknown([u8; 3]),
}

impl From<[u8; 3]> for PartitionType {
    fn from(tag: [u8; 3]) -> Self {
        match &tag {
            b"GEM" => Self::GEM,
            b"BGM" => Self::BGM,
            b"XGM" => Self::XGM,
            _ => Self::Unknown(tag),
        }
    }
}

impl PartitionType {
    pub fn tag(&self) -> [u8; 3] {
        match self {
            Self::GEM => *b"GEM",
            Self::BGM => *b"BGM",
            Self::XGM => *b"XGM",
            Self::Unknown(tag) => *tag,
        }
    }
}

impl Display for PartitionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for &b in self.tag().iter() {
            let ch = if b.is_ascii_graphic() { b as char } else { '.' };
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

/// Partition entry as stored, start still relative to an unknown owner
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawPartition {
    pub number: u8,
    pub flags: Flags,
    pub partition_type: PartitionType,
    /// Bytes
    pub start: u64,
    /// Bytes
    pub length: u64,
}

impl RawPartition {
    pub fn decode(sector: &[u8], offset: usize, number: u8) -> Self {
        let tag = [sector[offset + 1], sector[offset + 2], sector[offset + 3]];
        Self {
            number,
            flags: Flags(get_u8(sector, offset)),
            partition_type: PartitionType::from(tag),
            start: get_u32::<BE>(sector, offset + 4) as u64 * SECTOR_SIZE as u64,
            length: get_u32::<BE>(sector, offset + 8) as u64 * SECTOR_SIZE as u64,
        }
    }

    /// Anchors the entry to the absolute offset of the sector its start is relative to
    pub fn locate(self, owner_offset: u64) -> Partition {
        let RawPartition { number, flags, partition_type, start, length } = self;
        Partition { number, flags, partition_type, start, length, owner_offset, boot_sector: None }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    number: u8,
    flags: Flags,
    partition_type: PartitionType,
    start: u64,
    length: u64,
    owner_offset: u64,
    boot_sector: Option<BootSector>,
}

impl Partition {
    pub(crate) fn with_boot_sector(self, boot_sector: BootSector) -> Self {
        Self { boot_sector: Some(boot_sector), ..self }
    }

    /// Slot index 0..=11, primary slots first
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn partition_type(&self) -> PartitionType {
        self.partition_type
    }

    pub fn is_active(&self) -> bool {
        self.flags.active() > 0
    }

    pub fn is_bootable(&self) -> bool {
        self.flags.bootable() > 0
    }

    pub fn is_valid(&self) -> bool {
        self.flags.reserved() == 0 && !matches!(self.partition_type, PartitionType::Unknown(_))
    }

    pub fn is_gem(&self) -> bool {
        self.partition_type == PartitionType::GEM
    }

    pub fn is_bgm(&self) -> bool {
        self.partition_type == PartitionType::BGM
    }

    pub fn is_xgm(&self) -> bool {
        self.partition_type == PartitionType::XGM
    }

    /// Valid, active and carrying a file system
    pub fn is_real(&self) -> bool {
        self.is_valid() && self.is_active() && !self.is_xgm()
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    /// Absolute offset of the root sector `start` is relative to
    pub fn owner_offset(&self) -> u64 {
        self.owner_offset
    }

    pub fn absolute_start(&self) -> u64 {
        self.owner_offset + self.start
    }

    pub fn absolute_end(&self) -> u64 {
        self.absolute_start() + self.length
    }

    pub fn boot_sector(&self) -> Option<&BootSector> {
        self.boot_sector.as_ref()
    }

    /// Listing labelled with a drive letter or role instead of the slot number
    pub fn display_as<'a, N: Display + 'a>(&'a self, name: N) -> impl Display + 'a {
        Named { partition: self, name }
    }
}

struct Named<'a, N> {
    partition: &'a Partition,
    name: N,
}

impl<'a, N: Display> Display for Named<'a, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let partition = self.partition;
        writeln!(f, "Partition {}", self.name)?;
        write!(f, "Type      : {}", partition.partition_type)?;
        write!(f, "{}", if partition.is_active() { " (active)" } else { " (inactive)" })?;
        if partition.is_bootable() {
            write!(f, " (boot)")?;
        }
        writeln!(f)?;
        writeln!(f, "Start     : {} ({})", partition.absolute_start(), partition.start)?;
        writeln!(f, "Length    : {}", partition.length)?;
        writeln!(f, "End       : {} ({})", partition.absolute_end(), partition.end())?;
        if let Some(boot_sector) = partition.boot_sector.as_ref() {
            write!(f, "{}", boot_sector)?;
        }
        Ok(())
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.display_as(self.number))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::{set_u32, set_u8};

    fn entry(flags: u8, tag: &[u8; 3], start: u32, length: u32) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        set_u8(&mut bytes, 0, flags);
        bytes[1..4].copy_from_slice(tag);
        set_u32::<BE>(&mut bytes, 4, start);
        set_u32::<BE>(&mut bytes, 8, length);
        bytes
    }

    #[test]
    fn test_decode() {
        let bytes = entry(0x81, b"BGM", 2, 2048);
        assert_eq!(bytes, hex!("81 42474D 00000002 00000800"));
        let raw = RawPartition::decode(&bytes, 0, 3);
        assert_eq!(raw.number, 3);
        assert_eq!(raw.partition_type, PartitionType::BGM);
        assert_eq!(raw.start, 1024);
        assert_eq!(raw.length, 1024 * 1024);

        let partition = raw.locate(4096);
        assert!(partition.is_active() && partition.is_bootable() && partition.is_valid());
        assert!(partition.is_bgm() && partition.is_real());
        assert_eq!(partition.absolute_start(), 4096 + 1024);
        assert_eq!(partition.absolute_end() - partition.absolute_start(), partition.length());
        assert_eq!(partition.length() % SECTOR_SIZE as u64, 0);
        assert_eq!(partition.end(), 1024 + 1024 * 1024);
    }

    #[test]
    fn test_validity() {
        for reserved in [0x02u8, 0x04, 0x08, 0x10, 0x20, 0x40] {
            let raw = RawPartition::decode(&entry(0x01 | reserved, b"GEM", 1, 1), 0, 0);
            let partition = raw.locate(0);
            assert!(!partition.is_valid());
            assert!(!partition.is_real());
        }
        let partition = RawPartition::decode(&entry(0x01, b"LNX", 1, 1), 0, 0).locate(0);
        assert_eq!(partition.partition_type(), PartitionType::Unknown(*b"LNX"));
        assert!(!partition.is_valid());

        let partition = RawPartition::decode(&entry(0x01, b"XGM", 1, 1), 0, 0).locate(0);
        assert!(partition.is_valid() && partition.is_active() && !partition.is_real());

        let partition = RawPartition::decode(&entry(0x00, b"GEM", 1, 1), 0, 0).locate(0);
        assert!(partition.is_valid() && !partition.is_real());
    }

    #[test]
    fn test_display() {
        let partition = RawPartition::decode(&entry(0x01, b"GEM", 2, 4), 0, 11).locate(512);
        let text = format!("{}", partition);
        assert!(text.starts_with("Partition 11\nType      : GEM (active)\n"));
        assert!(text.contains("Start     : 1536 (1024)\n"));
        let text = format!("{}", partition.display_as("C"));
        assert!(text.starts_with("Partition C\n"));
    }
}
