use derive_more::Display;

/// File system detected from a boot sector
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq)]
pub enum FileSystem {
    /// Also used when neither extended boot signature is found
    #[default]
    FAT12,
    FAT16,
    FAT32,
}

impl FileSystem {
    /// Partition type code in a master boot record
    pub fn mbr_type(self) -> u8 {
        match self {
            Self::FAT12 => 0x01,
            Self::FAT16 => 0x0E,
            Self::FAT32 => 0x0C,
        }
    }
}

/// Where a root sector sits in the partition table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// First sector of the disk
    Master,
    /// Nth root sector reached through XGM container partitions, starting at 1
    Chained(usize),
    /// Decoded outside the chain, e.g. while scanning or probing backups
    Detached,
}

impl Role {
    pub fn is_chained(&self) -> bool {
        matches!(self, Self::Chained(_))
    }
}
