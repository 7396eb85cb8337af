/// Partition boot sector with its BIOS parameter block
pub mod boot;

/// MS-DOS master boot record, export target only
pub mod mbr;

/// 12 byte entries of a root sector
pub mod partition;

/// Root sectors, master and XGM chained
pub mod root;

pub(crate) const BOOT_SIGNATURE: [u8; 2] = hex!("55 AA");
