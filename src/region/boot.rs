// Partition boot sector, MS-DOS compatible BIOS parameter block

use core::fmt::{Display, Formatter, Result};

use heapless::String;

use crate::codec::{self, get_ascii, get_u16, get_u32, get_u8, set_u16, set_u32, set_u8, Sector};
use crate::codec::{EXECUTABLE_CHECKSUM, SECTOR_SIZE};
use crate::endian::{Big as BE, Little as LE};
use crate::types::FileSystem;

const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;

/// Offsets of an extended BPB, which differ between FAT16 and FAT32
struct Layout {
    drive_number: usize,
    signature: usize,
    serial: usize,
    label: usize,
    fs_type: usize,
}

const FAT16: Layout =
    Layout { drive_number: 0x24, signature: 0x26, serial: 0x27, label: 0x2B, fs_type: 0x36 };
const FAT32: Layout =
    Layout { drive_number: 0x40, signature: 0x42, serial: 0x43, label: 0x47, fs_type: 0x52 };

impl Layout {
    fn probe(&self, sector: &[u8]) -> bool {
        get_u8(sector, self.signature) == EXTENDED_BOOT_SIGNATURE
    }

    fn decode(&self, sector: &[u8]) -> Extended {
        Extended {
            drive_number: get_u8(sector, self.drive_number),
            serial: get_u32::<LE>(sector, self.serial),
            label: get_ascii(sector, self.label),
            fs_type: get_ascii(sector, self.fs_type),
        }
    }
}

/// Extended BPB, only present on FAT16 and FAT32
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extended {
    /// 0x00 floppy disk, 0x80 and above hard disk
    pub drive_number: u8,
    pub serial: u32,
    pub label: String<11>,
    /// e.g. "FAT16"
    pub fs_type: String<8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootSector {
    pub file_system: FileSystem,
    /// OEM name
    pub system_name: String<8>,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub max_directory_entries: u16,
    /// Taken from the 32 bit field when the 16 bit one is zero
    pub sectors: u32,
    /// 0xF8 hard disk, other 0xF? values floppy disks
    pub media_descriptor: u8,
    pub sectors_per_fat: u32,
    pub sectors_per_track: u16,
    /// Sides for floppy disks
    pub heads: u16,
    pub hidden_sectors: u32,
    pub extended: Option<Extended>,
    /// Big endian word sum over the raw sector
    pub checksum: u16,
}

impl BootSector {
    pub fn decode(sector: &Sector) -> Self {
        let sectors16 = get_u16::<LE>(sector, 0x13);
        let sectors32 = get_u32::<LE>(sector, 0x20);
        let mut boot_sector = Self {
            file_system: FileSystem::FAT12,
            system_name: get_ascii(sector, 0x03),
            bytes_per_sector: get_u16::<LE>(sector, 0x0B),
            sectors_per_cluster: get_u8(sector, 0x0D),
            reserved_sectors: get_u16::<LE>(sector, 0x0E),
            num_fats: get_u8(sector, 0x10),
            max_directory_entries: get_u16::<LE>(sector, 0x11),
            sectors: if sectors16 != 0 { sectors16 as u32 } else { sectors32 },
            media_descriptor: get_u8(sector, 0x15),
            sectors_per_fat: get_u16::<LE>(sector, 0x16) as u32,
            sectors_per_track: get_u16::<LE>(sector, 0x18),
            heads: get_u16::<LE>(sector, 0x1A),
            hidden_sectors: get_u32::<LE>(sector, 0x1C),
            extended: None,
            checksum: codec::checksum16::<BE>(sector, 0, SECTOR_SIZE),
        };
        // A FAT32 sector may satisfy the FAT16 probe as well, so FAT32 is checked last
        if FAT16.probe(sector) {
            boot_sector.file_system = FileSystem::FAT16;
            boot_sector.extended = Some(FAT16.decode(sector));
        }
        if FAT32.probe(sector) {
            boot_sector.file_system = FileSystem::FAT32;
            boot_sector.sectors_per_fat = get_u32::<LE>(sector, 0x24);
            boot_sector.extended = Some(FAT32.decode(sector));
        }
        boot_sector
    }

    pub fn label(&self) -> Option<&str> {
        self.extended.as_ref().map(|extended| extended.label.as_str())
    }

    pub fn fs_type(&self) -> Option<&str> {
        self.extended.as_ref().map(|extended| extended.fs_type.as_str())
    }

    pub fn serial(&self) -> Option<u32> {
        self.extended.as_ref().map(|extended| extended.serial)
    }

    /// Bytes
    pub fn capacity(&self) -> u64 {
        self.sectors as u64 * self.bytes_per_sector as u64
    }

    pub fn is_executable(&self) -> bool {
        self.checksum == EXECUTABLE_CHECKSUM
    }

    /// Rewrites `sector` so that it addresses 512 byte logical sectors.
    ///
    /// Hard disk drivers of the platform format with logical sectors of up to 16KiB,
    /// which generic FAT drivers refuse. Nothing changes if sectors are 512 bytes already.
    pub fn normalize_sector_size(&self, sector: &mut [u8]) {
        if self.bytes_per_sector as usize <= SECTOR_SIZE {
            return;
        }
        let factor = self.bytes_per_sector as u64 / SECTOR_SIZE as u64;
        set_u16::<LE>(sector, 0x0B, SECTOR_SIZE as u16);
        set_u8(sector, 0x0D, (self.sectors_per_cluster as u64 * factor) as u8);
        set_u16::<LE>(sector, 0x0E, (self.reserved_sectors as u64 * factor) as u16);
        let sectors = self.sectors as u64 * factor;
        if sectors <= 0xFFFF {
            set_u16::<LE>(sector, 0x13, sectors as u16);
            set_u32::<LE>(sector, 0x20, 0);
        } else {
            set_u16::<LE>(sector, 0x13, 0);
            set_u32::<LE>(sector, 0x20, sectors as u32);
        }
        let sectors_per_fat = self.sectors_per_fat as u64 * factor;
        match self.file_system {
            FileSystem::FAT32 => set_u32::<LE>(sector, 0x24, sectors_per_fat as u32),
            _ => set_u16::<LE>(sector, 0x16, sectors_per_fat as u16),
        }
        set_u16::<LE>(sector, 0x18, (self.sectors_per_track as u64 * factor) as u16);
        set_u32::<LE>(sector, 0x1C, (self.hidden_sectors as u64 * factor) as u32);
    }

    /// Copy of the raw `sector` that MS-DOS style FAT drivers accept
    pub fn to_msdos(&self, sector: &Sector) -> Sector {
        let mut msdos = *sector;
        self.normalize_sector_size(&mut msdos);
        codec::set_ascii(&mut msdos, 0x03, 8, "MSDOS5.0");
        let layout = match self.file_system {
            FileSystem::FAT12 => None,
            FileSystem::FAT16 => Some(&FAT16),
            FileSystem::FAT32 => Some(&FAT32),
        };
        if let Some(layout) = layout {
            set_u8(&mut msdos, layout.drive_number, 0x80);
        }
        msdos[0x1FE..].copy_from_slice(&super::BOOT_SIGNATURE);
        msdos
    }
}

impl Display for BootSector {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Boot Sector")?;
        writeln!(f, "S/Cluster : {}", self.sectors_per_cluster)?;
        writeln!(f, "Sectors   : {}", self.sectors)?;
        writeln!(f, "Bytes/S   : {}", self.bytes_per_sector)?;
        writeln!(f, "Capacity  : {}", self.capacity())?;
        match self.extended.as_ref() {
            None => writeln!(f, "Detected  : FAT12/unknown")?,
            Some(extended) => {
                writeln!(f, "Detected  : {}", self.file_system)?;
                writeln!(f, "FS type   : {}", extended.fs_type)?;
                writeln!(f, "Label     : {}", extended.label)?;
                writeln!(f, "Serial    : ${:08X}", extended.serial)?;
            }
        }
        write!(f, "Checksum  : ${:04X}", self.checksum)?;
        if self.is_executable() {
            write!(f, " (executable)")?;
        }
        writeln!(f)
    }
}
