use alloc::vec;
use core::fmt::Debug;

use crate::codec::SECTOR_SIZE;
use crate::error::{DataError, Error, InputError};
use crate::io;
use crate::region::boot::BootSector;
use crate::region::mbr::{Mbr, MbrEntry};
use crate::region::partition::Partition;
use crate::types::FileSystem;
use crate::Disk;

const CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Prefix the partition with a master boot record holding a single entry
    pub mbr: bool,
    /// Replace the boot sector with an MS-DOS compatible one
    pub msdos_boot_sector: bool,
}

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<E: Debug, IO: io::Image<Error = E>> Disk<IO> {
    /// Copies a real partition to `sink`, returns the number of bytes written
    pub async fn extract<S>(
        &mut self,
        partition: &Partition,
        sink: &mut S,
        options: ExtractOptions,
    ) -> Result<u64, Error<E>>
    where
        S: io::Sink<Error = E>,
    {
        if !partition.is_real() {
            return Err(InputError::NotRealPartition(partition.number()).into());
        }
        let (mut position, end) = (partition.absolute_start(), partition.absolute_end());
        if end > self.length {
            let number = partition.number();
            return Err(DataError::PartitionOutOfBounds { number, end }.into());
        }
        let mut written = 0u64;

        if options.mbr {
            let boot_sector = partition.boot_sector();
            // FAT12 only means no extended BPB was found
            let file_system = match boot_sector.map(|b| b.file_system) {
                Some(FileSystem::FAT32) => FileSystem::FAT32,
                _ => FileSystem::FAT16,
            };
            let entry = MbrEntry::for_partition(partition, file_system, false)?;
            let mut mbr = Mbr::from_entries(&[entry])?;
            if let Some(serial) = boot_sector.and_then(|b| b.serial()) {
                mbr.set_disk_signature(serial);
            }
            sink.write(&mbr.encode()).await.map_err(|e| Error::IO(e))?;
            written += SECTOR_SIZE as u64;
        }

        if options.msdos_boot_sector && partition.length() >= SECTOR_SIZE as u64 {
            let sector = self.read_sector(position).await?;
            let msdos = BootSector::decode(&sector).to_msdos(&sector);
            sink.write(&msdos).await.map_err(|e| Error::IO(e))?;
            position += SECTOR_SIZE as u64;
            written += SECTOR_SIZE as u64;
        }

        let mut buffer = vec![0u8; CHUNK_SIZE];
        while position < end {
            let length = (end - position).min(CHUNK_SIZE as u64) as usize;
            self.io.read(position, &mut buffer[..length]).await.map_err(|e| Error::IO(e))?;
            sink.write(&buffer[..length]).await.map_err(|e| Error::IO(e))?;
            position += length as u64;
            written += length as u64;
        }
        sink.flush().await.map_err(|e| Error::IO(e))?;
        debug!("Partition {} extracted, {} bytes written", partition.number(), written);
        Ok(written)
    }
}
