use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::codec::{Sector, SECTOR_SIZE};
use crate::error::Error;
use crate::io;
use crate::region::root::RootSector;
use crate::types::Role;
use crate::Disk;

const CHUNK_SIZE: usize = 1024 * 1024;

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<E: Debug, IO: io::Image<Error = E>> Disk<IO> {
    /// Decodes every sector of the image as a root sector and returns those
    /// with at least one valid and active partition.
    ///
    /// Meant for images whose master root sector is damaged; partitions of a
    /// candidate are taken as relative to the candidate itself.
    pub async fn scan(&mut self) -> Result<Vec<RootSector>, Error<E>> {
        let mut candidates = Vec::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut position = 0u64;
        loop {
            let remaining = self.length - position;
            let length = (remaining.min(CHUNK_SIZE as u64) as usize) / SECTOR_SIZE * SECTOR_SIZE;
            if length == 0 {
                break;
            }
            self.io.read(position, &mut buffer[..length]).await.map_err(|e| Error::IO(e))?;
            let mut sector: Sector = [0u8; SECTOR_SIZE];
            for chunk in buffer[..length].chunks_exact(SECTOR_SIZE) {
                sector.copy_from_slice(chunk);
                let root_sector = RootSector::decode(Role::Detached, position, position, &sector);
                if root_sector.has_valid_partitions() {
                    debug!("Possible root sector at {}", position);
                    candidates.push(root_sector);
                }
                position += SECTOR_SIZE as u64;
            }
        }
        Ok(candidates)
    }
}
