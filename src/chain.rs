use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::{DataError, Error};
use crate::io;
use crate::region::boot::BootSector;
use crate::region::root::{RootSector, NUM_PARTITIONS};
use crate::types::Role;
use crate::Disk;

/// Default limit of root sectors in a chain, master included
pub const MAX_CHAIN_DEPTH: usize = 64;

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<E: Debug, IO: io::Image<Error = E>> Disk<IO> {
    /// Reads the master root sector and every root sector chained behind it
    /// through XGM partitions, in chain order.
    ///
    /// Only the first valid and active XGM partition of a root sector is followed.
    /// Starts of XGM partitions are relative to the first chained root sector.
    pub async fn root_sectors(&mut self) -> Result<Vec<RootSector>, Error<E>> {
        let master = self.read_root_sector(Role::Master, 0, 0).await?;
        let mut next = master.xgm_partition().map(|xgm| xgm.absolute_start());
        let mut root_sectors = Vec::from([master]);
        let xgm_offset = match next {
            Some(offset) => offset,
            None => return Ok(root_sectors),
        };
        debug!("First XGM root sector at {}", xgm_offset);

        let mut visited = BTreeSet::from([0u64]);
        while let Some(offset) = next {
            if !visited.insert(offset) {
                warn!("Partition chain loops back to {}", offset);
                return Err(DataError::ChainCycle(offset).into());
            }
            if root_sectors.len() >= self.max_chain_depth {
                return Err(DataError::ChainTooDeep(self.max_chain_depth).into());
            }
            if !self.contains_sector(offset) {
                return Err(DataError::ChainOutOfBounds(offset).into());
            }
            let role = Role::Chained(root_sectors.len());
            let root_sector = self.read_root_sector(role, offset, xgm_offset).await?;
            next = root_sector.xgm_partition().map(|xgm| xgm.absolute_start());
            trace!("XGM root sector at {}, next {:?}", offset, next);
            root_sectors.push(root_sector);
        }
        Ok(root_sectors)
    }

    /// Reads one root sector at absolute `offset` and the boot sectors of
    /// its real partitions that lie within the image.
    pub async fn read_root_sector(
        &mut self,
        role: Role,
        offset: u64,
        xgm_offset: u64,
    ) -> Result<RootSector, Error<E>> {
        let sector = self.read_sector(offset).await?;
        let root_sector = RootSector::decode(role, offset, xgm_offset, &sector);
        self.resolve_boot_sectors(root_sector).await
    }

    pub(crate) async fn resolve_boot_sectors(
        &mut self,
        root_sector: RootSector,
    ) -> Result<RootSector, Error<E>> {
        let mut boot_sectors: [Option<BootSector>; NUM_PARTITIONS] = Default::default();
        for partition in root_sector.real_partitions() {
            let start = partition.absolute_start();
            if !self.contains_sector(start) {
                debug!("Partition {} at {} beyond end of image", partition.number(), start);
                continue;
            }
            let sector = self.read_sector(start).await?;
            boot_sectors[partition.number() as usize] = Some(BootSector::decode(&sector));
        }
        Ok(root_sector.map_partitions(|partition| {
            match boot_sectors[partition.number() as usize].take() {
                Some(boot_sector) => partition.with_boot_sector(boot_sector),
                None => partition,
            }
        }))
    }
}
