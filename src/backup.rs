use core::fmt::Debug;

use crate::codec::SECTOR_SIZE;
use crate::error::Error;
use crate::io;
use crate::region::root::RootSector;
use crate::types::Role;
use crate::Disk;

/// Copy of the master root sector found elsewhere on the disk
#[derive(Clone, Debug, PartialEq)]
pub struct Backup {
    /// Absolute offset the copy was read from
    pub position: u64,
    /// Decoded as if it were the master, partitions are relative to 0
    pub root_sector: RootSector,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Backups {
    /// Sector right behind the master root sector
    pub first: Option<Backup>,
    /// Last sector of the disk size declared by the master root sector
    pub last: Option<Backup>,
}

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<E: Debug, IO: io::Image<Error = E>> Disk<IO> {
    /// Probes the usual places of master root sector copies.
    ///
    /// `root_sectors` is the chain as returned by `root_sectors`, master first.
    /// A copy is only reported if it does not overlap partition data and
    /// carries valid partitions. Inactive partitions still count as partition data.
    pub async fn backup_root_sectors(
        &mut self,
        root_sectors: &[RootSector],
    ) -> Result<Backups, Error<E>> {
        let mut backups = Backups::default();
        let master = match root_sectors.first() {
            Some(master) => master,
            None => return Ok(backups),
        };

        let position = master.offset() + SECTOR_SIZE as u64;
        let first_start = master.real_partitions().next().map(|p| p.absolute_start());
        if first_start.is_some_and(|start| position < start) {
            backups.first = self.read_backup(position).await?;
        }

        let size = master.size();
        let max_end = root_sectors
            .iter()
            .flat_map(|r| r.all_partitions())
            .filter(|p| p.is_valid() && !p.is_xgm())
            .map(|p| p.absolute_end())
            .max();
        if max_end.unwrap_or_default() < size && size >= SECTOR_SIZE as u64 {
            backups.last = self.read_backup(size - SECTOR_SIZE as u64).await?;
        }
        Ok(backups)
    }

    async fn read_backup(&mut self, position: u64) -> Result<Option<Backup>, Error<E>> {
        if !self.contains_sector(position) {
            debug!("Backup root sector at {} beyond end of image", position);
            return Ok(None);
        }
        let sector = self.read_sector(position).await?;
        let root_sector = RootSector::decode(Role::Detached, 0, 0, &sector);
        if !root_sector.has_valid_partitions() {
            return Ok(None);
        }
        debug!("Backup root sector at {}", position);
        let root_sector = self.resolve_boot_sectors(root_sector).await?;
        Ok(Some(Backup { position, root_sector }))
    }
}
