#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(all(feature = "async", feature = "std", not(any(feature = "smol", feature = "tokio"))))]
compile_error!("Either smol or tokio must be selected");

extern crate alloc;

#[macro_use]
extern crate hex_literal;
#[macro_use]
extern crate log;

mod backup;
mod chain;
pub mod codec;
pub mod endian;
pub mod error;
mod extract;
pub mod io;
pub mod region;
mod scan;
pub mod types;

use core::fmt::Debug;

pub use backup::{Backup, Backups};
pub use chain::MAX_CHAIN_DEPTH;
use codec::{Sector, SECTOR_SIZE};
use error::Error;
pub use extract::ExtractOptions;
pub use region::boot::BootSector;
pub use region::mbr::{Mbr, MbrEntry};
pub use region::partition::{Partition, PartitionType};
pub use region::root::RootSector;
pub use types::{FileSystem, Role};

/// Hard disk image partitioned with AHDI root sectors
pub struct Disk<IO> {
    io: IO,
    length: u64,
    max_chain_depth: usize,
}

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<E: Debug, IO: io::Image<Error = E>> Disk<IO> {
    pub async fn open(mut io: IO) -> Result<Self, Error<E>> {
        let length = io.length().await.map_err(|e| Error::IO(e))?;
        debug!("Disk image of {} bytes", length);
        Ok(Self { io, length, max_chain_depth: MAX_CHAIN_DEPTH })
    }

    /// Limits the number of root sectors followed through XGM partitions, master included
    pub fn with_max_chain_depth(self, max_chain_depth: usize) -> Self {
        Self { max_chain_depth, ..self }
    }

    /// Image length in bytes
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn into_inner(self) -> IO {
        self.io
    }

    pub(crate) async fn read_sector(&mut self, offset: u64) -> Result<Sector, Error<E>> {
        let mut sector = [0u8; SECTOR_SIZE];
        self.io.read(offset, &mut sector).await.map_err(|e| Error::IO(e))?;
        Ok(sector)
    }

    /// Whether a full sector at `offset` lies within the image
    pub(crate) fn contains_sector(&self, offset: u64) -> bool {
        offset.checked_add(SECTOR_SIZE as u64).is_some_and(|end| end <= self.length)
    }
}
