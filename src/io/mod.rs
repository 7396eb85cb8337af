pub mod memory;
#[cfg(feature = "std")]
pub mod std;

#[cfg(all(feature = "async", not(feature = "std")))]
use alloc::boxed::Box;
use core::fmt::Debug;

#[cfg(feature = "async")]
use async_trait::async_trait;

/// Random access to a disk image
#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
pub trait Image {
    type Error: Debug;

    /// Total length in bytes
    async fn length(&mut self) -> Result<u64, Self::Error>;
    /// Fills the whole of `buf` starting at absolute byte `offset`,
    /// a short read is an error
    async fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Destination of extracted partitions
#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
pub trait Sink {
    type Error: Debug;

    async fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
    async fn flush(&mut self) -> Result<(), Self::Error>;
}
