#[cfg(feature = "async")]
use alloc::boxed::Box;
use alloc::vec::Vec;

#[cfg(feature = "async")]
use async_trait::async_trait;
use displaydoc::Display;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum MemoryError {
    /// Read of {length} bytes at offset {offset} beyond end of image
    OutOfBounds { offset: u64, length: usize },
}

/// Disk image held in memory, also usable as a growing sink when backed by a `Vec`
#[derive(Clone, Debug, Default)]
pub struct Memory<T>(pub T);

impl<T> Memory<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl<T: AsRef<[u8]> + Send> super::Image for Memory<T> {
    type Error = MemoryError;

    async fn length(&mut self) -> Result<u64, Self::Error> {
        Ok(self.0.as_ref().len() as u64)
    }

    async fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        let bytes = self.0.as_ref();
        let error = MemoryError::OutOfBounds { offset, length: buf.len() };
        let start = usize::try_from(offset).map_err(|_| error)?;
        let end = start.checked_add(buf.len()).ok_or(error)?;
        buf.copy_from_slice(bytes.get(start..end).ok_or(error)?);
        Ok(())
    }
}

#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl super::Sink for Memory<Vec<u8>> {
    type Error = MemoryError;

    async fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.extend_from_slice(data);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
