use std::io::SeekFrom;
use std::path::Path;
#[cfg(not(feature = "async"))]
use std::{fs, io::prelude::*};

#[cfg(all(feature = "async", feature = "smol"))]
use smol::fs;
#[cfg(all(feature = "async", feature = "smol"))]
use smol::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
#[cfg(all(feature = "async", feature = "tokio"))]
use tokio::fs;
#[cfg(all(feature = "async", feature = "tokio"))]
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

#[cfg(feature = "async")]
use async_trait::async_trait;

/// Hard disk image file, opened read only
#[derive(Debug)]
pub struct FileImage {
    file: fs::File,
}

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl FileImage {
    pub async fn open<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let file = fs::File::open(filepath.as_ref()).await?;
        Ok(Self { file })
    }
}

#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl super::Image for FileImage {
    type Error = std::io::Error;

    async fn length(&mut self) -> Result<u64, Self::Error> {
        Ok(self.file.metadata().await?.len())
    }

    async fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.read_exact(buf).await.map(|_| ())
    }
}

/// Newly created file receiving an extracted partition
#[derive(Debug)]
pub struct FileSink {
    file: fs::File,
}

#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl FileSink {
    /// Fails if `filepath` exists already
    pub async fn create<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let mut options = fs::OpenOptions::new();
        let file = options.write(true).create_new(true).open(filepath.as_ref()).await?;
        Ok(Self { file })
    }
}

#[cfg_attr(feature = "async", async_trait)]
#[cfg_attr(not(feature = "async"), deasync::deasync)]
impl super::Sink for FileSink {
    type Error = std::io::Error;

    async fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.file.write_all(data).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush().await
    }
}
