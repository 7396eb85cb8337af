use core::fmt::{Debug, Display, Formatter, Result};

use displaydoc::Display as DisplayDoc;
use thiserror::Error;

#[derive(Copy, Clone, Debug, DisplayDoc, Error, PartialEq, Eq)]
pub enum DataError {
    /// Partition chain revisits root sector at offset {0}
    ChainCycle(u64),
    /// Partition chain longer than {0} root sectors
    ChainTooDeep(usize),
    /// Chained root sector at offset {0} beyond end of image
    ChainOutOfBounds(u64),
    /// Partition {number} ends at {end}, beyond end of image
    PartitionOutOfBounds { number: u8, end: u64 },
}

#[derive(Copy, Clone, Debug, DisplayDoc, Error, PartialEq, Eq)]
pub enum InputError {
    /// At most {0} partition entries fit into a master boot record
    TooManyPartitions(usize),
    /// Partition of {0} sectors too large for a master boot record
    PartitionTooLarge(u64),
    /// Partition {0} is not a real partition
    NotRealPartition(u8),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    IO(E),
    Data(DataError),
    Input(InputError),
}

impl<E> From<DataError> for Error<E> {
    fn from(error: DataError) -> Self {
        Self::Data(error)
    }
}

impl<E> From<InputError> for Error<E> {
    fn from(error: InputError) -> Self {
        Self::Input(error)
    }
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::IO(e) => write!(f, "IO({})", e),
            Self::Data(e) => write!(f, "Data({})", e),
            Self::Input(e) => write!(f, "Input({})", e),
        }
    }
}

impl<E: Debug + Display> core::error::Error for Error<E> {}
