/// Byte order of multi-byte fields within a sector.
///
/// Root sectors are big endian, boot sectors carry a little endian BPB.
pub trait Endian {
    fn get_u16(bytes: &[u8], offset: usize) -> u16;
    fn get_u32(bytes: &[u8], offset: usize) -> u32;
    fn set_u16(bytes: &mut [u8], offset: usize, value: u16);
    fn set_u32(bytes: &mut [u8], offset: usize, value: u32);
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Big;

#[derive(Copy, Clone, Debug, Default)]
pub struct Little;

macro_rules! define {
    ($endian:ty, $from:ident, $to:ident) => {
        impl Endian for $endian {
            #[inline]
            fn get_u16(bytes: &[u8], offset: usize) -> u16 {
                u16::$from([bytes[offset], bytes[offset + 1]])
            }

            #[inline]
            fn get_u32(bytes: &[u8], offset: usize) -> u32 {
                let mut array = [0u8; 4];
                array.copy_from_slice(&bytes[offset..offset + 4]);
                u32::$from(array)
            }

            #[inline]
            fn set_u16(bytes: &mut [u8], offset: usize, value: u16) {
                bytes[offset..offset + 2].copy_from_slice(&value.$to())
            }

            #[inline]
            fn set_u32(bytes: &mut [u8], offset: usize, value: u32) {
                bytes[offset..offset + 4].copy_from_slice(&value.$to())
            }
        }
    };
}

define!(Big, from_be_bytes, to_be_bytes);
define!(Little, from_le_bytes, to_le_bytes);
