//! Fixed offset field accessors over raw sector buffers.

use heapless::String;

use crate::endian::Endian;

pub const SECTOR_SIZE: usize = 512;
pub type Sector = [u8; SECTOR_SIZE];

/// Checksum marking a sector as executable
pub const EXECUTABLE_CHECKSUM: u16 = 0x1234;

#[inline]
pub fn get_u8(bytes: &[u8], offset: usize) -> u8 {
    bytes[offset]
}

#[inline]
pub fn set_u8(bytes: &mut [u8], offset: usize, value: u8) {
    bytes[offset] = value
}

#[inline]
pub fn get_u16<E: Endian>(bytes: &[u8], offset: usize) -> u16 {
    E::get_u16(bytes, offset)
}

#[inline]
pub fn get_u32<E: Endian>(bytes: &[u8], offset: usize) -> u32 {
    E::get_u32(bytes, offset)
}

#[inline]
pub fn set_u16<E: Endian>(bytes: &mut [u8], offset: usize, value: u16) {
    E::set_u16(bytes, offset, value)
}

#[inline]
pub fn set_u32<E: Endian>(bytes: &mut [u8], offset: usize, value: u32) {
    E::set_u32(bytes, offset, value)
}

/// Reads N bytes of fixed width ASCII, right trimmed of spaces and NULs.
/// Bytes outside ASCII are replaced with '?'.
pub fn get_ascii<const N: usize>(bytes: &[u8], offset: usize) -> String<N> {
    let field = &bytes[offset..offset + N];
    let end = field.iter().rposition(|&b| b > b' ').map_or(0, |i| i + 1);
    let mut string = String::new();
    for &b in field[..end].iter() {
        string.push(if b.is_ascii() { b as char } else { '?' }).ok();
    }
    string
}

/// Writes `value` space padded to exactly `width` bytes, truncating if longer.
pub fn set_ascii(bytes: &mut [u8], offset: usize, width: usize, value: &str) {
    let field = &mut bytes[offset..offset + width];
    field.fill(b' ');
    let value = value.as_bytes();
    let length = value.len().min(width);
    field[..length].copy_from_slice(&value[..length]);
}

/// Sum of 16 bit words over `length` bytes modulo 0x10000.
pub fn checksum16<E: Endian>(bytes: &[u8], offset: usize, length: usize) -> u16 {
    let mut sum = 0u16;
    for i in (0..length).step_by(2) {
        sum = sum.wrapping_add(E::get_u16(bytes, offset + i));
    }
    sum
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::endian::{Big, Little};

    #[test]
    fn test_field_widths() {
        let mut bytes = [0u8; 16];
        set_u8(&mut bytes, 0, 0xA5);
        set_u16::<Big>(&mut bytes, 1, 0x1234);
        set_u32::<Big>(&mut bytes, 3, 0xDEADBEEF);
        set_u16::<Little>(&mut bytes, 7, 0x1234);
        set_u32::<Little>(&mut bytes, 9, 0xDEADBEEF);
        assert_eq!(bytes[..13], hex!("A5 1234 DEADBEEF 3412 EFBEADDE"));
        assert_eq!(get_u8(&bytes, 0), 0xA5);
        assert_eq!(get_u16::<Big>(&bytes, 1), 0x1234);
        assert_eq!(get_u32::<Big>(&bytes, 3), 0xDEADBEEF);
        assert_eq!(get_u16::<Little>(&bytes, 7), 0x1234);
        assert_eq!(get_u32::<Little>(&bytes, 9), 0xDEADBEEF);
    }

    #[test]
    fn test_ascii() {
        let bytes = *b"xNO NAME    \0\0y";
        let label: String<11> = get_ascii(&bytes, 1);
        assert_eq!(label.as_str(), "NO NAME");
        let empty: String<4> = get_ascii(&[b' ', 0, b' ', 0], 0);
        assert_eq!(empty.as_str(), "");
        let mut bytes = [0u8; 8];
        set_ascii(&mut bytes, 0, 8, "FAT16");
        assert_eq!(&bytes, b"FAT16   ");
        set_ascii(&mut bytes, 0, 8, "MSDOS5.0 TOO LONG");
        assert_eq!(&bytes, b"MSDOS5.0");
        let string: String<3> = get_ascii(&[b'G', 0xC4, b'M'], 0);
        assert_eq!(string.as_str(), "G?M");
    }

    #[test]
    fn test_checksum() {
        let mut sector = [0u8; SECTOR_SIZE];
        assert_eq!(checksum16::<Big>(&sector, 0, SECTOR_SIZE), 0);
        for word in 0..256 {
            set_u16::<Big>(&mut sector, word * 2, word as u16 * 0x0101);
        }
        let expected = ((0..256u32).sum::<u32>() * 0x0101 % 0x10000) as u16;
        assert_eq!(checksum16::<Big>(&sector, 0, SECTOR_SIZE), expected);

        let before = checksum16::<Big>(&sector, 0, SECTOR_SIZE);
        sector.swap(2, 5);
        assert_ne!(checksum16::<Big>(&sector, 0, SECTOR_SIZE), before);

        let mut sector = [0xFFu8; SECTOR_SIZE];
        assert_eq!(checksum16::<Big>(&sector, 0, SECTOR_SIZE), (256 * 0xFFFFu32 % 0x10000) as u16);
        set_u16::<Big>(&mut sector, 510, 0);
        let sum = checksum16::<Big>(&sector, 0, SECTOR_SIZE);
        set_u16::<Big>(&mut sector, 510, EXECUTABLE_CHECKSUM.wrapping_sub(sum));
        assert_eq!(checksum16::<Big>(&sector, 0, SECTOR_SIZE), EXECUTABLE_CHECKSUM);
    }
}
