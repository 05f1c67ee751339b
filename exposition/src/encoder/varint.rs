use std::io::{self, Write};

/// Write `value` as an unsigned LEB128 varint, the length prefix of a
/// delimited protobuf stream. Returns the number of bytes written.
pub fn write_varint<W: Write + ?Sized>(mut value: u64, writer: &mut W) -> io::Result<usize> {
    let mut buf = [0u8; 10];
    let mut n = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf[n] = byte;
            n += 1;
            break;
        }
        buf[n] = byte | 0x80;
        n += 1;
    }
    writer.write_all(&buf[..n])?;
    Ok(n)
}
