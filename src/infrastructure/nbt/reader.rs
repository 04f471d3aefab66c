use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use super::error::{NbtError, NbtResult};
use super::tag::{Compound, NamedTag, Tag, TagKind};

/// Deepest allowed nesting of lists and compounds.
pub const MAX_DEPTH: usize = 512;

/// Largest payload accepted after decompression.
pub const MAX_DECOMPRESSED_SIZE: u64 = 256 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parses an NBT document, inflating gzip or zlib wrappers when present.
///
/// # Errors
/// Returns error if decompression fails or the payload is malformed.
pub fn parse(data: &[u8]) -> NbtResult<NamedTag> {
    if data.starts_with(&GZIP_MAGIC) {
        parse_uncompressed(&inflate(GzDecoder::new(data))?)
    } else if is_zlib_header(data) {
        parse_uncompressed(&inflate(ZlibDecoder::new(data))?)
    } else {
        parse_uncompressed(data)
    }
}

/// Parses an uncompressed NBT document.
///
/// # Errors
/// Returns error if the payload is malformed.
pub fn parse_uncompressed(data: &[u8]) -> NbtResult<NamedTag> {
    let mut reader = Reader { data, pos: 0 };

    let offset = reader.pos;
    let id = reader.read_u8()?;
    let kind = TagKind::from_id(id).ok_or(NbtError::UnknownTag { id, offset })?;
    if kind == TagKind::End {
        return Err(NbtError::InvalidRoot { kind });
    }

    let name = reader.read_string()?;
    let tag = reader.read_payload(kind, 0)?;

    Ok(NamedTag { name, tag })
}

fn is_zlib_header(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => *cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

fn inflate(decoder: impl Read) -> NbtResult<Vec<u8>> {
    let mut buffer = Vec::new();
    decoder
        .take(MAX_DECOMPRESSED_SIZE + 1)
        .read_to_end(&mut buffer)?;

    if buffer.len() as u64 > MAX_DECOMPRESSED_SIZE {
        return Err(NbtError::TooLarge {
            limit: MAX_DECOMPRESSED_SIZE,
        });
    }
    Ok(buffer)
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> NbtResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(NbtError::UnexpectedEof { offset: self.pos })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> NbtResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> NbtResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    fn read_i16(&mut self) -> NbtResult<i16> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    fn read_i32(&mut self) -> NbtResult<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    fn read_i64(&mut self) -> NbtResult<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    /// Reads a signed length and checks that `len * element_size` bytes remain.
    fn read_length(&mut self, element_size: usize) -> NbtResult<usize> {
        let offset = self.pos;
        let length = self.read_i32()?;
        let len = usize::try_from(length).map_err(|_| NbtError::NegativeLength { length, offset })?;

        let remaining = self.data.len() - self.pos;
        if len.saturating_mul(element_size) > remaining {
            return Err(NbtError::UnexpectedEof { offset });
        }
        Ok(len)
    }

    fn read_string(&mut self) -> NbtResult<String> {
        let len = usize::from(u16::from_be_bytes(self.take_array()?));
        let bytes = self.take(len)?;
        // Java writes modified UTF-8; plain UTF-8 covers everything but NUL and
        // supplementary characters, which degrade to replacement characters.
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_payload(&mut self, kind: TagKind, depth: usize) -> NbtResult<Tag> {
        Ok(match kind {
            TagKind::End => return Err(NbtError::InvalidRoot { kind }),
            TagKind::Byte => Tag::Byte(i8::from_be_bytes(self.take_array()?)),
            TagKind::Short => Tag::Short(self.read_i16()?),
            TagKind::Int => Tag::Int(self.read_i32()?),
            TagKind::Long => Tag::Long(self.read_i64()?),
            TagKind::Float => Tag::Float(f32::from_be_bytes(self.take_array()?)),
            TagKind::Double => Tag::Double(f64::from_be_bytes(self.take_array()?)),
            TagKind::ByteArray => {
                let len = self.read_length(1)?;
                Tag::ByteArray(self.take(len)?.iter().map(|b| i8::from_be_bytes([*b])).collect())
            }
            TagKind::String => Tag::String(self.read_string()?),
            TagKind::List => self.read_list(depth)?,
            TagKind::Compound => Tag::Compound(self.read_compound(depth)?),
            TagKind::IntArray => {
                let len = self.read_length(4)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.read_i32()?);
                }
                Tag::IntArray(values)
            }
            TagKind::LongArray => {
                let len = self.read_length(8)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.read_i64()?);
                }
                Tag::LongArray(values)
            }
        })
    }

    fn read_list(&mut self, depth: usize) -> NbtResult<Tag> {
        let depth = Self::descend(depth)?;

        let offset = self.pos;
        let id = self.read_u8()?;
        let kind = TagKind::from_id(id).ok_or(NbtError::UnknownTag { id, offset })?;
        let len = self.read_length(1)?;

        if kind == TagKind::End {
            if len > 0 {
                return Err(NbtError::InvalidList {
                    kind,
                    length: i32::try_from(len).unwrap_or(i32::MAX),
                });
            }
            return Ok(Tag::List(Vec::new()));
        }

        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_payload(kind, depth)?);
        }
        Ok(Tag::List(items))
    }

    fn read_compound(&mut self, depth: usize) -> NbtResult<Compound> {
        let depth = Self::descend(depth)?;
        let mut map = Compound::new();

        loop {
            let offset = self.pos;
            let id = self.read_u8()?;
            let kind = TagKind::from_id(id).ok_or(NbtError::UnknownTag { id, offset })?;
            if kind == TagKind::End {
                return Ok(map);
            }

            let name = self.read_string()?;
            let value = self.read_payload(kind, depth)?;
            map.insert(name, value);
        }
    }

    const fn descend(depth: usize) -> NbtResult<usize> {
        if depth >= MAX_DEPTH {
            return Err(NbtError::DepthExceeded { limit: MAX_DEPTH });
        }
        Ok(depth + 1)
    }
}
