//! Encoder used to build fixtures in tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use super::tag::{Tag, TagKind};

/// Encodes `tag` as an uncompressed named root.
pub fn write_named(name: &str, tag: &Tag) -> Vec<u8> {
    let mut out = vec![tag.kind().id()];
    write_string(&mut out, name);
    write_payload(&mut out, tag);
    out
}

/// Wraps `data` in gzip.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Wraps `data` in zlib.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    let len = u16::try_from(value.len()).unwrap();
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&i32::try_from(len).unwrap().to_be_bytes());
}

fn write_payload(out: &mut Vec<u8>, tag: &Tag) {
    match tag {
        Tag::Byte(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::ByteArray(values) => {
            write_len(out, values.len());
            out.extend(values.iter().flat_map(|v| v.to_be_bytes()));
        }
        Tag::String(value) => write_string(out, value),
        Tag::List(items) => {
            let kind = items.first().map_or(TagKind::End, Tag::kind);
            out.push(kind.id());
            write_len(out, items.len());
            for item in items {
                write_payload(out, item);
            }
        }
        Tag::Compound(map) => {
            for (name, value) in map {
                out.push(value.kind().id());
                write_string(out, name);
                write_payload(out, value);
            }
            out.push(TagKind::End.id());
        }
        Tag::IntArray(values) => {
            write_len(out, values.len());
            out.extend(values.iter().flat_map(|v| v.to_be_bytes()));
        }
        Tag::LongArray(values) => {
            write_len(out, values.len());
            out.extend(values.iter().flat_map(|v| v.to_be_bytes()));
        }
    }
}
