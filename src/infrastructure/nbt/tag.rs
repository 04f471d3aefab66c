use std::collections::BTreeMap;

/// Named children of a compound tag.
pub type Compound = BTreeMap<String, Tag>;

/// Tag type ids as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TagKind {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagKind {
    /// Maps a wire id to its kind.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            _ => return None,
        })
    }

    /// Wire id of this kind.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// A decoded tag payload.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> TagKind {
        match self {
            Self::Byte(_) => TagKind::Byte,
            Self::Short(_) => TagKind::Short,
            Self::Int(_) => TagKind::Int,
            Self::Long(_) => TagKind::Long,
            Self::Float(_) => TagKind::Float,
            Self::Double(_) => TagKind::Double,
            Self::ByteArray(_) => TagKind::ByteArray,
            Self::String(_) => TagKind::String,
            Self::List(_) => TagKind::List,
            Self::Compound(_) => TagKind::Compound,
            Self::IntArray(_) => TagKind::IntArray,
            Self::LongArray(_) => TagKind::LongArray,
        }
    }

    /// Returns the children if this is a compound.
    #[must_use]
    pub const fn as_compound(&self) -> Option<&Compound> {
        match self {
            Self::Compound(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the value if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if this is an integer tag of any width up to 32 bits.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::Byte(v) => Some(i32::from(v)),
            Self::Short(v) => Some(i32::from(v)),
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up a child when this is a compound.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.as_compound().and_then(|map| map.get(key))
    }
}

/// Root tag together with its name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
    /// Root name, usually empty.
    pub name: String,
    /// Root payload.
    pub tag: Tag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_round_trip() {
        for id in 0..=12u8 {
            assert_eq!(TagKind::from_id(id).map(TagKind::id), Some(id));
        }
        assert_eq!(TagKind::from_id(13), None);
    }

    #[test]
    fn test_accessors() {
        let tag = Tag::Compound(Compound::from([
            ("Name".to_string(), Tag::String("1.20.4".to_string())),
            ("Id".to_string(), Tag::Short(7)),
        ]));

        assert_eq!(tag.get("Name").and_then(Tag::as_str), Some("1.20.4"));
        assert_eq!(tag.get("Id").and_then(Tag::as_i32), Some(7));
        assert_eq!(tag.get("Missing"), None);
        assert_eq!(Tag::Int(1).get("Name"), None);
    }
}
