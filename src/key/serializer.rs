use serde::ser::{self, Serialize};

use crate::errors::KeyError;

/// Renders a value into a canonical, type-tagged text form for cache keying.
///
/// The scheme is deliberately stricter than generic structural output such as
/// JSON, where `1`, `1.0` and `"1"` can end up indistinguishable:
///
/// - every scalar carries a type tag (`i:1;`, `u:1;`, `s:1:1;`, ...), so
///   values of different kinds never alias;
/// - floats are keyed by their exact bit pattern; NaN and the infinities are
///   rejected with [`KeyError::Unsupported`] instead of being collapsed;
/// - strings and byte blobs are length-prefixed, so embedded delimiters
///   cannot create ambiguity;
/// - sequences and tuples are order-sensitive; map entries are sorted by
///   their rendered key text, so logically equal maps key equally regardless
///   of iteration order;
/// - struct, enum and variant names participate in the key.
pub struct KeySerializer<'a> {
    out: &'a mut String,
}

impl<'a> KeySerializer<'a> {
    pub fn new(out: &'a mut String) -> Self {
        Self { out }
    }

    fn scalar(self, tag: &str, value: impl std::fmt::Display) -> Result<(), KeyError> {
        self.out.push_str(&format!("{tag}:{value};"));
        Ok(())
    }
}

impl<'a> ser::Serializer for KeySerializer<'a> {
    type Ok = ();
    type Error = KeyError;

    type SerializeSeq = SeqKeySerializer<'a>;
    type SerializeTuple = SeqKeySerializer<'a>;
    type SerializeTupleStruct = SeqKeySerializer<'a>;
    type SerializeTupleVariant = SeqKeySerializer<'a>;
    type SerializeMap = MapKeySerializer<'a>;
    type SerializeStruct = StructKeySerializer<'a>;
    type SerializeStructVariant = StructKeySerializer<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), KeyError> {
        self.scalar("b", v)
    }

    fn serialize_i8(self, v: i8) -> Result<(), KeyError> {
        self.scalar("i", v)
    }

    fn serialize_i16(self, v: i16) -> Result<(), KeyError> {
        self.scalar("i", v)
    }

    fn serialize_i32(self, v: i32) -> Result<(), KeyError> {
        self.scalar("i", v)
    }

    fn serialize_i64(self, v: i64) -> Result<(), KeyError> {
        self.scalar("i", v)
    }

    fn serialize_u8(self, v: u8) -> Result<(), KeyError> {
        self.scalar("u", v)
    }

    fn serialize_u16(self, v: u16) -> Result<(), KeyError> {
        self.scalar("u", v)
    }

    fn serialize_u32(self, v: u32) -> Result<(), KeyError> {
        self.scalar("u", v)
    }

    fn serialize_u64(self, v: u64) -> Result<(), KeyError> {
        self.scalar("u", v)
    }

    fn serialize_f32(self, v: f32) -> Result<(), KeyError> {
        if !v.is_finite() {
            return Err(KeyError::Unsupported(format!("non-finite float {v}")));
        }
        self.out.push_str(&format!("f4:{:08x};", v.to_bits()));
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), KeyError> {
        if !v.is_finite() {
            return Err(KeyError::Unsupported(format!("non-finite float {v}")));
        }
        self.out.push_str(&format!("f8:{:016x};", v.to_bits()));
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), KeyError> {
        self.scalar("c", u32::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<(), KeyError> {
        self.out.push_str(&format!("s:{}:{v};", v.len()));
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), KeyError> {
        self.out.push_str(&format!("x:{}:", v.len()));
        for byte in v {
            self.out.push_str(&format!("{byte:02x}"));
        }
        self.out.push(';');
        Ok(())
    }

    fn serialize_none(self) -> Result<(), KeyError> {
        self.out.push_str("n;");
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.out.push_str("o:");
        value.serialize(KeySerializer::new(self.out))
    }

    fn serialize_unit(self) -> Result<(), KeyError> {
        self.out.push_str("z;");
        Ok(())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), KeyError> {
        self.out.push_str(&format!("zs:{name};"));
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), KeyError> {
        self.out.push_str(&format!("ev:{name}:{variant};"));
        Ok(())
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.out.push_str(&format!("ns:{name}:"));
        value.serialize(KeySerializer::new(self.out))
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.out.push_str(&format!("nv:{name}:{variant}:"));
        value.serialize(KeySerializer::new(self.out))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, KeyError> {
        self.out.push('[');
        Ok(SeqKeySerializer {
            out: self.out,
            closer: "];",
        })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, KeyError> {
        self.out.push_str("t(");
        Ok(SeqKeySerializer {
            out: self.out,
            closer: ");",
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, KeyError> {
        self.out.push_str(&format!("ts:{name}("));
        Ok(SeqKeySerializer {
            out: self.out,
            closer: ");",
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, KeyError> {
        self.out.push_str(&format!("tv:{name}:{variant}("));
        Ok(SeqKeySerializer {
            out: self.out,
            closer: ");",
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, KeyError> {
        Ok(MapKeySerializer {
            out: self.out,
            entries: Vec::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, KeyError> {
        self.out.push_str(&format!("st:{name}{{"));
        Ok(StructKeySerializer { out: self.out })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, KeyError> {
        self.out.push_str(&format!("sv:{name}:{variant}{{"));
        Ok(StructKeySerializer { out: self.out })
    }
}

/// Compound serializer for sequences, tuples and tuple-like shapes.
/// Elements are emitted in order; the shape's opener has already been
/// written by the time this exists.
pub struct SeqKeySerializer<'a> {
    out: &'a mut String,
    closer: &'static str,
}

impl SeqKeySerializer<'_> {
    fn element<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(KeySerializer::new(&mut *self.out))
    }

    fn close(self) -> Result<(), KeyError> {
        self.out.push_str(self.closer);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}

impl ser::SerializeTuple for SeqKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}

impl ser::SerializeTupleStruct for SeqKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}

impl ser::SerializeTupleVariant for SeqKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}

/// Map serializer. Entries are buffered and sorted by rendered key text
/// before emission, so the key does not depend on map iteration order.
pub struct MapKeySerializer<'a> {
    out: &'a mut String,
    entries: Vec<(String, String)>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        let mut rendered = String::new();
        key.serialize(KeySerializer::new(&mut rendered))?;
        self.pending_key = Some(rendered);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        let mut rendered = String::new();
        value.serialize(KeySerializer::new(&mut rendered))?;
        let key = self.pending_key.take().unwrap_or_default();
        self.entries.push((key, rendered));
        Ok(())
    }

    fn end(mut self) -> Result<(), KeyError> {
        self.entries.sort();
        self.out.push('{');
        for (key, value) in &self.entries {
            self.out.push_str(key);
            self.out.push('=');
            self.out.push_str(value);
        }
        self.out.push_str("};");
        Ok(())
    }
}

/// Struct serializer. Field order is the declaration order, which serde
/// fixes per type, so no sorting is needed.
pub struct StructKeySerializer<'a> {
    out: &'a mut String,
}

impl StructKeySerializer<'_> {
    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.out.push_str(key);
        self.out.push('=');
        value.serialize(KeySerializer::new(&mut *self.out))
    }

    fn close(self) -> Result<(), KeyError> {
        self.out.push_str("};");
        Ok(())
    }
}

impl ser::SerializeStruct for StructKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}

impl ser::SerializeStructVariant for StructKeySerializer<'_> {
    type Ok = ();
    type Error = KeyError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<(), KeyError> {
        self.close()
    }
}
