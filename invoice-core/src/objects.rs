/// Indirect object identifier: object number plus generation.
///
/// Documents written from scratch only use generation 0; the field exists
/// because xref entries and `R` references both carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// The subset of PDF 32000-1:2008 §7.3 object types this crate emits.
///
/// Dictionary entries live in a `Vec` rather than a map so that the same
/// logical document always serializes to the same bytes.
#[derive(Debug, Clone)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored unescaped; the writer escapes on output.
    LiteralString(String),
    Array(Vec<PdfObject>),
    Dictionary(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn literal_string(s: impl Into<String>) -> Self {
        PdfObject::LiteralString(s.into())
    }

    pub fn reference(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn stream(dict_entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: dict_entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_preserves_entry_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::reference(ObjId(2, 0))),
            ("Contents", PdfObject::reference(ObjId(5, 0))),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["Type", "Parent", "Contents"]);
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn reference_carries_its_id() {
        match PdfObject::reference(ObjId(7, 0)) {
            PdfObject::Reference(id) => assert_eq!(id, ObjId(7, 0)),
            _ => panic!("expected Reference"),
        }
    }

    #[test]
    fn stream_keeps_dict_and_data() {
        let data = b"0 0 612 792 re\nf\n".to_vec();
        match PdfObject::stream(vec![("Length", PdfObject::Integer(17))], data.clone()) {
            PdfObject::Stream { dict, data: d } => {
                assert_eq!(dict.len(), 1);
                assert_eq!(dict[0].0, "Length");
                assert_eq!(d, data);
            }
            _ => panic!("expected Stream"),
        }
    }
}
