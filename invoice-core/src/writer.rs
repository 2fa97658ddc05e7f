use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level PDF emitter. Serializes objects to any `Write` target while
/// tracking byte offsets for the cross-reference table. Output is strictly
/// append-only; nothing is ever seeked or rewritten.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref_entries: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref_entries: Vec::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// PDF 1.7 header plus the binary-detection comment line.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_str("%PDF-1.7\n")?;
        // Four bytes >= 128 so transfer tools treat the file as binary.
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object, recording its offset for the xref table.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref_entries.push((id.0, self.offset));
        self.write_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_value(obj)?;
        self.write_str("\nendobj\n")
    }

    fn write_value(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Integer(n) => self.write_str(&n.to_string()),
            PdfObject::Real(v) => self.write_str(&format_real(*v)),
            PdfObject::Name(name) => {
                self.write_str("/")?;
                self.write_str(name)
            }
            PdfObject::LiteralString(s) => {
                self.write_str("(")?;
                self.write_str(&escape_literal(s))?;
                self.write_str(")")
            }
            PdfObject::Array(items) => {
                self.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_value(item)?;
                }
                self.write_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_dict_open(entries)?;
                self.write_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_dict_open(dict)?;
                // Length is derived from the data, never caller-supplied.
                self.write_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.write_bytes(data)?;
                self.write_str("\nendstream")
            }
            PdfObject::Reference(id) => self.write_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    fn write_dict_open(&mut self, entries: &[(String, PdfObject)]) -> io::Result<()> {
        self.write_str("<<")?;
        for (key, val) in entries {
            self.write_str(" /")?;
            self.write_str(key)?;
            self.write_str(" ")?;
            self.write_value(val)?;
        }
        Ok(())
    }

    /// Write the xref table, trailer, startxref pointer, and `%%EOF`.
    ///
    /// Objects may have been written in any order; entries are sorted by
    /// object number here and unwritten numbers become free entries.
    pub fn write_xref_and_trailer(
        &mut self,
        root_id: ObjId,
        info_id: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_offset = self.offset;

        let mut entries = std::mem::take(&mut self.xref_entries);
        entries.sort_by_key(|&(num, _)| num);
        let size = entries.last().map(|&(num, _)| num + 1).unwrap_or(1);

        self.write_str(&format!("xref\n0 {}\n", size))?;
        // Object 0 heads the free list. Every entry is exactly 20 bytes.
        self.write_bytes(b"0000000000 65535 f\r\n")?;

        let mut next = 1u32;
        for &(num, off) in &entries {
            while next < num {
                self.write_bytes(b"0000000000 00000 f\r\n")?;
                next += 1;
            }
            self.write_str(&format!("{:010} 00000 n\r\n", off))?;
            next = num + 1;
        }

        self.write_str(&format!("trailer\n<< /Size {} /Root {} {} R", size, root_id.0, root_id.1))?;
        if let Some(info) = info_id {
            self.write_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.write_str(" >>\n")?;
        self.write_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape the characters PDF literal strings reserve: `\`, `(`, `)`.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            _ => out.push(c),
        }
    }
    out
}

/// Append already-encoded string bytes to a content stream, escaping the
/// reserved characters at the byte level.
pub(crate) fn escape_text_bytes(data: &[u8], out: &mut Vec<u8>) {
    for &b in data {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            _ => out.push(b),
        }
    }
}

/// Format a real for PDF output: plain decimal, no exponent, no noise
/// digits. Whole values keep one decimal place.
pub(crate) fn format_real(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
