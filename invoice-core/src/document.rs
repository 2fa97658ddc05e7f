use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::{encode_win_ansi, BuiltinFont, TextStyle};
use crate::graphics::{Color, Rect};
use crate::images::{self, ImageData, ImageFormat, ImageId};
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_text_bytes, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_OBJS: [(BuiltinFont, ObjId); 3] = [
    (BuiltinFont::Helvetica, ObjId(3, 0)),
    (BuiltinFont::HelveticaBold, ObjId(4, 0)),
    (BuiltinFont::HelveticaOblique, ObjId(5, 0)),
];
const FIRST_DYNAMIC_OBJ_NUM: u32 = 6;

/// High-level API for building PDF documents.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// Pages are written incrementally: `end_page()` flushes the finished
/// page to the writer and frees its content from memory. Nothing written
/// is ever revisited, so the sink only needs to support forward writes.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
    images: Vec<PendingImage>,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
    used_images: BTreeSet<usize>,
}

struct PendingImage {
    data: ImageData,
    /// Set once the XObject has been written to the sink.
    written_id: Option<ObjId>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create a new PDF document that writes to a file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Create a new PDF document over the given writer. The header and the
    /// shared built-in font objects are written immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;

        for (font, id) in FONT_OBJS {
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
                ("Encoding", PdfObject::name("WinAnsiEncoding")),
            ]);
            pdf_writer.write_object(id, &dict)?;
        }

        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_DYNAMIC_OBJ_NUM,
            compress: false,
            images: Vec::new(),
        })
    }

    /// Compress content streams with FlateDecode. Takes effect for pages
    /// ended after the call.
    pub fn set_compression(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Set a document info entry (e.g. "Title", "Producer").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Begin a new page with the given dimensions in points. An open page
    /// is closed first.
    pub fn begin_page(&mut self, width: f64, height: f64) -> io::Result<&mut Self> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content_ops: Vec::new(),
            used_images: BTreeSet::new(),
        });
        Ok(self)
    }

    fn page_mut(&mut self) -> &mut PageBuilder {
        self.current_page.as_mut().expect("no open page")
    }

    fn page_height(&self) -> f64 {
        self.current_page.as_ref().expect("no open page").height
    }

    /// Place text at (x, y) in 12pt Helvetica. Coordinates use PDF's
    /// bottom-left origin and address the baseline.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.place_text_styled(text, x, y, &TextStyle::default())
    }

    /// Place text at (x, y) with an explicit font and size.
    pub fn place_text_styled(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> &mut Self {
        let encoded = encode_win_ansi(text);
        let page = self.page_mut();
        page.content_ops.extend_from_slice(
            format!(
                "BT\n/{} {} Tf\n{} {} Td\n(",
                style.font.pdf_name(),
                format_coord(style.font_size),
                format_coord(x),
                format_coord(y),
            )
            .as_bytes(),
        );
        escape_text_bytes(&encoded, &mut page.content_ops);
        page.content_ops.extend_from_slice(b") Tj\nET\n");
        self
    }

    /// Push the graphics state (q).
    pub fn save_state(&mut self) -> &mut Self {
        self.page_mut().content_ops.extend_from_slice(b"q\n");
        self
    }

    /// Pop the graphics state (Q).
    pub fn restore_state(&mut self) -> &mut Self {
        self.page_mut().content_ops.extend_from_slice(b"Q\n");
        self
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        let op = format!(
            "{} {} {} rg\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b)
        );
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        let op = format!(
            "{} {} {} RG\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b)
        );
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        let op = format!("{} w\n", format_coord(width));
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let op = format!("{} {} m\n", format_coord(x), format_coord(y));
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let op = format!("{} {} l\n", format_coord(x), format_coord(y));
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    /// Stroke the current path (S).
    pub fn stroke(&mut self) -> &mut Self {
        self.page_mut().content_ops.extend_from_slice(b"S\n");
        self
    }

    /// Append a rectangle to the current path. PDF bottom-left coordinates.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let op = format!(
            "{} {} {} {} re\n",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height)
        );
        self.page_mut().content_ops.extend_from_slice(op.as_bytes());
        self
    }

    /// Fill the current path (f).
    pub fn fill(&mut self) -> &mut Self {
        self.page_mut().content_ops.extend_from_slice(b"f\n");
        self
    }

    /// Register decoded image data for placement. The XObject itself is
    /// written when the first page using it ends.
    pub fn add_image(&mut self, data: ImageData) -> ImageId {
        self.images.push(PendingImage { data, written_id: None });
        ImageId(self.images.len() - 1)
    }

    /// Parse raw PNG/JPEG bytes and register the result.
    pub fn load_image_bytes(&mut self, bytes: Vec<u8>) -> Result<ImageId, String> {
        let data = images::load_image(bytes)?;
        Ok(self.add_image(data))
    }

    /// Draw an image scaled to fit inside `rect` (top-down layout
    /// coordinates), preserving aspect ratio, anchored at the rect's
    /// top-left corner.
    pub fn place_image(&mut self, id: ImageId, rect: &Rect) -> &mut Self {
        let (img_w, img_h) = {
            let img = &self.images.get(id.0).expect("unknown image id").data;
            (img.width, img.height)
        };
        let page_height = self.page_height();
        let p = images::fit_into(img_w, img_h, rect, page_height);
        let page = self.page_mut();
        page.used_images.insert(id.0);
        let op = format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            format_coord(p.width),
            format_coord(p.height),
            format_coord(p.x),
            format_coord(p.y),
            id.0,
        );
        page.content_ops.extend_from_slice(op.as_bytes());
        self
    }

    fn alloc_obj(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    /// Write the XObject (and SMask, if any) for a registered image.
    fn write_image_object(&mut self, index: usize) -> io::Result<ObjId> {
        if let Some(id) = self.images[index].written_id {
            return Ok(id);
        }

        let smask_id = if self.images[index].data.smask_data.is_some() {
            let id = self.alloc_obj();
            let img = &self.images[index].data;
            let alpha = deflate(img.smask_data.as_deref().unwrap_or(&[]));
            let smask = PdfObject::stream(
                vec![
                    ("Type", PdfObject::name("XObject")),
                    ("Subtype", PdfObject::name("Image")),
                    ("Width", PdfObject::Integer(img.width as i64)),
                    ("Height", PdfObject::Integer(img.height as i64)),
                    ("ColorSpace", PdfObject::name("DeviceGray")),
                    ("BitsPerComponent", PdfObject::Integer(8)),
                    ("Filter", PdfObject::name("FlateDecode")),
                ],
                alpha,
            );
            self.writer.write_object(id, &smask)?;
            Some(id)
        } else {
            None
        };

        let id = self.alloc_obj();
        let img = &self.images[index].data;
        let (filter, payload) = match img.format {
            ImageFormat::Jpeg => ("DCTDecode", img.data.clone()),
            ImageFormat::Png => ("FlateDecode", deflate(&img.data)),
        };
        let mut entries = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(img.width as i64)),
            ("Height", PdfObject::Integer(img.height as i64)),
            ("ColorSpace", PdfObject::name(img.color_space.pdf_name())),
            ("BitsPerComponent", PdfObject::Integer(img.bits_per_component as i64)),
            ("Filter", PdfObject::name(filter)),
        ];
        if let Some(smask) = smask_id {
            entries.push(("SMask", PdfObject::Reference(smask)));
        }
        let obj = PdfObject::stream(entries, payload);
        self.writer.write_object(id, &obj)?;
        self.images[index].written_id = Some(id);
        Ok(id)
    }

    /// End the current page: write its content stream, image XObjects, and
    /// page dictionary, then drop the buffered content.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = self.current_page.take().expect("no open page");

        let mut xobjects: BTreeMap<usize, ObjId> = BTreeMap::new();
        for index in &page.used_images {
            xobjects.insert(*index, self.write_image_object(*index)?);
        }

        let content_id = self.alloc_obj();
        let content_stream = if self.compress {
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                deflate(&page.content_ops),
            )
        } else {
            PdfObject::stream(vec![], page.content_ops)
        };
        self.writer.write_object(content_id, &content_stream)?;

        let font_refs = FONT_OBJS
            .iter()
            .map(|(font, id)| (font.pdf_name(), PdfObject::Reference(*id)))
            .collect();
        let mut resources = vec![("Font", PdfObject::dict(font_refs))];
        let image_names: Vec<String> = xobjects.keys().map(|i| format!("Im{}", i)).collect();
        if !xobjects.is_empty() {
            let entries = image_names
                .iter()
                .map(String::as_str)
                .zip(xobjects.values().map(|id| PdfObject::Reference(*id)))
                .collect();
            resources.push(("XObject", PdfObject::dict(entries)));
        }

        let page_id = self.alloc_obj();
        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::array(vec![
                    PdfObject::Integer(0),
                    PdfObject::Integer(0),
                    PdfObject::Real(page.width),
                    PdfObject::Real(page.height),
                ]),
            ),
            ("Contents", PdfObject::Reference(content_id)),
            ("Resources", PdfObject::Dictionary(resources.into_iter().map(|(k, v)| (k.to_string(), v)).collect())),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_obj_ids.push(page_id);
        Ok(())
    }

    /// Finish the document: close any open page, write the info dictionary,
    /// pages tree, catalog, xref, and trailer. Returns the underlying sink;
    /// the caller decides when to flush it.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc_obj();
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v.as_str())))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids: Vec<PdfObject> = self.page_obj_ids.iter().map(|id| PdfObject::Reference(*id)).collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(self.page_obj_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// Format a coordinate for content streams: integers print bare, fractions
/// keep at most four decimals.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
