//! Flow layout for the one-page invoice document.
//!
//! The page is a sequence of blocks laid out top to bottom. Every block is
//! a pure function from its input cursor (and the invoice content) to the
//! lines it emits plus the cursor after it; `layout_invoice` folds the
//! blocks in order and records every named offset in [`LayoutMetrics`].
//! Nothing here touches I/O, so the arithmetic the blocks perform is
//! directly assertable in tests.
//!
//! Coordinates are top-down: `y` is a text baseline's distance from the top
//! edge of the page. Conversion to PDF's bottom-up coordinates happens in
//! the renderer.

use chrono::NaiveDate;

use crate::fonts::{BuiltinFont, FontMetrics, TextStyle};
use crate::graphics::Rect;
use crate::invoice::{ClientInfo, CompanyInfo, Invoice, LineItem};

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

pub const TOP_MARGIN: f64 = 50.0;
pub const LEFT_MARGIN: f64 = 50.0;
pub const RIGHT_EDGE: f64 = PAGE_WIDTH - 50.0;

/// Vertical step between stacked lines.
pub const LINE_HEIGHT: f64 = 15.0;

/// Cursor advance reserved when a logo is present.
pub const LOGO_RESERVED_HEIGHT: f64 = 70.0;
pub const LOGO_BOX_WIDTH: f64 = 150.0;
pub const LOGO_BOX_HEIGHT: f64 = 60.0;

/// Left edge of the right-hand title column.
pub const TITLE_COLUMN_X: f64 = 400.0;
/// Left edge of the values next to the title-column labels.
pub const TITLE_VALUE_X: f64 = 460.0;

/// The client block never starts above this offset.
pub const CLIENT_MIN_Y: f64 = 125.0;
pub const HEADER_CLIENT_GAP: f64 = 25.0;
pub const CLIENT_TABLE_GAP: f64 = 30.0;

/// Item table geometry: header baseline to rule, header baseline to first
/// row baseline, and the fixed per-row advance.
pub const TABLE_HEADER_RULE_GAP: f64 = 15.0;
pub const TABLE_FIRST_ROW_GAP: f64 = 25.0;
pub const ROW_HEIGHT: f64 = 20.0;

/// Right edges of the numeric columns.
pub const QTY_RIGHT_X: f64 = 380.0;
pub const RATE_RIGHT_X: f64 = 470.0;
pub const AMOUNT_RIGHT_X: f64 = RIGHT_EDGE;

pub const ITEMS_TOTALS_GAP: f64 = 10.0;
pub const RULE_SUBTOTAL_GAP: f64 = 15.0;
pub const FOOTER_GAP: f64 = 40.0;

const BODY_SIZE: f64 = 10.0;
const TITLE_SIZE: f64 = 20.0;
const TOTAL_SIZE: f64 = 12.0;

/// One positioned line of text; `y` is the baseline offset from the top.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
}

/// Horizontal rule from `x1` to `x2` at offset `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleLine {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

/// Every named vertical offset the layout produced. Offsets are baselines
/// except for the block origins, which are cursor positions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMetrics {
    /// Cursor where header text begins: the top margin, pushed down by the
    /// logo reservation when a logo is present.
    pub header_origin: f64,
    /// Baseline of the last company line.
    pub header_end: f64,
    pub title_origin: f64,
    /// Baseline of the last title-column line actually emitted.
    pub title_end: f64,
    pub client_origin: f64,
    /// Accumulated height: grows by one line per present optional field.
    pub client_height: f64,
    pub client_end: f64,
    /// Baseline of the item table's column header.
    pub table_origin: f64,
    pub table_rule_y: f64,
    /// Baseline of each item row, in input order.
    pub row_offsets: Vec<f64>,
    /// Cursor after the last item row.
    pub items_end: f64,
    pub totals_rule_y: f64,
    pub subtotal_offset: f64,
    /// Present only when the invoice carries tax.
    pub tax_offset: Option<f64>,
    pub total_offset: f64,
    pub footer_offset: f64,
    /// Total vertical extent consumed by the render.
    pub extent: f64,
}

/// Complete computed layout: drawable elements plus the offset record.
#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    /// Reserved logo region, when a logo will be drawn.
    pub logo: Option<Rect>,
    pub texts: Vec<TextLine>,
    pub rules: Vec<RuleLine>,
    pub metrics: LayoutMetrics,
}

fn regular(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::Helvetica, size)
}

fn bold(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::HelveticaBold, size)
}

fn oblique(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::HelveticaOblique, size)
}

fn line(x: f64, y: f64, text: impl Into<String>, style: TextStyle) -> TextLine {
    TextLine { x, y, text: text.into(), style }
}

/// Place text so its right edge lands on `right_x`.
fn right_aligned(right_x: f64, y: f64, text: impl Into<String>, style: TextStyle) -> TextLine {
    let text = text.into();
    let width = FontMetrics::measure_text(&text, style.font, style.font_size);
    TextLine { x: right_x - width, y, text, style }
}

/// Always two decimals, no grouping, no currency symbol.
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Integer quantities print bare; fractional ones keep their natural form.
pub fn format_quantity(quantity: f64) -> String {
    if quantity == quantity.trunc() && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

/// Short numeric date, e.g. `8/25/2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

struct HeaderBlock {
    lines: Vec<TextLine>,
    origin: f64,
    end: f64,
}

/// Company identity lines, pushed below the logo reservation when present.
fn header_block(company: &CompanyInfo, with_logo: bool) -> HeaderBlock {
    let origin = TOP_MARGIN + if with_logo { LOGO_RESERVED_HEIGHT } else { 0.0 };
    let fields = [
        (&company.name, bold(BODY_SIZE)),
        (&company.address, regular(BODY_SIZE)),
        (&company.email, regular(BODY_SIZE)),
        (&company.phone, regular(BODY_SIZE)),
    ];
    let lines: Vec<TextLine> = fields
        .iter()
        .enumerate()
        .map(|(i, (text, style))| {
            line(LEFT_MARGIN, origin + (i as f64 + 1.0) * LINE_HEIGHT, text.as_str(), *style)
        })
        .collect();
    let end = origin + fields.len() as f64 * LINE_HEIGHT;
    HeaderBlock { lines, origin, end }
}

struct TitleBlock {
    lines: Vec<TextLine>,
    origin: f64,
    end: f64,
}

/// Right-column title and invoice metadata. The origin clamps to the top
/// margin; a missing due date emits nothing and reserves nothing.
fn title_block(invoice: &Invoice, header_origin: f64) -> TitleBlock {
    let origin = TOP_MARGIN.max(header_origin);
    let mut lines = vec![line(TITLE_COLUMN_X, origin + 20.0, "INVOICE", bold(TITLE_SIZE))];

    let mut meta_y = origin + 40.0;
    let mut meta = |lines: &mut Vec<TextLine>, label: &str, value: &str| {
        lines.push(line(TITLE_COLUMN_X, meta_y, label, bold(BODY_SIZE)));
        lines.push(line(TITLE_VALUE_X, meta_y, value, regular(BODY_SIZE)));
        let y = meta_y;
        meta_y += LINE_HEIGHT;
        y
    };

    meta(&mut lines, "Invoice #:", &invoice.invoice_number);
    let mut end = meta(&mut lines, "Date:", &format_date(invoice.created_at.date_naive()));
    if let Some(due) = invoice.due_date {
        end = meta(&mut lines, "Due Date:", &format_date(due));
    }
    TitleBlock { lines, origin, end }
}

struct ClientBlock {
    lines: Vec<TextLine>,
    origin: f64,
    height: f64,
}

/// "Bill To" block. Conditional lines fill slots in order, so a present
/// phone occupies the slot a missing address would have used.
fn client_block(client: &ClientInfo, header_end: f64) -> ClientBlock {
    let origin = CLIENT_MIN_Y.max(header_end + HEADER_CLIENT_GAP);
    let mut lines = Vec::new();
    let mut slot = 0usize;
    let mut push = |lines: &mut Vec<TextLine>, text: &str, style: TextStyle| {
        slot += 1;
        lines.push(line(LEFT_MARGIN, origin + slot as f64 * LINE_HEIGHT, text, style));
    };

    push(&mut lines, "Bill To:", bold(BODY_SIZE));
    push(&mut lines, &client.name, regular(BODY_SIZE));
    push(&mut lines, &client.email, regular(BODY_SIZE));
    if let Some(address) = &client.address {
        push(&mut lines, address, regular(BODY_SIZE));
    }
    if let Some(phone) = &client.phone {
        push(&mut lines, phone, regular(BODY_SIZE));
    }

    let height = slot as f64 * LINE_HEIGHT;
    ClientBlock { lines, origin, height }
}

struct ItemsBlock {
    lines: Vec<TextLine>,
    rule: RuleLine,
    origin: f64,
    row_offsets: Vec<f64>,
    end: f64,
}

/// Four-column item table: fixed header, rule, one fixed-height row per
/// item in input order. Unbounded item counts simply keep extending the
/// cursor; there is no page-break handling.
fn items_block(items: &[LineItem], origin: f64) -> ItemsBlock {
    let mut lines = vec![
        line(LEFT_MARGIN, origin, "Description", bold(BODY_SIZE)),
        right_aligned(QTY_RIGHT_X, origin, "Qty", bold(BODY_SIZE)),
        right_aligned(RATE_RIGHT_X, origin, "Rate", bold(BODY_SIZE)),
        right_aligned(AMOUNT_RIGHT_X, origin, "Amount", bold(BODY_SIZE)),
    ];
    let rule = RuleLine {
        x1: LEFT_MARGIN,
        x2: RIGHT_EDGE,
        y: origin + TABLE_HEADER_RULE_GAP,
    };

    let mut row_offsets = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let y = origin + TABLE_FIRST_ROW_GAP + i as f64 * ROW_HEIGHT;
        row_offsets.push(y);
        lines.push(line(LEFT_MARGIN, y, item.description.as_str(), regular(BODY_SIZE)));
        lines.push(right_aligned(QTY_RIGHT_X, y, format_quantity(item.quantity), regular(BODY_SIZE)));
        lines.push(right_aligned(RATE_RIGHT_X, y, format_money(item.rate), regular(BODY_SIZE)));
        lines.push(right_aligned(AMOUNT_RIGHT_X, y, format_money(item.amount), regular(BODY_SIZE)));
    }

    let end = row_offsets.last().copied().unwrap_or(origin + TABLE_FIRST_ROW_GAP - ROW_HEIGHT);
    ItemsBlock { lines, rule, origin, row_offsets, end }
}

struct TotalsBlock {
    lines: Vec<TextLine>,
    rule: RuleLine,
    subtotal_y: f64,
    tax_y: Option<f64>,
    total_y: f64,
}

/// Rule, then Subtotal, a Tax line only when tax is owed, then Total at
/// heavier emphasis. The Total's slot depends on whether Tax was emitted.
fn totals_block(invoice: &Invoice, items_end: f64) -> TotalsBlock {
    let rule_y = items_end + ITEMS_TOTALS_GAP;
    let rule = RuleLine { x1: LEFT_MARGIN, x2: RIGHT_EDGE, y: rule_y };
    let mut lines = Vec::new();

    let entry = |lines: &mut Vec<TextLine>, y: f64, label: &str, value: f64, style: TextStyle| {
        lines.push(right_aligned(RATE_RIGHT_X, y, label, bold(style.font_size)));
        lines.push(right_aligned(AMOUNT_RIGHT_X, y, format_money(value), style));
    };

    let subtotal_y = rule_y + RULE_SUBTOTAL_GAP;
    entry(&mut lines, subtotal_y, "Subtotal:", invoice.subtotal, regular(BODY_SIZE));

    let tax_y = (invoice.tax > 0.0).then(|| {
        let y = subtotal_y + LINE_HEIGHT;
        entry(&mut lines, y, "Tax:", invoice.tax, regular(BODY_SIZE));
        y
    });

    let total_y = tax_y.unwrap_or(subtotal_y) + LINE_HEIGHT;
    entry(&mut lines, total_y, "Total:", invoice.total, bold(TOTAL_SIZE));

    TotalsBlock { lines, rule, subtotal_y, tax_y, total_y }
}

/// Static thank-you line, centered, a fixed drop below the totals.
fn footer_block(totals_end: f64) -> TextLine {
    let text = "Thank you for your business!";
    let style = oblique(BODY_SIZE);
    let width = FontMetrics::measure_text(text, style.font, style.font_size);
    line((PAGE_WIDTH - width) / 2.0, totals_end + FOOTER_GAP, text, style)
}

/// Fold the blocks top to bottom into a complete page layout.
///
/// `with_logo` reflects whether a logo will actually be drawn; it is the
/// only thing the logo affects, shifting the header-dependent origins by
/// exactly [`LOGO_RESERVED_HEIGHT`].
pub fn layout_invoice(invoice: &Invoice, with_logo: bool) -> InvoiceLayout {
    let header = header_block(&invoice.company, with_logo);
    let title = title_block(invoice, header.origin);
    let client = client_block(&invoice.client, header.end);
    let client_end = client.origin + client.height;
    let items = items_block(&invoice.items, client_end + CLIENT_TABLE_GAP);
    let totals = totals_block(invoice, items.end);
    let footer = footer_block(totals.total_y);

    let metrics = LayoutMetrics {
        header_origin: header.origin,
        header_end: header.end,
        title_origin: title.origin,
        title_end: title.end,
        client_origin: client.origin,
        client_height: client.height,
        client_end,
        table_origin: items.origin,
        table_rule_y: items.rule.y,
        row_offsets: items.row_offsets.clone(),
        items_end: items.end,
        totals_rule_y: totals.rule.y,
        subtotal_offset: totals.subtotal_y,
        tax_offset: totals.tax_y,
        total_offset: totals.total_y,
        footer_offset: footer.y,
        extent: footer.y,
    };

    let mut texts = header.lines;
    texts.extend(title.lines);
    texts.extend(client.lines);
    texts.extend(items.lines);
    texts.extend(totals.lines);
    texts.push(footer);

    InvoiceLayout {
        logo: with_logo.then(|| Rect::new(LEFT_MARGIN, TOP_MARGIN, LOGO_BOX_WIDTH, LOGO_BOX_HEIGHT)),
        texts,
        rules: vec![items.rule, totals.rule],
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{DraftItem, InvoiceDraft};
    use chrono::{TimeZone, Utc};

    fn invoice_with(items: Vec<DraftItem>, tax: f64) -> Invoice {
        let draft = InvoiceDraft {
            client: ClientInfo::new("Acme Corp", "ap@acme.example"),
            company: CompanyInfo::default(),
            items,
            tax,
            due_date: None,
        };
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        Invoice::from_draft(draft, now).unwrap()
    }

    #[test]
    fn header_origin_follows_logo_reservation() {
        let company = CompanyInfo::default();
        let plain = header_block(&company, false);
        let with_logo = header_block(&company, true);
        assert_eq!(plain.origin, TOP_MARGIN);
        assert_eq!(with_logo.origin, TOP_MARGIN + LOGO_RESERVED_HEIGHT);
        assert_eq!(with_logo.end - plain.end, LOGO_RESERVED_HEIGHT);
        assert_eq!(plain.lines.len(), 4);
        assert_eq!(plain.end, plain.origin + 4.0 * LINE_HEIGHT);
    }

    #[test]
    fn title_skips_missing_due_date_without_reserving_space() {
        let mut invoice = invoice_with(vec![DraftItem::new("Design", 2.0, 50.0)], 0.0);
        let without = title_block(&invoice, TOP_MARGIN);
        invoice.due_date = Some(NaiveDate::from_ymd_opt(2026, 9, 24).unwrap());
        let with = title_block(&invoice, TOP_MARGIN);
        assert_eq!(with.end - without.end, LINE_HEIGHT);
        assert_eq!(with.lines.len() - without.lines.len(), 2);
        assert_eq!(without.origin, TOP_MARGIN);
    }

    #[test]
    fn client_conditional_lines_fill_slots_in_order() {
        let mut client = ClientInfo::new("Acme Corp", "ap@acme.example");
        let bare = client_block(&client, 110.0);
        assert_eq!(bare.height, 3.0 * LINE_HEIGHT);

        client.phone = Some("555-0100".to_string());
        let phone_only = client_block(&client, 110.0);
        // With no address, the phone line sits in the slot address would use.
        assert_eq!(phone_only.height, 4.0 * LINE_HEIGHT);
        let phone_line = phone_only.lines.last().unwrap();
        assert_eq!(phone_line.y, phone_only.origin + 4.0 * LINE_HEIGHT);

        client.address = Some("1 Client Way".to_string());
        let full = client_block(&client, 110.0);
        assert_eq!(full.height, 5.0 * LINE_HEIGHT);
        assert_eq!(full.lines.last().unwrap().y, full.origin + 5.0 * LINE_HEIGHT);
    }

    #[test]
    fn client_origin_clamps_to_minimum() {
        let client = ClientInfo::new("Acme Corp", "ap@acme.example");
        let low = client_block(&client, 20.0);
        assert_eq!(low.origin, CLIENT_MIN_Y);
        let pushed = client_block(&client, 180.0);
        assert_eq!(pushed.origin, 180.0 + HEADER_CLIENT_GAP);
    }

    #[test]
    fn rows_advance_by_fixed_height() {
        let items: Vec<LineItem> = (0..5)
            .map(|i| LineItem::priced(format!("Item {}", i), 1.0, 10.0))
            .collect();
        let block = items_block(&items, 210.0);
        assert_eq!(block.row_offsets.len(), 5);
        assert_eq!(block.row_offsets[0], 210.0 + TABLE_FIRST_ROW_GAP);
        for pair in block.row_offsets.windows(2) {
            assert_eq!(pair[1] - pair[0], ROW_HEIGHT);
        }
        assert_eq!(block.end, *block.row_offsets.last().unwrap());
        assert_eq!(block.rule.y, 210.0 + TABLE_HEADER_RULE_GAP);
    }

    #[test]
    fn numeric_columns_right_align() {
        let items = vec![LineItem::priced("Design", 2.0, 50.0)];
        let block = items_block(&items, 210.0);
        let amount = block
            .lines
            .iter()
            .find(|l| l.text == "100.00" && l.y == block.row_offsets[0])
            .unwrap();
        let width = FontMetrics::measure_text("100.00", amount.style.font, amount.style.font_size);
        assert!((amount.x + width - AMOUNT_RIGHT_X).abs() < 1e-9);
    }

    #[test]
    fn total_slot_depends_on_tax_line() {
        let no_tax = invoice_with(vec![DraftItem::new("Design", 2.0, 50.0)], 0.0);
        let block = totals_block(&no_tax, 235.0);
        assert_eq!(block.tax_y, None);
        assert_eq!(block.total_y - block.subtotal_y, LINE_HEIGHT);

        let taxed = invoice_with(vec![DraftItem::new("Design", 2.0, 50.0)], 8.25);
        let block = totals_block(&taxed, 235.0);
        assert_eq!(block.tax_y, Some(block.subtotal_y + LINE_HEIGHT));
        assert_eq!(block.total_y - block.subtotal_y, 2.0 * LINE_HEIGHT);
    }

    #[test]
    fn money_and_quantity_formatting() {
        assert_eq!(format_money(100.0), "100.00");
        assert_eq!(format_money(108.25), "108.25");
        assert_eq!(format_money(0.5), "0.50");
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(10.0), "10");
    }

    #[test]
    fn date_renders_short_form() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()), "8/25/2026");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2027, 1, 2).unwrap()), "1/2/2027");
    }
}
