//! Minimal PDF 1.4 writer for the financial report export.
//!
//! The document uses the two standard Helvetica fonts with
//! `WinAnsiEncoding`, so no font data is embedded. Latin-1 text and the
//! extra WinAnsi glyphs (`€`, curly quotes, dashes, ...) are written as octal
//! escapes; anything else is replaced by `?`.

use engine::ExportBundle;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_HEIGHT: f32 = 18.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Lays text out top to bottom, opening a new page when the current one is
/// full.
struct Layout {
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, font: &str, size: f32, x: f32, value: &str) {
        self.current.push_str(&format!(
            "BT /{font} {size} Tf {x:.2} {y:.2} Td ({}) Tj ET\n",
            escape(value),
            y = self.y,
        ));
    }

    fn rule(&mut self) {
        let y = self.y - 5.0;
        self.current.push_str(&format!(
            "0.8 G 0.5 w {MARGIN:.2} {y:.2} m {:.2} {y:.2} l S 0 G\n",
            PAGE_WIDTH - MARGIN
        ));
    }

    fn title(&mut self, value: &str) {
        self.ensure_room(30.0);
        self.text(BOLD, 20.0, MARGIN, value);
        self.y -= 30.0;
    }

    fn line(&mut self, value: &str) {
        self.ensure_room(ROW_HEIGHT);
        self.text(REGULAR, 11.0, MARGIN, value);
        self.y -= ROW_HEIGHT;
    }

    fn row(&mut self, font: &str, cells: &[String]) {
        self.ensure_room(ROW_HEIGHT);
        let width = (PAGE_WIDTH - 2.0 * MARGIN) / cells.len().max(1) as f32;
        for (index, cell) in cells.iter().enumerate() {
            self.text(font, 10.0, MARGIN + width * index as f32, cell);
        }
        self.rule();
        self.y -= ROW_HEIGHT;
    }

    fn table(&mut self, heading: &str, header: &[&str], rows: Vec<Vec<String>>) {
        self.y -= 10.0;
        // heading plus header row stay on the same page
        self.ensure_room(24.0 + ROW_HEIGHT);
        self.text(BOLD, 16.0, MARGIN, heading);
        self.y -= 24.0;

        let header: Vec<String> = header.iter().map(ToString::to_string).collect();
        self.row(BOLD, &header);
        if rows.is_empty() {
            self.line("No records");
        }
        for row in rows {
            self.row(REGULAR, &row);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Code of `ch` in `WinAnsiEncoding`, for characters outside ASCII.
fn win_ansi(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{A0}'..='\u{FF}' => return u8::try_from(u32::from(ch)).ok(),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Encode `value` as the body of a PDF literal string.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            _ => match win_ansi(ch) {
                Some(code) => escaped.push_str(&format!("\\{code:03o}")),
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Render the export as a complete PDF file.
pub fn render(bundle: &ExportBundle) -> Vec<u8> {
    let mut layout = Layout::new();
    layout.title("Financial Report");
    layout.line(&format!("Owner: {}", bundle.owner));
    layout.line(&format!(
        "Total budget: {}   Total income: {}   Total expenses: {}",
        money(bundle.totals.total_budget),
        money(bundle.totals.total_income),
        money(bundle.totals.total_expense),
    ));

    layout.table(
        "Budgets",
        &["Year", "Month", "Amount"],
        bundle
            .budgets
            .iter()
            .map(|row| vec![row.year.to_string(), row.month.clone(), money(row.amount)])
            .collect(),
    );
    layout.table(
        "Expenses",
        &["Category", "Amount"],
        bundle
            .expenses
            .iter()
            .map(|row| vec![row.category.clone(), money(row.amount)])
            .collect(),
    );
    layout.table(
        "Incomes",
        &["Source", "Amount"],
        bundle
            .incomes
            .iter()
            .map(|row| vec![row.source.clone(), money(row.amount)])
            .collect(),
    );

    write_document(&layout.finish())
}

/// Serialize page content streams into a PDF with a cross-reference table.
///
/// Object layout: 1 catalog, 2 page tree, 3-4 fonts, then one page object and
/// one content stream per page.
fn write_document(pages: &[String]) -> Vec<u8> {
    let first_page = 5;
    let kids: Vec<String> = (0..pages.len())
        .map(|index| format!("{} 0 R", first_page + 2 * index))
        .collect();

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (index, content) in pages.iter().enumerate() {
        let content_id = first_page + 2 * index + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /{REGULAR} 3 0 R /{BOLD} 4 0 R >> >> \
             /Contents {content_id} 0 R >>"
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}
