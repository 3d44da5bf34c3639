use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::error::ExportError;
use crate::model::{UserField, UserRecord};

/// Title line at the top of the first page.
pub const PDF_TITLE: &str = "User Management Table";

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 9.0;
const ROW_H: f32 = 7.0;
// column widths in mm, summing to the printable width
const COL_W: [f32; 4] = [50.0, 35.0, 60.0, 35.0];
// rough Helvetica advance at TEXT_SIZE, used to clip long cells
const CHAR_W: f32 = 1.75;

/// Table content of the PDF export, independent of page layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfTable {
    pub title: String,
    pub header: [&'static str; 4],
    pub rows: Vec<[String; 4]>,
}

impl PdfTable {
    pub fn from_users(users: &[UserRecord]) -> Self {
        Self {
            title: PDF_TITLE.to_string(),
            header: UserField::ALL.map(UserField::label),
            rows: users
                .iter()
                .map(|u| u.columns().map(str::to_string))
                .collect(),
        }
    }

    /// Split rows into pages. The first page loses room to the title.
    pub fn pages(&self) -> Vec<&[[String; 4]]> {
        let first = rows_per_page(true);
        let rest = rows_per_page(false);
        let mut pages = Vec::new();
        let (head, mut tail) = self.rows.split_at(first.min(self.rows.len()));
        pages.push(head);
        while !tail.is_empty() {
            let (page, remaining) = tail.split_at(rest.min(tail.len()));
            pages.push(page);
            tail = remaining;
        }
        pages
    }

    /// Lay out and encode the document.
    pub fn render(&self) -> Result<Vec<u8>, ExportError> {
        let (doc, page, layer) = PdfDocument::new(self.title.as_str(), Mm(PAGE_W), Mm(PAGE_H), "table");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;

        for (index, rows) in self.pages().into_iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(page).get_layer(layer)
            } else {
                let (p, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "table");
                doc.get_page(p).get_layer(l)
            };
            let mut y = PAGE_H - MARGIN;
            if index == 0 {
                layer.use_text(self.title.clone(), TITLE_SIZE, Mm(MARGIN), Mm(y - 6.0), &bold);
                y -= 14.0;
            }
            draw_row(&layer, &bold, &self.header.map(str::to_string), y);
            y -= ROW_H;
            for row in rows {
                draw_row(&layer, &regular, row, y);
                y -= ROW_H;
            }
            draw_rule(&layer, y);
        }

        doc.save_to_bytes()
            .map_err(|e| ExportError::Pdf(format!("{e:?}")))
    }
}

/// Build and render the PDF export for `users`.
pub fn export_to_pdf(users: &[UserRecord]) -> Result<Vec<u8>, ExportError> {
    PdfTable::from_users(users).render()
}

fn rows_per_page(first: bool) -> usize {
    let title = if first { 14.0 } else { 0.0 };
    let usable = PAGE_H - 2.0 * MARGIN - title - ROW_H;
    (usable / ROW_H).floor() as usize
}

fn draw_row(layer: &PdfLayerReference, font: &IndirectFontRef, cells: &[String; 4], top: f32) {
    draw_rule(layer, top);
    let mut x = MARGIN;
    for (cell, width) in cells.iter().zip(COL_W) {
        layer.use_text(clip(cell, width), TEXT_SIZE, Mm(x + 1.5), Mm(top - 5.0), font);
        x += width;
    }
}

fn draw_rule(layer: &PdfLayerReference, y: f32) {
    let right = MARGIN + COL_W.iter().sum::<f32>();
    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(right), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn clip(text: &str, width: f32) -> String {
    let max = ((width - 3.0) / CHAR_W).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(n: u64) -> Vec<UserRecord> {
        (1..=n)
            .map(|i| UserRecord {
                id: i,
                name: format!("User {i}"),
                username: format!("user{i}"),
                email: format!("user{i}@example.com"),
                phone: format!("555-{i:04}"),
            })
            .collect()
    }

    #[test]
    fn table_has_title_header_and_rows_in_order() {
        let table = PdfTable::from_users(&users(3));
        assert_eq!(table.title, "User Management Table");
        assert_eq!(table.header, ["Name", "Username", "Email", "Phone"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(
            table.rows[1],
            ["User 2", "user2", "user2@example.com", "555-0002"].map(String::from)
        );
    }

    #[test]
    fn long_lists_spill_onto_more_pages() {
        let table = PdfTable::from_users(&users(100));
        let pages = table.pages();
        assert!(pages.len() > 1);
        assert_eq!(pages.iter().map(|p| p.len()).sum::<usize>(), 100);
        assert_eq!(pages[1][0][0], format!("User {}", pages[0].len() + 1));
    }

    #[test]
    fn empty_table_still_has_one_page() {
        let table = PdfTable::from_users(&[]);
        assert_eq!(table.pages().len(), 1);
        assert!(table.render().unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn clip_shortens_long_cells() {
        assert_eq!(clip("short", 35.0), "short");
        let clipped = clip(&"x".repeat(80), 35.0);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() < 80);
    }
}
