//! Plain-text rendering of the views.

use schoolhouse_model::SchoolRecord;

use crate::form::{ImagePreview, Popup, SubmissionForm};
use crate::listing::{ListingContent, ListingView};

/// Card image when a record has none.
pub const FALLBACK_IMAGE: &str = "/file.svg";
/// Card title when a record has no name.
pub const FALLBACK_NAME: &str = "Unnamed School";

const GAP: &str = "  ";

/// Number of card columns for a terminal `width`.
#[must_use]
pub fn columns(width: usize) -> usize {
    match width {
        0..80 => 1,
        80..120 => 2,
        _ => 3,
    }
}

/// Lines of one card, unpadded. `resolve` turns the stored image reference into a fetchable URL.
pub fn card_lines(record: &SchoolRecord, resolve: impl Fn(&str) -> String) -> Vec<String> {
    let image = if record.image.trim().is_empty() {
        FALLBACK_IMAGE.to_owned()
    } else {
        resolve(&record.image)
    };
    let name = if record.name.trim().is_empty() {
        FALLBACK_NAME
    } else {
        record.name.as_str()
    };

    let mut lines = vec![format!("[img] {image}"), name.to_owned()];
    if !record.city.trim().is_empty() {
        lines.push(format!("({})", record.city));
    }
    if !record.address.trim().is_empty() {
        lines.push(record.address.clone());
    }
    lines
}

/// Pads or cuts `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text}{}", " ".repeat(width - count))
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

fn boxed(lines: &[String], width: usize) -> Vec<String> {
    let inner = width.saturating_sub(4);
    let border = format!("+{}+", "-".repeat(width.saturating_sub(2)));
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(border.clone());
    out.extend(lines.iter().map(|line| format!("| {} |", fit(line, inner))));
    out.push(border);
    out
}

/// Lays `records` out as a grid of boxed cards fitting `width` columns.
pub fn render_cards(records: &[&SchoolRecord], width: usize, resolve: impl Fn(&str) -> String) -> String {
    let cols = columns(width);
    let card_width = (width.saturating_sub(GAP.len() * (cols - 1)) / cols).max(12);

    let mut out = Vec::new();
    for row in records.chunks(cols) {
        let cards: Vec<Vec<String>> = row
            .iter()
            .map(|record| card_lines(record, &resolve))
            .collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        let boxes: Vec<Vec<String>> = cards
            .into_iter()
            .map(|mut lines| {
                lines.resize(height, String::new());
                boxed(&lines, card_width)
            })
            .collect();
        for i in 0..height + 2 {
            let line: Vec<&str> = boxes.iter().map(|b| b[i].as_str()).collect();
            out.push(line.join(GAP).trim_end().to_owned());
        }
    }
    out.join("\n")
}

/// Renders the listing for a terminal `width`.
pub fn render_listing(view: &ListingView, width: usize, resolve: impl Fn(&str) -> String) -> String {
    match view.display() {
        ListingContent::Message(message) => message,
        ListingContent::Cards(records) => render_cards(&records, width, resolve),
    }
}

/// One-line description of a selected image.
#[must_use]
pub fn render_preview(image: &ImagePreview) -> String {
    format!(
        "{} ({} bytes, {}) {}",
        image.file_name(),
        image.size(),
        image.content_type(),
        truncate_data_url(&image.data_url())
    )
}

fn truncate_data_url(url: &str) -> String {
    fit(url, 48).trim_end().to_owned()
}

/// Inline errors of the form, one `Label: message` per line.
#[must_use]
pub fn render_errors(form: &SubmissionForm) -> String {
    form.errors()
        .into_iter()
        .map(|(field, message)| format!("{}: {message}", field.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The confirmation dialog.
#[must_use]
pub fn render_popup(popup: &Popup) -> String {
    format!("{}\n{}\n[{}]", popup.title, popup.description, popup.confirm_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, city: &str, address: &str, image: &str) -> SchoolRecord {
        SchoolRecord {
            id: 1,
            name: name.to_owned(),
            address: address.to_owned(),
            city: city.to_owned(),
            state: "Illinois".to_owned(),
            contact: "1234567".to_owned(),
            image: image.to_owned(),
            email_id: "a@b.com".to_owned(),
        }
    }

    #[test]
    fn test_columns() {
        assert_eq!(columns(40), 1);
        assert_eq!(columns(79), 1);
        assert_eq!(columns(80), 2);
        assert_eq!(columns(119), 2);
        assert_eq!(columns(120), 3);
        assert_eq!(columns(300), 3);
    }

    #[test]
    fn test_card_fallbacks_and_optional_lines() {
        let bare = record("", "", "", "");
        assert_eq!(card_lines(&bare, str::to_owned), ["[img] /file.svg", "Unnamed School"]);

        let full = record("Oak Elementary", "Springfield", "12 Oak St", "/schoolImages/a.png");
        let lines = card_lines(&full, |image| format!("http://host{image}"));
        assert_eq!(
            lines,
            [
                "[img] http://host/schoolImages/a.png",
                "Oak Elementary",
                "(Springfield)",
                "12 Oak St"
            ]
        );
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("é", 1), "é");
    }

    #[test]
    fn test_grid_puts_cards_side_by_side() {
        let a = record("Alpha", "A-town", "1 First St", "/a.png");
        let b = record("Beta", "B-town", "2 Second St", "/b.png");
        let c = record("Gamma", "C-town", "3 Third St", "/c.png");
        let records = [&a, &b, &c];

        let wide = render_cards(&records, 130, str::to_owned);
        let title_row = wide.lines().nth(2).unwrap();
        assert!(title_row.contains("Alpha") && title_row.contains("Beta") && title_row.contains("Gamma"));

        let narrow = render_cards(&records, 60, str::to_owned);
        assert_eq!(narrow.lines().filter(|l| l.contains("Beta")).count(), 1);
        assert!(!narrow.lines().any(|l| l.contains("Alpha") && l.contains("Beta")));
        assert!(narrow.lines().all(|l| l.chars().count() <= 60));
    }

    #[test]
    fn test_popup() {
        let text = render_popup(&crate::form::ADDED_POPUP);
        assert_eq!(text, "School Added\nThe school has been added successfully.\n[Go to Schools]");
    }
}
