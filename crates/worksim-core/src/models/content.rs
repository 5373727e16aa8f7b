use serde::{Deserialize, Serialize};

/// Structured body of a document, email or chat reply. Hosts render these
/// blocks themselves; no markup is ever interpolated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Paragraph {
        text: String,
    },
    Heading {
        level: u8,
        text: String,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ContentBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    pub fn bullets<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentBlock::List {
            ordered: false,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numbered<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentBlock::List {
            ordered: true,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn table(headers: &[&str], rows: &[&[&str]]) -> Self {
        ContentBlock::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    /// Plain-text rendering, one line per paragraph/heading/list item/table row
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Paragraph { text } | ContentBlock::Heading { text, .. } => text.clone(),
            ContentBlock::List { ordered, items } => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if *ordered {
                        format!("{}. {}", i + 1, item)
                    } else {
                        format!("- {}", item)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            ContentBlock::Table { headers, rows } => std::iter::once(headers)
                .chain(rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Join several blocks into plain text separated by blank lines
pub fn plain_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(ContentBlock::plain_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}
