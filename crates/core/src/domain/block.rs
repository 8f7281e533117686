use serde::{Deserialize, Serialize};

/// A run of text carrying zero or more inline annotations.
///
/// A link span carries only `text` and `link`; style flags are never set on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RichTextSpan {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RichTextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
            ..Default::default()
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: true,
            ..Default::default()
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.code && self.link.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::H1),
            2 => Ok(Self::H2),
            3 => Ok(Self::H3),
            other => Err(format!("heading level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.as_u8()
    }
}

/// A structural unit of a document, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum Block {
    Heading {
        #[cfg_attr(feature = "typescript", ts(type = "1 | 2 | 3"))]
        level: HeadingLevel,
        spans: Vec<RichTextSpan>,
    },
    Paragraph {
        spans: Vec<RichTextSpan>,
    },
    BulletItem {
        spans: Vec<RichTextSpan>,
    },
    NumberedItem {
        spans: Vec<RichTextSpan>,
    },
}

impl Block {
    pub fn spans(&self) -> &[RichTextSpan] {
        match self {
            Self::Heading { spans, .. }
            | Self::Paragraph { spans }
            | Self::BulletItem { spans }
            | Self::NumberedItem { spans } => spans,
        }
    }

    /// Concatenated span text with every annotation stripped.
    pub fn plain_text(&self) -> String {
        self.spans().iter().map(|s| s.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_serialization_skips_unset_flags() {
        let json = serde_json::to_value(RichTextSpan::plain("hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hello" }));

        let json = serde_json::to_value(RichTextSpan::link("docs", "https://example.com")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "docs", "link": "https://example.com" })
        );
    }

    #[test]
    fn test_heading_level_bounds() {
        assert_eq!(HeadingLevel::try_from(2).unwrap(), HeadingLevel::H2);
        assert!(HeadingLevel::try_from(0).is_err());
        assert!(HeadingLevel::try_from(4).is_err());
    }

    #[test]
    fn test_block_serialization() {
        let block = Block::Heading {
            level: HeadingLevel::H1,
            spans: vec![RichTextSpan::plain("Title")],
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 1);
        assert_eq!(json["spans"][0]["text"], "Title");

        let parsed: Block = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn test_plain_text_strips_annotations() {
        let block = Block::Paragraph {
            spans: vec![
                RichTextSpan::plain("Some "),
                RichTextSpan::italic("text"),
                RichTextSpan::plain(" here."),
            ],
        };
        assert_eq!(block.plain_text(), "Some text here.");
    }
}
