//! Notion's native block schema

use serde::Serialize;
use stagecraft_core::{Block, HeadingLevel, RichTextSpan};

/// A block object as accepted by the Notion API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotionBlock {
    pub object: &'static str,
    #[serde(flatten)]
    pub body: NotionBlockBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NotionBlockBody {
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: RichTextContainer },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: RichTextContainer },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: RichTextContainer },
    #[serde(rename = "paragraph")]
    Paragraph { paragraph: RichTextContainer },
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem {
        bulleted_list_item: RichTextContainer,
    },
    #[serde(rename = "numbered_list_item")]
    NumberedListItem {
        numbered_list_item: RichTextContainer,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextContainer {
    pub rich_text: Vec<NotionRichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotionRichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl From<&RichTextSpan> for NotionRichText {
    fn from(span: &RichTextSpan) -> Self {
        Self {
            kind: "text",
            text: TextContent {
                content: span.text.clone(),
                link: span.link.as_ref().map(|url| Link { url: url.clone() }),
            },
            annotations: Annotations {
                bold: span.bold,
                italic: span.italic,
                code: span.code,
            },
        }
    }
}

fn rich_text(spans: &[RichTextSpan]) -> RichTextContainer {
    RichTextContainer {
        rich_text: spans.iter().map(NotionRichText::from).collect(),
    }
}

impl From<&Block> for NotionBlock {
    fn from(block: &Block) -> Self {
        let body = match block {
            Block::Heading { level, spans } => match level {
                HeadingLevel::H1 => NotionBlockBody::Heading1 {
                    heading_1: rich_text(spans),
                },
                HeadingLevel::H2 => NotionBlockBody::Heading2 {
                    heading_2: rich_text(spans),
                },
                HeadingLevel::H3 => NotionBlockBody::Heading3 {
                    heading_3: rich_text(spans),
                },
            },
            Block::Paragraph { spans } => NotionBlockBody::Paragraph {
                paragraph: rich_text(spans),
            },
            Block::BulletItem { spans } => NotionBlockBody::BulletedListItem {
                bulleted_list_item: rich_text(spans),
            },
            Block::NumberedItem { spans } => NotionBlockBody::NumberedListItem {
                numbered_list_item: rich_text(spans),
            },
        };

        Self {
            object: "block",
            body,
        }
    }
}

pub fn to_notion_blocks(blocks: &[Block]) -> Vec<NotionBlock> {
    blocks.iter().map(NotionBlock::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heading_schema() {
        let block = Block::Heading {
            level: HeadingLevel::H2,
            spans: vec![RichTextSpan::plain("Goals")],
        };
        let value = serde_json::to_value(NotionBlock::from(&block)).unwrap();
        assert_eq!(
            value,
            json!({
                "object": "block",
                "type": "heading_2",
                "heading_2": {
                    "rich_text": [{
                        "type": "text",
                        "text": { "content": "Goals" },
                        "annotations": { "bold": false, "italic": false, "code": false }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_annotations_and_links() {
        let block = Block::BulletItem {
            spans: vec![
                RichTextSpan::bold("Read"),
                RichTextSpan::link("the guide", "https://example.com"),
            ],
        };
        let value = serde_json::to_value(NotionBlock::from(&block)).unwrap();
        assert_eq!(value["type"], "bulleted_list_item");

        let items = &value["bulleted_list_item"]["rich_text"];
        assert_eq!(items[0]["annotations"]["bold"], true);
        assert_eq!(items[1]["text"]["link"]["url"], "https://example.com");
        assert_eq!(items[1]["annotations"]["bold"], false);
    }

    #[test]
    fn test_every_block_kind_maps() {
        let blocks = vec![
            Block::Heading {
                level: HeadingLevel::H1,
                spans: vec![],
            },
            Block::Heading {
                level: HeadingLevel::H3,
                spans: vec![],
            },
            Block::Paragraph { spans: vec![] },
            Block::NumberedItem { spans: vec![] },
        ];
        let types: Vec<String> = to_notion_blocks(&blocks)
            .iter()
            .map(|b| serde_json::to_value(b).unwrap()["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            types,
            vec!["heading_1", "heading_3", "paragraph", "numbered_list_item"]
        );
    }
}
