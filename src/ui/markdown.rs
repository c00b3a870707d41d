//! Splits assistant markdown into prose and code blocks.
//!
//! The terminal adapter prints prose as-is and offers every code block for
//! copying, so the only structure that matters here is where code starts and
//! stops.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based position among the code blocks of one message.
    pub index: usize,
    pub language: Option<String>,
    pub code: String,
}

impl CodeBlock {
    /// Text placed on the clipboard for this block.
    pub fn copy_text(&self) -> &str {
        self.code.trim()
    }

    pub fn line_count(&self) -> usize {
        self.copy_text().lines().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Prose(String),
    Code(CodeBlock),
}

fn language_hint(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Indented => None,
        CodeBlockKind::Fenced(info) => info
            .split_ascii_whitespace()
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
    }
}

/// Splits `content` into prose runs and code blocks, in source order.
/// Whitespace-only prose between blocks is dropped.
pub fn split_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut current: Option<(Option<String>, String)> = None;

    let push_prose = |blocks: &mut Vec<Block>, text: &str| {
        let text = text.trim();
        if !text.is_empty() {
            blocks.push(Block::Prose(text.to_string()));
        }
    };

    for (event, range) in Parser::new_ext(content, Options::all()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                push_prose(&mut blocks, &content[prose_start..range.start]);
                current = Some((language_hint(&kind), String::new()));
            }
            Event::Text(text) => {
                if let Some((_, code)) = current.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = current.take() {
                    let index = blocks
                        .iter()
                        .filter(|block| matches!(block, Block::Code(_)))
                        .count()
                        + 1;
                    blocks.push(Block::Code(CodeBlock {
                        index,
                        language,
                        code,
                    }));
                }
                prose_start = range.end;
            }
            _ => {}
        }
    }

    // pulldown-cmark closes a fence left open at end of input, so a block
    // cut off mid-reveal has already been pushed by the loop.
    if prose_start < content.len() {
        push_prose(&mut blocks, &content[prose_start..]);
    }

    blocks
}

pub fn code_blocks(content: &str) -> Vec<CodeBlock> {
    split_blocks(content)
        .into_iter()
        .filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Prose(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "**Setup**\n\nRun this:\n\n```bash\nnpm install\nnpm start\n```\n\nThen edit the server:\n\n```js title=server.js\nconst x = 1;\n```\n\nDone.";

    #[test]
    fn splits_prose_and_fenced_code_in_order() {
        let blocks = split_blocks(REPLY);
        assert_eq!(
            blocks,
            vec![
                Block::Prose("**Setup**\n\nRun this:".into()),
                Block::Code(CodeBlock {
                    index: 1,
                    language: Some("bash".into()),
                    code: "npm install\nnpm start\n".into(),
                }),
                Block::Prose("Then edit the server:".into()),
                Block::Code(CodeBlock {
                    index: 2,
                    language: Some("js".into()),
                    code: "const x = 1;\n".into(),
                }),
                Block::Prose("Done.".into()),
            ]
        );
    }

    #[test]
    fn copy_text_is_trimmed() {
        let blocks = code_blocks("```\n\n  let a = 1;\n\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, None);
        assert_eq!(blocks[0].copy_text(), "let a = 1;");
        assert_eq!(blocks[0].line_count(), 1);
    }

    #[test]
    fn inline_code_is_prose() {
        let blocks = split_blocks("Use `cargo run` to start.");
        assert_eq!(blocks, vec![Block::Prose("Use `cargo run` to start.".into())]);
    }

    #[test]
    fn unterminated_fence_is_still_a_block() {
        let blocks = split_blocks("Here:\n\n```python\nprint('hi')\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::Prose("Here:".into()));
        let Block::Code(code) = &blocks[1] else {
            panic!("expected a code block, got {:?}", blocks[1]);
        };
        assert_eq!(code.index, 1);

        let blocks = code_blocks("Here:\n\n```python\nprint('hi')\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[0].copy_text(), "print('hi')");
    }

    #[test]
    fn indented_code_has_no_language() {
        let blocks = code_blocks("Example:\n\n    fn main() {}\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, None);
        assert_eq!(blocks[0].copy_text(), "fn main() {}");
    }

    #[test]
    fn plain_text_has_no_code_blocks() {
        assert!(code_blocks("No response.").is_empty());
        assert!(split_blocks("").is_empty());
    }
}
