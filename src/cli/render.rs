//! Flow response rendering
//!
//! Picks one presentation per payload item: pretty JSON, terminal markdown,
//! a multi-line block, or plain text. Rendering never fails; a strategy that
//! cannot handle an item hands it to the next one.

use colored::Colorize;
use serde_json::Value;

use crate::cli::console::{Console, Style};

/// Characters that suggest an item is markdown
const MARKUP_INDICATORS: [&str; 5] = ["#", "```", "**", "_", ">"];

/// Presentation chosen for one payload item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Empty,
    Json,
    Markdown,
    MultiLine,
    Text,
    Raw,
}

impl RenderKind {
    fn title(self) -> &'static str {
        match self {
            RenderKind::Json => "JSON Response",
            RenderKind::Markdown => "Markdown Response",
            RenderKind::MultiLine => "Multi-line Response",
            RenderKind::Text | RenderKind::Raw | RenderKind::Empty => "Text Response",
        }
    }
}

/// An item rendered to text, ready to be framed
#[derive(Debug, Clone)]
pub struct Rendered {
    pub kind: RenderKind,
    pub body: String,
}

#[derive(Debug)]
enum MarkupError {
    UnterminatedFence,
}

/// Render a flow payload to the console and report what was chosen per item
pub fn render_payload(console: &mut Console, payload: &Value) -> Vec<RenderKind> {
    if is_empty(payload) {
        console.print(Style::Warning, "\n⚠️  No response received");
        return vec![RenderKind::Empty];
    }

    console.step("📊 Flow Response:");

    match payload {
        Value::Array(items) => {
            console.print(Style::Info, "Iterator Response:");
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let n = i + 1;
                    console.print(Style::Step, format!("\n[Response {}]", n));
                    console.rule(20);
                    emit(console, render_item(item), Some(n), item)
                })
                .collect()
        }
        other => vec![emit(console, render_item(other), None, other)],
    }
}

/// Choose a presentation for a single item
pub fn render_item(item: &Value) -> Rendered {
    match item {
        Value::String(text) => render_text(text),
        other => match serde_json::to_string_pretty(other) {
            Ok(body) => Rendered {
                kind: RenderKind::Json,
                body: colorize_json(&body),
            },
            Err(_) => Rendered {
                kind: RenderKind::Raw,
                body: other.to_string(),
            },
        },
    }
}

/// Choose a presentation for a text item, first match wins
pub fn render_text(text: &str) -> Rendered {
    let stripped = strip_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
        if let Ok(body) = serde_json::to_string_pretty(&value) {
            return Rendered {
                kind: RenderKind::Json,
                body: colorize_json(&body),
            };
        }
    }

    if MARKUP_INDICATORS.iter().any(|m| text.contains(m)) {
        match render_markdown(text) {
            Ok(body) => {
                return Rendered {
                    kind: RenderKind::Markdown,
                    body,
                }
            }
            Err(e) => tracing::debug!("markdown rendering failed: {:?}", e),
        }
    }

    if text.contains('\n') {
        return Rendered {
            kind: RenderKind::MultiLine,
            body: text.to_string(),
        };
    }

    Rendered {
        kind: RenderKind::Text,
        body: text.to_string(),
    }
}

fn emit(
    console: &mut Console,
    rendered: Rendered,
    index: Option<usize>,
    raw: &Value,
) -> RenderKind {
    let title = match index {
        Some(n) => format!("{} {}", rendered.kind.title(), n),
        None => rendered.kind.title().to_string(),
    };

    match console.panel(&title, &rendered.body) {
        Ok(()) => rendered.kind,
        Err(e) => {
            console.print(Style::Error, format!("\n⚠️  Error formatting response: {}", e));
            console.print(Style::Info, "Displaying raw response:");
            console.raw(raw.to_string());
            RenderKind::Raw
        }
    }
}

fn is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Remove markdown code fences that models wrap around JSON
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn colorize_json(pretty: &str) -> String {
    pretty
        .lines()
        .map(|line| match split_key(line) {
            Some((key, rest)) => format!("{}: {}", key.cyan(), rest.green()),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a pretty-printed object line into its quoted key and the value
///
/// The key ends at the first unescaped quote, which must be followed by `": "`.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let start = line.len() - line.trim_start().len();
    let body = line[start..].strip_prefix('"')?;

    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                let end = start + 1 + i + 1;
                let rest = line[end..].strip_prefix(": ")?;
                return Some((&line[..end], rest));
            }
            _ => {}
        }
    }
    None
}

/// Minimal terminal markdown: headings, quotes, bullets, fenced code, bold and inline code
fn render_markdown(text: &str) -> Result<String, MarkupError> {
    let mut out = Vec::new();
    let mut in_code = false;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_code = !in_code;
            out.push("─".repeat(40).dimmed().to_string());
            continue;
        }

        if in_code {
            out.push(format!("  {}", line.yellow()));
            continue;
        }

        let rendered = if let Some(heading) = heading_text(trimmed) {
            inline(heading).bold().underline().to_string()
        } else if let Some(quote) = trimmed.strip_prefix('>') {
            format!("{} {}", "▌".dimmed(), inline(quote.trim_start()).italic())
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            format!("  • {}", inline(item))
        } else {
            inline(line)
        };
        out.push(rendered);
    }

    if in_code {
        return Err(MarkupError::UnterminatedFence);
    }
    Ok(out.join("\n"))
}

fn heading_text(line: &str) -> Option<&str> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        Some(line[level..].trim())
    } else {
        None
    }
}

/// Bold `**spans**` and highlight `code`; unbalanced markers are left as typed
fn inline(text: &str) -> String {
    let bolded = if text.matches("**").count() % 2 == 0 {
        text.split("**")
            .enumerate()
            .map(|(i, part)| {
                if i % 2 == 1 {
                    part.bold().to_string()
                } else {
                    part.to_string()
                }
            })
            .collect::<String>()
    } else {
        text.to_string()
    };

    if bolded.matches('`').count() % 2 == 0 {
        bolded
            .split('`')
            .enumerate()
            .map(|(i, part)| {
                if i % 2 == 1 {
                    part.yellow().to_string()
                } else {
                    part.to_string()
                }
            })
            .collect()
    } else {
        bolded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_renders_as_json() {
        let rendered = render_text("```json\n{\"a\": 1}\n```");
        assert_eq!(rendered.kind, RenderKind::Json);
        assert!(rendered.body.contains('1'));
    }

    #[test]
    fn test_markdown_detection() {
        assert_eq!(render_text("# Title\nbody").kind, RenderKind::Markdown);
        assert_eq!(render_text("some **bold** text").kind, RenderKind::Markdown);
    }

    #[test]
    fn test_unterminated_fence_falls_through() {
        let rendered = render_text("intro\n```\nlet x = 1;");
        assert_eq!(rendered.kind, RenderKind::MultiLine);
    }

    #[test]
    fn test_multiline_and_plain() {
        assert_eq!(render_text("line one\nline two").kind, RenderKind::MultiLine);
        assert_eq!(render_text("hello world").kind, RenderKind::Text);
    }

    #[test]
    fn test_structured_values_render_as_json() {
        assert_eq!(render_item(&json!({"k": "v"})).kind, RenderKind::Json);
        assert_eq!(render_item(&json!(42)).kind, RenderKind::Json);
    }

    #[test]
    fn test_sequence_renders_each_item() {
        let (mut console, buffer) = Console::buffered();
        let payload = json!(["{\"x\": 1}", "plain", "a\nb"]);
        let kinds = render_payload(&mut console, &payload);
        assert_eq!(
            kinds,
            vec![RenderKind::Json, RenderKind::Text, RenderKind::MultiLine]
        );
        let out = buffer.contents();
        assert!(out.contains("JSON Response 1"));
        assert!(out.contains("Text Response 2"));
        assert!(out.contains("Multi-line Response 3"));
    }

    #[test]
    fn test_empty_payload() {
        let (mut console, buffer) = Console::buffered();
        assert_eq!(
            render_payload(&mut console, &Value::Null),
            vec![RenderKind::Empty]
        );
        assert!(buffer.contents().contains("No response received"));
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(heading_text("## Done"), Some("Done"));
        assert_eq!(heading_text("#hashtag"), None);
    }

    #[test]
    fn test_key_split_ignores_separators_inside_strings() {
        assert_eq!(
            split_key(r#"  "note": "said \": hi","#),
            Some((r#"  "note""#, r#""said \": hi","#))
        );
        assert_eq!(split_key(r#"  "k\"ey": 1"#), Some((r#"  "k\"ey""#, "1")));
        assert_eq!(split_key(r#"  "an \": item","#), None);
        assert_eq!(split_key("  1,"), None);
    }
}
