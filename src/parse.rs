// ABOUTME: Source parser for the reveal-slides application
// ABOUTME: Builds the document tree from Markdown plus presentation directives

use std::collections::BTreeMap;

use comrak::{markdown_to_html, ComrakOptions};
use log::warn;

use crate::directives::{DirectiveRegistry, DirectiveSpec, Invocation};
use crate::tree::{DocTree, NodeId, NodeKind};

/// Heading levels `#`..`###` shape the slide structure; deeper headings are
/// ordinary Markdown content.
const MAX_STRUCTURAL_LEVEL: usize = 3;

/// Parses a source document into a [`DocTree`]. Markdown body text is
/// converted by comrak; headings, directive blocks, and fenced code
/// boundaries are recognized by a line scanner.
///
/// All parse-level failures are recoverable: they become inline
/// system-message nodes and the rest of the document is processed.
pub struct Parser<'r> {
    registry: &'r DirectiveRegistry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r DirectiveRegistry) -> Self {
        Self { registry }
    }

    pub fn parse(&self, source: &str) -> DocTree {
        let mut tree = DocTree::new();
        let root = tree.root();
        // (heading level, section) with a level-0 sentinel for the root.
        let mut stack: Vec<(usize, NodeId)> = vec![(0, root)];
        let mut buffer: Vec<&str> = Vec::new();
        let mut fence: Option<(char, usize)> = None;

        let lines: Vec<&str> = source.lines().collect();
        let mut index = 0;
        while index < lines.len() {
            let line = lines[index];

            if let Some((ch, count)) = fence_marker(line) {
                match fence {
                    None => fence = Some((ch, count)),
                    Some((open_ch, open_count)) if ch == open_ch && count >= open_count => {
                        fence = None
                    }
                    Some(_) => {}
                }
                buffer.push(line);
                index += 1;
                continue;
            }

            if fence.is_none() {
                if let Some((level, text)) = parse_heading(line) {
                    flush(&mut tree, current(&stack), &mut buffer);
                    while stack.len() > 1 && stack.last().unwrap().0 >= level {
                        stack.pop();
                    }
                    let section = tree.append_child(current(&stack), NodeKind::Section { level });
                    tree.append_child(
                        section,
                        NodeKind::Title {
                            html: render_inline(text),
                            text: text.to_string(),
                        },
                    );
                    stack.push((level, section));
                    index += 1;
                    continue;
                }

                if let Some(markup) = parse_explicit_markup(line) {
                    flush(&mut tree, current(&stack), &mut buffer);
                    // Collect the indented block belonging to this markup.
                    let mut end = index + 1;
                    while end < lines.len()
                        && (lines[end].trim().is_empty() || is_indented(lines[end]))
                    {
                        end += 1;
                    }
                    let mut block: Vec<&str> = lines[index + 1..end].to_vec();
                    while block.last().map_or(false, |l| l.trim().is_empty()) {
                        block.pop();
                    }
                    match markup {
                        ExplicitMarkup::Directive { name, argument } => {
                            self.run_directive(
                                &mut tree,
                                current(&stack),
                                name,
                                argument,
                                line,
                                &block,
                                index + 1,
                            );
                        }
                        // Bare `.. text` lines are source comments; drop them.
                        ExplicitMarkup::Comment => {}
                    }
                    index = end;
                    continue;
                }
            }

            buffer.push(line);
            index += 1;
        }
        flush(&mut tree, current(&stack), &mut buffer);
        tree
    }

    #[allow(clippy::too_many_arguments)]
    fn run_directive(
        &self,
        tree: &mut DocTree,
        parent: NodeId,
        name: &str,
        argument: Option<&str>,
        first_line: &str,
        block: &[&str],
        line_number: usize,
    ) {
        let raw = raw_block(first_line, block);
        let outcome = match self.registry.get(name) {
            Some(spec) => build_invocation(spec, argument, block, line_number, &raw)
                .and_then(|inv| (spec.run)(&inv, tree, parent)),
            None => Err(format!("unknown directive type \"{}\"", name)),
        };
        if let Err(message) = outcome {
            let message = format!("Error in \"{}\" directive: {}", name, message);
            warn!("line {}: {}", line_number, message);
            tree.append_child(
                parent,
                NodeKind::SystemMessage {
                    message,
                    source: raw,
                },
            );
        }
    }
}

fn current(stack: &[(usize, NodeId)]) -> NodeId {
    stack.last().expect("stack holds the root sentinel").1
}

/// Convert any buffered Markdown into a content node under `parent`.
fn flush(tree: &mut DocTree, parent: NodeId, buffer: &mut Vec<&str>) {
    if buffer.iter().all(|line| line.trim().is_empty()) {
        buffer.clear();
        return;
    }
    let text = buffer.join("\n");
    buffer.clear();
    if contains_math(&text) {
        tree.uses_math = true;
    }
    let html = render_markdown(&text);
    tree.append_child(parent, NodeKind::Content { html });
}

/// An ATX heading at structural depth, with closing hashes stripped.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    if !trimmed.starts_with('#') {
        return None;
    }
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level > MAX_STRUCTURAL_LEVEL {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    let mut text = rest.trim();
    let stripped = text.trim_end_matches('#');
    if stripped.ends_with(' ') {
        text = stripped.trim_end();
    } else if stripped.is_empty() {
        text = stripped;
    }
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

enum ExplicitMarkup<'a> {
    Directive {
        name: &'a str,
        argument: Option<&'a str>,
    },
    Comment,
}

/// `.. name:: argument` starts a directive; any other `.. ` line is a
/// comment.
fn parse_explicit_markup(line: &str) -> Option<ExplicitMarkup<'_>> {
    let rest = line.strip_prefix("..")?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let body = rest.trim_start();
    if let Some(marker) = body.find("::") {
        let name = &body[..marker];
        if !name.is_empty()
            && name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            let argument = body[marker + 2..].trim();
            return Some(ExplicitMarkup::Directive {
                name,
                argument: if argument.is_empty() {
                    None
                } else {
                    Some(argument)
                },
            });
        }
    }
    Some(ExplicitMarkup::Comment)
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

fn raw_block(first_line: &str, block: &[&str]) -> String {
    let mut raw = first_line.to_string();
    for line in block {
        raw.push('\n');
        raw.push_str(line);
    }
    raw
}

/// Split a directive's indented block into validated options and dedented
/// content, then assemble the invocation.
fn build_invocation(
    spec: &'static DirectiveSpec,
    argument: Option<&str>,
    block: &[&str],
    line_number: usize,
    raw: &str,
) -> std::result::Result<Invocation, String> {
    if spec.required_argument && argument.is_none() {
        return Err("1 argument required".to_string());
    }
    if !spec.allow_argument && argument.is_some() {
        return Err("no arguments permitted".to_string());
    }

    let mut options = BTreeMap::new();
    let mut content_start = block.len();
    let mut index = 0;
    while index < block.len() {
        let line = block[index].trim();
        match parse_option_line(line) {
            Some((name, value)) => {
                let validator = spec
                    .options
                    .iter()
                    .find(|(option, _)| *option == name)
                    .map(|(_, validator)| validator)
                    .ok_or_else(|| format!("unknown option: \"{}\"", name))?;
                if options.contains_key(name) {
                    return Err(format!("duplicate option: \"{}\"", name));
                }
                let value = validator
                    .validate(value)
                    .map_err(|e| format!("invalid option value for \"{}\": {}", name, e))?;
                options.insert(name.to_string(), value);
                index += 1;
            }
            None => {
                // Skip the blank separator between options and content.
                content_start = if line.is_empty() { index + 1 } else { index };
                break;
            }
        }
    }

    let content = dedent(&block[content_start.min(block.len())..]);
    if !spec.has_content && !content.is_empty() {
        return Err("no content permitted".to_string());
    }

    Ok(Invocation {
        argument: argument.map(str::to_string),
        options,
        content,
        line: line_number,
        raw: raw.to_string(),
    })
}

/// `:name: value` field lines inside a directive block.
fn parse_option_line(line: &str) -> Option<(&str, Option<&str>)> {
    let rest = line.strip_prefix(':')?;
    let close = rest.find(':')?;
    let name = &rest[..close];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    let value = rest[close + 1..].trim();
    Some((name, if value.is_empty() { None } else { Some(value) }))
}

fn dedent(lines: &[&str]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.len() >= indent {
                line[indent..].to_string()
            } else {
                line.trim_start().to_string()
            }
        })
        .collect()
}

/// A fence delimiter line (``` or ~~~), returning the fence character and
/// run length.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    for ch in ['`', '~'] {
        let count = trimmed.chars().take_while(|&c| c == ch).count();
        if count >= 3 {
            return Some((ch, count));
        }
    }
    None
}

/// Convert a Markdown fragment to HTML with the converter's comrak options.
pub fn render_markdown(text: &str) -> String {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.render.unsafe_ = true; // Allow raw HTML
    markdown_to_html(text, &options)
}

/// Render inline Markdown (heading text), dropping the paragraph wrapper.
pub fn render_inline(text: &str) -> String {
    let html = render_markdown(text);
    let trimmed = html.trim();
    let trimmed = trimmed.strip_prefix("<p>").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("</p>").unwrap_or(trimmed);
    trimmed.to_string()
}

/// True if the fragment contains a MathJax construct (`$$ … $$` or
/// `\( … \)`).
pub fn contains_math(text: &str) -> bool {
    text.contains("$$") || text.contains("\\(")
}
