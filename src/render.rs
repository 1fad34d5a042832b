// ABOUTME: HTML serialization for the reveal-slides application
// ABOUTME: Walks the annotated tree and emits the reveal.js slideshow document

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::assets;
use crate::errors::{Result, SlidesError};
use crate::options::OptionValue;
use crate::resources::ResourceFile;
use crate::tree::{DocTree, NodeId, NodeKind};

/// Settings for the final render. Values recorded by directives in the
/// document itself take precedence over these.
pub struct RenderConfig {
    pub theme: String,
    pub hljs_style: String,
    pub reveal_dir: PathBuf,
    pub stylesheets: Vec<ResourceFile>,
    pub embed_stylesheets: bool,
    pub language: String,
    /// Run the asset provisioner as part of serialization.
    pub provision_assets: bool,
    pub reveal_tag: String,
    /// Download MathJax at this tag during provisioning.
    pub mathjax_download: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: "beige".to_string(),
            hljs_style: "github".to_string(),
            reveal_dir: PathBuf::from("ui"),
            stylesheets: Vec::new(),
            embed_stylesheets: false,
            language: "en".to_string(),
            provision_assets: true,
            reveal_tag: "master".to_string(),
            mathjax_download: None,
        }
    }
}

/// Per-node-kind serialization hooks with default HTML behavior. The
/// reveal.js writer overrides the handful of points where slideshow markup
/// differs from plain HTML.
pub trait DocVisitor: Sized {
    fn dispatch(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        match &tree.node(id).kind {
            NodeKind::Document => self.visit_document(tree, id, out),
            NodeKind::Section { .. } => self.visit_section(tree, id, out),
            NodeKind::Title { .. } => self.visit_title(tree, id, out),
            NodeKind::Subtitle { .. } => self.visit_subtitle(tree, id, out),
            NodeKind::Content { .. } => self.visit_content(tree, id, out),
            NodeKind::RawHtml { .. } => self.visit_raw_html(tree, id, out),
            NodeKind::Aside { .. } => self.visit_aside(tree, id, out),
            NodeKind::Pending(_) => self.visit_pending(tree, id, out),
            NodeKind::SystemMessage { .. } => self.visit_system_message(tree, id, out),
        }
    }

    fn walk_children(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        for &child in tree.children(id) {
            self.dispatch(tree, child, out);
        }
    }

    fn visit_document(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        self.walk_children(tree, id, out);
    }

    fn visit_section(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        out.push('\n');
        out.push_str(&starttag("section", tree.node(id).attribs.as_ref()));
        self.walk_children(tree, id, out);
        out.push_str("</section>\n");
    }

    fn visit_title(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Title { html, .. } = &tree.node(id).kind {
            out.push_str(&format!("<h2>{}</h2>\n", html));
        }
    }

    fn visit_subtitle(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Subtitle { html } = &tree.node(id).kind {
            out.push_str(&format!("<h3 class=\"subtitle\">{}</h3>\n", html));
        }
    }

    fn visit_content(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Content { html } = &tree.node(id).kind {
            out.push_str(html);
        }
    }

    fn visit_raw_html(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::RawHtml { html } = &tree.node(id).kind {
            out.push_str(html);
        }
    }

    fn visit_aside(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Aside { classes } = &tree.node(id).kind {
            out.push_str(&format!(
                "\n<aside class=\"{}\">\n",
                escape_html(&classes.join(" "))
            ));
            self.walk_children(tree, id, out);
            out.push_str("</aside>\n");
        }
    }

    // Placeholders never survive the resolver passes; render any stray one
    // as an error marker rather than dropping it silently.
    fn visit_pending(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Pending(pending) = &tree.node(id).kind {
            out.push_str(&error_block("unresolved pending annotation", &pending.raw));
        }
    }

    fn visit_system_message(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::SystemMessage { message, source } = &tree.node(id).kind {
            out.push_str(&error_block(message, source));
        }
    }
}

/// The reveal.js slideshow writer.
struct RevealWriter;

impl DocVisitor for RevealWriter {
    // The document's own title, subtitle, and leading content become the
    // title slide; attributes recorded on the root (a title-page
    // background) go on its section tag.
    fn visit_document(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        let children = tree.children(id).to_vec();
        let has_title = children
            .first()
            .map_or(false, |&c| matches!(tree.node(c).kind, NodeKind::Title { .. }));
        if !has_title {
            self.walk_children(tree, id, out);
            return;
        }
        let first_section = children
            .iter()
            .position(|&c| tree.is_section(c))
            .unwrap_or(children.len());
        out.push('\n');
        out.push_str(&starttag("section", tree.node(id).attribs.as_ref()));
        out.push('\n');
        for &child in &children[..first_section] {
            self.dispatch(tree, child, out);
        }
        out.push_str(&docinfo(tree));
        out.push_str("</section>\n");
        for &child in &children[first_section..] {
            self.dispatch(tree, child, out);
        }
    }

    fn visit_section(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        let children = tree.children(id).to_vec();
        let attribs = tree.node(id).attribs.as_ref();
        if children.iter().any(|&c| tree.is_section(c)) {
            // Slide with vertical sub-slides: the slide's own content
            // becomes the first inner section, and the innermost tag is the
            // one that carries the data-attributes.
            out.push_str("\n<section>");
            out.push('\n');
            out.push_str(&starttag("section", attribs));
            out.push('\n');
            for &child in children.iter().filter(|&&c| !tree.is_section(c)) {
                self.dispatch(tree, child, out);
            }
            out.push_str("</section>\n");
            for &child in children.iter().filter(|&&c| tree.is_section(c)) {
                self.dispatch(tree, child, out);
            }
            out.push_str("</section>\n");
        } else {
            out.push('\n');
            out.push_str(&starttag("section", attribs));
            out.push('\n');
            self.walk_children(tree, id, out);
            out.push_str("</section>\n");
        }
    }

    fn visit_title(&mut self, tree: &DocTree, id: NodeId, out: &mut String) {
        if let NodeKind::Title { html, .. } = &tree.node(id).kind {
            let is_doc_title = tree
                .parent(id)
                .map_or(false, |p| matches!(tree.node(p).kind, NodeKind::Document));
            if is_doc_title {
                out.push_str(&format!("<h1>{}</h1>\n", html));
            } else {
                out.push_str(&format!("<h2>{}</h2>\n", html));
            }
        }
    }
}

/// Serialize the annotated tree to a complete HTML document and, as a side
/// effect, ensure the reveal.js assets exist on disk.
pub fn render(tree: &DocTree, config: &RenderConfig) -> Result<String> {
    if !tree.has_sections() && tree.doc_title_text().is_none() {
        return Err(SlidesError::DocumentError(
            "document has no slides; add at least one heading".to_string(),
        ));
    }

    // The document is authoritative for settings it records itself.
    let theme = tree.theme.clone().unwrap_or_else(|| config.theme.clone());
    let hljs_style = tree
        .hljs_style
        .clone()
        .unwrap_or_else(|| config.hljs_style.clone());
    let reveal_dir = tree
        .reveal_dir
        .clone()
        .unwrap_or_else(|| config.reveal_dir.clone());
    let embed = tree.embed_stylesheets.unwrap_or(config.embed_stylesheets);
    let mut stylesheets = config.stylesheets.clone();
    stylesheets.extend(tree.stylesheets.iter().map(|path| ResourceFile::new(path)));

    let dir = reveal_dir.display().to_string();
    let title = tree
        .title_override
        .clone()
        .or_else(|| tree.doc_title_text().map(str::to_string))
        .unwrap_or_else(|| "Presentation".to_string());

    let mut body = String::new();
    let mut writer = RevealWriter;
    writer.dispatch(tree, tree.root(), &mut body);

    let mut html = String::from("<!doctype html>\n");
    html.push_str(&format!("<html lang=\"{}\">\n<head>\n", config.language));
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str(&stylesheet_block(&dir, &theme, &hljs_style));
    for sheet in &stylesheets {
        html.push_str(&stylesheet_tag(sheet, embed));
        html.push('\n');
    }
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"reveal\">\n<div class=\"slides\">\n");
    html.push_str(&body);
    html.push_str("</div>\n</div>\n");
    html.push_str(&ending_scripts(tree, &dir));
    html.push_str("</body>\n</html>\n");

    if config.provision_assets {
        assets::setup(
            &reveal_dir,
            &config.reveal_tag,
            config.mathjax_download.as_deref(),
        )?;
    }

    Ok(html)
}

/// Embed or link one extra stylesheet, degrading to a link tag with a
/// warning when the content cannot be read.
fn stylesheet_tag(sheet: &ResourceFile, embed: bool) -> String {
    if embed && !sheet.is_remote {
        match sheet.style_tag() {
            Ok(tag) => return tag,
            Err(e) => warn!(
                "Failed to embed stylesheet {}: {}; linking it instead",
                sheet.path, e
            ),
        }
    } else if !sheet.is_remote && !Path::new(&sheet.path).exists() {
        warn!("Stylesheet path does not exist: {}", sheet.path);
    }
    sheet.link_tag()
}

fn stylesheet_block(reveal_dir: &str, theme: &str, hljs_style: &str) -> String {
    format!(
        r#"<meta name="apple-mobile-web-app-capable" content="yes" />
<meta name="apple-mobile-web-app-status-bar-style" content="black-translucent" />

<meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">

<link rel="stylesheet" href="{dir}/css/reveal.css">
<style>
  .reveal .slides {{text-align:left;}}
  .reveal h1, .reveal h2, .reveal .subtitle {{text-align:center;}}
  .reveal .align-center {{display:block; margin-left:auto; margin-right:auto;}}
  .reveal .align-left {{float:left;}}
  .reveal .align-right {{float:right;}}
</style>
<link rel="stylesheet" href="{dir}/css/theme/{theme}.css" id="theme">

<!-- Code syntax highlighting -->
<link rel="stylesheet" href="{dir}/hljs/{hljs}.css">

<!-- Printing and PDF exports -->
<script>
        var link = document.createElement( 'link' );
        link.rel = 'stylesheet';
        link.type = 'text/css';
        link.href = window.location.search.match( /print-pdf/gi ) ? '{dir}/css/print/pdf.css' : '{dir}/css/print/paper.css';
        document.getElementsByTagName( 'head' )[0].appendChild( link );
</script>
"#,
        dir = reveal_dir,
        theme = theme,
        hljs = hljs_style,
    )
}

fn ending_scripts(tree: &DocTree, reveal_dir: &str) -> String {
    let mut init = String::new();
    for (option, value) in &tree.reveal {
        init.push_str(&format!("        {}: {},\n", option, js_literal(value)));
    }
    let (math_option, math_dep) = if tree.uses_math {
        (
            format!(
                "        math: {{\n            mathjax: '{}',\n            config: '{}'\n        }},\n",
                tree.mathjax.url, tree.mathjax.config
            ),
            format!(
                "\n            {{ src: '{}/plugin/math/math.js', async: true }},",
                reveal_dir
            ),
        )
    } else {
        (String::new(), String::new())
    };
    format!(
        r#"<script src="{dir}/lib/js/head.min.js"></script>
<script src="{dir}/js/reveal.js"></script>

<script>

    // Full list of configuration options available at:
    // https://github.com/hakimel/reveal.js#configuration
    Reveal.initialize({{
{init}{math}        // Optional reveal.js plugins
        dependencies: [
            {{ src: '{dir}/lib/js/classList.js', condition: function() {{ return !document.body.classList; }} }},{math_dep}
            {{ src: '{dir}/plugin/markdown/marked.js', condition: function() {{ return !!document.querySelector( '[data-markdown]' ); }} }},
            {{ src: '{dir}/plugin/markdown/markdown.js', condition: function() {{ return !!document.querySelector( '[data-markdown]' ); }} }},
            {{ src: '{dir}/plugin/highlight/highlight.js', async: true, condition: function() {{ return !!document.querySelector( 'pre code' ); }}, callback: function() {{ hljs.initHighlightingOnLoad(); }} }},
            {{ src: '{dir}/plugin/search/search.js', async: true }},
            {{ src: '{dir}/plugin/zoom-js/zoom.js', async: true }},
            {{ src: '{dir}/plugin/notes/notes.js', async: true }}
        ]
    }});

</script>
"#,
        dir = reveal_dir,
        init = init,
        math = math_option,
        math_dep = math_dep,
    )
}

/// Title-page metadata block, rendered under the document subtitle.
fn docinfo(tree: &DocTree) -> String {
    const FIELDS: &[&str] = &["authors", "date", "organization", "event", "auspices"];
    if tree.titledata.is_empty() {
        return String::new();
    }
    let mut block = String::from("<div class=\"docinfo\">\n");
    for field in FIELDS {
        if let Some(value) = tree.titledata.get(*field) {
            block.push_str(&format!(
                "<p class=\"{}\">{}</p>\n",
                field,
                escape_html(value)
            ));
        }
    }
    block.push_str("</div>\n");
    block
}

/// Coerce a directive option value into a JavaScript literal for the
/// generated configuration object. Strings that parse as numbers become
/// numeric literals, preserving the integer-vs-fractional distinction.
pub fn js_literal(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Flag => "true".to_string(),
        OptionValue::Int(n) => n.to_string(),
        OptionValue::List(items) => quote_js(&items.join(" ")),
        OptionValue::Str(s) => match s.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => {
                if number.fract() == 0.0 && number.abs() < 9e15 {
                    format!("{}", number as i64)
                } else {
                    format!("{}", number)
                }
            }
            _ => quote_js(s),
        },
    }
}

fn quote_js(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn starttag(tag: &str, attribs: Option<&BTreeMap<String, String>>) -> String {
    let mut markup = format!("<{}", tag);
    if let Some(attribs) = attribs {
        for (name, value) in attribs {
            markup.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
    }
    markup.push('>');
    markup
}

fn error_block(message: &str, source: &str) -> String {
    format!(
        "<div class=\"system-message\">\n<p class=\"system-message-title\">ERROR: {}</p>\n<pre class=\"literal-block\">{}</pre>\n</div>\n",
        escape_html(message),
        escape_html(source)
    )
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output_path, html_content)?;
    Ok(())
}
