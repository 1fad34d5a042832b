// ABOUTME: Directive registry and handlers for the reveal-slides application
// ABOUTME: Directives emit tree nodes, record configuration, or defer annotations

use std::collections::BTreeMap;
use std::path::PathBuf;

use glob::glob;
use log::info;

use crate::options::{parse_class_list, OptionValue, Validator};
use crate::parse;
use crate::tree::{
    Annotation, Background, DocTree, NodeId, NodeKind, Pending, SlideState, Transition,
};

/// A single directive occurrence, already split into argument, validated
/// options, and dedented content lines.
#[derive(Debug)]
pub struct Invocation {
    pub argument: Option<String>,
    pub options: BTreeMap<String, OptionValue>,
    pub content: Vec<String>,
    pub line: usize,
    pub raw: String,
}

impl Invocation {
    fn str_option(&self, name: &str) -> Option<String> {
        self.options.get(name).and_then(|v| v.as_str()).map(String::from)
    }
}

/// Outcome of running a handler: `Err` degrades to an inline error marker
/// at the directive's location, never a fatal error.
pub type HandlerResult = std::result::Result<(), String>;

pub type Handler = fn(&Invocation, &mut DocTree, NodeId) -> HandlerResult;

pub struct DirectiveSpec {
    pub name: &'static str,
    pub required_argument: bool,
    pub allow_argument: bool,
    pub has_content: bool,
    pub options: &'static [(&'static str, Validator)],
    pub run: Handler,
}

/// Explicit directive name → handler table, constructed once at startup and
/// passed to the parser.
pub struct DirectiveRegistry {
    directives: Vec<&'static DirectiveSpec>,
}

impl Default for DirectiveRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl DirectiveRegistry {
    pub fn empty() -> Self {
        Self {
            directives: Vec::new(),
        }
    }

    /// The standard presentation directive set.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(&VIDEO);
        registry.register(&REVEAL);
        registry.register(&TITLEPAGE);
        registry.register(&BACKGROUND);
        registry.register(&TRANSITION);
        registry.register(&REVEAL_STATE);
        registry.register(&ASIDE);
        registry.register(&CONFIGURE);
        registry
    }

    pub fn register(&mut self, spec: &'static DirectiveSpec) {
        self.directives.retain(|d| d.name != spec.name);
        self.directives.push(spec);
    }

    pub fn get(&self, name: &str) -> Option<&'static DirectiveSpec> {
        self.directives.iter().find(|d| d.name == name).copied()
    }
}

const VIDEO_CODECS: &[&str] = &["mp4", "webm", "ogg", "ogv"];
const IMAGE_EXTENSIONS: &[&str] = &["bmp", "jpg", "jpeg", "png", "gif", "svg"];
const TRANSITION_STYLES: &[&str] = &["none", "fade", "slide", "convex", "concave", "zoom"];

/// Insert a video embed at the current position.
pub static VIDEO: DirectiveSpec = DirectiveSpec {
    name: "video",
    required_argument: true,
    allow_argument: true,
    has_content: false,
    options: &[
        ("align", Validator::Choice(&["center", "left", "right"])),
        ("width", Validator::UnchangedRequired),
        ("autoplay", Validator::Flag),
        ("loop", Validator::Flag),
        ("controls", Validator::Boolean),
    ],
    run: run_video,
};

fn run_video(inv: &Invocation, tree: &mut DocTree, parent: NodeId) -> HandlerResult {
    let href = inv.argument.as_deref().unwrap_or("").trim().to_string();
    let codec = href.rsplit('.').next().unwrap_or("").to_lowercase();
    if !VIDEO_CODECS.contains(&codec.as_str()) {
        return Err("the video must be in .mp4, .webm, .ogg, or .ogv format".to_string());
    }
    let align = inv.str_option("align").unwrap_or_else(|| "center".to_string());
    let width = inv.str_option("width").unwrap_or_else(|| "50%".to_string());
    let controls = inv
        .options
        .get("controls")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let flags = [
        ("autoplay", inv.options.contains_key("autoplay")),
        ("loop", inv.options.contains_key("loop")),
        ("controls", controls),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| format!(" {}", name))
    .collect::<String>();
    let html = format!(
        "<div class=\"align-{align}\">\n    \
         <video style=\"text-align:{align}; float:{align}\" width=\"{width}\"{flags}>\n        \
         <source src=\"{href}\" type=\"video/{codec}\">\n        \
         Your browser does not support the video tag.\n    \
         </video>\n</div>\n",
        align = align,
        width = width,
        flags = flags,
        href = href,
        codec = codec,
    );
    tree.append_child(parent, NodeKind::RawHtml { html });
    Ok(())
}

/// Record reveal.js initialization options on the document root.
/// See http://github.com/hakimel/reveal.js/#configure
pub static REVEAL: DirectiveSpec = DirectiveSpec {
    name: "reveal",
    required_argument: false,
    allow_argument: false,
    has_content: false,
    options: &[
        ("controls", Validator::Boolean),
        ("controlsTutorial", Validator::Boolean),
        ("controlsLayout", Validator::Choice(&["bottom-right", "edges"])),
        ("controlsBackArrows", Validator::Choice(&["faded", "hidden", "visible"])),
        ("progress", Validator::Boolean),
        ("defaultTiming", Validator::NonNegativeInt),
        ("slideNumber", Validator::Boolean),
        ("history", Validator::Boolean),
        ("keyboard", Validator::Boolean),
        ("overview", Validator::Boolean),
        ("center", Validator::Boolean),
        ("touch", Validator::Boolean),
        ("loop", Validator::Boolean),
        ("rtl", Validator::Boolean),
        ("shuffle", Validator::Boolean),
        ("fragments", Validator::Boolean),
        ("embedded", Validator::Boolean),
        ("help", Validator::Boolean),
        ("showNotes", Validator::Boolean),
        ("autoPlayMedia", Validator::Ternary),
        ("autoSlide", Validator::NonNegativeInt),
        ("autoSlideStoppable", Validator::Boolean),
        ("autoSlideMethod", Validator::UnchangedRequired),
        ("mouseWheel", Validator::Boolean),
        ("hideAddressBar", Validator::Boolean),
        ("previewLinks", Validator::Boolean),
        ("transition", Validator::Choice(TRANSITION_STYLES)),
        ("transitionSpeed", Validator::Choice(&["default", "fast", "slow"])),
        ("backgroundTransition", Validator::Choice(TRANSITION_STYLES)),
        ("viewDistance", Validator::NonNegativeInt),
        ("parallaxBackgroundImage", Validator::Uri),
        ("parallaxBackgroundSize", Validator::Unchanged),
        ("parallaxBackgroundHorizontal", Validator::UnchangedRequired),
        ("parallaxBackgroundVertical", Validator::UnchangedRequired),
        ("display", Validator::UnchangedRequired),
        ("width", Validator::UnchangedRequired),
        ("height", Validator::UnchangedRequired),
        ("margin", Validator::UnchangedRequired),
        ("minScale", Validator::UnchangedRequired),
        ("maxScale", Validator::UnchangedRequired),
        // math.js plugin initialization
        ("mathjax", Validator::Uri),
        ("mathjaxConfig", Validator::UnchangedRequired),
        // reveal.js theme and highlight.js style selection
        ("theme", Validator::UnchangedRequired),
        ("highlightStyle", Validator::UnchangedRequired),
        ("revealPath", Validator::UnchangedRequired),
    ],
    run: run_reveal,
};

fn run_reveal(inv: &Invocation, tree: &mut DocTree, _parent: NodeId) -> HandlerResult {
    let mut opts = inv.options.clone();
    if let Some(path) = opts.remove("revealPath").and_then(|v| v.as_str().map(String::from)) {
        tree.reveal_dir = Some(PathBuf::from(path));
    }
    // Prefer a MathJax copy already present under the assets directory.
    let dir = tree
        .reveal_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("ui"));
    let pattern = format!("{}/MathJax*", dir.display());
    if let Ok(paths) = glob(&pattern) {
        let mut found: Vec<PathBuf> = paths.flatten().collect();
        found.sort();
        if let Some(local) = found.pop() {
            tree.mathjax.url = local.join("MathJax.js").display().to_string();
        }
    }
    if let Some(url) = opts.remove("mathjax").and_then(|v| v.as_str().map(String::from)) {
        tree.mathjax.url = url;
    }
    if let Some(config) = opts.remove("mathjaxConfig").and_then(|v| v.as_str().map(String::from)) {
        tree.mathjax.config = config;
    }
    if let Some(theme) = opts.remove("theme").and_then(|v| v.as_str().map(String::from)) {
        tree.theme = Some(theme.trim().to_string());
    }
    if let Some(style) = opts.remove("highlightStyle").and_then(|v| v.as_str().map(String::from)) {
        tree.hljs_style = Some(style.trim().to_string());
    }
    // A second reveal:: block replaces the first wholesale.
    tree.reveal = opts;
    Ok(())
}

/// Record author, date, etc. for the presentation title page.
pub static TITLEPAGE: DirectiveSpec = DirectiveSpec {
    name: "titlepage",
    required_argument: false,
    allow_argument: false,
    has_content: false,
    options: &[
        ("author", Validator::UnchangedRequired),
        ("authors", Validator::UnchangedRequired),
        ("date", Validator::UnchangedRequired),
        ("organization", Validator::UnchangedRequired),
        ("event", Validator::UnchangedRequired),
        ("auspices", Validator::UnchangedRequired),
    ],
    run: run_titlepage,
};

fn run_titlepage(inv: &Invocation, tree: &mut DocTree, _parent: NodeId) -> HandlerResult {
    let mut data = BTreeMap::new();
    for (name, value) in &inv.options {
        let key = if name.as_str() == "author" {
            "authors"
        } else {
            name.as_str()
        };
        if let Some(text) = value.as_str() {
            data.insert(key.to_string(), text.to_string());
        }
    }
    tree.titledata = data;
    Ok(())
}

/// Defer data-background-* attributes onto the enclosing slide. The
/// enclosing section may still change during title promotion, so the
/// directive only parks a placeholder; the resolver attaches the
/// attributes once the tree is final.
pub static BACKGROUND: DirectiveSpec = DirectiveSpec {
    name: "background",
    required_argument: true,
    allow_argument: true,
    has_content: false,
    options: &[
        ("size", Validator::UnchangedRequired),
        ("position", Validator::UnchangedRequired),
        ("repeat", Validator::Boolean),
    ],
    run: run_background,
};

fn run_background(inv: &Invocation, tree: &mut DocTree, parent: NodeId) -> HandlerResult {
    let arg = inv.argument.as_deref().unwrap_or("").trim().to_string();
    let extension = arg.rsplit('.').next().unwrap_or("").to_lowercase();
    let background = if arg.contains('.') && IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Background {
            image: Some(arg),
            color: None,
            size: inv.str_option("size"),
            position: inv.str_option("position"),
            repeat: inv
                .options
                .get("repeat")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    } else {
        // Argument does not look like an image URL, assume a color.
        if !inv.options.is_empty() {
            return Err("color background directive accepts no options".to_string());
        }
        Background {
            color: Some(arg),
            ..Background::default()
        }
    };
    tree.append_child(
        parent,
        NodeKind::Pending(Pending {
            annotation: Annotation::Background(background),
            line: inv.line,
            raw: inv.raw.clone(),
        }),
    );
    Ok(())
}

/// Defer a data-transition attribute onto the next section. The target
/// section does not exist yet when the directive is parsed.
pub static TRANSITION: DirectiveSpec = DirectiveSpec {
    name: "transition",
    required_argument: true,
    allow_argument: true,
    has_content: false,
    options: &[("speed", Validator::Choice(&["default", "fast", "slow"]))],
    run: run_transition,
};

fn run_transition(inv: &Invocation, tree: &mut DocTree, parent: NodeId) -> HandlerResult {
    let style = inv.argument.as_deref().unwrap_or("").trim().to_lowercase();
    if !TRANSITION_STYLES.contains(&style.as_str()) {
        return Err(format!("unrecognized reveal.js transition \"{}\"", style));
    }
    tree.append_child(
        parent,
        NodeKind::Pending(Pending {
            annotation: Annotation::Transition(Transition {
                style,
                speed: inv.str_option("speed"),
            }),
            line: inv.line,
            raw: inv.raw.clone(),
        }),
    );
    Ok(())
}

/// Defer data-state classes, speaker timing, and short notes onto the
/// enclosing slide.
pub static REVEAL_STATE: DirectiveSpec = DirectiveSpec {
    name: "reveal-state",
    required_argument: false,
    allow_argument: true,
    has_content: false,
    options: &[
        ("timing", Validator::Int),
        ("notes", Validator::UnchangedRequired),
    ],
    run: run_reveal_state,
};

fn run_reveal_state(inv: &Invocation, tree: &mut DocTree, parent: NodeId) -> HandlerResult {
    let classes = match inv.argument.as_deref() {
        Some(arg) => parse_class_list(arg)
            .map_err(|e| format!("invalid class attribute value: {}", e))?,
        None => Vec::new(),
    };
    tree.append_child(
        parent,
        NodeKind::Pending(Pending {
            annotation: Annotation::SlideState(SlideState {
                classes,
                timing: inv.options.get("timing").and_then(|v| v.as_int()),
                notes: inv.str_option("notes"),
            }),
            line: inv.line,
            raw: inv.raw.clone(),
        }),
    );
    Ok(())
}

/// Speaker notes for the enclosing slide, rendered as an `<aside>`.
pub static ASIDE: DirectiveSpec = DirectiveSpec {
    name: "aside",
    required_argument: false,
    allow_argument: true,
    has_content: true,
    options: &[],
    run: run_aside,
};

fn run_aside(inv: &Invocation, tree: &mut DocTree, parent: NodeId) -> HandlerResult {
    if inv.content.is_empty() {
        return Ok(());
    }
    let classes = match inv.argument.as_deref() {
        Some(arg) => parse_class_list(arg)
            .map_err(|e| format!("invalid class attribute value: {}", e))?,
        None => vec!["notes".to_string()],
    };
    let body = inv.content.join("\n");
    if parse::contains_math(&body) {
        tree.uses_math = true;
    }
    let aside = tree.append_child(parent, NodeKind::Aside { classes });
    let html = parse::render_markdown(&body);
    tree.append_child(aside, NodeKind::Content { html });
    Ok(())
}

/// Converter settings from inside the document itself.
pub static CONFIGURE: DirectiveSpec = DirectiveSpec {
    name: "configure",
    required_argument: false,
    allow_argument: false,
    has_content: false,
    options: &[
        ("title", Validator::UnchangedRequired),
        ("stylesheet", Validator::CommaList),
        ("embed_stylesheet", Validator::Boolean),
    ],
    run: run_configure,
};

fn run_configure(inv: &Invocation, tree: &mut DocTree, _parent: NodeId) -> HandlerResult {
    if let Some(title) = inv.str_option("title") {
        tree.title_override = Some(title);
    }
    if let Some(OptionValue::List(sheets)) = inv.options.get("stylesheet") {
        info!("configure:: adds {} stylesheet(s)", sheets.len());
        tree.stylesheets = sheets.clone();
    }
    if let Some(embed) = inv.options.get("embed_stylesheet").and_then(|v| v.as_bool()) {
        tree.embed_stylesheets = Some(embed);
    }
    Ok(())
}
