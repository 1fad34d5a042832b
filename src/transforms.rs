// ABOUTME: Post-parse tree passes for the reveal-slides application
// ABOUTME: Title promotion plus priority-ordered resolution of pending annotations

use std::collections::BTreeMap;

use log::warn;

use crate::tree::{Annotation, AnnotationKind, DocTree, NodeId, NodeKind};

// Structural promotion runs before any annotation resolver: it can
// reparent placeholders (a background on the title page ends up a child of
// the document root), so targets must not be computed until it has run.
pub const PRIORITY_DOC_TITLE: u32 = 320;
pub const PRIORITY_DOC_SUBTITLE: u32 = 350;
pub const PRIORITY_BACKGROUND: u32 = 410;
pub const PRIORITY_TRANSITION: u32 = 411;
pub const PRIORITY_SLIDE_STATE: u32 = 415;

struct ResolverPass {
    priority: u32,
    kind: AnnotationKind,
    resolve: fn(&mut DocTree, NodeId),
}

// Ascending priority order; placeholders of one kind are processed in
// document order.
const PASSES: &[ResolverPass] = &[
    ResolverPass {
        priority: PRIORITY_BACKGROUND,
        kind: AnnotationKind::Background,
        resolve: resolve_background,
    },
    ResolverPass {
        priority: PRIORITY_TRANSITION,
        kind: AnnotationKind::Transition,
        resolve: resolve_transition,
    },
    ResolverPass {
        priority: PRIORITY_SLIDE_STATE,
        kind: AnnotationKind::SlideState,
        resolve: resolve_slide_state,
    },
];

/// Run every post-parse pass over a freshly parsed tree. After this the
/// tree holds no placeholder nodes and is ready to serialize.
pub fn apply(tree: &mut DocTree) {
    debug_assert!(PASSES.windows(2).all(|w| w[0].priority < w[1].priority));
    promote_doc_title(tree);
    promote_doc_subtitle(tree);
    for pass in PASSES {
        for id in tree.pending_ids() {
            if annotation_kind(tree, id) == Some(pass.kind) {
                (pass.resolve)(tree, id);
                tree.consume_pending(id);
            }
        }
    }
    sweep_unresolved(tree);
}

fn annotation_kind(tree: &DocTree, id: NodeId) -> Option<AnnotationKind> {
    match &tree.node(id).kind {
        NodeKind::Pending(pending) => Some(pending.annotation.kind()),
        _ => None,
    }
}

/// If the whole document is a single title-level section, its title becomes
/// the document title and its children are hoisted to the root. This is
/// what turns a leading `# Heading` into the presentation title page.
fn promote_doc_title(tree: &mut DocTree) {
    let root = tree.root();
    let children = tree.children(root).to_vec();
    if children.len() != 1 || tree.section_level(children[0]) != Some(1) {
        return;
    }
    let section = children[0];
    tree.detach(section);
    for child in tree.children(section).to_vec() {
        tree.reparent(child, root);
    }
}

/// A slide-level section with no body immediately after the document title
/// becomes the presentation subtitle. Placeholders parked inside it (a
/// title-page background, say) hoist to the root in document order.
fn promote_doc_subtitle(tree: &mut DocTree) {
    let root = tree.root();
    let children = tree.children(root).to_vec();
    let starts_with_title = children
        .first()
        .map_or(false, |&id| matches!(tree.node(id).kind, NodeKind::Title { .. }));
    if !starts_with_title || children.len() < 2 || tree.section_level(children[1]) != Some(2) {
        return;
    }
    let section = children[1];
    let section_children = tree.children(section).to_vec();
    let Some((&first, rest)) = section_children.split_first() else {
        return;
    };
    let html = match &tree.node(first).kind {
        NodeKind::Title { html, .. } => html.clone(),
        _ => return,
    };
    let bodyless = rest.iter().all(|&id| {
        matches!(
            tree.node(id).kind,
            NodeKind::Pending(_) | NodeKind::SystemMessage { .. }
        )
    });
    if !bodyless {
        return;
    }
    tree.detach(section);
    tree.insert_child_at(root, 1, NodeKind::Subtitle { html });
    let mut index = 2;
    for &child in rest {
        tree.reparent_at(child, root, index);
        index += 1;
    }
}

/// Attach data-background-* attributes to the placeholder's parent slide.
fn resolve_background(tree: &mut DocTree, id: NodeId) {
    let background = match &tree.node(id).kind {
        NodeKind::Pending(pending) => match &pending.annotation {
            Annotation::Background(background) => background.clone(),
            _ => return,
        },
        _ => return,
    };
    let Some(parent) = tree.parent(id) else { return };
    tree.detach(id);
    let mut atts = BTreeMap::new();
    if let Some(image) = background.image {
        atts.insert("data-background-image".to_string(), image);
        if background.repeat {
            // default no-repeat
            atts.insert("data-background-repeat".to_string(), "repeat".to_string());
        }
        if let Some(size) = background.size {
            // default cover
            atts.insert("data-background-size".to_string(), size.trim().to_lowercase());
        }
        if let Some(position) = background.position {
            // default center
            atts.insert(
                "data-background-position".to_string(),
                position.trim().to_lowercase(),
            );
        }
    } else if let Some(color) = background.color {
        atts.insert("data-background-color".to_string(), color);
    }
    tree.merge_attribs(parent, atts);
}

/// Attach a data-transition attribute to the section that follows the
/// placeholder. The following section may live at any ancestor level; if
/// none exists the placeholder degrades to a visible error marker.
fn resolve_transition(tree: &mut DocTree, id: NodeId) {
    let (transition, line, raw) = match &tree.node(id).kind {
        NodeKind::Pending(pending) => match &pending.annotation {
            Annotation::Transition(transition) => {
                (transition.clone(), pending.line, pending.raw.clone())
            }
            _ => return,
        },
        _ => return,
    };
    match tree.next_section_after(id) {
        Some(target) => {
            tree.detach(id);
            let mut atts = BTreeMap::new();
            atts.insert("data-transition".to_string(), transition.style);
            if let Some(speed) = transition.speed {
                atts.insert("data-transition-speed".to_string(), speed);
            }
            tree.merge_attribs(target, atts);
        }
        None => {
            let message = "no following section for transition directive".to_string();
            warn!("line {}: {}", line, message);
            tree.replace_kind(id, NodeKind::SystemMessage { message, source: raw });
        }
    }
}

/// Attach data-state, data-timing, and data-notes to the placeholder's
/// parent slide. data-state class lists union across multiple directives.
fn resolve_slide_state(tree: &mut DocTree, id: NodeId) {
    let state = match &tree.node(id).kind {
        NodeKind::Pending(pending) => match &pending.annotation {
            Annotation::SlideState(state) => state.clone(),
            _ => return,
        },
        _ => return,
    };
    let Some(parent) = tree.parent(id) else { return };
    tree.detach(id);
    let mut atts = BTreeMap::new();
    if !state.classes.is_empty() {
        atts.insert("data-state".to_string(), state.classes.join(" "));
    }
    if let Some(timing) = state.timing {
        atts.insert("data-timing".to_string(), timing.to_string());
    }
    if let Some(notes) = state.notes {
        atts.insert("data-notes".to_string(), notes);
    }
    tree.merge_attribs(parent, atts);
}

/// Any placeholder still in the tree after the resolver passes is a
/// defect: report it and leave a visible marker rather than dropping it.
fn sweep_unresolved(tree: &mut DocTree) {
    for id in tree.pending_ids() {
        let (line, raw) = match &tree.node(id).kind {
            NodeKind::Pending(pending) => (pending.line, pending.raw.clone()),
            _ => {
                tree.consume_pending(id);
                continue;
            }
        };
        warn!("line {}: unresolved pending annotation", line);
        tree.replace_kind(
            id,
            NodeKind::SystemMessage {
                message: "unresolved pending annotation".to_string(),
                source: raw,
            },
        );
        tree.consume_pending(id);
    }
}
