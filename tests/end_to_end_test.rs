use reveal_slides::render::RenderConfig;
use reveal_slides::{convert, DirectiveRegistry};

fn test_config() -> RenderConfig {
    RenderConfig {
        provision_assets: false,
        ..RenderConfig::default()
    }
}

fn convert_str(source: &str) -> String {
    convert(source, &DirectiveRegistry::standard(), &test_config())
        .expect("conversion should succeed")
}

#[test]
fn test_transition_attaches_to_following_top_level_slide() {
    // Slide A with vertical sub-slide A.1, then slide B. A transition
    // directive inside A.1 must land on B, not on anything inside A.
    let source = "\
## A

content of A

### A.1

.. transition:: fade
   :speed: fast

## B

content of B
";
    let html = convert_str(source);
    assert!(
        html.contains(
            "<section data-transition=\"fade\" data-transition-speed=\"fast\">\n<h2>B</h2>"
        ),
        "transition should annotate slide B:\n{}",
        html
    );
    // Exactly one section carries the attribute.
    assert_eq!(html.matches("data-transition=").count(), 1);
    assert!(!html.contains("ERROR:"));
}

#[test]
fn test_transition_in_last_slide_degrades_to_error_marker() {
    let source = "## A\n\n## B\n\n.. transition:: zoom\n";
    let html = convert_str(source);
    assert!(!html.contains("data-transition"));
    assert!(html.contains("ERROR: no following section for transition directive"));
    assert!(html.contains(".. transition:: zoom"));
    // The failure is local; both slides still render.
    assert!(html.contains("<h2>A</h2>"));
    assert!(html.contains("<h2>B</h2>"));
}

#[test]
fn test_state_class_merging_is_idempotent() {
    let source = "\
## Slide

.. reveal-state:: a b

.. reveal-state:: b c
";
    let html = convert_str(source);
    assert!(html.contains("data-state=\"a b c\""));
    assert!(!html.contains("data-state=\"a b b c\""));
}

#[test]
fn test_full_presentation() {
    let source = "\
# My Presentation
## A subtitle

.. titlepage::
    :authors: Ada Lovelace, Charles Babbage
    :date: April 1, 2018
    :organization: Analytical Engines Ltd

.. background:: image/titlepage.png

## First slide

Some *introductory* text.

.. background:: #223344

.. reveal-state:: fancy
    :timing: 120

### Detail slide

More detail, with math: $$a^2 + b^2 = c^2$$

.. transition:: fade

## Second slide

```python
print(\"hello\")
```

.. aside::

    Mention the benchmark numbers here.

.. reveal::
    :width: 1280
    :height: 720
    :transition: slide
";
    let html = convert_str(source);

    // Title slide with docinfo and title-page background.
    assert!(html.contains("<section data-background-image=\"image/titlepage.png\">"));
    assert!(html.contains("<h1>My Presentation</h1>"));
    assert!(html.contains("<h3 class=\"subtitle\">A subtitle</h3>"));
    assert!(html.contains("<p class=\"authors\">Ada Lovelace, Charles Babbage</p>"));
    assert!(html.contains("<p class=\"organization\">Analytical Engines Ltd</p>"));

    // First slide is a vertical group whose inner section carries the
    // background and state annotations.
    assert!(html.contains("data-background-color=\"#223344\""));
    assert!(html.contains("data-state=\"fancy\""));
    assert!(html.contains("data-timing=\"120\""));

    // The transition placed in the vertical sub-slide lands on the second
    // top-level slide.
    assert!(html.contains("<section data-transition=\"fade\">\n<h2>Second slide</h2>"));

    // Code block, speaker notes, math plugin.
    assert!(html.contains("<pre><code class=\"language-python\">"));
    assert!(html.contains("<aside class=\"notes\">"));
    assert!(html.contains("plugin/math/math.js"));

    // Init options from the reveal:: directive.
    assert!(html.contains("        width: 1280,\n"));
    assert!(html.contains("        height: 720,\n"));
    assert!(html.contains("        transition: 'slide',\n"));

    // No placeholders and no error markers survive.
    assert!(!html.contains("ERROR:"));
}
