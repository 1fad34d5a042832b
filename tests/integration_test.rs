use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str]) -> Output {
    Command::new("cargo")
        .arg("run")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_convert_command() {
    // Create temporary directory
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    // Create sample markdown file
    let markdown_path = temp_path.join("talk.md");
    let markdown_content = "# Test Deck\n\n## First slide\n\nThis is a test slide.\n";
    fs::write(&markdown_path, markdown_content).expect("Failed to write markdown file");

    // Output HTML path
    let output_path = temp_path.join("talk.html");

    // Run command
    let output = run_command(&[
        "convert",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--skip-assets",
    ]);

    // Check command executed successfully
    assert!(output.status.success(), "Command failed: {:?}", output);

    // Check output file exists
    assert!(output_path.exists(), "Output file was not created");

    // Read output file
    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");

    // Verify output file content
    assert!(
        html_content.contains("<h1>Test Deck</h1>"),
        "Missing presentation title"
    );
    assert!(
        html_content.contains("<h2>First slide</h2>"),
        "Missing slide heading"
    );
    assert!(
        html_content.contains("<div class=\"reveal\">"),
        "Missing reveal.js wrapper"
    );
    assert!(
        html_content.contains("Reveal.initialize({"),
        "Missing initialization script"
    );
}

#[test]
fn test_convert_command_with_embedded_css() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    let markdown_path = temp_path.join("talk.md");
    fs::write(&markdown_path, "## Slide\n\ntext\n").expect("Failed to write markdown file");

    let css_path = temp_path.join("custom.css");
    let css_content = "body { font-family: Arial; }";
    fs::write(&css_path, css_content).expect("Failed to write CSS file");

    let output_path = temp_path.join("talk.html");

    let output = run_command(&[
        "convert",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--css",
        css_path.to_str().unwrap(),
        "--embed-css",
        "--skip-assets",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(
        html_content.contains("<style>body { font-family: Arial; }</style>"),
        "Missing embedded CSS"
    );
}

#[test]
fn test_convert_command_theme_flags() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    let markdown_path = temp_path.join("talk.md");
    fs::write(&markdown_path, "## Slide\n\ntext\n").expect("Failed to write markdown file");

    let output_path = temp_path.join("talk.html");

    let output = run_command(&[
        "convert",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--theme",
        "night",
        "--highlight-style",
        "obsidian",
        "--skip-assets",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(html_content.contains("/css/theme/night.css"), "Missing theme link");
    assert!(html_content.contains("/hljs/obsidian.css"), "Missing highlight style link");
}

#[test]
fn test_convert_command_missing_input_fails() {
    let output = run_command(&["convert", "/no/such/file.md", "--skip-assets"]);
    assert!(!output.status.success(), "Command should fail on a missing input");
}
