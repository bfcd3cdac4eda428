use super::*;
use std::io::Write;
use tempfile::TempDir;

fn loader() -> MarkdownLoader {
    MarkdownLoader::new(&SplitterConfig {
        chunk_size: 1000,
        chunk_overlap: 200,
    })
}

fn write_file(dir: &TempDir, name: &str, content: &str) {
    std::fs::write(dir.path().join(name), content).expect("should write fixture file");
}

fn pattern(dir: &TempDir, glob: &str) -> String {
    format!("{}/{}", dir.path().display(), glob)
}

#[test]
fn zero_matches_yield_empty_list() {
    let dir = TempDir::new().expect("should create temp dir");
    let chunks = loader().load_documents(&[pattern(&dir, "*.md")]);
    assert!(chunks.is_empty());
}

#[test]
fn loads_and_sections_markdown() {
    let dir = TempDir::new().expect("should create temp dir");
    write_file(
        &dir,
        "faq.md",
        "# Overview\nIntroductory text.\n\n# Details\nMore text here.\n",
    );

    let chunks = loader().load_documents(&[pattern(&dir, "*.md")]);

    // The file starts with the delimiter, so the leading empty section is
    // dropped and two heading sections remain.
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].content.contains("Overview"));
    assert_eq!(chunks[0].section_index, 1);
    assert!(chunks[1].content.contains("Details"));
    assert_eq!(chunks[1].section_index, 2);
    for chunk in &chunks {
        assert!(chunk.source.ends_with("faq.md"));
    }
}

#[test]
fn preamble_before_first_heading_is_section_zero() {
    let dir = TempDir::new().expect("should create temp dir");
    write_file(&dir, "doc.md", "Some preamble.\n\n# First\nBody.\n");

    let chunks = loader().load_documents(&[pattern(&dir, "*.md")]);

    assert_eq!(chunks[0].section_index, 0);
    assert!(chunks[0].content.contains("preamble"));
}

#[test]
fn whitespace_only_sections_are_discarded() {
    let dir = TempDir::new().expect("should create temp dir");
    write_file(&dir, "doc.md", "# \n   \n# Real\nContent.\n");

    let chunks = loader().load_documents(&[pattern(&dir, "*.md")]);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].content.contains("Real"));
}

#[test]
fn long_sections_are_split_to_chunk_size() {
    let dir = TempDir::new().expect("should create temp dir");
    let body: String = std::iter::repeat("lorem ipsum dolor sit amet ")
        .take(20)
        .collect();
    write_file(&dir, "long.md", &format!("# Section\n{}", body));

    let small = MarkdownLoader::new(&SplitterConfig {
        chunk_size: 80,
        chunk_overlap: 20,
    });
    let chunks = small.load_documents(&[pattern(&dir, "*.md")]);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.content.chars().count() <= 80);
        assert_eq!(chunk.section_index, 1);
    }
}

#[test]
fn unreadable_file_is_skipped_not_fatal() {
    let dir = TempDir::new().expect("should create temp dir");
    write_file(&dir, "good.md", "# Fine\nReadable content.\n");
    let mut bad = std::fs::File::create(dir.path().join("bad.md")).expect("should create file");
    bad.write_all(&[0xff, 0xfe, 0x00, 0x80])
        .expect("should write bytes");

    let chunks = loader().load_documents(&[pattern(&dir, "*.md")]);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].source.ends_with("good.md"));
}

#[test]
fn multiple_patterns_accumulate_in_order() {
    let dir = TempDir::new().expect("should create temp dir");
    write_file(&dir, "a.md", "# A\nAlpha.\n");
    write_file(&dir, "b.txt", "# B\nBravo.\n");

    let chunks = loader().load_documents(&[
        pattern(&dir, "*.md"),
        pattern(&dir, "missing/*.md"),
        pattern(&dir, "*.txt"),
    ]);

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].source.ends_with("a.md"));
    assert!(chunks[1].source.ends_with("b.txt"));
}
