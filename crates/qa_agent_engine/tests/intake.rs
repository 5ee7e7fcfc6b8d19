use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use qa_agent_core::FileRole;
use qa_agent_engine::{read_file, read_files, IntakeError};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

#[tokio::test]
async fn selection_is_read_in_order_with_role_and_size() {
    let dir = TempDir::new().unwrap();
    let specs = write(&dir, "product_specs.md", b"# Specs\nSAVE15 gives 15% off");
    let guide = write(&dir, "ui_ux_guide.txt", b"Errors are red");

    let files = read_files(FileRole::Document, &[specs, guide])
        .await
        .expect("read ok");

    let names: Vec<_> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, vec!["product_specs.md", "ui_ux_guide.txt"]);
    assert_eq!(files[0].content, "# Specs\nSAVE15 gives 15% off");
    assert_eq!(files[0].size, 28);
    assert!(files.iter().all(|file| file.role == FileRole::Document));
}

#[tokio::test]
async fn one_missing_file_fails_the_whole_selection() {
    let dir = TempDir::new().unwrap();
    let present = write(&dir, "a.md", b"A");
    let missing = dir.path().join("missing.md");

    let err = read_files(FileRole::Document, &[present, missing])
        .await
        .expect_err("should fail");
    assert!(matches!(err, IntakeError::Read { ref path, .. } if path.ends_with("missing.md")));
}

#[tokio::test]
async fn empty_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.html", b"");

    let file = read_file(FileRole::Html, &path).await.expect("read ok");
    assert_eq!(file.content, "");
    assert_eq!(file.size, 0);
    assert_eq!(file.role, FileRole::Html);
}

#[tokio::test]
async fn utf8_bom_is_removed_but_counted_in_size() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bom.md", b"\xEF\xBB\xBFhello");

    let file = read_file(FileRole::Document, &path).await.expect("read ok");
    assert_eq!(file.content, "hello");
    assert_eq!(file.size, 8);
}

#[tokio::test]
async fn legacy_encoding_is_detected() {
    let dir = TempDir::new().unwrap();
    let text = "Le code de réduction SAVE15 applique une remise de quinze pour cent \
                sur le total. La livraison express coûte dix euros supplémentaires.";
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    let path = write(&dir, "notes.txt", &bytes);

    let file = read_file(FileRole::Document, &path).await.expect("read ok");
    assert_eq!(file.content, text);
}

#[tokio::test]
async fn nul_characters_do_not_block_intake() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "export.csv", b"col1\0col2\nSAVE15\0valid\n");
    let utf16 = write(&dir, "notes.txt", b"h\0i\0");
    let specs = write(&dir, "specs.md", b"SAVE15");

    let files = read_files(FileRole::Document, &[table, utf16, specs])
        .await
        .expect("whole selection loads");

    assert_eq!(files.len(), 3);
    assert_eq!(files[0].content, "col1\0col2\nSAVE15\0valid\n");
    assert_eq!(files[1].size, 4);
    assert_eq!(files[2].content, "SAVE15");
}

#[tokio::test]
async fn malformed_byte_after_bom_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "guide.md", b"\xEF\xBB\xBFDiscount \xFF code");

    let file = read_file(FileRole::Document, &path).await.expect("read ok");
    assert_eq!(file.content, "Discount \u{FFFD} code");
    assert_eq!(file.size, 18);
}
