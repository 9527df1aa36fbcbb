//! End-to-end pipeline tests: scan -> process -> write

use std::fs;

use tempfile::TempDir;

use ctxpack::processor::{Processor, ProcessorOptions};
use ctxpack::scanner::{self, Scanner};
use ctxpack::tree::directory_tree;
use ctxpack::types::{OutputFormat, ScanOptions};
use ctxpack::writer::{FileWriter, WriterOptions};

fn seed_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "x".repeat(50)).unwrap();
    fs::write(temp.path().join("b.bin"), [0u8; 4]).unwrap();
    fs::create_dir(temp.path().join("ignored")).unwrap();
    fs::write(temp.path().join("ignored/c.txt"), "hidden").unwrap();
    fs::create_dir(temp.path().join("src")).unwrap();
    fs::write(
        temp.path().join("src/main.rs"),
        "// entry point\nfn main() { println!(\"hi\"); }\n",
    )
    .unwrap();
    temp
}

#[tokio::test]
async fn test_scan_process_write_json() {
    let workspace = seed_workspace();
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("pack.json");

    let mut s = Scanner::new()
        .with_root(workspace.path())
        .with_ignore_patterns(vec!["ignored/*".to_string()]);
    let (results, errors) = s.scan(ScanOptions::default());
    let (entries, errs) = scanner::drain(results, errors).await;

    assert!(errs.is_empty(), "unexpected scan errors: {:?}", errs);
    assert_eq!(entries.len(), 3);

    let processor = Processor::new(ProcessorOptions::default()).unwrap();
    let processed = processor.process_all(workspace.path(), &entries);

    let mut writer = FileWriter::new(WriterOptions {
        output_path: out_path.clone(),
        format: OutputFormat::Json,
        pretty_print: true,
    })
    .unwrap();
    writer.write_directory_context(
        workspace.path().to_string_lossy(),
        directory_tree(workspace.path(), &["ignored/*".to_string()]),
    );

    for result in processed {
        let content = result.unwrap();
        if !content.content.is_empty() {
            writer.write(content).unwrap();
        }
    }
    writer.close().unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let files = doc["files"].as_array().unwrap();

    // The binary and the ignored file never reach the artifact.
    let paths: Vec<&str> = files.iter().map(|f| f["path"].as_str().unwrap()).collect();
    assert_eq!(paths, vec!["a.txt", "src/main.rs"]);

    assert_eq!(files[0]["content"].as_str().unwrap(), "x".repeat(50));
    assert_eq!(files[1]["language"], "rust");
    assert!(doc["directoryContext"]["tree"]
        .as_str()
        .unwrap()
        .contains("src/"));
    assert!(!doc["directoryContext"]["tree"]
        .as_str()
        .unwrap()
        .contains("ignored"));
}

#[tokio::test]
async fn test_large_file_arrives_chunked_in_artifact() {
    let workspace = TempDir::new().unwrap();
    let body: String = (0..400).map(|i| format!("line {}\n", i)).collect();
    fs::write(workspace.path().join("big.txt"), &body).unwrap();

    let mut s = Scanner::new().with_root(workspace.path());
    let (results, errors) = s.scan(ScanOptions::default());
    let (entries, errs) = scanner::drain(results, errors).await;
    assert!(errs.is_empty());

    let processor = Processor::new(ProcessorOptions {
        max_chunk_size: 256,
        chunk_overlap: 32,
        ..Default::default()
    })
    .unwrap();
    let processed = processor.process_all(workspace.path(), &entries);

    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("pack.json");
    let mut writer = FileWriter::new(WriterOptions {
        output_path: out_path.clone(),
        format: OutputFormat::Json,
        pretty_print: false,
    })
    .unwrap();
    for result in processed {
        writer.write(result.unwrap()).unwrap();
    }
    writer.close().unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let chunks = doc["files"][0]["chunks"].as_array().unwrap();
    assert!(chunks.len() > 1);
    for chunk in chunks {
        assert!(chunk["content"].as_str().unwrap().len() <= 256 + 1);
        assert_eq!(chunk["startLine"], 1);
        assert_eq!(chunk["endLine"], 1);
    }
}

#[tokio::test]
async fn test_cancelled_scan_still_writes_partial_artifact() {
    let workspace = TempDir::new().unwrap();
    for i in 0..100 {
        fs::write(workspace.path().join(format!("f{:03}.txt", i)), "data").unwrap();
    }

    let mut s = Scanner::new().with_root(workspace.path()).with_workers(2);
    let (mut results, errors) = s.scan(ScanOptions::default());

    let first = results.recv().await.unwrap();
    s.stop().await;
    s.stop().await;
    let (_rest, _errs) = scanner::drain(results, errors).await;

    let processor = Processor::new(ProcessorOptions::default()).unwrap();
    let content = processor.process(workspace.path(), &first).unwrap();

    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("partial.xml");
    let mut writer = FileWriter::new(WriterOptions {
        output_path: out_path.clone(),
        format: OutputFormat::Xml,
        pretty_print: true,
    })
    .unwrap();
    writer.write(content).unwrap();
    writer.close().unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    assert!(text.contains("<file>"));
    assert!(text.contains("data"));
}

#[tokio::test]
async fn test_empty_workspace_produces_no_artifact() {
    let workspace = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("empty.json");

    let mut s = Scanner::new().with_root(workspace.path());
    let (results, errors) = s.scan(ScanOptions::default());
    let (entries, errs) = scanner::drain(results, errors).await;
    assert!(entries.is_empty());
    assert!(errs.is_empty());

    let writer = FileWriter::new(WriterOptions {
        output_path: out_path.clone(),
        format: OutputFormat::Json,
        pretty_print: true,
    })
    .unwrap();
    writer.close().unwrap();
    assert!(!out_path.exists());
}
