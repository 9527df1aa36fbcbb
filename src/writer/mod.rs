//! Artifact writer: renders processed content as XML, JSON, or YAML
//!
//! A pure formatting concern over [`ProcessedContent`]. Content is staged in
//! a buffer keyed by path and only hits disk on [`FileWriter::flush`]; no
//! output file is created when nothing was staged.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::WriteError;
use crate::types::{OutputFormat, ProcessedContent};

/// Options for output writing.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub pretty_print: bool,
}

/// Workspace summary emitted alongside the file payloads.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryContext {
    pub cwd: String,
    pub tree: String,
}

/// Buffered artifact writer.
pub struct FileWriter {
    opts: WriterOptions,
    buffer: BTreeMap<String, ProcessedContent>,
    context: Option<DirectoryContext>,
}

impl FileWriter {
    pub fn new(opts: WriterOptions) -> Result<Self, WriteError> {
        if opts.output_path.as_os_str().is_empty() {
            return Err(WriteError::EmptyOutputPath);
        }
        Ok(Self {
            opts,
            buffer: BTreeMap::new(),
            context: None,
        })
    }

    /// Stage content for the next flush. Re-staging the same path replaces
    /// the previous payload.
    pub fn write(&mut self, content: ProcessedContent) -> Result<(), WriteError> {
        if content.entry.path.is_empty() {
            return Err(WriteError::EmptyContentPath);
        }
        self.buffer.insert(content.entry.path.clone(), content);
        Ok(())
    }

    /// Un-stage a previously written path.
    pub fn remove(&mut self, path: &str) {
        self.buffer.remove(path);
    }

    /// Record the working directory and its rendered tree.
    pub fn write_directory_context(&mut self, cwd: impl Into<String>, tree: impl Into<String>) {
        self.context = Some(DirectoryContext {
            cwd: cwd.into(),
            tree: tree.into(),
        });
    }

    /// Number of currently staged payloads.
    pub fn staged(&self) -> usize {
        self.buffer.len()
    }

    /// Render everything staged to the output file.
    ///
    /// Creates no file when nothing was staged. Flushing twice rewrites the
    /// same document.
    pub fn flush(&self) -> Result<(), WriteError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let file = std::fs::File::create(&self.opts.output_path).map_err(|err| {
            WriteError::CreateFailed {
                path: self.opts.output_path.clone(),
                source: err,
            }
        })?;
        let mut out = std::io::BufWriter::new(file);

        match self.opts.format {
            OutputFormat::Xml => self.render_xml(&mut out),
            OutputFormat::Json => self.render_json(&mut out),
            OutputFormat::Yaml => self.render_yaml(&mut out),
        }?;

        out.flush().map_err(|err| WriteError::CreateFailed {
            path: self.opts.output_path.clone(),
            source: err,
        })?;
        tracing::info!(path = %self.opts.output_path.display(), files = self.buffer.len(), "artifact written");
        Ok(())
    }

    /// Finalize the artifact.
    pub fn close(self) -> Result<(), WriteError> {
        self.flush()
    }

    fn document(&self) -> Document<'_> {
        Document {
            directory_context: self.context.as_ref(),
            files: self.buffer.values().map(FileView::from).collect(),
        }
    }

    fn render_json(&self, out: &mut impl Write) -> Result<(), WriteError> {
        let doc = self.document();
        let result = if self.opts.pretty_print {
            serde_json::to_writer_pretty(out, &doc)
        } else {
            serde_json::to_writer(out, &doc)
        };
        result.map_err(|err| WriteError::EncodeFailed {
            format: "json".to_string(),
            reason: err.to_string(),
        })
    }

    fn render_yaml(&self, out: &mut impl Write) -> Result<(), WriteError> {
        serde_yaml::to_writer(out, &self.document()).map_err(|err| WriteError::EncodeFailed {
            format: "yaml".to_string(),
            reason: err.to_string(),
        })
    }

    fn render_xml(&self, out: &mut impl Write) -> Result<(), WriteError> {
        let encode = |err: std::io::Error| WriteError::EncodeFailed {
            format: "xml".to_string(),
            reason: err.to_string(),
        };

        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>").map_err(encode)?;
        writeln!(out, "<files>").map_err(encode)?;

        if let Some(context) = &self.context {
            writeln!(out, "  <directoryContext>").map_err(encode)?;
            writeln!(out, "    <cwd>{}</cwd>", escape_xml(&context.cwd)).map_err(encode)?;
            writeln!(out, "    <tree><![CDATA[\n{}]]></tree>", cdata(&context.tree))
                .map_err(encode)?;
            writeln!(out, "  </directoryContext>").map_err(encode)?;
        }

        for content in self.buffer.values() {
            writeln!(out, "  <file>").map_err(encode)?;
            writeln!(out, "    <path>{}</path>", escape_xml(&content.entry.path))
                .map_err(encode)?;
            if let Some(language) = &content.entry.language {
                writeln!(out, "    <language>{}</language>", escape_xml(language))
                    .map_err(encode)?;
            }
            let text = String::from_utf8_lossy(&content.content);
            writeln!(out, "    <content><![CDATA[\n{}\n]]></content>", cdata(&text))
                .map_err(encode)?;
            for chunk in &content.chunks {
                let chunk_text = String::from_utf8_lossy(&chunk.content);
                writeln!(
                    out,
                    "    <chunk tokenCount=\"{}\"><![CDATA[{}]]></chunk>",
                    chunk.token_count,
                    cdata(&chunk_text)
                )
                .map_err(encode)?;
            }
            writeln!(out, "  </file>").map_err(encode)?;
        }

        writeln!(out, "</files>").map_err(encode)
    }
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "directoryContext", skip_serializing_if = "Option::is_none")]
    directory_context: Option<&'a DirectoryContext>,
    files: Vec<FileView<'a>>,
}

#[derive(Serialize)]
struct FileView<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    size: u64,
    #[serde(rename = "modTime")]
    mod_time: String,
    content: Cow<'a, str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chunks: Vec<ChunkView<'a>>,
}

#[derive(Serialize)]
struct ChunkView<'a> {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "endLine")]
    end_line: usize,
    #[serde(rename = "tokenCount")]
    token_count: usize,
    content: Cow<'a, str>,
}

impl<'a> From<&'a ProcessedContent> for FileView<'a> {
    fn from(content: &'a ProcessedContent) -> Self {
        Self {
            path: &content.entry.path,
            language: content.entry.language.as_deref(),
            size: content.entry.size,
            mod_time: content.entry.mod_time.to_rfc3339(),
            content: String::from_utf8_lossy(&content.content),
            chunks: content
                .chunks
                .iter()
                .map(|chunk| ChunkView {
                    start_line: chunk.start_line,
                    end_line: chunk.end_line,
                    token_count: chunk.token_count,
                    content: String::from_utf8_lossy(&chunk.content),
                })
                .collect(),
        }
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Make text safe inside a CDATA section by splitting any `]]>` terminator.
fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, FileEntry};
    use chrono::Utc;
    use tempfile::TempDir;

    fn processed(path: &str, body: &str) -> ProcessedContent {
        ProcessedContent {
            entry: FileEntry {
                path: path.to_string(),
                size: body.len() as u64,
                mod_time: Utc::now(),
                is_binary: false,
                is_selected: true,
                language: Some("text".to_string()),
            },
            content: body.as_bytes().to_vec(),
            chunks: Vec::new(),
        }
    }

    fn writer(dir: &TempDir, format: OutputFormat) -> (FileWriter, PathBuf) {
        let path = dir.path().join(format!("out{}", format.extension()));
        let writer = FileWriter::new(WriterOptions {
            output_path: path.clone(),
            format,
            pretty_print: true,
        })
        .unwrap();
        (writer, path)
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let result = FileWriter::new(WriterOptions {
            output_path: PathBuf::new(),
            format: OutputFormat::Xml,
            pretty_print: false,
        });
        assert!(matches!(result, Err(WriteError::EmptyOutputPath)));
    }

    #[test]
    fn test_empty_content_path_rejected() {
        let temp = TempDir::new().unwrap();
        let (mut w, _) = writer(&temp, OutputFormat::Json);
        let result = w.write(processed("", "body"));
        assert!(matches!(result, Err(WriteError::EmptyContentPath)));
    }

    #[test]
    fn test_flush_without_content_creates_no_file() {
        let temp = TempDir::new().unwrap();
        let (w, path) = writer(&temp, OutputFormat::Xml);
        w.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_unstages() {
        let temp = TempDir::new().unwrap();
        let (mut w, path) = writer(&temp, OutputFormat::Json);
        w.write(processed("a.txt", "a")).unwrap();
        w.remove("a.txt");
        assert_eq!(w.staged(), 0);
        w.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_json_roundtrip() {
        let temp = TempDir::new().unwrap();
        let (mut w, path) = writer(&temp, OutputFormat::Json);
        w.write(processed("src/a.rs", "fn a() {}")).unwrap();
        w.write(processed("src/b.rs", "fn b() {}")).unwrap();
        w.write_directory_context("/work", ".\n├── src\n");
        w.close().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["path"], "src/a.rs");
        assert_eq!(files[0]["content"], "fn a() {}");
        assert_eq!(value["directoryContext"]["cwd"], "/work");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let temp = TempDir::new().unwrap();
        let (mut w, path) = writer(&temp, OutputFormat::Yaml);
        w.write(processed("a.txt", "alpha")).unwrap();
        w.close().unwrap();

        let value: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["files"][0]["path"], "a.txt");
        assert_eq!(value["files"][0]["content"], "alpha");
    }

    #[test]
    fn test_xml_output_shape() {
        let temp = TempDir::new().unwrap();
        let (mut w, path) = writer(&temp, OutputFormat::Xml);
        let mut content = processed("a<b>.txt", "body ]]> with terminator");
        content.chunks.push(Chunk {
            content: b"body\n".to_vec(),
            start_line: 1,
            end_line: 1,
            token_count: 1,
        });
        w.write(content).unwrap();
        w.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<path>a&lt;b&gt;.txt</path>"));
        assert!(text.contains("<chunk tokenCount=\"1\">"));
        // The CDATA terminator inside content must have been split.
        assert!(!text.contains("body ]]> with"));
        assert!(text.ends_with("</files>\n"));
    }

    #[test]
    fn test_restaging_replaces_payload() {
        let temp = TempDir::new().unwrap();
        let (mut w, path) = writer(&temp, OutputFormat::Json);
        w.write(processed("a.txt", "old")).unwrap();
        w.write(processed("a.txt", "new")).unwrap();
        assert_eq!(w.staged(), 1);
        w.close().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["files"][0]["content"], "new");
    }
}
