//! Prompt assembly for test generation.
//!
//! A request becomes exactly two messages: fixed system instructions, then a
//! user message carrying the prompt, target paths, attached file content and
//! either example tests or the project manifest.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::AgentError;
use crate::workspace::{display_path, ExampleTestSet, Manifest};

/// Target file assumed when the request does not name one.
pub const DEFAULT_TARGET_PATH: &str = "src/generatedFunction.ts";

const SYSTEM_INSTRUCTIONS: &str = "\
You are an AI assistant that given a user prompt, returns a markdown for a unit test.
1. Think step by step before emitting any code. Think about the shape of the input and output, the behavior and special situations that are relevant to the algorithm.

2. After planning, return a single code block with the test code.
  - Start with the most basic test case and progress to more complex ones.
  - Start with the happy path, then edge cases.
  - Then inputs that are invalid, and likely to break the algorithm.
  - Keep the individual tests small and focused.
  - Focus on behavior, not implementation.

  Stop emitting after the code block.";

const CLOSING_INSTRUCTION: &str = "Only output the test code. No other words, just the code.";

/// Chat role of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message sent to the completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A user's request to generate a test.
#[derive(Debug, Clone, Default)]
pub struct AgentRequest {
    /// Description of the function to test. Must be present to generate.
    pub prompt: Option<String>,
    /// Content of attached files, empty when nothing is attached.
    pub file_content: String,
    /// Location of the file the generated code belongs to.
    pub file_location: Option<PathBuf>,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, content: impl Into<String>, location: Option<PathBuf>) -> Self {
        self.file_content = content.into();
        self.file_location = location;
        self
    }

    /// Check the request and resolve its target paths.
    pub fn validate(&self) -> Result<GenerationTask<'_>, AgentError> {
        let prompt = self.prompt.as_deref().ok_or_else(AgentError::invalid_prompt)?;
        let target_path = self
            .file_location
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_PATH));
        let test_path = test_file_path(&target_path);

        Ok(GenerationTask {
            prompt,
            file_content: &self.file_content,
            target_path,
            test_path,
        })
    }
}

/// A validated request, ready to be turned into a prompt.
#[derive(Debug, Clone)]
pub struct GenerationTask<'a> {
    pub prompt: &'a str,
    pub file_content: &'a str,
    pub target_path: PathBuf,
    pub test_path: PathBuf,
}

/// Derive the test file for a source file by inserting `.test` before its extension.
pub fn test_file_path(path: &Path) -> PathBuf {
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => path.with_file_name(format!(
            "{}.test.{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        )),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".test");
            PathBuf::from(name)
        }
    }
}

/// Tag name used to delimit a manifest, e.g. `package-json`.
fn manifest_tag(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

fn manifest_hint(file_name: &str) -> &'static str {
    if file_name == "package.json" {
        "if any, otherwise vitest is a good option"
    } else {
        "if any, otherwise use the standard testing convention of the language"
    }
}

fn user_message(
    task: &GenerationTask<'_>,
    examples: &ExampleTestSet,
    manifest: Option<&Manifest>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Please prepare a unit test file (can be multiple tests) for the following prompt:"
    );
    let _ = writeln!(out, "<prompt>\n{}\n</prompt>\n", task.prompt);
    let _ = writeln!(
        out,
        "The test will be located at `{}` and the code to test will be located at `{}`.\n",
        display_path(&task.test_path),
        display_path(&task.target_path)
    );

    if !task.file_content.is_empty() {
        let _ = writeln!(
            out,
            "Here's the existing content of the file where we want to generate the code:"
        );
        let _ = writeln!(out, "<file-content>\n{}\n</file-content>", task.file_content);
        let _ = writeln!(
            out,
            "Please consider this existing content when generating the test. \
             Ensure that the new test is compatible with and complements the existing code.\n"
        );
    }

    if !examples.is_empty() {
        let _ = writeln!(out, "Here is a copy of a couple example tests in the repo:");
        let _ = writeln!(out, "<tests>");
        for test in examples.iter() {
            let _ = writeln!(
                out,
                "<test path=\"{}\">\n{}\n</test>",
                display_path(&test.path),
                test.content
            );
        }
        let _ = writeln!(out, "</tests>\n");
    } else if let Some(manifest) = manifest {
        let tag = manifest_tag(&manifest.file_name);
        let _ = writeln!(
            out,
            "Here is the {} file to help you know what testing library to use ({}):",
            manifest.file_name,
            manifest_hint(&manifest.file_name)
        );
        let _ = writeln!(out, "<{}>\n{}\n</{}>\n", tag, manifest.content, tag);
    }

    out.push_str(CLOSING_INSTRUCTION);
    out
}

/// Build the ordered message list for a generation task.
///
/// Example tests take priority; the manifest is only used when there are none.
pub fn build_messages(
    task: &GenerationTask<'_>,
    examples: &ExampleTestSet,
    manifest: Option<&Manifest>,
) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_INSTRUCTIONS),
        Message::user(user_message(task, examples, manifest)),
    ]
}
