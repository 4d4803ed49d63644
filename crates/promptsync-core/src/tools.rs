//! Tool-call surface.
//!
//! [`PromptTools`] owns the name cache and the sync workflows and exposes
//! them as named tools taking JSON arguments. Every call produces exactly
//! one [`ToolResult`]; failures are reported through `is_error`, never by
//! panicking or returning `Err` across the boundary.

use std::path::PathBuf;
use std::sync::Arc;

use prompt_store::{PromptStore, Target};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::domain::{DesiredPrompt, Result, SyncError};
use crate::name_cache::NameCache;
use crate::sync::{AppendReport, PullReport, PushReport, ReplaceReport, SyncOperations};

/// Characters of content shown in a `replace_prompt` preview.
const PREVIEW_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// One text block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Structured success-or-error payload returned by every tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    fn text_block(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text,
            }],
            is_error,
        }
    }

    /// `## {title}` followed by a markdown body.
    pub fn success(title: &str, body: &str) -> Self {
        Self::text_block(format!("## {}\n\n{}", title, body), false)
    }

    /// Store errors render their own markdown; everything else is a plain
    /// `## Error` block.
    pub fn error(err: &SyncError) -> Self {
        let text = match err {
            SyncError::Store(store_err) => store_err.to_markdown(),
            other => format!("## Error\n\n{}", other),
        };
        Self::text_block(text, true)
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Static metadata for one registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: String,
    pub input_schema: Value,
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GetPromptArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RunPromptArgs {
    name: String,
    #[serde(default)]
    parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct PushPromptsArgs {
    prompts: Vec<DesiredPrompt>,
}

#[derive(Debug, Deserialize)]
struct AppendPromptsArgs {
    prompts: Vec<DesiredPrompt>,
    #[serde(default)]
    overwrite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullPromptsArgs {
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ReplacePromptArgs {
    name: String,
    content: String,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| SyncError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn bullet_list(names: &[String], indent: &str) -> String {
    names
        .iter()
        .map(|n| format!("{}- `{}`", indent, n))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// PromptTools
// ---------------------------------------------------------------------------

/// Registers and serves the prompt-management tools for one store.
pub struct PromptTools {
    store: Arc<dyn PromptStore>,
    cache: Arc<NameCache>,
    ops: SyncOperations,
}

impl PromptTools {
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        let cache = Arc::new(NameCache::new(store.clone()));
        Self::with_cache(store, cache)
    }

    pub fn with_cache(store: Arc<dyn PromptStore>, cache: Arc<NameCache>) -> Self {
        let ops = SyncOperations::new(store.clone(), cache.clone());
        Self { store, cache, ops }
    }

    pub fn cache(&self) -> &Arc<NameCache> {
        &self.cache
    }

    pub fn operations(&self) -> &SyncOperations {
        &self.ops
    }

    /// Eagerly populate the name cache and return the tool descriptors.
    pub async fn register(&self) -> Vec<ToolDescriptor> {
        info!("Registering prompt tools...");
        self.cache.refresh().await;
        let tools = self.descriptors().await;
        info!("Registered {} prompt tools", tools.len());
        tools
    }

    /// Tool descriptors; `replace_prompt` lists the cached names.
    pub async fn descriptors(&self) -> Vec<ToolDescriptor> {
        let names = self.cache.read().await;
        let replace_description = if names.is_empty() {
            "Replace a single prompt in LIVE.".to_string()
        } else {
            format!(
                "Replace a single prompt in LIVE.\n\n**Available prompts:** {}",
                names
                    .iter()
                    .map(|n| format!("`{}`", n))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        let prompts_schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Prompt name (without .promptl extension)"},
                    "content": {"type": "string", "description": "Full prompt content"}
                },
                "required": ["name", "content"]
            }
        });

        vec![
            ToolDescriptor {
                name: "list_prompts",
                title: "List Prompts",
                description: "List all prompt names in LIVE version".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            },
            ToolDescriptor {
                name: "get_prompt",
                title: "Get Prompt",
                description: "Get full prompt content by name".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {"name": {"type": "string", "description": "Prompt name/path to retrieve"}},
                    "required": ["name"]
                }),
            },
            ToolDescriptor {
                name: "run_prompt",
                title: "Run Prompt",
                description: "Execute a prompt with parameters".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Prompt name/path to execute"},
                        "parameters": {"type": "object", "description": "Parameters to pass to the prompt"}
                    },
                    "required": ["name"]
                }),
            },
            ToolDescriptor {
                name: "push_prompts",
                title: "Push Prompts",
                description: "Replace ALL prompts in LIVE with the given prompts. Creates a version and publishes it in one step.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {"prompts": prompts_schema},
                    "required": ["prompts"]
                }),
            },
            ToolDescriptor {
                name: "append_prompts",
                title: "Append Prompts",
                description: "Add prompts to LIVE without removing existing ones. Use overwrite=true to replace prompts with same name.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "prompts": prompts_schema,
                        "overwrite": {"type": "boolean", "default": false, "description": "If true, overwrite existing prompts with same name"}
                    },
                    "required": ["prompts"]
                }),
            },
            ToolDescriptor {
                name: "pull_prompts",
                title: "Pull Prompts",
                description: "Download all prompts from LIVE to local ./prompts/*.promptl files".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {"outputDir": {"type": "string", "description": "Output directory (default: ./prompts)"}}
                }),
            },
            ToolDescriptor {
                name: "replace_prompt",
                title: "Replace Prompt",
                description: replace_description,
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Prompt name to replace"},
                        "content": {"type": "string", "description": "New prompt content"}
                    },
                    "required": ["name", "content"]
                }),
            },
        ]
    }

    /// Dispatch one tool call. Always returns a result payload.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult {
        debug!(tool = %name, "tool call");
        let outcome = match name {
            "list_prompts" => self.list_prompts().await,
            "get_prompt" => match parse_args::<GetPromptArgs>(name, arguments) {
                Ok(args) => self.get_prompt(&args.name).await,
                Err(e) => Err(e),
            },
            "run_prompt" => match parse_args::<RunPromptArgs>(name, arguments) {
                Ok(args) => self.run_prompt(&args.name, args.parameters).await,
                Err(e) => Err(e),
            },
            "push_prompts" => match parse_args::<PushPromptsArgs>(name, arguments) {
                Ok(args) => self.ops.push(&args.prompts).await.map(format_push),
                Err(e) => Err(e),
            },
            "append_prompts" => match parse_args::<AppendPromptsArgs>(name, arguments) {
                Ok(args) => self
                    .ops
                    .append(&args.prompts, args.overwrite)
                    .await
                    .map(format_append),
                Err(e) => Err(e),
            },
            "pull_prompts" => match parse_args::<PullPromptsArgs>(name, arguments) {
                Ok(args) => self
                    .ops
                    .pull(args.output_dir.as_deref())
                    .await
                    .map(format_pull),
                Err(e) => Err(e),
            },
            "replace_prompt" => match parse_args::<ReplacePromptArgs>(name, arguments) {
                Ok(args) => self
                    .ops
                    .replace_single(&args.name, &args.content)
                    .await
                    .map(|report| format_replace(&report, &args.content)),
                Err(e) => Err(e),
            },
            other => Err(SyncError::UnknownTool(other.to_string())),
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(tool = %name, error = %e, "tool call failed");
            ToolResult::error(&e)
        })
    }

    async fn list_prompts(&self) -> Result<ToolResult> {
        let docs = self.store.list_documents(&Target::Live).await?;
        let names: Vec<String> = docs.into_iter().map(|d| d.path).collect();
        self.cache.record(names.clone());

        if names.is_empty() {
            return Ok(ToolResult::success(
                "No Prompts Found",
                "The project has no prompts yet.",
            ));
        }

        Ok(ToolResult::success(
            &format!("Found {} Prompt(s)", names.len()),
            &format!(
                "**Project ID:** `{}`\n\n{}",
                self.store.project_id(),
                bullet_list(&names, "")
            ),
        ))
    }

    async fn get_prompt(&self, name: &str) -> Result<ToolResult> {
        let doc = self.store.get_document(name, &Target::Live).await?;
        let body = format!(
            "**Name:** `{}`\n\n**Version:** `{}`\n\n### Content\n\n```promptl\n{}\n```",
            doc.path,
            doc.version_uuid.as_deref().unwrap_or("unknown"),
            doc.content
        );
        Ok(ToolResult::success(&format!("Prompt: {}", doc.path), &body))
    }

    async fn run_prompt(
        &self,
        name: &str,
        parameters: Option<Map<String, Value>>,
    ) -> Result<ToolResult> {
        let parameters = parameters.unwrap_or_default();
        let outcome = self
            .store
            .run_document(name, &Value::Object(parameters.clone()))
            .await?;

        let mut body = format!("**Prompt:** `{}`\n\n", name);
        if !parameters.is_empty() {
            let rendered = serde_json::to_string_pretty(&parameters)
                .map_err(prompt_store::StoreError::from)?;
            body.push_str(&format!("**Parameters:**\n```json\n{}\n```\n\n", rendered));
        }

        let text = outcome.response.as_ref().and_then(|r| r.text.clone());
        let response = match text {
            Some(text) => text,
            None => serde_json::to_string_pretty(&outcome).map_err(prompt_store::StoreError::from)?,
        };
        body.push_str(&format!("### Response\n\n{}", response));

        if let Some(tokens) = outcome
            .response
            .as_ref()
            .and_then(|r| r.usage.as_ref())
            .and_then(|u| u.total_tokens)
        {
            body.push_str(&format!("\n\n**Tokens:** {} total", tokens));
        }
        if let Some(uuid) = &outcome.uuid {
            body.push_str(&format!("\n\n**Conversation ID:** `{}`", uuid));
        }

        Ok(ToolResult::success("Prompt Executed", &body))
    }
}

// ---------------------------------------------------------------------------
// Report formatting
// ---------------------------------------------------------------------------

fn format_push(report: PushReport) -> ToolResult {
    let body = format!(
        "**Deleted:** {} prompt(s)\n**Added:** {} prompt(s)\n**Version:** `{}`\n\n### Deployed Prompts\n\n{}",
        report.deleted.len(),
        report.deployed.len(),
        report.version.uuid,
        bullet_list(&report.deployed, "")
    );
    ToolResult::success("Prompts Pushed to LIVE", &body)
}

fn format_append(report: AppendReport) -> ToolResult {
    let Some(version) = &report.version else {
        return ToolResult::success(
            "No Changes Made",
            &format!(
                "All {} prompt(s) already exist. Use `overwrite: true` to replace.\n\n**Skipped:**\n{}",
                report.skipped.len(),
                bullet_list(&report.skipped, "  ")
            ),
        );
    };

    let mut body = String::new();
    if !report.added.is_empty() {
        body.push_str(&format!(
            "**Added:** {}\n{}\n\n",
            report.added.len(),
            bullet_list(&report.added, "  ")
        ));
    }
    if !report.updated.is_empty() {
        body.push_str(&format!(
            "**Updated:** {}\n{}\n\n",
            report.updated.len(),
            bullet_list(&report.updated, "  ")
        ));
    }
    if !report.skipped.is_empty() {
        body.push_str(&format!(
            "**Skipped:** {} (already exist)\n",
            report.skipped.len()
        ));
    }
    body.push_str(&format!("\n**Version:** `{}`", version.uuid));
    ToolResult::success("Prompts Appended to LIVE", &body)
}

fn format_pull(report: PullReport) -> ToolResult {
    if report.written.is_empty() {
        return ToolResult::success(
            "No Prompts to Pull",
            &format!(
                "The project has no prompts.\n\n**Directory:** `{}`\n**Deleted:** {} existing file(s)",
                report.dir.display(),
                report.deleted_stale
            ),
        );
    }
    let body = format!(
        "**Directory:** `{}`\n**Deleted:** {} existing file(s)\n**Written:** {} file(s)\n\n### Files\n\n{}",
        report.dir.display(),
        report.deleted_stale,
        report.written.len(),
        bullet_list(&report.written, "")
    );
    ToolResult::success("Prompts Pulled from LIVE", &body)
}

fn format_replace(report: &ReplaceReport, content: &str) -> ToolResult {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    let body = format!(
        "**Prompt:** `{}`\n**Action:** {}\n**Version:** `{}`\n\n### Content Preview\n\n```promptl\n{}\n```",
        report.path, report.action, report.version.uuid, preview
    );
    ToolResult::success(&format!("Prompt {}", report.action), &body)
}
