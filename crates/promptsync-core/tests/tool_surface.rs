//! Tool-call surface tests: argument handling, payload shape, cache wiring.

use std::sync::Arc;
use std::time::Duration;

use prompt_store::fakes::MemoryPromptStore;
use promptsync_core::{NameCache, PromptTools, ToolResult};
use serde_json::json;
use tempfile::tempdir;

fn tools_over(store: &Arc<MemoryPromptStore>) -> PromptTools {
    PromptTools::new(store.clone())
}

fn assert_ok(result: &ToolResult) {
    assert!(!result.is_error, "unexpected error payload: {}", result.text());
}

#[tokio::test]
async fn register_lists_all_tools_and_primes_cache() {
    let store = Arc::new(MemoryPromptStore::with_documents([("intro", "hi"), ("outro", "bye")]));
    let tools = tools_over(&store);

    let descriptors = tools.register().await;

    let names: Vec<&str> = descriptors.iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec![
            "list_prompts",
            "get_prompt",
            "run_prompt",
            "push_prompts",
            "append_prompts",
            "pull_prompts",
            "replace_prompt",
        ]
    );
    assert_eq!(store.list_calls(), 1);

    let replace = descriptors
        .iter()
        .find(|d| d.name == "replace_prompt")
        .unwrap();
    assert!(replace.description.contains("`intro`, `outro`"));
}

#[tokio::test]
async fn register_survives_an_unreachable_store() {
    let store = Arc::new(MemoryPromptStore::new());
    store.fail_lists(2);
    let tools = tools_over(&store);

    let descriptors = tools.register().await;

    assert_eq!(descriptors.len(), 7);
    let replace = descriptors
        .iter()
        .find(|d| d.name == "replace_prompt")
        .unwrap();
    assert!(!replace.description.contains("Available prompts"));
}

#[tokio::test]
async fn list_prompts_records_names_in_cache() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1"), ("b", "2")]));
    let tools = tools_over(&store);

    let result = tools.call("list_prompts", json!({})).await;

    assert_ok(&result);
    let text = result.text();
    assert!(text.starts_with("## Found 2 Prompt(s)"));
    assert!(text.contains("- `a`\n- `b`"));
    assert_eq!(tools.cache().peek(), vec!["a", "b"]);
}

#[tokio::test]
async fn list_prompts_on_empty_project() {
    let store = Arc::new(MemoryPromptStore::new());
    let tools = tools_over(&store);

    let result = tools.call("list_prompts", serde_json::Value::Null).await;

    assert_ok(&result);
    assert!(result.text().starts_with("## No Prompts Found"));
}

#[tokio::test]
async fn get_prompt_returns_content() {
    let store = Arc::new(MemoryPromptStore::with_documents([("intro", "Hello {{ name }}")]));
    let tools = tools_over(&store);

    let result = tools.call("get_prompt", json!({"name": "intro"})).await;

    assert_ok(&result);
    let text = result.text();
    assert!(text.starts_with("## Prompt: intro"));
    assert!(text.contains("```promptl\nHello {{ name }}\n```"));
}

#[tokio::test]
async fn get_prompt_for_missing_name_is_an_error_payload() {
    let store = Arc::new(MemoryPromptStore::new());
    let tools = tools_over(&store);

    let result = tools.call("get_prompt", json!({"name": "ghost"})).await;

    assert!(result.is_error);
    assert!(result.text().starts_with("## Not Found"));
    assert!(result.text().contains("`ghost`"));
}

#[tokio::test]
async fn run_prompt_relays_parameters_and_response() {
    let store = Arc::new(MemoryPromptStore::with_documents([("intro", "model says hi")]));
    let tools = tools_over(&store);

    let result = tools
        .call(
            "run_prompt",
            json!({"name": "intro", "parameters": {"name": "Ada"}}),
        )
        .await;

    assert_ok(&result);
    let text = result.text();
    assert!(text.starts_with("## Prompt Executed"));
    assert!(text.contains("\"name\": \"Ada\""));
    assert!(text.contains("### Response\n\nmodel says hi"));
    assert!(text.contains("**Conversation ID:**"));
    assert_eq!(store.run_calls(), 1);
}

#[tokio::test]
async fn push_prompts_reports_deleted_and_added() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1"), ("b", "2")]));
    let tools = tools_over(&store);

    let result = tools
        .call(
            "push_prompts",
            json!({"prompts": [{"name": "a", "content": "X"}, {"name": "c", "content": "Y"}]}),
        )
        .await;

    assert_ok(&result);
    let text = result.text();
    assert!(text.starts_with("## Prompts Pushed to LIVE"));
    assert!(text.contains("**Deleted:** 1 prompt(s)"));
    assert!(text.contains("**Added:** 2 prompt(s)"));
    assert_eq!(store.live_paths(), vec!["a", "c"]);
}

#[tokio::test]
async fn push_prompts_with_empty_list_is_an_error_payload() {
    let store = Arc::new(MemoryPromptStore::new());
    let tools = tools_over(&store);

    let result = tools.call("push_prompts", json!({"prompts": []})).await;

    assert!(result.is_error);
    assert!(result.text().contains("no prompts provided"));
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn append_prompts_reports_no_changes_when_all_exist() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let tools = tools_over(&store);

    let result = tools
        .call("append_prompts", json!({"prompts": [{"name": "a", "content": "2"}]}))
        .await;

    assert_ok(&result);
    assert!(result.text().starts_with("## No Changes Made"));
    assert_eq!(store.deploy_calls(), 0);
}

#[tokio::test]
async fn append_prompts_with_overwrite_updates() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let tools = tools_over(&store);

    let result = tools
        .call(
            "append_prompts",
            json!({"prompts": [{"name": "a", "content": "2"}, {"name": "b", "content": "3"}], "overwrite": true}),
        )
        .await;

    assert_ok(&result);
    let text = result.text();
    assert!(text.starts_with("## Prompts Appended to LIVE"));
    assert!(text.contains("**Added:** 1"));
    assert!(text.contains("**Updated:** 1"));
    assert_eq!(store.live_content("a").as_deref(), Some("2"));
}

#[tokio::test]
async fn replace_prompt_reports_action() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let tools = tools_over(&store);

    let created = tools
        .call("replace_prompt", json!({"name": "b", "content": "new"}))
        .await;
    let replaced = tools
        .call("replace_prompt", json!({"name": "a", "content": "changed"}))
        .await;

    assert!(created.text().starts_with("## Prompt Created"));
    assert!(replaced.text().starts_with("## Prompt Replaced"));
    assert_eq!(store.live_paths(), vec!["a", "b"]);
}

#[tokio::test]
async fn pull_prompts_uses_camel_case_output_dir() {
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let tools = tools_over(&store);

    let result = tools
        .call("pull_prompts", json!({"outputDir": dir.path()}))
        .await;

    assert_ok(&result);
    assert!(result.text().starts_with("## Prompts Pulled from LIVE"));
    assert!(dir.path().join("a.promptl").is_file());
}

#[tokio::test]
async fn missing_arguments_are_reported_not_panicked() {
    let store = Arc::new(MemoryPromptStore::new());
    let tools = tools_over(&store);

    let result = tools.call("replace_prompt", json!({"name": "a"})).await;

    assert!(result.is_error);
    assert!(result.text().contains("invalid arguments for replace_prompt"));
    assert_eq!(store.deploy_calls(), 0);
}

#[tokio::test]
async fn unknown_tool_is_an_error_payload() {
    let store = Arc::new(MemoryPromptStore::new());
    let tools = tools_over(&store);

    let result = tools.call("delete_everything", json!({})).await;

    assert!(result.is_error);
    assert_eq!(result.text(), "## Error\n\nunknown tool: delete_everything");
}

#[tokio::test]
async fn deploy_through_tools_refreshes_replace_description() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let tools = tools_over(&store);
    tools.register().await;

    tools
        .call("replace_prompt", json!({"name": "fresh", "content": "x"}))
        .await;
    let descriptors = tools.descriptors().await;

    let replace = descriptors
        .iter()
        .find(|d| d.name == "replace_prompt")
        .unwrap();
    assert!(replace.description.contains("`fresh`"));
}

#[tokio::test(start_paused = true)]
async fn descriptors_refresh_stale_cache_once() {
    let store = Arc::new(MemoryPromptStore::with_documents([("a", "1")]));
    let cache = Arc::new(NameCache::with_ttl(store.clone(), Duration::from_secs(10)));
    let tools = PromptTools::with_cache(store.clone(), cache);
    tools.register().await;

    tools.descriptors().await;
    assert_eq!(store.list_calls(), 1);

    tokio::time::advance(Duration::from_secs(11)).await;
    tools.descriptors().await;
    tools.descriptors().await;
    assert_eq!(store.list_calls(), 2);
}
