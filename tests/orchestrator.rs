//! End-to-end orchestration tests against a scripted completion client.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rangegen::{
    CompletionClient, CompletionError, GenerateError, Mode, PromptContext, RequestOrchestrator,
    StructuredResult,
};

/// Scripted completion client: each call is answered by the first script
/// entry whose needle appears in the user message.
struct ScriptedClient {
    script: Mutex<Vec<(String, Result<String, String>)>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn reply(self, needle: &str, body: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push((needle.to_string(), Ok(body.to_string())));
        self
    }

    fn fail(self, needle: &str, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push((needle.to_string(), Err(message.to_string())));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for &ScriptedClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        for (needle, reply) in script.iter() {
            if user.contains(needle.as_str()) {
                return match reply {
                    Ok(text) => Ok(text.clone()),
                    Err(message) => Err(CompletionError::Api {
                        status: 500,
                        message: message.clone(),
                    }),
                };
            }
        }
        panic!("unscripted completion call: {user}");
    }
}

fn role_bundle(task_content: &str) -> String {
    format!(
        "```json\n{{\"files\": {{\"tasks/main.yml\": \"{task_content}\"}}, \"description\": \"d\"}}\n```"
    )
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_any_call() {
    let client = ScriptedClient::new();
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("   \n  ", Mode::Standard);
    let result = orchestrator.handle(&context).await;

    assert!(matches!(result, Err(GenerateError::EmptyPrompt)));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn completion_failure_propagates_without_retry() {
    let client = ScriptedClient::new().fail("broken lab", "model overloaded");
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("broken lab", Mode::Standard);
    let result = orchestrator.handle(&context).await;

    match result {
        Err(GenerateError::Completion(err)) => {
            assert!(err.to_string().contains("model overloaded"));
        }
        other => panic!("expected completion error, got {other:?}"),
    }
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn clarification_short_circuits_synthesis() {
    // Even with customRoles present, a clarification must end the turn
    // after a single completion call.
    let client = ScriptedClient::new().reply(
        "vague lab",
        r#"{
            "needsClarification": true,
            "message": "Please provide more information about: operating systems.",
            "customRoles": [{"name": "x", "description": "y"}]
        }"#,
    );
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("vague lab", Mode::Standard);
    let result = orchestrator.handle(&context).await.unwrap();

    assert_eq!(
        result,
        StructuredResult::ClarificationNeeded {
            message: "Please provide more information about: operating systems.".to_string()
        }
    );
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn synthesized_files_merge_after_primary_in_request_order() {
    // Primary result carries files [A, B]; the first capability yields one
    // file and the second yields two. Merged output must be [A, B, C, D, E]
    // with synthesized files in request order regardless of completion order.
    // Role needles go first: the synthesis prompt embeds the original
    // environment description, so the primary needle would match it too.
    let client = ScriptedClient::new()
        .reply("sysmon-install", &role_bundle("- name: install sysmon"))
        .reply(
            "log-forwarder",
            "```json\n{\"files\": {\"tasks/main.yml\": \"- name: forward logs\", \"defaults/main.yml\": \"forward_port: 514\"}, \"description\": \"d\"}\n```",
        )
        .reply(
            "an AD lab",
            r##"```json
{
  "needsClarification": false,
  "files": [
    {"name": "ludus-range-config.yml", "content": "ludus: []"},
    {"name": "README.md", "content": "# Lab"}
  ],
  "customRoles": [
    {"name": "Sysmon Install", "description": "installs sysmon"},
    {"name": "Log Forwarder", "description": "forwards logs"}
  ]
}
```"##,
        );
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("an AD lab", Mode::Standard);
    let result = orchestrator.handle(&context).await.unwrap();

    let names: Vec<_> = result.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ludus-range-config.yml",
            "README.md",
            "sysmon-install/tasks/main.yml",
            "log-forwarder/tasks/main.yml",
            "log-forwarder/defaults/main.yml",
        ]
    );
    // One primary call plus one per capability.
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn synthesized_file_colliding_with_primary_name_is_dropped() {
    // The primary result already ships alpha/tasks/main.yml; the synthesis
    // cycle for "alpha" produces the same path, which must not shadow it.
    let client = ScriptedClient::new()
        .reply(
            "role named \"alpha\"",
            "```json\n{\"files\": {\"tasks/main.yml\": \"synthesized tasks\", \"defaults/main.yml\": \"alpha_port: 8080\"}, \"description\": \"d\"}\n```",
        )
        .reply(
            "a collision lab",
            r#"{
  "needsClarification": false,
  "files": [
    {"name": "ludus-range-config.yml", "content": "ludus: []"},
    {"name": "alpha/tasks/main.yml", "content": "hand-written tasks"}
  ],
  "customRoles": [{"name": "alpha", "description": "first"}]
}"#,
        );
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("a collision lab", Mode::Standard);
    let result = orchestrator.handle(&context).await.unwrap();

    let names: Vec<_> = result.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ludus-range-config.yml",
            "alpha/tasks/main.yml",
            "alpha/defaults/main.yml",
        ]
    );
    // The primary file survives, not the colliding synthesized one.
    assert_eq!(result.files()[1].content, "hand-written tasks");
}

#[tokio::test]
async fn failed_capability_is_skipped_not_fatal() {
    let client = ScriptedClient::new()
        .reply("role named \"alpha\"", &role_bundle("alpha tasks"))
        .fail("role named \"beta\"", "synthesis exploded")
        .reply(
            "a SOC lab",
            r#"{
  "needsClarification": false,
  "files": [{"name": "ludus-range-config.yml", "content": "ludus: []"}],
  "customRoles": [
    {"name": "alpha", "description": "first"},
    {"name": "beta", "description": "second"}
  ]
}"#,
        );
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("a SOC lab", Mode::Standard);
    let result = orchestrator.handle(&context).await.unwrap();

    let names: Vec<_> = result.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["ludus-range-config.yml", "alpha/tasks/main.yml"]
    );
}

#[tokio::test]
async fn red_team_mode_with_garbage_reply_degrades_to_defaults() {
    let client = ScriptedClient::new().reply("make it vulnerable", "I refuse to answer in JSON.");
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("make it vulnerable", Mode::RedTeam);
    let result = orchestrator.handle(&context).await.unwrap();

    match result {
        StructuredResult::Suggestions(suggestions) => {
            assert!(suggestions.suggestions.len() >= 7);
            assert_eq!(suggestions.files.len(), 2);
        }
        other => panic!("expected Suggestions, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_analysis_round_trip() {
    let client = ScriptedClient::new().reply(
        "BEGIN UPLOADED FILES",
        r#"```json
{
  "analysis": "The range has no logging pipeline.",
  "suggestions": ["Add a SIEM host", "Deploy Sysmon"],
  "files": [{"name": "ludus-range-config.yml", "content": "ludus: []"}]
}
```"#,
    );
    let orchestrator = RequestOrchestrator::new(&client);

    let context = PromptContext::new("review my range", Mode::Standard)
        .with_attached_content("ludus:\n  - vm_name: dc01");
    let result = orchestrator.handle(&context).await.unwrap();

    match result {
        StructuredResult::Analysis(analysis) => {
            assert_eq!(analysis.analysis, "The range has no logging pipeline.");
            assert_eq!(analysis.suggestions.len(), 2);
            assert_eq!(analysis.files.len(), 1);
        }
        other => panic!("expected Analysis, got {other:?}"),
    }
}
