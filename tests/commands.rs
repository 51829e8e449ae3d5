//! Command dispatch from parsed arguments to rendered output.

mod common;

use common::{Event, MockClient, RecordingRenderer, ScriptedReader, connection_refused};
use miyu::chat::{DAEMON_HINT, parse_args};
use miyu::{Error, Message, ModelDescriptor, Outcome, PullProgress, execute};

async fn invoke(client: &MockClient, args: &[&str]) -> (Outcome, RecordingRenderer) {
    invoke_with_input(client, args, &[]).await
}

async fn invoke_with_input(
    client: &MockClient,
    args: &[&str],
    lines: &[&str],
) -> (Outcome, RecordingRenderer) {
    let invocation = parse_args(args).unwrap();
    let mut renderer = RecordingRenderer::new();
    let mut reader = ScriptedReader::new(lines);
    let outcome = execute(invocation, client, &mut renderer, &mut reader).await;
    (outcome, renderer)
}

#[tokio::test]
async fn ask_streams_reply() {
    let client = MockClient::new().reply(&["Rayleigh", " scattering."]);
    let (outcome, renderer) = invoke(&client, &["ask", "why", "is", "the", "sky", "blue"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        client.chat_calls(),
        vec![(
            "llama3.1:8b".to_string(),
            vec![Message::user("why is the sky blue")]
        )]
    );
    assert_eq!(
        renderer.events,
        vec![
            Event::StartStatus("Thinking...".to_string()),
            Event::StartResponse(false),
            Event::Text("Rayleigh".to_string()),
            Event::Text(" scattering.".to_string()),
            Event::FinishResponse,
        ]
    );
}

#[tokio::test]
async fn ask_with_model_and_system() {
    let client = MockClient::new().reply(&["Bonjour"]);
    let (outcome, _) = invoke(
        &client,
        &["ask", "-m", "phi3", "-s", "Answer in French", "hi"],
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    let calls = client.chat_calls();
    assert_eq!(calls[0].0, "phi3");
    assert_eq!(
        calls[0].1,
        vec![Message::system("Answer in French"), Message::user("hi")]
    );
}

#[tokio::test]
async fn ask_unreachable_daemon_fails() {
    let client = MockClient::new().fail_chat(connection_refused());
    let (outcome, renderer) = invoke(&client, &["ask", "hello"]).await;

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(outcome.exit_code(), 1);
    assert!(renderer.errors()[0].starts_with("Connection error:"));
    assert!(renderer.contains(&Event::Hint(DAEMON_HINT.to_string())));
    assert!(!renderer.contains(&Event::StartResponse(false)));
}

#[tokio::test]
async fn ask_unknown_model_fails_without_hint() {
    let client = MockClient::new().fail_chat(Error::not_found("model 'ghost' not found"));
    let (outcome, renderer) = invoke(&client, &["ask", "-m", "ghost", "hello"]).await;

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(renderer.errors(), vec!["Not found: model 'ghost' not found".to_string()]);
    assert_eq!(renderer.hints(), 0);
}

#[tokio::test]
async fn ask_mid_stream_failure_fails() {
    let client = MockClient::new().fail_mid_stream(&["partial"], Error::streaming("eof", None));
    let (outcome, renderer) = invoke(&client, &["ask", "hello"]).await;

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(renderer.text(), "partial");
    assert_eq!(renderer.errors(), vec!["Streaming error: eof".to_string()]);
}

#[tokio::test]
async fn quick_prompt_behaves_like_ask() {
    let client = MockClient::new().reply(&["42"]);
    let (outcome, renderer) =
        invoke(&client, &["meaning", "of", "life", "-s", "Be terse", "-m", "qwen2.5"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(renderer.text(), "42");
    assert_eq!(
        client.chat_calls(),
        vec![(
            "qwen2.5".to_string(),
            vec![Message::system("Be terse"), Message::user("meaning of life")]
        )]
    );
}

#[tokio::test]
async fn no_arguments_prints_banner_and_help() {
    let client = MockClient::new();
    let (outcome, renderer) = invoke(&client, &[]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(client.network_calls(), 0);
    assert_eq!(renderer.events[0], Event::Banner);
    assert!(matches!(&renderer.events[1], Event::Help(help) if help.contains("Usage: miyu")));
}

#[tokio::test]
async fn help_and_version() {
    let client = MockClient::new();
    let (outcome, renderer) = invoke(&client, &["--help"]).await;
    assert_eq!(outcome, Outcome::Success);
    assert!(matches!(&renderer.events[..], [Event::Help(_)]));

    let (outcome, renderer) = invoke(&client, &["-V"]).await;
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(
        renderer.events,
        vec![Event::Info(format!("miyu {}", env!("CARGO_PKG_VERSION")))]
    );
    assert_eq!(client.network_calls(), 0);
}

#[tokio::test]
async fn chat_shows_header_then_loops() {
    let client = MockClient::new().reply(&["hey"]);
    let (outcome, renderer) =
        invoke_with_input(&client, &["chat", "-m", "gemma2:2b"], &["hello", "exit"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(renderer.events[0], Event::Banner);
    assert_eq!(renderer.events[1], Event::SessionHeader("gemma2:2b".to_string()));
    assert_eq!(renderer.text(), "hey");
    assert_eq!(renderer.events.last(), Some(&Event::Farewell));
}

#[tokio::test]
async fn chat_failures_still_exit_zero() {
    let client = MockClient::new().fail_chat(connection_refused());
    let (outcome, renderer) = invoke_with_input(&client, &["chat"], &["hello"]).await;
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(renderer.hints(), 1);
}

#[tokio::test]
async fn models_lists_names_and_sizes() {
    let client = MockClient::new().with_models(vec![
        ModelDescriptor::new("llama3.1:8b", 4_920_753_328),
        ModelDescriptor::new("llama3.2:1b", 1_321_098_329),
    ]);
    let (outcome, renderer) = invoke(&client, &["models"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(client.list_calls(), 1);
    assert_eq!(
        renderer.events,
        vec![
            Event::StartStatus("Loading models...".to_string()),
            Event::StopStatus,
            Event::Heading("Available Models".to_string()),
            Event::ModelRow("llama3.1:8b".to_string(), "4.9 GB".to_string()),
            Event::ModelRow("llama3.2:1b".to_string(), "1.3 GB".to_string()),
        ]
    );
}

#[tokio::test]
async fn models_empty_list() {
    let client = MockClient::new();
    let (outcome, renderer) = invoke(&client, &["models"]).await;
    assert_eq!(outcome, Outcome::Success);
    assert!(renderer.contains(&Event::Info("  No models installed".to_string())));
    assert_eq!(renderer.count(|e| matches!(e, Event::ModelRow(..))), 0);
}

#[tokio::test]
async fn models_failure_always_hints() {
    let client = MockClient::new().fail_list(Error::internal_server("boom"));
    let (outcome, renderer) = invoke(&client, &["models"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(renderer.errors(), vec!["Internal server error: boom".to_string()]);
    assert!(renderer.contains(&Event::Hint(DAEMON_HINT.to_string())));
}

#[tokio::test]
async fn pull_reports_progress() {
    let client = MockClient::new().with_pull_events(vec![
        Ok(PullProgress::status("pulling manifest")),
        Ok(PullProgress::with_progress("downloading", 1, 4)),
        Ok(PullProgress::with_progress("downloading", 1, 0)),
        Ok(PullProgress::status("")),
        Ok(PullProgress::status("success")),
    ]);
    let (outcome, renderer) = invoke(&client, &["pull", "llama3.2:1b"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(client.pull_calls(), vec!["llama3.2:1b".to_string()]);
    assert_eq!(
        renderer.events,
        vec![
            Event::StartStatus("Pulling llama3.2:1b...".to_string()),
            Event::UpdateStatus("pulling manifest".to_string()),
            Event::UpdateStatus("downloading 25%".to_string()),
            Event::UpdateStatus("downloading".to_string()),
            Event::UpdateStatus("success".to_string()),
            Event::Succeed("llama3.2:1b ready!".to_string()),
        ]
    );
}

#[tokio::test]
async fn pull_failure_is_reported() {
    let client = MockClient::new()
        .fail_pull(Error::not_found("pull model manifest: file does not exist"));
    let (outcome, renderer) = invoke(&client, &["pull", "nonexistent"]).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(renderer.errors().len(), 1);
    assert_eq!(renderer.count(|e| matches!(e, Event::Succeed(_))), 0);
    assert_eq!(renderer.hints(), 0);
}

#[tokio::test]
async fn pull_stream_error_stops_progress() {
    let client = MockClient::new().with_pull_events(vec![
        Ok(PullProgress::status("pulling manifest")),
        Err(Error::streaming("max retries exceeded", None)),
        Ok(PullProgress::status("success")),
    ]);
    let (_, renderer) = invoke(&client, &["pull", "llama3.2:1b"]).await;

    assert_eq!(
        renderer.events.last(),
        Some(&Event::Fail("Streaming error: max retries exceeded".to_string()))
    );
    assert!(!renderer.contains(&Event::UpdateStatus("success".to_string())));
}

#[test]
fn usage_errors_never_reach_the_daemon() {
    for args in [
        &["ask"][..],
        &["pull"][..],
        &["pull", "a", "b"][..],
        &["chat", "--model"][..],
        &["--bogus"][..],
    ] {
        let err = parse_args(args).unwrap_err();
        assert!(err.is_validation(), "{args:?}: {err}");
    }
}
