//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::stream::{self, StreamExt};

use miyu::chat::LineReader;
use miyu::{
    Error, FragmentStream, InferenceClient, Message, ModelDescriptor, PullProgress, PullStream,
    Renderer, Result,
};

/// Everything a command asked the renderer to show, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Banner,
    Help(String),
    SessionHeader(String),
    StartStatus(String),
    UpdateStatus(String),
    StopStatus,
    Succeed(String),
    Fail(String),
    Pending,
    StartResponse(bool),
    Text(String),
    FinishResponse,
    Heading(String),
    ModelRow(String, String),
    Error(String),
    Hint(String),
    Farewell,
    Info(String),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<Event>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenation of every printed response fragment.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|event| pred(event)).count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Error(error) | Event::Fail(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn hints(&self) -> usize {
        self.count(|event| matches!(event, Event::Hint(_)))
    }
}

impl Renderer for RecordingRenderer {
    fn print_banner(&mut self) {
        self.events.push(Event::Banner);
    }

    fn print_help(&mut self, help: &str) {
        self.events.push(Event::Help(help.to_string()));
    }

    fn print_session_header(&mut self, model: &str) {
        self.events.push(Event::SessionHeader(model.to_string()));
    }

    fn prompt(&self) -> String {
        "❯ ".to_string()
    }

    fn start_status(&mut self, text: &str) {
        self.events.push(Event::StartStatus(text.to_string()));
    }

    fn update_status(&mut self, text: &str) {
        self.events.push(Event::UpdateStatus(text.to_string()));
    }

    fn stop_status(&mut self) {
        self.events.push(Event::StopStatus);
    }

    fn succeed_status(&mut self, text: &str) {
        self.events.push(Event::Succeed(text.to_string()));
    }

    fn fail_status(&mut self, error: &str) {
        self.events.push(Event::Fail(error.to_string()));
    }

    fn print_pending(&mut self) {
        self.events.push(Event::Pending);
    }

    fn start_response(&mut self, nested: bool) {
        self.events.push(Event::StartResponse(nested));
    }

    fn print_text(&mut self, text: &str) {
        self.events.push(Event::Text(text.to_string()));
    }

    fn finish_response(&mut self) {
        self.events.push(Event::FinishResponse);
    }

    fn print_heading(&mut self, heading: &str) {
        self.events.push(Event::Heading(heading.to_string()));
    }

    fn print_model_row(&mut self, name: &str, size: &str) {
        self.events
            .push(Event::ModelRow(name.to_string(), size.to_string()));
    }

    fn print_error(&mut self, error: &str) {
        self.events.push(Event::Error(error.to_string()));
    }

    fn print_hint(&mut self, hint: &str) {
        self.events.push(Event::Hint(hint.to_string()));
    }

    fn print_farewell(&mut self) {
        self.events.push(Event::Farewell);
    }

    fn print_info(&mut self, info: &str) {
        self.events.push(Event::Info(info.to_string()));
    }
}

/// Feeds canned lines to the chat loop, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: VecDeque<Result<Option<String>>>,
    pub prompts: Vec<String>,
}

impl ScriptedReader {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Ok(Some(l.to_string()))).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn then_fail(mut self, err: Error) -> Self {
        self.lines.push_back(Err(err));
        self
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().unwrap_or(Ok(None))
    }
}

enum ChatReply {
    Stream(Vec<Result<String>>),
    Fail(Error),
}

/// In-memory daemon. Chat replies are consumed in order; once exhausted every
/// turn gets an empty reply.
pub struct MockClient {
    chat_replies: Mutex<VecDeque<ChatReply>>,
    chat_calls: Mutex<Vec<(String, Vec<Message>)>>,
    models: Result<Vec<ModelDescriptor>>,
    list_calls: Mutex<usize>,
    pull_events: Result<Vec<Result<PullProgress>>>,
    pull_calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            chat_replies: Mutex::new(VecDeque::new()),
            chat_calls: Mutex::new(Vec::new()),
            models: Ok(Vec::new()),
            list_calls: Mutex::new(0),
            pull_events: Ok(Vec::new()),
            pull_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, fragments: &[&str]) -> Self {
        let items = fragments.iter().map(|f| Ok(f.to_string())).collect();
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(ChatReply::Stream(items));
        self
    }

    pub fn fail_mid_stream(self, fragments: &[&str], err: Error) -> Self {
        let mut items: Vec<Result<String>> = fragments.iter().map(|f| Ok(f.to_string())).collect();
        items.push(Err(err));
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(ChatReply::Stream(items));
        self
    }

    pub fn fail_chat(self, err: Error) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(ChatReply::Fail(err));
        self
    }

    pub fn with_models(mut self, models: Vec<ModelDescriptor>) -> Self {
        self.models = Ok(models);
        self
    }

    pub fn fail_list(mut self, err: Error) -> Self {
        self.models = Err(err);
        self
    }

    pub fn with_pull_events(mut self, events: Vec<Result<PullProgress>>) -> Self {
        self.pull_events = Ok(events);
        self
    }

    pub fn fail_pull(mut self, err: Error) -> Self {
        self.pull_events = Err(err);
        self
    }

    /// Every chat request as `(model, messages)`.
    pub fn chat_calls(&self) -> Vec<(String, Vec<Message>)> {
        self.chat_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn pull_calls(&self) -> Vec<String> {
        self.pull_calls.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.chat_calls().len() + self.list_calls() + self.pull_calls().len()
    }
}

#[async_trait::async_trait]
impl InferenceClient for MockClient {
    async fn chat(&self, model: &str, messages: &[Message]) -> Result<FragmentStream> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));
        let reply = self
            .chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ChatReply::Stream(Vec::new()));
        match reply {
            ChatReply::Stream(items) => Ok(stream::iter(items).boxed()),
            ChatReply::Fail(err) => Err(err),
        }
    }

    async fn list(&self) -> Result<Vec<ModelDescriptor>> {
        *self.list_calls.lock().unwrap() += 1;
        self.models.clone()
    }

    async fn pull(&self, model: &str) -> Result<PullStream> {
        self.pull_calls.lock().unwrap().push(model.to_string());
        let events = self.pull_events.clone()?;
        Ok(stream::iter(events).boxed())
    }
}

pub fn connection_refused() -> Error {
    Error::connection("could not reach Ollama at http://127.0.0.1:11434/", None)
}
