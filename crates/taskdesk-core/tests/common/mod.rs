#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use taskdesk_core::{
    AssistantPanel, BackendClient, BackendFailure, Credential, Session, Task,
    TaskStateController, ViewRenderer,
};
use taskdesk_shared::{Credentials, TaskCreate, TaskDto, TaskUpdate};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String),
    Login(String),
    Create(TaskCreate),
    ListAll,
    ListCompleted,
    ListIncomplete,
    Update(TaskUpdate),
    Delete(u64),
    SetCompletion(u64, bool),
    Analyze(String),
}

impl Call {
    pub fn is_list(&self) -> bool {
        matches!(self, Call::ListAll | Call::ListCompleted | Call::ListIncomplete)
    }
}

/// In-memory stand-in for the task server.
#[derive(Default)]
pub struct FakeBackend {
    users: RefCell<HashMap<String, String>>,
    issued: RefCell<Vec<(Credential, String)>>,
    tasks: RefCell<Vec<TaskDto>>,
    next_id: Cell<u64>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashMap<&'static str, BackendFailure>>,
    list_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    write_gates: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    pub assistant_answer: RefCell<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.next_id.set(1);
        backend
            .users
            .borrow_mut()
            .insert("ada".to_string(), "lovelace".to_string());
        *backend.assistant_answer.borrow_mut() = "You have one errand left.".to_string();
        backend
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Next call to `op` fails with `failure`.
    pub fn fail_next(&self, op: &'static str, failure: BackendFailure) {
        self.failures.borrow_mut().insert(op, failure);
    }

    /// Next list call waits until the sender fires; dropping the sender fails it.
    pub fn gate_next_list(&self, gate: oneshot::Receiver<()>) {
        self.list_gates.borrow_mut().push_back(gate);
    }

    /// Next `create` or `update` waits until the sender fires.
    pub fn gate_next(&self, op: &'static str, gate: oneshot::Receiver<()>) {
        self.write_gates.borrow_mut().insert(op, gate);
    }

    async fn pass_gate(&self, op: &'static str) -> Result<(), BackendFailure> {
        let gate = self.write_gates.borrow_mut().remove(op);
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| BackendFailure::Transport("connection reset".to_string())),
            None => Ok(()),
        }
    }

    /// Stores a task the way a tag-only backend would return it.
    pub fn seed_raw(&self, title: &str, tags: &[&str], completed: Option<bool>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskDto {
            id,
            title: title.to_string(),
            description: None,
            priority: None,
            priority_id: Some(2),
            tags: tags.iter().map(ToString::to_string).collect(),
            completed,
            created_by: Some("ada".to_string()),
        });
        id
    }

    pub fn stored_tags(&self, task_id: u64) -> Vec<String> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.tags.clone())
            .unwrap_or_default()
    }

    pub fn seed(&self, title: &str, owner: &str, completed: bool) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskDto {
            id,
            title: title.to_string(),
            description: None,
            priority: Some("Medium".to_string()),
            priority_id: None,
            tags: vec![],
            completed: Some(completed),
            created_by: Some(owner.to_string()),
        });
        id
    }

    pub fn rename(&self, task_id: u64, title: &str) {
        if let Some(task) = self.tasks.borrow_mut().iter_mut().find(|t| t.id == task_id) {
            task.title = title.to_string();
        }
    }

    fn record(&self, call: Call) -> Result<(), BackendFailure> {
        let op = match &call {
            Call::Register(_) => "register",
            Call::Login(_) => "login",
            Call::Create(_) => "create",
            Call::ListAll | Call::ListCompleted | Call::ListIncomplete => "list",
            Call::Update(_) => "update",
            Call::Delete(_) => "delete",
            Call::SetCompletion(..) => "complete",
            Call::Analyze(_) => "analyze",
        };
        self.calls.borrow_mut().push(call);
        match self.failures.borrow_mut().remove(op) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn owner(&self, credential: &Credential) -> Result<String, BackendFailure> {
        self.issued
            .borrow()
            .iter()
            .find(|(issued, _)| issued == credential)
            .map(|(_, user)| user.clone())
            .ok_or_else(|| BackendFailure::Unauthorized("Token has expired".to_string()))
    }

    async fn list(
        &self,
        call: Call,
        credential: &Credential,
        keep: impl Fn(&TaskDto) -> bool,
    ) -> Result<Vec<TaskDto>, BackendFailure> {
        self.record(call)?;
        self.owner(credential)?;
        let tasks: Vec<TaskDto> = self.tasks.borrow().iter().filter(|task| keep(*task)).cloned().collect();
        let gate = self.list_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            gate.await
                .map_err(|_| BackendFailure::Transport("connection reset".to_string()))?;
        }
        Ok(tasks)
    }
}

impl BackendClient for FakeBackend {
    async fn register(&self, credentials: &Credentials) -> Result<(), BackendFailure> {
        self.record(Call::Register(credentials.username.clone()))?;
        let mut users = self.users.borrow_mut();
        if users.contains_key(&credentials.username) {
            return Err(BackendFailure::Server {
                status: 400,
                message: "Username already taken".to_string(),
            });
        }
        users.insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<Credential, BackendFailure> {
        self.record(Call::Login(credentials.username.clone()))?;
        let known = self.users.borrow().get(&credentials.username).cloned();
        if known.as_deref() != Some(credentials.password.as_str()) {
            return Err(BackendFailure::Unauthorized("Invalid credentials".to_string()));
        }
        let credential = Credential::new(format!(
            "token-{}-{}",
            credentials.username,
            self.issued.borrow().len()
        ));
        self.issued
            .borrow_mut()
            .push((credential.clone(), credentials.username.clone()));
        Ok(credential)
    }

    async fn create_task(
        &self,
        task: &TaskCreate,
        credential: &Credential,
    ) -> Result<(), BackendFailure> {
        self.record(Call::Create(task.clone()))?;
        let owner = self.owner(credential)?;
        self.pass_gate("create").await?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskDto {
            id,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            priority: None,
            priority_id: Some(task.priority_id),
            tags: task.tags.clone(),
            completed: Some(false),
            created_by: Some(owner),
        });
        Ok(())
    }

    async fn list_all_tasks(&self, credential: &Credential) -> Result<Vec<TaskDto>, BackendFailure> {
        self.list(Call::ListAll, credential, |_| true).await
    }

    async fn list_completed_tasks(
        &self,
        credential: &Credential,
    ) -> Result<Vec<TaskDto>, BackendFailure> {
        self.list(Call::ListCompleted, credential, |t| t.completed == Some(true))
            .await
    }

    async fn list_incomplete_tasks(
        &self,
        credential: &Credential,
    ) -> Result<Vec<TaskDto>, BackendFailure> {
        self.list(Call::ListIncomplete, credential, |t| t.completed != Some(true))
            .await
    }

    async fn update_task(
        &self,
        update: &TaskUpdate,
        credential: &Credential,
    ) -> Result<(), BackendFailure> {
        self.record(Call::Update(update.clone()))?;
        self.owner(credential)?;
        self.pass_gate("update").await?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == update.task_id)
            .ok_or_else(|| BackendFailure::Server {
                status: 404,
                message: "Task not found".to_string(),
            })?;
        task.title = update.title.clone();
        task.description = Some(update.description.clone());
        task.priority_id = Some(update.priority_id);
        task.tags = update.tags.clone();
        Ok(())
    }

    async fn delete_task(&self, task_id: u64, credential: &Credential) -> Result<(), BackendFailure> {
        self.record(Call::Delete(task_id))?;
        self.owner(credential)?;
        self.tasks.borrow_mut().retain(|t| t.id != task_id);
        Ok(())
    }

    async fn set_completion(
        &self,
        task_id: u64,
        completed: bool,
        credential: &Credential,
    ) -> Result<(), BackendFailure> {
        self.record(Call::SetCompletion(task_id, completed))?;
        self.owner(credential)?;
        if let Some(task) = self.tasks.borrow_mut().iter_mut().find(|t| t.id == task_id) {
            task.completed = Some(completed);
        }
        Ok(())
    }

    async fn analyze_tasks(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<String, BackendFailure> {
        self.record(Call::Analyze(prompt.to_string()))?;
        self.owner(credential)?;
        Ok(self.assistant_answer.borrow().clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Notice { message: String, is_error: bool },
    Authenticated(String),
    Unauthenticated,
    TaskList(Vec<Task>),
    StatusLine(String),
    DraftTags(Vec<String>),
    EditForm(Task),
    EditClosed,
    Checkbox(u64, bool),
    Assistant(AssistantPanel),
    Confirm(String),
}

/// Renderer that records every instruction.
pub struct RecordingView {
    events: RefCell<Vec<ViewEvent>>,
    pub confirm_answer: Cell<bool>,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            events: RefCell::new(vec![]),
            confirm_answer: Cell::new(true),
        }
    }
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn task_lists(&self) -> Vec<Vec<Task>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::TaskList(tasks) => Some(tasks),
                _ => None,
            })
            .collect()
    }

    pub fn error_notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Notice {
                    message,
                    is_error: true,
                } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn last_checkbox(&self, task_id: u64) -> Option<bool> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Checkbox(id, checked) if id == task_id => Some(checked),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ViewRenderer for RecordingView {
    fn show_notice(&self, message: &str, is_error: bool) {
        self.push(ViewEvent::Notice {
            message: message.to_string(),
            is_error,
        });
    }

    fn show_authenticated_view(&self, session: &Session) {
        self.push(ViewEvent::Authenticated(session.username().to_string()));
    }

    fn show_unauthenticated_view(&self) {
        self.push(ViewEvent::Unauthenticated);
    }

    fn render_task_list(&self, tasks: &[Task]) {
        self.push(ViewEvent::TaskList(tasks.to_vec()));
    }

    fn render_status_line(&self, message: &str) {
        self.push(ViewEvent::StatusLine(message.to_string()));
    }

    fn render_draft_tags(&self, tags: &[String]) {
        self.push(ViewEvent::DraftTags(tags.to_vec()));
    }

    fn open_edit_form(&self, task: &Task) {
        self.push(ViewEvent::EditForm(task.clone()));
    }

    fn close_edit_form(&self) {
        self.push(ViewEvent::EditClosed);
    }

    fn set_checkbox_state(&self, task_id: u64, checked: bool) {
        self.push(ViewEvent::Checkbox(task_id, checked));
    }

    fn render_assistant(&self, panel: AssistantPanel) {
        self.push(ViewEvent::Assistant(panel));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.get()
    }
}

pub type Controller = TaskStateController<FakeBackend, RecordingView>;

pub fn controller() -> Controller {
    TaskStateController::new(FakeBackend::new(), RecordingView::default())
}

/// Logged in as `ada` with call and event logs cleared.
pub async fn logged_in() -> Controller {
    let controller = controller();
    controller
        .login("ada", "lovelace")
        .await
        .expect("login should succeed");
    controller.backend().clear_calls();
    controller.view().clear();
    controller
}
