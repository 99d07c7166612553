//! Browser transport for the task API.

use gloo::net::http::{
  Request,
  RequestBuilder
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskdesk_core::backend::{
  decode_response,
  expect_success
};
use taskdesk_core::{
  BackendClient,
  BackendFailure,
  Config,
  Credential
};
use taskdesk_shared::{
  AnalyzeArgs,
  AnalyzeResponse,
  CompletionArgs,
  Credentials,
  LoginResponse,
  TaskCreate,
  TaskDto,
  TaskIdArg,
  TaskListing,
  TaskUpdate,
  UserTasksArgs,
  endpoints
};

pub struct HttpBackend {
  config: Config
}

impl HttpBackend {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  fn authorize(
    builder: RequestBuilder,
    credential: Option<&Credential>
  ) -> RequestBuilder {
    match credential {
      | Some(credential) => builder
        .header(
          "Authorization",
          &credential.bearer()
        ),
      | None => builder
    }
  }

  async fn post<A>(
    &self,
    path: &str,
    payload: &A,
    credential: Option<&Credential>
  ) -> Result<(u16, String), BackendFailure>
  where
    A: Serialize + ?Sized
  {
    let url = self.config.endpoint(path);
    tracing::debug!(url = %url, "POST");
    let request = Self::authorize(
      Request::post(&url),
      credential
    )
    .json(payload)
    .map_err(|e| {
      BackendFailure::Transport(format!(
        "failed to encode request: {e}"
      ))
    })?;
    Self::finish(request.send().await)
      .await
  }

  async fn get(
    &self,
    path: &str,
    credential: &Credential
  ) -> Result<(u16, String), BackendFailure>
  {
    let url = self.config.endpoint(path);
    tracing::debug!(url = %url, "GET");
    let response = Self::authorize(
      Request::get(&url),
      Some(credential)
    )
    .send()
    .await;
    Self::finish(response).await
  }

  async fn finish(
    response: Result<
      gloo::net::http::Response,
      gloo::net::Error
    >
  ) -> Result<(u16, String), BackendFailure>
  {
    let response = response.map_err(|e| {
      BackendFailure::Transport(format!(
        "network error: {e}"
      ))
    })?;
    let status = response.status();
    let body =
      response.text().await.map_err(|e| {
        BackendFailure::Transport(format!(
          "failed to read response: {e}"
        ))
      })?;
    tracing::debug!(status, bytes = body.len(), "response");
    Ok((status, body))
  }

  async fn post_json<A, R>(
    &self,
    path: &str,
    payload: &A,
    credential: Option<&Credential>
  ) -> Result<R, BackendFailure>
  where
    A: Serialize + ?Sized,
    R: DeserializeOwned
  {
    let (status, body) = self
      .post(path, payload, credential)
      .await?;
    decode_response(status, &body)
  }

  async fn post_unit<A>(
    &self,
    path: &str,
    payload: &A,
    credential: Option<&Credential>
  ) -> Result<(), BackendFailure>
  where
    A: Serialize + ?Sized
  {
    let (status, body) = self
      .post(path, payload, credential)
      .await?;
    expect_success(status, &body)
  }

  async fn get_listing(
    &self,
    path: &str,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>
  {
    let (status, body) =
      self.get(path, credential).await?;
    decode_response::<TaskListing>(
      status, &body
    )
    .map(TaskListing::into_tasks)
  }
}

impl BackendClient for HttpBackend {
  async fn register(
    &self,
    credentials: &Credentials
  ) -> Result<(), BackendFailure> {
    self
      .post_unit(
        endpoints::REGISTER,
        credentials,
        None
      )
      .await
  }

  async fn login(
    &self,
    credentials: &Credentials
  ) -> Result<Credential, BackendFailure>
  {
    let response: LoginResponse = self
      .post_json(
        endpoints::LOGIN,
        credentials,
        None
      )
      .await?;
    Ok(Credential::new(
      response.access_token
    ))
  }

  async fn create_task(
    &self,
    task: &TaskCreate,
    credential: &Credential
  ) -> Result<(), BackendFailure> {
    self
      .post_unit(
        endpoints::TASKS,
        task,
        Some(credential)
      )
      .await
  }

  async fn list_all_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>
  {
    let listing: TaskListing = self
      .post_json(
        endpoints::TASKS_ALL,
        &UserTasksArgs::default(),
        Some(credential)
      )
      .await?;
    Ok(listing.into_tasks())
  }

  async fn list_completed_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>
  {
    self
      .get_listing(
        endpoints::TASKS_COMPLETED,
        credential
      )
      .await
  }

  async fn list_incomplete_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>
  {
    self
      .get_listing(
        endpoints::TASKS_INCOMPLETE,
        credential
      )
      .await
  }

  async fn update_task(
    &self,
    update: &TaskUpdate,
    credential: &Credential
  ) -> Result<(), BackendFailure> {
    self
      .post_unit(
        endpoints::TASKS_UPDATE,
        update,
        Some(credential)
      )
      .await
  }

  async fn delete_task(
    &self,
    task_id: u64,
    credential: &Credential
  ) -> Result<(), BackendFailure> {
    self
      .post_unit(
        endpoints::TASKS_DELETE,
        &TaskIdArg { task_id },
        Some(credential)
      )
      .await
  }

  async fn set_completion(
    &self,
    task_id: u64,
    completed: bool,
    credential: &Credential
  ) -> Result<(), BackendFailure> {
    self
      .post_unit(
        endpoints::TASKS_COMPLETE,
        &CompletionArgs {
          task_id,
          completed
        },
        Some(credential)
      )
      .await
  }

  async fn analyze_tasks(
    &self,
    prompt: &str,
    credential: &Credential
  ) -> Result<String, BackendFailure> {
    let response: AnalyzeResponse = self
      .post_json(
        endpoints::TASKS_ANALYZE,
        &AnalyzeArgs {
          prompt: prompt.to_string()
        },
        Some(credential)
      )
      .await?;
    Ok(response.response)
  }
}
