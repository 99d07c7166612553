use std::time::Duration;

use anyhow::Context;
use reqwest::header::{
  ACCEPT,
  AUTHORIZATION,
  CONTENT_TYPE
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
use tracing::{
  debug,
  trace
};

pub struct ReqwestBackend {
  client: reqwest::Client,
  config: Config
}

impl ReqwestBackend {
  pub fn new(
    config: Config
  ) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(
        config.request_timeout_secs
      ))
      .build()
      .context(
        "failed building HTTP client"
      )?;
    Ok(Self { client, config })
  }

  async fn send(
    &self,
    request: reqwest::RequestBuilder,
    credential: Option<&Credential>
  ) -> Result<(u16, String), BackendFailure>
  {
    let request = match credential {
      | Some(credential) => request.header(
        AUTHORIZATION,
        credential.bearer()
      ),
      | None => request
    }
    .header(ACCEPT, "application/json");

    let response =
      request.send().await.map_err(|e| {
        BackendFailure::Transport(
          describe(&e)
        )
      })?;
    let status = response.status().as_u16();
    let body =
      response.text().await.map_err(|e| {
        BackendFailure::Transport(format!(
          "failed reading response body: \
           {e}"
        ))
      })?;
    trace!(status, body = %body, "response");
    Ok((status, body))
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
    debug!(url = %url, "POST");
    let body = serde_json::to_vec(payload)
      .map_err(|e| {
        BackendFailure::Transport(format!(
          "failed to encode request: {e}"
        ))
      })?;
    let request = self
      .client
      .post(url)
      .header(CONTENT_TYPE, "application/json")
      .body(body);
    self.send(request, credential).await
  }

  async fn get(
    &self,
    path: &str,
    credential: &Credential
  ) -> Result<(u16, String), BackendFailure>
  {
    let url = self.config.endpoint(path);
    debug!(url = %url, "GET");
    self
      .send(
        self.client.get(url),
        Some(credential)
      )
      .await
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

fn describe(error: &reqwest::Error) -> String {
  if error.is_timeout() {
    "request timed out".to_string()
  } else if error.is_connect() {
    format!("could not connect: {error}")
  } else {
    format!("network error: {error}")
  }
}

impl BackendClient for ReqwestBackend {
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
    self
      .post_json::<_, TaskListing>(
        endpoints::TASKS_ALL,
        &UserTasksArgs::default(),
        Some(credential)
      )
      .await
      .map(TaskListing::into_tasks)
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
    self
      .post_json::<_, AnalyzeResponse>(
        endpoints::TASKS_ANALYZE,
        &AnalyzeArgs {
          prompt: prompt.to_string()
        },
        Some(credential)
      )
      .await
      .map(|answer| answer.response)
  }
}
