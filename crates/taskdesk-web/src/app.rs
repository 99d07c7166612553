use std::future::Future;
use std::rc::Rc;

use taskdesk_core::{
  Config,
  ControllerError,
  EditFields,
  NewTask,
  Scope,
  TaskStateController
};
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_memo,
  use_reducer
};

use crate::api::HttpBackend;
use crate::components::{
  AssistantBox,
  AuthPanel,
  EditModal,
  FilterBar,
  NoticeBanner,
  TaskForm,
  TaskList
};
use crate::view::{
  UiState,
  YewView
};

const CONFIG_TOML: &str =
  include_str!("../assets/taskdesk.toml");

type Controller =
  TaskStateController<HttpBackend, YewView>;

/// Runs a controller operation in the
/// background. Failures were already shown
/// as notices.
fn spawn_op<F, Fut, T>(
  controller: &Rc<Controller>,
  op: &'static str,
  run: F
) where
  F: FnOnce(Rc<Controller>) -> Fut,
  Fut: Future<
      Output = Result<T, ControllerError>
    > + 'static
{
  let pending = run(controller.clone());
  wasm_bindgen_futures::spawn_local(
    async move {
      if let Err(error) = pending.await {
        tracing::debug!(op, %error, "operation ended with error");
      }
    }
  );
}

/// Synchronous counterpart of `spawn_op`.
/// The controller has already shown the
/// notice.
fn log_outcome<T>(
  op: &'static str,
  outcome: Result<T, ControllerError>
) -> Option<T> {
  outcome
    .inspect_err(|error| {
      tracing::debug!(op, %error, "operation ended with error");
    })
    .ok()
}

#[function_component(App)]
pub fn app() -> Html {
  let ui = use_reducer(UiState::default);
  let config = use_memo((), |_| {
    Config::from_toml_or_default(
      CONFIG_TOML
    )
  });
  let controller = {
    let dispatcher = ui.dispatcher();
    let config = config.clone();
    use_memo((), move |_| {
      tracing::info!(
        api = %config.api_base_url,
        "creating task controller"
      );
      Controller::new(
        HttpBackend::new((*config).clone()),
        YewView::new(
          dispatcher,
          config.notice_timeout_ms
        )
      )
    })
  };

  let on_login = {
    let controller = controller.clone();
    Callback::from(
      move |(username, password): (
        String,
        String
      )| {
        spawn_op(
          &controller,
          "login",
          |c| async move {
            c.login(&username, &password)
              .await
          }
        );
      }
    )
  };

  let on_register = {
    let controller = controller.clone();
    Callback::from(
      move |(username, password): (
        String,
        String
      )| {
        spawn_op(
          &controller,
          "register",
          |c| async move {
            c.register(&username, &password)
              .await
          }
        );
      }
    )
  };

  let notice = html! {
    <NoticeBanner
      notice={ui.notice.clone()}
    />
  };

  let Some(username) = ui.username.clone()
  else {
    return html! {
      <main class="app signed-out">
        { notice }
        <AuthPanel
          {on_login}
          {on_register}
        />
      </main>
    };
  };

  let on_logout = {
    let controller = controller.clone();
    Callback::from(move |_| {
      controller.logout()
    })
  };

  let on_add_draft_tag = {
    let controller = controller.clone();
    Callback::from(move |tag: String| {
      log_outcome(
        "add_draft_tag",
        controller.add_draft_tag(&tag)
      );
    })
  };

  let on_remove_draft_tag = {
    let controller = controller.clone();
    Callback::from(move |tag: String| {
      controller.remove_draft_tag(&tag);
    })
  };

  let on_create = {
    let controller = controller.clone();
    Callback::from(
      move |new_task: NewTask| {
        spawn_op(
          &controller,
          "create_task",
          |c| async move {
            c.create_task(new_task).await
          }
        );
      }
    )
  };

  let on_apply_filter = {
    let controller = controller.clone();
    Callback::from(
      move |(scope, username): (
        Scope,
        Option<String>
      )| {
        spawn_op(
          &controller,
          "set_filter",
          |c| async move {
            c.set_filter(scope, username)
              .await
          }
        );
      }
    )
  };

  let on_refresh = {
    let controller = controller.clone();
    Callback::from(move |()| {
      spawn_op(
        &controller,
        "refresh",
        |c| async move {
          c.refresh().await
        }
      );
    })
  };

  let on_toggle = {
    let controller = controller.clone();
    Callback::from(
      move |(task_id, desired): (
        u64,
        bool
      )| {
        spawn_op(
          &controller,
          "toggle_completion",
          |c| async move {
            c.toggle_completion(
              task_id, desired
            )
            .await
          }
        );
      }
    )
  };

  let on_edit = {
    let controller = controller.clone();
    Callback::from(move |task_id: u64| {
      match controller.task(task_id) {
        | Some(task) => {
          controller.open_edit(&task)
        }
        | None => {
          tracing::warn!(
            task_id,
            "edit requested for task \
             not in the list"
          );
        }
      }
    })
  };

  let on_delete = {
    let controller = controller.clone();
    Callback::from(move |task_id: u64| {
      spawn_op(
        &controller,
        "delete_task",
        |c| async move {
          c.delete_task(task_id).await
        }
      );
    })
  };

  let on_save_edit = {
    let controller = controller.clone();
    Callback::from(
      move |fields: EditFields| {
        if controller
          .revise_edit(fields)
          .is_err()
        {
          return;
        }
        spawn_op(
          &controller,
          "commit_edit",
          |c| async move {
            c.commit_edit().await
          }
        );
      }
    )
  };

  let on_cancel_edit = {
    let controller = controller.clone();
    Callback::from(move |()| {
      controller.cancel_edit()
    })
  };

  let on_add_edit_tag = {
    let controller = controller.clone();
    Callback::from(move |tag: String| {
      log_outcome(
        "add_edit_tag",
        controller.add_edit_tag(&tag)
      );
    })
  };

  let on_remove_edit_tag = {
    let controller = controller.clone();
    Callback::from(move |tag: String| {
      log_outcome(
        "remove_edit_tag",
        controller.remove_edit_tag(&tag)
      );
    })
  };

  let on_ask = {
    let controller = controller.clone();
    Callback::from(move |prompt: String| {
      spawn_op(
        &controller,
        "ask_assistant",
        |c| async move {
          c.ask_assistant(&prompt).await
        }
      );
    })
  };

  let rows = ui
    .tasks
    .iter()
    .map(|task| {
      (task.clone(), ui.is_checked(task))
    })
    .collect::<Vec<_>>();
  let scope = controller.filter().scope;

  html! {
    <main class="app">
      { notice }
      <header class="topbar">
        <span class="brand">{ "TaskDesk" }</span>
        <span class="user">{ format!("Signed in as {username}") }</span>
        <button onclick={on_logout}>{ "Logout" }</button>
      </header>
      <section class="workspace">
        <TaskForm
          draft_tags={ui.draft_tags.clone()}
          default_priority={config.default_priority}
          on_add_tag={on_add_draft_tag}
          on_remove_tag={on_remove_draft_tag}
          on_submit={on_create}
        />
        <FilterBar
          {scope}
          status={ui.status.clone()}
          on_apply={on_apply_filter}
          {on_refresh}
        />
        <TaskList
          {rows}
          {on_toggle}
          {on_edit}
          {on_delete}
        />
        <AssistantBox
          panel={ui.assistant.clone()}
          {on_ask}
        />
      </section>
      if let Some(task) = ui.editing.clone() {
        <EditModal
          {task}
          on_save={on_save_edit}
          on_cancel={on_cancel_edit}
          on_add_tag={on_add_edit_tag}
          on_remove_tag={on_remove_edit_tag}
        />
      }
    </main>
  }
}
