use taskdesk_core::{AssistantPanel, EditFields, NewTask, Priority, Scope, Task};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::{
    Callback, Html, Properties, TargetCast, classes, function_component, html, use_effect_with,
    use_state,
};

use crate::view::Notice;

fn input_value(e: &web_sys::InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

fn textarea_value(e: &web_sys::InputEvent) -> String {
    let input: HtmlTextAreaElement = e.target_unchecked_into();
    input.value()
}

fn priority_from_select(e: &web_sys::Event) -> Priority {
    let select: HtmlSelectElement = e.target_unchecked_into();
    select.value().parse().unwrap_or_default()
}

fn priority_options(selected: Priority) -> Html {
    Priority::ALL
        .iter()
        .map(|priority| {
            html! {
                <option value={priority.as_str()} selected={*priority == selected}>
                    { priority.to_string() }
                </option>
            }
        })
        .collect()
}

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: Option<Notice>,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    match &props.notice {
        Some(notice) => html! {
            <div class={classes!("notice", notice.is_error.then_some("error"))}>
                { notice.message.clone() }
            </div>
        },
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthPanelProps {
    pub on_login: Callback<(String, String)>,
    pub on_register: Callback<(String, String)>,
}

#[function_component(AuthPanel)]
pub fn auth_panel(props: &AuthPanelProps) -> Html {
    let username = use_state(String::new);
    let password = use_state(String::new);

    let submit = |target: Callback<(String, String)>| {
        let username = username.clone();
        let password = password.clone();
        Callback::from(move |e: web_sys::SubmitEvent| {
            e.prevent_default();
            target.emit(((*username).clone(), (*password).clone()));
        })
    };
    let on_register = {
        let on_register = props.on_register.clone();
        let username = username.clone();
        let password = password.clone();
        Callback::from(move |_| {
            on_register.emit(((*username).clone(), (*password).clone()));
        })
    };

    html! {
        <form class="panel auth" onsubmit={submit(props.on_login.clone())}>
            <div class="header">{ "Sign in" }</div>
            <input
                placeholder="Username"
                value={(*username).clone()}
                oninput={{
                    let username = username.clone();
                    Callback::from(move |e: web_sys::InputEvent| username.set(input_value(&e)))
                }}
            />
            <input
                type="password"
                placeholder="Password"
                value={(*password).clone()}
                oninput={{
                    let password = password.clone();
                    Callback::from(move |e: web_sys::InputEvent| password.set(input_value(&e)))
                }}
            />
            <div class="actions">
                <button type="submit">{ "Login" }</button>
                <button type="button" onclick={on_register}>{ "Register" }</button>
            </div>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct TagChipsProps {
    pub tags: Vec<String>,
    pub on_add: Callback<String>,
    pub on_remove: Callback<String>,
}

/// Tag entry: Enter or the button adds, a chip click removes.
#[function_component(TagChips)]
pub fn tag_chips(props: &TagChipsProps) -> Html {
    let pending = use_state(String::new);

    let add = {
        let pending = pending.clone();
        let on_add = props.on_add.clone();
        Callback::from(move |()| {
            on_add.emit((*pending).clone());
            pending.set(String::new());
        })
    };
    let on_keydown = {
        let add = add.clone();
        Callback::from(move |e: web_sys::KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                add.emit(());
            }
        })
    };

    html! {
        <div class="tags">
            {
                for props.tags.iter().map(|tag| {
                    let on_remove = props.on_remove.clone();
                    let value = tag.clone();
                    html! {
                        <span class="chip" title="Remove tag"
                            onclick={move |_| on_remove.emit(value.clone())}>
                            { tag.clone() }{ " ×" }
                        </span>
                    }
                })
            }
            <input
                placeholder="Add tag"
                value={(*pending).clone()}
                onkeydown={on_keydown}
                oninput={{
                    let pending = pending.clone();
                    Callback::from(move |e: web_sys::InputEvent| pending.set(input_value(&e)))
                }}
            />
            <button type="button" onclick={move |_| add.emit(())}>{ "Add" }</button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
    pub draft_tags: Vec<String>,
    pub default_priority: Priority,
    pub on_add_tag: Callback<String>,
    pub on_remove_tag: Callback<String>,
    pub on_submit: Callback<NewTask>,
}

#[function_component(TaskForm)]
pub fn task_form(props: &TaskFormProps) -> Html {
    let title = use_state(String::new);
    let description = use_state(String::new);
    let priority = use_state(|| props.default_priority);

    let onsubmit = {
        let title = title.clone();
        let description = description.clone();
        let priority = priority.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: web_sys::SubmitEvent| {
            e.prevent_default();
            on_submit.emit(NewTask {
                title: (*title).clone(),
                description: (*description).clone(),
                priority: *priority,
            });
            title.set(String::new());
            description.set(String::new());
        })
    };

    html! {
        <form class="panel create" {onsubmit}>
            <div class="header">{ "New task" }</div>
            <input
                placeholder="Title"
                value={(*title).clone()}
                oninput={{
                    let title = title.clone();
                    Callback::from(move |e: web_sys::InputEvent| title.set(input_value(&e)))
                }}
            />
            <textarea
                placeholder="Description"
                value={(*description).clone()}
                oninput={{
                    let description = description.clone();
                    Callback::from(move |e: web_sys::InputEvent| {
                        description.set(textarea_value(&e))
                    })
                }}
            />
            <select onchange={{
                let priority = priority.clone();
                Callback::from(move |e: web_sys::Event| priority.set(priority_from_select(&e)))
            }}>
                { priority_options(*priority) }
            </select>
            <TagChips
                tags={props.draft_tags.clone()}
                on_add={props.on_add_tag.clone()}
                on_remove={props.on_remove_tag.clone()}
            />
            <button type="submit">{ "Create" }</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
    pub scope: Scope,
    pub status: String,
    pub on_apply: Callback<(Scope, Option<String>)>,
    pub on_refresh: Callback<()>,
}

#[function_component(FilterBar)]
pub fn filter_bar(props: &FilterBarProps) -> Html {
    let username = use_state(String::new);
    let scope = use_state(|| props.scope);

    let apply = {
        let username = username.clone();
        let scope = scope.clone();
        let on_apply = props.on_apply.clone();
        Callback::from(move |_| {
            let name = username.trim().to_string();
            on_apply.emit((*scope, (!name.is_empty()).then_some(name)));
        })
    };
    let on_refresh = props.on_refresh.clone();

    html! {
        <div class="panel filters">
            <select onchange={{
                let scope = scope.clone();
                Callback::from(move |e: web_sys::Event| {
                    let select: HtmlSelectElement = e.target_unchecked_into();
                    scope.set(select.value().parse().unwrap_or_default());
                })
            }}>
                {
                    for [Scope::All, Scope::Completed, Scope::Incomplete].iter().map(|option| html! {
                        <option value={option.as_key()} selected={*option == *scope}>
                            { option.to_string() }
                        </option>
                    })
                }
            </select>
            <input
                placeholder="Created by"
                value={(*username).clone()}
                oninput={{
                    let username = username.clone();
                    Callback::from(move |e: web_sys::InputEvent| username.set(input_value(&e)))
                }}
            />
            <button onclick={apply}>{ "Apply" }</button>
            <button onclick={move |_| on_refresh.emit(())}>{ "Refresh" }</button>
            <div class="status">{ props.status.clone() }</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
    /// Each task with the checkbox value to show.
    pub rows: Vec<(Task, bool)>,
    pub on_toggle: Callback<(u64, bool)>,
    pub on_edit: Callback<u64>,
    pub on_delete: Callback<u64>,
}

#[function_component(TaskList)]
pub fn task_list(props: &TaskListProps) -> Html {
    if props.rows.is_empty() {
        return html! { <div class="panel list empty">{ "No tasks" }</div> };
    }

    html! {
        <ul class="panel list">
            {
                for props.rows.iter().map(|(task, checked)| {
                    let id = task.id;
                    let checked = *checked;
                    let on_toggle = props.on_toggle.clone();
                    let on_edit = props.on_edit.clone();
                    let on_delete = props.on_delete.clone();
                    html! {
                        <li key={id} class={classes!("task", checked.then_some("done"))}>
                            <input
                                type="checkbox"
                                checked={checked}
                                onclick={move |_| on_toggle.emit((id, !checked))}
                            />
                            <div class="body">
                                <div class="title">{ task.title.clone() }</div>
                                if task.has_description() {
                                    <div class="description">{ task.description.clone() }</div>
                                }
                                <div class="meta">
                                    <span class={classes!("priority", task.priority.as_str())}>
                                        { task.priority.to_string() }
                                    </span>
                                    { for task.tags.iter().map(|tag| html! { <span class="chip">{ tag }</span> }) }
                                    if let Some(owner) = &task.created_by {
                                        <span class="owner">{ format!("by {owner}") }</span>
                                    }
                                </div>
                            </div>
                            <button onclick={move |_| on_edit.emit(id)}>{ "Edit" }</button>
                            <button class="danger" onclick={move |_| on_delete.emit(id)}>{ "Delete" }</button>
                        </li>
                    }
                })
            }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct EditModalProps {
    pub task: Task,
    pub on_save: Callback<EditFields>,
    pub on_cancel: Callback<()>,
    pub on_add_tag: Callback<String>,
    pub on_remove_tag: Callback<String>,
}

#[function_component(EditModal)]
pub fn edit_modal(props: &EditModalProps) -> Html {
    let title = use_state(|| props.task.title.clone());
    let description = use_state(|| props.task.description.clone());
    let priority = use_state(|| props.task.priority);

    // Tag changes re-render the same task; only a different task resets the fields.
    {
        let title = title.clone();
        let description = description.clone();
        let priority = priority.clone();
        let task = props.task.clone();
        use_effect_with(props.task.id, move |_| {
            title.set(task.title);
            description.set(task.description);
            priority.set(task.priority);
            || ()
        });
    }

    let onsubmit = {
        let title = title.clone();
        let description = description.clone();
        let priority = priority.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |e: web_sys::SubmitEvent| {
            e.prevent_default();
            on_save.emit(EditFields {
                title: (*title).clone(),
                description: (*description).clone(),
                priority: *priority,
            });
        })
    };
    let on_cancel = props.on_cancel.clone();

    html! {
        <div class="modal-backdrop">
            <form class="modal" {onsubmit}>
                <div class="header">{ "Edit task" }</div>
                <input
                    value={(*title).clone()}
                    oninput={{
                        let title = title.clone();
                        Callback::from(move |e: web_sys::InputEvent| title.set(input_value(&e)))
                    }}
                />
                <textarea
                    value={(*description).clone()}
                    oninput={{
                        let description = description.clone();
                        Callback::from(move |e: web_sys::InputEvent| {
                            description.set(textarea_value(&e))
                        })
                    }}
                />
                <select onchange={{
                    let priority = priority.clone();
                    Callback::from(move |e: web_sys::Event| priority.set(priority_from_select(&e)))
                }}>
                    { priority_options(*priority) }
                </select>
                <TagChips
                    tags={props.task.tags.to_vec()}
                    on_add={props.on_add_tag.clone()}
                    on_remove={props.on_remove_tag.clone()}
                />
                <div class="actions">
                    <button type="submit">{ "Save" }</button>
                    <button type="button" onclick={move |_| on_cancel.emit(())}>{ "Cancel" }</button>
                </div>
            </form>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AssistantBoxProps {
    pub panel: AssistantPanel,
    pub on_ask: Callback<String>,
}

#[function_component(AssistantBox)]
pub fn assistant_box(props: &AssistantBoxProps) -> Html {
    let prompt = use_state(String::new);
    let pending = props.panel == AssistantPanel::Pending;

    let onsubmit = {
        let prompt = prompt.clone();
        let on_ask = props.on_ask.clone();
        Callback::from(move |e: web_sys::SubmitEvent| {
            e.prevent_default();
            on_ask.emit((*prompt).clone());
        })
    };

    let output = match &props.panel {
        AssistantPanel::Idle => html! {},
        AssistantPanel::Pending => {
            html! { <div class="answer pending">{ "Analyzing your tasks..." }</div> }
        }
        AssistantPanel::Answer(answer) => html! { <pre class="answer">{ answer.clone() }</pre> },
        AssistantPanel::Failed(reason) => {
            html! { <div class="answer error">{ reason.clone() }</div> }
        }
    };

    html! {
        <form class="panel assistant" {onsubmit}>
            <div class="header">{ "Ask about your tasks" }</div>
            <input
                placeholder="What should I work on next?"
                value={(*prompt).clone()}
                oninput={{
                    let prompt = prompt.clone();
                    Callback::from(move |e: web_sys::InputEvent| prompt.set(input_value(&e)))
                }}
            />
            <button type="submit" disabled={pending}>{ "Ask" }</button>
            { output }
        </form>
    }
}
