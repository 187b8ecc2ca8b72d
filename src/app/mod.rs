use crate::api::UploadFile;
use crate::engine::NoticeLevel;
use crate::models::{ContactField, ListItem, ListKey, UiMode, UploadKind};
use crate::mutations::ItemField;
use crate::state::{AppContext, AppState};
use crate::storage::clear_ui_mode_preview;
use crate::util::sleep_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

const NOTICE_VISIBLE_MS: u32 = 3_200;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    state.start();
    let ui_mode = state.sink.ui_mode;
    provide_context(AppContext(state));

    view! {
        <div class=move || {
            format!("admin {}", ui_mode.get().map(UiMode::css_class).unwrap_or_default())
        }>
            <header class="admin-header">
                <h1>"Portfolio admin"</h1>
                <StatusLine />
                <SaveControls />
            </header>
            <NoticeToast />
            <ContactForm />
            <ModePicker />
            <UploadPanel />
            {ListKey::all().map(|list| view! { <ListSection list=list /> }).collect_view()}
        </div>
    }
}

#[component]
fn StatusLine() -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;
    let status = move || {
        sink.track();
        engine.with_value(|e| e.status())
    };

    view! {
        <span class="save-status">
            {move || status().map(|s| s.label()).unwrap_or_default()}
        </span>
    }
}

#[component]
fn SaveControls() -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;
    let saving = Signal::derive(move || {
        sink.track();
        engine.with_value(|e| e.is_manual_save_in_flight())
    });

    let on_save = move |_| {
        let engine = engine.get_value();
        spawn_local(async move {
            let _ = engine.save_now().await;
        });
    };

    let on_load = move |_| {
        let engine = engine.get_value();
        spawn_local(async move {
            let _ = engine.load().await;
        });
    };

    let on_reset = move |_| {
        let confirmed = window()
            .confirm_with_message("Reset all content to the defaults?")
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let engine = engine.get_value();
        spawn_local(async move {
            let _ = engine.reset().await;
        });
    };

    view! {
        <div class="save-controls">
            <button on:click=on_save disabled=move || saving.get()>
                {move || if saving.get() { "Saving..." } else { "Save" }}
            </button>
            <button on:click=on_load>"Reload"</button>
            <button class="danger" on:click=on_reset>"Reset"</button>
        </div>
    }
}

#[component]
fn NoticeToast() -> impl IntoView {
    let notice = expect_context::<AppContext>().0.sink.notice;

    Effect::new(move |_| {
        let Some(shown) = notice.get() else {
            return;
        };
        spawn_local(async move {
            sleep_ms(NOTICE_VISIBLE_MS).await;
            if notice.get_untracked().as_ref() == Some(&shown) {
                notice.set(None);
            }
        });
    });

    move || {
        notice.get().map(|n| {
            let class = match n.level {
                NoticeLevel::Success => "notice notice-success",
                NoticeLevel::Error => "notice notice-error",
                NoticeLevel::Info => "notice notice-info",
            };
            view! {
                <div class=class on:click=move |_| notice.set(None)>{n.message}</div>
            }
        })
    }
}

#[component]
fn ContactForm() -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;

    let field = move |label: &'static str, field: ContactField| {
        let value = move || {
            sink.track();
            engine.with_value(|e| e.document().read(|d| d.contact(field).to_string()))
        };
        view! {
            <label class="field">
                <span>{label}</span>
                <input
                    type="text"
                    prop:value=value
                    on:change=move |ev: web_sys::Event| {
                        engine.get_value().set_contact(field, &event_target_value(&ev));
                    }
                />
            </label>
        }
    };

    view! {
        <section class="contact">
            <h2>"Details"</h2>
            {field("Name", ContactField::Name)}
            {field("Email", ContactField::Email)}
            {field("Phone", ContactField::Phone)}
            {field("Location", ContactField::Location)}
        </section>
    }
}

#[component]
fn ModePicker() -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;
    let ui_mode = sink.ui_mode;

    let on_change = move |ev: web_sys::Event| {
        let mode = UiMode::parse_token(&event_target_value(&ev));
        let engine = engine.get_value();
        spawn_local(async move {
            engine.set_ui_mode(mode).await;
        });
    };

    let on_clear = move |_| {
        clear_ui_mode_preview();
        ui_mode.set(None);
    };

    view! {
        <section class="mode-picker">
            <h2>"Presentation"</h2>
            <select
                on:change=on_change
                prop:value=move || ui_mode.get().map(|m| m.as_ref().to_string()).unwrap_or_default()
            >
                <option value="">"Default"</option>
                {UiMode::iter()
                    .map(|m| view! { <option value=m.as_ref().to_string()>{m.to_string()}</option> })
                    .collect_view()}
            </select>
            <button on:click=on_clear>"Clear preview"</button>
        </section>
    }
}

#[cfg(target_arch = "wasm32")]
async fn read_file(file: web_sys::File) -> Result<UploadFile, String> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{e:?}"))?;
    Ok(UploadFile {
        file_name: file.name(),
        bytes: js_sys::Uint8Array::new(&buf).to_vec(),
    })
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_file(_file: web_sys::File) -> Result<UploadFile, String> {
    Err("file uploads need a browser".to_string())
}

const UPLOAD_KINDS: [UploadKind; 5] = [
    UploadKind::Cert,
    UploadKind::Snap,
    UploadKind::Event,
    UploadKind::Profile,
    UploadKind::Resume,
];

#[component]
fn UploadPanel() -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;
    let kind = RwSignal::new(UploadKind::Cert);
    let description = RwSignal::new(String::new());
    let preview: RwSignal<Option<String>> = RwSignal::new(None);
    let busy = RwSignal::new(false);
    let file_input: NodeRef<leptos::html::Input> = NodeRef::new();

    let on_upload = move |_| {
        let Some(file) = file_input
            .get()
            .and_then(|el| el.files())
            .and_then(|files| files.get(0))
        else {
            return;
        };
        let engine = engine.get_value();
        let kind = kind.get_untracked();
        let desc = description.get_untracked();
        busy.set(true);

        spawn_local(async move {
            match read_file(file).await {
                Ok(upload) => {
                    if let Ok(outcome) = engine.upload(kind, upload, Some(desc)).await {
                        if outcome.preview_url.is_some() {
                            preview.set(outcome.preview_url);
                        }
                        description.set(String::new());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "could not read file"),
            }
            busy.set(false);
        });
    };

    view! {
        <section class="upload-panel">
            <h2>"Upload"</h2>
            <select on:change=move |ev: web_sys::Event| {
                if let Ok(k) = event_target_value(&ev).parse::<UploadKind>() {
                    kind.set(k);
                }
            }>
                {UPLOAD_KINDS
                    .into_iter()
                    .map(|k| view! { <option value=k.as_ref().to_string()>{k.to_string()}</option> })
                    .collect_view()}
            </select>
            <input type="file" node_ref=file_input />
            <input
                type="text"
                placeholder="Description"
                prop:value=move || description.get()
                on:input=move |ev: web_sys::Event| description.set(event_target_value(&ev))
            />
            <button on:click=on_upload disabled=move || busy.get()>
                {move || if busy.get() { "Uploading..." } else { "Upload" }}
            </button>
            {move || preview.get().map(|src| view! { <img class="profile-preview" src=src alt="Profile" /> })}
            {move || {
                sink.track();
                engine
                    .with_value(|e| e.document().read(|d| d.resume.clone()))
                    .filter(|r| !r.url.is_empty())
                    .map(|r| view! { <a class="resume-link" href=r.url target="_blank">{r.name}</a> })
            }}
        </section>
    }
}

#[component]
fn ListSection(list: ListKey) -> impl IntoView {
    let AppState { sink, engine, .. } = expect_context::<AppContext>().0;
    let draft = RwSignal::new(String::new());
    let draft_description = RwSignal::new(String::new());

    let on_add = move |_| {
        let name = draft.get_untracked();
        let description = draft_description.get_untracked();
        if engine.get_value().add_entry(list, &name, &description).is_some() {
            draft.set(String::new());
            draft_description.set(String::new());
        }
    };

    let rows = move || {
        sink.track();
        let items = engine.with_value(|e| e.document().read(|d| d.list(list).clone()));
        let last = items.len().saturating_sub(1);
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let saved = engine.with_value(|e| e.is_recently_saved(list, index));
                view! { <ItemRow list=list index=index item=item saved=saved last={index == last} /> }
            })
            .collect_view()
    };

    view! {
        <section class="list-section">
            <h2>{list.to_string()}</h2>
            <ul>{rows}</ul>
            <div class="list-add">
                <input
                    type="text"
                    placeholder="Add item"
                    prop:value=move || draft.get()
                    on:input=move |ev: web_sys::Event| draft.set(event_target_value(&ev))
                />
                {list.is_media().then(|| view! {
                    <input
                        type="text"
                        placeholder="Description (optional)"
                        prop:value=move || draft_description.get()
                        on:input=move |ev: web_sys::Event| draft_description.set(event_target_value(&ev))
                    />
                })}
                <button on:click=on_add>"Add"</button>
            </div>
        </section>
    }
}

#[component]
fn ItemRow(list: ListKey, index: usize, item: ListItem, saved: bool, last: bool) -> impl IntoView {
    let engine = expect_context::<AppContext>().0.engine;
    let name = item.display_value().to_string();
    let record = item.as_record().cloned().unwrap_or_default();

    let edit = move |field: ItemField| {
        move |ev: web_sys::Event| {
            engine
                .get_value()
                .edit_field(list, index, field, &event_target_value(&ev));
        }
    };

    view! {
        <li class="item-row" class:saved=saved>
            {record.thumb.map(|src| view! { <img class="thumb" src=src alt="" /> })}
            <input type="text" prop:value=name on:change=edit(ItemField::Name) />
            <input
                type="text"
                placeholder="Description"
                prop:value=record.description.unwrap_or_default()
                on:change=edit(ItemField::Description)
            />
            {list.is_media().then(|| view! {
                <input
                    type="text"
                    placeholder="Lottie URL"
                    prop:value=record.lottie.unwrap_or_default()
                    on:change=edit(ItemField::Lottie)
                />
            })}
            <button disabled={index == 0} on:click=move |_| {
                engine.get_value().move_up(list, index);
            }>"Up"</button>
            <button disabled=last on:click=move |_| {
                engine.get_value().move_down(list, index);
            }>"Down"</button>
            <button class="danger" on:click=move |_| {
                engine.get_value().remove(list, index);
            }>"Remove"</button>
            {saved.then(|| view! { <span class="saved-badge">"Saved"</span> })}
        </li>
    }
}
