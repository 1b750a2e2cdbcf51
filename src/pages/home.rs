use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::api::{ApiClient, Assignee, Subtask, Task};
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::submission_panel::SubmissionPanel;
use crate::config::ApiConfig;

/// Shown until (or instead of) the task endpoint answering.
fn fallback_tasks() -> Vec<Task> {
	let assignee = |name: &str| {
		Some(Assignee {
			id: None,
			name: name.into(),
			avatar_url: None,
		})
	};
	vec![Task {
		id: 0,
		title: "Laporan Bulanan".into(),
		status: Some("in_progress".into()),
		subtasks: vec![
			Subtask {
				id: 1,
				title: "Kumpulkan data".into(),
				is_done: true,
				assignee: assignee("Staf Data"),
			},
			Subtask {
				id: 2,
				title: "Susun draf".into(),
				is_done: true,
				assignee: assignee("Staf Humas"),
			},
			Subtask {
				id: 3,
				title: "Verifikasi".into(),
				is_done: false,
				assignee: None,
			},
		],
	}]
}

/// Reviewer id kept by the dashboard in local storage.
fn reviewer_id() -> String {
	web_sys::window()
		.and_then(|w| w.local_storage().ok().flatten())
		.and_then(|s| s.get_item("user_id").ok().flatten())
		.unwrap_or_else(|| "anonim".into())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let api = ApiConfig::default();
	let tasks = RwSignal::new(fallback_tasks());
	let search = RwSignal::new(String::new());
	let task_filter = RwSignal::new(None::<i64>);
	let selected = RwSignal::new(None::<i64>);

	let client = ApiClient::for_browser(&api);
	spawn_local(async move {
		match client.fetch_tasks().await {
			Ok(list) => {
				info!("loaded {} tasks", list.len());
				tasks.set(list);
			}
			Err(err) => warn!("task list unavailable, showing fallback: {err}"),
		}
	});

	// the subtask is done server-side now; mirror it without refetching
	let on_rated = move |subtask_id: i64| {
		tasks.update(|list| {
			for subtask in list
				.iter_mut()
				.flat_map(|t| t.subtasks.iter_mut())
				.filter(|s| s.id == subtask_id)
			{
				subtask.is_done = true;
			}
		});
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="graph-page">
				<div class="graph-filters">
					<input
						type="search"
						placeholder="Cari tugas, subtugas, atau pegawai"
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
					/>
					<select on:change=move |ev| task_filter.set(event_target_value(&ev).parse().ok())>
						<option value="">"Semua tugas"</option>
						{move || {
							tasks
								.get()
								.into_iter()
								.map(|t| view! { <option value=t.id.to_string()>{t.title}</option> })
								.collect_view()
						}}
					</select>
				</div>
				<ForceGraphCanvas
					tasks=tasks
					search=search
					task_filter=task_filter
					on_open_subtask=move |id: i64| selected.set(Some(id))
				/>
				<SubmissionPanel
					selected=selected
					reviewer_id=reviewer_id()
					on_rated=on_rated
					api=api
				/>
			</div>
		</ErrorBoundary>
	}
}
