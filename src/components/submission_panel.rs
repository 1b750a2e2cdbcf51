use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use web_sys::MouseEvent;

use crate::api::{ApiClient, ReviewInput, SubmissionCache, SubmissionDetail, submit_rating};
use crate::config::ApiConfig;

/// Blocking alert with a message fit for end users.
fn alert(message: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(message);
	}
}

/// Whether a response for `subtask_id` still belongs to the panel. A later
/// click may have replaced the selection while the request was in flight.
fn is_current(selected: Option<i64>, subtask_id: i64) -> bool {
	selected == Some(subtask_id)
}

/// Detail of the clicked subtask's submission, with a 1–5 star review form.
#[component]
pub fn SubmissionPanel(
	selected: RwSignal<Option<i64>>,
	#[prop(into)] reviewer_id: String,
	#[prop(into)] on_rated: Callback<i64>,
	#[prop(default = ApiConfig::default())] api: ApiConfig,
) -> impl IntoView {
	let client = Rc::new(ApiClient::for_browser(&api));
	let cache = Rc::new(RefCell::new(SubmissionCache::new(api.submission_ttl_ms)));
	let detail = RwSignal::new(None::<SubmissionDetail>);
	let loading = RwSignal::new(false);
	let saving = RwSignal::new(false);
	let rating = RwSignal::new(0u8);

	let (client_load, cache_load) = (client.clone(), cache.clone());
	Effect::new(move |_| {
		let Some(subtask_id) = selected.get() else {
			detail.set(None);
			loading.set(false);
			return;
		};
		let show = move |d: SubmissionDetail| {
			rating.set(d.review.as_ref().map_or(0, |r| r.rating));
			detail.set(Some(d));
		};
		if let Some(hit) = cache_load.borrow_mut().get(subtask_id, js_sys::Date::now()) {
			show(hit);
			loading.set(false);
			return;
		}

		detail.set(None);
		loading.set(true);
		let (client, cache) = (client_load.clone(), cache_load.clone());
		spawn_local(async move {
			let result = client.fetch_detail(subtask_id).await;
			let current = is_current(selected.get_untracked(), subtask_id);
			match result {
				Ok(d) => {
					cache
						.borrow_mut()
						.insert(subtask_id, d.clone(), js_sys::Date::now());
					if current {
						show(d);
					}
				}
				Err(err) => {
					error!("loading submission of subtask {subtask_id} failed: {err}");
					if current {
						alert(err.user_message());
					}
				}
			}
			// otherwise the newer request owns the spinner
			if current {
				loading.set(false);
			}
		});
	});

	let retries = api.mark_done_retries;
	let on_submit = move |_: MouseEvent| {
		let Some(subtask_id) = selected.get_untracked() else {
			return;
		};
		let input = ReviewInput {
			subtask_id,
			rating: rating.get_untracked(),
			reviewer_id: reviewer_id.clone(),
		};
		saving.set(true);
		let (client, cache) = (client.clone(), cache.clone());
		spawn_local(async move {
			match submit_rating(client.as_ref(), input, retries).await {
				Ok(review) => {
					cache.borrow_mut().invalidate(subtask_id);
					detail.update(|d| {
						if let Some(d) = d {
							d.review = Some(review);
						}
					});
					on_rated.run(subtask_id);
				}
				Err(err) => {
					error!("rating subtask {subtask_id} failed: {err}");
					alert(err.user_message());
				}
			}
			saving.set(false);
		});
	};

	view! {
		<aside
			class="submission-panel"
			style:display=move || if selected.get().is_some() { "block" } else { "none" }
		>
			<button class="close" on:click=move |_| selected.set(None)>"×"</button>
			{move || loading.get().then(|| view! { <p class="loading">"Memuat..."</p> })}
			{move || {
				detail
					.get()
					.map(|d| {
						let s = d.submission;
						let assignee = s.subject.assignee.map(|a| a.name).unwrap_or_default();
						view! {
							<h2>{s.subject.task_title} " / " {s.subject.subtask_title}</h2>
							<p class="assignee">{assignee}</p>
							<p class="submitted">"Dikirim: " {s.submitted_at}</p>
							{s.is_revision.then(|| view! { <span class="badge">"Revisi"</span> })}
							<p class="comment">{s.comment.unwrap_or_default()}</p>
							{s
								.file_url
								.map(|url| {
									view! {
										<a href=url target="_blank">
											"Lihat berkas"
										</a>
									}
								})}
						}
					})
			}}
			<div class="rating">
				{(1..=5u8)
					.map(|star| {
						view! {
							<button
								class="star"
								class:active={move || rating.get() >= star}
								on:click=move |_| rating.set(star)
							>
								"★"
							</button>
						}
					})
					.collect_view()}
			</div>
			<button
				class="submit"
				on:click=on_submit
				disabled=move || saving.get() || rating.get() == 0
			>
				{move || if saving.get() { "Menyimpan..." } else { "Simpan penilaian" }}
			</button>
		</aside>
	}
}
