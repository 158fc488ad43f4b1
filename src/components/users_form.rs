use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use thiserror::Error;

/// Reasons a submitted username list is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
	/// A row was left blank (1-based row number).
	#[error("Username {row} is required")]
	Empty { row: usize },

	#[error("Add at least one username")]
	NoUsernames,
}

/// Trims every entry and rejects blank rows and empty lists.
pub fn validate_usernames(entries: &[String]) -> Result<Vec<String>, UsernameError> {
	if entries.is_empty() {
		return Err(UsernameError::NoUsernames);
	}
	entries
		.iter()
		.enumerate()
		.map(|(i, entry)| match entry.trim() {
			"" => Err(UsernameError::Empty { row: i + 1 }),
			name => Ok(name.to_string()),
		})
		.collect()
}

#[derive(Clone, Copy)]
struct Row {
	key: usize,
	value: RwSignal<String>,
}

/// Username rows with add/remove controls. Calls `on_submit` with the
/// validated usernames.
#[component]
pub fn UsersForm(
	on_submit: Callback<Vec<String>>,
	#[prop(into)] is_loading: Signal<bool>,
) -> impl IntoView {
	let next_key = StoredValue::new(1_usize);
	let rows = RwSignal::new(vec![Row {
		key: 0,
		value: RwSignal::new(String::new()),
	}]);
	let error = RwSignal::new(None::<UsernameError>);

	let add_row = move |_| {
		let key = next_key.get_value();
		next_key.set_value(key + 1);
		rows.update(|rows| {
			rows.push(Row {
				key,
				value: RwSignal::new(String::new()),
			})
		});
	};

	let handle_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let entries: Vec<String> = rows.get_untracked().iter().map(|r| r.value.get_untracked()).collect();
		match validate_usernames(&entries) {
			Ok(usernames) => {
				error.set(None);
				on_submit.run(usernames);
			}
			Err(e) => error.set(Some(e)),
		}
	};

	view! {
		<form class="users-form" on:submit=handle_submit>
			<div class="users-form-rows">
				<For
					each={move || rows.get().into_iter().enumerate().collect::<Vec<_>>()}
					key={|(index, row): &(usize, Row)| (*index, row.key)}
					children=move |(index, row)| {
						view! {
							<div class="users-form-row">
								<label>
									{format!("GitHub Username {}", index + 1)}
									<input
										type="text"
										placeholder="octocat"
										prop:value=move || row.value.get()
										on:input=move |ev| row.value.set(event_target_value(&ev))
									/>
								</label>
								<Show when=move || { index > 0 }>
									<button
										type="button"
										class="destructive"
										on:click=move |_| {
											rows.update(|rows| rows.retain(|r| r.key != row.key))
										}
									>
										"Remove"
									</button>
								</Show>
							</div>
						}
					}
				/>
			</div>

			<div class="users-form-actions">
				<button type="button" class="outline" on:click=add_row>
					"Add Username"
				</button>
				<button type="submit" disabled=move || is_loading.get()>
					{move || if is_loading.get() { "Loading..." } else { "Generate Network Graph" }}
				</button>
			</div>

			{move || error.get().map(|e| view! { <p class="form-error">{e.to_string()}</p> })}

			<p class="form-description">
				"Enter GitHub usernames to visualize their follower/following network. "
				"The graph will show connections between users."
			</p>
		</form>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entries(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn test_usernames_are_trimmed() {
		assert_eq!(
			validate_usernames(&entries(&[" octocat ", "torvalds"])),
			Ok(entries(&["octocat", "torvalds"]))
		);
	}

	#[test]
	fn test_blank_row_is_rejected() {
		assert_eq!(
			validate_usernames(&entries(&["octocat", "   "])),
			Err(UsernameError::Empty { row: 2 })
		);
		assert_eq!(
			UsernameError::Empty { row: 2 }.to_string(),
			"Username 2 is required"
		);
	}

	#[test]
	fn test_empty_list_is_rejected() {
		assert_eq!(validate_usernames(&[]), Err(UsernameError::NoUsernames));
	}
}
