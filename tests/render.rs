use live_rendered::{ComponentId, RenderError, Rendered};
use serde_json::json;

use fixtures_::*;

#[test]
fn renders_a_flat_template() {
	init_tracing();

	let mut rendered = Rendered::new("123", thermostat_mount()).unwrap();
	rendered.merge_diff(thermostat_update()).unwrap();

	assert_eq!(
		rendered.render().unwrap(),
		r##"<div class="thermostat">
  <div class="bar cooling">
    <a href="#" phx-click="toggle-mode">cooling</a>
    <span>07:15:04 PM</span>
  </div>
</div>
"##
	);
}

#[test]
fn renders_comprehensions() {
	init_tracing();

	let rendered = Rendered::new(
		"123",
		json!({
			"0": "Users",
			"1": { "d": [["ann", "1"], ["bob", "2"]], "s": ["<li id=\"", "\">", "</li>"] },
			"s": ["<h2>", "</h2><ul>", "</ul>"],
		}),
	)
	.unwrap();

	assert_eq!(rendered.render().unwrap(), "<h2>Users</h2><ul><li id=\"ann\">1</li><li id=\"bob\">2</li></ul>");
}

#[test]
fn empty_comprehensions_need_no_statics() {
	init_tracing();

	let rendered = Rendered::new("123", json!({ "0": { "d": [] }, "s": ["<ul>", "</ul>"] })).unwrap();
	assert_eq!(rendered.render().unwrap(), "<ul></ul>");
}

#[test]
fn renders_nested_nodes_inside_tuples() {
	init_tracing();

	let rendered = Rendered::new(
		"123",
		json!({
			"0": { "d": [[{ "0": "a", "s": ["<b>", "</b>"] }], ["c"]], "s": ["<p>", "</p>"] },
			"s": ["", ""],
		}),
	)
	.unwrap();
	assert_eq!(rendered.render().unwrap(), "<p><b>a</b></p><p>c</p>");
}

#[test]
fn renders_components_in_place() {
	init_tracing();

	let mut rendered = Rendered::new("123", timeline_mount()).unwrap();
	let first = rendered.component_to_string(&ComponentId::from(0)).unwrap();
	let second = rendered.component_to_string(&ComponentId::from(1)).unwrap();
	assert!(first.starts_with("<div id=\"post-1005\" class=\"post\">"));
	assert!(second.starts_with("<div id=\"post-1004\" class=\"post\">"));
	assert!(second.contains("<b>@chris_mccord</b>"));
	assert!(second.contains("phx-value-id=\"1004\""));

	let page = |posts: &str| {
		format!(
			"<main>\n<h1>Timeline</h1>\n\n<span>{}</span>\n\n\n<div id=\"posts\" phx-update=\"prepend\">\n{}</div>\n\n</main>\n",
			NEW_POST_LINK, posts,
		)
	};
	assert_eq!(rendered.render().unwrap(), page(&(first + &second)));

	rendered.merge_diff(timeline_update()).unwrap();
	let third = rendered.component_to_string(&ComponentId::from(2)).unwrap();
	assert!(third.starts_with("<div id=\"post-1006\" class=\"post\">"));
	assert_eq!(rendered.render().unwrap(), page(&third));
}

#[test]
fn metadata_is_not_rendered() {
	init_tracing();

	let rendered = Rendered::new("123", json!({ "0": "x", "s": ["<i>", "</i>"], "title": "Hidden" })).unwrap();
	assert_eq!(rendered.render().unwrap(), "<i>x</i>");
}

#[test]
fn missing_statics_fail_the_render() {
	init_tracing();

	let rendered = Rendered::new("123", table_mount()).unwrap();
	assert_eq!(rendered.render(), Err(RenderError::MissingStatics { path: "<root>".to_owned() }));
}

#[test]
fn arity_mismatches_fail_the_render() {
	init_tracing();

	let rendered = Rendered::new("123", json!({ "0": "a", "s": ["x"] })).unwrap();
	assert_eq!(
		rendered.render(),
		Err(RenderError::ArityMismatch {
			path: "<root>".to_owned(),
			statics: 1,
			dynamics: 1,
		})
	);

	let rendered = Rendered::new("123", json!({ "0": { "d": [["a"], ["b", "c"]], "s": ["<i>", "</i>"] }, "s": ["", ""] })).unwrap();
	let error = rendered.render().unwrap_err();
	assert_eq!(
		error,
		RenderError::ArityMismatch {
			path: "0.d[1]".to_owned(),
			statics: 2,
			dynamics: 2,
		}
	);
	assert_eq!(error.to_string(), "node at `0.d[1]` has 2 static fragment(s) for 2 dynamic value(s)");
}

#[test]
fn missing_slots_fail_the_render() {
	init_tracing();

	let rendered = Rendered::new("123", json!({ "1": "a", "2": "b", "s": ["", "", ""] })).unwrap();
	assert_eq!(
		rendered.render(),
		Err(RenderError::MissingSlot {
			path: "<root>".to_owned(),
			index: 0,
		})
	);
}

#[test]
fn missing_components_fail_the_render() {
	init_tracing();

	let rendered = Rendered::new("123", json!({ "0": 5, "s": ["<div>", "</div>"] })).unwrap();
	assert_eq!(
		rendered.render(),
		Err(RenderError::MissingComponent {
			path: "0".to_owned(),
			component: ComponentId::from(5),
		})
	);
	assert_eq!(
		rendered.component_to_string(&ComponentId::from(5)),
		Err(RenderError::MissingComponent {
			path: "<root>".to_owned(),
			component: ComponentId::from(5),
		})
	);
}

#[test]
fn self_nesting_components_hit_the_depth_limit() {
	init_tracing();

	let rendered = Rendered::new(
		"123",
		json!({
			"0": 1,
			"s": ["", ""],
			"c": { "1": { "0": 1, "s": ["<b>", "</b>"] } },
		}),
	)
	.unwrap()
	.with_depth_limit(16);

	match rendered.render() {
		Err(RenderError::DepthLimit { path }) => assert!(path.starts_with("0.c.1.0.c.1")),
		other => panic!("Expected the depth limit to be reached but got {:?}", other),
	}
}
