use live_rendered::{Comprehension, Node, Rendered, Slot, Statics};
use serde_json::json;

use fixtures_::*;

#[test]
fn recursively_merges_two_diffs() {
	init_tracing();

	let mut simple = Rendered::new("123", thermostat_mount()).unwrap();
	simple.merge_diff(thermostat_update()).unwrap();
	assert_eq!(simple.to_value(), thermostat_merged());

	let mut deep = Rendered::new("123", table_mount()).unwrap();
	deep.merge_diff(table_update()).unwrap();
	assert_eq!(deep.to_value(), table_merged());
}

#[test]
fn statics_replace_the_node_without_residue() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": "a", "1": "b" })).unwrap();
	rendered.merge_diff(json!({ "0": "c", "s": ["c"] })).unwrap();

	assert_eq!(rendered.get().root(), &Node::new(["c"]).with_slot(0, "c"));
	assert_eq!(rendered.to_value(), json!({ "0": "c", "s": ["c"] }));
}

#[test]
fn replaces_text_with_a_node() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": { "0": "<button>Press Me</button>", "s": ["", ""] } })).unwrap();
	let diff = json!({ "0": { "0": { "0": "val", "s": ["", ""] }, "s": ["", ""] } });
	rendered.merge_diff(diff.clone()).unwrap();
	assert_eq!(rendered.to_value(), diff);
}

#[test]
fn replaces_a_node_with_text() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": { "0": { "0": "val", "s": ["", ""] }, "s": ["", ""] } })).unwrap();
	let diff = json!({ "0": { "0": "<button>Press Me</button>", "s": ["", ""] } });
	rendered.merge_diff(diff.clone()).unwrap();
	assert_eq!(rendered.to_value(), diff);
}

#[test]
fn shape_flips_replace_wholesale() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": { "0": "X", "s": [""] } })).unwrap();
	rendered.merge_diff(json!({ "0": "Y" })).unwrap();
	assert_eq!(rendered.to_value(), json!({ "0": "Y" }));

	// A patch without statics doesn't merge into text either, it takes its place.
	rendered.merge_diff(json!({ "0": { "0": "Z" } })).unwrap();
	assert_eq!(rendered.get().root().slots[&0], Slot::from(Node::patch().with_slot(0, "Z")));

	rendered.merge_diff(json!({ "0": { "d": [["a"]], "s": ["<i>", "</i>"] } })).unwrap();
	assert_eq!(rendered.get().root().slots[&0], Slot::from(Comprehension::new(["<i>", "</i>"]).with_tuple(vec!["a".into()])));

	rendered.merge_diff(json!({ "0": 3 })).unwrap();
	assert_eq!(rendered.to_value(), json!({ "0": 3 }));
}

#[test]
fn merging_full_statics_twice_is_idempotent() {
	init_tracing();

	let diff = json!({
		"0": { "0": "nested", "s": ["<b>", "</b>"] },
		"1": { "d": [["x"], ["y"]], "s": ["<li>", "</li>"] },
		"s": ["<div>", "", "</div>"],
	});

	let mut once = Rendered::new("123", thermostat_mount()).unwrap();
	once.merge_diff(diff.clone()).unwrap();

	let mut twice = Rendered::new("123", thermostat_mount()).unwrap();
	twice.merge_diff(diff.clone()).unwrap();
	twice.merge_diff(diff).unwrap();

	assert_eq!(once.get().root(), twice.get().root());
	assert_eq!(once.render().unwrap(), "<div><b>nested</b><li>x</li><li>y</li></div>");
	assert_eq!(once.render(), twice.render());
}

#[test]
fn updating_one_slot_leaves_the_others_alone() {
	init_tracing();

	let mut mount = thermostat_mount();
	mount["title"] = json!("Thermostat");
	let mut rendered = Rendered::new("123", mount).unwrap();
	let before = rendered.get().root().clone();

	rendered.merge_diff(json!({ "1": "heating" })).unwrap();
	let after = rendered.get().root();

	assert_eq!(after.slots[&1], Slot::from("heating"));
	assert_eq!(after.slots[&0], before.slots[&0]);
	assert_eq!(after.slots[&2], before.slots[&2]);
	assert_eq!(after.metadata, before.metadata);
	assert_eq!(after.statics, before.statics);
}

#[test]
fn metadata_is_overwritten_key_by_key() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "s": ["<p></p>"], "title": "Listing Posts", "flash": { "info": "Hi" } })).unwrap();
	rendered.merge_diff(json!({ "title": "Show Post" })).unwrap();

	let metadata = &rendered.get().root().metadata;
	assert_eq!(metadata["title"], json!("Show Post"));
	assert_eq!(metadata["flash"], json!({ "info": "Hi" }));
	assert_eq!(rendered.render().unwrap(), "<p></p>");
}

#[test]
fn new_slots_are_added() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": { "0": "a" } })).unwrap();
	rendered.merge_diff(json!({ "0": { "1": "b" } })).unwrap();
	assert_eq!(rendered.to_value(), json!({ "0": { "0": "a", "1": "b" } }));
}

#[test]
fn comprehension_tuples_are_replaced_not_merged() {
	init_tracing();

	let mut rendered = Rendered::new(
		"123",
		json!({
			"0": { "d": [["a", "1"], ["b", "2"], ["c", "3"]], "s": ["<li>", ": ", "</li>"] },
			"s": ["<ul>", "</ul>"],
		}),
	)
	.unwrap();

	rendered.merge_diff(json!({ "0": { "d": [["z", "9"]] } })).unwrap();
	let expected = Comprehension::new(["<li>", ": ", "</li>"]).with_tuple(vec!["z".into(), "9".into()]);
	assert_eq!(rendered.get().root().slots[&0], Slot::from(expected));
	assert_eq!(rendered.render().unwrap(), "<ul><li>z: 9</li></ul>");

	rendered.merge_diff(json!({ "0": { "d": [["x", "1"], ["y", "2"]] } })).unwrap();
	assert_eq!(rendered.render().unwrap(), "<ul><li>x: 1</li><li>y: 2</li></ul>");

	rendered.merge_diff(json!({ "0": { "d": [] } })).unwrap();
	assert_eq!(rendered.render().unwrap(), "<ul></ul>");
}

#[test]
fn comprehension_statics_follow_the_node_rules() {
	init_tracing();

	let mut rendered = Rendered::new("123", json!({ "0": { "d": [["a"]], "s": ["<li>", "</li>"] }, "s": ["", ""] })).unwrap();
	rendered.merge_diff(json!({ "0": { "d": [["b"]], "s": ["<dd>", "</dd>"] } })).unwrap();

	match &rendered.get().root().slots[&0] {
		Slot::Comprehension(comprehension) => {
			assert_eq!(comprehension.statics, Some(Statics::fragments(["<dd>", "</dd>"])));
			assert_eq!(comprehension.dynamics, vec![vec![Slot::from("b")]]);
		}
		other => panic!("Expected a comprehension but found {:?}", other),
	}
	assert_eq!(rendered.render().unwrap(), "<dd>b</dd>");
}

#[test]
fn malformed_diffs_leave_the_tree_unchanged() {
	init_tracing();

	let mut rendered = Rendered::new("123", thermostat_mount()).unwrap();
	let error = rendered.merge_diff(json!({ "0": "heating", "1": { "d": [["a", false]] } })).unwrap_err();

	assert_eq!(error.to_string(), "malformed diff at `1.d[0][1]`: expected text, a node or a comprehension but found a boolean");
	assert_eq!(rendered.to_value(), thermostat_mount());
}
