#![allow(unused_crate_dependencies)]

mod common;

use std::sync::Arc;

use common::{init_tracing, pane};
use eye_connector::{CategorySet, Connector, ListenerHandle, ObjectId, ObjectRef};
use parking_lot::Mutex;
use proptest::prelude::*;
use proptest::sample::subsequence;
use rustc_hash::FxHashMap;

const LABELS: [&str; 4] = ["editor", "window", "minimap", "splitter"];

#[derive(Debug, Clone)]
enum Op {
	Spawn(Vec<&'static str>),
	Drop(usize),
	Add(usize, &'static str),
	Remove(usize, &'static str),
	Listen(Vec<&'static str>),
}

fn label() -> impl Strategy<Value = &'static str> {
	proptest::sample::select(LABELS.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		subsequence(LABELS.to_vec(), 0..=2).prop_map(Op::Spawn),
		any::<usize>().prop_map(Op::Drop),
		(any::<usize>(), label()).prop_map(|(i, l)| Op::Add(i, l)),
		(any::<usize>(), label()).prop_map(|(i, l)| Op::Remove(i, l)),
		subsequence(LABELS.to_vec(), 1..=2).prop_map(Op::Listen),
	]
}

/// Net setup minus teardown calls per (listener pair, object).
type Balance = Arc<Mutex<FxHashMap<(usize, ObjectId), i64>>>;

struct Pair {
	categories: CategorySet,
	setup: ListenerHandle,
	teardown: ListenerHandle,
}

fn listen(connector: &Connector, balance: &Balance, index: usize, labels: &[&'static str]) -> Pair {
	let up = balance.clone();
	let setup = connector
		.listen(labels)
		.setup(move |obj| {
			*up.lock().entry((index, obj.core().id())).or_default() += 1;
			Ok(())
		})
		.unwrap();
	let down = balance.clone();
	let teardown = connector
		.listen(labels)
		.teardown(move |obj| {
			*down.lock().entry((index, obj.core().id())).or_default() -= 1;
			Ok(())
		})
		.unwrap();
	Pair {
		categories: labels.iter().copied().collect(),
		setup,
		teardown,
	}
}

fn check(objects: &[ObjectRef], pairs: &[Pair], balance: &Balance) -> Result<(), TestCaseError> {
	let balance = balance.lock();
	for obj in objects {
		let id = obj.core().id();
		let cats = obj.core().categories();
		for (index, pair) in pairs.iter().enumerate() {
			let matches = cats.intersects(&pair.categories);
			prop_assert_eq!(pair.setup.is_attached_to(obj), matches, "setup {} on {}", index, obj);
			prop_assert_eq!(pair.teardown.is_attached_to(obj), matches, "teardown {} on {}", index, obj);
			let net = balance.get(&(index, id)).copied().unwrap_or(0);
			prop_assert_eq!(net, i64::from(matches), "balance {} on {}", index, obj);
		}
	}
	Ok(())
}

proptest! {
	#[test]
	fn attachment_tracks_intersection(ops in prop::collection::vec(op(), 1..40)) {
		init_tracing();
		let connector = Connector::new();
		let balance = Balance::default();
		let mut objects: Vec<ObjectRef> = Vec::new();
		let mut pairs: Vec<Pair> = Vec::new();

		for op in ops {
			match op {
				Op::Spawn(labels) => objects.push(pane(&connector, labels)),
				Op::Drop(i) if !objects.is_empty() => {
					let len = objects.len();
					objects.remove(i % len);
				}
				Op::Add(i, label) if !objects.is_empty() => {
					let len = objects.len();
					objects[i % len].core().add_category(label);
				}
				Op::Remove(i, label) if !objects.is_empty() => {
					let len = objects.len();
					objects[i % len].core().remove_category(label);
				}
				Op::Listen(labels) => {
					let index = pairs.len();
					pairs.push(listen(&connector, &balance, index, &labels));
				}
				_ => {}
			}
			check(&objects, &pairs, &balance)?;
		}

		let mut live: Vec<_> = connector.objects_matching(CategorySet::new()).iter().map(|o| o.core().id()).collect();
		live.sort();
		let mut expected: Vec<_> = objects.iter().map(|o| o.core().id()).collect();
		expected.sort();
		prop_assert_eq!(live, expected);
	}
}
