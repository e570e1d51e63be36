use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use std::sync::Arc;

/// Category names attached by the stock widgets.
pub mod well_known {
	/// Text editor widgets.
	pub const EDITOR: &str = "editor";
	/// Top-level editor windows.
	pub const WINDOW: &str = "window";
	/// Tab containers holding editors.
	pub const TAB_WIDGET: &str = "tabwidget";
	/// Tab bars of tab containers.
	pub const TAB_BAR: &str = "tabbar";
	/// Split layout managers.
	pub const SPLIT_MANAGER: &str = "splitmanager";
	/// Individual splitters inside a split manager.
	pub const SPLITTER: &str = "splitter";
	/// Single-line input widgets.
	pub const MINIBUFFER: &str = "minibuffer";
	/// Editor minimaps.
	pub const MINIMAP: &str = "minimap";
}

/// A string label attached to a live object.
///
/// Cloning is cheap; the label is shared.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(Arc<str>);

impl Category {
	/// Creates a category from a label.
	pub fn new(label: &str) -> Self {
		Self(Arc::from(label))
	}

	/// Returns the label.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for Category {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for Category {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Category {
	fn from(label: &str) -> Self {
		Self::new(label)
	}
}

impl From<&String> for Category {
	fn from(label: &String) -> Self {
		Self::new(label)
	}
}

impl From<String> for Category {
	fn from(label: String) -> Self {
		Self(Arc::from(label))
	}
}

impl From<&Category> for Category {
	fn from(cat: &Category) -> Self {
		cat.clone()
	}
}

impl PartialEq<str> for Category {
	fn eq(&self, other: &str) -> bool {
		&*self.0 == other
	}
}

impl PartialEq<&str> for Category {
	fn eq(&self, other: &&str) -> bool {
		&*self.0 == *other
	}
}

/// An ordered set of categories.
///
/// Ordering makes "pick any shared category" deterministic, which keeps the
/// connector's diagnostics stable between runs.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(BTreeSet<Category>);

impl CategorySet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a category, returning `false` if it was already present.
	pub fn insert(&mut self, cat: impl Into<Category>) -> bool {
		self.0.insert(cat.into())
	}

	/// Removes a category, returning `false` if it was absent.
	pub fn remove(&mut self, cat: &str) -> bool {
		self.0.remove(cat)
	}

	pub fn contains(&self, cat: &str) -> bool {
		self.0.contains(cat)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> btree_set::Iter<'_, Category> {
		self.0.iter()
	}

	/// Returns true if both sets share at least one category.
	pub fn intersects(&self, other: &CategorySet) -> bool {
		self.first_shared(other).is_some()
	}

	/// Returns the smallest category present in both sets.
	pub fn first_shared<'a>(&'a self, other: &CategorySet) -> Option<&'a Category> {
		let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
		// Look up from the smaller side but always hand back our own element.
		small
			.iter()
			.find(|cat| large.contains(cat.as_str()))
			.and_then(|cat| self.0.get(cat.as_str()))
	}

	/// Returns the categories present in both sets.
	pub fn intersection(&self, other: &CategorySet) -> CategorySet {
		Self(self.0.intersection(&other.0).cloned().collect())
	}

	/// Returns true if every category of `self` is also in `other`.
	///
	/// The empty set is a subset of every set.
	pub fn is_subset(&self, other: &CategorySet) -> bool {
		self.0.is_subset(&other.0)
	}
}

impl fmt::Debug for CategorySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.0.iter()).finish()
	}
}

impl fmt::Display for CategorySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("{")?;
		for (idx, cat) in self.0.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			f.write_str(cat.as_str())?;
		}
		f.write_str("}")
	}
}

impl<C: Into<Category>> FromIterator<C> for CategorySet {
	fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

impl<C: Into<Category>> Extend<C> for CategorySet {
	fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
		self.0.extend(iter.into_iter().map(Into::into));
	}
}

impl IntoIterator for CategorySet {
	type Item = Category;
	type IntoIter = btree_set::IntoIter<Category>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a CategorySet {
	type Item = &'a Category;
	type IntoIter = btree_set::Iter<'a, Category>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Conversion accepted wherever a set of categories is expected.
///
/// A single label is treated as a one-element set, so both
/// `connector.objects_matching("editor")` and
/// `connector.objects_matching(["editor", "window"])` work.
pub trait IntoCategories {
	fn into_categories(self) -> CategorySet;
}

impl IntoCategories for CategorySet {
	fn into_categories(self) -> CategorySet {
		self
	}
}

impl IntoCategories for &CategorySet {
	fn into_categories(self) -> CategorySet {
		self.clone()
	}
}

impl IntoCategories for Category {
	fn into_categories(self) -> CategorySet {
		CategorySet(BTreeSet::from([self]))
	}
}

impl IntoCategories for &Category {
	fn into_categories(self) -> CategorySet {
		self.clone().into_categories()
	}
}

impl IntoCategories for &str {
	fn into_categories(self) -> CategorySet {
		Category::from(self).into_categories()
	}
}

impl IntoCategories for String {
	fn into_categories(self) -> CategorySet {
		Category::from(self).into_categories()
	}
}

impl IntoCategories for &String {
	fn into_categories(self) -> CategorySet {
		Category::from(self).into_categories()
	}
}

impl<C: Into<Category>, const N: usize> IntoCategories for [C; N] {
	fn into_categories(self) -> CategorySet {
		self.into_iter().collect()
	}
}

impl<C: Into<Category> + Clone> IntoCategories for &[C] {
	fn into_categories(self) -> CategorySet {
		self.iter().cloned().collect()
	}
}

impl<C: Into<Category>> IntoCategories for Vec<C> {
	fn into_categories(self) -> CategorySet {
		self.into_iter().collect()
	}
}
