//! Injection discovery.
//!
//! A document's parse tree is a hierarchy of language layers: a markdown
//! layer may embed lua code blocks, whose layers may embed further regions.
//! [`InjectionWalker`] subscribes to every layer it reaches and asks the
//! coordinator for each injected language that has no attempt memo yet.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::coordinator::InstallCoordinator;
use crate::policy::Context;

/// Identity of a tree layer. Must be unique among live layers; a host may
/// reuse the id of a layer it has dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub u64);

pub type StructureListener = Box<dyn FnMut()>;
pub type ChildListener = Box<dyn FnMut(Rc<dyn LanguageTree>)>;

/// A parsed region for one language, as exposed by the host.
pub trait LanguageTree {
	fn id(&self) -> TreeId;

	fn language(&self) -> &str;

	/// Target languages declared by this layer's injection rules.
	fn injected_languages(&self) -> Vec<String>;

	/// Current injected sub-layers.
	fn children(&self) -> Vec<Rc<dyn LanguageTree>>;

	/// Registers a callback fired after this layer's injection declarations change.
	fn on_structure_changed(&self, listener: StructureListener);

	/// Registers a callback fired with each sub-layer added to this layer.
	fn on_child_added(&self, listener: ChildListener);
}

/// Feeds languages discovered in a layer tree back into the coordinator.
///
/// Deduplication is by language through the attempt memo: two regions asking
/// for the same language lead to a single `ensure_installed` call. Each
/// layer is subscribed to once, however often it is discovered, and is
/// forgotten once the host drops it.
#[derive(Clone)]
pub struct InjectionWalker {
	inner: Rc<WalkerInner>,
}

struct WalkerInner {
	coordinator: Rc<InstallCoordinator>,
	subscribed: RefCell<HashMap<TreeId, Weak<dyn LanguageTree>>>,
}

impl InjectionWalker {
	pub fn new(coordinator: Rc<InstallCoordinator>) -> Self {
		Self {
			inner: Rc::new(WalkerInner {
				coordinator,
				subscribed: RefCell::new(HashMap::new()),
			}),
		}
	}

	/// Scans `node` and its current descendants, and keeps watching them for
	/// structural changes and new children. No-op for `None`.
	pub fn discover(&self, ctx: &Context, node: Option<&Rc<dyn LanguageTree>>) {
		let Some(node) = node else {
			return;
		};

		self.scan(ctx, node.as_ref());

		if self.track(node) {
			self.subscribe(ctx, node);
		}

		for child in node.children() {
			self.discover(ctx, Some(&child));
		}
	}

	/// Records `node` as subscribed, returning `false` if it already was.
	/// Entries for dropped layers are pruned, so a reused id starts fresh.
	fn track(&self, node: &Rc<dyn LanguageTree>) -> bool {
		let layer = Rc::downgrade(node);
		let mut subscribed = self.inner.subscribed.borrow_mut();
		if subscribed
			.get(&node.id())
			.is_some_and(|seen| seen.strong_count() > 0 && seen.ptr_eq(&layer))
		{
			return false;
		}
		subscribed.retain(|_, seen| seen.strong_count() > 0);
		subscribed.insert(node.id(), layer);
		true
	}

	#[cfg(test)]
	fn tracked(&self) -> usize {
		self.inner.subscribed.borrow().len()
	}

	fn scan(&self, ctx: &Context, node: &dyn LanguageTree) {
		let coordinator = &self.inner.coordinator;
		for language in node.injected_languages() {
			if coordinator.attempt(&language).is_some() {
				continue;
			}
			debug!(host = node.language(), injected = %language, "Discovered injected language");
			coordinator.ensure_installed(ctx, Some(&language));
		}
	}

	fn subscribe(&self, ctx: &Context, node: &Rc<dyn LanguageTree>) {
		let walker = self.clone();
		let layer = Rc::downgrade(node);
		let scan_ctx = ctx.clone();
		node.on_structure_changed(Box::new(move || {
			if let Some(layer) = layer.upgrade() {
				walker.scan(&scan_ctx, layer.as_ref());
			}
		}));

		let walker = self.clone();
		let child_ctx = ctx.clone();
		node.on_child_added(Box::new(move |child| {
			walker.discover(&child_ctx, Some(&child));
		}));
	}
}

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// In-memory [`LanguageTree`] for hosts without their own layer type.
///
/// Notifications raised from inside a listener are queued and delivered once
/// the current dispatch finishes, so every listener sees every event in order.
pub struct InjectionLayer {
	id: TreeId,
	language: String,
	injections: RefCell<Vec<String>>,
	children: RefCell<Vec<Rc<InjectionLayer>>>,
	structure_listeners: Listeners<()>,
	child_listeners: Listeners<Rc<dyn LanguageTree>>,
}

impl InjectionLayer {
	pub fn new<S: Into<String>>(language: impl Into<String>, injections: impl IntoIterator<Item = S>) -> Rc<Self> {
		Self::with_id(TreeId(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed)), language, injections)
	}

	/// Layer with a host-assigned id.
	pub fn with_id<S: Into<String>>(
		id: TreeId,
		language: impl Into<String>,
		injections: impl IntoIterator<Item = S>,
	) -> Rc<Self> {
		Rc::new(Self {
			id,
			language: language.into(),
			injections: RefCell::new(injections.into_iter().map(Into::into).collect()),
			children: RefCell::new(Vec::new()),
			structure_listeners: Listeners::default(),
			child_listeners: Listeners::default(),
		})
	}

	/// Replaces the declared injection targets and notifies subscribers.
	pub fn set_injections<S: Into<String>>(&self, injections: impl IntoIterator<Item = S>) {
		*self.injections.borrow_mut() = injections.into_iter().map(Into::into).collect();
		self.structure_listeners.emit(());
	}

	/// Appends a sub-layer and notifies subscribers.
	pub fn add_child(&self, child: Rc<InjectionLayer>) {
		self.children.borrow_mut().push(child.clone());
		self.child_listeners.emit(child as Rc<dyn LanguageTree>);
	}

	#[cfg(test)]
	fn listener_count(&self) -> (usize, usize) {
		(self.structure_listeners.len(), self.child_listeners.len())
	}
}

/// Listener list with a queue for events raised during dispatch.
struct Listeners<E> {
	listeners: RefCell<Vec<Box<dyn FnMut(E)>>>,
	queued: RefCell<VecDeque<E>>,
	dispatching: Cell<bool>,
}

impl<E> Default for Listeners<E> {
	fn default() -> Self {
		Self {
			listeners: RefCell::new(Vec::new()),
			queued: RefCell::new(VecDeque::new()),
			dispatching: Cell::new(false),
		}
	}
}

impl<E: Clone> Listeners<E> {
	fn push(&self, listener: Box<dyn FnMut(E)>) {
		self.listeners.borrow_mut().push(listener);
	}

	fn emit(&self, event: E) {
		self.queued.borrow_mut().push_back(event);
		if self.dispatching.replace(true) {
			return;
		}

		loop {
			let next = self.queued.borrow_mut().pop_front();
			let Some(event) = next else {
				break;
			};

			// Listeners are taken out while they run so they may register more
			let mut running = std::mem::take(&mut *self.listeners.borrow_mut());
			for listener in &mut running {
				listener(event.clone());
			}
			let mut current = self.listeners.borrow_mut();
			running.append(&mut current);
			*current = running;
		}

		self.dispatching.set(false);
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.listeners.borrow().len()
	}
}

impl LanguageTree for InjectionLayer {
	fn id(&self) -> TreeId {
		self.id
	}

	fn language(&self) -> &str {
		&self.language
	}

	fn injected_languages(&self) -> Vec<String> {
		self.injections.borrow().clone()
	}

	fn children(&self) -> Vec<Rc<dyn LanguageTree>> {
		self.children
			.borrow()
			.iter()
			.map(|c| c.clone() as Rc<dyn LanguageTree>)
			.collect()
	}

	fn on_structure_changed(&self, mut listener: StructureListener) {
		self.structure_listeners.push(Box::new(move |()| listener()));
	}

	fn on_child_added(&self, listener: ChildListener) {
		self.child_listeners.push(listener);
	}
}
