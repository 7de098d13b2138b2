//! Registry routing observations to the handler that stored their payload.

use crate::handler::ComplexObsHandler;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Priority for handlers that do not ask for precedence. Numerically lower
/// values take precedence, so this always loses against an explicit choice.
pub const LOWEST_PRIORITY: i32 = i32::MAX;

struct Registration {
	handler: Arc<dyn ComplexObsHandler>,
	priority: i32,
}

/// Maps handler-type tags to the adapter serving them.
///
/// Several adapters may claim the same tag (a site-specific image handler
/// shipping alongside the built-in one); the registration with the lowest
/// priority value wins and ties keep the earlier registration.
pub struct HandlerRegistry {
	handlers: HashMap<&'static str, Registration>,
}

impl HandlerRegistry {
	pub fn new() -> Self {
		Self {
			handlers: HashMap::new(),
		}
	}

	/// Registers `handler` at [`LOWEST_PRIORITY`].
	pub fn register(&mut self, handler: Arc<dyn ComplexObsHandler>) {
		self.register_with_priority(handler, LOWEST_PRIORITY);
	}

	/// Registers `handler` under its type tag with an explicit priority.
	pub fn register_with_priority(&mut self, handler: Arc<dyn ComplexObsHandler>, priority: i32) {
		let tag = handler.handler_type();
		if let Some(existing) = self.handlers.get(tag) {
			if existing.priority <= priority {
				info!(
					handler.tag = tag,
					handler.priority = priority,
					"Ignoring handler registration: tag is already bound at equal or higher precedence"
				);
				return;
			}
			info!(
				handler.tag = tag,
				handler.priority = priority,
				"Replacing handler registration"
			);
		} else {
			info!(
				handler.tag = tag,
				handler.priority = priority,
				"Registered handler"
			);
		}
		self.handlers.insert(tag, Registration { handler, priority });
	}

	/// The handler bound to `handler_type`, if any.
	pub fn get(&self, handler_type: &str) -> Option<Arc<dyn ComplexObsHandler>> {
		self.handlers
			.get(handler_type)
			.map(|registration| Arc::clone(&registration.handler))
	}

	pub fn has(&self, handler_type: &str) -> bool {
		self.handlers.contains_key(handler_type)
	}

	/// Tags with a bound handler, in arbitrary order.
	pub fn handler_types(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.handlers.keys().copied()
	}
}

impl Default for HandlerRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler::SaveError;
	use crate::obs::{ComplexContent, Obs};

	struct NullHandler {
		tag: &'static str,
	}

	impl ComplexObsHandler for NullHandler {
		fn save(&self, _obs: &mut Obs) -> Result<(), SaveError> {
			Ok(())
		}

		fn fetch(&self, _obs: &mut Obs, _view: &str) {}

		fn purge(&self, _obs: &mut Obs) -> bool {
			true
		}

		fn handler_type(&self) -> &'static str {
			self.tag
		}

		fn validate(&self, _handler_config: &str, _obs: &Obs) -> bool {
			true
		}

		fn raw_value(&self, _obs: &Obs) -> Option<ComplexContent> {
			None
		}
	}

	fn null_handler(tag: &'static str) -> Arc<dyn ComplexObsHandler> {
		Arc::new(NullHandler { tag })
	}

	#[test]
	fn routes_by_handler_type() {
		let mut registry = HandlerRegistry::new();
		registry.register(null_handler("ImageHandler"));
		registry.register(null_handler("TextHandler"));

		assert!(registry.has("ImageHandler"));
		assert!(!registry.has("MediaHandler"));
		assert_eq!(
			registry.get("TextHandler").map(|h| h.handler_type()),
			Some("TextHandler")
		);
		assert_eq!(registry.handler_types().count(), 2);
	}

	#[test]
	fn lower_priority_value_wins_the_tag() {
		let first = null_handler("ImageHandler");
		let second = null_handler("ImageHandler");

		let mut registry = HandlerRegistry::new();
		registry.register_with_priority(Arc::clone(&first), 10);
		registry.register_with_priority(Arc::clone(&second), 5);

		let bound = registry.get("ImageHandler").expect("bound handler");
		assert!(Arc::ptr_eq(&bound, &second));
	}

	#[test]
	fn ties_keep_the_earlier_registration() {
		let first = null_handler("ImageHandler");
		let second = null_handler("ImageHandler");

		let mut registry = HandlerRegistry::new();
		registry.register_with_priority(Arc::clone(&first), 5);
		registry.register_with_priority(Arc::clone(&second), 5);

		let bound = registry.get("ImageHandler").expect("bound handler");
		assert!(Arc::ptr_eq(&bound, &first));
	}

	#[test]
	fn default_registration_loses_to_an_explicit_priority() {
		let default = null_handler("ImageHandler");
		let preferred = null_handler("ImageHandler");

		let mut registry = HandlerRegistry::new();
		registry.register(Arc::clone(&default));
		registry.register_with_priority(Arc::clone(&preferred), 0);

		let bound = registry.get("ImageHandler").expect("bound handler");
		assert!(Arc::ptr_eq(&bound, &preferred));
	}
}
