use core::any::Any;
use std::collections::HashMap;

use super::TypeHandle;

const TYPE_ARGUMENTS: &str = "typearguments";

/// A case-insensitive property bag threaded through every binder of one bind.
///
/// Keys are lowercased on every access. Values may be of any `'static` type
/// and are looked up by key and type together. Custom binders can open a
/// scope for the duration of a nested bind; entries of inner scopes shadow
/// outer ones and vanish with [`BindContext::pop_scope`].
///
/// # Examples
///
/// ```
/// use sweetjson::BindContext;
///
/// let mut context = BindContext::new();
/// context.put("Locale", String::from("fr"));
/// assert_eq!(context.peek::<String>("LOCALE").map(String::as_str), Some("fr"));
/// assert!(context.peek::<i32>("locale").is_none());
/// ```
#[derive(Debug)]
pub struct BindContext {
    scopes: Vec<HashMap<String, Box<dyn Any>>>,
}

impl Default for BindContext {
    fn default() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }
}

impl BindContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context carrying `type_arguments` for a custom binder to read back
    /// with [`BindContext::take_type_arguments`].
    #[must_use]
    pub fn with_type_arguments(type_arguments: Vec<TypeHandle>) -> Self {
        let mut context = Self::new();
        context.put(TYPE_ARGUMENTS, type_arguments);
        context
    }

    /// Stores `value` under `key` in the innermost scope.
    pub fn put<V: Any>(&mut self, key: &str, value: V) -> &mut Self {
        self.innermost().insert(key.to_lowercase(), Box::new(value));
        self
    }

    /// The innermost `V` stored under `key`.
    #[must_use]
    pub fn peek<V: Any>(&self, key: &str) -> Option<&V> {
        let key = key.to_lowercase();
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&key))
            .and_then(|value| value.downcast_ref())
    }

    /// Removes and returns the innermost entry under `key` if it holds a `V`.
    /// An entry of another type is left in place.
    pub fn take<V: Any>(&mut self, key: &str) -> Option<V> {
        let key = key.to_lowercase();
        let scope = self.scopes.iter_mut().rev().find(|scope| scope.contains_key(&key))?;
        let value = scope.remove(&key)?;
        match value.downcast::<V>() {
            Ok(value) => Some(*value),
            Err(value) => {
                scope.insert(key, value);
                None
            }
        }
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.scopes.iter().any(|scope| scope.contains_key(&key))
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drops the innermost scope and its entries. The base scope is never
    /// dropped; popping it only clears it.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            self.innermost().clear();
        }
    }

    #[must_use]
    pub fn has_type_arguments(&self) -> bool {
        self.peek::<Vec<TypeHandle>>(TYPE_ARGUMENTS).is_some()
    }

    pub fn take_type_arguments(&mut self) -> Option<Vec<TypeHandle>> {
        self.take(TYPE_ARGUMENTS)
    }

    fn innermost(&mut self) -> &mut HashMap<String, Box<dyn Any>> {
        if self.scopes.is_empty() {
            self.scopes.push(HashMap::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
