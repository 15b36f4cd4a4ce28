//! Option-based construction of test objects
//!
//! An option is a mutation applied to a freshly defaulted object. [`build`]
//! applies a list of options in order; a [`Builder`] accumulates options so
//! several objects can share a common prefix.
//!
//! ```rust
//! use hive_testing::clusterdeployment::{self, installed, with_label};
//!
//! let base = clusterdeployment::full_builder("hive", "cd-1", &hive_testing::apis::registry())
//!     .options([with_label("env", "prod")]);
//!
//! let cd = base.build([installed()]);
//! assert!(cd.spec.installed);
//! assert!(!base.build([]).spec.installed);
//! ```

use crate::generic::{self, GenericObject, GenericOption};
use crate::registry::ObjectTypeRegistry;
use std::fmt;
use std::sync::Arc;

/// A mutation applied to an object of type `K` while it is built.
pub type BuildOption<K> = Arc<dyn Fn(&mut K) + Send + Sync>;

/// Build an object by applying each option, in order, to `K::default()`.
pub fn build<K, I>(opts: I) -> K
where
    K: Default,
    I: IntoIterator<Item = BuildOption<K>>,
{
    let mut obj = K::default();
    for opt in opts {
        opt(&mut obj);
    }
    obj
}

/// Adapt a resource-agnostic option to an option for `K`.
pub fn generic<K>(opt: GenericOption) -> BuildOption<K>
where
    K: GenericObject + 'static,
{
    Arc::new(move |obj: &mut K| opt(obj as &mut dyn GenericObject))
}

/// An immutable accumulator of options.
///
/// [`Builder::options`] and [`Builder::generic_options`] return a new builder
/// and leave the receiver untouched, so sibling builders derived from the same
/// parent never see each other's options.
pub struct Builder<K> {
    options: Vec<BuildOption<K>>,
}

impl<K> Builder<K>
where
    K: GenericObject + Default + 'static,
{
    /// A builder with no options.
    pub fn basic() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// A builder pre-seeded with type metadata, resource version "1",
    /// namespace and name.
    pub fn full(
        namespace: impl Into<String>,
        name: impl Into<String>,
        registry: &ObjectTypeRegistry,
    ) -> Self {
        Self::basic().generic_options([
            generic::with_type_meta(registry),
            generic::with_resource_version("1"),
            generic::with_namespace(namespace),
            generic::with_name(name),
        ])
    }

    /// Build an object from the accumulated options followed by `extra`.
    pub fn build<I>(&self, extra: I) -> K
    where
        I: IntoIterator<Item = BuildOption<K>>,
    {
        build(self.options.iter().cloned().chain(extra))
    }

    /// A new builder with `extra` appended to the accumulated options.
    pub fn options<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = BuildOption<K>>,
    {
        let mut options = self.options.clone();
        options.extend(extra);
        Self { options }
    }

    /// Like [`Builder::options`], for resource-agnostic options.
    pub fn generic_options<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = GenericOption>,
    {
        self.options(extra.into_iter().map(generic::<K>))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<K> Clone for Builder<K> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
        }
    }
}

impl<K> fmt::Debug for Builder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("options", &self.options.len())
            .finish()
    }
}
