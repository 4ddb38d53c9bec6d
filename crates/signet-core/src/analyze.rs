//! The signature analyzer and its out-of-band registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::bundle::{ExclusiveBindingMap, SchemaBundle};
use crate::error::DeclarationError;
use crate::handler::{Function, Handler, HandlerId};
use crate::location::Location;
use crate::schema::{CompositeSchema, FieldSpec, FieldType};
use crate::signature::{Annotation, Signature};

/// Derives the schema bundle of one signature.
///
/// Injected parameters and parameters without a location marker are
/// skipped. Exclusive markers adopt the parameter's composite annotation
/// as the location's schema; every other marker contributes one field to
/// a synthesized schema named `<handler>_<location>`.
///
/// # Errors
///
/// [`DeclarationError::ExclusiveAnnotation`] when an exclusive parameter
/// is not annotated with a composite type, and
/// [`DeclarationError::ExclusiveConflict`] when an exclusive marker shares
/// its location with any other marker.
pub fn analyze_signature(
    handler: &str,
    signature: &Signature,
) -> Result<SchemaBundle, DeclarationError> {
    let mut pending: IndexMap<Location, Vec<FieldSpec>> = IndexMap::new();
    let mut adopted: IndexMap<Location, CompositeSchema> = IndexMap::new();
    let mut exclusive = ExclusiveBindingMap::new();

    let conflict = |location: Location| DeclarationError::ExclusiveConflict {
        handler: handler.to_string(),
        location,
    };

    for param in signature.params() {
        if param.kind().is_injected() {
            continue;
        }
        let Some(marker) = param.marker() else {
            continue;
        };
        let location = marker.location();

        if marker.is_exclusive() {
            let Some(Annotation::Composite(schema)) = param.annotation() else {
                return Err(DeclarationError::ExclusiveAnnotation {
                    handler: handler.to_string(),
                    param: param.name().to_string(),
                });
            };
            if pending.contains_key(&location) || adopted.contains_key(&location) {
                return Err(conflict(location));
            }
            exclusive.insert(schema.id(), param.name());
            adopted.insert(location, schema.clone());
            continue;
        }

        if adopted.contains_key(&location) {
            return Err(conflict(location));
        }
        let ty = param
            .annotation()
            .map_or(FieldType::Any, Annotation::field_type);
        let mut field = FieldSpec::new(param.name(), ty)
            .with_default(marker.default().clone())
            .constraints(marker.constraints().clone());
        if let Some(alias) = marker.alias() {
            field = field.alias(alias);
        }
        if let Some(title) = marker.title() {
            field = field.title(title);
        }
        if let Some(description) = marker.description() {
            field = field.description(description);
        }
        pending.entry(location).or_default().push(field);
    }

    let mut parameters = IndexMap::new();
    let mut request_body = None;
    for location in Location::ALL {
        let schema = match (adopted.shift_remove(&location), pending.shift_remove(&location)) {
            (Some(schema), _) => schema,
            (None, Some(fields)) => CompositeSchema::synthesized(format!("{handler}_{location}"), fields),
            (None, None) => continue,
        };
        if location == Location::Body {
            request_body = Some(schema);
        } else {
            parameters.insert(location, schema);
        }
    }

    Ok(SchemaBundle::new(parameters, request_body, exclusive))
}

/// Cached schema bundles keyed by handler identity.
///
/// Filled once at startup, then shared read-only. Analysis is idempotent:
/// re-analyzing a handler returns the cached bundle.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    bundles: HashMap<HandlerId, Arc<SchemaBundle>>,
    method_sets: HashSet<HandlerId>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes a handler; method sets are analyzed member by member and
    /// then marked as done as a whole.
    ///
    /// # Errors
    ///
    /// The first [`DeclarationError`] found.
    pub fn analyze<E>(&mut self, handler: &Handler<E>) -> Result<(), DeclarationError> {
        match handler {
            Handler::Function(function) => self.analyze_function(function).map(|_| ()),
            Handler::MethodSet(set) => {
                if self.method_sets.contains(&set.id()) {
                    trace!(handler = set.name(), "method set already analyzed");
                    return Ok(());
                }
                for (_, function) in set.functions() {
                    self.analyze_function(function)?;
                }
                self.method_sets.insert(set.id());
                Ok(())
            }
        }
    }

    /// Analyzes one function, or returns its cached bundle.
    ///
    /// # Errors
    ///
    /// See [`analyze_signature`].
    pub fn analyze_function<E>(
        &mut self,
        function: &Function<E>,
    ) -> Result<Arc<SchemaBundle>, DeclarationError> {
        if let Some(bundle) = self.bundles.get(&function.id()) {
            trace!(handler = function.name(), "schema bundle cache hit");
            return Ok(Arc::clone(bundle));
        }
        let bundle = Arc::new(analyze_signature(function.name(), function.signature())?);
        debug!(
            handler = function.name(),
            locations = bundle.locations().count(),
            exclusive = bundle.exclusive_bindings().len(),
            "analyzed handler signature"
        );
        self.bundles.insert(function.id(), Arc::clone(&bundle));
        Ok(bundle)
    }

    /// The cached bundle of a function. Never triggers analysis.
    pub fn bundle(&self, id: HandlerId) -> Option<&Arc<SchemaBundle>> {
        self.bundles.get(&id)
    }

    /// Returns true when every function of `handler` has a bundle.
    pub fn is_analyzed<E>(&self, handler: &Handler<E>) -> bool {
        match handler {
            Handler::Function(function) => self.bundles.contains_key(&function.id()),
            Handler::MethodSet(set) => self.method_sets.contains(&set.id()),
        }
    }

    /// Number of analyzed functions.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns true when nothing was analyzed.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
