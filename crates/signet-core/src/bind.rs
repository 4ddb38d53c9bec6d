//! The validator/binder.

use indexmap::IndexMap;

use crate::bundle::SchemaBundle;
use crate::error::ValidationError;
use crate::location::Location;
use crate::schema::CompositeSchema;
use crate::validate::{KeyStyle, Validation};
use crate::value::{BoundArgs, BoundValue, RawBody, RawData, RawLocations};

/// Validates each location present in `bundle` in binding order, then
/// merges the results into keyword arguments.
///
/// Failures from all locations are aggregated; nothing is bound unless
/// every location validates. Synthesized schemas contribute their fields
/// individually, so later locations overwrite same-named fields from
/// earlier ones. Exclusive schemas contribute one object under the
/// parameter recorded in the bundle's exclusive map.
///
/// # Errors
///
/// [`ValidationError`] carrying every failure.
pub fn bind(bundle: &SchemaBundle, raw: &RawLocations) -> Result<BoundArgs, ValidationError> {
    let empty = RawData::new();
    let mut validation = Validation::new();
    let mut validated: Vec<(&CompositeSchema, IndexMap<String, BoundValue>)> = Vec::new();

    for location in Location::ALL {
        let Some(schema) = bundle.schema(location) else {
            continue;
        };
        let style = KeyStyle::for_location(location);
        let data = match (location, raw.body()) {
            (Location::Body, Some(RawBody::Other(_))) => {
                validation.root_error("type_error.dict", "value is not a valid dict");
                continue;
            }
            (Location::Body, Some(RawBody::Malformed(message))) => {
                validation.root_error("value_error.jsondecode", message.clone());
                continue;
            }
            _ => raw.get(location).unwrap_or(&empty),
        };
        let fields = validation.fields(schema, data, style);
        validated.push((schema, fields));
    }

    if validation.error_count() > 0 {
        let errors = validation.into_errors();
        tracing::debug!(errors = errors.len(), "request binding failed");
        return Err(ValidationError::new(errors));
    }

    let mut args = BoundArgs::new();
    for (schema, fields) in validated {
        match bundle.exclusive_bindings().get(schema.id()) {
            Some(param) => args.insert(param, BoundValue::object(fields)),
            None => {
                for (name, value) in fields {
                    args.insert(name, value);
                }
            }
        }
    }
    Ok(args)
}
