//! Success payload shapes.
//!
//! [`Payload`] is the closed set of shapes a success response can carry.
//! Transformable resources implement [`JsonResource`]; [`Resource`] and
//! [`ResourceCollection`] add the `additional` / `with` mappings and the
//! response hook the pipeline invokes after the response is built.

use std::fmt;

use axum::response::Response;
use envelope_core::error::CoreError;
use envelope_core::pagination::Page;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::request::RequestContext;

/// A domain object that knows how to present itself as a JSON mapping.
pub trait JsonResource: Send + Sync {
    /// The serialized form of the resource.
    fn resolve(&self, request: &RequestContext) -> Map<String, Value>;

    /// Top-level keys merged next to the resolved form.
    fn with(&self, _request: &RequestContext) -> Map<String, Value> {
        Map::new()
    }

    /// The unformatted domain object, exposed on the response as
    /// [`OriginalData`].
    fn original(&self) -> Value {
        Value::Null
    }

    /// Last chance to adjust the outgoing response (headers, extensions).
    fn with_response(&self, _request: &RequestContext, _response: &mut Response) {}
}

/// The unformatted domain object(s) behind a resource response, stored in
/// the response extensions for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalData(pub Value);

type ResponseHook = Box<dyn Fn(&RequestContext, &mut Response) + Send + Sync>;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A single resource plus caller-supplied `additional` keys.
pub struct Resource {
    inner: Box<dyn JsonResource>,
    additional: Map<String, Value>,
}

impl Resource {
    pub fn new<R: JsonResource + 'static>(resource: R) -> Self {
        Self {
            inner: Box::new(resource),
            additional: Map::new(),
        }
    }

    /// Extra top-level keys merged after the resolved form and `with`.
    pub fn additional(mut self, additional: Map<String, Value>) -> Self {
        self.additional = additional;
        self
    }

    pub(crate) fn resolve_parts(&self, request: &RequestContext) -> [Map<String, Value>; 3] {
        [
            self.inner.resolve(request),
            self.inner.with(request),
            self.additional.clone(),
        ]
    }

    pub(crate) fn original(&self) -> Value {
        self.inner.original()
    }

    pub(crate) fn with_response(&self, request: &RequestContext, response: &mut Response) {
        self.inner.with_response(request, response);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("original", &self.inner.original())
            .field("additional", &self.additional)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ResourceCollection
// ---------------------------------------------------------------------------

/// Many resources rendered under the configured collection field.
pub struct ResourceCollection {
    items: Vec<Box<dyn JsonResource>>,
    with: Map<String, Value>,
    additional: Map<String, Value>,
    pagination: Option<Map<String, Value>>,
    hook: Option<ResponseHook>,
}

impl ResourceCollection {
    pub fn new<R, I>(items: I) -> Self
    where
        R: JsonResource + 'static,
        I: IntoIterator<Item = R>,
    {
        Self {
            items: items
                .into_iter()
                .map(|r| Box::new(r) as Box<dyn JsonResource>)
                .collect(),
            with: Map::new(),
            additional: Map::new(),
            pagination: None,
            hook: None,
        }
    }

    /// Collect a page of resources; the page metadata is rendered in the
    /// meta block.
    pub fn from_page<R: JsonResource + 'static>(page: Page<R>) -> Self {
        let pagination = page.meta();
        let mut collection = Self::new(page.into_items());
        collection.pagination = Some(pagination);
        collection
    }

    /// Collection-level keys merged after the item list.
    pub fn with(mut self, with: Map<String, Value>) -> Self {
        self.with = with;
        self
    }

    pub fn additional(mut self, additional: Map<String, Value>) -> Self {
        self.additional = additional;
        self
    }

    /// Hook invoked with the final response.
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestContext, &mut Response) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn resolve_items(&self, request: &RequestContext) -> Vec<Value> {
        self.items
            .iter()
            .map(|item| Value::Object(item.resolve(request)))
            .collect()
    }

    pub(crate) fn with_map(&self) -> Map<String, Value> {
        self.with.clone()
    }

    pub(crate) fn additional_map(&self) -> Map<String, Value> {
        self.additional.clone()
    }

    pub(crate) fn pagination(&self) -> Option<&Map<String, Value>> {
        self.pagination.as_ref()
    }

    pub(crate) fn originals(&self) -> Value {
        Value::Array(self.items.iter().map(|item| item.original()).collect())
    }

    pub(crate) fn with_response(&self, request: &RequestContext, response: &mut Response) {
        if let Some(hook) = &self.hook {
            hook(request, response);
        }
    }
}

impl fmt::Debug for ResourceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCollection")
            .field("items", &self.items.len())
            .field("with", &self.with)
            .field("additional", &self.additional)
            .field("pagination", &self.pagination)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Every shape a success response accepts, in dispatch precedence order.
#[derive(Debug)]
pub enum Payload {
    Collection(ResourceCollection),
    /// A full paginator descriptor (items under `data`).
    Paginated(Map<String, Value>),
    Resource(Resource),
    /// Output of a `Serialize` conversion.
    Serializable(Value),
    Raw(Value),
    Empty,
}

impl Payload {
    /// Convert any serializable value into its JSON mapping.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CoreError> {
        Ok(Self::Serializable(serde_json::to_value(value)?))
    }

    /// Use a page's full descriptor.
    pub fn paginated<T: Serialize>(page: &Page<T>) -> Result<Self, CoreError> {
        Ok(Self::Paginated(page.descriptor()?))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            other => Self::Raw(other),
        }
    }
}

impl From<Option<Value>> for Payload {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Empty, Self::from)
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<Resource> for Payload {
    fn from(resource: Resource) -> Self {
        Self::Resource(resource)
    }
}

impl From<ResourceCollection> for Payload {
    fn from(collection: ResourceCollection) -> Self {
        Self::Collection(collection)
    }
}
