use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Failures raised by the actor machinery itself, independent of any domain.
///
/// Every domain error type converts from this, so clients can use `?` on
/// [`ResourceClient`] results directly.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// What happened to a record, passed to [`Entity::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Updated,
    Deleted,
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Sync + Debug + 'static;
    type Patch: Send + Sync + Debug + 'static;

    // --- Custom Actions ---
    type Action: Send + Sync + Debug + 'static;
    type ActionResult: Send + Sync + Debug + 'static;

    type Error: From<FrameworkError> + Send + Sync + Debug + 'static;

    /// Human readable name used in not-found errors.
    const KIND: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;

    // --- Store Hooks ---

    /// Rejects `self` if it collides with `other`, an already stored record.
    ///
    /// Runs inside the actor before a create, update or action is committed.
    fn check_conflict(&self, _other: &Self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Adjusts sibling records after `changed` was committed or removed.
    fn reconcile(_store: &mut HashMap<Self::Id, Self>, _changed: &Self, _change: Change) {}
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.act(id, action));
                }
            }
        }
    }

    fn create(&mut self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params)?;
        item.on_create()?;
        self.ensure_unique(&item)?;
        self.commit(item, Change::Created);
        Ok(id)
    }

    fn update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let mut candidate = self.checkout(&id)?;
        candidate.on_update(patch)?;
        self.ensure_unique(&candidate)?;
        Ok(self.commit(candidate, Change::Updated))
    }

    fn delete(&mut self, id: T::Id) -> Result<(), T::Error> {
        self.checkout(&id)?.on_delete()?;
        if let Some(removed) = self.store.remove(&id) {
            T::reconcile(&mut self.store, &removed, Change::Deleted);
        }
        Ok(())
    }

    fn act(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let mut candidate = self.checkout(&id)?;
        let result = candidate.handle_action(action)?;
        self.ensure_unique(&candidate)?;
        self.commit(candidate, Change::Updated);
        Ok(result)
    }

    /// Copies a stored record so hooks can fail without touching the store.
    fn checkout(&self, id: &T::Id) -> Result<T, T::Error> {
        self.store.get(id).cloned().ok_or_else(|| {
            FrameworkError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            }
            .into()
        })
    }

    fn ensure_unique(&self, candidate: &T) -> Result<(), T::Error> {
        self.store
            .values()
            .filter(|other| other.id() != candidate.id())
            .try_for_each(|other| candidate.check_conflict(other))
    }

    fn commit(&mut self, item: T, change: Change) -> T {
        let id = item.id().clone();
        self.store.insert(id.clone(), item.clone());
        T::reconcile(&mut self.store, &item, change);
        self.store.get(&id).cloned().unwrap_or(item)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    /// False once the actor has stopped receiving requests.
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), T::Error> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }
}

/// Implements `From<FrameworkError>` for a domain error enum that has
/// `NotFound(String)` and `ActorCommunicationError(String)` variants.
#[macro_export]
macro_rules! impl_from_framework_error {
    ($error:ty) => {
        impl From<$crate::actor_framework::FrameworkError> for $error {
            fn from(err: $crate::actor_framework::FrameworkError) -> Self {
                match err {
                    $crate::actor_framework::FrameworkError::NotFound { kind, id } => {
                        Self::NotFound(format!("{} '{}'", kind, id))
                    }
                    other => Self::ActorCommunicationError(other.to_string()),
                }
            }
        }
    };
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
