use crate::model::story::StoryState;

/// Handle returned by [`StoryStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoryState)>;

/// Single-threaded observable holder of a [`StoryState`].
///
/// Every [`StoryStore::update`] runs the mutator and then calls each subscriber with the new
/// state, in subscription order.
pub struct StoryStore {
    state: StoryState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl Default for StoryStore {
    fn default() -> Self {
        Self::new(StoryState::default())
    }
}

impl StoryStore {
    /// Store holding `state`.
    pub fn new(state: StoryState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &StoryState {
        &self.state
    }

    /// Register a callback for every update.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoryState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Mutate the state and notify subscribers.
    pub fn update(&mut self, mutator: impl FnOnce(&mut StoryState)) {
        mutator(&mut self.state);
        for (_, cb) in &mut self.subscribers {
            cb(&self.state);
        }
    }

    /// Replace the whole state and notify subscribers.
    pub fn replace(&mut self, state: StoryState) {
        self.update(|s| *s = state);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for StoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/store.rs"]
mod tests;
