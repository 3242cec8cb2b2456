//! Fetch-state machine for view-facing queries.
//!
//! Each query key (a location + unit selection) owns an explicit state
//! instead of ad-hoc loading/error booleans. Responses are applied through a
//! token issued at request start; a token from a superseded request is
//! discarded, so a slow response for an old selection can never overwrite
//! newer state.

/// State of one query as consumed by rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Proof that a resolution belongs to a specific `begin` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken<K> {
    key: K,
    generation: u64,
}

impl<K> RequestToken<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// Per-query state keyed by request parameters.
#[derive(Debug)]
pub struct QueryState<K, T> {
    active: Option<K>,
    generation: u64,
    state: FetchState<T>,
}

impl<K, T> Default for QueryState<K, T> {
    fn default() -> Self {
        Self {
            active: None,
            generation: 0,
            state: FetchState::Idle,
        }
    }
}

impl<K: Clone + PartialEq, T> QueryState<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for rendering.
    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Key of the active selection, if any.
    pub fn active_key(&self) -> Option<&K> {
        self.active.as_ref()
    }

    /// Start a fetch for `key`. Supersedes any in-flight request: tokens from
    /// earlier `begin` calls will no longer resolve.
    pub fn begin(&mut self, key: K) -> RequestToken<K> {
        self.generation += 1;
        self.active = Some(key.clone());
        self.state = FetchState::Loading;
        RequestToken {
            key,
            generation: self.generation,
        }
    }

    /// Apply a fetch result. Returns false (and changes nothing) when the
    /// token belongs to a superseded request.
    pub fn resolve(&mut self, token: &RequestToken<K>, result: Result<T, String>) -> bool {
        if token.generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(data) => FetchState::Success(data),
            Err(message) => FetchState::Error(message),
        };
        true
    }

    /// Drop back to idle (e.g. the view unmounted).
    pub fn reset(&mut self) {
        self.generation += 1;
        self.active = None;
        self.state = FetchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begins_in_idle() {
        let q: QueryState<&str, u32> = QueryState::new();
        assert_eq!(*q.state(), FetchState::Idle);
        assert!(q.active_key().is_none());
    }

    #[test]
    fn begin_moves_to_loading() {
        let mut q: QueryState<&str, u32> = QueryState::new();
        let _token = q.begin("berlin/celsius");
        assert!(q.state().is_loading());
        assert_eq!(q.active_key(), Some(&"berlin/celsius"));
    }

    #[test]
    fn resolve_success_stores_data() {
        let mut q: QueryState<&str, u32> = QueryState::new();
        let token = q.begin("berlin/celsius");
        assert!(q.resolve(&token, Ok(21)));
        assert_eq!(q.state().data(), Some(&21));
    }

    #[test]
    fn resolve_error_stores_message() {
        let mut q: QueryState<&str, u32> = QueryState::new();
        let token = q.begin("berlin/celsius");
        assert!(q.resolve(&token, Err("timeout".into())));
        assert_eq!(q.state().error(), Some("timeout"));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut q: QueryState<&str, u32> = QueryState::new();
        let old = q.begin("berlin/celsius");
        let new = q.begin("lisbon/celsius");

        // The response for the old selection arrives late
        assert!(!q.resolve(&old, Ok(5)));
        assert!(q.state().is_loading());

        assert!(q.resolve(&new, Ok(17)));
        assert_eq!(q.state().data(), Some(&17));
        assert_eq!(q.active_key(), Some(&"lisbon/celsius"));
    }

    #[test]
    fn unit_change_supersedes_in_flight_fetch() {
        let mut q: QueryState<(&str, &str), u32> = QueryState::new();
        let celsius = q.begin(("berlin", "celsius"));
        let fahrenheit = q.begin(("berlin", "fahrenheit"));

        assert!(!q.resolve(&celsius, Ok(20)));
        assert!(q.resolve(&fahrenheit, Ok(68)));
        assert_eq!(q.state().data(), Some(&68));
    }

    #[test]
    fn reset_invalidates_tokens() {
        let mut q: QueryState<&str, u32> = QueryState::new();
        let token = q.begin("berlin/celsius");
        q.reset();
        assert!(!q.resolve(&token, Ok(3)));
        assert_eq!(*q.state(), FetchState::Idle);
    }
}
