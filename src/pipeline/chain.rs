use super::handler::{Handler, Middleware};

/// Composes `middleware` around `terminal`.
///
/// `middleware[0]` is the outermost wrapper: it sees the request first and the
/// response last. An empty list hands back `terminal` unchanged.
pub fn chain(middleware: &[Middleware], terminal: Handler) -> Handler {
    middleware
        .iter()
        .rev()
        .fold(terminal, |next, wrap| wrap(next))
}

/// Reusable ordered list of middleware
#[derive(Clone, Default)]
pub struct Chain {
    middleware: Vec<Middleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware` as the innermost wrapper so far
    pub fn with(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn then(&self, terminal: Handler) -> Handler {
        chain(&self.middleware, terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::handler::{handler_fn, middleware_fn, Request};
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use axum::response::IntoResponse;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"), HeaderMap::new(), Bytes::new())
    }

    fn terminal(log: Log) -> Handler {
        handler_fn(move |_req| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push("handler".to_string());
                StatusCode::OK.into_response()
            }
        })
    }

    fn recording(name: &'static str, log: Log) -> Middleware {
        middleware_fn(move |next: Handler| {
            let log = log.clone();
            handler_fn(move |req| {
                let log = log.clone();
                let next = next.clone();
                async move {
                    log.lock().unwrap().push(format!("{name}:pre"));
                    let response = next(req).await;
                    log.lock().unwrap().push(format!("{name}:post"));
                    response
                }
            })
        })
    }

    fn short_circuit() -> Middleware {
        middleware_fn(|_next: Handler| {
            handler_fn(|_req| async { StatusCode::FORBIDDEN.into_response() })
        })
    }

    #[tokio::test]
    async fn test_empty_chain_returns_terminal() {
        let log: Log = Arc::default();
        let handler = terminal(log.clone());

        let composed = chain(&[], handler.clone());
        assert!(Arc::ptr_eq(&composed, &handler));

        let response = composed(request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn test_chain_runs_outer_to_inner() {
        let log: Log = Arc::default();
        let composed = chain(
            &[recording("a", log.clone()), recording("b", log.clone())],
            terminal(log.clone()),
        );

        composed(request()).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:pre", "b:pre", "handler", "b:post", "a:post"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_stages() {
        let log: Log = Arc::default();
        let composed = chain(
            &[recording("a", log.clone()), short_circuit(), recording("c", log.clone())],
            terminal(log.clone()),
        );

        let response = composed(request()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), vec!["a:pre", "a:post"]);
    }

    #[tokio::test]
    async fn test_chain_builder_matches_free_function() {
        let log: Log = Arc::default();
        let builder = Chain::new()
            .with(recording("a", log.clone()))
            .with(recording("b", log.clone()));

        builder.then(terminal(log.clone()))(request()).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:pre", "b:pre", "handler", "b:post", "a:post"]
        );
    }

    #[tokio::test]
    async fn test_composed_handler_is_reusable() {
        let log: Log = Arc::default();
        let composed = Chain::new()
            .with(recording("a", log.clone()))
            .then(terminal(log.clone()));

        composed(request()).await;
        composed(request()).await;

        assert_eq!(log.lock().unwrap().len(), 6);
    }
}
