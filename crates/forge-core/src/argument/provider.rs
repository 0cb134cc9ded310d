//! Valores diferidos (`Provider`).
//!
//! Un `Provider<T>` envuelve una función pura que produce un valor la primera
//! vez que se lee. El resultado (valor o error) se memoriza, de modo que
//! leer varias veces, o desde varios hilos a la vez, devuelve siempre lo
//! mismo. No hay estado global: cada provider pertenece a quien lo construye
//! (normalmente los argumentos de un step dentro de una sesión de build).

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::errors::CoreError;

type Producer<T> = Box<dyn Fn() -> Result<T, CoreError> + Send + Sync>;

struct ProviderInner<T> {
    producer: Producer<T>,
    memo: OnceCell<Result<T, CoreError>>,
}

/// Valor perezoso, memorizado y compartible entre hilos.
pub struct Provider<T> {
    inner: Arc<ProviderInner<T>>,
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Provider<T> where T: Clone + Send + Sync + 'static
{
    /// Provider ya resuelto.
    pub fn of(value: T) -> Self {
        let memo = OnceCell::new();
        let _ = memo.set(Ok(value.clone()));
        Self { inner: Arc::new(ProviderInner { producer: Box::new(move || Ok(value.clone())),
                                               memo }) }
    }

    /// Provider calculado en la primera lectura.
    pub fn from_fn<F>(producer: F) -> Self
        where F: Fn() -> Result<T, CoreError> + Send + Sync + 'static
    {
        Self { inner: Arc::new(ProviderInner { producer: Box::new(producer),
                                               memo: OnceCell::new() }) }
    }

    /// Resuelve el valor. Idempotente: la función se invoca como mucho una vez.
    pub fn get(&self) -> Result<T, CoreError> {
        self.inner.memo.get_or_init(|| (self.inner.producer)()).clone()
    }

    /// `true` si el valor ya fue calculado.
    pub fn is_resolved(&self) -> bool {
        self.inner.memo.get().is_some()
    }

    /// Deriva un provider nuevo que aplica `f` sobre el valor resuelto.
    pub fn map<U, F>(&self, f: F) -> Provider<U>
        where U: Clone + Send + Sync + 'static,
              F: Fn(T) -> U + Send + Sync + 'static
    {
        let upstream = self.clone();
        Provider::from_fn(move || upstream.get().map(&f))
    }
}

impl<T> From<T> for Provider<T> where T: Clone + Send + Sync + 'static
{
    fn from(value: T) -> Self {
        Provider::of(value)
    }
}

impl From<&str> for Provider<String> {
    fn from(value: &str) -> Self {
        Provider::of(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.memo.get() {
            Some(Ok(v)) => f.debug_tuple("Provider").field(v).finish(),
            Some(Err(e)) => f.debug_tuple("Provider").field(e).finish(),
            None => f.write_str("Provider(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn producer_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let p = Provider::from_fn(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok("1.21.1".to_string())
        });
        assert!(!p.is_resolved());
        assert_eq!(p.get().unwrap(), "1.21.1");
        assert_eq!(p.clone().get().unwrap(), "1.21.1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_reads_agree() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let p = Provider::from_fn(move || Ok(c.fetch_add(1, Ordering::SeqCst)));
        let handles: Vec<_> = (0..8).map(|_| {
                                        let p = p.clone();
                                        std::thread::spawn(move || p.get().unwrap())
                                    })
                                    .collect();
        let values: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(values.iter().all(|v| *v == values[0]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn map_is_lazy_and_propagates_errors() {
        let failing: Provider<String> = Provider::from_fn(|| Err(CoreError::Internal("no version".into())));
        let mapped = failing.map(|v| format!("{v}-client"));
        assert!(!mapped.is_resolved());
        assert_eq!(mapped.get().unwrap_err(), CoreError::Internal("no version".into()));
    }
}
