//! Filtros de entradas de archivo.
//!
//! Un filtro es un predicado sobre `(ruta, es_directorio)`: se evalúa sin
//! leer bytes, igual para copiar entradas de un zip que para recorrer un
//! árbol de directorios. Las rutas usan `/` y no llevan barra final.

use regex::Regex;

use forge_core::CoreError;

pub trait EntryFilter: Send + Sync {
    fn includes(&self, path: &str, is_dir: bool) -> bool;
}

impl<F> EntryFilter for F where F: Fn(&str, bool) -> bool + Send + Sync
{
    fn includes(&self, path: &str, is_dir: bool) -> bool {
        self(path, is_dir)
    }
}

/// Acepta todo.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl EntryFilter for IncludeAll {
    fn includes(&self, _path: &str, _is_dir: bool) -> bool {
        true
    }
}

/// Patrones estilo Ant (`**`, `*`, `?`). Sin includes se incluye todo; los
/// excludes siempre ganan.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl PatternFilter {
    pub fn new<I, E, S, T>(includes: I, excludes: E) -> Result<Self, CoreError>
        where I: IntoIterator<Item = S>,
              E: IntoIterator<Item = T>,
              S: AsRef<str>,
              T: AsRef<str>
    {
        Ok(Self { includes: includes.into_iter().map(|p| compile(p.as_ref())).collect::<Result<_, _>>()?,
                  excludes: excludes.into_iter().map(|p| compile(p.as_ref())).collect::<Result<_, _>>()? })
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

impl EntryFilter for PatternFilter {
    fn includes(&self, path: &str, _is_dir: bool) -> bool {
        let path = path.trim_end_matches('/');
        if self.excludes.iter().any(|r| r.is_match(path)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|r| r.is_match(path))
    }
}

fn compile(pattern: &str) -> Result<Regex, CoreError> {
    Regex::new(&ant_to_regex(pattern)).map_err(|e| CoreError::Internal(format!("invalid pattern '{pattern}': {e}")))
}

/// Traduce un patrón Ant a una expresión regular anclada. Un patrón que
/// termina en `/` equivale a `<patrón>/**`.
pub fn ant_to_regex(pattern: &str) -> String {
    let mut pattern = pattern.trim_start_matches('/').to_string();
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                let followed_by_slash = chars.get(i + 2) == Some(&'/');
                if at_segment_start && followed_by_slash {
                    // `**/` cero o más directorios
                    out.push_str("(?:.*/)?");
                    i += 3;
                    continue;
                }
                if at_segment_start && i + 2 == chars.len() && i > 0 {
                    // `/**` final: el directorio y todo lo que contiene
                    out.pop();
                    out.push_str("(?:/.*)?");
                    i += 2;
                    continue;
                }
                out.push_str(".*");
                i += 2;
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    out.push('$');
    out
}
