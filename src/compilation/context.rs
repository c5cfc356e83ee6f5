//! URI scope tracking during compilation.
//!
//! A stack of absolute document URIs introduced by nested `id` keywords,
//! together with the JSON-pointer fragment of the current position inside
//! the innermost document. The top of the stack is the base both for `$ref`
//! resolution and for registering subschemas in the URI resolver.
//!
//! Before an `id` push:
//!    scope = `http://example.com/`
//!    resolve("#/definitions/foo") -> `http://example.com/#/definitions/foo`
//! After pushing `{"id": "folder/", ...}`:
//!    scope = `http://example.com/folder/`
//!    resolve("#/definitions/foo") -> `http://example.com/folder/#/definitions/foo`
use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

/// Base URI for documents that do not declare an `id` of their own.
pub(crate) const DEFAULT_ROOT_URL: &str = "json-schema:///";

struct ScopeFrame {
    document: Url,
    fragment: String,
    saved: Vec<usize>,
}

pub(crate) struct UriScope {
    scopes: Vec<ScopeFrame>,
}

impl UriScope {
    pub(crate) fn new(root: Url) -> UriScope {
        UriScope {
            scopes: vec![frame_for(root)],
        }
    }

    /// Enter the scope of an `id`. The URL must already be absolute; nested
    /// relative `id`s are resolved against the current scope beforehand.
    pub(crate) fn push_id(&mut self, id: &Url) {
        self.scopes.push(frame_for(id.clone()));
    }

    pub(crate) fn pop_id(&mut self) {
        self.scopes.pop();
    }

    /// Descend into a named subschema, extending the pointer fragment.
    pub(crate) fn push_chunk(&mut self, chunk: &str) {
        let frame = self.top_mut();
        frame.saved.push(frame.fragment.len());
        frame.fragment.push('/');
        // JSON pointer escaping.
        for ch in chunk.chars() {
            match ch {
                '~' => frame.fragment.push_str("~0"),
                '/' => frame.fragment.push_str("~1"),
                _ => frame.fragment.push(ch),
            }
        }
    }

    /// Descend into a positional subschema (`items`, combinator lists).
    pub(crate) fn push_index(&mut self, index: usize) {
        let frame = self.top_mut();
        frame.saved.push(frame.fragment.len());
        frame.fragment.push('/');
        itoa::fmt(&mut frame.fragment, index).expect("writing to a string cannot fail");
    }

    pub(crate) fn pop_chunk(&mut self) {
        let frame = self.top_mut();
        if let Some(length) = frame.saved.pop() {
            frame.fragment.truncate(length);
        }
    }

    /// Resolve a reference against the current scope.
    pub(crate) fn resolve(&self, reference: &str) -> Result<Url, ParseError> {
        Url::options()
            .base_url(Some(&self.top().document))
            .parse(reference)
    }

    /// Canonical registration key for the current position.
    pub(crate) fn key(&self) -> String {
        let frame = self.top();
        format!("{}#{}", frame.document, frame.fragment)
    }

    /// Canonical key for an absolute URL: fragment-less document, `#`, then
    /// the percent-decoded fragment.
    pub(crate) fn key_of(url: &Url) -> String {
        let fragment = percent_decode_str(url.fragment().unwrap_or(""))
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| url.fragment().unwrap_or("").to_string());
        let mut document = url.clone();
        document.set_fragment(None);
        format!("{}#{}", document, fragment)
    }

    fn top(&self) -> &ScopeFrame {
        self.scopes.last().expect("the root scope is never popped")
    }

    fn top_mut(&mut self) -> &mut ScopeFrame {
        self.scopes
            .last_mut()
            .expect("the root scope is never popped")
    }
}

fn frame_for(url: Url) -> ScopeFrame {
    let fragment = percent_decode_str(url.fragment().unwrap_or(""))
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| url.fragment().unwrap_or("").to_string());
    let mut document = url;
    document.set_fragment(None);
    ScopeFrame {
        document,
        fragment,
        saved: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> UriScope {
        UriScope::new(Url::parse(DEFAULT_ROOT_URL).unwrap())
    }

    #[test]
    fn root_key() {
        assert_eq!(root().key(), "json-schema:///#");
    }

    #[test]
    fn chunks_form_a_pointer() {
        let mut scope = root();
        scope.push_chunk("definitions");
        scope.push_chunk("a/b~c");
        assert_eq!(scope.key(), "json-schema:///#/definitions/a~1b~0c");
        scope.pop_chunk();
        scope.push_index(3);
        assert_eq!(scope.key(), "json-schema:///#/definitions/3");
        scope.pop_chunk();
        scope.pop_chunk();
        assert_eq!(scope.key(), "json-schema:///#");
    }

    #[test]
    fn id_switches_the_document() {
        let mut scope = UriScope::new(Url::parse("http://example.com/root.json").unwrap());
        scope.push_chunk("definitions");
        let id = scope.resolve("folder/").unwrap();
        scope.push_id(&id);
        assert_eq!(scope.key(), "http://example.com/folder/#");
        scope.push_chunk("items");
        assert_eq!(scope.key(), "http://example.com/folder/#/items");
        scope.pop_chunk();
        scope.pop_id();
        assert_eq!(scope.key(), "http://example.com/root.json#/definitions");
    }

    #[test]
    fn fragment_only_id() {
        let mut scope = root();
        let id = scope.resolve("#sub").unwrap();
        scope.push_id(&id);
        assert_eq!(scope.key(), "json-schema:///#sub");
    }

    #[test]
    fn reference_resolution() {
        let scope = UriScope::new(Url::parse("http://example.com/root.json").unwrap());
        assert_eq!(
            UriScope::key_of(&scope.resolve("#/definitions/a").unwrap()),
            "http://example.com/root.json#/definitions/a"
        );
        assert_eq!(
            UriScope::key_of(&scope.resolve("other.json").unwrap()),
            "http://example.com/other.json#"
        );
        assert_eq!(
            UriScope::key_of(&scope.resolve("http://elsewhere.test/x#/a").unwrap()),
            "http://elsewhere.test/x#/a"
        );
    }
}
