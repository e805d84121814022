use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A runtime value of the scripting language.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectRef),
    /// Placeholder handed out for a name no scope could resolve.
    Unresolved(Rc<str>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined | Value::Object(_) | Value::Unresolved(_) => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null | Value::Unresolved(_) => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }
}

/// Strict equality; objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Unresolved(a), Value::Unresolved(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Unresolved(name) => write!(f, "<unresolved {name}>"),
        }
    }
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{n}")
    }
}

/// Property bag backing every object value.
#[derive(Debug, Default)]
pub struct Object {
    properties: BTreeMap<String, Value>,
}

impl Object {
    pub fn get_own_property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }
}

/// Shared handle to an [`Object`].
#[derive(Debug, Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn get_own_property(&self, name: &str) -> Option<Value> {
        self.0.borrow().get_own_property(name)
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().set(name, value);
    }
}

/// One lexical scope's bindings, linked to its enclosing scope.
#[derive(Debug, Default)]
pub struct Stash {
    bindings: RefCell<Vec<(Rc<str>, Value)>>,
    outer: Option<Rc<Stash>>,
}

impl Stash {
    pub fn new(outer: Option<Rc<Stash>>) -> Self {
        Self {
            bindings: RefCell::new(Vec::new()),
            outer,
        }
    }

    pub fn outer(&self) -> Option<&Rc<Stash>> {
        self.outer.as_ref()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        self.bindings
            .borrow()
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.clone())
    }

    /// Declare a binding, shadowing nothing: redeclaring overwrites.
    pub fn define(&self, name: Rc<str>, value: Value) {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(slot) = bindings.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            bindings.push((name, value));
        }
    }

    /// Overwrite an existing own binding. Returns false when absent.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        match bindings.iter_mut().find(|(n, _)| &**n == name) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_rendering() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();
        assert_eq!(Value::Object(a.clone()), Value::Object(a));
        assert_ne!(Value::Object(b), Value::Object(ObjectRef::new()));
    }

    #[test]
    fn test_stash_chain_lookup() {
        let outer = Rc::new(Stash::new(None));
        outer.define("x".into(), Value::Number(1.0));
        let inner = Stash::new(Some(outer.clone()));
        inner.define("y".into(), Value::Number(2.0));

        assert_eq!(inner.get_by_name("y"), Some(Value::Number(2.0)));
        assert_eq!(inner.get_by_name("x"), None, "lookup is own-scope only");
        assert_eq!(
            inner.outer().and_then(|o| o.get_by_name("x")),
            Some(Value::Number(1.0))
        );
        assert!(!inner.assign("x", Value::Null));
    }
}
