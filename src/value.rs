use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use lasso::{Key, Rodeo, Spur};

use crate::buffer::Buffer;
use crate::error::Error;

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// Compare two Spurs by their resolved string content (lexicographic).
pub fn compare_spurs(a: Spur, b: Spur) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    INTERNER.with(|r| {
        let interner = r.borrow();
        interner.resolve(&a).cmp(interner.resolve(&b))
    })
}

/// The closed set of value kinds. Discriminants are the bit positions used by
/// [`TypeSet`], so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Nil = 0,
    Boolean,
    Number,
    String,
    Symbol,
    Keyword,
    Buffer,
    Array,
    Tuple,
    Table,
    Struct,
    Function,
    Native,
    Abstract,
}

impl ValueKind {
    pub const COUNT: usize = 14;

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::Keyword => "keyword",
            ValueKind::Buffer => "buffer",
            ValueKind::Array => "array",
            ValueKind::Tuple => "tuple",
            ValueKind::Table => "table",
            ValueKind::Struct => "struct",
            ValueKind::Function => "function",
            ValueKind::Native => "cfunction",
            ValueKind::Abstract => "abstract",
        }
    }

    pub fn from_index(index: u8) -> Option<ValueKind> {
        match index {
            0 => Some(ValueKind::Nil),
            1 => Some(ValueKind::Boolean),
            2 => Some(ValueKind::Number),
            3 => Some(ValueKind::String),
            4 => Some(ValueKind::Symbol),
            5 => Some(ValueKind::Keyword),
            6 => Some(ValueKind::Buffer),
            7 => Some(ValueKind::Array),
            8 => Some(ValueKind::Tuple),
            9 => Some(ValueKind::Table),
            10 => Some(ValueKind::Struct),
            11 => Some(ValueKind::Function),
            12 => Some(ValueKind::Native),
            13 => Some(ValueKind::Abstract),
            _ => None,
        }
    }
}

/// A bitset of value kinds, used by the `%T` diagnostic directive and by
/// [`crate::diag::check_kinds`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSet(u16);

impl TypeSet {
    pub const fn empty() -> Self {
        TypeSet(0)
    }

    pub const fn of(kind: ValueKind) -> Self {
        TypeSet(1 << kind as u16)
    }

    pub const fn with(self, kind: ValueKind) -> Self {
        TypeSet(self.0 | 1 << kind as u16)
    }

    pub const fn contains(self, kind: ValueKind) -> bool {
        self.0 & 1 << kind as u16 != 0
    }

    /// Iterate the member kinds in ascending bit order.
    pub fn kinds(self) -> impl Iterator<Item = ValueKind> {
        (0..ValueKind::COUNT as u8)
            .filter_map(ValueKind::from_index)
            .filter(move |kind| self.contains(*kind))
    }
}

/// A native function callable from Quill. Its display name lives in the
/// [`crate::registry`], keyed by Rc identity, not on the function itself.
pub type NativeFnInner = dyn Fn(&[Value]) -> Result<Value, Error>;

pub struct NativeFn {
    pub func: Box<NativeFnInner>,
}

impl NativeFn {
    pub fn new(f: impl Fn(&[Value]) -> Result<Value, Error> + 'static) -> Self {
        NativeFn { func: Box::new(f) }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<cfunction>")
    }
}

/// A user-defined closure. Only the pieces the diagnostic engine consumes are
/// modeled here.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<Spur>,
    pub params: Vec<Spur>,
}

/// An opaque native object carrying a type name.
pub struct Abstract {
    pub type_name: String,
    pub data: Box<dyn std::any::Any>,
}

impl Abstract {
    pub fn new(type_name: impl Into<String>, data: impl std::any::Any) -> Self {
        Abstract {
            type_name: type_name.into(),
            data: Box::new(data),
        }
    }
}

impl fmt::Debug for Abstract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<abstract {}>", self.type_name)
    }
}

/// A mutable key-value mapping with an optional prototype link.
///
/// Entries use a BTreeMap so iteration order (and therefore rendered output)
/// is deterministic.
#[derive(Debug, Default)]
pub struct Table {
    pub entries: BTreeMap<Value, Value>,
    pub proto: Option<Rc<RefCell<Table>>>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: Value, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbol-valued `:name` field of this table's prototype, if any.
    pub fn proto_name(&self) -> Option<Spur> {
        let proto = self.proto.as_ref()?;
        match proto.borrow().entries.get(&Value::keyword("name")) {
            Some(Value::Symbol(name)) => Some(*name),
            _ => None,
        }
    }
}

/// The core Value type for all Quill data.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<String>),
    Symbol(Spur),
    Keyword(Spur),
    Buffer(Rc<RefCell<Buffer>>),
    Array(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Table(Rc<RefCell<Table>>),
    Struct(Rc<BTreeMap<Value, Value>>),
    Function(Rc<Function>),
    Native(Rc<NativeFn>),
    Abstract(Rc<Abstract>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Keyword(_) => ValueKind::Keyword,
            Value::Buffer(_) => ValueKind::Buffer,
            Value::Array(_) => ValueKind::Array,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Table(_) => ValueKind::Table,
            Value::Struct(_) => ValueKind::Struct,
            Value::Function(_) => ValueKind::Function,
            Value::Native(_) => ValueKind::Native,
            Value::Abstract(_) => ValueKind::Abstract,
        }
    }

    /// Canonical type name; abstract objects report their registered name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Abstract(a) => &a.type_name,
            other => other.kind().name(),
        }
    }

    /// Identity key for cycle detection and identity tokens.
    ///
    /// `None` for the kinds exempt from cycle tracking (nil, booleans,
    /// numbers, symbols). Keywords key on their interner index; everything
    /// else keys on its Rc pointer address.
    pub fn identity(&self) -> Option<(ValueKind, usize)> {
        let addr = match self {
            Value::Nil | Value::Bool(_) | Value::Number(_) | Value::Symbol(_) => return None,
            Value::Keyword(s) => s.into_usize(),
            Value::String(s) => Rc::as_ptr(s) as usize,
            Value::Buffer(b) => Rc::as_ptr(b) as usize,
            Value::Array(a) => Rc::as_ptr(a) as usize,
            Value::Tuple(t) => Rc::as_ptr(t) as usize,
            Value::Table(t) => Rc::as_ptr(t) as usize,
            Value::Struct(s) => Rc::as_ptr(s) as usize,
            Value::Function(f) => Rc::as_ptr(f) as usize,
            Value::Native(f) => Rc::as_ptr(f) as usize,
            Value::Abstract(a) => Rc::as_ptr(a) as usize,
        };
        Some((self.kind(), addr))
    }

    pub(crate) fn heap_addr(&self) -> usize {
        self.identity().map(|(_, addr)| addr).unwrap_or(0)
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn number(x: f64) -> Value {
        Value::Number(x)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(s.into()))
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(intern(s))
    }

    pub fn keyword(s: &str) -> Value {
        Value::Keyword(intern(s))
    }

    pub fn buffer(bytes: &[u8]) -> Value {
        Value::Buffer(Rc::new(RefCell::new(Buffer::from_bytes(bytes))))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn table(entries: Vec<(Value, Value)>) -> Value {
        let mut table = Table::new();
        for (k, v) in entries {
            table.put(k, v);
        }
        Value::from_table(table)
    }

    pub fn from_table(table: Table) -> Value {
        Value::Table(Rc::new(RefCell::new(table)))
    }

    pub fn structure(entries: Vec<(Value, Value)>) -> Value {
        Value::Struct(Rc::new(entries.into_iter().collect()))
    }
}

// Equality follows the runtime's semantics: immutable kinds compare by
// content, mutable and opaque kinds by reference identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Buffer(a), Value::Buffer(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Abstract(a), Value::Abstract(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(x) => x.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::Keyword(s) => s.hash(state),
            Value::Tuple(t) => t.hash(state),
            Value::Struct(s) => s.hash(state),
            Value::Buffer(b) => (Rc::as_ptr(b) as usize).hash(state),
            Value::Array(a) => (Rc::as_ptr(a) as usize).hash(state),
            Value::Table(t) => (Rc::as_ptr(t) as usize).hash(state),
            Value::Function(f) => (Rc::as_ptr(f) as usize).hash(state),
            Value::Native(f) => (Rc::as_ptr(f) as usize).hash(state),
            Value::Abstract(a) => (Rc::as_ptr(a) as usize).hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Ord exists so tables and structs can use BTreeMap keys, which makes mapping
// iteration (and all rendered output) deterministic. Mutable kinds order by
// pointer so a cyclic key can never recurse through cmp.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => compare_spurs(*a, *b),
            (Value::Keyword(a), Value::Keyword(b)) => compare_spurs(*a, *b),
            (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Struct(a), Value::Struct(b)) => a.cmp(b),
            (Value::Buffer(a), Value::Buffer(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            (Value::Array(a), Value::Array(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            (Value::Table(a), Value::Table(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            (Value::Function(a), Value::Function(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            (Value::Native(a), Value::Native(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            (Value::Abstract(a), Value::Abstract(b)) => {
                (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize))
            }
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_kinds_compare_by_content() {
        assert_eq!(Value::string("abc"), Value::string("abc"));
        assert_eq!(
            Value::tuple(vec![Value::Number(1.0)]),
            Value::tuple(vec![Value::Number(1.0)])
        );
        assert_eq!(Value::keyword("a"), Value::keyword("a"));
    }

    #[test]
    fn test_mutable_kinds_compare_by_identity() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_identity_exempt_kinds() {
        assert!(Value::Nil.identity().is_none());
        assert!(Value::Bool(true).identity().is_none());
        assert!(Value::Number(2.5).identity().is_none());
        assert!(Value::symbol("x").identity().is_none());
        assert!(Value::keyword("x").identity().is_some());
        assert!(Value::string("x").identity().is_some());
    }

    #[test]
    fn test_typeset() {
        let ts = TypeSet::of(ValueKind::Number).with(ValueKind::String);
        assert!(ts.contains(ValueKind::Number));
        assert!(ts.contains(ValueKind::String));
        assert!(!ts.contains(ValueKind::Nil));
        let kinds: Vec<_> = ts.kinds().collect();
        assert_eq!(kinds, vec![ValueKind::Number, ValueKind::String]);
    }

    #[test]
    fn test_table_proto_name() {
        let mut proto = Table::new();
        proto.put(Value::keyword("name"), Value::symbol("Point"));
        let mut table = Table::new();
        table.proto = Some(Rc::new(RefCell::new(proto)));
        let name = table.proto_name().expect("proto name");
        assert_eq!(resolve(name), "Point");
    }

    #[test]
    fn test_table_keys_are_deterministic() {
        let v = Value::table(vec![
            (Value::keyword("b"), Value::Number(2.0)),
            (Value::keyword("a"), Value::Number(1.0)),
        ]);
        let Value::Table(t) = &v else { unreachable!() };
        let keys: Vec<Value> = t.borrow().entries.keys().cloned().collect();
        assert_eq!(keys, vec![Value::keyword("a"), Value::keyword("b")]);
    }

    #[test]
    fn test_native_fn_call() {
        let f = NativeFn::new(|args| Ok(args[0].clone()));
        assert_eq!(
            (f.func)(&[Value::Number(42.0)]).unwrap(),
            Value::Number(42.0)
        );
    }
}
