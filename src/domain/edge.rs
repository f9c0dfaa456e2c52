/// Edge kind - the relation through which one artifact requires another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Superclass or implemented interface.
    Inherits,
    /// Type referenced from a method's signature or body (return type,
    /// thrown type, or any other occurrence).
    MethodReference,
    /// Declared property type.
    PropertyType,
}
