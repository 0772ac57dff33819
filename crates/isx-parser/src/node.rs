//! Thin node architecture for the C# syntax tree.
//!
//! Each `Node` is a small fixed-size header (kind, flags, span, data index).
//! Node payloads live in typed pools inside `NodeArena`; the `data_index` of a
//! node points into the pool selected by its kind's `NodeCategory`. Nodes that
//! carry no payload (`this`, `break;`, `where T : class`) use `Node::NO_DATA`.

use bitflags::bitflags;
use isx_common::{Atom, Span};
use isx_scanner::SyntaxKind;

/// Index of a node in a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

pub type NodeList = Vec<NodeIndex>;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Compilation unit and namespaces
    CompilationUnit,
    ExternAlias,
    UsingDirective,
    NamespaceDeclaration,
    AttributeList,
    Attribute,

    // Type declarations
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    RecordStructDeclaration,
    DelegateDeclaration,
    EnumMember,
    TypeParameter,
    TypeParameterConstraintClause,
    ClassConstraint,
    StructConstraint,
    NewConstraint,
    DefaultConstraint,
    TypeConstraint,

    // Members
    MethodDeclaration,
    ConstructorDeclaration,
    DestructorDeclaration,
    OperatorDeclaration,
    ConversionOperatorDeclaration,
    LocalFunctionStatement,
    FieldDeclaration,
    EventFieldDeclaration,
    PropertyDeclaration,
    IndexerDeclaration,
    EventDeclaration,
    Accessor,
    Parameter,

    // Types and names
    PredefinedType,
    IdentifierName,
    GenericName,
    QualifiedName,
    AliasQualifiedName,
    ArrayType,
    NullableType,
    PointerType,
    RefType,
    TupleType,
    TupleElement,
    OmittedTypeArgument,

    // Statements
    Block,
    LocalDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    EmptyStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForEachStatement,
    ReturnStatement,
    ThrowStatement,
    YieldReturnStatement,
    YieldBreakStatement,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    LabeledStatement,
    TryStatement,
    CatchClause,
    UsingStatement,
    LockStatement,
    FixedStatement,
    CheckedStatement,
    UnsafeStatement,
    SwitchStatement,
    SwitchSection,
    CaseLabel,
    DefaultLabel,

    // Expressions
    Literal,
    ThisExpression,
    BaseExpression,
    MemberAccess,
    Invocation,
    ElementAccess,
    Argument,
    ObjectCreation,
    ImplicitObjectCreation,
    ArrayCreation,
    ImplicitArrayCreation,
    StackAllocCreation,
    AnonymousObjectCreation,
    InitializerExpression,
    TupleExpression,
    CollectionExpression,
    ParenthesizedExpression,
    CastExpression,
    PrefixUnary,
    PostfixUnary,
    AwaitExpression,
    ThrowExpression,
    RefExpression,
    CheckedExpression,
    BinaryExpression,
    AssignmentExpression,
    AsExpression,
    IsExpression,
    IsPatternExpression,
    ConditionalExpression,
    Lambda,
    AnonymousMethod,
    TypeOfExpression,
    SizeOfExpression,
    DefaultExpression,
    DeclarationExpression,
    SwitchExpression,
    SwitchArm,
    DeclarationPattern,
    Pattern,
}

/// Storage pool a node kind's payload lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    None,
    SourceFile,
    Using,
    Namespace,
    AttributeList,
    TypeDecl,
    Delegate,
    EnumMember,
    TypeParameter,
    ConstraintClause,
    Method,
    Property,
    Accessor,
    Parameter,
    Identifier,
    GenericName,
    QualifiedName,
    Token,
    WrappedType,
    List,
    Declaration,
    VariableDeclaration,
    VariableDeclarator,
    Conditional,
    Loop,
    ForEach,
    Try,
    Catch,
    Switch,
    SwitchSection,
    SwitchArm,
    MemberAccess,
    Invocation,
    Argument,
    Creation,
    Unary,
    Binary,
    TypeOperand,
    Lambda,
}

impl NodeKind {
    pub fn category(self) -> NodeCategory {
        use NodeKind::*;
        match self {
            CompilationUnit => NodeCategory::SourceFile,
            ExternAlias | UsingDirective => NodeCategory::Using,
            NamespaceDeclaration => NodeCategory::Namespace,
            AttributeList => NodeCategory::AttributeList,
            Attribute | Invocation | ElementAccess => NodeCategory::Invocation,
            ClassDeclaration | StructDeclaration | InterfaceDeclaration | EnumDeclaration
            | RecordDeclaration | RecordStructDeclaration => NodeCategory::TypeDecl,
            DelegateDeclaration => NodeCategory::Delegate,
            EnumMember => NodeCategory::EnumMember,
            TypeParameter => NodeCategory::TypeParameter,
            TypeParameterConstraintClause => NodeCategory::ConstraintClause,
            MethodDeclaration | ConstructorDeclaration | DestructorDeclaration
            | OperatorDeclaration | ConversionOperatorDeclaration | LocalFunctionStatement => {
                NodeCategory::Method
            }
            PropertyDeclaration | IndexerDeclaration | EventDeclaration => NodeCategory::Property,
            Accessor => NodeCategory::Accessor,
            Parameter => NodeCategory::Parameter,
            IdentifierName => NodeCategory::Identifier,
            GenericName => NodeCategory::GenericName,
            QualifiedName | AliasQualifiedName => NodeCategory::QualifiedName,
            Literal | PredefinedType => NodeCategory::Token,
            ArrayType | NullableType | PointerType | RefType | TypeConstraint => {
                NodeCategory::WrappedType
            }
            TupleType | Block | InitializerExpression | TupleExpression | CollectionExpression
            | AnonymousObjectCreation | Pattern => NodeCategory::List,
            TupleElement | DeclarationExpression | DeclarationPattern => NodeCategory::Declaration,
            LocalDeclaration | FieldDeclaration | EventFieldDeclaration => {
                NodeCategory::VariableDeclaration
            }
            VariableDeclarator => NodeCategory::VariableDeclarator,
            IfStatement | ConditionalExpression => NodeCategory::Conditional,
            WhileStatement | DoStatement | ForStatement | UsingStatement | LockStatement
            | FixedStatement | CheckedStatement | UnsafeStatement => NodeCategory::Loop,
            ForEachStatement => NodeCategory::ForEach,
            TryStatement => NodeCategory::Try,
            CatchClause => NodeCategory::Catch,
            SwitchStatement | SwitchExpression => NodeCategory::Switch,
            SwitchSection => NodeCategory::SwitchSection,
            SwitchArm | CaseLabel => NodeCategory::SwitchArm,
            MemberAccess => NodeCategory::MemberAccess,
            Argument => NodeCategory::Argument,
            ObjectCreation | ImplicitObjectCreation | ArrayCreation | ImplicitArrayCreation
            | StackAllocCreation => NodeCategory::Creation,
            ExpressionStatement | ReturnStatement | ThrowStatement | YieldReturnStatement
            | GotoStatement | LabeledStatement | ParenthesizedExpression
            | PrefixUnary | PostfixUnary | AwaitExpression | ThrowExpression | RefExpression
            | CheckedExpression => NodeCategory::Unary,
            BinaryExpression | AssignmentExpression | AsExpression | IsExpression
            | IsPatternExpression => NodeCategory::Binary,
            CastExpression | TypeOfExpression | SizeOfExpression | DefaultExpression => {
                NodeCategory::TypeOperand
            }
            Lambda | AnonymousMethod => NodeCategory::Lambda,
            ThisExpression | BaseExpression | OmittedTypeArgument | ClassConstraint
            | StructConstraint | NewConstraint | DefaultConstraint | EmptyStatement
            | BreakStatement | ContinueStatement | YieldBreakStatement | DefaultLabel => {
                NodeCategory::None
            }
        }
    }

    pub fn is_type_declaration(self) -> bool {
        self.category() == NodeCategory::TypeDecl || self == NodeKind::DelegateDeclaration
    }

    pub fn is_type_syntax(self) -> bool {
        matches!(
            self,
            NodeKind::PredefinedType
                | NodeKind::IdentifierName
                | NodeKind::GenericName
                | NodeKind::QualifiedName
                | NodeKind::AliasQualifiedName
                | NodeKind::ArrayType
                | NodeKind::NullableType
                | NodeKind::PointerType
                | NodeKind::RefType
                | NodeKind::TupleType
                | NodeKind::OmittedTypeArgument
        )
    }

    /// Nodes that introduce a new body of executable code.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeKind::MethodDeclaration
                | NodeKind::ConstructorDeclaration
                | NodeKind::DestructorDeclaration
                | NodeKind::OperatorDeclaration
                | NodeKind::ConversionOperatorDeclaration
                | NodeKind::LocalFunctionStatement
                | NodeKind::Accessor
                | NodeKind::Lambda
                | NodeKind::AnonymousMethod
        )
    }
}

/// A thin node header.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Packed `node_flags`
    pub flags: u16,
    pub pos: u32,
    pub end: u32,
    /// Index into the kind's storage pool (`NO_DATA` = no payload)
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    #[inline]
    pub fn new(kind: NodeKind, pos: u32, end: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index: Self::NO_DATA,
        }
    }

    #[inline]
    pub fn with_data(kind: NodeKind, pos: u32, end: u32, data_index: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index,
        }
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.data_index != Self::NO_DATA
    }

    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.pos, self.end)
    }

    #[inline]
    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }
}

/// Per-node flag bits stored in `Node::flags`.
pub mod node_flags {
    /// `?.` access or `?[` element access.
    pub const CONDITIONAL_ACCESS: u16 = 1 << 0;
    /// File-scoped namespace (`namespace A;`).
    pub const FILE_SCOPED: u16 = 1 << 1;
    /// Member name after `.` is missing (`list.` at end of statement).
    pub const MISSING_NAME: u16 = 1 << 2;
    /// `async` lambda or local function.
    pub const ASYNC: u16 = 1 << 3;
    /// `static` lambda.
    pub const STATIC: u16 = 1 << 4;
}

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const STATIC = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SEALED = 1 << 6;
        const VIRTUAL = 1 << 7;
        const OVERRIDE = 1 << 8;
        const READONLY = 1 << 9;
        const EXTERN = 1 << 10;
        const UNSAFE = 1 << 11;
        const VOLATILE = 1 << 12;
        const CONST = 1 << 13;
        const NEW = 1 << 14;
        const PARTIAL = 1 << 15;
        const ASYNC = 1 << 16;
        const REQUIRED = 1 << 17;
        const FILE = 1 << 18;
        const FIXED = 1 << 19;
        const REF = 1 << 20;
        const EVENT = 1 << 21;
        const USING = 1 << 22;
    }
}

impl Modifiers {
    pub fn from_keyword(kind: SyntaxKind) -> Option<Modifiers> {
        Some(match kind {
            SyntaxKind::PublicKeyword => Modifiers::PUBLIC,
            SyntaxKind::PrivateKeyword => Modifiers::PRIVATE,
            SyntaxKind::ProtectedKeyword => Modifiers::PROTECTED,
            SyntaxKind::InternalKeyword => Modifiers::INTERNAL,
            SyntaxKind::StaticKeyword => Modifiers::STATIC,
            SyntaxKind::AbstractKeyword => Modifiers::ABSTRACT,
            SyntaxKind::SealedKeyword => Modifiers::SEALED,
            SyntaxKind::VirtualKeyword => Modifiers::VIRTUAL,
            SyntaxKind::OverrideKeyword => Modifiers::OVERRIDE,
            SyntaxKind::ReadOnlyKeyword => Modifiers::READONLY,
            SyntaxKind::ExternKeyword => Modifiers::EXTERN,
            SyntaxKind::UnsafeKeyword => Modifiers::UNSAFE,
            SyntaxKind::VolatileKeyword => Modifiers::VOLATILE,
            SyntaxKind::ConstKeyword => Modifiers::CONST,
            SyntaxKind::NewKeyword => Modifiers::NEW,
            SyntaxKind::FixedKeyword => Modifiers::FIXED,
            SyntaxKind::RefKeyword => Modifiers::REF,
            _ => return None,
        })
    }

    /// Contextual modifiers recognized by identifier text.
    pub fn from_contextual(text: &str) -> Option<Modifiers> {
        Some(match text {
            "partial" => Modifiers::PARTIAL,
            "async" => Modifiers::ASYNC,
            "required" => Modifiers::REQUIRED,
            "file" => Modifiers::FILE,
            _ => return None,
        })
    }

    pub fn accessibility(self) -> Modifiers {
        self & (Modifiers::PUBLIC | Modifiers::PRIVATE | Modifiers::PROTECTED | Modifiers::INTERNAL)
    }
}

bitflags! {
    /// Parameter modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ParameterModifiers: u8 {
        const THIS = 1 << 0;
        const REF = 1 << 1;
        const OUT = 1 << 2;
        const IN = 1 << 3;
        const PARAMS = 1 << 4;
        const SCOPED = 1 << 5;
        const READONLY = 1 << 6;
    }
}

// =============================================================================
// Typed Data Pools
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct SourceFileData {
    pub externs: NodeList,
    pub usings: NodeList,
    pub attributes: NodeList,
    pub members: NodeList,
}

/// `using`, `using static`, `using X = Y;`, `global using`, `extern alias`.
#[derive(Clone, Debug)]
pub struct UsingData {
    pub is_global: bool,
    pub is_static: bool,
    /// Alias name for `using A = B;` (and the alias of `extern alias`)
    pub alias: Atom,
    pub name: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct NamespaceData {
    pub name: NodeIndex,
    pub externs: NodeList,
    pub usings: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct AttributeListData {
    /// `assembly`, `return`, ... or `Atom::NONE`
    pub target: Atom,
    pub attributes: NodeList,
}

/// Class, struct, interface, enum and record declarations.
#[derive(Clone, Debug, Default)]
pub struct TypeDeclData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    pub name: Atom,
    pub name_pos: u32,
    pub type_parameters: NodeList,
    /// Record primary constructor parameters
    pub parameters: NodeList,
    pub base_types: NodeList,
    pub constraints: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug, Default)]
pub struct DelegateData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    pub return_type: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
    pub type_parameters: NodeList,
    pub parameters: NodeList,
    pub constraints: NodeList,
}

#[derive(Clone, Debug)]
pub struct EnumMemberData {
    pub attributes: NodeList,
    pub name: Atom,
    pub value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeParameterData {
    pub attributes: NodeList,
    /// `InKeyword`, `OutKeyword` or `Unknown`
    pub variance: SyntaxKind,
    pub name: Atom,
}

#[derive(Clone, Debug)]
pub struct ConstraintClauseData {
    pub name: Atom,
    pub constraints: NodeList,
}

/// Methods, constructors, destructors, operators and local functions.
#[derive(Clone, Debug, Default)]
pub struct MethodData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    /// `NONE` for constructors and destructors
    pub return_type: NodeIndex,
    /// `IFoo` in `void IFoo.M()`
    pub explicit_interface: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
    pub type_parameters: NodeList,
    pub parameters: NodeList,
    pub constraints: NodeList,
    /// `: base(...)`/`: this(...)` arguments
    pub initializer: NodeList,
    /// Block body, or `NONE`
    pub body: NodeIndex,
    /// `=> expr` body, or `NONE`
    pub expression_body: NodeIndex,
}

/// Properties, indexers and event declarations with accessors.
#[derive(Clone, Debug, Default)]
pub struct PropertyData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    pub type_node: NodeIndex,
    pub explicit_interface: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
    /// Indexer parameters
    pub parameters: NodeList,
    pub accessors: NodeList,
    pub expression_body: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AccessorData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    /// `get`, `set`, `init`, `add` or `remove`
    pub keyword: Atom,
    pub body: NodeIndex,
    pub expression_body: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct ParameterData {
    pub attributes: NodeList,
    pub modifiers: ParameterModifiers,
    /// `NONE` for implicitly typed lambda parameters
    pub type_node: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
    pub default_value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IdentifierData {
    pub name: Atom,
}

#[derive(Clone, Debug)]
pub struct GenericNameData {
    pub name: Atom,
    pub type_arguments: NodeList,
}

/// `A.B` in type/namespace position, or `alias::B`.
#[derive(Clone, Debug)]
pub struct QualifiedNameData {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

/// Literals and predefined type keywords.
#[derive(Clone, Debug)]
pub struct TokenData {
    pub token: SyntaxKind,
    pub flags: isx_scanner::TokenFlags,
}

/// Array, nullable, pointer and ref types; type constraints.
#[derive(Clone, Debug)]
pub struct WrappedTypeData {
    pub element: NodeIndex,
    /// Array rank (1 for `T[]`, 2 for `T[,]`)
    pub rank: u8,
}

#[derive(Clone, Debug, Default)]
pub struct ListData {
    pub items: NodeList,
}

/// A typed name: tuple element, `out var x`, `x is string s`.
#[derive(Clone, Debug)]
pub struct DeclarationData {
    pub type_node: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
}

#[derive(Clone, Debug, Default)]
pub struct VariableDeclarationData {
    pub attributes: NodeList,
    pub modifiers: Modifiers,
    pub type_node: NodeIndex,
    pub declarators: NodeList,
}

#[derive(Clone, Debug)]
pub struct VariableDeclaratorData {
    pub name: Atom,
    pub name_pos: u32,
    pub initializer: NodeIndex,
}

/// `if` statements and `?:` expressions.
#[derive(Clone, Debug)]
pub struct ConditionalData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

/// `while`, `do`, `for`, `using`, `lock`, `fixed`, `checked`, `unsafe`.
#[derive(Clone, Debug, Default)]
pub struct LoopData {
    pub declaration: NodeIndex,
    pub initializers: NodeList,
    pub condition: NodeIndex,
    pub incrementors: NodeList,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ForEachData {
    /// Declared type (`var` is an identifier name), or a deconstruction
    pub type_node: NodeIndex,
    pub name: Atom,
    pub name_pos: u32,
    pub expression: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct TryData {
    pub block: NodeIndex,
    pub catches: NodeList,
    pub finally_block: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CatchData {
    pub type_node: NodeIndex,
    pub name: Atom,
    pub filter: NodeIndex,
    pub block: NodeIndex,
}

/// Switch statements (sections) and switch expressions (arms).
#[derive(Clone, Debug, Default)]
pub struct SwitchData {
    pub expression: NodeIndex,
    pub sections: NodeList,
}

#[derive(Clone, Debug, Default)]
pub struct SwitchSectionData {
    pub labels: NodeList,
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct SwitchArmData {
    pub pattern: NodeIndex,
    pub guard: NodeIndex,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct MemberAccessData {
    pub expression: NodeIndex,
    /// `IdentifierName`/`GenericName`, or `NONE` when missing
    pub name: NodeIndex,
    /// `DotToken`, `QuestionDotToken` or `MinusGreaterThanToken`
    pub operator: SyntaxKind,
    pub operator_pos: u32,
}

/// Invocations, element access and attributes.
#[derive(Clone, Debug)]
pub struct InvocationData {
    pub expression: NodeIndex,
    pub arguments: NodeList,
    /// Span of the argument list including delimiters; empty when absent
    pub argument_span: Span,
}

#[derive(Clone, Debug)]
pub struct ArgumentData {
    pub name: Atom,
    /// `RefKeyword`, `OutKeyword`, `InKeyword` or `Unknown`
    pub ref_kind: SyntaxKind,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct CreationData {
    pub type_node: NodeIndex,
    /// Constructor arguments, or array sizes
    pub arguments: NodeList,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct UnaryData {
    pub operator: SyntaxKind,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct BinaryData {
    pub left: NodeIndex,
    pub operator: SyntaxKind,
    pub right: NodeIndex,
}

/// Casts, `typeof`, `sizeof`, `default`.
#[derive(Clone, Debug)]
pub struct TypeOperandData {
    pub type_node: NodeIndex,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct LambdaData {
    pub parameters: NodeList,
    /// Block or expression
    pub body: NodeIndex,
}
